//! # reel-server — WebSocket video streaming service
//!
//! Thin service crate around `reel-core`: loads TOML configuration,
//! exposes a `/stream` WebSocket endpoint, and runs one
//! `PlaybackSession` per connection.

pub mod config;
pub mod ws;
