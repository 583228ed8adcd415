//! Frame transform pipeline.
//!
//! Every tick runs the same fixed stage order; the handshake decides
//! which optional stages participate:
//!
//! ```text
//!   raw ──► base ──► [motion] ──► [edge] ──► [color] ──► [post] ──► staged
//!           resize /                                      deep-
//!           model /                                       learning
//!           passthrough                                   model
//! ```
//!
//! | Module     | Purpose                                        |
//! |------------|------------------------------------------------|
//! | `resize`   | Interpolation kernels for the base transform   |
//! | `registry` | Named enhancement models                       |
//! | `motion`   | Block-matching motion compensation             |
//! | `edge`     | Gradient edge detection                        |
//! | `color`    | Local contrast equalization                    |
//! | `pipeline` | Stage ordering and dimension normalization     |

pub mod color;
pub mod edge;
pub mod motion;
pub mod pipeline;
pub mod registry;
pub mod resize;

pub use color::equalize_contrast;
pub use edge::edge_map;
pub use motion::MotionCompensator;
pub use pipeline::{BaseTransform, StageFlags, TransformPipeline};
pub use registry::{EnhancerRegistry, FrameEnhancer};
pub use resize::{Interpolation, resize};
