//! Vellum engine crate.
//!
//! Decodes packed bitmap images and bitmap-font atlases, and renders UI
//! draw-call lists against an immediate-mode 2D graphics device.

pub mod assets;
pub mod coords;
pub mod device;
pub mod error;
pub mod layout;
pub mod logging;
pub mod render;

pub use error::DecodeError;
