//! Paint model.
//!
//! Only the color representation survives here; what a context actually draws
//! is owned by the scene nodes handed to it.

pub mod color;

pub use color::Color;
