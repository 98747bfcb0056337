//! Reprojection of 360° footage into a rotatable fisheye view.

pub mod config;
pub mod effect;
pub mod error;
pub mod projection;
pub mod render;
pub mod sampler;

pub use config::RenderConfig;
pub use effect::{Controls, FisheyeRotation, ParameterId};
pub use error::{Error, Result};
pub use projection::{Projection, RotationParameters};
pub use sampler::Filter;
