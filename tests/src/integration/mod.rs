//! Cross-component integration scenarios.

pub mod codec_properties;
pub mod collisions;
pub mod fixtures;
pub mod lifecycle_flows;
pub mod replay;
