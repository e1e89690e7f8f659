//! # Shared Types Crate
//!
//! Domain primitives shared across CrossMesh crates: identifier types,
//! network ids, and the audit metadata attached to every on-chain
//! observation.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: identifier and metadata types live here and
//!   nowhere else.
//! - **Content-addressed identity**: message and payload ids are 32-byte
//!   hashes derived from content, never random. Collisions between
//!   byte-identical sends are expected and handled by position indices.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
