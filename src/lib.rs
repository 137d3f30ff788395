//! hashgrid: per-tick spatial-hash collision sets (query-only, no resolution)

pub mod types;
pub mod api;
pub mod config;
pub mod grid;
pub mod buckets;
pub mod seen;
pub mod set;
pub mod narrowphase;
pub mod collider;

pub use crate::types::*;
pub use crate::api::*;
pub use crate::config::{CollisionSetConfig, ConfigError};
pub use crate::collider::{Collider, Shape};
pub use crate::set::CollisionSet;
