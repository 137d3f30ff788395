//! Construction parameters for a collision set, loadable from TOML.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::CollisionType;

/// Upper bound on the bucket table size accepted by strict construction.
pub const MAX_BUCKET_COUNT: u32 = 1 << 24;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cell size must be at least 1")]
    ZeroCellSize,

    #[error("bucket count must be at least 1")]
    ZeroBucketCount,

    #[error("bucket count {requested} exceeds the maximum of {max}")]
    BucketCountTooLarge { requested: u32, max: u32 },

    #[error("failed to parse collision set config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Cell size, bucket count and body category of one collision set.
///
/// ```toml
/// cell_size = 256
/// bucket_count = 4096
/// collision_type = "asteroid"
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionSetConfig {
    /// Side of a grid cell in world units; rounded down to a power of two.
    pub cell_size: u32,
    /// Number of hash buckets; rounded down to a power of two.
    pub bucket_count: u32,
    pub collision_type: CollisionType,
}

impl Default for CollisionSetConfig {
    fn default() -> Self {
        Self {
            cell_size: 256,
            bucket_count: 4096,
            collision_type: CollisionType::Ship,
        }
    }
}

impl CollisionSetConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let cfg: Self = toml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject sizes that lenient construction would silently coerce or that
    /// would allocate an unreasonable table.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cell_size == 0 {
            return Err(ConfigError::ZeroCellSize);
        }
        if self.bucket_count == 0 {
            return Err(ConfigError::ZeroBucketCount);
        }
        if self.bucket_count > MAX_BUCKET_COUNT {
            return Err(ConfigError::BucketCountTooLarge {
                requested: self.bucket_count,
                max: MAX_BUCKET_COUNT,
            });
        }
        Ok(())
    }
}
