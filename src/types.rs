use serde::{Deserialize, Serialize};

use crate::api::{Body, Government};

/// Category of bodies a collision set is responsible for. Callers keep one
/// set per category.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionType {
    #[default]
    Ship,
    Minable,
    Asteroid,
}

impl CollisionType {
    /// Solid rock stops a projectile at its first contact, so line queries
    /// against these sets keep only the closest hit.
    pub fn single_impact(self) -> bool {
        matches!(self, CollisionType::Minable | CollisionType::Asteroid)
    }
}

/// Bitmask-based affiliation, usable as a [`Government`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Faction {
    /// Layer(s) this faction belongs to.
    pub layer: u32,
    /// Layers this faction treats as hostile.
    pub hostile_to: u32,
}

impl Faction {
    /// Convenience constructor.
    pub fn simple(layer: u32, hostile_to: u32) -> Self {
        Self { layer, hostile_to }
    }

    /// One-directional hostility: `self` wants to fight `other`.
    pub fn hostile(self, other: Faction) -> bool {
        (self.hostile_to & other.layer) != 0
    }
}

impl Government for Faction {
    /// Hostility in either direction makes two factions enemies.
    fn is_enemy(&self, other: &Self) -> bool {
        self.hostile(*other) || other.hostile(*self)
    }
}

/// Single contact reported by a line query.
#[derive(Debug)]
pub struct Collision<'a, B: ?Sized> {
    pub body: &'a B,
    pub collision_type: CollisionType,
    /// Fraction in [0,1] along the queried segment where contact begins.
    pub range: f32,
}

impl<B: ?Sized> Clone for Collision<'_, B> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<B: ?Sized> Copy for Collision<'_, B> {}

/// Options for a segment query.
///
/// Defaults: no faction filter, no target, report every hit.
pub struct LineQuery<'q, B: Body + ?Sized> {
    /// When set, bodies whose government is not an enemy of this one are
    /// skipped. Bodies without a government are never skipped.
    pub faction: Option<&'q B::Government>,
    /// A body that is always eligible, regardless of the faction filter.
    pub target: Option<&'q B>,
    /// Report every hit (true) or only the closest one (false).
    pub all: bool,
}

impl<B: Body + ?Sized> Default for LineQuery<'_, B> {
    fn default() -> Self {
        Self {
            faction: None,
            target: None,
            all: true,
        }
    }
}

impl<B: Body + ?Sized> Clone for LineQuery<'_, B> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<B: Body + ?Sized> Copy for LineQuery<'_, B> {}

impl<'q, B: Body + ?Sized> LineQuery<'q, B> {
    /// Report only the closest hit.
    pub fn closest() -> Self {
        Self {
            all: false,
            ..Self::default()
        }
    }

    pub fn with_faction(mut self, faction: &'q B::Government) -> Self {
        self.faction = Some(faction);
        self
    }

    pub fn with_target(mut self, target: &'q B) -> Self {
        self.target = Some(target);
        self
    }
}

/// Primitive segment contact (see [`crate::narrowphase`]).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SegmentHit {
    /// Fraction in [0,1] along the segment where first contact occurs;
    /// 0 when the segment starts inside the shape.
    pub toi: f32,
}

/// Debug/performance statistics for a finished set.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SetStats {
    /// Bodies added since the last clear.
    pub objects: usize,
    /// (body, cell) entries in the bucket table.
    pub entries: usize,
    /// Buckets holding at least one entry.
    pub occupied_buckets: usize,
    /// Entry count of the fullest bucket.
    pub max_bucket_len: usize,
}
