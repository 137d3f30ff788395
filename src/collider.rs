use glam::Vec2;

use crate::api::{Body, NarrowphaseApi};
use crate::narrowphase::Narrowphase;
use crate::types::Faction;

/// Supported collider shapes.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Shape {
    /// Centered circle.
    Circle { radius: f32 },
    /// Centered axis-aligned box (half extents along X/Y).
    Aabb { half_extents: Vec2 },
    /// Mathematical point.
    Point,
}

/// Plain-geometry body for callers without their own shape masks.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Collider {
    pub shape: Shape,
    pub center: Vec2,
    pub faction: Option<Faction>,
}

impl Collider {
    pub fn circle(center: Vec2, radius: f32) -> Self {
        Self { shape: Shape::Circle { radius }, center, faction: None }
    }

    pub fn aabb(center: Vec2, half_extents: Vec2) -> Self {
        Self { shape: Shape::Aabb { half_extents }, center, faction: None }
    }

    pub fn point(p: Vec2) -> Self {
        Self { shape: Shape::Point, center: p, faction: None }
    }

    pub fn with_faction(mut self, faction: Faction) -> Self {
        self.faction = Some(faction);
        self
    }

    fn half_extents(&self) -> Vec2 {
        match self.shape {
            Shape::Aabb { half_extents } => half_extents,
            Shape::Circle { radius } => Vec2::splat(radius),
            Shape::Point => Vec2::ZERO,
        }
    }
}

impl Body for Collider {
    type Government = Faction;

    fn position(&self) -> Vec2 {
        self.center
    }

    fn radius(&self) -> f32 {
        self.half_extents().max_element()
    }

    fn government(&self) -> Option<&Faction> {
        self.faction.as_ref()
    }

    fn line_intersection(&self, from: Vec2, delta: Vec2, _step: i32) -> Option<f32> {
        let to = from + delta;
        let hit = match self.shape {
            Shape::Circle { radius } => Narrowphase::line_segment_circle(from, to, self.center, radius),
            Shape::Aabb { half_extents } => {
                Narrowphase::line_segment_aabb(from, to, self.center - half_extents, self.center + half_extents)
            }
            Shape::Point => Narrowphase::line_segment_aabb(from, to, self.center, self.center),
        };
        hit.map(|h| h.toi)
    }

    fn within_ring(&self, center: Vec2, inner: f32, outer: f32, _step: i32) -> bool {
        match self.shape {
            Shape::Circle { radius } => Narrowphase::ring_circle(center, inner, outer, self.center, radius),
            Shape::Aabb { half_extents } => Narrowphase::ring_aabb(center, inner, outer, self.center, half_extents),
            Shape::Point => Narrowphase::ring_circle(center, inner, outer, self.center, 0.0),
        }
    }

    fn within_circle(&self, center: Vec2, radius: f32, _step: i32) -> bool {
        match self.shape {
            Shape::Circle { radius: r } => Narrowphase::overlap_point_circle(self.center, center, radius + r),
            Shape::Aabb { half_extents } => {
                let closest = center.clamp(self.center - half_extents, self.center + half_extents);
                Narrowphase::overlap_point_circle(closest, center, radius)
            }
            Shape::Point => Narrowphase::overlap_point_circle(self.center, center, radius),
        }
    }
}
