use glam::Vec2;

use crate::types::*;

/// Affiliation attached to bodies and projectiles, used to filter line hits.
pub trait Government {
    /// Whether `self` and `other` are hostile to each other.
    fn is_enemy(&self, other: &Self) -> bool;
}

/// Capability contract for anything stored in a collision set.
///
/// The set only uses `position` and `radius` to decide which cells a body
/// occupies; every reported hit is confirmed by one of the exact tests below.
pub trait Body {
    type Government: Government;

    /// World-space centre of the bounding square.
    fn position(&self) -> Vec2;

    /// Half side of the bounding square. The exact shape must lie entirely
    /// within `position() ± radius()`.
    fn radius(&self) -> f32;

    fn government(&self) -> Option<&Self::Government>;

    /// Exact segment test against `from .. from + delta`.
    ///
    /// Returns the fraction in [0,1] along the segment where contact begins.
    /// `step` is the simulation step passed to the last `clear`, for bodies
    /// whose shape depends on an animation frame.
    fn line_intersection(&self, from: Vec2, delta: Vec2, step: i32) -> Option<f32>;

    /// Exact test: does any part of the shape lie between `inner` and
    /// `outer` distance from `center`?
    fn within_ring(&self, center: Vec2, inner: f32, outer: f32, step: i32) -> bool;

    /// Exact test against the disk of `radius` around `center`.
    fn within_circle(&self, center: Vec2, radius: f32, step: i32) -> bool {
        self.within_ring(center, 0.0, radius, step)
    }
}

/// A moving shot whose travel this step is tested as a segment.
pub trait Projectile {
    type Body: Body + ?Sized;

    fn position(&self) -> Vec2;

    /// Displacement covered during the current step.
    fn velocity(&self) -> Vec2;

    fn government(&self) -> Option<&<Self::Body as Body>::Government>;

    /// Body this projectile was aimed at; always eligible for a hit.
    fn target(&self) -> Option<&Self::Body>;

    /// Whether the projectile can strike several bodies in one step.
    fn hits_multiple(&self) -> bool;
}

/// Public API contract for a per-tick collision set.
///
/// Protocol per tick: `clear`, any number of `add`, `finish`, then any
/// number of queries. Each query overwrites the buffer returned by the
/// previous one. Querying before `finish`, or adding after it without a new
/// `clear`, never panics but yields unspecified (possibly stale) results.
pub trait CollisionSetApi<'a, B: Body + ?Sized + 'a> {
    /// Construct a set. Both sizes are rounded down to a power of two
    /// (zero becomes one); the bucket count is capped at
    /// [`crate::config::MAX_BUCKET_COUNT`].
    fn new(cell_size: u32, bucket_count: u32, collision_type: CollisionType) -> Self
    where
        Self: Sized;

    // --- Lifecycle ---------------------------------------------------------

    /// Drop every body of the previous tick and remember the current step.
    fn clear(&mut self, step: i32);

    /// Insert a body; it occupies every cell its bounding square touches.
    fn add(&mut self, body: &'a B);

    /// Compact the inserted entries into the bucket lookup table.
    fn finish(&mut self);

    // --- Queries -----------------------------------------------------------

    /// Bodies hit by the segment `from .. to`. Unordered unless
    /// `query.all` is false or the set's [`CollisionType::single_impact`]
    /// holds, in which case at most the closest hit is kept.
    ///
    /// Each component of `to - from` is clamped to ±[`crate::set::MAX_VELOCITY`]
    /// first, so bodies beyond that distance from `from` are never reported.
    fn line(&mut self, from: Vec2, to: Vec2, query: LineQuery<'_, B>) -> &[Collision<'a, B>];

    /// Segment query derived from a projectile's travel this step.
    fn line_projectile<P>(&mut self, projectile: &P) -> &[Collision<'a, B>]
    where
        P: Projectile<Body = B> + ?Sized;

    /// Bodies touching the disk of `radius` around `center`.
    fn circle(&mut self, center: Vec2, radius: f32) -> &[&'a B];

    /// Bodies touching the annulus between `inner` and `outer`.
    fn ring(&mut self, center: Vec2, inner: f32, outer: f32) -> &[&'a B];

    /// Every body added since the last `clear`, in insertion order.
    fn all(&self) -> &[&'a B];
}

/// Primitive intersection signatures used by the reference [`crate::Collider`].
pub trait NarrowphaseApi {
    // Segments --------------------------------------------------------------

    fn line_segment_aabb(a: Vec2, b: Vec2, aabb_min: Vec2, aabb_max: Vec2) -> Option<SegmentHit>;
    fn line_segment_circle(a: Vec2, b: Vec2, center: Vec2, r: f32) -> Option<SegmentHit>;

    // Points ----------------------------------------------------------------

    fn overlap_point_circle(p: Vec2, c: Vec2, r: f32) -> bool;

    // Rings (inner radius 0 is a plain disk) --------------------------------

    fn ring_circle(ring_c: Vec2, inner: f32, outer: f32, c: Vec2, r: f32) -> bool;
    fn ring_aabb(ring_c: Vec2, inner: f32, outer: f32, box_c: Vec2, box_h: Vec2) -> bool;
}
