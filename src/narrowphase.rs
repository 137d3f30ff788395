use glam::Vec2;

use crate::api::NarrowphaseApi;
use crate::types::*;

/// Exact primitive tests backing [`crate::Collider`].
pub struct Narrowphase;

impl NarrowphaseApi for Narrowphase {
    fn line_segment_aabb(a: Vec2, b: Vec2, aabb_min: Vec2, aabb_max: Vec2) -> Option<SegmentHit> {
        let d = b - a;
        // Slab method clamped to the segment [0,1]
        let mut tmin = 0.0;
        let mut tmax = 1.0;

        // X axis
        if d.x.abs() < f32::EPSILON {
            if a.x < aabb_min.x || a.x > aabb_max.x {
                return None;
            }
        } else {
            let inv = 1.0 / d.x;
            let mut t1 = (aabb_min.x - a.x) * inv;
            let mut t2 = (aabb_max.x - a.x) * inv;
            if t1 > t2 {
                core::mem::swap(&mut t1, &mut t2);
            }
            tmin = t1.max(tmin);
            if t2 < tmax {
                tmax = t2;
            }
            if tmin > tmax {
                return None;
            }
        }

        // Y axis
        if d.y.abs() < f32::EPSILON {
            if a.y < aabb_min.y || a.y > aabb_max.y {
                return None;
            }
        } else {
            let inv = 1.0 / d.y;
            let mut t1 = (aabb_min.y - a.y) * inv;
            let mut t2 = (aabb_max.y - a.y) * inv;
            if t1 > t2 {
                core::mem::swap(&mut t1, &mut t2);
            }
            tmin = t1.max(tmin);
            if t2 < tmax {
                tmax = t2;
            }
            if tmin > tmax {
                return None;
            }
        }

        // tmin only ever grows from 0, so it is already inside [0,1] here.
        Some(SegmentHit { toi: tmin })
    }

    fn line_segment_circle(a: Vec2, b: Vec2, center: Vec2, r: f32) -> Option<SegmentHit> {
        let m = a - center;
        let ccoef = m.length_squared() - r * r;
        // Starting inside counts as contact at the start point
        if ccoef <= 0.0 {
            return Some(SegmentHit { toi: 0.0 });
        }
        // Solve |a + t d - c|^2 = r^2, t in [0,1]
        let d = b - a;
        let acoef = d.length_squared();
        if acoef == 0.0 {
            return None;
        }
        let bcoef = 2.0 * m.dot(d);
        let disc = bcoef * bcoef - 4.0 * acoef * ccoef;
        if disc < 0.0 {
            return None;
        }
        // Outside the circle the entry root is the smaller one
        let t = (-bcoef - disc.sqrt()) / (2.0 * acoef);
        if !(0.0..=1.0).contains(&t) {
            return None;
        }
        Some(SegmentHit { toi: t })
    }

    fn overlap_point_circle(p: Vec2, c: Vec2, r: f32) -> bool {
        let d = p - c;
        d.length_squared() <= r * r
    }

    fn ring_circle(ring_c: Vec2, inner: f32, outer: f32, c: Vec2, r: f32) -> bool {
        let dist = (c - ring_c).length();
        let nearest = (dist - r).max(0.0);
        let farthest = dist + r;
        nearest <= outer && farthest >= inner
    }

    fn ring_aabb(ring_c: Vec2, inner: f32, outer: f32, box_c: Vec2, box_h: Vec2) -> bool {
        let min = box_c - box_h;
        let max = box_c + box_h;
        let nearest = ring_c.clamp(min, max).distance(ring_c);
        let far_corner = Vec2::new(
            (ring_c.x - min.x).abs().max((ring_c.x - max.x).abs()),
            (ring_c.y - min.y).abs().max((ring_c.y - max.y).abs()),
        );
        nearest <= outer && far_corner.length() >= inner
    }
}
