use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use glam::Vec2;
use tracing::{debug, trace, warn};

use crate::api::{Body, CollisionSetApi, Government, Projectile};
use crate::buckets::{BucketTable, Entry};
use crate::config::{CollisionSetConfig, ConfigError};
use crate::grid::GridSpec;
use crate::seen::SeenTracker;
use crate::types::*;

/// Per-component limit on a segment's displacement. Longer segments are
/// clamped so a runaway projectile cannot walk millions of cells.
pub const MAX_VELOCITY: f32 = 450_000.0;

static CLAMP_WARNED: AtomicBool = AtomicBool::new(false);

/// Spatial-hash collision set holding borrowed bodies of one category.
///
/// Bodies are borrowed for `'a`; [`CollisionSet::recycle`] moves an emptied
/// set to a fresh lifetime so its buffers can be reused on the next tick
/// after the bodies have been mutated.
pub struct CollisionSet<'a, B: ?Sized> {
    collision_type: CollisionType,
    grid: GridSpec,
    step: i32,

    // Tick-local storage
    all: Vec<&'a B>,
    table: BucketTable,
    seen: SeenTracker,

    // Query scratch, overwritten by every query
    circle_result: Vec<&'a B>,
    line_result: Vec<Collision<'a, B>>,
}

impl<B: ?Sized> fmt::Debug for CollisionSet<'_, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollisionSet")
            .field("collision_type", &self.collision_type)
            .field("cell_size", &self.grid.cell_size())
            .field("bucket_count", &self.grid.bucket_count())
            .field("step", &self.step)
            .field("objects", &self.all.len())
            .field("entries", &self.table.sorted().len())
            .finish_non_exhaustive()
    }
}

impl<'a, B: Body + ?Sized + 'a> CollisionSetApi<'a, B> for CollisionSet<'a, B> {
    fn new(cell_size: u32, bucket_count: u32, collision_type: CollisionType) -> Self {
        let grid = GridSpec::new(cell_size, bucket_count);
        Self {
            collision_type,
            grid,
            step: 0,
            all: Vec::new(),
            table: BucketTable::new(grid.bucket_count()),
            seen: SeenTracker::default(),
            circle_result: Vec::new(),
            line_result: Vec::new(),
        }
    }

    fn clear(&mut self, step: i32) {
        self.step = step;
        self.all.clear();
        self.table.clear();
        self.seen.reset(0);
        self.circle_result.clear();
        self.line_result.clear();
    }

    fn add(&mut self, body: &'a B) {
        let seq = self.all.len() as u32;
        let center = body.position();
        let half = body.radius().max(0.0);
        // Unbounded extents would saturate the cell range; such bodies are
        // only reachable through `all`
        if center.is_finite() && half.is_finite() {
            let ((x0, y0), (x1, y1)) = self.grid.cell_range(center, half);
            for y in y0..=y1 {
                for x in x0..=x1 {
                    let bucket = self.grid.bucket(x, y);
                    self.table.push(Entry { seq, bucket, x, y });
                }
            }
        }
        self.all.push(body);
    }

    fn finish(&mut self) {
        self.table.finish();
        self.seen.reset(self.all.len());
        debug!(
            collision_type = ?self.collision_type,
            objects = self.all.len(),
            entries = self.table.sorted().len(),
            occupied_buckets = self.table.occupied_buckets(),
            max_bucket_len = self.table.max_bucket_len(),
            "collision set finished"
        );
    }

    fn line(&mut self, from: Vec2, to: Vec2, query: LineQuery<'_, B>) -> &[Collision<'a, B>] {
        self.line_result.clear();
        if !from.is_finite() || !to.is_finite() {
            return &self.line_result;
        }
        let delta = clamp_segment(to - from);
        let all = query.all && !self.collision_type.single_impact();
        self.seen.begin();

        let cs = f64::from(self.grid.cell_size());
        let mut cell = self.grid.cell_of(from);
        let end = self.grid.cell_of(from + delta);
        let step_x = (end.0 - cell.0).signum();
        let step_y = (end.1 - cell.1).signum();

        // Parametric distance to the next vertical / horizontal cell border
        let first_border = |c: i32, step: i32, origin: f32, d: f32| -> (f64, f64) {
            if step == 0 || d == 0.0 {
                return (f64::INFINITY, f64::INFINITY);
            }
            let border = (f64::from(c) + if step > 0 { 1.0 } else { 0.0 }) * cs;
            let d = f64::from(d);
            ((border - f64::from(origin)) / d, cs / d.abs())
        };
        let (mut t_max_x, t_delta_x) = first_border(cell.0, step_x, from.x, delta.x);
        let (mut t_max_y, t_delta_y) = first_border(cell.1, step_y, from.y, delta.y);

        let mut closest = f32::INFINITY;
        let cells = (i64::from(end.0) - i64::from(cell.0)).abs() + (i64::from(end.1) - i64::from(cell.1)).abs();
        for _ in 0..=cells {
            for e in self.table.bucket(self.grid.bucket(cell.0, cell.1)) {
                // Same bucket but a different (aliased) cell
                if (e.x, e.y) != cell || !self.seen.first_visit(e.seq) {
                    continue;
                }
                let body = self.all[e.seq as usize];
                if !eligible(body, &query) {
                    continue;
                }
                let Some(range) = body.line_intersection(from, delta, self.step) else {
                    continue;
                };
                let hit = Collision { body, collision_type: self.collision_type, range };
                if all {
                    self.line_result.push(hit);
                } else if range < closest {
                    closest = range;
                    self.line_result.clear();
                    self.line_result.push(hit);
                }
            }

            if cell == end {
                break;
            }
            // Bodies first met in later cells cannot start before the next border
            if !all && f64::from(closest) < t_max_x.min(t_max_y) {
                break;
            }
            // Never step past the end cell on either axis
            let advance_x = if cell.0 == end.0 {
                false
            } else if cell.1 == end.1 {
                true
            } else {
                t_max_x < t_max_y
            };
            if advance_x {
                cell.0 += step_x;
                t_max_x += t_delta_x;
            } else {
                cell.1 += step_y;
                t_max_y += t_delta_y;
            }
        }

        trace!(kind = "line", all, hits = self.line_result.len());
        &self.line_result
    }

    fn line_projectile<P>(&mut self, projectile: &P) -> &[Collision<'a, B>]
    where
        P: Projectile<Body = B> + ?Sized,
    {
        let from = projectile.position();
        let query = LineQuery {
            faction: projectile.government(),
            target: projectile.target(),
            all: projectile.hits_multiple(),
        };
        self.line(from, from + projectile.velocity(), query)
    }

    fn circle(&mut self, center: Vec2, radius: f32) -> &[&'a B] {
        self.ring(center, 0.0, radius)
    }

    fn ring(&mut self, center: Vec2, inner: f32, outer: f32) -> &[&'a B] {
        self.circle_result.clear();
        let inner = inner.max(0.0);
        if !center.is_finite() || !outer.is_finite() || !(outer > inner) {
            return &self.circle_result;
        }

        let step = self.step;
        let (lo, hi) = self.grid.cell_range(center, outer);
        self.scan_cells(lo, hi, |body| {
            let dist = body.position().distance(center);
            if dist >= inner && dist <= outer {
                return true;
            }
            if inner == 0.0 {
                body.within_circle(center, outer, step)
            } else {
                body.within_ring(center, inner, outer, step)
            }
        });

        trace!(kind = "ring", inner, outer, hits = self.circle_result.len());
        &self.circle_result
    }

    fn all(&self) -> &[&'a B] {
        &self.all
    }
}

impl<'a, B: Body + ?Sized + 'a> CollisionSet<'a, B> {
    /// Strict construction: rejects sizes that `new` would coerce.
    pub fn from_config(cfg: &CollisionSetConfig) -> Result<Self, ConfigError> {
        cfg.validate()?;
        Ok(<Self as CollisionSetApi<'a, B>>::new(cfg.cell_size, cfg.bucket_count, cfg.collision_type))
    }

    /// Visit each body with an entry in the inclusive cell rectangle
    /// `lo..=hi` once, keeping those accepted by `keep`.
    fn scan_cells(&mut self, lo: (i32, i32), hi: (i32, i32), mut keep: impl FnMut(&B) -> bool) {
        let Self { grid, all, table, seen, circle_result, .. } = self;
        seen.begin();
        let mut visit = |e: &Entry| {
            if seen.first_visit(e.seq) {
                let body = all[e.seq as usize];
                if keep(body) {
                    circle_result.push(body);
                }
            }
        };

        let width = (i64::from(hi.0) - i64::from(lo.0) + 1) as u64;
        let height = (i64::from(hi.1) - i64::from(lo.1) + 1) as u64;
        if width.saturating_mul(height) > table.bucket_count() as u64 {
            // More cells than buckets: one pass over the table is cheaper
            for e in table.sorted() {
                if (lo.0..=hi.0).contains(&e.x) && (lo.1..=hi.1).contains(&e.y) {
                    visit(e);
                }
            }
        } else {
            for y in lo.1..=hi.1 {
                for x in lo.0..=hi.0 {
                    for e in table.bucket(grid.bucket(x, y)) {
                        if e.x == x && e.y == y {
                            visit(e);
                        }
                    }
                }
            }
        }
    }
}

impl<'a, B: ?Sized> CollisionSet<'a, B> {
    /// Number of bodies added since the last clear.
    pub fn len(&self) -> usize {
        self.all.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    /// Step passed to the last clear.
    pub fn step(&self) -> i32 {
        self.step
    }

    pub fn collision_type(&self) -> CollisionType {
        self.collision_type
    }

    /// Effective (power-of-two) cell size.
    pub fn cell_size(&self) -> u32 {
        self.grid.cell_size()
    }

    /// Effective (power-of-two) bucket count.
    pub fn bucket_count(&self) -> usize {
        self.grid.bucket_count()
    }

    /// Return debug/perf stats for the last finish.
    pub fn stats(&self) -> SetStats {
        SetStats {
            objects: self.all.len(),
            entries: self.table.sorted().len(),
            occupied_buckets: self.table.occupied_buckets(),
            max_bucket_len: self.table.max_bucket_len(),
        }
    }

    /// Empty the set and rebind it to a new borrow lifetime, keeping every
    /// allocation.
    pub fn recycle<'b>(mut self) -> CollisionSet<'b, B>
    where
        B: 'b,
    {
        self.table.clear();
        self.seen.reset(0);
        CollisionSet {
            collision_type: self.collision_type,
            grid: self.grid,
            step: self.step,
            all: recycle_vec(self.all),
            table: self.table,
            seen: self.seen,
            circle_result: recycle_vec(self.circle_result),
            line_result: recycle_vec(self.line_result),
        }
    }
}

/// Faction/target rule for segment hits.
fn eligible<B: Body + ?Sized>(body: &B, query: &LineQuery<'_, B>) -> bool {
    if query.target.is_some_and(|t| std::ptr::eq(t, body)) {
        return true;
    }
    match (query.faction, body.government()) {
        (Some(faction), Some(gov)) => faction.is_enemy(gov),
        _ => true,
    }
}

fn clamp_segment(delta: Vec2) -> Vec2 {
    let limit = Vec2::splat(MAX_VELOCITY);
    let clamped = delta.clamp(-limit, limit);
    if clamped != delta && !CLAMP_WARNED.swap(true, Ordering::Relaxed) {
        warn!(
            dx = delta.x,
            dy = delta.y,
            max = MAX_VELOCITY,
            "segment longer than the maximum velocity; clamping (reported once)"
        );
    }
    clamped
}

/// Reuse an emptied vector's allocation for an element type of another lifetime.
fn recycle_vec<T, U>(mut v: Vec<T>) -> Vec<U> {
    v.clear();
    v.into_iter().filter_map(|_| None).collect()
}
