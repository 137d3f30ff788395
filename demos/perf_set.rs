use glam::Vec2;
use hashgrid::*;
use std::time::Instant;

fn lcg(seed: &mut u32) -> u32 {
    *seed = seed.wrapping_mul(1664525).wrapping_add(1013904223);
    *seed
}

fn unit(seed: &mut u32) -> f32 {
    lcg(seed) as f32 / u32::MAX as f32
}

fn main() {
    let n = 20_000usize; // number of bodies
    let mut seed = 1u32;
    let bodies: Vec<Collider> = (0..n)
        .map(|i| {
            let c = Vec2::new(unit(&mut seed) * 40_000.0 - 20_000.0, unit(&mut seed) * 40_000.0 - 20_000.0);
            if i % 2 == 0 {
                Collider::aabb(c, Vec2::splat(unit(&mut seed) * 60.0 + 5.0))
            } else {
                Collider::circle(c, unit(&mut seed) * 60.0 + 5.0)
            }
        })
        .collect();

    let mut set: CollisionSet<'_, Collider> = CollisionSet::new(256, 4096, CollisionType::Ship);
    let t0 = Instant::now();
    set.clear(0);
    for b in &bodies {
        set.add(b);
    }
    set.finish();
    let t_build = t0.elapsed();

    let queries = 10_000;
    let t1 = Instant::now();
    let mut circle_hits = 0usize;
    for _ in 0..queries {
        let c = Vec2::new(unit(&mut seed) * 40_000.0 - 20_000.0, unit(&mut seed) * 40_000.0 - 20_000.0);
        circle_hits += set.circle(c, 500.0).len();
    }
    let t_circle = t1.elapsed();

    let t2 = Instant::now();
    let mut line_hits = 0usize;
    for _ in 0..queries {
        let from = Vec2::new(unit(&mut seed) * 40_000.0 - 20_000.0, unit(&mut seed) * 40_000.0 - 20_000.0);
        let to = from + Vec2::new(unit(&mut seed) * 2_000.0 - 1_000.0, unit(&mut seed) * 2_000.0 - 1_000.0);
        line_hits += set.line(from, to, LineQuery::default()).len();
    }
    let t_line = t2.elapsed();

    let stats = set.stats();
    println!(
        "N={} cell={} buckets={} entries={} occupied={} longest={} build={:?} circle={:?} ({} hits) line={:?} ({} hits)",
        n,
        set.cell_size(),
        set.bucket_count(),
        stats.entries,
        stats.occupied_buckets,
        stats.max_bucket_len,
        t_build,
        t_circle,
        circle_hits,
        t_line,
        line_hits
    );
}
