use glam::Vec2;
use hashgrid::grid::GridSpec;
use hashgrid::*;
use rand::prelude::*;

fn new_set<'a>(cell_size: u32, buckets: u32) -> CollisionSet<'a, Collider> {
    CollisionSet::new(cell_size, buckets, CollisionType::Ship)
}

fn build<'a>(set: &mut CollisionSet<'a, Collider>, bodies: &'a [Collider]) {
    set.clear(0);
    for b in bodies {
        set.add(b);
    }
    set.finish();
}

/// Indices into `bodies` of the returned references, sorted.
fn indices(bodies: &[Collider], hits: &[&Collider]) -> Vec<usize> {
    let mut out: Vec<usize> = hits
        .iter()
        .map(|h| bodies.iter().position(|b| std::ptr::eq(b, *h)).unwrap())
        .collect();
    out.sort_unstable();
    out
}

fn line_indices(bodies: &[Collider], hits: &[Collision<'_, Collider>]) -> Vec<usize> {
    let refs: Vec<&Collider> = hits.iter().map(|c| c.body).collect();
    indices(bodies, &refs)
}

fn random_bodies(rng: &mut StdRng, n: usize, extent: f32) -> Vec<Collider> {
    (0..n)
        .map(|i| {
            let c = Vec2::new(rng.gen_range(-extent..extent), rng.gen_range(-extent..extent));
            match i % 3 {
                0 => Collider::circle(c, rng.gen_range(0.5..40.0)),
                1 => Collider::aabb(c, Vec2::new(rng.gen_range(0.5..30.0), rng.gen_range(0.5..30.0))),
                _ => Collider::point(c),
            }
        })
        .collect()
}

struct Shot<'t> {
    pos: Vec2,
    vel: Vec2,
    faction: Option<Faction>,
    target: Option<&'t Collider>,
    pierce: bool,
}

impl Projectile for Shot<'_> {
    type Body = Collider;

    fn position(&self) -> Vec2 {
        self.pos
    }

    fn velocity(&self) -> Vec2 {
        self.vel
    }

    fn government(&self) -> Option<&Faction> {
        self.faction.as_ref()
    }

    fn target(&self) -> Option<&Collider> {
        self.target
    }

    fn hits_multiple(&self) -> bool {
        self.pierce
    }
}

// --- Lifecycle -------------------------------------------------------------

#[test]
fn test_clear_then_query_is_empty() {
    let mut set = new_set(64, 64);
    set.clear(0);
    assert!(set.all().is_empty());
    assert!(set.circle(Vec2::ZERO, 100.0).is_empty());
    assert!(set.ring(Vec2::ZERO, 10.0, 100.0).is_empty());
    assert!(set.line(Vec2::ZERO, Vec2::new(500.0, 0.0), LineQuery::default()).is_empty());
    set.finish();
    assert!(set.circle(Vec2::ZERO, 100.0).is_empty());
    assert_eq!(set.stats(), SetStats::default());
}

#[test]
fn test_clear_drops_previous_tick() {
    let bodies = vec![Collider::circle(Vec2::ZERO, 5.0)];
    let mut set = new_set(64, 64);
    build(&mut set, &bodies);
    assert_eq!(set.circle(Vec2::ZERO, 1.0).len(), 1);
    set.clear(1);
    assert!(set.circle(Vec2::ZERO, 1.0).is_empty());
    assert!(set.all().is_empty());
    assert_eq!(set.step(), 1);
}

#[test]
fn test_all_returns_every_added_body_in_order() {
    let mut rng = StdRng::seed_from_u64(11);
    let bodies = random_bodies(&mut rng, 57, 2000.0);
    let mut set = new_set(128, 256);
    build(&mut set, &bodies);
    let all = set.all();
    assert_eq!(all.len(), bodies.len());
    for (got, want) in all.iter().zip(&bodies) {
        assert!(std::ptr::eq(*got, want));
    }
    assert_eq!(set.len(), 57);
}

#[test]
fn test_from_config() {
    let cfg = CollisionSetConfig::from_toml_str("cell_size = 100\nbucket_count = 1000\ncollision_type = \"asteroid\"").unwrap();
    let set: CollisionSet<'_, Collider> = CollisionSet::from_config(&cfg).unwrap();
    assert_eq!(set.cell_size(), 64);
    assert_eq!(set.bucket_count(), 512);
    assert_eq!(set.collision_type(), CollisionType::Asteroid);

    let bad = CollisionSetConfig { cell_size: 0, ..Default::default() };
    assert!(matches!(
        CollisionSet::<Collider>::from_config(&bad),
        Err(ConfigError::ZeroCellSize)
    ));
}

// --- Cell indexing -----------------------------------------------------------

#[test]
fn test_power_of_two_coercion() {
    let a = GridSpec::new(100, 1000);
    let b = GridSpec::new(64, 512);
    for y in -50..50 {
        for x in -50..50 {
            assert_eq!(a.bucket(x, y), b.bucket(x, y));
        }
    }
    for v in [-1000.5f32, -64.0, -0.1, 0.0, 63.0, 64.0, 12345.6] {
        assert_eq!(a.cell_coord(v), b.cell_coord(v));
    }

    let mut rng = StdRng::seed_from_u64(5);
    let bodies = random_bodies(&mut rng, 200, 3000.0);
    let mut odd = new_set(100, 1000);
    let mut pow = new_set(64, 512);
    build(&mut odd, &bodies);
    build(&mut pow, &bodies);
    assert_eq!(odd.stats(), pow.stats());
    let c = Vec2::new(120.0, -300.0);
    let x = indices(&bodies, odd.circle(c, 700.0));
    let y = indices(&bodies, pow.circle(c, 700.0));
    assert_eq!(x, y);
}

// --- Scenarios -----------------------------------------------------------

#[test]
fn test_two_objects_one_cell() {
    let bodies = vec![
        Collider::circle(Vec2::new(20.0, 20.0), 4.0),
        Collider::circle(Vec2::new(40.0, 40.0), 4.0),
    ];
    let mut set = new_set(64, 64);
    build(&mut set, &bodies);
    assert_eq!(set.stats().entries, 2);
    assert_eq!(indices(&bodies, set.circle(Vec2::new(30.0, 30.0), 20.0)), vec![0, 1]);
    assert!(set.ring(Vec2::new(30.0, 30.0), 0.0, 0.0).is_empty());
    assert!(set.ring(Vec2::new(20.0, 20.0), 0.0, 0.0).is_empty());
    assert!(set.circle(Vec2::new(30.0, 30.0), -5.0).is_empty());
}

#[test]
fn test_solid_sets_keep_closest_hit() {
    let bodies = vec![
        Collider::circle(Vec2::new(300.0, 0.0), 10.0),
        Collider::circle(Vec2::new(100.0, 0.0), 10.0),
    ];
    let from = Vec2::ZERO;
    let to = Vec2::new(500.0, 0.0);
    for ty in [CollisionType::Asteroid, CollisionType::Minable] {
        let mut set: CollisionSet<'_, Collider> = CollisionSet::new(64, 256, ty);
        build(&mut set, &bodies);
        // Asking for every hit still stops at the first rock
        let hits = set.line(from, to, LineQuery::default());
        assert_eq!(hits.len(), 1);
        assert!(std::ptr::eq(hits[0].body, &bodies[1]));
        assert!((hits[0].range - 90.0 / 500.0).abs() < 1e-5);
        assert_eq!(hits[0].collision_type, ty);
    }

    let mut ships = new_set(64, 256);
    build(&mut ships, &bodies);
    assert_eq!(ships.line(from, to, LineQuery::default()).len(), 2);
}

#[test]
fn test_line_is_clamped_to_max_velocity() {
    let bodies = vec![
        Collider::circle(Vec2::new(400_000.0, 0.0), 10.0),
        Collider::circle(Vec2::new(1_000_000.0, 0.0), 10.0),
    ];
    let mut set = new_set(256, 1024);
    build(&mut set, &bodies);
    let hits = set.line(Vec2::ZERO, Vec2::new(2_000_000.0, 0.0), LineQuery::default());
    assert_eq!(line_indices(&bodies, hits), vec![0]);
}

#[test]
fn test_line_through_distant_objects() {
    let bodies = vec![
        Collider::circle(Vec2::new(300.0, 0.0), 5.0),
        Collider::circle(Vec2::new(50.0, 0.0), 5.0),
        Collider::aabb(Vec2::new(150.0, 0.0), Vec2::splat(5.0)),
    ];
    let mut set = new_set(16, 256);
    build(&mut set, &bodies);

    let from = Vec2::ZERO;
    let to = Vec2::new(400.0, 0.0);
    let hits = set.line(from, to, LineQuery::default());
    assert_eq!(line_indices(&bodies, hits), vec![0, 1, 2]);

    let hits = set.line(from, to, LineQuery::closest());
    assert_eq!(hits.len(), 1);
    assert!(std::ptr::eq(hits[0].body, &bodies[1]));
    assert!((hits[0].range - 45.0 / 400.0).abs() < 1e-5);
    assert_eq!(hits[0].collision_type, CollisionType::Ship);

    // Reversed direction: the far body becomes the closest
    let hits = set.line(to, from, LineQuery::closest());
    assert_eq!(hits.len(), 1);
    assert!(std::ptr::eq(hits[0].body, &bodies[0]));
}

#[test]
fn test_line_in_negative_quadrant_and_diagonal() {
    let bodies = vec![
        Collider::circle(Vec2::new(-100.0, -100.0), 3.0),
        Collider::circle(Vec2::new(-200.0, -200.0), 3.0),
        Collider::circle(Vec2::new(-200.0, -100.0), 3.0),
    ];
    let mut set = new_set(32, 128);
    build(&mut set, &bodies);
    let hits = set.line(Vec2::new(-5.0, -5.0), Vec2::new(-250.0, -250.0), LineQuery::default());
    assert_eq!(line_indices(&bodies, hits), vec![0, 1]);
    // Segment entirely inside one cell
    let hits = set.line(Vec2::new(-101.0, -99.0), Vec2::new(-99.0, -101.0), LineQuery::default());
    assert_eq!(line_indices(&bodies, hits), vec![0]);
    assert_eq!(hits[0].range, 0.0);
}

#[test]
fn test_wraparound_aliasing() {
    // A single bucket: every cell aliases every other cell
    let bodies = vec![
        Collider::circle(Vec2::new(8.0, 8.0), 2.0),
        Collider::circle(Vec2::new(10_008.0, 8.0), 2.0),
        Collider::circle(Vec2::new(8.0, -20_008.0), 2.0),
    ];
    let mut set = new_set(16, 1);
    build(&mut set, &bodies);
    assert_eq!(set.stats().occupied_buckets, 1);
    assert_eq!(indices(&bodies, set.circle(Vec2::new(8.0, 8.0), 4.0)), vec![0]);
    let hits = set.line(Vec2::new(0.0, 8.0), Vec2::new(30.0, 8.0), LineQuery::default());
    assert_eq!(line_indices(&bodies, hits), vec![0]);
    assert_eq!(indices(&bodies, set.ring(Vec2::new(10_008.0, 8.0), 0.0, 10.0)), vec![1]);
}

#[test]
fn test_large_body_reported_once() {
    let bodies = vec![
        Collider::circle(Vec2::ZERO, 200.0),
        Collider::aabb(Vec2::new(50.0, 50.0), Vec2::new(150.0, 10.0)),
    ];
    for buckets in [1, 4, 4096] {
        let mut set = new_set(8, buckets);
        build(&mut set, &bodies);
        assert!(set.stats().entries > 100);
        let got = set.circle(Vec2::new(10.0, 10.0), 150.0);
        assert_eq!(got.len(), 2);
        assert_eq!(indices(&bodies, got), vec![0, 1]);
        let hits = set.line(Vec2::new(-300.0, 50.0), Vec2::new(300.0, 50.0), LineQuery::default());
        assert_eq!(hits.len(), 2);
        assert_eq!(line_indices(&bodies, hits), vec![0, 1]);
    }
}

#[test]
fn test_ring_excludes_hole() {
    let bodies = vec![
        Collider::circle(Vec2::ZERO, 2.0),
        Collider::circle(Vec2::new(50.0, 0.0), 2.0),
        Collider::aabb(Vec2::new(0.0, 99.0), Vec2::splat(2.0)),
        Collider::point(Vec2::new(0.0, -150.0)),
    ];
    let mut set = new_set(32, 64);
    build(&mut set, &bodies);
    assert_eq!(indices(&bodies, set.ring(Vec2::ZERO, 40.0, 100.0)), vec![1, 2]);
    assert_eq!(indices(&bodies, set.ring(Vec2::ZERO, 0.0, 100.0)), vec![0, 1, 2]);
    assert!(set.ring(Vec2::ZERO, 100.0, 40.0).is_empty());
}

// --- Filters ---------------------------------------------------------------

#[test]
fn test_faction_and_target_filters() {
    let red = Faction::simple(1, 2);
    let blue = Faction::simple(2, 0);
    let green = Faction::simple(4, 0);
    let bodies = vec![
        Collider::circle(Vec2::new(10.0, 0.0), 2.0).with_faction(blue),
        Collider::circle(Vec2::new(20.0, 0.0), 2.0).with_faction(green),
        Collider::circle(Vec2::new(30.0, 0.0), 2.0),
        Collider::circle(Vec2::new(40.0, 0.0), 2.0).with_faction(green),
        Collider::circle(Vec2::new(50.0, 0.0), 2.0).with_faction(red),
    ];
    let mut set = new_set(16, 64);
    build(&mut set, &bodies);
    let from = Vec2::ZERO;
    let to = Vec2::new(60.0, 0.0);

    let q = LineQuery::<Collider>::default().with_faction(&red);
    assert_eq!(line_indices(&bodies, set.line(from, to, q)), vec![0, 2]);

    let q = LineQuery::<Collider>::default().with_faction(&red).with_target(&bodies[3]);
    assert_eq!(line_indices(&bodies, set.line(from, to, q)), vec![0, 2, 3]);

    // Closest eligible hit skips the neutral body in front
    let q = LineQuery::<Collider>::closest().with_faction(&green);
    assert_eq!(line_indices(&bodies, set.line(from, to, q)), vec![2]);

    assert_eq!(set.line(from, to, LineQuery::default()).len(), 5);
}

#[test]
fn test_projectile_query() {
    let red = Faction::simple(1, 2);
    let blue = Faction::simple(2, 0);
    let bodies = vec![
        Collider::circle(Vec2::new(100.0, 100.0), 5.0).with_faction(blue),
        Collider::circle(Vec2::new(100.0, 130.0), 5.0).with_faction(blue),
        Collider::circle(Vec2::new(100.0, 160.0), 5.0).with_faction(red),
    ];
    let mut set = new_set(32, 64);
    build(&mut set, &bodies);

    let mut shot = Shot {
        pos: Vec2::new(100.0, 80.0),
        vel: Vec2::new(0.0, 100.0),
        faction: Some(red),
        target: None,
        pierce: true,
    };
    assert_eq!(line_indices(&bodies, set.line_projectile(&shot)), vec![0, 1]);

    shot.pierce = false;
    let hits = set.line_projectile(&shot);
    assert_eq!(hits.len(), 1);
    assert!(std::ptr::eq(hits[0].body, &bodies[0]));
    assert!((hits[0].range - 0.15).abs() < 1e-5);

    // Aimed at a friendly: the target is eligible despite the faction filter
    shot.pierce = true;
    shot.target = Some(&bodies[2]);
    assert_eq!(line_indices(&bodies, set.line_projectile(&shot)), vec![0, 1, 2]);

    // No government on the shot: everything is fair game
    shot.faction = None;
    shot.target = None;
    assert_eq!(set.line_projectile(&shot).len(), 3);
}

#[test]
fn test_results_are_overwritten_per_query() {
    let bodies = vec![
        Collider::circle(Vec2::ZERO, 1.0),
        Collider::circle(Vec2::new(100.0, 0.0), 1.0),
    ];
    let mut set = new_set(16, 64);
    build(&mut set, &bodies);
    assert_eq!(set.circle(Vec2::ZERO, 5.0).len(), 1);
    assert_eq!(set.circle(Vec2::ZERO, 200.0).len(), 2);
    assert_eq!(set.circle(Vec2::new(100.0, 0.0), 5.0).len(), 1);
    // Many queries in a row keep deduplicating correctly
    for _ in 0..1000 {
        assert_eq!(set.circle(Vec2::new(50.0, 0.0), 60.0).len(), 2);
    }
}

// --- Randomized cross-checks against brute force ---------------------------

#[test]
fn test_random_circles_match_brute_force() {
    let mut rng = StdRng::seed_from_u64(42);
    for &(cell, buckets) in &[(16u32, 16u32), (64, 1024), (256, 2), (100, 1000)] {
        let bodies = random_bodies(&mut rng, 300, 1500.0);
        let mut set = new_set(cell, buckets);
        build(&mut set, &bodies);
        for _ in 0..50 {
            let c = Vec2::new(rng.gen_range(-1600.0..1600.0), rng.gen_range(-1600.0..1600.0));
            let inner = rng.gen_range(0.0..200.0);
            let outer = inner + rng.gen_range(1.0..400.0);

            let want: Vec<usize> = (0..bodies.len())
                .filter(|&i| {
                    let b = &bodies[i];
                    let d = b.position().distance(c);
                    (d <= outer) || b.within_circle(c, outer, 0)
                })
                .collect();
            let got = set.circle(c, outer);
            assert_eq!(got.len(), want.len(), "duplicate or missing circle hits");
            assert_eq!(indices(&bodies, got), want);

            let want: Vec<usize> = (0..bodies.len())
                .filter(|&i| {
                    let b = &bodies[i];
                    let d = b.position().distance(c);
                    (d >= inner && d <= outer) || b.within_ring(c, inner, outer, 0)
                })
                .collect();
            let got = set.ring(c, inner, outer);
            assert_eq!(got.len(), want.len(), "duplicate or missing ring hits");
            assert_eq!(indices(&bodies, got), want);
        }
    }
}

#[test]
fn test_random_lines_match_brute_force() {
    let mut rng = StdRng::seed_from_u64(1234);
    for &(cell, buckets) in &[(16u32, 64u32), (64, 4096), (32, 1)] {
        let bodies = random_bodies(&mut rng, 250, 1000.0);
        let mut set = new_set(cell, buckets);
        build(&mut set, &bodies);
        for _ in 0..80 {
            let from = Vec2::new(rng.gen_range(-1100.0..1100.0), rng.gen_range(-1100.0..1100.0));
            let to = Vec2::new(rng.gen_range(-1100.0..1100.0), rng.gen_range(-1100.0..1100.0));
            let delta = to - from;

            let ranges: Vec<(usize, f32)> = bodies
                .iter()
                .enumerate()
                .filter_map(|(i, b)| b.line_intersection(from, delta, 0).map(|r| (i, r)))
                .collect();
            let want: Vec<usize> = ranges.iter().map(|&(i, _)| i).collect();

            let got = set.line(from, to, LineQuery::default());
            assert_eq!(got.len(), want.len(), "duplicate or missing line hits");
            assert_eq!(line_indices(&bodies, got), want);

            let got = set.line(from, to, LineQuery::closest());
            match ranges.iter().map(|&(_, r)| r).reduce(f32::min) {
                None => assert!(got.is_empty()),
                Some(min) => {
                    assert_eq!(got.len(), 1);
                    assert_eq!(got[0].range, min);
                }
            }
        }
    }
}
