use glam::Vec2;
use hashgrid::*;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

struct Bolt {
    pos: Vec2,
    vel: Vec2,
    faction: Faction,
}

impl Projectile for Bolt {
    type Body = Collider;

    fn position(&self) -> Vec2 {
        self.pos
    }

    fn velocity(&self) -> Vec2 {
        self.vel
    }

    fn government(&self) -> Option<&Faction> {
        Some(&self.faction)
    }

    fn target(&self) -> Option<&Collider> {
        None
    }

    fn hits_multiple(&self) -> bool {
        false
    }
}

fn main() {
    // RUST_LOG=hashgrid=debug shows the per-finish bucket statistics
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .init();

    let player = Faction::simple(1, 2);
    let pirate = Faction::simple(2, 1);
    let ships = [
        Collider::circle(Vec2::new(200.0, 0.0), 20.0).with_faction(player),
        Collider::circle(Vec2::new(400.0, 10.0), 25.0).with_faction(pirate),
        Collider::aabb(Vec2::new(700.0, -5.0), Vec2::new(40.0, 15.0)).with_faction(pirate),
    ];

    let mut set: CollisionSet<'_, Collider> = CollisionSet::new(256, 64, CollisionType::Ship);
    set.clear(0);
    for ship in &ships {
        set.add(ship);
    }
    set.finish();

    let bolt = Bolt { pos: Vec2::ZERO, vel: Vec2::new(1000.0, 0.0), faction: player };
    match set.line_projectile(&bolt).first() {
        Some(hit) => println!("Bolt hit ship at {:?} after {:.3} of its travel", hit.body.center, hit.range),
        None => println!("No hit"),
    }

    let nearby = set.ring(Vec2::ZERO, 300.0, 800.0);
    println!("{} ship(s) between 300 and 800 units", nearby.len());
}
