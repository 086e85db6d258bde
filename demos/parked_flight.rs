//! Demonstration of a projectile parking over unloaded terrain.
//!
//! Run with: cargo run --example parked_flight

use ballistic_sim::{HeightField, HeightPacking, MemoryOracle, RegionId, SimWorld, Vec3};
use std::sync::Arc;

fn main() {
    println!("=== Speculative Ballistic Flight Demo ===\n");

    // Archived height data says the terrain below tops out at y=50, but the
    // region itself is not loaded.
    let mut oracle = MemoryOracle::new();
    oracle.insert_height_field(
        RegionId::new(0, 0),
        HeightField::uniform(50, HeightPacking::Packed9x7),
    );

    let mut sim = SimWorld::new(Arc::new(oracle));
    sim.spawn_projectile(1, Vec3::new(0.0, 200.0, 0.0), Vec3::new(0.0, -1.0, 0.0));

    println!("Dropping projectile from y=200 over unloaded terrain (top at y=50)...\n");

    for _ in 0..120 {
        sim.step();
        let tickets = sim.drain_tickets();
        let snapshot = sim.snapshot();

        if let Some(p) = snapshot.projectiles.first() {
            if sim.current_tick() % 10 == 0 || p.state == "Synced" {
                println!(
                    "tick {:3}: [{}] visible y={:6.2}  real y={:6.2}  tickets={}",
                    snapshot.tick,
                    p.state,
                    p.y,
                    p.real_y,
                    tickets
                        .iter()
                        .map(|t| format!("{:?}({},{})", t.priority, t.region.x, t.region.z))
                        .collect::<Vec<_>>()
                        .join(" "),
                );
            }
            if p.state == "Synced" && snapshot.tick > 1 {
                println!("\nProjectile resynced: visible entity caught up to the authoritative trajectory.");
                break;
            }
        }
    }

    println!("\n=== Final State (JSON) ===\n");
    println!("{}", sim.snapshot().to_json_pretty().unwrap());
}
