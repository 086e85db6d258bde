//! Public API for the simulation.
//!
//! `SimWorld` owns the ECS world and schedule and provides the host-facing
//! surface: spawn projectiles, step the simulation one tick at a time,
//! drain the load tickets each tick produced, and extract snapshots.
//!
//! ## Tick model
//!
//! The simulation is tick-driven: `step()` runs the synchronization state
//! machine exactly once for every live projectile. The host is expected to
//! call it once per simulation tick and then drain and act on the issued
//! load tickets before the next call.

use crate::components::*;
use crate::oracle::{OracleResource, RegionOracle};
use crate::region::{LoadTicket, TicketQueue};
use crate::sync::{flight_sync_system, RemovedProjectiles};
use crate::world::Snapshot;
use bevy_ecs::prelude::*;
use std::sync::Arc;

/// The main simulation world container.
pub struct SimWorld {
    world: World,
    schedule: Schedule,
}

impl SimWorld {
    /// Create a simulation world backed by the given region oracle.
    pub fn new(oracle: Arc<dyn RegionOracle + Send + Sync>) -> Self {
        Self::with_config(SimConfig::default(), oracle)
    }

    /// Create a simulation world with custom configuration.
    pub fn with_config(config: SimConfig, oracle: Arc<dyn RegionOracle + Send + Sync>) -> Self {
        let mut world = World::new();

        world.insert_resource(config);
        world.insert_resource(SimTick(0));
        world.insert_resource(OracleResource::new(oracle));
        world.insert_resource(TicketQueue::default());
        world.insert_resource(RemovedProjectiles::default());

        let mut schedule = Schedule::default();
        schedule.add_systems(flight_sync_system);

        Self { world, schedule }
    }

    /// Spawn a projectile in the synced state with the given launch state.
    pub fn spawn_projectile(&mut self, id: u32, pos: Vec3, vel: Vec3) {
        self.world.spawn((
            ProjectileId(id),
            Position(pos),
            Velocity(vel),
            FlightState::launched(pos, vel),
        ));
    }

    /// Advance the simulation by one tick.
    pub fn step(&mut self) {
        if let Some(mut tick_res) = self.world.get_resource_mut::<SimTick>() {
            tick_res.increment();
        }
        self.schedule.run(&mut self.world);
    }

    /// Advance the simulation by `n` ticks.
    pub fn step_n(&mut self, n: u64) {
        for _ in 0..n {
            self.step();
        }
    }

    /// Load tickets issued since the last drain, oldest first.
    pub fn drain_tickets(&mut self) -> Vec<LoadTicket> {
        self.world
            .get_resource_mut::<TicketQueue>()
            .map(|mut q| q.drain())
            .unwrap_or_default()
    }

    /// Get a snapshot of the current simulation state.
    ///
    /// Removals accumulated since the previous snapshot are included and
    /// then cleared.
    pub fn snapshot(&mut self) -> Snapshot {
        let mut snapshot = Snapshot::from_world(&mut self.world);
        if let Some(mut removed) = self.world.get_resource_mut::<RemovedProjectiles>() {
            snapshot.removed = std::mem::take(&mut removed.0);
        }
        snapshot
    }

    /// Get the snapshot as a JSON string.
    pub fn snapshot_json(&mut self) -> String {
        self.snapshot().to_json().unwrap_or_else(|_| "{}".to_string())
    }

    /// Get the current tick number.
    pub fn current_tick(&self) -> u64 {
        self.world.get_resource::<SimTick>().map(|t| t.0).unwrap_or(0)
    }

    /// Number of live projectiles.
    pub fn projectile_count(&mut self) -> usize {
        let mut query = self.world.query::<&ProjectileId>();
        query.iter(&self.world).count()
    }

    /// Get direct access to the ECS world (for advanced usage).
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Get mutable access to the ECS world (for advanced usage).
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }
}
