//! Serializable snapshots of the simulation state.
//!
//! Snapshots expose the visible state the host should render, plus the
//! authoritative state for diagnostics (a parked projectile's real
//! trajectory keeps moving even though its visible position does not).

use crate::components::*;
use crate::sync::Removal;
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// One projectile's state at snapshot time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectileSnapshot {
    pub id: u32,
    pub state: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub vx: f64,
    pub vy: f64,
    pub vz: f64,
    pub real_x: f64,
    pub real_y: f64,
    pub real_z: f64,
}

/// Complete simulation state snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    /// Current simulation tick.
    pub tick: u64,
    /// All live projectiles.
    pub projectiles: Vec<ProjectileSnapshot>,
    /// Projectiles removed since the previous snapshot.
    pub removed: Vec<Removal>,
}

impl Snapshot {
    /// Create a snapshot from the ECS world.
    pub fn from_world(world: &mut World) -> Self {
        let tick = world.get_resource::<SimTick>().map(|t| t.0).unwrap_or(0);
        let mut projectiles = Vec::new();

        let mut query = world.query::<(&ProjectileId, &Position, &Velocity, &FlightState)>();
        for (id, pos, vel, flight) in query.iter(world) {
            let state = match flight.state {
                SyncState::Synced => "Synced",
                SyncState::Parked => "Parked",
            };
            projectiles.push(ProjectileSnapshot {
                id: id.0,
                state: state.to_string(),
                x: pos.0.x,
                y: pos.0.y,
                z: pos.0.z,
                vx: vel.0.x,
                vy: vel.0.y,
                vz: vel.0.z,
                real_x: flight.real_pos.x,
                real_y: flight.real_pos.y,
                real_z: flight.real_pos.z,
            });
        }

        Self {
            tick,
            projectiles,
            removed: Vec::new(),
        }
    }

    /// Serialize snapshot to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize snapshot to pretty JSON string.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
