//! ECS components and resources for the flight simulation.
//!
//! Components are pure data containers attached to entities.
//! The per-tick logic lives in `sync::flight_sync_system`.

use crate::heightmap::HeightPacking;
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

// ============================================================================
// MATH
// ============================================================================

/// 3D position or velocity (x = east/west, y = up/down, z = north/south).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn add(self, other: Vec3) -> Vec3 {
        Vec3::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }

    pub fn scale(self, factor: f64) -> Vec3 {
        Vec3::new(self.x * factor, self.y * factor, self.z * factor)
    }
}

// ============================================================================
// SPATIAL COMPONENTS
// ============================================================================

/// Externally visible position of a projectile.
///
/// This is the state the host renders and collides against. While the
/// projectile is parked it is frozen; the authoritative state keeps
/// advancing inside [`FlightState`].
#[derive(Component, Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Position(pub Vec3);

/// Externally visible velocity of a projectile. Exactly zero while parked.
#[derive(Component, Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Velocity(pub Vec3);

// ============================================================================
// IDENTITY
// ============================================================================

/// Unique identifier for a projectile, assigned by the host at spawn.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProjectileId(pub u32);

// ============================================================================
// FLIGHT STATE
// ============================================================================

/// Synchronization state of a projectile's visible representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncState {
    /// Visible state mirrors the authoritative simulation.
    Synced,
    /// Visible state is frozen; the authoritative simulation runs ahead.
    Parked,
}

/// Authoritative flight state owned by one projectile.
///
/// `real_pos`/`real_vel` advance every tick regardless of sync status.
/// When `state == Synced` they are reseeded from the visible state at the
/// start of the tick, absorbing any displacement the host applied outside
/// this core.
#[derive(Component, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FlightState {
    pub state: SyncState,
    pub real_pos: Vec3,
    pub real_vel: Vec3,
}

impl FlightState {
    /// State for a freshly launched projectile.
    pub fn launched(pos: Vec3, vel: Vec3) -> Self {
        Self {
            state: SyncState::Synced,
            real_pos: pos,
            real_vel: vel,
        }
    }

    pub fn is_synced(&self) -> bool {
        self.state == SyncState::Synced
    }
}

// ============================================================================
// RESOURCES
// ============================================================================

/// Simulation configuration.
#[derive(Resource, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SimConfig {
    /// Velocity retained per tick (< 1).
    pub drag: f64,
    /// Downward acceleration per tick.
    pub gravity: f64,
    /// log2 of the region edge length (edge 16 => shift 4).
    pub region_shift: u32,
    /// Projectiles whose next altitude crosses this are removed.
    pub world_floor: f64,
    /// Additive offset for worlds whose vertical range does not start at 0.
    pub height_origin_offset: i32,
    /// Extra projected steps in the park condition beyond the current and
    /// next altitude. 1 is the converged three-term check; 0 reproduces the
    /// earlier two-term variants.
    pub lookahead_steps: u32,
    /// Height field packing scheme expected from the oracle.
    pub packing: HeightPacking,
    /// Duration of the low-priority ticket that keeps a parked projectile's
    /// own region resident.
    pub hold_ticket_ticks: u32,
    /// Duration of the ticket that must make the destination region active
    /// before the following tick.
    pub activate_ticket_ticks: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            drag: 0.99,
            gravity: 0.03,
            region_shift: 4,
            world_floor: 0.0,
            height_origin_offset: 0,
            lookahead_steps: 1,
            packing: HeightPacking::Packed9x7,
            hold_ticket_ticks: 2,
            activate_ticket_ticks: 2,
        }
    }
}

impl SimConfig {
    /// Region edge length in world units.
    pub fn region_edge(&self) -> i32 {
        1 << self.region_shift
    }
}

/// Current simulation tick number.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct SimTick(pub u64);

impl SimTick {
    pub fn increment(&mut self) {
        self.0 += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec3_arithmetic() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(0.5, -1.0, 2.0);
        assert_eq!(a.add(b), Vec3::new(1.5, 1.0, 5.0));
        assert_eq!(a.scale(2.0), Vec3::new(2.0, 4.0, 6.0));
    }

    #[test]
    fn test_launched_state_is_synced() {
        let fs = FlightState::launched(Vec3::new(0.0, 100.0, 0.0), Vec3::new(0.0, -1.0, 0.0));
        assert!(fs.is_synced());
        assert_eq!(fs.real_pos.y, 100.0);
        assert_eq!(fs.real_vel.y, -1.0);
    }

    #[test]
    fn test_default_config() {
        let cfg = SimConfig::default();
        assert_eq!(cfg.region_edge(), 16);
        assert!(cfg.drag < 1.0);
        assert!(cfg.gravity > 0.0);
    }
}
