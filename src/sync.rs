//! Synchronization state machine - the per-tick flight decision.
//!
//! Each tick a projectile's authoritative state is stepped forward, the
//! destination region is classified, and the visible entity is either
//! committed to the stepped state or frozen in place ("parked") while the
//! authoritative state runs ahead unobserved. Parking is only allowed when
//! archived height data proves the trajectory stays above every known
//! obstruction; absent, malformed, or unfetchable data always forces a
//! region load instead.

use crate::components::{FlightState, Position, ProjectileId, SimConfig, SyncState, Vec3, Velocity};
use crate::heightmap;
use crate::oracle::{OracleResource, RegionOracle};
use crate::region::{LoadPriority, LoadTicket, RegionId, TicketQueue, TicketRequestor};
use crate::trajectory;
use bevy_ecs::prelude::*;
use log::{trace, warn};
use serde::{Deserialize, Serialize};

/// Outcome of one tick for one projectile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickDecision {
    /// Write the stepped authoritative state to the visible entity.
    Commit { pos: Vec3, vel: Vec3 },
    /// Freeze the visible entity at `pos` with zero velocity.
    Park { pos: Vec3 },
    /// The trajectory crossed the world floor; delete the entity.
    Remove { last_real_pos: Vec3 },
}

/// Highest known obstruction over a pair of regions.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Obstruction {
    /// Every consulted region had decodable data; the trajectory may be
    /// proven clear against this height.
    Known(f64),
    /// At least one consulted region had no usable data. Never safe to
    /// skip; the load must be forced.
    Unknown,
}

/// Advance one projectile by one tick.
///
/// `visible_pos`/`visible_vel` are the entity state the host currently
/// shows; the returned decision tells the host what to write back. The
/// host calls this exactly once per entity per tick.
pub fn advance_flight(
    cfg: &SimConfig,
    oracle: &dyn RegionOracle,
    tickets: &mut dyn TicketRequestor,
    visible_pos: Vec3,
    visible_vel: Vec3,
    flight: &mut FlightState,
) -> TickDecision {
    // A synced entity may have been displaced by the host (collision
    // response, teleport); absorb that before stepping.
    if flight.is_synced() {
        flight.real_pos = visible_pos;
        flight.real_vel = visible_vel;
    }

    let (next_pos, next_vel) = trajectory::step(flight.real_pos, flight.real_vel, cfg);

    trace!(
        "flight tick: visible=({:.2},{:.2},{:.2}) real=({:.2},{:.2},{:.2}) next=({:.2},{:.2},{:.2})",
        visible_pos.x, visible_pos.y, visible_pos.z,
        flight.real_pos.x, flight.real_pos.y, flight.real_pos.z,
        next_pos.x, next_pos.y, next_pos.z,
    );

    // Terminal: no commit, no tickets, no further state transitions.
    if next_pos.y <= cfg.world_floor {
        return TickDecision::Remove {
            last_real_pos: flight.real_pos,
        };
    }

    let curr_region = RegionId::of(visible_pos, cfg.region_shift);
    let next_region = RegionId::of(next_pos, cfg.region_shift);

    let decision = if flight.is_synced() && oracle.is_active(next_region) {
        // Fast path: destination simulates normally this tick.
        TickDecision::Commit {
            pos: next_pos,
            vel: next_vel,
        }
    } else {
        // Either the entity is already parked or it is about to enter a
        // region that cannot simulate it. Both the occupied and the
        // destination cell may hold terrain relevant to an imminent
        // impact.
        let obstruction = combine(
            obstruction_of(cfg, oracle, curr_region),
            obstruction_of(cfg, oracle, next_region),
        );

        if clear_of(obstruction, flight.real_pos, next_pos, next_vel, cfg) {
            // Safely above everything on record: hold the entity where it
            // is and keep only its own region resident.
            tickets.request_load(LoadTicket {
                region: curr_region,
                priority: LoadPriority::Hold,
                duration_ticks: cfg.hold_ticket_ticks,
            });
            flight.state = SyncState::Parked;
            TickDecision::Park { pos: visible_pos }
        } else {
            // Impact is imminent or unprovable: force the destination to
            // materialize and catch the visible entity up to the
            // authoritative trajectory.
            tickets.request_load(LoadTicket {
                region: next_region,
                priority: LoadPriority::Activate,
                duration_ticks: cfg.activate_ticket_ticks,
            });
            flight.state = SyncState::Synced;
            TickDecision::Commit {
                pos: next_pos,
                vel: next_vel,
            }
        }
    };

    // The authoritative simulation never pauses, parked or not.
    flight.real_pos = next_pos;
    flight.real_vel = next_vel;

    decision
}

/// True when the current, next, and projected look-ahead altitudes are all
/// above the known obstruction. `Unknown` is never clear.
fn clear_of(
    obstruction: Obstruction,
    real_pos: Vec3,
    next_pos: Vec3,
    next_vel: Vec3,
    cfg: &SimConfig,
) -> bool {
    let height = match obstruction {
        Obstruction::Known(h) => h,
        Obstruction::Unknown => return false,
    };

    if real_pos.y <= height || next_pos.y <= height {
        return false;
    }
    // Look-ahead margin: project further positions at the next velocity so
    // the decision does not flip-flop right at the point of impact.
    let mut projected = next_pos;
    for _ in 0..cfg.lookahead_steps {
        projected = projected.add(next_vel);
        if projected.y <= height {
            return false;
        }
    }
    true
}

/// Highest obstruction on record for one region, fail-safe.
fn obstruction_of(cfg: &SimConfig, oracle: &dyn RegionOracle, region: RegionId) -> Obstruction {
    match oracle.fetch_height_field(region) {
        Ok(Some(field)) => match heightmap::highest_obstruction(&field, cfg.packing) {
            Ok(raw) => {
                Obstruction::Known(f64::from(raw as i32 + cfg.height_origin_offset))
            }
            Err(err) => {
                warn!("region ({},{}): {}; treating as unsafe", region.x, region.z, err);
                Obstruction::Unknown
            }
        },
        // Never generated: undiscovered terrain cannot be treated as
        // bottomless air.
        Ok(None) => Obstruction::Unknown,
        Err(err) => {
            warn!("region ({},{}): {}; treating as unsafe", region.x, region.z, err);
            Obstruction::Unknown
        }
    }
}

fn combine(a: Obstruction, b: Obstruction) -> Obstruction {
    match (a, b) {
        (Obstruction::Known(x), Obstruction::Known(y)) => Obstruction::Known(x.max(y)),
        _ => Obstruction::Unknown,
    }
}

/// A projectile removed after crossing the world floor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Removal {
    pub id: ProjectileId,
    pub last_real_pos: Vec3,
}

/// Removals accumulated since the last snapshot.
#[derive(Resource, Debug, Default)]
pub struct RemovedProjectiles(pub Vec<Removal>);

/// System running the state machine for every projectile once per tick.
pub fn flight_sync_system(
    cfg: Res<SimConfig>,
    oracle: Res<OracleResource>,
    mut tickets: ResMut<TicketQueue>,
    mut removed: ResMut<RemovedProjectiles>,
    mut commands: Commands,
    mut query: Query<(Entity, &ProjectileId, &mut Position, &mut Velocity, &mut FlightState)>,
) {
    for (entity, id, mut pos, mut vel, mut flight) in query.iter_mut() {
        let decision = advance_flight(
            &cfg,
            oracle.0.as_ref(),
            &mut *tickets,
            pos.0,
            vel.0,
            &mut flight,
        );
        match decision {
            TickDecision::Commit { pos: p, vel: v } => {
                pos.0 = p;
                vel.0 = v;
            }
            TickDecision::Park { pos: p } => {
                pos.0 = p;
                vel.0 = Vec3::ZERO;
            }
            TickDecision::Remove { last_real_pos } => {
                removed.0.push(Removal {
                    id: *id,
                    last_real_pos,
                });
                commands.entity(entity).despawn();
            }
        }
    }
}
