//! Horizontal world partitioning and region load tickets.
//!
//! The world is split into square regions addressed by integer coordinates.
//! Regions are the unit of lazy loading: the host materializes them on
//! demand in response to [`LoadTicket`]s.

use crate::components::Vec3;
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// Identifier of one horizontal partition cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegionId {
    pub x: i32,
    pub z: i32,
}

impl RegionId {
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Region containing a world position, for a region edge of
    /// `1 << shift` world units.
    pub fn of(pos: Vec3, shift: u32) -> Self {
        Self {
            x: (pos.x.floor() as i32) >> shift,
            z: (pos.z.floor() as i32) >> shift,
        }
    }
}

/// Priority class of a load ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadPriority {
    /// Low priority: keep a region resident so a parked projectile is not
    /// unloaded. Does not force the region to simulate.
    Hold,
    /// High priority: the region must be fully active before the next tick.
    Activate,
}

/// A bounded-duration request to materialize one region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadTicket {
    pub region: RegionId,
    pub priority: LoadPriority,
    pub duration_ticks: u32,
}

/// Sink for load tickets, implemented by the host's loading subsystem.
/// Requests are fire-and-forget; the core observes no response.
pub trait TicketRequestor {
    fn request_load(&mut self, ticket: LoadTicket);
}

/// Default requestor: collects the tickets issued during a tick for the
/// host to drain after stepping.
#[derive(Resource, Debug, Default)]
pub struct TicketQueue {
    tickets: Vec<LoadTicket>,
}

impl TicketQueue {
    pub fn drain(&mut self) -> Vec<LoadTicket> {
        std::mem::take(&mut self.tickets)
    }

    pub fn len(&self) -> usize {
        self.tickets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty()
    }
}

impl TicketRequestor for TicketQueue {
    fn request_load(&mut self, ticket: LoadTicket) {
        self.tickets.push(ticket);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_of_floors_and_shifts() {
        let shift = 4;
        assert_eq!(RegionId::of(Vec3::new(0.0, 50.0, 0.0), shift), RegionId::new(0, 0));
        assert_eq!(RegionId::of(Vec3::new(15.9, 0.0, 15.9), shift), RegionId::new(0, 0));
        assert_eq!(RegionId::of(Vec3::new(16.0, 0.0, 31.5), shift), RegionId::new(1, 1));
        // Arithmetic shift keeps negative coordinates on the negative side.
        assert_eq!(RegionId::of(Vec3::new(-0.5, 0.0, -16.1), shift), RegionId::new(-1, -2));
    }

    #[test]
    fn test_region_of_is_deterministic() {
        let p = Vec3::new(123.456, 80.0, -77.9);
        assert_eq!(RegionId::of(p, 4), RegionId::of(p, 4));
    }

    #[test]
    fn test_ticket_queue_collects_and_drains() {
        let mut queue = TicketQueue::default();
        queue.request_load(LoadTicket {
            region: RegionId::new(2, -3),
            priority: LoadPriority::Activate,
            duration_ticks: 2,
        });
        assert_eq!(queue.len(), 1);

        let drained = queue.drain();
        assert_eq!(drained.len(), 1);
        assert_eq!(drained[0].region, RegionId::new(2, -3));
        assert!(queue.is_empty());
    }
}
