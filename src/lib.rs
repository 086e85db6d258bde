//! Speculative Ballistic Flight
//!
//! A deterministic, tick-driven simulation core for projectiles flying over
//! a partitioned, lazily-loaded world. Uses `bevy_ecs` for the
//! entity-component-system architecture.
//!
//! The core idea: a projectile's authoritative trajectory is simulated every
//! tick even when the region it is heading into is not loaded. Archived
//! height data is used to prove the trajectory stays above all known
//! terrain, in which case the visible entity is parked in place instead of
//! forcing the region to materialize. When an impact can no longer be ruled
//! out, a prioritized load ticket is issued and the visible entity catches
//! up to the authoritative state.

pub mod api;
pub mod components;
pub mod heightmap;
pub mod oracle;
pub mod region;
pub mod sync;
pub mod trajectory;
pub mod world;

pub use api::SimWorld;
pub use components::*;
pub use heightmap::{DecodeError, HeightField, HeightPacking};
pub use oracle::{FetchError, MemoryOracle, OracleResource, RegionOracle};
pub use region::{LoadPriority, LoadTicket, RegionId, TicketQueue, TicketRequestor};
pub use sync::{advance_flight, flight_sync_system, Removal, RemovedProjectiles, TickDecision};
pub use world::{ProjectileSnapshot, Snapshot};
