//! Region availability oracle - the interface to the host's world loader.
//!
//! The oracle answers two questions per region: is it fully simulatable
//! right now, and if not, what archived height data exists for it. Fetching
//! must resolve synchronously within the tick; a decision is never committed
//! against an unresolved fetch.

use crate::heightmap::HeightField;
use crate::region::RegionId;
use bevy_ecs::prelude::*;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// Failure retrieving archived height data for a region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Underlying storage reported an I/O failure.
    Io(String),
    /// Retrieval did not complete within the tick.
    Timeout,
    /// Retrieval was interrupted by the host.
    Interrupted,
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Io(msg) => write!(f, "height data read failed: {}", msg),
            FetchError::Timeout => write!(f, "height data fetch timed out"),
            FetchError::Interrupted => write!(f, "height data fetch interrupted"),
        }
    }
}

impl std::error::Error for FetchError {}

/// Availability and archived-data queries for regions.
pub trait RegionOracle {
    /// Whether the region is fully simulatable this tick.
    fn is_active(&self, region: RegionId) -> bool;

    /// Best-effort retrieval of archived height data for a region.
    /// `Ok(None)` means the region has never been generated.
    fn fetch_height_field(&self, region: RegionId) -> Result<Option<HeightField>, FetchError>;
}

/// Resource wrapper handing shared oracle access to ECS systems.
#[derive(Resource, Clone)]
pub struct OracleResource(pub Arc<dyn RegionOracle + Send + Sync>);

impl OracleResource {
    pub fn new(oracle: Arc<dyn RegionOracle + Send + Sync>) -> Self {
        Self(oracle)
    }
}

/// In-memory oracle with scripted responses.
///
/// Used by the tests and the demo; also a reasonable starting point for
/// hosts that keep their archive in memory.
#[derive(Debug, Default)]
pub struct MemoryOracle {
    active: HashSet<RegionId>,
    fields: HashMap<RegionId, HeightField>,
    failing: HashSet<RegionId>,
}

impl MemoryOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a region as fully simulatable.
    pub fn set_active(&mut self, region: RegionId, active: bool) {
        if active {
            self.active.insert(region);
        } else {
            self.active.remove(&region);
        }
    }

    /// Archive height data for a region.
    pub fn insert_height_field(&mut self, region: RegionId, field: HeightField) {
        self.fields.insert(region, field);
    }

    /// Script a fetch failure for a region.
    pub fn fail_fetch(&mut self, region: RegionId) {
        self.failing.insert(region);
    }
}

impl RegionOracle for MemoryOracle {
    fn is_active(&self, region: RegionId) -> bool {
        self.active.contains(&region)
    }

    fn fetch_height_field(&self, region: RegionId) -> Result<Option<HeightField>, FetchError> {
        if self.failing.contains(&region) {
            return Err(FetchError::Io("scripted failure".to_string()));
        }
        Ok(self.fields.get(&region).cloned())
    }
}
