//! Ballistic trajectory stepping - gravity and drag over unit ticks.

use crate::components::{SimConfig, Vec3};

/// Advance a position/velocity pair by one tick.
///
/// The position moves by the current velocity, then drag and gravity are
/// applied to produce the next velocity. Pure arithmetic, no failure modes.
pub fn step(pos: Vec3, vel: Vec3, cfg: &SimConfig) -> (Vec3, Vec3) {
    let next_pos = pos.add(vel);
    let next_vel = vel
        .scale(cfg.drag)
        .add(Vec3::new(0.0, -cfg.gravity, 0.0));
    (next_pos, next_vel)
}
