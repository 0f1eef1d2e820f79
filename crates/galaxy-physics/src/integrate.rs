//! Semi-implicit Euler integration and the reference CPU tick

use crate::forces::accelerations;
use crate::params::PhysicsParams;
use glam::Vec3;

/// Kick then drift: the new velocity is used to advance the position.
#[inline]
pub fn semi_implicit_euler(
    position: &mut Vec3,
    velocity: &mut Vec3,
    acceleration: Vec3,
    delta_time: f32,
) {
    *velocity += acceleration * delta_time;
    *position += *velocity * delta_time;
}

/// Advance every star by one tick, in place.
///
/// All accelerations are computed from the incoming positions before any
/// position is written, so the result does not depend on update order.
/// `scratch` must have the same length as `positions` and `velocities`.
pub fn step(
    positions: &mut [Vec3],
    velocities: &mut [Vec3],
    params: &PhysicsParams,
    scratch: &mut [Vec3],
) {
    assert_eq!(positions.len(), velocities.len());
    assert_eq!(positions.len(), scratch.len());

    accelerations(positions, params, scratch);

    for ((position, velocity), &acceleration) in positions
        .iter_mut()
        .zip(velocities.iter_mut())
        .zip(scratch.iter())
    {
        semi_implicit_euler(position, velocity, acceleration, params.delta_time);
    }
}
