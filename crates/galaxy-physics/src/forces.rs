//! Acceleration terms for the galaxy force law
//!
//! NOTE: The GPU compute shader (`galaxy-simulation/src/shaders/nbody.wgsl`)
//! implements the same formulas. Keep the two in sync.

use crate::params::PhysicsParams;
use glam::Vec3;

/// Softened pull of star `j` on star `i` (unit masses)
/// a = (p_j - p_i) / (|p_j - p_i|² + ε)
///
/// Antisymmetric: `pair_acceleration(a, b, ε) == -pair_acceleration(b, a, ε)`.
/// Coincident stars contribute exactly zero.
#[inline]
pub fn pair_acceleration(p_i: Vec3, p_j: Vec3, epsilon: f32) -> Vec3 {
    let r_vec = p_j - p_i;
    r_vec / (r_vec.length_squared() + epsilon)
}

/// Dark-matter halo: a softened point mass sitting at `params.center`
///
/// Not a uniform bias: the pull is `mass * r / (r² + ε)`, so it peaks near
/// `r = √ε`, falls off as `1 / r` further out and vanishes at the center.
pub fn dark_matter_acceleration(position: Vec3, params: &PhysicsParams) -> Vec3 {
    if params.dark_matter_mass == 0.0 {
        return Vec3::ZERO;
    }

    params.dark_matter_mass * pair_acceleration(position, params.center, params.epsilon)
}

/// Dark-energy expansion: outward, growing linearly with distance from the center
pub fn dark_energy_acceleration(position: Vec3, params: &PhysicsParams) -> Vec3 {
    params.dark_energy_acceleration * (position - params.center)
}

/// Total acceleration on star `i`, summing partners in ascending index order
pub fn acceleration_on(i: usize, positions: &[Vec3], params: &PhysicsParams) -> Vec3 {
    let p_i = positions[i];

    let mut acceleration = Vec3::ZERO;
    for (j, &p_j) in positions.iter().enumerate() {
        if j == i {
            continue;
        }
        acceleration += pair_acceleration(p_i, p_j, params.epsilon);
    }

    acceleration + dark_matter_acceleration(p_i, params) + dark_energy_acceleration(p_i, params)
}

/// Fill `out` with the acceleration of every star, all read from the same
/// (previous-tick) positions.
pub fn accelerations(positions: &[Vec3], params: &PhysicsParams, out: &mut [Vec3]) {
    debug_assert_eq!(positions.len(), out.len());

    for (i, acceleration) in out.iter_mut().enumerate() {
        *acceleration = acceleration_on(i, positions, params);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 0.01;

    #[test]
    fn test_pair_is_antisymmetric() {
        let pairs = [
            (Vec3::new(-1.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0)),
            (Vec3::new(0.3, -0.7, 0.25), Vec3::new(-0.11, 0.42, 0.9)),
            (Vec3::new(5.0, 5.0, 5.0), Vec3::new(5.001, 4.999, 5.0)),
        ];

        for (a, b) in pairs {
            let on_a = pair_acceleration(a, b, EPS);
            let on_b = pair_acceleration(b, a, EPS);
            assert!((on_a + on_b).length() <= 1e-6 * on_a.length().max(1.0));
            assert!((on_a.length() - on_b.length()).abs() <= 1e-6);
        }
    }

    #[test]
    fn test_coincident_stars_are_finite() {
        let p = Vec3::new(0.5, 0.5, 0.5);
        let a = pair_acceleration(p, p, EPS);

        assert!(a.is_finite());
        assert!(a.length() <= 1.0 / EPS);
    }

    #[test]
    fn test_near_coincident_force_is_bounded() {
        let p = Vec3::ZERO;
        for k in 0..40 {
            let offset = Vec3::new(1.0, 0.5, -0.25) * 2f32.powi(-k);
            let a = pair_acceleration(p, p + offset, EPS);
            assert!(a.is_finite());
            assert!(a.length() <= 1.0 / EPS, "unbounded at k={k}: {}", a.length());
        }
    }

    #[test]
    fn test_self_is_excluded() {
        let positions = [Vec3::new(0.2, 0.3, 0.4)];
        let params = PhysicsParams::gravity_only(EPS, 0.001);

        assert_eq!(acceleration_on(0, &positions, &params), Vec3::ZERO);
    }

    #[test]
    fn test_dark_matter_pulls_toward_center() {
        let params = PhysicsParams {
            dark_matter_mass: 10.0,
            dark_energy_acceleration: 0.0,
            ..Default::default()
        };
        let p = Vec3::new(2.0, 0.0, 0.0);
        let a = dark_matter_acceleration(p, &params);

        assert!(a.x < 0.0);
        assert_eq!(a.y, 0.0);
        assert_eq!(a.z, 0.0);
    }

    #[test]
    fn test_dark_matter_strength_depends_on_distance() {
        let params = PhysicsParams {
            dark_matter_mass: 10.0,
            dark_energy_acceleration: 0.0,
            ..Default::default()
        };
        let strength = |r: f32| dark_matter_acceleration(Vec3::new(r, 0.0, 0.0), &params).length();

        // mass * r / (r² + ε) with ε = 0.01
        assert!((strength(1.0) - 10.0 / 1.01).abs() < 1e-4);
        assert!((strength(2.0) - 20.0 / 4.01).abs() < 1e-4);
        assert!(strength(2.0) < strength(1.0));
        assert_eq!(strength(0.0), 0.0);
    }

    #[test]
    fn test_dark_energy_grows_with_distance() {
        let params = PhysicsParams {
            dark_matter_mass: 0.0,
            dark_energy_acceleration: 0.5,
            center: Vec3::new(1.0, 0.0, 0.0),
            ..Default::default()
        };
        let near = dark_energy_acceleration(Vec3::new(2.0, 0.0, 0.0), &params);
        let far = dark_energy_acceleration(Vec3::new(5.0, 0.0, 0.0), &params);

        assert!(near.x > 0.0);
        assert!(far.length() > near.length());
        assert_eq!(dark_energy_acceleration(params.center, &params), Vec3::ZERO);
    }

    #[test]
    fn test_disabled_dark_terms_are_zero() {
        let params = PhysicsParams::gravity_only(EPS, 0.001);
        let p = Vec3::new(3.0, -2.0, 1.0);

        assert_eq!(dark_matter_acceleration(p, &params), Vec3::ZERO);
        assert_eq!(dark_energy_acceleration(p, &params), Vec3::ZERO);
    }
}
