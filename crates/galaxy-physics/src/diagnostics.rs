//! Whole-system quantities used for reporting and conservation checks

use glam::Vec3;

/// Σ v_i (unit masses)
pub fn total_momentum(velocities: &[Vec3]) -> Vec3 {
    velocities.iter().copied().sum()
}

/// Σ ½|v_i|², accumulated in f64
pub fn kinetic_energy(velocities: &[Vec3]) -> f64 {
    velocities
        .iter()
        .map(|v| 0.5 * v.length_squared() as f64)
        .sum()
}

/// Mean position, or the origin for an empty system
pub fn centroid(positions: &[Vec3]) -> Vec3 {
    if positions.is_empty() {
        return Vec3::ZERO;
    }
    positions.iter().copied().sum::<Vec3>() / positions.len() as f32
}

/// Distance of the farthest star from `center`
pub fn max_radius(positions: &[Vec3], center: Vec3) -> f32 {
    positions
        .iter()
        .map(|p| p.distance(center))
        .fold(0.0, f32::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_momentum_of_opposite_velocities_is_zero() {
        let v = [Vec3::new(1.0, 2.0, 3.0), Vec3::new(-1.0, -2.0, -3.0)];
        assert_eq!(total_momentum(&v), Vec3::ZERO);
        assert_eq!(kinetic_energy(&v), 14.0);
    }

    #[test]
    fn test_centroid_and_radius() {
        let p = [Vec3::new(-2.0, 0.0, 0.0), Vec3::new(4.0, 0.0, 0.0)];
        assert_eq!(centroid(&p), Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(max_radius(&p, Vec3::ZERO), 4.0);
        assert_eq!(centroid(&[]), Vec3::ZERO);
    }
}
