//! Logging stand-in for the renderer

use galaxy_physics::{centroid, kinetic_energy, max_radius, total_momentum};
use galaxy_simulation::FrameSink;
use glam::Vec3;
use std::collections::VecDeque;
use std::time::Instant;

/// Receives every presented frame and periodically logs a summary of it.
pub struct LogSink {
    report_every: u64,
    center: Vec3,
    frame_times: VecDeque<f32>,
    last_frame_time: Instant,
    last_tick: Option<u64>,
    presented: u64,
}

impl LogSink {
    pub fn new(report_every: u64, center: Vec3) -> Self {
        Self {
            report_every,
            center,
            frame_times: VecDeque::with_capacity(100),
            last_frame_time: Instant::now(),
            last_tick: None,
            presented: 0,
        }
    }

    /// Average frame time in milliseconds over the last 100 frames
    pub fn average_frame_time(&self) -> f32 {
        if self.frame_times.is_empty() {
            return 0.0;
        }
        self.frame_times.iter().sum::<f32>() / self.frame_times.len() as f32
    }

    pub fn presented(&self) -> u64 {
        self.presented
    }

    /// Whether `tick` is a reporting tick that has not been reported yet
    fn due(&self, tick: u64) -> bool {
        self.report_every != 0
            && tick % self.report_every == 0
            && self.last_tick != Some(tick)
    }

    /// Whether the positional summary for `tick` has just been logged
    fn dynamics_due(&self, tick: u64) -> bool {
        self.last_tick == Some(tick)
    }

    /// Log conservation quantities under the positional summary of `tick`.
    /// Does nothing unless that summary was logged by the last `consume`.
    pub fn log_dynamics(&self, tick: u64, velocities: &[Vec3]) {
        if !self.dynamics_due(tick) {
            return;
        }
        let momentum = total_momentum(velocities);
        log::info!(
            "  momentum ({:.3e}, {:.3e}, {:.3e}), kinetic energy {:.4e}",
            momentum.x,
            momentum.y,
            momentum.z,
            kinetic_energy(velocities)
        );
    }
}

impl FrameSink for LogSink {
    fn consume(&mut self, tick: u64, positions: &[Vec3]) {
        let now = Instant::now();
        let frame_time = (now - self.last_frame_time).as_secs_f32() * 1000.0;
        self.last_frame_time = now;

        if self.frame_times.len() == 100 {
            self.frame_times.pop_front();
        }
        self.frame_times.push_back(frame_time);
        self.presented += 1;

        if !self.due(tick) {
            return;
        }
        self.last_tick = Some(tick);

        let average = self.average_frame_time();
        let fps = if average > 0.0 { 1000.0 / average } else { 0.0 };
        log::info!(
            "tick {tick}: {fps:.1} fps ({average:.2} ms), {} stars, centroid {:.3}, max radius {:.3}",
            positions.len(),
            centroid(positions),
            max_radius(positions, self.center)
        );
    }
}
