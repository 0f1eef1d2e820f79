//! Frame-driven simulation driver
//!
//! ```text
//! Uninitialized --initialize--> Ready --frame--> Stepping --> Ready
//!                                 ^  \--pause--> Paused --resume--/
//!                                 any --terminate--> Terminated
//! ```
//!
//! Each external frame request advances at most one tick. `Stepping` only
//! exists while `frame` holds `&mut self`, so no reader can observe a
//! half-written tick.

use crate::backend::{create_backend, Backend, BackendKind};
use crate::params::SimulationConfig;
use crate::state::ParticleState;
use galaxy_physics::{PhysicsParams, SimError, SimResult};
use glam::Vec3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Uninitialized,
    Ready,
    Stepping,
    Paused,
    Terminated,
}

impl DriverState {
    pub fn as_str(&self) -> &'static str {
        match self {
            DriverState::Uninitialized => "uninitialized",
            DriverState::Ready => "ready",
            DriverState::Stepping => "stepping",
            DriverState::Paused => "paused",
            DriverState::Terminated => "terminated",
        }
    }
}

/// Result of one frame request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// One tick ran; `tick` is the total number of ticks so far.
    Stepped { tick: u64 },
    /// Paused: nothing ran, the arrays still hold the last tick.
    Paused,
}

/// Consumer of the published positions (the renderer side).
pub trait FrameSink {
    /// Called with every position, in index order, once per presented frame.
    fn consume(&mut self, tick: u64, positions: &[Vec3]);
}

pub struct SimulationDriver {
    config: SimulationConfig,
    state: Option<ParticleState>,
    backend: Option<Box<dyn Backend>>,
    phase: DriverState,
    tick: u64,
}

impl SimulationDriver {
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            config,
            state: None,
            backend: None,
            phase: DriverState::Uninitialized,
            tick: 0,
        }
    }

    /// Validate the configuration, allocate and seed the particles and bring
    /// up the configured backend. On failure nothing is kept and the driver
    /// stays `Uninitialized`.
    pub fn initialize(&mut self) -> SimResult<()> {
        self.expect_phase(DriverState::Uninitialized, "initialize")?;
        self.config.validate()?;

        let state = ParticleState::seeded(
            self.config.particle_count,
            &self.config.placement,
            self.config.seed,
        )?;
        log::info!(
            "✓ Seeded {} particles ({:?}, seed {})",
            state.len(),
            self.config.placement,
            self.config.seed
        );

        let backend = create_backend(self.config.backend, state.len())?;
        self.install(state, backend)
    }

    /// Like [`initialize`](Self::initialize) but with a caller-provided
    /// initial state and backend.
    pub fn initialize_with(
        &mut self,
        state: ParticleState,
        backend: Box<dyn Backend>,
    ) -> SimResult<()> {
        self.expect_phase(DriverState::Uninitialized, "initialize")?;
        self.config.physics.validate()?;
        self.install(state, backend)
    }

    fn install(&mut self, state: ParticleState, backend: Box<dyn Backend>) -> SimResult<()> {
        if backend.particle_count() != state.len() {
            return Err(SimError::InvalidConfig(format!(
                "{} backend was built for {} particles but the state holds {}",
                backend.name(),
                backend.particle_count(),
                state.len()
            )));
        }

        if state.len() != self.config.particle_count {
            log::debug!(
                "particle count {} overrides configured {}",
                state.len(),
                self.config.particle_count
            );
            self.config.particle_count = state.len();
        }

        log::info!("✓ Simulation ready on the {} backend", backend.name());
        self.state = Some(state);
        self.backend = Some(backend);
        self.set_phase(DriverState::Ready);
        Ok(())
    }

    /// Handle one external frame request with the latest parameters.
    ///
    /// Invalid `params` are rejected without running a tick or changing
    /// state. A backend failure is fatal and terminates the driver.
    pub fn frame(&mut self, params: &PhysicsParams) -> SimResult<FrameOutcome> {
        match self.phase {
            DriverState::Ready => {}
            DriverState::Paused => return Ok(FrameOutcome::Paused),
            other => {
                return Err(SimError::InvalidState {
                    state: other.as_str(),
                    action: "step",
                })
            }
        }

        params.validate()?;

        let (Some(state), Some(backend)) = (self.state.as_mut(), self.backend.as_mut()) else {
            return Err(SimError::InvalidState {
                state: self.phase.as_str(),
                action: "step",
            });
        };

        self.phase = DriverState::Stepping;
        if let Err(err) = backend.step(state, params) {
            log::error!("Tick {} failed: {err}", self.tick + 1);
            self.terminate();
            return Err(err);
        }

        self.tick += 1;
        self.phase = DriverState::Ready;
        log::trace!("tick {} complete", self.tick);
        Ok(FrameOutcome::Stepped { tick: self.tick })
    }

    pub fn pause(&mut self) -> SimResult<()> {
        match self.phase {
            DriverState::Ready => {
                self.set_phase(DriverState::Paused);
                log::info!("Paused at tick {}", self.tick);
                Ok(())
            }
            DriverState::Paused => Ok(()),
            other => Err(SimError::InvalidState {
                state: other.as_str(),
                action: "pause",
            }),
        }
    }

    pub fn resume(&mut self) -> SimResult<()> {
        match self.phase {
            DriverState::Paused => {
                self.set_phase(DriverState::Ready);
                log::info!("Resumed at tick {}", self.tick);
                Ok(())
            }
            DriverState::Ready => Ok(()),
            other => Err(SimError::InvalidState {
                state: other.as_str(),
                action: "resume",
            }),
        }
    }

    /// Flip the pause flag. Returns `true` if the driver is now paused.
    pub fn toggle_pause(&mut self) -> SimResult<bool> {
        if self.phase == DriverState::Paused {
            self.resume()?;
            Ok(false)
        } else {
            self.pause()?;
            Ok(true)
        }
    }

    /// Release the particle arrays and the backend. Idempotent.
    pub fn terminate(&mut self) {
        if self.phase == DriverState::Terminated {
            return;
        }
        self.backend = None;
        self.state = None;
        self.set_phase(DriverState::Terminated);
        log::info!("Simulation terminated after {} ticks", self.tick);
    }

    pub fn state(&self) -> DriverState {
        self.phase
    }

    pub fn is_paused(&self) -> bool {
        self.phase == DriverState::Paused
    }

    /// Number of completed ticks.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Kind of the running backend (`Auto` is resolved by now).
    pub fn backend_kind(&self) -> Option<BackendKind> {
        self.backend.as_ref().map(|backend| backend.kind())
    }

    pub fn backend_name(&self) -> Option<&str> {
        self.backend.as_ref().map(|backend| backend.name())
    }

    /// Last completed positions. Available in `Ready` and `Paused`.
    pub fn positions(&self) -> SimResult<&[Vec3]> {
        Ok(self.readable("read positions")?.positions())
    }

    /// Last completed velocities. Available in `Ready` and `Paused`.
    pub fn velocities(&self) -> SimResult<&[Vec3]> {
        Ok(self.readable("read velocities")?.velocities())
    }

    /// Hand the current positions to the renderer.
    pub fn present(&self, sink: &mut impl FrameSink) -> SimResult<()> {
        let state = self.readable("present")?;
        sink.consume(self.tick, state.positions());
        Ok(())
    }

    fn readable(&self, action: &'static str) -> SimResult<&ParticleState> {
        match (self.phase, self.state.as_ref()) {
            (DriverState::Ready | DriverState::Paused, Some(state)) => Ok(state),
            (phase, _) => Err(SimError::InvalidState {
                state: phase.as_str(),
                action,
            }),
        }
    }

    fn expect_phase(&self, expected: DriverState, action: &'static str) -> SimResult<()> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(SimError::InvalidState {
                state: self.phase.as_str(),
                action,
            })
        }
    }

    fn set_phase(&mut self, phase: DriverState) {
        log::debug!("driver: {} -> {}", self.phase.as_str(), phase.as_str());
        self.phase = phase;
    }
}

impl Drop for SimulationDriver {
    fn drop(&mut self) {
        self.terminate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::SequentialBackend;

    fn cpu_config(particle_count: usize) -> SimulationConfig {
        SimulationConfig {
            particle_count,
            backend: BackendKind::Sequential,
            seed: 5,
            ..Default::default()
        }
    }

    fn ready_driver(particle_count: usize) -> SimulationDriver {
        let mut driver = SimulationDriver::new(cpu_config(particle_count));
        driver.initialize().unwrap();
        driver
    }

    struct CollectSink {
        frames: Vec<(u64, Vec<Vec3>)>,
    }

    impl FrameSink for CollectSink {
        fn consume(&mut self, tick: u64, positions: &[Vec3]) {
            self.frames.push((tick, positions.to_vec()));
        }
    }

    #[test]
    fn test_lifecycle() {
        let mut driver = SimulationDriver::new(cpu_config(16));
        assert_eq!(driver.state(), DriverState::Uninitialized);
        assert!(driver.positions().is_err());
        assert!(driver.frame(&PhysicsParams::default()).is_err());

        driver.initialize().unwrap();
        assert_eq!(driver.state(), DriverState::Ready);
        assert_eq!(driver.backend_kind(), Some(BackendKind::Sequential));

        let outcome = driver.frame(&PhysicsParams::default()).unwrap();
        assert_eq!(outcome, FrameOutcome::Stepped { tick: 1 });
        assert_eq!(driver.state(), DriverState::Ready);

        driver.terminate();
        assert_eq!(driver.state(), DriverState::Terminated);
        assert!(driver.positions().is_err());
        assert!(matches!(
            driver.frame(&PhysicsParams::default()),
            Err(SimError::InvalidState { state: "terminated", .. })
        ));
        assert!(driver.pause().is_err());
    }

    #[test]
    fn test_failed_initialization_keeps_nothing() {
        let mut driver = SimulationDriver::new(cpu_config(0));

        assert!(driver.initialize().is_err());
        assert_eq!(driver.state(), DriverState::Uninitialized);
        assert!(driver.backend_kind().is_none());
    }

    #[test]
    fn test_degenerate_config_rejected_before_ready() {
        let mut config = cpu_config(8);
        config.physics.epsilon = 0.0;
        let mut driver = SimulationDriver::new(config);

        assert!(matches!(
            driver.initialize(),
            Err(SimError::InvalidParameter { name: "epsilon", .. })
        ));
        assert_eq!(driver.state(), DriverState::Uninitialized);
    }

    #[test]
    fn test_one_tick_per_frame() {
        let mut driver = ready_driver(8);
        let params = PhysicsParams::default();

        for expected in 1..=5 {
            assert_eq!(
                driver.frame(&params).unwrap(),
                FrameOutcome::Stepped { tick: expected }
            );
        }
        assert_eq!(driver.tick(), 5);
    }

    #[test]
    fn test_pause_resume_without_ticks_changes_nothing() {
        let mut driver = ready_driver(32);
        let params = PhysicsParams::default();
        driver.frame(&params).unwrap();

        let positions = driver.positions().unwrap().to_vec();
        let velocities = driver.velocities().unwrap().to_vec();

        driver.pause().unwrap();
        driver.pause().unwrap();
        driver.resume().unwrap();

        assert_eq!(driver.positions().unwrap(), positions.as_slice());
        assert_eq!(driver.velocities().unwrap(), velocities.as_slice());
        assert_eq!(driver.tick(), 1);
    }

    #[test]
    fn test_paused_frames_do_not_step() {
        let mut driver = ready_driver(8);
        let params = PhysicsParams::default();
        let before = driver.positions().unwrap().to_vec();

        assert!(driver.toggle_pause().unwrap());
        assert!(driver.is_paused());
        for _ in 0..3 {
            assert_eq!(driver.frame(&params).unwrap(), FrameOutcome::Paused);
        }

        // Still readable for rendering while paused
        assert_eq!(driver.positions().unwrap(), before.as_slice());
        assert!(!driver.toggle_pause().unwrap());
        assert_eq!(
            driver.frame(&params).unwrap(),
            FrameOutcome::Stepped { tick: 1 }
        );
    }

    #[test]
    fn test_invalid_params_rejected_without_stepping() {
        let mut driver = ready_driver(8);
        let before = driver.positions().unwrap().to_vec();
        let bad = PhysicsParams {
            epsilon: -1.0,
            ..Default::default()
        };

        assert!(driver.frame(&bad).is_err());
        assert_eq!(driver.state(), DriverState::Ready);
        assert_eq!(driver.tick(), 0);
        assert_eq!(driver.positions().unwrap(), before.as_slice());
    }

    #[test]
    fn test_latest_params_are_used_each_tick() {
        let state = ParticleState::from_parts(
            vec![Vec3::new(-1.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0)],
            vec![Vec3::ZERO; 2],
        )
        .unwrap();
        let mut driver = SimulationDriver::new(cpu_config(2));
        driver
            .initialize_with(state, Box::new(SequentialBackend::new(2).unwrap()))
            .unwrap();

        let mut params = PhysicsParams::gravity_only(0.01, 0.001);
        driver.frame(&params).unwrap();
        let v1 = driver.velocities().unwrap()[0].x;

        params.delta_time = 0.01;
        driver.frame(&params).unwrap();
        let v2 = driver.velocities().unwrap()[0].x;

        // Ten times the time step gives roughly ten times the velocity gain
        assert!((v2 - v1) > 5.0 * v1);
    }

    #[test]
    fn test_present_hands_over_every_position() {
        let mut driver = ready_driver(20);
        let mut sink = CollectSink { frames: Vec::new() };

        driver.present(&mut sink).unwrap();
        driver.frame(&PhysicsParams::default()).unwrap();
        driver.present(&mut sink).unwrap();

        assert_eq!(sink.frames.len(), 2);
        assert_eq!(sink.frames[0].0, 0);
        assert_eq!(sink.frames[1].0, 1);
        assert!(sink.frames.iter().all(|(_, p)| p.len() == 20));
        assert_eq!(sink.frames[1].1.as_slice(), driver.positions().unwrap());
    }

    #[test]
    fn test_backend_size_mismatch_fails_initialization() {
        let state = ParticleState::allocate(3).unwrap();
        let mut driver = SimulationDriver::new(cpu_config(3));

        let result =
            driver.initialize_with(state, Box::new(SequentialBackend::new(2).unwrap()));

        assert!(matches!(result, Err(SimError::InvalidConfig(_))));
        assert_eq!(driver.state(), DriverState::Uninitialized);
        assert!(driver.backend_kind().is_none());
        assert!(driver.frame(&PhysicsParams::default()).is_err());
        assert_eq!(driver.state(), DriverState::Uninitialized);

        // A correctly sized retry still works
        let state = ParticleState::allocate(3).unwrap();
        driver
            .initialize_with(state, Box::new(SequentialBackend::new(3).unwrap()))
            .unwrap();
        assert_eq!(driver.state(), DriverState::Ready);
    }

    #[test]
    fn test_initialize_twice_is_rejected() {
        let mut driver = ready_driver(4);
        assert!(matches!(
            driver.initialize(),
            Err(SimError::InvalidState { state: "ready", .. })
        ));
    }
}
