//! Galaxy Simulator
//!
//! Runs the N-body galaxy simulation headless, one tick per frame, and logs
//! what a renderer would draw.

mod config;
mod report;

use anyhow::Context;
use clap::Parser;
use config::Args;
use galaxy_simulation::{FrameOutcome, SimulationDriver};
use report::LogSink;

fn main() -> anyhow::Result<()> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = config::load(&args)?;

    // The config layer owns the live parameters; the driver reads them every frame
    let params = config.physics;

    let mut driver = SimulationDriver::new(config);
    driver
        .initialize()
        .context("failed to initialize the simulation")?;
    log::info!(
        "Running {} frames on {}",
        args.frames,
        driver.backend_name().unwrap_or("unknown backend")
    );

    let mut sink = LogSink::new(args.report_every, params.center);
    let mut resume_at = None;

    for frame in 0..args.frames {
        if args.pause_at == Some(frame) {
            driver.pause()?;
            resume_at = Some(frame + args.pause_for);
        }
        if resume_at.is_some_and(|at| frame >= at) {
            driver.resume()?;
            resume_at = None;
        }

        let outcome = driver.frame(&params)?;
        driver.present(&mut sink)?;
        if let FrameOutcome::Stepped { tick } = outcome {
            sink.log_dynamics(tick, driver.velocities()?);
        }
    }

    log::info!(
        "Done: {} ticks over {} frames ({:.2} ms average frame time)",
        driver.tick(),
        sink.presented(),
        sink.average_frame_time()
    );
    driver.terminate();
    Ok(())
}
