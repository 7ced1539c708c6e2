//! Step loop driver: fixed-delta stepping with periodic episodic reset.
//!
//! Responsibilities
//! - Advance the injected host by exactly one fixed delta per iteration.
//! - Every `reset_period` steps (and on first entry) put tracked objects back
//!   to their default state, offset by their scene origin and a random draw.
//! - Read back root pose/velocity after each step and hand it to an observer.
//!
//! State machine
//! - `Idle → Reset` on the first iteration.
//! - `Reset → Step`: flush buffered writes, step, accumulate time, refresh buffers.
//! - `Step → Step` until `reset_period` steps have elapsed, then `Step → Reset`.
//! - The loop ends when the host stops reporting `is_running()`.
//!
//! Determinism
//! - The only randomness is the injected `Rng`; seed it for repeatable runs.
//! - Calls into the host never overlap; each one completes before the next.

use log::info;
use nalgebra::Isometry3;
use rand::Rng;

use crate::composer::SpawnedObject;
use crate::constants::{DEFAULT_LOG_EVERY, DEFAULT_RESET_PERIOD};
use crate::error::SimError;
use crate::reset::{ResetPolicy, compute_reset_state};
use crate::service::{ObjectHandle, ObjectState, Simulation};
use crate::state::{Pose, RootState, Velocity};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverPhase {
    Idle,
    Reset,
    Step,
}

/// A dynamic object driven by the loop.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackedObject {
    pub name: String,
    pub handle: ObjectHandle,
    pub default_state: RootState,
    /// World frame the default state is expressed in.
    pub origin: Isometry3<f32>,
}

impl From<SpawnedObject> for TrackedObject {
    fn from(obj: SpawnedObject) -> Self {
        Self {
            name: obj.name,
            handle: obj.handle,
            default_state: obj.default_state,
            origin: obj.origin,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DriverConfig {
    /// Steps between resets. Must be at least 1.
    pub reset_period: u32,
    pub reset_policy: ResetPolicy,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            reset_period: DEFAULT_RESET_PERIOD,
            reset_policy: ResetPolicy::Fixed,
        }
    }
}

impl DriverConfig {
    pub fn validate(&self) -> Result<(), SimError> {
        if self.reset_period == 0 {
            return Err(SimError::InvalidDriverConfig(
                "reset period must be at least 1".into(),
            ));
        }
        self.reset_policy
            .validate()
            .map_err(SimError::InvalidDriverConfig)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Observation {
    pub name: String,
    pub handle: ObjectHandle,
    pub pose: Pose,
    pub velocity: Velocity,
}

/// Emitted after every step.
#[derive(Clone, Debug, PartialEq)]
pub struct StepReport {
    /// Steps since the last reset, including this one.
    pub count: u32,
    /// Simulated time since the last reset (seconds).
    pub sim_time: f64,
    pub observations: Vec<Observation>,
}

/// Emitted after every reset, before the next step.
#[derive(Clone, Debug, PartialEq)]
pub struct ResetReport {
    /// Zero-based episode index.
    pub episode: u64,
    pub states: Vec<(ObjectHandle, RootState)>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DriverStats {
    pub steps: u64,
    pub resets: u64,
}

/// Receives driver events. Both hooks default to doing nothing.
pub trait StepObserver {
    fn on_reset(&mut self, _report: &ResetReport) {}
    fn on_step(&mut self, _report: &StepReport) {}
}

impl StepObserver for () {}

/// Logs resets and, every `every` steps, the world root position of each tracked object.
pub struct LogObserver {
    pub every: u32,
}

impl Default for LogObserver {
    fn default() -> Self {
        Self {
            every: DEFAULT_LOG_EVERY,
        }
    }
}

impl StepObserver for LogObserver {
    fn on_reset(&mut self, report: &ResetReport) {
        info!("Resetting object state (episode {})...", report.episode);
    }

    fn on_step(&mut self, report: &StepReport) {
        if self.every == 0 || report.count % self.every != 0 {
            return;
        }
        for obs in &report.observations {
            let p = obs.pose.position;
            info!(
                "[{} {}] t={:.2}s root position (world): [{:.4}, {:.4}, {:.4}]",
                obs.name, obs.handle, report.sim_time, p.x, p.y, p.z
            );
        }
    }
}

pub struct StepLoopDriver<'h, H, R>
where
    H: Simulation + ObjectState,
    R: Rng,
{
    host: &'h mut H,
    rng: R,
    config: DriverConfig,
    tracked: Vec<TrackedObject>,
    dt: f32,
    phase: DriverPhase,
    count: u32,
    sim_time: f64,
    stats: DriverStats,
}

impl<'h, H, R> StepLoopDriver<'h, H, R>
where
    H: Simulation + ObjectState,
    R: Rng,
{
    /// The fixed delta is read once from the host.
    pub fn new(
        host: &'h mut H,
        tracked: Vec<TrackedObject>,
        config: DriverConfig,
        rng: R,
    ) -> Result<Self, SimError> {
        config.validate()?;
        let dt = host.physics_dt();
        if !(dt.is_finite() && dt > 0.0) {
            return Err(SimError::InvalidDriverConfig(format!(
                "host physics dt must be positive, got {dt}"
            )));
        }
        Ok(Self {
            host,
            rng,
            config,
            tracked,
            dt,
            phase: DriverPhase::Idle,
            count: 0,
            sim_time: 0.0,
            stats: DriverStats::default(),
        })
    }

    pub fn phase(&self) -> DriverPhase {
        self.phase
    }

    /// Steps since the last reset.
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Simulated time since the last reset (seconds).
    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }

    pub fn dt(&self) -> f32 {
        self.dt
    }

    pub fn stats(&self) -> DriverStats {
        self.stats
    }

    pub fn tracked(&self) -> &[TrackedObject] {
        &self.tracked
    }

    /// Will the next iteration begin with a reset?
    pub fn reset_due(&self) -> bool {
        self.phase == DriverPhase::Idle || self.count >= self.config.reset_period
    }

    /// Run until the host stops running.
    pub fn run<O: StepObserver>(&mut self, observer: &mut O) -> Result<DriverStats, SimError> {
        while self.host.is_running() {
            self.tick(observer)?;
        }
        info!(
            "Simulation stopped after {} steps and {} resets",
            self.stats.steps, self.stats.resets
        );
        Ok(self.stats)
    }

    /// One loop iteration: reset if due, then exactly one step.
    pub fn tick<O: StepObserver>(&mut self, observer: &mut O) -> Result<(), SimError> {
        if self.reset_due() {
            self.reset_tracked(observer)?;
        }
        self.step_once(observer)
    }

    fn reset_tracked<O: StepObserver>(&mut self, observer: &mut O) -> Result<(), SimError> {
        self.count = 0;
        self.sim_time = 0.0;

        let mut states = Vec::with_capacity(self.tracked.len());
        for obj in &self.tracked {
            let state = compute_reset_state(
                &obj.default_state,
                &obj.origin,
                &self.config.reset_policy,
                &mut self.rng,
            );
            self.host.write_pose(obj.handle, state.pose.to_array())?;
            self.host.write_velocity(obj.handle, state.velocity.to_array())?;
            states.push((obj.handle, state));
        }

        self.phase = DriverPhase::Reset;
        observer.on_reset(&ResetReport {
            episode: self.stats.resets,
            states,
        });
        self.stats.resets += 1;
        Ok(())
    }

    fn step_once<O: StepObserver>(&mut self, observer: &mut O) -> Result<(), SimError> {
        self.host.write_data_to_sim()?;
        self.host.step()?;

        self.sim_time += f64::from(self.dt);
        self.count += 1;
        self.stats.steps += 1;

        let mut observations = Vec::with_capacity(self.tracked.len());
        for obj in &self.tracked {
            self.host.update(obj.handle, self.dt)?;
            let pose = Pose::try_from_array(self.host.read_pose(obj.handle)?)?;
            let velocity = Velocity::try_from_array(self.host.read_velocity(obj.handle)?)?;
            observations.push(Observation {
                name: obj.name.clone(),
                handle: obj.handle,
                pose,
                velocity,
            });
        }

        self.phase = DriverPhase::Step;
        observer.on_step(&StepReport {
            count: self.count,
            sim_time: self.sim_time,
            observations,
        });
        Ok(())
    }
}
