/*!
Simulation defaults and tolerances.

Keeping these together makes tuning easier and keeps the launcher, the driver
and the rapier backend agreeing on the same numbers.

Notes
- Distances are in meters, time in seconds.
- The world is Z-up: gravity points along -Z and ground planes face +Z.
*/

/// Fixed simulated time advanced by one `step()` call (seconds).
pub const DEFAULT_PHYSICS_DT: f32 = 0.01;

/// Number of steps between two episodic resets of tracked objects.
pub const DEFAULT_RESET_PERIOD: u32 = 250;

/// How often the logging observer prints root positions (steps).
pub const DEFAULT_LOG_EVERY: u32 = 50;

/// Gravity magnitude in meters per second squared (positive value).
pub const GRAVITY_MPS2: f32 = 9.81;

/// Only CPU simulation is available in the rapier backend.
pub const DEFAULT_DEVICE: &str = "cpu";

/// Root prim every scene is built under.
pub const WORLD_ROOT: &str = "/World";

/// Default viewport size, recorded for the camera but never rendered.
pub const DEFAULT_VIEWPORT_WIDTH: u32 = 1280;
pub const DEFAULT_VIEWPORT_HEIGHT: u32 = 720;

/// Visual side length of a ground plane along X and Y (meters). Collision is infinite.
pub const DEFAULT_GROUND_SIZE: f32 = 100.0;

/// Solver iterations rapier's integration parameters run per step by default.
/// Bodies asking for more get the difference as additional iterations.
pub const RAPIER_SOLVER_ITERATIONS: u32 = 4;

/// Practical small distance for comparisons (meters).
pub const DIST_EPS: f32 = 1.0e-6;

/// Quaternions with a squared norm below this are treated as degenerate.
pub const QUAT_NORM_EPS_SQ: f32 = 1.0e-12;
