//! # physlab core
//!
//! Fixed-step simulation core for interactive physics teaching demos.
//!
//! ## Architecture
//!
//! - `types`: Core data structures (Vec2, per-scenario states, clock)
//! - `params`: User-adjustable scenario parameters and their validation
//! - `scenarios`: One model per demo (pendulum, free fall, ramp, spring,
//!   Carnot cycle, RC circuit) behind the `ScenarioModel` trait
//! - `integrator`: Fixed-step integrator and the runtime `Simulation` switch
//! - `energy`: Kinetic/potential energy read-outs for mechanical scenarios
//! - `playback`: Play/pause/step control driven by the host's frame callback
//! - `presets`: YAML-based scenario configuration loader
//! - `logging`: `env_logger` setup for binaries

pub mod energy;
pub mod error;
pub mod integrator;
pub mod logging;
pub mod params;
pub mod playback;
pub mod presets;
pub mod scenarios;
pub mod types;

pub use error::{ParameterError, PresetError, SimError};
pub use integrator::{Frame, Integrator, Simulation, StepOutcome};
pub use params::ScenarioParameters;
pub use playback::{PlaybackController, PlaybackState};
pub use presets::{Preset, PresetLoader};
pub use scenarios::{ScenarioModel, StepEvent};
pub use types::{ScenarioKind, SimulationState};
