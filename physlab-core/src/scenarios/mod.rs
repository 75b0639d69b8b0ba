//! Scenario models: the governing equations of each demo.
//!
//! Every scenario implements [`ScenarioModel`]. A model owns its parameters
//! and maps a state plus a time increment to the next state. Models are pure: no interior
//! mutability, no randomness, no wall clock.
//!
//! | Scenario     | Model            | Update rule                                  |
//! |--------------|------------------|----------------------------------------------|
//! | Pendulum     | [`Pendulum`]     | explicit Euler on `θ'' = −(g/L)·sin θ`       |
//! | Free fall    | [`Projectile`]   | constant-gravity kinematics + bounces        |
//! | Ramp         | [`Projectile`]   | closed-form slide, then free fall            |
//! | Spring-mass  | [`SpringMass`]   | explicit Euler on `x'' = −(k/m)·x + g`       |
//! | Carnot cycle | [`CarnotEngine`] | closed form per stage, indexed by progress   |
//! | RC circuit   | [`RcCircuit`]    | closed-form exponential since mode switch    |

pub mod carnot;
pub mod circuit;
pub mod contact;
pub mod pendulum;
pub mod projectile;
pub mod spring;

pub use carnot::CarnotEngine;
pub use circuit::RcCircuit;
pub use pendulum::Pendulum;
pub use projectile::Projectile;
pub use spring::SpringMass;

use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::energy::DerivedEnergy;
use crate::params::ScenarioParameters;
use crate::types::{CircuitMode, CycleStage, ScenarioKind, SimulationState};

/// Something noteworthy that happened during a single step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum StepEvent {
    /// Body hit the ground; `impact_speed` is the normal speed before rebound.
    Bounce { impact_speed: f64 },
    /// Body hit a side wall.
    WallHit { impact_speed: f64 },
    /// Body passed the end of the ramp and is now in free flight.
    LeftRamp,
    /// Rebound too slow to leave the ground again.
    CameToRest,
    /// The Carnot cycle moved into `stage`.
    StageAdvanced { stage: CycleStage },
    /// The Carnot cycle wrapped back to its first stage.
    CycleCompleted { cycles: u64 },
    /// The RC transient reached five time constants.
    Settled,
}

impl StepEvent {
    /// Events after which there is nothing left to animate.
    pub fn halts_playback(&self) -> bool {
        matches!(self, StepEvent::Settled)
    }
}

/// Result of advancing a state by one step.
#[derive(Debug, Clone, PartialEq)]
pub struct Advance<S> {
    pub state: S,
    pub events: Vec<StepEvent>,
}

impl<S> Advance<S> {
    pub fn quiet(state: S) -> Self {
        Self {
            state,
            events: Vec::new(),
        }
    }

    pub fn with_events(state: S, events: Vec<StepEvent>) -> Self {
        Self { state, events }
    }
}

/// Scenario-specific read-outs that accompany the raw state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScenarioStatus {
    /// Pendulum, free fall, ramp and spring: see the energy read-out instead.
    Mechanical,
    Carnot {
        stage: CycleStage,
        progress: f64,
        cycles: u64,
        efficiency: f64,
    },
    Circuit {
        mode: CircuitMode,
        /// Fraction of the current transient completed, `1 − e^(−t/τ)`.
        settling_fraction: f64,
        time_constant: f64,
        settled: bool,
    },
}

/// Governing equations of one physical scenario.
pub trait ScenarioModel {
    type State: Copy + Debug + PartialEq + Into<SimulationState>;

    fn kind(&self) -> ScenarioKind;

    /// The parameters this model was built from.
    fn parameters(&self) -> ScenarioParameters;

    /// Freshly initialized state, e.g. the release angle or an empty capacitor.
    fn initial_state(&self) -> Self::State;

    /// Advance `state` from simulated time `elapsed` to `elapsed + dt`.
    fn advance(&self, state: &Self::State, elapsed: f64, dt: f64) -> Advance<Self::State>;

    /// Energy read-out for scenarios that display energy bars.
    fn energy(&self, _state: &Self::State) -> Option<DerivedEnergy> {
        None
    }

    fn status(&self, _state: &Self::State, _elapsed: f64) -> ScenarioStatus {
        ScenarioStatus::Mechanical
    }

    /// Whether swapping to `next` invalidates the running state.
    ///
    /// Continuous parameters (gravity, damping, temperatures) take effect on
    /// the next step. Initial conditions and geometry force a reset.
    fn requires_reset(&self, _next: &Self) -> bool {
        false
    }
}
