//! Fixed-step integrator owning one scenario's state and clock.
//!
//! [`Integrator`] is generic over the scenario model so the stepping logic is
//! written once. [`Simulation`] wraps one integrator per scenario family so a
//! host can switch scenarios at runtime without knowing the concrete types.
//!
//! ## Step
//!
//! ```text
//! 1. advance = model.advance(state, clock.elapsed, clock.dt)
//! 2. state   = advance.state            (replaced wholesale)
//! 3. clock.tick()                       (elapsed = steps · dt)
//! 4. report advance.events, halt if any event ends playback
//! ```
//!
//! The integrator is deterministic: identical models, initial states and
//! step counts give bit-identical trajectories.

use serde::{Deserialize, Serialize};

use crate::energy::{DerivedEnergy, EnergyBudget};
use crate::error::SimError;
use crate::params::ScenarioParameters;
use crate::scenarios::{
    CarnotEngine, Pendulum, Projectile, RcCircuit, ScenarioModel, ScenarioStatus, SpringMass,
    StepEvent,
};
use crate::types::{CircuitMode, ScenarioKind, SimulationClock, SimulationState};

/// What happened during one or more steps.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepOutcome {
    pub events: Vec<StepEvent>,
    /// Set when an event means there is nothing left to animate.
    pub halted: bool,
    /// Steps actually taken.
    pub steps: usize,
}

impl StepOutcome {
    fn absorb(&mut self, other: StepOutcome) {
        self.events.extend(other.events);
        self.halted |= other.halted;
        self.steps += other.steps;
    }
}

/// Owns the state and clock of one running scenario.
#[derive(Debug, Clone)]
pub struct Integrator<M: ScenarioModel> {
    model: M,
    state: M::State,
    clock: SimulationClock,
    initial_energy: Option<f64>,
}

impl<M: ScenarioModel> Integrator<M> {
    /// Start `model` from its initial state.
    ///
    /// `dt` must be positive and finite; [`Simulation::validated`] checks it
    /// for hosts that take it from user input.
    pub fn new(model: M, dt: f64) -> Self {
        let state = model.initial_state();
        let initial_energy = model.energy(&state).map(|e| e.total);
        Self {
            model,
            state,
            clock: SimulationClock::new(dt),
            initial_energy,
        }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn state(&self) -> &M::State {
        &self.state
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    /// Advance by exactly one fixed step.
    pub fn step(&mut self) -> StepOutcome {
        let advance = self.model.advance(&self.state, self.clock.elapsed, self.clock.dt);
        self.state = advance.state;
        self.clock.tick();

        for event in &advance.events {
            log::trace!("t={:.4}s {:?}", self.clock.elapsed, event);
        }
        let halted = advance.events.iter().any(StepEvent::halts_playback);

        StepOutcome {
            events: advance.events,
            halted,
            steps: 1,
        }
    }

    /// Advance by up to `steps` steps, stopping early if a step halts.
    pub fn step_n(&mut self, steps: usize) -> StepOutcome {
        let mut outcome = StepOutcome::default();
        for _ in 0..steps {
            outcome.absorb(self.step());
            if outcome.halted {
                break;
            }
        }
        outcome
    }

    /// Return to the model's initial state and zero the clock.
    pub fn reset(&mut self) {
        self.state = self.model.initial_state();
        self.clock.reset();
        self.initial_energy = self.model.energy(&self.state).map(|e| e.total);
        log::debug!("{} reset", self.model.kind());
    }

    /// Swap in a model with new parameters.
    ///
    /// Returns `true` when the change was structural and the state was reset.
    pub fn set_model(&mut self, model: M) -> bool {
        let structural = self.model.requires_reset(&model);
        self.model = model;
        if structural {
            self.reset();
        }
        structural
    }

    pub fn energy(&self) -> Option<DerivedEnergy> {
        self.model.energy(&self.state)
    }

    pub fn energy_budget(&self) -> Option<EnergyBudget> {
        let initial = self.initial_energy?;
        self.energy().map(|current| EnergyBudget::new(initial, current))
    }

    pub fn status(&self) -> ScenarioStatus {
        self.model.status(&self.state, self.clock.elapsed)
    }

    pub fn snapshot(&self) -> SimulationState {
        self.state.into()
    }
}

impl Integrator<RcCircuit> {
    /// Throw the circuit switch. Restarts the clock for the new transient.
    pub fn switch_mode(&mut self, mode: CircuitMode) {
        self.state = self.model.switch_mode(&self.state, mode);
        self.clock.reset();
        log::debug!("circuit switched to {mode:?} at {:.3} V", self.state.voltage);
    }
}

/// Read-only snapshot handed to the renderer once per tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub scenario: ScenarioKind,
    pub elapsed: f64,
    pub steps: u64,
    pub state: SimulationState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub energy: Option<EnergyBudget>,
    pub status: ScenarioStatus,
}

/// An integrator for whichever scenario the host has selected.
#[derive(Debug, Clone)]
pub enum Simulation {
    Pendulum(Integrator<Pendulum>),
    Projectile(Integrator<Projectile>),
    Spring(Integrator<SpringMass>),
    Carnot(Integrator<CarnotEngine>),
    Circuit(Integrator<RcCircuit>),
}

macro_rules! with_integrator {
    ($sim:expr, $it:ident => $body:expr) => {
        match $sim {
            Simulation::Pendulum($it) => $body,
            Simulation::Projectile($it) => $body,
            Simulation::Spring($it) => $body,
            Simulation::Carnot($it) => $body,
            Simulation::Circuit($it) => $body,
        }
    };
}

impl Simulation {
    /// Build the scenario described by `params`, stepping by `dt` seconds.
    pub fn new(params: ScenarioParameters, dt: f64) -> Self {
        log::debug!("starting {} scenario, dt={dt}", params.kind());
        match params {
            ScenarioParameters::Pendulum(p) => {
                Simulation::Pendulum(Integrator::new(Pendulum::new(p), dt))
            }
            ScenarioParameters::FreeFall(p) => {
                Simulation::Projectile(Integrator::new(Projectile::free_fall(p), dt))
            }
            ScenarioParameters::Ramp(p) => {
                Simulation::Projectile(Integrator::new(Projectile::ramp(p), dt))
            }
            ScenarioParameters::Spring(p) => {
                Simulation::Spring(Integrator::new(SpringMass::new(p), dt))
            }
            ScenarioParameters::Carnot(p) => {
                Simulation::Carnot(Integrator::new(CarnotEngine::new(p), dt))
            }
            ScenarioParameters::Circuit(p) => {
                Simulation::Circuit(Integrator::new(RcCircuit::new(p), dt))
            }
        }
    }

    /// Like [`Simulation::new`], but rejects parameters and step sizes
    /// outside their documented domain.
    pub fn validated(params: ScenarioParameters, dt: f64) -> Result<Self, SimError> {
        check_dt(dt)?;
        params.validate()?;
        Ok(Self::new(params, dt))
    }

    pub fn kind(&self) -> ScenarioKind {
        with_integrator!(self, it => it.model().kind())
    }

    pub fn parameters(&self) -> ScenarioParameters {
        with_integrator!(self, it => it.model().parameters())
    }

    pub fn clock(&self) -> &SimulationClock {
        with_integrator!(self, it => it.clock())
    }

    pub fn dt(&self) -> f64 {
        self.clock().dt
    }

    pub fn step(&mut self) -> StepOutcome {
        with_integrator!(self, it => it.step())
    }

    pub fn step_n(&mut self, steps: usize) -> StepOutcome {
        with_integrator!(self, it => it.step_n(steps))
    }

    pub fn reset(&mut self) {
        with_integrator!(self, it => it.reset())
    }

    pub fn snapshot(&self) -> SimulationState {
        with_integrator!(self, it => it.snapshot())
    }

    pub fn energy(&self) -> Option<DerivedEnergy> {
        with_integrator!(self, it => it.energy())
    }

    pub fn energy_budget(&self) -> Option<EnergyBudget> {
        with_integrator!(self, it => it.energy_budget())
    }

    pub fn status(&self) -> ScenarioStatus {
        with_integrator!(self, it => it.status())
    }

    pub fn frame(&self) -> Frame {
        let clock = self.clock();
        let scenario = self.kind();
        Frame {
            scenario,
            elapsed: clock.elapsed,
            steps: clock.steps,
            state: self.snapshot(),
            energy: if scenario.has_energy() {
                self.energy_budget()
            } else {
                None
            },
            status: self.status(),
        }
    }

    /// Apply new parameters.
    ///
    /// Switching to another scenario rebuilds the simulation. Within a
    /// scenario, continuous parameters take effect on the next step and
    /// structural ones reset the state. Returns `true` if the state was reset.
    pub fn set_parameters(&mut self, params: ScenarioParameters) -> bool {
        if params.kind() != self.kind() {
            *self = Simulation::new(params, self.dt());
            return true;
        }

        match (self, params) {
            (Simulation::Pendulum(it), ScenarioParameters::Pendulum(p)) => {
                it.set_model(Pendulum::new(p))
            }
            (Simulation::Projectile(it), ScenarioParameters::FreeFall(p)) => {
                it.set_model(Projectile::free_fall(p))
            }
            (Simulation::Projectile(it), ScenarioParameters::Ramp(p)) => {
                it.set_model(Projectile::ramp(p))
            }
            (Simulation::Spring(it), ScenarioParameters::Spring(p)) => {
                it.set_model(SpringMass::new(p))
            }
            (Simulation::Carnot(it), ScenarioParameters::Carnot(p)) => {
                it.set_model(CarnotEngine::new(p))
            }
            (Simulation::Circuit(it), ScenarioParameters::Circuit(p)) => {
                let switched = it.model().params != p;
                it.set_model(RcCircuit::new(p));
                // A new τ or source invalidates the running transient; restart
                // it from the present voltage.
                if switched {
                    let mode = it.state().mode;
                    it.switch_mode(mode);
                }
                false
            }
            (sim, params) => {
                // Unreachable while kinds agree; rebuilding keeps this total.
                let dt = sim.dt();
                *sim = Simulation::new(params, dt);
                true
            }
        }
    }

    /// Throw the RC circuit's switch.
    pub fn set_circuit_mode(&mut self, mode: CircuitMode) -> Result<(), SimError> {
        match self {
            Simulation::Circuit(it) => {
                it.switch_mode(mode);
                Ok(())
            }
            other => Err(SimError::WrongScenario {
                operation: "set_circuit_mode",
                expected: ScenarioKind::Circuit,
                actual: other.kind(),
            }),
        }
    }
}

pub(crate) fn check_dt(dt: f64) -> Result<(), SimError> {
    if dt.is_finite() && dt > 0.0 {
        Ok(())
    } else {
        Err(SimError::InvalidStep(dt))
    }
}

// =============================================================================
// Tests
// =============================================================================
