//! Series RC circuit, solved in closed form.
//!
//! With `τ = R·C` and `t` the time since the switch was last thrown:
//!
//! ```text
//! charging:     V(t) = V_s + (V_0 − V_s)·e^(−t/τ)     I = (V_s − V)/R
//! discharging:  V(t) = V_0·e^(−t/τ)                   I = −V/R
//! idle:         V(t) = V_0                            I = 0
//! ```
//!
//! `V_0` is the capacitor voltage at the moment of the switch, so an empty
//! capacitor charges along `V_s·(1 − e^(−t/τ))`. The transient counts as
//! settled after five time constants (about 99.3 % complete).

use crate::params::{CircuitParams, ScenarioParameters};
use crate::types::{constants, CircuitMode, CircuitState, ScenarioKind};

use super::{Advance, ScenarioModel, ScenarioStatus, StepEvent};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RcCircuit {
    pub params: CircuitParams,
}

impl RcCircuit {
    pub fn new(params: CircuitParams) -> Self {
        Self { params }
    }

    pub fn time_constant(&self) -> f64 {
        self.params.time_constant()
    }

    /// Time after which a transient counts as settled, `5τ`.
    pub fn settling_time(&self) -> f64 {
        constants::SETTLING_TIME_CONSTANTS * self.time_constant()
    }

    /// Capacitor voltage `t` seconds after entering `mode` at `start_voltage`.
    pub fn voltage_at(&self, mode: CircuitMode, start_voltage: f64, t: f64) -> f64 {
        let decay = (-t / self.time_constant()).exp();
        match mode {
            CircuitMode::Idle => start_voltage,
            CircuitMode::Charging => {
                let vs = self.params.source_voltage;
                vs + (start_voltage - vs) * decay
            }
            CircuitMode::Discharging => start_voltage * decay,
        }
    }

    pub fn current_for(&self, mode: CircuitMode, voltage: f64) -> f64 {
        match mode {
            CircuitMode::Idle => 0.0,
            CircuitMode::Charging => (self.params.source_voltage - voltage) / self.params.resistance,
            CircuitMode::Discharging => -voltage / self.params.resistance,
        }
    }

    /// Circuit quantities `t` seconds after entering `mode` at `start_voltage`.
    pub fn evaluate(&self, mode: CircuitMode, start_voltage: f64, t: f64) -> CircuitState {
        let voltage = self.voltage_at(mode, start_voltage, t);
        CircuitState {
            mode,
            voltage,
            current: self.current_for(mode, voltage),
            charge: self.params.capacitance * voltage,
            start_voltage,
        }
    }

    /// Throw the switch: the new transient starts from the present voltage.
    pub fn switch_mode(&self, state: &CircuitState, mode: CircuitMode) -> CircuitState {
        self.evaluate(mode, state.voltage, 0.0)
    }

    /// Fraction of the current transient completed, `1 − e^(−t/τ)`.
    pub fn settling_fraction(&self, mode: CircuitMode, t: f64) -> f64 {
        match mode {
            CircuitMode::Idle => 0.0,
            _ => 1.0 - (-t / self.time_constant()).exp(),
        }
    }

    pub fn is_settled(&self, mode: CircuitMode, t: f64) -> bool {
        mode != CircuitMode::Idle && t >= self.settling_time() - constants::EPSILON
    }
}

impl Default for RcCircuit {
    fn default() -> Self {
        Self::new(CircuitParams::default())
    }
}

impl ScenarioModel for RcCircuit {
    type State = CircuitState;

    fn kind(&self) -> ScenarioKind {
        ScenarioKind::Circuit
    }

    fn parameters(&self) -> ScenarioParameters {
        ScenarioParameters::Circuit(self.params)
    }

    fn initial_state(&self) -> CircuitState {
        CircuitState::discharged()
    }

    fn advance(&self, state: &CircuitState, elapsed: f64, dt: f64) -> Advance<CircuitState> {
        let t = elapsed + dt;
        let next = self.evaluate(state.mode, state.start_voltage, t);

        if self.is_settled(state.mode, t) {
            Advance::with_events(next, vec![StepEvent::Settled])
        } else {
            Advance::quiet(next)
        }
    }

    fn status(&self, state: &CircuitState, elapsed: f64) -> ScenarioStatus {
        ScenarioStatus::Circuit {
            mode: state.mode,
            settling_fraction: self.settling_fraction(state.mode, elapsed),
            time_constant: self.time_constant(),
            settled: self.is_settled(state.mode, elapsed),
        }
    }
}
