//! Simple pendulum with per-step velocity damping.
//!
//! ```text
//! α  = −(g / L)·sin θ
//! ω' = (ω + α·dt)·damping
//! θ' = θ + ω'·dt
//! ```
//!
//! The position update uses the freshly computed velocity, so total energy
//! oscillates within a band proportional to `dt` instead of growing without
//! bound. Keep `dt` at or below one animation frame (1/60 s) relative to the
//! natural period `2π·sqrt(L/g)`. Damping at or below
//! [`monotone_damping_limit`](crate::energy::monotone_damping_limit) for
//! `sqrt(g/L)` makes the energy fall on every step.

use crate::energy::{DerivedEnergy, EnergyAccounting};
use crate::params::{PendulumParams, ScenarioParameters};
use crate::types::{PendulumState, ScenarioKind};

use super::{Advance, ScenarioModel};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pendulum {
    pub params: PendulumParams,
}

impl Pendulum {
    pub fn new(params: PendulumParams) -> Self {
        Self { params }
    }

    /// Angular acceleration at a given angle.
    pub fn angular_acceleration(&self, angle: f64) -> f64 {
        -(self.params.gravity / self.params.length) * angle.sin()
    }

    /// Bob position relative to the pivot, y pointing up.
    pub fn bob_position(&self, state: &PendulumState) -> (f64, f64) {
        let l = self.params.length;
        (l * state.angle.sin(), -l * state.angle.cos())
    }
}

impl Default for Pendulum {
    fn default() -> Self {
        Self::new(PendulumParams::default())
    }
}

impl ScenarioModel for Pendulum {
    type State = PendulumState;

    fn kind(&self) -> ScenarioKind {
        ScenarioKind::Pendulum
    }

    fn parameters(&self) -> ScenarioParameters {
        ScenarioParameters::Pendulum(self.params)
    }

    fn initial_state(&self) -> PendulumState {
        PendulumState::released_at(self.params.initial_angle)
    }

    fn advance(&self, state: &PendulumState, _elapsed: f64, dt: f64) -> Advance<PendulumState> {
        let alpha = self.angular_acceleration(state.angle);
        let angular_velocity = (state.angular_velocity + alpha * dt) * self.params.damping;
        let angle = state.angle + angular_velocity * dt;

        Advance::quiet(PendulumState {
            angle,
            angular_velocity,
        })
    }

    fn energy(&self, state: &PendulumState) -> Option<DerivedEnergy> {
        Some(self.derive_energy(state))
    }

    fn requires_reset(&self, next: &Self) -> bool {
        self.params.initial_angle != next.params.initial_angle
    }
}
