//! Vertical spring-mass oscillator.
//!
//! Displacement `x` is measured downward from the natural length, so gravity
//! pulls toward positive `x` and the spring toward zero:
//!
//! ```text
//! a  = −(k/m)·x + g
//! v' = (v + a·dt)·damping
//! x' = x + v'·dt
//! ```
//!
//! The mass oscillates about `x_eq = m·g/k`. With damping at or below
//! [`monotone_damping_limit`](crate::energy::monotone_damping_limit) for
//! `sqrt(k/m)` the total energy never rises between steps; lighter damping
//! only makes it fall on average.

use crate::energy::{DerivedEnergy, EnergyAccounting};
use crate::params::{ScenarioParameters, SpringParams};
use crate::types::{ScenarioKind, SpringState};

use super::{Advance, ScenarioModel};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringMass {
    pub params: SpringParams,
}

impl SpringMass {
    pub fn new(params: SpringParams) -> Self {
        Self { params }
    }

    pub fn acceleration(&self, displacement: f64) -> f64 {
        -(self.params.stiffness / self.params.mass) * displacement + self.params.gravity
    }
}

impl Default for SpringMass {
    fn default() -> Self {
        Self::new(SpringParams::default())
    }
}

impl ScenarioModel for SpringMass {
    type State = SpringState;

    fn kind(&self) -> ScenarioKind {
        ScenarioKind::Spring
    }

    fn parameters(&self) -> ScenarioParameters {
        ScenarioParameters::Spring(self.params)
    }

    fn initial_state(&self) -> SpringState {
        SpringState {
            displacement: self.params.initial_displacement,
            velocity: 0.0,
        }
    }

    fn advance(&self, state: &SpringState, _elapsed: f64, dt: f64) -> Advance<SpringState> {
        let a = self.acceleration(state.displacement);
        let velocity = (state.velocity + a * dt) * self.params.damping;
        let displacement = state.displacement + velocity * dt;

        Advance::quiet(SpringState {
            displacement,
            velocity,
        })
    }

    fn energy(&self, state: &SpringState) -> Option<DerivedEnergy> {
        Some(self.derive_energy(state))
    }

    fn requires_reset(&self, next: &Self) -> bool {
        self.params.initial_displacement != next.params.initial_displacement
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const DT: f64 = 1.0 / 60.0;

    #[test]
    fn test_equilibrium_has_no_acceleration() {
        let spring = SpringMass::default();
        let eq = spring.params.equilibrium();
        assert_relative_eq!(spring.acceleration(eq), 0.0, epsilon = 1e-12);

        let mut state = SpringState {
            displacement: eq,
            velocity: 0.0,
        };
        for _ in 0..120 {
            state = spring.advance(&state, 0.0, DT).state;
        }
        assert_relative_eq!(state.displacement, eq, epsilon = 1e-9);
    }

    #[test]
    fn test_released_at_natural_length_falls() {
        let spring = SpringMass::default();
        let next = spring.advance(&spring.initial_state(), 0.0, DT).state;
        assert!(next.velocity > 0.0);
        assert!(next.displacement > 0.0);
    }

    #[test]
    fn test_oscillates_about_equilibrium() {
        let spring = SpringMass::default();
        let eq = spring.params.equilibrium();
        let mut state = spring.initial_state();
        let mut max_x = f64::MIN;

        // A bit over one period, 2π/ω ≈ 3.14 s
        for _ in 0..240 {
            state = spring.advance(&state, 0.0, DT).state;
            max_x = max_x.max(state.displacement);
        }

        // Undamped release from x = 0 swings to roughly 2·x_eq
        assert_relative_eq!(max_x, 2.0 * eq, max_relative = 0.05);
    }

    #[test]
    fn test_heavily_damped_spring_settles_at_equilibrium() {
        let spring = SpringMass::new(SpringParams {
            damping: 0.9,
            ..SpringParams::default()
        });
        let mut state = spring.initial_state();
        for _ in 0..2_000 {
            state = spring.advance(&state, 0.0, DT).state;
        }
        assert_relative_eq!(state.displacement, spring.params.equilibrium(), epsilon = 1e-6);
        assert!(state.velocity.abs() < 1e-6);
    }
}
