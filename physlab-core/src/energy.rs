//! Energy read-outs for the mechanical scenarios.
//!
//! Energies are derived from a state snapshot every time they are asked for
//! and never cached, so they can't go stale when parameters change between
//! steps.
//!
//! | Scenario | Kinetic        | Potential            | Spring     |
//! |----------|----------------|----------------------|------------|
//! | Pendulum | `½·m·(L·ω)²`   | `m·g·L·(1 − cos θ)`  | –          |
//! | Body     | `½·m·|v|²`     | `m·g·(y − r)`        | –          |
//! | Spring   | `½·m·v²`       | `−m·g·x`             | `½·k·x²`   |
//!
//! Potential energy is zero with the pendulum hanging straight down, with the
//! ball touching the ground, and with the spring at its natural length.

use serde::{Deserialize, Serialize};

use crate::scenarios::{Pendulum, Projectile, ScenarioModel, SpringMass};
use crate::types::{BodyState, PendulumState, SpringState};

/// Kinetic, potential and spring energy of one state.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DerivedEnergy {
    pub kinetic: f64,
    pub potential: f64,
    pub spring_potential: f64,
    pub total: f64,
}

impl DerivedEnergy {
    pub fn new(kinetic: f64, potential: f64, spring_potential: f64) -> Self {
        Self {
            kinetic,
            potential,
            spring_potential,
            total: kinetic + potential + spring_potential,
        }
    }
}

/// Energy relative to the start of the run.
///
/// `dissipated` is what damping, friction and inelastic bounces have turned
/// into heat; it is what the demos draw as the "thermal" bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnergyBudget {
    pub initial_total: f64,
    pub current: DerivedEnergy,
    pub dissipated: f64,
}

impl EnergyBudget {
    pub fn new(initial_total: f64, current: DerivedEnergy) -> Self {
        Self {
            initial_total,
            current,
            dissipated: initial_total - current.total,
        }
    }
}

/// Pure derivation of [`DerivedEnergy`] from a state and the model's parameters.
pub trait EnergyAccounting: ScenarioModel {
    fn derive_energy(&self, state: &Self::State) -> DerivedEnergy;
}

pub fn kinetic_energy(mass: f64, speed_squared: f64) -> f64 {
    0.5 * mass * speed_squared
}

/// Largest per-step damping factor at which an oscillator's total energy
/// never rises from one step to the next.
///
/// The semi-implicit update makes the energy of an undamped oscillator
/// wobble around its true value. For the linear oscillator the one-step
/// change is a quadratic form in velocity and displacement, and it is
/// never positive exactly when
///
/// ```text
/// 1 − d ≥ ½·d·(ω·dt)²   ⇔   d ≤ 1 / (1 + ½·(ω·dt)²)
/// ```
///
/// Lighter damping still drains energy on average but lets single steps
/// gain a little. Use `sqrt(k/m)` for the spring and `sqrt(g/L)` for the
/// pendulum, whose restoring force is weaker than linear away from the
/// bottom.
pub fn monotone_damping_limit(angular_frequency: f64, dt: f64) -> f64 {
    let phase = angular_frequency * dt;
    1.0 / (1.0 + 0.5 * phase * phase)
}

impl EnergyAccounting for Pendulum {
    fn derive_energy(&self, state: &PendulumState) -> DerivedEnergy {
        let p = &self.params;
        let speed = p.length * state.angular_velocity;
        let height = p.length * (1.0 - state.angle.cos());
        DerivedEnergy::new(
            kinetic_energy(p.mass, speed * speed),
            p.mass * p.gravity * height,
            0.0,
        )
    }
}

impl EnergyAccounting for Projectile {
    fn derive_energy(&self, state: &BodyState) -> DerivedEnergy {
        let mass = self.mass();
        DerivedEnergy::new(
            kinetic_energy(mass, state.velocity.magnitude_squared()),
            mass * self.gravity() * self.clearance(state),
            0.0,
        )
    }
}

impl EnergyAccounting for SpringMass {
    fn derive_energy(&self, state: &SpringState) -> DerivedEnergy {
        let p = &self.params;
        let x = state.displacement;
        DerivedEnergy::new(
            kinetic_energy(p.mass, state.velocity * state.velocity),
            -p.mass * p.gravity * x,
            0.5 * p.stiffness * x * x,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{FreeFallParams, PendulumParams, SpringParams};
    use crate::types::{Contact, Vec2};
    use approx::assert_relative_eq;

    #[test]
    fn test_pendulum_energy_at_release() {
        let pendulum = Pendulum::new(PendulumParams {
            length: 2.0,
            mass: 3.0,
            gravity: 10.0,
            damping: 1.0,
            initial_angle: std::f64::consts::FRAC_PI_2,
        });
        let e = pendulum.derive_energy(&pendulum.initial_state());

        assert_eq!(e.kinetic, 0.0);
        // Horizontal release: bob sits one length above the bottom
        assert_relative_eq!(e.potential, 3.0 * 10.0 * 2.0, epsilon = 1e-12);
        assert_relative_eq!(e.total, e.potential);
    }

    #[test]
    fn test_body_energy() {
        let model = Projectile::free_fall(FreeFallParams {
            mass: 2.0,
            radius: 0.5,
            gravity: 10.0,
            ..FreeFallParams::default()
        });
        let state = BodyState::new(Vec2::new(0.0, 3.5), Vec2::new(3.0, 4.0), Contact::Airborne);
        let e = model.derive_energy(&state);

        assert_relative_eq!(e.kinetic, 25.0);
        assert_relative_eq!(e.potential, 60.0);
        assert_relative_eq!(e.total, 85.0);
    }

    #[test]
    fn test_spring_energy_terms() {
        let spring = SpringMass::new(SpringParams {
            mass: 1.0,
            stiffness: 8.0,
            gravity: 10.0,
            ..SpringParams::default()
        });
        let e = spring.derive_energy(&SpringState {
            displacement: 0.5,
            velocity: 2.0,
        });

        assert_relative_eq!(e.kinetic, 2.0);
        assert_relative_eq!(e.potential, -5.0);
        assert_relative_eq!(e.spring_potential, 1.0);
        assert_relative_eq!(e.total, -2.0);
    }

    #[test]
    fn test_monotone_damping_limit() {
        let spring = SpringParams::default();
        let limit = monotone_damping_limit(spring.angular_frequency(), 1.0 / 60.0);
        assert_relative_eq!(limit, 1.0 / (1.0 + 0.5 / 900.0), epsilon = 1e-15);
        assert!(0.999 < limit && limit < 0.9995);

        // Smaller steps tolerate lighter damping, but never none at all.
        let finer = monotone_damping_limit(spring.angular_frequency(), 1.0 / 240.0);
        assert!(limit < finer && finer < 1.0);
    }

    #[test]
    fn test_budget_reports_dissipation() {
        let budget = EnergyBudget::new(10.0, DerivedEnergy::new(3.0, 5.0, 0.0));
        assert_relative_eq!(budget.dissipated, 2.0);
    }
}
