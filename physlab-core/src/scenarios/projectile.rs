//! Free fall and inclined-ramp scenarios.
//!
//! Both share one body model: a ball of radius `r` moving in the vertical
//! plane under constant gravity. Gravity is constant, so motion over a step
//! is integrated in closed form (`x + v·dt + ½·a·dt²`) rather than by Euler.
//!
//! The ramp scenario starts the ball at rest on the top end of an incline.
//! While in contact the ball is clamped to the surface and accelerates at
//! `g·(sin α − μ·cos α)` along it. Once the contact point passes the ramp's
//! horizontal extent the ball flies off with its current velocity and is
//! handed to the shared ground/wall contact handling.
//!
//! ```text
//!  ●  top = (0, bottom_height + L·sin α)
//!  ╲
//!   ╲  α
//!    ╲______ end = (L·cos α, bottom_height)
//!            ↘ free flight
//! ═══════════════════ ground
//! ```

use crate::energy::{DerivedEnergy, EnergyAccounting};
use crate::params::{FreeFallParams, RampParams, ScenarioParameters};
use crate::types::{constants, BodyState, Contact, ScenarioKind, Vec2};

use super::contact::Arena;
use super::{Advance, ScenarioModel, StepEvent};

/// Which launch the body starts from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Launch {
    Drop(FreeFallParams),
    Ramp(RampParams),
}

/// A ball dropped from rest or rolled off a ramp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projectile {
    pub launch: Launch,
}

impl Projectile {
    pub fn free_fall(params: FreeFallParams) -> Self {
        Self {
            launch: Launch::Drop(params),
        }
    }

    pub fn ramp(params: RampParams) -> Self {
        Self {
            launch: Launch::Ramp(params),
        }
    }

    pub fn mass(&self) -> f64 {
        match &self.launch {
            Launch::Drop(p) => p.mass,
            Launch::Ramp(p) => p.mass,
        }
    }

    pub fn gravity(&self) -> f64 {
        match &self.launch {
            Launch::Drop(p) => p.gravity,
            Launch::Ramp(p) => p.gravity,
        }
    }

    pub fn radius(&self) -> f64 {
        match &self.launch {
            Launch::Drop(p) => p.radius,
            Launch::Ramp(p) => p.radius,
        }
    }

    pub fn arena(&self) -> Arena {
        match &self.launch {
            Launch::Drop(p) => Arena {
                radius: p.radius,
                gravity: p.gravity,
                damping: p.damping,
                width: p.width,
            },
            Launch::Ramp(p) => Arena {
                radius: p.radius,
                gravity: p.gravity,
                damping: p.damping,
                width: p.width,
            },
        }
    }

    /// Height of the ball's lowest point above the ground.
    pub fn clearance(&self, state: &BodyState) -> f64 {
        state.position.y - self.radius()
    }

    fn advance_on_ramp(
        &self,
        ramp: &RampParams,
        state: &BodyState,
        dt: f64,
        events: &mut Vec<StepEvent>,
    ) -> BodyState {
        let slope = RampFrame::new(ramp);
        let s = slope.distance_of(state.position);
        let u = state.velocity.dot(&slope.downhill);
        let a = ramp.gravity * (ramp.angle.sin() - ramp.friction * ramp.angle.cos());

        // Kinetic friction can stop the ball but never push it back uphill.
        if u <= 0.0 && a <= 0.0 {
            return slope.at(0.0_f64.max(s), 0.0);
        }
        let (t_move, stops) = if a < 0.0 && u + a * dt < 0.0 {
            (-u / a, true)
        } else {
            (dt, false)
        };

        let s_next = s + u * t_move + 0.5 * a * t_move * t_move;
        if s_next < ramp.length {
            let u_next = if stops { 0.0 } else { u + a * t_move };
            return slope.at(s_next, u_next);
        }

        // Leaves the ramp part-way through the step.
        let gap = ramp.length - s;
        let t_exit = if a.abs() > constants::EPSILON {
            (-u + (u * u + 2.0 * a * gap).max(0.0).sqrt()) / a
        } else {
            gap / u
        };
        let t_exit = t_exit.clamp(0.0, dt);
        let mut edge = slope.at(ramp.length, u + a * t_exit);
        edge.contact = Contact::Airborne;
        events.push(StepEvent::LeftRamp);
        log::debug!("body left the ramp at speed {:.3}", edge.velocity.magnitude());

        self.arena().fly(&edge, dt - t_exit, events)
    }
}

/// Ramp geometry: converts between along-slope distance and world position.
#[derive(Debug, Clone, Copy)]
struct RampFrame {
    top: Vec2,
    downhill: Vec2,
    /// Center offset from the contact point, perpendicular to the surface.
    lift: Vec2,
}

impl RampFrame {
    fn new(ramp: &RampParams) -> Self {
        let (sin, cos) = ramp.angle.sin_cos();
        Self {
            top: Vec2::new(0.0, ramp.top_height()),
            downhill: Vec2::downhill(ramp.angle),
            lift: Vec2::new(sin, cos) * ramp.radius,
        }
    }

    fn distance_of(&self, center: Vec2) -> f64 {
        (center - self.lift - self.top).dot(&self.downhill)
    }

    fn at(&self, distance: f64, speed: f64) -> BodyState {
        BodyState::new(
            self.top + self.downhill * distance + self.lift,
            self.downhill * speed,
            Contact::Ramp,
        )
    }
}

impl ScenarioModel for Projectile {
    type State = BodyState;

    fn kind(&self) -> ScenarioKind {
        match self.launch {
            Launch::Drop(_) => ScenarioKind::FreeFall,
            Launch::Ramp(_) => ScenarioKind::Ramp,
        }
    }

    fn parameters(&self) -> ScenarioParameters {
        match self.launch {
            Launch::Drop(p) => ScenarioParameters::FreeFall(p),
            Launch::Ramp(p) => ScenarioParameters::Ramp(p),
        }
    }

    fn initial_state(&self) -> BodyState {
        match &self.launch {
            Launch::Drop(p) => BodyState::new(
                Vec2::new(p.initial_x, p.initial_height),
                Vec2::new(p.initial_velocity_x, 0.0),
                Contact::Airborne,
            ),
            Launch::Ramp(p) => RampFrame::new(p).at(0.0, 0.0),
        }
    }

    fn advance(&self, state: &BodyState, _elapsed: f64, dt: f64) -> Advance<BodyState> {
        let mut events = Vec::new();
        let next = match (&self.launch, state.contact) {
            (Launch::Ramp(ramp), Contact::Ramp) => {
                self.advance_on_ramp(ramp, state, dt, &mut events)
            }
            _ => self.arena().fly(state, dt, &mut events),
        };
        Advance::with_events(next, events)
    }

    fn energy(&self, state: &BodyState) -> Option<DerivedEnergy> {
        Some(self.derive_energy(state))
    }

    fn requires_reset(&self, next: &Self) -> bool {
        match (&self.launch, &next.launch) {
            (Launch::Drop(a), Launch::Drop(b)) => {
                a.initial_height != b.initial_height
                    || a.initial_x != b.initial_x
                    || a.initial_velocity_x != b.initial_velocity_x
                    || a.radius != b.radius
                    || a.width != b.width
            }
            (Launch::Ramp(a), Launch::Ramp(b)) => {
                a.angle != b.angle
                    || a.length != b.length
                    || a.bottom_height != b.bottom_height
                    || a.radius != b.radius
                    || a.width != b.width
            }
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const DT: f64 = 1.0 / 60.0;

    fn run_until<F>(model: &Projectile, max_steps: usize, mut stop: F) -> (BodyState, usize)
    where
        F: FnMut(&BodyState, &[StepEvent]) -> bool,
    {
        let mut state = model.initial_state();
        for i in 0..max_steps {
            let step = model.advance(&state, i as f64 * DT, DT);
            state = step.state;
            if stop(&state, &step.events) {
                return (state, i + 1);
            }
        }
        panic!("condition not reached in {max_steps} steps");
    }

    #[test]
    fn test_drop_falls_like_textbook() {
        let model = Projectile::free_fall(FreeFallParams::default());
        let mut state = model.initial_state();
        for i in 0..30 {
            state = model.advance(&state, i as f64 * DT, DT).state;
        }
        // Half a second of fall: Δy = ½·g·t²
        assert_relative_eq!(state.position.y, 10.0 - 0.5 * 9.8 * 0.25, epsilon = 1e-9);
        assert_relative_eq!(state.velocity.y, -9.8 * 0.5, epsilon = 1e-9);
    }

    #[test]
    fn test_first_bounce_rebounds_with_damped_speed() {
        let params = FreeFallParams::default();
        let model = Projectile::free_fall(params);
        let (_, _) = run_until(&model, 1_000, |_, events| {
            events.iter().any(|e| match e {
                StepEvent::Bounce { impact_speed } => {
                    let expected = (2.0 * params.gravity * (params.initial_height - params.radius)).sqrt();
                    assert_relative_eq!(*impact_speed, expected, max_relative = 1e-9);
                    true
                }
                _ => false,
            })
        });
    }

    #[test]
    fn test_never_sinks_below_ground() {
        let model = Projectile::free_fall(FreeFallParams::default());
        let mut state = model.initial_state();
        for i in 0..5_000 {
            state = model.advance(&state, i as f64 * DT, DT).state;
            assert!(model.clearance(&state) >= -1e-9, "sank at step {i}: {state:?}");
        }
        assert_eq!(state.contact, Contact::Resting);
    }

    #[test]
    fn test_ramp_start_is_on_surface() {
        let params = RampParams::default();
        let model = Projectile::ramp(params);
        let state = model.initial_state();

        assert_eq!(state.contact, Contact::Ramp);
        assert_eq!(state.velocity, Vec2::ZERO);
        // Center sits one radius off the surface along the normal
        let lift = params.radius * params.angle.cos();
        assert_relative_eq!(state.position.y, params.top_height() + lift, epsilon = 1e-12);
    }

    #[test]
    fn test_frictionless_ramp_exit_speed() {
        let params = RampParams::default();
        let model = Projectile::ramp(params);
        let (state, _) = run_until(&model, 10_000, |_, events| {
            events.contains(&StepEvent::LeftRamp)
        });

        // Energy: v² at the edge = 2·g·L·sin α, then a little free flight
        let edge_speed = (2.0 * params.gravity * params.length * params.angle.sin()).sqrt();
        assert!(state.velocity.magnitude() >= edge_speed - 1e-9);
        assert_eq!(state.contact, Contact::Airborne);
        assert!(state.position.x - params.radius * params.angle.sin() >= params.run() - 1e-9);
    }

    #[test]
    fn test_stays_on_ramp_before_edge() {
        let params = RampParams::default();
        let model = Projectile::ramp(params);
        let mut state = model.initial_state();
        let slope = RampFrame::new(&params);

        for i in 0..20 {
            state = model.advance(&state, i as f64 * DT, DT).state;
            assert_eq!(state.contact, Contact::Ramp);
            let s = slope.distance_of(state.position);
            let t = (i + 1) as f64 * DT;
            let a = params.gravity * params.angle.sin();
            assert_relative_eq!(s, 0.5 * a * t * t, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_high_friction_holds_ball() {
        let params = RampParams {
            friction: 1.0,
            angle: 0.3,
            ..RampParams::default()
        };
        let model = Projectile::ramp(params);
        let start = model.initial_state();
        let mut state = start;
        for i in 0..120 {
            state = model.advance(&state, i as f64 * DT, DT).state;
        }
        assert_eq!(state.contact, Contact::Ramp);
        assert_relative_eq!(state.position.x, start.position.x, epsilon = 1e-12);
        assert_eq!(state.velocity, Vec2::ZERO);
    }

    #[test]
    fn test_geometry_change_requires_reset() {
        let a = Projectile::ramp(RampParams::default());
        let steeper = Projectile::ramp(RampParams {
            angle: 0.9,
            ..RampParams::default()
        });
        let stickier = Projectile::ramp(RampParams {
            friction: 0.1,
            ..RampParams::default()
        });
        assert!(a.requires_reset(&steeper));
        assert!(!a.requires_reset(&stickier));
        assert!(a.requires_reset(&Projectile::free_fall(FreeFallParams::default())));
    }
}
