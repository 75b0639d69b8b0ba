//! Play/pause/reset/step control between a host's timing source and the
//! integrator.
//!
//! The controller never schedules anything itself. A host calls
//! [`PlaybackController::advance`] from its animation-frame callback (one
//! step per tick), or [`PlaybackController::advance_wall`] with the wall time
//! since the previous frame to run at a fixed simulated rate regardless of
//! display refresh.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::integrator::{check_dt, Frame, Simulation, StepOutcome};
use crate::params::ScenarioParameters;
use crate::types::{CircuitMode, ScenarioKind};

/// Most steps a single [`PlaybackController::advance_wall`] call will take.
///
/// Bounds the catch-up work after the host stalls (tab in background,
/// debugger pause): excess wall time is dropped instead of replayed.
pub const MAX_STEPS_PER_FRAME: usize = 240;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    #[default]
    Stopped,
    Running,
}

#[derive(Debug, Clone)]
pub struct PlaybackController {
    simulation: Simulation,
    state: PlaybackState,
    /// Simulated seconds per wall-clock second.
    time_scale: f64,
    /// Simulated time owed to the integrator but not yet stepped.
    backlog: f64,
}

impl PlaybackController {
    pub fn new(simulation: Simulation) -> Self {
        Self {
            simulation,
            state: PlaybackState::Stopped,
            time_scale: 1.0,
            backlog: 0.0,
        }
    }

    /// Controller for `params`, stepping by `dt`, stopped at the initial state.
    pub fn for_scenario(params: ScenarioParameters, dt: f64) -> Result<Self, SimError> {
        Ok(Self::new(Simulation::validated(params, dt)?))
    }

    pub fn with_time_scale(mut self, time_scale: f64) -> Self {
        self.set_time_scale(time_scale);
        self
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == PlaybackState::Running
    }

    pub fn kind(&self) -> ScenarioKind {
        self.simulation.kind()
    }

    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }

    /// Negative or non-finite scales are treated as a freeze.
    pub fn set_time_scale(&mut self, time_scale: f64) {
        self.time_scale = if time_scale.is_finite() {
            time_scale.max(0.0)
        } else {
            0.0
        };
    }

    pub fn play(&mut self) {
        if self.state == PlaybackState::Stopped {
            log::debug!("play {}", self.kind());
            self.state = PlaybackState::Running;
        }
    }

    pub fn pause(&mut self) {
        if self.state == PlaybackState::Running {
            log::debug!("pause {} at t={:.3}s", self.kind(), self.simulation.clock().elapsed);
            self.state = PlaybackState::Stopped;
            self.backlog = 0.0;
        }
    }

    pub fn toggle(&mut self) {
        match self.state {
            PlaybackState::Stopped => self.play(),
            PlaybackState::Running => self.pause(),
        }
    }

    /// Back to the initial state, stopped.
    pub fn reset(&mut self) {
        self.simulation.reset();
        self.state = PlaybackState::Stopped;
        self.backlog = 0.0;
    }

    /// One host tick: exactly one step while running, nothing while stopped.
    pub fn advance(&mut self) -> StepOutcome {
        if !self.is_running() {
            return StepOutcome::default();
        }
        let outcome = self.simulation.step();
        self.after_steps(&outcome);
        outcome
    }

    /// Single step regardless of playback state; leaves the state unchanged.
    pub fn step_once(&mut self) -> StepOutcome {
        let outcome = self.simulation.step();
        self.after_steps(&outcome);
        outcome
    }

    /// Run as many fixed steps as `wall` seconds of real time cover at the
    /// current time scale, carrying the remainder to the next call.
    pub fn advance_wall(&mut self, wall: Duration) -> StepOutcome {
        if !self.is_running() {
            return StepOutcome::default();
        }

        let dt = self.simulation.dt();
        self.backlog += wall.as_secs_f64() * self.time_scale;
        let due = (self.backlog / dt).floor() as usize;
        let steps = due.min(MAX_STEPS_PER_FRAME);
        if due > steps {
            log::debug!("dropping {} steps of backlog", due - steps);
            self.backlog = 0.0;
        } else {
            self.backlog -= steps as f64 * dt;
        }

        let outcome = self.simulation.step_n(steps);
        self.after_steps(&outcome);
        outcome
    }

    fn after_steps(&mut self, outcome: &StepOutcome) {
        if outcome.halted && self.is_running() {
            log::info!(
                "{} finished at t={:.3}s",
                self.kind(),
                self.simulation.clock().elapsed
            );
            self.state = PlaybackState::Stopped;
            self.backlog = 0.0;
        }
    }

    /// Switch scenario (or reload parameters) and stop.
    ///
    /// Invalid parameters leave the current scenario and play state untouched.
    pub fn select(&mut self, params: ScenarioParameters) -> Result<(), SimError> {
        self.simulation = Simulation::validated(params, self.simulation.dt())?;
        self.state = PlaybackState::Stopped;
        self.backlog = 0.0;
        Ok(())
    }

    /// Apply slider changes. Keeps playing unless the change reset the state.
    pub fn set_parameters(&mut self, params: ScenarioParameters) -> bool {
        let reset = self.simulation.set_parameters(params);
        if reset {
            self.state = PlaybackState::Stopped;
            self.backlog = 0.0;
        }
        reset
    }

    /// Change the fixed step; the running scenario restarts.
    pub fn set_dt(&mut self, dt: f64) -> Result<(), SimError> {
        check_dt(dt)?;
        let params = self.simulation.parameters();
        self.simulation = Simulation::new(params, dt);
        self.state = PlaybackState::Stopped;
        self.backlog = 0.0;
        Ok(())
    }

    /// Close the switch onto the source and start the animation.
    pub fn charge(&mut self) -> Result<(), SimError> {
        self.simulation.set_circuit_mode(CircuitMode::Charging)?;
        self.play();
        Ok(())
    }

    /// Short the capacitor through the resistor and start the animation.
    pub fn discharge(&mut self) -> Result<(), SimError> {
        self.simulation.set_circuit_mode(CircuitMode::Discharging)?;
        self.play();
        Ok(())
    }

    pub fn frame(&self) -> Frame {
        self.simulation.frame()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::SpringParams;
    use crate::types::constants::DEFAULT_DT;

    fn pendulum() -> PlaybackController {
        PlaybackController::for_scenario(
            ScenarioParameters::defaults(ScenarioKind::Pendulum),
            DEFAULT_DT,
        )
        .unwrap()
    }

    #[test]
    fn test_starts_stopped_and_ignores_ticks() {
        let mut ctl = pendulum();
        assert_eq!(ctl.state(), PlaybackState::Stopped);

        let outcome = ctl.advance();
        assert_eq!(outcome.steps, 0);
        assert_eq!(ctl.frame().steps, 0);
    }

    #[test]
    fn test_each_tick_steps_once_while_running() {
        let mut ctl = pendulum();
        ctl.play();
        for _ in 0..5 {
            assert_eq!(ctl.advance().steps, 1);
        }
        assert_eq!(ctl.frame().steps, 5);
    }

    #[test]
    fn test_play_is_idempotent() {
        let mut ctl = pendulum();
        ctl.play();
        ctl.play();
        assert!(ctl.is_running());
        ctl.pause();
        assert!(!ctl.is_running());
        ctl.toggle();
        assert!(ctl.is_running());
    }

    #[test]
    fn test_reset_stops_and_rewinds() {
        let mut ctl = pendulum();
        ctl.play();
        ctl.advance();
        ctl.advance();

        ctl.reset();
        assert_eq!(ctl.state(), PlaybackState::Stopped);
        assert_eq!(ctl.frame().steps, 0);
        assert_eq!(ctl.frame().elapsed, 0.0);
    }

    #[test]
    fn test_step_once_while_paused() {
        let mut ctl = pendulum();
        assert_eq!(ctl.step_once().steps, 1);
        assert_eq!(ctl.state(), PlaybackState::Stopped);
    }

    #[test]
    fn test_wall_clock_mapping_carries_remainder() {
        let mut ctl = PlaybackController::for_scenario(
            ScenarioParameters::defaults(ScenarioKind::Spring),
            0.01,
        )
        .unwrap();
        ctl.play();

        // 25 ms covers two 10 ms steps, 5 ms carried over
        assert_eq!(ctl.advance_wall(Duration::from_millis(25)).steps, 2);
        assert_eq!(ctl.advance_wall(Duration::from_millis(6)).steps, 1);
        assert_eq!(ctl.frame().steps, 3);
    }

    #[test]
    fn test_time_scale_slows_playback() {
        let mut ctl = PlaybackController::for_scenario(
            ScenarioParameters::defaults(ScenarioKind::Spring),
            0.01,
        )
        .unwrap()
        .with_time_scale(0.5);
        ctl.play();

        assert_eq!(ctl.advance_wall(Duration::from_millis(100)).steps, 5);
    }

    #[test]
    fn test_stall_backlog_is_capped() {
        let mut ctl = pendulum();
        ctl.play();
        let outcome = ctl.advance_wall(Duration::from_secs(60));
        assert_eq!(outcome.steps, MAX_STEPS_PER_FRAME);
        // Excess dropped, the next short frame does not replay it
        assert_eq!(ctl.advance_wall(Duration::from_millis(1)).steps, 0);
    }

    #[test]
    fn test_circuit_auto_stops_when_settled() {
        let mut ctl = PlaybackController::for_scenario(
            ScenarioParameters::defaults(ScenarioKind::Circuit),
            DEFAULT_DT,
        )
        .unwrap();
        ctl.charge().unwrap();
        assert!(ctl.is_running());

        let mut ticks = 0;
        while ctl.is_running() {
            ctl.advance();
            ticks += 1;
            assert!(ticks <= 1_000, "never settled");
        }
        assert_eq!(ticks, 300);
    }

    #[test]
    fn test_select_switches_scenario_and_stops() {
        let mut ctl = pendulum();
        ctl.play();
        ctl.advance();

        ctl.select(ScenarioParameters::defaults(ScenarioKind::Spring))
            .unwrap();
        assert_eq!(ctl.kind(), ScenarioKind::Spring);
        assert_eq!(ctl.state(), PlaybackState::Stopped);
        assert_eq!(ctl.frame().steps, 0);
        assert_eq!(ctl.simulation().dt(), DEFAULT_DT);
    }

    #[test]
    fn test_select_rejects_invalid_parameters() {
        let mut ctl = pendulum();
        ctl.play();
        ctl.advance();
        let before = ctl.frame();

        let weightless = SpringParams {
            mass: -1.0,
            ..SpringParams::default()
        };
        assert!(matches!(
            ctl.select(ScenarioParameters::Spring(weightless)),
            Err(SimError::Parameters(_))
        ));
        assert_eq!(ctl.kind(), ScenarioKind::Pendulum);
        assert!(ctl.is_running());
        assert_eq!(ctl.frame(), before);
    }

    #[test]
    fn test_charge_on_pendulum_is_an_error() {
        let mut ctl = pendulum();
        assert!(ctl.charge().is_err());
        assert!(!ctl.is_running());
    }

    #[test]
    fn test_structural_change_stops_playback() {
        let mut ctl = pendulum();
        ctl.play();
        ctl.advance();

        let reset = ctl.set_parameters(ScenarioParameters::defaults(ScenarioKind::Ramp));
        assert!(reset);
        assert!(!ctl.is_running());
        assert_eq!(ctl.kind(), ScenarioKind::Ramp);
    }

    #[test]
    fn test_set_dt_rejects_zero() {
        let mut ctl = pendulum();
        assert!(ctl.set_dt(0.0).is_err());
        assert!(ctl.set_dt(0.005).is_ok());
        assert_eq!(ctl.simulation().dt(), 0.005);
    }
}
