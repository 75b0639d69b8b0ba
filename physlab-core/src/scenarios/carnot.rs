//! Carnot cycle of an ideal gas (`nR = 1`).
//!
//! The four corner states follow from the reservoir temperatures, the
//! smallest volume and the isothermal expansion ratio:
//!
//! ```text
//!   P
//!   │ A
//!   │  ╲  T_hot isotherm        V_B = V_A · r
//!   │   B                        V_C = V_B · (T_hot/T_cold)^(1/(γ−1))
//!   │  D  ╲  adiabat             V_D = V_A · (T_hot/T_cold)^(1/(γ−1))
//!   │   ╲__ C  T_cold isotherm
//!   └────────────── V
//! ```
//!
//! Within a stage the volume moves linearly with the stage's progress and
//! pressure follows `PV = const` or `PV^γ = const`. Because every point is a
//! closed-form function of `(stage, progress)`, changing temperatures mid-run
//! needs no reset: the next step simply lands on the new curves.

use serde::{Deserialize, Serialize};

use crate::params::{CarnotParams, ScenarioParameters};
use crate::types::{constants, CarnotState, CycleStage, ScenarioKind};

use super::{Advance, ScenarioModel, ScenarioStatus, StepEvent};

/// Progress within this distance of 1.0 counts as a finished stage.
const STAGE_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CarnotEngine {
    pub params: CarnotParams,
}

/// Volume and pressure at one corner of the cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatePoint {
    pub volume: f64,
    pub pressure: f64,
}

/// Heat and work exchanged over one full cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CycleSummary {
    /// Heat absorbed from the hot reservoir during isothermal expansion.
    pub heat_in: f64,
    /// Heat rejected to the cold reservoir during isothermal compression.
    pub heat_out: f64,
    /// Net work done by the gas.
    pub work: f64,
}

/// Carnot efficiency `1 − T_cold/T_hot`.
pub fn carnot_efficiency(t_hot: f64, t_cold: f64) -> f64 {
    1.0 - t_cold / t_hot
}

impl CarnotEngine {
    pub fn new(params: CarnotParams) -> Self {
        Self { params }
    }

    pub fn efficiency(&self) -> f64 {
        carnot_efficiency(self.params.t_hot, self.params.t_cold)
    }

    fn adiabatic_ratio(&self) -> f64 {
        (self.params.t_hot / self.params.t_cold).powf(1.0 / (constants::GAMMA - 1.0))
    }

    /// Corners A, B, C, D in cycle order.
    pub fn corners(&self) -> [StatePoint; 4] {
        let p = &self.params;
        let k = self.adiabatic_ratio();
        let va = p.min_volume;
        let vb = va * p.expansion_ratio;
        let vc = vb * k;
        let vd = va * k;

        [
            StatePoint { volume: va, pressure: p.t_hot / va },
            StatePoint { volume: vb, pressure: p.t_hot / vb },
            StatePoint { volume: vc, pressure: p.t_cold / vc },
            StatePoint { volume: vd, pressure: p.t_cold / vd },
        ]
    }

    fn leg(&self, stage: CycleStage) -> (StatePoint, StatePoint) {
        let [a, b, c, d] = self.corners();
        match stage {
            CycleStage::IsothermalExpansion => (a, b),
            CycleStage::AdiabaticExpansion => (b, c),
            CycleStage::IsothermalCompression => (c, d),
            CycleStage::AdiabaticCompression => (d, a),
        }
    }

    /// Gas state at `progress` through `stage`.
    pub fn evaluate(&self, stage: CycleStage, progress: f64, cycles: u64) -> CarnotState {
        let (start, end) = self.leg(stage);
        let volume = start.volume + (end.volume - start.volume) * progress;

        let pressure = if stage.is_isothermal() {
            start.pressure * start.volume / volume
        } else {
            start.pressure * (start.volume / volume).powf(constants::GAMMA)
        };

        CarnotState {
            stage,
            progress,
            volume,
            pressure,
            temperature: pressure * volume,
            cycles,
        }
    }

    pub fn cycle_summary(&self) -> CycleSummary {
        let p = &self.params;
        let ln_r = p.expansion_ratio.ln();
        let heat_in = p.t_hot * ln_r;
        let heat_out = p.t_cold * ln_r;
        CycleSummary {
            heat_in,
            heat_out,
            work: heat_in - heat_out,
        }
    }
}

impl Default for CarnotEngine {
    fn default() -> Self {
        Self::new(CarnotParams::default())
    }
}

impl ScenarioModel for CarnotEngine {
    type State = CarnotState;

    fn kind(&self) -> ScenarioKind {
        ScenarioKind::Carnot
    }

    fn parameters(&self) -> ScenarioParameters {
        ScenarioParameters::Carnot(self.params)
    }

    fn initial_state(&self) -> CarnotState {
        self.evaluate(CycleStage::FIRST, 0.0, 0)
    }

    fn advance(&self, state: &CarnotState, _elapsed: f64, _dt: f64) -> Advance<CarnotState> {
        let mut stage = state.stage;
        let mut progress = state.progress + self.params.progress_step;
        let mut cycles = state.cycles;
        let mut events = Vec::new();

        if progress >= 1.0 - STAGE_TOLERANCE {
            progress = 0.0;
            stage = stage.next();
            events.push(StepEvent::StageAdvanced { stage });
            if stage == CycleStage::FIRST {
                cycles += 1;
                events.push(StepEvent::CycleCompleted { cycles });
            }
        }

        Advance::with_events(self.evaluate(stage, progress, cycles), events)
    }

    fn status(&self, state: &CarnotState, _elapsed: f64) -> ScenarioStatus {
        ScenarioStatus::Carnot {
            stage: state.stage,
            progress: state.progress,
            cycles: state.cycles,
            efficiency: self.efficiency(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn quarter_steps() -> CarnotEngine {
        CarnotEngine::new(CarnotParams {
            progress_step: 0.25,
            ..CarnotParams::default()
        })
    }

    #[test]
    fn test_equal_reservoirs_have_zero_efficiency() {
        assert_eq!(carnot_efficiency(400.0, 400.0), 0.0);
    }

    #[rstest]
    #[case(500.0, 600.0)]
    #[case(350.0, 1_000.0)]
    fn test_efficiency_grows_with_hot_reservoir(#[case] lower: f64, #[case] higher: f64) {
        let t_cold = 300.0;
        assert!(carnot_efficiency(higher, t_cold) > carnot_efficiency(lower, t_cold));
    }

    #[rstest]
    #[case(300.0, 200.0)]
    #[case(100.0, 50.0)]
    fn test_efficiency_grows_as_cold_reservoir_drops(#[case] higher: f64, #[case] lower: f64) {
        let t_hot = 500.0;
        assert!(carnot_efficiency(t_hot, lower) > carnot_efficiency(t_hot, higher));
    }

    #[test]
    fn test_corners_lie_on_isotherms() {
        let engine = CarnotEngine::default();
        let [a, b, c, d] = engine.corners();
        assert_relative_eq!(a.pressure * a.volume, 500.0, epsilon = 1e-9);
        assert_relative_eq!(b.pressure * b.volume, 500.0, epsilon = 1e-9);
        assert_relative_eq!(c.pressure * c.volume, 300.0, epsilon = 1e-9);
        assert_relative_eq!(d.pressure * d.volume, 300.0, epsilon = 1e-9);
    }

    #[test]
    fn test_adiabatic_leg_ends_at_cold_temperature() {
        let engine = CarnotEngine::default();
        let end = engine.evaluate(CycleStage::AdiabaticExpansion, 1.0, 0);
        assert_relative_eq!(end.temperature, 300.0, max_relative = 1e-9);

        let mid = engine.evaluate(CycleStage::AdiabaticExpansion, 0.5, 0);
        assert!(mid.temperature < 500.0 && mid.temperature > 300.0);
    }

    #[test]
    fn test_isothermal_leg_holds_temperature() {
        let engine = CarnotEngine::default();
        for i in 0..=10 {
            let s = engine.evaluate(CycleStage::IsothermalExpansion, i as f64 / 10.0, 0);
            assert_relative_eq!(s.temperature, 500.0, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_four_transitions_complete_one_cycle() {
        let engine = quarter_steps();
        let mut state = engine.initial_state();
        let mut transitions = 0;

        while transitions < 4 {
            let step = engine.advance(&state, 0.0, 0.0);
            transitions += step
                .events
                .iter()
                .filter(|e| matches!(e, StepEvent::StageAdvanced { .. }))
                .count();
            state = step.state;
            if transitions < 4 {
                assert_eq!(state.cycles, 0);
            }
        }

        assert_eq!(state.cycles, 1);
        assert_eq!(state.stage, CycleStage::FIRST);
        assert_eq!(state.progress, 0.0);
        assert_relative_eq!(state.volume, engine.params.min_volume, max_relative = 1e-12);
    }

    #[test]
    fn test_hundredth_steps_still_roll_over() {
        let engine = CarnotEngine::default();
        let mut state = engine.initial_state();
        for _ in 0..100 {
            state = engine.advance(&state, 0.0, 0.0).state;
        }
        assert_eq!(state.stage, CycleStage::AdiabaticExpansion);
    }

    #[test]
    fn test_cycle_work_matches_efficiency() {
        let engine = CarnotEngine::default();
        let summary = engine.cycle_summary();
        assert_relative_eq!(summary.work / summary.heat_in, engine.efficiency(), epsilon = 1e-12);
    }
}
