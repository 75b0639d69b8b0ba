//! Python bindings for the physlab simulation core.
//!
//! Provides a simple Python API:
//!
//! ```python
//! from physlab import Lab
//!
//! lab = Lab("pendulum")
//! lab.play()
//!
//! for _ in range(100):
//!     lab.advance()
//!     print(lab.energy()["total"])
//!
//! rc = Lab.from_preset("presets", "rc_circuit")
//! rc.charge()
//! while rc.running:
//!     rc.advance()
//! ```

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyDict;

use physlab_core::types::constants::DEFAULT_DT;
use physlab_core::{
    PlaybackController, PresetLoader, ScenarioKind, ScenarioParameters, StepEvent, StepOutcome,
};

fn value_error(err: impl std::fmt::Display) -> PyErr {
    PyValueError::new_err(err.to_string())
}

fn parse_kind(name: &str) -> PyResult<ScenarioKind> {
    ScenarioKind::ALL
        .into_iter()
        .find(|kind| kind.as_str() == name)
        .ok_or_else(|| {
            let known: Vec<&str> = ScenarioKind::ALL.iter().map(|k| k.as_str()).collect();
            value_error(format!(
                "unknown scenario `{name}`, expected one of: {}",
                known.join(", ")
            ))
        })
}

fn event_names(outcome: &StepOutcome) -> Vec<String> {
    outcome
        .events
        .iter()
        .map(|event| match event {
            StepEvent::Bounce { .. } => "bounce".to_string(),
            StepEvent::WallHit { .. } => "wall_hit".to_string(),
            StepEvent::LeftRamp => "left_ramp".to_string(),
            StepEvent::CameToRest => "came_to_rest".to_string(),
            StepEvent::StageAdvanced { stage } => format!("stage:{}", stage.label()),
            StepEvent::CycleCompleted { cycles } => format!("cycle:{cycles}"),
            StepEvent::Settled => "settled".to_string(),
        })
        .collect()
}

/// One interactive demo: a scenario plus its play/pause state.
///
/// Call `advance()` once per animation frame; it only steps while playing.
#[pyclass]
pub struct Lab {
    controller: PlaybackController,
}

#[pymethods]
impl Lab {
    /// Create a lab for `scenario` with default parameters.
    ///
    /// `params_json` optionally overrides them with a JSON object such as
    /// `{"scenario": "spring", "stiffness": 9.0}`.
    #[new]
    #[pyo3(signature = (scenario = "pendulum", dt = DEFAULT_DT, params_json = None))]
    fn new(scenario: &str, dt: f64, params_json: Option<&str>) -> PyResult<Self> {
        let params = match params_json {
            Some(json) => serde_json::from_str::<ScenarioParameters>(json).map_err(value_error)?,
            None => ScenarioParameters::defaults(parse_kind(scenario)?),
        };
        let controller = PlaybackController::for_scenario(params, dt).map_err(value_error)?;
        Ok(Self { controller })
    }

    /// Load `<directory>/<name>.yaml`.
    #[staticmethod]
    fn from_preset(directory: &str, name: &str) -> PyResult<Self> {
        let preset = PresetLoader::new(directory)
            .load(name)
            .map_err(value_error)?;
        Ok(Self {
            controller: preset.controller(),
        })
    }

    /// Names of all presets in `directory`.
    #[staticmethod]
    fn presets(directory: &str) -> PyResult<Vec<String>> {
        PresetLoader::new(directory).list().map_err(value_error)
    }

    /// Scenario name, e.g. "free_fall".
    #[getter]
    fn scenario(&self) -> &'static str {
        self.controller.kind().as_str()
    }

    /// Current simulation time in seconds.
    #[getter]
    fn time(&self) -> f64 {
        self.controller.simulation().clock().elapsed
    }

    #[getter]
    fn running(&self) -> bool {
        self.controller.is_running()
    }

    #[getter]
    fn time_scale(&self) -> f64 {
        self.controller.time_scale()
    }

    #[setter]
    fn set_time_scale(&mut self, time_scale: f64) {
        self.controller.set_time_scale(time_scale);
    }

    fn play(&mut self) {
        self.controller.play();
    }

    fn pause(&mut self) {
        self.controller.pause();
    }

    fn toggle(&mut self) {
        self.controller.toggle();
    }

    /// Back to the initial state, paused.
    fn reset(&mut self) {
        self.controller.reset();
    }

    /// One animation frame. Returns the names of events that occurred.
    fn advance(&mut self) -> Vec<String> {
        event_names(&self.controller.advance())
    }

    /// Advance by `seconds` of wall-clock time at the current time scale.
    fn advance_wall(&mut self, seconds: f64) -> PyResult<Vec<String>> {
        let wall = std::time::Duration::try_from_secs_f64(seconds).map_err(value_error)?;
        Ok(event_names(&self.controller.advance_wall(wall)))
    }

    /// Take `steps` steps regardless of play state, stopping early once a
    /// transient settles. Returns the number of steps taken.
    fn step_n(&mut self, steps: usize) -> usize {
        let mut taken = 0;
        for _ in 0..steps {
            let outcome = self.controller.step_once();
            taken += outcome.steps;
            if outcome.halted {
                break;
            }
        }
        taken
    }

    /// Replace the parameters from a JSON object. Returns True if the
    /// change reset the scenario.
    fn set_parameters(&mut self, params_json: &str) -> PyResult<bool> {
        let params: ScenarioParameters = serde_json::from_str(params_json).map_err(value_error)?;
        params.validate().map_err(value_error)?;
        Ok(self.controller.set_parameters(params))
    }

    /// Close the RC circuit's switch onto the source and start playing.
    fn charge(&mut self) -> PyResult<()> {
        self.controller.charge().map_err(value_error)
    }

    /// Discharge the RC circuit's capacitor and start playing.
    fn discharge(&mut self) -> PyResult<()> {
        self.controller.discharge().map_err(value_error)
    }

    /// Full frame (state, energy, status) as a JSON string.
    fn frame_json(&self) -> PyResult<String> {
        serde_json::to_string(&self.controller.frame()).map_err(value_error)
    }

    /// Energy breakdown as a dict, or None for non-mechanical scenarios.
    fn energy(&self, py: Python<'_>) -> PyResult<Option<PyObject>> {
        let Some(budget) = self.controller.simulation().energy_budget() else {
            return Ok(None);
        };
        let dict = PyDict::new_bound(py);
        dict.set_item("kinetic", budget.current.kinetic)?;
        dict.set_item("potential", budget.current.potential)?;
        dict.set_item("spring_potential", budget.current.spring_potential)?;
        dict.set_item("total", budget.current.total)?;
        dict.set_item("initial_total", budget.initial_total)?;
        dict.set_item("dissipated", budget.dissipated)?;
        Ok(Some(dict.into_any().unbind()))
    }

    fn __repr__(&self) -> String {
        let state = if self.controller.is_running() {
            "running"
        } else {
            "paused"
        };
        format!(
            "Lab({}, t={:.3}s, {state})",
            self.controller.kind(),
            self.time()
        )
    }
}

/// Python module definition.
#[pymodule]
fn physlab(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<Lab>()?;
    m.add("SCENARIOS", ScenarioKind::ALL.map(|k| k.as_str()).to_vec())?;
    Ok(())
}
