//! User-adjustable scenario parameters.
//!
//! Parameters are plain data: the host maps slider values onto them, and a
//! scenario model owns one copy for the duration of a run. Nothing in the
//! stepping path checks them. Hosts that accept free-form input should call
//! [`ScenarioParameters::validate`] before handing them to a simulation.

use serde::{Deserialize, Serialize};

use crate::error::ParameterError;
use crate::types::{constants, ScenarioKind};

/// Simple pendulum.
///
/// Preconditions: `length > 0`, `mass > 0`, `gravity >= 0`, `0 < damping <= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PendulumParams {
    pub length: f64,
    pub mass: f64,
    pub gravity: f64,
    /// Per-step multiplier on angular velocity, 1.0 = lossless.
    pub damping: f64,
    /// Release angle in radians from the downward vertical.
    pub initial_angle: f64,
}

impl Default for PendulumParams {
    fn default() -> Self {
        Self {
            length: 150.0,
            mass: 1.0,
            gravity: constants::GRAVITY,
            damping: 1.0,
            initial_angle: -std::f64::consts::FRAC_PI_3,
        }
    }
}

impl PendulumParams {
    /// Small-oscillation angular frequency `sqrt(g/L)`.
    pub fn angular_frequency(&self) -> f64 {
        (self.gravity / self.length).sqrt()
    }

    /// Period of small oscillations, `2π·sqrt(L/g)`.
    pub fn small_angle_period(&self) -> f64 {
        2.0 * std::f64::consts::PI / self.angular_frequency()
    }
}

/// Ball dropped onto the ground, optionally between two walls.
///
/// Preconditions: `mass > 0`, `radius >= 0`, `0 < damping <= 1`,
/// `initial_height >= radius`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FreeFallParams {
    pub mass: f64,
    pub radius: f64,
    pub gravity: f64,
    /// Fraction of the normal speed kept on each bounce.
    pub damping: f64,
    /// Height of the ball's center at release.
    pub initial_height: f64,
    pub initial_x: f64,
    pub initial_velocity_x: f64,
    /// Distance between the walls at `x = 0` and `x = width`; no walls if unset.
    pub width: Option<f64>,
}

impl Default for FreeFallParams {
    fn default() -> Self {
        Self {
            mass: 1.0,
            radius: 0.25,
            gravity: constants::GRAVITY,
            damping: 0.8,
            initial_height: 10.0,
            initial_x: 5.0,
            initial_velocity_x: 0.0,
            width: None,
        }
    }
}

/// Ball released at the top of an inclined ramp that ends above the ground.
///
/// Preconditions: `mass > 0`, `0 < angle < π/2`, `length > 0`,
/// `bottom_height >= 0`, `friction >= 0`, `0 < damping <= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RampParams {
    pub mass: f64,
    pub radius: f64,
    pub gravity: f64,
    /// Incline in radians below the horizontal.
    pub angle: f64,
    /// Length measured along the slope.
    pub length: f64,
    /// Height of the ramp's lower end above the ground.
    pub bottom_height: f64,
    /// Kinetic friction coefficient between body and ramp.
    pub friction: f64,
    /// Bounce damping once the body reaches the ground.
    pub damping: f64,
    pub width: Option<f64>,
}

impl Default for RampParams {
    fn default() -> Self {
        Self {
            mass: 1.0,
            radius: 0.25,
            gravity: constants::GRAVITY,
            angle: std::f64::consts::FRAC_PI_6,
            length: 8.0,
            bottom_height: 2.0,
            friction: 0.0,
            damping: 0.7,
            width: None,
        }
    }
}

impl RampParams {
    /// Horizontal extent of the ramp.
    pub fn run(&self) -> f64 {
        self.length * self.angle.cos()
    }

    /// Height of the ramp surface at its top end.
    pub fn top_height(&self) -> f64 {
        self.bottom_height + self.length * self.angle.sin()
    }
}

/// Mass hanging from a vertical spring.
///
/// Preconditions: `mass > 0`, `stiffness > 0`, `0 < damping <= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpringParams {
    pub mass: f64,
    /// Spring constant `k`.
    pub stiffness: f64,
    pub gravity: f64,
    pub damping: f64,
    /// Displacement below the natural length at release.
    pub initial_displacement: f64,
}

impl Default for SpringParams {
    fn default() -> Self {
        Self {
            mass: 1.0,
            stiffness: 4.0,
            gravity: constants::GRAVITY,
            damping: 1.0,
            initial_displacement: 0.0,
        }
    }
}

impl SpringParams {
    /// Angular frequency `sqrt(k/m)`.
    pub fn angular_frequency(&self) -> f64 {
        (self.stiffness / self.mass).sqrt()
    }

    /// Displacement at which the spring force balances gravity.
    pub fn equilibrium(&self) -> f64 {
        self.mass * self.gravity / self.stiffness
    }
}

/// Carnot engine between two reservoirs.
///
/// Preconditions: `t_hot >= t_cold > 0`, `min_volume > 0`,
/// `expansion_ratio >= 1`, `0 < progress_step <= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarnotParams {
    /// Hot reservoir temperature in kelvin.
    pub t_hot: f64,
    /// Cold reservoir temperature in kelvin.
    pub t_cold: f64,
    /// Volume at state A, the start of isothermal expansion.
    pub min_volume: f64,
    /// `V_B / V_A` along the hot isotherm.
    pub expansion_ratio: f64,
    /// Stage progress added on every step.
    pub progress_step: f64,
}

impl Default for CarnotParams {
    fn default() -> Self {
        Self {
            t_hot: 500.0,
            t_cold: 300.0,
            min_volume: 1.0,
            expansion_ratio: 2.0,
            progress_step: 0.01,
        }
    }
}

/// Series RC circuit with an ideal DC source.
///
/// Preconditions: `resistance > 0`, `capacitance > 0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CircuitParams {
    /// Ohms.
    pub resistance: f64,
    /// Farads.
    pub capacitance: f64,
    /// Source voltage in volts.
    pub source_voltage: f64,
}

impl Default for CircuitParams {
    fn default() -> Self {
        Self {
            resistance: 1_000.0,
            capacitance: 0.001,
            source_voltage: 5.0,
        }
    }
}

impl CircuitParams {
    /// Time constant `τ = R·C` in seconds.
    pub fn time_constant(&self) -> f64 {
        self.resistance * self.capacitance
    }
}

/// Parameters of any scenario, tagged by scenario kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "scenario", rename_all = "snake_case")]
pub enum ScenarioParameters {
    Pendulum(PendulumParams),
    FreeFall(FreeFallParams),
    Ramp(RampParams),
    Spring(SpringParams),
    Carnot(CarnotParams),
    Circuit(CircuitParams),
}

impl ScenarioParameters {
    pub fn kind(&self) -> ScenarioKind {
        match self {
            ScenarioParameters::Pendulum(_) => ScenarioKind::Pendulum,
            ScenarioParameters::FreeFall(_) => ScenarioKind::FreeFall,
            ScenarioParameters::Ramp(_) => ScenarioKind::Ramp,
            ScenarioParameters::Spring(_) => ScenarioKind::Spring,
            ScenarioParameters::Carnot(_) => ScenarioKind::Carnot,
            ScenarioParameters::Circuit(_) => ScenarioKind::Circuit,
        }
    }

    /// Default parameters for a scenario kind.
    pub fn defaults(kind: ScenarioKind) -> Self {
        match kind {
            ScenarioKind::Pendulum => ScenarioParameters::Pendulum(PendulumParams::default()),
            ScenarioKind::FreeFall => ScenarioParameters::FreeFall(FreeFallParams::default()),
            ScenarioKind::Ramp => ScenarioParameters::Ramp(RampParams::default()),
            ScenarioKind::Spring => ScenarioParameters::Spring(SpringParams::default()),
            ScenarioKind::Carnot => ScenarioParameters::Carnot(CarnotParams::default()),
            ScenarioKind::Circuit => ScenarioParameters::Circuit(CircuitParams::default()),
        }
    }

    /// Check the documented preconditions of every field.
    pub fn validate(&self) -> Result<(), ParameterError> {
        match self {
            ScenarioParameters::Pendulum(p) => {
                positive("length", p.length)?;
                positive("mass", p.mass)?;
                non_negative("gravity", p.gravity)?;
                damping(p.damping)?;
                finite("initial_angle", p.initial_angle)
            }
            ScenarioParameters::FreeFall(p) => {
                positive("mass", p.mass)?;
                non_negative("radius", p.radius)?;
                non_negative("gravity", p.gravity)?;
                damping(p.damping)?;
                finite("initial_x", p.initial_x)?;
                finite("initial_velocity_x", p.initial_velocity_x)?;
                if !(p.initial_height.is_finite() && p.initial_height >= p.radius) {
                    return Err(ParameterError::OutOfRange {
                        name: "initial_height",
                        value: p.initial_height,
                        expected: "at least the ball radius",
                    });
                }
                walls(p.width, p.radius)
            }
            ScenarioParameters::Ramp(p) => {
                positive("mass", p.mass)?;
                non_negative("radius", p.radius)?;
                non_negative("gravity", p.gravity)?;
                positive("length", p.length)?;
                non_negative("bottom_height", p.bottom_height)?;
                non_negative("friction", p.friction)?;
                damping(p.damping)?;
                if !(p.angle > 0.0 && p.angle < std::f64::consts::FRAC_PI_2) {
                    return Err(ParameterError::OutOfRange {
                        name: "angle",
                        value: p.angle,
                        expected: "strictly between 0 and π/2",
                    });
                }
                walls(p.width, p.radius)
            }
            ScenarioParameters::Spring(p) => {
                positive("mass", p.mass)?;
                positive("stiffness", p.stiffness)?;
                non_negative("gravity", p.gravity)?;
                damping(p.damping)?;
                finite("initial_displacement", p.initial_displacement)
            }
            ScenarioParameters::Carnot(p) => {
                positive("t_cold", p.t_cold)?;
                positive("min_volume", p.min_volume)?;
                if !(p.t_hot.is_finite() && p.t_hot >= p.t_cold) {
                    return Err(ParameterError::OutOfRange {
                        name: "t_hot",
                        value: p.t_hot,
                        expected: "at least t_cold",
                    });
                }
                if !(p.expansion_ratio.is_finite() && p.expansion_ratio >= 1.0) {
                    return Err(ParameterError::OutOfRange {
                        name: "expansion_ratio",
                        value: p.expansion_ratio,
                        expected: "at least 1",
                    });
                }
                if !(p.progress_step > 0.0 && p.progress_step <= 1.0) {
                    return Err(ParameterError::OutOfRange {
                        name: "progress_step",
                        value: p.progress_step,
                        expected: "in (0, 1]",
                    });
                }
                Ok(())
            }
            ScenarioParameters::Circuit(p) => {
                positive("resistance", p.resistance)?;
                positive("capacitance", p.capacitance)?;
                finite("source_voltage", p.source_voltage)
            }
        }
    }
}

fn finite(name: &'static str, value: f64) -> Result<(), ParameterError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ParameterError::NotFinite { name, value })
    }
}

fn positive(name: &'static str, value: f64) -> Result<(), ParameterError> {
    finite(name, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(ParameterError::OutOfRange {
            name,
            value,
            expected: "greater than 0",
        })
    }
}

fn non_negative(name: &'static str, value: f64) -> Result<(), ParameterError> {
    finite(name, value)?;
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ParameterError::OutOfRange {
            name,
            value,
            expected: "at least 0",
        })
    }
}

fn damping(value: f64) -> Result<(), ParameterError> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(ParameterError::OutOfRange {
            name: "damping",
            value,
            expected: "in (0, 1]",
        })
    }
}

fn walls(width: Option<f64>, radius: f64) -> Result<(), ParameterError> {
    match width {
        Some(w) if !(w.is_finite() && w > 2.0 * radius) => Err(ParameterError::OutOfRange {
            name: "width",
            value: w,
            expected: "wider than the ball",
        }),
        _ => Ok(()),
    }
}
