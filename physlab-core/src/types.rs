//! Core types for the simulation core.
//!
//! Mechanical scenarios use SI-like units but nothing enforces them: the
//! pendulum demo happily runs with a length of 150 "pixels" and g = 9.8.
//! The only requirement is that parameters of one scenario agree with each
//! other.
//!
//! Coordinate system for the 2-D scenarios:
//! - X: horizontal, positive to the right
//! - Y: vertical, positive upward, ground at y = 0

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub};

// =============================================================================
// Vec2 - 2D Vector
// =============================================================================

/// A 2D vector used for positions and velocities of bodies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Squared magnitude (avoids sqrt for comparisons)
    pub fn magnitude_squared(&self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    pub fn magnitude(&self) -> f64 {
        self.magnitude_squared().sqrt()
    }

    pub fn dot(&self, other: &Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Unit vector pointing at `angle` radians below the +X axis.
    ///
    /// Used for ramp directions, where a positive angle descends to the right.
    pub fn downhill(angle: f64) -> Self {
        Self::new(angle.cos(), -angle.sin())
    }
}

impl Add for Vec2 {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, other: Self) {
        self.x += other.x;
        self.y += other.y;
    }
}

impl Sub for Vec2 {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Self;
    fn mul(self, scalar: f64) -> Self {
        Self::new(self.x * scalar, self.y * scalar)
    }
}

impl Neg for Vec2 {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl Default for Vec2 {
    fn default() -> Self {
        Self::ZERO
    }
}

// =============================================================================
// Scenario identity
// =============================================================================

/// The physical scenario a simulation is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    Pendulum,
    FreeFall,
    Ramp,
    Spring,
    Carnot,
    Circuit,
}

impl ScenarioKind {
    pub const ALL: [ScenarioKind; 6] = [
        ScenarioKind::Pendulum,
        ScenarioKind::FreeFall,
        ScenarioKind::Ramp,
        ScenarioKind::Spring,
        ScenarioKind::Carnot,
        ScenarioKind::Circuit,
    ];

    /// Whether this scenario reports kinetic/potential energy bars.
    pub fn has_energy(&self) -> bool {
        matches!(
            self,
            ScenarioKind::Pendulum | ScenarioKind::FreeFall | ScenarioKind::Ramp | ScenarioKind::Spring
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScenarioKind::Pendulum => "pendulum",
            ScenarioKind::FreeFall => "free_fall",
            ScenarioKind::Ramp => "ramp",
            ScenarioKind::Spring => "spring",
            ScenarioKind::Carnot => "carnot",
            ScenarioKind::Circuit => "circuit",
        }
    }
}

impl fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Mechanical states
// =============================================================================

/// Pendulum bob described by its angle from the downward vertical.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PendulumState {
    /// Radians, 0 = hanging straight down, positive counter-clockwise.
    pub angle: f64,
    /// Radians per second.
    pub angular_velocity: f64,
}

impl PendulumState {
    pub fn released_at(angle: f64) -> Self {
        Self {
            angle,
            angular_velocity: 0.0,
        }
    }
}

/// What a body is currently touching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Contact {
    /// Unconstrained flight under gravity.
    Airborne,
    /// Clamped to the ramp surface.
    Ramp,
    /// Lying on the ground with no vertical motion left.
    Resting,
}

/// A round body moving in the vertical plane (free fall and ramp scenarios).
///
/// `position` is the body's center, so ground contact happens when
/// `position.y - radius <= 0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyState {
    pub position: Vec2,
    pub velocity: Vec2,
    pub contact: Contact,
}

impl BodyState {
    pub fn new(position: Vec2, velocity: Vec2, contact: Contact) -> Self {
        Self {
            position,
            velocity,
            contact,
        }
    }

    /// Body at rest in the air at a given position
    pub fn at_rest(position: Vec2) -> Self {
        Self::new(position, Vec2::ZERO, Contact::Airborne)
    }
}

/// Mass hanging from a vertical spring.
///
/// `displacement` is measured downward from the spring's natural length.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpringState {
    pub displacement: f64,
    pub velocity: f64,
}

// =============================================================================
// Thermodynamic cycle
// =============================================================================

/// One leg of the Carnot cycle, in cycle order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CycleStage {
    IsothermalExpansion,
    AdiabaticExpansion,
    IsothermalCompression,
    AdiabaticCompression,
}

impl CycleStage {
    pub const FIRST: CycleStage = CycleStage::IsothermalExpansion;

    /// The stage that follows this one; wraps after adiabatic compression.
    pub fn next(&self) -> Self {
        match self {
            CycleStage::IsothermalExpansion => CycleStage::AdiabaticExpansion,
            CycleStage::AdiabaticExpansion => CycleStage::IsothermalCompression,
            CycleStage::IsothermalCompression => CycleStage::AdiabaticCompression,
            CycleStage::AdiabaticCompression => CycleStage::IsothermalExpansion,
        }
    }

    pub fn is_isothermal(&self) -> bool {
        matches!(
            self,
            CycleStage::IsothermalExpansion | CycleStage::IsothermalCompression
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            CycleStage::IsothermalExpansion => "A→B isothermal expansion",
            CycleStage::AdiabaticExpansion => "B→C adiabatic expansion",
            CycleStage::IsothermalCompression => "C→D isothermal compression",
            CycleStage::AdiabaticCompression => "D→A adiabatic compression",
        }
    }
}

/// Working gas of the Carnot engine at one point of the cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CarnotState {
    pub stage: CycleStage,
    /// Normalized position within `stage`, in `[0, 1)`.
    pub progress: f64,
    pub volume: f64,
    pub pressure: f64,
    pub temperature: f64,
    /// Completed cycles since the last reset.
    pub cycles: u64,
}

// =============================================================================
// RC circuit
// =============================================================================

/// Which exponential the RC circuit is following.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitMode {
    #[default]
    Idle,
    Charging,
    Discharging,
}

/// Capacitor voltage and the derived circuit quantities.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CircuitState {
    pub mode: CircuitMode,
    /// Volts across the capacitor.
    pub voltage: f64,
    /// Amperes, positive while charging.
    pub current: f64,
    /// Coulombs stored, `C * V`.
    pub charge: f64,
    /// Capacitor voltage when `mode` was entered.
    pub start_voltage: f64,
}

impl CircuitState {
    /// Fully discharged capacitor with the switch open.
    pub fn discharged() -> Self {
        Self {
            mode: CircuitMode::Idle,
            voltage: 0.0,
            current: 0.0,
            charge: 0.0,
            start_voltage: 0.0,
        }
    }
}

// =============================================================================
// Simulation state
// =============================================================================

/// Snapshot of whichever scenario is running.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SimulationState {
    Pendulum(PendulumState),
    Body(BodyState),
    Spring(SpringState),
    Carnot(CarnotState),
    Circuit(CircuitState),
}

impl From<PendulumState> for SimulationState {
    fn from(state: PendulumState) -> Self {
        SimulationState::Pendulum(state)
    }
}

impl From<BodyState> for SimulationState {
    fn from(state: BodyState) -> Self {
        SimulationState::Body(state)
    }
}

impl From<SpringState> for SimulationState {
    fn from(state: SpringState) -> Self {
        SimulationState::Spring(state)
    }
}

impl From<CarnotState> for SimulationState {
    fn from(state: CarnotState) -> Self {
        SimulationState::Carnot(state)
    }
}

impl From<CircuitState> for SimulationState {
    fn from(state: CircuitState) -> Self {
        SimulationState::Circuit(state)
    }
}

// =============================================================================
// Simulation clock
// =============================================================================

/// Simulated time and the fixed step used to advance it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationClock {
    /// Seconds of simulated time since the last reset.
    pub elapsed: f64,
    /// Fixed step size in seconds.
    pub dt: f64,
    /// Steps taken since the last reset.
    pub steps: u64,
}

impl SimulationClock {
    pub fn new(dt: f64) -> Self {
        Self {
            elapsed: 0.0,
            dt,
            steps: 0,
        }
    }

    /// Advance by one step. Elapsed time is recomputed from the step count so
    /// it never accumulates rounding drift.
    pub fn tick(&mut self) {
        self.steps += 1;
        self.elapsed = self.steps as f64 * self.dt;
    }

    pub fn reset(&mut self) {
        self.elapsed = 0.0;
        self.steps = 0;
    }
}

impl Default for SimulationClock {
    fn default() -> Self {
        Self::new(constants::DEFAULT_DT)
    }
}

// =============================================================================
// Physical Constants
// =============================================================================

/// Physical constants used in the simulation.
pub mod constants {
    /// Gravitational acceleration used by the browser demos
    pub const GRAVITY: f64 = 9.8;

    /// Heat capacity ratio of a diatomic ideal gas
    pub const GAMMA: f64 = 1.4;

    /// One animation frame at 60 Hz
    pub const DEFAULT_DT: f64 = 1.0 / 60.0;

    /// Number of time constants after which an RC transient counts as settled
    pub const SETTLING_TIME_CONSTANTS: f64 = 5.0;

    /// Small value for floating-point comparisons
    pub const EPSILON: f64 = 1e-10;
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec2_operations() {
        let a = Vec2::new(1.0, 2.0);
        let b = Vec2::new(4.0, 5.0);

        assert_eq!(a + b, Vec2::new(5.0, 7.0));
        assert_eq!(a - b, Vec2::new(-3.0, -3.0));
        assert_eq!(a * 2.0, Vec2::new(2.0, 4.0));
        assert_eq!(-a, Vec2::new(-1.0, -2.0));
        assert_eq!(a.dot(&b), 14.0);
    }

    #[test]
    fn test_vec2_downhill_is_unit() {
        let d = Vec2::downhill(std::f64::consts::FRAC_PI_6);
        assert!((d.magnitude() - 1.0).abs() < 1e-12);
        assert!(d.x > 0.0 && d.y < 0.0);
    }

    #[test]
    fn test_cycle_stage_order_wraps() {
        let mut stage = CycleStage::FIRST;
        for _ in 0..4 {
            stage = stage.next();
        }
        assert_eq!(stage, CycleStage::FIRST);
        assert!(CycleStage::IsothermalCompression.is_isothermal());
        assert!(!CycleStage::AdiabaticExpansion.is_isothermal());
    }

    #[test]
    fn test_clock_tick_and_reset() {
        let mut clock = SimulationClock::new(0.5);
        clock.tick();
        clock.tick();
        assert_eq!(clock.steps, 2);
        assert!((clock.elapsed - 1.0).abs() < 1e-12);

        clock.reset();
        assert_eq!(clock.steps, 0);
        assert_eq!(clock.elapsed, 0.0);
        assert_eq!(clock.dt, 0.5);
    }

    #[test]
    fn test_state_serializes_with_kind_tag() {
        let state: SimulationState = PendulumState::released_at(0.5).into();
        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains("\"kind\":\"pendulum\""), "{json}");
    }
}
