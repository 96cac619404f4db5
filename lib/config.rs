//! TOML description of a complete Doppler-broadened spectrum run.
//!
//! Every table and key is optional; missing values fall back to the
//! reference four-level caesium scenario (852/1470/843 nm ladder in a 20 K
//! vapour). Frequencies share one angular-frequency unit (2π MHz by default,
//! see `units.doppler_factor`), wavelengths are in meters, velocities in m/s.
//!
//! ```toml
//! solver = "full"          # or "weak_probe"
//! policy = "abort"         # or "mark_undefined"
//!
//! [fields]
//! rabi = [1.0, 20.0, 10.0]
//! detuning = [0.0, 0.0, 0.0]
//! linewidth = [0.1, 0.1, 0.1]
//! decay = [10.0, 1.0, 1.0]
//! wavelength = [852e-9, 1470e-9, 843e-9]
//! direction = [1, -1, -1]
//!
//! [velocity]
//! start = -150.0
//! end = 150.0
//! num = 201
//!
//! [detuning]
//! start = -50.0
//! end = 50.0
//! num = 500
//!
//! [thermal]
//! temperature = 20.0       # K
//! mass_amu = 132.90545
//!
//! [units]
//! doppler_factor = 1e-6
//!
//! [integration]
//! rule = "rectangle"       # or "trapezoid", "simpson"
//! tail_tolerance = 1e-3
//! ```

use std::{ fs, path::Path };
use serde::Deserialize;
use crate::{
    constants::{ AMU, HZ_TO_MHZ, M_CS133, TAIL_TOLERANCE, T_DEFAULT },
    doppler::DopplerShift,
    error::{ Error, Result },
    fields::FieldSet,
    grid::Grid,
    integrate::{ DopplerIntegrator, QuadratureRule },
    steady::SolverKind,
    sweep::SingularityPolicy,
    thermal::MaxwellBoltzmann,
};

/// Per-field parameters as parallel sequences, probe first.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FieldsConfig {
    pub rabi: Vec<f64>,
    pub detuning: Vec<f64>,
    pub linewidth: Vec<f64>,
    pub decay: Vec<f64>,
    pub wavelength: Vec<f64>,
    pub direction: Vec<i64>,
}

impl Default for FieldsConfig {
    fn default() -> Self {
        Self {
            rabi: vec![1.0, 20.0, 10.0],
            detuning: vec![0.0, 0.0, 0.0],
            linewidth: vec![0.1, 0.1, 0.1],
            decay: vec![10.0, 1.0, 1.0],
            wavelength: vec![852e-9, 1470e-9, 843e-9],
            direction: vec![1, -1, -1],
        }
    }
}

/// Bounds and size of a uniform grid.
///
/// A one-point grid sits at `start` and needs an explicit `step`.
#[derive(Copy, Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GridConfig {
    pub start: f64,
    pub end: f64,
    pub num: usize,
    #[serde(default)]
    pub step: Option<f64>,
}

impl GridConfig {
    fn velocity_default() -> Self {
        Self { start: -150.0, end: 150.0, num: 201, step: None }
    }

    fn detuning_default() -> Self {
        Self { start: -50.0, end: 50.0, num: 500, step: None }
    }

    /// Build the grid.
    pub fn grid(&self) -> Result<Grid> {
        match (self.num, self.step) {
            (0, _) => Err(Error::invalid("grid must have at least one point")),
            (1, Some(step)) => Grid::single(self.start, step),
            (1, None) => Err(Error::invalid(
                "a one-point grid needs an explicit step")),
            (num, _) => Grid::linspace(self.start, self.end, num),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThermalConfig {
    /// Vapour temperature in kelvin.
    pub temperature: f64,
    /// Atomic mass in atomic mass units.
    pub mass_amu: f64,
}

impl Default for ThermalConfig {
    fn default() -> Self {
        Self { temperature: T_DEFAULT, mass_amu: M_CS133 / AMU }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UnitsConfig {
    /// Conversion from 2π Hz to the run's angular-frequency unit.
    pub doppler_factor: f64,
}

impl Default for UnitsConfig {
    fn default() -> Self { Self { doppler_factor: HZ_TO_MHZ } }
}

#[derive(Copy, Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IntegrationConfig {
    pub rule: QuadratureRule,
    pub tail_tolerance: f64,
}

impl Default for IntegrationConfig {
    fn default() -> Self {
        Self { rule: QuadratureRule::default(), tail_tolerance: TAIL_TOLERANCE }
    }
}

fn default_velocity() -> GridConfig { GridConfig::velocity_default() }

fn default_detuning() -> GridConfig { GridConfig::detuning_default() }

/// Complete description of a run.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    #[serde(default)]
    pub solver: SolverKind,
    #[serde(default)]
    pub policy: SingularityPolicy,
    #[serde(default)]
    pub fields: FieldsConfig,
    #[serde(default = "default_velocity")]
    pub velocity: GridConfig,
    #[serde(default = "default_detuning")]
    pub detuning: GridConfig,
    #[serde(default)]
    pub thermal: ThermalConfig,
    #[serde(default)]
    pub units: UnitsConfig,
    #[serde(default)]
    pub integration: IntegrationConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            solver: SolverKind::default(),
            policy: SingularityPolicy::default(),
            fields: FieldsConfig::default(),
            velocity: default_velocity(),
            detuning: default_detuning(),
            thermal: ThermalConfig::default(),
            units: UnitsConfig::default(),
            integration: IntegrationConfig::default(),
        }
    }
}

impl RunConfig {
    /// Parse and validate a configuration from TOML text.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Check that every derived object can be built.
    pub fn validate(&self) -> Result<()> {
        self.field_set()?;
        self.velocity_grid()?;
        self.detuning_grid()?;
        self.doppler()?;
        self.integrator()?;
        Ok(())
    }

    pub fn field_set(&self) -> Result<FieldSet> {
        let FieldsConfig {
            rabi,
            detuning,
            linewidth,
            decay,
            wavelength,
            direction,
        } = &self.fields;
        FieldSet::from_sequences(
            rabi, detuning, linewidth, decay, wavelength, direction)
    }

    pub fn velocity_grid(&self) -> Result<Grid> { self.velocity.grid() }

    pub fn detuning_grid(&self) -> Result<Grid> { self.detuning.grid() }

    pub fn distribution(&self) -> Result<MaxwellBoltzmann> {
        MaxwellBoltzmann::new(
            self.thermal.temperature, self.thermal.mass_amu * AMU)
    }

    pub fn doppler(&self) -> Result<DopplerShift> {
        let factor = self.units.doppler_factor;
        if !(factor.is_finite() && factor > 0.0) {
            return Err(Error::invalid(
                format!("doppler_factor must be positive, got {}", factor)));
        }
        Ok(DopplerShift::new(factor))
    }

    pub fn integrator(&self) -> Result<DopplerIntegrator> {
        DopplerIntegrator::new(self.distribution()?)
            .with_rule(self.integration.rule)
            .with_tail_tolerance(self.integration.tail_tolerance)
    }
}
