//! Doppler averaging of a response surface over a thermal velocity
//! distribution.
//!
//! Each probe-detuning column of an `M × J` response surface is integrated
//! against the velocity distribution sampled on the velocity grid:
//! ```text
//! S[j] = Σ_i w_i R[i, j] p(v_i)
//! ```
//! where the quadrature weights `w_i` are all equal to the grid step for the
//! rectangle rule (the baseline), or follow the trapezoidal or composite
//! Simpson rules. Accuracy is limited both by the grid step and by the
//! probability mass lying outside the grid; the latter is estimated by
//! applying the same weights to the distribution alone.

use std::fmt;
use log::warn;
use ndarray as nd;
use serde::Deserialize;
use crate::{
    constants::TAIL_TOLERANCE,
    error::{ Error, Result },
    grid::Grid,
    thermal::MaxwellBoltzmann,
};

/// Quadrature rule used for the velocity integration.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuadratureRule {
    /// Every sample weighted by the full grid step.
    #[default]
    Rectangle,
    /// Trapezoidal rule; end points carry half weight.
    Trapezoid,
    /// Composite Simpson rule. For an even number of points, the last panel
    /// is handled by the trapezoidal rule.
    Simpson,
}

impl QuadratureRule {
    /// Compute the quadrature weights, including the step `dx`, for `n`
    /// uniformly spaced points.
    ///
    /// All rules reduce to a single weight `dx` for `n = 1`.
    pub fn weights(&self, n: usize, dx: f64) -> nd::Array1<f64> {
        if n <= 1 {
            return nd::Array1::from_elem(n, dx);
        }
        match *self {
            Self::Rectangle => nd::Array1::from_elem(n, dx),
            Self::Trapezoid => trapz_weights(n, dx),
            Self::Simpson if n == 2 => trapz_weights(n, dx),
            Self::Simpson => {
                let m = if n % 2 == 1 { n } else { n - 1 };
                let mut w: nd::Array1<f64>
                    = (0..n)
                    .map(|k| {
                        if k == 0 || k == m - 1 {
                            dx / 3.0
                        } else if k >= m {
                            0.0
                        } else if k % 2 == 1 {
                            4.0 * dx / 3.0
                        } else {
                            2.0 * dx / 3.0
                        }
                    })
                    .collect();
                if m < n {
                    w[n - 2] += dx / 2.0;
                    w[n - 1] += dx / 2.0;
                }
                w
            },
        }
    }

    /// Integrate a function sampled at `y.len()` uniformly spaced points.
    pub fn integrate<S>(&self, y: &nd::ArrayBase<S, nd::Ix1>, dx: f64) -> f64
    where S: nd::Data<Elem = f64>
    {
        self.weights(y.len(), dx).dot(y)
    }
}

fn trapz_weights(n: usize, dx: f64) -> nd::Array1<f64> {
    let mut w = nd::Array1::from_elem(n, dx);
    w[0] = dx / 2.0;
    w[n - 1] = dx / 2.0;
    w
}

/// Non-fatal notice that the velocity grid does not cover enough of the
/// distribution for an accurate Doppler average.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct IntegrationRangeWarning {
    /// Normalization error `|1 - Σ w_i p(v_i)|` of the distribution over the
    /// grid.
    pub tail_mass: f64,
    /// Largest acceptable normalization error.
    pub tolerance: f64,
}

impl fmt::Display for IntegrationRangeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f,
            "velocity grid misses {:.3e} of the probability mass \
            (tolerance {:.1e}); the Doppler-averaged spectrum may be inaccurate",
            self.tail_mass, self.tolerance,
        )
    }
}

/// Doppler-averaged probe spectrum.
#[derive(Clone, Debug, PartialEq)]
pub struct DopplerSpectrum {
    values: nd::Array1<f64>,
    invalid: Vec<usize>,
    range_warning: Option<IntegrationRangeWarning>,
    rule: QuadratureRule,
}

impl DopplerSpectrum {
    /// Averaged absorption at each probe detuning. Undefined entries are NaN.
    pub fn values(&self) -> &nd::Array1<f64> { &self.values }

    pub fn into_values(self) -> nd::Array1<f64> { self.values }

    /// Detuning indices whose response column contained undefined cells.
    pub fn invalid_columns(&self) -> &[usize] { &self.invalid }

    pub fn is_valid(&self) -> bool { self.invalid.is_empty() }

    pub fn range_warning(&self) -> Option<&IntegrationRangeWarning> {
        self.range_warning.as_ref()
    }

    pub fn rule(&self) -> QuadratureRule { self.rule }

    pub fn len(&self) -> usize { self.values.len() }

    pub fn is_empty(&self) -> bool { self.values.is_empty() }

    /// Return `self` if every entry is defined.
    pub fn checked(self) -> Result<Self> {
        if self.invalid.is_empty() {
            Ok(self)
        } else {
            Err(Error::InvalidSpectrum { columns: self.invalid })
        }
    }
}

/// Integrates response surfaces against a [`MaxwellBoltzmann`] distribution.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DopplerIntegrator {
    pub distribution: MaxwellBoltzmann,
    pub rule: QuadratureRule,
    tail_tolerance: f64,
}

impl DopplerIntegrator {
    /// Create a new `DopplerIntegrator` using the rectangle rule and the
    /// default tail tolerance.
    pub fn new(distribution: MaxwellBoltzmann) -> Self {
        Self {
            distribution,
            rule: QuadratureRule::default(),
            tail_tolerance: TAIL_TOLERANCE,
        }
    }

    /// Use a different quadrature rule.
    pub fn with_rule(mut self, rule: QuadratureRule) -> Self {
        self.rule = rule;
        self
    }

    /// Use a different tolerance on the probability mass missed by the
    /// velocity grid.
    ///
    /// Fails if `tail_tolerance` is negative or not finite.
    pub fn with_tail_tolerance(mut self, tail_tolerance: f64) -> Result<Self> {
        if !(tail_tolerance.is_finite() && tail_tolerance >= 0.0) {
            return Err(Error::invalid(
                format!(
                    "tail_tolerance must be non-negative, got {}",
                    tail_tolerance,
                )
            ));
        }
        self.tail_tolerance = tail_tolerance;
        Ok(self)
    }

    pub fn tail_tolerance(&self) -> f64 { self.tail_tolerance }

    /// Quadrature weights times the distribution at every grid velocity.
    pub fn velocity_weights(&self, velocities: &Grid) -> nd::Array1<f64> {
        self.rule.weights(velocities.len(), velocities.step())
            * self.distribution.pdf_array(velocities.points())
    }

    /// Integral of the distribution over the grid, which tends to 1 as the
    /// grid widens and refines.
    pub fn normalization(&self, velocities: &Grid) -> f64 {
        self.velocity_weights(velocities).sum()
    }

    /// Check the grid coverage of the distribution.
    pub fn check_range(&self, velocities: &Grid)
        -> Option<IntegrationRangeWarning>
    {
        let tail_mass = (1.0 - self.normalization(velocities)).abs();
        (tail_mass > self.tail_tolerance)
            .then_some(IntegrationRangeWarning {
                tail_mass,
                tolerance: self.tail_tolerance,
            })
    }

    /// Doppler-average a response surface whose rows are sampled at the
    /// points of `velocities`.
    ///
    /// Columns containing NaN or infinite cells come out as NaN and are
    /// listed in [`DopplerSpectrum::invalid_columns`]; insufficient grid
    /// coverage is logged and attached as an [`IntegrationRangeWarning`].
    ///
    /// Fails if the surface and the grid disagree on the number of
    /// velocities.
    pub fn integrate(&self, surface: &nd::Array2<f64>, velocities: &Grid)
        -> Result<DopplerSpectrum>
    {
        if surface.nrows() != velocities.len() {
            return Err(Error::invalid(
                format!(
                    "surface has {} velocity rows but the grid has {} points",
                    surface.nrows(), velocities.len(),
                )
            ));
        }
        let weights = self.velocity_weights(velocities);
        let invalid: Vec<usize>
            = surface.columns().into_iter().enumerate()
            .filter(|(_, col)| !col.iter().all(|x| x.is_finite()))
            .map(|(j, _)| j)
            .collect();
        let mut values: nd::Array1<f64> = surface.t().dot(&weights);
        invalid.iter().for_each(|&j| { values[j] = f64::NAN; });
        if !invalid.is_empty() {
            warn!(
                "{} of {} Doppler-averaged points are undefined",
                invalid.len(), values.len(),
            );
        }
        let range_warning = self.check_range(velocities);
        if let Some(w) = &range_warning {
            warn!("{}", w);
        }
        Ok(DopplerSpectrum { values, invalid, range_warning, rule: self.rule })
    }
}
