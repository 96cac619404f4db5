//! One-dimensional Maxwell-Boltzmann velocity distribution.

use std::f64::consts::TAU;
use ndarray as nd;
use crate::{
    constants::{ KB, M_CS133, T_DEFAULT },
    error::{ Error, Result },
};

/// Velocity distribution along a single axis of a thermal atomic vapour.
///
/// The density is normalized over the whole real line:
/// ```text
/// p(v) = exp(-v^2 / 2σ^2) / (σ sqrt(2π)),    σ = sqrt(k_B T / m)
/// ```
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MaxwellBoltzmann {
    /// Temperature in kelvin.
    temperature: f64,
    /// Atomic mass in kilograms.
    mass: f64,
    sigma: f64,
}

impl Default for MaxwellBoltzmann {
    fn default() -> Self { Self::from_parts(T_DEFAULT, M_CS133) }
}

impl MaxwellBoltzmann {
    /// Create a new `MaxwellBoltzmann`.
    ///
    /// Fails if `temperature` or `mass` is not finite and positive.
    pub fn new(temperature: f64, mass: f64) -> Result<Self> {
        if !(temperature.is_finite() && temperature > 0.0) {
            return Err(Error::invalid(
                format!("temperature must be positive, got {}", temperature)));
        }
        if !(mass.is_finite() && mass > 0.0) {
            return Err(Error::invalid(
                format!("atomic mass must be positive, got {}", mass)));
        }
        Ok(Self::from_parts(temperature, mass))
    }

    // inputs already known to be finite and positive
    fn from_parts(temperature: f64, mass: f64) -> Self {
        let sigma = (KB * temperature / mass).sqrt();
        Self { temperature, mass, sigma }
    }

    pub fn temperature(&self) -> f64 { self.temperature }

    pub fn mass(&self) -> f64 { self.mass }

    /// Standard deviation of the velocity, in m/s.
    pub fn sigma(&self) -> f64 { self.sigma }

    /// Evaluate the probability density at a velocity in m/s.
    pub fn pdf(&self, v: f64) -> f64 {
        (-(v / self.sigma).powi(2) / 2.0).exp() / (self.sigma * TAU.sqrt())
    }

    /// Evaluate the probability density over an array of velocities.
    pub fn pdf_array<S>(&self, v: &nd::ArrayBase<S, nd::Ix1>)
        -> nd::Array1<f64>
    where S: nd::Data<Elem = f64>
    {
        v.mapv(|vk| self.pdf(vk))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn caesium_width() {
        let mb = MaxwellBoltzmann::default();
        assert_approx_eq!(mb.sigma(), 35.35, 0.05);
        assert_approx_eq!(mb.pdf(0.0), 1.0 / (mb.sigma() * TAU.sqrt()), 1e-15);
        assert_approx_eq!(mb.pdf(-12.0), mb.pdf(12.0), 1e-15);
        assert!(mb.pdf(100.0) < mb.pdf(50.0));
    }

    #[test]
    fn normalized_within_grid() {
        let mb = MaxwellBoltzmann::default();
        let v = nd::Array1::linspace(-150.0, 150.0, 201);
        let dv = v[1] - v[0];
        let total: f64 = mb.pdf_array(&v).sum() * dv;
        assert!((total - 1.0).abs() < 1e-3);
        // wider and finer grids only do better
        let v = nd::Array1::linspace(-300.0, 300.0, 2001);
        let dv = v[1] - v[0];
        let total_fine: f64 = mb.pdf_array(&v).sum() * dv;
        assert!((total_fine - 1.0).abs() <= (total - 1.0).abs());
        assert!((total_fine - 1.0).abs() < 1e-10);
    }

    #[test]
    fn default_is_caesium_at_20_kelvin() {
        let mb = MaxwellBoltzmann::default();
        assert_eq!(mb, MaxwellBoltzmann::new(T_DEFAULT, M_CS133).unwrap());
        assert_eq!(mb.temperature(), 20.0);
        assert_eq!(mb.mass(), M_CS133);
    }

    #[test]
    fn rejects_unphysical() {
        assert!(MaxwellBoltzmann::new(0.0, M_CS133).is_err());
        assert!(MaxwellBoltzmann::new(20.0, -1.0).is_err());
        assert!(MaxwellBoltzmann::new(f64::NAN, M_CS133).is_err());
    }
}
