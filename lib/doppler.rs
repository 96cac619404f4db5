//! Conversion of atomic motion into per-field frequency shifts.

use crate::constants::HZ_TO_MHZ;

/// First-order Doppler shift `k v`, scaled into the angular-frequency unit
/// shared by the rest of a run.
///
/// Wavevectors are in units of 2π m^-1 and velocities in m/s, so `k v` comes
/// out in 2π Hz; `factor` takes that to whatever unit the Rabi frequencies
/// and detunings are given in.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DopplerShift {
    pub factor: f64,
}

impl Default for DopplerShift {
    fn default() -> Self { Self { factor: HZ_TO_MHZ } }
}

impl DopplerShift {
    /// Create a new `DopplerShift` with an explicit conversion factor.
    pub fn new(factor: f64) -> Self { Self { factor } }

    /// Frequency shift seen by an atom with velocity `v` in a field with
    /// wavevector `k`.
    pub fn shift(&self, k: f64, v: f64) -> f64 { k * v * self.factor }

    /// Velocity of the atoms brought into resonance by a shift of `-detuning`
    /// along a (possibly multi-photon) path with total wavevector `k_sum`.
    ///
    /// Returns `None` for a Doppler-free path.
    pub fn resonant_velocity(&self, k_sum: f64, detuning: f64) -> Option<f64>
    {
        let scale = k_sum * self.factor;
        (scale != 0.0).then(|| -detuning / scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn shift_in_mhz() {
        let doppler = DopplerShift::default();
        // 852 nm, 100 m/s -> ~117 (2π MHz)
        let k = 1.0 / 852e-9;
        assert_approx_eq!(doppler.shift(k, 100.0), 117.37089, 1e-4);
        assert_approx_eq!(doppler.shift(-k, 100.0), -117.37089, 1e-4);
        assert_eq!(doppler.shift(k, 0.0), 0.0);
    }

    #[test]
    fn resonance_cancels_shift() {
        let doppler = DopplerShift::default();
        let k = 1.0 / 852e-9 - 1.0 / 1470e-9;
        let v = doppler.resonant_velocity(k, 12.5).unwrap();
        assert_approx_eq!(12.5 + doppler.shift(k, v), 0.0, 1e-12);
        assert!(doppler.resonant_velocity(0.0, 1.0).is_none());
    }
}
