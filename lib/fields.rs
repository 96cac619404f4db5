//! Descriptions of the driving fields and the ladder system they address.
//!
//! Field `k` couples ladder level `k` to level `k + 1`, where level 0 is the
//! ground state. All angular-frequency quantities of a single [`FieldSet`]
//! must share one unit (2π MHz unless stated otherwise); wavelengths are in
//! meters.

use ndarray as nd;
use crate::{
    doppler::DopplerShift,
    error::{ Error, Result },
};

/// Propagation direction of a field along the (single) velocity axis.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    /// `+1.0` for [`Self::Forward`], `-1.0` for [`Self::Backward`].
    pub fn sign(&self) -> f64 {
        match *self {
            Self::Forward => 1.0,
            Self::Backward => -1.0,
        }
    }

    /// Reverse the direction.
    pub fn flipped(self) -> Self {
        match self {
            Self::Forward => Self::Backward,
            Self::Backward => Self::Forward,
        }
    }
}

impl TryFrom<i64> for Direction {
    type Error = Error;

    fn try_from(d: i64) -> Result<Self> {
        match d {
            1 => Ok(Self::Forward),
            -1 => Ok(Self::Backward),
            _ => Err(Error::invalid(
                format!("direction must be +1 or -1, got {}", d))),
        }
    }
}

/// A single driving field and the decay properties of the transition it
/// drives.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Field {
    /// Rabi frequency Ω
    pub rabi: f64,
    /// Bare detuning Δ
    pub detuning: f64,
    /// Laser linewidth γ; dephases every coherence bridged by this field
    pub linewidth: f64,
    /// Spontaneous decay rate Γ of the upper level into the lower level
    pub decay: f64,
    /// Wavelength λ in meters
    pub wavelength: f64,
    /// Propagation direction
    pub direction: Direction,
}

impl Field {
    /// Signed wavevector `d / λ`, in units of 2π m^-1.
    pub fn wavevector(&self) -> f64 {
        self.direction.sign() / self.wavelength
    }

    fn validate(&self, k: usize) -> Result<()> {
        let finite
            = [self.rabi, self.detuning, self.linewidth, self.decay]
            .iter()
            .all(|x| x.is_finite());
        if !finite {
            return Err(Error::invalid(
                format!("field {}: non-finite frequency parameter", k)));
        }
        if self.linewidth < 0.0 || self.decay < 0.0 {
            return Err(Error::invalid(
                format!(
                    "field {}: decay rates must be non-negative \
                    (γ = {}, Γ = {})",
                    k, self.linewidth, self.decay,
                )
            ));
        }
        if !(self.wavelength.is_finite() && self.wavelength > 0.0) {
            return Err(Error::invalid(
                format!(
                    "field {}: wavelength must be positive, got {}",
                    k, self.wavelength,
                )
            ));
        }
        Ok(())
    }
}

/// Ordered collection of the N fields driving an (N + 1)-level ladder.
///
/// The first field is the probe.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldSet {
    fields: Vec<Field>,
}

impl FieldSet {
    /// Create a new `FieldSet`, checking every field.
    ///
    /// Fails if `fields` is empty or any field has a non-finite or negative
    /// rate or a non-positive wavelength.
    pub fn new(fields: Vec<Field>) -> Result<Self> {
        if fields.is_empty() {
            return Err(Error::invalid("at least one field is required"));
        }
        fields.iter().enumerate()
            .try_for_each(|(k, field)| field.validate(k))?;
        Ok(Self { fields })
    }

    /// Assemble a `FieldSet` from parallel per-field sequences.
    ///
    /// Directions are given as `+1`/`-1`. Fails if the sequences have unequal
    /// lengths, in addition to the checks of [`Self::new`].
    pub fn from_sequences(
        rabi: &[f64],
        detuning: &[f64],
        linewidth: &[f64],
        decay: &[f64],
        wavelength: &[f64],
        direction: &[i64],
    ) -> Result<Self>
    {
        let n = rabi.len();
        let lens = [
            ("Δ", detuning.len()),
            ("γ", linewidth.len()),
            ("Γ", decay.len()),
            ("λ", wavelength.len()),
            ("d", direction.len()),
        ];
        if let Some((name, len)) = lens.iter().find(|(_, len)| *len != n) {
            return Err(Error::invalid(
                format!(
                    "sequence length mismatch: Ω has {} entries but {} has {}",
                    n, name, len,
                )
            ));
        }
        let fields: Vec<Field>
            = (0..n)
            .map(|k| -> Result<Field> {
                Ok(Field {
                    rabi: rabi[k],
                    detuning: detuning[k],
                    linewidth: linewidth[k],
                    decay: decay[k],
                    wavelength: wavelength[k],
                    direction: Direction::try_from(direction[k])?,
                })
            })
            .collect::<Result<Vec<Field>>>()?;
        Self::new(fields)
    }

    /// Number of fields N.
    pub fn len(&self) -> usize { self.fields.len() }

    /// Always `false` for a validated `FieldSet`.
    pub fn is_empty(&self) -> bool { self.fields.is_empty() }

    /// Number of ladder levels, N + 1.
    pub fn num_levels(&self) -> usize { self.fields.len() + 1 }

    /// Iterate over the fields in ladder order.
    pub fn iter(&self) -> std::slice::Iter<'_, Field> { self.fields.iter() }

    /// Get the probe field.
    pub fn probe(&self) -> &Field { &self.fields[0] }

    pub fn rabi_frequencies(&self) -> nd::Array1<f64> {
        self.fields.iter().map(|f| f.rabi).collect()
    }

    pub fn detunings(&self) -> nd::Array1<f64> {
        self.fields.iter().map(|f| f.detuning).collect()
    }

    pub fn linewidths(&self) -> nd::Array1<f64> {
        self.fields.iter().map(|f| f.linewidth).collect()
    }

    pub fn decay_rates(&self) -> nd::Array1<f64> {
        self.fields.iter().map(|f| f.decay).collect()
    }

    /// Signed wavevectors of all fields, in units of 2π m^-1.
    pub fn wavevectors(&self) -> nd::Array1<f64> {
        self.fields.iter().map(Field::wavevector).collect()
    }

    /// Return a copy of `self` with every propagation direction reversed.
    pub fn reversed(&self) -> Self {
        let fields
            = self.fields.iter()
            .map(|f| Field { direction: f.direction.flipped(), ..*f })
            .collect();
        Self { fields }
    }

    /// Compute the effective detunings seen by an atom moving at `velocity`
    /// when the probe's bare detuning is replaced by `probe_detuning`.
    ///
    /// All other bare detunings are taken as-is; every field then receives
    /// its own Doppler shift.
    pub fn effective_detunings(
        &self,
        probe_detuning: f64,
        velocity: f64,
        doppler: &DopplerShift,
    ) -> nd::Array1<f64>
    {
        self.fields.iter().enumerate()
            .map(|(k, f)| {
                let bare = if k == 0 { probe_detuning } else { f.detuning };
                bare + doppler.shift(f.wavevector(), velocity)
            })
            .collect()
    }

    /// Velocity classes brought into resonance as a function of probe
    /// detuning, for each cumulative multi-photon path.
    ///
    /// Row `i` follows the (i + 1)-photon resonance, whose total wavevector is
    /// the sum of the first `i + 1` wavevectors. Rows for Doppler-free paths
    /// are filled with NaN.
    pub fn resonance_asymptotes(
        &self,
        detunings: &nd::Array1<f64>,
        doppler: &DopplerShift,
    ) -> nd::Array2<f64>
    {
        let n = self.len();
        let mut asymptotes: nd::Array2<f64>
            = nd::Array2::zeros((n, detunings.len()));
        let mut k_sum: f64 = 0.0;
        for (f, mut row) in self.fields.iter().zip(asymptotes.rows_mut()) {
            k_sum += f.wavevector();
            row.iter_mut().zip(detunings)
                .for_each(|(a, det)| {
                    *a = doppler.resonant_velocity(k_sum, *det)
                        .unwrap_or(f64::NAN);
                });
        }
        asymptotes
    }
}

impl<'a> IntoIterator for &'a FieldSet {
    type Item = &'a Field;
    type IntoIter = std::slice::Iter<'a, Field>;

    fn into_iter(self) -> Self::IntoIter { self.fields.iter() }
}
