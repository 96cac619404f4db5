//! Error types shared by every stage of the spectrum pipeline.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Malformed physical parameters or grids, caught before any solver call.
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// The steady-state linear system could not be solved for a grid cell.
    ///
    /// Coordinates are NaN when the error comes straight from the solver,
    /// outside of any sweep.
    #[error(
        "numerical singularity at velocity {velocity} m/s, probe detuning \
        {detuning}: {reason}"
    )]
    NumericalSingularity {
        velocity: f64,
        detuning: f64,
        reason: String,
    },

    /// Doppler integration saw undefined cells in these detuning columns.
    #[error("Doppler-averaged spectrum undefined at detuning indices {columns:?}")]
    InvalidSpectrum { columns: Vec<usize> },

    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("npz output error: {0}")]
    Npz(#[from] ndarray_npy::WriteNpzError),
}

impl Error {
    pub(crate) fn invalid<S: Into<String>>(msg: S) -> Self {
        Self::InvalidParameters(msg.into())
    }

    pub(crate) fn singular<S: Into<String>>(reason: S) -> Self {
        Self::NumericalSingularity {
            velocity: f64::NAN,
            detuning: f64::NAN,
            reason: reason.into(),
        }
    }

    /// Attach grid coordinates to a [`Self::NumericalSingularity`]; other
    /// variants pass through unchanged.
    pub(crate) fn at_cell(self, v: f64, det: f64) -> Self {
        match self {
            Self::NumericalSingularity { reason, .. } => {
                Self::NumericalSingularity {
                    velocity: v,
                    detuning: det,
                    reason,
                }
            },
            other => other,
        }
    }
}
