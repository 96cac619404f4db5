//! Evaluation of the probe absorption over a grid of atomic velocities and
//! probe detunings.
//!
//! Every `(velocity, detuning)` cell is an independent steady-state solve, so
//! the sweep is a parallel map over the rows of the grid.

use std::sync::atomic::{ AtomicUsize, Ordering };
use log::{ debug, info };
use ndarray as nd;
use rayon::iter::{ IntoParallelIterator, ParallelIterator };
use serde::Deserialize;
use crate::{
    doppler::DopplerShift,
    error::{ Error, Result },
    fields::FieldSet,
    grid::Grid,
    ladder::Ladder,
    steady::{ SolverKind, absorption },
};

/// Probe absorption `-Im ρ_21` indexed by `(velocity, probe detuning)`.
pub type ResponseSurface = nd::Array2<f64>;

/// What to do with a grid cell whose steady state cannot be computed.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SingularityPolicy {
    /// Fail the whole sweep, reporting the offending cell.
    #[default]
    Abort,
    /// Store NaN in the cell and carry on.
    MarkUndefined,
}

/// Sweep engine over a fixed set of fields.
#[derive(Copy, Clone, Debug)]
pub struct SpectrumSweep<'a> {
    fields: &'a FieldSet,
    pub doppler: DopplerShift,
    pub solver: SolverKind,
    pub policy: SingularityPolicy,
}

impl<'a> SpectrumSweep<'a> {
    /// Create a new `SpectrumSweep` using the full steady-state solver and
    /// aborting on singular cells.
    pub fn new(fields: &'a FieldSet, doppler: DopplerShift) -> Self {
        Self {
            fields,
            doppler,
            solver: SolverKind::default(),
            policy: SingularityPolicy::default(),
        }
    }

    /// Use a different solver.
    pub fn with_solver(mut self, solver: SolverKind) -> Self {
        self.solver = solver;
        self
    }

    /// Use a different policy for singular cells.
    pub fn with_policy(mut self, policy: SingularityPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Get a reference to the fields.
    pub fn fields(&self) -> &FieldSet { self.fields }

    /// Compute the probe absorption of a single cell, with the probe's bare
    /// detuning set to `probe_detuning` and all fields Doppler-shifted for an
    /// atom moving at `velocity`.
    pub fn cell(&self, velocity: f64, probe_detuning: f64) -> Result<f64> {
        let detuning
            = self.fields.effective_detunings(
                probe_detuning, velocity, &self.doppler);
        let ladder = Ladder::from_fields(self.fields, detuning)?;
        self.solver.coherence(&ladder)
            .map(absorption)
            .map_err(|e| e.at_cell(velocity, probe_detuning))
    }

    fn cell_with_policy(&self, velocity: f64, probe_detuning: f64)
        -> Result<f64>
    {
        match self.cell(velocity, probe_detuning) {
            Err(Error::NumericalSingularity { reason, .. })
                if self.policy == SingularityPolicy::MarkUndefined =>
            {
                debug!(
                    "undefined cell at v = {}, Δ = {}: {}",
                    velocity, probe_detuning, reason,
                );
                Ok(f64::NAN)
            },
            res => res,
        }
    }

    /// Compute the response surface over a velocity grid (rows) and a probe
    /// detuning grid (columns).
    pub fn run(&self, velocities: &Grid, detunings: &Grid)
        -> Result<ResponseSurface>
    {
        let m = velocities.len();
        let n_det = detunings.len();
        info!(
            "sweeping {} velocities x {} probe detunings over {} fields",
            m, n_det, self.fields.len(),
        );
        let v: Vec<f64> = velocities.iter().copied().collect();
        let det: Vec<f64> = detunings.iter().copied().collect();
        let done = AtomicUsize::new(0);
        let report_every = (m / 10).max(1);
        let rows: Vec<Vec<f64>>
            = (0..m).into_par_iter()
            .map(|i| -> Result<Vec<f64>> {
                let row: Vec<f64>
                    = det.iter()
                    .map(|d| self.cell_with_policy(v[i], *d))
                    .collect::<Result<Vec<f64>>>()?;
                let k = done.fetch_add(1, Ordering::Relaxed) + 1;
                if k % report_every == 0 || k == m {
                    debug!("sweep progress: {}/{} velocity rows", k, m);
                }
                Ok(row)
            })
            .collect::<Result<Vec<Vec<f64>>>>()?;
        let surface
            = nd::Array2::from_shape_vec(
                (m, n_det), rows.into_iter().flatten().collect())
            .map_err(|e| Error::invalid(
                format!("response surface shape: {}", e)))?;
        let undefined = surface.iter().filter(|x| x.is_nan()).count();
        if undefined > 0 {
            info!("{} of {} cells undefined", undefined, m * n_det);
        }
        Ok(surface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use crate::steady::n_level_coherence;

    fn ladder_fields(dirs: &[i64]) -> FieldSet {
        FieldSet::from_sequences(
            &[1.0, 20.0],
            &[0.0, 3.0],
            &[0.1, 0.1],
            &[10.0, 1.0],
            &[852e-9, 1470e-9],
            dirs,
        )
        .unwrap()
    }

    #[test]
    fn cell_uses_effective_detunings() {
        let fields = ladder_fields(&[1, -1]);
        let sweep = SpectrumSweep::new(&fields, DopplerShift::default());
        let v = 25.0;
        let k = fields.wavevectors();
        let expected = absorption(n_level_coherence(
            &[1.0, 20.0],
            &[-4.0 + k[0] * v * 1e-6, 3.0 + k[1] * v * 1e-6],
            &[10.0, 1.0],
            &[0.1, 0.1],
        ).unwrap());
        assert_approx_eq!(sweep.cell(v, -4.0).unwrap(), expected, 1e-14);
    }

    #[test]
    fn parallel_matches_serial() {
        let fields = ladder_fields(&[1, -1]);
        let sweep = SpectrumSweep::new(&fields, DopplerShift::default());
        let velocities = Grid::linspace(-60.0, 60.0, 13).unwrap();
        let detunings = Grid::linspace(-20.0, 20.0, 17).unwrap();
        let surface = sweep.run(&velocities, &detunings).unwrap();
        assert_eq!(surface.dim(), (13, 17));
        for (i, v) in velocities.iter().enumerate() {
            for (j, d) in detunings.iter().enumerate() {
                assert_eq!(surface[[i, j]], sweep.cell(*v, *d).unwrap());
            }
        }
        assert!(surface.iter().all(|a| *a >= 0.0));
    }

    #[test]
    fn reversing_directions_and_velocities() {
        let velocities = Grid::linspace(-90.0, 150.0, 17).unwrap();
        let detunings = Grid::linspace(-30.0, 30.0, 11).unwrap();
        for dirs in [[1, 1], [1, -1]] {
            let fields = ladder_fields(&dirs);
            let reversed = fields.reversed();
            let surface
                = SpectrumSweep::new(&fields, DopplerShift::default())
                .run(&velocities, &detunings)
                .unwrap();
            let mirrored
                = SpectrumSweep::new(&reversed, DopplerShift::default())
                .run(&velocities.mirrored(), &detunings)
                .unwrap();
            let unmirrored = mirrored.slice(nd::s![..;-1, ..]);
            assert_eq!(surface, unmirrored);
        }
    }

    #[test]
    fn singular_cells_abort_or_mark() {
        let fields = FieldSet::from_sequences(
            &[1.0], &[0.0], &[0.0], &[0.0], &[852e-9], &[1]).unwrap();
        let velocities = Grid::linspace(-10.0, 10.0, 3).unwrap();
        let detunings = Grid::linspace(-1.0, 1.0, 4).unwrap();
        let sweep = SpectrumSweep::new(&fields, DopplerShift::default());
        match sweep.run(&velocities, &detunings) {
            Err(Error::NumericalSingularity { velocity, detuning, .. }) => {
                assert!(velocities.iter().any(|v| *v == velocity));
                assert!(detunings.iter().any(|d| *d == detuning));
            },
            other => panic!("expected a singularity, got {:?}", other),
        }
        let surface
            = sweep.with_policy(SingularityPolicy::MarkUndefined)
            .run(&velocities, &detunings)
            .unwrap();
        assert!(surface.iter().all(|a| a.is_nan()));
    }
}
