//! End-to-end computation of a Doppler-broadened spectrum from a
//! [`RunConfig`], packaging every array needed to plot the result.

use std::{ path::Path, time::Instant };
use log::info;
use ndarray as nd;
use crate::{
    config::RunConfig,
    error::Result,
    grid::Grid,
    integrate::DopplerSpectrum,
    sweep::{ ResponseSurface, SpectrumSweep },
    write_npz,
};

/// Results of a single run.
#[derive(Clone, Debug)]
pub struct SpectrumRun {
    /// Velocity grid, m/s (surface rows).
    pub velocities: Grid,
    /// Probe detuning grid (surface columns).
    pub detunings: Grid,
    /// Probe absorption for every (velocity, detuning) cell.
    pub surface: ResponseSurface,
    /// Doppler-averaged absorption.
    pub doppler: DopplerSpectrum,
    /// Surface row at the middle of the velocity grid.
    pub central: nd::Array1<f64>,
    /// Resonant velocity classes against probe detuning, one row per
    /// cumulative multi-photon resonance.
    pub asymptotes: nd::Array2<f64>,
}

impl SpectrumRun {
    /// Build every object described by `config`, sweep the response surface,
    /// and Doppler-average it.
    ///
    /// Undefined cells (under [`SingularityPolicy::MarkUndefined`][policy])
    /// are carried through as NaN; see [`DopplerSpectrum::checked`].
    ///
    /// [policy]: crate::sweep::SingularityPolicy::MarkUndefined
    pub fn compute(config: &RunConfig) -> Result<Self> {
        let fields = config.field_set()?;
        let velocities = config.velocity_grid()?;
        let detunings = config.detuning_grid()?;
        let doppler_shift = config.doppler()?;
        let integrator = config.integrator()?;
        info!(
            "{}-level ladder, σ_v = {:.3} m/s, {:?} solver, {:?} quadrature",
            fields.num_levels(),
            integrator.distribution.sigma(),
            config.solver,
            integrator.rule,
        );

        let t0 = Instant::now();
        let surface
            = SpectrumSweep::new(&fields, doppler_shift)
            .with_solver(config.solver)
            .with_policy(config.policy)
            .run(&velocities, &detunings)?;
        info!("sweep finished in {:.2?}", t0.elapsed());

        let doppler = integrator.integrate(&surface, &velocities)?;
        let central = surface.row(velocities.center_index()).to_owned();
        let asymptotes
            = fields.resonance_asymptotes(detunings.points(), &doppler_shift);
        Ok(Self { velocities, detunings, surface, doppler, central, asymptotes })
    }

    /// Velocity of the [`Self::central`] slice.
    pub fn central_velocity(&self) -> f64 {
        self.velocities.points()[self.velocities.center_index()]
    }

    /// Save all arrays to a `.npz` archive.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        write_npz!(
            path.as_ref(),
            arrays: {
                "velocities" => self.velocities.points(),
                "detunings" => self.detunings.points(),
                "surface" => &self.surface,
                "doppler" => self.doppler.values(),
                "central" => &self.central,
                "asymptotes" => &self.asymptotes,
            }
        )
    }
}
