//! Steady-state solutions of the ladder master equation.
//!
//! The full solver sets `L vec(ρ) = 0` for the Liouvillian `L` of a
//! [`Ladder`], replaces the (redundant) ground-state population equation by
//! the trace condition `Σ ρ_ii = 1`, and solves the resulting dense linear
//! system by LU decomposition. The probe coherence is `ρ_21` in the usual
//! 1-based level labels, i.e. `rho[[1, 0]]` here; with the sign conventions
//! of [`Ladder::hamiltonian`], `-Im ρ_21` is the probe absorption and is
//! non-negative.

use nalgebra as na;
use ndarray as nd;
use num_complex::Complex64 as C64;
use num_traits::{ One, Zero };
use serde::Deserialize;
use crate::{
    error::{ Error, Result },
    ladder::Ladder,
};

// smallest acceptable ratio of LU pivot magnitudes
const PIVOT_RATIO: f64 = 1e-12;

// tolerance on the physicality of a steady-state density matrix
const PHYS_TOL: f64 = 1e-8;

/// Compute the steady-state density matrix of a ladder.
///
/// Fails with [`Error::NumericalSingularity`] if the linear system is
/// singular or ill-conditioned (e.g. when all decay rates vanish), or if the
/// solution is not a valid density matrix to within numerical tolerance.
pub fn steady_state(ladder: &Ladder) -> Result<nd::Array2<C64>> {
    let n = ladder.num_levels();
    let n2 = n * n;
    let L = ladder.liouvillian();
    let mut A: na::DMatrix<C64> = na::DMatrix::from_fn(n2, n2, |r, c| L[[r, c]]);
    A.row_mut(0).fill(C64::zero());
    for i in 0..n {
        A[(0, i * n + i)] = C64::one();
    }
    let mut b: na::DVector<C64> = na::DVector::zeros(n2);
    b[0] = C64::one();

    let lu = A.lu();
    let (pmin, pmax)
        = lu.u().diagonal().iter()
        .map(|p| p.norm())
        .fold((f64::INFINITY, 0.0_f64), |(lo, hi), p| (lo.min(p), hi.max(p)));
    if !(pmax > 0.0 && pmin.is_finite()) || pmin / pmax < PIVOT_RATIO {
        return Err(Error::singular(
            format!(
                "steady-state system is singular (pivot ratio {:.3e})",
                if pmax > 0.0 { pmin / pmax } else { 0.0 },
            )
        ));
    }
    let x = lu.solve(&b)
        .ok_or_else(|| Error::singular("LU back-substitution failed"))?;
    let rho: nd::Array2<C64>
        = nd::Array2::from_shape_fn((n, n), |(i, j)| x[i * n + j]);
    check_density(&rho)?;
    Ok(rho)
}

fn check_density(rho: &nd::Array2<C64>) -> Result<()> {
    if !rho.iter().all(|z| z.is_finite()) {
        return Err(Error::singular("non-finite steady-state solution"));
    }
    let pop_ok
        = rho.diag().iter()
        .all(|p| {
            p.im.abs() < PHYS_TOL
                && p.re > -PHYS_TOL
                && p.re < 1.0 + PHYS_TOL
        });
    if !pop_ok {
        return Err(Error::singular(
            "steady-state populations outside [0, 1]"));
    }
    let hermitian
        = rho.indexed_iter()
        .all(|((i, j), z)| (z - rho[[j, i]].conj()).norm() < PHYS_TOL);
    if !hermitian {
        return Err(Error::singular("steady-state solution is not Hermitian"));
    }
    Ok(())
}

/// Compute the steady-state populations of all ladder levels.
pub fn populations(ladder: &Ladder) -> Result<nd::Array1<f64>> {
    Ok(steady_state(ladder)?.diag().mapv(|p| p.re))
}

/// Compute the steady-state coherence `ρ_21` of the probe transition.
pub fn probe_coherence(ladder: &Ladder) -> Result<C64> {
    Ok(steady_state(ladder)?[[1, 0]])
}

/// Compute the probe coherence in the weak-probe limit.
///
/// To first order in the probe Rabi frequency, all population stays in the
/// ground state and the ground-state coherences obey a tridiagonal system
/// whose solution is a continued fraction,
/// ```text
/// ρ_21 = (-i Ω_1 / 2) / (Γ_21 - i Δ_1 + (Ω_2 / 2)^2 / (Γ_31 - i (Δ_1 + Δ_2) + ...))
/// ```
/// where `Γ_k1` is the total decay rate of the coherence between level `k`
/// and the ground state.
///
/// Fails with [`Error::NumericalSingularity`] if the continued fraction
/// diverges, which requires a zero decay rate on resonance.
pub fn weak_probe_coherence(ladder: &Ladder) -> Result<C64> {
    let n = ladder.num_levels();
    let G = ladder.coherence_decay_matrix();
    let D = ladder.level_detunings();
    let W = ladder.rabi();
    let mut r: C64 = C64::zero();
    for k in (1..n).rev() {
        let up: C64
            = if k < n - 1 { C64::i() * (W[k] / 2.0) * r } else { C64::zero() };
        r = -C64::i() * (W[k - 1] / 2.0) / (C64::new(G[[k, 0]], -D[k]) + up);
    }
    r.is_finite().then_some(r)
        .ok_or_else(|| Error::singular("weak-probe continued fraction diverges"))
}

/// Negated imaginary part of a probe coherence, proportional to the probe
/// absorption coefficient.
pub fn absorption(coherence: C64) -> f64 { -coherence.im }

/// Selects how the probe coherence is computed.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverKind {
    /// Full steady-state density matrix; valid at any probe strength.
    #[default]
    Full,
    /// First-order perturbative solution in the probe Rabi frequency.
    WeakProbe,
}

impl SolverKind {
    /// Compute the probe coherence of a ladder.
    pub fn coherence(&self, ladder: &Ladder) -> Result<C64> {
        match *self {
            Self::Full => probe_coherence(ladder),
            Self::WeakProbe => weak_probe_coherence(ladder),
        }
    }
}

/// Compute the steady-state probe coherence of an N-level ladder directly
/// from per-field parameter sequences.
///
/// `rabi`, `detuning`, `decay` and `linewidth` must all have the same
/// non-zero length N; the detunings are the effective (Doppler-shifted)
/// ones.
pub fn n_level_coherence(
    rabi: &[f64],
    detuning: &[f64],
    decay: &[f64],
    linewidth: &[f64],
) -> Result<C64>
{
    let ladder = Ladder::new(
        nd::Array1::from_vec(rabi.to_vec()),
        nd::Array1::from_vec(detuning.to_vec()),
        nd::Array1::from_vec(decay.to_vec()),
        nd::Array1::from_vec(linewidth.to_vec()),
    )?;
    probe_coherence(&ladder)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn ladder(rabi: &[f64], det: &[f64], decay: &[f64], lw: &[f64]) -> Ladder {
        Ladder::new(
            nd::Array1::from_vec(rabi.to_vec()),
            nd::Array1::from_vec(det.to_vec()),
            nd::Array1::from_vec(decay.to_vec()),
            nd::Array1::from_vec(lw.to_vec()),
        )
        .unwrap()
    }

    fn two_level_exact(W: f64, D: f64, G: f64, g: f64) -> C64 {
        let G21 = G / 2.0 + g;
        let s = W.powi(2) * G21 / (2.0 * G * (G21.powi(2) + D.powi(2)));
        let w = 1.0 / (1.0 + 2.0 * s);
        -C64::i() * (W / 2.0) * w / C64::new(G21, -D)
    }

    #[test]
    fn two_level_closed_form() {
        for &(W, D, G, g) in &[
            (1.0, 0.0, 6.0, 0.0),
            (2.0, -3.0, 6.0, 0.3),
            (15.0, 1.7, 6.0, 0.1),
            (0.5, 40.0, 1.0, 2.0),
        ] {
            let rho21 = n_level_coherence(&[W], &[D], &[G], &[g]).unwrap();
            let exact = two_level_exact(W, D, G, g);
            assert_approx_eq!(rho21.re, exact.re, 1e-10);
            assert_approx_eq!(rho21.im, exact.im, 1e-10);
        }
    }

    #[test]
    fn absorption_is_non_negative() {
        for &Wc in &[0.0, 5.0, 20.0] {
            for &Dp in &[-30.0, -4.0, 0.0, 2.5, 17.0] {
                for &Dc in &[-10.0, 0.0, 3.0] {
                    let l = ladder(
                        &[1.0, Wc, 10.0],
                        &[Dp, Dc, -Dc],
                        &[10.0, 1.0, 1.0],
                        &[0.1, 0.1, 0.1],
                    );
                    let a = absorption(probe_coherence(&l).unwrap());
                    assert!(a >= 0.0, "negative absorption {} at {} {} {}",
                        a, Wc, Dp, Dc);
                }
            }
        }
    }

    #[test]
    fn steady_state_is_stationary_density_matrix() {
        let l = ladder(
            &[3.0, 20.0, 10.0],
            &[1.0, -2.0, 0.5],
            &[10.0, 1.0, 1.0],
            &[0.1, 0.1, 0.1],
        );
        let rho = steady_state(&l).unwrap();
        let tr: C64 = rho.diag().iter().sum();
        assert_approx_eq!(tr.re, 1.0, 1e-12);
        assert_approx_eq!(tr.im, 0.0, 1e-12);
        let drho = l.rhs(&rho);
        assert!(drho.iter().all(|z| z.norm() < 1e-10));
        let pops = populations(&l).unwrap();
        assert!(pops.iter().all(|p| *p > -1e-12 && *p < 1.0 + 1e-12));
        assert_approx_eq!(pops.sum(), 1.0, 1e-12);
        assert_eq!(steady_state(&l).unwrap(), rho);
    }

    #[test]
    fn weak_probe_limit_agrees() {
        for &Dp in &[-12.0, -1.0, 0.0, 0.7, 9.0] {
            let l = ladder(
                &[0.01, 20.0, 10.0],
                &[Dp, 0.0, 0.0],
                &[10.0, 1.0, 1.0],
                &[0.1, 0.1, 0.1],
            );
            let full = probe_coherence(&l).unwrap();
            let weak = weak_probe_coherence(&l).unwrap();
            assert!((full - weak).norm() < 1e-3 * weak.norm());
            assert_eq!(
                SolverKind::WeakProbe.coherence(&l).unwrap(),
                weak,
            );
        }
    }

    #[test]
    fn weak_probe_two_level() {
        let l = ladder(&[0.5], &[1.3], &[6.0], &[0.2]);
        let weak = weak_probe_coherence(&l).unwrap();
        let expected = -C64::i() * 0.25 / C64::new(3.2, -1.3);
        assert_approx_eq!(weak.re, expected.re, 1e-14);
        assert_approx_eq!(weak.im, expected.im, 1e-14);
    }

    #[test]
    fn zero_rates_are_singular() {
        let res = n_level_coherence(&[1.0], &[0.0], &[0.0], &[0.0]);
        assert!(matches!(res, Err(Error::NumericalSingularity { .. })));
        let res = n_level_coherence(
            &[1.0, 2.0], &[0.0, 0.0], &[0.0, 0.0], &[0.0, 0.0]);
        assert!(matches!(res, Err(Error::NumericalSingularity { .. })));
        let l = ladder(&[1.0], &[0.0], &[0.0], &[0.0]);
        assert!(weak_probe_coherence(&l).is_err());
    }

    #[test]
    fn mismatched_lengths_are_invalid() {
        let res = n_level_coherence(&[1.0, 2.0], &[0.0], &[1.0], &[0.1]);
        assert!(matches!(res, Err(Error::InvalidParameters(_))));
    }
}
