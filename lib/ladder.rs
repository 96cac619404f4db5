//! Master-equation description of an (N + 1)-level ladder driven by N fields.
//!
//! Where unspecified, all quantities are in units of angular frequency and
//! the Hamiltonian is taken in the rotating frame of the drives under the
//! rotating wave approximation, with level 0 at zero energy and level `l` at
//! `-(Δ_0 + ... + Δ_{l-1})`.

use itertools::Itertools;
use ndarray as nd;
use num_complex::Complex64 as C64;
use num_traits::Zero;
use crate::{
    error::{ Error, Result },
    fields::FieldSet,
};

/// Compute the commutator `[A, B] = A B - B A`.
///
/// Used by [`Ladder::rhs`], the matrix form of the master equation that
/// [`Ladder::liouvillian`] is checked against.
pub fn commutator<SA, SB>(
    A: &nd::ArrayBase<SA, nd::Ix2>,
    B: &nd::ArrayBase<SB, nd::Ix2>,
) -> nd::Array2<C64>
where
    SA: nd::Data<Elem = C64>,
    SB: nd::Data<Elem = C64>,
{
    A.dot(B) - B.dot(A)
}

/// Compute the spontaneous-decay part of the Lindblad master equation in
/// matrix form.
///
/// `Y` is square with `(a, b)`-th element equal to the decay rate from level
/// `a` into level `b`. Each channel moves population `y ρ_aa` from `a` to `b`
/// and damps every coherence involving `a` at `y / 2`.
pub fn lindbladian<SA, SB>(
    Y: &nd::ArrayBase<SA, nd::Ix2>,
    rho: &nd::ArrayBase<SB, nd::Ix2>,
) -> nd::Array2<C64>
where
    SA: nd::Data<Elem = f64>,
    SB: nd::Data<Elem = C64>,
{
    let n = rho.nrows();
    let mut L: nd::Array2<C64> = nd::Array2::zeros(rho.raw_dim());
    let channels
        = Y.indexed_iter()
        .filter(|(_, y)| y.abs() > f64::EPSILON);
    for ((a, b), &y) in channels {
        let flow = rho[[a, a]] * y;
        L[[b, b]] += flow;
        L[[a, a]] -= flow;
        for k in (0..n).filter(|k| *k != a) {
            L[[a, k]] -= rho[[a, k]] * (y / 2.0);
            L[[k, a]] -= rho[[k, a]] * (y / 2.0);
        }
    }
    L
}

/// Parameters of a single ladder system at fixed (effective) detunings.
///
/// Field `k` couples level `k` to level `k + 1` with Rabi frequency
/// `rabi[k]` and detuning `detuning[k]`; level `k + 1` decays into level `k`
/// at rate `decay[k]`, and `linewidth[k]` dephases every coherence between
/// levels on opposite sides of that transition.
#[derive(Clone, Debug, PartialEq)]
pub struct Ladder {
    rabi: nd::Array1<f64>,
    detuning: nd::Array1<f64>,
    decay: nd::Array1<f64>,
    linewidth: nd::Array1<f64>,
}

impl Ladder {
    /// Create a new `Ladder`.
    ///
    /// Fails if the arrays are empty or have unequal lengths, or if any value
    /// is non-finite or any rate is negative.
    pub fn new(
        rabi: nd::Array1<f64>,
        detuning: nd::Array1<f64>,
        decay: nd::Array1<f64>,
        linewidth: nd::Array1<f64>,
    ) -> Result<Self>
    {
        let n = rabi.len();
        if n == 0 {
            return Err(Error::invalid("a ladder needs at least one field"));
        }
        if detuning.len() != n || decay.len() != n || linewidth.len() != n {
            return Err(Error::invalid(
                format!(
                    "ladder parameter lengths differ: Ω {}, Δ {}, Γ {}, γ {}",
                    n, detuning.len(), decay.len(), linewidth.len(),
                )
            ));
        }
        let all_finite
            = rabi.iter().chain(&detuning).chain(&decay).chain(&linewidth)
            .all(|x| x.is_finite());
        if !all_finite {
            return Err(Error::invalid("non-finite ladder parameter"));
        }
        if decay.iter().chain(&linewidth).any(|r| *r < 0.0) {
            return Err(Error::invalid("decay rates must be non-negative"));
        }
        Ok(Self { rabi, detuning, decay, linewidth })
    }

    /// Create a new `Ladder` from the Rabi frequencies and rates of `fields`
    /// and a set of effective detunings.
    pub fn from_fields(fields: &FieldSet, detuning: nd::Array1<f64>)
        -> Result<Self>
    {
        Self::new(
            fields.rabi_frequencies(),
            detuning,
            fields.decay_rates(),
            fields.linewidths(),
        )
    }

    /// Number of fields N.
    pub fn num_fields(&self) -> usize { self.rabi.len() }

    /// Number of levels N + 1.
    pub fn num_levels(&self) -> usize { self.rabi.len() + 1 }

    pub fn rabi(&self) -> &nd::Array1<f64> { &self.rabi }

    pub fn detuning(&self) -> &nd::Array1<f64> { &self.detuning }

    pub fn decay(&self) -> &nd::Array1<f64> { &self.decay }

    pub fn linewidth(&self) -> &nd::Array1<f64> { &self.linewidth }

    /// Cumulative (multi-photon) detuning of each level from the ground
    /// state.
    pub fn level_detunings(&self) -> nd::Array1<f64> {
        let mut acc: f64 = 0.0;
        [0.0].into_iter()
            .chain(self.detuning.iter().map(|d| { acc += d; acc }))
            .collect()
    }

    /// Compute the rotating-frame Hamiltonian.
    pub fn hamiltonian(&self) -> nd::Array2<C64> {
        let n = self.num_levels();
        let mut H: nd::Array2<C64>
            = nd::Array2::from_diag(
                &self.level_detunings().mapv(|d| C64::from(-d)));
        for (k, &W) in self.rabi.iter().enumerate() {
            H[[k, k + 1]] = C64::from(W / 2.0);
            H[[k + 1, k]] = C64::from(W / 2.0);
        }
        debug_assert_eq!(H.dim(), (n, n));
        H
    }

    /// Compute the decay rate coupling matrix.
    ///
    /// The `(i, j)`-th entry is the decay rate from the `i`-th level to the
    /// `j`-th level.
    pub fn decay_matrix(&self) -> nd::Array2<f64> {
        let n = self.num_levels();
        let mut Y: nd::Array2<f64> = nd::Array2::zeros((n, n));
        for (k, &G) in self.decay.iter().enumerate() {
            Y[[k + 1, k]] = G;
        }
        Y
    }

    /// Compute the pure dephasing rate of each coherence due to the field
    /// linewidths.
    ///
    /// The `(i, j)`-th entry is the sum of the linewidths of all fields
    /// bridging levels `i` and `j`; the main diagonal is zero.
    pub fn dephasing_matrix(&self) -> nd::Array2<f64> {
        let n = self.num_levels();
        nd::Array2::from_shape_fn((n, n), |(i, j)| {
            let (lo, hi) = (i.min(j), i.max(j));
            self.linewidth.iter().skip(lo).take(hi - lo).sum::<f64>()
        })
    }

    /// Total dephasing rate of each coherence: half the sum of the two
    /// levels' spontaneous decay rates plus the linewidth dephasing.
    pub fn coherence_decay_matrix(&self) -> nd::Array2<f64> {
        let n = self.num_levels();
        let out: nd::Array1<f64>
            = [0.0].into_iter().chain(self.decay.iter().copied()).collect();
        let mut G = self.dephasing_matrix();
        for ((i, j), g) in G.indexed_iter_mut() {
            if i != j { *g += (out[i] + out[j]) / 2.0; }
        }
        debug_assert_eq!(G.dim(), (n, n));
        G
    }

    /// Perform the dissipative part of the master equation on a density
    /// matrix.
    pub fn dissipator(&self, rho: &nd::Array2<C64>) -> nd::Array2<C64> {
        let Y = self.decay_matrix();
        let D = self.dephasing_matrix();
        lindbladian(&Y, rho) - &(rho * &D.mapv(C64::from))
    }

    /// Compute the time derivative of a density matrix directly in matrix
    /// form.
    ///
    /// The steady-state solver works with [`Self::liouvillian`] instead;
    /// this is the reference the superoperator is tested against.
    pub fn rhs(&self, rho: &nd::Array2<C64>) -> nd::Array2<C64> {
        let H = self.hamiltonian();
        -C64::i() * commutator(&H, rho) + self.dissipator(rho)
    }

    /// Compute the Liouvillian superoperator acting on the row-major
    /// vectorization of the density matrix, so that `d vec(ρ)/dt = L vec(ρ)`.
    ///
    /// The returned matrix is square with side length `(N + 1)^2`.
    pub fn liouvillian(&self) -> nd::Array2<C64> {
        let n = self.num_levels();
        let idx = |i: usize, j: usize| i * n + j;
        let H = self.hamiltonian();
        let G = self.coherence_decay_matrix();
        let mut L: nd::Array2<C64> = nd::Array2::zeros((n * n, n * n));
        for (i, j) in (0..n).cartesian_product(0..n) {
            let p = idx(i, j);
            // -i (H ρ - ρ H)
            for k in 0..n {
                if H[[i, k]] != C64::zero() {
                    L[[p, idx(k, j)]] -= C64::i() * H[[i, k]];
                }
                if H[[k, j]] != C64::zero() {
                    L[[p, idx(i, k)]] += C64::i() * H[[k, j]];
                }
            }
            if i != j {
                L[[p, p]] -= G[[i, j]];
            }
        }
        // population transfer down the ladder
        for (k, &y) in self.decay.iter().enumerate() {
            L[[idx(k + 1, k + 1), idx(k + 1, k + 1)]] -= y;
            L[[idx(k, k), idx(k + 1, k + 1)]] += y;
        }
        L
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn four_level() -> Ladder {
        Ladder::new(
            nd::array![1.0, 20.0, 10.0],
            nd::array![0.5, -2.0, 3.0],
            nd::array![10.0, 1.0, 1.0],
            nd::array![0.1, 0.2, 0.3],
        )
        .unwrap()
    }

    fn test_density(n: usize) -> nd::Array2<C64> {
        // Hermitian, unit trace, otherwise arbitrary
        let mut rho: nd::Array2<C64>
            = nd::Array2::from_shape_fn((n, n), |(i, j)| {
                C64::new(0.01 * (i + 2 * j) as f64, 0.02 * (i as f64 - j as f64))
            });
        rho = (&rho + &rho.t().mapv(|z| z.conj())) / 2.0;
        let tr: C64 = rho.diag().iter().sum();
        rho / tr
    }

    #[test]
    fn hamiltonian_structure() {
        let H = four_level().hamiltonian();
        assert_eq!(H.dim(), (4, 4));
        assert_approx_eq!(H[[0, 0]].re, 0.0);
        assert_approx_eq!(H[[1, 1]].re, -0.5);
        assert_approx_eq!(H[[2, 2]].re, 1.5);
        assert_approx_eq!(H[[3, 3]].re, -1.5);
        assert_approx_eq!(H[[1, 2]].re, 10.0);
        assert_approx_eq!(H[[3, 2]].re, 5.0);
        assert_eq!(H[[0, 2]], C64::zero());
        assert_eq!(H, H.t().mapv(|z| z.conj()));
    }

    #[test]
    fn dephasing_sums_bridging_linewidths() {
        let D = four_level().dephasing_matrix();
        assert_approx_eq!(D[[0, 0]], 0.0);
        assert_approx_eq!(D[[1, 0]], 0.1);
        assert_approx_eq!(D[[0, 3]], 0.6);
        assert_approx_eq!(D[[3, 1]], 0.5);
        let G = four_level().coherence_decay_matrix();
        assert_approx_eq!(G[[1, 0]], 0.1 + 5.0);
        assert_approx_eq!(G[[2, 1]], 0.2 + 5.5);
    }

    #[test]
    fn liouvillian_matches_rhs() {
        let ladder = four_level();
        let n = ladder.num_levels();
        let rho = test_density(n);
        let expected = ladder.rhs(&rho);
        let vec_rho: nd::Array1<C64>
            = rho.iter().copied().collect();
        let got = ladder.liouvillian().dot(&vec_rho);
        for (k, z) in expected.iter().enumerate() {
            assert_approx_eq!(got[k].re, z.re, 1e-12);
            assert_approx_eq!(got[k].im, z.im, 1e-12);
        }
    }

    #[test]
    fn two_level_decay() {
        let Y = nd::array![[0.0, 0.0], [6.0, 0.0]];
        let c = C64::new(0.1, -0.2);
        let rho = nd::array![
            [C64::from(0.7), c],
            [c.conj(), C64::from(0.3)],
        ];
        let L = lindbladian(&Y, &rho);
        assert_approx_eq!(L[[0, 0]].re, 1.8, 1e-14);
        assert_approx_eq!(L[[1, 1]].re, -1.8, 1e-14);
        assert_eq!(L[[0, 1]], -c * 3.0);
        assert_eq!(L[[1, 0]], -c.conj() * 3.0);
    }

    #[test]
    fn dynamics_preserve_trace() {
        let ladder = four_level();
        let drho = ladder.rhs(&test_density(4));
        let tr: C64 = drho.diag().iter().sum();
        assert_approx_eq!(tr.norm(), 0.0, 1e-12);
    }

    #[test]
    fn invalid_ladders_rejected() {
        assert!(Ladder::new(
            nd::array![1.0], nd::array![0.0, 0.0], nd::array![1.0],
            nd::array![0.0],
        ).is_err());
        assert!(Ladder::new(
            nd::array![1.0], nd::array![0.0], nd::array![-1.0],
            nd::array![0.0],
        ).is_err());
        assert!(Ladder::new(
            nd::Array1::zeros(0), nd::Array1::zeros(0), nd::Array1::zeros(0),
            nd::Array1::zeros(0),
        ).is_err());
    }
}
