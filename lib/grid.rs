//! Uniformly spaced sample grids.

use ndarray as nd;
use crate::error::{ Error, Result };

// relative tolerance on step-size uniformity
const STEP_RTOL: f64 = 1e-9;

/// An increasing sequence of sample points with a fixed step.
///
/// A single-point grid is allowed; its step is whatever was given at
/// construction (see [`Self::single`]).
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    points: nd::Array1<f64>,
    step: f64,
}

impl Grid {
    /// Create a new grid of `num` points evenly spaced over `[start, end]`,
    /// inclusive.
    ///
    /// Fails if `num < 2`, if the bounds are not finite, or if `end <= start`.
    pub fn linspace(start: f64, end: f64, num: usize) -> Result<Self> {
        if num < 2 {
            return Err(Error::invalid(
                format!(
                    "a grid over a range needs at least two points, got {}; \
                    use Grid::single for one point",
                    num,
                )
            ));
        }
        if !(start.is_finite() && end.is_finite()) || end <= start {
            return Err(Error::invalid(
                format!("bad grid bounds [{}, {}]", start, end)));
        }
        let points = nd::Array1::linspace(start, end, num);
        let step = (end - start) / (num - 1) as f64;
        Ok(Self { points, step })
    }

    /// Create a grid holding a single point with an associated step (e.g. the
    /// width of the velocity class it represents).
    pub fn single(point: f64, step: f64) -> Result<Self> {
        if !point.is_finite() || !(step.is_finite() && step > 0.0) {
            return Err(Error::invalid(
                format!("bad single-point grid ({}, step {})", point, step)));
        }
        Ok(Self { points: nd::array![point], step })
    }

    /// Wrap an existing array of points, checking that it is strictly
    /// increasing with uniform step.
    pub fn from_points(points: nd::Array1<f64>) -> Result<Self> {
        if points.len() < 2 {
            return Err(Error::invalid(
                "explicit grids need at least two points"));
        }
        if !points.iter().all(|x| x.is_finite()) {
            return Err(Error::invalid("non-finite grid point"));
        }
        let step = (points[points.len() - 1] - points[0])
            / (points.len() - 1) as f64;
        if step <= 0.0 {
            return Err(Error::invalid("grid points must be increasing"));
        }
        let uniform
            = points.iter().zip(points.iter().skip(1))
            .all(|(a, b)| ((b - a) - step).abs() <= STEP_RTOL * step.abs());
        if !uniform {
            return Err(Error::invalid("grid points must be evenly spaced"));
        }
        Ok(Self { points, step })
    }

    pub fn points(&self) -> &nd::Array1<f64> { &self.points }

    pub fn step(&self) -> f64 { self.step }

    pub fn len(&self) -> usize { self.points.len() }

    pub fn is_empty(&self) -> bool { self.points.is_empty() }

    /// Index of the middle point (the zero-velocity slice for a grid
    /// symmetric about zero).
    pub fn center_index(&self) -> usize { self.points.len() / 2 }

    /// Iterate over the grid points.
    pub fn iter(&self) -> nd::iter::Iter<'_, f64, nd::Ix1> { self.points.iter() }

    /// Grid with every point negated, reversed to stay increasing.
    pub fn mirrored(&self) -> Self {
        let points: nd::Array1<f64>
            = self.points.iter().rev().map(|x| -x).collect();
        Self { points, step: self.step }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn linspace_grid() {
        let grid = Grid::linspace(-150.0, 150.0, 201).unwrap();
        assert_eq!(grid.len(), 201);
        assert_approx_eq!(grid.step(), 1.5);
        assert_eq!(grid.center_index(), 100);
        assert_approx_eq!(grid.points()[grid.center_index()], 0.0, 1e-12);
        assert_eq!(grid.iter().count(), 201);
    }

    #[test]
    fn bad_grids_rejected() {
        assert!(Grid::linspace(0.0, 1.0, 1).is_err());
        assert!(Grid::linspace(1.0, 0.0, 10).is_err());
        assert!(Grid::single(0.0, 0.0).is_err());
        assert!(Grid::from_points(nd::array![0.0, 1.0, 3.0]).is_err());
        assert!(Grid::from_points(nd::array![2.0, 1.0, 0.0]).is_err());
        assert!(Grid::from_points(nd::array![0.0, 0.5, 1.0]).is_ok());
    }

    #[test]
    fn mirror_is_increasing() {
        let grid = Grid::linspace(-1.0, 3.0, 5).unwrap();
        let m = grid.mirrored();
        assert_eq!(m.points(), &nd::array![-3.0, -2.0, -1.0, 0.0, 1.0]);
        assert_eq!(m.mirrored(), grid);
    }
}
