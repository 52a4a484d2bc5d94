//! Lower convex hull over a composition simplex.
//!
//! Points carry barycentric coordinates (non-negative, summing to one) and a
//! height (energy per atom). A hyperplane `c` supports the points from below
//! when `Σ_j x_ij c_j <= e_i` for every point, so the supporting hyperplanes
//! form a polyhedron in `c`-space whose vertices are exactly the lower-hull
//! facets. [`lower_hull`] lowers the corner plane onto the deepest point,
//! settles it on a vertex and walks the polyhedron's edges from there, so the
//! work grows with the number of facets instead of the number of point
//! subsets.

use crate::combinations::Combinations;
use crate::error::{HullError, HullResult};
use crate::plane::least_squares;
use mu_core::numeric::{Tolerances, ensure_finite};
use nalgebra::{DMatrix, DVector};
use std::collections::{HashSet, VecDeque};

/// Rates below this along a unit direction count as parallel.
const DIRECTION_TOL: f64 = 1e-11;

/// Gram eigenvalues below this (relative) span the null space.
const NULL_TOL: f64 = 1e-12;

/// Input point: barycentric coordinates plus height.
#[derive(Debug, Clone, PartialEq)]
pub struct HullPoint {
    pub coords: Vec<f64>,
    pub energy: f64,
}

impl HullPoint {
    pub fn new(coords: Vec<f64>, energy: f64) -> Self {
        Self { coords, energy }
    }
}

/// A lower-hull facet: the points lying on it and its supporting hyperplane.
#[derive(Debug, Clone, PartialEq)]
pub struct Facet {
    vertices: Vec<usize>,
    plane: Vec<f64>,
}

impl Facet {
    /// Indices (into the input slice) of every point on this facet, ascending.
    pub fn vertices(&self) -> &[usize] {
        &self.vertices
    }

    /// Hyperplane coefficients `c` with `height = Σ_j coords_j · c_j`.
    pub fn plane(&self) -> &[f64] {
        &self.plane
    }

    pub fn contains(&self, index: usize) -> bool {
        self.vertices.binary_search(&index).is_ok()
    }

    /// Height of the hyperplane at `coords`.
    pub fn height_at(&self, coords: &[f64]) -> f64 {
        dot(&self.plane, coords)
    }
}

/// Result of [`lower_hull`].
#[derive(Debug, Clone)]
pub struct LowerHull {
    dim: usize,
    facets: Vec<Facet>,
    on_hull: Vec<bool>,
}

impl LowerHull {
    /// Number of components (simplex corners).
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Facets in ascending order of their vertex lists.
    pub fn facets(&self) -> &[Facet] {
        &self.facets
    }

    /// Facets that include point `index`, in facet order.
    pub fn facets_containing(&self, index: usize) -> impl Iterator<Item = &Facet> + '_ {
        self.facets.iter().filter(move |f| f.contains(index))
    }

    /// Point `index` lies on at least one facet.
    pub fn is_on_hull(&self, index: usize) -> bool {
        self.on_hull.get(index).copied().unwrap_or(false)
    }

    /// Hull height at `coords`: the upper envelope of all facet planes, which
    /// inside the simplex equals the lower convex envelope of the points.
    pub fn hull_energy_at(&self, coords: &[f64]) -> f64 {
        self.facets
            .iter()
            .map(|f| f.height_at(coords))
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Height of `point` above the hull (negative if below it).
    pub fn energy_above_hull(&self, point: &HullPoint) -> f64 {
        point.energy - self.hull_energy_at(&point.coords)
    }
}

/// Build the lower convex hull of `points`.
///
/// Every corner of the simplex must be present. `tol.abs` is the height
/// tolerance for a point to count as lying on a plane.
#[tracing::instrument(skip(points), fields(n = points.len()))]
pub fn lower_hull(points: &[HullPoint], tol: Tolerances) -> HullResult<LowerHull> {
    let dim = validate(points)?;

    let corners = corner_heights(points, dim)?;
    let candidates = candidates(points, &corners, tol);
    tracing::debug!(dim, candidates = candidates.len(), "walking hull facets");

    let walk = Walk {
        points,
        candidates: &candidates,
        dim,
        tol,
    };
    let first = walk.settle(walk.start(&corners))?;

    let mut seen: HashSet<Vec<usize>> = HashSet::from([first.tight.clone()]);
    let mut queue = VecDeque::from([first]);
    let mut facets = Vec::new();
    while let Some(vertex) = queue.pop_front() {
        for next in walk.neighbours(&vertex)? {
            if seen.insert(next.tight.clone()) {
                queue.push_back(next);
            }
        }
        facets.push(walk.facet(vertex));
    }

    facets.sort_by(|a, b| a.vertices.cmp(&b.vertices));
    facets.dedup_by(|a, b| a.vertices == b.vertices);

    let mut on_hull = vec![false; points.len()];
    for facet in &facets {
        for &v in &facet.vertices {
            on_hull[v] = true;
        }
    }

    tracing::debug!(facets = facets.len(), "lower hull built");
    Ok(LowerHull {
        dim,
        facets,
        on_hull,
    })
}

/// A supporting plane touching enough candidates to fix it.
#[derive(Debug)]
struct Vertex {
    plane: Vec<f64>,
    /// Candidates on the plane, ascending.
    tight: Vec<usize>,
}

struct Walk<'a> {
    points: &'a [HullPoint],
    candidates: &'a [usize],
    dim: usize,
    tol: Tolerances,
}

impl Walk<'_> {
    /// Height of point `index` above `plane`.
    fn slack(&self, index: usize, plane: &[f64]) -> f64 {
        self.points[index].energy - dot(plane, &self.points[index].coords)
    }

    fn tight(&self, plane: &[f64]) -> Vec<usize> {
        self.candidates
            .iter()
            .copied()
            .filter(|&i| self.slack(i, plane).abs() <= self.tol.abs)
            .collect()
    }

    /// The corner plane lowered until it rests on the deepest candidate.
    fn start(&self, corners: &[f64]) -> Vec<f64> {
        let depth = self
            .candidates
            .iter()
            .map(|&i| -self.slack(i, corners))
            .fold(0.0, f64::max);
        corners.iter().map(|c| c - depth).collect()
    }

    /// How far `plane` can move along `dir` before it meets a candidate not
    /// in `on_plane`. `None` when nothing is ever met.
    fn step(&self, plane: &[f64], dir: &[f64], on_plane: &[usize]) -> Option<f64> {
        self.candidates
            .iter()
            .filter(|&&i| on_plane.binary_search(&i).is_err())
            .filter_map(|&i| {
                let rate = dot(dir, &self.points[i].coords);
                (rate > DIRECTION_TOL).then(|| self.slack(i, plane).max(0.0) / rate)
            })
            .reduce(f64::min)
    }

    /// Slide a supporting plane until the candidates on it pin it down.
    fn settle(&self, mut plane: Vec<f64>) -> HullResult<Vertex> {
        for _ in 0..=self.dim {
            let tight = self.tight(&plane);
            let free = null_space(self.points, &tight, self.dim);
            let Some(dir) = free.first() else {
                return Ok(self.refine(plane, tight));
            };
            // One of the two senses always runs into a candidate: the corners
            // bound every direction with a positive component.
            let (dir, t) = [dir.clone(), dir.iter().map(|x| -x).collect()]
                .into_iter()
                .find_map(|d| self.step(&plane, &d, &tight).map(|t| (d, t)))
                .ok_or(HullError::NoVertex)?;
            for (c, d) in plane.iter_mut().zip(&dir) {
                *c += t * d;
            }
        }
        Err(HullError::NoVertex)
    }

    /// Re-solve the plane through its tight candidates to shed rounding
    /// picked up along the walk.
    fn refine(&self, plane: Vec<f64>, tight: Vec<usize>) -> Vertex {
        let rows = DMatrix::from_fn(tight.len(), self.dim, |r, c| {
            self.points[tight[r]].coords[c]
        });
        let rhs = DVector::from_iterator(tight.len(), tight.iter().map(|&i| self.points[i].energy));
        if let Some((solved, _)) = least_squares(&rows, &rhs) {
            let solved: Vec<f64> = solved.iter().copied().collect();
            if self.tight(&solved) == tight {
                return Vertex {
                    plane: solved,
                    tight,
                };
            }
        }
        Vertex { plane, tight }
    }

    /// Vertices one edge away: free one candidate-direction at a time by
    /// keeping `dim - 1` tight candidates on the plane.
    fn neighbours(&self, vertex: &Vertex) -> HullResult<Vec<Vertex>> {
        let mut out = Vec::new();
        for subset in Combinations::new(vertex.tight.len(), self.dim - 1) {
            let ridge: Vec<usize> = subset.iter().map(|&k| vertex.tight[k]).collect();
            let free = null_space(self.points, &ridge, self.dim);
            let [dir] = free.as_slice() else {
                continue;
            };
            for sign in [1.0, -1.0] {
                let dir: Vec<f64> = dir.iter().map(|x| sign * x).collect();
                let keeps_support = vertex
                    .tight
                    .iter()
                    .all(|&i| dot(&dir, &self.points[i].coords) <= DIRECTION_TOL);
                if !keeps_support {
                    continue;
                }
                let Some(t) = self.step(&vertex.plane, &dir, &vertex.tight) else {
                    continue;
                };
                let plane = vertex.plane.iter().zip(&dir).map(|(c, d)| c + t * d).collect();
                out.push(self.settle(plane)?);
            }
        }
        Ok(out)
    }

    /// Every input point within tolerance of the vertex plane.
    fn facet(&self, vertex: Vertex) -> Facet {
        let vertices = (0..self.points.len())
            .filter(|&k| self.slack(k, &vertex.plane).abs() <= self.tol.abs)
            .collect();
        Facet {
            vertices,
            plane: vertex.plane,
        }
    }
}

fn validate(points: &[HullPoint]) -> HullResult<usize> {
    let dim = points.first().ok_or(HullError::Empty)?.coords.len();
    if dim == 0 {
        return Err(HullError::DimensionMismatch {
            index: 0,
            expected: 1,
            found: 0,
        });
    }
    for (index, point) in points.iter().enumerate() {
        if point.coords.len() != dim {
            return Err(HullError::DimensionMismatch {
                index,
                expected: dim,
                found: point.coords.len(),
            });
        }
        ensure_finite(point.energy, "hull point energy")?;
        let sum: f64 = point.coords.iter().sum();
        if point.coords.iter().any(|&x| !x.is_finite() || x < -1e-12) || (sum - 1.0).abs() > 1e-9 {
            return Err(HullError::NotBarycentric { index });
        }
    }
    Ok(dim)
}

/// Lowest height at each simplex corner.
fn corner_heights(points: &[HullPoint], dim: usize) -> HullResult<Vec<f64>> {
    (0..dim)
        .map(|component| {
            points
                .iter()
                .filter(|p| p.coords[component] > 1.0 - 1e-9)
                .map(|p| p.energy)
                .reduce(f64::min)
                .ok_or(HullError::MissingCorner { component })
        })
        .collect()
}

/// Points that can be hull vertices: on or below the corner plane and the
/// lowest at their coordinates (first in input order on exact ties).
fn candidates(points: &[HullPoint], corners: &[f64], tol: Tolerances) -> Vec<usize> {
    let mut out: Vec<usize> = Vec::new();
    for (index, point) in points.iter().enumerate() {
        if point.energy > dot(corners, &point.coords) + tol.abs {
            continue;
        }
        let same_spot = out
            .iter()
            .position(|&j| same_coords(&points[j].coords, &point.coords));
        match same_spot {
            Some(pos) if point.energy < points[out[pos]].energy => out[pos] = index,
            Some(_) => {}
            None => out.push(index),
        }
    }
    out.sort_unstable();
    out
}

/// Orthonormal basis of the directions orthogonal to the coordinates of
/// `rows`.
fn null_space(points: &[HullPoint], rows: &[usize], dim: usize) -> Vec<Vec<f64>> {
    let gram = DMatrix::from_fn(dim, dim, |r, c| {
        rows.iter()
            .map(|&i| points[i].coords[r] * points[i].coords[c])
            .sum::<f64>()
    });
    let eigen = gram.symmetric_eigen();
    let scale = eigen.eigenvalues.amax().max(1.0);
    eigen
        .eigenvalues
        .iter()
        .enumerate()
        .filter(|(_, l)| l.abs() <= NULL_TOL * scale)
        .map(|(k, _)| eigen.eigenvectors.column(k).iter().copied().collect())
        .collect()
}

fn same_coords(a: &[f64], b: &[f64]) -> bool {
    a.iter().zip(b).all(|(x, y)| (x - y).abs() <= 1e-9)
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(coords: &[f64], energy: f64) -> HullPoint {
        HullPoint::new(coords.to_vec(), energy)
    }

    fn tol() -> Tolerances {
        Tolerances::hull()
    }

    #[test]
    fn binary_hull_with_one_compound() {
        // Ba (1,0) -2, O (0,1) -4.948, BaO (0.5,0.5) -6, BaO2 (1/3,2/3) -5
        let points = vec![
            p(&[1.0, 0.0], -2.0),
            p(&[0.0, 1.0], -4.948),
            p(&[0.5, 0.5], -6.0),
            p(&[1.0 / 3.0, 2.0 / 3.0], -5.0),
        ];
        let hull = lower_hull(&points, tol()).unwrap();
        assert_eq!(hull.dim(), 2);
        assert_eq!(hull.facets().len(), 2);
        assert_eq!(hull.facets()[0].vertices(), &[0, 2]);
        assert_eq!(hull.facets()[1].vertices(), &[1, 2]);
        assert!(hull.is_on_hull(2));
        assert!(!hull.is_on_hull(3));

        let left = hull.facets()[0].plane();
        assert!((left[0] + 2.0).abs() < 1e-12);
        assert!((left[1] + 10.0).abs() < 1e-12);

        let e_above = hull.energy_above_hull(&points[3]);
        let expected = -5.0 - (-6.0 * 2.0 / 3.0 + -4.948 / 3.0);
        assert!((e_above - expected).abs() < 1e-12);
        assert!(e_above > 0.0);
    }

    #[test]
    fn single_component_hull_picks_lowest_point() {
        let points = vec![p(&[1.0], -4.9), p(&[1.0], -4.948)];
        let hull = lower_hull(&points, tol()).unwrap();
        assert_eq!(hull.facets().len(), 1);
        assert_eq!(hull.facets()[0].vertices(), &[1]);
        assert!((hull.facets()[0].plane()[0] + 4.948).abs() < 1e-12);
        assert!(!hull.is_on_hull(0));
    }

    #[test]
    fn ternary_facets_around_interior_point() {
        // Ba, Ti, O corners, BaO, TiO2 and BaTiO3.
        let points = vec![
            p(&[1.0, 0.0, 0.0], -2.0),
            p(&[0.0, 1.0, 0.0], -8.0),
            p(&[0.0, 0.0, 1.0], -4.948),
            p(&[0.5, 0.0, 0.5], -6.0),
            p(&[0.0, 1.0 / 3.0, 2.0 / 3.0], -9.0),
            p(&[0.2, 0.2, 0.6], -8.4),
        ];
        let hull = lower_hull(&points, tol()).unwrap();
        let around: Vec<&Facet> = hull.facets_containing(5).collect();
        assert_eq!(around.len(), 5);
        for facet in &around {
            // Every supporting plane reproduces the heights of its vertices.
            for &v in facet.vertices() {
                assert!((facet.height_at(&points[v].coords) - points[v].energy).abs() < 1e-9);
            }
        }
        for (i, point) in points.iter().enumerate() {
            assert!(hull.is_on_hull(i));
            assert!(hull.energy_above_hull(point).abs() < 1e-9);
        }
    }

    #[test]
    fn coplanar_points_share_one_facet() {
        // A (1,0) 0, B (0,1) 0, C (0.5,0.5) 0 all on one line.
        let points = vec![p(&[1.0, 0.0], 0.0), p(&[0.0, 1.0], 0.0), p(&[0.5, 0.5], 0.0)];
        let hull = lower_hull(&points, tol()).unwrap();
        assert_eq!(hull.facets().len(), 1);
        assert_eq!(hull.facets()[0].vertices(), &[0, 1, 2]);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(lower_hull(&[], tol()), Err(HullError::Empty)));
        assert!(matches!(
            lower_hull(&[p(&[1.0, 0.0], 0.0), p(&[1.0], 0.0)], tol()),
            Err(HullError::DimensionMismatch { index: 1, .. })
        ));
        assert!(matches!(
            lower_hull(&[p(&[0.7, 0.7], 0.0)], tol()),
            Err(HullError::NotBarycentric { index: 0 })
        ));
        assert!(matches!(
            lower_hull(&[p(&[1.0, 0.0], 0.0), p(&[0.5, 0.5], -1.0)], tol()),
            Err(HullError::MissingCorner { component: 1 })
        ));
        assert!(matches!(
            lower_hull(&[p(&[1.0], f64::NAN)], tol()),
            Err(HullError::Numeric(_))
        ));
    }

    #[test]
    fn many_coplanar_points_form_one_facet() {
        // Everything at zero: one degenerate facet holding all seven points.
        let points = vec![
            p(&[1.0, 0.0, 0.0], 0.0),
            p(&[0.0, 1.0, 0.0], 0.0),
            p(&[0.0, 0.0, 1.0], 0.0),
            p(&[0.5, 0.5, 0.0], 0.0),
            p(&[0.0, 0.5, 0.5], 0.0),
            p(&[0.25, 0.25, 0.5], 0.0),
            p(&[0.6, 0.2, 0.2], 0.0),
        ];
        let hull = lower_hull(&points, tol()).unwrap();
        assert_eq!(hull.facets().len(), 1);
        assert_eq!(hull.facets()[0].vertices(), &[0, 1, 2, 3, 4, 5, 6]);
        assert!(hull.facets()[0].plane().iter().all(|c| c.abs() < 1e-12));
    }

    #[test]
    fn dense_binary_chain_is_walked_in_full() {
        // Strictly convex heights: every point is a vertex.
        let n = 3_000usize;
        let mut points = vec![p(&[1.0, 0.0], 0.0), p(&[0.0, 1.0], 0.0)];
        for i in 1..n {
            let x = i as f64 / n as f64;
            points.push(p(&[x, 1.0 - x], -x * (1.0 - x)));
        }
        let hull = lower_hull(&points, tol()).unwrap();
        assert_eq!(hull.facets().len(), n);
        assert!((0..points.len()).all(|i| hull.is_on_hull(i)));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::plane::solve_plane;
    use proptest::prelude::*;

    /// Facet vertex lists from every affinely independent triple.
    fn ternary_facets_by_subsets(points: &[HullPoint], tol: f64) -> Vec<Vec<usize>> {
        let mut out: HashSet<Vec<usize>> = HashSet::new();
        for chosen in Combinations::new(points.len(), 3) {
            let rows = DMatrix::from_fn(3, 3, |r, c| points[chosen[r]].coords[c]);
            let rhs = DVector::from_iterator(3, chosen.iter().map(|&i| points[i].energy));
            let Some(plane) = solve_plane(&rows, &rhs) else {
                continue;
            };
            let plane: Vec<f64> = plane.iter().copied().collect();
            let heights: Vec<f64> = points
                .iter()
                .map(|q| q.energy - dot(&plane, &q.coords))
                .collect();
            if heights.iter().all(|&h| h >= -tol) {
                out.insert((0..points.len()).filter(|&k| heights[k].abs() <= tol).collect());
            }
        }
        let mut out: Vec<Vec<usize>> = out.into_iter().collect();
        out.sort();
        out
    }

    proptest! {
        #[test]
        fn no_point_lies_below_the_binary_hull(
            interior in prop::collection::vec((0.05_f64..0.95, -3.0_f64..1.0), 0..8),
        ) {
            let mut points = vec![
                HullPoint::new(vec![1.0, 0.0], 0.0),
                HullPoint::new(vec![0.0, 1.0], 0.0),
            ];
            for (x, e) in interior {
                points.push(HullPoint::new(vec![x, 1.0 - x], e));
            }
            let hull = lower_hull(&points, Tolerances::hull()).unwrap();
            prop_assert!(hull.is_on_hull(0));
            prop_assert!(hull.is_on_hull(1));
            for point in &points {
                prop_assert!(hull.energy_above_hull(point) >= -1e-7);
            }
        }

        #[test]
        fn ternary_walk_finds_every_supporting_triple(
            corners in prop::collection::vec(-5.0_f64..0.0, 3),
            interior in prop::collection::vec(
                ((0.1_f64..1.0, 0.1_f64..1.0, 0.1_f64..1.0), -6.0_f64..0.0),
                0..10,
            ),
        ) {
            let mut points = vec![
                HullPoint::new(vec![1.0, 0.0, 0.0], corners[0]),
                HullPoint::new(vec![0.0, 1.0, 0.0], corners[1]),
                HullPoint::new(vec![0.0, 0.0, 1.0], corners[2]),
            ];
            for ((a, b, c), e) in interior {
                let sum = a + b + c;
                points.push(HullPoint::new(vec![a / sum, b / sum, c / sum], e));
            }
            let tol = Tolerances::hull();
            let hull = lower_hull(&points, tol).unwrap();
            let walked: Vec<Vec<usize>> =
                hull.facets().iter().map(|f| f.vertices().to_vec()).collect();
            prop_assert_eq!(walked, ternary_facets_by_subsets(&points, tol.abs));
        }
    }
}
