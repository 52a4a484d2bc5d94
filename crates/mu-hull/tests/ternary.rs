//! Integration tests for mu-hull on a ternary oxide system.

use mu_core::Tolerances;
use mu_hull::{HullPoint, lower_hull};

/// Ba, Ti, O corners plus BaO, TiO2, BaTiO3 and an unstable BaO2.
fn points() -> Vec<HullPoint> {
    vec![
        HullPoint::new(vec![1.0, 0.0, 0.0], -2.0),
        HullPoint::new(vec![0.0, 1.0, 0.0], -8.0),
        HullPoint::new(vec![0.0, 0.0, 1.0], -4.948),
        HullPoint::new(vec![0.5, 0.0, 0.5], -6.0),
        HullPoint::new(vec![0.0, 1.0 / 3.0, 2.0 / 3.0], -9.0),
        HullPoint::new(vec![0.2, 0.2, 0.6], -8.4),
        HullPoint::new(vec![1.0 / 3.0, 0.0, 2.0 / 3.0], -5.0),
    ]
}

#[test]
fn facet_planes_are_chemical_potentials() {
    let hull = lower_hull(&points(), Tolerances::hull()).unwrap();

    // BaTiO3 + BaO + O2: mu_O = -4.948, mu_Ba = -12 - mu_O, mu_Ti = -42 - mu_Ba - 3 mu_O
    let facet = hull
        .facets()
        .iter()
        .find(|f| f.vertices() == [2, 3, 5])
        .expect("BaTiO3-BaO-O2 facet");
    let plane = facet.plane();
    assert!((plane[0] + 7.052).abs() < 1e-9);
    assert!((plane[1] + 20.104).abs() < 1e-9);
    assert!((plane[2] + 4.948).abs() < 1e-9);
}

#[test]
fn unstable_phase_sits_above_hull() {
    let pts = points();
    let hull = lower_hull(&pts, Tolerances::hull()).unwrap();
    assert!(!hull.is_on_hull(6));
    let e_above = hull.energy_above_hull(&pts[6]);
    // Hull under BaO2 is 2/3 BaO + 1/3 O per atom.
    let expected = -5.0 - (2.0 / 3.0 * -6.0 + 1.0 / 3.0 * -4.948);
    assert!((e_above - expected).abs() < 1e-9);
    assert_eq!(hull.facets_containing(6).count(), 0);
}

#[test]
fn facets_are_sorted_and_unique() {
    let hull = lower_hull(&points(), Tolerances::hull()).unwrap();
    let lists: Vec<&[usize]> = hull.facets().iter().map(|f| f.vertices()).collect();
    for pair in lists.windows(2) {
        assert!(pair[0] < pair[1]);
    }
}

#[test]
fn result_does_not_depend_on_higher_duplicates() {
    let mut pts = points();
    // A metastable BaTiO3 polymorph 0.2 eV/atom higher.
    pts.push(HullPoint::new(vec![0.2, 0.2, 0.6], -8.2));
    let hull = lower_hull(&pts, Tolerances::hull()).unwrap();
    assert!(!hull.is_on_hull(7));
    assert_eq!(hull.facets_containing(5).count(), 5);
}

#[test]
fn large_binary_set_is_not_rejected() {
    // Thousands of distinct compositions on a strictly convex curve: every
    // point ends up on the hull.
    let n = 2_000usize;
    let mut pts = vec![
        HullPoint::new(vec![1.0, 0.0], 0.0),
        HullPoint::new(vec![0.0, 1.0], 0.0),
    ];
    for i in 1..n {
        let x = i as f64 / n as f64;
        pts.push(HullPoint::new(vec![x, 1.0 - x], -x * (1.0 - x)));
    }
    let hull = lower_hull(&pts, Tolerances::hull()).unwrap();
    assert_eq!(hull.facets().len(), n);
}

/// Per-atom heights of the Li, Fe, P and O corners.
const LFPO_CORNERS: [f64; 4] = [-1.9, -8.3, -5.4, -4.9];

fn per_atom(counts: [f64; 4]) -> Vec<f64> {
    let total: f64 = counts.iter().sum();
    counts.iter().map(|c| c / total).collect()
}

#[test]
fn quaternary_with_hundreds_of_metastable_phases() {
    let lifepo4 = per_atom([1.0, 1.0, 1.0, 4.0]);
    let e_lifepo4 = -6.5;

    // The hull is LiFePO4 joined to each corner triple; plane k leaves out
    // corner k.
    let planes: Vec<Vec<f64>> = (0..4)
        .map(|k| {
            let mut plane = LFPO_CORNERS.to_vec();
            let rest: f64 = (0..4)
                .filter(|&j| j != k)
                .map(|j| lifepo4[j] * LFPO_CORNERS[j])
                .sum();
            plane[k] = (e_lifepo4 - rest) / lifepo4[k];
            plane
        })
        .collect();
    let hull_at = |x: &[f64]| {
        planes
            .iter()
            .map(|c| c.iter().zip(x).map(|(a, b)| a * b).sum::<f64>())
            .fold(f64::NEG_INFINITY, f64::max)
    };

    let mut pts: Vec<HullPoint> = (0..4)
        .map(|k| {
            let mut coords = vec![0.0; 4];
            coords[k] = 1.0;
            HullPoint::new(coords, LFPO_CORNERS[k])
        })
        .collect();
    pts.push(HullPoint::new(lifepo4.clone(), e_lifepo4));

    let mut offsets = Vec::new();
    for a in 1..=3 {
        for b in 1..=3 {
            for c in 1..=3 {
                for o in 1..=8 {
                    if a == b && b == c && o == 4 * a {
                        continue;
                    }
                    let x = per_atom([a as f64, b as f64, c as f64, o as f64]);
                    let offset = 0.02 + 0.001 * (offsets.len() % 5) as f64;
                    pts.push(HullPoint::new(x.clone(), hull_at(&x) + offset));
                    offsets.push(offset);
                }
            }
        }
    }
    assert_eq!(pts.len(), 219);

    let hull = lower_hull(&pts, Tolerances::hull()).unwrap();
    assert_eq!(hull.facets().len(), 4);
    assert_eq!(hull.facets_containing(4).count(), 4);
    for facet in hull.facets() {
        assert_eq!(facet.vertices().len(), 4);
    }
    for (i, offset) in offsets.iter().enumerate() {
        let index = i + 5;
        assert!(!hull.is_on_hull(index));
        assert!((hull.energy_above_hull(&pts[index]) - offset).abs() < 1e-9);
    }
}
