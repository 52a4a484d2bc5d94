//! Lower convex hulls in barycentric composition space.
//!
//! Given points on a composition simplex with a height (energy per atom),
//! [`lower_hull`] returns the facets of the lower convex envelope. Each
//! facet's hyperplane coefficients are the heights of the envelope's plane at
//! the simplex corners, which for formation energies are the element chemical
//! potentials of that facet's phase equilibrium.
//!
//! ```
//! use mu_core::Tolerances;
//! use mu_hull::{HullPoint, lower_hull};
//!
//! let points = vec![
//!     HullPoint::new(vec![1.0, 0.0], 0.0),
//!     HullPoint::new(vec![0.0, 1.0], 0.0),
//!     HullPoint::new(vec![0.5, 0.5], -1.0),
//! ];
//! let hull = lower_hull(&points, Tolerances::hull()).unwrap();
//! assert_eq!(hull.facets().len(), 2);
//! assert!(hull.is_on_hull(2));
//! ```

pub mod combinations;
pub mod error;
pub mod hull;
pub mod plane;

pub use error::{HullError, HullResult};
pub use hull::{Facet, HullPoint, LowerHull, lower_hull};
pub use plane::{SINGULAR_TOL, least_squares, solve_plane};
