//! Populating a diagram from the boundary of a solid model.
//!
//! This is the only bridge between solid geometry and the diagram: a solid is
//! probed on a regular lattice, lattice points on its boundary are perturbed and
//! handed to [`Diagram::insert_with_owner`] one by one.

pub mod geometries;

use rand::prelude::*;
use rand::rngs::StdRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::bounds::BoundingBox;
use crate::diagram::Diagram;
use crate::error::DiagramError;
use crate::geometry::Point3;
use crate::site::OwnerTag;

/// Refuses lattices that would not fit comfortably in memory.
pub const MAX_LATTICE_POINTS: usize = 1 << 24;

/// A region of space that can answer point membership.
///
/// Must be Send + Sync so the lattice can be probed in parallel.
pub trait Solid: Send + Sync + std::fmt::Debug {
    fn contains(&self, point: &Point3) -> bool;
}

/// Parameters of [`sample_solid`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SampleOptions {
    /// Lattice spacing, in model units.
    pub spacing: f64,
    /// Random displacement of each sample as a fraction of `spacing`, in `[0, 0.5)`.
    pub jitter: f64,
    pub seed: u64,
    /// Tag attached to every sampled site.
    pub owner: OwnerTag,
}

impl Default for SampleOptions {
    fn default() -> Self {
        Self {
            spacing: 0.1,
            jitter: 0.25,
            seed: 123456789,
            owner: OwnerTag::default(),
        }
    }
}

impl SampleOptions {
    pub fn with_spacing(spacing: f64) -> Self {
        Self {
            spacing,
            ..Self::default()
        }
    }
}

struct Lattice {
    origin: Point3,
    spacing: f64,
    shape: [usize; 3],
}

impl Lattice {
    fn new(bounds: &BoundingBox<3>, spacing: f64) -> Result<Self, DiagramError> {
        let too_fine = DiagramError::InvalidParameter {
            name: "spacing",
            value: spacing,
        };
        // count along each axis in f64 first, a tiny spacing would overflow usize
        let steps = bounds.size().map(|s| (s / spacing).floor() + 1.0);
        if steps.iter().product::<f64>() > MAX_LATTICE_POINTS as f64 {
            return Err(too_fine);
        }
        let shape = steps.map(|n| n as usize);
        let total = shape.iter().try_fold(1usize, |acc, &n| acc.checked_mul(n));
        if total.is_none_or(|t| t > MAX_LATTICE_POINTS) {
            return Err(too_fine);
        }
        Ok(Self {
            origin: bounds.min,
            spacing,
            shape,
        })
    }

    fn len(&self) -> usize {
        self.shape.iter().product()
    }

    fn coords(&self, index: usize) -> [usize; 3] {
        let [nx, ny, _] = self.shape;
        [index % nx, (index / nx) % ny, index / (nx * ny)]
    }

    fn index(&self, c: [usize; 3]) -> usize {
        let [nx, ny, _] = self.shape;
        c[0] + nx * (c[1] + ny * c[2])
    }

    fn point(&self, c: [usize; 3]) -> Point3 {
        [
            self.origin[0] + c[0] as f64 * self.spacing,
            self.origin[1] + c[1] as f64 * self.spacing,
            self.origin[2] + c[2] as f64 * self.spacing,
        ]
    }

    /// True if some face neighbour of `c` is outside the solid or off the lattice.
    fn on_boundary(&self, c: [usize; 3], inside: &[bool]) -> bool {
        for axis in 0..3 {
            if c[axis] == 0 || c[axis] + 1 == self.shape[axis] {
                return true;
            }
            for delta in [-1isize, 1] {
                let mut n = c;
                n[axis] = (c[axis] as isize + delta) as usize;
                if !inside[self.index(n)] {
                    return true;
                }
            }
        }
        false
    }
}

/// Boundary points of `solid` on a jittered lattice over `bounds`, in random order.
pub fn boundary_samples(
    solid: &dyn Solid,
    bounds: &BoundingBox<3>,
    options: &SampleOptions,
) -> Result<Vec<Point3>, DiagramError> {
    if !options.spacing.is_finite() || options.spacing <= 0.0 {
        return Err(DiagramError::InvalidParameter {
            name: "spacing",
            value: options.spacing,
        });
    }
    if !(0.0..0.5).contains(&options.jitter) {
        return Err(DiagramError::InvalidParameter {
            name: "jitter",
            value: options.jitter,
        });
    }

    let lattice = Lattice::new(bounds, options.spacing)?;
    let inside: Vec<bool> = (0..lattice.len())
        .into_par_iter()
        .map(|i| solid.contains(&lattice.point(lattice.coords(i))))
        .collect();

    let mut rng = StdRng::seed_from_u64(options.seed);
    let amplitude = options.jitter * options.spacing;
    let mut samples = Vec::new();
    for (i, _) in inside.iter().enumerate().filter(|(_, in_solid)| **in_solid) {
        let c = lattice.coords(i);
        if !lattice.on_boundary(c, &inside) {
            continue;
        }
        let mut p = lattice.point(c);
        for axis in 0..3 {
            let offset = (rng.r#gen::<f64>() * 2.0 - 1.0) * amplitude;
            p[axis] = (p[axis] + offset).clamp(bounds.min[axis], bounds.max[axis]);
        }
        samples.push(p);
    }
    // lattice order makes long runs of coplanar sites; shuffling keeps the cavities small
    samples.shuffle(&mut rng);
    Ok(samples)
}

/// Builds a diagram by sampling the boundary of `solid` inside `bounds`.
///
/// Samples whose insertion fails on tolerance grounds are skipped with a warning.
pub fn sample_solid(
    solid: &dyn Solid,
    bounds: BoundingBox<3>,
    options: SampleOptions,
) -> Result<Diagram, DiagramError> {
    let samples = boundary_samples(solid, &bounds, &options)?;
    let mut diagram = Diagram::new(bounds)?;

    let mut skipped = 0usize;
    for p in &samples {
        if let Err(err) = diagram.insert_with_owner(*p, options.owner) {
            tracing::warn!(point = ?p, %err, "sample skipped");
            skipped += 1;
        }
    }
    tracing::debug!(
        samples = samples.len(),
        skipped,
        sites = diagram.point_count(),
        "sampled solid"
    );
    Ok(diagram)
}

#[cfg(test)]
mod tests {
    use super::geometries::*;
    use super::*;

    fn unit_box() -> BoundingBox<3> {
        BoundingBox::new([0.0, 0.0, 0.0], [1.0, 1.0, 1.0])
    }

    #[test]
    fn test_samples_hug_the_sphere_surface() {
        let sphere = SphereSolid::new([0.5, 0.5, 0.5], 0.35);
        let options = SampleOptions::with_spacing(0.1);
        let samples = boundary_samples(&sphere, &unit_box(), &options).unwrap();
        assert!(!samples.is_empty());
        for p in &samples {
            let d = crate::geometry::dist_sq(p, &sphere.center).sqrt();
            assert!((d - sphere.radius).abs() <= 1.5 * options.spacing, "sample {p:?} at distance {d}");
        }
    }

    #[test]
    fn test_sampling_is_deterministic() {
        let torus = TorusSolid::new([0.5, 0.5, 0.5], [0.0, 0.0, 1.0], 0.3, 0.1);
        let options = SampleOptions::with_spacing(0.05);
        let a = boundary_samples(&torus, &unit_box(), &options).unwrap();
        let b = boundary_samples(&torus, &unit_box(), &options).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_sample_solid_builds_valid_diagram() {
        let cuboid = CuboidSolid::new([0.2, 0.2, 0.2], [0.8, 0.7, 0.6]);
        let owner = OwnerTag { set: 3, model: 9 };
        let options = SampleOptions {
            owner,
            ..SampleOptions::with_spacing(0.1)
        };
        let d = sample_solid(&cuboid, unit_box(), options).unwrap();
        assert!(d.exists());
        assert!(d.point_count() > 4);
        assert!(d.sites().all(|(_, s)| s.owner == owner));
        d.check_links().unwrap();
        assert!(d.delaunay_violations().is_empty());
    }

    #[test]
    fn test_invalid_options_are_rejected() {
        let sphere = SphereSolid::new([0.5, 0.5, 0.5], 0.3);
        let bad_spacing = SampleOptions::with_spacing(0.0);
        assert!(matches!(
            sample_solid(&sphere, unit_box(), bad_spacing),
            Err(DiagramError::InvalidParameter { name: "spacing", .. })
        ));
        let bad_jitter = SampleOptions {
            jitter: 0.7,
            ..SampleOptions::default()
        };
        assert!(matches!(
            sample_solid(&sphere, unit_box(), bad_jitter),
            Err(DiagramError::InvalidParameter { name: "jitter", .. })
        ));
        let huge = SampleOptions::with_spacing(1e-6);
        assert!(matches!(
            sample_solid(&sphere, unit_box(), huge),
            Err(DiagramError::InvalidParameter { name: "spacing", .. })
        ));
        let tiny = SampleOptions::with_spacing(1e-300);
        assert!(matches!(
            sample_solid(&sphere, unit_box(), tiny),
            Err(DiagramError::InvalidParameter { name: "spacing", .. })
        ));
    }

    #[test]
    fn test_empty_solid_gives_empty_diagram() {
        let far = SphereSolid::new([5.0, 5.0, 5.0], 0.1);
        let d = sample_solid(&far, unit_box(), SampleOptions::default()).unwrap();
        assert!(!d.exists());
        assert_eq!(d.point_count(), 0);
    }
}
