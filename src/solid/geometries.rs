use super::Solid;
use crate::geometry::{self, Point3};

fn normalized(v: [f64; 3]) -> [f64; 3] {
    let len = geometry::norm(&v);
    if len == 0.0 { [0.0, 0.0, 1.0] } else { geometry::scale(&v, 1.0 / len) }
}

/// Splits `d` into its component along the unit vector `axis` and the length of the rest.
fn axial(d: &Point3, axis: &Point3) -> (f64, f64) {
    let along = geometry::dot(d, axis);
    let perp = geometry::sub(d, &geometry::scale(axis, along));
    (along, geometry::norm(&perp))
}

/// A solid ball.
#[derive(Debug)]
pub struct SphereSolid {
    /// The center of the sphere.
    pub center: Point3,
    /// The radius of the sphere.
    pub radius: f64,
}

impl SphereSolid {
    pub fn new(center: Point3, radius: f64) -> Self {
        Self { center, radius }
    }
}

impl Solid for SphereSolid {
    fn contains(&self, point: &Point3) -> bool {
        geometry::dist_sq(point, &self.center) <= self.radius * self.radius
    }
}

/// An axis-aligned box.
#[derive(Debug)]
pub struct CuboidSolid {
    pub min: Point3,
    pub max: Point3,
}

impl CuboidSolid {
    pub fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }
}

impl Solid for CuboidSolid {
    fn contains(&self, point: &Point3) -> bool {
        (0..3).all(|i| point[i] >= self.min[i] && point[i] <= self.max[i])
    }
}

/// A capped cylinder.
#[derive(Debug)]
pub struct CylinderSolid {
    /// The midpoint of the cylinder's axis.
    pub center: Point3,
    /// The direction of the axis, normalized on construction.
    pub axis: Point3,
    pub radius: f64,
    /// Half the length of the cylinder along its axis.
    pub half_length: f64,
}

impl CylinderSolid {
    /// Creates a new `CylinderSolid`.
    ///
    /// # Arguments
    ///
    /// * `center` - The midpoint of the axis.
    /// * `axis` - The direction of the axis. It will be normalized.
    /// * `radius` - The radius of the cylinder.
    /// * `half_length` - Half the length along the axis.
    pub fn new(center: Point3, axis: Point3, radius: f64, half_length: f64) -> Self {
        Self {
            center,
            axis: normalized(axis),
            radius,
            half_length,
        }
    }
}

impl Solid for CylinderSolid {
    fn contains(&self, point: &Point3) -> bool {
        let (along, perp) = axial(&geometry::sub(point, &self.center), &self.axis);
        along.abs() <= self.half_length && perp <= self.radius
    }
}

/// A solid torus.
#[derive(Debug)]
pub struct TorusSolid {
    pub center: Point3,
    /// The axis of the torus (perpendicular to the major circle).
    pub axis: Point3,
    /// Distance from the center to the tube center.
    pub major_radius: f64,
    /// The radius of the tube.
    pub minor_radius: f64,
}

impl TorusSolid {
    pub fn new(center: Point3, axis: Point3, major_radius: f64, minor_radius: f64) -> Self {
        Self {
            center,
            axis: normalized(axis),
            major_radius,
            minor_radius,
        }
    }
}

impl Solid for TorusSolid {
    fn contains(&self, point: &Point3) -> bool {
        let (along, perp) = axial(&geometry::sub(point, &self.center), &self.axis);
        let tube = (perp - self.major_radius).powi(2) + along * along;
        tube <= self.minor_radius * self.minor_radius
    }
}

/// The half-space on the side of a plane its normal points to.
#[derive(Debug)]
pub struct HalfSpaceSolid {
    /// A point on the plane.
    pub point: Point3,
    /// The normal of the plane, pointing into the solid.
    pub normal: Point3,
}

impl HalfSpaceSolid {
    pub fn new(point: Point3, normal: Point3) -> Self {
        Self {
            point,
            normal: normalized(normal),
        }
    }
}

impl Solid for HalfSpaceSolid {
    fn contains(&self, point: &Point3) -> bool {
        geometry::dot(&geometry::sub(point, &self.point), &self.normal) >= 0.0
    }
}

/// Points contained in every part.
#[derive(Debug, Default)]
pub struct Intersection {
    pub parts: Vec<Box<dyn Solid>>,
}

impl Intersection {
    pub fn new(parts: Vec<Box<dyn Solid>>) -> Self {
        Self { parts }
    }

    pub fn with(mut self, part: impl Solid + 'static) -> Self {
        self.parts.push(Box::new(part));
        self
    }
}

impl Solid for Intersection {
    fn contains(&self, point: &Point3) -> bool {
        self.parts.iter().all(|p| p.contains(point))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sphere() {
        let s = SphereSolid::new([1.0, 1.0, 1.0], 0.5);
        assert!(s.contains(&[1.0, 1.0, 1.4]));
        assert!(!s.contains(&[1.0, 1.0, 1.6]));
    }

    #[test]
    fn test_cylinder_is_capped() {
        let c = CylinderSolid::new([0.0, 0.0, 0.0], [0.0, 0.0, 2.0], 1.0, 0.5);
        assert_eq!(c.axis, [0.0, 0.0, 1.0]);
        assert!(c.contains(&[0.9, 0.0, 0.4]));
        assert!(!c.contains(&[0.9, 0.0, 0.6]));
        assert!(!c.contains(&[1.1, 0.0, 0.0]));
    }

    #[test]
    fn test_torus_hole_is_empty() {
        let t = TorusSolid::new([0.0, 0.0, 0.0], [0.0, 0.0, 1.0], 1.0, 0.25);
        assert!(!t.contains(&[0.0, 0.0, 0.0]));
        assert!(t.contains(&[1.0, 0.0, 0.0]));
        assert!(t.contains(&[0.0, -1.2, 0.1]));
        assert!(!t.contains(&[1.0, 0.0, 0.3]));
    }

    #[test]
    fn test_intersection_of_sphere_and_half_space() {
        let hemisphere = Intersection::default()
            .with(SphereSolid::new([0.0, 0.0, 0.0], 1.0))
            .with(HalfSpaceSolid::new([0.0, 0.0, 0.0], [0.0, 0.0, 1.0]));
        assert!(hemisphere.contains(&[0.0, 0.0, 0.5]));
        assert!(!hemisphere.contains(&[0.0, 0.0, -0.5]));
        assert!(!hemisphere.contains(&[0.0, 0.0, 1.5]));
    }

    #[test]
    fn test_cuboid() {
        let c = CuboidSolid::new([0.0, 0.0, 0.0], [1.0, 2.0, 3.0]);
        assert!(c.contains(&[1.0, 2.0, 3.0]));
        assert!(!c.contains(&[1.0, 2.1, 3.0]));
    }
}
