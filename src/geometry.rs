//! Small vector helpers and the geometric predicates used by the diagram.
//!
//! Points are plain `[f64; 3]` arrays throughout the crate.

pub type Point3 = [f64; 3];

#[inline]
pub fn sub(a: &Point3, b: &Point3) -> Point3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

#[inline]
pub fn add(a: &Point3, b: &Point3) -> Point3 {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

#[inline]
pub fn scale(a: &Point3, s: f64) -> Point3 {
    [a[0] * s, a[1] * s, a[2] * s]
}

#[inline]
pub fn dot(a: &Point3, b: &Point3) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

#[inline]
pub fn cross(a: &Point3, b: &Point3) -> Point3 {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

#[inline]
pub fn norm_sq(a: &Point3) -> f64 {
    dot(a, a)
}

#[inline]
pub fn norm(a: &Point3) -> f64 {
    norm_sq(a).sqrt()
}

#[inline]
pub fn dist_sq(a: &Point3, b: &Point3) -> f64 {
    norm_sq(&sub(a, b))
}

/// Six times the signed volume of the tetrahedron `(a, b, c, d)`.
///
/// Positive when `d` lies on the side of plane `abc` that `(b - a) x (c - a)` points to.
#[inline]
pub fn orient(a: &Point3, b: &Point3, c: &Point3, d: &Point3) -> f64 {
    let n = cross(&sub(b, a), &sub(c, a));
    dot(&n, &sub(d, a))
}

/// Signed distance of `p` from the plane through `a`, `b`, `c`.
///
/// Returns `None` when the three points are collinear and span no plane.
pub fn face_height(a: &Point3, b: &Point3, c: &Point3, p: &Point3) -> Option<f64> {
    let n = cross(&sub(b, a), &sub(c, a));
    let len = norm(&n);
    if len == 0.0 || !len.is_finite() {
        return None;
    }
    Some(dot(&n, &sub(p, a)) / len)
}

/// Distance of `p` from the infinite line through `a` and `b`.
pub fn line_distance(a: &Point3, b: &Point3, p: &Point3) -> f64 {
    let ab = sub(b, a);
    let len = norm(&ab);
    if len == 0.0 {
        return norm(&sub(p, a));
    }
    norm(&cross(&ab, &sub(p, a))) / len
}

/// Circumcentre and squared circumradius of the tetrahedron `(a, b, c, d)`.
///
/// Returns `None` for flat tetrahedra.
pub fn circumsphere(a: &Point3, b: &Point3, c: &Point3, d: &Point3) -> Option<(Point3, f64)> {
    let ba = sub(b, a);
    let ca = sub(c, a);
    let da = sub(d, a);

    let cd = cross(&ca, &da);
    let db = cross(&da, &ba);
    let bc = cross(&ba, &ca);

    let denom = 2.0 * dot(&ba, &cd);
    if denom == 0.0 || !denom.is_finite() {
        return None;
    }

    let offset = scale(
        &add(&add(&scale(&cd, norm_sq(&ba)), &scale(&db, norm_sq(&ca))), &scale(&bc, norm_sq(&da))),
        1.0 / denom,
    );
    let radius_sq = norm_sq(&offset);
    if !radius_sq.is_finite() {
        return None;
    }
    Some((add(a, &offset), radius_sq))
}

/// Power of `p` with respect to the sphere `(centre, radius_sq)`: positive inside.
#[inline]
pub fn power(centre: &Point3, radius_sq: f64, p: &Point3) -> f64 {
    radius_sq - dist_sq(centre, p)
}
