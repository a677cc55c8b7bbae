//! `[f64; 3]` arithmetic used throughout the crate.

/// A point or vector in 3-D space.
pub type Vec3 = [f64; 3];

#[inline]
pub fn add(a: Vec3, b: Vec3) -> Vec3 {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

#[inline]
pub fn sub(a: Vec3, b: Vec3) -> Vec3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

#[inline]
pub fn scale(a: Vec3, s: f64) -> Vec3 {
    [a[0] * s, a[1] * s, a[2] * s]
}

#[inline]
pub fn dot(a: Vec3, b: Vec3) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

#[inline]
pub fn cross(a: Vec3, b: Vec3) -> Vec3 {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

#[inline]
pub fn norm(a: Vec3) -> f64 {
    dot(a, a).sqrt()
}

#[inline]
pub fn distance(a: Vec3, b: Vec3) -> f64 {
    norm(sub(a, b))
}

/// Linear interpolation `a + t (b - a)`.
#[inline]
pub fn lerp(a: Vec3, b: Vec3, t: f64) -> Vec3 {
    add(a, scale(sub(b, a), t))
}

/// Determinant of the matrix whose rows are `r0`, `r1`, `r2`.
#[inline]
pub fn det3(r0: Vec3, r1: Vec3, r2: Vec3) -> f64 {
    dot(r0, cross(r1, r2))
}

/// Area vector of a planar (or mildly warped) polygon.
///
/// Direction follows the right-hand rule over the vertex order; magnitude is
/// the polygon area.
pub fn polygon_area_vector(points: &[Vec3]) -> Vec3 {
    if points.len() < 3 {
        return [0.0; 3];
    }
    let origin = points[0];
    let mut acc = [0.0; 3];
    for w in points[1..].windows(2) {
        acc = add(acc, cross(sub(w[0], origin), sub(w[1], origin)));
    }
    scale(acc, 0.5)
}

/// Arithmetic mean of a point set.
pub fn centroid(points: &[Vec3]) -> Vec3 {
    if points.is_empty() {
        return [0.0; 3];
    }
    let sum = points.iter().fold([0.0; 3], |acc, p| add(acc, *p));
    scale(sum, 1.0 / points.len() as f64)
}

/// Distance from `p` to the segment `[a, b]` and the clamped segment parameter.
pub fn segment_distance(p: Vec3, a: Vec3, b: Vec3) -> (f64, f64) {
    let ab = sub(b, a);
    let len2 = dot(ab, ab);
    if len2 == 0.0 {
        return (distance(p, a), 0.0);
    }
    let t = (dot(sub(p, a), ab) / len2).clamp(0.0, 1.0);
    (distance(p, lerp(a, b, t)), t)
}
