//! Flat triangle and the ray-triangle test both renderers share.

use crate::geometry::Geometry;
use crate::vec3::Vec3;
use crate::{Intersection, Ray};

/// Below this `|a|` the ray is treated as parallel; hits closer than it are dropped.
pub const EPSILON: f64 = 1e-6;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Triangle {
    /// Winding decides the sign of `normal`.
    pub vertices: [Vec3<f64>; 3],
}

impl Triangle {
    #[inline]
    pub fn new(v0: Vec3<f64>, v1: Vec3<f64>, v2: Vec3<f64>) -> Self {
        Self { vertices: [v0, v1, v2] }
    }

    /// Normalized `(v1 - v0) x (v2 - v0)`.
    ///
    /// A zero-area triangle yields the zero vector rather than a unit normal.
    #[inline]
    pub fn normal(&self) -> Vec3<f64> {
        let [v0, v1, v2] = self.vertices;
        (v1 - v0).cross(&(v2 - v0)).unit_or_zero()
    }
}

/// Determinant-based ray-triangle test.
///
/// Returns the hit distance along `dir`, or `f64::INFINITY` when the ray is
/// parallel to the plane, passes outside the edges, or hits at or behind
/// `EPSILON` from the origin.
pub fn ray_triangle_intersect(origin: &Vec3<f64>, dir: &Vec3<f64>, tri: &Triangle) -> f64 {
    let [v0, v1, v2] = tri.vertices;
    let e1 = v1 - v0;
    let e2 = v2 - v0;

    let h = dir.cross(&e2);
    let a = e1.dot(&h);
    if a.abs() < EPSILON {
        return f64::INFINITY;
    }

    let f = 1.0 / a;
    let s = *origin - v0;
    let u = f * s.dot(&h);
    if u < 0.0 || u > 1.0 {
        return f64::INFINITY;
    }

    let q = s.cross(&e1);
    let v = f * dir.dot(&q);
    if v < 0.0 || v > 1.0 || u + v > 1.0 {
        return f64::INFINITY;
    }

    let t = f * e2.dot(&q);
    if t > EPSILON {
        t
    } else {
        f64::INFINITY
    }
}

impl Geometry for Triangle {
    fn intersection(&self, ray: &Ray<f64>) -> Option<Intersection> {
        let t = ray_triangle_intersect(&ray.origin(), ray.direction(), self);
        if t.is_finite() && ray.contains(t) {
            Some(Intersection::new(t, ray.offset(t), self.normal(), 0))
        } else {
            None
        }
    }
}
