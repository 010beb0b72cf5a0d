use crate::{Intersection, Ray};

mod mesh;
mod triangle;

pub use self::mesh::Mesh;
pub use self::triangle::{ray_triangle_intersect, Triangle, EPSILON};

/// Anything rays can be cast against. The renderers only see this trait, so a
/// spatially indexed mesh can replace the brute-force `Mesh` scan.
pub trait Geometry {
    /// Nearest hit inside the ray's range.
    fn intersection(&self, ray: &Ray<f64>) -> Option<Intersection>;

    /// Whether anything is hit inside the ray's range. May stop at the first hit.
    fn occluded(&self, ray: &Ray<f64>) -> bool {
        self.intersection(ray).is_some()
    }
}
