//! Model that contains one or more triangles.

use std::f64;
use std::ops::Index;
use std::slice;

use crate::geometry::{ray_triangle_intersect, Geometry, Triangle};
use crate::{Intersection, Ray};

/// Append-only triangle soup. Order is kept so that serialization is
/// deterministic; nothing is merged or deduplicated.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            triangles: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn push(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> slice::Iter<'_, Triangle> {
        self.triangles.iter()
    }
}

impl Extend<Triangle> for Mesh {
    fn extend<I: IntoIterator<Item = Triangle>>(&mut self, iter: I) {
        self.triangles.extend(iter);
    }
}

impl From<Vec<Triangle>> for Mesh {
    fn from(triangles: Vec<Triangle>) -> Self {
        Self { triangles }
    }
}

impl Index<usize> for Mesh {
    type Output = Triangle;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        &self.triangles[index]
    }
}

impl<'a> IntoIterator for &'a Mesh {
    type Item = &'a Triangle;
    type IntoIter = slice::Iter<'a, Triangle>;

    fn into_iter(self) -> Self::IntoIter {
        self.triangles.iter()
    }
}

impl Geometry for Mesh {
    fn intersection(&self, ray: &Ray<f64>) -> Option<Intersection> {
        let origin = ray.origin();
        let mut t = f64::INFINITY;
        let mut closest = None;

        for (id, triangle) in self.triangles.iter().enumerate() {
            let hit = ray_triangle_intersect(&origin, ray.direction(), triangle);
            if hit < t && ray.contains(hit) {
                t = hit;
                closest = Some(id);
            }
        }

        closest.map(|id| Intersection::new(t, ray.offset(t), self[id].normal(), id))
    }

    fn occluded(&self, ray: &Ray<f64>) -> bool {
        let origin = ray.origin();

        self.triangles
            .iter()
            .map(|triangle| ray_triangle_intersect(&origin, ray.direction(), triangle))
            .any(|t| ray.contains(t))
    }
}
