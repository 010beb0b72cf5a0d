use std::ops::Range;

use crate::vec3::Vec3;

/// Half-open ray segment: only hits with `t` in `range` count.
#[derive(Clone, Debug)]
pub struct Ray<T> {
    origin: Vec3<T>,
    direction: Vec3<T>,
    range: Range<T>,
}

impl Ray<f64> {
    pub fn new(origin: Vec3<f64>, direction: Vec3<f64>, range: Range<f64>) -> Self {
        Self {
            origin,
            direction: direction.unit(),
            range,
        }
    }

    /// Ray from `from` towards `to`, limited to hits strictly before `to`.
    pub fn between(from: Vec3<f64>, to: Vec3<f64>) -> Self {
        let d = to - from;
        let dist = d.len();

        Self {
            origin: from,
            direction: d.scale(1.0 / dist),
            range: 0.0..dist,
        }
    }

    #[inline]
    pub fn origin(&self) -> Vec3<f64> {
        self.origin
    }

    #[inline]
    pub fn direction(&self) -> &Vec3<f64> {
        &self.direction
    }

    #[inline]
    pub fn offset(&self, t: f64) -> Vec3<f64> {
        self.origin + self.direction.scale(t)
    }
}

impl<T: PartialOrd> Ray<T> {
    #[inline]
    pub fn contains(&self, t: T) -> bool {
        self.range.contains(&t)
    }
}

#[test]
fn between_excludes_target_distance() {
    let ray = Ray::between(Vec3::new(0.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 10.0));

    assert_eq!(&Vec3::new(0.0, 0.0, 1.0), ray.direction());
    assert!(ray.contains(9.999));
    assert!(!ray.contains(10.0));
    assert!(!ray.contains(f64::INFINITY));
}
