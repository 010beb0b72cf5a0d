use crate::vec3::Vec3;

/// Nearest hit along a ray. `triangle` indexes into the mesh that was scanned.
#[derive(Copy, Clone, Debug)]
pub struct Intersection {
    pub t: f64,
    pub point: Vec3<f64>,
    pub normal: Vec3<f64>,
    pub triangle: usize,
}

impl Intersection {
    pub fn new(t: f64, point: Vec3<f64>, normal: Vec3<f64>, triangle: usize) -> Self {
        Self { t, point, normal, triangle }
    }
}
