//! Binary shadow cast by a point light onto a receiving plane.

use image::{GrayImage, Luma};
use rayon::prelude::*;

use crate::geometry::Geometry;
use crate::render::PointLight;
use crate::vec3::Vec3;
use crate::Ray;

pub const LIT: u8 = 255;
pub const SHADOW: u8 = 0;

/// Square `size`×`size` window of the plane `z = plane_z`, centred on the z axis
/// and sampled at `resolution`² points.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ShadowSetup {
    pub plane_z: f64,
    pub size: f64,
    pub resolution: u32,
}

impl ShadowSetup {
    /// World position sampled by pixel `(ix, iy)`. Rows run towards +y; edge
    /// pixels sit exactly on the window border.
    pub fn target(&self, ix: u32, iy: u32) -> Vec3<f64> {
        let along = |i: u32| {
            let s = if self.resolution > 1 {
                f64::from(i) / f64::from(self.resolution - 1)
            } else {
                0.5
            };
            (s - 0.5) * self.size
        };

        Vec3::new(along(ix), along(iy), self.plane_z)
    }
}

/// A pixel is dark iff some triangle lies strictly between the light and its target.
pub fn shadow<G: Geometry + Sync>(geometry: &G, light: &PointLight, setup: &ShadowSetup) -> GrayImage {
    let width = setup.resolution;
    let mut raster = GrayImage::from_pixel(width, width, Luma([LIT]));

    let pixels: &mut [u8] = &mut raster;
    pixels.par_iter_mut().enumerate().for_each(|(n, c)| {
        let x = (n % width as usize) as u32;
        let y = (n / width as usize) as u32;

        let ray = Ray::between(light.position, setup.target(x, y));
        if geometry.occluded(&ray) {
            *c = SHADOW;
        }
    });

    raster
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Mesh;
    use crate::shape::{tessellate, ShapeKind};

    #[test]
    fn targets_span_the_window() {
        let setup = ShadowSetup {
            plane_z: 7.0,
            size: 10.0,
            resolution: 11,
        };

        assert_eq!(Vec3::new(-5.0, -5.0, 7.0), setup.target(0, 0));
        assert_eq!(Vec3::new(0.0, 5.0, 7.0), setup.target(5, 10));

        let single = ShadowSetup { resolution: 1, ..setup };
        assert_eq!(Vec3::new(0.0, 0.0, 7.0), single.target(0, 0));
    }

    #[test]
    fn box_under_light_darkens_its_footprint() {
        let mesh = Mesh::from(tessellate(ShapeKind::Box, Vec3::new(0.0, 0.0, 0.0), 10.0, 5.0));
        let light = PointLight::new(Vec3::new(5.0, 5.0, 20.0));
        let setup = ShadowSetup {
            plane_z: -20.0,
            size: 40.0,
            resolution: 32,
        };

        let raster = shadow(&mesh, &light, &setup);

        let mut inside = 0;
        for iy in 0..setup.resolution {
            for ix in 0..setup.resolution {
                let p = setup.target(ix, iy);
                if (0.0..=10.0).contains(&p.x) && (0.0..=10.0).contains(&p.y) {
                    assert_eq!(SHADOW, raster.get_pixel(ix, iy)[0], "pixel {} {}", ix, iy);
                    inside += 1;
                }
            }
        }
        assert!(inside > 0);

        assert_eq!(LIT, raster.get_pixel(0, 0)[0]);
        assert_eq!(LIT, raster.get_pixel(31, 31)[0]);
    }

    #[test]
    fn empty_mesh_casts_no_shadow() {
        let setup = ShadowSetup {
            plane_z: 100.0,
            size: 100.0,
            resolution: 8,
        };
        let raster = shadow(&Mesh::new(), &PointLight::default(), &setup);

        assert!(raster.pixels().all(|p| p[0] == LIT));
    }
}
