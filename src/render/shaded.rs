//! Lambert-shaded view of the mesh from a pinhole camera.

use image::{GrayImage, Luma};
use rayon::prelude::*;

use crate::geometry::Geometry;
use crate::render::{Camera, PointLight};
use crate::Intersection;

/// Brightness of a surface point, in `[0, 1]`.
///
/// The normal is used as wound; a triangle facing away from the light shades
/// black even when seen from its lit side.
pub fn lambert(intersection: &Intersection, light: &PointLight) -> f64 {
    let l = (light.position - intersection.point).unit();
    intersection.normal.dot(&l).max(0.0)
}

/// Nearest hit per pixel, shaded by `lambert`. Pixels that hit nothing stay 0.
pub fn shaded<G: Geometry + Sync>(geometry: &G, light: &PointLight, camera: &Camera, resolution: u32) -> GrayImage {
    let mut raster = GrayImage::from_pixel(resolution, resolution, Luma([0]));

    let pixels: &mut [u8] = &mut raster;
    pixels.par_iter_mut().enumerate().for_each(|(n, c)| {
        let x = (n % resolution as usize) as u32;
        let y = (n / resolution as usize) as u32;

        let ray = camera.ray(x, y, resolution);
        if let Some(intersection) = geometry.intersection(&ray) {
            *c = (255.0 * lambert(&intersection, light)) as u8;
        }
    });

    raster
}
