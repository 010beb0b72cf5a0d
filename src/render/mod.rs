//! Raytraced verification of a generated mesh: the shadow it casts and a
//! shaded view of it.

use std::f64::consts::PI;
use std::fs::File;
use std::path::Path;
use std::time::Instant;

use image::GrayImage;
use log::info;

use crate::geometry::Geometry;
use crate::vec3::Vec3;
use crate::{stl, Error, Ray, Result};

mod shaded;
mod shadow;

pub use self::shaded::{lambert, shaded};
pub use self::shadow::{shadow, ShadowSetup, LIT, SHADOW};

/// Bare position: no intensity, no falloff.
#[derive(Copy, Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct PointLight {
    pub position: Vec3<f64>,
}

impl PointLight {
    pub fn new(position: Vec3<f64>) -> Self {
        Self { position }
    }
}

/// Pinhole camera looking down -z with a square image plane.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Camera {
    origin: Vec3<f64>,
    screen_dist: f64,
}

impl Camera {
    pub fn new(origin: Vec3<f64>, fov: f64) -> Self {
        Self {
            origin,
            screen_dist: 1.0 / (fov / 2.0).tan(),
        }
    }

    /// Primary ray through the centre of pixel `(x, y)`; row 0 is the top.
    pub fn ray(&self, x: u32, y: u32, resolution: u32) -> Ray<f64> {
        let r = f64::from(resolution);
        let px = 2.0 * (f64::from(x) + 0.5) / r - 1.0;
        let py = 1.0 - 2.0 * (f64::from(y) + 0.5) / r;

        Ray::new(self.origin, Vec3::new(px, py, -self.screen_dist), 0.0..f64::INFINITY)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct VerifyConfig {
    pub plane_z: f64,
    pub size: f64,
    pub resolution: u32,
    pub light: Vec3<f64>,
    pub camera: Vec3<f64>,
    /// Full field of view, radians.
    pub fov: f64,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            plane_z: 100.0,
            size: 100.0,
            resolution: 256,
            light: Vec3::new(0.0, 0.0, 0.0),
            camera: Vec3::new(0.0, 0.0, 80.0),
            fov: PI / 3.0,
        }
    }
}

impl VerifyConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let config = serde_json::from_reader(file)?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.resolution == 0 {
            return Err(Error::invalid("resolution must be positive"));
        }
        if !(self.size.is_finite() && self.size > 0.0) {
            return Err(Error::invalid(format!("region size must be positive, got {}", self.size)));
        }
        if !(self.fov > 0.0 && self.fov < PI) {
            return Err(Error::invalid(format!("field of view must lie in (0, pi), got {}", self.fov)));
        }
        if !self.plane_z.is_finite() {
            return Err(Error::invalid("plane z must be finite"));
        }
        if !self.light.is_finite() {
            return Err(Error::invalid(format!("light position must be finite, got {:?}", self.light)));
        }
        if !self.camera.is_finite() {
            return Err(Error::invalid(format!("camera position must be finite, got {:?}", self.camera)));
        }

        Ok(())
    }

    pub fn shadow_setup(&self) -> ShadowSetup {
        ShadowSetup {
            plane_z: self.plane_z,
            size: self.size,
            resolution: self.resolution,
        }
    }
}

/// Shadow and shaded render of `geometry` under `config`.
pub fn render<G: Geometry + Sync>(geometry: &G, config: &VerifyConfig) -> Result<(GrayImage, GrayImage)> {
    config.validate()?;

    let light = PointLight::new(config.light);
    let camera = Camera::new(config.camera, config.fov);

    let now = Instant::now();
    let silhouette = shadow(geometry, &light, &config.shadow_setup());
    info!("Shadow finished, elapsed: {:.3} ms", now.elapsed().as_millis() as f64);

    let now = Instant::now();
    let view = shaded(geometry, &light, &camera, config.resolution);
    info!("Render finished, elapsed: {:.3} ms", now.elapsed().as_millis() as f64);

    Ok((silhouette, view))
}

/// Loads the STL at `mesh`, renders both views and writes them as images.
pub fn verify<P, S, R>(mesh: P, shadow_output: S, render_output: R, config: &VerifyConfig) -> Result<()>
where
    P: AsRef<Path>,
    S: AsRef<Path>,
    R: AsRef<Path>,
{
    config.validate()?;

    let mesh = stl::load_stl(mesh)?;
    info!("Loaded {} triangles", mesh.len());

    let (silhouette, view) = render(&mesh, config)?;

    silhouette.save(shadow_output.as_ref())?;
    info!("Shadow saved to {}", shadow_output.as_ref().display());
    view.save(render_output.as_ref())?;
    info!("Render saved to {}", render_output.as_ref().display());

    Ok(())
}
