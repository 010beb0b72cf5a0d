//! Image to relief mesh.

use std::fs::File;
use std::path::Path;
use std::time::Instant;

use image::GrayImage;
use log::{debug, info};
use rayon::prelude::*;

use crate::geometry::{Mesh, Triangle};
use crate::heightfield::{self, Heightfield, Layout, Relief};
use crate::shape::{self, ShapeMode, ShapeSelector};
use crate::vec3::Vec3;
use crate::{stl, Error, Result};

#[derive(Copy, Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub layout: Layout,
    pub relief: Relief,
    /// Side length, in cells, the source image is resampled to.
    pub resolution: u32,
    pub shape: ShapeSelector,
    /// Cylinder fineness.
    pub segments: u32,
    /// Only consulted by `ShapeSelector::Mixed`.
    pub seed: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            layout: Layout::default(),
            relief: Relief::default(),
            resolution: 200,
            shape: ShapeSelector::default(),
            segments: shape::DEFAULT_SEGMENTS,
            seed: 0,
        }
    }
}

impl GeneratorConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let config = serde_json::from_reader(file)?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<ShapeMode> {
        if self.resolution == 0 {
            return Err(Error::invalid("resolution must be positive"));
        }
        self.layout.validate()?;
        self.relief.validate()?;

        ShapeMode::new(self.shape, self.segments, self.seed)
    }
}

/// Builds the relief for an already decoded luminance grid.
///
/// Cells are visited column by column; output order does not depend on how
/// the columns are scheduled.
pub fn generate(luma: &GrayImage, config: &GeneratorConfig) -> Result<Mesh> {
    let mode = config.validate()?;
    let field = Heightfield::new(luma, config.layout, config.relief)?;
    debug!(
        "{}x{} cells of size {:.4}, shape {}",
        field.columns(),
        field.rows(),
        field.cell_size(),
        config.shape
    );

    let columns: Vec<Vec<Triangle>> = (0..field.columns())
        .into_par_iter()
        .map(|i| {
            let mut triangles = Vec::new();
            for cell in field.column(i).filter(|cell| cell.included) {
                let kind = mode.kind_at(cell.i, cell.j);
                let origin = Vec3::new(cell.x, cell.y, 0.0);
                triangles.extend(shape::tessellate(kind, origin, cell.size, cell.height));
            }
            triangles
        })
        .collect();

    let mut mesh = Mesh::with_capacity(columns.iter().map(Vec::len).sum());
    for column in columns {
        mesh.extend(column);
    }

    Ok(mesh)
}

/// Decodes `image`, builds the relief and writes it to `output` as binary STL.
pub fn generate_file<P, Q>(image: P, output: Q, config: &GeneratorConfig) -> Result<Mesh>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    config.validate()?;

    let now = Instant::now();
    let luma = heightfield::load_luminance(image, config.resolution)?;
    let mesh = generate(&luma, config)?;
    info!(
        "Generated {} triangles, elapsed: {:.3} ms",
        mesh.len(),
        now.elapsed().as_millis() as f64
    );

    stl::save_stl(&mesh, output.as_ref())?;
    info!("STL saved to {}", output.as_ref().display());

    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use image::Luma;

    use super::*;

    fn gradient(resolution: u32) -> GrayImage {
        GrayImage::from_fn(resolution, resolution, |x, y| Luma([((x * 37 + y * 11) % 256) as u8]))
    }

    fn to_bytes(mesh: &Mesh) -> Vec<u8> {
        let mut bytes = Vec::new();
        stl::write_stl(mesh, &mut bytes).unwrap();
        bytes
    }

    #[test]
    fn inverted_radii_produce_empty_mesh() {
        for &(hole, outer, resolution) in &[(20.0, 10.0, 16), (50.0, 49.9, 3), (1.0, 0.5, 1)] {
            let config = GeneratorConfig {
                layout: Layout::Disk {
                    outer_radius: outer,
                    hole_radius: hole,
                },
                resolution,
                ..GeneratorConfig::default()
            };

            let mesh = generate(&gradient(resolution), &config).unwrap();
            assert!(mesh.is_empty());

            let bytes = to_bytes(&mesh);
            assert_eq!(84, bytes.len());
            assert_eq!([0, 0, 0, 0], [bytes[80], bytes[81], bytes[82], bytes[83]]);
        }
    }

    #[test]
    fn single_box_cell_matches_cube_corners() {
        let config = GeneratorConfig {
            layout: Layout::Grid { cell_size: 2.0 },
            relief: Relief::new(1.0, 5.0),
            resolution: 1,
            ..GeneratorConfig::default()
        };
        let luma = GrayImage::from_pixel(1, 1, Luma([51]));

        let mesh = generate(&luma, &config).unwrap();
        assert_eq!(12, mesh.len());

        let height = 1.0 + 204.0 / 255.0 * 5.0;
        let loaded = stl::read_stl(&to_bytes(&mesh)[..]).unwrap();
        assert_eq!(12, loaded.len());

        for v in loaded.iter().flat_map(|t| t.vertices.iter()) {
            assert!(v.x.abs() < 1e-6 || (v.x - 2.0).abs() < 1e-6);
            assert!(v.y.abs() < 1e-6 || (v.y - 2.0).abs() < 1e-6);
            assert!(v.z.abs() < 1e-6 || (v.z - height).abs() < 1e-5);
        }

        let top = loaded.iter().map(|t| t.vertices[0].z).fold(0.0, f64::max);
        assert_relative_eq!(height, top, epsilon = 1e-5);
    }

    #[test]
    fn triangle_count_follows_shape() {
        let luma = gradient(4);
        for (selector, per_cell) in vec![
            (ShapeSelector::Box, 12),
            (ShapeSelector::Pyramid, 6),
            (ShapeSelector::Cylinder, 4 * 7),
        ] {
            let config = GeneratorConfig {
                layout: Layout::Grid { cell_size: 1.0 },
                resolution: 4,
                shape: selector,
                segments: 7,
                ..GeneratorConfig::default()
            };

            assert_eq!(16 * per_cell, generate(&luma, &config).unwrap().len());
        }
    }

    #[test]
    fn same_input_gives_identical_bytes() {
        let config = GeneratorConfig {
            resolution: 24,
            shape: ShapeSelector::Pyramid,
            ..GeneratorConfig::default()
        };
        let luma = gradient(24);

        let first = generate(&luma, &config).unwrap();
        assert!(!first.is_empty());
        assert_eq!(to_bytes(&first), to_bytes(&generate(&luma, &config).unwrap()));
    }

    #[test]
    fn mixed_mode_is_reproducible_with_seed() {
        let luma = gradient(12);
        let config = GeneratorConfig {
            layout: Layout::Grid { cell_size: 1.0 },
            resolution: 12,
            shape: ShapeSelector::Mixed,
            segments: 5,
            seed: 7,
            ..GeneratorConfig::default()
        };

        let first = generate(&luma, &config).unwrap();
        assert_eq!(first, generate(&luma, &config).unwrap());

        let other = GeneratorConfig { seed: 8, ..config };
        assert_ne!(first, generate(&luma, &other).unwrap());
    }

    #[test]
    fn bad_configuration_fails_before_geometry() {
        let luma = gradient(2);

        let zero = GeneratorConfig {
            resolution: 0,
            ..GeneratorConfig::default()
        };
        assert!(matches!(generate(&luma, &zero), Err(Error::InvalidConfiguration(..))));

        let coarse = GeneratorConfig {
            shape: ShapeSelector::Cylinder,
            segments: 2,
            ..GeneratorConfig::default()
        };
        assert!(matches!(generate(&luma, &coarse), Err(Error::InvalidConfiguration(..))));
    }

    #[test]
    fn config_parses_from_json() {
        let config: GeneratorConfig = serde_json::from_str(
            r#"{
                "layout": {"type": "grid", "cell_size": 0.5},
                "relief": {"base": 1.0, "relief": 29.0},
                "shape": "cylinder",
                "segments": 24
            }"#,
        )
        .unwrap();

        assert_eq!(Layout::Grid { cell_size: 0.5 }, config.layout);
        assert_eq!(Relief::from_min_max(1.0, 30.0), config.relief);
        assert_eq!(ShapeSelector::Cylinder, config.shape);
        assert_eq!(24, config.segments);
        assert_eq!(200, config.resolution);

        assert!(serde_json::from_str::<GeneratorConfig>(r#"{"shape": "sphere"}"#).is_err());
    }

    #[test]
    fn generate_file_writes_stl() {
        let dir = tempfile::tempdir().unwrap();
        let image_path = dir.path().join("input.png");
        let output = dir.path().join("relief.stl");
        gradient(32).save(&image_path).unwrap();

        let config = GeneratorConfig {
            resolution: 10,
            ..GeneratorConfig::default()
        };
        let mesh = generate_file(&image_path, &output, &config).unwrap();

        assert!(!mesh.is_empty());
        let size = std::fs::metadata(&output).unwrap().len() as usize;
        assert_eq!(84 + 50 * mesh.len(), size);
    }
}
