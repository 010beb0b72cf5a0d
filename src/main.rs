use std::error::Error;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use penumbra::heightfield::{Layout, Relief};
use penumbra::shape::ShapeSelector;
use penumbra::{GeneratorConfig, Vec3, VerifyConfig};

/// Turn a grayscale image into a shadow-casting relief and check the result.
#[derive(Parser)]
#[command(name = "penumbra", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a binary STL relief from an image
    Generate(GenerateArgs),
    /// Raytrace an STL into a shadow image and a shaded render
    Verify(VerifyArgs),
}

#[derive(Args)]
struct GenerateArgs {
    /// Input image
    image: PathBuf,
    /// Output STL file
    output: PathBuf,
    /// JSON file with defaults; flags override it
    #[arg(long)]
    config: Option<PathBuf>,
    /// Cover the full grid from the origin instead of a disk
    #[arg(long)]
    grid: bool,
    /// Cell edge length; only meaningful with --grid
    #[arg(long, requires = "grid")]
    cell_size: Option<f64>,
    #[arg(long)]
    outer_radius: Option<f64>,
    #[arg(long)]
    hole_radius: Option<f64>,
    /// Height of white cells
    #[arg(long, visible_alias = "min-height")]
    base_thickness: Option<f64>,
    /// Extra height of black cells over the base
    #[arg(long, conflicts_with = "max_height")]
    max_relief: Option<f64>,
    /// Absolute height of black cells
    #[arg(long)]
    max_height: Option<f64>,
    #[arg(long)]
    resolution: Option<u32>,
    /// box, pyramid, cylinder or mixed
    #[arg(long)]
    shape: Option<String>,
    /// Cylinder segment count
    #[arg(long)]
    segments: Option<u32>,
    /// Seed for --shape mixed
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Args)]
struct VerifyArgs {
    /// Input STL file
    mesh: PathBuf,
    #[arg(long, default_value = "shadow.png")]
    shadow_output: PathBuf,
    #[arg(long, default_value = "render.png")]
    render_output: PathBuf,
    /// JSON file with defaults; flags override it
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    plane_z: Option<f64>,
    /// Edge length of the sampled shadow region
    #[arg(long)]
    size: Option<f64>,
    #[arg(long)]
    resolution: Option<u32>,
    /// Light position as x,y,z
    #[arg(long, value_parser = parse_vec3)]
    light: Option<Vec3<f64>>,
    /// Camera position as x,y,z
    #[arg(long, value_parser = parse_vec3)]
    camera: Option<Vec3<f64>>,
}

fn parse_vec3(s: &str) -> Result<Vec3<f64>, String> {
    let parts = s
        .split(',')
        .map(|c| c.trim().parse::<f64>().map_err(|e| format!("`{}`: {}", c, e)))
        .collect::<Result<Vec<_>, _>>()?;

    match parts.as_slice() {
        [x, y, z] => Ok(Vec3::new(*x, *y, *z)),
        _ => Err(format!("expected x,y,z, got `{}`", s)),
    }
}

impl GenerateArgs {
    fn config(&self) -> penumbra::Result<GeneratorConfig> {
        let mut config = match &self.config {
            Some(path) => GeneratorConfig::load(path)?,
            None => GeneratorConfig::default(),
        };

        let radii_given = self.outer_radius.is_some() || self.hole_radius.is_some();
        config.layout = match config.layout {
            Layout::Grid { cell_size } if self.grid || !radii_given => Layout::Grid {
                cell_size: self.cell_size.unwrap_or(cell_size),
            },
            _ if self.grid => Layout::Grid {
                cell_size: self.cell_size.unwrap_or(1.0),
            },
            Layout::Disk { outer_radius, hole_radius } => Layout::Disk {
                outer_radius: self.outer_radius.unwrap_or(outer_radius),
                hole_radius: self.hole_radius.unwrap_or(hole_radius),
            },
            Layout::Grid { .. } => Layout::Disk {
                outer_radius: self.outer_radius.unwrap_or(50.0),
                hole_radius: self.hole_radius.unwrap_or(20.0),
            },
        };

        let base = self.base_thickness.unwrap_or(config.relief.base);
        config.relief = match (self.max_relief, self.max_height) {
            (_, Some(max_height)) => Relief::from_min_max(base, max_height),
            (Some(relief), None) => Relief::new(base, relief),
            (None, None) => Relief::new(base, config.relief.relief),
        };

        if let Some(resolution) = self.resolution {
            config.resolution = resolution;
        }
        if let Some(shape) = &self.shape {
            config.shape = shape.parse::<ShapeSelector>()?;
        }
        if let Some(segments) = self.segments {
            config.segments = segments;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }

        Ok(config)
    }
}

impl VerifyArgs {
    fn config(&self) -> penumbra::Result<VerifyConfig> {
        let mut config = match &self.config {
            Some(path) => VerifyConfig::load(path)?,
            None => VerifyConfig::default(),
        };

        config.plane_z = self.plane_z.unwrap_or(config.plane_z);
        config.size = self.size.unwrap_or(config.size);
        config.resolution = self.resolution.unwrap_or(config.resolution);
        config.light = self.light.unwrap_or(config.light);
        config.camera = self.camera.unwrap_or(config.camera);

        Ok(config)
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match Cli::parse().command {
        Commands::Generate(args) => {
            let config = args.config()?;
            penumbra::generate_file(&args.image, &args.output, &config)?;
        }
        Commands::Verify(args) => {
            let config = args.config()?;
            penumbra::verify(&args.mesh, &args.shadow_output, &args.render_output, &config)?;
        }
    }

    Ok(())
}
