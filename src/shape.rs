//! Solids emitted for a single heightfield cell.

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::geometry::Triangle;
use crate::vec3::Vec3;
use crate::{Error, Result};

pub const DEFAULT_SEGMENTS: u32 = 16;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ShapeKind {
    Box,
    Pyramid,
    Cylinder { segments: u32 },
}

impl ShapeKind {
    /// Number of triangles `tessellate` emits for this kind.
    pub fn triangle_count(&self) -> usize {
        match *self {
            ShapeKind::Box => 12,
            ShapeKind::Pyramid => 6,
            ShapeKind::Cylinder { segments } => 4 * segments as usize,
        }
    }
}

/// What the `shape` option selects: one kind for every cell, or a per-cell draw.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeSelector {
    Box,
    Pyramid,
    Cylinder,
    Mixed,
}

impl Default for ShapeSelector {
    fn default() -> Self {
        ShapeSelector::Box
    }
}

impl FromStr for ShapeSelector {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "box" => Ok(ShapeSelector::Box),
            "pyramid" => Ok(ShapeSelector::Pyramid),
            "cylinder" => Ok(ShapeSelector::Cylinder),
            "mixed" => Ok(ShapeSelector::Mixed),
            other => Err(Error::invalid(format!(
                "unknown shape `{}`, expected one of box, pyramid, cylinder, mixed",
                other
            ))),
        }
    }
}

impl fmt::Display for ShapeSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ShapeSelector::Box => "box",
            ShapeSelector::Pyramid => "pyramid",
            ShapeSelector::Cylinder => "cylinder",
            ShapeSelector::Mixed => "mixed",
        };
        f.write_str(name)
    }
}

/// Resolved shape choice for a whole run.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ShapeMode {
    Fixed(ShapeKind),
    /// Uniform draw over the three kinds, seeded per cell from `(seed, i, j)`.
    Mixed { segments: u32, seed: u64 },
}

impl ShapeMode {
    pub fn new(selector: ShapeSelector, segments: u32, seed: u64) -> Result<Self> {
        if segments < 3 {
            return Err(Error::invalid(format!("cylinder needs at least 3 segments, got {}", segments)));
        }

        let mode = match selector {
            ShapeSelector::Box => ShapeMode::Fixed(ShapeKind::Box),
            ShapeSelector::Pyramid => ShapeMode::Fixed(ShapeKind::Pyramid),
            ShapeSelector::Cylinder => ShapeMode::Fixed(ShapeKind::Cylinder { segments }),
            ShapeSelector::Mixed => ShapeMode::Mixed { segments, seed },
        };

        Ok(mode)
    }

    /// Kind used for cell `(i, j)`. Independent of traversal order.
    pub fn kind_at(&self, i: u32, j: u32) -> ShapeKind {
        match *self {
            ShapeMode::Fixed(kind) => kind,
            ShapeMode::Mixed { segments, seed } => {
                let mut rng = StdRng::seed_from_u64(cell_seed(seed, i, j));
                match rng.gen_range(0..3) {
                    0 => ShapeKind::Box,
                    1 => ShapeKind::Pyramid,
                    _ => ShapeKind::Cylinder { segments },
                }
            }
        }
    }
}

// splitmix64 finalizer over the packed cell coordinates.
fn cell_seed(seed: u64, i: u32, j: u32) -> u64 {
    let mut z = seed ^ ((u64::from(i) << 32) | u64::from(j));
    z = z.wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// Triangles of `kind` standing on the `size`×`size` footprint whose lower-left
/// bottom corner is `origin`, rising `height` above it.
pub fn tessellate(kind: ShapeKind, origin: Vec3<f64>, size: f64, height: f64) -> Vec<Triangle> {
    match kind {
        ShapeKind::Box => cuboid(origin, size, height),
        ShapeKind::Pyramid => pyramid(origin, size, height),
        ShapeKind::Cylinder { segments } => cylinder(origin, size, height, segments),
    }
}

fn footprint(origin: Vec3<f64>, size: f64, z: f64) -> [Vec3<f64>; 4] {
    let Vec3 { x, y, .. } = origin;
    let z = origin.z + z;
    [
        Vec3::new(x, y, z),
        Vec3::new(x + size, y, z),
        Vec3::new(x + size, y + size, z),
        Vec3::new(x, y + size, z),
    ]
}

fn cuboid(origin: Vec3<f64>, size: f64, height: f64) -> Vec<Triangle> {
    let [p0, p1, p2, p3] = footprint(origin, size, 0.0);
    let [p4, p5, p6, p7] = footprint(origin, size, height);

    vec![
        // bottom
        Triangle::new(p0, p3, p1),
        Triangle::new(p1, p3, p2),
        // top
        Triangle::new(p4, p5, p7),
        Triangle::new(p5, p6, p7),
        // front
        Triangle::new(p0, p1, p4),
        Triangle::new(p1, p5, p4),
        // right
        Triangle::new(p1, p2, p5),
        Triangle::new(p2, p6, p5),
        // back
        Triangle::new(p2, p3, p6),
        Triangle::new(p3, p7, p6),
        // left
        Triangle::new(p3, p0, p7),
        Triangle::new(p0, p4, p7),
    ]
}

fn pyramid(origin: Vec3<f64>, size: f64, height: f64) -> Vec<Triangle> {
    let [p0, p1, p2, p3] = footprint(origin, size, 0.0);
    let apex = Vec3::new(origin.x + size / 2.0, origin.y + size / 2.0, origin.z + height);

    vec![
        Triangle::new(p0, p3, p1),
        Triangle::new(p1, p3, p2),
        Triangle::new(p0, p1, apex),
        Triangle::new(p1, p2, apex),
        Triangle::new(p2, p3, apex),
        Triangle::new(p3, p0, apex),
    ]
}

/// Prism over the polygon inscribed in the footprint's inscribed circle.
fn cylinder(origin: Vec3<f64>, size: f64, height: f64, segments: u32) -> Vec<Triangle> {
    let radius = size / 2.0;
    let cx = origin.x + radius;
    let cy = origin.y + radius;
    let bottom = Vec3::new(cx, cy, origin.z);
    let top = Vec3::new(cx, cy, origin.z + height);

    let rim = |k: u32, z: f64| {
        let angle = 2.0 * PI * f64::from(k % segments) / f64::from(segments);
        Vec3::new(cx + radius * angle.cos(), cy + radius * angle.sin(), z)
    };

    let mut triangles = Vec::with_capacity(4 * segments as usize);
    for k in 0..segments {
        let b0 = rim(k, bottom.z);
        let b1 = rim(k + 1, bottom.z);
        let t0 = rim(k, top.z);
        let t1 = rim(k + 1, top.z);

        triangles.push(Triangle::new(bottom, b1, b0));
        triangles.push(Triangle::new(top, t0, t1));
        triangles.push(Triangle::new(b0, b1, t1));
        triangles.push(Triangle::new(b0, t1, t0));
    }

    triangles
}
