//! Image-driven relief meshes ("shadow lithophanes") and a brute-force
//! raytracer to check the shadow they cast.
//!
//! Generation: luminance grid → `heightfield` → `shape::tessellate` per cell →
//! `geometry::Mesh` → `stl`. Verification: `stl` → `geometry::Mesh` →
//! `render::shadow` and `render::shaded`.

#[macro_use]
extern crate serde_derive;

pub mod error;
pub mod generator;
pub mod geometry;
pub mod heightfield;
pub mod intersection;
pub mod ray;
pub mod render;
pub mod shape;
pub mod stl;
pub mod vec3;

pub use crate::error::{Error, Result};
pub use crate::generator::{generate, generate_file, GeneratorConfig};
pub use crate::intersection::Intersection;
pub use crate::ray::Ray;
pub use crate::render::{verify, VerifyConfig};
pub use crate::vec3::Vec3;
