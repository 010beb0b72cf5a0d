//! Luminance grid to per-cell heights and inclusion mask.

use std::path::Path;

use image::imageops::{self, FilterType};
use image::GrayImage;

use crate::{Error, Result};

/// Loads any supported image as 8-bit luminance, resized to `resolution`².
pub fn load_luminance<P: AsRef<Path>>(path: P, resolution: u32) -> Result<GrayImage> {
    if resolution == 0 {
        return Err(Error::invalid("resolution must be positive"));
    }

    let luma = image::open(path)?.to_luma8();
    if luma.dimensions() == (resolution, resolution) {
        return Ok(luma);
    }

    Ok(imageops::resize(&luma, resolution, resolution, FilterType::CatmullRom))
}

/// Where cells sit in the XY plane and which of them are kept.
#[derive(Copy, Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Layout {
    /// Every cell, starting at the world origin.
    Grid { cell_size: f64 },
    /// Grid spanning `[-outer, outer]²`, keeping cells whose centre lies in the annulus.
    Disk { outer_radius: f64, hole_radius: f64 },
}

impl Default for Layout {
    fn default() -> Self {
        Layout::Disk {
            outer_radius: 50.0,
            hole_radius: 20.0,
        }
    }
}

impl Layout {
    pub fn validate(&self) -> Result<()> {
        match *self {
            Layout::Grid { cell_size } => {
                if !(cell_size.is_finite() && cell_size > 0.0) {
                    return Err(Error::invalid(format!("cell size must be positive, got {}", cell_size)));
                }
            }
            Layout::Disk { outer_radius, hole_radius } => {
                if !(outer_radius.is_finite() && outer_radius > 0.0) {
                    return Err(Error::invalid(format!("outer radius must be positive, got {}", outer_radius)));
                }
                if !hole_radius.is_finite() {
                    return Err(Error::invalid(format!("hole radius must be finite, got {}", hole_radius)));
                }
            }
        }

        Ok(())
    }
}

/// Linear remap of inverted luminance: black maps to `base + relief`, white to `base`.
#[derive(Copy, Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Relief {
    pub base: f64,
    pub relief: f64,
}

impl Default for Relief {
    fn default() -> Self {
        Self { base: 1.0, relief: 5.0 }
    }
}

impl Relief {
    pub fn new(base: f64, relief: f64) -> Self {
        Self { base, relief }
    }

    /// The `min_height`/`max_height` spelling of the same remap.
    pub fn from_min_max(min_height: f64, max_height: f64) -> Self {
        Self {
            base: min_height,
            relief: max_height - min_height,
        }
    }

    #[inline]
    pub fn height(&self, luminance: u8) -> f64 {
        let inverted = 255 - luminance;
        self.base + f64::from(inverted) / 255.0 * self.relief
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.base.is_finite() && self.relief.is_finite()) {
            return Err(Error::invalid("base and relief heights must be finite"));
        }

        Ok(())
    }
}

/// One grid position. `x`/`y` is the lower-left corner of its footprint.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HeightCell {
    pub i: u32,
    pub j: u32,
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub height: f64,
    pub included: bool,
}

pub struct Heightfield<'a> {
    luma: &'a GrayImage,
    layout: Layout,
    relief: Relief,
    cell_size: f64,
    offset: f64,
}

impl<'a> Heightfield<'a> {
    /// Column `i` samples image column `i`, row `j` samples image row `j`.
    pub fn new(luma: &'a GrayImage, layout: Layout, relief: Relief) -> Result<Self> {
        layout.validate()?;
        relief.validate()?;

        let (width, height) = luma.dimensions();
        if width == 0 || height == 0 {
            return Err(Error::invalid("luminance grid is empty"));
        }

        let (cell_size, offset) = match layout {
            Layout::Grid { cell_size } => (cell_size, 0.0),
            Layout::Disk { outer_radius, .. } => (2.0 * outer_radius / f64::from(width), outer_radius),
        };

        Ok(Self {
            luma,
            layout,
            relief,
            cell_size,
            offset,
        })
    }

    #[inline]
    pub fn columns(&self) -> u32 {
        self.luma.width()
    }

    #[inline]
    pub fn rows(&self) -> u32 {
        self.luma.height()
    }

    #[inline]
    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    pub fn cell(&self, i: u32, j: u32) -> HeightCell {
        let x = f64::from(i) * self.cell_size - self.offset;
        let y = f64::from(j) * self.cell_size - self.offset;
        let luminance = self.luma.get_pixel(i, j)[0];

        HeightCell {
            i,
            j,
            x,
            y,
            size: self.cell_size,
            height: self.relief.height(luminance),
            included: self.includes(x, y),
        }
    }

    /// Cells of column `i`, bottom to top.
    pub fn column(&self, i: u32) -> impl Iterator<Item = HeightCell> + '_ {
        (0..self.rows()).map(move |j| self.cell(i, j))
    }

    /// Every cell, column-major.
    pub fn cells(&self) -> impl Iterator<Item = HeightCell> + '_ {
        (0..self.columns()).flat_map(move |i| self.column(i))
    }

    fn includes(&self, x: f64, y: f64) -> bool {
        match self.layout {
            Layout::Grid { .. } => true,
            Layout::Disk { outer_radius, hole_radius } => {
                let half = self.cell_size / 2.0;
                let r = (x + half).hypot(y + half);
                hole_radius <= r && r <= outer_radius
            }
        }
    }
}
