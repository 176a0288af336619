//! Pixel occupancy of the connectors, used to keep icons clear of them.

use ndarray::Array2;
use tiny_skia::{FillRule, LineCap, LineJoin, Paint, Path, PathBuilder, Pixmap, Stroke, Transform};
use tracing::{debug, instrument, warn};

use crate::connector::{ConnectorGeometry, FootprintStyle, Mark};
use crate::layout::{BoardLayout, Point};

/// Canvas-sized record of which pixels the snakes and ladders cover.
///
/// Built once per board and then only read.
#[derive(Clone, Debug, PartialEq)]
pub struct OccupancyMask {
    /// Indexed `(y, x)`.
    covered: Array2<bool>,
}

fn polyline(points: &[Point]) -> Option<Path> {
    let (first, rest) = points.split_first()?;
    let mut pb = PathBuilder::new();
    pb.move_to(first.x as f32, first.y as f32);
    if rest.is_empty() {
        pb.line_to(first.x as f32, first.y as f32);
    }
    for p in rest {
        pb.line_to(p.x as f32, p.y as f32);
    }
    pb.finish()
}

impl OccupancyMask {
    /// A mask with nothing covered.
    pub fn clear(width: usize, height: usize) -> Self {
        Self { covered: Array2::from_elem((height, width), false) }
    }

    /// A mask whose coverage is given by `f(x, y)`.
    pub fn from_fn<F>(width: usize, height: usize, f: F) -> Self
    where
        F: Fn(usize, usize) -> bool,
    {
        Self { covered: Array2::from_shape_fn((height, width), |(y, x)| f(x, y)) }
    }

    /// Rasterize the footprint of every connector onto a canvas the size of `layout`.
    #[instrument(skip_all, fields(connectors = geometries.len()))]
    pub fn build(layout: &BoardLayout, geometries: &[ConnectorGeometry], style: &FootprintStyle) -> Self {
        let marks = geometries.iter().flat_map(|g| g.footprint(style));
        Self::rasterize(layout.canvas_width, layout.canvas_height, marks)
    }

    /// Draw `marks` opaque and anti-aliased, strokes with round caps and mitred joins; any pixel with nonzero alpha counts
    /// as covered.
    ///
    /// A canvas that cannot be allocated yields a clear mask, so icon placement carries on unconstrained.
    pub fn rasterize<I>(width: u32, height: u32, marks: I) -> Self
    where
        I: IntoIterator<Item = Mark>,
    {
        let Some(mut pixmap) = Pixmap::new(width, height) else {
            warn!(width, height, "could not allocate mask canvas, treating board as clear");
            return Self::clear(width as usize, height as usize);
        };

        let mut paint = Paint::default();
        paint.set_color_rgba8(0, 0, 0, 255);
        paint.anti_alias = true;

        for mark in marks {
            match mark {
                Mark::Stroke { points, width } => {
                    let Some(path) = polyline(&points) else { continue };
                    let stroke = Stroke {
                        width: width as f32,
                        line_cap: LineCap::Round,
                        line_join: LineJoin::Miter,
                        ..Stroke::default()
                    };
                    pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
                }
                Mark::Disc { center, radius } => {
                    if let Some(path) = PathBuilder::from_circle(center.x as f32, center.y as f32, radius as f32) {
                        pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
                    }
                }
            }
        }

        let w = pixmap.width() as usize;
        let pixels = pixmap.pixels();
        let covered = Array2::from_shape_fn((pixmap.height() as usize, w), |(y, x)| pixels[y * w + x].alpha() > 0);

        let mask = Self { covered };
        debug!(covered = mask.covered_count(), "occupancy mask built");
        mask
    }

    /// Canvas width in pixels.
    pub fn width(&self) -> usize {
        self.covered.ncols()
    }

    /// Canvas height in pixels.
    pub fn height(&self) -> usize {
        self.covered.nrows()
    }

    /// Whether pixel `(x, y)` is covered; off-canvas pixels are not.
    pub fn is_covered(&self, x: usize, y: usize) -> bool {
        self.covered.get((y, x)).copied().unwrap_or(false)
    }

    /// Number of covered pixels.
    pub fn covered_count(&self) -> usize {
        self.covered.iter().filter(|c| **c).count()
    }

    /// Fraction of sampled pixels in `[x0, x1] x [y0, y1]` that are covered.
    ///
    /// Bounds are floored and clamped to the canvas, then sampled every `stride` pixels in both directions, both ends
    /// inclusive. A region with no samples reports `0.0`.
    pub fn occupied_fraction(&self, x0: f64, y0: f64, x1: f64, y1: f64, stride: usize) -> f64 {
        let stride = stride.max(1);
        let ix0 = (x0.floor() as i64).max(0);
        let iy0 = (y0.floor() as i64).max(0);
        let ix1 = (x1.floor() as i64).min(self.width() as i64 - 1);
        let iy1 = (y1.floor() as i64).min(self.height() as i64 - 1);

        let mut hit = 0usize;
        let mut total = 0usize;
        for y in (iy0..=iy1).step_by(stride) {
            for x in (ix0..=ix1).step_by(stride) {
                total += 1;
                if self.covered[(y as usize, x as usize)] {
                    hit += 1;
                }
            }
        }

        if total == 0 {
            0.0
        } else {
            hit as f64 / total as f64
        }
    }
}
