//! Finding room for an icon inside a square.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{instrument, trace};

use crate::layout::Rect;
use crate::mask::OccupancyMask;

/// One smaller fallback size: `base - by`, but never below `floor`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SizeStep {
    /// Pixels taken off the base size.
    pub by: f64,
    /// Smallest size this step may produce.
    pub floor: f64,
}

/// Tuning for [`SpotSearch`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpotSearchConfig {
    /// Stop searching immediately once a spot is at most this occupied.
    pub clean_enough: f64,
    /// Stop after finishing a size once the best spot is at most this occupied.
    pub good_enough: f64,
    /// Leave the square without an icon when even the best spot is more occupied than this.
    pub skip_above: f64,
    /// Mask sampling interval in pixels.
    pub sample_stride: usize,
    /// Gap kept between an icon and the square's edges.
    pub padding: f64,
    /// Top of the preferred area, clear of the square-number badge.
    pub badge_clearance: f64,
    /// Icons are never placed higher than this below the square's top edge.
    pub badge_floor: f64,
    /// The centred candidate sits this much below true centre.
    pub center_bias: f64,
    /// Sizes tried after the base size, in order.
    pub shrink_steps: Vec<SizeStep>,
}

impl Default for SpotSearchConfig {
    fn default() -> Self {
        Self {
            clean_enough: 0.12,
            good_enough: 0.18,
            skip_above: 0.65,
            sample_stride: 3,
            padding: 8.0,
            badge_clearance: 26.0,
            badge_floor: 22.0,
            center_bias: 6.0,
            shrink_steps: vec![
                SizeStep { by: 8.0, floor: 40.0 },
                SizeStep { by: 16.0, floor: 34.0 },
                SizeStep { by: 24.0, floor: 28.0 },
            ],
        }
    }
}

/// Where an icon would go within a square, and how much of that area is taken by connectors.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct IconSpot {
    /// Left edge of the icon.
    pub x: f64,
    /// Top edge of the icon.
    pub y: f64,
    /// Side length of the square icon.
    pub size: f64,
    /// Share of sampled pixels covered by connectors, from 0.0 to 1.0.
    pub occupied_fraction: f64,
}

/// The verdict for one square.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "decision", content = "spot", rename_all = "lowercase")]
pub enum IconDecision {
    /// Draw the icon at this spot.
    Draw(IconSpot),
    /// Connectors take too much of the square; the best spot found is kept for diagnostics.
    Skip(IconSpot),
}

impl IconDecision {
    /// The spot behind the decision.
    pub fn spot(&self) -> &IconSpot {
        match self {
            Self::Draw(spot) | Self::Skip(spot) => spot,
        }
    }

    /// Whether an icon gets drawn.
    pub fn is_draw(&self) -> bool {
        matches!(self, Self::Draw(_))
    }
}

/// Finds the least-obstructed place for an icon in a square.
#[derive(Clone, Debug, Default)]
pub struct SpotSearch {
    config: SpotSearchConfig,
}

impl SpotSearch {
    /// A search with custom tuning.
    pub fn new(config: SpotSearchConfig) -> Self {
        Self { config }
    }

    /// The tuning in use.
    pub fn config(&self) -> &SpotSearchConfig {
        &self.config
    }

    /// `base` first, then each shrink step.
    pub fn candidate_sizes(&self, base: f64) -> Vec<f64> {
        std::iter::once(base)
            .chain(self.config.shrink_steps.iter().map(|step| (base - step.by).max(step.floor)))
            .collect()
    }

    /// Top-left corners tried for an icon of `size` in `cell`, in preference order, clamped into the square and
    /// without repeats.
    pub fn candidates(&self, cell: &Rect, size: f64) -> Vec<(f64, f64)> {
        let pad = self.config.padding;
        let left = cell.x + pad;
        let right = cell.x + cell.w - pad - size;
        let top = cell.y + self.config.badge_clearance;
        let bottom = cell.y + cell.h - pad - size;

        let cx = cell.x + (cell.w - size) / 2.0;
        let cy = cell.y + (cell.h - size) / 2.0 + self.config.center_bias;

        let clamp_x = |x: f64| x.min(cell.x + cell.w - pad - size).max(cell.x + pad);
        let clamp_y = |y: f64| y.min(cell.y + cell.h - pad - size).max(cell.y + self.config.badge_floor);

        let mut seen = HashSet::new();
        [
            (cx, cy),
            (left, top),
            (right, top),
            (left, bottom),
            (right, bottom),
            (left, cy),
            (right, cy),
            (cx, top),
            (cx, bottom),
        ]
            .into_iter()
            .map(|(x, y)| (clamp_x(x), clamp_y(y)))
            .filter(|(x, y)| seen.insert((x.round() as i64, y.round() as i64)))
            .collect()
    }

    /// The candidate with the smallest occupied fraction, walking sizes largest first.
    ///
    /// Returns as soon as a candidate is clean enough, or once a whole size has produced a good enough spot.
    /// Ties keep the earlier candidate.
    pub fn find_best_spot(&self, cell: &Rect, base: f64, mask: &OccupancyMask) -> Option<IconSpot> {
        let mut best: Option<IconSpot> = None;

        for size in self.candidate_sizes(base) {
            for (x, y) in self.candidates(cell, size) {
                let occupied_fraction = mask.occupied_fraction(x, y, x + size, y + size, self.config.sample_stride);
                if best.map_or(true, |b| occupied_fraction < b.occupied_fraction) {
                    best = Some(IconSpot { x, y, size, occupied_fraction });
                }

                if best.is_some_and(|b| b.occupied_fraction <= self.config.clean_enough) {
                    return best;
                }
            }

            if best.is_some_and(|b| b.occupied_fraction <= self.config.good_enough) {
                return best;
            }
        }

        best
    }

    /// Apply the skip policy to a spot.
    pub fn decide(&self, spot: IconSpot) -> IconDecision {
        if spot.occupied_fraction > self.config.skip_above {
            IconDecision::Skip(spot)
        } else {
            IconDecision::Draw(spot)
        }
    }

    /// Search `cell` and decide in one go.
    #[instrument(level = "trace", skip(self, mask))]
    pub fn place(&self, cell: &Rect, base: f64, mask: &OccupancyMask) -> Option<IconDecision> {
        let decision = self.find_best_spot(cell, base, mask).map(|spot| self.decide(spot));
        trace!(?decision, "icon spot");
        decision
    }
}
