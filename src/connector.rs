//! Pixel geometry of snakes and ladders.
//!
//! The same marks feed both the occupancy mask and any renderer, so icons avoid exactly what gets drawn.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::layout::{BoardLayout, Point};
use crate::prng::derive_seed;
use crate::template::{Connector, ConnectorKind, ConnectorTemplate};

/// Stroke widths and proportions of the connector footprint.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FootprintStyle {
    /// Distance of each ladder rail from the centre line.
    pub rail_offset: f64,
    /// Stroke width of each rail.
    pub rail_width: f64,
    /// Stroke width of each rung.
    pub rung_width: f64,
    /// Roughly one rung per this many pixels of ladder.
    pub rung_spacing: f64,
    /// Fewest rungs on any ladder.
    pub min_rungs: usize,
    /// Most rungs on any ladder.
    pub max_rungs: usize,
    /// Stroke width of a snake body.
    pub snake_width: f64,
    /// Radius of the disc covering a snake's head.
    pub head_radius: f64,
    /// Segments in a curved snake body.
    pub curve_steps: usize,
    /// Curve amplitude as a fraction of the snake's length, before clamping.
    pub wiggle_factor: f64,
    /// Lower clamp on curve amplitude in pixels.
    pub min_wiggle: f64,
    /// Upper clamp on curve amplitude in pixels.
    pub max_wiggle: f64,
    /// Snakes spanning at most this many rows are drawn straight.
    pub straight_row_span: usize,
}

impl Default for FootprintStyle {
    fn default() -> Self {
        Self {
            rail_offset: 12.0,
            rail_width: 14.0,
            rung_width: 12.0,
            rung_spacing: 42.0,
            min_rungs: 6,
            max_rungs: 22,
            snake_width: 20.0,
            head_radius: 14.0,
            curve_steps: 90,
            wiggle_factor: 0.24,
            min_wiggle: 42.0,
            max_wiggle: 110.0,
            straight_row_span: 1,
        }
    }
}

/// Inset, lane-shifted ends of a connector.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Endpoints {
    /// Drawn start, near the `from` square's centre.
    pub start: Point,
    /// Drawn end, near the `to` square's centre.
    pub end: Point,
    /// Unit vector from `start` to `end`.
    pub direction: Point,
    /// `direction` rotated a quarter turn.
    pub normal: Point,
    /// Distance from `start` to `end`; never zero.
    pub length: f64,
    /// Board row (from the bottom) of the `from` square.
    pub start_row: usize,
    /// Board row (from the bottom) of the `to` square.
    pub end_row: usize,
}

impl Endpoints {
    /// Rows crossed between the two ends.
    pub fn row_span(&self) -> usize {
        self.start_row.abs_diff(self.end_row)
    }
}

fn unit_or_one(v: Point) -> (Point, f64) {
    let length = match v.length() {
        l if l == 0.0 => 1.0,
        l => l,
    };
    (v * (1.0 / length), length)
}

/// Pull both ends of `connector` inward by their insets, then shift them sideways by `lane`.
pub fn connector_endpoints(layout: &BoardLayout, template: &ConnectorTemplate, connector: &Connector, lane: f64) -> Endpoints {
    let a0 = layout.center_of(connector.from);
    let b0 = layout.center_of(connector.to);
    let (u0, _) = unit_or_one(b0 - a0);
    let n0 = u0.perpendicular();

    let insets = template.insets(connector.kind);
    let cell = layout.cell();
    let start = a0 + u0 * (cell * insets.start) + n0 * lane;
    let end = b0 - u0 * (cell * insets.end) + n0 * lane;

    let (direction, length) = unit_or_one(end - start);

    Endpoints {
        start,
        end,
        direction,
        normal: direction.perpendicular(),
        length,
        start_row: connector.from.location().1,
        end_row: connector.to.location().1,
    }
}

/// A primitive that covers pixels.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Mark {
    /// A polyline with round caps and mitred joins.
    Stroke {
        /// Vertices in drawing order.
        points: Vec<Point>,
        /// Stroke width in pixels.
        width: f64,
    },
    /// A filled circle.
    Disc {
        /// Centre of the circle.
        center: Point,
        /// Radius in pixels.
        radius: f64,
    },
}

/// What a connector looks like once laid out.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum ConnectorShape {
    /// Two parallel rails joined by rungs.
    Ladder {
        /// End points of the left and right rails.
        rails: [[Point; 2]; 2],
        /// End points of each rung, starting at the foot.
        rungs: Vec<[Point; 2]>,
    },
    /// A body from head to tail; two points when straight.
    Snake {
        /// Polyline from head to tail.
        body: Vec<Point>,
        /// Alternates between consecutive snakes so neighbours bend apart.
        curve_sign: i8,
        /// Seed for purely decorative detail such as markings.
        decor_seed: u32,
    },
}

/// A connector with its laid-out geometry.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ConnectorGeometry {
    /// The template entry laid out.
    pub connector: Connector,
    /// Sideways shift applied to both ends.
    pub lane: f64,
    /// Inset and shifted end points.
    pub endpoints: Endpoints,
    /// Ladder rails and rungs, or a snake body.
    pub shape: ConnectorShape,
}

impl ConnectorGeometry {
    /// The marks this connector puts on the canvas.
    pub fn footprint(&self, style: &FootprintStyle) -> Vec<Mark> {
        match &self.shape {
            ConnectorShape::Ladder { rails, rungs } => rails.iter()
                .map(|rail| Mark::Stroke { points: rail.to_vec(), width: style.rail_width })
                .chain(rungs.iter().map(|rung| Mark::Stroke { points: rung.to_vec(), width: style.rung_width }))
                .collect(),
            ConnectorShape::Snake { body, .. } => vec![
                Mark::Stroke { points: body.clone(), width: style.snake_width },
                Mark::Disc { center: self.endpoints.start, radius: style.head_radius },
            ],
        }
    }
}

fn ladder_shape(ends: &Endpoints, style: &FootprintStyle) -> ConnectorShape {
    let off = ends.normal * style.rail_offset;
    let rail_a = [ends.start + off, ends.end + off];
    let rail_b = [ends.start - off, ends.end - off];

    let rung_count = ((ends.length / style.rung_spacing).round() as usize).min(style.max_rungs).max(style.min_rungs);
    let rungs = (1..=rung_count)
        .map(|i| {
            let t = i as f64 / (rung_count + 1) as f64;
            [rail_a[0].lerp(rail_a[1], t), rail_b[0].lerp(rail_b[1], t)]
        })
        .collect();

    ConnectorShape::Ladder { rails: [rail_a, rail_b], rungs }
}

fn cubic_bezier(p0: Point, c1: Point, c2: Point, p3: Point, steps: usize) -> Vec<Point> {
    let steps = steps.max(1);
    (0..=steps)
        .map(|i| {
            let t = i as f64 / steps as f64;
            let mt = 1.0 - t;
            p0 * (mt * mt * mt) + c1 * (3.0 * mt * mt * t) + c2 * (3.0 * mt * t * t) + p3 * (t * t * t)
        })
        .collect()
}

fn snake_shape(ends: &Endpoints, style: &FootprintStyle, curve_sign: i8, decor_seed: u32) -> ConnectorShape {
    let body = if ends.row_span() <= style.straight_row_span {
        vec![ends.start, ends.end]
    } else {
        let mid = ends.start.lerp(ends.end, 0.5);
        let wiggle = (ends.length * style.wiggle_factor).min(style.max_wiggle).max(style.min_wiggle);
        let bend = ends.normal * (wiggle * f64::from(curve_sign));
        cubic_bezier(ends.start, mid + bend, mid - bend, ends.end, style.curve_steps)
    };

    ConnectorShape::Snake { body, curve_sign, decor_seed }
}

/// Lay out every connector of `template` in drawing order.
///
/// Ladders and snakes each keep their own counter. A connector takes the lane at its counter's value, after which the
/// counter advances; a snake's curve sign and decorative seed are taken from the advanced counter.
#[instrument(skip(layout, template, style), fields(connectors = template.connectors.len()))]
pub fn connector_geometries(
    layout: &BoardLayout,
    template: &ConnectorTemplate,
    style: &FootprintStyle,
    seed: u32,
) -> Vec<ConnectorGeometry> {
    let mut ladders = 0usize;
    let mut snakes = 0usize;

    let geometries: Vec<ConnectorGeometry> = template.connectors.iter()
        .map(|connector| {
            let counter = match connector.kind {
                ConnectorKind::Ladder => &mut ladders,
                ConnectorKind::Snake => &mut snakes,
            };
            let lane = template.lane(connector.kind, *counter);
            *counter += 1;

            let endpoints = connector_endpoints(layout, template, connector, lane);
            let shape = match connector.kind {
                ConnectorKind::Ladder => ladder_shape(&endpoints, style),
                ConnectorKind::Snake => {
                    let curve_sign = if snakes % 2 == 0 { 1 } else { -1 };
                    snake_shape(&endpoints, style, curve_sign, derive_seed(seed, snakes as u32))
                }
            };

            ConnectorGeometry { connector: *connector, lane, endpoints, shape }
        })
        .collect();

    debug!(ladders, snakes, "connectors laid out");
    geometries
}
