//! Which squares the snakes and ladders join.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, VariantArray};

use crate::location::Square;

/// Whether a connector carries players up or down.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, VariantArray)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ConnectorKind {
    /// Climbs from `from` to a higher `to`.
    Ladder,
    /// Slides from its head at `from` to its tail at a lower `to`.
    Snake,
}

/// One snake or ladder on the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Connector {
    /// Ladder or snake.
    pub kind: ConnectorKind,
    /// Where a player lands to use it: a ladder's foot or a snake's head.
    pub from: Square,
    /// Where the player ends up.
    pub to: Square,
}

impl Connector {
    const fn ladder(from: u8, to: u8) -> Self {
        Self { kind: ConnectorKind::Ladder, from: Square::literal(from), to: Square::literal(to) }
    }

    const fn snake(from: u8, to: u8) -> Self {
        Self { kind: ConnectorKind::Snake, from: Square::literal(from), to: Square::literal(to) }
    }
}

const UK_CLASSIC: [Connector; 15] = [
    Connector::ladder(2, 23),
    Connector::ladder(8, 34),
    Connector::ladder(20, 77),
    Connector::ladder(32, 68),
    Connector::ladder(41, 79),
    Connector::ladder(74, 92),
    Connector::ladder(80, 99),
    Connector::snake(29, 10),
    Connector::snake(24, 6),
    Connector::snake(54, 34),
    Connector::snake(62, 19),
    Connector::snake(87, 36),
    Connector::snake(93, 73),
    Connector::snake(95, 75),
    Connector::snake(98, 79),
];

/// How far into its end squares a connector reaches, as a fraction of the cell size measured from the square centre.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Insets {
    /// At the `from` end.
    pub start: f64,
    /// At the `to` end.
    pub end: f64,
}

/// A board's fixed snakes and ladders, plus how they are spread apart when drawn.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectorTemplate {
    /// Drawing order matters: lanes are handed out per kind in this order.
    pub connectors: Vec<Connector>,
    /// Sideways offsets in pixels, cycled through per kind.
    pub lanes: Vec<f64>,
    /// Snakes use a narrower spread than ladders.
    pub snake_lane_scale: f64,
    /// End insets for ladders.
    pub ladder_insets: Insets,
    /// End insets for snakes.
    pub snake_insets: Insets,
}

/// A template which cannot describe a playable board.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// A connector whose ends are the same square.
    #[error("connector {0} starts and ends on the same square")]
    DegenerateConnector(Square),
    /// A ladder which does not climb.
    #[error("ladder {from}->{to} must climb")]
    LadderGoesDown {
        /// The foot.
        from: Square,
        /// The top.
        to: Square,
    },
    /// A snake which does not descend.
    #[error("snake {from}->{to} must descend")]
    SnakeGoesUp {
        /// The head.
        from: Square,
        /// The tail.
        to: Square,
    },
    /// The template text could not be read.
    #[error("could not read template: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ConnectorTemplate {
    /// The classic UK layout: seven ladders and eight snakes.
    pub fn uk_classic() -> Self {
        Self {
            connectors: UK_CLASSIC.to_vec(),
            lanes: vec![-14.0, -7.0, 0.0, 7.0, 14.0],
            snake_lane_scale: 0.55,
            ladder_insets: Insets { start: 0.30, end: 0.30 },
            snake_insets: Insets { start: 0.36, end: 0.36 },
        }
    }

    /// Read a template from JSON; missing fields take their classic values. The result is validated.
    pub fn from_json(text: &str) -> Result<Self, TemplateError> {
        let template: Self = serde_json::from_str(text)?;
        template.validate()?;
        Ok(template)
    }

    /// Check that every connector moves in the direction its kind implies.
    pub fn validate(&self) -> Result<(), TemplateError> {
        for &Connector { kind, from, to } in &self.connectors {
            if from == to {
                return Err(TemplateError::DegenerateConnector(from));
            }
            match kind {
                ConnectorKind::Ladder if from > to => return Err(TemplateError::LadderGoesDown { from, to }),
                ConnectorKind::Snake if from < to => return Err(TemplateError::SnakeGoesUp { from, to }),
                _ => {}
            }
        }

        Ok(())
    }

    /// Insets used by connectors of `kind`.
    pub fn insets(&self, kind: ConnectorKind) -> Insets {
        match kind {
            ConnectorKind::Ladder => self.ladder_insets,
            ConnectorKind::Snake => self.snake_insets,
        }
    }

    /// Lane offset for the `index`-th connector of `kind`.
    pub fn lane(&self, kind: ConnectorKind, index: usize) -> f64 {
        if self.lanes.is_empty() {
            return 0.0;
        }

        let lane = self.lanes[index % self.lanes.len()];
        match kind {
            ConnectorKind::Ladder => lane,
            ConnectorKind::Snake => lane * self.snake_lane_scale,
        }
    }

    /// Whether the template holds exactly this connector.
    pub fn contains(&self, kind: ConnectorKind, from: u8, to: u8) -> bool {
        self.connectors.iter()
            .any(|c| c.kind == kind && c.from.number() == from && c.to.number() == to)
    }
}

impl Default for ConnectorTemplate {
    fn default() -> Self {
        Self::uk_classic()
    }
}
