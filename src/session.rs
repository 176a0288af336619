//! Board generation end to end: settings in, a plan or a fully resolved board out.

use std::rc::Rc;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::arrange::{ArrangeConfig, Arranger};
use crate::bank::{BankError, BankFilter, Dialect, PositionFilter, ShapeGroup, Sound, WordBank, WordEntry};
use crate::connector::{connector_geometries, ConnectorGeometry, FootprintStyle};
use crate::icons::{ColorMode, IconCache, IconKey, IconSource};
use crate::layout::{BoardLayout, Rect};
use crate::location::Square;
use crate::mask::OccupancyMask;
use crate::spot::{IconDecision, IconSpot, SpotSearch, SpotSearchConfig};
use crate::summary::{group_targets, BoardMeta, TargetGroup};
use crate::template::{ConnectorTemplate, TemplateError};
use crate::topology::BoardTopology;

/// Most sounds one board may target.
pub const MAX_SOUNDS: usize = 3;

const NOT_ENOUGH_TARGETS: &str = "Not enough targets match these filters. Try changing structure or sound position settings.";
const GENERATION_FAILED: &str = "Could not generate (icons may be blocked). Open console for details.";

/// What the user asked for.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardSettings {
    /// English variety.
    pub dialect: Dialect,
    /// Target sounds in the order they were picked.
    pub sounds: Vec<Sound>,
    /// Sound position restriction.
    pub position: PositionFilter,
    /// Word-structure restriction.
    pub shape_group: ShapeGroup,
    /// Colour or black-and-white icons.
    pub theme: ColorMode,
}

impl Default for BoardSettings {
    fn default() -> Self {
        Self {
            dialect: Dialect::UK,
            sounds: Vec::new(),
            position: PositionFilter::Any,
            shape_group: ShapeGroup::ClosedSyllables,
            theme: ColorMode::Color,
        }
    }
}

/// Settings that cannot produce a board.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// No target sound was picked.
    #[error("Choose at least 1 target sound.")]
    NoSoundSelected,
    /// More sounds than one board can hold.
    #[error("You can select up to 3 sounds per board. Try again.")]
    TooManySounds {
        /// Distinct sounds picked.
        count: usize,
    },
}

impl BoardSettings {
    /// Drop repeated sounds, keeping first picks, and check how many remain.
    pub fn validate(mut self) -> Result<Self, SettingsError> {
        self.sounds = self.sounds.into_iter().unique().collect();
        match self.sounds.len() {
            0 => Err(SettingsError::NoSoundSelected),
            count if count > MAX_SOUNDS => Err(SettingsError::TooManySounds { count }),
            _ => Ok(self),
        }
    }

    /// The bank filter these settings describe.
    pub fn bank_filter(&self) -> BankFilter {
        BankFilter {
            dialect: self.dialect,
            sounds: self.sounds.clone(),
            position: self.position,
            shape_group: self.shape_group,
        }
    }

    /// Header labels for these settings.
    pub fn meta(&self) -> BoardMeta {
        BoardMeta::new(self.dialect, &self.sounds, self.position, self.shape_group, self.theme)
    }
}

/// Why a board was not produced.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    /// The settings were rejected.
    #[error(transparent)]
    Settings(#[from] SettingsError),
    /// Fewer than two entries survived the filters.
    #[error("only {found} target word(s) match the filters")]
    InsufficientTargets {
        /// Entries left after filtering.
        found: usize,
    },
    /// The connector template is not playable.
    #[error(transparent)]
    Template(#[from] TemplateError),
    /// The word bank could not be loaded.
    #[error(transparent)]
    Bank(#[from] BankError),
}

impl GenerateError {
    /// Text suitable for showing the person who asked for the board.
    pub fn user_message(&self) -> String {
        match self {
            Self::Settings(e) => e.to_string(),
            Self::InsufficientTargets { .. } => NOT_ENOUGH_TARGETS.to_string(),
            Self::Template(_) | Self::Bank(_) => GENERATION_FAILED.to_string(),
        }
    }
}

/// One interior square of a planned board.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CellPlan {
    /// Which square.
    pub square: Square,
    /// The square's area on the canvas.
    pub rect: Rect,
    /// The word placed here.
    pub item: Option<WordEntry>,
    /// [`None`] only when the square has no item.
    pub decision: Option<IconDecision>,
}

/// Everything needed to draw a board except the icon artwork.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BoardPlan {
    /// Seed the board was built from; replaying it rebuilds the same board.
    pub seed: u32,
    /// Validated settings.
    pub settings: BoardSettings,
    /// `false` when some neighbours share a word.
    pub ok: bool,
    /// Arrangement attempts used.
    pub attempts: u32,
    /// Diagnostic for a best-effort board.
    pub note: Option<String>,
    /// Squares 2 through 99, in order.
    pub cells: Vec<CellPlan>,
    /// Snakes and ladders with their laid-out geometry.
    pub connectors: Vec<ConnectorGeometry>,
    /// Header labels.
    pub meta: BoardMeta,
}

impl BoardPlan {
    /// Squares whose icon is left out because connectors crowd them.
    pub fn skipped(&self) -> impl Iterator<Item = &CellPlan> {
        self.cells.iter().filter(|c| matches!(c.decision, Some(IconDecision::Skip(_))))
    }

    /// The word on `square`.
    pub fn item_at(&self, square: Square) -> Option<&WordEntry> {
        self.cells.iter().find(|c| c.square == square)?.item.as_ref()
    }
}

/// A fresh seed for interactive use.
pub fn fresh_seed() -> u32 {
    rand::random()
}

/// Turns settings and a seed into a [`BoardPlan`]. Holds all static board data.
#[derive(Clone, Debug)]
pub struct Generator {
    bank: WordBank,
    topology: BoardTopology,
    layout: BoardLayout,
    template: ConnectorTemplate,
    style: FootprintStyle,
    arrange: ArrangeConfig,
    spots: SpotSearch,
}

impl Generator {
    /// A generator over `bank` with the classic board and default tuning.
    pub fn new(bank: WordBank) -> Self {
        Self {
            bank,
            topology: BoardTopology::classic(),
            layout: BoardLayout::default(),
            template: ConnectorTemplate::uk_classic(),
            style: FootprintStyle::default(),
            arrange: ArrangeConfig::default(),
            spots: SpotSearch::default(),
        }
    }

    /// A generator over the built-in bank.
    pub fn builtin() -> Result<Self, GenerateError> {
        Ok(Self::new(WordBank::builtin()?))
    }

    /// Use another connector template.
    pub fn with_template(mut self, template: ConnectorTemplate) -> Result<Self, TemplateError> {
        template.validate()?;
        self.template = template;
        Ok(self)
    }

    /// Use a different board geometry.
    pub fn with_layout(mut self, layout: BoardLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Change connector widths and ladder rung counts.
    pub fn with_footprint_style(mut self, style: FootprintStyle) -> Self {
        self.style = style;
        self
    }

    /// Tune the word arrangement.
    pub fn with_arrange_config(mut self, config: ArrangeConfig) -> Self {
        self.arrange = config;
        self
    }

    /// Tune icon placement.
    pub fn with_spot_config(mut self, config: SpotSearchConfig) -> Self {
        self.spots = SpotSearch::new(config);
        self
    }

    /// The word bank boards are drawn from.
    pub fn bank(&self) -> &WordBank {
        &self.bank
    }

    /// Board geometry.
    pub fn layout(&self) -> &BoardLayout {
        &self.layout
    }

    /// Lay out a board.
    #[instrument(skip(self, settings))]
    pub fn plan(&self, settings: &BoardSettings, seed: u32) -> Result<BoardPlan, GenerateError> {
        let settings = settings.clone().validate()?;

        let pool = self.bank.select(&settings.bank_filter());
        if pool.len() < 2 {
            return Err(GenerateError::InsufficientTargets { found: pool.len() });
        }

        let arrangement = Arranger::new(&self.topology, self.arrange).arrange(&pool, seed);
        let connectors = connector_geometries(&self.layout, &self.template, &self.style, seed);
        let mask = OccupancyMask::build(&self.layout, &connectors, &self.style);

        let base = self.layout.icon_base_size();
        let cells = Square::interior()
            .map(|square| {
                let rect = self.layout.square_rect(square);
                let item = arrangement.item_at(square).cloned();
                let decision = match item {
                    Some(_) => self.spots.place(&rect, base, &mask),
                    None => None,
                };
                CellPlan { square, rect, item, decision }
            })
            .collect_vec();

        let plan = BoardPlan {
            seed,
            meta: settings.meta(),
            settings,
            ok: arrangement.ok,
            attempts: arrangement.attempts,
            note: arrangement.shortfall.map(|s| s.to_string()),
            cells,
            connectors,
        };

        info!(pool = pool.len(), ok = plan.ok, attempts = plan.attempts, skipped = plan.skipped().count(), "board planned");
        Ok(plan)
    }
}

/// An icon ready to draw.
#[derive(Debug)]
pub struct PlacedIcon<I> {
    /// Where the icon goes.
    pub square: Square,
    /// The word pictured.
    pub orth: String,
    /// Position and size within the square.
    pub spot: IconSpot,
    /// Fetched artwork, shared between squares showing the same word.
    pub icon: Rc<I>,
}

/// A planned board with its artwork resolved.
#[derive(Debug)]
pub struct RenderedBoard<I> {
    /// The plan the icons were resolved for.
    pub plan: BoardPlan,
    /// Only squares whose icon could be both placed and fetched.
    pub icons: Vec<PlacedIcon<I>>,
    /// Header groups built from the icons actually shown.
    pub targets: Vec<TargetGroup>,
}

/// A [`Generator`] paired with an icon source and its cache.
pub struct Session<S: IconSource> {
    generator: Generator,
    source: S,
    cache: IconCache<S::Icon>,
}

impl<S: IconSource> Session<S> {
    /// A session with an empty icon cache.
    pub fn new(generator: Generator, source: S) -> Self {
        Self { generator, source, cache: IconCache::new() }
    }

    /// The generator behind this session.
    pub fn generator(&self) -> &Generator {
        &self.generator
    }

    /// Icons resolved for the most recent board.
    pub fn cache(&self) -> &IconCache<S::Icon> {
        &self.cache
    }

    /// Plan a board and resolve its icons. The cache starts empty for every board.
    ///
    /// Icons that cannot be fetched are left off; their words do not count as shown.
    pub fn generate(&mut self, settings: &BoardSettings, seed: u32) -> Result<RenderedBoard<S::Icon>, GenerateError> {
        self.cache.reset();
        let plan = self.generator.plan(settings, seed)?;
        let mode = plan.settings.theme;

        self.cache.preload(
            plan.cells.iter().filter_map(|c| c.item.as_ref()).map(|item| item.hex.as_str()),
            mode,
            &self.source,
        );

        let mut icons = Vec::new();
        let mut shown = Vec::new();
        for cell in &plan.cells {
            let (Some(item), Some(IconDecision::Draw(spot))) = (&cell.item, &cell.decision) else {
                continue;
            };
            let Some(icon) = self.cache.get_or_fetch(&IconKey::new(mode, &item.hex), &self.source) else {
                continue;
            };

            icons.push(PlacedIcon { square: cell.square, orth: item.orth.clone(), spot: *spot, icon });
            shown.push(item);
        }

        let targets = group_targets(shown, &plan.settings.sounds);
        info!(icons = icons.len(), groups = targets.len(), "board rendered");

        Ok(RenderedBoard { plan, icons, targets })
    }

    /// [`generate`](Self::generate) with a fresh seed.
    pub fn generate_fresh(&mut self, settings: &BoardSettings) -> Result<RenderedBoard<S::Icon>, GenerateError> {
        self.generate(settings, fresh_seed())
    }
}
