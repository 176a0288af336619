//! Placing a pool of items on the board so that touching squares never share a category.

use std::collections::HashSet;
use std::fmt::{Display, Formatter};

use itertools::Itertools;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize, Serializer};
use tracing::{debug, info, instrument, warn};
use unordered_pair::UnorderedPair;

use crate::item::Categorized;
use crate::location::Square;
use crate::prng::Mulberry32;
use crate::topology::BoardTopology;

/// Tuning for [`Arranger`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArrangeConfig {
    /// Full shuffles tried before settling for a best-effort board.
    pub max_attempts: u32,
    /// How far into the shuffled pool a slot looks for a compatible item.
    pub scan_window: usize,
}

impl Default for ArrangeConfig {
    fn default() -> Self {
        Self {
            max_attempts: 180,
            scan_window: 60,
        }
    }
}

/// Why an [`Arrangement`] is not adjacency-clean.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, thiserror::Error)]
pub enum ArrangeShortfall {
    /// The pool had no items.
    #[error("empty pool")]
    EmptyPool,
    /// Every attempt failed; the board was filled without regard to adjacency.
    #[error("could not satisfy adjacency (pool too small / too repetitive)")]
    Infeasible,
}

/// A filled board, or as close to one as the pool allows.
#[derive(Clone, Debug, Serialize)]
pub struct Arrangement<T> {
    /// `true` when no two adjacent slots share a category.
    pub ok: bool,
    /// One entry per slot, square 2 first. Always as long as the board has slots.
    pub arranged: Vec<Option<T>>,
    /// The attempt that succeeded, the full budget on fallback, or 0 for an empty pool.
    pub attempts: u32,
    /// Set whenever `ok` is `false`. Serialized as its `reason` text.
    #[serde(rename = "reason", serialize_with = "serialize_reason")]
    pub shortfall: Option<ArrangeShortfall>,
}

fn serialize_reason<S>(shortfall: &Option<ArrangeShortfall>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match shortfall {
        Some(reason) => serializer.collect_str(reason),
        None => serializer.serialize_str(""),
    }
}

impl<T> Arrangement<T> {
    fn empty(slots: usize) -> Self {
        Self {
            ok: false,
            arranged: std::iter::repeat_with(|| None).take(slots).collect(),
            attempts: 0,
            shortfall: Some(ArrangeShortfall::EmptyPool),
        }
    }

    /// Human-readable diagnostic; empty on success.
    pub fn reason(&self) -> String {
        self.shortfall.map(|s| s.to_string()).unwrap_or_default()
    }

    /// The item placed on `square`.
    pub fn item_at(&self, square: Square) -> Option<&T> {
        self.arranged.get(square.slot()?)?.as_ref()
    }

    /// Placed items paired with their squares, in board order.
    pub fn placements(&self) -> impl Iterator<Item = (Square, &T)> {
        self.arranged.iter()
            .enumerate()
            .filter_map(|(slot, item)| Some((Square::from_slot(slot)?, item.as_ref()?)))
    }
}

impl<T: Categorized> Arrangement<T> {
    /// Adjacent slot pairs whose items share a category.
    pub fn conflicts(&self, topology: &BoardTopology) -> Vec<UnorderedPair<usize>> {
        topology.adjacent_pairs()
            .filter(|UnorderedPair(a, b)| {
                match (self.arranged.get(*a).and_then(Option::as_ref), self.arranged.get(*b).and_then(Option::as_ref)) {
                    (Some(x), Some(y)) => x.category() == y.category(),
                    _ => false,
                }
            })
            .collect_vec()
    }
}

impl<T> Display for Arrangement<T>
where
    T: Categorized,
    T::Category: Display,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let grid = BoardTopology::classic().render(|square| {
            self.item_at(square)
                .map(|item| item.category().to_string())
                .unwrap_or_else(|| "-".to_string())
        });
        write!(f, "{grid}")
    }
}

/// Places a pool of items on the board so that equal categories never touch.
///
/// Each attempt builds a balanced pool by cycling through the items (reshuffled on every pass) until every slot has a
/// candidate, then fills slots in order, taking the first item within the scan window that does not clash with an
/// already placed neighbour. Attempts that get stuck are discarded. When the budget runs out, the items are cycled
/// into a plain shuffled fill and the result is flagged.
pub struct Arranger<'t> {
    topology: &'t BoardTopology,
    config: ArrangeConfig,
}

impl<'t> Arranger<'t> {
    /// An arranger over `topology`.
    pub fn new(topology: &'t BoardTopology, config: ArrangeConfig) -> Self {
        Self { topology, config }
    }

    /// Fill the board from `items` using the stream seeded by `seed`. Equal inputs give equal boards.
    #[instrument(skip(self, items), fields(pool = items.len()))]
    pub fn arrange<T>(&self, items: &[T], seed: u32) -> Arrangement<T>
    where
        T: Categorized + Clone,
    {
        let slots = self.topology.slots();
        if items.iter().all(Categorized::is_blank) {
            warn!("nothing to arrange");
            return Arrangement::empty(slots);
        }

        let mut rng = Mulberry32::new(seed);
        let mut base = items.iter().collect_vec();

        for attempt in 1..=self.config.max_attempts {
            let pool = Self::balanced_pool(&mut base, slots, &mut rng);

            match self.place_greedy(pool) {
                Some(placed) if self.is_clean(&placed) => {
                    info!(attempt, "board arranged");
                    return Arrangement {
                        ok: true,
                        arranged: placed.into_iter().map(|item| Some(item.clone())).collect(),
                        attempts: attempt,
                        shortfall: None,
                    };
                }
                _ => debug!(attempt, "attempt rejected"),
            }
        }

        let mut fallback = items.iter().cycle().take(slots).collect_vec();
        fallback.shuffle(&mut rng);
        warn!(attempts = self.config.max_attempts, reason = %ArrangeShortfall::Infeasible, "falling back to best-effort board");

        Arrangement {
            ok: false,
            arranged: fallback.into_iter().map(|item| Some(item.clone())).collect(),
            attempts: self.config.max_attempts,
            shortfall: Some(ArrangeShortfall::Infeasible),
        }
    }

    fn balanced_pool<'a, T>(base: &mut [&'a T], slots: usize, rng: &mut Mulberry32) -> Vec<&'a T> {
        base.shuffle(rng);
        let mut pool = Vec::with_capacity(slots);
        while pool.len() < slots {
            let take = base.len().min(slots - pool.len());
            pool.extend_from_slice(&base[..take]);
            base.shuffle(rng);
        }
        pool.shuffle(rng);

        pool
    }

    fn place_greedy<'a, T: Categorized>(&self, mut remaining: Vec<&'a T>) -> Option<Vec<&'a T>> {
        let mut placed: Vec<&'a T> = Vec::with_capacity(remaining.len());

        for slot in 0..self.topology.slots() {
            // slots fill in ascending order, so only lower neighbours are placed yet
            let forbidden: HashSet<&T::Category> = self.topology.neighbors(slot).iter()
                .filter_map(|&n| placed.get(n))
                .map(|item| item.category())
                .collect();

            let scan = self.config.scan_window.min(remaining.len());
            let pick = remaining[..scan].iter().position(|item| !forbidden.contains(item.category()))?;
            placed.push(remaining.remove(pick));
        }

        Some(placed)
    }

    fn is_clean<T: Categorized>(&self, placed: &[&T]) -> bool {
        (0..placed.len()).all(|slot| {
            self.topology.neighbors(slot).iter()
                .filter(|&&n| n > slot)
                .all(|&n| placed.get(n).map_or(true, |other| other.category() != placed[slot].category()))
        })
    }
}

/// Arrange `items` on the classic board with default tuning.
pub fn arrange<T>(items: &[T], seed: u32) -> Arrangement<T>
where
    T: Categorized + Clone,
{
    Arranger::new(&BoardTopology::classic(), ArrangeConfig::default()).arrange(items, seed)
}
