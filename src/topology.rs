//! Which interior squares touch.

use std::fmt::{Display, Formatter};

use itertools::Itertools;
use ndarray::Array2;
use petgraph::graphmap::UnGraphMap;
use unordered_pair::UnorderedPair;

use crate::location::{Location, Square, BOARD_SIDE, INTERIOR_SQUARES};
use crate::shape::{SquareStep, Step};

/// Adjacency between the picture-carrying squares of a serpentine 10x10 board.
///
/// Two squares are adjacent when they share an edge in the physical grid. Adjacency has nothing to do with numbering,
/// so 10 and 11 touch (they sit on top of each other at the right edge) while 10 and 12 do not.
/// START and FINISH are not part of the graph.
#[derive(Clone, Debug)]
pub struct BoardTopology {
    graph: UnGraphMap<Square, ()>,
    grid: Array2<Option<Square>>,
    neighbors: Vec<Vec<usize>>,
}

impl BoardTopology {
    /// The standard board: squares 2..=99 with 4-neighbour adjacency.
    pub fn classic() -> Self {
        let mut graph = UnGraphMap::with_capacity(INTERIOR_SQUARES, INTERIOR_SQUARES * 2);
        let mut grid = Array2::from_elem((BOARD_SIDE, BOARD_SIDE), None);

        for square in Square::interior() {
            graph.add_node(square);
            grid[square.location().as_index()] = Some(square);
        }

        for square in Square::interior() {
            for dir in SquareStep::FORWARD_VARIANTS {
                let destination = dir.attempt_from(square.location());
                if let Some(other) = Square::from_location(destination).filter(|sq| sq.is_interior()) {
                    graph.add_edge(square, other, ());
                }
            }
        }

        let neighbors = Square::interior()
            .map(|square| graph.neighbors(square)
                .filter_map(Square::slot)
                .sorted()
                .collect_vec())
            .collect_vec();

        Self { graph, grid, neighbors }
    }

    /// Number of placement slots.
    pub fn slots(&self) -> usize {
        self.neighbors.len()
    }

    /// Slots adjacent to `slot`, ascending. Empty for an out-of-range slot.
    pub fn neighbors(&self, slot: usize) -> &[usize] {
        self.neighbors.get(slot).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether slots `a` and `b` share an edge.
    pub fn are_adjacent(&self, a: usize, b: usize) -> bool {
        self.neighbors(a).contains(&b)
    }

    /// Every adjacent pair of slots, each reported once.
    pub fn adjacent_pairs(&self) -> impl Iterator<Item = UnorderedPair<usize>> + '_ {
        self.graph.all_edges()
            .filter_map(|(a, b, _)| Some(UnorderedPair(a.slot()?, b.slot()?)))
    }

    /// The interior square at `location`, if any.
    pub fn square_at(&self, location: Location) -> Option<Square> {
        if !location.in_bounds() {
            return None;
        }
        self.grid[location.as_index()]
    }

    /// The underlying adjacency graph.
    pub fn graph(&self) -> &UnGraphMap<Square, ()> {
        &self.graph
    }

    /// Lay out one label per square as it appears on the printed board, top row first.
    /// START and FINISH print as `.`.
    pub fn render<F>(&self, mut label: F) -> String
    where
        F: FnMut(Square) -> String,
    {
        let cells = self.grid.map(|square| square.map(&mut label).unwrap_or_else(|| ".".to_string()));
        let width = cells.iter().map(|cell| cell.chars().count()).max().unwrap_or(1);

        let mut out = String::with_capacity(cells.nrows() * (cells.ncols() * (width + 1) + 1));
        for row in cells.rows() {
            out.push_str(&row.iter().map(|cell| format!("{cell:>width$}")).join(" "));
            out.push('\n');
        }

        out
    }
}

impl Default for BoardTopology {
    fn default() -> Self {
        Self::classic()
    }
}

impl Display for BoardTopology {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.render(|square| square.to_string()))
    }
}
