#![warn(missing_docs)]

//! # `phonoladder`
//!
//! Builds printable snakes-and-ladders boards for speech-sound practice: every square from 2 to 99 shows a picture of
//! a word containing the target sound, and the same word never appears on two squares that share an edge.
//! Begin with [`BoardSettings`] naming up to three sounds, then call [`Generator::plan`] with a seed.
//! The same settings and seed always give the same board. To fetch artwork as well, wrap the generator in a
//! [`Session`] with an [`IconSource`](icons::IconSource).
//!
//! # Internals
//! A board is generated in four passes.
//!
//! 1. The word bank is filtered by sound, position in the word, and word structure ([`bank`]).
//! 2. The filtered words are repeated and shuffled into a pool, then placed square by square. Each square takes the
//!    first word in the pool that differs from its already placed neighbours ([`arrange`]). Adjacency is the physical
//!    4-neighbour grid of the serpentine board ([`topology`]). An attempt that gets stuck is thrown away and a fresh
//!    shuffle is tried; after a fixed number of attempts the board is filled regardless and flagged.
//! 3. The fixed snakes and ladders ([`template`]) are laid out in pixels ([`connector`]) and rasterized into an
//!    occupancy mask ([`mask`]).
//! 4. Each square's icon is slid and shrunk around the square until it covers as little of the connectors as
//!    possible ([`spot`]). A square that stays mostly covered gets no icon.

pub use arrange::{arrange, Arrangement};
pub use item::Categorized;
pub use location::{InvalidSquare, Location, Square, BOARD_SIDE, INTERIOR_SQUARES};
pub use session::{BoardPlan, BoardSettings, GenerateError, Generator, Session};

pub mod arrange;
pub mod bank;
pub mod connector;
pub mod icons;
pub(crate) mod item;
pub mod layout;
pub(crate) mod location;
pub mod mask;
pub mod prng;
pub mod session;
pub mod shape;
pub mod spot;
pub mod summary;
pub mod template;
mod tests;
pub mod topology;
#[cfg(feature = "wasm")]
pub mod wasm;
