//! Seeded randomness.
//!
//! Every board is reproducible from a single `u32` seed. [`Mulberry32`] plugs into [`rand`], so slices are shuffled with
//! [`rand::seq::SliceRandom`].

use rand::rand_core::impls;
use rand::{RngCore, SeedableRng};

const GOLDEN_STEP: u32 = 0x6D2B_79F5;
/// Spacing between the decorative seeds handed to consecutive connectors.
const DERIVE_STRIDE: u32 = 1337;

/// The Mulberry32 generator: 32 bits of state, advanced before every output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mulberry32 {
    state: u32,
}

impl Mulberry32 {
    /// A fresh stream for `seed`. Equal seeds always yield equal streams.
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Uniform value in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.next_u32()) / 4_294_967_296.0
    }
}

impl RngCore for Mulberry32 {
    fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(GOLDEN_STEP);
        let a = self.state;
        let mut t = (a ^ (a >> 15)).wrapping_mul(1 | a);
        t = t.wrapping_add((t ^ (t >> 7)).wrapping_mul(61 | t)) ^ t;
        t ^ (t >> 14)
    }

    fn next_u64(&mut self) -> u64 {
        impls::next_u64_via_u32(self)
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        impls::fill_bytes_via_next(self, dst)
    }
}

impl SeedableRng for Mulberry32 {
    type Seed = [u8; 4];

    fn from_seed(seed: Self::Seed) -> Self {
        Self::new(u32::from_le_bytes(seed))
    }
}

/// Seed for the `index`-th decoration drawn from a board seeded with `seed`.
pub fn derive_seed(seed: u32, index: u32) -> u32 {
    seed.wrapping_add(index.wrapping_mul(DERIVE_STRIDE))
}
