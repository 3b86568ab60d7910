//! Deterministic random number provider.
//!
//! Every randomized decision in the crate (carving order, generator roots,
//! start/goal placement) draws from a [`MazeRng`]. The algorithm is fixed so
//! that a seed reproduces the same stream on every platform:
//!
//! * seeding: `state = splitmix64(seed)`, replaced by [`ZERO_STATE_FALLBACK`]
//!   if it is zero
//! * stepping: xorshift64* (`>> 12`, `<< 25`, `>> 27`, multiply by
//!   `0x2545F4914F6CDD1D`)
//! * bounded integers: high 64 bits of `next_u64() * bound`
//! * shuffling: Fisher-Yates from the back, `j = next_int(i + 1)`

use rand::{RngCore, SeedableRng};

const GOLDEN_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;
const ZERO_STATE_FALLBACK: u64 = GOLDEN_GAMMA;
const XORSHIFT_MULTIPLIER: u64 = 0x2545_F491_4F6C_DD1D;

/// Sub-stream used for carving passages.
pub const GENERATION_STREAM: u64 = 1;
/// Sub-stream used for start/goal placement.
pub const PLACEMENT_STREAM: u64 = 2;

/// One round of the splitmix64 output function.
pub fn splitmix64(z: u64) -> u64 {
    let mut z = z.wrapping_add(GOLDEN_GAMMA);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Derive an independent sub-seed of `seed` for the given stream id.
pub fn derive(seed: u64, stream: u64) -> u64 {
    splitmix64(seed ^ splitmix64(stream))
}

/// Seeded xorshift64* generator. Never shared between trials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MazeRng {
    state: u64,
}

impl MazeRng {
    pub fn new(seed: u64) -> Self {
        let state = match splitmix64(seed) {
            0 => ZERO_STATE_FALLBACK,
            s => s,
        };
        MazeRng { state }
    }

    /// Provider for the given sub-stream of a trial seed.
    pub fn for_stream(seed: u64, stream: u64) -> Self {
        MazeRng::new(derive(seed, stream))
    }

    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(XORSHIFT_MULTIPLIER)
    }

    /// Uniform integer in `[0, bound)`.
    ///
    /// A zero bound returns 0 without advancing the stream.
    pub fn next_int(&mut self, bound: usize) -> usize {
        if bound == 0 {
            return 0;
        }
        ((self.next_u64() as u128 * bound as u128) >> 64) as usize
    }

    /// Uniform float in `[0, 1)` with 53 bits of precision.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Fisher-Yates shuffle driven by [`MazeRng::next_int`].
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.next_int(i + 1);
            items.swap(i, j);
        }
    }

    /// Uniformly pick one element, `None` for an empty slice.
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        items.get(self.next_int(items.len()))
    }
}

impl RngCore for MazeRng {
    fn next_u32(&mut self) -> u32 {
        (MazeRng::next_u64(self) >> 32) as u32
    }

    fn next_u64(&mut self) -> u64 {
        MazeRng::next_u64(self)
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        for chunk in dst.chunks_mut(8) {
            let bytes = MazeRng::next_u64(self).to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }
}

impl SeedableRng for MazeRng {
    type Seed = [u8; 8];

    fn from_seed(seed: Self::Seed) -> Self {
        MazeRng::new(u64::from_le_bytes(seed))
    }

    fn seed_from_u64(state: u64) -> Self {
        MazeRng::new(state)
    }
}
