// Copyright 2026 the PrefTally developers.
// This file is part of PrefTally.
// PrefTally is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// PrefTally is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License along with PrefTally.  If not, see <https://www.gnu.org/licenses/>.


//! Randomness for tie resolution: an owned generator, seeded explicitly
//! for reproducible counts or from entropy.

use rand::{Rng, SeedableRng};
use rand::seq::SliceRandom;
use rand_chacha::ChaCha20Rng;

pub struct Randomness {
    rng : ChaCha20Rng,
}

impl Randomness {
    pub fn seeded(seed:u64) -> Self { Randomness{rng:ChaCha20Rng::seed_from_u64(seed)} }
    pub fn from_entropy() -> Self { Randomness{rng:ChaCha20Rng::seed_from_u64(rand::random::<u64>())} }

    /// Shuffle a slice in place.
    pub fn shuffle<T>(&mut self,values:&mut [T]) {
        values.shuffle(&mut self.rng);
    }

    /// Pick one element of a non-empty slice uniformly.
    pub fn choose<T:Copy>(&mut self,values:&[T]) -> T {
        values[self.rng.random_range(0..values.len())]
    }
}
