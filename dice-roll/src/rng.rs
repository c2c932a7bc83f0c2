/*
Copyright 2021 Robin Marchart

   Licensed under the Apache License, Version 2.0 (the "License");
   you may not use this file except in compliance with the License.
   You may obtain a copy of the License at

       http://www.apache.org/licenses/LICENSE-2.0

   Unless required by applicable law or agreed to in writing, software
   distributed under the License is distributed on an "AS IS" BASIS,
   WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
   See the License for the specific language governing permissions and
   limitations under the License.
*/

//! A cryptographic master generator that hands out fast per-request
//! generators. Every request owns its generator, so rolls never share
//! generator state.

use parking_lot::Mutex;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

pub use rand_xoshiro::Xoshiro256PlusPlus;

#[cfg(feature = "logging")]
use log::debug;

#[derive(Debug, Clone)]
pub struct RngProvider {
    rng: ChaCha20Rng,
}

impl RngProvider {
    pub fn from_entropy() -> RngProvider {
        RngProvider {
            rng: ChaCha20Rng::from_entropy(),
        }
    }

    /// Same seed, same sequence of handed out generators.
    pub fn from_seed(seed: u64) -> RngProvider {
        #[cfg(feature = "logging")]
        {
            debug!("seeding rng provider with {}", seed);
        }
        RngProvider {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }

    pub fn next_rng(&mut self) -> Xoshiro256PlusPlus {
        let mut seed: <Xoshiro256PlusPlus as SeedableRng>::Seed = Default::default();
        self.rng.fill(&mut seed);
        Xoshiro256PlusPlus::from_seed(seed)
    }
}

/// [`RngProvider`] behind a lock, for hosts that serve rolls from several threads.
#[derive(Debug)]
pub struct SharedRngProvider {
    inner: Mutex<RngProvider>,
}

impl SharedRngProvider {
    pub fn new(provider: RngProvider) -> SharedRngProvider {
        SharedRngProvider {
            inner: Mutex::new(provider),
        }
    }

    pub fn next_rng(&self) -> Xoshiro256PlusPlus {
        self.inner.lock().next_rng()
    }
}
