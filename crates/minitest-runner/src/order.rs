//! Test execution order.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::config::TestOrder;

/// Draws a fresh seed for a random-order run.
///
/// Kept small so it is easy to retype when replaying a run.
#[must_use]
pub fn fresh_seed() -> u64 {
    u64::from(rand::random::<u16>())
}

/// Creates the generator that drives shuffling for one run.
#[must_use]
pub fn shuffler(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Arranges discovered test names for execution.
///
/// Random order sorts before shuffling so the result depends only on the
/// set of names and the generator state, not on discovery order.
#[must_use]
pub fn arrange(mut names: Vec<String>, order: TestOrder, rng: &mut StdRng) -> Vec<String> {
    match order {
        TestOrder::Defined => {}
        TestOrder::Sorted => names.sort_unstable(),
        TestOrder::Random => {
            names.sort_unstable();
            names.shuffle(rng);
        }
    }
    names
}
