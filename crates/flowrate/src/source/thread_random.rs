use super::{StreamValue, VALUE_UPPER_BOUND, ValueSource};
use rand::{Rng, rng};

/// A [`ValueSource`] backed by the thread-local RNG (`rand::rng()`).
///
/// The generator task may migrate between worker threads, so this type does
/// not hold the RNG itself; it looks up the current thread's generator on
/// every call. That keeps it `Send` even though `ThreadRng` is not.
#[derive(Default, Clone, Debug)]
pub struct ThreadRandom;

impl ValueSource for ThreadRandom {
    fn next_value(&mut self) -> StreamValue {
        rng().random_range(0..VALUE_UPPER_BOUND)
    }
}
