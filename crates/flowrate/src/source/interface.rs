/// A single generated stream value, always below [`VALUE_UPPER_BOUND`].
pub type StreamValue = u32;

/// Exclusive upper bound of every [`StreamValue`].
pub const VALUE_UPPER_BOUND: StreamValue = 100;

/// A trait for sources of stream values.
///
/// This abstraction lets the generator run on real randomness in production
/// and on a scripted sequence in tests.
///
/// # Example
/// ```
/// use flowrate::source::{StreamValue, ValueSource};
///
/// struct Fixed;
/// impl ValueSource for Fixed {
///     fn next_value(&mut self) -> StreamValue {
///         42
///     }
/// }
///
/// let mut source = Fixed;
/// assert_eq!(source.next_value(), 42);
/// ```
pub trait ValueSource: Send + 'static {
    /// Returns the next value. Implementations must stay below
    /// [`VALUE_UPPER_BOUND`].
    fn next_value(&mut self) -> StreamValue;
}
