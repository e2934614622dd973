//! Filtering trait.

/// Immutable, pure filter: two successive equal inputs give two equal outputs.
///
/// `detect` returns `true` when the item has to be kept.
pub trait Filter<T>: Default {
    fn detect(&self, item: T) -> bool;
}
