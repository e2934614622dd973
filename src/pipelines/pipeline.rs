//! Pipeline trait.
use crate::error::Error;

/// This trait must be implemented for each pass,
/// and is generic over the return type so that
/// each pass can return its own run report.
pub trait Pipeline<T> {
    fn run(&self) -> Result<T, Error>;
}
