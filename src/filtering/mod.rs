/*! Filtering utilities

Filters operate either on page titles ([Namespaces], used by the dump reader
to skip non-article pages) or on candidate target pages ([NeighborFilter], used
to disambiguate mentions by page locality).

Both implement [Filter].
!*/
mod filter;
mod namespace;
mod neighbor;

pub use filter::Filter;
pub use namespace::Namespaces;
pub use neighbor::NeighborFilter;
