//! Trait definitions for App Store Connect collections.
//!
//! Each resource level of the report hierarchy implements [`List`], which
//! ties the collection path to its filter parameters.

mod list;

pub use list::List;
