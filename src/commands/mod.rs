//! Command-line front ends for the conversion workflow, the viewer, and the catalog endpoints

pub mod catalog;
pub mod convert;
pub mod view;

pub use catalog::{AccountCommand, CatalogCommand};
pub use convert::ConvertArgs;
pub use view::ViewArgs;
