//! Load near-Earth objects and their close approaches to Earth, link them,
//! and query the approaches with composable filters.

pub mod cli;
pub mod data;

pub use data::database::{DatabaseError, LinkedApproach, NeoDatabase};
pub use data::filter::{Bound, Criteria, Filter, FilterError, build_filters, limit};
pub use data::model::{CloseApproach, NearEarthObject};
