//! Query module
//!
//! Structured SoQL queries and the request builder that turns them into
//! transport parameters.
//!
//! # Overview
//!
//! A [`Query`] is an immutable description of what to fetch (selection,
//! filter, grouping, ordering). [`build`] derives a [`PageRequest`] from it
//! with `$limit`/`$offset` overridden, which is what each page fetch sends.

mod builder;
mod types;

pub use builder::{build, params, PageRequest, ParamValue};
pub use types::{Query, QueryBuilder};
