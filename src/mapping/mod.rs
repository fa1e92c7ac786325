//! Type mapping, synonym resolution and dependency ordering.

pub mod depgraph;
pub mod synonym_resolver;
pub mod type_mapper;
