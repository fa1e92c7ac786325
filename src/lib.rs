//! Oracle → PostgreSQL translation core: type and dependency resolution,
//! streaming data transfer, and Oracle-SQL → PostgreSQL-SQL transformation.
//! The binary in `main.rs` is a thin CLI shell over this library.

pub mod cancel;
pub mod catalog;
pub mod config;
pub mod constraints;
pub mod ddl;
pub mod error;
pub mod extract;
pub mod mapping;
pub mod model;
pub mod orchestrator;
pub mod serialize;
pub mod sql;
pub mod transfer;
