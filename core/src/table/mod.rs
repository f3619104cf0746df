// flowroute/src/table/mod.rs

//! Builds, validates and resolves against the per-method routing table of a contract.

pub mod builder;
pub mod definition;
pub mod resolution;

pub use builder::RoutingTableBuilder;
pub use definition::{RouteEntry, RoutedMethod, RoutingTable};
