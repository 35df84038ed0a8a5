//! Route synthesis
//!
//! [`RouteTable::bind`] derives a module's routes from its schema and the
//! admin settings. [`RouteRegistry`] collects the tables of every module,
//! pairs each route with its controller and builds the axum router.

pub mod catalog;
pub mod registry;

pub use catalog::{Operation, RouteDefinition, RouteOptions, RouteTable, Verb};
pub use registry::RouteRegistry;
