//! dbfactory - pluggable connection factory
//!
//! Turns declarative configuration into live handles to heterogeneous data
//! backends. A [`registry::BackendRegistry`] maps backend type tags to
//! connectors; a [`factory::DbFactory`] holds named configs, connects them on
//! demand and hands out the resulting instances.

pub mod cli;
pub mod config;
pub mod connector;
pub mod factory;
pub mod logging;
pub mod registry;
