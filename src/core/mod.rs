//! Core bootstrap pipeline
//!
//! Dependency table, validators, acquisition and the orchestrator that
//! drives them in order.

pub mod acquire;
pub mod bootstrap;
pub mod descriptor;
pub mod error;
pub mod generator;
pub mod output;
pub mod platform;
pub mod sdk;
pub mod settings;
pub mod state;
pub mod submodules;
pub mod validate;
