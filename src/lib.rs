//! `realestate-advisor` library crate.
//!
//! The binary (`advisor`) is a thin wrapper around this library so that:
//!
//! - feature engineering and prediction are testable without spawning processes
//! - the orchestrator and registry can be embedded in other front-ends

pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod features;
pub mod io;
pub mod models;
pub mod predict;
pub mod registry;
pub mod report;
