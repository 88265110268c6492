//! # VDFD Common Library
//!
//! Shared code for the Virtual Driving for Dollars lead service including:
//! - Lead and route models
//! - Distress score calculation
//! - Route distance and ordering utilities
//! - Local-first storage and best-effort remote sync
//! - Filtering, statistics and export
//! - Configuration loading

pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod filters;
pub mod geo;
pub mod models;
pub mod scoring;
pub mod service;
pub mod store;
pub mod sync;
pub mod time;
pub mod uuid_utils;

pub use error::{Error, Result};
pub use models::{Lead, Route, Waypoint};
pub use scoring::distress_score;
