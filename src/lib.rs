//! Podium - Race Results Season Dashboard
//!
//! Loads two seasons of race-result CSV files, cleans a handful of columns
//! and renders descriptive charts and summary tables for driver, team and
//! track performance.

pub mod charts;
pub mod config;
pub mod data;
pub mod gui;
pub mod stats;
