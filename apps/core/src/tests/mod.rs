//! Test Module
//!
//! Cross-module test suite for the HomeBridge engine.
//!
//! ## Test Categories
//! - `analysis_tests`: pipeline properties, reference entries, concurrency
//! - `provider_tests`: external provider adoption and fallback
//! - `config_tests`: environment configuration and catalog files

pub mod analysis_tests;
