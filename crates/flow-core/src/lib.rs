//! Core types for classflow.
//!
//! Provides the per-file metadata model ([`model::FileMetadata`]), qualified class
//! identities and the dependency graph ([`graph::DependencyGraph`]), run diagnostics,
//! typed errors, configuration, and the ordering manifest written to disk.

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod graph;
pub mod model;
pub mod schema;
pub mod source;
pub mod storage;
