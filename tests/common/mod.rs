//! Shared test utilities for git-deck integration tests
//!
//! Real-git scenarios run against temporary repositories; synchronizer sequencing is
//! tested with a scripted runner that records every invocation.

pub mod assertions;
pub mod fixtures;
pub mod repository;
pub mod scripted;
