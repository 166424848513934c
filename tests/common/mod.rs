//! Shared test utilities

#![allow(dead_code)]

pub mod fixtures;
pub mod mock_repository;

pub use fixtures::*;
pub use mock_repository::{MockRepositoryService, Op};
