//! Test utilities for integration testing.
//!
//! This module provides:
//! - Test data factories for creating valid test fixtures
//! - In-memory repository and collaborator implementations for mocking I/O
//! - A builder for constructing `AppState` with test dependencies

mod app_state_builder;
mod factories;
mod notification_mocks;
mod payment_mocks;

pub use app_state_builder::*;
pub use factories::*;
pub use notification_mocks::*;
pub use payment_mocks::*;
