//! Shared test infrastructure

#![allow(unused_imports)]

pub mod fixtures;
pub mod mock_platform;
pub mod mock_runner;

pub use fixtures::*;
pub use mock_platform::MockPlatformService;
pub use mock_runner::MockRunner;
