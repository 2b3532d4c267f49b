// Library surface for the binary and for headless/integration tests.
pub mod app;
pub mod app_dirs;
pub mod clock;
pub mod config;
pub mod controller;
pub mod corpus;
pub mod error;
pub mod metrics;
pub mod runtime;
pub mod session;
pub mod surface;
pub mod ticker;
pub mod time_series;
pub mod ui;

pub use error::{Error, Result};
