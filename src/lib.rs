#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub(crate) mod api;
pub mod app;
pub mod clients;
pub mod config;
pub mod observability;
pub mod pipeline;
pub mod store;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod util;
