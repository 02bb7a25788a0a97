#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Filter engine, metrics calculator, and chart renderers for the crime
//! dashboard.
//!
//! All computation is synchronous and read-only over a loaded
//! [`Dataset`](crime_dashboard_loader::Dataset). [`filter::apply`] narrows
//! the dataset to a [`View`] plus an optional comparison view,
//! [`metrics::compute`] derives the headline numbers, [`charts`] maps a view
//! to chart specifications, and [`dashboard::render`] ties them together as
//! one pure `state -> view model` function.

pub mod charts;
pub mod dashboard;
pub mod filter;
pub mod format;
pub mod metrics;
mod view;

pub use view::View;
