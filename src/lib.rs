//! cartesian-series: retained-mode rendering pipeline for Cartesian chart series.
//!
//! A series turns per-frame node data into a pooled set of scene containers,
//! reconciles data-bound nodes, renders the chart-wide highlight, and answers
//! pointer hit-tests with exact-shape and nearest-datum strategies.

pub mod core;
pub mod error;
pub mod extensions;
pub mod interaction;
pub mod render;
pub mod series;
pub mod telemetry;

pub use error::{SeriesError, SeriesResult};
pub use series::{CartesianSeries, SeriesHooks, SeriesOpts};
