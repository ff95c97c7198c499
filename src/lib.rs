//! MFCC feature preparation for audio classification.
//!
//! Stages run strictly forward: [`padding`] equalizes matrix widths, [`aggregation`]
//! reduces each matrix to a fixed-length statistical vector, [`combine`] stacks vectors into
//! a labelled table, and [`prepare`] encodes, imputes, standardizes and splits that table.
//! [`pipeline`] wires each stage to the file system.

pub mod aggregation;
pub mod cli;
pub mod combine;
pub mod config;
pub mod error;
pub mod io;
pub mod padding;
pub mod pipeline;
pub mod prepare;
pub mod types;

pub use error::{PipelineError, Result};
