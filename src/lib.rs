pub mod compare;
pub mod config;
pub mod dataset;
pub mod error;
pub mod season;
pub mod selector;
pub mod state;
pub mod suggest;
pub mod telemetry;

pub use error::{Result, SelectorError};
