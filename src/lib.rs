pub mod error;
pub mod constants;
pub mod math_utils;
pub mod temp_utils;
pub mod json_parser;
pub mod mineral;
pub mod eos;
pub mod averaging;
pub mod composite;
pub mod property;
pub mod evaluator;
pub mod geotherm;
pub mod deviation;
pub mod seismic;
pub mod tomography;
pub mod scenario;
pub mod report;

pub use error::{MantleError, Result};
