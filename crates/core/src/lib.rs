//! # spatlag Core
//!
//! Core types shared by the spatlag analysis crates.
//!
//! This crate provides:
//! - `Feature` / `FeatureCollection`: geometry plus attributes
//! - `AttributeValue`: loosely typed attribute cell
//! - `Diagnostics`: structured sink for non-fatal warnings
//! - `Error` / `Result`
//! - `Algorithm`: common shape of analysis entry points

pub mod diagnostics;
pub mod error;
pub mod vector;

pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
pub use error::{Error, Result};
pub use vector::{AttributeValue, Feature, FeatureCollection};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
    pub use crate::error::{Error, Result};
    pub use crate::vector::{AttributeValue, Feature, FeatureCollection};
    pub use crate::Algorithm;
}

/// Core trait for analyses in spatlag.
///
/// Analyses are pure functions of their input and parameters; they never
/// mutate the input.
pub trait Algorithm {
    /// Input type for the algorithm
    type Input;
    /// Output type for the algorithm
    type Output;
    /// Parameters controlling algorithm behavior
    type Params: Default;
    /// Error type for algorithm execution
    type Error: std::error::Error;

    /// Returns the algorithm name
    fn name(&self) -> &'static str;

    /// Returns a description of what the algorithm does
    fn description(&self) -> &'static str;

    /// Execute the algorithm
    fn execute(
        &self,
        input: Self::Input,
        params: Self::Params,
    ) -> std::result::Result<Self::Output, Self::Error>;

    /// Execute with default parameters
    fn execute_default(
        &self,
        input: Self::Input,
    ) -> std::result::Result<Self::Output, Self::Error> {
        self.execute(input, Self::Params::default())
    }
}
