//! Error taxonomy for a combine run
//!

use camino::Utf8PathBuf;
use simple_error::SimpleError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CombineError {
    #[error("Invalid species token: '{0}'")]
    InvalidSpecies(String),

    #[error("Assembly '{assembly}' is not available for species '{species}'")]
    InvalidAssembly { assembly: String, species: String },

    #[error("{0}")]
    InvalidParameter(String),

    #[error("Output directory does not exist: '{0}'")]
    MissingOutputDir(Utf8PathBuf),

    /// Any other command-line setting problem
    #[error("{0}")]
    Validation(String),

    #[error("Sub-pipeline '{step}' failed ({status}). Command: {command}")]
    SubPipelineFailure {
        step: String,
        command: String,
        status: String,
    },

    #[error("Step '{step}' reported success but its output is missing: '{path}'")]
    MissingExpectedArtifact { step: String, path: Utf8PathBuf },

    #[error("Liftover dictionary not found: '{0}'")]
    MissingLiftoverDictionary(Utf8PathBuf),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl CombineError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Category name used in the run log
    pub fn category(&self) -> &'static str {
        use CombineError::*;
        match self {
            InvalidSpecies(_)
            | InvalidAssembly { .. }
            | InvalidParameter(_)
            | MissingOutputDir(_)
            | Validation(_) => "VALIDATION_ERROR",
            SubPipelineFailure { .. } => "SUB_PIPELINE_FAILURE",
            MissingExpectedArtifact { .. } => "MISSING_EXPECTED_ARTIFACT",
            MissingLiftoverDictionary(_) => "MISSING_LIFTOVER_DICTIONARY",
            Io { .. } => "IO_ERROR",
        }
    }

    /// True for errors found while checking settings, before any work starts
    pub fn is_validation(&self) -> bool {
        self.category() == "VALIDATION_ERROR"
    }
}

impl From<SimpleError> for CombineError {
    fn from(err: SimpleError) -> Self {
        Self::Validation(err.to_string())
    }
}

pub type CombineResult<T> = Result<T, CombineError>;
