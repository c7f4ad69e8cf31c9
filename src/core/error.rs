use thiserror::Error;

/// Invalid run inputs. Always raised before any optimization work starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("The number of particles must be at least 3, not {0}")]
    TooFewAtoms(usize),

    #[error("The number of iterations must be at least {minimum}, not {got}")]
    TooFewIterations { minimum: usize, got: usize },

    #[error("The output file must be .xyz, not {0}")]
    OutputExtension(String),

    #[error("At least one restart is required")]
    ZeroRestarts,

    #[error("Invalid tuning value '{field}': {reason}")]
    InvalidTuning { field: &'static str, reason: String },
}

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Vector of length {0} does not describe 3N-6 coordinates for any N >= 3")]
    Dimension(usize),

    #[error("Final refinement did not converge: {message}")]
    RefinementFailed { message: String },

    #[error(transparent)]
    Config(#[from] ConfigError),
}
