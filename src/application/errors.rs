use crate::core::ports::StoreError;
use std::fmt;
use thiserror::Error;

pub const EXIT_CONNECTION_FAILURE: u8 = 1;
pub const EXIT_PIPELINE_FAILURE: u8 = 2;

/// Pipeline stages that talk to the store and can therefore fail the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    EnsureSchema,
    FetchHistory,
    Persist,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::EnsureSchema => "ensure schema",
            Stage::FetchHistory => "fetch history",
            Stage::Persist => "persist forecasts",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("database connection: {0}")]
    Connection(#[source] StoreError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("forecast task failed: {0}")]
    ForecastTask(String),

    #[error("{stage}: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: StoreError,
    },
}

impl PipelineError {
    pub fn at(stage: Stage) -> impl FnOnce(StoreError) -> Self {
        move |source| PipelineError::Stage { stage, source }
    }

    /// Connection failures and every other failure exit with different statuses.
    pub fn exit_code(&self) -> u8 {
        match self {
            PipelineError::Connection(_) => EXIT_CONNECTION_FAILURE,
            PipelineError::InvalidConfig(_) | PipelineError::ForecastTask(_) | PipelineError::Stage { .. } => {
                EXIT_PIPELINE_FAILURE
            }
        }
    }
}
