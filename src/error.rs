use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelReportError {
    #[error("GitLab API error (status {status}) for project {project}: {message}")]
    ApiError {
        project: String,
        status: u16,
        message: String,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid release count '{0}': expected a number")]
    InvalidCount(String),

    #[error("Invalid {header} header from GitLab: '{value}'")]
    Pagination { header: &'static str, value: String },

    #[error("Invalid ticket pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, RelReportError>;
