use thiserror::Error;

/// Transport-level failures talking to the recipe API
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed with status {0}")]
    Status(reqwest::StatusCode),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("fetch worker stopped")]
    WorkerStopped,
}

/// Outcome of a committed search, as shown to the user
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Enter a valid meal name.")]
    Validation,

    #[error("No meals found with that name.")]
    NotFound,

    #[error("Error fetching meals.")]
    Network(#[source] ApiError),
}

/// Failures of the detail view's own lookup
#[derive(Debug, Error)]
pub enum DetailError {
    #[error("Meal not found.")]
    NotFound,

    #[error("Error fetching meal details.")]
    Network(#[source] ApiError),
}
