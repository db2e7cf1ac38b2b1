//! Discovery error types.

use packet_sd_client::ApiError;
use thiserror::Error;

/// A failed inventory fetch. The whole cycle is abandoned.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to list projects: {0}")]
    ListProjects(#[source] ApiError),

    #[error("failed to list devices for project {project_id}: {source}")]
    ListDevices {
        project_id: String,
        #[source]
        source: ApiError,
    },
}
