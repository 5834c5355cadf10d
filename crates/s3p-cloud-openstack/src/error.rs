//! OpenStack binding error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OpenStackError {
    #[error("openstack CLI not found. Please install python-openstackclient")]
    CliNotFound,

    #[error("SERVICE_HOST environment variable is not set")]
    ServiceHostNotSet,

    #[error("openstack command failed: {0}")]
    CommandFailed(String),

    #[error("unexpected openstack CLI output: {0}")]
    UnexpectedOutput(String),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, OpenStackError>;

impl From<OpenStackError> for s3p_cloud::CloudError {
    fn from(err: OpenStackError) -> Self {
        match err {
            OpenStackError::ServiceHostNotSet => {
                s3p_cloud::CloudError::InvalidConfig(err.to_string())
            }
            OpenStackError::CommandFailed(msg) => s3p_cloud::CloudError::CommandFailed(msg),
            other => s3p_cloud::CloudError::ApiError(other.to_string()),
        }
    }
}
