//! AWS provider error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AwsError {
    #[error("{operation} failed: {message}")]
    Api {
        operation: &'static str,
        message: String,
    },

    #[error("{operation} response did not contain {field}")]
    MissingField {
        operation: &'static str,
        field: &'static str,
    },

    #[error("NAT gateway {nat_gateway_id} did not become available: {message}")]
    WaitFailed {
        nat_gateway_id: String,
        message: String,
    },
}

impl AwsError {
    pub(crate) fn api(operation: &'static str, err: impl std::error::Error + 'static) -> Self {
        AwsError::Api {
            operation,
            message: aws_sdk_ec2::error::DisplayErrorContext(err).to_string(),
        }
    }
}

impl From<AwsError> for vpcflow_cloud::CloudError {
    fn from(err: AwsError) -> Self {
        match err {
            AwsError::MissingField { .. } => {
                vpcflow_cloud::CloudError::InvalidResponse(err.to_string())
            }
            AwsError::WaitFailed { .. } => vpcflow_cloud::CloudError::Timeout(err.to_string()),
            AwsError::Api { .. } => vpcflow_cloud::CloudError::ApiError(err.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, AwsError>;
