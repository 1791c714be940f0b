use restpoint_core::Error as EndpointError;
use thiserror::Error;
use tokio::io::Error as TokioIoError;

/// Define all the possible errors raised while setting up a router-backed service
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("Endpoint error: {0}")]
    Endpoint(#[from] EndpointError),

    #[error("I/O Error occurred: {0}")]
    Io(#[from] TokioIoError),

    #[error("A default service has already been installed for this process")]
    AlreadyInstalled,
}

impl From<HttpError> for EndpointError {
    fn from(value: HttpError) -> Self {
        match value {
            HttpError::Endpoint(err) => err,
            other => EndpointError::Runtime(other.to_string().into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use restpoint_core::environ::EnvironmentError;

    #[test]
    fn test_endpoint_error_is_unwrapped() {
        let error = HttpError::Endpoint(EndpointError::Environment(
            EnvironmentError::InvalidEnvVar("RESTPOINT_WORKER_THREADS".into(), "zero".into()),
        ));
        assert!(matches!(
            EndpointError::from(error),
            EndpointError::Environment(_)
        ));
    }

    #[test]
    fn test_other_errors_become_runtime_errors() {
        let error = EndpointError::from(HttpError::AlreadyInstalled);
        match error {
            EndpointError::Runtime(message) => assert_eq!(
                message,
                "A default service has already been installed for this process"
            ),
            other => panic!("Expected a runtime error, got {other:?}"),
        }
    }
}
