use std::borrow::Cow;
use thiserror::Error;

#[derive(Clone, Error, Debug)]
pub enum EnvironmentError {
    #[error(
        "Found environment variable {0} but validation failed: {1}. Please fix this variable and relaunch the application."
    )]
    InvalidEnvVar(Cow<'static, str>, String),
}

/// Super trait for all variables which can be inferred at runtime, from the environment variables
/// but whose extraction may fail
pub trait TryFromEnv {
    const ENV_VAR_NAME: &'static str;

    fn try_from_env() -> Result<Self, EnvironmentError>
    where
        Self: Sized;
}

/// Read `name` from the environment, falling back to `default` when the variable is not defined.
///
/// A variable defined with a non-unicode value is reported as invalid rather than silently
/// replaced by the default.
pub fn var_or(name: &'static str, default: &str) -> Result<String, EnvironmentError> {
    match std::env::var(name) {
        Ok(value) => Ok(value),
        Err(std::env::VarError::NotPresent) => Ok(default.to_owned()),
        Err(err) => Err(EnvironmentError::InvalidEnvVar(name.into(), err.to_string())),
    }
}
