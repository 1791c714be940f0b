use restpoint_core::environ::{EnvironmentError, TryFromEnv, var_or};
use std::borrow::Cow;
use std::num::NonZeroUsize;
use std::str::FromStr;
use std::time::Duration;
use tower_http::timeout::TimeoutLayer;
use tracing::debug;

/// Represents a timeout configuration with a specified duration.
///
/// The `Timeout` struct holds the maximum duration a route is allowed to take before the
/// service answers on its behalf with `408 Request Timeout`.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use restpoint_http::environ::Timeout;
///
/// let timeout = Timeout {
///     duration: Duration::new(5, 0), // 5 seconds
/// };
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Timeout {
    pub duration: Duration,
}

impl Timeout {
    const DEFAULT_SECS: &'static str = "120";

    fn parse(value: &str) -> Result<Self, EnvironmentError> {
        match u64::from_str(value) {
            Ok(timeout) => {
                debug!("[Environ] Timeout set to {} seconds", timeout);
                Ok(Self {
                    duration: Duration::from_secs(timeout),
                })
            }
            Err(err) => Err(EnvironmentError::InvalidEnvVar(
                Self::ENV_VAR_NAME.into(),
                err.to_string(),
            )),
        }
    }
}

impl Default for Timeout {
    fn default() -> Self {
        Self {
            duration: Duration::from_secs(120),
        }
    }
}

impl TryFromEnv for Timeout {
    /// Name of the environment variable holding the timeout, in seconds, applied to every route.
    const ENV_VAR_NAME: &'static str = "RESTPOINT_REQUEST_TIMEOUT_SEC";

    /// Read the timeout from `RESTPOINT_REQUEST_TIMEOUT_SEC`, defaulting to `120` seconds when
    /// the variable is absent.
    ///
    /// # Errors
    /// - `EnvironmentError::InvalidEnvVar`: the value of the variable is not a `u64`.
    fn try_from_env() -> Result<Self, EnvironmentError> {
        Self::parse(&var_or(Self::ENV_VAR_NAME, Self::DEFAULT_SECS)?)
    }
}

/// Helper conversion from an environment extracted Timeout to `tower_http::timeout::TimeoutLayer`
impl From<Timeout> for TimeoutLayer {
    fn from(value: Timeout) -> Self {
        TimeoutLayer::new(value.duration)
    }
}

/// Number of threads driving the transport calls of a service owning its runtime
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct WorkerThreads(NonZeroUsize);

impl WorkerThreads {
    const DEFAULT: &'static str = "2";

    pub fn new(threads: NonZeroUsize) -> Self {
        Self(threads)
    }

    #[inline]
    pub fn get(&self) -> usize {
        self.0.get()
    }

    fn parse(value: &str) -> Result<Self, EnvironmentError> {
        NonZeroUsize::from_str(value).map(Self).map_err(|err| {
            EnvironmentError::InvalidEnvVar(Self::ENV_VAR_NAME.into(), err.to_string())
        })
    }
}

impl Default for WorkerThreads {
    fn default() -> Self {
        Self(NonZeroUsize::new(2).unwrap_or(NonZeroUsize::MIN))
    }
}

impl TryFromEnv for WorkerThreads {
    const ENV_VAR_NAME: &'static str = "RESTPOINT_WORKER_THREADS";

    fn try_from_env() -> Result<Self, EnvironmentError> {
        let threads = Self::parse(&var_or(Self::ENV_VAR_NAME, Self::DEFAULT)?)?;
        debug!("[Environ] Worker threads set to {}", threads.get());
        Ok(threads)
    }
}

/// Prefix prepended to the path of every endpoint handled by a service.
///
/// # Examples
///
/// ```
/// use restpoint_http::environ::BasePath;
///
/// let base = BasePath::new("/api/v1/").unwrap();
/// assert_eq!(base.join("/users/7"), "/api/v1/users/7");
/// assert_eq!(BasePath::default().join("health"), "/health");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BasePath(Cow<'static, str>);

impl BasePath {
    /// Create a base path, which must either be empty or start with `/`
    pub fn new<P: Into<Cow<'static, str>>>(prefix: P) -> Result<Self, EnvironmentError> {
        let prefix = prefix.into();
        if prefix.is_empty() || prefix.starts_with('/') {
            match prefix {
                Cow::Borrowed(value) => Ok(Self(Cow::Borrowed(value.trim_end_matches('/')))),
                Cow::Owned(value) => Ok(Self(Cow::Owned(value.trim_end_matches('/').to_owned()))),
            }
        } else {
            Err(EnvironmentError::InvalidEnvVar(
                Self::ENV_VAR_NAME.into(),
                format!("base path {prefix} must start with '/'"),
            ))
        }
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Append `path` to this prefix, ensuring exactly one `/` separates them
    pub fn join(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        let mut joined = String::with_capacity(self.0.len() + path.len() + 1);
        joined.push_str(&self.0);
        joined.push('/');
        joined.push_str(path);
        joined
    }
}

impl TryFromEnv for BasePath {
    const ENV_VAR_NAME: &'static str = "RESTPOINT_BASE_PATH";

    fn try_from_env() -> Result<Self, EnvironmentError> {
        let base = Self::new(var_or(Self::ENV_VAR_NAME, "")?)?;
        debug!("[Environ] Base path set to '{}'", base.as_str());
        Ok(base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_with_valid_small_integer() {
        let timeout = Timeout::parse("5").unwrap();
        assert_eq!(timeout.duration, Duration::from_secs(5));
    }

    #[test]
    fn test_timeout_with_invalid_string() {
        let result = Timeout::parse("invalid");
        assert!(matches!(
            result,
            Err(EnvironmentError::InvalidEnvVar(name, _)) if name == Timeout::ENV_VAR_NAME
        ));
    }

    #[test]
    fn test_timeout_default_matches_env_default() {
        assert_eq!(Timeout::parse(Timeout::DEFAULT_SECS).unwrap(), Timeout::default());
    }

    #[test]
    fn test_worker_threads_rejects_zero() {
        assert!(WorkerThreads::parse("0").is_err());
        assert!(WorkerThreads::parse("many").is_err());
        assert_eq!(WorkerThreads::parse("4").unwrap().get(), 4);
        assert_eq!(
            WorkerThreads::parse(WorkerThreads::DEFAULT).unwrap(),
            WorkerThreads::default()
        );
    }

    #[test]
    fn test_base_path_validation() {
        assert!(BasePath::new("api").is_err());
        assert_eq!(BasePath::new("").unwrap(), BasePath::default());
        assert_eq!(BasePath::new("/").unwrap().as_str(), "");
        assert_eq!(BasePath::new(String::from("/v2//")).unwrap().as_str(), "/v2");
    }

    #[test]
    fn test_base_path_join() {
        let base = BasePath::new("/api").unwrap();
        assert_eq!(base.join("/users"), "/api/users");
        assert_eq!(base.join("users"), "/api/users");
        assert_eq!(base.join(""), "/api/");
        assert_eq!(BasePath::default().join("/health"), "/health");
    }
}
