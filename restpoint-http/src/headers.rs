use axum::http::{HeaderName, HeaderValue};
use headers::{Error, Header};
use std::borrow::Cow;
use std::ops::Deref;

pub(crate) static X_REQUEST_ID_NAME: HeaderName = HeaderName::from_static("x-request-id");

/// Holds the value of the x-request-id header used to
/// correlate a dispatched call with its execution by the router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(Cow<'static, str>);

impl Deref for RequestId {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Header for RequestId {
    fn name() -> &'static HeaderName {
        &X_REQUEST_ID_NAME
    }

    fn decode<'i, I>(values: &mut I) -> Result<Self, Error>
    where
        Self: Sized,
        I: Iterator<Item = &'i HeaderValue>,
    {
        let value = values.next().ok_or_else(Error::invalid)?;
        let value = value.to_str().map_err(|_| Error::invalid())?;

        Ok(RequestId(Cow::Owned(value.to_owned())))
    }

    fn encode<E: Extend<HeaderValue>>(&self, values: &mut E) {
        if let Ok(value) = HeaderValue::from_str(&self.0) {
            values.extend(std::iter::once(value));
        }
    }
}
