use bytes::Bytes;
use restpoint_core::{DecodingError, EncodingError};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Wire format used by a service to turn endpoint inputs into bodies and bodies into outputs
pub trait Codec: Send + Sync + 'static {
    /// Media type sent along encoded bodies and accepted in responses
    const CONTENT_TYPE: &'static str;

    fn encode<I>(&self, input: &I) -> Result<Bytes, EncodingError>
    where
        I: Serialize + ?Sized;

    fn decode<O>(&self, body: &[u8]) -> Result<O, DecodingError>
    where
        O: DeserializeOwned;
}

/// JSON wire format backed by `serde_json`.
///
/// An empty body decodes as JSON `null`, so endpoints answering `204 No Content` can declare
/// `()` or `Option<T>` as their output.
///
/// # Examples
///
/// ```
/// use restpoint_http::{Codec, Json};
///
/// let body = Json.encode(&vec![1, 2, 3]).unwrap();
/// assert_eq!(&body[..], b"[1,2,3]");
///
/// let nothing: Option<u32> = Json.decode(b"").unwrap();
/// assert!(nothing.is_none());
/// ```
#[derive(Copy, Clone, Debug, Default)]
pub struct Json;

impl Codec for Json {
    const CONTENT_TYPE: &'static str = "application/json";

    fn encode<I>(&self, input: &I) -> Result<Bytes, EncodingError>
    where
        I: Serialize + ?Sized,
    {
        serde_json::to_vec(input)
            .map(Bytes::from)
            .map_err(EncodingError::new)
    }

    fn decode<O>(&self, body: &[u8]) -> Result<O, DecodingError>
    where
        O: DeserializeOwned,
    {
        let body = if body.is_empty() { b"null".as_slice() } else { body };
        serde_json::from_slice(body).map_err(DecodingError::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::collections::HashMap;

    #[derive(Debug, PartialEq, Deserialize)]
    struct User {
        id: u32,
        name: String,
    }

    #[test]
    fn test_decode_expected_shape() {
        let user: User = Json.decode(br#"{"id":7,"name":"x"}"#).unwrap();
        assert_eq!(
            user,
            User {
                id: 7,
                name: "x".to_owned()
            }
        );
    }

    #[test]
    fn test_decode_mismatching_shape_fails() {
        assert!(Json.decode::<User>(br#"{"id":"seven"}"#).is_err());
        assert!(Json.decode::<User>(b"").is_err());
    }

    #[test]
    fn test_decode_empty_body_as_unit() {
        Json.decode::<()>(b"").unwrap();
    }

    #[test]
    fn test_encode_non_string_keys_fails() {
        let mut map = HashMap::new();
        map.insert((1u8, 2u8), "pair");
        assert!(Json.encode(&map).is_err());
    }
}
