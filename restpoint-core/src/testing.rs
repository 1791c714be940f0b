//! Scripted service and endpoints shared by the unit tests of this crate.

use crate::{
    Completion, DecodingError, EncodingError, Endpoint, Empty, Error, In, InOut, Out, Route,
    Service, SharedService, TransportError,
};
use bytes::Bytes;
use http::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::ser::Error as _;
use serde::{Deserialize, Serialize, Serializer};
use std::borrow::Cow;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

enum Script {
    Respond(Bytes),
    Fail(StatusCode),
    Abandon,
}

/// JSON speaking service answering every call the same way, from a dedicated thread
pub(crate) struct ScriptedService {
    script: Script,
    encoded: AtomicUsize,
    performed: AtomicUsize,
    decoded: AtomicUsize,
    requests: Mutex<Vec<(Route, Option<Bytes>)>>,
}

impl ScriptedService {
    /// Inputs serializing to a payload containing this value are refused by `encode`
    pub(crate) const REJECTED_NAME: &'static str = "<rejected>";

    fn new(script: Script) -> Self {
        Self {
            script,
            encoded: AtomicUsize::new(0),
            performed: AtomicUsize::new(0),
            decoded: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn responding(body: &'static [u8]) -> Self {
        Self::new(Script::Respond(Bytes::from_static(body)))
    }

    pub(crate) fn failing_with(status: StatusCode) -> Self {
        Self::new(Script::Fail(status))
    }

    pub(crate) fn abandoning() -> Self {
        Self::new(Script::Abandon)
    }

    pub(crate) fn encoded(&self) -> usize {
        self.encoded.load(Ordering::SeqCst)
    }

    pub(crate) fn performed(&self) -> usize {
        self.performed.load(Ordering::SeqCst)
    }

    pub(crate) fn decoded(&self) -> usize {
        self.decoded.load(Ordering::SeqCst)
    }

    pub(crate) fn requests(&self) -> Vec<(Route, Option<Bytes>)> {
        self.requests.lock().unwrap().clone()
    }
}

impl Service for ScriptedService {
    fn encode<I>(&self, _: &Route, input: &I) -> Result<Bytes, EncodingError>
    where
        I: Serialize + ?Sized,
    {
        self.encoded.fetch_add(1, Ordering::SeqCst);
        let payload = serde_json::to_vec(input).map_err(EncodingError::new)?;
        if String::from_utf8_lossy(&payload).contains(Self::REJECTED_NAME) {
            return Err(EncodingError::new("payload rejected"));
        }
        Ok(Bytes::from(payload))
    }

    fn perform(&self, route: Route, payload: Option<Bytes>, completion: Completion<Bytes>) {
        self.performed.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push((route, payload));

        let outcome = match &self.script {
            Script::Respond(body) => Some(Ok(body.clone())),
            Script::Fail(status) => Some(Err(Error::from(TransportError::Status {
                status: *status,
                body: Bytes::new(),
            }))),
            Script::Abandon => None,
        };

        std::thread::spawn(move || match outcome {
            Some(outcome) => completion.complete(outcome),
            None => drop(completion),
        });
    }

    fn decode<O>(&self, _: &Route, response: Bytes) -> Result<O, DecodingError>
    where
        O: DeserializeOwned,
    {
        self.decoded.fetch_add(1, Ordering::SeqCst);
        serde_json::from_slice(&response).map_err(DecodingError::new)
    }
}

impl SharedService for ScriptedService {
    fn shared() -> Result<Arc<Self>, Error> {
        static SHARED: OnceLock<Arc<ScriptedService>> = OnceLock::new();
        Ok(Arc::clone(SHARED.get_or_init(|| {
            Arc::new(ScriptedService::responding(br#"{"id":7,"name":"x"}"#))
        })))
    }
}

/// Service whose default instance can never be created
pub(crate) struct UnavailableService;

impl Service for UnavailableService {
    fn encode<I>(&self, _: &Route, _: &I) -> Result<Bytes, EncodingError>
    where
        I: Serialize + ?Sized,
    {
        unreachable!("UnavailableService is never instantiated")
    }

    fn perform(&self, _: Route, _: Option<Bytes>, _: Completion<Bytes>) {
        unreachable!("UnavailableService is never instantiated")
    }

    fn decode<O>(&self, _: &Route, _: Bytes) -> Result<O, DecodingError>
    where
        O: DeserializeOwned,
    {
        unreachable!("UnavailableService is never instantiated")
    }
}

impl SharedService for UnavailableService {
    fn shared() -> Result<Arc<Self>, Error> {
        Err(Error::Runtime("no default service configured".into()))
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct UserId {
    pub id: u32,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub(crate) struct User {
    pub id: u32,
    pub name: String,
}

/// Input refusing to be serialized
pub(crate) struct Unserializable;

impl Serialize for Unserializable {
    fn serialize<S: Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
        Err(S::Error::custom("refusing to serialize"))
    }
}

pub(crate) struct Ping;

impl Endpoint for Ping {
    type Service = ScriptedService;
    type Shape = Empty;
    const METHOD: Method = Method::HEAD;

    fn path(&self) -> Cow<'_, str> {
        Cow::Borrowed("/ping")
    }
}

pub(crate) struct CreateUser;

impl Endpoint for CreateUser {
    type Service = ScriptedService;
    type Shape = In<UserId>;
    const METHOD: Method = Method::POST;

    fn path(&self) -> Cow<'_, str> {
        Cow::Borrowed("/users")
    }
}

pub(crate) struct Upload;

impl Endpoint for Upload {
    type Service = ScriptedService;
    type Shape = In<Unserializable>;
    const METHOD: Method = Method::POST;

    fn path(&self) -> Cow<'_, str> {
        Cow::Borrowed("/uploads")
    }
}

pub(crate) struct GetUser {
    pub id: u32,
}

impl Endpoint for GetUser {
    type Service = ScriptedService;
    type Shape = Out<User>;
    const METHOD: Method = Method::GET;

    fn path(&self) -> Cow<'_, str> {
        Cow::Owned(format!("/users/{}", self.id))
    }
}

pub(crate) struct RenameUser {
    pub id: u32,
}

impl Endpoint for RenameUser {
    type Service = ScriptedService;
    type Shape = InOut<User, User>;
    const METHOD: Method = Method::PUT;

    fn path(&self) -> Cow<'_, str> {
        Cow::Owned(format!("/users/{}", self.id))
    }
}

pub(crate) struct Unavailable;

impl Endpoint for Unavailable {
    type Service = UnavailableService;
    type Shape = Empty;
    const METHOD: Method = Method::DELETE;

    fn path(&self) -> Cow<'_, str> {
        Cow::Borrowed("/")
    }
}
