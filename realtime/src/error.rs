//! Error types for the real-time hubs.
use std::error::Error as StdError;
use std::fmt;

/// Errors raised while serving a room connection.
///
/// None of these ever escape a single connection's receive loop: they are
/// logged and the loop either carries on or closes that one connection.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: ErrorKind,
}

#[derive(Debug, PartialEq)]
pub enum ErrorKind {
    /// The socket broke or was closed by the peer.
    Transport,
    /// The frame did not match the room's message shape.
    MalformedFrame,
    /// The store failed to persist the message.
    Persistence,
}

impl Error {
    pub fn new<E>(error_kind: ErrorKind, source: E) -> Self
    where
        E: Into<Box<dyn StdError + Send + Sync>>,
    {
        Self {
            source: Some(source.into()),
            error_kind,
        }
    }

    pub fn persistence<E>(source: E) -> Self
    where
        E: Into<Box<dyn StdError + Send + Sync>>,
    {
        Self::new(ErrorKind::Persistence, source)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.source {
            Some(source) => write!(f, "{:?}: {source}", self.error_kind),
            None => write!(f, "{:?}", self.error_kind),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::new(ErrorKind::MalformedFrame, err)
    }
}
