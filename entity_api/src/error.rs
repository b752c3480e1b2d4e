//! Error types for entity API
use std::error::Error as StdError;
use std::fmt;

use serde::Serialize;

use sea_orm::error::DbErr;

/// Errors while writing rows through the entity layer.
/// Either the row itself was refused (constraint, nothing inserted) or the
/// database could not be reached at all (connection, pool acquisition).
#[derive(Debug, PartialEq)]
pub struct Error {
    // Underlying error emitted from seaORM internals
    pub source: Option<DbErr>,
    // Enum representing which category of error
    pub error_kind: EntityApiErrorKind,
}

#[derive(Debug, PartialEq, Serialize)]
pub enum EntityApiErrorKind {
    // Insert completed without producing a row
    RecordNotInserted,
    // Row rejected by the database, e.g. a foreign key or check constraint
    RecordRejected,
    // Errors related to interactions with the database itself. Ex DbError::Conn
    SystemError,
    // Other errors
    Other,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Entity API Error: {:?}", self)
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source.as_ref().map(|e| e as &(dyn StdError + 'static))
    }
}

impl From<DbErr> for Error {
    fn from(err: DbErr) -> Self {
        let error_kind = match &err {
            DbErr::RecordNotInserted => EntityApiErrorKind::RecordNotInserted,
            DbErr::Exec(_) | DbErr::Query(_) => match err.sql_err() {
                Some(_) => EntityApiErrorKind::RecordRejected,
                None => EntityApiErrorKind::SystemError,
            },
            DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => EntityApiErrorKind::SystemError,
            _ => EntityApiErrorKind::Other,
        };

        Error {
            source: Some(err),
            error_kind,
        }
    }
}
