//! Crate error type
//!
//! Every fallible operation in the library returns [`Result`]. Commands sent to
//! entities that have already died are not errors; see `sim::Outcome::Ignored`.

use std::fmt;

use crate::sim::EntityId;

#[derive(Debug)]
pub enum Error {
    /// SVG path instructions could not be parsed
    PathParse {
        path_id: String,
        offset: usize,
        reason: &'static str,
    },
    /// No entity (live or dead) with this id
    UnknownEntity(EntityId),
    /// No path with this id in the path table
    UnknownPath(String),
    /// The entity's kind does not carry the attribute a command needs
    MissingAttribute {
        id: EntityId,
        attribute: &'static str,
    },
    /// Settings failed validation
    InvalidSettings(String),
    /// Settings file could not be read
    Io(std::io::Error),
    /// Settings or snapshot JSON was malformed
    Json(serde_json::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PathParse {
                path_id,
                offset,
                reason,
            } => write!(f, "path '{path_id}': {reason} at byte {offset}"),
            Self::UnknownEntity(id) => write!(f, "unknown entity {id}"),
            Self::UnknownPath(id) => write!(f, "unknown path '{id}'"),
            Self::MissingAttribute { id, attribute } => {
                write!(f, "entity {id} has no {attribute} attribute")
            }
            Self::InvalidSettings(msg) => write!(f, "invalid settings: {msg}"),
            Self::Io(e) => write!(f, "settings i/o: {e}"),
            Self::Json(e) => write!(f, "json: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
