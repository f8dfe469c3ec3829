use std::convert::From;
use std::error::Error as StdError;

#[derive(Debug)]
pub enum Error {
    IoError(std::io::Error),
    JsonError(serde_json::Error),
    DatabaseError(rusqlite::Error),
    LoggerError(log::SetLoggerError),
    EmptyFile,
    NotAnObject(usize),
    MissingField(&'static str),
    InvalidTimestamp(i64),
    SchemaMismatch,
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error::IoError(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Error {
        Error::JsonError(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Error {
        Error::DatabaseError(err)
    }
}

impl From<log::SetLoggerError> for Error {
    fn from(err: log::SetLoggerError) -> Error {
        Error::LoggerError(err)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            Error::IoError(ref e) => write!(f, "io error: {}", e),
            Error::JsonError(ref e) => write!(f, "json error: {}", e),
            Error::DatabaseError(ref e) => write!(f, "database error: {}", e),
            Error::LoggerError(ref e) => write!(f, "logger error: {}", e),
            Error::EmptyFile => write!(f, "file contains no records"),
            Error::NotAnObject(line) => write!(f, "line {} is not a json object", line),
            Error::MissingField(field) => write!(f, "missing field '{}'", field),
            Error::InvalidTimestamp(ts) => write!(f, "timestamp {} out of range", ts),
            Error::SchemaMismatch => write!(f, "database schema version mismatch"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match *self {
            Error::IoError(ref e) => Some(e),
            Error::JsonError(ref e) => Some(e),
            Error::DatabaseError(ref e) => Some(e),
            Error::LoggerError(ref e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
