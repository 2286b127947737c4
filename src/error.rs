use std::{error, fmt, io};

#[derive(Debug)]
pub enum Error {
    Io(io::Error),
    Json(serde_json::Error),
    Http(hyper::Error),
    Request(http::Error),
    InvalidUri(http::uri::InvalidUri),
    Rpc(String),
    Store(String),
    InvalidHead(String),
    MissingCache(u64),
    InvalidPlan(String),
    PlanMismatch { stored: String, configured: String },
    RetriesExhausted { index: u64, attempts: u32 },
    CeilingUnavailable { attempts: u32 },
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Error {
        Error::Json(err)
    }
}

impl From<hyper::Error> for Error {
    fn from(err: hyper::Error) -> Error {
        Error::Http(err)
    }
}

impl From<http::Error> for Error {
    fn from(err: http::Error) -> Error {
        Error::Request(err)
    }
}

impl From<http::uri::InvalidUri> for Error {
    fn from(err: http::uri::InvalidUri) -> Error {
        Error::InvalidUri(err)
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> io::Error {
        io::Error::new(io::ErrorKind::Other, format!("{}", err))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "io error: {}", err),
            Error::Json(err) => write!(f, "json error: {}", err),
            Error::Http(err) => write!(f, "http error: {}", err),
            Error::Request(err) => write!(f, "can not build request: {}", err),
            Error::InvalidUri(err) => write!(f, "invalid rpc url: {}", err),
            Error::Rpc(message) => write!(f, "rpc error: {}", message),
            Error::Store(message) => write!(f, "store error: {}", message),
            Error::InvalidHead(content) => write!(f, "head file is not a batch index: {:?}", content),
            Error::MissingCache(index) => write!(f, "no cached payload for batch {}", index),
            Error::InvalidPlan(reason) => write!(f, "invalid batch plan: {}", reason),
            Error::PlanMismatch { stored, configured } => write!(
                f,
                "checkpoint was written for plan {} but {} is configured",
                stored, configured
            ),
            Error::RetriesExhausted { index, attempts } => {
                write!(f, "batch {} failed {} times, giving up", index, attempts)
            }
            Error::CeilingUnavailable { attempts } => {
                write!(f, "last irreversible block lookup failed {} times, giving up", attempts)
            }
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Json(err) => Some(err),
            Error::Http(err) => Some(err),
            Error::Request(err) => Some(err),
            Error::InvalidUri(err) => Some(err),
            _ => None,
        }
    }
}
