use std::error::Error as StdError;
use std::fmt;
use std::io;

pub type Result<T> = ::std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    /// A plug asked for an extension no earlier plug inserted
    ExtNotAvailable(&'static str),
    Io(io::Error),
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match *self {
            Error::Io(ref err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::ExtNotAvailable(ext) => write!(f, "no {} in the request extensions, \
                                                     is the plug providing it registered earlier in the pipeline?", ext),

            Error::Io(ref err) => write!(f, "server i/o error: {}", err),
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self { Error::Io(err) }
}
