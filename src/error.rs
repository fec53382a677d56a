use std::error::Error as StdError;
use std::fmt;

use blogly_web::result::Error as WebError;
use diesel::result::{DatabaseErrorKind, Error as QueryError};

pub type Result<T> = ::std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    /// A required form field was not submitted
    MissingField(&'static str),
    /// A configuration value was missing or malformed
    Config(String),

    DbPoolErr(r2d2::Error),
    DbQueryErr(QueryError),
    MigrationErr(Box<dyn StdError + Send + Sync>),
    TemplateErr(handlebars::TemplateError),
    RenderErr(handlebars::RenderError),
    WebErr(WebError),
}

impl Error {
    /// True if the database rejected a write for violating a UNIQUE constraint.
    pub fn is_unique_violation(&self) -> bool {
        matches!(*self, Error::DbQueryErr(QueryError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)))
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match *self {
            Error::DbPoolErr(ref err)    => Some(err),
            Error::DbQueryErr(ref err)   => Some(err),
            Error::MigrationErr(ref err) => Some(err.as_ref()),
            Error::TemplateErr(ref err)  => Some(err),
            Error::RenderErr(ref err)    => Some(err),
            Error::WebErr(ref err)       => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::MissingField(field) => write!(f, "missing form field: {}", field),
            Error::Config(ref msg)     => write!(f, "configuration error: {}", msg),

            Error::DbPoolErr(ref err)    => write!(f, "could not fetch DB connection from pool: {}", err),
            Error::DbQueryErr(ref err)   => write!(f, "database error: {}", err),
            Error::MigrationErr(ref err) => write!(f, "could not run migrations: {}", err),
            Error::TemplateErr(ref err)  => write!(f, "could not load template: {}", err),
            Error::RenderErr(ref err)    => write!(f, "could not render template: {}", err),
            Error::WebErr(ref err)       => write!(f, "{}", err),
        }
    }
}

impl From<r2d2::Error> for Error {
    fn from(err: r2d2::Error) -> Self { Error::DbPoolErr(err) }
}

impl From<QueryError> for Error {
    fn from(err: QueryError) -> Self { Error::DbQueryErr(err) }
}

impl From<Box<dyn StdError + Send + Sync>> for Error {
    fn from(err: Box<dyn StdError + Send + Sync>) -> Self { Error::MigrationErr(err) }
}

impl From<handlebars::TemplateError> for Error {
    fn from(err: handlebars::TemplateError) -> Self { Error::TemplateErr(err) }
}

impl From<handlebars::RenderError> for Error {
    fn from(err: handlebars::RenderError) -> Self { Error::RenderErr(err) }
}

impl From<WebError> for Error {
    fn from(err: WebError) -> Self { Error::WebErr(err) }
}
