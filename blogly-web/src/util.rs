use std::any::type_name;

use conduit::{Request, Response};
use hyper::StatusCode;

use crate::result::{Error, Result};

/// Canonical reason phrase for `code`, per the IANA registry.
pub fn reason_phrase(code: u16) -> &'static str {
    StatusCode::from_u16(code).ok()
        .and_then(|status| status.canonical_reason())
        .unwrap_or("Unknown")
}

/// Borrows an extension a previous plug stored on the request.
pub fn extension<T: 'static>(req: &dyn Request) -> Result<&T> {
    req.extensions().find::<T>()
        .ok_or(Error::ExtNotAvailable(type_name::<T>()))
}

/// Drains a response body into a string, lossily.
///
/// Meant for tests; panics if the body cannot be written out.
pub fn read_body(resp: &mut Response) -> String {
    let mut buf = vec![];
    resp.body.write_body(&mut buf)
        .expect("could not write response body to buffer");

    String::from_utf8_lossy(&buf).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_phrase() {
        assert_eq!(reason_phrase(200), "OK");
        assert_eq!(reason_phrase(302), "Found");
        assert_eq!(reason_phrase(404), "Not Found");
        assert_eq!(reason_phrase(599), "Unknown");
    }
}
