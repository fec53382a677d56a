use std::io::{Cursor, Read};
use std::net::{Ipv4Addr, SocketAddr};

use conduit::{Extensions, Headers, Host, Method, Request, Scheme};
use semver::Version;

/// Request headers, names are stored lowercased.
#[derive(Debug, Default, Clone)]
pub struct HeaderList {
    entries: Vec<(String, String)>,
}

impl HeaderList {
    pub fn push(&mut self, name: &str, value: &str) {
        self.entries.push((name.to_lowercase(), value.to_string()));
    }
}

impl Headers for HeaderList {
    fn find(&self, key: &str) -> Option<Vec<&str>> {
        let key = key.to_lowercase();
        let values = self.entries.iter()
            .filter(|&&(ref name, _)| *name == key)
            .map(|&(_, ref value)| &value[..])
            .collect::<Vec<_>>();

        if values.is_empty() { None } else { Some(values) }
    }

    fn has(&self, key: &str) -> bool {
        let key = key.to_lowercase();
        self.entries.iter().any(|&(ref name, _)| *name == key)
    }

    fn all(&self) -> Vec<(&str, Vec<&str>)> {
        let mut all: Vec<(&str, Vec<&str>)> = vec![];
        for &(ref name, ref value) in &self.entries {
            match all.iter_mut().find(|&&mut (seen, _)| seen == &name[..]) {
                Some(&mut (_, ref mut values)) => values.push(&value[..]),
                None => all.push((&name[..], vec![&value[..]])),
            }
        }

        all
    }
}

/// A fully buffered request which owns its body and extension storage.
///
/// The server builds one of these per incoming hyper request so that the
/// synchronous pipeline never touches the network. Tests build them
/// directly to drive a pipeline without a socket.
pub struct OwnedRequest {
    method: Method,
    version: Version,
    path: String,
    query: Option<String>,
    remote_addr: SocketAddr,
    headers: HeaderList,
    body: Cursor<Vec<u8>>,
    extensions: Extensions,
}

impl OwnedRequest {
    /// `uri` may carry a query string, e.g: `/users?sort=asc`
    pub fn new(method: Method, uri: &str) -> Self {
        let (path, query) = match uri.find('?') {
            Some(idx) => (&uri[..idx], Some(uri[idx + 1..].to_string())),
            None => (uri, None),
        };

        OwnedRequest {
            method,
            version: http_version(1, 1),
            path: path.to_string(),
            query,
            remote_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 0)),
            headers: HeaderList::default(),
            body: Cursor::new(vec![]),
            extensions: Extensions::new(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push(name, value);
        self
    }

    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = Cursor::new(body);
        self
    }

    /// Attaches `pairs` as an `application/x-www-form-urlencoded` body.
    pub fn with_form(self, pairs: &[(&str, &str)]) -> Self {
        let encoded = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish();

        self.with_header("content-type", "application/x-www-form-urlencoded")
            .with_body(encoded.into_bytes())
    }

    pub fn with_remote_addr(mut self, addr: SocketAddr) -> Self {
        self.remote_addr = addr;
        self
    }

    pub fn with_version(mut self, major: u64, minor: u64) -> Self {
        self.version = http_version(major, minor);
        self
    }
}

fn http_version(major: u64, minor: u64) -> Version {
    Version { major, minor, patch: 0, pre: vec![], build: vec![] }
}

/// Maps a method token onto conduit's method enumeration.
pub fn parse_method(token: &str) -> Method {
    match token {
        "GET"     => Method::Get,
        "POST"    => Method::Post,
        "PUT"     => Method::Put,
        "DELETE"  => Method::Delete,
        "HEAD"    => Method::Head,
        "CONNECT" => Method::Connect,
        "OPTIONS" => Method::Options,
        "TRACE"   => Method::Trace,
        "PATCH"   => Method::Patch,
        "PURGE"   => Method::Purge,
        other     => Method::Other(other.to_string()),
    }
}

impl Request for OwnedRequest {
    fn http_version(&self) -> Version { self.version.clone() }

    fn conduit_version(&self) -> Version { http_version(0, 1) }

    fn method(&self) -> Method { self.method.clone() }

    fn scheme(&self) -> Scheme { Scheme::Http }

    fn host(&self) -> Host<'_> {
        match self.headers.find("host").and_then(|hosts| hosts.into_iter().next()) {
            Some(name) => Host::Name(name),
            None => Host::Socket(self.remote_addr),
        }
    }

    fn virtual_root(&self) -> Option<&str> { None }

    fn path(&self) -> &str { &self.path }

    fn query_string(&self) -> Option<&str> { self.query.as_ref().map(|q| &q[..]) }

    fn remote_addr(&self) -> SocketAddr { self.remote_addr }

    fn content_length(&self) -> Option<u64> { Some(self.body.get_ref().len() as u64) }

    fn headers(&self) -> &dyn Headers { &self.headers }

    fn body(&mut self) -> &mut dyn Read { &mut self.body }

    fn extensions(&self) -> &Extensions { &self.extensions }

    fn mut_extensions(&mut self) -> &mut Extensions { &mut self.extensions }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splits_query_string() {
        let req = OwnedRequest::new(Method::Get, "/users?sort=asc");
        assert_eq!(req.path(), "/users");
        assert_eq!(req.query_string(), Some("sort=asc"));
    }

    #[test]
    fn test_headers_are_case_insensitive() {
        let req = OwnedRequest::new(Method::Get, "/")
            .with_header("Content-Type", "text/plain")
            .with_header("X-Tag", "a")
            .with_header("x-tag", "b");

        assert!(req.headers().has("content-type"));
        assert_eq!(req.headers().find("CONTENT-TYPE"), Some(vec!["text/plain"]));
        assert_eq!(req.headers().find("x-tag"), Some(vec!["a", "b"]));
        assert_eq!(req.headers().all().len(), 2);
    }

    #[test]
    fn test_form_body_is_encoded() {
        let mut req = OwnedRequest::new(Method::Post, "/users/new")
            .with_form(&[("first", "Jake"), ("last", "State Farm")]);

        let mut body = String::new();
        req.body().read_to_string(&mut body).unwrap();
        assert_eq!(body, "first=Jake&last=State+Farm");
        assert_eq!(req.content_length(), Some(body.len() as u64));
    }

    #[test]
    fn test_parse_method() {
        assert_eq!(parse_method("GET"), Method::Get);
        assert_eq!(parse_method("POST"), Method::Post);
        assert_eq!(parse_method("BREW"), Method::Other("BREW".to_string()));
    }
}
