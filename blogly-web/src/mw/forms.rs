use crate::plug::{Conn, Plug};

static URLENCODED: &str = "application/x-www-form-urlencoded";

/// The decoded fields of an url-encoded request body.
///
/// Keys may repeat (e.g: a group of checkboxes), so fields are kept in
/// submission order rather than in a map.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FormData {
    fields: Vec<(String, String)>,
}

impl FormData {
    pub fn parse(body: &[u8]) -> Self {
        let fields = url::form_urlencoded::parse(body)
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();

        FormData { fields }
    }

    /// The first value submitted for `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.iter()
            .find(|&&(ref name, _)| name == key)
            .map(|&(_, ref value)| &value[..])
    }

    /// Every value submitted for `key`, in submission order
    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.fields.iter()
            .filter(|&&(ref name, _)| name == key)
            .map(|&(_, ref value)| &value[..])
            .collect()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

/// This middleware looks for incoming requests w/ `content-type: application/x-www-form-urlencoded`.
/// The request body is read to completion, decoded, and stored in the request extensions
/// as `FormData`.
///
/// Requests with any other content type are passed along untouched.
pub struct FormParser;

impl Plug for FormParser {
    fn call(&self, conn: &mut Conn) {
        let is_form = conn.req().headers().find("content-type")
            .map(|values| values.iter().any(|value| value.starts_with(URLENCODED)))
            .unwrap_or(false);

        if !is_form { return }

        let mut body = vec![];
        if let Err(err) = conn.req_mut().body().read_to_end(&mut body) {
            warn!("could not read form body: {}", err);
            conn.send_resp(400, "could not read request body");
            conn.halt();
            return
        }

        let form = FormData::parse(&body);
        debug!("decoded {} form fields", form.fields.len());
        conn.req_mut().mut_extensions().insert::<FormData>(form);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::OwnedRequest;
    use conduit::Method;

    #[test]
    fn test_parse_repeated_keys() {
        let form = FormData::parse(b"title=Hello+World&tags=rust&tags=web&content=");

        assert_eq!(form.get("title"), Some("Hello World"));
        assert_eq!(form.get_all("tags"), vec!["rust", "web"]);
        assert_eq!(form.get("content"), Some(""));
        assert!(!form.contains("missing"));
    }

    #[test]
    fn test_parser_stores_form() {
        let mut req = OwnedRequest::new(Method::Post, "/tags/new")
            .with_form(&[("name", "rust & friends")]);

        let mut conn = Conn::new(&mut req);
        FormParser.call(&mut conn);

        let form = conn.req().extensions().find::<FormData>().unwrap();
        assert_eq!(form.get("name"), Some("rust & friends"));
    }

    #[test]
    fn test_parser_ignores_other_bodies() {
        let mut req = OwnedRequest::new(Method::Post, "/upload")
            .with_header("content-type", "text/plain")
            .with_body(b"name=nope".to_vec());

        let mut conn = Conn::new(&mut req);
        FormParser.call(&mut conn);

        assert!(conn.req().extensions().find::<FormData>().is_none());
        assert!(!conn.is_sent());
    }
}
