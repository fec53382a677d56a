use std::path::PathBuf;

use blogly_web::plug::{Conn, Plug};
use conduit::Method;

static STATIC_PREFIX: &str = "/static/";

/// This plug attempts to serve a static file from the static root
/// for any `GET /static/*` request.
///
/// If the file is found the response is sent and the pipeline is halted;
/// otherwise the request continues down the pipeline untouched.
pub struct TryFile {
    root: PathBuf,
}

impl TryFile {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        TryFile { root: root.into() }
    }

    /// Maps a request path onto the static root, refusing anything that
    /// could climb out of it.
    fn resolve(&self, path: &str) -> Option<PathBuf> {
        let relative = path.strip_prefix(STATIC_PREFIX)?;

        if relative.is_empty() || relative.contains("./") || relative.contains("..") || relative.contains('\\') {
            return None;
        }

        Some(self.root.join(relative))
    }
}

impl Plug for TryFile {
    fn call(&self, conn: &mut Conn) {
        if conn.req().method() != Method::Get { return }

        let try_path = match self.resolve(conn.req().path()) {
            Some(path) => path,
            None => return,
        };

        if !try_path.is_file() {
            debug!("no static file at {:?}", try_path);
            return;
        }

        let mime_type = mime_guess::from_path(&try_path).first_or_octet_stream();
        conn.put_resp_header("content-type", mime_type.as_ref());
        conn.send_file(200, &try_path);
        conn.halt();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blogly_web::util::read_body;
    use blogly_web::{OwnedRequest, Pipeline};
    use conduit::Handler;
    use std::fs;
    use tempfile::TempDir;

    fn fall_through(conn: &mut Conn) { conn.send_resp(404, "not static") }

    fn serve(root: &TempDir, method: Method, path: &str) -> (u32, Option<String>, String) {
        let mut pipeline = Pipeline::new();
        pipeline.register(TryFile::new(root.path())).register(fall_through);

        let mut req = OwnedRequest::new(method, path);
        let mut resp = Handler::call(&pipeline, &mut req).unwrap();
        let content_type = resp.headers.get("content-type").map(|values| values[0].clone());

        (resp.status.0, content_type, read_body(&mut resp))
    }

    #[test]
    fn test_serves_existing_file() {
        let root = TempDir::new().unwrap();
        fs::write(root.path().join("app.css"), "body { margin: 0 }").unwrap();

        let (status, content_type, body) = serve(&root, Method::Get, "/static/app.css");
        assert_eq!(status, 200);
        assert_eq!(content_type.as_deref(), Some("text/css"));
        assert_eq!(body, "body { margin: 0 }");
    }

    #[test]
    fn test_missing_file_falls_through() {
        let root = TempDir::new().unwrap();
        let (status, _, body) = serve(&root, Method::Get, "/static/nope.js");
        assert_eq!(status, 404);
        assert_eq!(body, "not static");
    }

    #[test]
    fn test_refuses_traversal() {
        let root = TempDir::new().unwrap();
        fs::create_dir(root.path().join("public")).unwrap();
        fs::write(root.path().join("secret.txt"), "hunter2").unwrap();

        let plug = TryFile::new(root.path().join("public"));
        assert!(plug.resolve("/static/../secret.txt").is_none());
        assert!(plug.resolve("/static/./secret.txt").is_none());
        assert!(plug.resolve("/users/1").is_none());
    }

    #[test]
    fn test_only_answers_get() {
        let root = TempDir::new().unwrap();
        fs::write(root.path().join("app.css"), "body {}").unwrap();

        let (status, _, _) = serve(&root, Method::Post, "/static/app.css");
        assert_eq!(status, 404);
    }
}
