use std::collections::HashMap;
use std::error::Error;
use std::fs::File;
use std::io::{self, Cursor};
use std::mem;
use std::path::Path;

use conduit::{Handler, Request, Response};

use crate::util;

type HeaderMap = HashMap<String, Vec<String>>;

/// Whether a response body has been written yet
#[derive(Debug, Eq, PartialEq)]
enum RespState {
    Waiting,
    Sent,
}

/// One step of request handling.
///
/// A plug either answers the request (e.g: a controller action, a static
/// file) or leaves something behind in the request extensions for the
/// plugs after it (e.g: a database pool, parsed form fields).
///
/// The server shares one pipeline between its worker threads, so plugs
/// must be `Send + Sync`.
///
pub trait Plug: Send + Sync + 'static {
    fn call(&self, conn: &mut Conn);
}

/// A request paired with the response being built for it.
///
/// The response (status, headers, body) is buffered here until the whole
/// pipeline has run; only then is it handed back to the server.
pub struct Conn<'r> {
    is_halting: bool,
    state: RespState,
    status_code: u16,
    headers: HeaderMap,
    resp: Cursor<Vec<u8>>,

    req: &'r mut dyn Request,
    callbacks: Vec<Box<dyn Plug>>,
}

impl<'r> Conn<'r> {
    pub fn new(req: &'r mut dyn Request) -> Self {
        Conn {
            state:        RespState::Waiting,
            status_code:  200,
            headers:      HashMap::new(),
            resp:         Cursor::new(vec![]),

            is_halting:  false,
            req,
            callbacks:   vec![],
        }
    }

    /// Halts the current pipeline, further plugs will not be run.
    pub fn halt(&mut self) { self.is_halting = true; }

    /// Registers a callback to be fired before the response is sent.
    pub fn register_before_send<P: Plug>(&mut self, callback: P) {
        self.callbacks.push(Box::new(callback));
    }

    /// Adds a value for `name` to the response headers.
    pub fn put_resp_header(&mut self, name: &str, value: &str) {
        self.headers.entry(name.to_lowercase())
            .or_insert_with(Vec::new)
            .push(value.to_string());
    }

    pub fn send_file<P>(&mut self, status: u16, path: P)
    where P: AsRef<Path> + ::std::fmt::Debug {
        assert_eq!(self.state, RespState::Waiting);

        let copied = File::open(&path)
            .and_then(|mut file| io::copy(&mut file, &mut self.resp));

        match copied {
            Ok(_size) => self.status_code = status,
            Err(msg) => {
                warn!("could not open file {:?} for response: {}", path, msg);
                self.resp = Cursor::new(b"unexpected server error: could not open file.".to_vec());
                self.headers.remove("content-type");
                self.status_code = 500;
            },
        }

        self.state = RespState::Sent;
    }

    /// Buffers `body` as the response. A `Conn` can only be sent once,
    /// sending a second response panics.
    pub fn send_resp(&mut self, status: u16, body: &str) {
        assert_eq!(self.state, RespState::Waiting);

        self.resp.get_mut().extend_from_slice(body.as_bytes());

        self.status_code = status;
        self.state = RespState::Sent;
    }

    /// Sends `body` as `text/html`
    pub fn send_html(&mut self, status: u16, body: &str) {
        self.put_resp_header("content-type", "text/html; charset=utf-8");
        self.send_resp(status, body);
    }

    /// Sends a `302 Found` pointing the client at `location`
    pub fn redirect(&mut self, location: &str) {
        self.put_resp_header("location", location);
        self.send_html(302, &format!("<a href=\"{0}\">{0}</a>", location));
    }

    pub fn is_sent(&self) -> bool { self.state == RespState::Sent }

    pub fn status(&self) -> u16 { self.status_code }

    pub fn req(&self) -> &dyn Request { &*self.req }

    pub fn req_mut(&mut self) -> &mut dyn Request { &mut *self.req }
}

/// An ordered list of plugs which together answer a request.
///
/// If every plug runs and none of them sends a response the client gets
/// `500 no handler found`, so the last plug should always respond (a
/// router with a fallback does).
#[derive(Default)]
pub struct Pipeline {
    stack: Vec<Box<dyn Plug>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Pipeline { stack: vec![] }
    }

    /// Appends `plug`, it will run after every plug registered so far.
    pub fn register<P: Plug>(&mut self, plug: P) -> &mut Self {
        self.stack.push(Box::new(plug));
        self
    }
}

impl Handler for Pipeline {
    /// Runs each plug until one halts, then the before-send callbacks in
    /// registration order, then hands the buffered response to conduit.
    fn call(&self, req: &mut dyn Request) -> Result<Response, Box<dyn Error + Send>> {
        let mut conn = Conn::new(req);
        for plug in &self.stack {
            plug.call(&mut conn);
            if conn.is_halting { break; }
        }

        if !conn.is_sent() {
            error!("pipeline for {} did not generate a response", conn.req().path());
            conn.send_resp(500, "no handler found");
        }

        let callbacks = mem::take(&mut conn.callbacks);
        for callback in &callbacks { callback.call(&mut conn); }

        conn.resp.set_position(0);
        Ok(Response {
            status: (conn.status_code as u32, util::reason_phrase(conn.status_code)),
            headers: conn.headers,
            body: Box::new(conn.resp),
        })
    }
}

impl Plug for Pipeline {
    /// Nested pipelines run their plugs in order, stopping early if one halts.
    /// Before-send callbacks are left for the outermost pipeline.
    fn call(&self, conn: &mut Conn) {
        for plug in &self.stack {
            plug.call(conn);
            if conn.is_halting { break; }
        }
    }
}

impl<F> Plug for F
where F: Send + Sync + 'static + Fn(&mut Conn) {
    fn call(&self, conn: &mut Conn) { (*self)(conn) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::OwnedRequest;
    use crate::util::read_body;
    use conduit::Method;

    fn hello(conn: &mut Conn) { conn.send_html(200, "hello") }

    fn first_header(conn: &mut Conn) { conn.put_resp_header("x-first", "1") }

    fn no_content(conn: &mut Conn) { conn.send_resp(204, ""); conn.halt() }

    fn never(conn: &mut Conn) { conn.send_resp(418, "should have halted") }

    fn to_users(conn: &mut Conn) { conn.redirect("/users") }

    fn gone(conn: &mut Conn) { conn.send_resp(404, "gone") }

    fn stamp_status(conn: &mut Conn) { conn.register_before_send(Stamp) }

    struct Stamp;

    impl Plug for Stamp {
        fn call(&self, conn: &mut Conn) {
            let status = conn.status().to_string();
            conn.put_resp_header("x-status", &status);
        }
    }

    #[test]
    fn test_pipeline_runs_plugs_in_order() {
        let mut pipeline = Pipeline::new();
        pipeline.register(first_header).register(hello);

        let mut req = OwnedRequest::new(Method::Get, "/");
        let mut resp = Handler::call(&pipeline, &mut req).unwrap();

        assert_eq!(resp.status.0, 200);
        assert_eq!(resp.headers["x-first"], vec!["1".to_string()]);
        assert_eq!(read_body(&mut resp), "hello");
    }

    #[test]
    fn test_halt_skips_remaining_plugs() {
        let mut pipeline = Pipeline::new();
        pipeline.register(no_content).register(never);

        let mut req = OwnedRequest::new(Method::Get, "/");
        let resp = Handler::call(&pipeline, &mut req).unwrap();
        assert_eq!(resp.status, (204, "No Content"));
    }

    #[test]
    fn test_missing_response_is_server_error() {
        let pipeline = Pipeline::new();
        let mut req = OwnedRequest::new(Method::Get, "/nowhere");
        let mut resp = Handler::call(&pipeline, &mut req).unwrap();

        assert_eq!(resp.status.0, 500);
        assert_eq!(read_body(&mut resp), "no handler found");
    }

    #[test]
    fn test_redirect_sets_location() {
        let mut pipeline = Pipeline::new();
        pipeline.register(to_users);

        let mut req = OwnedRequest::new(Method::Get, "/");
        let resp = Handler::call(&pipeline, &mut req).unwrap();
        assert_eq!(resp.status, (302, "Found"));
        assert_eq!(resp.headers["location"], vec!["/users".to_string()]);
    }

    #[test]
    fn test_before_send_sees_final_status() {
        let mut pipeline = Pipeline::new();
        pipeline.register(stamp_status).register(gone);

        let mut req = OwnedRequest::new(Method::Get, "/");
        let resp = Handler::call(&pipeline, &mut req).unwrap();
        assert_eq!(resp.headers["x-status"], vec!["404".to_string()]);
    }
}
