use std::convert::Infallible;
use std::io;
use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::Arc;

use bytes::Bytes;
use conduit::Handler;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::http::request::Parts;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{StatusCode, Version};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;

use crate::request::{parse_method, OwnedRequest};
use crate::result::Result;

/// A response which has been fully written out by the handler.
struct Buffered {
    status: u16,
    headers: Vec<(String, Vec<String>)>,
    body: Vec<u8>,
}

/// Serves a `conduit::Handler` over HTTP/1.1.
///
/// The listener and connections are driven by a tokio runtime owned by the
/// server. Request bodies are buffered in full, then each request is handed
/// to the handler on tokio's blocking pool since conduit handlers are
/// synchronous.
///
pub struct Server {
    addr: SocketAddr,
}

impl Server {
    /// Resolves `addr` to the socket the server will listen on.
    pub fn http<A: ToSocketAddrs>(addr: A) -> Result<Server> {
        let addr = addr.to_socket_addrs()?
            .next()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "no address to bind"))?;

        Ok(Server { addr })
    }

    /// Runs the server until the listener fails.
    pub fn handle<H: Handler>(self, handler: H) -> Result<()> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;

        runtime.block_on(serve(self.addr, Arc::new(handler)))
    }
}

async fn serve<H: Handler>(addr: SocketAddr, handler: Arc<H>) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("listening on http://{}", listener.local_addr()?);

    loop {
        let (stream, remote_addr) = listener.accept().await?;
        let handler = handler.clone();

        tokio::spawn(async move {
            let service = service_fn(move |req| dispatch(handler.clone(), remote_addr, req));
            let io = TokioIo::new(stream);

            if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                debug!("connection from {} closed: {}", remote_addr, err);
            }
        });
    }
}

async fn dispatch<H: Handler>(
    handler: Arc<H>,
    remote_addr: SocketAddr,
    req: hyper::Request<Incoming>,
) -> ::std::result::Result<hyper::Response<Full<Bytes>>, Infallible> {
    let (parts, body) = req.into_parts();
    let body = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(err) => {
            warn!("could not read body from {}: {}", remote_addr, err);
            return Ok(plain(StatusCode::BAD_REQUEST, "could not read request body"));
        },
    };

    let outcome = tokio::task::spawn_blocking(move || {
        let mut req = owned_request(parts, body, remote_addr);
        run_handler(&*handler, &mut req)
    }).await;

    let response = match outcome {
        Ok(Ok(buffered)) => into_response(buffered),
        Ok(Err(msg)) => {
            error!("handler failed: {}", msg);
            plain(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
        },

        Err(err) => {
            error!("handler panicked: {}", err);
            plain(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
        },
    };

    Ok(response)
}

fn owned_request(parts: Parts, body: Bytes, remote_addr: SocketAddr) -> OwnedRequest {
    let uri = parts.uri.path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    let (major, minor) = if parts.version == Version::HTTP_10 {
        (1, 0)
    } else if parts.version == Version::HTTP_2 {
        (2, 0)
    } else {
        (1, 1)
    };

    let mut req = OwnedRequest::new(parse_method(parts.method.as_str()), uri)
        .with_version(major, minor)
        .with_remote_addr(remote_addr)
        .with_body(body.to_vec());

    for (name, value) in parts.headers.iter() {
        match value.to_str() {
            Ok(value) => req = req.with_header(name.as_str(), value),
            Err(_) => debug!("dropping non-ascii header {}", name),
        }
    }

    req
}

/// Calls the handler and writes its response body out to memory.
fn run_handler<H: Handler>(handler: &H, req: &mut OwnedRequest) -> ::std::result::Result<Buffered, String> {
    let mut resp = handler.call(req).map_err(|err| err.to_string())?;

    let mut body = vec![];
    resp.body.write_body(&mut body)
        .map_err(|err| format!("could not write response body: {}", err))?;

    Ok(Buffered {
        status: resp.status.0 as u16,
        headers: resp.headers.into_iter().collect(),
        body,
    })
}

fn into_response(buffered: Buffered) -> hyper::Response<Full<Bytes>> {
    let mut builder = hyper::Response::builder().status(buffered.status);
    for (name, values) in &buffered.headers {
        for value in values {
            builder = builder.header(&name[..], &value[..]);
        }
    }

    builder.body(Full::new(Bytes::from(buffered.body)))
        .unwrap_or_else(|err| {
            error!("handler produced an invalid response: {}", err);
            plain(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
        })
}

fn plain(status: StatusCode, body: &'static str) -> hyper::Response<Full<Bytes>> {
    let mut resp = hyper::Response::new(Full::new(Bytes::from_static(body.as_bytes())));
    *resp.status_mut() = status;
    resp
}
