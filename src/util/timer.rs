use std::time::Instant;

use blogly_web::plug::{Conn, Plug};

/// Stamps each request with its arrival time, and logs the method,
/// path, status, and elapsed time just before the response goes out.
pub struct RequestTimer;

/// Extension key holding the time a request entered the pipeline
struct RequestStart(Instant);

/// Runs in the before-send phase, after every other plug has had its say.
struct LogResponseTime;

impl Plug for RequestTimer {
    fn call(&self, conn: &mut Conn) {
        conn.req_mut().mut_extensions().insert(RequestStart(Instant::now()));
        conn.register_before_send(LogResponseTime);
    }
}

impl Plug for LogResponseTime {
    fn call(&self, conn: &mut Conn) {
        let elapsed = match conn.req().extensions().find::<RequestStart>() {
            Some(&RequestStart(start)) => start.elapsed(),
            None => {
                warn!("response timer was never started");
                return;
            },
        };

        let millis = elapsed.as_secs_f64() * 1000.0;
        info!("{} {} -> {} in {:.3}ms", conn.req().method(), conn.req().path(), conn.status(), millis);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blogly_web::{OwnedRequest, Pipeline};
    use conduit::{Handler, Method};

    fn teapot(conn: &mut Conn) { conn.send_resp(418, "short and stout") }

    #[test]
    fn test_timer_leaves_response_alone() {
        let mut pipeline = Pipeline::new();
        pipeline.register(RequestTimer).register(teapot);

        let mut req = OwnedRequest::new(Method::Get, "/users");
        let resp = Handler::call(&pipeline, &mut req).unwrap();
        assert_eq!(resp.status.0, 418);
        assert!(req_has_start(&req));
    }

    fn req_has_start(req: &OwnedRequest) -> bool {
        use conduit::Request;
        req.extensions().find::<RequestStart>().is_some()
    }
}
