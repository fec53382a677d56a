use std::collections::HashMap;
use std::str::FromStr;

use conduit::Method;

use crate::mw::route::{MatchContext, Route};
use crate::plug::{Conn, Plug};

type RouteMap = HashMap<Method, Vec<Route>>;

/// A `Router` is a plug which attempts to match an HTTP request's
/// method and path to a corresponding handler.
///
/// Routes are kept per method and tried in the order they were added;
/// the first whose template matches the path wins.
///
/// Requests which match no route are handed to the fallback plug, if one
/// is set, otherwise they receive a bare `404`.
///
#[derive(Default)]
pub struct Router {
    routes: RouteMap,
    fallback: Option<Box<dyn Plug>>,
}

impl Router {
    pub fn new() -> Router {
        Router { routes: HashMap::new(), fallback: None }
    }

    /// Attaches a handler to a given route template.
    ///
    /// Panics if `pattern` is not a valid route template, routes are
    /// fixed at startup so this is a programming error.
    pub fn add_route<P: Plug>(&mut self, method: Method, pattern: &str, handler: P) {
        let route = Route::new(pattern, handler)
            .unwrap_or_else(|err| panic!("bad route {} {}: {}", method, pattern, err));

        self.routes.entry(method)
            .or_insert_with(Vec::new)
            .push(route);
    }

    pub fn get<P: Plug>(mut self, pattern: &str, handler: P) -> Self {
        self.add_route(Method::Get, pattern, handler);
        self
    }

    pub fn post<P: Plug>(mut self, pattern: &str, handler: P) -> Self {
        self.add_route(Method::Post, pattern, handler);
        self
    }

    /// Handles requests for which no route matched.
    pub fn fallback<P: Plug>(mut self, handler: P) -> Self {
        self.fallback = Some(Box::new(handler));
        self
    }

    /// Parses the path parameter `name` bound by the matched route.
    ///
    /// Returns `None` if no route bound `name`, or if it does not parse as `T`.
    pub fn param<T: FromStr>(conn: &Conn, name: &str) -> Option<T> {
        conn.req().extensions().find::<MatchContext>()
            .and_then(|context| context.get(name))
            .and_then(|value| value.parse::<T>().ok())
    }
}

impl Plug for Router {
    fn call(&self, conn: &mut Conn) {
        let method = conn.req().method();
        let route = self.routes.get(&method).and_then(|routes| {
            routes.iter().find(|route| route.matches(conn.req().path()))
        });

        match (route, &self.fallback) {
            (Some(route), _) => route.invoke_handler(conn),
            (None, Some(fallback)) => {
                debug!("no route for {} {}", method, conn.req().path());
                fallback.call(conn)
            },
            (None, None) => conn.send_resp(404, "router error: route not found"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::OwnedRequest;
    use crate::util::read_body;
    use crate::Pipeline;
    use conduit::Handler;

    fn show(conn: &mut Conn) {
        let body = match Router::param::<i32>(conn, "id") {
            Some(id) => format!("show {}", id),
            None => "bad id".to_string(),
        };

        conn.send_resp(200, &body);
    }

    fn new_form(conn: &mut Conn) { conn.send_resp(200, "new form") }

    fn create(conn: &mut Conn) { conn.send_resp(302, "") }

    fn missing(conn: &mut Conn) { conn.send_resp(404, "missing page") }

    fn dispatch(router: Router, method: Method, path: &str) -> (u32, String) {
        let mut pipeline = Pipeline::new();
        pipeline.register(router);

        let mut req = OwnedRequest::new(method, path);
        let mut resp = Handler::call(&pipeline, &mut req).unwrap();
        (resp.status.0, read_body(&mut resp))
    }

    fn users() -> Router {
        Router::new()
            .get("/users/new", new_form)
            .post("/users/new", create)
            .get("/users/{id}", show)
    }

    #[test]
    fn test_first_route_wins() {
        assert_eq!(dispatch(users(), Method::Get, "/users/new"), (200, "new form".to_string()));
        assert_eq!(dispatch(users(), Method::Get, "/users/3"), (200, "show 3".to_string()));
    }

    #[test]
    fn test_routes_are_grouped_by_method() {
        assert_eq!(dispatch(users(), Method::Post, "/users/new").0, 302);
        assert_eq!(dispatch(users(), Method::Post, "/users/3").0, 404);
    }

    #[test]
    fn test_param_parse_failure() {
        assert_eq!(dispatch(users(), Method::Get, "/users/abc"), (200, "bad id".to_string()));
    }

    #[test]
    fn test_fallback() {
        let router = users().fallback(missing);
        assert_eq!(dispatch(router, Method::Get, "/nope"), (404, "missing page".to_string()));
    }
}
