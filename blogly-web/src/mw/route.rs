use std::collections::HashMap;

use crate::mw::regexp::Expression;
use crate::plug::{Conn, Plug};

/// Path parameters bound by the route that matched the request.
pub type MatchContext = HashMap<String, String>;

/// A compiled path template and the plug which handles requests matching it.
pub struct Route {
    matcher: Expression,
    handler: Box<dyn Plug>,
}

impl Route {
    /// Fails if `template` is not valid, see `Expression::from_template`.
    pub fn new<P: Plug>(template: &str, handler: P) -> Result<Route, String> {
        Ok(Route {
            matcher: Expression::from_template(template)?,
            handler: Box::new(handler),
        })
    }

    pub fn matches(&self, path: &str) -> bool {
        self.matcher.is_match(path)
    }

    /// The parameters bound by `path`, empty if it does not match.
    pub fn get_context(&self, path: &str) -> MatchContext {
        self.matcher.map_path(path)
    }

    /// Stores parameters from the matched route into the request's environment,
    /// then hands the connection to the route's plug.
    pub fn invoke_handler(&self, conn: &mut Conn) {
        let context = self.get_context(conn.req().path());
        conn.req_mut().mut_extensions().insert::<MatchContext>(context);
        self.handler.call(conn)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::request::OwnedRequest;
    use conduit::Method;

    struct EchoId;

    impl Plug for EchoId {
        fn call(&self, conn: &mut Conn) {
            let id = conn.req().extensions().find::<MatchContext>()
                .and_then(|ctx| ctx.get("id").cloned())
                .unwrap_or_default();

            conn.send_resp(200, &id);
        }
    }

    #[test]
    fn test_route_matches() {
        let route = Route::new("/foo/{bar}/{baz}", EchoId).unwrap();
        assert!(route.matches("/foo/hello/test"));
    }

    #[test]
    fn test_route_matches_not_greedy() {
        let route = Route::new("/foo/{bar}/{baz}/quux", EchoId).unwrap();
        assert!(!route.matches("/foo/hello/test"));
    }

    #[test]
    fn test_invoke_stores_context() {
        let route = Route::new("/users/{id}/edit", EchoId).unwrap();
        let mut req = OwnedRequest::new(Method::Get, "/users/42/edit");
        let mut conn = Conn::new(&mut req);

        route.invoke_handler(&mut conn);
        assert!(conn.is_sent());
        assert_eq!(conn.req().extensions().find::<MatchContext>().unwrap()["id"], "42");
    }
}
