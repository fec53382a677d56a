use crate::controllers::prelude::*;

/// `GET /`
pub fn root(conn: &mut Conn) -> Result<()> {
    conn.redirect("/users");
    Ok(())
}

/// `GET /404`
///
/// Every failed lookup lands here, so it answers `200 OK`.
pub fn not_found(conn: &mut Conn) -> Result<()> {
    render(conn, "errors/not_found", "Not Found", &())
}

/// Renders the not-found page for any request no route matched.
pub fn no_route(conn: &mut Conn) -> Result<()> {
    render_status(conn, 404, "errors/not_found", "Not Found", &())
}
