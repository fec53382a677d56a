pub use blogly_web::mw::{FormData, Router};
pub use blogly_web::plug::{Conn, Plug};
pub use conduit::Method;
pub use serde::Serialize;

pub use crate::error::{Error, Result};
pub use crate::models::queries;
pub use crate::util::db;

use crate::views;

/// Adapts a fallible controller action into a `Plug`.
///
/// An action which returns `Err` before responding gets a plain-text
/// `500 Internal Server Error`; constraint violations are logged as
/// warnings, everything else as errors.
pub struct Action(pub fn(&mut Conn) -> Result<()>);

impl Plug for Action {
    fn call(&self, conn: &mut Conn) {
        let err = match (self.0)(conn) {
            Ok(()) => return,
            Err(err) => err,
        };

        if err.is_unique_violation() {
            warn!("{} {} rejected: {}", conn.req().method(), conn.req().path(), err);
        } else {
            error!("{} {} failed: {}", conn.req().method(), conn.req().path(), err);
        }

        if conn.is_sent() { return }

        conn.put_resp_header("content-type", "text/plain; charset=utf-8");
        conn.send_resp(500, &format!("internal server error: {}", err));
    }
}

/// True if the request is a form submission rather than a page load
pub fn is_submit(conn: &Conn) -> bool {
    conn.req().method() == Method::Post
}

fn form<'a>(conn: &'a Conn<'_>) -> Option<&'a FormData> {
    conn.req().extensions().find::<FormData>()
}

/// The submitted value of `name`, as sent. Only an absent field is an error.
pub fn required_field(conn: &Conn, name: &'static str) -> Result<String> {
    form(conn)
        .and_then(|form| form.get(name))
        .map(str::to_string)
        .ok_or(Error::MissingField(name))
}

/// The submitted value of `name`, or `None` if it is absent or blank.
pub fn optional_field(conn: &Conn, name: &str) -> Option<String> {
    form(conn)
        .and_then(|form| form.get(name))
        .filter(|value| !value.trim().is_empty())
        .map(str::to_string)
}

/// Every non-blank value submitted for `name`
pub fn field_values(conn: &Conn, name: &str) -> Vec<String> {
    form(conn)
        .map(|form| form.get_all(name))
        .unwrap_or_default()
        .into_iter()
        .filter(|value| !value.trim().is_empty())
        .map(str::to_string)
        .collect()
}

/// True if a checkbox named `name` was ticked
pub fn is_checked(conn: &Conn, name: &str) -> bool {
    form(conn).map_or(false, |form| form.contains(name))
}

/// Renders `template` into the main layout and sends it as `200 OK`
pub fn render<T: Serialize>(conn: &mut Conn, template: &str, title: &str, data: &T) -> Result<()> {
    render_status(conn, 200, template, title, data)
}

pub fn render_status<T>(conn: &mut Conn, status: u16, template: &str, title: &str, data: &T) -> Result<()>
where T: Serialize {
    let html = views::render_into(conn.req(), views::MAIN_LAYOUT, template, title, data)?;
    conn.send_html(status, &html);
    Ok(())
}

/// Redirects away from a record which could not be found.
pub fn redirect_missing(conn: &mut Conn, location: &str) -> Result<()> {
    debug!("no record for {}, redirecting to {}", conn.req().path(), location);
    conn.redirect(location);
    Ok(())
}

/// Parses the `{id}` path parameter; `None` if it is absent or not a number.
pub fn id_param(conn: &Conn) -> Option<i32> {
    Router::param::<i32>(conn, "id")
}
