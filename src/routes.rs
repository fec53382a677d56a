use blogly_web::mw::Router;

use crate::controllers::prelude::Action;
use crate::controllers::{pages, posts, tags, users};

/// Every route the application answers.
///
/// Routes are tried in the order they are added, so the literal
/// `/new` paths must come before the `{id}` routes which would
/// otherwise swallow them.
pub fn router() -> Router {
    Router::new()
        .get("/", Action(pages::root))
        .get("/404", Action(pages::not_found))

        .get("/users", Action(users::index))
        .get("/users/new", Action(users::new))
        .post("/users/new", Action(users::new))
        .get("/users/{id}", Action(users::show))
        .get("/users/{id}/edit", Action(users::edit))
        .post("/users/{id}/edit", Action(users::edit))
        .get("/users/{id}/delete", Action(users::delete))
        .get("/users/{id}/posts/new", Action(posts::new))
        .post("/users/{id}/posts/new", Action(posts::new))

        .get("/posts/{id}", Action(posts::show))
        .get("/posts/{id}/edit", Action(posts::edit))
        .post("/posts/{id}/edit", Action(posts::edit))
        .get("/posts/{id}/delete", Action(posts::delete))

        .get("/tags", Action(tags::index))
        .get("/tags/new", Action(tags::new))
        .post("/tags/new", Action(tags::new))
        .get("/tags/{id}", Action(tags::show))
        .get("/tags/{id}/edit", Action(tags::edit))
        .post("/tags/{id}/edit", Action(tags::edit))
        .get("/tags/{id}/delete", Action(tags::delete))

        .fallback(Action(pages::no_route))
}
