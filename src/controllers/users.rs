use diesel::Connection;

use crate::controllers::prelude::*;
use crate::models::{NewUser, User, UserChanges, DEFAULT_IMAGE_URL};
use crate::views::{post_views, PostView};

#[derive(Serialize)]
struct UserList {
    users: Vec<User>,
}

#[derive(Serialize)]
struct UserPage {
    user: User,
    posts: Vec<PostView>,
    default_image: bool,
}

#[derive(Serialize)]
struct UserForm {
    user: User,
}

/// `GET /users`
pub fn index(conn: &mut Conn) -> Result<()> {
    let mut db = db::checkout(conn)?;
    let users = queries::all_users(&mut db)?;

    render(conn, "users/index", "Users", &UserList { users })
}

/// `GET /users/new` renders the form, `POST /users/new` creates the user.
///
/// Expects the fields `first` and `last`; a blank `image` falls back to
/// the placeholder avatar.
pub fn new(conn: &mut Conn) -> Result<()> {
    if !is_submit(conn) {
        return render(conn, "users/new", "Create a user", &());
    }

    let first = required_field(conn, "first")?;
    let last = required_field(conn, "last")?;
    let image = optional_field(conn, "image");

    let mut db = db::checkout(conn)?;
    let user = queries::insert_user(&mut db, &NewUser {
        first_name: &first,
        last_name: &last,
        image_url: image.as_deref().unwrap_or(DEFAULT_IMAGE_URL),
    })?;

    info!("created user #{}: {}", user.id, user.full_name());
    conn.redirect("/users");
    Ok(())
}

/// `GET /users/{id}`
pub fn show(conn: &mut Conn) -> Result<()> {
    let user_id = match id_param(conn) {
        Some(user_id) => user_id,
        None => return redirect_missing(conn, "/404"),
    };

    let mut db = db::checkout(conn)?;
    let user = match queries::find_user(&mut db, user_id)? {
        Some(user) => user,
        None => return redirect_missing(conn, "/404"),
    };

    let posts = post_views(queries::posts_for_user(&mut db, user.id)?);
    let title = user.full_name();
    let default_image = user.image_url == DEFAULT_IMAGE_URL;

    render(conn, "users/show", &title, &UserPage { user, posts, default_image })
}

/// `GET /users/{id}/edit` renders the form, `POST` applies it.
///
/// Blank fields keep their stored value. Ticking `clear_image` resets
/// the image to the placeholder avatar.
pub fn edit(conn: &mut Conn) -> Result<()> {
    let user_id = match id_param(conn) {
        Some(user_id) => user_id,
        None => return redirect_missing(conn, "/users"),
    };

    let mut db = db::checkout(conn)?;
    let user = match queries::find_user(&mut db, user_id)? {
        Some(user) => user,
        None => return redirect_missing(conn, "/users"),
    };

    if !is_submit(conn) {
        let title = format!("Edit {}", user.full_name());
        return render(conn, "users/edit", &title, &UserForm { user });
    }

    let first_name = optional_field(conn, "first_name");
    let last_name = optional_field(conn, "last_name");
    let image_url = match is_checked(conn, "clear_image") {
        true => Some(DEFAULT_IMAGE_URL.to_string()),
        false => optional_field(conn, "image_url"),
    };

    let changes = UserChanges {
        first_name: first_name.as_deref(),
        last_name: last_name.as_deref(),
        image_url: image_url.as_deref(),
    };

    db.transaction(|db| queries::update_user(db, user.id, &changes))?;

    info!("updated user #{}", user.id);
    conn.redirect("/users");
    Ok(())
}

/// `GET /users/{id}/delete`
///
/// Takes the user's posts (and their tag links) with them.
pub fn delete(conn: &mut Conn) -> Result<()> {
    let user_id = match id_param(conn) {
        Some(user_id) => user_id,
        None => return redirect_missing(conn, "/users"),
    };

    let mut db = db::checkout(conn)?;
    if queries::find_user(&mut db, user_id)?.is_none() {
        return redirect_missing(conn, "/users");
    }

    queries::delete_user(&mut db, user_id)?;

    info!("deleted user #{}", user_id);
    conn.redirect("/users");
    Ok(())
}
