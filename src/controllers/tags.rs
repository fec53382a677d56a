use diesel::Connection;

use crate::controllers::prelude::*;
use crate::models::{NewTag, Tag};
use crate::views::{post_views, PostView};

#[derive(Serialize)]
struct TagList {
    tags: Vec<Tag>,
}

#[derive(Serialize)]
struct TagPage {
    tag: Tag,
    posts: Vec<PostView>,
}

#[derive(Serialize)]
struct TagForm {
    tag: Tag,
}

/// `GET /tags`
pub fn index(conn: &mut Conn) -> Result<()> {
    let mut db = db::checkout(conn)?;
    let tags = queries::all_tags(&mut db)?;

    render(conn, "tags/index", "Tags", &TagList { tags })
}

/// `GET /tags/new` renders the form, `POST /tags/new` creates the tag.
///
/// Tag names are unique, a duplicate `name` fails the request.
pub fn new(conn: &mut Conn) -> Result<()> {
    if !is_submit(conn) {
        return render(conn, "tags/new", "Create a tag", &());
    }

    let name = required_field(conn, "name")?;

    let mut db = db::checkout(conn)?;
    let tag = queries::insert_tag(&mut db, &NewTag { name: &name })?;

    info!("created tag #{}: {}", tag.id, tag.name);
    conn.redirect("/tags");
    Ok(())
}

/// `GET /tags/{id}`
pub fn show(conn: &mut Conn) -> Result<()> {
    let tag_id = match id_param(conn) {
        Some(tag_id) => tag_id,
        None => return redirect_missing(conn, "/404"),
    };

    let mut db = db::checkout(conn)?;
    let tag = match queries::find_tag(&mut db, tag_id)? {
        Some(tag) => tag,
        None => return redirect_missing(conn, "/404"),
    };

    let posts = post_views(queries::posts_for_tag(&mut db, tag.id)?);
    let title = tag.name.clone();

    render(conn, "tags/show", &title, &TagPage { tag, posts })
}

/// `GET /tags/{id}/edit` renders the form, `POST` renames the tag.
///
/// A blank `name` leaves the tag as it was.
pub fn edit(conn: &mut Conn) -> Result<()> {
    let tag_id = match id_param(conn) {
        Some(tag_id) => tag_id,
        None => return redirect_missing(conn, "/tags"),
    };

    let mut db = db::checkout(conn)?;
    let tag = match queries::find_tag(&mut db, tag_id)? {
        Some(tag) => tag,
        None => return redirect_missing(conn, "/tags"),
    };

    if !is_submit(conn) {
        let title = format!("Edit {}", tag.name);
        return render(conn, "tags/edit", &title, &TagForm { tag });
    }

    if let Some(name) = optional_field(conn, "name") {
        db.transaction(|db| queries::rename_tag(db, tag.id, &name))?;
        info!("renamed tag #{} from {} to {}", tag.id, tag.name, name);
    }

    conn.redirect(&format!("/tags/{}", tag.id));
    Ok(())
}

/// `GET /tags/{id}/delete`
///
/// Unlinks the tag from every post before removing it.
pub fn delete(conn: &mut Conn) -> Result<()> {
    let tag_id = match id_param(conn) {
        Some(tag_id) => tag_id,
        None => return redirect_missing(conn, "/tags"),
    };

    let mut db = db::checkout(conn)?;
    if queries::find_tag(&mut db, tag_id)?.is_none() {
        return redirect_missing(conn, "/tags");
    }

    queries::delete_tag(&mut db, tag_id)?;

    info!("deleted tag #{}", tag_id);
    conn.redirect("/tags");
    Ok(())
}
