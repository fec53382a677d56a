use diesel::Connection;

use crate::controllers::prelude::*;
use crate::models::{NewPost, Post, PostChanges, Tag, User};
use crate::util::now_utc;
use crate::views::PostView;

/// A tag checkbox on the post forms
#[derive(Serialize)]
struct TagChoice {
    id: i32,
    name: String,
    checked: bool,
}

#[derive(Serialize)]
struct NewPostForm {
    user: User,
    tags: Vec<TagChoice>,
}

#[derive(Serialize)]
struct PostPage {
    post: PostView,
    user: User,
    tags: Vec<Tag>,
}

#[derive(Serialize)]
struct EditPostForm {
    post: PostView,
    tags: Vec<TagChoice>,
}

fn tag_choices(all_tags: Vec<Tag>, selected: &[Tag]) -> Vec<TagChoice> {
    all_tags.into_iter()
        .map(|tag| TagChoice {
            checked: selected.iter().any(|picked| picked.id == tag.id),
            id: tag.id,
            name: tag.name,
        })
        .collect()
}

/// The ids of every known tag named in the submitted `tags` field
fn selected_tag_ids(conn: &Conn, db: &mut db::DbConn) -> Result<Vec<i32>> {
    let names = field_values(conn, "tags");
    let names = names.iter().map(|name| &name[..]).collect::<Vec<_>>();
    let tags = queries::tags_named(db, &names)?;

    Ok(tags.into_iter().map(|tag| tag.id).collect())
}

/// `GET /users/{id}/posts/new` renders the form, `POST` creates the post.
///
/// Expects `title` and `content`, plus any number of `tags` naming
/// existing tags.
pub fn new(conn: &mut Conn) -> Result<()> {
    let user_id = match id_param(conn) {
        Some(user_id) => user_id,
        None => return redirect_missing(conn, "/404"),
    };

    let mut db = db::checkout(conn)?;
    let user = match queries::find_user(&mut db, user_id)? {
        Some(user) => user,
        None => return redirect_missing(conn, "/404"),
    };

    if !is_submit(conn) {
        let tags = tag_choices(queries::all_tags(&mut db)?, &[]);
        let title = format!("Add a post for {}", user.full_name());
        return render(conn, "posts/new", &title, &NewPostForm { user, tags });
    }

    let title = required_field(conn, "title")?;
    let content = required_field(conn, "content")?;
    let tag_ids = selected_tag_ids(conn, &mut db)?;

    let post = db.transaction(|db| {
        let post = queries::insert_post(db, &NewPost {
            title: &title,
            content: &content,
            created_at: now_utc(),
            user_id: user.id,
        })?;

        queries::link_tags(db, post.id, &tag_ids)?;
        Ok::<_, Error>(post)
    })?;

    info!("created post #{} for user #{} with {} tags", post.id, user.id, tag_ids.len());
    conn.redirect(&format!("/users/{}", user.id));
    Ok(())
}

/// `GET /posts/{id}`
pub fn show(conn: &mut Conn) -> Result<()> {
    let post_id = match id_param(conn) {
        Some(post_id) => post_id,
        None => return redirect_missing(conn, "/404"),
    };

    let mut db = db::checkout(conn)?;
    let post = match queries::find_post(&mut db, post_id)? {
        Some(post) => post,
        None => return redirect_missing(conn, "/404"),
    };

    let user = match queries::find_user(&mut db, post.user_id)? {
        Some(user) => user,
        None => return redirect_missing(conn, "/404"),
    };

    let tags = queries::tags_for_post(&mut db, post.id)?;
    let title = post.title.clone();

    render(conn, "posts/show", &title, &PostPage { post: post.into(), user, tags })
}

/// `GET /posts/{id}/edit` renders the form, `POST` applies it.
///
/// Blank fields keep their stored value; the submitted `tags` become the
/// post's complete set of tags.
pub fn edit(conn: &mut Conn) -> Result<()> {
    let post_id = match id_param(conn) {
        Some(post_id) => post_id,
        None => return redirect_missing(conn, "/404"),
    };

    let mut db = db::checkout(conn)?;
    let post = match queries::find_post(&mut db, post_id)? {
        Some(post) => post,
        None => return redirect_missing(conn, "/404"),
    };

    if !is_submit(conn) {
        let selected = queries::tags_for_post(&mut db, post.id)?;
        let tags = tag_choices(queries::all_tags(&mut db)?, &selected);
        let title = format!("Edit {}", post.title);
        return render(conn, "posts/edit", &title, &EditPostForm { post: post.into(), tags });
    }

    let title = optional_field(conn, "title");
    let content = optional_field(conn, "content");
    let tag_ids = selected_tag_ids(conn, &mut db)?;

    let changes = PostChanges {
        title: title.as_deref(),
        content: content.as_deref(),
    };

    db.transaction(|db| {
        queries::update_post(db, post.id, &changes)?;
        queries::replace_tags(db, post.id, &tag_ids)
    })?;

    info!("updated post #{}, now has {} tags", post.id, tag_ids.len());
    conn.redirect(&format!("/posts/{}", post.id));
    Ok(())
}

/// `GET /posts/{id}/delete`
pub fn delete(conn: &mut Conn) -> Result<()> {
    let post_id = match id_param(conn) {
        Some(post_id) => post_id,
        None => return redirect_missing(conn, "/users"),
    };

    let mut db = db::checkout(conn)?;
    let post: Post = match queries::find_post(&mut db, post_id)? {
        Some(post) => post,
        None => return redirect_missing(conn, "/users"),
    };

    queries::delete_post(&mut db, post.id)?;

    info!("deleted post #{}", post.id);
    conn.redirect(&format!("/users/{}", post.user_id));
    Ok(())
}
