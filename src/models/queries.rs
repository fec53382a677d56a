//! Every query the application runs.
//!
//! Functions take a plain connection so they can run inside a caller's
//! transaction; writes which touch more than one table open their own.

use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use crate::models::{NewPost, NewTag, NewUser, Post, PostChanges, PostTag, Tag, User, UserChanges};
use crate::schema::{posts, posts_tags, tags, users};

// users

/// All users, ordered by last name and then first name.
pub fn all_users(conn: &mut SqliteConnection) -> QueryResult<Vec<User>> {
    users::table
        .order((users::last_name.asc(), users::first_name.asc(), users::id.asc()))
        .load::<User>(conn)
}

pub fn find_user(conn: &mut SqliteConnection, user_id: i32) -> QueryResult<Option<User>> {
    users::table.find(user_id).first::<User>(conn).optional()
}

pub fn insert_user(conn: &mut SqliteConnection, user: &NewUser) -> QueryResult<User> {
    diesel::insert_into(users::table)
        .values(user)
        .get_result::<User>(conn)
}

/// Applies `changes` to the user, returns the number of rows touched.
pub fn update_user(conn: &mut SqliteConnection, user_id: i32, changes: &UserChanges) -> QueryResult<usize> {
    if changes.is_empty() { return Ok(0) }

    diesel::update(users::table.find(user_id))
        .set(changes)
        .execute(conn)
}

/// Deletes a user along with their posts and those posts' tag links.
pub fn delete_user(conn: &mut SqliteConnection, user_id: i32) -> QueryResult<usize> {
    conn.transaction::<_, diesel::result::Error, _>(|conn| {
        let owned_posts = posts::table
            .filter(posts::user_id.eq(user_id))
            .select(posts::id);

        diesel::delete(posts_tags::table.filter(posts_tags::post_id.eq_any(owned_posts)))
            .execute(conn)?;

        let post_count = diesel::delete(posts::table.filter(posts::user_id.eq(user_id)))
            .execute(conn)?;

        debug!("deleting user {} removed {} posts", user_id, post_count);
        diesel::delete(users::table.find(user_id)).execute(conn)
    })
}

// posts

/// A user's posts, newest first.
pub fn posts_for_user(conn: &mut SqliteConnection, user_id: i32) -> QueryResult<Vec<Post>> {
    posts::table
        .filter(posts::user_id.eq(user_id))
        .order((posts::created_at.desc(), posts::id.desc()))
        .load::<Post>(conn)
}

/// Posts linked to a tag, newest first.
pub fn posts_for_tag(conn: &mut SqliteConnection, tag_id: i32) -> QueryResult<Vec<Post>> {
    posts_tags::table
        .inner_join(posts::table)
        .filter(posts_tags::tag_id.eq(tag_id))
        .order((posts::created_at.desc(), posts::id.desc()))
        .select(Post::as_select())
        .load::<Post>(conn)
}

pub fn find_post(conn: &mut SqliteConnection, post_id: i32) -> QueryResult<Option<Post>> {
    posts::table.find(post_id).first::<Post>(conn).optional()
}

pub fn insert_post(conn: &mut SqliteConnection, post: &NewPost) -> QueryResult<Post> {
    diesel::insert_into(posts::table)
        .values(post)
        .get_result::<Post>(conn)
}

pub fn update_post(conn: &mut SqliteConnection, post_id: i32, changes: &PostChanges) -> QueryResult<usize> {
    if changes.is_empty() { return Ok(0) }

    diesel::update(posts::table.find(post_id))
        .set(changes)
        .execute(conn)
}

/// Deletes a post and its tag links.
pub fn delete_post(conn: &mut SqliteConnection, post_id: i32) -> QueryResult<usize> {
    conn.transaction::<_, diesel::result::Error, _>(|conn| {
        diesel::delete(posts_tags::table.filter(posts_tags::post_id.eq(post_id)))
            .execute(conn)?;

        diesel::delete(posts::table.find(post_id)).execute(conn)
    })
}

// tags

/// All tags, ordered by name.
pub fn all_tags(conn: &mut SqliteConnection) -> QueryResult<Vec<Tag>> {
    tags::table.order(tags::name.asc()).load::<Tag>(conn)
}

pub fn find_tag(conn: &mut SqliteConnection, tag_id: i32) -> QueryResult<Option<Tag>> {
    tags::table.find(tag_id).first::<Tag>(conn).optional()
}

/// The known tags among `names`; unknown names are skipped.
pub fn tags_named(conn: &mut SqliteConnection, names: &[&str]) -> QueryResult<Vec<Tag>> {
    if names.is_empty() { return Ok(vec![]) }

    tags::table
        .filter(tags::name.eq_any(names))
        .order(tags::name.asc())
        .load::<Tag>(conn)
}

/// The tags linked to a post, ordered by name.
pub fn tags_for_post(conn: &mut SqliteConnection, post_id: i32) -> QueryResult<Vec<Tag>> {
    posts_tags::table
        .inner_join(tags::table)
        .filter(posts_tags::post_id.eq(post_id))
        .order(tags::name.asc())
        .select(Tag::as_select())
        .load::<Tag>(conn)
}

/// Fails with a unique violation if `tag.name` is taken.
pub fn insert_tag(conn: &mut SqliteConnection, tag: &NewTag) -> QueryResult<Tag> {
    diesel::insert_into(tags::table)
        .values(tag)
        .get_result::<Tag>(conn)
}

pub fn rename_tag(conn: &mut SqliteConnection, tag_id: i32, name: &str) -> QueryResult<usize> {
    diesel::update(tags::table.find(tag_id))
        .set(tags::name.eq(name))
        .execute(conn)
}

/// Deletes a tag and every link to it.
pub fn delete_tag(conn: &mut SqliteConnection, tag_id: i32) -> QueryResult<usize> {
    conn.transaction::<_, diesel::result::Error, _>(|conn| {
        diesel::delete(posts_tags::table.filter(posts_tags::tag_id.eq(tag_id)))
            .execute(conn)?;

        diesel::delete(tags::table.find(tag_id)).execute(conn)
    })
}

// posts_tags

/// Links a post to each tag, pairs which already exist are left alone.
pub fn link_tags(conn: &mut SqliteConnection, post_id: i32, tag_ids: &[i32]) -> QueryResult<usize> {
    let mut inserted = 0;
    for &tag_id in tag_ids {
        inserted += diesel::insert_or_ignore_into(posts_tags::table)
            .values(&PostTag { post_id, tag_id })
            .execute(conn)?;
    }

    Ok(inserted)
}

/// Makes `tag_ids` the complete set of tags linked to a post.
pub fn replace_tags(conn: &mut SqliteConnection, post_id: i32, tag_ids: &[i32]) -> QueryResult<()> {
    conn.transaction::<_, diesel::result::Error, _>(|conn| {
        diesel::delete(posts_tags::table
                .filter(posts_tags::post_id.eq(post_id))
                .filter(posts_tags::tag_id.ne_all(tag_ids)))
            .execute(conn)?;

        link_tags(conn, post_id, tag_ids)?;
        Ok(())
    })
}
