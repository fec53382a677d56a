use diesel::{AsChangeset, Identifiable, Insertable, Queryable, Selectable};
use time::PrimitiveDateTime;

use crate::schema::posts;

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = posts)]
pub struct Post {
    pub id:         i32,
    pub title:      String,
    pub content:    String,
    pub created_at: PrimitiveDateTime,
    pub user_id:    i32,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = posts)]
pub struct NewPost<'a> {
    pub title:      &'a str,
    pub content:    &'a str,
    pub created_at: PrimitiveDateTime,
    pub user_id:    i32,
}

#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = posts)]
pub struct PostChanges<'a> {
    pub title:   Option<&'a str>,
    pub content: Option<&'a str>,
}

impl<'a> PostChanges<'a> {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none()
    }
}
