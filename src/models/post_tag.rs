use diesel::{Identifiable, Insertable, Queryable, Selectable};

use crate::schema::posts_tags;

#[derive(Debug, Clone, Copy, PartialEq, Queryable, Selectable, Identifiable, Insertable)]
#[diesel(table_name = posts_tags)]
#[diesel(primary_key(post_id, tag_id))]
pub struct PostTag {
    pub post_id: i32,
    pub tag_id:  i32,
}
