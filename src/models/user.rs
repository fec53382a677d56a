use diesel::{AsChangeset, Identifiable, Insertable, Queryable, Selectable};
use serde::Serialize;

use crate::schema::users;

/// Shown for any user who has not supplied an image of their own.
pub const DEFAULT_IMAGE_URL: &str =
    "https://cdn5.vectorstock.com/i/thumb-large/66/14/default-avatar-photo-placeholder-profile-picture-vector-21806614.jpg";

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize)]
#[diesel(table_name = users)]
pub struct User {
    pub id:         i32,
    pub first_name: String,
    pub last_name:  String,
    pub image_url:  String,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser<'a> {
    pub first_name: &'a str,
    pub last_name:  &'a str,
    pub image_url:  &'a str,
}

/// A partial update, `None` fields are left as they are.
#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = users)]
pub struct UserChanges<'a> {
    pub first_name: Option<&'a str>,
    pub last_name:  Option<&'a str>,
    pub image_url:  Option<&'a str>,
}

impl<'a> UserChanges<'a> {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none() && self.last_name.is_none() && self.image_url.is_none()
    }
}
