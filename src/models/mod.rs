pub mod post;
pub mod post_tag;
pub mod queries;
pub mod tag;
pub mod user;

pub use self::post::{NewPost, Post, PostChanges};
pub use self::post_tag::PostTag;
pub use self::tag::{NewTag, Tag};
pub use self::user::{NewUser, User, UserChanges, DEFAULT_IMAGE_URL};
