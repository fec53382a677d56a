use blogly_web::util::extension;
use conduit::Request;
use serde::Serialize;

use crate::error::Result;
use crate::models::Post;
use crate::util::display_timestamp;
use crate::util::template::TemplateEngine;

pub static MAIN_LAYOUT: &str = "layouts/main";

#[derive(Serialize)]
struct Layout<'a> {
    title: &'a str,
    inner: String,
}

/// Renders `template` with `data`, then wraps the result in `layout`.
pub fn render_into<T>(req: &dyn Request, layout: &str, template: &str, title: &str, data: &T) -> Result<String>
where T: Serialize {
    let registry = extension::<TemplateEngine>(req)?;
    let inner_html = registry.render(template, data)?;

    Ok(registry.render(layout, &Layout { title, inner: inner_html })?)
}

/// A post as templates see it, with its timestamp pre-formatted.
#[derive(Debug, Serialize)]
pub struct PostView {
    pub id:         i32,
    pub title:      String,
    pub content:    String,
    pub created_at: String,
    pub user_id:    i32,
}

impl From<Post> for PostView {
    fn from(post: Post) -> Self {
        PostView {
            created_at: display_timestamp(&post.created_at),
            id:         post.id,
            title:      post.title,
            content:    post.content,
            user_id:    post.user_id,
        }
    }
}

pub fn post_views(posts: Vec<Post>) -> Vec<PostView> {
    posts.into_iter().map(PostView::from).collect()
}
