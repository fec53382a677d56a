#[macro_use] extern crate log;

use std::process;

use blogly::error::Result;
use blogly::models::{queries, NewPost, NewTag, NewUser, DEFAULT_IMAGE_URL};
use blogly::schema::{posts, posts_tags, tags, users};
use blogly::util::config::Config;
use blogly::util::{db, now_utc};
use clap::{crate_version, Arg, ArgAction, Command};
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use dotenv::dotenv;

static USERS: &[(&str, &str)] = &[
    ("Alan", "Alda"),
    ("Joel", "Burton"),
    ("Jane", "Smith"),
];

static TAGS: &[&str] = &["fun", "even more", "bloop", "zope"];

// (author index, title, content, tag names)
static POSTS: &[(usize, &str, &str, &[&str])] = &[
    (0, "First Post!", "Oh, hai.", &["fun", "bloop"]),
    (0, "Yet Another Post", "Nothing much to say today.", &["even more"]),
    (1, "Flask Is Awesome", "Server-side templates never went out of style.", &["fun", "zope"]),
    (2, "Hello World", "Just setting up my blogly.", &[]),
];

fn main() {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = Command::new("blogly-seed")
        .version(crate_version!())
        .about("Fills the blogly database with demo users, posts, and tags.")
        .arg(Arg::new("reset")
             .long("reset")
             .action(ArgAction::SetTrue)
             .help("Deletes every existing row before seeding."))
        .get_matches();

    if let Err(err) = run(matches.get_flag("reset")) {
        error!("could not seed database: {}", err);
        process::exit(1);
    }
}

fn run(reset: bool) -> Result<()> {
    let config = Config::from_env()?;
    let pool = db::init_pool(&config)?;
    db::run_migrations(&pool)?;

    let mut conn = pool.get()?;
    conn.transaction(|conn| {
        if reset { clear(conn)?; }
        seed(conn)
    })
}

fn clear(conn: &mut SqliteConnection) -> Result<()> {
    let link_count = diesel::delete(posts_tags::table).execute(conn)?;
    let post_count = diesel::delete(posts::table).execute(conn)?;
    let tag_count = diesel::delete(tags::table).execute(conn)?;
    let user_count = diesel::delete(users::table).execute(conn)?;

    info!("cleared {} users, {} posts, {} tags, {} tag links", user_count, post_count, tag_count, link_count);
    Ok(())
}

fn seed(conn: &mut SqliteConnection) -> Result<()> {
    let mut user_ids = vec![];
    for &(first_name, last_name) in USERS {
        let user = queries::insert_user(conn, &NewUser { first_name, last_name, image_url: DEFAULT_IMAGE_URL })?;
        user_ids.push(user.id);
    }

    for &name in TAGS {
        queries::insert_tag(conn, &NewTag { name })?;
    }

    for &(author, title, content, tag_names) in POSTS {
        let post = queries::insert_post(conn, &NewPost {
            title,
            content,
            created_at: now_utc(),
            user_id: user_ids[author],
        })?;

        let tag_ids = queries::tags_named(conn, tag_names)?
            .into_iter()
            .map(|tag| tag.id)
            .collect::<Vec<_>>();

        queries::link_tags(conn, post.id, &tag_ids)?;
    }

    info!("seeded {} users, {} posts, {} tags", USERS.len(), POSTS.len(), TAGS.len());
    Ok(())
}
