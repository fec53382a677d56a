#[macro_use] extern crate log;

use std::process;

use blogly::error::Result;
use blogly::util::config::Config;
use blogly::util::db;
use blogly_web::Server;
use clap::{crate_version, Arg, Command};
use dotenv::dotenv;

fn main() {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = Command::new("blogly")
        .version(crate_version!())
        .about("Serves the blogly users, posts, and tags over HTTP.")
        .arg(Arg::new("bind")
             .long("bind")
             .value_name("ADDR")
             .help("The address to listen on, overrides BIND_ADDR."))
        .arg(Arg::new("database-url")
             .long("database-url")
             .value_name("URL")
             .help("The SQLite database to use, overrides DATABASE_URL."))
        .get_matches();

    let bind = matches.get_one::<String>("bind").cloned();
    let database_url = matches.get_one::<String>("database-url").cloned();

    if let Err(err) = run(bind, database_url) {
        error!("blogly exited with an error: {}", err);
        process::exit(1);
    }
}

fn run(bind: Option<String>, database_url: Option<String>) -> Result<()> {
    let mut config = match database_url {
        Some(url) => Config::from_lookup(|key| match key {
            "DATABASE_URL" => Some(url.clone()),
            _ => std::env::var(key).ok(),
        })?,

        None => Config::from_env()?,
    };

    if let Some(bind) = bind { config.bind_addr = bind; }

    info!("opening database {} (pool size: {})", config.database_url, config.pool_size);
    let pool = db::init_pool(&config)?;
    db::run_migrations(&pool)?;

    let pipeline = blogly::app(&config, pool)?;

    Server::http(&config.bind_addr[..])?.handle(pipeline)?;

    Ok(())
}
