#[macro_use] extern crate log;

pub mod controllers;
pub mod error;
pub mod models;
pub mod routes;
pub mod schema;
pub mod util;
pub mod views;

use blogly_web::mw::FormParser;
use blogly_web::Pipeline;

use crate::error::Result;
use crate::util::config::Config;
use crate::util::db::{DatabaseMiddleware, DbPool};
use crate::util::template::TemplateMiddleware;
use crate::util::timer::RequestTimer;
use crate::util::try_file::TryFile;

/// Assembles the request pipeline for the whole application.
///
/// Templates are loaded (and checked) up front, so a broken template
/// fails here rather than on the first request that renders it.
pub fn app(config: &Config, pool: DbPool) -> Result<Pipeline> {
    let templates = TemplateMiddleware::new(&config.template_root, config.template_dev_mode)?;

    let mut pipeline = Pipeline::new();
    pipeline.register(RequestTimer)
            .register(TryFile::new(config.static_root.clone()))
            .register(FormParser)
            .register(DatabaseMiddleware::new(pool))
            .register(templates)
            .register(routes::router());

    Ok(pipeline)
}
