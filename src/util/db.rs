use blogly_web::plug::{Conn, Plug};
use blogly_web::util::extension;
use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, PooledConnection};
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use r2d2::Pool;

use crate::error::Result;
use crate::util::config::Config;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// The extension registry type of the database pool
pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

/// A connection checked out of the pool for the span of one request.
pub type DbConn = PooledConnection<ConnectionManager<SqliteConnection>>;

/// SQLite leaves foreign keys unenforced unless asked, per connection.
#[derive(Debug)]
struct SqlitePragmas;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for SqlitePragmas {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> ::std::result::Result<(), diesel::r2d2::Error> {
        conn.batch_execute("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;")
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Builds the connection pool described by `config`.
pub fn init_pool(config: &Config) -> Result<DbPool> {
    let manager = ConnectionManager::<SqliteConnection>::new(&config.database_url[..]);
    let pool = Pool::builder()
        .max_size(config.pool_size)
        .connection_customizer(Box::new(SqlitePragmas))
        .build(manager)?;

    Ok(pool)
}

/// Applies any embedded migrations which have not yet been run.
pub fn run_migrations(pool: &DbPool) -> Result<()> {
    let mut conn = pool.get()?;
    let applied = conn.run_pending_migrations(MIGRATIONS)?;

    for version in &applied {
        info!("applied migration {}", version);
    }

    Ok(())
}

/// Checks a connection out of the pool a previous `DatabaseMiddleware` stored.
///
/// The caller owns the connection until it is dropped at the end of the
/// request; writes made through it should go through a single transaction.
pub fn checkout(conn: &Conn) -> Result<DbConn> {
    let pool = extension::<DbPool>(conn.req())?;
    Ok(pool.get()?)
}

/// This can be used to add a database pool to a plug pipeline.
/// This will inject the database pool into the request extensions so
/// handlers further down the pipeline can check out a connection.
///
pub struct DatabaseMiddleware {
    pool: DbPool,
}

impl DatabaseMiddleware {
    pub fn new(pool: DbPool) -> Self {
        DatabaseMiddleware { pool }
    }
}

impl Plug for DatabaseMiddleware {
    fn call(&self, conn: &mut Conn) {
        conn.req_mut().mut_extensions().insert::<DbPool>(self.pool.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blogly_web::OwnedRequest;
    use conduit::Method;
    use diesel::prelude::*;
    use tempfile::TempDir;

    fn test_pool(dir: &TempDir) -> DbPool {
        let path = dir.path().join("db.sqlite3");
        let mut config = Config::new(path.to_string_lossy().into_owned());
        config.pool_size = 1;

        let pool = init_pool(&config).unwrap();
        run_migrations(&pool).unwrap();
        pool
    }

    #[test]
    fn test_migrations_are_idempotent() {
        let dir = TempDir::new().unwrap();
        let pool = test_pool(&dir);
        run_migrations(&pool).unwrap();

        let mut conn = pool.get().unwrap();
        let users = crate::schema::users::table.count().get_result::<i64>(&mut conn).unwrap();
        assert_eq!(users, 0);
    }

    #[test]
    fn test_foreign_keys_enforced() {
        let dir = TempDir::new().unwrap();
        let pool = test_pool(&dir);
        let mut conn = pool.get().unwrap();

        let orphan = conn.batch_execute(
            "INSERT INTO posts (title, content, user_id) VALUES ('t', 'c', 999)");
        assert!(orphan.is_err());
    }

    #[test]
    fn test_checkout_requires_middleware() {
        let dir = TempDir::new().unwrap();
        let pool = test_pool(&dir);

        let mut req = OwnedRequest::new(Method::Get, "/");
        let mut conn = Conn::new(&mut req);
        assert!(checkout(&conn).is_err());

        DatabaseMiddleware::new(pool).call(&mut conn);
        assert!(checkout(&conn).is_ok());
    }
}
