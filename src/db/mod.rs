use diesel::pg::PgConnection;
use diesel::r2d2::ConnectionManager;
use dotenv::dotenv;
use std::env;
use std::ops::{Deref, DerefMut};
use std::time::Duration;

pub mod schema;
pub mod seed;

const DEFAULT_POOL_SIZE: u32 = 10;

// An alias to the type for a pool of Diesel Postgres connections.
pub type Pool = r2d2::Pool<ConnectionManager<PgConnection>>;

pub struct DbConnection(pub r2d2::PooledConnection<ConnectionManager<PgConnection>>);

error_chain! {
    foreign_links {
        Var(::std::env::VarError);
        ParseInt(::std::num::ParseIntError);
        Io(::std::io::Error);
        Json(::serde_json::Error);
        R2D2(r2d2::Error);
        Connection(::diesel::ConnectionError);
        Diesel(::diesel::result::Error);
    }
}

/// Settings needed to reach the database.
///
/// Read from the process environment after the dotenv file for the current
/// `APP_ENV` has been loaded: `.env.test` for `APP_ENV=test`, plain `.env`
/// when no `APP_ENV` is set. Variables already present in the environment
/// are never overridden by the file.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub pool_size: u32,
}

impl Config {
    pub fn from_env() -> Result<Config> {
        load_dotenv();
        let database_url = env::var("DATABASE_URL").chain_err(|| "DATABASE_URL is not set")?;
        let pool_size = match env::var("DATABASE_POOL_SIZE") {
            Ok(size) => size.parse::<u32>()?,
            Err(_) => DEFAULT_POOL_SIZE,
        };
        Ok(Config {
            database_url,
            pool_size,
        })
    }
}

fn load_dotenv() {
    match env::var("APP_ENV") {
        Ok(app_env) => {
            let file = format!(".env.{}", app_env);
            if dotenv::from_filename(&file).is_err() {
                debug!("no {} file, using the process environment", file);
            }
        }
        Err(_) => {
            dotenv().ok();
        }
    }
}

/// Builds the pool and checks that at least one connection can be opened.
pub fn init_pool(config: &Config) -> Result<Pool> {
    let manager = ConnectionManager::<PgConnection>::new(config.database_url.as_str());
    let pool = Pool::builder()
        .max_size(config.pool_size)
        .build(manager)?;
    Ok(pool)
}

/// Builds a pool without opening any connection up front.
///
/// Checkouts give up after `timeout`, so requests against an unreachable
/// database fail fast with a pool error instead of hanging.
pub fn lazy_pool(database_url: &str, timeout: Duration) -> Pool {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    Pool::builder()
        .max_size(DEFAULT_POOL_SIZE)
        .connection_timeout(timeout)
        .build_unchecked(manager)
}

impl DbConnection {
    /// Checks a connection out of the pool for the lifetime of one request.
    pub fn get(pool: &Pool) -> ::std::result::Result<DbConnection, r2d2::Error> {
        pool.get().map(DbConnection)
    }
}

// For the convenience of using an &mut DbConnection as an &mut PgConnection.
impl Deref for DbConnection {
    type Target = PgConnection;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for DbConnection {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}
