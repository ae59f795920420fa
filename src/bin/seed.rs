//! Seeds the database named by `DATABASE_URL` with fixture data.
//!
//! Usage: `seed [DIR]`, where `DIR` holds `topics.json`, `users.json`,
//! `articles.json` and `comments.json`. Without `DIR` the bundled test
//! fixtures are used.
extern crate diesel;
extern crate env_logger;
#[macro_use]
extern crate log;
extern crate nc_news;

use diesel::{Connection, PgConnection};
use nc_news::db::seed::{seed, SeedData};
use nc_news::db::{self, Config};
use std::env;
use std::path::PathBuf;

fn main() -> db::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env()?;
    let data = match env::args().nth(1) {
        Some(dir) => {
            let dir = PathBuf::from(dir);
            info!("loading seed data from {}", dir.display());
            SeedData::from_dir(&dir)?
        }
        None => SeedData::test()?,
    };

    let mut connection = PgConnection::establish(&config.database_url)?;
    seed(&mut connection, &data)
}
