extern crate nc_news;
extern crate rocket;

use nc_news::db;

#[rocket::main]
async fn main() -> Result<(), rocket::Error> {
    let config = db::Config::from_env().expect("Failed to read database configuration");
    let pool = db::init_pool(&config).expect("Failed to create database pool");
    let _rocket = nc_news::rocket(pool).launch().await?;
    Ok(())
}
