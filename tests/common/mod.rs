#![allow(dead_code)]

use diesel::{Connection, PgConnection};
use lazy_static::lazy_static;
use nc_news::db::{self, seed};
use rocket::http::{ContentType, Status};
use rocket::local::blocking::Client;
use serde_json::Value;
use std::env;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

lazy_static! {
    // Every seeded test rebuilds the same tables.
    static ref DATABASE: Mutex<()> = Mutex::new(());
}

/// A client whose pool points at a port nothing listens on.
pub fn offline_client() -> Client {
    let pool = db::lazy_pool(
        "postgres://nc_news@127.0.0.1:1/nc_news_unused",
        Duration::from_millis(250),
    );
    Client::tracked(nc_news::rocket(pool)).expect("valid rocket instance")
}

pub struct Seeded {
    pub client: Client,
    _lock: MutexGuard<'static, ()>,
}

/// A client backed by a freshly seeded `TEST_DATABASE_URL`.
pub fn seeded_client() -> Seeded {
    let lock = DATABASE.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let url = env::var("TEST_DATABASE_URL")
        .expect("TEST_DATABASE_URL must point at a scratch PostgreSQL database");

    let mut connection = PgConnection::establish(&url).expect("test database is reachable");
    let data = seed::SeedData::test().expect("fixtures parse");
    seed::seed(&mut connection, &data).expect("database seeds");

    let pool = db::lazy_pool(&url, Duration::from_secs(5));
    Seeded {
        client: Client::tracked(nc_news::rocket(pool)).expect("valid rocket instance"),
        _lock: lock,
    }
}

pub fn get(client: &Client, uri: &str) -> (Status, Value) {
    let response = client.get(uri.to_string()).dispatch();
    let status = response.status();
    (status, response.into_json::<Value>().unwrap_or(Value::Null))
}

pub fn post(client: &Client, uri: &str, body: Value) -> (Status, Value) {
    let response = client
        .post(uri.to_string())
        .header(ContentType::JSON)
        .body(body.to_string())
        .dispatch();
    let status = response.status();
    (status, response.into_json::<Value>().unwrap_or(Value::Null))
}

pub fn patch(client: &Client, uri: &str, body: Value) -> (Status, Value) {
    let response = client
        .patch(uri.to_string())
        .header(ContentType::JSON)
        .body(body.to_string())
        .dispatch();
    let status = response.status();
    (status, response.into_json::<Value>().unwrap_or(Value::Null))
}

pub fn delete(client: &Client, uri: &str) -> (Status, Option<String>) {
    let response = client.delete(uri.to_string()).dispatch();
    let status = response.status();
    (status, response.into_string())
}

pub fn msg(body: &Value) -> &str {
    body["msg"].as_str().unwrap_or("")
}
