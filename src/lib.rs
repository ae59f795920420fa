#[macro_use]
extern crate error_chain;

#[macro_use]
extern crate diesel;

#[macro_use]
extern crate lazy_static;

#[macro_use]
extern crate log;

#[macro_use]
extern crate serde_derive;

pub mod api;
pub mod article;
pub mod comment;
pub mod db;
pub mod topic;
pub mod types;
pub mod users;
pub mod utils;

use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{catch, catchers, routes, Build, Request, Rocket};

use crate::types::ErrorBody;

#[catch(400)]
fn bad_request(_req: &Request) -> (Status, Json<ErrorBody>) {
    (Status::BadRequest, Json(ErrorBody::for_status(Status::BadRequest)))
}

// Rocket answers undecodable forms and bodies with 422; clients only ever see 400.
#[catch(422)]
fn unprocessable(_req: &Request) -> (Status, Json<ErrorBody>) {
    (Status::BadRequest, Json(ErrorBody::for_status(Status::BadRequest)))
}

#[catch(404)]
fn not_found(_req: &Request) -> (Status, Json<ErrorBody>) {
    (Status::NotFound, Json(ErrorBody::for_status(Status::NotFound)))
}

#[catch(default)]
fn fallback(status: Status, req: &Request) -> (Status, Json<ErrorBody>) {
    if status.code >= 500 {
        error!("{} {} failed with {}", req.method(), req.uri(), status);
    }
    (status, Json(ErrorBody::for_status(status)))
}

/// Assembles the application around an existing connection pool.
pub fn rocket(pool: db::Pool) -> Rocket<Build> {
    rocket::build()
        .manage(pool)
        .mount("/api", routes![api::index, topic::list])
        .mount(
            "/api",
            routes![article::list, article::get, article::create, article::vote],
        )
        .mount(
            "/api",
            routes![comment::list, comment::add, comment::vote, comment::delete],
        )
        .mount("/api", routes![users::list, users::get])
        .register("/", catchers![bad_request, unprocessable, not_found, fallback])
}
