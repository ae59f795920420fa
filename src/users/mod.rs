use rocket::serde::json::Json;
use rocket::{get, State};

use crate::db::{DbConnection, Pool};
use crate::types::ApiResult;

pub mod models;

pub use self::models::User;

#[derive(Debug, Serialize)]
pub struct UserResponse {
    user: User,
}

#[derive(Debug, Serialize)]
pub struct UsersResponse {
    users: Vec<User>,
}

#[get("/users")]
pub fn list(pool: &State<Pool>) -> ApiResult<UsersResponse> {
    let mut connection = DbConnection::get(pool)?;
    let users = User::all(&mut connection)?;
    Ok(Json(UsersResponse { users }))
}

#[get("/users/<username>")]
pub fn get(pool: &State<Pool>, username: &str) -> ApiResult<UserResponse> {
    let mut connection = DbConnection::get(pool)?;
    let user = User::load_by_name(username, &mut connection)?;
    Ok(Json(UserResponse { user }))
}
