use rocket::get;
use rocket::serde::json::Json;
use serde_json::Value;

use crate::types::ApiResult;

pub static ENDPOINTS: &str = include_str!("../endpoints.json");

#[derive(Debug, Serialize)]
pub struct EndpointsResponse {
    endpoints: Value,
}

#[get("/")]
pub fn index() -> ApiResult<EndpointsResponse> {
    let endpoints = serde_json::from_str::<Value>(ENDPOINTS)?;
    Ok(Json(EndpointsResponse { endpoints }))
}
