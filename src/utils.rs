use chrono::{DateTime, SecondsFormat, Utc};
use rocket::http::Status;
use rocket::request::Request;
use rocket::response::content::RawJson;
use rocket::response::{Responder, Response};
use serde::{Serialize, Serializer};
use crate::types::ApiError;

pub fn try_respond<T: Serialize>(
    req: &Request,
    body: &T,
    status: Status,
) -> Result<Response<'static>, Status> {
    let as_json = serde_json::to_string(body);
    match as_json {
        Ok(json) => RawJson(json)
            .respond_to(req)
            .and_then(|resp| Response::build_from(resp).status(status).ok()),

        Err(_) => Err(Status::InternalServerError),
    }
}

pub fn serialize_date<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let s = date.to_rfc3339_opts(SecondsFormat::Millis, true);
    serializer.serialize_str(&s)
}

/// Accepts an integer id from the path; anything else is a bad request.
pub fn row_id(param: Result<i32, &str>) -> Result<i32, ApiError> {
    param.map_err(|raw| {
        debug!("malformed id in path: {:?}", raw);
        ApiError::BadRequest
    })
}
