use diesel::result::{DatabaseErrorKind, Error as DieselError};
use rocket::http::Status;
use rocket::request::Request;
use rocket::response::{self, Responder};
use rocket::serde::json::{Error as JsonError, Json};
use serde_json::{Map, Value};
use std::collections::HashMap;
use crate::utils::try_respond;

pub trait Validate
where
    Self: Sized,
{
    type Error;
    fn validate(self) -> Result<Self, Self::Error>;
}

/// Conversion from an untyped JSON request body into a typed one.
///
/// Implementations record every problem they find instead of stopping at the
/// first, so a single rejection describes the whole body.
pub trait FromJson
where
    Self: Sized,
{
    fn from_json(value: Value) -> Result<Self, ValidationError>;
}

/// A JSON request body as handed over by Rocket, parse failures included.
pub type JsonBody<'r> = Result<Json<Value>, JsonError<'r>>;

/// Turns a raw request body into `T`, rejecting anything malformed with a 400.
pub fn read_body<T: FromJson>(body: JsonBody) -> Result<T, ApiError> {
    match body {
        Ok(Json(value)) => Ok(T::from_json(value)?),
        Err(e) => {
            debug!("unreadable request body: {:?}", e);
            Err(ApiError::BadRequest)
        }
    }
}

/// Body of both vote endpoints: `{ "inc_votes": <integer> }`.
#[derive(Debug, PartialEq, Eq)]
pub struct VoteChange {
    pub inc_votes: i32,
}

impl FromJson for VoteChange {
    fn from_json(value: Value) -> Result<Self, ValidationError> {
        let mut fields = FieldReader::new(value)?;
        match fields.integer("inc_votes") {
            Some(inc_votes) => fields.finish(VoteChange { inc_votes }),
            None => Err(fields.into_errors()),
        }
    }
}

/// Stored vote counts that `delta` can be added to without leaving `i32`.
pub fn vote_bounds(delta: i32) -> (i32, i32) {
    (i32::MIN - delta.min(0), i32::MAX - delta.max(0))
}

#[derive(Debug)]
pub enum ApiError {
    Diesel(DieselError),
    Validation(ValidationError),
    Pool(r2d2::Error),
    BadRequest,
    NotFound,
    Internal,
}

impl From<DieselError> for ApiError {
    fn from(err: DieselError) -> ApiError {
        ApiError::Diesel(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> ApiError {
        ApiError::Validation(err)
    }
}

impl From<r2d2::Error> for ApiError {
    fn from(err: r2d2::Error) -> ApiError {
        ApiError::Pool(err)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(_: serde_json::Error) -> ApiError {
        ApiError::Internal
    }
}

pub type ApiResult<T> = Result<Json<T>, ApiError>;

/// Constraint violations raised by the database for input that references
/// missing rows or leaves required columns empty.
fn is_bad_input(kind: &DatabaseErrorKind) -> bool {
    matches!(
        kind,
        DatabaseErrorKind::ForeignKeyViolation
            | DatabaseErrorKind::NotNullViolation
            | DatabaseErrorKind::CheckViolation
    )
}

impl ApiError {
    pub fn status(&self) -> Status {
        match self {
            ApiError::Diesel(DieselError::NotFound) => Status::NotFound,
            ApiError::Diesel(DieselError::DatabaseError(kind, _)) if is_bad_input(kind) => {
                Status::BadRequest
            }
            ApiError::Validation(_) | ApiError::BadRequest => Status::BadRequest,
            ApiError::NotFound => Status::NotFound,
            ApiError::Pool(_) => Status::ServiceUnavailable,
            ApiError::Diesel(_) | ApiError::Internal => Status::InternalServerError,
        }
    }
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'static> {
        let status = self.status();
        match self {
            ApiError::Diesel(DieselError::DatabaseError(_, ref info)) if status == Status::BadRequest => {
                debug!("constraint violation: {}", info.message());
            }
            ApiError::Validation(ref errors) => {
                debug!("invalid request body: {:?}", errors);
            }
            ApiError::Pool(ref error) => {
                warn!("no database connection available: {}", error);
            }
            ref other if status == Status::InternalServerError => {
                error!("{} {} failed: {:?}", req.method(), req.uri(), other);
            }
            _ => {}
        }
        try_respond(req, &ErrorBody::for_status(status), status)
    }
}

/// Body of every error response: `{ "msg": "404: Not found" }`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub msg: String,
}

impl ErrorBody {
    pub fn for_status(status: Status) -> Self {
        let text = match status.code {
            400 => "Bad request",
            404 => "Not found",
            500 => "Internal server error",
            503 => "Service unavailable",
            _ => status.reason().unwrap_or("Unknown error"),
        };
        ErrorBody {
            msg: format!("{}: {}", status.code, text),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldError {
    MissingField,
    WrongType { expected: &'static str },
    Empty,
}

#[derive(Debug, Serialize, Default)]
pub struct ValidationError(HashMap<String, Vec<FieldError>>);

impl ValidationError {
    pub fn add_error<K: Into<String>>(&mut self, key: K, val: FieldError) {
        let entry = self.0.entry(key.into()).or_default();
        entry.push(val);
    }

    pub fn from<K: Into<String>>(key: K, val: FieldError) -> Self {
        let mut error = ValidationError::default();
        error.add_error(key, val);
        error
    }

    pub fn get(&self, key: &str) -> Option<&[FieldError]> {
        self.0.get(key).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn empty(&self) -> bool {
        self.len() == 0
    }
}

/// Pulls typed fields out of a JSON object, remembering what was wrong.
pub struct FieldReader {
    fields: Map<String, Value>,
    errors: ValidationError,
}

impl FieldReader {
    pub fn new(value: Value) -> Result<FieldReader, ValidationError> {
        match value {
            Value::Object(fields) => Ok(FieldReader {
                fields,
                errors: ValidationError::default(),
            }),
            _ => Err(ValidationError::from(
                "body",
                FieldError::WrongType { expected: "object" },
            )),
        }
    }

    fn lookup(&mut self, key: &str) -> Option<Value> {
        match self.fields.remove(key) {
            None | Some(Value::Null) => None,
            Some(value) => Some(value),
        }
    }

    pub fn string(&mut self, key: &str) -> Option<String> {
        match self.optional_string(key) {
            Some(value) => Some(value),
            None => {
                if self.errors.get(key).is_none() {
                    self.errors.add_error(key, FieldError::MissingField);
                }
                None
            }
        }
    }

    pub fn optional_string(&mut self, key: &str) -> Option<String> {
        match self.lookup(key) {
            Some(Value::String(value)) => Some(value),
            Some(_) => {
                self.errors
                    .add_error(key, FieldError::WrongType { expected: "string" });
                None
            }
            None => None,
        }
    }

    pub fn integer(&mut self, key: &str) -> Option<i32> {
        match self.lookup(key) {
            Some(Value::Number(number)) => {
                let value = number.as_i64().and_then(|n| i32::try_from(n).ok());
                if value.is_none() {
                    self.errors
                        .add_error(key, FieldError::WrongType { expected: "integer" });
                }
                value
            }
            Some(_) => {
                self.errors
                    .add_error(key, FieldError::WrongType { expected: "integer" });
                None
            }
            None => {
                self.errors.add_error(key, FieldError::MissingField);
                None
            }
        }
    }

    pub fn finish<T>(self, value: T) -> Result<T, ValidationError> {
        if self.errors.empty() {
            Ok(value)
        } else {
            Err(self.errors)
        }
    }

    pub fn into_errors(self) -> ValidationError {
        self.errors
    }
}
