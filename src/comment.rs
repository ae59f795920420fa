use chrono::{DateTime, Utc};
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel::{delete as diesel_delete, insert_into, select, update};
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{delete, get, patch, post, State};
use serde_json::Value;

use crate::article::Article;
use crate::db::schema::comments;
use crate::db::{DbConnection, Pool};
use crate::types::*;
use crate::utils::{row_id, serialize_date};

#[derive(Debug, Serialize, Identifiable, Queryable, Selectable, PartialEq)]
#[diesel(table_name = comments, primary_key(comment_id))]
pub struct Comment {
    pub comment_id: i32,
    pub article_id: i32,
    pub body: String,
    pub votes: i32,
    pub author: String,
    #[serde(serialize_with = "serialize_date")]
    pub created_at: DateTime<Utc>,
}

/// Request body of `POST /api/articles/:id/comments`.
#[derive(Debug, PartialEq)]
pub struct CommentBody {
    pub username: String,
    pub body: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = comments)]
pub struct NewComment {
    article_id: i32,
    author: String,
    body: String,
}

#[derive(Debug, Serialize)]
pub struct CommentContainer<T> {
    comment: T,
}

#[derive(Debug, Serialize)]
pub struct CommentsContainer<T> {
    comments: T,
}

impl FromJson for CommentBody {
    fn from_json(value: Value) -> Result<Self, ValidationError> {
        let mut fields = FieldReader::new(value)?;
        let username = fields.string("username");
        let body = fields.string("body");
        match (username, body) {
            (Some(username), Some(body)) => fields.finish(CommentBody { username, body }),
            _ => Err(fields.into_errors()),
        }
    }
}

impl Validate for CommentBody {
    type Error = ValidationError;
    fn validate(self) -> Result<Self, ValidationError> {
        let mut error = ValidationError::default();
        if self.username.trim().is_empty() {
            error.add_error("username", FieldError::Empty);
        }

        if self.body.trim().is_empty() {
            error.add_error("body", FieldError::Empty);
        }

        if error.empty() {
            Ok(self)
        } else {
            Err(error)
        }
    }
}

impl Comment {
    /// Comments on one article, newest first.
    pub fn for_article(article_id: i32, connection: &mut PgConnection) -> QueryResult<Vec<Comment>> {
        comments::table
            .filter(comments::article_id.eq(article_id))
            .order((comments::created_at.desc(), comments::comment_id.desc()))
            .select(Comment::as_select())
            .load(connection)
    }

    pub fn exists(id: i32, connection: &mut PgConnection) -> QueryResult<bool> {
        select(exists(comments::table.find(id))).get_result::<bool>(connection)
    }

    /// Same contract as `Article::adjust_votes`.
    pub fn adjust_votes(id: i32, delta: i32, connection: &mut PgConnection) -> Result<Comment, ApiError> {
        let (low, high) = vote_bounds(delta);
        let updated = update(comments::table.find(id).filter(comments::votes.between(low, high)))
            .set(comments::votes.eq(comments::votes + delta))
            .returning(Comment::as_returning())
            .get_result(connection)
            .optional()?;
        match updated {
            Some(comment) => Ok(comment),
            None => {
                if Comment::exists(id, connection)? {
                    debug!("vote of {} on comment {} is out of range", delta, id);
                    Err(ApiError::BadRequest)
                } else {
                    Err(ApiError::NotFound)
                }
            }
        }
    }

    /// Removes the comment, failing with `NotFound` if there was none.
    pub fn remove(id: i32, connection: &mut PgConnection) -> Result<(), ApiError> {
        let deleted = diesel_delete(comments::table.find(id)).execute(connection)?;
        if deleted == 0 {
            Err(ApiError::NotFound)
        } else {
            Ok(())
        }
    }
}

impl NewComment {
    pub fn new(article_id: i32, details: CommentBody) -> Self {
        NewComment {
            article_id,
            author: details.username,
            body: details.body,
        }
    }

    pub fn insert(&self, connection: &mut PgConnection) -> QueryResult<Comment> {
        insert_into(comments::table)
            .values(self)
            .returning(Comment::as_returning())
            .get_result(connection)
    }
}

#[get("/articles/<id>/comments")]
pub fn list(
    pool: &State<Pool>,
    id: Result<i32, &str>,
) -> ApiResult<CommentsContainer<Vec<Comment>>> {
    let id = row_id(id)?;
    let mut connection = DbConnection::get(pool)?;
    Article::ensure_exists(id, &mut connection)?;
    let comments = Comment::for_article(id, &mut connection)?;
    Ok(Json(CommentsContainer { comments }))
}

#[post("/articles/<id>/comments", data = "<details>")]
pub fn add(
    pool: &State<Pool>,
    id: Result<i32, &str>,
    details: JsonBody<'_>,
) -> Result<(Status, Json<CommentContainer<Comment>>), ApiError> {
    let id = row_id(id)?;
    let details = read_body::<CommentBody>(details)?.validate()?;
    let mut connection = DbConnection::get(pool)?;
    Article::ensure_exists(id, &mut connection)?;
    let comment = NewComment::new(id, details).insert(&mut connection)?;
    Ok((Status::Created, Json(CommentContainer { comment })))
}

#[patch("/comments/<id>", data = "<vote>")]
pub fn vote(
    pool: &State<Pool>,
    id: Result<i32, &str>,
    vote: JsonBody<'_>,
) -> ApiResult<CommentContainer<Comment>> {
    let id = row_id(id)?;
    let vote = read_body::<VoteChange>(vote)?;
    let mut connection = DbConnection::get(pool)?;
    let comment = Comment::adjust_votes(id, vote.inc_votes, &mut connection)?;
    Ok(Json(CommentContainer { comment }))
}

#[delete("/comments/<id>")]
pub fn delete(pool: &State<Pool>, id: Result<i32, &str>) -> Result<Status, ApiError> {
    let id = row_id(id)?;
    let mut connection = DbConnection::get(pool)?;
    Comment::remove(id, &mut connection)?;
    Ok(Status::NoContent)
}
