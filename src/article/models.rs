use chrono::{DateTime, Utc};
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Integer, Text, Timestamptz, Varchar};
use diesel::{insert_into, select, sql_query, update};
use serde_json::Value;

use crate::db::schema::articles;
use crate::types::*;
use crate::utils::serialize_date;

static SELECT_ARTICLE: &str = "SELECT articles.article_id, articles.author, articles.title, \
     articles.body, articles.topic, articles.created_at, articles.votes, articles.article_img_url, \
     COUNT(comments.comment_id) AS comment_count \
     FROM articles LEFT JOIN comments ON comments.article_id = articles.article_id \
     WHERE articles.article_id = $1 \
     GROUP BY articles.article_id";

#[derive(Identifiable, Queryable, Selectable, PartialEq, Debug, Serialize)]
#[diesel(table_name = articles, primary_key(article_id))]
pub struct Article {
    pub article_id: i32,
    pub title: String,
    pub topic: String,
    pub author: String,
    pub body: String,
    #[serde(serialize_with = "serialize_date")]
    pub created_at: DateTime<Utc>,
    pub votes: i32,
    pub article_img_url: String,
}

/// A full article together with the number of comments on it.
#[derive(Debug, QueryableByName, Serialize)]
pub struct ArticleDetail {
    #[diesel(sql_type = Integer)]
    pub article_id: i32,
    #[diesel(sql_type = Varchar)]
    pub author: String,
    #[diesel(sql_type = Varchar)]
    pub title: String,
    #[diesel(sql_type = Text)]
    pub body: String,
    #[diesel(sql_type = Varchar)]
    pub topic: String,
    #[diesel(sql_type = Timestamptz)]
    #[serde(serialize_with = "serialize_date")]
    pub created_at: DateTime<Utc>,
    #[diesel(sql_type = Integer)]
    pub votes: i32,
    #[diesel(sql_type = Varchar)]
    pub article_img_url: String,
    #[diesel(sql_type = BigInt)]
    pub comment_count: i64,
}

impl ArticleDetail {
    fn from(article: Article, comment_count: i64) -> Self {
        ArticleDetail {
            article_id: article.article_id,
            author: article.author,
            title: article.title,
            body: article.body,
            topic: article.topic,
            created_at: article.created_at,
            votes: article.votes,
            article_img_url: article.article_img_url,
            comment_count,
        }
    }
}

impl Article {
    pub fn find(id: i32, connection: &mut PgConnection) -> QueryResult<ArticleDetail> {
        sql_query(SELECT_ARTICLE)
            .bind::<Integer, _>(id)
            .get_result::<ArticleDetail>(connection)
    }

    pub fn exists(id: i32, connection: &mut PgConnection) -> QueryResult<bool> {
        select(exists(articles::table.find(id))).get_result::<bool>(connection)
    }

    /// Fails with `NotFound` unless an article with this id exists.
    pub fn ensure_exists(id: i32, connection: &mut PgConnection) -> Result<(), ApiError> {
        if Article::exists(id, connection)? {
            Ok(())
        } else {
            Err(ApiError::NotFound)
        }
    }

    /// Adds `delta` to the stored vote count in a single UPDATE.
    ///
    /// Fails with `BadRequest` when the total would leave `i32`.
    pub fn adjust_votes(id: i32, delta: i32, connection: &mut PgConnection) -> Result<Article, ApiError> {
        let (low, high) = vote_bounds(delta);
        let updated = update(articles::table.find(id).filter(articles::votes.between(low, high)))
            .set(articles::votes.eq(articles::votes + delta))
            .returning(Article::as_returning())
            .get_result(connection)
            .optional()?;
        match updated {
            Some(article) => Ok(article),
            None => {
                if Article::exists(id, connection)? {
                    debug!("vote of {} on article {} is out of range", delta, id);
                    Err(ApiError::BadRequest)
                } else {
                    Err(ApiError::NotFound)
                }
            }
        }
    }
}

#[derive(Debug, Insertable, PartialEq)]
#[diesel(table_name = articles)]
pub struct NewArticle {
    pub author: String,
    pub title: String,
    pub body: String,
    pub topic: String,
    /// `None` leaves the column to its database default.
    pub article_img_url: Option<String>,
}

impl FromJson for NewArticle {
    fn from_json(value: Value) -> Result<Self, ValidationError> {
        let mut fields = FieldReader::new(value)?;
        let author = fields.string("author");
        let title = fields.string("title");
        let body = fields.string("body");
        let topic = fields.string("topic");
        let article_img_url = fields.optional_string("article_img_url");
        match (author, title, body, topic) {
            (Some(author), Some(title), Some(body), Some(topic)) => fields.finish(NewArticle {
                author,
                title,
                body,
                topic,
                article_img_url,
            }),
            _ => Err(fields.into_errors()),
        }
    }
}

impl Validate for NewArticle {
    type Error = ValidationError;
    fn validate(self) -> Result<Self, ValidationError> {
        let mut error = ValidationError::default();
        if self.author.trim().is_empty() {
            error.add_error("author", FieldError::Empty);
        }

        if self.title.trim().is_empty() {
            error.add_error("title", FieldError::Empty);
        }

        if self.body.trim().is_empty() {
            error.add_error("body", FieldError::Empty);
        }

        if self.topic.trim().is_empty() {
            error.add_error("topic", FieldError::Empty);
        }

        if error.empty() {
            Ok(self)
        } else {
            Err(error)
        }
    }
}

impl NewArticle {
    pub fn insert(&self, connection: &mut PgConnection) -> QueryResult<ArticleDetail> {
        let article = insert_into(articles::table)
            .values(self)
            .returning(Article::as_returning())
            .get_result::<Article>(connection)?;
        Ok(ArticleDetail::from(article, 0))
    }
}
