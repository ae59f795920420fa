//! Listing query for `GET /api/articles`.
//!
//! Sorting, filtering and paging all come from the query string. Column names
//! and directions are looked up in fixed tables and every user supplied value
//! travels as a bind parameter, so nothing from the request is ever spliced
//! into the SQL text.
use chrono::{DateTime, Utc};
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::query_builder::{BoxedSqlQuery, SqlQuery};
use diesel::sql_query;
use diesel::sql_types::{BigInt, Integer, Text, Timestamptz, Varchar};
use rocket::FromForm;
use std::collections::HashMap;
use std::fmt::Write;

use crate::db::schema::articles;
use crate::types::ApiError;
use crate::utils::serialize_date;

pub const DEFAULT_LIMIT: i64 = 10;
pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_SORT_BY: &str = "created_at";

static SELECT_SUMMARIES: &str = "SELECT articles.author, articles.title, articles.article_id, \
     articles.topic, articles.created_at, articles.votes, articles.article_img_url, \
     COUNT(comments.comment_id) AS comment_count \
     FROM articles LEFT JOIN comments ON comments.article_id = articles.article_id";

lazy_static! {
    static ref SORTABLE_COLUMNS: HashMap<&'static str, &'static str> = {
        let mut columns = HashMap::new();
        columns.insert("author", "articles.author");
        columns.insert("article_id", "articles.article_id");
        columns.insert("title", "articles.title");
        columns.insert("topic", "articles.topic");
        columns.insert("created_at", "articles.created_at");
        columns.insert("votes", "articles.votes");
        columns.insert("article_img_url", "articles.article_img_url");
        columns.insert("comment_count", "comment_count");
        columns
    };
}

/// Raw query string of the listing endpoint, before any validation.
///
/// Every key is collected so a repeated key can be refused instead of
/// silently picking one of its values.
#[derive(Debug, Default, FromForm)]
pub struct ListParams<'r> {
    pub sort_by: Vec<&'r str>,
    pub order: Vec<&'r str>,
    pub topic: Vec<&'r str>,
    pub limit: Vec<&'r str>,
    pub p: Vec<&'r str>,
    pub page: Vec<&'r str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

impl Order {
    pub fn parse(value: &str) -> Option<Order> {
        match value {
            "asc" => Some(Order::Asc),
            "desc" => Some(Order::Desc),
            _ => None,
        }
    }

    fn sql(self) -> &'static str {
        match self {
            Order::Asc => "ASC",
            Order::Desc => "DESC",
        }
    }
}

/// One row of the article listing: the article without its body, plus the
/// number of comments it has.
#[derive(Debug, QueryableByName, Serialize)]
pub struct ArticleSummary {
    #[diesel(sql_type = Varchar)]
    pub author: String,
    #[diesel(sql_type = Varchar)]
    pub title: String,
    #[diesel(sql_type = Integer)]
    pub article_id: i32,
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

/// A validated listing request.
#[derive(Debug, PartialEq, Eq)]
pub struct ArticleQuery {
    sort_column: &'static str,
    order: Order,
    topic: Option<String>,
    limit: i64,
    page: i64,
    offset: i64,
}

fn single<'r>(name: &str, values: &[&'r str]) -> Result<Option<&'r str>, ApiError> {
    match values {
        [] => Ok(None),
        [value] => Ok(Some(*value)),
        _ => {
            debug!("rejected repeated {}={:?}", name, values);
            Err(ApiError::BadRequest)
        }
    }
}

fn positive(name: &str, value: Option<&str>, default: i64) -> Result<i64, ApiError> {
    match value {
        None => Ok(default),
        Some(raw) => match raw.parse::<i64>() {
            Ok(n) if n > 0 => Ok(n),
            _ => {
                debug!("rejected {}={:?}", name, raw);
                Err(ApiError::BadRequest)
            }
        },
    }
}

impl ArticleQuery {
    pub fn from_params(params: &ListParams) -> Result<ArticleQuery, ApiError> {
        let sort_by = single("sort_by", &params.sort_by)?.unwrap_or(DEFAULT_SORT_BY);
        let sort_column = match SORTABLE_COLUMNS.get(sort_by) {
            Some(column) => *column,
            None => {
                debug!("rejected sort_by={:?}", sort_by);
                return Err(ApiError::BadRequest);
            }
        };

        let order = match single("order", &params.order)? {
            None => Order::Desc,
            Some(raw) => Order::parse(raw).ok_or_else(|| {
                debug!("rejected order={:?}", raw);
                ApiError::BadRequest
            })?,
        };

        let limit = positive("limit", single("limit", &params.limit)?, DEFAULT_LIMIT)?;
        let p = single("p", &params.p)?;
        let page = single("page", &params.page)?;
        let page = positive("p", p.or(page), DEFAULT_PAGE)?;
        // An empty `topic=` means no filter.
        let topic = single("topic", &params.topic)?.filter(|topic| !topic.is_empty());
        let offset = (page - 1).checked_mul(limit).ok_or(ApiError::BadRequest)?;

        Ok(ArticleQuery {
            sort_column,
            order,
            topic: topic.map(String::from),
            limit,
            page,
            offset,
        })
    }

    pub fn topic(&self) -> Option<&str> {
        self.topic.as_deref()
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn offset(&self) -> i64 {
        self.offset
    }

    /// SQL text of the page query. Placeholders are numbered in bind order:
    /// topic (when filtering), then limit, then offset.
    pub fn to_sql(&self) -> String {
        let mut sql = String::from(SELECT_SUMMARIES);
        let mut next_param = 1;
        if self.topic.is_some() {
            let _ = write!(sql, " WHERE articles.topic = ${}", next_param);
            next_param += 1;
        }
        let _ = write!(
            sql,
            " GROUP BY articles.article_id ORDER BY {} {}, articles.article_id DESC LIMIT ${} OFFSET ${}",
            self.sort_column,
            self.order.sql(),
            next_param,
            next_param + 1
        );
        sql
    }

    pub fn load(&self, connection: &mut PgConnection) -> QueryResult<Vec<ArticleSummary>> {
        let mut query: BoxedSqlQuery<'_, Pg, SqlQuery> = sql_query(self.to_sql()).into_boxed();
        if let Some(topic) = &self.topic {
            query = query.bind::<Text, _>(topic.clone());
        }
        query
            .bind::<BigInt, _>(self.limit)
            .bind::<BigInt, _>(self.offset)
            .load::<ArticleSummary>(connection)
    }

    /// Number of articles matching the filter, ignoring paging.
    pub fn count(&self, connection: &mut PgConnection) -> QueryResult<i64> {
        let mut query = articles::table.into_boxed::<Pg>();
        if let Some(topic) = &self.topic {
            query = query.filter(articles::topic.eq(topic));
        }
        query.count().get_result(connection)
    }
}
