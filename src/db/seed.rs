//! Recreates the tables and fills them with fixture data.
use chrono::{DateTime, Utc};
use diesel::connection::SimpleConnection;
use diesel::insert_into;
use diesel::prelude::*;
use std::fs;
use std::path::Path;

use super::schema::{articles, comments, topics, users};
use super::Error;
use super::{Result, ResultExt};
use crate::topic::Topic;
use crate::users::User;

static SCHEMA: &str = include_str!("schema.sql");

static TEST_TOPICS: &str = include_str!("../../data/test/topics.json");
static TEST_USERS: &str = include_str!("../../data/test/users.json");
static TEST_ARTICLES: &str = include_str!("../../data/test/articles.json");
static TEST_COMMENTS: &str = include_str!("../../data/test/comments.json");

#[derive(Debug, Deserialize, Insertable)]
#[diesel(table_name = articles)]
pub struct ArticleSeed {
    pub title: String,
    pub topic: String,
    pub author: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub votes: i32,
    pub article_img_url: Option<String>,
}

#[derive(Debug, Deserialize, Insertable)]
#[diesel(table_name = comments)]
pub struct CommentSeed {
    pub article_id: i32,
    pub body: String,
    #[serde(default)]
    pub votes: i32,
    pub author: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct SeedData {
    pub topics: Vec<Topic>,
    pub users: Vec<User>,
    pub articles: Vec<ArticleSeed>,
    pub comments: Vec<CommentSeed>,
}

impl SeedData {
    /// The fixture set the integration tests are written against.
    pub fn test() -> Result<SeedData> {
        SeedData::parse(TEST_TOPICS, TEST_USERS, TEST_ARTICLES, TEST_COMMENTS)
    }

    /// Reads `topics.json`, `users.json`, `articles.json` and `comments.json`
    /// from `dir`.
    pub fn from_dir(dir: &Path) -> Result<SeedData> {
        let read = |name: &str| -> Result<String> {
            let path = dir.join(name);
            fs::read_to_string(&path)
                .chain_err(|| format!("cannot read {}", path.display()))
        };
        SeedData::parse(
            &read("topics.json")?,
            &read("users.json")?,
            &read("articles.json")?,
            &read("comments.json")?,
        )
    }

    fn parse(topics: &str, users: &str, articles: &str, comments: &str) -> Result<SeedData> {
        Ok(SeedData {
            topics: serde_json::from_str(topics)?,
            users: serde_json::from_str(users)?,
            articles: serde_json::from_str(articles)?,
            comments: serde_json::from_str(comments)?,
        })
    }
}

/// Drops and recreates every table, then inserts `data`.
///
/// Articles get their ids in insertion order, so comment fixtures refer to
/// articles by their position in `articles.json`, starting at 1.
pub fn seed(connection: &mut PgConnection, data: &SeedData) -> Result<()> {
    connection.transaction::<_, Error, _>(|conn| {
        conn.batch_execute(SCHEMA)?;
        insert_into(topics::table).values(&data.topics).execute(conn)?;
        insert_into(users::table).values(&data.users).execute(conn)?;
        insert_into(articles::table).values(&data.articles).execute(conn)?;
        insert_into(comments::table).values(&data.comments).execute(conn)?;
        Ok(())
    })?;
    info!(
        "seeded {} topics, {} users, {} articles, {} comments",
        data.topics.len(),
        data.users.len(),
        data.articles.len(),
        data.comments.len()
    );
    Ok(())
}
