use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{get, patch, post, State};

use crate::db::{DbConnection, Pool};
use crate::topic::Topic;
use crate::types::*;
use crate::utils::row_id;

pub mod models;
pub mod query;

pub use self::models::{Article, ArticleDetail, NewArticle};
pub use self::query::{ArticleQuery, ArticleSummary, ListParams, Order};

#[derive(Debug, Serialize)]
pub struct ArticleResponse<T> {
    article: T,
}

#[derive(Debug, Serialize)]
pub struct ArticlesResponse {
    articles: Vec<ArticleSummary>,
    total_count: i64,
}

#[get("/articles?<params..>")]
pub fn list(pool: &State<Pool>, params: ListParams<'_>) -> ApiResult<ArticlesResponse> {
    let query = ArticleQuery::from_params(&params)?;
    let mut connection = DbConnection::get(pool)?;

    // One snapshot for the page and its total.
    connection
        .build_transaction()
        .read_only()
        .repeatable_read()
        .run(|conn| {
            if let Some(topic) = query.topic() {
                if !Topic::exists(topic, conn)? {
                    return Err(ApiError::NotFound);
                }
            }

            let articles = query.load(conn)?;
            let total_count = query.count(conn)?;
            Ok(Json(ArticlesResponse {
                articles,
                total_count,
            }))
        })
}

#[get("/articles/<id>")]
pub fn get(pool: &State<Pool>, id: Result<i32, &str>) -> ApiResult<ArticleResponse<ArticleDetail>> {
    let id = row_id(id)?;
    let mut connection = DbConnection::get(pool)?;
    let article = Article::find(id, &mut connection)?;
    Ok(Json(ArticleResponse { article }))
}

#[post("/articles", data = "<create>")]
pub fn create(
    pool: &State<Pool>,
    create: JsonBody<'_>,
) -> Result<(Status, Json<ArticleResponse<ArticleDetail>>), ApiError> {
    let new_article = read_body::<NewArticle>(create)?.validate()?;
    let mut connection = DbConnection::get(pool)?;
    let article = new_article.insert(&mut connection)?;
    info!("created article {} by {}", article.article_id, article.author);
    Ok((Status::Created, Json(ArticleResponse { article })))
}

#[patch("/articles/<id>", data = "<vote>")]
pub fn vote(
    pool: &State<Pool>,
    id: Result<i32, &str>,
    vote: JsonBody<'_>,
) -> ApiResult<ArticleResponse<Article>> {
    let id = row_id(id)?;
    let vote = read_body::<VoteChange>(vote)?;
    let mut connection = DbConnection::get(pool)?;
    let article = Article::adjust_votes(id, vote.inc_votes, &mut connection)?;
    Ok(Json(ArticleResponse { article }))
}
