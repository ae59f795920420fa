use diesel::dsl::exists;
use diesel::prelude::*;
use diesel::select;
use rocket::serde::json::Json;
use rocket::{get, State};

use crate::db::schema::topics;
use crate::db::{DbConnection, Pool};
use crate::types::ApiResult;

#[derive(Debug, Queryable, Selectable, Insertable, Serialize, Deserialize, PartialEq)]
#[diesel(table_name = topics)]
pub struct Topic {
    pub slug: String,
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct TopicsResponse {
    topics: Vec<Topic>,
}

impl Topic {
    pub fn all(connection: &mut PgConnection) -> QueryResult<Vec<Topic>> {
        topics::table
            .select(Topic::as_select())
            .order(topics::slug.asc())
            .load(connection)
    }

    pub fn exists(slug: &str, connection: &mut PgConnection) -> QueryResult<bool> {
        select(exists(topics::table.filter(topics::slug.eq(slug)))).get_result::<bool>(connection)
    }
}

#[get("/topics")]
pub fn list(pool: &State<Pool>) -> ApiResult<TopicsResponse> {
    let mut connection = DbConnection::get(pool)?;
    let topics = Topic::all(&mut connection)?;
    Ok(Json(TopicsResponse { topics }))
}
