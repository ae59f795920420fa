use diesel::prelude::*;

use crate::db::schema::users;

#[derive(Debug, Queryable, Selectable, Identifiable, Insertable, Serialize, Deserialize, PartialEq)]
#[diesel(table_name = users, primary_key(username))]
pub struct User {
    pub username: String,
    pub name: String,
    pub avatar_url: String,
}

impl User {
    pub fn all(connection: &mut PgConnection) -> QueryResult<Vec<User>> {
        users::table
            .select(User::as_select())
            .order(users::username.asc())
            .load(connection)
    }

    pub fn load_by_name(name: &str, connection: &mut PgConnection) -> QueryResult<User> {
        users::table
            .find(name)
            .select(User::as_select())
            .get_result(connection)
    }
}
