//! End to end checks against a seeded PostgreSQL database.
//!
//! Run with `TEST_DATABASE_URL=postgres://... cargo test -- --ignored`.

mod common;

use common::{delete, get, msg, patch, post, seeded_client};
use rocket::http::Status;
use serde_json::{json, Value};
use std::cmp::Ordering;
use std::collections::HashSet;

const SEEDED_IMAGE: &str =
    "https://images.pexels.com/photos/158651/news-newsletter-newspaper-information-158651.jpeg?w=700&h=700";
const DEFAULT_IMAGE: &str =
    "https://images.pexels.com/photos/97050/pexels-photo-97050.jpeg?w=700&h=700";

fn ids(list: &Value, key: &str) -> Vec<i64> {
    list.as_array()
        .unwrap()
        .iter()
        .map(|item| item[key].as_i64().unwrap())
        .collect()
}

fn compare(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => a.as_i64().cmp(&b.as_i64()),
        (Value::String(a), Value::String(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
        _ => panic!("cannot compare {} with {}", a, b),
    }
}

fn is_sorted_by(list: &Value, key: &str, descending: bool) -> bool {
    list.as_array().unwrap().windows(2).all(|pair| {
        let ordering = compare(&pair[0][key], &pair[1][key]);
        if descending {
            ordering != Ordering::Less
        } else {
            ordering != Ordering::Greater
        }
    })
}

#[test]
#[ignore = "needs TEST_DATABASE_URL"]
fn lists_topics() {
    let seeded = seeded_client();
    let (status, body) = get(&seeded.client, "/api/topics");
    assert_eq!(status, Status::Ok);

    let topics = body["topics"].as_array().unwrap();
    assert_eq!(topics.len(), 3);
    assert!(topics
        .iter()
        .all(|t| t["slug"].is_string() && t["description"].is_string()));
    assert!(topics.contains(&json!({ "slug": "cats", "description": "Not dogs" })));
}

#[test]
#[ignore = "needs TEST_DATABASE_URL"]
fn gets_one_article_with_comment_count() {
    let seeded = seeded_client();
    let (status, body) = get(&seeded.client, "/api/articles/1");
    assert_eq!(status, Status::Ok);
    assert_eq!(
        body["article"],
        json!({
            "article_id": 1,
            "title": "Living in the shadow of a great man",
            "topic": "mitch",
            "author": "butter_bridge",
            "body": "I find this existence challenging",
            "created_at": "2020-07-09T20:11:00.000Z",
            "votes": 100,
            "article_img_url": SEEDED_IMAGE,
            "comment_count": 11
        })
    );

    let (_, body) = get(&seeded.client, "/api/articles/4");
    assert_eq!(body["article"]["comment_count"], 0);
}

#[test]
#[ignore = "needs TEST_DATABASE_URL"]
fn missing_article_is_not_found() {
    let seeded = seeded_client();
    let (status, body) = get(&seeded.client, "/api/articles/999999");
    assert_eq!(status, Status::NotFound);
    assert_eq!(msg(&body), "404: Not found");
}

#[test]
#[ignore = "needs TEST_DATABASE_URL"]
fn lists_newest_articles_first() {
    let seeded = seeded_client();
    let (status, body) = get(&seeded.client, "/api/articles");
    assert_eq!(status, Status::Ok);
    assert_eq!(body["total_count"], 13);

    let articles = &body["articles"];
    assert_eq!(ids(articles, "article_id"), vec![3, 6, 2, 13, 12, 5, 1, 9, 10, 4]);
    assert!(is_sorted_by(articles, "created_at", true));
    for article in articles.as_array().unwrap() {
        assert!(article.get("body").is_none());
        for key in ["author", "title", "topic", "created_at", "article_img_url"] {
            assert!(article[key].is_string(), "{} should be a string", key);
        }
        for key in ["article_id", "votes", "comment_count"] {
            assert!(article[key].is_i64(), "{} should be a number", key);
        }
    }
}

#[test]
#[ignore = "needs TEST_DATABASE_URL"]
fn sorts_by_every_allowed_column() {
    let seeded = seeded_client();
    let columns = [
        "author",
        "article_id",
        "title",
        "topic",
        "created_at",
        "votes",
        "article_img_url",
        "comment_count",
    ];
    for column in columns {
        for (order, descending) in [("asc", false), ("desc", true)] {
            let uri = format!("/api/articles?sort_by={}&order={}", column, order);
            let (status, body) = get(&seeded.client, &uri);
            assert_eq!(status, Status::Ok, "{}", uri);
            assert!(is_sorted_by(&body["articles"], column, descending), "{}", uri);
        }
    }
}

#[test]
#[ignore = "needs TEST_DATABASE_URL"]
fn ties_break_on_newest_id() {
    let seeded = seeded_client();
    let (_, body) = get(&seeded.client, "/api/articles?sort_by=comment_count");
    assert_eq!(
        ids(&body["articles"], "article_id"),
        vec![1, 9, 5, 3, 6, 13, 12, 11, 10, 8]
    );

    let (_, body) = get(
        &seeded.client,
        "/api/articles?topic=mitch&sort_by=author&order=asc&limit=5",
    );
    assert_eq!(ids(&body["articles"], "article_id"), vec![13, 12, 9, 1, 11]);
}

#[test]
#[ignore = "needs TEST_DATABASE_URL"]
fn filters_by_topic() {
    let seeded = seeded_client();
    let (status, body) = get(&seeded.client, "/api/articles?topic=mitch");
    assert_eq!(status, Status::Ok);
    assert_eq!(body["total_count"], 12);
    assert!(body["articles"]
        .as_array()
        .unwrap()
        .iter()
        .all(|a| a["topic"] == "mitch"));

    let (_, body) = get(&seeded.client, "/api/articles?topic=cats");
    assert_eq!(ids(&body["articles"], "article_id"), vec![5]);
    assert_eq!(body["total_count"], 1);
}

#[test]
#[ignore = "needs TEST_DATABASE_URL"]
fn known_topic_without_articles_is_empty() {
    let seeded = seeded_client();
    let (status, body) = get(&seeded.client, "/api/articles?topic=paper");
    assert_eq!(status, Status::Ok);
    assert_eq!(body["articles"], json!([]));
    assert_eq!(body["total_count"], 0);
}

#[test]
#[ignore = "needs TEST_DATABASE_URL"]
fn empty_topic_lists_everything() {
    let seeded = seeded_client();
    let (status, body) = get(&seeded.client, "/api/articles?topic=");
    assert_eq!(status, Status::Ok);
    assert_eq!(body["total_count"], 13);
    assert_eq!(body["articles"].as_array().unwrap().len(), 10);
}

#[test]
#[ignore = "needs TEST_DATABASE_URL"]
fn unknown_topic_is_not_found() {
    let seeded = seeded_client();
    let (status, body) = get(&seeded.client, "/api/articles?topic=banana");
    assert_eq!(status, Status::NotFound);
    assert_eq!(msg(&body), "404: Not found");
}

#[test]
#[ignore = "needs TEST_DATABASE_URL"]
fn pages_through_articles() {
    let seeded = seeded_client();
    let (_, body) = get(&seeded.client, "/api/articles?limit=5");
    assert_eq!(ids(&body["articles"], "article_id"), vec![3, 6, 2, 13, 12]);
    assert_eq!(body["total_count"], 13);

    let (_, body) = get(&seeded.client, "/api/articles?limit=5&p=2");
    assert_eq!(ids(&body["articles"], "article_id"), vec![5, 1, 9, 10, 4]);

    let (_, body) = get(&seeded.client, "/api/articles?p=2");
    assert_eq!(ids(&body["articles"], "article_id"), vec![8, 11, 7]);

    let (status, body) = get(&seeded.client, "/api/articles?p=3");
    assert_eq!(status, Status::Ok);
    assert_eq!(body["articles"], json!([]));
    assert_eq!(body["total_count"], 13);

    let (_, body) = get(&seeded.client, "/api/articles?topic=mitch&limit=5");
    assert_eq!(body["articles"].as_array().unwrap().len(), 5);
    assert_eq!(body["total_count"], 12);
}

#[test]
#[ignore = "needs TEST_DATABASE_URL"]
fn pages_cover_every_article_once() {
    let seeded = seeded_client();
    let mut seen = HashSet::new();
    let mut sizes = Vec::new();
    for page in 1..=5 {
        let (_, body) = get(&seeded.client, &format!("/api/articles?limit=4&p={}", page));
        let page_ids = ids(&body["articles"], "article_id");
        sizes.push(page_ids.len());
        seen.extend(page_ids);
    }
    assert_eq!(sizes, vec![4, 4, 4, 1, 0]);
    assert_eq!(seen, (1..=13).collect::<HashSet<i64>>());
}

#[test]
#[ignore = "needs TEST_DATABASE_URL"]
fn creates_an_article() {
    let seeded = seeded_client();
    let (status, body) = post(
        &seeded.client,
        "/api/articles",
        json!({
            "author": "lurker",
            "title": "Why cats sit on keyboards",
            "body": "Warmth, mostly.",
            "topic": "cats"
        }),
    );
    assert_eq!(status, Status::Created);

    let article = &body["article"];
    assert_eq!(article["article_id"], 14);
    assert_eq!(article["author"], "lurker");
    assert_eq!(article["votes"], 0);
    assert_eq!(article["comment_count"], 0);
    assert_eq!(article["article_img_url"], DEFAULT_IMAGE);
    assert!(article["created_at"].is_string());

    let (_, body) = get(&seeded.client, "/api/articles?topic=cats");
    assert_eq!(body["total_count"], 2);
}

#[test]
#[ignore = "needs TEST_DATABASE_URL"]
fn article_references_must_exist() {
    let seeded = seeded_client();
    let unknown_author = json!({
        "author": "nobody",
        "title": "t",
        "body": "b",
        "topic": "cats"
    });
    let unknown_topic = json!({
        "author": "lurker",
        "title": "t",
        "body": "b",
        "topic": "dogs"
    });
    for body in [unknown_author, unknown_topic] {
        let (status, response) = post(&seeded.client, "/api/articles", body);
        assert_eq!(status, Status::BadRequest);
        assert_eq!(msg(&response), "400: Bad request");
    }
}

#[test]
#[ignore = "needs TEST_DATABASE_URL"]
fn votes_on_articles() {
    let seeded = seeded_client();
    let (status, body) = patch(&seeded.client, "/api/articles/4", json!({ "inc_votes": 8 }));
    assert_eq!(status, Status::Ok);
    assert_eq!(body["article"]["article_id"], 4);
    assert_eq!(body["article"]["votes"], 8);
    assert_eq!(body["article"]["title"], "Student SUES Mitch!");

    let (_, body) = patch(&seeded.client, "/api/articles/1", json!({ "inc_votes": -105 }));
    assert_eq!(body["article"]["votes"], -5);

    let (status, body) = patch(&seeded.client, "/api/articles/99999", json!({ "inc_votes": 1 }));
    assert_eq!(status, Status::NotFound);
    assert_eq!(msg(&body), "404: Not found");
}

#[test]
#[ignore = "needs TEST_DATABASE_URL"]
fn votes_that_overflow_are_rejected() {
    let seeded = seeded_client();
    let (status, body) = patch(
        &seeded.client,
        "/api/articles/1",
        json!({ "inc_votes": 2147483647 }),
    );
    assert_eq!(status, Status::BadRequest);
    assert_eq!(msg(&body), "400: Bad request");

    let (_, body) = get(&seeded.client, "/api/articles/1");
    assert_eq!(body["article"]["votes"], 100);

    let (status, body) = patch(
        &seeded.client,
        "/api/articles/4",
        json!({ "inc_votes": 2147483647 }),
    );
    assert_eq!(status, Status::Ok);
    assert_eq!(body["article"]["votes"], 2147483647);

    let (status, body) = patch(
        &seeded.client,
        "/api/comments/4",
        json!({ "inc_votes": -2147483647 }),
    );
    assert_eq!(status, Status::BadRequest);
    assert_eq!(msg(&body), "400: Bad request");

    let (status, _) = patch(
        &seeded.client,
        "/api/comments/99999",
        json!({ "inc_votes": -2147483647 }),
    );
    assert_eq!(status, Status::NotFound);
}

#[test]
#[ignore = "needs TEST_DATABASE_URL"]
fn lists_comments_newest_first() {
    let seeded = seeded_client();
    let (status, body) = get(&seeded.client, "/api/articles/1/comments");
    assert_eq!(status, Status::Ok);

    let comments = &body["comments"];
    assert_eq!(
        ids(comments, "comment_id"),
        vec![5, 2, 18, 13, 7, 8, 6, 12, 3, 4, 9]
    );
    assert!(is_sorted_by(comments, "created_at", true));
    assert!(comments
        .as_array()
        .unwrap()
        .iter()
        .all(|c| c["article_id"] == 1 && c["body"].is_string() && c["author"].is_string()));
}

#[test]
#[ignore = "needs TEST_DATABASE_URL"]
fn article_without_comments_has_empty_list() {
    let seeded = seeded_client();
    let (status, body) = get(&seeded.client, "/api/articles/2/comments");
    assert_eq!(status, Status::Ok);
    assert_eq!(body["comments"], json!([]));

    let (status, _) = get(&seeded.client, "/api/articles/999999/comments");
    assert_eq!(status, Status::NotFound);
}

#[test]
#[ignore = "needs TEST_DATABASE_URL"]
fn posts_a_comment() {
    let seeded = seeded_client();
    let (status, body) = post(
        &seeded.client,
        "/api/articles/3/comments",
        json!({ "username": "lurker", "body": "Brilliant article! Definitely worth a read!" }),
    );
    assert_eq!(status, Status::Created);
    let comment = &body["comment"];
    assert_eq!(comment["comment_id"], 19);
    assert_eq!(comment["article_id"], 3);
    assert_eq!(comment["author"], "lurker");
    assert_eq!(comment["body"], "Brilliant article! Definitely worth a read!");
    assert_eq!(comment["votes"], 0);

    let (_, body) = get(&seeded.client, "/api/articles/3");
    assert_eq!(body["article"]["comment_count"], 3);
}

#[test]
#[ignore = "needs TEST_DATABASE_URL"]
fn comment_targets_must_exist() {
    let seeded = seeded_client();
    let (status, _) = post(
        &seeded.client,
        "/api/articles/99999/comments",
        json!({ "username": "lurker", "body": "hello" }),
    );
    assert_eq!(status, Status::NotFound);

    let (status, body) = post(
        &seeded.client,
        "/api/articles/3/comments",
        json!({ "username": "not_a_user", "body": "hello" }),
    );
    assert_eq!(status, Status::BadRequest);
    assert_eq!(msg(&body), "400: Bad request");
}

#[test]
#[ignore = "needs TEST_DATABASE_URL"]
fn votes_on_comments() {
    let seeded = seeded_client();
    let (status, body) = patch(&seeded.client, "/api/comments/10", json!({ "inc_votes": 3 }));
    assert_eq!(status, Status::Ok);
    assert_eq!(body["comment"]["comment_id"], 10);
    assert_eq!(body["comment"]["votes"], 3);
    assert_eq!(body["comment"]["body"], "git push origin master");

    let (_, body) = patch(&seeded.client, "/api/comments/1", json!({ "inc_votes": -3 }));
    assert_eq!(body["comment"]["votes"], 13);

    let (status, _) = patch(&seeded.client, "/api/comments/99999", json!({ "inc_votes": 1 }));
    assert_eq!(status, Status::NotFound);
}

#[test]
#[ignore = "needs TEST_DATABASE_URL"]
fn deletes_a_comment() {
    let seeded = seeded_client();
    let (status, body) = delete(&seeded.client, "/api/comments/3");
    assert_eq!(status, Status::NoContent);
    assert!(body.unwrap_or_default().is_empty());

    let (_, article) = get(&seeded.client, "/api/articles/1");
    assert_eq!(article["article"]["comment_count"], 10);

    let (status, _) = delete(&seeded.client, "/api/comments/3");
    assert_eq!(status, Status::NotFound);

    let (status, _) = delete(&seeded.client, "/api/comments/99999");
    assert_eq!(status, Status::NotFound);
}

#[test]
#[ignore = "needs TEST_DATABASE_URL"]
fn lists_and_finds_users() {
    let seeded = seeded_client();
    let (status, body) = get(&seeded.client, "/api/users");
    assert_eq!(status, Status::Ok);
    let users = body["users"].as_array().unwrap();
    assert_eq!(users.len(), 4);
    assert!(users
        .iter()
        .all(|u| u["username"].is_string() && u["name"].is_string() && u["avatar_url"].is_string()));

    let (status, body) = get(&seeded.client, "/api/users/lurker");
    assert_eq!(status, Status::Ok);
    assert_eq!(
        body["user"],
        json!({
            "username": "lurker",
            "name": "do_nothing",
            "avatar_url": "https://www.golenbock.com/wp-content/uploads/2015/01/placeholder-user.png"
        })
    );

    let (status, body) = get(&seeded.client, "/api/users/happyBunny123");
    assert_eq!(status, Status::NotFound);
    assert_eq!(msg(&body), "404: Not found");
}
