mod common;

use axum::http::StatusCode;
use bookapi_app::modules::books::entity as book;
use common::spawn_app;
use sea_orm::{EntityTrait, PaginatorTrait};
use serde_json::json;

#[tokio::test]
async fn created_author_is_served_at_its_location() {
    let app = spawn_app().await;

    let created = app
        .post(
            "/api/authors",
            json!({ "firstName": "Ursula", "lastName": "Le Guin" }),
            None,
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    let id = created.json()["id"].as_i64().unwrap();
    assert_eq!(created.location(), format!("/api/authors/{id}"));

    let fetched = app.get(created.location()).await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.json(), created.json());
    assert_eq!(
        fetched.json(),
        json!({ "id": id, "firstName": "Ursula", "lastName": "Le Guin", "books": [] })
    );
}

#[tokio::test]
async fn invalid_author_is_rejected_and_not_stored() {
    let app = spawn_app().await;

    let response = app
        .post("/api/authors", json!({ "firstName": "", "lastName": "x".repeat(256) }), None)
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let body = response.json();
    assert_eq!(body["error"]["code"], "validation_error");
    let fields: Vec<_> = body["error"]["details"]
        .as_array()
        .unwrap()
        .iter()
        .map(|violation| violation["field"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(fields, vec!["firstName", "lastName"]);

    assert_eq!(app.get("/api/authors").await.json(), json!([]));
}

#[tokio::test]
async fn list_is_ordered_and_embeds_books() {
    let app = spawn_app().await.with_users().await;
    let first = app.create_author("A", "One").await;
    let second = app.create_author("B", "Two").await;
    app.create_book("Second's book", Some(second)).await;

    let list = app.get("/api/authors").await.json();
    assert_eq!(list[0]["id"], first);
    assert_eq!(list[0]["books"], json!([]));
    assert_eq!(list[1]["id"], second);
    assert_eq!(list[1]["books"][0]["title"], "Second's book");
    assert!(list[1]["books"][0].get("author").is_none());
}

#[tokio::test]
async fn update_applies_only_present_fields() {
    let app = spawn_app().await;
    let id = app.create_author("Terry", "Pratchet").await;

    let response = app
        .put(&format!("/api/authors/{id}"), json!({ "lastName": "Pratchett" }))
        .await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);
    assert!(response.body.is_empty());

    let author = app.get(&format!("/api/authors/{id}")).await.json();
    assert_eq!(author["firstName"], "Terry");
    assert_eq!(author["lastName"], "Pratchett");

    let blanked = app
        .put(&format!("/api/authors/{id}"), json!({ "firstName": "  " }))
        .await;
    assert_eq!(blanked.status, StatusCode::BAD_REQUEST);
    assert_eq!(app.get(&format!("/api/authors/{id}")).await.json()["firstName"], "Terry");
}

#[tokio::test]
async fn unknown_author_is_404_everywhere() {
    let app = spawn_app().await;

    let fetched = app.get("/api/authors/999").await;
    assert_eq!(fetched.status, StatusCode::NOT_FOUND);
    assert_eq!(fetched.json()["error"]["code"], "not_found");

    let updated = app.put("/api/authors/999", json!({ "firstName": "X" })).await;
    assert_eq!(updated.status, StatusCode::NOT_FOUND);

    let deleted = app.delete("/api/authors/999").await;
    assert_eq!(deleted.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_an_author_removes_its_books() {
    let app = spawn_app().await.with_users().await;
    let doomed = app.create_author("Gone", "Soon").await;
    let kept = app.create_author("Still", "Here").await;
    let doomed_book = app.create_book("Vanishing", Some(doomed)).await;
    let kept_book = app.create_book("Staying", Some(kept)).await;

    let response = app.delete(&format!("/api/authors/{doomed}")).await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    assert_eq!(
        app.get(&format!("/api/books/{doomed_book}")).await.status,
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        app.get(&format!("/api/books/{kept_book}")).await.status,
        StatusCode::OK
    );
    assert_eq!(book::Entity::find().count(app.db()).await.unwrap(), 1);
}

#[tokio::test]
async fn non_numeric_id_is_a_bad_request() {
    let app = spawn_app().await;
    let response = app.get("/api/authors/abc").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["error"]["code"], "bad_request");
}
