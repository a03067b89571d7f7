//! API integration tests
//!
//! These run against a live server on localhost:8080 with a fresh
//! database. Run with: cargo test -- --ignored

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080";

/// Unique suffix so repeated runs do not collide on unique names
fn unique(tag: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock before epoch")
        .subsec_nanos();
    format!("{} {}", tag, nanos)
}

/// Create a book with one freshly named author, returning (book, author name)
async fn create_book_with_author(client: &Client, title: &str) -> (Value, String) {
    let author_name = unique("Author");
    let response = client
        .post(format!("{}/books/", BASE_URL))
        .json(&json!({
            "title": title,
            "blurb": "A test blurb",
            "rating": 4.0,
            "date_published": "2020-01-15",
            "genres": ["fantasy"],
            "authors": [{"author": {"name": author_name}, "role": "writer"}]
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.expect("Failed to parse response");
    (body, author_name)
}

#[tokio::test]
#[ignore]
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_list_genres() {
    let client = Client::new();

    let response = client
        .get(format!("{}/genres/", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body.is_array());
}

#[tokio::test]
#[ignore]
async fn test_create_genre_rejects_unknown_choice() {
    let client = Client::new();

    let response = client
        .post(format!("{}/genres/", BASE_URL))
        .json(&json!({"name": "cyberpunk"}))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["name"].is_array());
}

#[tokio::test]
#[ignore]
async fn test_create_book_requires_authors() {
    let client = Client::new();

    let response = client
        .post(format!("{}/books/", BASE_URL))
        .json(&json!({
            "title": unique("Orphan Book"),
            "blurb": "No authors given",
            "rating": 3.0,
            "date_published": "2021-06-01",
            "genres": ["other"]
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["authors"][0], "This field is required.");
}

#[tokio::test]
#[ignore]
async fn test_create_book_rejects_out_of_range_rating() {
    let client = Client::new();

    let response = client
        .post(format!("{}/books/", BASE_URL))
        .json(&json!({
            "title": unique("Overrated"),
            "blurb": "Too good to be true",
            "rating": 5.5,
            "date_published": "2021-06-01",
            "genres": ["other"],
            "authors": [{"author": {"name": unique("Author")}, "role": "writer"}]
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["rating"].is_array());
}

#[tokio::test]
#[ignore]
async fn test_create_book_reuses_existing_author_by_name() {
    let client = Client::new();

    let (_, author_name) = create_book_with_author(&client, &unique("First Book")).await;

    // Second book names the same author as a plain string
    let response = client
        .post(format!("{}/books/", BASE_URL))
        .json(&json!({
            "title": unique("Second Book"),
            "blurb": "Same author again",
            "rating": 3.5,
            "date_published": "2022-03-10",
            "genres": ["mystery"],
            "authors": [{"author": author_name, "role": "writer"}]
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);
    let second: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(second["authors"][0]["author"], author_name.as_str());

    // Still exactly one author row behind that name
    let response = client
        .get(format!("{}/authors/", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    let authors: Value = response.json().await.expect("Failed to parse response");
    let matches = authors
        .as_array()
        .expect("author list")
        .iter()
        .filter(|a| a["name"] == author_name.as_str())
        .count();
    assert_eq!(matches, 1);
}

#[tokio::test]
#[ignore]
async fn test_update_book_leaves_authors_untouched_when_omitted() {
    let client = Client::new();

    let (book, _) = create_book_with_author(&client, &unique("Stable Credits")).await;
    let id = book["id"].as_i64().expect("book id");

    let response = client
        .patch(format!("{}/books/{}/", BASE_URL, id))
        .json(&json!({"blurb": "Revised blurb"}))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let updated: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(updated["blurb"], "Revised blurb");
    assert_eq!(
        updated["authors"].as_array().map(Vec::len),
        book["authors"].as_array().map(Vec::len)
    );
}

#[tokio::test]
#[ignore]
async fn test_update_book_rejects_empty_authors() {
    let client = Client::new();

    let (book, _) = create_book_with_author(&client, &unique("Keeps Author")).await;
    let id = book["id"].as_i64().expect("book id");

    let response = client
        .patch(format!("{}/books/{}/", BASE_URL, id))
        .json(&json!({"authors": []}))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["authors"].is_array());
}

#[tokio::test]
#[ignore]
async fn test_create_author_with_nested_book() {
    let client = Client::new();

    let title = unique("Nested Book");
    let response = client
        .post(format!("{}/authors/", BASE_URL))
        .json(&json!({
            "name": unique("Nesting Author"),
            "introduction": "Writes books inline",
            "books": [{
                "book": {
                    "title": title,
                    "blurb": "Created through its author",
                    "rating": 4.2,
                    "date_published": "2019-11-05",
                    "genres": ["adventure"]
                },
                "role": "writer"
            }]
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["books"][0]["book"], title);

    // The book really exists as a catalog row of its own
    let response = client
        .get(format!("{}/books/", BASE_URL))
        .query(&[("book_authors", body["name"].as_str().unwrap())])
        .send()
        .await
        .expect("Failed to send request");
    let books: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(books[0]["title"], title);
}

#[tokio::test]
#[ignore]
async fn test_author_avg_rating_null_without_books() {
    let client = Client::new();

    let response = client
        .post(format!("{}/authors/", BASE_URL))
        .json(&json!({"name": unique("Bookless Author")}))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["avg_rating"].is_null());
}

#[tokio::test]
#[ignore]
async fn test_delete_author_blocked_while_credited() {
    let client = Client::new();

    // Create the author up front so its id is known, then credit it on a book
    let response = client
        .post(format!("{}/authors/", BASE_URL))
        .json(&json!({"name": unique("Credited Author")}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let author: Value = response.json().await.expect("Failed to parse response");
    let author_id = author["id"].as_i64().expect("author id");

    let response = client
        .post(format!("{}/books/", BASE_URL))
        .json(&json!({
            "title": unique("Protective Book"),
            "blurb": "Keeps its author around",
            "rating": 4.1,
            "date_published": "2018-02-20",
            "genres": ["horror"],
            "authors": [{"author": author_id, "role": "writer"}]
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let book: Value = response.json().await.expect("Failed to parse response");
    let book_id = book["id"].as_i64().expect("book id");

    let response = client
        .delete(format!("{}/authors/{}/", BASE_URL, author_id))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 409);

    // Removing the book clears the credit, after which the delete succeeds
    let response = client
        .delete(format!("{}/books/{}/", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 204);

    let response = client
        .delete(format!("{}/authors/{}/", BASE_URL, author_id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 204);
}

#[tokio::test]
#[ignore]
async fn test_create_lent_copy_requires_borrower_and_date() {
    let client = Client::new();

    let (book, _) = create_book_with_author(&client, &unique("Lendable Book")).await;
    let book_id = book["id"].as_i64().expect("book id");

    let response = client
        .post(format!("{}/copies/", BASE_URL))
        .json(&json!({"book": book_id, "lent": true}))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["lent_by"][0], "This field is required when the copy is lent.");
    assert_eq!(
        body["return_date"][0],
        "This field is required when the copy is lent."
    );
}

#[tokio::test]
#[ignore]
async fn test_patch_copy_merges_over_stored_row() {
    let client = Client::new();

    let (book, _) = create_book_with_author(&client, &unique("Patched Copy Book")).await;
    let book_id = book["id"].as_i64().expect("book id");

    // A copy already lent out with full lending details
    let response = client
        .post(format!("{}/copies/", BASE_URL))
        .json(&json!({
            "book": book_id,
            "lent": true,
            "lent_by": "alice",
            "return_date": "2026-09-30"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let copy: Value = response.json().await.expect("Failed to parse response");
    let copy_id = copy["id"].as_i64().expect("copy id");

    // Patching only the date keeps the stored borrower, so the
    // lending rule still holds
    let response = client
        .patch(format!("{}/copies/{}/", BASE_URL, copy_id))
        .json(&json!({"return_date": "2026-10-15"}))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["lent_by"], "alice");
    assert_eq!(body["return_date"], "2026-10-15");
}

#[tokio::test]
#[ignore]
async fn test_embedded_book_in_copy_still_requires_authors() {
    let client = Client::new();

    // An embedded book inside a copy payload is a top-level book creation;
    // only author writes may omit the authors list
    let response = client
        .post(format!("{}/copies/", BASE_URL))
        .json(&json!({
            "book": {
                "title": unique("Smuggled Book"),
                "blurb": "Tries to skip its authors",
                "rating": 3.3,
                "date_published": "2017-04-01",
                "genres": ["other"]
            }
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["authors"][0], "This field is required.");
}

#[tokio::test]
#[ignore]
async fn test_patch_copy_null_lent_by_fails_lending_rule() {
    let client = Client::new();

    let (book, _) = create_book_with_author(&client, &unique("Null Patch Book")).await;
    let book_id = book["id"].as_i64().expect("book id");

    let response = client
        .post(format!("{}/copies/", BASE_URL))
        .json(&json!({
            "book": book_id,
            "lent": true,
            "lent_by": "bob",
            "return_date": "2026-09-30"
        }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let copy: Value = response.json().await.expect("Failed to parse response");
    let copy_id = copy["id"].as_i64().expect("copy id");

    // Explicitly clearing the borrower while the copy stays lent is not a
    // fallback to the stored value; the lending rule must reject it
    let response = client
        .patch(format!("{}/copies/{}/", BASE_URL, copy_id))
        .json(&json!({"lent_by": null}))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["lent_by"][0], "This field is required when the copy is lent.");
}

#[tokio::test]
#[ignore]
async fn test_patch_copy_null_book_detaches() {
    let client = Client::new();

    let (book, _) = create_book_with_author(&client, &unique("Detachable Book")).await;
    let book_id = book["id"].as_i64().expect("book id");

    let response = client
        .post(format!("{}/copies/", BASE_URL))
        .json(&json!({"book": book_id}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let copy: Value = response.json().await.expect("Failed to parse response");
    let copy_id = copy["id"].as_i64().expect("copy id");

    let response = client
        .patch(format!("{}/copies/{}/", BASE_URL, copy_id))
        .json(&json!({"book": null}))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["book_id"].is_null());
    assert!(body["book"].is_null());
}

#[tokio::test]
#[ignore]
async fn test_book_delete_cascades_to_copies() {
    let client = Client::new();

    let (book, _) = create_book_with_author(&client, &unique("Cascading Book")).await;
    let book_id = book["id"].as_i64().expect("book id");

    let response = client
        .post(format!("{}/copies/", BASE_URL))
        .json(&json!({"book": book_id}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 201);
    let copy: Value = response.json().await.expect("Failed to parse response");
    let copy_id = copy["id"].as_i64().expect("copy id");

    let response = client
        .delete(format!("{}/books/{}/", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 204);

    let response = client
        .get(format!("{}/copies/{}/", BASE_URL, copy_id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_trailing_slash_optional() {
    let client = Client::new();

    for path in ["/genres", "/genres/"] {
        let response = client
            .get(format!("{}{}", BASE_URL, path))
            .send()
            .await
            .expect("Failed to send request");
        assert!(response.status().is_success(), "GET {} failed", path);
    }
}
