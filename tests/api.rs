//! HTTP tests against the in-process router.

mod common;

use axum::http::{Method, StatusCode, header};
use serde_json::{Value, json};

use common::{MultipartForm, PASSWORD, PDF_BYTES, TestServer};
use heritage::media::{ImageKind, ImageParent};

fn ethnic_group(name: &str) -> Value {
    json!({
        "name": name,
        "description": "People of the southern plateau",
        "language": "Setswana",
        "population": 100,
        "geography": "Kalahari",
        "history": "Long settled",
    })
}

async fn create(server: &TestServer, path: &str, token: &str, body: Value) -> Value {
    let response = server.post(path, Some(token), body).await;
    assert_eq!(
        response.status,
        StatusCode::CREATED,
        "POST {path}: {}",
        String::from_utf8_lossy(&response.body)
    );
    response.data()
}

fn ids(list: &Value) -> Vec<i64> {
    list.as_array()
        .expect("list response")
        .iter()
        .map(|item| item["id"].as_i64().expect("id"))
        .collect()
}

fn tag_names(item: &Value) -> Vec<String> {
    let mut names: Vec<String> = item["tags"]
        .as_array()
        .expect("tags")
        .iter()
        .map(|t| t["name"].as_str().expect("tag name").to_string())
        .collect();
    names.sort();
    names
}

// Accounts

#[tokio::test]
async fn test_register_and_obtain_token() {
    let server = TestServer::start();

    let response = server
        .post(
            "/api/user/create/",
            None,
            json!({"email": "Ada@Example.COM", "password": PASSWORD, "name": "Ada"}),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.data(), json!({"email": "Ada@example.com", "name": "Ada"}));

    let token = server.login("Ada@example.com", PASSWORD).await;
    assert!(token.starts_with("heritage_"));

    let profile = server.get("/api/user/profile/", Some(&token)).await;
    assert_eq!(profile.status, StatusCode::OK);
    assert_eq!(profile.data()["email"], "Ada@example.com");
    assert!(profile.data().get("password").is_none());
}

#[tokio::test]
async fn test_register_validation() {
    let server = TestServer::start();

    let short = server
        .post(
            "/api/user/create/",
            None,
            json!({"email": "a@example.com", "password": "abc", "name": "A"}),
        )
        .await;
    assert_eq!(short.status, StatusCode::BAD_REQUEST);
    assert_eq!(short.json()["field"], "password");

    server.user_token("dup@example.com").await;
    let duplicate = server
        .post(
            "/api/user/create/",
            None,
            json!({"email": "dup@example.com", "password": PASSWORD, "name": "B"}),
        )
        .await;
    assert_eq!(duplicate.status, StatusCode::BAD_REQUEST);
    assert_eq!(duplicate.json()["field"], "email");
}

#[tokio::test]
async fn test_bad_credentials_are_a_validation_error() {
    let server = TestServer::start();
    server.user_token("user@example.com").await;

    let response = server
        .post(
            "/api/user/token/",
            None,
            json!({"email": "user@example.com", "password": "wrong-password"}),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["field"], "non_field_errors");
    assert!(response.json()["data"].is_null());
}

#[tokio::test]
async fn test_profile_update_and_method_not_allowed() {
    let server = TestServer::start();
    let token = server.user_token("user@example.com").await;

    let response = server
        .patch(
            "/api/user/profile/",
            Some(&token),
            json!({"name": "Renamed", "password": "new-password"}),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["name"], "Renamed");

    server.login("user@example.com", "new-password").await;

    let post = server.post("/api/user/profile/", Some(&token), json!({})).await;
    assert_eq!(post.status, StatusCode::METHOD_NOT_ALLOWED);
    assert!(post.json()["error"].is_string());
}

#[tokio::test]
async fn test_token_scheme_alias_and_expiry() {
    let server = TestServer::start();
    let token = server.user_token("user@example.com").await;

    let request = axum::http::Request::builder()
        .uri("/api/chiefs/")
        .header(header::AUTHORIZATION, format!("Token {token}"))
        .body(axum::body::Body::empty())
        .unwrap();
    assert_eq!(server.send(request).await.status, StatusCode::OK);

    let expired = TestServer::with_config(|c| c.token_ttl_hours = Some(-1));
    let stale = expired.user_token("user@example.com").await;
    let response = expired.get("/api/chiefs/", Some(&stale)).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unauthenticated_requests_are_rejected() {
    let server = TestServer::start();

    let endpoints = [
        (Method::GET, "/api/ethnic_groups/"),
        (Method::POST, "/api/ethnic_groups/"),
        (Method::GET, "/api/ethnic_groups/1/"),
        (Method::PATCH, "/api/ethnic_groups/1/"),
        (Method::DELETE, "/api/ethnic_groups/1/"),
        (Method::POST, "/api/ethnic_groups/1/upload-image/"),
        (Method::GET, "/api/ethnic_groups/tags/"),
        (Method::PATCH, "/api/ethnic_groups/tags/1/"),
        (Method::DELETE, "/api/ethnic_groups/tags/1/"),
        (Method::GET, "/api/cultures/"),
        (Method::POST, "/api/cultures/"),
        (Method::GET, "/api/cultures/1/"),
        (Method::PATCH, "/api/cultures/1/"),
        (Method::DELETE, "/api/cultures/1/"),
        (Method::POST, "/api/cultures/1/upload-image/"),
        (Method::GET, "/api/cultures/tags/"),
        (Method::PATCH, "/api/cultures/tags/1/"),
        (Method::DELETE, "/api/cultures/tags/1/"),
        (Method::GET, "/api/chiefs/"),
        (Method::POST, "/api/chiefs/"),
        (Method::GET, "/api/chiefs/1/"),
        (Method::PATCH, "/api/chiefs/1/"),
        (Method::DELETE, "/api/chiefs/1/"),
        (Method::GET, "/api/sites/"),
        (Method::POST, "/api/sites/"),
        (Method::GET, "/api/sites/1/"),
        (Method::PATCH, "/api/sites/1/"),
        (Method::DELETE, "/api/sites/1/"),
        (Method::GET, "/api/artifacts/"),
        (Method::POST, "/api/artifacts/"),
        (Method::GET, "/api/artifacts/1/"),
        (Method::PATCH, "/api/artifacts/1/"),
        (Method::DELETE, "/api/artifacts/1/"),
        (Method::GET, "/api/events/"),
        (Method::POST, "/api/events/"),
        (Method::GET, "/api/events/1/"),
        (Method::PATCH, "/api/events/1/"),
        (Method::DELETE, "/api/events/1/"),
        (Method::GET, "/api/publisher/"),
        (Method::POST, "/api/publisher/"),
        (Method::GET, "/api/publisher/1/"),
        (Method::PATCH, "/api/publisher/1/"),
        (Method::DELETE, "/api/publisher/1/"),
        (Method::GET, "/api/user/profile/"),
    ];

    for (method, path) in endpoints {
        let response = server.json(method.clone(), path, None, json!({})).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED, "{method} {path}");
        assert!(
            response.headers.contains_key(header::WWW_AUTHENTICATE),
            "{method} {path}"
        );
    }

    let bogus = server
        .get("/api/chiefs/", Some("heritage_nope_nope"))
        .await;
    assert_eq!(bogus.status, StatusCode::UNAUTHORIZED);
    assert_eq!(bogus.json()["error"], "Invalid token.");
}

// Ownership and listing

#[tokio::test]
async fn test_list_is_scoped_to_owner_and_newest_first() {
    let server = TestServer::start();
    let alice = server.user_token("alice@example.com").await;
    let bob = server.user_token("bob@example.com").await;

    let first = create(&server, "/api/chiefs/", &alice, json!({"name": "Kgosi A"})).await;
    let second = create(&server, "/api/chiefs/", &alice, json!({"name": "Kgosi B"})).await;
    let other = create(&server, "/api/chiefs/", &bob, json!({"name": "Kgosi C"})).await;

    let list = server.get("/api/chiefs/", Some(&alice)).await.data();
    assert_eq!(
        ids(&list),
        vec![second["id"].as_i64().unwrap(), first["id"].as_i64().unwrap()]
    );

    let path = format!("/api/chiefs/{}/", other["id"]);
    assert_eq!(
        server.get(&path, Some(&alice)).await.status,
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        server.delete(&path, Some(&alice)).await.status,
        StatusCode::NOT_FOUND
    );
    assert_eq!(server.get(&path, Some(&bob)).await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_non_numeric_id_is_not_found() {
    let server = TestServer::start();
    let token = server.user_token("user@example.com").await;

    let response = server.get("/api/sites/abc/", Some(&token)).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(response.json()["data"].is_null());
}

#[tokio::test]
async fn test_summary_and_detail_shapes() {
    let server = TestServer::start();
    let token = server.user_token("user@example.com").await;

    let chief = create(
        &server,
        "/api/chiefs/",
        &token,
        json!({"name": "Kgosi", "type": "paramount", "date_of_birth": "1950-03-04"}),
    )
    .await;
    assert_eq!(chief["type"], "paramount");
    assert_eq!(chief["is_current"], false);
    assert_eq!(chief["bio"], "");

    let list = server.get("/api/chiefs/", Some(&token)).await.data();
    let summary = &list[0];
    assert_eq!(
        summary.as_object().unwrap().keys().collect::<Vec<_>>().len(),
        3
    );
    for (key, value) in summary.as_object().unwrap() {
        assert_eq!(&chief[key], value, "{key}");
    }
}

#[tokio::test]
async fn test_field_validation_names_the_field() {
    let server = TestServer::start();
    let token = server.user_token("user@example.com").await;

    let cases = [
        ("/api/chiefs/", json!({}), "name"),
        ("/api/chiefs/", json!({"name": "x".repeat(101)}), "name"),
        ("/api/chiefs/", json!({"name": "K", "type": "emperor"}), "type"),
        ("/api/chiefs/", json!({"name": "K", "date_of_birth": "04/03/1950"}), "date_of_birth"),
        ("/api/sites/", json!({"site_name": "S", "site_type": "cultural", "importance": 6}), "importance"),
        ("/api/sites/", json!({"site_name": "S", "site_type": "cultural", "latitude": 91.0}), "latitude"),
        ("/api/sites/", json!({"site_name": "S"}), "site_type"),
        ("/api/events/", json!({"name": "E", "event_type": "parade"}), "event_type"),
        ("/api/artifacts/", json!({"artifact_name": "A", "historical_significance": "high"}), "historical_significance"),
    ];

    for (path, body, field) in cases {
        let response = server.post(path, Some(&token), body.clone()).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{path} {body}");
        assert_eq!(response.json()["field"], field, "{path} {body}");
    }

    let negative = server
        .post("/api/ethnic_groups/", Some(&token), {
            let mut group = ethnic_group("Tswana");
            group["population"] = json!(-1);
            group
        })
        .await;
    assert_eq!(negative.status, StatusCode::BAD_REQUEST);
    assert_eq!(negative.json()["field"], "population");
}

#[tokio::test]
async fn test_site_defaults() {
    let server = TestServer::start();
    let token = server.user_token("user@example.com").await;

    let site = create(
        &server,
        "/api/sites/",
        &token,
        json!({"site_name": "Tsodilo", "site_type": "natural"}),
    )
    .await;
    assert_eq!(site["importance"], 1);
    assert_eq!(site["sensitivity"], 1);
    assert!(site["latitude"].is_null());
    assert_eq!(site["description"], "");
    assert_eq!(site["images"], json!([]));
}

#[tokio::test]
async fn test_links_must_belong_to_requester() {
    let server = TestServer::start();
    let alice = server.user_token("alice@example.com").await;
    let bob = server.user_token("bob@example.com").await;

    let group = create(&server, "/api/ethnic_groups/", &bob, ethnic_group("Kalanga")).await;

    let response = server
        .post(
            "/api/cultures/",
            Some(&alice),
            json!({"name": "Test Culture", "description": "d", "ethnic_group": group["id"]}),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["field"], "ethnic_group");
}

#[tokio::test]
async fn test_culture_detail_scenario() {
    let server = TestServer::start();
    let token = server.user_token("user@example.com").await;

    let group = create(&server, "/api/ethnic_groups/", &token, ethnic_group("Tswana")).await;
    assert_eq!(group["population"], 100);

    let culture = create(
        &server,
        "/api/cultures/",
        &token,
        json!({"name": "Test Culture", "description": "Dance and song", "ethnic_group": group["id"]}),
    )
    .await;

    let detail = server
        .get(&format!("/api/cultures/{}/", culture["id"]), Some(&token))
        .await;
    assert_eq!(detail.status, StatusCode::OK);
    let detail = detail.data();
    assert_eq!(detail["ethnic_group"], group["id"]);
    assert_eq!(detail["description"], "Dance and song");
    assert_eq!(detail["name"], "Test Culture");
}

#[tokio::test]
async fn test_partial_update_keeps_other_fields() {
    let server = TestServer::start();
    let token = server.user_token("user@example.com").await;

    let group = create(&server, "/api/ethnic_groups/", &token, ethnic_group("Tswana")).await;
    let culture = create(
        &server,
        "/api/cultures/",
        &token,
        json!({"name": "Test Culture", "description": "d", "ethnic_group": group["id"]}),
    )
    .await;
    let path = format!("/api/cultures/{}/", culture["id"]);

    let updated = server
        .patch(&path, Some(&token), json!({"name": "Renamed"}))
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.data()["ethnic_group"], group["id"]);
    assert_eq!(updated.data()["description"], "d");

    let unlinked = server
        .patch(&path, Some(&token), json!({"ethnic_group": null}))
        .await;
    assert!(unlinked.data()["ethnic_group"].is_null());
    assert_eq!(unlinked.data()["name"], "Renamed");
}

// Tags

#[tokio::test]
async fn test_existing_tag_name_is_reused() {
    let server = TestServer::start();
    let token = server.user_token("user@example.com").await;
    let owner = server
        .store()
        .get_user_by_email("user@example.com")
        .unwrap()
        .unwrap()
        .id;

    let mut body = ethnic_group("Tswana");
    body["tags"] = json!([{"name": "music"}]);
    let first = create(&server, "/api/ethnic_groups/", &token, body).await;
    assert_eq!(tag_names(&first), vec!["music"]);
    assert_eq!(server.store().count_tags(owner).unwrap(), 1);

    let mut body = ethnic_group("Kalanga");
    body["tags"] = json!([{"name": "music"}, {"name": "dance"}]);
    let second = create(&server, "/api/ethnic_groups/", &token, body).await;
    assert_eq!(tag_names(&second), vec!["dance", "music"]);
    assert_eq!(server.store().count_tags(owner).unwrap(), 2);

    // Culture tags share the owner's tag table
    let culture = create(
        &server,
        "/api/cultures/",
        &token,
        json!({"name": "C", "description": "d", "tags": [{"name": "music"}]}),
    )
    .await;
    assert_eq!(tag_names(&culture), vec!["music"]);
    assert_eq!(server.store().count_tags(owner).unwrap(), 2);
}

#[tokio::test]
async fn test_replacing_tags_with_empty_list_detaches_only() {
    let server = TestServer::start();
    let token = server.user_token("user@example.com").await;

    let mut body = ethnic_group("Tswana");
    body["tags"] = json!([{"name": "music"}]);
    let first = create(&server, "/api/ethnic_groups/", &token, body.clone()).await;
    body["name"] = json!("Kalanga");
    let second = create(&server, "/api/ethnic_groups/", &token, body).await;

    let path = format!("/api/ethnic_groups/{}/", first["id"]);
    let cleared = server.patch(&path, Some(&token), json!({"tags": []})).await;
    assert_eq!(cleared.status, StatusCode::OK);
    assert_eq!(cleared.data()["tags"], json!([]));

    let other = server
        .get(&format!("/api/ethnic_groups/{}/", second["id"]), Some(&token))
        .await
        .data();
    assert_eq!(tag_names(&other), vec!["music"]);

    let all = server
        .get("/api/ethnic_groups/tags/", Some(&token))
        .await
        .data();
    assert_eq!(all.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_tag_filter_returns_deduplicated_union() {
    let server = TestServer::start();
    let token = server.user_token("user@example.com").await;

    let mut body = ethnic_group("Both");
    body["tags"] = json!([{"name": "music"}, {"name": "dance"}]);
    let both = create(&server, "/api/ethnic_groups/", &token, body).await;

    let mut body = ethnic_group("Dance");
    body["tags"] = json!([{"name": "dance"}]);
    let dance = create(&server, "/api/ethnic_groups/", &token, body).await;

    create(&server, "/api/ethnic_groups/", &token, ethnic_group("Untagged")).await;

    let tag_ids: Vec<String> = both["tags"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].to_string())
        .collect();

    let list = server
        .get(
            &format!("/api/ethnic_groups/?tags={}", tag_ids.join(",")),
            Some(&token),
        )
        .await
        .data();
    assert_eq!(
        ids(&list),
        vec![dance["id"].as_i64().unwrap(), both["id"].as_i64().unwrap()]
    );

    let invalid = server
        .get("/api/ethnic_groups/?tags=1,x", Some(&token))
        .await;
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);
    assert_eq!(invalid.json()["field"], "tags");
}

#[tokio::test]
async fn test_tag_listing_assigned_only() {
    let server = TestServer::start();
    let token = server.user_token("user@example.com").await;

    let mut body = ethnic_group("Tswana");
    body["tags"] = json!([{"name": "alpha"}, {"name": "zulu"}]);
    create(&server, "/api/ethnic_groups/", &token, body).await;
    create(
        &server,
        "/api/cultures/",
        &token,
        json!({"name": "C", "description": "d", "tags": [{"name": "mid"}]}),
    )
    .await;

    let names = |list: Value| -> Vec<String> {
        list.as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap().to_string())
            .collect()
    };

    let all = server.get("/api/ethnic_groups/tags/", Some(&token)).await;
    assert_eq!(names(all.data()), vec!["zulu", "mid", "alpha"]);

    let assigned = server
        .get("/api/ethnic_groups/tags/?assigned_only=1", Some(&token))
        .await;
    assert_eq!(names(assigned.data()), vec!["zulu", "alpha"]);

    let cultures = server
        .get("/api/cultures/tags/?assigned_only=1", Some(&token))
        .await;
    assert_eq!(names(cultures.data()), vec!["mid"]);

    let invalid = server
        .get("/api/ethnic_groups/tags/?assigned_only=2", Some(&token))
        .await;
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);
    assert_eq!(invalid.json()["field"], "assigned_only");
}

#[tokio::test]
async fn test_tag_rename_and_delete() {
    let server = TestServer::start();
    let token = server.user_token("user@example.com").await;

    let mut body = ethnic_group("Tswana");
    body["tags"] = json!([{"name": "music"}, {"name": "dance"}]);
    let group = create(&server, "/api/ethnic_groups/", &token, body).await;
    let music = group["tags"]
        .as_array()
        .unwrap()
        .iter()
        .find(|t| t["name"] == "music")
        .unwrap()["id"]
        .clone();

    let path = format!("/api/ethnic_groups/tags/{music}/");
    let conflict = server.patch(&path, Some(&token), json!({"name": "dance"})).await;
    assert_eq!(conflict.status, StatusCode::BAD_REQUEST);
    assert_eq!(conflict.json()["field"], "name");

    let renamed = server.patch(&path, Some(&token), json!({"name": "song"})).await;
    assert_eq!(renamed.status, StatusCode::OK);
    assert_eq!(renamed.data()["name"], "song");

    let detail = server
        .get(&format!("/api/ethnic_groups/{}/", group["id"]), Some(&token))
        .await
        .data();
    assert_eq!(tag_names(&detail), vec!["dance", "song"]);

    assert_eq!(
        server.delete(&path, Some(&token)).await.status,
        StatusCode::NO_CONTENT
    );
    let detail = server
        .get(&format!("/api/ethnic_groups/{}/", group["id"]), Some(&token))
        .await
        .data();
    assert_eq!(tag_names(&detail), vec!["dance"]);
}

// Relationships

#[tokio::test]
async fn test_deleting_ethnic_group_nulls_links() {
    let server = TestServer::start();
    let token = server.user_token("user@example.com").await;

    let group = create(&server, "/api/ethnic_groups/", &token, ethnic_group("Tswana")).await;
    let link = json!(group["id"]);

    let culture = create(
        &server,
        "/api/cultures/",
        &token,
        json!({"name": "C", "description": "d", "ethnic_group": link}),
    )
    .await;
    let chief = create(
        &server,
        "/api/chiefs/",
        &token,
        json!({"name": "K", "ethnic_group": link}),
    )
    .await;
    let site = create(
        &server,
        "/api/sites/",
        &token,
        json!({"site_name": "S", "site_type": "cultural", "ethnic_group": link}),
    )
    .await;

    let response = server
        .delete(&format!("/api/ethnic_groups/{}/", group["id"]), Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    for path in [
        format!("/api/cultures/{}/", culture["id"]),
        format!("/api/chiefs/{}/", chief["id"]),
        format!("/api/sites/{}/", site["id"]),
    ] {
        let detail = server.get(&path, Some(&token)).await;
        assert_eq!(detail.status, StatusCode::OK, "{path}");
        assert!(detail.data()["ethnic_group"].is_null(), "{path}");
    }
}

// Media

#[tokio::test]
async fn test_site_images_are_stored_and_removed_with_site() {
    let server = TestServer::start();
    let token = server.user_token("user@example.com").await;

    let form = MultipartForm::new()
        .data(json!({"site_name": "Tsodilo", "site_type": "natural", "importance": 5}))
        .png("uploaded_images")
        .png("uploaded_images");
    let response = server
        .multipart(Method::POST, "/api/sites/", Some(&token), form)
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    let site = response.data();
    assert_eq!(site["importance"], 5);
    assert_eq!(site["images"].as_array().unwrap().len(), 2);
    assert_eq!(server.media_files("site"), 2);

    let url = site["images"][0]["image"].as_str().unwrap().to_string();
    assert!(url.starts_with("/media/site/"));
    let download = server.get(&url, None).await;
    assert_eq!(download.status, StatusCode::OK);
    assert_eq!(download.headers[header::CONTENT_TYPE], "image/png");

    let path = format!("/api/sites/{}/", site["id"]);
    let form = MultipartForm::new().png("uploaded_images");
    let appended = server
        .multipart(Method::PATCH, &path, Some(&token), form)
        .await;
    assert_eq!(appended.status, StatusCode::OK);
    assert_eq!(appended.data()["images"].as_array().unwrap().len(), 3);

    let site_id = site["id"].as_i64().unwrap();
    assert_eq!(server.delete(&path, Some(&token)).await.status, StatusCode::NO_CONTENT);
    assert!(
        server
            .store()
            .list_images(ImageParent::new(ImageKind::Site, site_id))
            .unwrap()
            .is_empty()
    );
    assert_eq!(server.media_files("site"), 0);
    assert_eq!(server.get(&url, None).await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_bulk_upload_is_all_or_nothing() {
    let server = TestServer::start();
    let token = server.user_token("user@example.com").await;

    let form = MultipartForm::new()
        .data(json!({"name": "Festival"}))
        .png("uploaded_images")
        .file("uploaded_images", "notes.txt", Some("text/plain"), b"hello");
    let response = server
        .multipart(Method::POST, "/api/events/", Some(&token), form)
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["field"], "uploaded_images");

    assert_eq!(server.media_files("event"), 0);
    let list = server.get("/api/events/", Some(&token)).await.data();
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn test_upload_image_replaces_previous_file() {
    let server = TestServer::start();
    let token = server.user_token("user@example.com").await;

    let group = create(&server, "/api/ethnic_groups/", &token, ethnic_group("Tswana")).await;
    assert!(group["image"].is_null());
    let path = format!("/api/ethnic_groups/{}/upload-image/", group["id"]);

    let first = server
        .multipart(Method::POST, &path, Some(&token), MultipartForm::new().png("image"))
        .await;
    assert_eq!(first.status, StatusCode::OK);
    let first_url = first.data()["image"].as_str().unwrap().to_string();

    let second = server
        .multipart(Method::POST, &path, Some(&token), MultipartForm::new().png("image"))
        .await;
    let second_url = second.data()["image"].as_str().unwrap().to_string();
    assert_ne!(first_url, second_url);

    assert_eq!(server.media_files("ethnic_group"), 1);
    assert_eq!(server.get(&first_url, None).await.status, StatusCode::NOT_FOUND);
    assert_eq!(server.get(&second_url, None).await.status, StatusCode::OK);

    let missing = server
        .multipart(Method::POST, &path, Some(&token), MultipartForm::new().text("x", "y"))
        .await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);
    assert_eq!(missing.json()["field"], "image");
}

#[tokio::test]
async fn test_publisher_rejects_non_pdf() {
    let server = TestServer::start();
    let token = server.user_token("user@example.com").await;

    let form = MultipartForm::new()
        .data(json!({"document_type": "report"}))
        .png("document");
    let response = server
        .multipart(Method::POST, "/api/publisher/", Some(&token), form)
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["field"], "document");

    assert_eq!(server.media_files("document"), 0);
    let list = server.get("/api/publisher/", Some(&token)).await.data();
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn test_publisher_accepts_pdf() {
    let server = TestServer::start();
    let token = server.user_token("user@example.com").await;

    let form = MultipartForm::new()
        .text("document_type", "report")
        .file("document", "report.pdf", Some("application/pdf"), PDF_BYTES);
    let response = server
        .multipart(Method::POST, "/api/publisher/", Some(&token), form)
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    let publisher = response.data();
    assert_eq!(publisher["document_type"], "report");
    assert_eq!(publisher["is_published"], false);

    let url = publisher["document"].as_str().unwrap();
    let download = server.get(url, None).await;
    assert_eq!(download.status, StatusCode::OK);
    assert_eq!(download.headers[header::CONTENT_TYPE], "application/pdf");
    assert_eq!(download.body, PDF_BYTES);

    let path = format!("/api/publisher/{}/", publisher["id"]);
    let updated = server
        .patch(&path, Some(&token), json!({"is_published": true}))
        .await;
    assert_eq!(updated.data()["is_published"], true);
    assert_eq!(updated.data()["document"], publisher["document"]);

    assert_eq!(server.delete(&path, Some(&token)).await.status, StatusCode::NO_CONTENT);
    assert_eq!(server.media_files("document"), 0);
}

#[tokio::test]
async fn test_upload_ceiling_is_enforced() {
    let server = TestServer::with_config(|c| c.max_upload_bytes = 8);
    let token = server.user_token("user@example.com").await;

    let form = MultipartForm::new()
        .data(json!({"document_type": "book"}))
        .file("document", "book.pdf", Some("application/pdf"), PDF_BYTES);
    let response = server
        .multipart(Method::POST, "/api/publisher/", Some(&token), form)
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["field"], "document");
}

#[tokio::test]
async fn test_media_rejects_unknown_paths() {
    let server = TestServer::start();

    for path in ["/media/secrets/file.png", "/media/site/..hidden", "/media/site/missing.png"] {
        assert_eq!(
            server.get(path, None).await.status,
            StatusCode::NOT_FOUND,
            "{path}"
        );
    }
}

#[tokio::test]
async fn test_health() {
    let server = TestServer::start();
    let response = server.get("/health", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, b"OK");
}

// Failed writes leave no partial state

fn fail_inserts_into(server: &TestServer, table: &str) {
    let conn = rusqlite::Connection::open(server.data_dir().join("heritage.db")).unwrap();
    conn.execute_batch(&format!(
        "CREATE TRIGGER fail_{table} BEFORE INSERT ON {table}
         BEGIN SELECT RAISE(ABORT, 'insert rejected'); END;"
    ))
    .unwrap();
}

#[tokio::test]
async fn test_failed_tagging_discards_new_group() {
    let server = TestServer::start();
    let token = server.user_token("user@example.com").await;
    fail_inserts_into(&server, "ethnic_group_tags");

    let mut body = ethnic_group("Tswana");
    body["tags"] = json!([{"name": "music"}]);
    let response = server.post("/api/ethnic_groups/", Some(&token), body).await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);

    let list = server.get("/api/ethnic_groups/", Some(&token)).await;
    assert_eq!(list.status, StatusCode::OK);
    assert!(ids(&list.data()).is_empty());
}

#[tokio::test]
async fn test_failed_tagging_keeps_culture_unchanged() {
    let server = TestServer::start();
    let token = server.user_token("user@example.com").await;
    let culture = create(
        &server,
        "/api/cultures/",
        &token,
        json!({"name": "Original", "description": "d", "tags": [{"name": "old"}]}),
    )
    .await;
    fail_inserts_into(&server, "culture_tags");

    let path = format!("/api/cultures/{}/", culture["id"]);
    let response = server
        .patch(&path, Some(&token), json!({"name": "Renamed", "tags": [{"name": "new"}]}))
        .await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);

    let fetched = server.get(&path, Some(&token)).await.data();
    assert_eq!(fetched["name"], "Original");
    assert_eq!(tag_names(&fetched), vec!["old"]);
}

#[tokio::test]
async fn test_failed_image_append_keeps_site_unchanged() {
    let server = TestServer::start();
    let token = server.user_token("user@example.com").await;
    let site = create(
        &server,
        "/api/sites/",
        &token,
        json!({"site_name": "Old", "site_type": "cultural"}),
    )
    .await;
    fail_inserts_into(&server, "site_images");

    let path = format!("/api/sites/{}/", site["id"]);
    let form = MultipartForm::new()
        .data(json!({"site_name": "New"}))
        .png("uploaded_images");
    let response = server
        .multipart(Method::PATCH, &path, Some(&token), form)
        .await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);

    let fetched = server.get(&path, Some(&token)).await.data();
    assert_eq!(fetched["site_name"], "Old");
    assert!(fetched["images"].as_array().unwrap().is_empty());
    assert_eq!(server.media_files("site"), 0);
}
