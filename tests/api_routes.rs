mod common;

use common::{count, participant, spawn_server, test_app, token_for, SOLO_EVENT, TEAM_EVENT};
use reqwest::{multipart, Client, StatusCode};
use serde_json::{json, Value};

#[tokio::test]
async fn add_user_derives_college_identity_once() {
    let app = test_app().await;
    let base = spawn_server(app.state.clone()).await;
    let client = Client::new();
    let email = "cse2022045@college.example";

    let body = json!({ "user": { "email": email, "name": "Ananya Sen" } });
    let resp = client
        .post(format!("{}/add-user", base))
        .bearer_auth(token_for(email))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let first: Value = resp.json().await.unwrap();
    assert_eq!(first["created"], true);
    assert_eq!(first["data"]["dept"], "CSE");
    assert_eq!(first["data"]["college_roll"], "CSE2022045");

    let again: Value = client
        .post(format!("{}/add-user", base))
        .bearer_auth(token_for(email))
        .json(&body)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(again["created"], false);
    assert_eq!(again["data"]["user_id"], first["data"]["user_id"]);
    assert_eq!(count(app.pool(), "participants").await, 1);
}

#[tokio::test]
async fn add_user_checks_session_and_payload() {
    let app = test_app().await;
    let base = spawn_server(app.state.clone()).await;
    let client = Client::new();
    let body = json!({ "user": { "email": "a@mail.example", "name": "A" } });

    let resp = client
        .post(format!("{}/add-user", base))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = client
        .post(format!("{}/add-user", base))
        .bearer_auth(token_for("someone-else@mail.example"))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = client
        .post(format!("{}/add-user", base))
        .bearer_auth(token_for("bad@college.example"))
        .json(&json!({ "user": { "email": "bad@college.example", "name": "Bad" } }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Invalid email format");
}

#[tokio::test]
async fn participant_details_statuses() {
    let app = test_app().await;
    participant(app.pool(), "Ria", "ria@mail.example").await;
    let base = spawn_server(app.state.clone()).await;
    let client = Client::new();

    let missing = client
        .get(format!("{}/participant-details", base))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);

    let unknown = client
        .get(format!("{}/participant-details", base))
        .query(&[("email", "nobody@mail.example")])
        .send()
        .await
        .unwrap();
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);

    let found: Value = client
        .get(format!("{}/participant-details", base))
        .query(&[("email", "RIA@mail.example")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(found["success"], true);
    assert_eq!(found["data"]["name"], "Ria");
}

#[tokio::test]
async fn events_listing_and_details() {
    let app = test_app().await;
    let base = spawn_server(app.state.clone()).await;
    let client = Client::new();

    let all: Value = client
        .get(format!("{}/allEvents", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(all["data"].as_array().unwrap().len(), 2);
    assert_eq!(all["data"][0]["catagory"], "technical");

    let bad = client
        .get(format!("{}/eventDetails", base))
        .query(&[("event_id", "abc")])
        .send()
        .await
        .unwrap();
    assert_eq!(bad.status(), StatusCode::BAD_REQUEST);

    let unknown = client
        .get(format!("{}/eventDetails", base))
        .query(&[("event_id", "99")])
        .send()
        .await
        .unwrap();
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);

    let details: Value = client
        .get(format!("{}/eventDetails", base))
        .query(&[("event_id", TEAM_EVENT.to_string())])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(details["data"]["name"], "Code Relay");
    assert_eq!(details["data"]["registration_count"], 0);
}

#[tokio::test]
async fn duplicate_registration_over_http_is_a_bad_request() {
    let app = test_app().await;
    let lead = participant(app.pool(), "Lead", "lead@mail.example").await;
    let base = spawn_server(app.state.clone()).await;
    let client = Client::new();
    let body = json!({ "user_id": lead.user_id, "event_id": SOLO_EVENT.to_string() });

    let first = client
        .post(format!("{}/registrations", base))
        .bearer_auth(token_for("lead@mail.example"))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);
    let first: Value = first.json().await.unwrap();
    assert_eq!(first["email_sent"], true);

    let second = client
        .post(format!("{}/registrations", base))
        .bearer_auth(token_for("lead@mail.example"))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::BAD_REQUEST);
    let second: Value = second.json().await.unwrap();
    assert_eq!(second["message"], "You are already registered for this event!");
    assert_eq!(app.mailer.sent().len(), 1);
}

#[tokio::test]
async fn concurrent_registrations_yield_one_row() {
    let app = test_app().await;
    let lead = participant(app.pool(), "Lead", "lead@mail.example").await;
    let base = spawn_server(app.state.clone()).await;
    let client = Client::new();
    let body = json!({ "user_id": lead.user_id, "event_id": SOLO_EVENT });

    let send = || {
        client
            .post(format!("{}/registrations", base))
            .bearer_auth(token_for("lead@mail.example"))
            .json(&body)
            .send()
    };
    let (a, b) = tokio::join!(send(), send());
    let mut statuses = vec![a.unwrap().status(), b.unwrap().status()];
    statuses.sort();

    assert_eq!(statuses, vec![StatusCode::CREATED, StatusCode::BAD_REQUEST]);
    assert_eq!(count(app.pool(), "registrations").await, 1);
}

#[tokio::test]
async fn registration_for_another_participant_is_forbidden() {
    let app = test_app().await;
    let victim = participant(app.pool(), "Victim", "victim@mail.example").await;
    participant(app.pool(), "Mallory", "mallory@mail.example").await;
    let base = spawn_server(app.state.clone()).await;

    let resp = Client::new()
        .post(format!("{}/registrations", base))
        .bearer_auth(token_for("mallory@mail.example"))
        .json(&json!({ "user_id": victim.user_id, "event_id": SOLO_EVENT }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(count(app.pool(), "registrations").await, 0);
    assert!(app.mailer.sent().is_empty());
}

#[tokio::test]
async fn registration_requires_fields() {
    let app = test_app().await;
    let base = spawn_server(app.state.clone()).await;

    let resp = Client::new()
        .post(format!("{}/registrations", base))
        .bearer_auth(token_for("lead@mail.example"))
        .json(&json!({ "event_id": SOLO_EVENT }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Missing required fields");
}

#[tokio::test]
async fn team_lifecycle_and_profile_views() {
    let app = test_app().await;
    let lead = participant(app.pool(), "Lead Person", "lead@mail.example").await;
    let ria = participant(app.pool(), "Ria", "ria@mail.example").await;
    let base = spawn_server(app.state.clone()).await;
    let client = Client::new();
    let token = token_for("lead@mail.example");

    let created: Value = client
        .post(format!("{}/create-team", base))
        .bearer_auth(&token)
        .json(&json!({ "event_id": TEAM_EVENT, "team_name": "Null Pointers" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(created["success"], true);
    let team_id = created["team_id"].as_i64().unwrap();

    let taken = client
        .post(format!("{}/create-team", base))
        .bearer_auth(&token)
        .json(&json!({ "event_id": TEAM_EVENT, "team_name": "Null Pointers" }))
        .send()
        .await
        .unwrap();
    assert_eq!(taken.status(), StatusCode::BAD_REQUEST);

    let registered = client
        .post(format!("{}/registrations", base))
        .bearer_auth(&token)
        .json(&json!({
            "user_id": lead.user_id,
            "event_id": TEAM_EVENT,
            "team_id": team_id,
            "team_name": "Null Pointers",
            "team_members": [{ "email": "ria@mail.example" }],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(registered.status(), StatusCode::CREATED);

    let locked = client
        .post(format!("{}/delete-team", base))
        .bearer_auth(&token)
        .json(&json!({ "team_name": "Null Pointers" }))
        .send()
        .await
        .unwrap();
    assert_eq!(locked.status(), StatusCode::BAD_REQUEST);

    let events: Value = client
        .get(format!("{}/get_user_event_names", base))
        .query(&[("user_uuid", ria.user_id.as_str())])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(events["data"], json!([{ "event_id": TEAM_EVENT, "name": "Code Relay" }]));

    let teams: Value = client
        .get(format!("{}/get_user_teams", base))
        .query(&[("user_uuid", ria.user_id.as_str())])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let rows = teams["data"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r["team_name"] == "Null Pointers"));
    assert_eq!(rows[0]["member_name"], "Ria");
    assert_eq!(rows[0]["is_current_user"], true);
}

#[tokio::test]
async fn unused_team_can_be_deleted() {
    let app = test_app().await;
    let base = spawn_server(app.state.clone()).await;
    let client = Client::new();
    let token = token_for("lead@mail.example");

    client
        .post(format!("{}/create-team", base))
        .bearer_auth(&token)
        .json(&json!({ "event_id": TEAM_EVENT.to_string(), "team_name": "Orphans" }))
        .send()
        .await
        .unwrap();

    let deleted = client
        .post(format!("{}/delete-team", base))
        .bearer_auth(&token)
        .json(&json!({ "team_name": "Orphans" }))
        .send()
        .await
        .unwrap();
    assert_eq!(deleted.status(), StatusCode::OK);

    let missing = client
        .post(format!("{}/delete-team", base))
        .bearer_auth(&token)
        .json(&json!({ "team_name": "Orphans" }))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    assert_eq!(count(app.pool(), "teams").await, 0);
}

#[tokio::test]
async fn oversized_profile_image_is_rejected_before_storage() {
    let app = test_app().await;
    participant(app.pool(), "Ria", "ria@mail.example").await;
    let base = spawn_server(app.state.clone()).await;

    let image = multipart::Part::bytes(vec![7u8; 1024 * 1024 + 1])
        .file_name("big.png")
        .mime_str("image/png")
        .unwrap();
    let form = multipart::Form::new()
        .text("email", "ria@mail.example")
        .text("name", "Ria Renamed")
        .part("image", image);

    let resp = Client::new()
        .post(format!("{}/update-user", base))
        .bearer_auth(token_for("ria@mail.example"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);

    let stored: Vec<_> = std::fs::read_dir(app.storage_root()).unwrap().collect();
    assert!(stored.is_empty());
    let name: String = sqlx::query_scalar("SELECT name FROM participants WHERE email = ?")
        .bind("ria@mail.example")
        .fetch_one(app.pool())
        .await
        .unwrap();
    assert_eq!(name, "Ria");
}

#[tokio::test]
async fn image_beyond_request_limit_is_payload_too_large() {
    let app = test_app().await;
    participant(app.pool(), "Ria", "ria@mail.example").await;
    let base = spawn_server(app.state.clone()).await;

    let image = multipart::Part::bytes(vec![7u8; 2 * 1024 * 1024])
        .file_name("huge.png")
        .mime_str("image/png")
        .unwrap();
    let form = multipart::Form::new()
        .text("email", "ria@mail.example")
        .part("image", image);

    let resp = Client::new()
        .post(format!("{}/update-user", base))
        .bearer_auth(token_for("ria@mail.example"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);

    let stored: Vec<_> = std::fs::read_dir(app.storage_root()).unwrap().collect();
    assert!(stored.is_empty());
}

#[tokio::test]
async fn profile_update_stores_image_and_fields() {
    let app = test_app().await;
    participant(app.pool(), "Ria", "ria@mail.example").await;
    let base = spawn_server(app.state.clone()).await;
    let client = Client::new();

    let image = multipart::Part::bytes(b"\x89PNG fake".to_vec())
        .file_name("me.png")
        .mime_str("image/png")
        .unwrap();
    let form = multipart::Form::new()
        .text("email", "ria@mail.example")
        .text("phone", "9876543210")
        .text("department", "ece")
        .part("image", image);

    let resp = client
        .post(format!("{}/update-user", base))
        .bearer_auth(token_for("ria@mail.example"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let details: Value = client
        .get(format!("{}/participant-details", base))
        .query(&[("email", "ria@mail.example")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(details["data"]["dept"], "ECE");
    assert_eq!(details["data"]["contact_no"], "9876543210");
    let image_url = details["data"]["image_url"].as_str().unwrap();
    let path = image_url
        .strip_prefix("http://festival.test")
        .expect("served from our storage");

    let served = client.get(format!("{}{}", base, path)).send().await.unwrap();
    assert_eq!(served.status(), StatusCode::OK);
    assert_eq!(served.bytes().await.unwrap().as_ref(), b"\x89PNG fake");
}

#[tokio::test]
async fn profile_update_for_someone_else_is_forbidden() {
    let app = test_app().await;
    participant(app.pool(), "Ria", "ria@mail.example").await;
    let base = spawn_server(app.state.clone()).await;

    let form = multipart::Form::new()
        .text("email", "ria@mail.example")
        .text("name", "Hijacked");
    let resp = Client::new()
        .post(format!("{}/update-user", base))
        .bearer_auth(token_for("mallory@mail.example"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn gallery_lists_images_for_year() {
    let app = test_app().await;
    let year_dir = app.storage_root().join("gallery").join("2024");
    std::fs::create_dir_all(&year_dir).unwrap();
    std::fs::write(year_dir.join("stage.JPG"), b"x").unwrap();
    std::fs::write(year_dir.join("notes.txt"), b"x").unwrap();
    let base = spawn_server(app.state.clone()).await;
    let client = Client::new();

    let listed: Value = client
        .get(format!("{}/gallery/2024", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(
        listed,
        json!({ "images": ["http://festival.test/storage/gallery/2024/stage.JPG"] })
    );

    let empty: Value = client
        .get(format!("{}/gallery/2019", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(empty, json!({ "images": [] }));
}

#[tokio::test]
async fn crew_roster_is_ordered_by_priority() {
    let app = test_app().await;
    sqlx::query("INSERT INTO crew_members (name, role, priority) VALUES ('Zed', 'Volunteer', 5), ('Amy', 'Convenor', 1)")
        .execute(app.pool())
        .await
        .unwrap();
    let base = spawn_server(app.state.clone()).await;

    let crew: Value = Client::new()
        .get(format!("{}/team-details", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(crew["data"][0]["name"], "Amy");
    assert_eq!(crew["data"][1]["name"], "Zed");
}
