// tests/common/mod.rs

#![allow(dead_code)]

use std::sync::Arc;

use quizlink::{config::Config, routes, state::AppState, store::MemoryQuizStore, utils::jwt::sign_jwt};
use serde_json::{Value, json};

pub const JWT_SECRET: &str = "test_secret_for_integration_tests";
pub const SESSION_SECRET: &str = "test_session_secret";

/// Helper function to spawn the app on a random port for testing.
/// Returns the base URL (e.g., "http://127.0.0.1:12345").
pub async fn spawn_app() -> String {
    let config = Config::for_memory(JWT_SECRET, SESSION_SECRET);
    let state = AppState::new(config, Arc::new(MemoryQuizStore::new()));
    let app = routes::create_router(state);

    // Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    address
}

/// Bearer token as the identity provider would issue it.
pub fn token_for(user_id: &str, role: &str) -> String {
    sign_jwt(user_id, Some("Test User"), Some(role), JWT_SECRET, 600).unwrap()
}

/// Two multiple-choice questions worth 2 and 3 points; keys are 1 and 0.
pub fn two_question_quiz(settings: Value) -> Value {
    json!({
        "title": "Scenario quiz",
        "description": "Two questions",
        "questions": [
            {
                "text": "First",
                "type": "multiple_choice",
                "options": ["A", "B", "C"],
                "correct_answer": 1,
                "points": 2,
                "explanation": "B is right"
            },
            {
                "text": "Second",
                "type": "multiple_choice",
                "options": ["A", "B", "C"],
                "correct_answer": 0,
                "points": 3
            }
        ],
        "settings": settings
    })
}

/// Creates a quiz as `teacher` and returns (quiz_id, shareable_link).
pub async fn create_quiz(
    client: &reqwest::Client,
    address: &str,
    teacher: &str,
    body: &Value,
) -> (String, String) {
    let response = client
        .post(format!("{}/api/quizzes", address))
        .bearer_auth(teacher)
        .json(body)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status().as_u16(), 201);

    let created: Value = response.json().await.unwrap();
    (
        created["quiz_id"].as_str().unwrap().to_string(),
        created["shareable_link"].as_str().unwrap().to_string(),
    )
}

/// Starts a session and returns the parsed response body.
pub async fn start(
    client: &reqwest::Client,
    address: &str,
    link: &str,
    bearer: Option<&str>,
    body: Value,
) -> reqwest::Response {
    let mut request = client
        .post(format!("{}/api/take/{}/start", address, link))
        .json(&body);
    if let Some(token) = bearer {
        request = request.bearer_auth(token);
    }
    request.send().await.expect("Failed to execute request")
}

pub async fn submit(
    client: &reqwest::Client,
    address: &str,
    link: &str,
    path: &str,
    session_token: &str,
    answers: Value,
) -> reqwest::Response {
    client
        .post(format!("{}/api/take/{}/{}", address, link, path))
        .json(&json!({ "session_token": session_token, "answers": answers }))
        .send()
        .await
        .expect("Failed to execute request")
}
