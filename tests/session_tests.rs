// tests/session_tests.rs

mod common;

use chrono::{Duration, Utc};
use common::{create_quiz, spawn_app, start, submit, token_for, two_question_quiz};
use serde_json::{Value, json};

fn answers(first: i64, second: i64) -> Value {
    json!([
        { "question_index": 0, "answer": first },
        { "question_index": 1, "answer": second }
    ])
}

#[tokio::test]
async fn partial_score_then_retake_is_refused() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let teacher = token_for("teacher-1", "teacher");
    let student = token_for("student-1", "student");

    let (_, link) = create_quiz(
        &client,
        &address,
        &teacher,
        &two_question_quiz(json!({ "attempts_allowed": 1, "passing_score_percent": 60 })),
    )
    .await;

    let response = start(&client, &address, &link, Some(student.as_str()), json!({})).await;
    assert_eq!(response.status().as_u16(), 200);
    let started: Value = response.json().await.unwrap();
    assert_eq!(started["previous_attempts"], 0);
    assert_eq!(started["taker_id"], "student-1");

    let response = submit(
        &client,
        &address,
        &link,
        "submit",
        started["session_token"].as_str().unwrap(),
        answers(1, 2),
    )
    .await;
    assert_eq!(response.status().as_u16(), 200);

    let result: Value = response.json().await.unwrap();
    assert_eq!(result["score"], 2);
    assert_eq!(result["total_points"], 5);
    assert_eq!(result["percentage"], 40);
    assert_eq!(result["passed"], false);
    assert_eq!(result["finalized_as"], "submitted");

    let again = start(&client, &address, &link, Some(student.as_str()), json!({})).await;
    assert_eq!(again.status().as_u16(), 403);
    let err: Value = again.json().await.unwrap();
    assert_eq!(err["code"], "attempts_exceeded");
}

#[tokio::test]
async fn perfect_score_passes() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let teacher = token_for("teacher-1", "teacher");

    let (_, link) = create_quiz(
        &client,
        &address,
        &teacher,
        &two_question_quiz(json!({ "passing_score_percent": 60 })),
    )
    .await;

    let started: Value = start(&client, &address, &link, None, json!({ "name": "Guest" }))
        .await
        .json()
        .await
        .unwrap();
    assert!(started["taker_id"].as_str().unwrap().starts_with("guest_"));

    let result: Value = submit(
        &client,
        &address,
        &link,
        "submit",
        started["session_token"].as_str().unwrap(),
        answers(1, 0),
    )
    .await
    .json()
    .await
    .unwrap();

    assert_eq!(result["score"], 5);
    assert_eq!(result["percentage"], 100);
    assert_eq!(result["passed"], true);
}

#[tokio::test]
async fn second_finalize_returns_stored_submission() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let teacher = token_for("teacher-1", "teacher");

    let (quiz_id, link) = create_quiz(&client, &address, &teacher, &two_question_quiz(json!({}))).await;

    let started: Value = start(&client, &address, &link, None, json!({ "name": "Twice" }))
        .await
        .json()
        .await
        .unwrap();
    let token = started["session_token"].as_str().unwrap();

    let first: Value = submit(&client, &address, &link, "submit", token, answers(1, 0))
        .await
        .json()
        .await
        .unwrap();
    let second = submit(&client, &address, &link, "auto-submit", token, answers(0, 0)).await;
    assert_eq!(second.status().as_u16(), 200);
    let second: Value = second.json().await.unwrap();

    assert_eq!(first["already_submitted"], false);
    assert_eq!(second["already_submitted"], true);
    assert_eq!(first["submission_id"], second["submission_id"]);
    assert_eq!(second["score"], 5);
    assert_eq!(second["finalized_as"], "submitted");

    let results: Value = client
        .get(format!("{}/api/quizzes/{}/results", address, quiz_id))
        .bearer_auth(&teacher)
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .unwrap();
    assert_eq!(results["submissions"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn closed_window_is_not_available() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let teacher = token_for("teacher-1", "teacher");
    let until = (Utc::now() - Duration::hours(1)).to_rfc3339();

    let (_, link) = create_quiz(
        &client,
        &address,
        &teacher,
        &two_question_quiz(json!({ "available_until": until })),
    )
    .await;

    let resolve = client
        .get(format!("{}/api/take/{}", address, link))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(resolve.status().as_u16(), 403);

    let response = start(&client, &address, &link, None, json!({ "name": "Late" })).await;
    assert_eq!(response.status().as_u16(), 403);
    let err: Value = response.json().await.unwrap();
    assert_eq!(err["code"], "not_available");
}

#[tokio::test]
async fn login_required_rejects_guests() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let teacher = token_for("teacher-1", "teacher");
    let student = token_for("student-1", "student");

    let (_, link) = create_quiz(
        &client,
        &address,
        &teacher,
        &two_question_quiz(json!({ "require_login": true })),
    )
    .await;

    let response = start(&client, &address, &link, None, json!({ "name": "Guest" })).await;
    assert_eq!(response.status().as_u16(), 401);
    let err: Value = response.json().await.unwrap();
    assert_eq!(err["code"], "login_required");

    let response = start(&client, &address, &link, Some(student.as_str()), json!({})).await;
    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn guest_without_name_is_rejected() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let teacher = token_for("teacher-1", "teacher");

    let (_, link) = create_quiz(&client, &address, &teacher, &two_question_quiz(json!({}))).await;

    let response = start(&client, &address, &link, None, json!({})).await;
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn auto_submit_is_tagged_and_keeps_answers() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let teacher = token_for("teacher-1", "teacher");

    let (_, link) = create_quiz(
        &client,
        &address,
        &teacher,
        &two_question_quiz(json!({ "time_limit_minutes": 5 })),
    )
    .await;

    let started: Value = start(&client, &address, &link, None, json!({ "name": "Timer" }))
        .await
        .json()
        .await
        .unwrap();
    assert!(started["deadline"].is_string());

    let result: Value = submit(
        &client,
        &address,
        &link,
        "auto-submit",
        started["session_token"].as_str().unwrap(),
        json!([{ "question_index": 0, "answer": 1 }]),
    )
    .await
    .json()
    .await
    .unwrap();

    assert_eq!(result["finalized_as"], "auto_submitted");
    assert_eq!(result["score"], 2);
    assert!(result["time_spent_seconds"].as_i64().unwrap() <= 300);
}

#[tokio::test]
async fn feedback_follows_quiz_settings() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let teacher = token_for("teacher-1", "teacher");

    let (_, hidden) = create_quiz(
        &client,
        &address,
        &teacher,
        &two_question_quiz(json!({ "show_score_immediately": false })),
    )
    .await;
    let (_, revealed) = create_quiz(
        &client,
        &address,
        &teacher,
        &two_question_quiz(json!({ "show_correct_answers": true })),
    )
    .await;

    for (link, expect_feedback) in [(hidden, false), (revealed, true)] {
        let started: Value = start(&client, &address, &link, None, json!({ "name": "Reader" }))
            .await
            .json()
            .await
            .unwrap();
        let result: Value = submit(
            &client,
            &address,
            &link,
            "submit",
            started["session_token"].as_str().unwrap(),
            answers(1, 1),
        )
        .await
        .json()
        .await
        .unwrap();

        if expect_feedback {
            assert_eq!(result["score"], 2);
            assert_eq!(result["answers"][1]["correct_answer"], 0);
            assert_eq!(result["answers"][0]["explanation"], "B is right");
        } else {
            assert!(result.get("score").is_none());
            assert!(result.get("answers").is_none());
        }
    }
}

#[tokio::test]
async fn tampered_session_token_is_rejected() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let teacher = token_for("teacher-1", "teacher");

    let (_, link) = create_quiz(&client, &address, &teacher, &two_question_quiz(json!({}))).await;

    let response = submit(&client, &address, &link, "submit", "not.a.token", answers(1, 0)).await;
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn out_of_range_answer_is_rejected() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let teacher = token_for("teacher-1", "teacher");

    let (quiz_id, link) = create_quiz(&client, &address, &teacher, &two_question_quiz(json!({}))).await;
    let started: Value = start(&client, &address, &link, None, json!({ "name": "Oops" }))
        .await
        .json()
        .await
        .unwrap();

    let response = submit(
        &client,
        &address,
        &link,
        "submit",
        started["session_token"].as_str().unwrap(),
        json!([{ "question_index": 9, "answer": 0 }]),
    )
    .await;
    assert_eq!(response.status().as_u16(), 400);

    let results: Value = client
        .get(format!("{}/api/quizzes/{}/results", address, quiz_id))
        .bearer_auth(&teacher)
        .send()
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .unwrap();
    assert!(results["submissions"].as_array().unwrap().is_empty());
}
