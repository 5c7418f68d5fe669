use axum::http::StatusCode;
use danci_phonics::state::RuntimeConfig;
use serde_json::json;

mod common;

#[tokio::test]
async fn test_health_root() {
    let app = common::create_test_app();
    let (status, body) = common::get_json(app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["llmFeedback"], "local");
}

#[tokio::test]
async fn test_health_live_and_info() {
    let (status, _) = common::get_json(common::create_test_app(), "/health/live").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = common::get_json(common::create_test_app(), "/health/info").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"], "danci-phonics");
}

#[tokio::test]
async fn test_404_not_found() {
    let (status, body) = common::get_json(common::create_test_app(), "/nonexistent/path").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_score_exact_match() {
    let (status, body) = common::post_json(
        common::create_test_app(),
        "/api/pronunciation/score",
        json!({ "expected": "Cat", "actual": "cat" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!({ "overall": 100, "accuracy": 100, "completeness": 100, "similarity": 100 }));
}

#[tokio::test]
async fn test_score_rejects_huge_input() {
    let (status, body) = common::post_json(
        common::create_test_app(),
        "/api/pronunciation/score",
        json!({ "expected": "a".repeat(500), "actual": "a" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_feedback_with_catalog_phoneme() {
    let (status, body) = common::post_json(
        common::create_test_app(),
        "/api/pronunciation/feedback",
        json!({
            "targetWord": "ship",
            "recognizedWord": "sip",
            "phonemeSymbol": "sh",
            "attemptNumber": 3
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["attemptNumber"], 3);
    assert_eq!(data["score"]["overall"], 30);
    assert_eq!(data["feedback"]["confidenceLevel"], "keep_trying");
    let tips = data["feedback"]["specificTips"].as_array().unwrap();
    assert!(tips.iter().any(|t| t.as_str().unwrap().contains("/ʃ/")));
    assert!(tips.last().unwrap().as_str().unwrap().contains("3 times"));
}

#[tokio::test]
async fn test_feedback_requires_target() {
    let (status, _) = common::post_json(
        common::create_test_app(),
        "/api/pronunciation/feedback",
        json!({ "targetWord": "  ", "recognizedWord": "cat" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_feedback_rejects_unbounded_history() {
    let app = common::create_test_app();
    let history: Vec<String> = (0..500).map(|i| format!("sip{i}")).collect();
    let (status, body) = common::post_json(
        app.clone(),
        "/api/pronunciation/feedback",
        json!({ "targetWord": "ship", "recognizedWord": "sip", "previousAttempts": history }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, _) = common::post_json(
        app,
        "/api/pronunciation/feedback",
        json!({
            "targetWord": "ship",
            "recognizedWord": "sip",
            "phoneme": {
                "symbol": "sh",
                "ipa": "ʃ",
                "category": "digraph",
                "description": "quiet sound",
                "tips": ["x".repeat(201)]
            }
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_feedback_settings_require_token_when_configured() {
    let runtime = RuntimeConfig::default().with_settings_token(Some("op-token".into()));
    let app = common::create_test_app_with_runtime(runtime);

    let (status, body) = common::request_json(
        app.clone(),
        "PUT",
        "/api/pronunciation/settings",
        json!({ "llmEnabled": false }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let (_, body) = common::get_json(app.clone(), "/api/pronunciation/settings").await;
    assert_eq!(body["data"]["llmEnabled"], true);

    let (status, body) = common::request_json_with_headers(
        app,
        "PUT",
        "/api/pronunciation/settings",
        &[("x-settings-token", "op-token")],
        json!({ "llmEnabled": false }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["llmEnabled"], false);
}

#[tokio::test]
async fn test_feedback_settings_toggle() {
    let app = common::create_test_app();
    let (status, body) = common::request_json(
        app.clone(),
        "PUT",
        "/api/pronunciation/settings",
        json!({ "llmEnabled": false }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["llmEnabled"], false);
    assert_eq!(body["data"]["remoteAvailable"], false);

    let (_, body) = common::get_json(app, "/api/pronunciation/settings").await;
    assert_eq!(body["data"]["llmEnabled"], false);
}

#[tokio::test]
async fn test_phoneme_lookup() {
    let (status, body) = common::get_json(common::create_test_app(), "/api/phonemes/CH").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["ipa"], "tʃ");

    let (status, _) = common::get_json(common::create_test_app(), "/api/phonemes/zz").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = common::get_json(common::create_test_app(), "/api/phonemes").await;
    assert!(body["data"].as_array().unwrap().len() >= 9);
}

#[tokio::test]
async fn test_level_lookup() {
    let (status, body) = common::get_json(common::create_test_app(), "/api/progression/levels/260").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["level"], 3);
    assert_eq!(body["data"]["xpForNextLevel"], 215);

    let (status, _) = common::get_json(common::create_test_app(), "/api/progression/levels/-5").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_progress_event_with_quest_board() {
    let app = common::create_test_app();
    let (_, daily) = common::get_json(app.clone(), "/api/quests/daily").await;
    let board = daily["data"].clone();
    assert_eq!(board["quests"].as_array().unwrap().len(), 4);

    let (status, body) = common::post_json(
        app,
        "/api/progression/events",
        json!({
            "state": { "xp": 90, "level": 7 },
            "board": board,
            "event": { "type": "pronunciation_scored", "overall": 100, "on": "2026-05-01" }
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["state"]["xp"], 100);
    assert_eq!(data["state"]["level"], 2);
    assert_eq!(data["state"]["perfectPronunciations"], 1);
    let notices = data["notices"].as_array().unwrap();
    assert!(notices.iter().any(|n| n["type"] == "level_up"));
    assert_eq!(data["questCompletions"], json!([]));
}

#[tokio::test]
async fn test_normalize_snapshot() {
    let (status, body) = common::post_json(
        common::create_test_app(),
        "/api/progression/normalize",
        json!({ "xp": 475, "level": 1, "levelTitle": "wrong" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["level"], 4);
    assert_eq!(body["data"]["levelProgress"], 0);
}

#[tokio::test]
async fn test_achievement_progress() {
    let (status, body) = common::post_json(
        common::create_test_app(),
        "/api/progression/achievements",
        json!({ "state": { "xp": 0, "lessonsCompleted": 1, "achievements": ["first-steps"] } }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["unlockedCount"], 1);
    let first = body["data"]["achievements"]
        .as_array()
        .unwrap()
        .iter()
        .find(|a| a["achievementId"] == "first-steps")
        .cloned()
        .unwrap();
    assert_eq!(first["currentValue"], 1);
}

#[tokio::test]
async fn test_achievement_progress_without_state() {
    let (status, body) = common::post_json(
        common::create_test_app(),
        "/api/progression/achievements",
        json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["unlockedCount"], 0);
    assert_eq!(body["data"]["achievements"].as_array().unwrap().len(), 8);
}

#[tokio::test]
async fn test_quest_progress() {
    let app = common::create_test_app();
    let (_, daily) = common::get_json(app.clone(), "/api/quests/daily").await;
    let board = daily["data"].clone();
    let now = chrono::Utc::now().to_rfc3339();

    let (status, body) = common::post_json(
        app,
        "/api/quests/progress",
        json!({ "board": board, "kind": "complete_lessons", "amount": 2, "now": now }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["xpAwarded"], 30);
    assert_eq!(body["data"]["completions"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"]["allCompleted"], false);
}

#[tokio::test]
async fn test_lesson_flow_round_trip() {
    let app = common::create_test_app();
    let mut flow = serde_json::Value::Null;
    for _ in 0..3 {
        let (status, body) = common::post_json(
            app.clone(),
            "/api/lessons/transition",
            json!({ "lessonId": "short-a", "flow": flow, "action": { "type": "advance" } }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        flow = body["data"]["flow"].clone();
    }
    assert_eq!(flow["phase"], "assess");

    let (status, body) = common::post_json(
        app.clone(),
        "/api/lessons/transition",
        json!({
            "lessonId": "short-a",
            "flow": flow,
            "action": { "type": "complete", "score": 95, "on": "2026-05-01" }
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["flow"]["phase"], "completed");
    assert_eq!(body["data"]["event"]["type"], "lesson_completed");
    assert_eq!(body["data"]["event"]["assessmentScore"], 95);

    let (status, body) = common::post_json(
        app,
        "/api/lessons/transition",
        json!({ "lessonId": "short-a", "action": { "type": "back" } }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");
}
