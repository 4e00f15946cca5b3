mod common;

use axum::http::{Method, StatusCode};
use common::{TestApp, ZONE_A, ZONE_B};
use estaciona_api::entities::door;
use rstest::rstest;
use sea_orm::EntityTrait;
use serde_json::json;

#[tokio::test]
async fn lists_users_with_vehicle_and_hides_passwords() {
    let app = TestApp::new().await;
    let first = app.add_user("A001", ZONE_A).await;
    let second = app.add_user("B002", ZONE_B).await;
    app.add_vehicle(first, Some("Mazda"), Some("3")).await;
    app.add_vehicle(second, None, Some("Sentra")).await;
    app.add_user("C003", "Unknown").await;

    let (status, body) = app.json(Method::GET, "/data", None).await;

    assert_eq!(status, StatusCode::OK);
    let users = body.as_array().expect("array of users");
    assert_eq!(users.len(), 3);
    assert_eq!(users[0]["tuition"], "A001");
    assert_eq!(users[0]["vehicle"], "Mazda 3");
    assert_eq!(users[0]["building"], ZONE_A);
    assert_eq!(users[1]["vehicle"], "Sentra");
    assert_eq!(users[2]["vehicle"], "");
    assert!(users.iter().all(|u| u.get("password").is_none()));
}

#[tokio::test]
async fn exposes_passwords_when_configured() {
    let app = TestApp::with_config(|cfg| cfg.expose_passwords = true).await;
    app.add_user("A001", ZONE_A).await;

    let (status, body) = app.json(Method::GET, "/users", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["password"], "pw-A001");
}

#[tokio::test]
async fn empty_user_table_lists_nothing() {
    let app = TestApp::new().await;

    let (status, body) = app.json(Method::GET, "/data", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[rstest]
#[case("/set_requested_entrada")]
#[case("/set_requested_entry")]
#[tokio::test]
async fn request_entry_raises_door_flag(#[case] path: &str) {
    let app = TestApp::new().await;
    assert!(!app.entry_door().await.requested);

    let (status, body) = app.json(Method::POST, path, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Entrada actualizada exitosamente");
    assert!(app.entry_door().await.requested);

    // Raising an already raised flag still succeeds
    let (again, _) = app.json(Method::POST, path, None).await;
    assert_eq!(again, StatusCode::OK);
}

#[tokio::test]
async fn request_entry_without_door_is_not_found() {
    let app = TestApp::new().await;
    door::Entity::delete_by_id(app.state.config.entry_door_id)
        .exec(app.db())
        .await
        .expect("delete door");

    let (status, body) = app.json(Method::POST, "/set_requested_entrada", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "Error");
}

#[rstest]
#[case("/updateEdificio")]
#[case("/updateBuilding")]
#[tokio::test]
async fn update_building_changes_user(#[case] path: &str) {
    let app = TestApp::new().await;
    let user_id = app.add_user("A001", ZONE_A).await;

    let (status, body) = app
        .json(
            Method::POST,
            path,
            Some(json!({"tuition": "A001", "building": ZONE_B})),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "building actualizado exitosamente");
    assert_eq!(app.user(user_id).await.building, ZONE_B);
}

#[tokio::test]
async fn update_building_for_unknown_user_is_not_found() {
    let app = TestApp::new().await;

    let (status, body) = app
        .json(
            Method::POST,
            "/updateEdificio",
            Some(json!({"tuition": "ghost", "building": ZONE_A})),
        )
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not Found");
}

#[rstest]
#[case(json!({"tuition": "A001"}))]
#[case(json!({"building": "Edificio B"}))]
#[case(json!({"tuition": "A001", "building": "  "}))]
#[tokio::test]
async fn update_building_requires_both_fields(#[case] payload: serde_json::Value) {
    let app = TestApp::new().await;
    let user_id = app.add_user("A001", ZONE_A).await;

    let (status, body) = app.json(Method::POST, "/updateEdificio", Some(payload)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"]
        .as_str()
        .is_some_and(|m| m.contains("Faltan parámetros")));
    assert_eq!(app.user(user_id).await.building, ZONE_A);
}

#[rstest]
#[case("/update_salida_y_reset")]
#[case("/update_exit_and_reset")]
#[tokio::test]
async fn exit_and_reset_flags_door_and_clears_building(#[case] path: &str) {
    let app = TestApp::new().await;
    let user_id = app.add_user("A001", ZONE_A).await;

    let (status, body) = app
        .json(Method::POST, path, Some(json!({"tuition": "A001"})))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Salida y edificio actualizados exitosamente");
    assert!(app.entry_door().await.requested);
    assert_eq!(app.user(user_id).await.building, "Unknown");
}

#[tokio::test]
async fn exit_and_reset_for_unknown_user_changes_nothing() {
    let app = TestApp::new().await;

    let (status, _) = app
        .json(
            Method::POST,
            "/update_salida_y_reset",
            Some(json!({"tuition": "ghost"})),
        )
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(!app.entry_door().await.requested);
}

#[tokio::test]
async fn exit_and_reset_uses_configured_unknown_building() {
    let app = TestApp::with_config(|cfg| cfg.unknown_building = "Fuera".into()).await;
    let user_id = app.add_user("A001", ZONE_A).await;

    let (status, _) = app
        .json(
            Method::POST,
            "/update_salida_y_reset",
            Some(json!({"tuition": "A001"})),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.user(user_id).await.building, "Fuera");
}

#[rstest]
#[case("/get_lugares")]
#[case("/get_places")]
#[tokio::test]
async fn lists_places_with_enabled_flag(#[case] path: &str) {
    let app = TestApp::new().await;
    let holder = app.add_user("A001", ZONE_A).await;
    let enabled = app.add_place(ZONE_A, true).await;
    let disabled = app.add_place(ZONE_B, false).await;
    let taken = app.add_taken_place(ZONE_A, holder).await;

    let (status, body) = app.json(Method::GET, path, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([
            {"place_id": enabled, "status": 1},
            {"place_id": disabled, "status": 0},
            {"place_id": taken, "status": 1},
        ])
    );
}
