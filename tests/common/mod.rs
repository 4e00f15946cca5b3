#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use estaciona_api::{
    config::AppConfig,
    db,
    entities::{door, place, user, user_vehicle, vehicle},
    AppState,
};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

pub const ZONE_A: &str = "Edificio A";
pub const ZONE_B: &str = "Edificio B";

/// Helper harness running the full router over a throwaway SQLite file.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    _dir: TempDir,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Same as [`TestApp::new`] with a hook to tweak configuration first.
    pub async fn with_config(tweak: impl FnOnce(&mut AppConfig)) -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let db_file = dir.path().join("estaciona_test.db");

        let mut cfg = AppConfig::new(
            format!("sqlite://{}?mode=rwc", db_file.display()),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.auto_migrate = true;
        // A single connection by default; concurrency tests widen the pool through `tweak`
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;
        tweak(&mut cfg);

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        door::ActiveModel {
            door_id: Set(cfg.entry_door_id),
            requested: Set(false),
        }
        .insert(&pool)
        .await
        .expect("seed entry door");

        let state = AppState::new(Arc::new(pool), cfg);
        let router = estaciona_api::app_router(state.clone());

        Self {
            router,
            state,
            _dir: dir,
        }
    }

    pub fn db(&self) -> &DatabaseConnection {
        self.state.db.as_ref()
    }

    pub async fn add_user(&self, tuition: &str, building: &str) -> i32 {
        user::ActiveModel {
            name: Set(format!("User {}", tuition)),
            tuition: Set(tuition.to_string()),
            major: Set("ITC".to_string()),
            access_type: Set("student".to_string()),
            password: Set(format!("pw-{}", tuition)),
            building: Set(building.to_string()),
            ..Default::default()
        }
        .insert(self.db())
        .await
        .expect("seed user")
        .id
    }

    pub async fn add_vehicle(&self, user_id: i32, brand: Option<&str>, model: Option<&str>) {
        let car = vehicle::ActiveModel {
            brand: Set(brand.map(str::to_string)),
            model: Set(model.map(str::to_string)),
            ..Default::default()
        }
        .insert(self.db())
        .await
        .expect("seed vehicle");

        user_vehicle::ActiveModel {
            user_id: Set(user_id),
            vehicle_id: Set(car.vehicle_id),
        }
        .insert(self.db())
        .await
        .expect("link vehicle");
    }

    pub async fn add_place(&self, zone: &str, enabled: bool) -> i32 {
        place::ActiveModel {
            zone: Set(zone.to_string()),
            status: Set(enabled),
            taken: Set(place::TAKEN_FREE),
            user_id: Set(None),
            ..Default::default()
        }
        .insert(self.db())
        .await
        .expect("seed place")
        .place_id
    }

    /// Adds a place already held by `user_id`.
    pub async fn add_taken_place(&self, zone: &str, user_id: i32) -> i32 {
        place::ActiveModel {
            zone: Set(zone.to_string()),
            status: Set(true),
            taken: Set(place::TAKEN_OCCUPIED),
            user_id: Set(Some(user_id)),
            ..Default::default()
        }
        .insert(self.db())
        .await
        .expect("seed taken place")
        .place_id
    }

    pub async fn places(&self) -> Vec<place::Model> {
        place::Entity::find()
            .order_by_asc(place::Column::PlaceId)
            .all(self.db())
            .await
            .expect("load places")
    }

    pub async fn place(&self, place_id: i32) -> place::Model {
        place::Entity::find_by_id(place_id)
            .one(self.db())
            .await
            .expect("load place")
            .expect("place exists")
    }

    pub async fn user(&self, user_id: i32) -> user::Model {
        user::Entity::find_by_id(user_id)
            .one(self.db())
            .await
            .expect("load user")
            .expect("user exists")
    }

    pub async fn entry_door(&self) -> door::Model {
        door::Entity::find_by_id(self.state.config.entry_door_id)
            .one(self.db())
            .await
            .expect("load door")
            .expect("door exists")
    }

    /// Send a request against the router with an optional JSON body.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.send(request).await
    }

    /// Send a prebuilt request.
    pub async fn send(&self, request: Request<Body>) -> axum::response::Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Request and decode the JSON body in one go.
    pub async fn json(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let response = self.request(method, uri, body).await;
        let status = response.status();
        (status, response_json(response).await)
    }
}

pub async fn response_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).expect("response body is JSON")
}
