use axum::{
    routing::{get, post},
    Router,
};
use sea_orm::DatabaseConnection;

use crate::handlers;

/// Конфигурация всех роутов приложения
pub fn configure_routes(db: DatabaseConnection) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/posts", get(handlers::a001_post::list))
        .route(
            "/api/posts/testdata",
            post(handlers::a001_post::insert_test_data),
        )
        .route(
            "/api/posts/:id/meta",
            get(handlers::a001_post::get_meta)
                .put(handlers::a001_post::save_meta)
                .post(handlers::a001_post::create_meta),
        )
        .with_state(db)
}
