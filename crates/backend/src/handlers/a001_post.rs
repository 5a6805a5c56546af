use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use contracts::domain::a001_post::aggregate::Post;
use contracts::domain::meta::{MetaCollection, MetaCondition, MetaEntry, MetaFilter, MetaWriteDto};
use sea_orm::DatabaseConnection;

use crate::domain::a001_post;

/// `meta=key` checks existence, `meta=key:value` matches the value
fn parse_meta_param(raw: &str) -> MetaCondition {
    match raw.split_once(':') {
        Some((key, value)) => MetaCondition::equals(key, value),
        None => MetaCondition::exists(raw),
    }
}

/// GET /api/posts?type=page&meta=color:red&meta=size
pub async fn list(
    State(db): State<DatabaseConnection>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<Vec<Post>>, StatusCode> {
    let mut post_type = None;
    let mut filter = MetaFilter::new();
    for (name, value) in params {
        match name.as_str() {
            "type" => post_type = Some(value),
            "meta" => filter = filter.and(parse_meta_param(&value)),
            _ => {}
        }
    }
    match a001_post::service::list(&db, post_type, filter).await {
        Ok(v) => Ok(Json(v)),
        Err(e) => {
            tracing::error!("Failed to list posts: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// GET /api/posts/:id/meta
pub async fn get_meta(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i64>,
) -> Result<Json<MetaCollection>, StatusCode> {
    match a001_post::service::get_with_meta(&db, id).await {
        Ok(Some(post)) => Ok(Json(post.meta.unwrap_or_default())),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(e) => {
            tracing::error!("Failed to load meta of post {}: {}", id, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// PUT /api/posts/:id/meta
pub async fn save_meta(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i64>,
    Json(dto): Json<MetaWriteDto>,
) -> Result<Json<MetaCollection>, StatusCode> {
    match a001_post::service::save_meta(&db, id, dto.into()).await {
        Ok(Some(meta)) => Ok(Json(meta)),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(e) => {
            tracing::error!("Failed to save meta of post {}: {}", id, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// POST /api/posts/:id/meta
pub async fn create_meta(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i64>,
    Json(dto): Json<MetaWriteDto>,
) -> Result<Json<Vec<MetaEntry>>, StatusCode> {
    match a001_post::service::create_meta(&db, id, dto.into()).await {
        Ok(Some(created)) => Ok(Json(created)),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(e) => {
            tracing::error!("Failed to create meta of post {}: {}", id, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// POST /api/posts/testdata
pub async fn insert_test_data(State(db): State<DatabaseConnection>) -> StatusCode {
    match a001_post::service::insert_test_data(&db).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::error!("Failed to insert test data: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::a001_post::repository;
    use crate::routes::configure_routes;
    use crate::shared::data::db::connect_in_memory;
    use axum::body::Body;
    use axum::http::{Method, Request};
    use axum::Router;
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    struct TestApp {
        db: DatabaseConnection,
        router: Router,
    }

    impl TestApp {
        async fn new() -> Self {
            let db = connect_in_memory().await.unwrap();
            Self {
                router: configure_routes(db.clone()),
                db,
            }
        }

        async fn post(&self, post_type: &str, title: &str) -> i64 {
            let post = Post::new_for_insert(post_type, title.into(), String::new());
            repository::insert(&self.db, &post).await.unwrap()
        }

        async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
            let response = self.router.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = response.into_body().collect().await.unwrap().to_bytes();
            let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
            (status, body)
        }

        async fn get(&self, uri: &str) -> (StatusCode, Value) {
            self.send(Request::get(uri).body(Body::empty()).unwrap())
                .await
        }

        async fn send_json(&self, method: Method, uri: &str, body: Value) -> (StatusCode, Value) {
            let request = Request::builder()
                .method(method)
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap();
            self.send(request).await
        }
    }

    fn pairs(meta: &Value) -> Vec<(String, Value)> {
        meta.as_array()
            .unwrap()
            .iter()
            .map(|e| (e["metaKey"].as_str().unwrap().to_string(), e["metaValue"].clone()))
            .collect()
    }

    #[test]
    fn test_parse_meta_param() {
        assert_eq!(parse_meta_param("color"), MetaCondition::exists("color"));
        assert_eq!(
            parse_meta_param("color:red"),
            MetaCondition::equals("color", "red")
        );
        // only the first colon separates key and value
        assert_eq!(
            parse_meta_param("url:http://x"),
            MetaCondition::equals("url", "http://x")
        );
    }

    #[tokio::test]
    async fn test_health() {
        let app = TestApp::new().await;
        let response = app
            .router
            .clone()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], b"ok");
    }

    #[tokio::test]
    async fn test_save_then_get_meta() {
        let app = TestApp::new().await;
        let id = app.post("post", "Shirt").await;
        let uri = format!("/api/posts/{id}/meta");

        let (status, saved) = app
            .send_json(Method::PUT, &uri, json!({"color": "red", "draft": null}))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(saved.as_array().unwrap().len(), 2);

        // second save updates in place
        let (status, _) = app
            .send_json(Method::PUT, &uri, json!({"color": "blue", "featured": true}))
            .await;
        assert_eq!(status, StatusCode::OK);

        let (status, meta) = app.get(&uri).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            pairs(&meta),
            vec![
                ("color".to_string(), json!("blue")),
                ("draft".to_string(), Value::Null),
                ("featured".to_string(), json!("1")),
            ]
        );
    }

    #[tokio::test]
    async fn test_create_meta_duplicates_keys() {
        let app = TestApp::new().await;
        let id = app.post("post", "Gallery").await;
        let uri = format!("/api/posts/{id}/meta");

        let (status, created) = app.send_json(Method::POST, &uri, json!({"tag": "a"})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(created[0]["ownerId"], json!(id));
        app.send_json(Method::POST, &uri, json!({"tag": "b"})).await;

        let (_, meta) = app.get(&uri).await;
        assert_eq!(
            pairs(&meta),
            vec![
                ("tag".to_string(), json!("a")),
                ("tag".to_string(), json!("b")),
            ]
        );
    }

    #[tokio::test]
    async fn test_unknown_post_is_not_found() {
        let app = TestApp::new().await;
        let uri = "/api/posts/404/meta";

        assert_eq!(app.get(uri).await.0, StatusCode::NOT_FOUND);
        let body = json!({"color": "red"});
        assert_eq!(
            app.send_json(Method::PUT, uri, body.clone()).await.0,
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            app.send_json(Method::POST, uri, body).await.0,
            StatusCode::NOT_FOUND
        );
    }

    #[tokio::test]
    async fn test_body_must_be_an_object() {
        let app = TestApp::new().await;
        let id = app.post("post", "Shirt").await;
        let (status, _) = app
            .send_json(
                Method::PUT,
                &format!("/api/posts/{id}/meta"),
                json!([{"key": "color", "value": "red"}]),
            )
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_list_filters_by_type_and_meta() {
        let app = TestApp::new().await;
        let red = app.post("post", "Red").await;
        let blue = app.post("post", "Blue").await;
        let page = app.post("page", "About").await;
        for (id, color) in [(red, "red"), (blue, "blue"), (page, "red")] {
            let (status, _) = app
                .send_json(
                    Method::PUT,
                    &format!("/api/posts/{id}/meta"),
                    json!({"color": color, "size": "xl"}),
                )
                .await;
            assert_eq!(status, StatusCode::OK);
        }

        let ids = |body: Value| -> Vec<i64> {
            body.as_array()
                .unwrap()
                .iter()
                .map(|p| p["id"].as_i64().unwrap())
                .collect()
        };

        let (status, body) = app.get("/api/posts?type=post&meta=color:red").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ids(body), vec![red]);

        let (_, body) = app.get("/api/posts?meta=color:red&meta=size").await;
        assert_eq!(ids(body), vec![red, page]);

        let (_, body) = app.get("/api/posts?type=page").await;
        assert_eq!(ids(body), vec![page]);

        let (_, body) = app.get("/api/posts?meta=color:green").await;
        assert!(ids(body).is_empty());
    }
}
