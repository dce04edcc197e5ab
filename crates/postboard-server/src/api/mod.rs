mod dashboard;
mod instagram;

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderName, Method},
    routing::get,
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use postboard_instagram::{InstagramClient, MediaSource};
use postboard_supabase::SupabaseClient;
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{request_id, RequestId};

#[derive(Clone)]
pub struct AppState {
    pub instagram: Arc<InstagramClient>,
    /// `None` when Supabase is not configured (development only).
    pub supabase: Option<Arc<SupabaseClient>>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

impl ResponseMeta {
    fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    instagram: &'static str,
    supabase: &'static str,
}

fn configured(flag: bool) -> &'static str {
    if flag {
        "configured"
    } else {
        "not_configured"
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
        ])
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route(
            "/api/instagram/weekly-posts",
            get(instagram::get_weekly_posts),
        )
        .route(
            "/api/dashboard/statistics",
            get(dashboard::get_dashboard_statistics),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<HealthData>> {
    Json(ApiResponse {
        data: HealthData {
            status: "ok",
            instagram: configured(state.instagram.is_configured()),
            supabase: configured(state.supabase.is_some()),
        },
        meta: ResponseMeta::new(req_id.0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use postboard_core::InstagramSettings;
    use tower::ServiceExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn unconfigured_instagram() -> Arc<InstagramClient> {
        let settings = InstagramSettings {
            access_token: None,
            business_account_id: None,
            graph_base_url: "https://graph.facebook.com/v18.0".to_string(),
        };
        Arc::new(InstagramClient::new(&settings, 5, "postboard-test").expect("client"))
    }

    fn supabase_at(uri: &str) -> Option<Arc<SupabaseClient>> {
        Some(Arc::new(
            SupabaseClient::new(uri, "anon-key", Some("service-key"), 5, "postboard-test")
                .expect("supabase client"),
        ))
    }

    async fn get_json(
        app: Router,
        uri: &str,
        authorization: Option<&str>,
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder().uri(uri);
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        let response = app
            .oneshot(builder.body(Body::empty()).expect("request"))
            .await
            .expect("response");
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json = serde_json::from_slice(&body).expect("json parse");
        (status, json)
    }

    // -------------------------------------------------------------------------
    // Health
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn health_reports_collaborator_configuration() {
        let app = build_app(AppState {
            instagram: unconfigured_instagram(),
            supabase: None,
        });
        let (status, json) = get_json(app, "/api/health", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["status"], "ok");
        assert_eq!(json["data"]["instagram"], "not_configured");
        assert_eq!(json["data"]["supabase"], "not_configured");
        assert!(json["meta"]["request_id"].is_string());
    }

    #[tokio::test]
    async fn request_id_is_echoed() {
        let app = build_app(AppState {
            instagram: unconfigured_instagram(),
            supabase: None,
        });
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/health")
                    .header("x-request-id", "req-42")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(
            response
                .headers()
                .get("x-request-id")
                .and_then(|v| v.to_str().ok()),
            Some("req-42")
        );
    }

    // -------------------------------------------------------------------------
    // Weekly posts
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn weekly_posts_unconfigured_returns_failure_body() {
        let app = build_app(AppState {
            instagram: unconfigured_instagram(),
            supabase: None,
        });
        let (status, json) = get_json(app, "/api/instagram/weekly-posts", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json,
            serde_json::json!({"success": false, "error": "Instagram service not configured"})
        );
    }

    #[tokio::test]
    async fn weekly_posts_filters_graph_media() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/1784/media"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": [
                    { "id": "future", "timestamp": "2999-01-01T00:00:00+0000" },
                    { "id": "garbage", "timestamp": "not-a-date" },
                    { "id": "ancient", "timestamp": "2000-01-03T00:00:00Z" }
                ]
            })))
            .mount(&server)
            .await;

        let instagram = InstagramClient::with_base_url("token", "1784", 5, &server.uri())
            .expect("instagram client");
        let app = build_app(AppState {
            instagram: Arc::new(instagram),
            supabase: None,
        });
        let (status, json) = get_json(app, "/api/instagram/weekly-posts", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], true);
        assert_eq!(json["total_posts"], 1);
        assert_eq!(json["posts"][0]["id"], "future");
        assert!(json["week_start"]
            .as_str()
            .is_some_and(|s| s.ends_with("T00:00:00")));
    }

    // -------------------------------------------------------------------------
    // Dashboard statistics
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn statistics_without_header_is_unauthorized() {
        let app = build_app(AppState {
            instagram: unconfigured_instagram(),
            supabase: None,
        });
        let (status, json) = get_json(app, "/api/dashboard/statistics", None).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Invalid authorization header");
    }

    #[tokio::test]
    async fn statistics_with_malformed_header_is_unauthorized() {
        for value in ["Basic dXNlcjpwYXNz", "Bearer ", "bearer token"] {
            let app = build_app(AppState {
                instagram: unconfigured_instagram(),
                supabase: None,
            });
            let (status, _) = get_json(app, "/api/dashboard/statistics", Some(value)).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "header: {value}");
        }
    }

    #[tokio::test]
    async fn statistics_returns_collaborator_payload() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "id": "user-1", "email": "a@b.c" })),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/rpc/get_dashboard_statistics"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "total": 7, "active": 2 })),
            )
            .mount(&server)
            .await;

        let app = build_app(AppState {
            instagram: unconfigured_instagram(),
            supabase: supabase_at(&server.uri()),
        });
        let (status, json) =
            get_json(app, "/api/dashboard/statistics", Some("Bearer user-jwt")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json,
            serde_json::json!({ "success": true, "statistics": { "total": 7, "active": 2 } })
        );
    }

    #[tokio::test]
    async fn statistics_auth_failure_is_reported_in_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(serde_json::json!({ "msg": "bad jwt" })),
            )
            .mount(&server)
            .await;

        let app = build_app(AppState {
            instagram: unconfigured_instagram(),
            supabase: supabase_at(&server.uri()),
        });
        let (status, json) =
            get_json(app, "/api/dashboard/statistics", Some("Bearer expired")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "invalid or expired token: bad jwt");
        assert!(json.get("statistics").is_none());
    }

    #[tokio::test]
    async fn statistics_without_supabase_reports_not_configured() {
        let app = build_app(AppState {
            instagram: unconfigured_instagram(),
            supabase: None,
        });
        let (status, json) =
            get_json(app, "/api/dashboard/statistics", Some("Bearer token")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json,
            serde_json::json!({ "success": false, "error": "Supabase service not configured" })
        );
    }
}
