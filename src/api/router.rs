//! HTTP router for the prediction service.
//!
//! Routes are nested under `/api/`. Every request passes through the
//! request logger; CORS is added only when a client origin is configured.

use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;

/// Build the API router.
pub fn api_router(ctx: ApiContext, cors: Option<CorsLayer>) -> Router {
    let api = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/predict-diabetes", post(endpoints::predict::diabetes))
        .route("/predict-heart", post(endpoints::predict::heart))
        .with_state(ctx)
        .layer(axum::middleware::from_fn(middleware::request_log::log_request));

    let router = Router::new().nest("/api", api);
    match cors {
        Some(layer) => router.layer(layer),
        None => router,
    }
}

/// CORS policy allowing a single browser origin with credentials.
///
/// Methods and headers are mirrored from the preflight; wildcards are not
/// allowed together with credentials.
///
/// # Errors
/// The origin is not a valid header value.
pub fn cors_layer(origin: &str) -> Result<CorsLayer, axum::http::header::InvalidHeaderValue> {
    let origin = HeaderValue::from_str(origin.trim_end_matches('/'))?;
    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::models::Domain;
    use crate::pipeline::artifacts::tests::{mock_bundle, shipped_bundle};
    use crate::pipeline::model::MockModel;
    use crate::pipeline::narrator::{MockNarrator, Narrator};
    use crate::pipeline::RiskPipeline;

    const DIABETES_BODY: &str = r#"{
        "systolic_bp": 150, "diastolic_bp": 95, "cholesterol_mg_dl": 220, "bmi": 31.5,
        "smoker": true, "phys_activity": false, "heart_disease_or_attack": false,
        "diff_walk": true, "sex": "Male", "age_years": 45, "stroke": false,
        "annual_income": 55000, "chol_check": true, "hvy_alcohol_consump": false,
        "gen_health": 3
    }"#;

    fn heart_body(chest_pain: &str) -> String {
        format!(
            r#"{{"Age": 58, "Sex": "M", "ChestPainType": "{chest_pain}", "RestingBP": 140,
                "Cholesterol": 260, "FastingBS": 1, "MaxHR": 118, "ExerciseAngina": "Y",
                "Oldpeak": 2.0, "ST_Slope": "Flat"}}"#
        )
    }

    fn heart_scores() -> Vec<f64> {
        let mut scores = vec![0.0; 17];
        scores[2] = 0.8; // ChestPainType_ASY
        scores[12] = -0.5; // Age
        scores[7] = 0.3; // ExerciseAngina_Y
        scores
    }

    fn ctx_with(diabetes: MockModel, heart: MockModel, narrator: Arc<dyn Narrator>) -> ApiContext {
        ApiContext::new(
            RiskPipeline::new(Arc::new(mock_bundle(Domain::Diabetes, diabetes)), narrator.clone()),
            RiskPipeline::new(Arc::new(mock_bundle(Domain::Heart, heart)), narrator),
            true,
        )
    }

    fn default_ctx() -> ApiContext {
        ctx_with(
            MockModel::new(0, 0.2, 14),
            MockModel::new(1, 0.91, 17).with_contributions(heart_scores()),
            Arc::new(MockNarrator::new("Mock narrative")),
        )
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let body = to_bytes(response.into_body(), 64 * 1024).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn health_reports_loaded_domains() {
        let app = api_router(default_ctx(), None);
        let req = Request::builder()
            .uri("/api/health")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(req).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("X-Request-Id"));
        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["narrator_enabled"], true);
        assert_eq!(json["domains"][0]["domain"], "diabetes");
        assert_eq!(json["domains"][0]["features"], 14);
        assert_eq!(json["domains"][1]["features"], 17);
    }

    #[tokio::test]
    async fn heart_positive_returns_ranked_contributors() {
        let app = api_router(default_ctx(), None);
        let response = app
            .oneshot(post_json("/api/predict-heart", &heart_body("ASY")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["prediction"], 1);
        assert_eq!(json["probability"], 0.91);
        assert_eq!(json["label"], "Heart Disease");
        assert_eq!(json["risk"], "High Heart Disease Risk");
        assert_eq!(json["explanation"], "Mock narrative");

        let top = json["top_contributors"].as_array().unwrap();
        assert_eq!(top.len(), 5);
        assert_eq!(top[0]["feature"], "ChestPainType_ASY");
        assert_eq!(top[0]["impact"], "increased");
        assert_eq!(top[1]["feature"], "Age");
        assert_eq!(top[1]["impact"], "reduced");
        assert_eq!(top[1]["shap"], -0.5);
        // Zero-score padding keeps index order and counts as reduced.
        assert_eq!(top[3]["feature"], "Sex_F");
        assert_eq!(top[3]["impact"], "reduced");
        assert!(top[0].get("direction").is_none());
    }

    #[tokio::test]
    async fn diabetes_negative_has_empty_contributors_and_fallback() {
        let app = api_router(default_ctx(), None);
        let response = app
            .oneshot(post_json("/api/predict-diabetes", DIABETES_BODY))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["prediction"], 0);
        assert_eq!(json["label"], "No");
        assert_eq!(json["risk"], "Low Diabetes Risk");
        assert!(json["top_contributors"].as_array().unwrap().is_empty());
        assert_eq!(json["explanation"], "No report generated.");
    }

    #[tokio::test]
    async fn unknown_chest_pain_matches_nap() {
        let ctx = ApiContext::new(
            RiskPipeline::new(
                Arc::new(shipped_bundle(Domain::Diabetes)),
                Arc::new(MockNarrator::failing()),
            ),
            RiskPipeline::new(
                Arc::new(shipped_bundle(Domain::Heart)),
                Arc::new(MockNarrator::failing()),
            ),
            false,
        );

        let unknown = api_router(ctx.clone(), None)
            .oneshot(post_json("/api/predict-heart", &heart_body("XYZ")))
            .await
            .unwrap();
        let nap = api_router(ctx, None)
            .oneshot(post_json("/api/predict-heart", &heart_body("NAP")))
            .await
            .unwrap();

        assert_eq!(unknown.status(), StatusCode::OK);
        assert_eq!(body_json(unknown).await, body_json(nap).await);
    }

    #[tokio::test]
    async fn out_of_range_field_returns_400() {
        let app = api_router(default_ctx(), None);
        let body = DIABETES_BODY.replace("\"bmi\": 31.5", "\"bmi\": 5.0");
        let response = app
            .oneshot(post_json("/api/predict-diabetes", &body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "VALIDATION_FAILED");
        assert!(json["error"]["details"][0].as_str().unwrap().contains("bmi"));
    }

    #[tokio::test]
    async fn unknown_sex_returns_structured_400() {
        let app = api_router(default_ctx(), None);
        let body = DIABETES_BODY.replace("\"Male\"", "\"Other\"");
        let response = app
            .oneshot(post_json("/api/predict-diabetes", &body))
            .await
            .unwrap();

        assert!(response.status().is_client_error());
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn sex_spelling_is_per_domain() {
        let diabetes = DIABETES_BODY.replace("\"Male\"", "\"M\"");
        let response = api_router(default_ctx(), None)
            .oneshot(post_json("/api/predict-diabetes", &diabetes))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let heart = heart_body("ASY").replace("\"M\"", "\"Male\"");
        let response = api_router(default_ctx(), None)
            .oneshot(post_json("/api/predict-heart", &heart))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn request_ids_are_fresh_uuids() {
        let mut ids = Vec::new();
        for _ in 0..2 {
            let req = Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .unwrap();
            let response = api_router(default_ctx(), None).oneshot(req).await.unwrap();
            let id = response.headers()["X-Request-Id"].to_str().unwrap().to_string();
            assert!(uuid::Uuid::parse_str(&id).is_ok());
            ids.push(id);
        }
        assert_ne!(ids[0], ids[1]);
    }

    #[tokio::test]
    async fn malformed_json_returns_400() {
        let app = api_router(default_ctx(), None);
        let response = app
            .oneshot(post_json("/api/predict-heart", "{not json"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn invalid_prediction_returns_500() {
        let ctx = ctx_with(
            MockModel::new(1, 1.7, 14),
            MockModel::new(0, 0.1, 17),
            Arc::new(MockNarrator::new("unused")),
        );
        let response = api_router(ctx, None)
            .oneshot(post_json("/api/predict-diabetes", DIABETES_BODY))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "INTERNAL");
    }

    #[tokio::test]
    async fn cors_allows_configured_origin() {
        let cors = cors_layer("http://localhost:3000/").unwrap();
        let app = api_router(default_ctx(), Some(cors));
        let req = Request::builder()
            .method("OPTIONS")
            .uri("/api/predict-heart")
            .header("Origin", "http://localhost:3000")
            .header("Access-Control-Request-Method", "POST")
            .header("Access-Control-Request-Headers", "content-type")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(req).await.unwrap();

        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "http://localhost:3000"
        );
        assert_eq!(
            response.headers().get("access-control-allow-credentials").unwrap(),
            "true"
        );
    }

    #[test]
    fn cors_rejects_invalid_origin() {
        assert!(cors_layer("http://bad\norigin").is_err());
    }
}
