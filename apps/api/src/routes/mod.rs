pub mod health;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::state::AppState;
use crate::sticker::handlers;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/fiscal-years", get(handlers::handle_fiscal_years))
        .route("/api/v1/stickers", post(handlers::handle_generate))
        .route("/api/v1/stickers/preview", post(handlers::handle_preview))
        .route(
            "/api/v1/stickers/jobs/:id",
            get(handlers::handle_job_status),
        )
        .route("/api/v1/stickers/output", delete(handlers::handle_purge))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};
    use std::time::Duration;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::config::{Config, HostSettings};
    use crate::sticker::jobs::JobRegistry;

    fn test_state(output_dir: &Path) -> AppState {
        AppState {
            config: Config {
                port: 0,
                rust_log: "info".to_string(),
                output_dir: output_dir.to_path_buf(),
                settings: HostSettings {
                    default_sticker_path: PathBuf::from("/no/default/sticker.png"),
                    start_from_zero: true,
                    show_product_label: true,
                },
            },
            jobs: JobRegistry::default(),
        }
    }

    fn ups_body(num_sets: u32, units_per_set: u32) -> Value {
        json!({
            "customer_name": "acme",
            "job_number": "107",
            "op_number": "12",
            "fiscal_year_override": "25-26",
            "product": {
                "kind": "ups",
                "kva_rating": 60,
                "num_sets": num_sets,
                "units_per_set": units_per_set
            }
        })
    }

    async fn send(router: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(b) => builder
                .header("content-type", "application/json")
                .body(Body::from(b.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn poll_until_finished(router: Router, job_uri: &str) -> Value {
        for _ in 0..200 {
            let (status, body) = send(router.clone(), "GET", job_uri, None).await;
            assert_eq!(status, StatusCode::OK);
            if body["status"] == "completed" || body["status"] == "failed" {
                return body;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("job at {job_uri} did not finish");
    }

    #[tokio::test]
    async fn test_health() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = send(build_router(test_state(dir.path())), "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_fiscal_years_lists_options() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) =
            send(build_router(test_state(dir.path())), "GET", "/api/v1/fiscal-years", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["options"].as_array().unwrap().len(), 41);
        assert!(body["current"].is_string());
    }

    #[tokio::test]
    async fn test_preview_returns_pages() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = send(
            build_router(test_state(dir.path())),
            "POST",
            "/api/v1/stickers/preview",
            Some(ups_body(1, 3)),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_pages"], 8);
        assert_eq!(body["fiscal_year"], "25-26");
        assert_eq!(body["artifact_name"], "Sticker_ACME_107_12_UPS.json");
        assert_eq!(body["placeholder_pages"], 8);
        assert_eq!(body["pages"][0]["side"], "FRONT");
        assert_eq!(body["pages"][1]["side"], "BACK");
        assert_eq!(
            body["pages"][6]["serial_number"],
            "(SL. NO. : LL/25-26/107-OP12/BYP)"
        );
        // Preview never writes output.
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_preview_names_the_generated_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let router = build_router(test_state(dir.path()));

        let (status, preview) = send(
            router.clone(),
            "POST",
            "/api/v1/stickers/preview",
            Some(ups_body(1, 1)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(router.clone(), "POST", "/api/v1/stickers", Some(ups_body(1, 1))).await;
        assert_eq!(status, StatusCode::ACCEPTED);
        let job_uri = format!("/api/v1/stickers/jobs/{}", body["job_id"].as_str().unwrap());
        let done = poll_until_finished(router, &job_uri).await;
        assert_eq!(done["status"], "completed", "job ended as {done}");

        let output_path = PathBuf::from(done["output_path"].as_str().unwrap());
        let written = output_path.file_name().unwrap().to_str().unwrap();
        assert_eq!(preview["artifact_name"], written);
        assert!(output_path.is_file());
    }

    #[tokio::test]
    async fn test_padded_job_number_is_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let mut body = ups_body(1, 1);
        body["job_number"] = json!(" 107 ");
        let (status, body) = send(
            build_router(test_state(dir.path())),
            "POST",
            "/api/v1/stickers/preview",
            Some(body),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"]["message"].as_str().unwrap().contains("Job number"));
    }

    #[tokio::test]
    async fn test_preview_applies_host_numbering_default() {
        let dir = tempfile::tempdir().unwrap();
        let body = json!({
            "customer_name": "acme",
            "job_number": "107",
            "op_number": "12",
            "product": {
                "kind": "battery_charger",
                "voltage": 110,
                "current": 20,
                "battery_capacity_ah": 300,
                "charger_type": "FCBC",
                "battery_type": "VRLA",
                "num_chargers": 2
            }
        });
        let (status, body) = send(
            build_router(test_state(dir.path())),
            "POST",
            "/api/v1/stickers/preview",
            Some(body),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let first = body["pages"][0]["serial_number"].as_str().unwrap();
        let third = body["pages"][2]["serial_number"].as_str().unwrap();
        assert!(first.ends_with("/BCH)"), "got {first}");
        assert!(third.ends_with("/BCH1)"), "got {third}");
    }

    #[tokio::test]
    async fn test_invalid_order_is_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        for uri in ["/api/v1/stickers/preview", "/api/v1/stickers"] {
            let (status, body) = send(
                build_router(test_state(dir.path())),
                "POST",
                uri,
                Some(ups_body(0, 1)),
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        }
    }

    #[tokio::test]
    async fn test_unknown_job_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let uri = format!("/api/v1/stickers/jobs/{}", Uuid::new_v4());
        let (status, body) = send(build_router(test_state(dir.path())), "GET", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_generate_then_poll_then_purge() {
        let dir = tempfile::tempdir().unwrap();
        let router = build_router(test_state(dir.path()));

        let (status, body) = send(router.clone(), "POST", "/api/v1/stickers", Some(ups_body(1, 1))).await;
        assert_eq!(status, StatusCode::ACCEPTED);
        let job_uri = format!("/api/v1/stickers/jobs/{}", body["job_id"].as_str().unwrap());

        let last = poll_until_finished(router.clone(), &job_uri).await;
        assert_eq!(last["status"], "completed", "job ended as {last}");
        assert_eq!(last["total_pages"], 2);
        assert!(dir.path().join("Sticker_ACME_107_12_UPS.json").is_file());

        let (status, body) = send(router, "DELETE", "/api/v1/stickers/output", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["deleted"], 1);
        assert!(!dir.path().join("Sticker_ACME_107_12_UPS.json").exists());
    }
}
