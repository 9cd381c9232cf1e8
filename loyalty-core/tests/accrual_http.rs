//! HttpAccrualClient against a local stand-in accrual service.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use axum::extract::Path;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use rust_decimal::Decimal;

use loyalty_core::accrual::{AccrualClient, AccrualReply, AccrualStatus, HttpAccrualClient};

async fn spawn_mock(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

fn accrual_route(response: impl Fn(String) -> Response + Clone + Send + Sync + 'static) -> Router {
    Router::new().route(
        "/api/orders/{number}",
        get(move |Path(number): Path<String>| {
            let response = response.clone();
            async move { response(number) }
        }),
    )
}

#[tokio::test]
async fn decodes_processed_body() {
    let base = spawn_mock(accrual_route(|number| {
        axum::Json(serde_json::json!({
            "order": number,
            "status": "PROCESSED",
            "accrual": 42.5,
        }))
        .into_response()
    }))
    .await;

    let client = HttpAccrualClient::new(base).unwrap();
    let reply = client.fetch("79927398713").await.unwrap();
    assert_eq!(
        reply,
        AccrualReply::Ok {
            status: AccrualStatus::Processed,
            accrual: Decimal::new(425, 1),
        }
    );
}

#[tokio::test]
async fn missing_accrual_defaults_to_zero() {
    let base = spawn_mock(accrual_route(|number| {
        axum::Json(serde_json::json!({
            "order": number,
            "status": "REGISTERED",
        }))
        .into_response()
    }))
    .await;

    let client = HttpAccrualClient::new(base).unwrap();
    let reply = client.fetch("79927398713").await.unwrap();
    assert_eq!(
        reply,
        AccrualReply::Ok {
            status: AccrualStatus::Registered,
            accrual: Decimal::ZERO,
        }
    );
}

#[tokio::test]
async fn no_content_is_not_found() {
    let base = spawn_mock(accrual_route(|_| StatusCode::NO_CONTENT.into_response())).await;

    let client = HttpAccrualClient::new(base).unwrap();
    assert_eq!(
        client.fetch("79927398713").await.unwrap(),
        AccrualReply::NotFound
    );
}

#[tokio::test]
async fn retry_after_header_is_parsed() {
    let base = spawn_mock(accrual_route(|_| {
        (
            StatusCode::TOO_MANY_REQUESTS,
            [(header::RETRY_AFTER, "7")],
        )
            .into_response()
    }))
    .await;

    let client = HttpAccrualClient::new(base).unwrap();
    assert_eq!(
        client.fetch("79927398713").await.unwrap(),
        AccrualReply::RateLimited {
            retry_after_secs: 7
        }
    );
}

#[tokio::test]
async fn missing_retry_after_defaults_to_zero() {
    let base =
        spawn_mock(accrual_route(|_| StatusCode::TOO_MANY_REQUESTS.into_response())).await;

    let client = HttpAccrualClient::new(base).unwrap();
    assert_eq!(
        client.fetch("79927398713").await.unwrap(),
        AccrualReply::RateLimited {
            retry_after_secs: 0
        }
    );
}

#[tokio::test]
async fn unexpected_status_is_surfaced() {
    let base = spawn_mock(accrual_route(|_| StatusCode::NOT_FOUND.into_response())).await;

    let client = HttpAccrualClient::new(base).unwrap();
    assert_eq!(
        client.fetch("79927398713").await.unwrap(),
        AccrualReply::Unexpected { code: 404 }
    );
}

#[tokio::test]
async fn server_error_is_retried_until_success() {
    let hits = Arc::new(AtomicU32::new(0));
    let counter = hits.clone();
    let base = spawn_mock(accrual_route(move |number| {
        if counter.fetch_add(1, Ordering::SeqCst) == 0 {
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        } else {
            axum::Json(serde_json::json!({
                "order": number,
                "status": "PROCESSED",
                "accrual": 10,
            }))
            .into_response()
        }
    }))
    .await;

    let client = HttpAccrualClient::new(base).unwrap();
    let reply = client.fetch("79927398713").await.unwrap();
    assert_eq!(
        reply,
        AccrualReply::Ok {
            status: AccrualStatus::Processed,
            accrual: Decimal::new(10, 0),
        }
    );
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}
