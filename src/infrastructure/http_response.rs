// HTTP response utilities for JSON bodies with optional Brotli encoding
use crate::domain::error::DashboardError;
use async_compression::tokio::bufread::BrotliEncoder;
use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderValue, Response, StatusCode},
    response::IntoResponse,
};
use serde::Serialize;
use serde_json::json;
use tokio::io::AsyncReadExt;

/// True if the client advertised Brotli support
pub fn accepts_brotli(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT_ENCODING)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.split(',').any(|enc| enc.trim().starts_with("br")))
        .unwrap_or(false)
}

/// Serialize `data` as JSON, compressing with Brotli when asked
pub async fn json_response<T: Serialize>(
    data: &T,
    compress: bool,
) -> Result<Response<Body>, StatusCode> {
    json_response_with_status(StatusCode::OK, data, compress).await
}

pub async fn json_response_with_status<T: Serialize>(
    status: StatusCode,
    data: &T,
    compress: bool,
) -> Result<Response<Body>, StatusCode> {
    let json_bytes = serde_json::to_vec(data).map_err(|e| {
        tracing::error!("JSON serialization error: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    let (body_bytes, content_encoding) = if compress {
        let original_len = json_bytes.len();
        let cursor = std::io::Cursor::new(&json_bytes);
        let mut encoder = BrotliEncoder::new(cursor);
        let mut compressed = Vec::new();
        encoder.read_to_end(&mut compressed).await.map_err(|e| {
            tracing::error!("Brotli compression error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;
        tracing::debug!("Compressed {} → {} bytes", original_len, compressed.len());
        (compressed, Some("br"))
    } else {
        (json_bytes, None)
    };

    let mut response_builder = Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::CONTENT_LENGTH, HeaderValue::from(body_bytes.len()));

    if let Some(encoding) = content_encoding {
        response_builder = response_builder
            .header(header::CONTENT_ENCODING, encoding)
            .header(header::VARY, "accept-encoding");
    }

    response_builder.body(Body::from(body_bytes)).map_err(|e| {
        tracing::error!("Response build error: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

pub fn status_for(err: &DashboardError) -> StatusCode {
    match err {
        DashboardError::NotFound(_) | DashboardError::UnknownRole(_) => StatusCode::NOT_FOUND,
        DashboardError::Io { .. }
        | DashboardError::Parse { .. }
        | DashboardError::Schema { .. }
        | DashboardError::MissingData { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Error body: `{"error": kind, "message": text}`, never compressed
pub async fn error_response(err: &DashboardError) -> Response<Body> {
    let body = json!({
        "error": err.kind(),
        "message": err.to_string(),
    });
    match json_response_with_status(status_for(err), &body, false).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dataset::DatasetName;
    use crate::domain::role::Role;

    #[test]
    fn test_accepts_brotli() {
        let mut headers = HeaderMap::new();
        assert!(!accepts_brotli(&headers));

        headers.insert(header::ACCEPT_ENCODING, HeaderValue::from_static("gzip, br;q=0.9"));
        assert!(accepts_brotli(&headers));

        headers.insert(header::ACCEPT_ENCODING, HeaderValue::from_static("gzip, deflate"));
        assert!(!accepts_brotli(&headers));
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(&DashboardError::NotFound("payroll".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(&DashboardError::missing_data(Role::Ceo, "total_revenue", "absent")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        let io = DashboardError::Io {
            dataset: DatasetName::Sales,
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert_eq!(status_for(&io), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_json_response_plain_and_compressed() {
        let data = json!({"kpis": [1, 2, 3]});

        let plain = json_response(&data, false).await.unwrap();
        assert_eq!(plain.status(), StatusCode::OK);
        assert!(plain.headers().get(header::CONTENT_ENCODING).is_none());
        let bytes = axum::body::to_bytes(plain.into_body(), usize::MAX).await.unwrap();
        assert_eq!(serde_json::from_slice::<serde_json::Value>(&bytes).unwrap(), data);

        let compressed = json_response(&data, true).await.unwrap();
        assert_eq!(
            compressed.headers().get(header::CONTENT_ENCODING).unwrap(),
            "br"
        );
    }

    #[tokio::test]
    async fn test_error_response_body() {
        let response = error_response(&DashboardError::NotFound("payroll".to_string())).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "not_found");
        assert_eq!(body["message"], "unknown dataset: payroll");
    }
}
