use axum::{
    extract::{
        rejection::{FormRejection, JsonRejection},
        FromRequest,
    },
    Form, Json,
};
use serde::{Deserialize, Deserializer};

use crate::error::AppError;

/// `Json<T>` whose rejections render as [`AppError::Validation`].
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// `Form<T>` whose rejections render as [`AppError::Validation`].
#[derive(Debug, FromRequest)]
#[from_request(via(Form), rejection(AppError))]
pub struct ApiForm<T>(pub T);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::validation("body", rejection.body_text())
    }
}

impl From<FormRejection> for AppError {
    fn from(rejection: FormRejection) -> Self {
        AppError::validation("body", rejection.body_text())
    }
}

/// Turns a present field into `Some`, so that with `#[serde(default)]` an absent
/// field stays `None` while an explicit `null` becomes `Some(None)`.
pub fn present<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(d).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        response::IntoResponse,
    };
    use serde_json::Value;

    #[derive(Debug, Deserialize)]
    struct Payload {
        name: String,
    }

    async fn detail_of(err: AppError) -> (StatusCode, Value) {
        let res = err.into_response();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn broken_json_becomes_validation_error() {
        for (content_type, body) in [
            ("application/json", "{not json"),
            ("application/json", r#"{"other": 1}"#),
            ("text/plain", r#"{"name": "x"}"#),
        ] {
            let req = Request::builder()
                .method("POST")
                .header(header::CONTENT_TYPE, content_type)
                .body(Body::from(body))
                .unwrap();
            let err = ApiJson::<Payload>::from_request(req, &()).await.unwrap_err();
            let (status, json) = detail_of(err).await;
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{body}");
            assert_eq!(json["field"], "body");
            assert!(json["detail"].is_string());
        }
    }

    #[tokio::test]
    async fn missing_form_field_becomes_validation_error() {
        let req = Request::builder()
            .method("POST")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("other=1"))
            .unwrap();
        let err = ApiForm::<Payload>::from_request(req, &()).await.unwrap_err();
        let (status, json) = detail_of(err).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["field"], "body");
    }

    #[tokio::test]
    async fn well_formed_json_passes_through() {
        let req = Request::builder()
            .method("POST")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"name": "x"}"#))
            .unwrap();
        let ApiJson(payload) = ApiJson::<Payload>::from_request(req, &()).await.unwrap();
        assert_eq!(payload.name, "x");
    }
}
