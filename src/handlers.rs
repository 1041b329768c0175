use crate::errors::AppError;
use crate::models::SaveAck;
use crate::state::AppState;
use crate::storage::{decode_collection, load_snapshot, write_snapshot};
use crate::ui::{render_index, SCRIPT_JS, STYLE_CSS};
use axum::{
    body::Bytes,
    extract::State,
    http::{header, Method},
    response::{Html, IntoResponse},
    Json,
};
use tracing::{debug, error, info};

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let snapshot = load_snapshot(&state.data_path).await;
    let expenses = decode_collection(&snapshot);
    debug!(count = expenses.len(), "rendering index");
    Html(render_index(&expenses))
}

/// Overwrites the storage file with the request body, unvalidated.
pub async fn save_expenses(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SaveAck>, AppError> {
    if let Err(err) = write_snapshot(&state.data_path, &body).await {
        error!(path = %state.data_path.display(), "failed to write data file: {err}");
        return Err(AppError::internal(
            "Failed to save data. Check server permissions.",
        ));
    }

    info!(bytes = body.len(), "expenses saved");
    Ok(Json(SaveAck::saved()))
}

pub async fn method_not_allowed(method: Method) -> AppError {
    debug!(%method, "rejected request on save endpoint");
    AppError::method_not_allowed()
}

pub async fn style() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], STYLE_CSS)
}

pub async fn script() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/javascript; charset=utf-8")],
        SCRIPT_JS,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::load_collection;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn save_writes_raw_body_and_acknowledges() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("expenses.json");
        let state = AppState::new(path.clone());
        let body = r#"[{"id":"1","description":"Tea","amount":2.5,"category":"Food","date":"2024-02-02"}]"#;

        let Json(ack) = save_expenses(State(state), Bytes::from(body)).await.unwrap();
        assert_eq!(ack, SaveAck::saved());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), body);
        assert_eq!(load_collection(&path).await.len(), 1);
    }

    #[tokio::test]
    async fn save_accepts_any_body() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("expenses.json");
        let state = AppState::new(path.clone());

        let result = save_expenses(State(state), Bytes::from_static(b"not json")).await;
        assert!(result.is_ok());
        assert_eq!(std::fs::read(&path).unwrap(), b"not json");
    }

    #[tokio::test]
    async fn save_reports_server_error_when_unwritable() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::new(dir.path().join("missing-dir").join("expenses.json"));

        let err = save_expenses(State(state), Bytes::from_static(b"[]"))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "Failed to save data. Check server permissions.");
    }

    #[tokio::test]
    async fn non_post_is_rejected() {
        let err = method_not_allowed(Method::GET).await;
        assert_eq!(err.status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(err.message, "Invalid request method.");
    }

    #[tokio::test]
    async fn index_embeds_stored_collection() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("expenses.json");
        std::fs::write(
            &path,
            r#"[{"id":"1","description":"Tea","amount":2.5,"category":"Food","date":"2024-02-02"}]"#,
        )
        .unwrap();

        let Html(html) = index(State(AppState::new(path))).await;
        assert!(html.contains(r#""id":"1""#));
        assert!(html.contains("$2.50"));
    }
}
