use crate::app::ReviewApp;
use crate::render::render_page;
use axum::{
    extract::{rejection::FormRejection, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;
use zoomer_annotations::FlushHealth;

pub(crate) struct HttpState {
    pub(crate) app: Arc<ReviewApp>,
    pub(crate) flush_health: watch::Receiver<FlushHealth>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SaveForm {
    #[serde(default)]
    name: String,
    #[serde(default)]
    value: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    project: String,
    files: usize,
    records: usize,
    dirty: bool,
    flush: FlushHealth,
}

pub(crate) fn router(state: Arc<HttpState>) -> Router {
    Router::new()
        .route("/", get(http_index))
        .route("/save", post(http_save))
        .route("/health", get(http_health))
        .with_state(state)
}

async fn http_index(State(state): State<Arc<HttpState>>) -> Html<String> {
    let app = &state.app;
    Html(render_page(
        app.config(),
        &app.root().display().to_string(),
        app.index(),
        app.store(),
    ))
}

async fn http_save(
    State(state): State<Arc<HttpState>>,
    form: Result<Form<SaveForm>, FormRejection>,
) -> Response {
    let Form(form) = match form {
        Ok(form) => form,
        Err(rejection) => {
            log::debug!("Rejected save request: {rejection}");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    if form.name.is_empty() {
        return StatusCode::BAD_REQUEST.into_response();
    }

    match state.app.store().set_encoded(&form.name, &form.value) {
        Ok(key) => {
            log::info!("Changed: {key} = {:?}", form.value);
            StatusCode::OK.into_response()
        }
        Err(err) => {
            log::warn!("Rejected save for '{}': {err}", form.name);
            (StatusCode::BAD_REQUEST, err.to_string()).into_response()
        }
    }
}

async fn http_health(State(state): State<Arc<HttpState>>) -> Json<HealthResponse> {
    let app = &state.app;
    let flush = state.flush_health.borrow().clone();
    Json(HealthResponse {
        status: "ok",
        project: app.config().project_name.clone(),
        files: app.index().len(),
        records: app.store().len(),
        dirty: app.store().is_dirty(),
        flush,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    async fn spawn_server() -> (TempDir, Arc<ReviewApp>, String) {
        let temp = tempfile::tempdir().unwrap();
        fs::write(
            temp.path().join("main.go"),
            "package main\n\nfunc main() {\n\tprintln(\"<hi>\")\n}\n",
        )
        .unwrap();

        let app = Arc::new(ReviewApp::open(temp.path()).await.unwrap());
        let (_health_tx, health_rx) = watch::channel(FlushHealth::default());
        let state = Arc::new(HttpState {
            app: app.clone(),
            flush_health: health_rx,
        });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(state)).await.unwrap();
        });

        (temp, app, format!("http://{addr}"))
    }

    #[tokio::test]
    async fn index_page_lists_files_and_escapes_code() {
        let (_temp, _app, base) = spawn_server().await;
        let body = reqwest::get(format!("{base}/"))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();

        assert!(body.contains("<h4>main.go</h4>"));
        assert!(body.contains("println(&quot;&lt;hi&gt;&quot;)"));
        assert!(body.contains(r#"name="main.go&lt;&gt;func main() {&lt;&gt;Checked""#));
    }

    #[tokio::test]
    async fn save_updates_store_and_page() {
        let (_temp, app, base) = spawn_server().await;
        let client = reqwest::Client::new();

        let res = client
            .post(format!("{base}/save"))
            .form(&[("name", "main.go<>func main() {<>Checked"), ("value", "1")])
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), reqwest::StatusCode::OK);
        assert_eq!(app.store().get("main.go", "func main() {", "Checked"), "1");
        assert!(app.store().is_dirty());

        let body = client
            .get(format!("{base}/"))
            .send()
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert!(body.contains(r#"value="1" checked onchange"#));
    }

    #[tokio::test]
    async fn save_rejects_empty_and_malformed_names() {
        let (_temp, app, base) = spawn_server().await;
        let client = reqwest::Client::new();

        for name in ["", "main.go<>Checked", "a<>b<>c<>d"] {
            let res = client
                .post(format!("{base}/save"))
                .form(&[("name", name), ("value", "x")])
                .send()
                .await
                .unwrap();
            assert_eq!(res.status(), reqwest::StatusCode::BAD_REQUEST, "name {name:?}");
        }

        let res = client
            .post(format!("{base}/save"))
            .body("not a form")
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), reqwest::StatusCode::BAD_REQUEST);

        assert!(app.store().is_empty());
        assert!(!app.store().is_dirty());
    }

    #[tokio::test]
    async fn health_reports_counts() {
        let (_temp, app, base) = spawn_server().await;
        app.store()
            .set("main.go", "func main() {", "Checked", "0")
            .unwrap();

        let health: serde_json::Value = reqwest::get(format!("{base}/health"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(health["status"], "ok");
        assert_eq!(health["files"], 1);
        assert_eq!(health["records"], 1);
        assert_eq!(health["dirty"], true);
        assert_eq!(health["flush"]["consecutive_failures"], 0);
    }
}
