#![allow(dead_code)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

pub const ARTICLE_HTML: &str = r#"<!doctype html>
<html>
  <head><title>Cats at Home</title></head>
  <body>
    <nav><a href="/">Home</a> <a href="/about">About this example website</a></nav>
    <article>
      <h1>Cats</h1>
      <p>Example article body about cats and how they live with people.</p>
      <p>Cats sleep for most of the day and are active at dusk.</p>
    </article>
    <footer><p>Copyright 2024 Example Corporation, all rights reserved.</p></footer>
  </body>
</html>"#;

pub const ARTICLE_TEXT: &str = "Cats\n\n\
Example article body about cats and how they live with people.\n\n\
Cats sleep for most of the day and are active at dusk.";

/// A page with no paragraph markup: article extraction finds nothing
pub const SHELL_HTML: &str = r#"<html><head><script>render()</script></head>
<body><div id="app"><span>Interactive dashboard for cat owners</span></div></body></html>"#;

pub const EMPTY_HTML: &str = "<html><body><div id=\"app\"></div></body></html>";

/// Requests seen by the fixture server
#[derive(Default)]
pub struct Recorded {
    pub hits: HashMap<String, usize>,
    pub model_calls: usize,
    pub last_api_key: Option<String>,
    pub last_body: Option<serde_json::Value>,
}

struct Fixture {
    model_status: StatusCode,
    model_reply: String,
    recorded: Mutex<Recorded>,
}

/// HTML pages plus a fake `generateContent` endpoint on a loopback port.
pub struct FixtureServer {
    pub base_url: String,
    fixture: Arc<Fixture>,
}

impl FixtureServer {
    /// Start a server whose model endpoint replies with `model_reply`
    pub fn start(model_reply: &str) -> Self {
        Self::start_with(StatusCode::OK, model_reply)
    }

    /// Start a server whose model endpoint always fails
    pub fn start_failing_model() -> Self {
        Self::start_with(StatusCode::INTERNAL_SERVER_ERROR, "")
    }

    fn start_with(model_status: StatusCode, model_reply: &str) -> Self {
        let fixture = Arc::new(Fixture {
            model_status,
            model_reply: model_reply.to_string(),
            recorded: Mutex::new(Recorded::default()),
        });

        let app = Router::new()
            .route("/article", get(article))
            .route("/shell", get(shell))
            .route("/empty", get(empty))
            .route("/flaky", get(flaky))
            .route("/missing", get(missing))
            .route("/stalled", get(stalled))
            .fallback(generate_content)
            .with_state(fixture.clone());

        let (tx, rx) = std::sync::mpsc::channel();
        std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .expect("build fixture runtime");
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("bind fixture server");
                tx.send(listener.local_addr().expect("fixture address"))
                    .expect("send fixture address");
                axum::serve(listener, app).await.expect("serve fixtures");
            });
        });

        let addr = rx.recv().expect("fixture server started");
        Self {
            base_url: format!("http://{}", addr),
            fixture,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn hits(&self, path: &str) -> usize {
        let recorded = self.fixture.recorded.lock().unwrap();
        recorded.hits.get(path).copied().unwrap_or(0)
    }

    pub fn model_calls(&self) -> usize {
        self.fixture.recorded.lock().unwrap().model_calls
    }

    pub fn last_api_key(&self) -> Option<String> {
        self.fixture.recorded.lock().unwrap().last_api_key.clone()
    }

    pub fn last_model_request(&self) -> Option<serde_json::Value> {
        self.fixture.recorded.lock().unwrap().last_body.clone()
    }
}

fn record_hit(fixture: &Fixture, path: &str) -> usize {
    let mut recorded = fixture.recorded.lock().unwrap();
    let hits = recorded.hits.entry(path.to_string()).or_insert(0);
    *hits += 1;
    *hits
}

async fn article(State(fixture): State<Arc<Fixture>>) -> Html<&'static str> {
    record_hit(&fixture, "/article");
    Html(ARTICLE_HTML)
}

async fn shell(State(fixture): State<Arc<Fixture>>) -> Html<&'static str> {
    record_hit(&fixture, "/shell");
    Html(SHELL_HTML)
}

async fn empty(State(fixture): State<Arc<Fixture>>) -> Html<&'static str> {
    record_hit(&fixture, "/empty");
    Html(EMPTY_HTML)
}

/// Fails twice, then serves the article
async fn flaky(State(fixture): State<Arc<Fixture>>) -> Response {
    if record_hit(&fixture, "/flaky") <= 2 {
        StatusCode::SERVICE_UNAVAILABLE.into_response()
    } else {
        Html(ARTICLE_HTML).into_response()
    }
}

async fn missing(State(fixture): State<Arc<Fixture>>) -> StatusCode {
    record_hit(&fixture, "/missing");
    StatusCode::NOT_FOUND
}

/// Never answers within any test's timeout
async fn stalled(State(fixture): State<Arc<Fixture>>) -> Html<&'static str> {
    record_hit(&fixture, "/stalled");
    tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
    Html(ARTICLE_HTML)
}

async fn generate_content(
    State(fixture): State<Arc<Fixture>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if method != Method::POST || !uri.path().ends_with(":generateContent") {
        return StatusCode::NOT_FOUND.into_response();
    }

    {
        let mut recorded = fixture.recorded.lock().unwrap();
        recorded.model_calls += 1;
        recorded.last_api_key = headers
            .get("x-goog-api-key")
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        recorded.last_body = serde_json::from_slice(&body).ok();
    }

    if fixture.model_status != StatusCode::OK {
        return (fixture.model_status, "model unavailable").into_response();
    }

    Json(serde_json::json!({
        "candidates": [{
            "content": { "parts": [{ "text": fixture.model_reply }], "role": "model" },
            "finishReason": "STOP"
        }]
    }))
    .into_response()
}

/// Isolated home directory and config file for driving the binary
pub struct TestEnv {
    _tmp: TempDir,
    pub home: PathBuf,
    pub config: PathBuf,
}

impl TestEnv {
    pub fn new(server: &FixtureServer) -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let home = tmp.path().join("home");
        fs::create_dir_all(&home).expect("create isolated home");

        let config = tmp.path().join("pagegist.toml");
        fs::write(
            &config,
            format!(
                "[agent]\nendpoint = \"{}\"\nmodel = \"gemini-test\"\n\n\
                 [retrieval]\nmax_retries = 2\ntimeout_secs = 5\n",
                server.base_url
            ),
        )
        .expect("write config");

        Self {
            _tmp: tmp,
            home,
            config,
        }
    }

    /// The binary with an API key and the fixture config
    pub fn cmd(&self) -> Command {
        let mut cmd = self.cmd_without_key();
        cmd.env("GEMINI_API_KEY", "test-key");
        cmd
    }

    pub fn cmd_without_key(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("pagegist");
        cmd.current_dir(&self.home)
            .env("HOME", &self.home)
            .env_remove("GEMINI_API_KEY")
            .env_remove("GOOGLE_API_KEY")
            .arg("--config")
            .arg(&self.config);
        cmd
    }

    pub fn run_json(&self, args: &[&str]) -> serde_json::Value {
        let out = self
            .cmd()
            .args(args)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&out).expect("valid json output")
    }
}
