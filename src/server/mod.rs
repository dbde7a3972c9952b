//! Development server with live reload

use anyhow::Result;
use axum::{
    body::Body,
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    http::{Request, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode};
use percent_encoding::percent_decode_str;
use std::io::ErrorKind;
use std::net::SocketAddr;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::commands::generate::is_relevant_change;
use crate::Site;

/// Live reload script injected into HTML pages
const LIVE_RELOAD_SCRIPT: &str = r#"<script>
(function() {
    var ws = new WebSocket('ws://' + location.host + '/__livereload');
    ws.onmessage = function(msg) {
        if (msg.data === 'reload') {
            location.reload();
        }
    };
    ws.onclose = function() {
        console.log('Live reload disconnected. Attempting to reconnect...');
        setTimeout(function() { location.reload(); }, 1000);
    };
})();
</script>
"#;

/// How to run the server
#[derive(Debug, Clone)]
pub struct ServeOptions {
    pub ip: String,
    pub port: u16,
    /// Directory to serve; the site's output directory when `None`
    pub root: Option<PathBuf>,
    /// Rebuild on changes and push reloads to open pages
    pub watch: bool,
}

/// Server state
struct ServerState {
    root: PathBuf,
    reload_tx: broadcast::Sender<()>,
    live_reload: bool,
}

/// Start the development server
pub async fn start(site: &Site, options: ServeOptions) -> Result<()> {
    let (reload_tx, _) = broadcast::channel::<()>(16);

    let root = options.root.clone().unwrap_or_else(|| site.output_dir.clone());
    let state = Arc::new(ServerState {
        root,
        reload_tx: reload_tx.clone(),
        live_reload: options.watch,
    });

    let app = Router::new()
        .route("/__livereload", get(livereload_handler))
        .fallback(serve_file)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Parse address - handle "localhost" specially
    let bind_ip = if options.ip == "localhost" {
        "127.0.0.1"
    } else {
        options.ip.as_str()
    };
    let addr: SocketAddr = format!("{}:{}", bind_ip, options.port).parse()?;

    println!("Server running at http://{}:{}", options.ip, options.port);
    if options.watch {
        println!("Live reload enabled. Watching for changes...");
    }
    println!("Press Ctrl+C to stop.");

    if options.watch {
        let site = site.clone();
        tokio::task::spawn_blocking(move || {
            if let Err(e) = watch_and_reload(&site, reload_tx) {
                tracing::error!("File watcher error: {:#}", e);
            }
        });
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Rebuild on input changes and notify connected pages
fn watch_and_reload(site: &Site, reload_tx: broadcast::Sender<()>) -> Result<()> {
    let (tx, rx) = std::sync::mpsc::channel();
    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;

    for dir in [&site.public_dir, &site.src_dir] {
        if dir.exists() {
            debouncer.watcher().watch(dir, RecursiveMode::Recursive)?;
            tracing::debug!("Watching: {:?}", dir);
        }
    }

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let changed: Vec<_> = events
                    .iter()
                    .filter(|e| is_relevant_change(site, &e.path))
                    .collect();
                if changed.is_empty() {
                    continue;
                }
                for event in &changed {
                    tracing::info!("File changed: {}", event.path.display());
                }

                match site.build() {
                    Ok(report) => {
                        tracing::info!("Rebuilt {} files", report.files);
                        let _ = reload_tx.send(());
                    }
                    Err(e) => tracing::error!("Build failed: {:#}", e),
                }
            }
            Ok(Err(e)) => tracing::error!("Watch error: {:?}", e),
            Err(e) => {
                tracing::error!("Channel error: {:?}", e);
                break;
            }
        }
    }

    Ok(())
}

/// WebSocket handler for live reload
async fn livereload_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState>>,
) -> impl IntoResponse {
    let reload_rx = state.reload_tx.subscribe();
    ws.on_upgrade(move |socket| handle_livereload_socket(socket, reload_rx))
}

async fn handle_livereload_socket(mut socket: WebSocket, mut reload_rx: broadcast::Receiver<()>) {
    tracing::debug!("Live reload client connected");

    loop {
        tokio::select! {
            result = reload_rx.recv() => {
                match result {
                    Ok(_) => {
                        if socket.send(Message::Text("reload".to_string())).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
        }
    }

    tracing::debug!("Live reload client disconnected");
}

/// Serve a file from the root directory.
///
/// HTML is read directly when the live reload script must be injected;
/// everything else goes through `ServeDir` with the request rewritten to
/// the resolved file.
async fn serve_file(State(state): State<Arc<ServerState>>, mut request: Request<Body>) -> Response {
    tracing::info!("[{}] {}", request.method(), request.uri().path());

    let Some(rewritten) = rewrite_path(request.uri().path()) else {
        return (StatusCode::NOT_FOUND, "Not found").into_response();
    };

    if state.live_reload {
        if let Some(file_path) = resolve_path(&state.root, &rewritten) {
            if is_html(&file_path) {
                return match tokio::fs::read_to_string(&file_path).await {
                    Ok(content) => Html(inject_live_reload(&content)).into_response(),
                    Err(e) if e.kind() == ErrorKind::NotFound => {
                        (StatusCode::NOT_FOUND, "Not found").into_response()
                    }
                    Err(e) => {
                        tracing::error!("Failed to read {:?}: {}", file_path, e);
                        (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
                    }
                };
            }
        }
    }

    let target = match request.uri().query() {
        Some(query) => format!("{}?{}", rewritten, query),
        None => rewritten,
    };
    match target.parse::<Uri>() {
        Ok(uri) => *request.uri_mut() = uri,
        Err(_) => return (StatusCode::BAD_REQUEST, "Bad request").into_response(),
    }

    let mut service = ServeDir::new(&state.root);
    match service.try_call(request).await {
        Ok(response) => response.into_response(),
        Err(e) => {
            tracing::error!("Failed to serve file: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
        }
    }
}

/// Rewrite a request path to the file it names.
///
/// `/` and paths ending in `/` get `index.html`; paths without an
/// extension get `.html` appended. Paths that decode to anything outside
/// the served root are rejected.
pub fn rewrite_path(request_path: &str) -> Option<String> {
    let decoded = percent_decode_str(request_path).decode_utf8().ok()?;
    let relative = decoded.trim_start_matches('/');

    let inside = Path::new(relative)
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    if !inside {
        return None;
    }

    let mut path = request_path.to_string();
    if !path.starts_with('/') {
        path.insert(0, '/');
    }
    if relative.is_empty() || relative.ends_with('/') {
        path.push_str("index.html");
    } else if Path::new(relative).extension().is_none() {
        path.push_str(".html");
    }
    Some(path)
}

/// Map a request path to a file under `root`, following [`rewrite_path`]
pub fn resolve_path(root: &Path, request_path: &str) -> Option<PathBuf> {
    let rewritten = rewrite_path(request_path)?;
    let decoded = percent_decode_str(&rewritten).decode_utf8().ok()?;
    Some(root.join(decoded.trim_start_matches('/')))
}

fn is_html(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"))
}

/// Insert the live reload script before `</body>`, or append it
fn inject_live_reload(html: &str) -> String {
    match html.rfind("</body>") {
        Some(pos) => format!("{}{}{}", &html[..pos], LIVE_RELOAD_SCRIPT, &html[pos..]),
        None => format!("{}{}", html, LIVE_RELOAD_SCRIPT),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_rewrite_path() {
        assert_eq!(rewrite_path("/").as_deref(), Some("/index.html"));
        assert_eq!(rewrite_path("").as_deref(), Some("/index.html"));
        assert_eq!(rewrite_path("/hello").as_deref(), Some("/hello.html"));
        assert_eq!(rewrite_path("/hello.html").as_deref(), Some("/hello.html"));
        assert_eq!(rewrite_path("/docs/").as_deref(), Some("/docs/index.html"));
        assert_eq!(rewrite_path("/caf%C3%A9").as_deref(), Some("/caf%C3%A9.html"));
    }

    #[test]
    fn test_resolve_path() {
        let root = Path::new("/srv/build");
        assert_eq!(resolve_path(root, "/"), Some(root.join("index.html")));
        assert_eq!(resolve_path(root, "/hello"), Some(root.join("hello.html")));
        assert_eq!(resolve_path(root, "/img/logo.svg"), Some(root.join("img/logo.svg")));
        assert_eq!(resolve_path(root, "/docs/"), Some(root.join("docs/index.html")));
        assert_eq!(resolve_path(root, "/caf%C3%A9"), Some(root.join("café.html")));
    }

    #[test]
    fn test_resolve_path_rejects_traversal() {
        let root = Path::new("/srv/build");
        assert_eq!(resolve_path(root, "/../secret"), None);
        assert_eq!(rewrite_path("/img/%2e%2e/%2e%2e/etc/passwd"), None);
    }

    #[test]
    fn test_inject_live_reload() {
        let html = inject_live_reload("<html><body><p>x</p></body></html>");
        assert!(html.contains("/__livereload"));
        assert!(html.ends_with("</script>\n</body></html>"));

        let bare = inject_live_reload("<p>x</p>");
        assert!(bare.starts_with("<p>x</p><script>"));
    }

    fn state(root: &Path, live_reload: bool) -> Arc<ServerState> {
        let (reload_tx, _) = broadcast::channel(1);
        Arc::new(ServerState {
            root: root.to_path_buf(),
            reload_tx,
            live_reload,
        })
    }

    async fn fetch(state: Arc<ServerState>, path: &str) -> (StatusCode, String, String) {
        let request = Request::builder().uri(path).body(Body::empty()).unwrap();
        let response = serve_file(State(state), request).await;
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, content_type, String::from_utf8_lossy(&body).into_owned())
    }

    #[tokio::test]
    async fn test_serve_file_through_serve_dir() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("index.html"), "<body>home</body>").unwrap();
        fs::write(dir.path().join("hello.html"), "<body>hi</body>").unwrap();
        fs::write(dir.path().join("index.css"), "body{}").unwrap();

        let (status, content_type, body) = fetch(state(dir.path(), false), "/hello?x=1").await;
        assert_eq!(status, StatusCode::OK);
        assert!(content_type.starts_with("text/html"));
        assert_eq!(body, "<body>hi</body>");

        let (_, content_type, _) = fetch(state(dir.path(), false), "/index.css").await;
        assert!(content_type.starts_with("text/css"));

        let (status, _, body) = fetch(state(dir.path(), false), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "<body>home</body>");

        let (status, _, _) = fetch(state(dir.path(), false), "/missing").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_serve_file_injects_live_reload_into_html_only() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("hello.html"), "<body>hi</body>").unwrap();
        fs::write(dir.path().join("index.js"), "const x = 1;").unwrap();

        let (status, content_type, body) = fetch(state(dir.path(), true), "/hello").await;
        assert_eq!(status, StatusCode::OK);
        assert!(content_type.starts_with("text/html"));
        assert!(body.contains("/__livereload"));

        let (_, _, body) = fetch(state(dir.path(), true), "/index.js").await;
        assert_eq!(body, "const x = 1;");

        let (status, _, _) = fetch(state(dir.path(), true), "/gone").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
