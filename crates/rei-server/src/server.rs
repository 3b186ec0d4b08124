//! HTTP surface over the blog read layer.
//!
//! Maps read results to status codes: an empty list is still `200`, a missing
//! post is `404`, a malformed slug is `400` and an internal fault is `500`.
//! Everything outside `/api` is served from the public directory.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::{
    extract::{Path as UrlPath, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower_http::services::ServeDir;

use crate::blog::{is_valid_slug, BlogPost, BlogPostSummary, BlogReader};

/// Configuration for the content server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Directory served for non-API requests
    pub public_dir: PathBuf,

    /// Port to listen on
    pub port: u16,

    /// Host to bind to
    pub host: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            public_dir: PathBuf::from("public"),
            port: 4000,
            host: "127.0.0.1".to_string(),
        }
    }
}

/// Errors that can occur with the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Invalid address {0}: {1}")]
    Address(String, String),

    #[error("Failed to bind to {0}: {1}")]
    BindError(SocketAddr, String),
}

/// Error body returned by the API.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    status_code: u16,
    status_message: &'static str,
}

/// API failures, each with a fixed status.
#[derive(Debug)]
enum ApiError {
    BadSlug,
    NotFound,
    Internal(&'static str),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadSlug => (StatusCode::BAD_REQUEST, "Valid slug parameter is required"),
            Self::NotFound => (StatusCode::NOT_FOUND, "Blog post not found"),
            Self::Internal(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        let body = ErrorBody {
            status_code: status.as_u16(),
            status_message: message,
        };
        (status, Json(body)).into_response()
    }
}

/// Shared server state.
struct ServerState {
    reader: BlogReader,
}

/// Build the router: blog API plus static files from `public_dir`.
pub fn router(reader: BlogReader, public_dir: &Path) -> Router {
    let state = Arc::new(ServerState { reader });

    Router::new()
        .route("/api/blog", get(list_handler))
        .route("/api/blog/{slug}", get(post_handler))
        .fallback_service(ServeDir::new(public_dir))
        .with_state(state)
}

/// Handler for the post list.
async fn list_handler(
    State(state): State<Arc<ServerState>>,
) -> Result<Json<Vec<BlogPostSummary>>, ApiError> {
    let posts = tokio::task::spawn_blocking(move || state.reader.list_summaries())
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch blog posts: {}", e);
            ApiError::Internal("Failed to fetch blog posts")
        })?;

    Ok(Json(posts))
}

/// Handler for a single post.
async fn post_handler(
    State(state): State<Arc<ServerState>>,
    UrlPath(slug): UrlPath<String>,
) -> Result<Json<BlogPost>, ApiError> {
    if !is_valid_slug(&slug) {
        return Err(ApiError::BadSlug);
    }

    let lookup = slug.clone();
    let post = tokio::task::spawn_blocking(move || state.reader.read_one(&lookup))
        .await
        .map_err(|e| {
            tracing::error!("Failed to fetch blog post {:?}: {}", slug, e);
            ApiError::Internal("Failed to fetch blog post")
        })?;

    post.map(Json).ok_or(ApiError::NotFound)
}

/// Content server.
pub struct ContentServer {
    config: ServerConfig,
    reader: BlogReader,
}

impl ContentServer {
    pub fn new(config: ServerConfig, reader: BlogReader) -> Self {
        Self { config, reader }
    }

    /// Bind and serve until the process is stopped.
    pub async fn start(self) -> Result<(), ServerError> {
        let raw = format!("{}:{}", self.config.host, self.config.port);
        let addr: SocketAddr = raw
            .parse()
            .map_err(|e: std::net::AddrParseError| ServerError::Address(raw.clone(), e.to_string()))?;

        let app = router(self.reader, &self.config.public_dir);

        tracing::info!("Serving {} at http://{}", self.config.public_dir.display(), addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::BindError(addr, e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use rei_content::{ContentConfig, TreeSerializer};
    use tempfile::tempdir;
    use tower::ServiceExt;

    fn app_with(files: &[(&str, &str)]) -> (tempfile::TempDir, Router) {
        let temp = tempdir().unwrap();
        for (rel, contents) in files {
            let path = temp.path().join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, contents).unwrap();
        }

        let serializer = TreeSerializer::new(temp.path(), ContentConfig::default());
        serializer.build().unwrap();
        let layout = serializer.layout().unwrap();
        let app = router(BlogReader::from_layout(&layout), &layout.public_root);
        (temp, app)
    }

    async fn fetch(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    const HELLO: &str =
        "---\ntitle: Hello\ndate: 2024-01-05\ndescription: Greeting\ntags: a, b\n---\n# Hi\n";

    #[tokio::test]
    async fn lists_posts() {
        let (_temp, app) = app_with(&[("content/blog/hello.md", HELLO)]);

        let (status, json) = fetch(app, "/api/blog").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json[0]["slug"], "hello");
        assert_eq!(json[0]["to"], "/blog/hello");
        assert_eq!(json[0]["tags"], serde_json::json!(["a", "b"]));
    }

    #[tokio::test]
    async fn empty_list_is_ok() {
        let (_temp, app) = app_with(&[("content/about.md", "About")]);

        let (status, json) = fetch(app, "/api/blog").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, serde_json::json!([]));
    }

    #[tokio::test]
    async fn returns_single_post() {
        let (_temp, app) = app_with(&[("content/blog/hello.md", HELLO)]);

        let (status, json) = fetch(app, "/api/blog/hello").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["title"], "Hello");
        assert_eq!(json["content"], "# Hi\n");
    }

    #[tokio::test]
    async fn missing_post_is_not_found() {
        let (_temp, app) = app_with(&[("content/blog/hello.md", HELLO)]);

        let (status, json) = fetch(app, "/api/blog/nope").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["statusCode"], 404);
    }

    #[tokio::test]
    async fn traversal_slug_is_bad_request() {
        let (_temp, app) = app_with(&[("content/blog/hello.md", HELLO)]);

        let (status, _) = fetch(app, "/api/blog/..%2Fabout").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn serves_artifacts_from_public() {
        let (_temp, app) = app_with(&[("content/blog/hello.md", HELLO)]);

        let (status, json) = fetch(app, "/content/_rei_tree.json").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["treeUrlPath"], "/content/_rei_tree.json");
    }
}
