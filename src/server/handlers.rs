use std::path::{
    Component,
    Path as FsPath,
    PathBuf,
};

use axum::{
    body::Body,
    extract::{
        Path,
        State,
    },
    http::{
        header::{
            self,
            HeaderValue,
        },
        Method,
        Request,
        StatusCode,
    },
    middleware::Next,
    response::{
        IntoResponse,
        Response,
    },
    Json,
};
use serde_json::json;
use tracing::{
    debug,
    error,
};

use super::ServerState;
use crate::catalog::{
    builder::VOCABULARY_EXTENSION,
    index::INDEX_FILE,
    CatalogBuilder,
    FolderListing,
};

pub(crate) async fn tree_handler(State(state): State<ServerState>) -> Response {
    let root = state.root().to_path_buf();
    let scanned = tokio::task::spawn_blocking(move || CatalogBuilder::scan(&root)).await;

    match scanned {
        Ok(Ok(folder)) => Json(FolderListing::from_folder(&folder)).into_response(),
        Ok(Err(e)) => {
            error!(root = %state.root().display(), error = %e, "vocabulary scan failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
        }
        Err(e) => {
            error!(error = %e, "vocabulary scan task failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to read vocabulary directory")
        }
    }
}

pub(crate) async fn file_handler(
    State(state): State<ServerState>,
    Path(relative): Path<String>,
) -> Response {
    let Some(path) = resolve_request_path(state.root(), &relative) else {
        debug!(path = %relative, "rejected vocabulary path");
        return not_found();
    };

    match tokio::fs::read_to_string(&path).await {
        Ok(content) => {
            let content_type = if relative.ends_with(INDEX_FILE) {
                "application/json"
            } else {
                "text/plain; charset=utf-8"
            };
            ([(header::CONTENT_TYPE, content_type)], content).into_response()
        }
        Err(e) => {
            debug!(path = %path.display(), error = %e, "vocabulary file not readable");
            not_found()
        }
    }
}

/// Maps a request path onto a file under `root`. Only plain relative paths to
/// `.txt` files or `index.json` are served; hidden entries are not.
pub(crate) fn resolve_request_path(root: &FsPath, relative: &str) -> Option<PathBuf> {
    if relative.is_empty() || relative.contains('\\') {
        return None;
    }

    let relative_path = FsPath::new(relative);
    let mut resolved = root.to_path_buf();
    for component in relative_path.components() {
        match component {
            Component::Normal(part) => {
                let part = part.to_str()?;
                if part.starts_with('.') {
                    return None;
                }
                resolved.push(part);
            }
            _ => return None,
        }
    }

    let file_name = relative_path.file_name()?.to_str()?;
    let served = file_name == INDEX_FILE
        || relative_path.extension().and_then(|e| e.to_str()) == Some(VOCABULARY_EXTENSION);
    served.then_some(resolved)
}

/// Every response may be read from any origin; preflights are answered here.
pub(crate) async fn cors_middleware(req: Request<Body>, next: Next) -> Response {
    if req.method() == Method::OPTIONS {
        let mut resp = StatusCode::NO_CONTENT.into_response();
        let headers = resp.headers_mut();
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
        headers.insert(header::ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static("GET,OPTIONS"));
        headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("content-type"));
        return resp;
    }

    let mut resp = next.run(req).await;
    resp.headers_mut().insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    resp
}

fn not_found() -> Response {
    error_response(StatusCode::NOT_FOUND, "File not found")
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_request_path() {
        let root = FsPath::new("/srv/vocabulary");

        assert_eq!(
            resolve_request_path(root, "Aliyah Vocab/Week 1/kata.txt"),
            Some(PathBuf::from("/srv/vocabulary/Aliyah Vocab/Week 1/kata.txt"))
        );
        assert_eq!(
            resolve_request_path(root, "week01/index.json"),
            Some(PathBuf::from("/srv/vocabulary/week01/index.json"))
        );

        for rejected in [
            "",
            "../secret.txt",
            "week01/../../secret.txt",
            "/etc/passwd.txt",
            "./a.txt",
            "week01/.hidden.txt",
            "notes.md",
            "week01",
            "a\\b.txt",
        ] {
            assert_eq!(resolve_request_path(root, rejected), None, "{rejected}");
        }
    }
}
