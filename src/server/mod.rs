/// Preview server
///
/// Serves the viewer template at `/` and the scanned images (plus data.json)
/// at `/images`. Read-only; nothing here touches the scan pipeline.

pub mod static_files;

use axum::Router;
use tokio::net::TcpListener;

use crate::config::ServeConfig;
use crate::error::ServeError;
pub use static_files::{Mounts, StaticMount};

/// Every request goes through one fallback handler that picks the mount.
pub fn build_router(mounts: Mounts) -> Router {
    Router::new()
        .fallback(static_files::serve_static)
        .with_state(mounts)
}

/// Bind and serve until Ctrl-C.
pub async fn run(config: ServeConfig) -> Result<(), ServeError> {
    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServeError::Bind {
            addr: addr.to_string(),
            source,
        })?;

    tracing::info!("Running: http://{}", config.bind_addr());
    let mounts = Mounts::new(config.mounts);
    for mount in mounts.iter() {
        tracing::info!("  - {}: {}", mount.route, mount.root.display());
    }

    axum::serve(listener, build_router(mounts))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ServeError::Serve)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down preview server");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::net::SocketAddr;
    use tempfile::{tempdir, TempDir};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    struct Fixture {
        _template: TempDir,
        _images: TempDir,
        addr: SocketAddr,
    }

    async fn start() -> Fixture {
        let template = tempdir().unwrap();
        fs::write(template.path().join("index.html"), "<html>viewer</html>").unwrap();
        fs::create_dir(template.path().join("assets")).unwrap();
        fs::write(template.path().join("assets").join("app.js"), "run()").unwrap();

        let images = tempdir().unwrap();
        image::RgbImage::new(2, 2)
            .save(images.path().join("1_origin.png"))
            .unwrap();
        fs::write(images.path().join("data.json"), "[]").unwrap();

        let mounts = Mounts::new(vec![
            StaticMount::new("/", template.path()),
            StaticMount::new("/images", images.path()),
        ]);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, build_router(mounts)).await.unwrap();
        });

        Fixture {
            _template: template,
            _images: images,
            addr,
        }
    }

    async fn request(addr: SocketAddr, method: &str, path: &str) -> String {
        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        let request = format!(
            "{} {} HTTP/1.1\r\nHost: {}\r\nConnection: close\r\n\r\n",
            method, path, addr
        );
        stream.write_all(request.as_bytes()).await.unwrap();

        let mut response = Vec::new();
        stream.read_to_end(&mut response).await.unwrap();
        String::from_utf8_lossy(&response).to_string()
    }

    #[tokio::test]
    async fn test_index_served_at_root() {
        let fixture = start().await;
        let response = request(fixture.addr, "GET", "/").await;
        assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(response.contains("content-type: text/html"));
        assert!(response.ends_with("<html>viewer</html>"));
    }

    #[tokio::test]
    async fn test_nested_template_file() {
        let fixture = start().await;
        let response = request(fixture.addr, "GET", "/assets/app.js").await;
        assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(response.ends_with("run()"));
    }

    #[tokio::test]
    async fn test_images_and_document_served() {
        let fixture = start().await;

        let response = request(fixture.addr, "GET", "/images/1_origin.png").await;
        assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(response.contains("content-type: image/png"));

        let response = request(fixture.addr, "GET", "/images/data.json").await;
        assert!(response.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(response.contains("content-type: application/json"));
        assert!(response.ends_with("[]"));
    }

    #[tokio::test]
    async fn test_missing_file_is_404() {
        let fixture = start().await;
        let response = request(fixture.addr, "GET", "/images/nope.png").await;
        assert!(response.starts_with("HTTP/1.1 404 Not Found\r\n"));
    }

    #[tokio::test]
    async fn test_traversal_is_404() {
        let fixture = start().await;
        let response = request(fixture.addr, "GET", "/images/%2e%2e/index.html").await;
        assert!(response.starts_with("HTTP/1.1 404 Not Found\r\n"));
    }

    #[tokio::test]
    async fn test_post_not_allowed() {
        let fixture = start().await;
        let response = request(fixture.addr, "POST", "/index.html").await;
        assert!(response.starts_with("HTTP/1.1 405 Method Not Allowed\r\n"));
    }
}
