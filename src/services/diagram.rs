//! Diagram rendering
//!
//! Turns PlantUML source into a PNG persisted in the cache directory.

use crate::config::DiagramConfig;
use crate::error::{Result, SheetchatError};
use crate::session::ImageRef;

use async_trait::async_trait;
use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;

/// Renders diagram source into an image
#[async_trait]
pub trait DiagramRenderer: Send + Sync {
    /// Render `source` and return a reference to the produced image
    ///
    /// # Errors
    ///
    /// Returns error if the rendering service fails or produces no image
    async fn render(&self, source: &str) -> Result<ImageRef>;
}

/// Renders through a PlantUML server
///
/// The source is sent hex-encoded in the URL (`/png/~h<hex>`), which every
/// PlantUML server accepts without the deflate alphabet.
pub struct PlantUmlRenderer {
    client: Client,
    server_url: String,
    cache_dir: PathBuf,
    file_stem: String,
}

impl PlantUmlRenderer {
    /// Create a renderer from diagram configuration
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new(config: &DiagramConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| SheetchatError::Diagram(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            server_url: config.server_url.trim_end_matches('/').to_string(),
            cache_dir: config.cache_dir.clone(),
            file_stem: config.file_stem.clone(),
        })
    }

    fn png_url(&self, source: &str) -> String {
        format!("{}/png/~h{}", self.server_url, hex::encode(source))
    }

    fn cache_path(&self, extension: &str) -> PathBuf {
        self.cache_dir
            .join(format!("{}.{}", self.file_stem, extension))
    }
}

#[async_trait]
impl DiagramRenderer for PlantUmlRenderer {
    async fn render(&self, source: &str) -> Result<ImageRef> {
        tokio::fs::create_dir_all(&self.cache_dir).await?;
        tokio::fs::write(self.cache_path("puml"), source).await?;

        let response = self
            .client
            .get(self.png_url(source))
            .send()
            .await
            .map_err(|e| SheetchatError::Diagram(format!("PlantUML request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(
                SheetchatError::Diagram(format!("PlantUML server returned {}", status)).into(),
            );
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SheetchatError::Diagram(format!("Failed to read PlantUML image: {}", e)))?;

        match image::guess_format(&bytes) {
            Ok(image::ImageFormat::Png) => {}
            _ => {
                return Err(SheetchatError::Diagram(
                    "PlantUML server did not return a PNG image".to_string(),
                )
                .into())
            }
        }

        let path = self.cache_path("png");
        tokio::fs::write(&path, &bytes).await?;
        tracing::info!("PlantUML image stored at {}", path.display());

        Ok(ImageRef::file(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PNG_HEADER: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    fn config(server_url: String, dir: &TempDir) -> DiagramConfig {
        DiagramConfig {
            server_url,
            cache_dir: dir.path().join("cache"),
            file_stem: "plantuml_img".to_string(),
        }
    }

    #[test]
    fn test_png_url() {
        let dir = TempDir::new().unwrap();
        let renderer =
            PlantUmlRenderer::new(&config("http://plantuml.local/plantuml/".to_string(), &dir))
                .unwrap();
        assert_eq!(
            renderer.png_url("AB"),
            "http://plantuml.local/plantuml/png/~h4142"
        );
    }

    #[tokio::test]
    async fn test_render_writes_source_and_png() {
        let server = MockServer::start().await;
        let source = "@startuml\nA -> B\n@enduml";
        Mock::given(method("GET"))
            .and(path(format!("/png/~h{}", hex::encode(source))))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(PNG_HEADER.to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let renderer = PlantUmlRenderer::new(&config(server.uri(), &dir)).unwrap();
        let image = renderer.render(source).await.unwrap();

        let png_path = dir.path().join("cache").join("plantuml_img.png");
        assert_eq!(image.path(), Some(png_path.as_path()));
        assert_eq!(std::fs::read(&png_path).unwrap(), PNG_HEADER.to_vec());
        let puml = std::fs::read_to_string(dir.path().join("cache").join("plantuml_img.puml"))
            .unwrap();
        assert_eq!(puml, source);
    }

    #[tokio::test]
    async fn test_render_rejects_non_png() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>syntax error</html>"))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let renderer = PlantUmlRenderer::new(&config(server.uri(), &dir)).unwrap();
        let err = renderer.render("@startuml\n@enduml").await.unwrap_err();
        assert!(err.to_string().contains("PNG"));
        assert!(!dir.path().join("cache").join("plantuml_img.png").exists());
    }

    #[tokio::test]
    async fn test_render_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let renderer = PlantUmlRenderer::new(&config(server.uri(), &dir)).unwrap();
        assert!(renderer.render("@startuml\n@enduml").await.is_err());
    }
}
