use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use base64::Engine;
use image::RgbaImage;
use serde::Serialize;
use tokio::task::JoinHandle;

use crate::state::SharedState;

/// Path the host uses when it has no thumbnail of its own
pub const PLACEHOLDER_THUMBNAIL: &str = "/placeholder.svg?height=300&width=300";

const FETCH_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "src", rename_all = "lowercase")]
pub enum Artwork {
    Placeholder,
    /// PNG data URL, already resized
    Loaded(String),
}

/// The thumbnail URL worth fetching, if any
pub fn loadable_url(url: Option<&str>) -> Option<&str> {
    url.map(str::trim)
        .filter(|u| !u.is_empty() && *u != PLACEHOLDER_THUMBNAIL)
}

/// Downloads or decodes thumbnails and normalizes them to square PNGs
pub struct ArtworkFetcher {
    client: reqwest::Client,
    size: u32,
}

impl ArtworkFetcher {
    pub fn new(size: u32) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client, size })
    }

    /// Fetch `url` (http(s) or data URL) and return a PNG data URL
    pub async fn fetch(&self, url: &str) -> Result<String> {
        let bytes = if url.starts_with("data:") {
            decode_data_url(url)?
        } else if url.starts_with("http://") || url.starts_with("https://") {
            let response = self
                .client
                .get(url)
                .send()
                .await
                .context("Thumbnail request failed")?
                .error_for_status()
                .context("Thumbnail request rejected")?;
            response
                .bytes()
                .await
                .context("Failed to read thumbnail body")?
                .to_vec()
        } else {
            bail!("Unsupported thumbnail URL: {}", url);
        };

        let size = self.size;
        let png = tokio::task::spawn_blocking(move || resize_to_png(&bytes, size))
            .await
            .context("Thumbnail decode task failed")??;

        Ok(format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(png)
        ))
    }
}

/// Strip the data URL prefix and decode the base64 body
fn decode_data_url(url: &str) -> Result<Vec<u8>> {
    let base64_data = url.split(',').nth(1).context("Invalid data URL format")?;

    base64::engine::general_purpose::STANDARD
        .decode(base64_data)
        .context("Failed to decode base64 artwork")
}

fn resize_to_png(bytes: &[u8], size: u32) -> Result<Vec<u8>> {
    let img = image::load_from_memory(bytes).context("Failed to load image from memory")?;
    let resized = img.resize_exact(size, size, image::imageops::FilterType::Lanczos3);
    encode_png(&resized.to_rgba8())
}

fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    use image::codecs::png::PngEncoder;
    use image::ImageEncoder;

    let mut buffer = Vec::new();
    PngEncoder::new(&mut buffer)
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            image::ExtendedColorType::Rgba8,
        )
        .context("Failed to encode PNG")?;

    Ok(buffer)
}

/// Owns the in-flight thumbnail load for the current track.
///
/// Starting a new load aborts the previous one. A load that still finishes
/// late is dropped unless the session's artwork generation is unchanged.
pub struct ArtworkLoader {
    fetcher: Arc<ArtworkFetcher>,
    task: Option<JoinHandle<()>>,
}

impl ArtworkLoader {
    pub fn new(fetcher: Arc<ArtworkFetcher>) -> Self {
        Self {
            fetcher,
            task: None,
        }
    }

    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    pub fn load(&mut self, url: String, generation: u64, state: SharedState) {
        self.cancel();

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                log::warn!("No async runtime available, thumbnail not loaded: {}", url);
                return;
            }
        };

        let fetcher = self.fetcher.clone();
        self.task = Some(runtime.spawn(async move {
            let result = fetcher.fetch(&url).await;

            let mut session = state.write();
            if session.artwork_generation != generation {
                log::debug!("Discarding stale thumbnail for generation {}", generation);
                return;
            }
            session.artwork = match result {
                Ok(data_url) => Artwork::Loaded(data_url),
                Err(e) => {
                    log::info!("Failed to load thumbnail, using placeholder: {:#}", e);
                    Artwork::Placeholder
                }
            };
        }));
    }
}

impl Drop for ArtworkLoader {
    fn drop(&mut self) {
        self.cancel();
    }
}
