use tokio::sync::mpsc::UnboundedSender;

use crate::error::ViewerError;
use crate::model::Model;

use super::import;

/// Events from the single-shot asset load, drained by the frame loop with
/// `try_recv`. Exactly one `Loaded` or `Failed` arrives per session; there is
/// no retry or cancellation.
pub enum AssetEvent {
    Progress(f32),
    Loaded(Box<Model>),
    Failed(String),
}

/// Kick off the one-shot background load of a local path or http(s) URL.
pub fn spawn_load(
    handle: &tokio::runtime::Handle,
    source: String,
    point_intensity_scale: f32,
    sender: UnboundedSender<AssetEvent>,
) {
    handle.spawn(async move {
        match load(&source, point_intensity_scale, &sender).await {
            Ok(model) => {
                let _ = sender.send(AssetEvent::Loaded(Box::new(model)));
            }
            Err(e) => {
                let _ = sender.send(AssetEvent::Failed(e.to_string()));
            }
        }
    });
}

async fn load(
    source: &str,
    point_intensity_scale: f32,
    sender: &UnboundedSender<AssetEvent>,
) -> Result<Model, ViewerError> {
    log::info!("loading asset: {source}");
    let _ = sender.send(AssetEvent::Progress(0.0));

    let (document, buffers) = if is_remote(source) {
        // Remote loads are limited to self-contained .glb; external buffer
        // URIs are not resolved over the network.
        let bytes = download(source, sender).await?;
        let (document, buffers, _images) = gltf::import_slice(&bytes)?;
        (document, buffers)
    } else {
        let (document, buffers, _images) = gltf::import(source)?;
        (document, buffers)
    };
    let _ = sender.send(AssetEvent::Progress(1.0));

    Ok(import::build_model(
        source,
        &document,
        &buffers,
        point_intensity_scale,
    ))
}

fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Download with chunked progress when the server reports a content length.
async fn download(
    url: &str,
    sender: &UnboundedSender<AssetEvent>,
) -> Result<Vec<u8>, ViewerError> {
    let mut response = reqwest::get(url).await?;
    if !response.status().is_success() {
        return Err(ViewerError::Asset(format!(
            "HTTP {} from {}",
            response.status(),
            url
        )));
    }

    let total = response.content_length().filter(|&n| n > 0);
    let mut bytes = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        bytes.extend_from_slice(&chunk);
        if let Some(total) = total {
            let _ = sender.send(AssetEvent::Progress(bytes.len() as f32 / total as f32));
        }
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_detection_only_matches_http_schemes() {
        assert!(is_remote("https://example.com/model.glb"));
        assert!(is_remote("http://example.com/model.glb"));
        assert!(!is_remote("./models/croissant.glb"));
        assert!(!is_remote("C:/models/httpish.glb"));
    }
}
