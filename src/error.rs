use thiserror::Error;

/// Top-level error type for the viewer.
#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("gltf error: {0}")]
    Gltf(#[from] gltf::Error),

    #[error("failed to create render surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    /// Load-phase failures not covered by a library error, e.g. a non-success
    /// HTTP status.
    #[error("asset error: {0}")]
    Asset(String),
}
