mod bounds;
mod import;
mod loader;

pub use loader::{AssetEvent, spawn_load};
