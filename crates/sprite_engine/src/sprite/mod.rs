//! Sprite records and the store that owns them

mod store;
mod types;

pub use store::SpriteStore;
pub use types::{ImageFlip, ImageHandle, Sprite, SpriteFlags, SpriteId, UserData};
