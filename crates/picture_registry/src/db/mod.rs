mod picture;
mod picture_store;

pub use picture::{Fields, Picture, PictureError};
pub use picture_store::{PictureStore, StoreError};
