mod error;
pub mod metrics;
mod picture_body;
mod shutdown;
mod state;

pub use error::ApiError;
pub use picture_body::PictureBody;
pub use shutdown::listen_for_shutdown;
pub use state::AppState;
