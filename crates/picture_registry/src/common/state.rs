use crate::db::PictureStore;

#[derive(Clone)]
pub struct AppState {
    pub store: PictureStore,
}
