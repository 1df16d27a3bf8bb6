use std::{collections::HashSet, fs, io, path::Path, sync::Arc};

use serde_json::Value;
use thiserror::Error;
use tokio::sync::RwLock;

use super::{Fields, Picture};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("picture collection was never initialized")]
    Uninitialized,
    #[error("cannot read pictures file: {0}")]
    Io(#[from] io::Error),
    #[error("pictures file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("pictures file must contain a JSON array")]
    NotAnArray,
    #[error("no picture id left after {0}")]
    IdsExhausted(i64),
}

#[derive(Debug)]
enum Collection {
    Uninitialized,
    Ready(Vec<Picture>),
}

/// In-memory picture collection, seeded once at startup.
#[derive(Clone)]
pub struct PictureStore {
    collection: Arc<RwLock<Collection>>,
}

impl PictureStore {
    /// A store whose startup load failed. Reads report nothing, writes fail.
    pub fn uninitialized() -> Self {
        Self {
            collection: Arc::new(RwLock::new(Collection::Uninitialized)),
        }
    }

    pub fn from_pictures(pictures: Vec<Picture>) -> Self {
        Self {
            collection: Arc::new(RwLock::new(Collection::Ready(pictures))),
        }
    }

    /// Load from disk.
    pub fn load(file_path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let raw = fs::read_to_string(file_path)?;
        Self::from_json(&raw)
    }

    /// Parses a JSON array of records. Records without a usable id, or
    /// repeating an id already seen, are skipped.
    pub fn from_json(raw: &str) -> Result<Self, StoreError> {
        let Value::Array(records) = serde_json::from_str(raw)? else {
            return Err(StoreError::NotAnArray);
        };

        let mut seen = HashSet::new();
        let mut pictures = Vec::with_capacity(records.len());
        for (index, record) in records.into_iter().enumerate() {
            match Picture::from_value(record) {
                Ok(pic) if !seen.insert(pic.id) => {
                    tracing::warn!(index, id = pic.id, "skipping picture with duplicate id");
                }
                Ok(pic) => pictures.push(pic),
                Err(e) => tracing::warn!(index, "skipping picture: {e}"),
            }
        }

        Ok(Self::from_pictures(pictures))
    }

    pub async fn count_pictures(&self) -> Result<usize, StoreError> {
        match &*self.collection.read().await {
            Collection::Ready(pictures) => Ok(pictures.len()),
            Collection::Uninitialized => Err(StoreError::Uninitialized),
        }
    }

    pub async fn list_pictures(&self) -> Vec<Picture> {
        match &*self.collection.read().await {
            Collection::Ready(pictures) => pictures.clone(),
            Collection::Uninitialized => Vec::new(),
        }
    }

    pub async fn get_picture(&self, id: i64) -> Option<Picture> {
        match &*self.collection.read().await {
            Collection::Ready(pictures) => pictures.iter().find(|p| p.id == id).cloned(),
            Collection::Uninitialized => None,
        }
    }

    /// Appends a record with the next free id (max + 1, or 1 when empty).
    pub async fn add_picture(&self, fields: Fields) -> Result<Picture, StoreError> {
        let mut guard = self.collection.write().await;
        let Collection::Ready(pictures) = &mut *guard else {
            return Err(StoreError::Uninitialized);
        };

        let id = match pictures.iter().map(|p| p.id).max() {
            Some(max) => max.checked_add(1).ok_or(StoreError::IdsExhausted(max))?,
            None => 1,
        };
        let picture = Picture::with_id(id, fields);
        pictures.push(picture.clone());
        Ok(picture)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn fields(value: Value) -> Fields {
        value.as_object().cloned().unwrap()
    }

    fn store_with_ids(ids: &[i64]) -> PictureStore {
        PictureStore::from_pictures(
            ids.iter()
                .map(|&id| Picture::with_id(id, fields(json!({"title": format!("pic {id}")}))))
                .collect(),
        )
    }

    #[tokio::test]
    async fn empty_store_counts_zero() {
        let store = PictureStore::from_pictures(Vec::new());
        assert_eq!(store.count_pictures().await.unwrap(), 0);
        assert!(store.list_pictures().await.is_empty());
    }

    #[tokio::test]
    async fn uninitialized_store_refuses_count_and_create() {
        let store = PictureStore::uninitialized();
        assert!(matches!(
            store.count_pictures().await,
            Err(StoreError::Uninitialized)
        ));
        assert!(matches!(
            store.add_picture(fields(json!({"title": "x"}))).await,
            Err(StoreError::Uninitialized)
        ));
        assert!(store.list_pictures().await.is_empty());
        assert_eq!(store.get_picture(1).await, None);
    }

    #[tokio::test]
    async fn first_picture_gets_id_one() {
        let store = PictureStore::from_pictures(Vec::new());
        let pic = store
            .add_picture(fields(json!({"title": "sunset"})))
            .await
            .unwrap();
        assert_eq!(pic.id, 1);
        assert_eq!(store.count_pictures().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn new_id_is_max_plus_one() {
        let store = store_with_ids(&[2, 5, 3]);
        let pic = store
            .add_picture(fields(json!({"id": 1, "title": "dawn"})))
            .await
            .unwrap();
        assert_eq!(pic.id, 6);
        assert_eq!(store.list_pictures().await.last(), Some(&pic));
    }

    #[tokio::test]
    async fn create_after_max_id_fails_without_appending() {
        let store = store_with_ids(&[i64::MAX]);
        assert!(matches!(
            store.add_picture(fields(json!({"title": "x"}))).await,
            Err(StoreError::IdsExhausted(i64::MAX))
        ));
        assert_eq!(store.count_pictures().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn ids_keep_increasing() {
        let store = store_with_ids(&[1]);
        let mut last = 1;
        for _ in 0..5 {
            let pic = store.add_picture(Fields::new()).await.unwrap();
            assert!(pic.id > last);
            last = pic.id;
        }
    }

    #[tokio::test]
    async fn concurrent_creates_never_share_an_id() {
        let store = PictureStore::from_pictures(Vec::new());
        let handles: Vec<_> = (0..32)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.add_picture(Fields::new()).await.unwrap().id })
            })
            .collect();

        let mut ids = HashSet::new();
        for handle in handles {
            assert!(ids.insert(handle.await.unwrap()));
        }
        assert_eq!(ids.len(), 32);
    }

    #[tokio::test]
    async fn get_returns_first_match() {
        let store = store_with_ids(&[1, 3]);
        assert_eq!(store.get_picture(3).await.unwrap().id, 3);
        assert_eq!(store.get_picture(4).await, None);
    }

    #[tokio::test]
    async fn from_json_skips_unusable_records() {
        let raw = r#"[
            {"id": 1, "title": "a"},
            {"title": "no id"},
            {"id": "two"},
            {"id": "3", "title": "c"},
            {"id": 1, "title": "dup"},
            42
        ]"#;
        let store = PictureStore::from_json(raw).unwrap();
        let ids: Vec<_> = store.list_pictures().await.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(store.get_picture(1).await.unwrap().fields["title"], "a");
    }

    #[test]
    fn from_json_rejects_non_arrays() {
        assert!(matches!(
            PictureStore::from_json(r#"{"id": 1}"#),
            Err(StoreError::NotAnArray)
        ));
        assert!(matches!(
            PictureStore::from_json("not json"),
            Err(StoreError::Json(_))
        ));
    }

    #[test]
    fn load_reports_missing_file() {
        assert!(matches!(
            PictureStore::load("/definitely/not/here/pictures.json"),
            Err(StoreError::Io(_))
        ));
    }
}
