use crate::error::{HomeworkError, HomeworkResult};
use crate::model::HomeworkItem;
use crate::store::{load_list, save_list, BlobStore};
use tracing::debug;
use uuid::Uuid;

pub const ITEMS_KEY: &str = "homework_items";

/// Seed used when the workspace has never stored a catalog.
pub fn default_items() -> Vec<HomeworkItem> {
    [("1", "國語習作"), ("2", "數學考卷"), ("3", "英語作業")]
        .into_iter()
        .map(|(id, name)| HomeworkItem {
            id: id.to_string(),
            name: name.to_string(),
        })
        .collect()
}

/// Editable list of assignment names offered during entry. Names are not
/// required to be unique.
pub struct AssignmentCatalog<S> {
    store: S,
    items: Vec<HomeworkItem>,
}

impl<S: BlobStore> AssignmentCatalog<S> {
    pub fn open(store: S) -> HomeworkResult<Self> {
        let items = load_list(&store, ITEMS_KEY)?.unwrap_or_else(default_items);
        debug!(count = items.len(), "loaded homework catalog");
        Ok(Self { store, items })
    }

    pub fn add(&mut self, name: &str) -> HomeworkResult<HomeworkItem> {
        let name = name.trim();
        if name.is_empty() {
            return Err(HomeworkError::validation("assignment name must not be empty"));
        }
        let item = HomeworkItem {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
        };
        self.items.push(item.clone());
        self.persist()?;
        Ok(item)
    }

    /// Historical records keep their name snapshot; nothing else is touched.
    pub fn remove(&mut self, id: &str) -> HomeworkResult<bool> {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        if self.items.len() == before {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    pub fn items(&self) -> &[HomeworkItem] {
        &self.items
    }

    fn persist(&self) -> HomeworkResult<()> {
        save_list(&self.store, ITEMS_KEY, &self.items)
    }
}
