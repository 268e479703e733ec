//! Items are the makeup products in a category, with an optional photo.

mod create;
mod delete;
mod details;
mod domain;
mod edit;
mod form;
mod list;
mod query;

use std::sync::Arc;

use axum::extract::FromRef;

use crate::{AppState, image_ingest::ImageIngestor, persistence::InventoryStore};

pub use create::{create_item_endpoint, get_new_item_page};
pub use delete::delete_item_endpoint;
pub use details::get_item_page;
pub use domain::{ImageChange, Item, ItemDraft, ItemId, ItemTitle};
pub use edit::{get_edit_item_page, update_item_endpoint};
pub use list::get_items_page;
pub use query::{FilterOptions, ItemQuery, SortOrder};

/// The state needed by the item pages and endpoints.
#[derive(Clone)]
pub struct ItemState {
    /// The categories and items of each user.
    pub inventory: Arc<dyn InventoryStore>,
    /// Settings for downsizing uploaded photos.
    pub image_ingestor: ImageIngestor,
}

impl FromRef<AppState> for ItemState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            inventory: state.inventory.clone(),
            image_ingestor: state.image_ingestor,
        }
    }
}
