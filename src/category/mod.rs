//! Categories group a user's items, e.g. 'Lipsticks' or 'Foundations'.

mod create;
mod delete;
mod domain;
mod edit;
mod list;

use std::sync::Arc;

use axum::extract::FromRef;

use crate::{
    AppState,
    persistence::{InventoryStore, PersistenceMode},
};

pub use create::{create_category_endpoint, get_new_category_page};
pub use delete::delete_category_endpoint;
pub use domain::{Category, CategoryFormData, CategoryId, CategoryName};
pub use edit::{get_edit_category_page, update_category_endpoint};
pub use list::get_categories_page;

/// The state needed by the category pages and endpoints.
#[derive(Clone)]
pub struct CategoryState {
    /// The categories and items of each user.
    pub inventory: Arc<dyn InventoryStore>,
    /// Where the inventory is stored.
    pub mode: PersistenceMode,
}

impl FromRef<AppState> for CategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            inventory: state.inventory.clone(),
            mode: state.mode,
        }
    }
}
