//! Core item domain types.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, category::CategoryId, entity_id::generate_id};

/// A validated, non-empty item title.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(transparent)]
pub struct ItemTitle(String);

impl ItemTitle {
    /// Create an item title from `title` with surrounding whitespace removed.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyItemTitle] if `title` is empty or only whitespace.
    pub fn new(title: &str) -> Result<Self, Error> {
        let title = title.trim();

        if title.is_empty() {
            Err(Error::EmptyItemTitle)
        } else {
            Ok(Self(title.to_string()))
        }
    }

    /// Create an item title without validation.
    ///
    /// The caller should ensure that the string is not empty.
    pub fn new_unchecked(title: &str) -> Self {
        Self(title.to_string())
    }
}

impl AsRef<str> for ItemTitle {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for ItemTitle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ItemTitle::new(s)
    }
}

impl Display for ItemTitle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier for an item.
pub type ItemId = String;

/// A makeup product in one of the user's categories.
///
/// Serialized with the field names used in stored inventories, e.g.
/// `categoryId`, `tipo`, `marca`, `cor` and `dateAdded`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// The ID of the item, unique within a user's inventory.
    pub id: ItemId,
    /// The category the item belongs to.
    pub category_id: CategoryId,
    /// The name of the product.
    pub title: ItemTitle,
    /// Free-form notes.
    #[serde(default)]
    pub notes: String,
    /// Zero or one photo as a `data:image/jpeg;base64,...` URL.
    #[serde(default)]
    pub images: Vec<String>,
    /// The kind of product, e.g. "matte".
    #[serde(rename = "tipo", default)]
    pub kind: String,
    /// The brand of the product.
    #[serde(rename = "marca", default)]
    pub brand: String,
    /// The shade or colour of the product.
    #[serde(rename = "cor", default)]
    pub colour: String,
    /// When the item was created, in milliseconds since the Unix epoch.
    pub date_added: i64,
}

/// What to do with an item's photo when it is saved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ImageChange {
    /// Keep the current photo, if any.
    #[default]
    Keep,
    /// Replace the current photo with an encoded image data URL.
    Replace(String),
    /// Remove the current photo.
    Remove,
}

/// The user editable fields of an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDraft {
    /// The name of the product.
    pub title: ItemTitle,
    /// Free-form notes.
    pub notes: String,
    /// The kind of product.
    pub kind: String,
    /// The brand of the product.
    pub brand: String,
    /// The shade or colour of the product.
    pub colour: String,
    /// The change to the item's photo.
    pub image: ImageChange,
}

impl ItemDraft {
    /// Create a draft with only a title set.
    pub fn titled(title: ItemTitle) -> Self {
        Self {
            title,
            notes: String::new(),
            kind: String::new(),
            brand: String::new(),
            colour: String::new(),
            image: ImageChange::Keep,
        }
    }
}

impl Item {
    /// Build the item to store from a draft.
    ///
    /// A new item (`existing` is `None`) gets a fresh ID and `now` as its
    /// creation time. An edited item keeps its ID and creation time.
    pub fn assemble(
        existing: Option<&Item>,
        category_id: &str,
        draft: ItemDraft,
        now: i64,
    ) -> Item {
        let images = match draft.image {
            ImageChange::Keep => existing
                .map(|item| item.images.clone())
                .unwrap_or_default(),
            ImageChange::Replace(image) => vec![image],
            ImageChange::Remove => Vec::new(),
        };

        Item {
            id: existing
                .map(|item| item.id.clone())
                .unwrap_or_else(generate_id),
            category_id: category_id.to_owned(),
            title: draft.title,
            notes: draft.notes,
            images,
            kind: draft.kind,
            brand: draft.brand,
            colour: draft.colour,
            date_added: existing.map(|item| item.date_added).unwrap_or(now),
        }
    }

    /// The item's photo, if it has one.
    pub fn image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}
