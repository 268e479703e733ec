//! Core category domain types.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

/// A validated, non-empty category name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(transparent)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name from `name` with surrounding whitespace removed.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyCategoryName] if `name` is empty or only whitespace.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyCategoryName)
        } else {
            Ok(Self(name.to_string()))
        }
    }

    /// Create a category name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for CategoryName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CategoryName::new(s)
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier for a category, e.g. "id_1718000000000_k3j9x0a1b".
pub type CategoryId = String;

/// A user defined group of items, e.g. 'Lipsticks' or 'Foundations'.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct Category {
    /// The ID of the category, unique within a user's inventory.
    pub id: CategoryId,
    /// The name shown to the user.
    pub name: CategoryName,
}

/// Form data for category creation and editing.
#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryFormData {
    /// The unvalidated category name.
    pub name: String,
}

#[cfg(test)]
mod tests {
    use crate::Error;

    use super::{Category, CategoryName};

    #[test]
    fn name_is_trimmed() {
        assert_eq!(
            CategoryName::new("  Lipsticks "),
            Ok(CategoryName::new_unchecked("Lipsticks"))
        );
    }

    #[test]
    fn blank_name_is_rejected() {
        assert_eq!(CategoryName::new("   "), Err(Error::EmptyCategoryName));
    }

    #[test]
    fn serializes_to_stored_shape() {
        let category = Category {
            id: "c1".to_owned(),
            name: CategoryName::new_unchecked("Lipsticks"),
        };

        let json = serde_json::to_value(&category).unwrap();

        assert_eq!(json, serde_json::json!({"id": "c1", "name": "Lipsticks"}));
    }
}
