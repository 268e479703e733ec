//! Search, sort and filter for the items in a category.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::item::Item;

/// The order in which items are listed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    /// Newest items first.
    #[default]
    #[serde(rename = "dateAdded-desc")]
    NewestFirst,
    /// Oldest items first.
    #[serde(rename = "dateAdded-asc")]
    OldestFirst,
    /// Alphabetical by title.
    #[serde(rename = "title-asc")]
    TitleAscending,
    /// Reverse alphabetical by title.
    #[serde(rename = "title-desc")]
    TitleDescending,
}

impl SortOrder {
    /// Every sort order, in the order they are offered to the user.
    pub const ALL: [SortOrder; 4] = [
        SortOrder::NewestFirst,
        SortOrder::OldestFirst,
        SortOrder::TitleAscending,
        SortOrder::TitleDescending,
    ];

    /// The value used in the query string.
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::NewestFirst => "dateAdded-desc",
            SortOrder::OldestFirst => "dateAdded-asc",
            SortOrder::TitleAscending => "title-asc",
            SortOrder::TitleDescending => "title-desc",
        }
    }

    /// The translation key for the label shown to the user.
    pub fn label_key(self) -> &'static str {
        match self {
            SortOrder::NewestFirst => "sort_date_desc",
            SortOrder::OldestFirst => "sort_date_asc",
            SortOrder::TitleAscending => "sort_az",
            SortOrder::TitleDescending => "sort_za",
        }
    }

    fn compare(self, a: &Item, b: &Item) -> Ordering {
        let by_title = || {
            a.title
                .as_ref()
                .to_lowercase()
                .cmp(&b.title.as_ref().to_lowercase())
        };

        match self {
            SortOrder::NewestFirst => b.date_added.cmp(&a.date_added),
            SortOrder::OldestFirst => a.date_added.cmp(&b.date_added),
            SortOrder::TitleAscending => by_title(),
            SortOrder::TitleDescending => by_title().reverse(),
        }
    }
}

/// The search, sort and filter options for listing items.
///
/// Deserialized from a query string such as
/// `?search=red&sort=title-asc&brand=BrandX&brand=BrandY&colour=red`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemQuery {
    /// Case-insensitive text to look for in item titles.
    #[serde(default)]
    pub search: String,
    /// The order of the results.
    #[serde(default)]
    pub sort: SortOrder,
    /// Only show items with one of these brands. Empty means any brand.
    #[serde(default, rename = "brand")]
    pub brands: Vec<String>,
    /// Only show items with one of these colours. Empty means any colour.
    #[serde(default, rename = "colour")]
    pub colours: Vec<String>,
}

impl ItemQuery {
    /// Whether `item` passes the search and filters.
    pub fn matches(&self, item: &Item) -> bool {
        let search = self.search.trim().to_lowercase();

        let matches_search =
            search.is_empty() || item.title.as_ref().to_lowercase().contains(&search);
        let matches_brand = self.brands.is_empty() || self.brands.contains(&item.brand);
        let matches_colour = self.colours.is_empty() || self.colours.contains(&item.colour);

        matches_search && matches_brand && matches_colour
    }

    /// Select and order `items`.
    pub fn apply<'a>(&self, items: impl IntoIterator<Item = &'a Item>) -> Vec<&'a Item> {
        let mut selected = items
            .into_iter()
            .filter(|item| self.matches(item))
            .collect::<Vec<_>>();

        selected.sort_by(|a, b| self.sort.compare(a, b));

        selected
    }

    /// Whether any brand or colour filter is active.
    pub fn has_filters(&self) -> bool {
        !self.brands.is_empty() || !self.colours.is_empty()
    }
}

/// The brands and colours the user can filter by.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOptions {
    /// Distinct non-empty brands in order of first appearance.
    pub brands: Vec<String>,
    /// Distinct non-empty colours in order of first appearance.
    pub colours: Vec<String>,
}

impl FilterOptions {
    /// Collect the filter options from `items`.
    pub fn from_items<'a>(items: impl IntoIterator<Item = &'a Item>) -> Self {
        let mut options = FilterOptions::default();

        for item in items {
            push_distinct(&mut options.brands, &item.brand);
            push_distinct(&mut options.colours, &item.colour);
        }

        options
    }
}

fn push_distinct(values: &mut Vec<String>, value: &str) {
    if !value.is_empty() && !values.iter().any(|existing| existing == value) {
        values.push(value.to_owned());
    }
}
