//! Per-user appearance settings: colour theme, font and language.

use std::sync::Arc;

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{Error, auth::Email, i18n::Language, storage::KeyValueStore};

/// The colours of a theme, rendered as CSS custom properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    /// The page and card background.
    pub primary: &'static str,
    /// The darker half of the soft shadows.
    pub shadow_dark: &'static str,
    /// The lighter half of the soft shadows.
    pub shadow_light: &'static str,
    /// Highlights, active buttons and links.
    pub accent: &'static str,
    /// Body text.
    pub text: &'static str,
}

/// A colour theme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Soft pink, the default.
    #[default]
    Pink,
    /// Pale blue.
    Blue,
    /// Mint green.
    Mint,
    /// Lavender.
    Lavender,
    /// Cream.
    Cream,
}

impl Theme {
    /// Every theme, in the order they are offered to the user.
    pub const ALL: [Theme; 5] = [
        Theme::Pink,
        Theme::Blue,
        Theme::Mint,
        Theme::Lavender,
        Theme::Cream,
    ];

    /// The value used in forms and storage.
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Pink => "pink",
            Theme::Blue => "blue",
            Theme::Mint => "mint",
            Theme::Lavender => "lavender",
            Theme::Cream => "cream",
        }
    }

    /// The translation key of the theme's name.
    pub fn label_key(self) -> &'static str {
        match self {
            Theme::Pink => "theme_pink",
            Theme::Blue => "theme_blue",
            Theme::Mint => "theme_mint",
            Theme::Lavender => "theme_lavender",
            Theme::Cream => "theme_cream",
        }
    }

    /// The theme's colours.
    pub fn palette(self) -> Palette {
        match self {
            Theme::Pink => Palette {
                primary: "#f0d9e7",
                shadow_dark: "#d3b8c8",
                shadow_light: "#ffffff",
                accent: "#e5a9c5",
                text: "#5b4b52",
            },
            Theme::Blue => Palette {
                primary: "#e0f2f7",
                shadow_dark: "#beced4",
                shadow_light: "#ffffff",
                accent: "#81d4fa",
                text: "#455a64",
            },
            Theme::Mint => Palette {
                primary: "#e0f2f1",
                shadow_dark: "#bec9c8",
                shadow_light: "#ffffff",
                accent: "#80cbc4",
                text: "#004d40",
            },
            Theme::Lavender => Palette {
                primary: "#ede7f6",
                shadow_dark: "#c9c4d1",
                shadow_light: "#ffffff",
                accent: "#b39ddb",
                text: "#4527a0",
            },
            Theme::Cream => Palette {
                primary: "#fcfbf2",
                shadow_dark: "#d6d5ce",
                shadow_light: "#ffffff",
                accent: "#dce775",
                text: "#5d4037",
            },
        }
    }
}

/// A font family.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Font {
    /// Poppins, the default.
    #[default]
    Poppins,
    /// Roboto.
    Roboto,
    /// Playfair Display.
    #[serde(rename = "Playfair Display")]
    PlayfairDisplay,
    /// Dancing Script.
    #[serde(rename = "Dancing Script")]
    DancingScript,
}

impl Font {
    /// Every font, in the order they are offered to the user.
    pub const ALL: [Font; 4] = [
        Font::Poppins,
        Font::Roboto,
        Font::PlayfairDisplay,
        Font::DancingScript,
    ];

    /// The CSS font family name, which is also the stored value.
    pub fn family(self) -> &'static str {
        match self {
            Font::Poppins => "Poppins",
            Font::Roboto => "Roboto",
            Font::PlayfairDisplay => "Playfair Display",
            Font::DancingScript => "Dancing Script",
        }
    }

    /// The Google Fonts stylesheet that provides the font.
    pub fn stylesheet_url(self) -> String {
        format!(
            "https://fonts.googleapis.com/css2?family={}:wght@400;600&display=swap",
            self.family().replace(' ', "+")
        )
    }
}

/// The appearance settings of a user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    /// The colour theme.
    #[serde(default)]
    pub theme: Theme,
    /// The font family.
    #[serde(default)]
    pub font: Font,
    /// The interface language.
    #[serde(default)]
    pub language: Language,
}

/// The keys of the theme, font and language of the user with `email`.
pub fn preference_keys(email: &Email) -> [String; 3] {
    [
        format!("makeup_theme_{email}"),
        format!("makeup_font_{email}"),
        format!("makeup_lang_{email}"),
    ]
}

/// Loads and saves [Preferences] as JSON strings in a [KeyValueStore].
#[derive(Clone)]
pub struct PreferenceStore {
    key_values: Arc<dyn KeyValueStore>,
}

impl PreferenceStore {
    /// Create a store on top of `key_values`.
    pub fn new(key_values: Arc<dyn KeyValueStore>) -> Self {
        Self { key_values }
    }

    /// The preferences of the user with `email`.
    ///
    /// Missing or unreadable values fall back to the defaults.
    pub fn load(&self, email: &Email) -> Result<Preferences, Error> {
        let [theme_key, font_key, language_key] = preference_keys(email);

        Ok(Preferences {
            theme: self.read(&theme_key)?,
            font: self.read(&font_key)?,
            language: self.read(&language_key)?,
        })
    }

    /// Store the preferences of the user with `email`.
    pub fn save(&self, email: &Email, preferences: &Preferences) -> Result<(), Error> {
        let [theme_key, font_key, language_key] = preference_keys(email);

        self.key_values
            .set(&theme_key, &serde_json::to_string(&preferences.theme)?)?;
        self.key_values
            .set(&font_key, &serde_json::to_string(&preferences.font)?)?;
        self.key_values
            .set(&language_key, &serde_json::to_string(&preferences.language)?)?;

        Ok(())
    }

    fn read<T: DeserializeOwned + Default>(&self, key: &str) -> Result<T, Error> {
        let Some(text) = self.key_values.get(key)? else {
            return Ok(T::default());
        };

        Ok(serde_json::from_str(&text)
            .inspect_err(|error| tracing::warn!("ignoring unreadable preference {key}: {error}"))
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tempfile::tempdir;

    use crate::{
        auth::Email,
        i18n::Language,
        storage::{FileKeyValueStore, KeyValueStore},
    };

    use super::{Font, PreferenceStore, Preferences, Theme};

    #[test]
    fn defaults_are_pink_poppins_portuguese() {
        let preferences = Preferences::default();

        assert_eq!(preferences.theme, Theme::Pink);
        assert_eq!(preferences.font, Font::Poppins);
        assert_eq!(preferences.language, Language::Pt);
    }

    #[test]
    fn save_then_load_per_user() {
        let dir = tempdir().unwrap();
        let key_values = Arc::new(FileKeyValueStore::open(dir.path()).unwrap());
        let store = PreferenceStore::new(key_values.clone());
        let ana = Email::new_unchecked("ana@example.com");
        let bia = Email::new_unchecked("bia@example.com");
        let preferences = Preferences {
            theme: Theme::Lavender,
            font: Font::PlayfairDisplay,
            language: Language::Es,
        };

        store.save(&ana, &preferences).unwrap();

        assert_eq!(store.load(&ana), Ok(preferences));
        assert_eq!(store.load(&bia), Ok(Preferences::default()));
        assert_eq!(
            key_values.get("makeup_font_ana@example.com"),
            Ok(Some("\"Playfair Display\"".to_owned()))
        );
    }

    #[test]
    fn unreadable_values_fall_back_to_defaults() {
        let dir = tempdir().unwrap();
        let key_values = Arc::new(FileKeyValueStore::open(dir.path()).unwrap());
        let store = PreferenceStore::new(key_values.clone());
        let ana = Email::new_unchecked("ana@example.com");
        key_values
            .set("makeup_theme_ana@example.com", "\"neon\"")
            .unwrap();
        key_values
            .set("makeup_lang_ana@example.com", "\"en\"")
            .unwrap();

        let preferences = store.load(&ana).unwrap();

        assert_eq!(preferences.theme, Theme::Pink);
        assert_eq!(preferences.language, Language::En);
    }

    #[test]
    fn font_stylesheet_url_escapes_spaces() {
        assert_eq!(
            Font::DancingScript.stylesheet_url(),
            "https://fonts.googleapis.com/css2?family=Dancing+Script:wght@400;600&display=swap"
        );
    }

    #[test]
    fn every_theme_has_distinct_accent() {
        let accents = Theme::ALL
            .iter()
            .map(|theme| theme.palette().accent)
            .collect::<std::collections::HashSet<_>>();

        assert_eq!(accents.len(), Theme::ALL.len());
    }
}
