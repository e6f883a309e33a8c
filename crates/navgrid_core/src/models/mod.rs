//! Navigation document, link, and settings models.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;


/// One bookmark on the page.
///
/// Links are only ever created whole and replaced whole; there is no
/// field-level update operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub id: String,
    pub name: String,
    pub url: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub icon: String,
}

/// Payload for creating a link, before defaults are applied.
#[derive(Debug, Clone, Deserialize)]
pub struct NewLinkRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    pub category: Option<String>,
    pub icon: Option<String>,
}

/// Background rendering mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundType {
    #[default]
    Color,
    Image,
}

/// Page-level settings.
///
/// Unknown fields round-trip through `extra` so that partial updates from
/// newer clients are never dropped by older servers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default = "default_background_color")]
    pub background_color: String,
    #[serde(default)]
    pub background_type: BackgroundType,
    #[serde(default = "default_background_opacity")]
    pub background_opacity: f64,
    #[serde(default = "default_user_name")]
    pub user_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_image: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The single persisted unit: all links plus settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NavigationDocument {
    #[serde(default)]
    pub links: Vec<Link>,
    #[serde(default)]
    pub settings: Settings,
}

fn default_category() -> String {
    "main".to_string()
}

fn default_background_color() -> String {
    "#1a1a2e".to_string()
}

fn default_background_opacity() -> f64 {
    0.8
}

fn default_user_name() -> String {
    "个人导航页".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            background_color: default_background_color(),
            background_type: BackgroundType::Color,
            background_opacity: default_background_opacity(),
            user_name: default_user_name(),
            user_avatar: None,
            background_image: None,
            extra: Map::new(),
        }
    }
}

impl Default for NavigationDocument {
    fn default() -> Self {
        Self {
            links: seeded_links(),
            settings: Settings::default(),
        }
    }
}

/// The three seeded links served when no document has been stored yet.
pub fn seeded_links() -> Vec<Link> {
    vec![
        Link {
            id: "1".to_string(),
            name: "GitHub".to_string(),
            url: "https://github.com".to_string(),
            category: "main".to_string(),
            icon: "G".to_string(),
        },
        Link {
            id: "2".to_string(),
            name: "Google".to_string(),
            url: "https://google.com".to_string(),
            category: "main".to_string(),
            icon: "G".to_string(),
        },
        Link {
            id: "3".to_string(),
            name: "MDN Web Docs".to_string(),
            url: "https://developer.mozilla.org".to_string(),
            category: "main".to_string(),
            icon: "MDN".to_string(),
        },
    ]
}

/// Normalize a user-supplied URL and validate it.
///
/// Inputs without an `http` prefix get `http://` prepended before parsing,
/// matching how the page treats bare hostnames.
///
/// # Errors
/// Returns [`crate::StoreError::InvalidLink`] when the normalized value is
/// not an absolute URL.
pub fn normalize_url(input: &str) -> Result<String, crate::StoreError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(crate::StoreError::InvalidLink(
            "link URL must not be empty".to_string(),
        ));
    }
    let candidate = if trimmed.starts_with("http") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    };
    url::Url::parse(&candidate)
        .map_err(|err| crate::StoreError::InvalidLink(format!("invalid URL: {err}")))?;
    Ok(candidate)
}

/// Default icon: uppercased first character of the display name.
pub fn default_icon(name: &str) -> String {
    name.chars()
        .next()
        .map(|c| c.to_uppercase().to_string())
        .unwrap_or_default()
}

impl Link {
    /// Build a link from a creation request, generating an id and applying
    /// category/icon defaults.
    ///
    /// # Errors
    /// Returns [`crate::StoreError::InvalidLink`] when `name` is empty or
    /// `url` does not parse after scheme normalization.
    pub fn from_request(req: NewLinkRequest) -> Result<Self, crate::StoreError> {
        let name = req.name.trim().to_string();
        if name.is_empty() {
            return Err(crate::StoreError::InvalidLink(
                "link name must not be empty".to_string(),
            ));
        }
        let url = normalize_url(&req.url)?;
        let icon = req
            .icon
            .filter(|icon| !icon.trim().is_empty())
            .unwrap_or_else(|| default_icon(&name));
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            name,
            url,
            category: req.category.unwrap_or_else(default_category),
            icon,
        })
    }
}

impl Settings {
    /// Shallow-merge a JSON object into these settings.
    ///
    /// Keys present in `patch` override existing values; keys absent from
    /// `patch` are kept, including unknown ones carried in `extra`.
    ///
    /// # Errors
    /// Returns a serialization error when the merged object no longer
    /// deserializes (for example a non-numeric `backgroundOpacity`), or an
    /// invalid-link error when `backgroundOpacity` falls outside [0, 1].
    pub fn merge_value(&self, patch: &Map<String, Value>) -> Result<Self, crate::StoreError> {
        let mut merged = match serde_json::to_value(self)? {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        for (key, value) in patch {
            merged.insert(key.clone(), value.clone());
        }
        let settings: Settings = serde_json::from_value(Value::Object(merged))?;
        if !(0.0..=1.0).contains(&settings.background_opacity) {
            return Err(crate::StoreError::InvalidLink(
                "backgroundOpacity must be within [0, 1]".to_string(),
            ));
        }
        Ok(settings)
    }
}

impl NavigationDocument {
    /// Remove the link with the given id.
    ///
    /// # Returns
    /// `true` when exactly one link was removed, `false` when the id was
    /// not present. Relative order of the remaining links is unchanged.
    pub fn remove_link(&mut self, id: &str) -> bool {
        let before = self.links.len();
        self.links.retain(|link| link.id != id);
        self.links.len() != before
    }
}
