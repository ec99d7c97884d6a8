//! Data models for copysync
//!
//! Defines the core data structures: `CopyItem`, `Page` and `RemoteConfig`.
//! An item's sync status is never stored; it is derived from the edited and
//! synced text every time it is asked for.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use uuid::Uuid;

/// Sync status of a copy item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    /// Never synced (synced text is empty)
    New,
    /// Edited text differs from the last synced text
    Modified,
    /// Edited text matches the last synced text
    Synced,
}

impl ItemStatus {
    /// Classify an item from its edited and synced text
    pub fn classify(edited_text: &str, synced_text: &str) -> Self {
        if synced_text.is_empty() {
            ItemStatus::New
        } else if edited_text == synced_text {
            ItemStatus::Synced
        } else {
            ItemStatus::Modified
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::New => "new",
            ItemStatus::Modified => "modified",
            ItemStatus::Synced => "synced",
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single piece of copy, identified in the remote file by its dotted key
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CopyItem {
    /// Unique identifier
    pub id: String,
    /// Dotted key used as the property name in the remote JSON file
    pub key: String,
    /// Current, possibly unsynced text
    #[serde(default)]
    pub edited_text: String,
    /// Text as of the last successful sync
    #[serde(default)]
    pub synced_text: String,
    /// When this item was last synced
    #[serde(default)]
    pub last_synced_at: Option<DateTime<Utc>>,
}

impl CopyItem {
    /// Create a new, never-synced item
    pub fn new(key: impl Into<String>, text: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), key, text)
    }

    /// Create an item with a specific ID
    pub fn with_id(id: impl Into<String>, key: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            key: key.into(),
            edited_text: text.into(),
            synced_text: String::new(),
            last_synced_at: None,
        }
    }

    /// Derived sync status
    pub fn status(&self) -> ItemStatus {
        ItemStatus::classify(&self.edited_text, &self.synced_text)
    }

    /// Replace the edited text
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.edited_text = text.into();
    }

    /// Replace the key
    pub fn set_key(&mut self, key: impl Into<String>) {
        self.key = key.into();
    }
}

// Serialized by hand so the derived status travels with the item. It is
// ignored on the way back in.
impl Serialize for CopyItem {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("CopyItem", 6)?;
        state.serialize_field("id", &self.id)?;
        state.serialize_field("key", &self.key)?;
        state.serialize_field("editedText", &self.edited_text)?;
        state.serialize_field("syncedText", &self.synced_text)?;
        state.serialize_field("lastSyncedAt", &self.last_synced_at)?;
        state.serialize_field("status", &self.status())?;
        state.end()
    }
}

/// A named collection of copy items mapped to one remote JSON file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    /// Unique identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// File path relative to the configured base path
    pub path: String,
    /// Items in display order
    #[serde(default)]
    pub items: Vec<CopyItem>,
    /// When any item of this page was last synced
    #[serde(default)]
    pub last_synced_at: Option<DateTime<Utc>>,
}

impl Page {
    /// Create a new empty page
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), name, path)
    }

    /// Create a page with a specific ID
    pub fn with_id(
        id: impl Into<String>,
        name: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            path: path.into(),
            items: Vec::new(),
            last_synced_at: None,
        }
    }

    /// Derive a file path from a display name ("Home Page" -> "home-page.json")
    pub fn default_path(name: &str) -> String {
        let slug: Vec<String> = name
            .split(|c: char| !c.is_alphanumeric())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_lowercase())
            .collect();
        if slug.is_empty() {
            "page.json".to_string()
        } else {
            format!("{}.json", slug.join("-"))
        }
    }

    /// Get an item by ID
    pub fn item(&self, id: &str) -> Option<&CopyItem> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Get a mutable item by ID
    pub fn item_mut(&mut self, id: &str) -> Option<&mut CopyItem> {
        self.items.iter_mut().find(|i| i.id == id)
    }

    /// Append an item and return its ID
    pub fn add_item(&mut self, item: CopyItem) -> String {
        let id = item.id.clone();
        self.items.push(item);
        id
    }

    /// Remove an item, returning it if it existed
    pub fn remove_item(&mut self, id: &str) -> Option<CopyItem> {
        let pos = self.items.iter().position(|i| i.id == id)?;
        Some(self.items.remove(pos))
    }

    /// Number of items that are not synced
    pub fn pending_changes(&self) -> usize {
        self.items
            .iter()
            .filter(|i| i.status() != ItemStatus::Synced)
            .count()
    }

    /// Keys used by more than one item, in first-seen order
    ///
    /// Duplicates collide in the remote file; the last item wins.
    pub fn duplicate_keys(&self) -> Vec<String> {
        let mut seen: Vec<&str> = Vec::new();
        let mut duplicates: Vec<String> = Vec::new();
        for item in &self.items {
            if seen.contains(&item.key.as_str()) {
                if !duplicates.contains(&item.key) {
                    duplicates.push(item.key.clone());
                }
            } else {
                seen.push(&item.key);
            }
        }
        duplicates
    }
}

/// Connection parameters for the GitHub repository holding the copy files
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteConfig {
    pub owner: String,
    pub repo: String,
    #[serde(default = "default_branch")]
    pub branch: String,
    /// Access token. Never printed by `Debug`.
    pub token: String,
    #[serde(default)]
    pub base_path: String,
}

fn default_branch() -> String {
    "main".to_string()
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            owner: String::new(),
            repo: String::new(),
            branch: default_branch(),
            token: String::new(),
            base_path: "copy/".to_string(),
        }
    }
}

impl fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteConfig")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("branch", &self.branch)
            .field("token", &mask_token(&self.token))
            .field("base_path", &self.base_path)
            .finish()
    }
}

impl RemoteConfig {
    /// Names of the required fields that are blank
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.owner.trim().is_empty() {
            missing.push("owner");
        }
        if self.repo.trim().is_empty() {
            missing.push("repo");
        }
        if self.token.trim().is_empty() {
            missing.push("token");
        }
        missing
    }

    /// Whether owner, repo and token are all set
    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Repository path of a page file under the base path
    pub fn full_path(&self, page_path: &str) -> String {
        let page_path = page_path.trim_start_matches('/');
        let base = self.base_path.trim_matches('/');
        if base.is_empty() {
            page_path.to_string()
        } else {
            format!("{}/{}", base, page_path)
        }
    }

    /// Token with everything but the last four characters hidden
    pub fn masked_token(&self) -> String {
        mask_token(&self.token)
    }
}

fn mask_token(token: &str) -> String {
    if token.is_empty() {
        return String::new();
    }
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{}", tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert_eq!(ItemStatus::classify("", ""), ItemStatus::New);
        assert_eq!(ItemStatus::classify("Hello", ""), ItemStatus::New);
        assert_eq!(ItemStatus::classify("Hello", "Hello"), ItemStatus::Synced);
        assert_eq!(ItemStatus::classify("Hello", "Hi"), ItemStatus::Modified);
        // Emptying the text of a synced item is a modification
        assert_eq!(ItemStatus::classify("", "Hi"), ItemStatus::Modified);
    }

    #[test]
    fn test_status_follows_text_edits() {
        let mut item = CopyItem::new("hero.title", "Welcome");
        assert_eq!(item.status(), ItemStatus::New);

        item.synced_text = "Welcome".to_string();
        assert_eq!(item.status(), ItemStatus::Synced);

        item.set_text("Welcome back");
        assert_eq!(item.status(), ItemStatus::Modified);

        item.set_text("Welcome");
        assert_eq!(item.status(), ItemStatus::Synced);
    }

    #[test]
    fn test_item_serialization_includes_status() {
        let mut item = CopyItem::with_id("1-1", "hero.title", "New text");
        item.synced_text = "Old text".to_string();

        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["editedText"], "New text");
        assert_eq!(json["syncedText"], "Old text");
        assert_eq!(json["status"], "modified");
        assert!(json["lastSyncedAt"].is_null());
    }

    #[test]
    fn test_item_deserialization_ignores_stored_status() {
        let json = r#"{
            "id": "1",
            "key": "cta.primary",
            "editedText": "Get Started Free",
            "syncedText": "Get Started Free",
            "lastSyncedAt": null,
            "status": "new"
        }"#;
        let item: CopyItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.status(), ItemStatus::Synced);
    }

    #[test]
    fn test_page_serialization() {
        let mut page = Page::with_id("1", "Home Page", "home.json");
        page.add_item(CopyItem::new("hero.title", "Hello"));
        let json = serde_json::to_string(&page).unwrap();
        let parsed: Page = serde_json::from_str(&json).unwrap();
        assert_eq!(page, parsed);
    }

    #[test]
    fn test_page_item_management() {
        let mut page = Page::new("Home", "home.json");
        let id = page.add_item(CopyItem::new("hero.title", "Hello"));
        page.add_item(CopyItem::new("hero.subtitle", "World"));
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.pending_changes(), 2);

        page.item_mut(&id).unwrap().set_key("hero.heading");
        assert_eq!(page.item(&id).unwrap().key, "hero.heading");

        let removed = page.remove_item(&id).unwrap();
        assert_eq!(removed.key, "hero.heading");
        assert!(page.item(&id).is_none());
        assert!(page.remove_item(&id).is_none());
    }

    #[test]
    fn test_duplicate_keys() {
        let mut page = Page::new("Home", "home.json");
        page.add_item(CopyItem::new("a", "1"));
        page.add_item(CopyItem::new("b", "2"));
        page.add_item(CopyItem::new("a", "3"));
        page.add_item(CopyItem::new("a", "4"));
        assert_eq!(page.duplicate_keys(), vec!["a".to_string()]);
    }

    #[test]
    fn test_default_path() {
        assert_eq!(Page::default_path("Home Page"), "home-page.json");
        assert_eq!(Page::default_path("  Pricing!! "), "pricing.json");
        assert_eq!(Page::default_path("???"), "page.json");
    }

    #[test]
    fn test_remote_config_missing_fields() {
        let config = RemoteConfig::default();
        assert_eq!(config.missing_fields(), vec!["owner", "repo", "token"]);
        assert!(!config.is_complete());

        let config = RemoteConfig {
            owner: "acme".to_string(),
            repo: "site".to_string(),
            token: "  ".to_string(),
            ..RemoteConfig::default()
        };
        assert_eq!(config.missing_fields(), vec!["token"]);
    }

    #[test]
    fn test_full_path() {
        let mut config = RemoteConfig::default();
        assert_eq!(config.full_path("home.json"), "copy/home.json");
        assert_eq!(config.full_path("/home.json"), "copy/home.json");

        config.base_path = "i18n/en".to_string();
        assert_eq!(config.full_path("home.json"), "i18n/en/home.json");

        config.base_path = String::new();
        assert_eq!(config.full_path("home.json"), "home.json");
    }

    #[test]
    fn test_debug_masks_token() {
        let config = RemoteConfig {
            owner: "acme".to_string(),
            repo: "site".to_string(),
            token: "ghp_secret1234".to_string(),
            ..RemoteConfig::default()
        };
        let debug = format!("{:?}", config);
        assert!(!debug.contains("ghp_secret"));
        assert!(debug.contains("****1234"));
        assert_eq!(config.masked_token(), "****1234");
    }

    #[test]
    fn test_remote_config_defaults_on_deserialize() {
        let json = r#"{"owner":"acme","repo":"site","token":"t"}"#;
        let config: RemoteConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.branch, "main");
        assert_eq!(config.base_path, "");
    }
}
