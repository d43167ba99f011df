use std::collections::HashSet;

use ns_core::{Article, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::KeyValueStore;

pub const SAVED_KEY: &str = "newssphere_saved";

/// The part of an article kept when the reader saves it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedArticle {
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub source_name: String,
    #[serde(default)]
    pub published_at: Option<String>,
}

impl From<&Article> for SavedArticle {
    fn from(article: &Article) -> Self {
        let source_name = if article.source_name.is_empty() {
            "Unknown".to_string()
        } else {
            article.source_name.clone()
        };
        Self {
            url: article.url.clone(),
            title: article.title.clone(),
            description: article.description.clone(),
            image_url: article.image_url.clone(),
            source_name,
            published_at: article.published_at.clone(),
        }
    }
}

impl From<SavedArticle> for Article {
    fn from(saved: SavedArticle) -> Self {
        Article {
            url: saved.url,
            title: saved.title,
            description: saved.description,
            image_url: saved.image_url,
            published_at: saved.published_at,
            source_name: saved.source_name,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveToggle {
    Saved,
    Removed,
}

impl SaveToggle {
    /// Toast text shown after the toggle.
    pub fn message(&self) -> &'static str {
        match self {
            SaveToggle::Saved => "Article saved!",
            SaveToggle::Removed => "Article removed from saved",
        }
    }
}

/// Ordered, url-unique list of saved articles, stored as JSON under [`SAVED_KEY`].
///
/// Entries are kept as raw JSON so records written by other versions survive
/// a save/remove cycle untouched. Older versions stored bare URL strings.
pub struct SavedArticles<S> {
    store: S,
}

fn entry_url(entry: &Value) -> Option<&str> {
    let url = match entry {
        Value::String(url) => Some(url.as_str()),
        Value::Object(record) => record.get("url").and_then(Value::as_str),
        _ => None,
    };
    url.filter(|url| !url.is_empty())
}

impl<S: KeyValueStore> SavedArticles<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Unreadable contents count as an empty list.
    fn entries(&self) -> Vec<Value> {
        let raw = match self.store.get(SAVED_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!("⚠️ Could not read saved articles: {}", e);
                return Vec::new();
            }
        };
        match serde_json::from_str::<Vec<Value>>(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("⚠️ Ignoring corrupt saved articles: {}", e);
                Vec::new()
            }
        }
    }

    fn write(&self, entries: &[Value]) -> Result<()> {
        self.store.set(SAVED_KEY, &serde_json::to_string(entries)?)
    }

    pub fn list(&self) -> Vec<SavedArticle> {
        self.entries()
            .into_iter()
            .filter_map(|entry| serde_json::from_value(entry).ok())
            .collect()
    }

    pub fn saved_urls(&self) -> HashSet<String> {
        self.entries()
            .iter()
            .filter_map(entry_url)
            .map(str::to_string)
            .collect()
    }

    pub fn is_saved(&self, url: &str) -> bool {
        self.entries().iter().any(|entry| entry_url(entry) == Some(url))
    }

    /// Appends the article unless its url is already saved.
    pub fn save(&self, article: &Article) -> Result<bool> {
        let mut entries = self.entries();
        if entries.iter().any(|entry| entry_url(entry) == Some(article.url.as_str())) {
            return Ok(false);
        }
        entries.push(serde_json::to_value(SavedArticle::from(article))?);
        self.write(&entries)?;
        Ok(true)
    }

    pub fn remove(&self, url: &str) -> Result<bool> {
        let mut entries = self.entries();
        let before = entries.len();
        entries.retain(|entry| entry_url(entry) != Some(url));
        if entries.len() == before {
            return Ok(false);
        }
        self.write(&entries)?;
        Ok(true)
    }

    pub fn toggle(&self, article: &Article) -> Result<SaveToggle> {
        if self.remove(&article.url)? {
            Ok(SaveToggle::Removed)
        } else {
            self.save(article)?;
            Ok(SaveToggle::Saved)
        }
    }

    pub fn clear(&self) -> Result<()> {
        self.store.remove(SAVED_KEY)
    }
}
