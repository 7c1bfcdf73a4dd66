use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::config::Config;
use crate::detect::{ImageToItems, SimulatedDetector};
use crate::normalize::dedup_normalized;
use crate::session::Kitchen;
use crate::store::KvStore;

/* ---------- App state ---------- */
#[derive(Clone)]
pub struct AppState {
    pub store: KvStore,
    /// Pantry and recipe book; mutate and persist while holding the lock.
    pub kitchen: Arc<Mutex<Kitchen>>,
    /// Held for the duration of one import; a second import is turned away.
    pub import_gate: Arc<Mutex<()>>,
    pub detector: Arc<dyn ImageToItems>,
    pub http: reqwest::Client,
    pub config: Config,
}

impl AppState {
    /// Wire up state around an already-loaded kitchen, using the simulated detector.
    ///
    /// # Errors
    /// Fails if the HTTP client can't be built.
    pub fn new(store: KvStore, kitchen: Kitchen, config: Config) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.import_timeout())
            .build()?;
        Ok(Self {
            store,
            kitchen: Arc::new(Mutex::new(kitchen)),
            import_gate: Arc::new(Mutex::new(())),
            detector: Arc::new(SimulatedDetector::default()),
            http,
            config,
        })
    }
}

/* ---------- Recipe ---------- */

pub const DEFAULT_PREP_MINUTES: u32 = 30;

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq, Default, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Breakfast,
    Lunch,
    #[default]
    Dinner,
    Snack,
    Dessert,
}

impl Category {
    pub const ALL: &'static [Self] = &[
        Self::Breakfast,
        Self::Lunch,
        Self::Dinner,
        Self::Snack,
        Self::Dessert,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Breakfast => "breakfast",
            Self::Lunch => "lunch",
            Self::Dinner => "dinner",
            Self::Snack => "snack",
            Self::Dessert => "dessert",
        }
    }

    /// Exact (case-insensitive) category name, if it is one.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim().to_ascii_lowercase();
        Self::ALL.iter().copied().find(|c| c.as_str() == s)
    }

    /// Unknown or missing names fall back to dinner.
    #[must_use]
    pub fn parse_lenient(s: Option<&str>) -> Self {
        s.and_then(Self::parse).unwrap_or_default()
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(d)?;
        Ok(Self::parse_lenient(raw.as_deref()))
    }
}

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: String,
    pub name: String,
    pub category: Category,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub prep_time: u32,
    pub approved: bool,
    pub notes: String,
    #[serde(rename = "sourceURL")]
    pub source_url: Option<String>,
    pub source_name: Option<String>,
}

impl Recipe {
    /// Attach provenance; the display name is derived from the URL host.
    pub fn set_source(&mut self, url: Option<String>) {
        let url = url.map(|u| u.trim().to_string()).filter(|u| !u.is_empty());
        self.source_name = url.as_deref().map(source_name_for);
        self.source_url = url;
    }
}

/// `https://www.example.com/x` -> `example.com`; unparsable URLs get a generic label.
#[must_use]
pub fn source_name_for(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .map_or_else(
            || "External Recipe".to_string(),
            |h| h.strip_prefix("www.").map_or_else(|| h.clone(), str::to_string),
        )
}

/// Lower-cased name with whitespace runs turned into dashes, plus a millisecond stamp.
#[must_use]
pub fn recipe_id(name: &str, millis: i64) -> String {
    let slug = name
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-");
    format!("{slug}-{millis}")
}

/* ---------- Stored snapshot row ---------- */

/// Recipe as found in a persisted snapshot. Older snapshots miss fields or
/// carry categories that no longer exist; [`Recipe::from`] fills them in.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct StoredRecipe {
    pub id: Option<String>,
    pub name: Option<String>,
    pub category: Category,
    pub ingredients: Option<Vec<String>>,
    pub instructions: Option<Vec<String>>,
    pub prep_time: Option<i64>,
    pub approved: Option<bool>,
    pub notes: Option<String>,
    #[serde(rename = "sourceURL")]
    pub source_url: Option<String>,
    pub source_name: Option<String>,
}

impl From<StoredRecipe> for Recipe {
    fn from(r: StoredRecipe) -> Self {
        let name = r
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "Untitled recipe".to_string());
        let id = r
            .id
            .filter(|i| !i.trim().is_empty())
            .unwrap_or_else(|| recipe_id(&name, chrono::Utc::now().timestamp_millis()));
        let prep_time = r
            .prep_time
            .and_then(|p| u32::try_from(p).ok())
            .filter(|p| *p > 0)
            .unwrap_or(DEFAULT_PREP_MINUTES);
        let source_url = r.source_url.filter(|u| !u.trim().is_empty());
        let source_name = source_url.as_ref().map(|u| {
            r.source_name
                .clone()
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| source_name_for(u))
        });

        Self {
            id,
            name,
            category: r.category,
            ingredients: dedup_normalized(r.ingredients.unwrap_or_default()),
            instructions: r.instructions.unwrap_or_default(),
            prep_time,
            approved: r.approved.unwrap_or(true),
            notes: r.notes.unwrap_or_default(),
            source_url,
            source_name,
        }
    }
}

/* ---------- API models ---------- */

/// Free text or an explicit list; lists are joined one entry per line.
#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
pub enum TextOrList {
    Text(String),
    List(Vec<String>),
}

impl TextOrList {
    #[must_use]
    pub fn into_text(self) -> String {
        match self {
            Self::Text(s) => s,
            Self::List(v) => v.join("\n"),
        }
    }

    /// One entry per non-blank line.
    #[must_use]
    pub fn into_lines(self) -> Vec<String> {
        self.into_text()
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct NewRecipe {
    pub name: Option<String>,
    pub category: Option<String>,
    pub ingredients: Option<TextOrList>,
    #[serde(default)]
    pub instructions: Option<TextOrList>,
    pub prep_time: Option<i64>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(rename = "sourceURL")]
    pub source_url: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRecipe {
    pub name: Option<String>,
    pub category: Option<String>,
    pub ingredients: Option<TextOrList>,
    pub instructions: Option<TextOrList>,
    pub prep_time: Option<i64>,
    pub notes: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct QuickAdd {
    pub text: String,
    #[serde(rename = "sourceURL")]
    pub source_url: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct ImportFromUrlReq {
    pub url: String,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct RecipeFilter {
    pub category: Option<String>,
}

/* ---------- Pantry ---------- */

#[derive(Deserialize, Debug)]
pub struct AddPantryItems {
    /// Comma- or newline-separated item names.
    pub items: TextOrList,
}

#[cfg(test)]
pub(crate) fn test_recipe(name: &str, ingredients: &[&str]) -> Recipe {
    Recipe {
        id: recipe_id(name, 0),
        name: name.to_string(),
        category: Category::Dinner,
        ingredients: ingredients.iter().map(|s| (*s).to_string()).collect(),
        instructions: Vec::new(),
        prep_time: DEFAULT_PREP_MINUTES,
        approved: true,
        notes: String::new(),
        source_url: None,
        source_name: None,
    }
}
