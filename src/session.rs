//! The two owned aggregates of a session: pantry and recipe book.
//!
//! Both are plain in-memory collections. Handlers mutate them under the
//! [`crate::models::AppState::kitchen`] lock and then write the whole snapshot
//! back with [`Kitchen::persist_pantry`] / [`Kitchen::persist_recipes`]. A failed
//! write is logged and the in-memory change stands; handlers pass the outcome
//! on to the client as a warning header.

use serde::de::DeserializeOwned;

use crate::error::KitchenError;
use crate::ingredient_parser::{QuickRecipe, clean_ingredients};
use crate::models::{
    Category, DEFAULT_PREP_MINUTES, NewRecipe, Recipe, StoredRecipe, UpdateRecipe, recipe_id,
};
use crate::store::{KvStore, PANTRY_KEY, RECIPES_KEY};

/* =========================
 * Pantry
 * ========================= */

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pantry {
    items: Vec<String>,
}

impl Pantry {
    #[must_use]
    pub fn new(items: Vec<String>) -> Self {
        Self { items }
    }

    #[must_use]
    pub fn items(&self) -> &[String] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Split typed text on commas and newlines and append every non-blank piece.
    /// Near-duplicates of existing entries are kept.
    pub fn add_manual(&mut self, text: &str) -> Vec<String> {
        let added: Vec<String> = text
            .split([',', '\n'])
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        self.items.extend(added.iter().cloned());
        added
    }

    /// Append machine-detected items, skipping exact duplicates.
    pub fn add_detected<I: IntoIterator<Item = String>>(&mut self, detected: I) -> Vec<String> {
        let mut added = Vec::new();
        for item in detected {
            let item = item.trim().to_string();
            if item.is_empty() || self.items.contains(&item) {
                continue;
            }
            self.items.push(item.clone());
            added.push(item);
        }
        added
    }

    /// Remove every entry equal to `item`.
    ///
    /// # Errors
    /// `NotFound` when nothing matched.
    pub fn remove(&mut self, item: &str) -> Result<usize, KitchenError> {
        let before = self.items.len();
        self.items.retain(|i| i != item);
        match before - self.items.len() {
            0 => Err(KitchenError::NotFound(format!("pantry item {item:?}"))),
            n => Ok(n),
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

/* =========================
 * Recipe book
 * ========================= */

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipeBook {
    recipes: Vec<Recipe>,
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

fn validation(msg: &str) -> KitchenError {
    KitchenError::Validation(msg.to_string())
}

fn positive_minutes(p: i64) -> Option<u32> {
    u32::try_from(p).ok().filter(|m| *m > 0)
}

impl RecipeBook {
    #[must_use]
    pub fn new(recipes: Vec<Recipe>) -> Self {
        Self { recipes }
    }

    #[must_use]
    pub fn all(&self) -> &[Recipe] {
        &self.recipes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Recipe> {
        self.recipes.iter().find(|r| r.id == id)
    }

    /// Recipes in insertion order, optionally limited to one category.
    #[must_use]
    pub fn list(&self, category: Option<Category>) -> Vec<Recipe> {
        self.recipes
            .iter()
            .filter(|r| category.is_none_or(|c| r.category == c))
            .cloned()
            .collect()
    }

    fn unique_id(&self, name: &str) -> String {
        let base = recipe_id(name, now_millis());
        if self.get(&base).is_none() {
            return base;
        }
        (2..)
            .map(|n| format!("{base}-{n}"))
            .find(|candidate| self.get(candidate).is_none())
            .unwrap_or(base)
    }

    /// Validate and append a manually entered recipe.
    ///
    /// # Errors
    /// `Validation` when the name, the ingredients or a positive prep time is
    /// missing. Nothing is added in that case.
    pub fn add(&mut self, new: NewRecipe) -> Result<Recipe, KitchenError> {
        let name = new
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .ok_or_else(|| validation("recipe name is required"))?;
        let ingredients = new
            .ingredients
            .map(|i| clean_ingredients(&i.into_text()))
            .filter(|i| !i.is_empty())
            .ok_or_else(|| validation("at least one ingredient is required"))?;
        let prep_time = new
            .prep_time
            .and_then(positive_minutes)
            .ok_or_else(|| validation("prep time must be a positive number of minutes"))?;

        let mut recipe = Recipe {
            id: self.unique_id(&name),
            name,
            category: Category::parse_lenient(new.category.as_deref()),
            ingredients,
            instructions: new.instructions.map(|i| i.into_lines()).unwrap_or_default(),
            prep_time,
            approved: true,
            notes: new.notes.unwrap_or_default(),
            source_url: None,
            source_name: None,
        };
        recipe.set_source(new.source_url);

        self.recipes.push(recipe.clone());
        Ok(recipe)
    }

    /// Append a recipe roughed out of pasted text.
    pub fn add_quick(&mut self, quick: QuickRecipe, source_url: Option<String>) -> Recipe {
        let mut recipe = Recipe {
            id: self.unique_id(&quick.name),
            name: quick.name,
            category: Category::Dinner,
            ingredients: quick.ingredients,
            instructions: vec!["See original recipe for detailed instructions".to_string()],
            prep_time: DEFAULT_PREP_MINUTES,
            approved: true,
            notes: "Quick-added recipe".to_string(),
            source_url: None,
            source_name: None,
        };
        recipe.set_source(source_url);
        self.recipes.push(recipe.clone());
        recipe
    }

    /// Append an already-built record (imports). The id is re-derived if taken.
    pub fn insert(&mut self, mut recipe: Recipe) -> Recipe {
        if recipe.id.trim().is_empty() || self.get(&recipe.id).is_some() {
            recipe.id = self.unique_id(&recipe.name);
        }
        self.recipes.push(recipe.clone());
        recipe
    }

    /// Apply an edit. Fields left out keep their value.
    ///
    /// # Errors
    /// `NotFound` for an unknown id, `Validation` when an edit would blank the
    /// name or ingredients or set a non-positive prep time.
    pub fn update(&mut self, id: &str, up: UpdateRecipe) -> Result<Recipe, KitchenError> {
        let recipe = self
            .recipes
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| KitchenError::NotFound(format!("recipe {id}")))?;

        // validate everything before touching the record
        let name = match up.name {
            Some(n) if n.trim().is_empty() => return Err(validation("recipe name is required")),
            Some(n) => Some(n.trim().to_string()),
            None => None,
        };
        let ingredients = match up.ingredients {
            Some(i) => {
                let cleaned = clean_ingredients(&i.into_text());
                if cleaned.is_empty() {
                    return Err(validation("at least one ingredient is required"));
                }
                Some(cleaned)
            }
            None => None,
        };
        let prep_time = match up.prep_time {
            Some(p) => Some(positive_minutes(p).ok_or_else(|| {
                validation("prep time must be a positive number of minutes")
            })?),
            None => None,
        };

        if let Some(n) = name {
            recipe.name = n;
        }
        if let Some(c) = up.category {
            recipe.category = Category::parse_lenient(Some(&c));
        }
        if let Some(i) = ingredients {
            recipe.ingredients = i;
        }
        if let Some(i) = up.instructions {
            recipe.instructions = i.into_lines();
        }
        if let Some(p) = prep_time {
            recipe.prep_time = p;
        }
        if let Some(n) = up.notes {
            recipe.notes = n;
        }
        Ok(recipe.clone())
    }

    /// Flip the approval flag.
    ///
    /// # Errors
    /// `NotFound` for an unknown id.
    pub fn toggle_approval(&mut self, id: &str) -> Result<Recipe, KitchenError> {
        let recipe = self
            .recipes
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| KitchenError::NotFound(format!("recipe {id}")))?;
        recipe.approved = !recipe.approved;
        Ok(recipe.clone())
    }

    /// # Errors
    /// `NotFound` for an unknown id.
    pub fn delete(&mut self, id: &str) -> Result<Recipe, KitchenError> {
        let idx = self
            .recipes
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| KitchenError::NotFound(format!("recipe {id}")))?;
        Ok(self.recipes.remove(idx))
    }

    pub fn clear(&mut self) {
        self.recipes.clear();
    }
}

/* =========================
 * Kitchen: load / persist
 * ========================= */

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Kitchen {
    pub pantry: Pantry,
    pub recipes: RecipeBook,
}

/// Read one snapshot. Absent keys are empty; malformed ones are reported and
/// treated as empty. A failed read is an error, so an intact snapshot is never
/// overwritten by an empty collection.
async fn load_snapshot<T: DeserializeOwned + Default>(
    store: &KvStore,
    key: &str,
) -> Result<T, KitchenError> {
    let Some(raw) = store.get(key).await? else {
        return Ok(T::default());
    };
    match serde_json::from_str(&raw) {
        Ok(v) => Ok(v),
        Err(e) => {
            let err = KitchenError::StorageCorrupt {
                key: key.to_string(),
                reason: e.to_string(),
            };
            tracing::warn!(error = %err, "resetting collection");
            Ok(T::default())
        }
    }
}

impl Kitchen {
    /// Load both aggregates. Malformed snapshots come back empty.
    ///
    /// # Errors
    /// `Storage` when the store can't be read.
    pub async fn load(store: &KvStore) -> Result<Self, KitchenError> {
        let items: Vec<String> = load_snapshot(store, PANTRY_KEY).await?;
        let rows: Vec<StoredRecipe> = load_snapshot(store, RECIPES_KEY).await?;
        let recipes: Vec<Recipe> = rows.into_iter().map(Recipe::from).collect();
        tracing::info!(
            pantry = items.len(),
            recipes = recipes.len(),
            "kitchen loaded"
        );
        Ok(Self {
            pantry: Pantry::new(items),
            recipes: RecipeBook::new(recipes),
        })
    }

    /// Write the pantry snapshot. Returns whether the write landed.
    pub async fn persist_pantry(&self, store: &KvStore) -> bool {
        persist(store, PANTRY_KEY, &self.pantry.items).await
    }

    /// Write the recipe snapshot. Returns whether the write landed.
    pub async fn persist_recipes(&self, store: &KvStore) -> bool {
        persist(store, RECIPES_KEY, &self.recipes.recipes).await
    }

    /// Clear storage and both aggregates.
    ///
    /// # Errors
    /// Propagates the storage error; memory is cleared regardless.
    pub async fn reset(&mut self, store: &KvStore) -> Result<(), KitchenError> {
        self.pantry.clear();
        self.recipes.clear();
        store.clear().await?;
        Ok(())
    }
}

async fn persist<T: serde::Serialize + ?Sized>(store: &KvStore, key: &str, value: &T) -> bool {
    let json = match serde_json::to_string(value) {
        Ok(j) => j,
        Err(e) => {
            tracing::warn!(key, error = %e, "serializing snapshot failed");
            return false;
        }
    };
    match store.set(key, &json).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(key, error = %e, "persisting snapshot failed; memory and storage now differ");
            false
        }
    }
}
