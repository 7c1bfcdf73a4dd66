//! Recipe extraction from a fetched page.
//!
//! Each field is filled from the first source that yields something:
//! 1. embedded JSON-LD `Recipe` objects,
//! 2. markup heuristics (headings, `class`/`itemprop` names),
//! 3. nothing; the caller decides whether to ask the user.
//!
//! Caps are applied after both tiers ran so a short but real list found by the
//! markup tier is never starved.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::KitchenError;
use crate::html::{clean_text, element_text, strip_site_suffix};
use crate::normalize::{dedup_normalized, norm_whitespace};

pub const MAX_INGREDIENTS: usize = 30;
pub const MAX_INSTRUCTIONS: usize = 20;
pub const FALLBACK_TITLE: &str = "Imported Recipe";

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RecipeExtract {
    pub title: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    /// Minutes, when the page declared a time.
    pub prep_time: Option<u32>,
}

static LD_JSON_SEL: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"script[type="application/ld+json"]"#).unwrap());
static H1_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("h1").unwrap());
static TITLE_CLASS_SEL: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"[class*="recipe-title"], [class*="entry-title"]"#).unwrap()
});
static TITLE_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("title").unwrap());
static INGREDIENT_SEL: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(
        r#"[class*="ingredient"], [itemprop="recipeIngredient"], .recipe-ingredient, .ingredient"#,
    )
    .unwrap()
});
static INSTRUCTION_SEL: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(
        r#"[class*="instruction"], [itemprop="recipeInstructions"], .recipe-instruction, .instruction, [class*="direction"] li, .method li"#,
    )
    .unwrap()
});

/// Pull a recipe out of page HTML. Never fails; missing fields come back empty
/// (the title falls back to [`FALLBACK_TITLE`]).
#[must_use]
pub fn extract_recipe(html: &str) -> RecipeExtract {
    let doc = Html::parse_document(html);

    let mut out = structured_tier(&doc).unwrap_or_default();

    if out.title.is_empty() {
        out.title = markup_title(&doc);
    }
    if out.ingredients.is_empty() {
        out.ingredients = markup_list(&doc, &INGREDIENT_SEL);
    }
    if out.instructions.is_empty() {
        out.instructions = markup_list(&doc, &INSTRUCTION_SEL);
    }

    out.ingredients = dedup_normalized(out.ingredients);
    out.ingredients.truncate(MAX_INGREDIENTS);
    out.instructions.truncate(MAX_INSTRUCTIONS);
    out
}

/* =========================
 * Tier 1: JSON-LD
 * ========================= */

fn structured_tier(doc: &Html) -> Option<RecipeExtract> {
    for (i, node) in doc.select(&LD_JSON_SEL).enumerate() {
        let raw = node.text().collect::<String>();
        let val = match serde_json::from_str::<Value>(raw.trim()) {
            Ok(v) => v,
            Err(e) => {
                let err = KitchenError::ImportParse(e.to_string());
                tracing::debug!(block = i, error = %err, "skipping structured-data block");
                continue;
            }
        };
        if let Some(recipe) = find_recipe(&val) {
            return Some(from_ld(recipe));
        }
    }
    None
}

fn is_recipe(o: &Map<String, Value>) -> bool {
    match o.get("@type") {
        Some(Value::String(s)) => s.eq_ignore_ascii_case("Recipe"),
        Some(Value::Array(a)) => a
            .iter()
            .any(|x| x.as_str().is_some_and(|s| s.eq_ignore_ascii_case("Recipe"))),
        _ => false,
    }
}

/// First `Recipe` object: the value itself, an element of a list, or inside `@graph`.
fn find_recipe(v: &Value) -> Option<&Map<String, Value>> {
    match v {
        Value::Object(o) => {
            if is_recipe(o) {
                return Some(o);
            }
            o.get("@graph").and_then(find_recipe)
        }
        Value::Array(a) => a.iter().find_map(find_recipe),
        _ => None,
    }
}

fn from_ld(o: &Map<String, Value>) -> RecipeExtract {
    let title = o
        .get("name")
        .and_then(Value::as_str)
        .map(clean_text)
        .unwrap_or_default();

    let ingredients = o
        .get("recipeIngredient")
        .or_else(|| o.get("ingredients"))
        .map(string_list)
        .unwrap_or_default();

    let mut instructions = Vec::new();
    if let Some(v) = o.get("recipeInstructions") {
        collect_steps(v, &mut instructions);
    }

    let prep_time = o
        .get("totalTime")
        .and_then(duration_minutes)
        .or_else(|| o.get("prepTime").and_then(duration_minutes));

    RecipeExtract {
        title,
        ingredients,
        instructions,
        prep_time,
    }
}

fn string_list(v: &Value) -> Vec<String> {
    match v {
        Value::Array(items) => items
            .iter()
            .filter_map(|x| match x {
                Value::String(s) => Some(clean_text(s)),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .filter(|s| !s.is_empty())
            .collect(),
        Value::String(s) => s
            .lines()
            .map(clean_text)
            .filter(|l| !l.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}

/// Steps are strings or `HowToStep` objects; `HowToSection`s nest more steps.
fn collect_steps(v: &Value, out: &mut Vec<String>) {
    match v {
        Value::String(s) => out.extend(s.lines().map(clean_text).filter(|l| !l.is_empty())),
        Value::Array(items) => {
            for item in items {
                collect_steps(item, out);
            }
        }
        Value::Object(o) => {
            if let Some(nested) = o.get("itemListElement") {
                collect_steps(nested, out);
                return;
            }
            let step = o
                .get("text")
                .or_else(|| o.get("name"))
                .and_then(Value::as_str)
                .map(clean_text)
                .unwrap_or_default();
            if !step.is_empty() {
                out.push(step);
            }
        }
        _ => {}
    }
}

/// First run of digits in a duration, read as minutes: "PT45M" -> 45,
/// "45 minutes" -> 45. "PT1H30M" reads as 1; hours are not converted.
fn duration_minutes(v: &Value) -> Option<u32> {
    static DIGITS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9]+").unwrap());
    let s = match v {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    DIGITS_RE
        .find(&s)
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .filter(|m| *m > 0)
}

/* =========================
 * Tier 2: markup heuristics
 * ========================= */

fn first_text(doc: &Html, sel: &Selector) -> Option<String> {
    doc.select(sel)
        .next()
        .map(|el| element_text(&el))
        .filter(|t| !t.is_empty())
}

fn markup_title(doc: &Html) -> String {
    first_text(doc, &H1_SEL)
        .or_else(|| first_text(doc, &TITLE_CLASS_SEL))
        .or_else(|| first_text(doc, &TITLE_SEL).map(|t| strip_site_suffix(&t)))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| FALLBACK_TITLE.to_string())
}

const CONTAINER_TAGS: &[&str] = &["ul", "ol", "div", "section", "article", "table", "tbody"];

fn is_container(el: &ElementRef<'_>) -> bool {
    CONTAINER_TAGS.contains(&el.value().name())
}

/// Text of every element matching `sel`, one entry per item.
///
/// Class-name heuristics match both a list and its entries
/// (`ul.ingredients > li.ingredient > span.ingredient-name`). A matching
/// container with matching children is skipped in favour of the children, and
/// matches nested inside an already-taken entry are parts of it.
fn markup_list(doc: &Html, sel: &Selector) -> Vec<String> {
    let matches: Vec<ElementRef<'_>> = doc.select(sel).collect();
    let ids: HashSet<_> = matches.iter().map(|el| el.id()).collect();

    let mut out = Vec::new();
    for el in &matches {
        let has_matching_child = el.descendants().skip(1).any(|n| ids.contains(&n.id()));
        if has_matching_child && is_container(el) {
            continue;
        }
        let inside_taken_item = el
            .ancestors()
            .filter(|a| ids.contains(&a.id()))
            .filter_map(ElementRef::wrap)
            .any(|a| !is_container(&a));
        if inside_taken_item {
            continue;
        }
        let text = norm_whitespace(&element_text(el));
        if !text.is_empty() {
            out.push(text);
        }
    }
    out
}
