//! Shared data types for the application.
//!
//! These mirror the records served by the recipe service. Wire names that
//! differ from Rust naming are mapped with serde attributes.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::path::PathBuf;

pub type RecipeId = String;
pub type AlbumId = String;

/// A recipe as served by the API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    #[serde(rename = "_id")]
    pub id: RecipeId,
    #[serde(default)]
    pub title: String,
    /// Username of the owner.
    #[serde(rename = "userId", default)]
    pub user_id: String,
    #[serde(default)]
    pub time: CookTime,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "nullable_list")]
    pub ingredients: Vec<String>,
    #[serde(default, deserialize_with = "nullable_list")]
    pub steps: Vec<String>,
    #[serde(default, deserialize_with = "nullable_list")]
    pub tags: Vec<String>,
    #[serde(rename = "imageURL", default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Recipe {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

fn nullable_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Time to cook in minutes, kept exactly as the service sent it.
///
/// Older records store free text such as `"45 min"`, newer ones a number.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CookTime(String);

impl CookTime {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn from_minutes(minutes: u32) -> Self {
        Self(minutes.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Leading integer of the raw value, if there is one.
    ///
    /// `"45"` and `" 45 min"` both yield 45; `"abc"` yields `None`. Values
    /// past `i64::MAX` clamp to it.
    pub fn minutes(&self) -> Option<i64> {
        let text = self.0.trim_start();
        let (negative, rest) = match text.as_bytes().first() {
            Some(b'-') => (true, &text[1..]),
            Some(b'+') => (false, &text[1..]),
            _ => (false, text),
        };
        let digits: &str = {
            let end = rest
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(rest.len());
            &rest[..end]
        };
        if digits.is_empty() {
            return None;
        }
        // Overlong digit runs saturate instead of failing.
        let value = digits.bytes().fold(0i64, |acc, d| {
            acc.saturating_mul(10).saturating_add(i64::from(d - b'0'))
        });
        Some(if negative { -value } else { value })
    }

    /// Human-readable form, e.g. `"1 minute"` or `"45 minutes"`.
    pub fn display(&self) -> String {
        let raw = self.0.trim();
        if raw.is_empty() {
            return String::new();
        }
        if raw.contains("minute") || raw.contains("hour") || raw.contains("hr") {
            return raw.to_string();
        }
        match self.minutes() {
            Some(1) => "1 minute".to_string(),
            Some(n) => format!("{n} minutes"),
            None => format!("{raw} minutes"),
        }
    }
}

impl<'de> Deserialize<'de> for CookTime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = match Option::<Value>::deserialize(deserializer)? {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s,
            Some(Value::Number(n)) => match (n.as_i64(), n.as_f64()) {
                (Some(i), _) => i.to_string(),
                (None, Some(f)) => f.to_string(),
                _ => n.to_string(),
            },
            Some(other) => other.to_string(),
        };
        Ok(Self(raw))
    }
}

/// Reference from an album to a recipe.
///
/// The service returns album entries either with the recipe populated or
/// with only its identifier; both are normalised into this type on ingest.
#[derive(Debug, Clone, PartialEq)]
pub enum RecipeRef {
    Unresolved(RecipeId),
    Resolved(Box<Recipe>),
}

impl RecipeRef {
    pub fn id(&self) -> &str {
        match self {
            RecipeRef::Unresolved(id) => id,
            RecipeRef::Resolved(recipe) => &recipe.id,
        }
    }

    pub fn recipe(&self) -> Option<&Recipe> {
        match self {
            RecipeRef::Resolved(recipe) => Some(recipe),
            RecipeRef::Unresolved(_) => None,
        }
    }

    /// Normalise one wire element of an album's `recipes` array.
    ///
    /// Returns `None` when the entry points at a deleted recipe.
    pub fn from_wire(value: &Value) -> Option<RecipeRef> {
        match value {
            Value::String(id) => Some(RecipeRef::Unresolved(id.clone())),
            Value::Object(map) => match map.get("recipeId") {
                Some(target) => Self::from_target(target),
                // Entry is itself a populated recipe
                None if map.contains_key("_id") => Self::from_target(value),
                None => None,
            },
            _ => None,
        }
    }

    fn from_target(target: &Value) -> Option<RecipeRef> {
        match target {
            Value::String(id) => Some(RecipeRef::Unresolved(id.clone())),
            Value::Object(obj) => {
                let id = obj.get("_id").and_then(Value::as_str)?;
                match serde_json::from_value::<Recipe>(target.clone()) {
                    Ok(recipe) => Some(RecipeRef::Resolved(Box::new(recipe))),
                    Err(e) => {
                        tracing::warn!("Keeping unparsable recipe {} as a bare reference: {}", id, e);
                        Some(RecipeRef::Unresolved(id.to_string()))
                    }
                }
            }
            _ => None,
        }
    }
}

fn album_recipes<'de, D>(deserializer: D) -> Result<Vec<Option<RecipeRef>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw.iter().map(RecipeRef::from_wire).collect())
}

/// A user-defined collection of recipes.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Album {
    #[serde(rename = "_id")]
    pub id: AlbumId,
    #[serde(rename = "userId", default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub color: String,
    /// Entries in insertion order. `None` marks a reference whose recipe was
    /// deleted; such entries never count and never render.
    #[serde(default, deserialize_with = "album_recipes")]
    pub recipes: Vec<Option<RecipeRef>>,
}

impl Album {
    pub fn valid_recipe_count(&self) -> usize {
        self.recipes.iter().flatten().count()
    }

    pub fn recipe_ids(&self) -> Vec<RecipeId> {
        self.recipes
            .iter()
            .flatten()
            .map(|r| r.id().to_string())
            .collect()
    }

    /// Recipes that arrived populated, in album order.
    pub fn resolved_recipes(&self) -> impl Iterator<Item = &Recipe> {
        self.recipes.iter().flatten().filter_map(RecipeRef::recipe)
    }

    pub fn contains(&self, recipe_id: &str) -> bool {
        self.recipes.iter().flatten().any(|r| r.id() == recipe_id)
    }

    /// Whether the cached copy still lists deleted recipes.
    pub fn has_stale_refs(&self) -> bool {
        self.recipes.iter().any(Option::is_none)
    }
}

/// Payload for album creation. The owner comes from the session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewAlbum {
    pub name: String,
    pub color: String,
}

/// Partial album update.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AlbumUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// The signed-in identity returned by the status check.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct User {
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    /// Any other profile fields the service includes.
    #[serde(flatten)]
    pub profile: serde_json::Map<String, Value>,
}

impl User {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            ..Self::default()
        }
    }

    /// Two-letter avatar text.
    pub fn initials(&self) -> String {
        let initials: String = self.username.chars().take(2).collect();
        if initials.is_empty() {
            "?".to_string()
        } else {
            initials.to_uppercase()
        }
    }
}

/// Account registration request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignUp {
    pub username: String,
    pub password: String,
    pub email: String,
}

/// Body of a successful auth call.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AuthReply {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Fields submitted when creating or editing a recipe.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipeDraft {
    pub title: String,
    pub minutes: u32,
    pub description: String,
    pub ingredients: Vec<String>,
    pub steps: Vec<String>,
    pub tags: Vec<String>,
    /// Local image file to upload.
    pub image: Option<PathBuf>,
}

impl RecipeDraft {
    /// Start an edit from an existing recipe.
    pub fn from_recipe(recipe: &Recipe) -> Self {
        Self {
            title: recipe.title.clone(),
            minutes: recipe
                .time
                .minutes()
                .and_then(|m| u32::try_from(m).ok())
                .unwrap_or(0),
            description: recipe.description.clone(),
            ingredients: recipe.ingredients.clone(),
            steps: recipe.steps.clone(),
            tags: recipe.tags.clone(),
            image: None,
        }
    }

    /// Split comma-separated ingredient text, dropping blanks.
    pub fn split_ingredients(text: &str) -> Vec<String> {
        text.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}
