//! Recipe resource over HTTP.

use super::http::{check, endpoint, read_json, HttpClient};
use super::RecipeApi;
use crate::error::{ApiError, Result};
use crate::models::{Recipe, RecipeDraft};
use crate::search::SearchParams;
use reqwest::blocking::multipart::Form;

/// Build the multipart body shared by create and update.
///
/// List fields travel as JSON arrays inside text parts.
fn recipe_form(draft: &RecipeDraft) -> Result<Form> {
    let mut form = Form::new()
        .text("title", draft.title.clone())
        .text("time", draft.minutes.to_string())
        .text("description", draft.description.clone())
        .text("ingredients", serde_json::to_string(&draft.ingredients)?)
        .text("tags", serde_json::to_string(&draft.tags)?)
        .text("steps", serde_json::to_string(&draft.steps)?);

    if let Some(path) = &draft.image {
        form = form.file("imageURL", path).map_err(|source| ApiError::Image {
            path: path.clone(),
            source,
        })?;
    }

    Ok(form)
}

impl RecipeApi for HttpClient {
    fn list_recipes(&self) -> Result<Vec<Recipe>> {
        let url = endpoint(&self.recipes, &[])?;
        read_json(self.get(url).send()?, "Failed to fetch recipes")
    }

    fn recipes_by_owner(&self, user_id: &str) -> Result<Vec<Recipe>> {
        let mut url = endpoint(&self.recipes, &[])?;
        url.query_pairs_mut().append_pair("userId", user_id);
        read_json(self.get(url).send()?, "Failed to fetch user recipes")
    }

    fn get_recipe(&self, id: &str) -> Result<Recipe> {
        let url = endpoint(&self.recipes, &[id])?;
        read_json(self.get(url).send()?, "Failed to fetch recipe")
    }

    fn search_recipes(&self, params: &SearchParams) -> Result<Vec<Recipe>> {
        let mut url = endpoint(&self.recipes, &["search"])?;
        {
            let mut query = url.query_pairs_mut();
            for (key, value) in params.query_pairs() {
                query.append_pair(key, &value);
            }
        }
        read_json(self.get(url).send()?, "Failed to search recipes")
    }

    fn create_recipe(&self, draft: &RecipeDraft) -> Result<Recipe> {
        let url = endpoint(&self.recipes, &[])?;
        let form = recipe_form(draft)?;
        let recipe: Recipe = read_json(
            self.post(url).multipart(form).send()?,
            "Recipe creation failed",
        )?;
        tracing::info!("Created recipe {} ({})", recipe.title, recipe.id);
        Ok(recipe)
    }

    fn update_recipe(&self, id: &str, draft: &RecipeDraft) -> Result<Recipe> {
        let url = endpoint(&self.recipes, &[id])?;
        let form = recipe_form(draft)?;
        let recipe: Recipe = read_json(
            self.put(url).multipart(form).send()?,
            "Failed to update recipe",
        )?;
        tracing::info!("Updated recipe {}", id);
        Ok(recipe)
    }

    fn delete_recipe(&self, id: &str) -> Result<()> {
        let url = endpoint(&self.recipes, &[id])?;
        check(self.delete(url).send()?, "Failed to delete recipe")?;
        tracing::info!("Deleted recipe {}", id);
        Ok(())
    }
}
