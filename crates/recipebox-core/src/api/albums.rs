//! Album resource over HTTP.

use super::http::{check, endpoint, read_json, HttpClient};
use super::AlbumApi;
use crate::error::Result;
use crate::models::{Album, AlbumUpdate, NewAlbum};
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
struct AddRecipe<'a> {
    #[serde(rename = "recipeId")]
    recipe_id: &'a str,
}

#[derive(Deserialize)]
struct SavedStatus {
    #[serde(rename = "isSaved", default)]
    is_saved: bool,
}

impl AlbumApi for HttpClient {
    fn create_album(&self, album: &NewAlbum) -> Result<Album> {
        let url = endpoint(&self.albums, &[])?;
        let created: Album = read_json(
            self.post(url).json(album).send()?,
            "Failed to create album",
        )?;
        tracing::info!("Created album {} ({})", created.name, created.id);
        Ok(created)
    }

    fn albums_by_owner(&self, user_id: &str) -> Result<Vec<Album>> {
        let url = endpoint(&self.albums, &[user_id])?;
        let albums: Vec<Album> = read_json(self.get(url).send()?, "Failed to fetch user albums")?;
        tracing::debug!("Fetched {} albums for {}", albums.len(), user_id);
        Ok(albums)
    }

    fn get_album(&self, id: &str) -> Result<Album> {
        let url = endpoint(&self.albums, &["detail", id])?;
        read_json(self.get(url).send()?, "Failed to fetch album")
    }

    fn update_album(&self, id: &str, update: &AlbumUpdate) -> Result<Album> {
        let url = endpoint(&self.albums, &[id])?;
        read_json(self.put(url).json(update).send()?, "Failed to update album")
    }

    fn delete_album(&self, id: &str) -> Result<()> {
        let url = endpoint(&self.albums, &[id])?;
        check(self.delete(url).send()?, "Failed to delete album")?;
        tracing::info!("Deleted album {}", id);
        Ok(())
    }

    fn add_recipe_to_album(&self, album_id: &str, recipe_id: &str) -> Result<Album> {
        let url = endpoint(&self.albums, &[album_id, "recipes"])?;
        read_json(
            self.post(url).json(&AddRecipe { recipe_id }).send()?,
            "Failed to add recipe to album",
        )
    }

    fn remove_recipe_from_album(&self, album_id: &str, recipe_id: &str) -> Result<Album> {
        let url = endpoint(&self.albums, &[album_id, "recipes", recipe_id])?;
        read_json(
            self.delete(url).send()?,
            "Failed to remove recipe from album",
        )
    }

    fn is_recipe_saved(&self, user_id: &str, recipe_id: &str) -> Result<bool> {
        let url = endpoint(&self.albums, &[user_id, "check-saved", recipe_id])?;
        let status: SavedStatus = read_json(
            self.get(url).send()?,
            "Failed to check recipe saved status",
        )?;
        Ok(status.is_saved)
    }
}
