//! Album cache and membership queries.

use crate::api::AlbumApi;
use crate::error::{ApiError, Result};
use crate::models::{Album, AlbumUpdate, NewAlbum, RecipeId};

pub const DEFAULT_ALBUM_COLOR: &str = "#3B82F6";

/// Colours offered when creating an album.
pub const ALBUM_PALETTE: [(&str, &str); 11] = [
    ("Yellow", "#FEF3C7"),
    ("Orange", "#FFEDD5"),
    ("Red", "#FEE2E2"),
    ("Pink", "#FCE7F3"),
    ("Purple", "#F3E8FF"),
    ("Blue", "#DBEAFE"),
    ("Green", "#DCFCE7"),
    ("Teal", "#CCFBF1"),
    ("Cyan", "#CFFAFE"),
    ("Indigo", "#E0E7FF"),
    ("Gray", "#F3F4F6"),
];

/// Result of saving a recipe into an album.
#[derive(Debug, Clone, PartialEq)]
pub enum AddOutcome {
    /// The server's updated copy of the album.
    Added(Album),
    /// The recipe was already in the album; nothing changed.
    AlreadySaved,
}

/// Cached copy of the signed-in user's albums.
#[derive(Debug, Default)]
pub struct AlbumStore {
    albums: Vec<Album>,
    error: Option<String>,
}

impl AlbumStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn albums(&self) -> &[Album] {
        &self.albums
    }

    /// Summary of the last failed operation.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn fail(&mut self, summary: &str, err: ApiError) -> ApiError {
        tracing::error!("{}: {}", summary, err);
        self.error = Some(summary.to_string());
        err
    }

    /// Refresh the cache for `user_id`.
    ///
    /// Failures are logged and leave the previous cache in place. Signed out
    /// means no albums.
    pub fn load<A: AlbumApi + ?Sized>(&mut self, api: &A, user_id: Option<&str>) {
        let Some(user_id) = user_id else {
            self.albums.clear();
            return;
        };

        match api.albums_by_owner(user_id) {
            Ok(albums) => {
                tracing::debug!("Cached {} albums", albums.len());
                self.albums = albums;
                self.error = None;
            }
            Err(e) => tracing::warn!("Could not load albums: {}", e),
        }
    }

    pub fn create<A: AlbumApi + ?Sized>(
        &mut self,
        api: &A,
        name: &str,
        color: Option<&str>,
    ) -> Result<Album> {
        let request = NewAlbum {
            name: name.trim().to_string(),
            color: color.unwrap_or(DEFAULT_ALBUM_COLOR).to_string(),
        };
        match api.create_album(&request) {
            Ok(album) => {
                self.albums.push(album.clone());
                Ok(album)
            }
            Err(e) => Err(self.fail("Failed to create album", e)),
        }
    }

    /// Delete on the server, then drop the cached copy.
    pub fn delete<A: AlbumApi + ?Sized>(&mut self, api: &A, album_id: &str) -> Result<()> {
        if let Err(e) = api.delete_album(album_id) {
            return Err(self.fail("Failed to delete album", e));
        }
        self.albums.retain(|a| a.id != album_id);
        Ok(())
    }

    /// Save a recipe into an album.
    ///
    /// A duplicate add is reported as [`AddOutcome::AlreadySaved`] and leaves
    /// the cache as it was.
    pub fn add_recipe<A: AlbumApi + ?Sized>(
        &mut self,
        api: &A,
        album_id: &str,
        recipe_id: &str,
    ) -> Result<AddOutcome> {
        match api.add_recipe_to_album(album_id, recipe_id) {
            Ok(album) => {
                self.replace(album.clone());
                Ok(AddOutcome::Added(album))
            }
            Err(e) if e.is_already_exists() => {
                tracing::info!("Recipe {} already in album {}", recipe_id, album_id);
                Ok(AddOutcome::AlreadySaved)
            }
            Err(e) => Err(self.fail("Failed to add recipe to album", e)),
        }
    }

    pub fn remove_recipe<A: AlbumApi + ?Sized>(
        &mut self,
        api: &A,
        album_id: &str,
        recipe_id: &str,
    ) -> Result<Album> {
        match api.remove_recipe_from_album(album_id, recipe_id) {
            Ok(album) => {
                self.replace(album.clone());
                Ok(album)
            }
            Err(e) => Err(self.fail("Failed to remove recipe from album", e)),
        }
    }

    pub fn update<A: AlbumApi + ?Sized>(
        &mut self,
        api: &A,
        album_id: &str,
        update: &AlbumUpdate,
    ) -> Result<Album> {
        match api.update_album(album_id, update) {
            Ok(album) => {
                self.replace(album.clone());
                Ok(album)
            }
            Err(e) => Err(self.fail("Failed to update album", e)),
        }
    }

    /// Fetch one album fresh from the server.
    pub fn get_by_id<A: AlbumApi + ?Sized>(&mut self, api: &A, album_id: &str) -> Result<Album> {
        api.get_album(album_id)
            .map_err(|e| self.fail("Failed to fetch album", e))
    }

    pub fn cached(&self, album_id: &str) -> Option<&Album> {
        self.albums.iter().find(|a| a.id == album_id)
    }

    /// Ids of the valid entries of a cached album.
    pub fn recipe_ids(&self, album_id: &str) -> Vec<RecipeId> {
        self.cached(album_id)
            .map(Album::recipe_ids)
            .unwrap_or_default()
    }

    /// Whether any cached album holds the recipe, populated or not.
    pub fn is_recipe_saved(&self, recipe_id: &str) -> bool {
        self.albums.iter().any(|a| a.contains(recipe_id))
    }

    pub fn albums_containing(&self, recipe_id: &str) -> Vec<&Album> {
        self.albums.iter().filter(|a| a.contains(recipe_id)).collect()
    }

    /// Ask the server instead of the cache. Any failure reads as not saved.
    pub fn check_saved_remote<A: AlbumApi + ?Sized>(
        &self,
        api: &A,
        user_id: Option<&str>,
        recipe_id: &str,
    ) -> bool {
        let Some(user_id) = user_id else {
            return false;
        };
        api.is_recipe_saved(user_id, recipe_id).unwrap_or_else(|e| {
            tracing::warn!("Saved check failed for {}: {}", recipe_id, e);
            false
        })
    }

    /// Reload when a cached album still lists deleted recipes.
    ///
    /// Returns whether a reload happened.
    pub fn refresh_if_stale<A: AlbumApi + ?Sized>(&mut self, api: &A, user_id: Option<&str>) -> bool {
        if !self.albums.iter().any(Album::has_stale_refs) {
            return false;
        }
        tracing::debug!("Album cache has stale references, reloading");
        self.load(api, user_id);
        true
    }

    pub fn clear(&mut self) {
        self.albums.clear();
        self.error = None;
    }

    fn replace(&mut self, album: Album) {
        match self.albums.iter_mut().find(|a| a.id == album.id) {
            Some(existing) => *existing = album,
            None => self.albums.push(album),
        }
    }
}
