//! Access to the remote recipe, album and auth resources.
//!
//! Each resource is a trait so state holders can run against either the
//! HTTP client or the in-memory backend.

mod albums;
mod auth;
mod http;
mod recipes;

pub use auth::friendly_sign_up_message;
pub use http::{ApiConfig, HttpClient};

use crate::error::Result;
use crate::models::{Album, AlbumUpdate, AuthReply, NewAlbum, Recipe, RecipeDraft, SignUp, User};
use crate::search::SearchParams;

pub trait RecipeApi {
    fn list_recipes(&self) -> Result<Vec<Recipe>>;
    fn recipes_by_owner(&self, user_id: &str) -> Result<Vec<Recipe>>;
    fn get_recipe(&self, id: &str) -> Result<Recipe>;
    fn search_recipes(&self, params: &SearchParams) -> Result<Vec<Recipe>>;
    fn create_recipe(&self, draft: &RecipeDraft) -> Result<Recipe>;
    fn update_recipe(&self, id: &str, draft: &RecipeDraft) -> Result<Recipe>;
    fn delete_recipe(&self, id: &str) -> Result<()>;
}

pub trait AlbumApi {
    fn create_album(&self, album: &NewAlbum) -> Result<Album>;
    fn albums_by_owner(&self, user_id: &str) -> Result<Vec<Album>>;
    fn get_album(&self, id: &str) -> Result<Album>;
    fn update_album(&self, id: &str, update: &AlbumUpdate) -> Result<Album>;
    fn delete_album(&self, id: &str) -> Result<()>;
    fn add_recipe_to_album(&self, album_id: &str, recipe_id: &str) -> Result<Album>;
    fn remove_recipe_from_album(&self, album_id: &str, recipe_id: &str) -> Result<Album>;
    fn is_recipe_saved(&self, user_id: &str, recipe_id: &str) -> Result<bool>;
}

pub trait AuthApi {
    fn sign_up(&self, request: &SignUp) -> Result<AuthReply>;
    fn confirm_sign_up(&self, username: &str, code: &str) -> Result<AuthReply>;
    fn login(&self, username: &str, password: &str) -> Result<AuthReply>;
    /// The signed-in user, or `None` when the session is not authenticated.
    fn check_status(&self) -> Result<Option<User>>;
    fn logout(&self) -> Result<()>;
    fn forgot_password(&self, username: &str) -> Result<AuthReply>;
    fn confirm_forgot_password(
        &self,
        username: &str,
        code: &str,
        new_password: &str,
    ) -> Result<AuthReply>;
}

/// Everything the frontend needs from a backend.
pub trait Api: RecipeApi + AlbumApi + AuthApi {}

impl<T: RecipeApi + AlbumApi + AuthApi + ?Sized> Api for T {}
