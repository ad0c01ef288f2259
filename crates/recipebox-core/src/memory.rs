//! In-process backend behaving like the recipe service.
//!
//! Used by `--demo` and by tests. Errors are shaped like the ones the HTTP
//! client produces, so state holders cannot tell the difference.

use crate::api::{friendly_sign_up_message, AlbumApi, AuthApi, RecipeApi};
use crate::error::{ApiError, Result};
use crate::models::{
    Album, AlbumUpdate, AuthReply, CookTime, NewAlbum, Recipe, RecipeDraft, RecipeId, RecipeRef,
    SignUp, User,
};
use crate::search::{matches, SearchFilter, SearchParams, TimeBucket};
use std::cell::RefCell;

/// Code accepted by `confirm_sign_up`.
pub const SIGN_UP_CODE: &str = "123456";
/// Code accepted by `confirm_forgot_password`.
pub const RESET_CODE: &str = "654321";

pub const DEMO_USERNAME: &str = "demo@recipebox.dev";
pub const DEMO_PASSWORD: &str = "Demo-pass1";

#[derive(Debug, Clone)]
struct Account {
    username: String,
    email: String,
    password: String,
    confirmed: bool,
}

#[derive(Debug, Clone)]
struct StoredAlbum {
    id: String,
    owner: String,
    name: String,
    color: String,
    recipe_ids: Vec<RecipeId>,
}

#[derive(Debug, Default)]
struct State {
    recipes: Vec<Recipe>,
    albums: Vec<StoredAlbum>,
    accounts: Vec<Account>,
    signed_in: Option<String>,
    next_id: u64,
}

impl State {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}{}", self.next_id)
    }

    fn current_user(&self) -> Result<&str> {
        self.signed_in
            .as_deref()
            .ok_or_else(|| status(401, "Not authenticated"))
    }

    fn account(&self, username: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.username == username)
    }

    /// Album as the service returns it: recipes populated, deleted ones null.
    fn populate(&self, stored: &StoredAlbum) -> Album {
        let recipes = stored
            .recipe_ids
            .iter()
            .map(|id| {
                self.recipes
                    .iter()
                    .find(|r| &r.id == id)
                    .map(|r| RecipeRef::Resolved(Box::new(r.clone())))
            })
            .collect();
        Album {
            id: stored.id.clone(),
            owner: Some(stored.owner.clone()),
            name: stored.name.clone(),
            color: stored.color.clone(),
            recipes,
        }
    }

    fn album_mut(&mut self, id: &str) -> Result<&mut StoredAlbum> {
        self.albums
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| status(404, "Album not found"))
    }
}

fn status(code: u16, message: &str) -> ApiError {
    ApiError::Status {
        status: code,
        message: message.to_string(),
        body: serde_json::json!({ "error": message }).to_string(),
    }
}

fn reply(message: &str) -> AuthReply {
    AuthReply {
        message: Some(message.to_string()),
        ..AuthReply::default()
    }
}

fn recipe_from_draft(id: String, owner: String, draft: &RecipeDraft) -> Recipe {
    Recipe {
        id,
        title: draft.title.trim().to_string(),
        user_id: owner,
        time: CookTime::from_minutes(draft.minutes),
        description: draft.description.clone(),
        ingredients: draft.ingredients.clone(),
        steps: draft.steps.clone(),
        tags: draft.tags.clone(),
        image_url: draft
            .image
            .as_ref()
            .map(|p| format!("file://{}", p.display())),
    }
}

fn validate_draft(draft: &RecipeDraft) -> Result<()> {
    if draft.title.trim().is_empty() {
        return Err(status(400, "Title is required"));
    }
    if draft.minutes == 0 {
        return Err(status(400, "Time must be a positive number"));
    }
    Ok(())
}

/// Backend holding everything in memory.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    state: RefCell<State>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed recipes owned by `owner`, which need not have an account.
    pub fn with_recipes(owner: &str, recipes: impl IntoIterator<Item = RecipeDraft>) -> Self {
        let backend = Self::new();
        {
            let mut state = backend.state.borrow_mut();
            for draft in recipes {
                let id = state.next_id("r");
                let recipe = recipe_from_draft(id, owner.to_string(), &draft);
                state.recipes.push(recipe);
            }
        }
        backend
    }

    /// Register a confirmed account and sign it in.
    pub fn with_signed_in(self, username: &str, password: &str) -> Self {
        {
            let mut state = self.state.borrow_mut();
            state.accounts.push(Account {
                username: username.to_string(),
                email: username.to_string(),
                password: password.to_string(),
                confirmed: true,
            });
            state.signed_in = Some(username.to_string());
        }
        self
    }

    /// A populated backend for exploring the interface offline.
    pub fn demo() -> Self {
        let backend = Self::with_recipes(DEMO_USERNAME, demo_recipes())
            .with_signed_in(DEMO_USERNAME, DEMO_PASSWORD);
        {
            let mut state = backend.state.borrow_mut();
            let favourites: Vec<RecipeId> = state.recipes.iter().take(2).map(|r| r.id.clone()).collect();
            let id = state.next_id("a");
            state.albums.push(StoredAlbum {
                id,
                owner: DEMO_USERNAME.to_string(),
                name: "Weeknight favourites".to_string(),
                color: "#DCFCE7".to_string(),
                recipe_ids: favourites,
            });
        }
        tracing::info!("Demo backend ready, signed in as {}", DEMO_USERNAME);
        backend
    }

    /// End the current session without going through `logout`.
    pub fn expire_session(&self) {
        self.state.borrow_mut().signed_in = None;
    }
}

fn draft(title: &str, minutes: u32, description: &str, ingredients: &[&str], tags: &[&str]) -> RecipeDraft {
    RecipeDraft {
        title: title.to_string(),
        minutes,
        description: description.to_string(),
        ingredients: ingredients.iter().map(|s| s.to_string()).collect(),
        steps: vec![
            "Prepare the ingredients.".to_string(),
            "Cook until done.".to_string(),
            "Serve.".to_string(),
        ],
        tags: tags.iter().map(|s| s.to_string()).collect(),
        image: None,
    }
}

fn demo_recipes() -> Vec<RecipeDraft> {
    vec![
        draft(
            "Lemon Garlic Chicken",
            35,
            "Pan-seared thighs with a bright lemon sauce.",
            &["4 chicken thighs", "2 lemons", "4 cloves garlic"],
            &["dinner", "chicken", "gluten-free"],
        ),
        draft(
            "Tomato Basil Pasta",
            20,
            "Quick weeknight pasta with fresh tomatoes.",
            &["400 g spaghetti", "6 tomatoes", "1 bunch basil"],
            &["dinner", "italian", "pasta", "vegetarian"],
        ),
        draft(
            "Overnight Oats",
            5,
            "No-cook oats soaked in milk overnight.",
            &["1 cup oats", "1 cup milk", "1 tbsp honey"],
            &["breakfast", "vegetarian", "no-cook"],
        ),
        draft(
            "Beef Chili",
            90,
            "A slow simmered chili for cold evenings.",
            &["500 g ground beef", "2 cans beans", "1 onion"],
            &["dinner", "beef", "one-pot"],
        ),
        draft(
            "Veggie Fried Rice",
            25,
            "Day-old rice fried with vegetables and egg.",
            &["3 cups cooked rice", "2 eggs", "1 cup peas"],
            &["lunch", "chinese", "rice", "fried"],
        ),
        draft(
            "Grilled Salmon",
            18,
            "Salmon fillets with a dill yogurt sauce.",
            &["2 salmon fillets", "1 cup yogurt", "dill"],
            &["dinner", "fish", "grilled", "high-protein"],
        ),
        draft(
            "Chickpea Curry",
            40,
            "Creamy coconut curry with chickpeas.",
            &["2 cans chickpeas", "1 can coconut milk", "curry paste"],
            &["dinner", "indian", "vegan"],
        ),
        draft(
            "Banana Bread",
            70,
            "Moist loaf for overripe bananas.",
            &["3 bananas", "2 cups flour", "1/2 cup sugar"],
            &["dessert", "baked"],
        ),
    ]
}

impl RecipeApi for MemoryBackend {
    fn list_recipes(&self) -> Result<Vec<Recipe>> {
        Ok(self.state.borrow().recipes.clone())
    }

    fn recipes_by_owner(&self, user_id: &str) -> Result<Vec<Recipe>> {
        let state = self.state.borrow();
        Ok(state
            .recipes
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    fn get_recipe(&self, id: &str) -> Result<Recipe> {
        self.state
            .borrow()
            .recipes
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| status(404, "Recipe not found"))
    }

    fn search_recipes(&self, params: &SearchParams) -> Result<Vec<Recipe>> {
        let time = match (params.min_time, params.max_time) {
            (None, None) => None,
            (min, max) => Some(TimeBucket {
                label: "",
                min: min.unwrap_or(0),
                max,
            }),
        };
        let filter = SearchFilter {
            query: params.query.clone().unwrap_or_default(),
            tags: params.tags.clone(),
            time,
        };
        let state = self.state.borrow();
        Ok(state
            .recipes
            .iter()
            .filter(|r| matches(r, &filter))
            .cloned()
            .collect())
    }

    fn create_recipe(&self, draft: &RecipeDraft) -> Result<Recipe> {
        validate_draft(draft)?;
        let mut state = self.state.borrow_mut();
        let owner = state.current_user()?.to_string();
        let id = state.next_id("r");
        let recipe = recipe_from_draft(id, owner, draft);
        state.recipes.push(recipe.clone());
        Ok(recipe)
    }

    fn update_recipe(&self, id: &str, draft: &RecipeDraft) -> Result<Recipe> {
        validate_draft(draft)?;
        let mut state = self.state.borrow_mut();
        let owner = state.current_user()?.to_string();
        let existing = state
            .recipes
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| status(404, "Recipe not found"))?;
        if existing.user_id != owner {
            return Err(status(403, "You can only edit your own recipes"));
        }

        let mut updated = recipe_from_draft(id.to_string(), owner, draft);
        if updated.image_url.is_none() {
            updated.image_url = existing.image_url.take();
        }
        *existing = updated.clone();
        Ok(updated)
    }

    fn delete_recipe(&self, id: &str) -> Result<()> {
        let mut state = self.state.borrow_mut();
        let owner = state.current_user()?.to_string();
        let pos = state
            .recipes
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| status(404, "Recipe not found"))?;
        if state.recipes[pos].user_id != owner {
            return Err(status(403, "You can only delete your own recipes"));
        }
        // Album entries are left dangling, as the service does.
        state.recipes.remove(pos);
        Ok(())
    }
}

impl AlbumApi for MemoryBackend {
    fn create_album(&self, album: &NewAlbum) -> Result<Album> {
        if album.name.trim().is_empty() {
            return Err(status(400, "Album name is required"));
        }
        let mut state = self.state.borrow_mut();
        let owner = state.current_user()?.to_string();
        let stored = StoredAlbum {
            id: state.next_id("a"),
            owner,
            name: album.name.trim().to_string(),
            color: album.color.clone(),
            recipe_ids: Vec::new(),
        };
        let created = state.populate(&stored);
        state.albums.push(stored);
        Ok(created)
    }

    fn albums_by_owner(&self, user_id: &str) -> Result<Vec<Album>> {
        let state = self.state.borrow();
        Ok(state
            .albums
            .iter()
            .filter(|a| a.owner == user_id)
            .map(|a| state.populate(a))
            .collect())
    }

    fn get_album(&self, id: &str) -> Result<Album> {
        let state = self.state.borrow();
        state
            .albums
            .iter()
            .find(|a| a.id == id)
            .map(|a| state.populate(a))
            .ok_or_else(|| status(404, "Album not found"))
    }

    fn update_album(&self, id: &str, update: &AlbumUpdate) -> Result<Album> {
        let mut state = self.state.borrow_mut();
        let album = state.album_mut(id)?;
        if let Some(name) = &update.name {
            album.name = name.trim().to_string();
        }
        if let Some(color) = &update.color {
            album.color = color.clone();
        }
        let stored = album.clone();
        Ok(state.populate(&stored))
    }

    fn delete_album(&self, id: &str) -> Result<()> {
        let mut state = self.state.borrow_mut();
        let before = state.albums.len();
        state.albums.retain(|a| a.id != id);
        if state.albums.len() == before {
            return Err(status(404, "Album not found"));
        }
        Ok(())
    }

    fn add_recipe_to_album(&self, album_id: &str, recipe_id: &str) -> Result<Album> {
        let mut state = self.state.borrow_mut();
        if !state.recipes.iter().any(|r| r.id == recipe_id) {
            return Err(status(404, "Recipe not found"));
        }
        let album = state.album_mut(album_id)?;
        if album.recipe_ids.iter().any(|id| id == recipe_id) {
            return Err(ApiError::Status {
                status: 400,
                message: "Failed to add recipe to album".to_string(),
                body: serde_json::json!({
                    "error": "Failed to add recipe to album",
                    "details": "Recipe already exists in album"
                })
                .to_string(),
            });
        }
        album.recipe_ids.push(recipe_id.to_string());
        let stored = album.clone();
        Ok(state.populate(&stored))
    }

    fn remove_recipe_from_album(&self, album_id: &str, recipe_id: &str) -> Result<Album> {
        let mut state = self.state.borrow_mut();
        let album = state.album_mut(album_id)?;
        let before = album.recipe_ids.len();
        album.recipe_ids.retain(|id| id != recipe_id);
        if album.recipe_ids.len() == before {
            return Err(status(404, "Recipe not found in album"));
        }
        let stored = album.clone();
        Ok(state.populate(&stored))
    }

    fn is_recipe_saved(&self, user_id: &str, recipe_id: &str) -> Result<bool> {
        let state = self.state.borrow();
        Ok(state
            .albums
            .iter()
            .filter(|a| a.owner == user_id)
            .any(|a| a.recipe_ids.iter().any(|id| id == recipe_id)))
    }
}

impl AuthApi for MemoryBackend {
    fn sign_up(&self, request: &SignUp) -> Result<AuthReply> {
        let rejected = |raw: &str| status(400, &friendly_sign_up_message(raw));

        if !request.username.contains('@') {
            return Err(rejected("Username should be an email."));
        }
        if request.password.chars().count() < 8 {
            return Err(rejected("Password did not conform with policy: Password not long enough"));
        }
        let mut state = self.state.borrow_mut();
        if state.account(&request.username).is_some() {
            return Err(rejected("An account with the given email already exists."));
        }

        state.accounts.push(Account {
            username: request.username.clone(),
            email: request.email.clone(),
            password: request.password.clone(),
            confirmed: false,
        });
        Ok(reply("User registered. Check your email for the confirmation code."))
    }

    fn confirm_sign_up(&self, username: &str, code: &str) -> Result<AuthReply> {
        let mut state = self.state.borrow_mut();
        let account = state
            .accounts
            .iter_mut()
            .find(|a| a.username == username)
            .ok_or_else(|| status(400, "Username/client id combination not found."))?;
        if code != SIGN_UP_CODE {
            return Err(status(400, "Invalid verification code provided, please try again."));
        }
        account.confirmed = true;
        Ok(reply("Account confirmed"))
    }

    fn login(&self, username: &str, password: &str) -> Result<AuthReply> {
        let mut state = self.state.borrow_mut();
        let account = state
            .account(username)
            .filter(|a| a.password == password)
            .ok_or_else(|| status(401, "Incorrect username or password."))?;
        if !account.confirmed {
            return Err(status(401, "User is not confirmed."));
        }
        state.signed_in = Some(username.to_string());
        Ok(reply("Login successful"))
    }

    fn check_status(&self) -> Result<Option<User>> {
        let state = self.state.borrow();
        Ok(state.signed_in.as_deref().map(|username| User {
            username: username.to_string(),
            email: state.account(username).map(|a| a.email.clone()),
            ..User::default()
        }))
    }

    fn logout(&self) -> Result<()> {
        self.state.borrow_mut().signed_in = None;
        Ok(())
    }

    fn forgot_password(&self, username: &str) -> Result<AuthReply> {
        let state = self.state.borrow();
        if state.account(username).is_none() {
            return Err(status(400, "Username/client id combination not found."));
        }
        Ok(reply("Password reset code sent"))
    }

    fn confirm_forgot_password(
        &self,
        username: &str,
        code: &str,
        new_password: &str,
    ) -> Result<AuthReply> {
        let mut state = self.state.borrow_mut();
        let account = state
            .accounts
            .iter_mut()
            .find(|a| a.username == username)
            .ok_or_else(|| status(400, "Username/client id combination not found."))?;
        if code != RESET_CODE {
            return Err(status(400, "Invalid verification code provided, please try again."));
        }
        account.password = new_password.to_string();
        Ok(reply("Password has been reset"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deleted_recipe_becomes_null_entry() {
        let backend = MemoryBackend::demo();
        let album = backend.albums_by_owner(DEMO_USERNAME).unwrap().remove(0);
        assert_eq!(album.valid_recipe_count(), 2);

        let victim = album.recipe_ids()[0].clone();
        backend.delete_recipe(&victim).unwrap();

        let album = backend.get_album(&album.id).unwrap();
        assert_eq!(album.recipes.len(), 2);
        assert_eq!(album.valid_recipe_count(), 1);
        assert!(album.has_stale_refs());
    }

    #[test]
    fn duplicate_add_carries_marker() {
        let backend = MemoryBackend::demo();
        let album = backend.albums_by_owner(DEMO_USERNAME).unwrap().remove(0);
        let err = backend
            .add_recipe_to_album(&album.id, &album.recipe_ids()[0])
            .unwrap_err();
        assert!(err.is_already_exists());
    }

    #[test]
    fn writes_require_a_session() {
        let backend = MemoryBackend::demo();
        backend.expire_session();
        let err = backend
            .create_album(&NewAlbum {
                name: "x".into(),
                color: "#FFFFFF".into(),
            })
            .unwrap_err();
        assert_eq!(err.status(), Some(401));
    }

    #[test]
    fn search_honours_open_ended_time() {
        let backend = MemoryBackend::demo();
        let found = backend
            .search_recipes(&SearchParams {
                min_time: Some(60),
                ..SearchParams::default()
            })
            .unwrap();
        let titles: Vec<_> = found.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Beef Chili", "Banana Bread"]);
    }

    #[test]
    fn sign_up_confirm_login() {
        let backend = MemoryBackend::new();
        let request = SignUp {
            username: "ana@example.com".into(),
            password: "Str0ng!pass".into(),
            email: "ana@example.com".into(),
        };
        backend.sign_up(&request).unwrap();
        assert_eq!(
            backend.login("ana@example.com", "Str0ng!pass").unwrap_err().to_string(),
            "User is not confirmed."
        );
        assert!(backend.confirm_sign_up("ana@example.com", "000000").is_err());
        backend.confirm_sign_up("ana@example.com", SIGN_UP_CODE).unwrap();
        backend.login("ana@example.com", "Str0ng!pass").unwrap();
        assert_eq!(
            backend.check_status().unwrap().map(|u| u.username),
            Some("ana@example.com".to_string())
        );
    }

    #[test]
    fn sign_up_messages_are_friendly() {
        let backend = MemoryBackend::new();
        let err = backend
            .sign_up(&SignUp {
                username: "ana".into(),
                password: "Str0ng!pass".into(),
                email: "ana@example.com".into(),
            })
            .unwrap_err();
        assert_eq!(err.to_string(), "Please use a valid email format for your username");
    }
}
