//! Application state management.

use crate::config::Config;
use crate::forms::{AlbumForm, RecipeForm, SignInForm, SignInStep, SignUpForm, SignUpStep, TextField};
use recipebox_core::search::{quick_find, TIME_BUCKETS};
use recipebox_core::{
    tags, AddOutcome, Album, AlbumId, AlbumStore, Api, Carousel, Direction, Gesture, Lane, Recipe,
    RecipeId, ResultSource, SearchFilter, SearchStore, SessionStore,
};
use std::time::Duration;

/// Columns taken by one carousel card.
pub const CARD_WIDTH: usize = 26;
const QUICK_FIND_LIMIT: usize = 10;

/// Application state.
#[derive(Debug, Clone, PartialEq)]
pub enum AppState {
    Running,
    /// Application should quit.
    Quit,
}

/// A navigable view.
#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    Home,
    RecipeDetail(RecipeId),
    MyRecipes,
    Editor,
    Albums,
    AlbumDetail(AlbumId),
    Profile,
    SignIn,
    SignUp,
    Perks,
}

impl Screen {
    /// Views that need a signed-in user.
    pub fn requires_auth(&self) -> bool {
        matches!(
            self,
            Screen::MyRecipes
                | Screen::Editor
                | Screen::Albums
                | Screen::AlbumDetail(_)
                | Screen::Profile
        )
    }

    pub fn title(&self) -> &'static str {
        match self {
            Screen::Home => "Discover",
            Screen::RecipeDetail(_) => "Recipe",
            Screen::MyRecipes => "My Recipes",
            Screen::Editor => "Recipe Editor",
            Screen::Albums => "Albums",
            Screen::AlbumDetail(_) => "Album",
            Screen::Profile => "Profile",
            Screen::SignIn => "Sign In",
            Screen::SignUp => "Sign Up",
            Screen::Perks => "Perks",
        }
    }
}

/// Focus area of the home view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomeFocus {
    Carousel,
    Search,
    Filters,
    Results,
}

impl HomeFocus {
    pub fn next(self) -> Self {
        match self {
            HomeFocus::Carousel => HomeFocus::Search,
            HomeFocus::Search => HomeFocus::Filters,
            HomeFocus::Filters => HomeFocus::Results,
            HomeFocus::Results => HomeFocus::Carousel,
        }
    }
}

/// One toggleable row of the filter panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterEntry {
    /// Index into `TIME_BUCKETS`.
    Time(usize),
    Tag(&'static str),
}

pub fn filter_entries() -> Vec<FilterEntry> {
    (0..TIME_BUCKETS.len())
        .map(FilterEntry::Time)
        .chain(tags::all_tags().map(FilterEntry::Tag))
        .collect()
}

/// Selection in a vertical list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListCursor {
    pub selected: usize,
}

impl ListCursor {
    pub fn up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn down(&mut self, len: usize) {
        if self.selected + 1 < len {
            self.selected += 1;
        }
    }

    pub fn clamp(&mut self, len: usize) {
        self.selected = self.selected.min(len.saturating_sub(1));
    }
}

#[derive(Debug, Clone)]
pub struct HomeView {
    pub focus: HomeFocus,
    /// Carousel row that receives arrow keys.
    pub lane: Lane,
    pub query: TextField,
    pub filter: SearchFilter,
    pub filter_cursor: usize,
    pub results: ListCursor,
}

impl Default for HomeView {
    fn default() -> Self {
        Self {
            focus: HomeFocus::Carousel,
            lane: Lane::Top,
            query: TextField::new("Search"),
            filter: SearchFilter::default(),
            filter_cursor: 0,
            results: ListCursor::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecipeDetail {
    pub recipe: Recipe,
    pub saved: bool,
}

/// Destructive action awaiting confirmation.
#[derive(Debug, Clone, PartialEq)]
pub enum PendingAction {
    DeleteRecipe(RecipeId),
    DeleteAlbum(AlbumId),
    RemoveFromAlbum { album_id: AlbumId, recipe_id: RecipeId },
}

/// Save-to-album dialog.
#[derive(Debug, Clone)]
pub struct AlbumPicker {
    pub recipe_id: RecipeId,
    /// Index `albums.len()` is the "new album" row.
    pub cursor: ListCursor,
    /// Name being typed for an album created from the dialog.
    pub new_album: Option<TextField>,
}

#[derive(Debug, Clone, Default)]
pub struct QuickFind {
    pub query: TextField,
    pub results: Vec<Recipe>,
    pub cursor: ListCursor,
}

/// Modal drawn over the current screen.
#[derive(Debug, Clone)]
pub enum Overlay {
    Notice { title: String, message: String },
    Confirm { message: String, action: PendingAction },
    AlbumPicker(AlbumPicker),
    AlbumCreate(AlbumForm),
    QuickFind(QuickFind),
}

/// Main application model.
pub struct App {
    pub state: AppState,
    pub screen: Screen,
    history: Vec<Screen>,
    api: Box<dyn Api>,
    pub config: Config,
    pub session: SessionStore,
    pub albums: AlbumStore,
    pub search: SearchStore,
    pub carousel: Carousel,
    pub overlay: Option<Overlay>,
    pub home: HomeView,
    pub detail: Option<RecipeDetail>,
    pub my_recipes: Vec<Recipe>,
    pub my_recipes_cursor: ListCursor,
    pub albums_cursor: ListCursor,
    pub album_detail: Option<Album>,
    pub album_detail_cursor: ListCursor,
    pub editor: RecipeForm,
    pub sign_in: SignInForm,
    pub sign_up: SignUpForm,
    /// Owned recipe count shown on the profile; `None` when unknown.
    pub profile_recipe_count: Option<usize>,
    /// Where to go once a redirected sign-in succeeds.
    after_sign_in: Option<Screen>,
}

impl App {
    pub fn new(api: Box<dyn Api>, config: Config) -> Self {
        Self {
            state: AppState::Running,
            screen: Screen::Home,
            history: Vec::new(),
            api,
            config,
            session: SessionStore::new(),
            albums: AlbumStore::new(),
            search: SearchStore::new(),
            carousel: Carousel::new(),
            overlay: None,
            home: HomeView::default(),
            detail: None,
            my_recipes: Vec::new(),
            my_recipes_cursor: ListCursor::default(),
            albums_cursor: ListCursor::default(),
            album_detail: None,
            album_detail_cursor: ListCursor::default(),
            editor: RecipeForm::default(),
            sign_in: SignInForm::default(),
            sign_up: SignUpForm::default(),
            profile_recipe_count: None,
            after_sign_in: None,
        }
    }

    /// Probe the session and load the catalog.
    pub fn start(&mut self) {
        self.session.probe(self.api.as_ref());
        self.albums.load(self.api.as_ref(), self.session.user_id());

        if let Err(e) = self.search.load_catalog(self.api.as_ref()) {
            tracing::error!("Failed to load recipes: {}", e);
            self.notify("Error", format!("Failed to fetch recipes: {e}"));
        }
        self.carousel.start(self.search.catalog().len());
    }

    /// Development sign-in from environment credentials.
    pub fn auto_login(&mut self, username: &str, password: &str) {
        match self.session.login(self.api.as_ref(), username, password) {
            Ok(user) => tracing::info!("Auto-login succeeded for {}", user.username),
            Err(e) => {
                tracing::warn!("Auto-login failed: {}", e);
                return;
            }
        }
        self.albums.load(self.api.as_ref(), self.session.user_id());
    }

    pub fn notify(&mut self, title: &str, message: impl Into<String>) {
        self.overlay = Some(Overlay::Notice {
            title: title.to_string(),
            message: message.into(),
        });
    }

    pub fn dismiss_overlay(&mut self) {
        self.overlay = None;
    }

    pub fn quit(&mut self) {
        self.carousel.stop();
        self.state = AppState::Quit;
    }

    /// Whether keystrokes go into a text field.
    pub fn is_typing(&self) -> bool {
        match &self.overlay {
            Some(Overlay::QuickFind(_)) | Some(Overlay::AlbumCreate(_)) => return true,
            Some(Overlay::AlbumPicker(picker)) => return picker.new_album.is_some(),
            Some(_) => return false,
            None => {}
        }
        match self.screen {
            Screen::SignIn | Screen::SignUp => true,
            Screen::Editor => self.editor.focus != crate::forms::EditorFocus::Tags,
            Screen::Home => self.home.focus == HomeFocus::Search,
            _ => false,
        }
    }

    // Navigation

    /// Go to `screen`, remembering the current one.
    ///
    /// Protected screens redirect to sign-in when nobody is signed in.
    pub fn navigate(&mut self, screen: Screen) {
        if screen == self.screen {
            return;
        }
        if screen.requires_auth() && !self.session.is_signed_in() {
            tracing::info!("{} requires sign-in, redirecting", screen.title());
            self.after_sign_in = Some(screen);
            self.sign_in.info = Some("Please sign in to continue".to_string());
            self.set_screen(Screen::SignIn, true);
            return;
        }
        self.set_screen(screen, true);
    }

    /// Swap the current screen without adding a history entry.
    fn replace(&mut self, screen: Screen) {
        self.set_screen(screen, false);
    }

    pub fn back(&mut self) {
        let signed_in = self.session.is_signed_in();
        let previous = std::iter::from_fn(|| self.history.pop())
            .find(|s| signed_in || !s.requires_auth())
            .unwrap_or(Screen::Home);
        self.replace(previous);
    }

    fn set_screen(&mut self, screen: Screen, remember: bool) {
        if self.screen == Screen::Home && screen != Screen::Home {
            self.carousel.stop();
        }
        let previous = std::mem::replace(&mut self.screen, screen);
        if remember && previous != self.screen {
            self.history.push(previous);
        }
        tracing::debug!("Screen: {:?}", self.screen);
        self.on_enter();
    }

    fn on_enter(&mut self) {
        match self.screen.clone() {
            Screen::Home => {
                self.carousel.start(self.search.catalog().len());
            }
            Screen::RecipeDetail(id) => self.load_detail(&id),
            Screen::MyRecipes => self.load_my_recipes(),
            Screen::Albums => {
                if self.albums.albums().is_empty() {
                    self.albums.load(self.api.as_ref(), self.session.user_id());
                } else {
                    self.albums
                        .refresh_if_stale(self.api.as_ref(), self.session.user_id());
                }
                self.albums_cursor.clamp(self.albums.albums().len());
            }
            Screen::AlbumDetail(id) => self.load_album_detail(&id),
            Screen::Profile => {
                self.albums.load(self.api.as_ref(), self.session.user_id());
                self.profile_recipe_count = self.session.user_id().and_then(|user_id| {
                    match self.api.recipes_by_owner(user_id) {
                        Ok(recipes) => Some(recipes.len()),
                        Err(e) => {
                            tracing::warn!("Could not count recipes: {}", e);
                            None
                        }
                    }
                });
            }
            Screen::Editor | Screen::SignIn | Screen::SignUp | Screen::Perks => {}
        }
    }

    // Carousel

    /// Recipes shown in a carousel row.
    pub fn carousel_recipes(&self, lane: Lane) -> Vec<&Recipe> {
        let catalog = self.search.catalog().iter();
        match lane {
            Lane::Top => catalog.collect(),
            Lane::Bottom => catalog.rev().collect(),
        }
    }

    /// Width of one copy of a row's content, once there is content.
    pub fn carousel_half_width(&self) -> Option<f64> {
        let count = self.search.catalog().len();
        (count > 0).then(|| (count * CARD_WIDTH) as f64)
    }

    pub fn tick(&mut self, dt: Duration) {
        let half = self.carousel_half_width();
        self.carousel.tick(dt, half, half);
    }

    pub fn switch_lane(&mut self) {
        self.home.lane = match self.home.lane {
            Lane::Top => Lane::Bottom,
            Lane::Bottom => Lane::Top,
        };
    }

    /// Arrow key on the focused row: along its travel is a forward boost,
    /// against it a backward one.
    pub fn carousel_arrow(&mut self, key: Direction) {
        let lane = self.home.lane;
        let gesture = if key == self.carousel.row(lane).natural() {
            Gesture::Forward
        } else {
            Gesture::Backward
        };
        self.carousel.boost(lane, gesture);
    }

    /// Recipe card at the left edge of a row.
    pub fn carousel_front(&self, lane: Lane) -> Option<&Recipe> {
        let half = self.carousel_half_width()?;
        let recipes = self.carousel_recipes(lane);
        let start = self.carousel.row(lane).window_start(half);
        let index = (start / CARD_WIDTH as f64).floor() as usize % recipes.len().max(1);
        recipes.get(index).copied()
    }

    // Home search

    /// Recipes listed under the search box.
    pub fn home_results(&self) -> &[Recipe] {
        match self.search.last_source() {
            Some(_) => self.search.results(),
            None => self.search.catalog(),
        }
    }

    pub fn run_search(&mut self) {
        let mut filter = self.home.filter.clone();
        filter.query = self.home.query.value.clone();
        let source = self.search.search(self.api.as_ref(), filter);
        if source == ResultSource::Local {
            tracing::info!("Showing locally filtered results");
        }
        self.home.results = ListCursor::default();
    }

    pub fn toggle_filter_at_cursor(&mut self) {
        let Some(entry) = filter_entries().get(self.home.filter_cursor).copied() else {
            return;
        };
        match entry {
            FilterEntry::Time(i) => self.home.filter.toggle_time(TIME_BUCKETS[i]),
            FilterEntry::Tag(tag) => self.home.filter.toggle_tag(tag),
        }
        self.run_search();
    }

    pub fn clear_filters(&mut self) {
        self.home.filter = SearchFilter::default();
        self.home.query.clear();
        self.run_search();
    }

    // Recipes

    pub fn open_recipe(&mut self, id: &str) {
        self.navigate(Screen::RecipeDetail(id.to_string()));
    }

    fn load_detail(&mut self, id: &str) {
        match self.api.get_recipe(id) {
            Ok(recipe) => {
                let saved = self.albums.is_recipe_saved(&recipe.id);
                self.detail = Some(RecipeDetail { recipe, saved });
            }
            Err(e) => {
                self.detail = None;
                self.notify("Error", format!("Failed to fetch recipe: {e}"));
            }
        }
    }

    pub fn is_owner(&self, recipe: &Recipe) -> bool {
        self.session.user_id() == Some(recipe.user_id.as_str())
    }

    fn load_my_recipes(&mut self) {
        let Some(user_id) = self.session.user_id() else {
            return;
        };
        match self.api.recipes_by_owner(user_id) {
            Ok(recipes) => self.my_recipes = recipes,
            Err(e) => self.notify("Error", format!("Failed to fetch your recipes: {e}")),
        }
        self.my_recipes_cursor.clamp(self.my_recipes.len());
    }

    pub fn new_recipe(&mut self) {
        self.editor = RecipeForm::default();
        self.navigate(Screen::Editor);
    }

    pub fn edit_current_recipe(&mut self) {
        let Some(detail) = &self.detail else {
            return;
        };
        if !self.is_owner(&detail.recipe) {
            return;
        }
        self.editor = RecipeForm::for_recipe(&detail.recipe);
        self.navigate(Screen::Editor);
    }

    pub fn request_delete_recipe(&mut self) {
        let Some(detail) = &self.detail else {
            return;
        };
        if !self.is_owner(&detail.recipe) {
            return;
        }
        self.overlay = Some(Overlay::Confirm {
            message: format!("Delete \"{}\"? This cannot be undone.", detail.recipe.title),
            action: PendingAction::DeleteRecipe(detail.recipe.id.clone()),
        });
    }

    pub fn submit_recipe(&mut self) {
        let draft = match self.editor.to_draft() {
            Ok(draft) => draft,
            Err(errors) => {
                self.editor.errors = errors;
                return;
            }
        };

        let result = match &self.editor.editing {
            Some(id) => self.api.update_recipe(id, &draft),
            None => self.api.create_recipe(&draft),
        };

        match result {
            Ok(recipe) => {
                let id = recipe.id.clone();
                self.search.upsert(recipe);
                self.editor = RecipeForm::default();
                self.replace(Screen::RecipeDetail(id));
                self.notify("Saved", "Recipe saved");
            }
            Err(e) => self.editor.errors = vec![e.to_string()],
        }
    }

    // Albums

    /// Open the save dialog for the recipe on screen.
    pub fn request_save(&mut self) {
        let Some(detail) = &self.detail else {
            return;
        };
        if !self.session.is_signed_in() {
            self.notify("Sign in required", "Sign in to save recipes to your albums");
            return;
        }
        let recipe_id = detail.recipe.id.clone();
        if self.albums.albums().is_empty() {
            self.albums.load(self.api.as_ref(), self.session.user_id());
        }
        self.overlay = Some(Overlay::AlbumPicker(AlbumPicker {
            recipe_id,
            cursor: ListCursor::default(),
            new_album: None,
        }));
    }

    /// Enter on the save dialog.
    pub fn picker_choose(&mut self) {
        let Some(Overlay::AlbumPicker(picker)) = &mut self.overlay else {
            return;
        };

        if let Some(name) = &picker.new_album {
            let name = name.trimmed().to_string();
            if name.is_empty() {
                return;
            }
            let recipe_id = picker.recipe_id.clone();
            let color = self.config.default_album_color.clone();
            match self.albums.create(self.api.as_ref(), &name, Some(&color)) {
                Ok(album) => self.save_to_album(&album.id, &recipe_id),
                Err(e) => self.notify("Error", e.to_string()),
            }
            return;
        }

        let index = picker.cursor.selected;
        let recipe_id = picker.recipe_id.clone();
        match self.albums.albums().get(index).map(|a| a.id.clone()) {
            Some(album_id) => self.save_to_album(&album_id, &recipe_id),
            None => picker.new_album = Some(TextField::new("Album name")),
        }
    }

    fn save_to_album(&mut self, album_id: &str, recipe_id: &str) {
        match self.albums.add_recipe(self.api.as_ref(), album_id, recipe_id) {
            Ok(AddOutcome::Added(album)) => {
                if let Some(detail) = &mut self.detail {
                    detail.saved = self.albums.is_recipe_saved(&detail.recipe.id);
                }
                self.notify("Saved", format!("Saved to {}", album.name));
            }
            Ok(AddOutcome::AlreadySaved) => {
                self.notify("Already saved", "Already saved to this album");
            }
            Err(e) => self.notify("Error", e.to_string()),
        }
    }

    pub fn open_album_create(&mut self) {
        self.overlay = Some(Overlay::AlbumCreate(AlbumForm::default()));
    }

    pub fn submit_album_create(&mut self) {
        let Some(Overlay::AlbumCreate(form)) = &mut self.overlay else {
            return;
        };
        let name = match form.validate() {
            Ok(name) => name,
            Err(message) => {
                form.error = Some(message);
                return;
            }
        };
        let color = form.color();
        match self.albums.create(self.api.as_ref(), &name, Some(color)) {
            Ok(_) => {
                self.overlay = None;
                self.albums_cursor.selected = self.albums.albums().len().saturating_sub(1);
            }
            Err(e) => form.error = Some(e.to_string()),
        }
    }

    pub fn request_delete_album(&mut self) {
        let Some(album) = self.albums.albums().get(self.albums_cursor.selected) else {
            return;
        };
        self.overlay = Some(Overlay::Confirm {
            message: format!("Delete album \"{}\"?", album.name),
            action: PendingAction::DeleteAlbum(album.id.clone()),
        });
    }

    pub fn open_selected_album(&mut self) {
        if let Some(id) = self
            .albums
            .albums()
            .get(self.albums_cursor.selected)
            .map(|a| a.id.clone())
        {
            self.navigate(Screen::AlbumDetail(id));
        }
    }

    fn load_album_detail(&mut self, id: &str) {
        match self.albums.get_by_id(self.api.as_ref(), id) {
            Ok(album) => self.album_detail = Some(album),
            Err(e) => {
                self.album_detail = None;
                self.notify("Error", e.to_string());
            }
        }
        let count = self
            .album_detail
            .as_ref()
            .map_or(0, |a| a.resolved_recipes().count());
        self.album_detail_cursor.clamp(count);
    }

    /// Recipe under the cursor on the album screen.
    pub fn album_detail_selected(&self) -> Option<&Recipe> {
        self.album_detail
            .as_ref()?
            .resolved_recipes()
            .nth(self.album_detail_cursor.selected)
    }

    pub fn request_remove_from_album(&mut self) {
        let Some(album) = &self.album_detail else {
            return;
        };
        let Some(recipe) = self.album_detail_selected() else {
            return;
        };
        self.overlay = Some(Overlay::Confirm {
            message: format!("Remove \"{}\" from {}?", recipe.title, album.name),
            action: PendingAction::RemoveFromAlbum {
                album_id: album.id.clone(),
                recipe_id: recipe.id.clone(),
            },
        });
    }

    /// Run the action behind a confirmation dialog.
    pub fn confirm(&mut self) {
        let Some(Overlay::Confirm { action, .. }) = self.overlay.take() else {
            return;
        };

        match action {
            PendingAction::DeleteRecipe(id) => match self.api.delete_recipe(&id) {
                Ok(()) => {
                    self.search.forget(&id);
                    self.detail = None;
                    self.replace(Screen::MyRecipes);
                    self.notify("Deleted", "Recipe deleted");
                }
                Err(e) => self.notify("Error", format!("Failed to delete recipe: {e}")),
            },
            PendingAction::DeleteAlbum(id) => {
                match self.albums.delete(self.api.as_ref(), &id) {
                    Ok(()) => self.albums_cursor.clamp(self.albums.albums().len()),
                    Err(e) => self.notify("Error", e.to_string()),
                }
            }
            PendingAction::RemoveFromAlbum {
                album_id,
                recipe_id,
            } => match self
                .albums
                .remove_recipe(self.api.as_ref(), &album_id, &recipe_id)
            {
                Ok(_) => self.load_album_detail(&album_id),
                Err(e) => self.notify("Error", e.to_string()),
            },
        }
    }

    // Quick find

    pub fn open_quick_find(&mut self) {
        self.overlay = Some(Overlay::QuickFind(QuickFind {
            query: TextField::new("Find"),
            ..QuickFind::default()
        }));
    }

    pub fn update_quick_find(&mut self) {
        let Some(Overlay::QuickFind(find)) = &mut self.overlay else {
            return;
        };
        find.results = quick_find(self.search.catalog(), &find.query.value, QUICK_FIND_LIMIT)
            .into_iter()
            .cloned()
            .collect();
        find.cursor = ListCursor::default();
    }

    pub fn select_quick_find(&mut self) {
        let Some(Overlay::QuickFind(find)) = &self.overlay else {
            return;
        };
        let Some(id) = find.results.get(find.cursor.selected).map(|r| r.id.clone()) else {
            return;
        };
        self.overlay = None;
        self.open_recipe(&id);
    }

    // Session

    pub fn submit_sign_in(&mut self) {
        self.sign_in.error = None;
        match self.sign_in.step {
            SignInStep::Credentials => {
                let (username, password) = match self.sign_in.validate_credentials() {
                    Ok(v) => v,
                    Err(message) => {
                        self.sign_in.error = Some(message);
                        return;
                    }
                };
                if let Err(e) = self.session.login(self.api.as_ref(), &username, &password) {
                    self.sign_in.error = Some(e.to_string());
                    return;
                }
                self.albums.load(self.api.as_ref(), self.session.user_id());
                self.sign_in = SignInForm::default();
                let target = self.after_sign_in.take().unwrap_or(Screen::Home);
                self.replace(target);
            }
            SignInStep::ForgotRequest => {
                let username = match self.sign_in.validate_forgot() {
                    Ok(v) => v,
                    Err(message) => {
                        self.sign_in.error = Some(message);
                        return;
                    }
                };
                match self.session.forgot_password(self.api.as_ref(), &username) {
                    Ok(_) => {
                        self.sign_in.step = SignInStep::ForgotConfirm;
                        self.sign_in.info =
                            Some(format!("A reset code was sent to {username}"));
                    }
                    Err(e) => self.sign_in.error = Some(e.to_string()),
                }
            }
            SignInStep::ForgotConfirm => {
                let (code, password) = match self.sign_in.validate_reset() {
                    Ok(v) => v,
                    Err(message) => {
                        self.sign_in.error = Some(message);
                        return;
                    }
                };
                let username = self.sign_in.forgot.value(0).to_string();
                match self.session.confirm_forgot_password(
                    self.api.as_ref(),
                    &username,
                    &code,
                    &password,
                ) {
                    Ok(_) => {
                        self.sign_in = SignInForm::default();
                        self.sign_in.credentials.fields[0].value = username;
                        self.sign_in.credentials.focus = 1;
                        self.sign_in.info =
                            Some("Password reset. Sign in with your new password.".to_string());
                    }
                    Err(e) => self.sign_in.error = Some(e.to_string()),
                }
            }
        }
    }

    pub fn start_forgot_password(&mut self) {
        self.sign_in.step = SignInStep::ForgotRequest;
        self.sign_in.forgot.fields[0].value = self.sign_in.credentials.value(0).to_string();
        self.sign_in.error = None;
        self.sign_in.info = None;
    }

    pub fn cancel_forgot_password(&mut self) {
        self.sign_in.step = SignInStep::Credentials;
        self.sign_in.error = None;
        self.sign_in.info = None;
    }

    pub fn submit_sign_up(&mut self) {
        self.sign_up.error = None;
        match self.sign_up.step {
            SignUpStep::Details => {
                let request = match self.sign_up.validate_details() {
                    Ok(request) => request,
                    Err(message) => {
                        self.sign_up.error = Some(message);
                        return;
                    }
                };
                match self.session.sign_up(self.api.as_ref(), &request) {
                    Ok(_) => {
                        self.sign_up.pending_username = Some(request.username);
                        self.sign_up.step = SignUpStep::Confirm;
                    }
                    Err(e) => self.sign_up.error = Some(e.to_string()),
                }
            }
            SignUpStep::Confirm => {
                let code = match self.sign_up.validate_code() {
                    Ok(code) => code,
                    Err(message) => {
                        self.sign_up.error = Some(message);
                        return;
                    }
                };
                let Some(username) = self.sign_up.pending_username.clone() else {
                    self.sign_up.step = SignUpStep::Details;
                    return;
                };
                match self
                    .session
                    .confirm_sign_up(self.api.as_ref(), &username, &code)
                {
                    Ok(_) => {
                        self.sign_up = SignUpForm::default();
                        self.sign_in = SignInForm::default();
                        self.sign_in.credentials.fields[0].value = username;
                        self.sign_in.credentials.focus = 1;
                        self.sign_in.info =
                            Some("Account confirmed. You can sign in now.".to_string());
                        self.replace(Screen::SignIn);
                    }
                    Err(e) => self.sign_up.error = Some(e.to_string()),
                }
            }
        }
    }

    pub fn logout(&mut self) {
        self.session.logout(self.api.as_ref());
        self.albums.clear();
        self.my_recipes.clear();
        self.album_detail = None;
        self.profile_recipe_count = None;
        self.history.retain(|s| !s.requires_auth());
        self.replace(Screen::Home);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recipebox_core::memory::{DEMO_PASSWORD, DEMO_USERNAME};
    use recipebox_core::MemoryBackend;

    fn demo_app() -> App {
        let mut app = App::new(Box::new(MemoryBackend::demo()), Config::default());
        app.start();
        app
    }

    fn signed_out_app() -> App {
        let backend = MemoryBackend::demo();
        backend.expire_session();
        let mut app = App::new(Box::new(backend), Config::default());
        app.start();
        app
    }

    fn notice(app: &App) -> Option<&str> {
        match &app.overlay {
            Some(Overlay::Notice { message, .. }) => Some(message),
            _ => None,
        }
    }

    #[test]
    fn start_loads_catalog_and_session() {
        let app = demo_app();
        assert!(app.session.is_signed_in());
        assert_eq!(app.search.catalog().len(), 8);
        assert_eq!(app.albums.albums().len(), 1);
        assert!(app.carousel.is_running());
        assert!(app.overlay.is_none());
    }

    #[test]
    fn protected_screen_redirects_then_resumes() {
        let mut app = signed_out_app();
        app.navigate(Screen::Albums);
        assert_eq!(app.screen, Screen::SignIn);

        app.sign_in.credentials.fields[0].value = DEMO_USERNAME.into();
        app.sign_in.credentials.fields[1].value = DEMO_PASSWORD.into();
        app.submit_sign_in();

        assert_eq!(app.screen, Screen::Albums);
        assert_eq!(app.albums.albums().len(), 1);
    }

    #[test]
    fn bad_password_stays_on_sign_in() {
        let mut app = signed_out_app();
        app.navigate(Screen::SignIn);
        app.sign_in.credentials.fields[0].value = DEMO_USERNAME.into();
        app.sign_in.credentials.fields[1].value = "nope".into();
        app.submit_sign_in();
        assert_eq!(app.screen, Screen::SignIn);
        assert_eq!(
            app.sign_in.error.as_deref(),
            Some("Incorrect username or password.")
        );
    }

    #[test]
    fn leaving_home_stops_carousel() {
        let mut app = demo_app();
        app.navigate(Screen::Perks);
        assert!(!app.carousel.is_running());
        app.back();
        assert_eq!(app.screen, Screen::Home);
        assert!(app.carousel.is_running());
    }

    #[test]
    fn leaving_home_mid_gesture_restores_base_motion() {
        let mut app = demo_app();
        app.carousel_arrow(Direction::Right);
        assert_eq!(app.carousel.row(Lane::Top).direction(), Direction::Right);

        app.navigate(Screen::Perks);
        app.back();
        for _ in 0..300 {
            app.tick(Duration::from_millis(16));
        }

        let top = app.carousel.row(Lane::Top);
        assert_eq!(top.direction(), top.natural());
        assert_eq!(top.speed(), 0.3);
        assert!(!top.is_busy());
    }

    #[test]
    fn arrow_keys_map_to_gestures() {
        let mut app = demo_app();
        app.carousel_arrow(Direction::Left);
        assert_eq!(app.carousel.row(Lane::Top).speed(), 7.0);

        app.switch_lane();
        app.carousel_arrow(Direction::Left);
        let bottom = app.carousel.row(Lane::Bottom);
        assert_eq!(bottom.speed(), 4.0);
        assert_eq!(bottom.direction(), Direction::Left);
    }

    #[test]
    fn carousel_front_follows_scroll() {
        let mut app = demo_app();
        assert_eq!(
            app.carousel_front(Lane::Top).map(|r| r.title.as_str()),
            Some("Lemon Garlic Chicken")
        );
        app.tick(Duration::from_millis(16));
        assert!(app.carousel_front(Lane::Bottom).is_some());
    }

    #[test]
    fn filter_toggle_runs_search() {
        let mut app = demo_app();
        let vegan = filter_entries()
            .iter()
            .position(|e| *e == FilterEntry::Tag("vegan"))
            .unwrap();
        app.home.filter_cursor = vegan;
        app.toggle_filter_at_cursor();

        let titles: Vec<_> = app.home_results().iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Chickpea Curry"]);

        app.clear_filters();
        assert_eq!(app.home_results().len(), 8);
    }

    #[test]
    fn duplicate_save_shows_already_saved() {
        let mut app = demo_app();
        let saved_id = app.albums.albums()[0].recipe_ids()[0].clone();
        app.open_recipe(&saved_id);
        assert!(app.detail.as_ref().unwrap().saved);

        app.request_save();
        app.picker_choose();
        assert_eq!(notice(&app), Some("Already saved to this album"));
    }

    #[test]
    fn save_into_new_album_from_dialog() {
        let mut app = demo_app();
        let id = app.search.catalog()[5].id.clone();
        app.open_recipe(&id);
        assert!(!app.detail.as_ref().unwrap().saved);

        app.request_save();
        if let Some(Overlay::AlbumPicker(picker)) = &mut app.overlay {
            picker.cursor.selected = 1;
        }
        app.picker_choose();
        if let Some(Overlay::AlbumPicker(picker)) = &mut app.overlay {
            picker.new_album.as_mut().unwrap().value = "Fish".into();
        }
        app.picker_choose();

        assert_eq!(notice(&app), Some("Saved to Fish"));
        assert!(app.detail.as_ref().unwrap().saved);
        assert_eq!(app.albums.albums().len(), 2);
    }

    #[test]
    fn signed_out_save_prompts_sign_in() {
        let mut app = signed_out_app();
        let id = app.search.catalog()[0].id.clone();
        app.open_recipe(&id);
        app.request_save();
        assert_eq!(notice(&app), Some("Sign in to save recipes to your albums"));
    }

    #[test]
    fn delete_recipe_after_confirmation() {
        let mut app = demo_app();
        let id = app.search.catalog()[0].id.clone();
        app.open_recipe(&id);
        app.request_delete_recipe();
        assert!(matches!(app.overlay, Some(Overlay::Confirm { .. })));

        app.confirm();
        assert_eq!(app.screen, Screen::MyRecipes);
        assert_eq!(app.my_recipes.len(), 7);
        assert!(app.search.catalog().iter().all(|r| r.id != id));
    }

    #[test]
    fn editor_creates_recipe() {
        let mut app = demo_app();
        app.new_recipe();
        assert_eq!(app.screen, Screen::Editor);

        app.submit_recipe();
        assert_eq!(app.editor.errors.len(), 4);

        app.editor.title.value = "Toast".into();
        app.editor.minutes.value = "3".into();
        app.editor.description.value = "Crunchy".into();
        app.editor.ingredients.value = "bread, butter".into();
        app.submit_recipe();

        assert!(matches!(app.screen, Screen::RecipeDetail(_)));
        assert_eq!(app.detail.as_ref().unwrap().recipe.title, "Toast");
        assert_eq!(app.search.catalog().len(), 9);
    }

    #[test]
    fn remove_from_album_refetches() {
        let mut app = demo_app();
        app.navigate(Screen::Albums);
        app.open_selected_album();
        assert_eq!(app.album_detail.as_ref().unwrap().valid_recipe_count(), 2);

        app.request_remove_from_album();
        app.confirm();
        assert_eq!(app.album_detail.as_ref().unwrap().valid_recipe_count(), 1);
    }

    #[test]
    fn profile_counts_recipes() {
        let mut app = demo_app();
        app.navigate(Screen::Profile);
        assert_eq!(app.profile_recipe_count, Some(8));
    }

    #[test]
    fn logout_drops_protected_history() {
        let mut app = demo_app();
        app.navigate(Screen::Albums);
        app.navigate(Screen::Profile);
        app.logout();
        assert_eq!(app.screen, Screen::Home);
        assert!(app.albums.albums().is_empty());

        app.navigate(Screen::Perks);
        app.back();
        assert_eq!(app.screen, Screen::Home);
    }

    #[test]
    fn forgot_password_flow() {
        let mut app = signed_out_app();
        app.navigate(Screen::SignIn);
        app.start_forgot_password();
        app.sign_in.forgot.fields[0].value = DEMO_USERNAME.into();
        app.submit_sign_in();
        assert_eq!(app.sign_in.step, SignInStep::ForgotConfirm);

        app.sign_in.reset.fields[0].value = recipebox_core::memory::RESET_CODE.into();
        app.sign_in.reset.fields[1].value = "Fresh-pass2".into();
        app.sign_in.reset.fields[2].value = "Fresh-pass2".into();
        app.submit_sign_in();
        assert_eq!(app.sign_in.step, SignInStep::Credentials);
        assert_eq!(app.sign_in.credentials.value(0), DEMO_USERNAME);

        app.sign_in.credentials.fields[1].value = "Fresh-pass2".into();
        app.submit_sign_in();
        assert!(app.session.is_signed_in());
    }

    #[test]
    fn quick_find_opens_recipe() {
        let mut app = demo_app();
        app.open_quick_find();
        if let Some(Overlay::QuickFind(find)) = &mut app.overlay {
            find.query.value = "chili".into();
        }
        app.update_quick_find();
        app.select_quick_find();
        assert!(app.overlay.is_none());
        assert_eq!(app.detail.as_ref().unwrap().recipe.title, "Beef Chili");
    }
}
