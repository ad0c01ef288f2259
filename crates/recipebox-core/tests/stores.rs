use recipebox_core::memory::{DEMO_USERNAME, RESET_CODE, SIGN_UP_CODE};
use recipebox_core::{
    AddOutcome, AlbumApi, AlbumStore, AlbumUpdate, ApiError, MemoryBackend, Recipe, RecipeApi,
    RecipeDraft, ResultSource, SearchFilter, SearchParams, SearchStore, SessionStore, SignUp,
};
use std::cell::Cell;

/// Recipe source whose search endpoint is down.
struct SearchOutage {
    inner: MemoryBackend,
    calls: Cell<usize>,
}

impl RecipeApi for SearchOutage {
    fn list_recipes(&self) -> recipebox_core::Result<Vec<Recipe>> {
        self.inner.list_recipes()
    }
    fn recipes_by_owner(&self, user_id: &str) -> recipebox_core::Result<Vec<Recipe>> {
        self.inner.recipes_by_owner(user_id)
    }
    fn get_recipe(&self, id: &str) -> recipebox_core::Result<Recipe> {
        self.inner.get_recipe(id)
    }
    fn search_recipes(&self, _params: &SearchParams) -> recipebox_core::Result<Vec<Recipe>> {
        self.calls.set(self.calls.get() + 1);
        Err(ApiError::Rejected("search unavailable".into()))
    }
    fn create_recipe(&self, draft: &RecipeDraft) -> recipebox_core::Result<Recipe> {
        self.inner.create_recipe(draft)
    }
    fn update_recipe(&self, id: &str, draft: &RecipeDraft) -> recipebox_core::Result<Recipe> {
        self.inner.update_recipe(id, draft)
    }
    fn delete_recipe(&self, id: &str) -> recipebox_core::Result<()> {
        self.inner.delete_recipe(id)
    }
}

fn signed_in() -> (MemoryBackend, SessionStore, AlbumStore) {
    let backend = MemoryBackend::demo();
    let mut session = SessionStore::new();
    session.probe(&backend);
    let mut albums = AlbumStore::new();
    albums.load(&backend, session.user_id());
    (backend, session, albums)
}

fn query(text: &str) -> SearchFilter {
    SearchFilter {
        query: text.into(),
        ..SearchFilter::default()
    }
}

#[test]
fn empty_filter_returns_catalog_without_remote_call() {
    let api = SearchOutage {
        inner: MemoryBackend::demo(),
        calls: Cell::new(0),
    };
    let mut search = SearchStore::new();
    search.load_catalog(&api).unwrap();

    let source = search.search(&api, SearchFilter::default());
    assert_eq!(source, ResultSource::Catalog);
    assert_eq!(api.calls.get(), 0);
    assert_eq!(search.results().len(), search.catalog().len());
}

#[test]
fn remote_failure_falls_back_to_local_filtering() {
    let api = SearchOutage {
        inner: MemoryBackend::demo(),
        calls: Cell::new(0),
    };
    let mut search = SearchStore::new();
    search.load_catalog(&api).unwrap();

    let source = search.search(&api, query("chicken"));
    assert_eq!(source, ResultSource::Local);
    assert_eq!(api.calls.get(), 1);
    let titles: Vec<_> = search.results().iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["Lemon Garlic Chicken"]);
}

#[test]
fn remote_search_used_when_available() {
    let backend = MemoryBackend::demo();
    let mut search = SearchStore::new();
    search.load_catalog(&backend).unwrap();

    let source = search.search(&backend, query("PASTA"));
    assert_eq!(source, ResultSource::Remote);
    assert_eq!(search.results().len(), 1);
    assert_eq!(search.last_filter().query, "PASTA");
}

#[test]
fn probe_and_load_albums() {
    let (_backend, session, albums) = signed_in();
    assert_eq!(session.user_id(), Some(DEMO_USERNAME));
    assert_eq!(albums.albums().len(), 1);
}

#[test]
fn load_when_signed_out_is_empty() {
    let backend = MemoryBackend::demo();
    let mut albums = AlbumStore::new();
    albums.load(&backend, None);
    assert!(albums.albums().is_empty());
}

#[test]
fn duplicate_add_is_already_saved_and_cache_unchanged() {
    let (backend, _session, mut albums) = signed_in();
    let album = albums.albums()[0].clone();
    let recipe_id = album.recipe_ids()[0].clone();

    let outcome = albums.add_recipe(&backend, &album.id, &recipe_id).unwrap();
    assert_eq!(outcome, AddOutcome::AlreadySaved);
    assert_eq!(albums.albums()[0], album);
    assert!(albums.error().is_none());
}

#[test]
fn add_replaces_cached_album() {
    let (backend, _session, mut albums) = signed_in();
    let album_id = albums.albums()[0].id.clone();
    let catalog = backend.list_recipes().unwrap();
    let unsaved = catalog
        .iter()
        .find(|r| !albums.is_recipe_saved(&r.id))
        .unwrap()
        .id
        .clone();

    match albums.add_recipe(&backend, &album_id, &unsaved).unwrap() {
        AddOutcome::Added(album) => assert!(album.contains(&unsaved)),
        other => panic!("expected add, got {other:?}"),
    }
    assert!(albums.is_recipe_saved(&unsaved));
    assert_eq!(albums.albums_containing(&unsaved).len(), 1);
}

#[test]
fn delete_removes_only_after_server_confirms() {
    let (backend, _session, mut albums) = signed_in();
    let album_id = albums.albums()[0].id.clone();

    backend.delete_album(&album_id).unwrap();
    let err = albums.delete(&backend, &album_id).unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert_eq!(albums.albums().len(), 1, "cache untouched on failure");
    assert_eq!(albums.error(), Some("Failed to delete album"));

    let (backend, _session, mut albums) = signed_in();
    let album_id = albums.albums()[0].id.clone();
    albums.delete(&backend, &album_id).unwrap();
    assert!(albums.albums().is_empty());
}

#[test]
fn create_update_and_remove() {
    let (backend, session, mut albums) = signed_in();
    let created = albums.create(&backend, "  Desserts ", None).unwrap();
    assert_eq!(created.name, "Desserts");
    assert_eq!(created.color, recipebox_core::albums::DEFAULT_ALBUM_COLOR);
    assert_eq!(albums.albums().len(), 2);

    let renamed = albums
        .update(
            &backend,
            &created.id,
            &AlbumUpdate {
                name: Some("Sweets".into()),
                color: None,
            },
        )
        .unwrap();
    assert_eq!(renamed.name, "Sweets");
    assert_eq!(albums.cached(&created.id).map(|a| a.name.as_str()), Some("Sweets"));

    let first = albums.albums()[0].clone();
    let recipe_id = first.recipe_ids()[0].clone();
    let after = albums.remove_recipe(&backend, &first.id, &recipe_id).unwrap();
    assert!(!after.contains(&recipe_id));
    assert!(!albums.cached(&first.id).unwrap().contains(&recipe_id));
    assert!(!albums.check_saved_remote(&backend, session.user_id(), &recipe_id));
}

#[test]
fn create_failure_fills_error_slot() {
    let (backend, _session, mut albums) = signed_in();
    assert!(albums.create(&backend, "   ", Some("#FEF3C7")).is_err());
    assert_eq!(albums.error(), Some("Failed to create album"));
    assert_eq!(albums.albums().len(), 1);
}

#[test]
fn stale_refs_trigger_reload() {
    let (backend, session, mut albums) = signed_in();
    assert!(!albums.refresh_if_stale(&backend, session.user_id()));

    let victim = albums.albums()[0].recipe_ids()[0].clone();
    backend.delete_recipe(&victim).unwrap();
    albums.load(&backend, session.user_id());
    assert!(albums.albums()[0].has_stale_refs());
    assert_eq!(albums.albums()[0].valid_recipe_count(), 1);
    assert!(albums.refresh_if_stale(&backend, session.user_id()));
}

#[test]
fn check_saved_remote_without_user_is_false() {
    let (backend, _session, albums) = signed_in();
    let recipe_id = albums.albums()[0].recipe_ids()[0].clone();
    assert!(albums.check_saved_remote(&backend, Some(DEMO_USERNAME), &recipe_id));
    assert!(!albums.check_saved_remote(&backend, None, &recipe_id));
}

#[test]
fn logout_clears_session() {
    let (backend, mut session, mut albums) = signed_in();
    session.logout(&backend);
    albums.clear();
    assert!(!session.is_signed_in());
    assert!(albums.albums().is_empty());
    assert!(session.probe(&backend).is_none());
}

#[test]
fn failed_login_records_error() {
    let backend = MemoryBackend::demo();
    let mut session = SessionStore::new();
    let err = session.login(&backend, DEMO_USERNAME, "wrong").unwrap_err();
    assert_eq!(err.to_string(), "Incorrect username or password.");
    assert_eq!(session.error(), Some("Incorrect username or password."));
    session.clear_error();
    assert!(session.error().is_none());
}

#[test]
fn full_account_lifecycle() {
    let backend = MemoryBackend::new();
    let mut session = SessionStore::new();
    let request = SignUp {
        username: "bo@example.com".into(),
        password: "Str0ng!pass".into(),
        email: "bo@example.com".into(),
    };

    session.sign_up(&backend, &request).unwrap();
    assert!(session.sign_up(&backend, &request).is_err());
    assert_eq!(
        session.error(),
        Some("An account with this email already exists. Try signing in instead.")
    );

    session
        .confirm_sign_up(&backend, "bo@example.com", SIGN_UP_CODE)
        .unwrap();
    session.forgot_password(&backend, "bo@example.com").unwrap();
    session
        .confirm_forgot_password(&backend, "bo@example.com", RESET_CODE, "N3w!password")
        .unwrap();

    assert!(session.login(&backend, "bo@example.com", "Str0ng!pass").is_err());
    let user = session
        .login(&backend, "bo@example.com", "N3w!password")
        .unwrap();
    assert_eq!(user.username, "bo@example.com");
    assert!(session.error().is_none());
}

#[test]
fn catalog_upsert_and_forget() {
    let backend = MemoryBackend::demo();
    let mut search = SearchStore::new();
    search.load_catalog(&backend).unwrap();
    let before = search.catalog().len();

    let created = backend
        .create_recipe(&RecipeDraft {
            title: "Toast".into(),
            minutes: 3,
            ingredients: vec!["bread".into()],
            ..RecipeDraft::default()
        })
        .unwrap();
    search.upsert(created.clone());
    assert_eq!(search.catalog().len(), before + 1);

    search.forget(&created.id);
    assert_eq!(search.catalog().len(), before);
}
