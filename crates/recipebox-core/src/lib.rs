//! Core models, API client and state holders for recipebox.
//!
//! This crate provides the shared types, the HTTP wrappers around the recipe
//! service and the state holders used by the terminal frontend.

pub mod albums;
pub mod api;
pub mod carousel;
pub mod error;
pub mod memory;
pub mod models;
pub mod search;
pub mod session;
pub mod tags;

pub use albums::{AddOutcome, AlbumStore};
pub use api::{AlbumApi, Api, ApiConfig, AuthApi, HttpClient, RecipeApi};
pub use carousel::{Boost, Carousel, Direction, Gesture, Lane, Row};
pub use error::{ApiError, Result};
pub use memory::MemoryBackend;
pub use models::{
    Album, AlbumId, AlbumUpdate, AuthReply, CookTime, NewAlbum, Recipe, RecipeDraft, RecipeId,
    RecipeRef, SignUp, User,
};
pub use search::{ResultSource, SearchFilter, SearchParams, SearchStore, TimeBucket};
pub use session::SessionStore;
