//! Recipe search: filter matching, the search state holder and quick-find.

use crate::api::RecipeApi;
use crate::error::Result;
use crate::models::Recipe;
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

/// A cooking-time range. `max` is exclusive; `None` means open-ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeBucket {
    pub label: &'static str,
    pub min: u32,
    pub max: Option<u32>,
}

impl TimeBucket {
    pub fn contains(&self, minutes: i64) -> bool {
        minutes >= i64::from(self.min) && self.max.map_or(true, |max| minutes < i64::from(max))
    }
}

pub const TIME_BUCKETS: [TimeBucket; 4] = [
    TimeBucket {
        label: "Quick (0-15 min)",
        min: 0,
        max: Some(15),
    },
    TimeBucket {
        label: "Fast (15-30 min)",
        min: 15,
        max: Some(30),
    },
    TimeBucket {
        label: "Medium (30-60 min)",
        min: 30,
        max: Some(60),
    },
    TimeBucket {
        label: "Long (60+ min)",
        min: 60,
        max: None,
    },
];

/// The filters a user can combine on the home screen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchFilter {
    pub query: String,
    pub tags: Vec<String>,
    pub time: Option<TimeBucket>,
}

impl SearchFilter {
    fn trimmed_query(&self) -> Option<&str> {
        let q = self.query.trim();
        (!q.is_empty()).then_some(q)
    }

    /// True when no filter is active.
    pub fn is_empty(&self) -> bool {
        self.trimmed_query().is_none() && self.tags.is_empty() && self.time.is_none()
    }

    pub fn toggle_tag(&mut self, tag: &str) {
        if let Some(pos) = self.tags.iter().position(|t| t == tag) {
            self.tags.remove(pos);
        } else {
            self.tags.push(tag.to_string());
        }
    }

    /// Select a bucket, or clear it when it is already selected.
    pub fn toggle_time(&mut self, bucket: TimeBucket) {
        if self.time == Some(bucket) {
            self.time = None;
        } else {
            self.time = Some(bucket);
        }
    }

    pub fn to_params(&self) -> SearchParams {
        SearchParams {
            query: self.trimmed_query().map(str::to_string),
            tags: self.tags.clone(),
            min_time: self.time.map(|b| b.min),
            max_time: self.time.and_then(|b| b.max),
        }
    }
}

/// Query parameters for the remote search endpoint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchParams {
    pub query: Option<String>,
    pub tags: Vec<String>,
    pub min_time: Option<u32>,
    pub max_time: Option<u32>,
}

impl SearchParams {
    /// `q`, `tags` (comma-joined), `minTime`, `maxTime`, each only when set.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(q) = &self.query {
            pairs.push(("q", q.clone()));
        }
        if !self.tags.is_empty() {
            pairs.push(("tags", self.tags.join(",")));
        }
        if let Some(min) = self.min_time {
            pairs.push(("minTime", min.to_string()));
        }
        if let Some(max) = self.max_time {
            pairs.push(("maxTime", max.to_string()));
        }
        pairs
    }
}

fn matches_query(recipe: &Recipe, query_lower: &str) -> bool {
    recipe.title.to_lowercase().contains(query_lower)
        || recipe
            .tags
            .iter()
            .any(|tag| tag.to_lowercase().contains(query_lower))
}

fn matches_tags(recipe: &Recipe, selected: &[String]) -> bool {
    selected.iter().all(|tag| recipe.has_tag(tag))
}

fn matches_time(recipe: &Recipe, bucket: &TimeBucket) -> bool {
    recipe.time.minutes().is_some_and(|m| bucket.contains(m))
}

/// Whether `recipe` passes every active filter.
pub fn matches(recipe: &Recipe, filter: &SearchFilter) -> bool {
    let query_ok = filter
        .trimmed_query()
        .map_or(true, |q| matches_query(recipe, &q.to_lowercase()));
    let tags_ok = matches_tags(recipe, &filter.tags);
    let time_ok = filter.time.as_ref().map_or(true, |b| matches_time(recipe, b));
    query_ok && tags_ok && time_ok
}

pub fn filter_recipes(recipes: &[Recipe], filter: &SearchFilter) -> Vec<Recipe> {
    recipes
        .iter()
        .filter(|r| matches(r, filter))
        .cloned()
        .collect()
}

/// Where the current results came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultSource {
    /// No filter was active; results are the whole catalog.
    Catalog,
    Remote,
    /// The remote search failed and the cached catalog was filtered locally.
    Local,
}

/// Holds the recipe catalog and the last computed result set.
#[derive(Debug, Default)]
pub struct SearchStore {
    catalog: Vec<Recipe>,
    results: Vec<Recipe>,
    filter: SearchFilter,
    source: Option<ResultSource>,
}

impl SearchStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch every recipe into the catalog.
    pub fn load_catalog<A: RecipeApi + ?Sized>(&mut self, api: &A) -> Result<usize> {
        self.catalog = api.list_recipes()?;
        tracing::info!("Loaded {} recipes", self.catalog.len());
        Ok(self.catalog.len())
    }

    pub fn catalog(&self) -> &[Recipe] {
        &self.catalog
    }

    pub fn set_catalog(&mut self, recipes: Vec<Recipe>) {
        self.catalog = recipes;
    }

    /// Run a search, preferring the remote endpoint.
    pub fn search<A: RecipeApi + ?Sized>(&mut self, api: &A, filter: SearchFilter) -> ResultSource {
        let source = if filter.is_empty() {
            self.results = self.catalog.clone();
            ResultSource::Catalog
        } else {
            match api.search_recipes(&filter.to_params()) {
                Ok(found) => {
                    self.results = found;
                    ResultSource::Remote
                }
                Err(e) => {
                    tracing::warn!("Search request failed, filtering locally: {}", e);
                    self.results = filter_recipes(&self.catalog, &filter);
                    ResultSource::Local
                }
            }
        };

        tracing::info!("Search found {} recipes ({:?})", self.results.len(), source);
        self.filter = filter;
        self.source = Some(source);
        source
    }

    pub fn results(&self) -> &[Recipe] {
        &self.results
    }

    pub fn last_filter(&self) -> &SearchFilter {
        &self.filter
    }

    pub fn last_source(&self) -> Option<ResultSource> {
        self.source
    }

    /// Insert or replace a recipe after a create or edit.
    pub fn upsert(&mut self, recipe: Recipe) {
        for list in [&mut self.catalog, &mut self.results] {
            if let Some(existing) = list.iter_mut().find(|r| r.id == recipe.id) {
                *existing = recipe.clone();
            }
        }
        if !self.catalog.iter().any(|r| r.id == recipe.id) {
            self.catalog.push(recipe);
        }
    }

    /// Drop a deleted recipe from the catalog and results.
    pub fn forget(&mut self, recipe_id: &str) {
        self.catalog.retain(|r| r.id != recipe_id);
        self.results.retain(|r| r.id != recipe_id);
    }
}

/// Fuzzy-rank recipes by title and tags, best first.
pub fn quick_find<'a>(recipes: &'a [Recipe], pattern: &str, limit: usize) -> Vec<&'a Recipe> {
    if pattern.trim().is_empty() {
        return Vec::new();
    }

    let matcher = SkimMatcherV2::default();
    let mut scored: Vec<_> = recipes
        .iter()
        .filter_map(|recipe| {
            let text = format!("{} {}", recipe.title, recipe.tags.join(" "));
            matcher
                .fuzzy_match(&text, pattern)
                .map(|score| (score, recipe))
        })
        .collect();

    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.into_iter().take(limit).map(|(_, r)| r).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CookTime;

    fn recipe(id: &str, title: &str, tags: &[&str], time: &str) -> Recipe {
        Recipe {
            id: id.into(),
            title: title.into(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            time: CookTime::new(time),
            ..Recipe::default()
        }
    }

    fn medium() -> TimeBucket {
        TIME_BUCKETS[2]
    }

    #[test]
    fn empty_filter_matches_everything() {
        let filter = SearchFilter::default();
        assert!(filter.is_empty());
        assert!(matches(&recipe("1", "Anything", &[], "abc"), &filter));
    }

    #[test]
    fn whitespace_query_is_inactive() {
        let filter = SearchFilter {
            query: "   ".into(),
            ..SearchFilter::default()
        };
        assert!(filter.is_empty());
    }

    #[test]
    fn query_matches_title_or_tag_substring() {
        let soup = recipe("1", "Chicken Soup", &[], "30");
        let stew = recipe("2", "Beef Stew", &["chicken-free"], "90");
        let salad = recipe("3", "Salad", &["vegan"], "10");
        let filter = SearchFilter {
            query: "chicken".into(),
            ..SearchFilter::default()
        };

        let found = filter_recipes(&[soup, stew, salad], &filter);
        let ids: Vec<_> = found.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[test]
    fn query_is_case_insensitive() {
        let filter = SearchFilter {
            query: "SOUP".into(),
            ..SearchFilter::default()
        };
        assert!(matches(&recipe("1", "chicken soup", &[], ""), &filter));
    }

    #[test]
    fn tags_require_every_selected_tag() {
        let both = recipe("1", "A", &["vegan", "dinner"], "");
        let one = recipe("2", "B", &["vegan"], "");
        let filter = SearchFilter {
            tags: vec!["vegan".into(), "dinner".into()],
            ..SearchFilter::default()
        };
        assert!(matches(&both, &filter));
        assert!(!matches(&one, &filter));
    }

    #[test]
    fn time_bucket_upper_bound_is_exclusive() {
        let filter = SearchFilter {
            time: Some(medium()),
            ..SearchFilter::default()
        };
        assert!(matches(&recipe("1", "A", &[], "45"), &filter));
        assert!(matches(&recipe("2", "B", &[], "30"), &filter));
        assert!(!matches(&recipe("3", "C", &[], "60"), &filter));
        assert!(!matches(&recipe("4", "D", &[], "abc"), &filter));
    }

    #[test]
    fn open_ended_bucket() {
        let long = TIME_BUCKETS[3];
        assert!(long.contains(60));
        assert!(long.contains(600));
        assert!(!long.contains(59));
    }

    #[test]
    fn filters_combine_with_and() {
        let filter = SearchFilter {
            query: "soup".into(),
            tags: vec!["dinner".into()],
            time: Some(medium()),
        };
        assert!(matches(&recipe("1", "Soup", &["dinner"], "40"), &filter));
        assert!(!matches(&recipe("2", "Soup", &["dinner"], "10"), &filter));
        assert!(!matches(&recipe("3", "Soup", &["lunch"], "40"), &filter));
        assert!(!matches(&recipe("4", "Stew", &["dinner"], "40"), &filter));
    }

    #[test]
    fn toggles() {
        let mut filter = SearchFilter::default();
        filter.toggle_tag("vegan");
        filter.toggle_tag("dinner");
        filter.toggle_tag("vegan");
        assert_eq!(filter.tags, vec!["dinner"]);

        filter.toggle_time(medium());
        assert_eq!(filter.time, Some(medium()));
        filter.toggle_time(medium());
        assert_eq!(filter.time, None);
    }

    #[test]
    fn params_only_carry_active_filters() {
        let filter = SearchFilter {
            query: " soup ".into(),
            tags: vec!["vegan".into(), "dinner".into()],
            time: Some(TIME_BUCKETS[3]),
        };
        assert_eq!(
            filter.to_params().query_pairs(),
            vec![
                ("q", "soup".to_string()),
                ("tags", "vegan,dinner".to_string()),
                ("minTime", "60".to_string()),
            ]
        );
        assert!(SearchFilter::default().to_params().query_pairs().is_empty());
    }

    #[test]
    fn quick_find_ranks_and_limits() {
        let recipes = vec![
            recipe("1", "Chicken Soup", &["dinner"], ""),
            recipe("2", "Beef Stew", &[], ""),
            recipe("3", "Chickpea Curry", &["vegan"], ""),
        ];
        let found = quick_find(&recipes, "chick", 10);
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|r| r.title.starts_with("Chick")));
        assert_eq!(quick_find(&recipes, "chick", 1).len(), 1);
        assert!(quick_find(&recipes, "  ", 10).is_empty());
    }

    #[test]
    fn upsert_and_forget() {
        let mut store = SearchStore::new();
        store.set_catalog(vec![recipe("1", "Soup", &[], "")]);
        store.upsert(recipe("1", "Better Soup", &[], ""));
        store.upsert(recipe("2", "Stew", &[], ""));
        assert_eq!(store.catalog().len(), 2);
        assert_eq!(store.catalog()[0].title, "Better Soup");

        store.forget("1");
        assert_eq!(store.catalog().len(), 1);
        assert_eq!(store.catalog()[0].id, "2");
    }
}
