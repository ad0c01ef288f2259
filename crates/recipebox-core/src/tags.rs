//! Static tag taxonomy used by the filter panel and the recipe editor.

/// Category name and its allowed tags, in display order.
pub const TAXONOMY: &[(&str, &[&str])] = &[
    (
        "Meal",
        &["breakfast", "brunch", "lunch", "dinner", "dessert", "snack", "appetizer"],
    ),
    (
        "Cuisine",
        &[
            "italian",
            "mexican",
            "chinese",
            "indian",
            "japanese",
            "thai",
            "french",
            "american",
            "mediterranean",
        ],
    ),
    (
        "Diet",
        &[
            "vegetarian",
            "vegan",
            "gluten-free",
            "dairy-free",
            "keto",
            "low-carb",
            "high-protein",
        ],
    ),
    (
        "Main Ingredient",
        &["chicken", "beef", "pork", "fish", "seafood", "pasta", "rice", "tofu", "eggs"],
    ),
    (
        "Method",
        &["baked", "grilled", "fried", "slow-cooker", "one-pot", "no-cook"],
    ),
];

pub fn categories() -> impl Iterator<Item = (&'static str, &'static [&'static str])> {
    TAXONOMY.iter().copied()
}

/// Every tag, category by category.
pub fn all_tags() -> impl Iterator<Item = &'static str> {
    TAXONOMY.iter().flat_map(|(_, tags)| tags.iter().copied())
}

pub fn category_of(tag: &str) -> Option<&'static str> {
    TAXONOMY
        .iter()
        .find(|(_, tags)| tags.contains(&tag))
        .map(|(category, _)| *category)
}

pub fn is_known(tag: &str) -> bool {
    category_of(tag).is_some()
}
