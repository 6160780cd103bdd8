pub mod file_repository;
pub mod repository;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A component saved to the library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedComponent {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub code: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default = "default_framework")]
    pub framework: String,
    #[serde(default = "default_styling")]
    pub styling: String,
}

fn default_category() -> String {
    "Uncategorized".to_string()
}

fn default_framework() -> String {
    "react".to_string()
}

fn default_styling() -> String {
    "tailwind".to_string()
}

/// Category value that disables category filtering.
pub const ALL_CATEGORIES: &str = "all";

/// Search filter for the library listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LibraryQuery {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl LibraryQuery {
    /// Case-insensitive match on name, description or any tag, plus category.
    pub fn matches(&self, component: &SavedComponent) -> bool {
        let matches_search = match self.q.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(q) => {
                let needle = q.to_lowercase();
                component.name.to_lowercase().contains(&needle)
                    || component.description.to_lowercase().contains(&needle)
                    || component
                        .tags
                        .iter()
                        .any(|tag| tag.to_lowercase().contains(&needle))
            }
        };

        let matches_category = match self.category.as_deref() {
            None | Some(ALL_CATEGORIES) | Some("") => true,
            Some(category) => component.category == category,
        };

        matches_search && matches_category
    }
}

/// Distinct categories in library order, preceded by [`ALL_CATEGORIES`].
pub fn categories(components: &[SavedComponent]) -> Vec<String> {
    let mut out = vec![ALL_CATEGORIES.to_string()];
    for component in components {
        if !out.contains(&component.category) {
            out.push(component.category.clone());
        }
    }
    out
}

#[cfg(test)]
pub(crate) fn sample(id: &str, name: &str, category: &str, tags: &[&str]) -> SavedComponent {
    SavedComponent {
        id: id.to_string(),
        name: name.to_string(),
        description: format!("{name} description"),
        code: format!("export const {name} = () => null"),
        category: category.to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        created_at: Utc::now(),
        framework: default_framework(),
        styling: default_styling(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_query_matches_everything() {
        let c = sample("1", "PricingCard", "Cards", &[]);
        assert!(LibraryQuery::default().matches(&c));
    }

    #[test]
    fn search_is_case_insensitive_across_fields() {
        let c = sample("1", "PricingCard", "Cards", &["Gradient"]);
        let q = |s: &str| LibraryQuery {
            q: Some(s.to_string()),
            category: None,
        };
        assert!(q("pricing").matches(&c));
        assert!(q("DESCRIPTION").matches(&c));
        assert!(q("gradient").matches(&c));
        assert!(!q("navbar").matches(&c));
    }

    #[test]
    fn category_filter_and_all() {
        let c = sample("1", "NavBar", "Navigation", &[]);
        let by = |cat: &str| LibraryQuery {
            q: None,
            category: Some(cat.to_string()),
        };
        assert!(by("Navigation").matches(&c));
        assert!(by("all").matches(&c));
        assert!(!by("Cards").matches(&c));
    }

    #[test]
    fn categories_are_distinct_and_prefixed() {
        let list = vec![
            sample("1", "A", "Cards", &[]),
            sample("2", "B", "Forms", &[]),
            sample("3", "C", "Cards", &[]),
        ];
        assert_eq!(categories(&list), vec!["all", "Cards", "Forms"]);
    }

    #[test]
    fn deserializes_with_defaults() {
        let c: SavedComponent = serde_json::from_str(
            r#"{"id":"x","name":"X","code":"c","created_at":"2025-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(c.category, "Uncategorized");
        assert_eq!(c.framework, "react");
        assert!(c.tags.is_empty());
    }
}
