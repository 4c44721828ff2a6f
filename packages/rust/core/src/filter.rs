//! Explorer filtering over the published knowledge assets.
//!
//! [`TaxonomyFilter::filter`] is a pure function of the asset list and an
//! [`ExplorerQuery`]. An asset is visible only when every active predicate
//! accepts it:
//! 1. department equals the selected department
//! 2. document type equals the selected topic's derived key
//! 3. search text is a case-insensitive substring of title, a tag, or author
//! 4. status equals the status filter
//! 5. document type equals the type filter
//!
//! With nothing selected and nothing filtered the result is
//! [`FilterOutcome::PromptForSelection`] rather than an empty match list.

use std::str::FromStr;

use tracing::{debug, instrument};

use kmportal_shared::{AssetStatus, DEFAULT_MIN_QUERY_CHARS, KnowledgeAsset, derived_key};

/// An attribute filter with an "all" sentinel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AttributeFilter<T> {
    #[default]
    All,
    Only(T),
}

impl<T> AttributeFilter<T> {
    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    fn admits<U>(&self, value: &U) -> bool
    where
        T: PartialEq<U>,
        U: ?Sized,
    {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == value,
        }
    }
}

impl<T: FromStr> FromStr for AttributeFilter<T> {
    type Err = T::Err;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            s.parse().map(Self::Only)
        }
    }
}

/// Everything the explorer knows about what the user wants to see.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExplorerQuery {
    pub department: Option<String>,
    /// Selected topic id at any depth.
    pub topic: Option<String>,
    pub text: String,
    pub status: AttributeFilter<AssetStatus>,
    pub document_type: AttributeFilter<String>,
}

/// Result of a filter pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterOutcome<'a> {
    /// Nothing selected and nothing filtered: ask the user to pick a department.
    PromptForSelection,
    /// Predicates are active but no asset satisfies them.
    NoMatches,
    /// Matching assets in catalog order.
    Matches(Vec<&'a KnowledgeAsset>),
}

impl<'a> FilterOutcome<'a> {
    pub fn assets(&self) -> &[&'a KnowledgeAsset] {
        match self {
            Self::Matches(assets) => assets,
            Self::PromptForSelection | Self::NoMatches => &[],
        }
    }

    pub fn len(&self) -> usize {
        self.assets().len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets().is_empty()
    }
}

/// Stateless filter over a knowledge-asset list.
#[derive(Debug, Clone, Copy)]
pub struct TaxonomyFilter {
    min_query_chars: usize,
}

impl Default for TaxonomyFilter {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_QUERY_CHARS)
    }
}

impl TaxonomyFilter {
    /// `min_query_chars` is the shortest trimmed search text that filters.
    pub fn new(min_query_chars: usize) -> Self {
        Self {
            min_query_chars: min_query_chars.max(1),
        }
    }

    /// The lowercased search needle, or `None` while the text is too short.
    pub fn active_text(&self, text: &str) -> Option<String> {
        let trimmed = text.trim();
        (trimmed.chars().count() >= self.min_query_chars).then(|| trimmed.to_lowercase())
    }

    /// Whether `query` selects and filters nothing.
    pub fn is_unselected(&self, query: &ExplorerQuery) -> bool {
        query.department.is_none()
            && self.active_text(&query.text).is_none()
            && query.status.is_all()
            && query.document_type.is_all()
    }

    #[instrument(
        skip_all,
        fields(assets = assets.len(), department = ?query.department, topic = ?query.topic)
    )]
    pub fn filter<'a>(
        &self,
        assets: &'a [KnowledgeAsset],
        query: &ExplorerQuery,
    ) -> FilterOutcome<'a> {
        if self.is_unselected(query) {
            debug!("no selection or filter active");
            return FilterOutcome::PromptForSelection;
        }

        let needle = self.active_text(&query.text);
        let topic_key = query.topic.as_deref().map(derived_key);

        let matches: Vec<&KnowledgeAsset> = assets
            .iter()
            .filter(|asset| {
                query
                    .department
                    .as_deref()
                    .is_none_or(|dept| asset.department == dept)
            })
            .filter(|asset| topic_key.is_none_or(|key| asset.document_type == key))
            .filter(|asset| needle.as_deref().is_none_or(|n| matches_text(asset, n)))
            .filter(|asset| query.status.admits(&asset.status))
            .filter(|asset| query.document_type.admits(asset.document_type.as_str()))
            .collect();

        debug!(matched = matches.len(), "explorer filter applied");

        if matches.is_empty() {
            FilterOutcome::NoMatches
        } else {
            FilterOutcome::Matches(matches)
        }
    }
}

/// `needle` must already be lowercased.
fn matches_text(asset: &KnowledgeAsset, needle: &str) -> bool {
    asset.title.to_lowercase().contains(needle)
        || asset.tags.iter().any(|tag| tag.to_lowercase().contains(needle))
        || asset.author.to_lowercase().contains(needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(id: &str, title: &str, dept: &str, doc_type: &str, tags: &[&str]) -> KnowledgeAsset {
        KnowledgeAsset {
            id: id.into(),
            title: title.into(),
            title_id: None,
            status: AssetStatus::Official,
            department: dept.into(),
            document_type: doc_type.into(),
            author: "Dr. Linda Martinez".into(),
            date: "2024-01-10".into(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn assets() -> Vec<KnowledgeAsset> {
        let mut reference = asset(
            "a3",
            "Tower Crane Manual",
            "equipment",
            "manual-book",
            &["crane"],
        );
        reference.status = AssetStatus::Reference;
        reference.author = "Dr. David Wilson".into();
        vec![
            asset("a1", "Safety Procedures Handbook", "qhse", "prosedur", &["handbook"]),
            asset("a2", "ISO 9001 Checklist", "qhse", "standar", &["compliance"]),
            reference,
        ]
    }

    fn ids(outcome: &FilterOutcome<'_>) -> Vec<String> {
        outcome.assets().iter().map(|a| a.id.clone()).collect()
    }

    #[test]
    fn empty_query_prompts_for_selection() {
        let filter = TaxonomyFilter::default();
        let all = assets();
        assert_eq!(
            filter.filter(&all, &ExplorerQuery::default()),
            FilterOutcome::PromptForSelection
        );
    }

    #[test]
    fn short_text_counts_as_no_query() {
        let filter = TaxonomyFilter::default();
        let all = assets();
        let query = ExplorerQuery {
            text: " s ".into(),
            ..ExplorerQuery::default()
        };
        assert_eq!(filter.filter(&all, &query), FilterOutcome::PromptForSelection);
    }

    #[test]
    fn two_characters_activate_the_text_search() {
        let filter = TaxonomyFilter::default();
        assert!(filter.active_text("i").is_none());
        assert_eq!(filter.active_text("is").as_deref(), Some("is"));

        let all = assets();
        let one = ExplorerQuery {
            text: "i".into(),
            ..ExplorerQuery::default()
        };
        assert_eq!(filter.filter(&all, &one), FilterOutcome::PromptForSelection);

        let two = ExplorerQuery {
            text: "is".into(),
            ..ExplorerQuery::default()
        };
        let outcome = filter.filter(&all, &two);
        assert_ne!(outcome, FilterOutcome::PromptForSelection);
        assert_eq!(ids(&outcome), vec!["a2"]);
    }

    #[test]
    fn active_predicates_with_no_hits_are_no_matches() {
        let filter = TaxonomyFilter::default();
        let all = assets();
        let query = ExplorerQuery {
            department: Some("legal".into()),
            ..ExplorerQuery::default()
        };
        assert_eq!(filter.filter(&all, &query), FilterOutcome::NoMatches);
    }

    #[test]
    fn text_matches_title_not_unrelated_tags() {
        let filter = TaxonomyFilter::default();
        let all = assets();
        let query = ExplorerQuery {
            text: "safety".into(),
            ..ExplorerQuery::default()
        };
        assert_eq!(ids(&filter.filter(&all, &query)), ["a1"]);
    }

    #[test]
    fn text_matches_tags_and_author_case_insensitively() {
        let filter = TaxonomyFilter::default();
        let all = assets();

        let by_tag = ExplorerQuery {
            text: "COMPLIANCE".into(),
            ..ExplorerQuery::default()
        };
        assert_eq!(ids(&filter.filter(&all, &by_tag)), ["a2"]);

        let by_author = ExplorerQuery {
            text: "wilson".into(),
            ..ExplorerQuery::default()
        };
        assert_eq!(ids(&filter.filter(&all, &by_author)), ["a3"]);
    }

    #[test]
    fn department_and_topic_narrow_results() {
        let filter = TaxonomyFilter::default();
        let all = assets();

        let dept = ExplorerQuery {
            department: Some("qhse".into()),
            ..ExplorerQuery::default()
        };
        assert_eq!(ids(&filter.filter(&all, &dept)), ["a1", "a2"]);

        let topic = ExplorerQuery {
            topic: Some("qh-standar".into()),
            ..dept
        };
        assert_eq!(ids(&filter.filter(&all, &topic)), ["a2"]);
    }

    #[test]
    fn status_and_type_filters() {
        let filter = TaxonomyFilter::default();
        let all = assets();

        let status = ExplorerQuery {
            status: AttributeFilter::Only(AssetStatus::Reference),
            ..ExplorerQuery::default()
        };
        assert_eq!(ids(&filter.filter(&all, &status)), ["a3"]);

        let doc_type = ExplorerQuery {
            document_type: AttributeFilter::Only("prosedur".into()),
            ..ExplorerQuery::default()
        };
        assert_eq!(ids(&filter.filter(&all, &doc_type)), ["a1"]);
    }

    #[test]
    fn filtering_is_idempotent() {
        let filter = TaxonomyFilter::default();
        let all = assets();
        let query = ExplorerQuery {
            department: Some("qhse".into()),
            text: "is".into(),
            ..ExplorerQuery::default()
        };
        assert_eq!(filter.filter(&all, &query), filter.filter(&all, &query));
    }

    #[test]
    fn adding_predicates_never_grows_the_result() {
        let filter = TaxonomyFilter::default();
        let all = assets();

        let steps = [
            ExplorerQuery {
                department: Some("qhse".into()),
                ..ExplorerQuery::default()
            },
            ExplorerQuery {
                department: Some("qhse".into()),
                text: "linda".into(),
                ..ExplorerQuery::default()
            },
            ExplorerQuery {
                department: Some("qhse".into()),
                text: "linda".into(),
                status: AttributeFilter::Only(AssetStatus::Official),
                ..ExplorerQuery::default()
            },
            ExplorerQuery {
                department: Some("qhse".into()),
                text: "linda".into(),
                status: AttributeFilter::Only(AssetStatus::Official),
                document_type: AttributeFilter::Only("standar".into()),
                ..ExplorerQuery::default()
            },
        ];

        let sizes: Vec<usize> = steps.iter().map(|q| filter.filter(&all, q).len()).collect();
        assert_eq!(sizes, [2, 2, 2, 1]);
        assert!(sizes.windows(2).all(|w| w[1] <= w[0]));
    }

    #[test]
    fn attribute_filter_parses_all_sentinel() {
        let all: AttributeFilter<AssetStatus> = "all".parse().expect("parse");
        assert!(all.is_all());
        let only: AttributeFilter<AssetStatus> = "validated".parse().expect("parse");
        assert_eq!(only, AttributeFilter::Only(AssetStatus::Validated));
        assert!("bogus".parse::<AttributeFilter<AssetStatus>>().is_err());
    }

    #[test]
    fn min_query_chars_is_configurable() {
        let filter = TaxonomyFilter::new(4);
        assert!(filter.active_text("iso").is_none());
        assert_eq!(filter.active_text("  ISO9 ").as_deref(), Some("iso9"));
    }
}
