//! Taxonomy, knowledge-asset, and vocabulary types.
//!
//! These are static, read-only inputs: the department → topic → sub-topic
//! tree, the published assets the explorer filters, and the tag
//! vocabularies offered by the submission form.

use serde::{Deserialize, Serialize};

use crate::error::PortalError;

// ---------------------------------------------------------------------------
// Localization
// ---------------------------------------------------------------------------

/// Display language.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    /// Bahasa Indonesia.
    Id,
}

impl std::str::FromStr for Locale {
    type Err = PortalError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Self::En),
            "id" => Ok(Self::Id),
            other => Err(PortalError::validation(format!(
                "unknown locale '{other}': expected 'en' or 'id'"
            ))),
        }
    }
}

/// A name in both supported locales.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedName {
    pub en: String,
    pub id: String,
}

impl LocalizedName {
    pub fn new(en: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            en: en.into(),
            id: id.into(),
        }
    }

    /// Same text in both locales.
    pub fn both(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            en: name.clone(),
            id: name,
        }
    }

    pub fn get(&self, locale: Locale) -> &str {
        match locale {
            Locale::En => &self.en,
            Locale::Id => &self.id,
        }
    }
}

// ---------------------------------------------------------------------------
// Departments & topics
// ---------------------------------------------------------------------------

/// A topic node. Children nest to arbitrary depth.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub id: String,
    pub name: LocalizedName,
    /// Display hint only; not recomputed from the asset list.
    pub item_count: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Topic>,
}

impl Topic {
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// The key matched against an asset's document type: the topic id
    /// with its first `-` segment removed (`qh-prosedur` → `prosedur`).
    pub fn derived_key(&self) -> &str {
        derived_key(&self.id)
    }
}

/// Strip the first `-` segment from a topic id. Ids without a dash map to
/// the empty key, which no asset carries.
pub fn derived_key(topic_id: &str) -> &str {
    topic_id.split_once('-').map_or("", |(_, rest)| rest)
}

/// Top-level taxonomy node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: String,
    pub name: LocalizedName,
    #[serde(default)]
    pub icon: String,
    /// Owning unit shown under the department name.
    #[serde(default)]
    pub owner: String,
    pub item_count: u32,
    #[serde(default)]
    pub topics: Vec<Topic>,
}

/// One step of a path from a department down to a topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crumb {
    pub id: String,
    pub name: String,
}

// ---------------------------------------------------------------------------
// Knowledge assets
// ---------------------------------------------------------------------------

/// Publication classification of a knowledge asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetStatus {
    Official,
    Validated,
    Reference,
}

impl AssetStatus {
    pub fn label(self, locale: Locale) -> &'static str {
        match (self, locale) {
            (Self::Official, Locale::En) => "Official",
            (Self::Official, Locale::Id) => "Resmi",
            (Self::Validated, Locale::En) => "Validated",
            (Self::Validated, Locale::Id) => "Tervalidasi",
            (Self::Reference, Locale::En) => "Reference",
            (Self::Reference, Locale::Id) => "Referensi",
        }
    }
}

impl std::str::FromStr for AssetStatus {
    type Err = PortalError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "official" => Ok(Self::Official),
            "validated" => Ok(Self::Validated),
            "reference" => Ok(Self::Reference),
            other => Err(PortalError::validation(format!(
                "unknown asset status '{other}'"
            ))),
        }
    }
}

/// Already-published reference material shown in the explorer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeAsset {
    pub id: String,
    pub title: String,
    /// Indonesian title, when one exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_id: Option<String>,
    pub status: AssetStatus,
    pub department: String,
    pub document_type: String,
    pub author: String,
    pub date: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl KnowledgeAsset {
    pub fn display_title(&self, locale: Locale) -> &str {
        match (locale, &self.title_id) {
            (Locale::Id, Some(title)) => title,
            _ => &self.title,
        }
    }
}

// ---------------------------------------------------------------------------
// Vocabularies
// ---------------------------------------------------------------------------

/// A selectable tag value (document type or priority topic).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagOption {
    pub id: String,
    pub name: LocalizedName,
}

/// A knowledge topic and the specific topics it offers for tag level 3.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeTopic {
    pub id: String,
    pub name: LocalizedName,
    pub specific_topics: Vec<String>,
}

/// Tag vocabularies used by the submission form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vocabulary {
    /// Tag level 1: document types.
    pub document_types: Vec<TagOption>,
    /// Tag level 2: priority topics.
    pub priority_topics: Vec<TagOption>,
    pub knowledge_topics: Vec<KnowledgeTopic>,
}

impl Vocabulary {
    pub fn document_type(&self, id: &str) -> Option<&TagOption> {
        self.document_types.iter().find(|t| t.id == id)
    }

    pub fn priority_topic(&self, id: &str) -> Option<&TagOption> {
        self.priority_topics.iter().find(|t| t.id == id)
    }

    pub fn knowledge_topic(&self, id: &str) -> Option<&KnowledgeTopic> {
        self.knowledge_topics.iter().find(|t| t.id == id)
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// The static explorer catalog: taxonomy tree plus published assets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    pub departments: Vec<Department>,
    /// Document types offered by the explorer's type filter.
    #[serde(default)]
    pub document_types: Vec<TagOption>,
    #[serde(default)]
    pub assets: Vec<KnowledgeAsset>,
}

impl Catalog {
    pub fn department(&self, id: &str) -> Option<&Department> {
        self.departments.iter().find(|d| d.id == id)
    }

    /// Path from the owning department down to `topic_id`, inclusive,
    /// named in `locale`. `None` when no department holds the topic.
    pub fn topic_path(&self, topic_id: &str, locale: Locale) -> Option<Vec<Crumb>> {
        self.departments.iter().find_map(|dept| {
            let mut path = vec![Crumb {
                id: dept.id.clone(),
                name: dept.name.get(locale).to_string(),
            }];
            find_in(&dept.topics, topic_id, locale, &mut path).then_some(path)
        })
    }

    /// Locate a topic at any depth.
    pub fn topic(&self, topic_id: &str) -> Option<&Topic> {
        self.departments
            .iter()
            .find_map(|dept| find_topic(&dept.topics, topic_id))
    }
}

fn find_in(topics: &[Topic], target: &str, locale: Locale, path: &mut Vec<Crumb>) -> bool {
    for topic in topics {
        path.push(Crumb {
            id: topic.id.clone(),
            name: topic.name.get(locale).to_string(),
        });
        if topic.id == target || find_in(&topic.children, target, locale, path) {
            return true;
        }
        path.pop();
    }
    false
}

fn find_topic<'a>(topics: &'a [Topic], target: &str) -> Option<&'a Topic> {
    topics.iter().find_map(|topic| {
        if topic.id == target {
            Some(topic)
        } else {
            find_topic(&topic.children, target)
        }
    })
}
