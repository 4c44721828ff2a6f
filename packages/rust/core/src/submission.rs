//! Submission form validation.
//!
//! The contribution store trusts its caller, so every required field is
//! checked here before [`ContributionStore::create`](crate::store::ContributionStore::create)
//! is called. All failing fields are reported at once.

use kmportal_shared::{
    ContributionUpdate, Contributor, FileRef, Locale, NewContribution, PortalError, Vocabulary,
};

/// A form field that can fail validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Title,
    File,
    KnowledgeTopic,
    SpecificTopic,
    TagLevel1,
    TagLevel2,
}

/// Why a field was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Issue {
    TitleRequired,
    FileRequired,
    PdfOnly,
    KnowledgeTopicRequired,
    UnknownKnowledgeTopic(String),
    SpecificTopicRequired,
    SpecificTopicNotOffered(String),
    TagLevel1Required,
    UnknownTagLevel1(String),
    UnknownTagLevel2(String),
}

impl Issue {
    pub fn field(&self) -> Field {
        match self {
            Self::TitleRequired => Field::Title,
            Self::FileRequired | Self::PdfOnly => Field::File,
            Self::KnowledgeTopicRequired | Self::UnknownKnowledgeTopic(_) => Field::KnowledgeTopic,
            Self::SpecificTopicRequired | Self::SpecificTopicNotOffered(_) => Field::SpecificTopic,
            Self::TagLevel1Required | Self::UnknownTagLevel1(_) => Field::TagLevel1,
            Self::UnknownTagLevel2(_) => Field::TagLevel2,
        }
    }

    pub fn message(&self, locale: Locale) -> String {
        match (self, locale) {
            (Self::TitleRequired, Locale::En) => "Title is required".into(),
            (Self::TitleRequired, Locale::Id) => "Judul wajib diisi".into(),
            (Self::FileRequired, Locale::En) => "PDF file is required".into(),
            (Self::FileRequired, Locale::Id) => "File PDF wajib diunggah".into(),
            (Self::PdfOnly, Locale::En) => "Only PDF files are accepted".into(),
            (Self::PdfOnly, Locale::Id) => "Hanya file PDF yang diterima".into(),
            (Self::KnowledgeTopicRequired, Locale::En) => "Knowledge topic is required".into(),
            (Self::KnowledgeTopicRequired, Locale::Id) => "Topik pengetahuan wajib dipilih".into(),
            (Self::UnknownKnowledgeTopic(id), Locale::En) => {
                format!("Unknown knowledge topic '{id}'")
            }
            (Self::UnknownKnowledgeTopic(id), Locale::Id) => {
                format!("Topik pengetahuan '{id}' tidak dikenal")
            }
            (Self::SpecificTopicRequired, Locale::En) => {
                "Specific knowledge topic is required".into()
            }
            (Self::SpecificTopicRequired, Locale::Id) => {
                "Topik pengetahuan spesifik wajib dipilih".into()
            }
            (Self::SpecificTopicNotOffered(t), Locale::En) => {
                format!("'{t}' is not a specific topic of the selected knowledge topic")
            }
            (Self::SpecificTopicNotOffered(t), Locale::Id) => {
                format!("'{t}' bukan topik spesifik dari topik pengetahuan yang dipilih")
            }
            (Self::TagLevel1Required, Locale::En) => "Document type is required".into(),
            (Self::TagLevel1Required, Locale::Id) => "Jenis dokumen wajib dipilih".into(),
            (Self::UnknownTagLevel1(id), Locale::En) => format!("Unknown document type '{id}'"),
            (Self::UnknownTagLevel1(id), Locale::Id) => {
                format!("Jenis dokumen '{id}' tidak dikenal")
            }
            (Self::UnknownTagLevel2(id), Locale::En) => format!("Unknown priority topic '{id}'"),
            (Self::UnknownTagLevel2(id), Locale::Id) => {
                format!("Topik prioritas '{id}' tidak dikenal")
            }
        }
    }
}

/// Every issue found in one draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors {
    pub issues: Vec<Issue>,
}

impl ValidationErrors {
    pub fn has(&self, field: Field) -> bool {
        self.issues.iter().any(|i| i.field() == field)
    }

    pub fn messages(&self, locale: Locale) -> Vec<String> {
        self.issues.iter().map(|i| i.message(locale)).collect()
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.messages(Locale::En).join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

impl From<ValidationErrors> for PortalError {
    fn from(errors: ValidationErrors) -> Self {
        PortalError::validation(errors.to_string())
    }
}

/// Raw submission form input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionDraft {
    pub title: String,
    pub file: Option<FileRef>,
    /// Knowledge topic id; narrows the specific-topic choices.
    pub knowledge_topic: String,
    pub specific_topic: String,
    pub tag_level1: String,
    pub tag_level2: Vec<String>,
    pub keywords: Vec<String>,
}

impl SubmissionDraft {
    /// Check the draft against `vocabulary` and turn it into store input.
    ///
    /// Tag level 3 becomes the specific topic followed by the keywords,
    /// trimmed, with blanks and repeats dropped.
    pub fn validate(
        &self,
        vocabulary: &Vocabulary,
        contributor: &Contributor,
    ) -> Result<NewContribution, ValidationErrors> {
        let mut issues = Vec::new();

        let title = self.title.trim();
        if title.is_empty() {
            issues.push(Issue::TitleRequired);
        }

        let file = match &self.file {
            None => {
                issues.push(Issue::FileRequired);
                None
            }
            Some(file) if !file.is_pdf() => {
                issues.push(Issue::PdfOnly);
                None
            }
            Some(file) => Some(file.clone()),
        };

        let knowledge_topic = self.knowledge_topic.trim();
        let offered = if knowledge_topic.is_empty() {
            issues.push(Issue::KnowledgeTopicRequired);
            None
        } else {
            let topic = vocabulary.knowledge_topic(knowledge_topic);
            if topic.is_none() {
                issues.push(Issue::UnknownKnowledgeTopic(knowledge_topic.to_string()));
            }
            topic
        };

        let specific = self.specific_topic.trim();
        if specific.is_empty() {
            issues.push(Issue::SpecificTopicRequired);
        } else if offered
            .is_some_and(|topic| !topic.specific_topics.iter().any(|t| t == specific))
        {
            issues.push(Issue::SpecificTopicNotOffered(specific.to_string()));
        }

        let tag_level1 = self.tag_level1.trim();
        if tag_level1.is_empty() {
            issues.push(Issue::TagLevel1Required);
        } else if vocabulary.document_type(tag_level1).is_none() {
            issues.push(Issue::UnknownTagLevel1(tag_level1.to_string()));
        }

        for tag in &self.tag_level2 {
            if vocabulary.priority_topic(tag).is_none() {
                issues.push(Issue::UnknownTagLevel2(tag.clone()));
            }
        }

        let file = match file {
            Some(file) if issues.is_empty() => file,
            _ => return Err(ValidationErrors { issues }),
        };

        let mut tag_level3 = vec![specific.to_string()];
        for keyword in self.keywords.iter().map(|k| k.trim()) {
            if !keyword.is_empty() && !tag_level3.iter().any(|t| t == keyword) {
                tag_level3.push(keyword.to_string());
            }
        }

        let mut tag_level2: Vec<String> = Vec::with_capacity(self.tag_level2.len());
        for tag in &self.tag_level2 {
            if !tag_level2.contains(tag) {
                tag_level2.push(tag.clone());
            }
        }

        Ok(NewContribution {
            title: title.to_string(),
            file,
            tag_level1: tag_level1.to_string(),
            tag_level2,
            tag_level3,
            contributor: contributor.clone(),
        })
    }
}

/// Check the fields a resubmission replaces. Fields left as `None` are
/// not looked at.
pub fn check_update(
    update: &ContributionUpdate,
    vocabulary: &Vocabulary,
) -> Result<(), ValidationErrors> {
    let mut issues = Vec::new();

    if update.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
        issues.push(Issue::TitleRequired);
    }
    if update.file.as_ref().is_some_and(|f| !f.is_pdf()) {
        issues.push(Issue::PdfOnly);
    }
    if let Some(tag) = update.tag_level1.as_deref() {
        if tag.trim().is_empty() {
            issues.push(Issue::TagLevel1Required);
        } else if vocabulary.document_type(tag).is_none() {
            issues.push(Issue::UnknownTagLevel1(tag.to_string()));
        }
    }
    for tag in update.tag_level2.iter().flatten() {
        if vocabulary.priority_topic(tag).is_none() {
            issues.push(Issue::UnknownTagLevel2(tag.clone()));
        }
    }
    // Tag level 3 leads with the specific topic.
    if update
        .tag_level3
        .as_ref()
        .is_some_and(|tags| tags.first().is_none_or(|t| t.trim().is_empty()))
    {
        issues.push(Issue::SpecificTopicRequired);
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(ValidationErrors { issues })
    }
}
