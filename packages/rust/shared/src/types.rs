//! Core domain types for knowledge contributions and portal users.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::PortalError;

/// Current schema version for the contribution snapshot format.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// ContributionId
// ---------------------------------------------------------------------------

/// Identifier of a contribution, stable across resubmission.
///
/// Freshly minted ids embed a UUID v7 so they sort by creation time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContributionId(String);

impl ContributionId {
    /// Mint a new unique identifier.
    pub fn generate() -> Self {
        Self(format!("contrib-{}", Uuid::now_v7()))
    }

    /// Borrow the raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ContributionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ContributionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for ContributionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Lifecycle status of a contribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContributionStatus {
    Pending,
    Approved,
    Rejected,
}

impl ContributionStatus {
    /// Every status, in review-dashboard order.
    pub const ALL: [Self; 3] = [Self::Pending, Self::Approved, Self::Rejected];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for ContributionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ContributionStatus {
    type Err = PortalError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(PortalError::validation(format!(
                "unknown contribution status '{other}'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Contribution parts
// ---------------------------------------------------------------------------

/// Reference to the uploaded document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRef {
    /// Original file name.
    pub name: String,
    /// Location the file can be fetched from.
    pub url: String,
}

impl FileRef {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }

    /// Whether the file name carries a `.pdf` extension (case-insensitive).
    pub fn is_pdf(&self) -> bool {
        std::path::Path::new(&self.name)
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
    }
}

/// Who submitted a contribution. Captured once, never changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contributor {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// The person performing a review action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reviewer {
    pub id: String,
    pub name: String,
}

impl Reviewer {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Review metadata recorded when a contribution leaves `pending`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub reviewer_id: String,
    pub reviewer_name: String,
    pub review_date: DateTime<Utc>,
}

/// Review state of a contribution.
///
/// The reviewer exists only outside `Pending`, and the rejection reason
/// only inside `Rejected`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum ReviewState {
    Pending,
    Approved { review: Review },
    Rejected { review: Review, rejection_reason: String },
}

impl ReviewState {
    pub fn status(&self) -> ContributionStatus {
        match self {
            Self::Pending => ContributionStatus::Pending,
            Self::Approved { .. } => ContributionStatus::Approved,
            Self::Rejected { .. } => ContributionStatus::Rejected,
        }
    }

    pub fn review(&self) -> Option<&Review> {
        match self {
            Self::Pending => None,
            Self::Approved { review } | Self::Rejected { review, .. } => Some(review),
        }
    }

    pub fn rejection_reason(&self) -> Option<&str> {
        match self {
            Self::Rejected {
                rejection_reason, ..
            } => Some(rejection_reason),
            Self::Pending | Self::Approved { .. } => None,
        }
    }
}

// ---------------------------------------------------------------------------
// KnowledgeContribution
// ---------------------------------------------------------------------------

/// A submitted knowledge artifact awaiting or having completed review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeContribution {
    pub id: ContributionId,
    pub title: String,
    pub file: FileRef,
    /// Document type (exactly one).
    pub tag_level1: String,
    /// Priority topics (zero or more).
    #[serde(default)]
    pub tag_level2: Vec<String>,
    /// Specific topic followed by free keywords (at least one).
    pub tag_level3: Vec<String>,
    pub contributor: Contributor,
    pub submission_date: DateTime<Utc>,
    /// Starts at 1, bumped on every resubmit.
    pub version: u32,
    #[serde(flatten)]
    pub review: ReviewState,
}

impl KnowledgeContribution {
    pub fn status(&self) -> ContributionStatus {
        self.review.status()
    }

    pub fn reviewer_id(&self) -> Option<&str> {
        self.review.review().map(|r| r.reviewer_id.as_str())
    }

    pub fn reviewer_name(&self) -> Option<&str> {
        self.review.review().map(|r| r.reviewer_name.as_str())
    }

    pub fn review_date(&self) -> Option<DateTime<Utc>> {
        self.review.review().map(|r| r.review_date)
    }

    pub fn rejection_reason(&self) -> Option<&str> {
        self.review.rejection_reason()
    }
}

/// Caller-supplied input for a new contribution.
///
/// Excludes id, status, submission date and version; the store assigns those.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewContribution {
    pub title: String,
    pub file: FileRef,
    pub tag_level1: String,
    pub tag_level2: Vec<String>,
    pub tag_level3: Vec<String>,
    pub contributor: Contributor,
}

/// Content changes applied on resubmit. `None` keeps the current value.
///
/// Identity, provenance and review fields are not part of an update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContributionUpdate {
    pub title: Option<String>,
    pub file: Option<FileRef>,
    pub tag_level1: Option<String>,
    pub tag_level2: Option<Vec<String>>,
    pub tag_level3: Option<Vec<String>>,
}

impl ContributionUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.file.is_none()
            && self.tag_level1.is_none()
            && self.tag_level2.is_none()
            && self.tag_level3.is_none()
    }
}

// ---------------------------------------------------------------------------
// Users & roles
// ---------------------------------------------------------------------------

/// Portal role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Knowledge-management administrator.
    Admin,
    /// Subject-matter expert.
    Sme,
    /// General user.
    User,
}

impl Role {
    /// Admins and SMEs work the review queue.
    pub fn can_review(self) -> bool {
        match self {
            Self::Admin | Self::Sme => true,
            Self::User => false,
        }
    }

    /// Admins and SMEs may manage explorer topics.
    pub fn can_manage(self) -> bool {
        match self {
            Self::Admin | Self::Sme => true,
            Self::User => false,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Sme => "sme",
            Self::User => "user",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A signed-in portal user. Never carries a password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
}

impl User {
    /// Provenance record for contributions this user submits.
    pub fn as_contributor(&self) -> Contributor {
        Contributor {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }

    /// Reviewer record for review actions this user performs.
    pub fn as_reviewer(&self) -> Reviewer {
        Reviewer::new(self.id.clone(), self.name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(review: ReviewState) -> KnowledgeContribution {
        KnowledgeContribution {
            id: ContributionId::from("contrib-1"),
            title: "Metode Konstruksi Deep Basement".into(),
            file: FileRef::new("metode-deep-basement.pdf", "/sample.pdf"),
            tag_level1: "metode".into(),
            tag_level2: vec!["deep-basement".into()],
            tag_level3: vec!["Excavation Method".into()],
            contributor: Contributor {
                id: "user1".into(),
                name: "Ahmad Fauzi".into(),
                email: "user1@km.local".into(),
            },
            submission_date: Utc::now(),
            version: 1,
            review,
        }
    }

    #[test]
    fn generated_ids_are_unique() {
        let a = ContributionId::generate();
        let b = ContributionId::generate();
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("contrib-"));
    }

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!(
            "Rejected".parse::<ContributionStatus>().expect("parse"),
            ContributionStatus::Rejected
        );
        assert!("archived".parse::<ContributionStatus>().is_err());
    }

    #[test]
    fn rejection_reason_only_when_rejected() {
        let review = Review {
            reviewer_id: "4".into(),
            reviewer_name: "Dr. James Chen".into(),
            review_date: Utc::now(),
        };

        let pending = sample(ReviewState::Pending);
        assert_eq!(pending.status(), ContributionStatus::Pending);
        assert!(pending.reviewer_name().is_none());
        assert!(pending.rejection_reason().is_none());

        let approved = sample(ReviewState::Approved {
            review: review.clone(),
        });
        assert_eq!(approved.reviewer_name(), Some("Dr. James Chen"));
        assert!(approved.rejection_reason().is_none());

        let rejected = sample(ReviewState::Rejected {
            review,
            rejection_reason: "Missing diagrams".into(),
        });
        assert_eq!(rejected.status(), ContributionStatus::Rejected);
        assert_eq!(rejected.rejection_reason(), Some("Missing diagrams"));
    }

    #[test]
    fn contribution_serializes_flat_status() {
        let rejected = sample(ReviewState::Rejected {
            review: Review {
                reviewer_id: "5".into(),
                reviewer_name: "Dr. Linda Martinez".into(),
                review_date: Utc::now(),
            },
            rejection_reason: "Missing diagrams".into(),
        });

        let value = serde_json::to_value(&rejected).expect("serialize");
        assert_eq!(value["status"], "rejected");
        assert_eq!(value["rejectionReason"], "Missing diagrams");
        assert_eq!(value["tagLevel1"], "metode");

        let parsed: KnowledgeContribution = serde_json::from_value(value).expect("deserialize");
        assert_eq!(parsed, rejected);
    }

    #[test]
    fn pending_contribution_has_no_review_keys() {
        let value = serde_json::to_value(sample(ReviewState::Pending)).expect("serialize");
        assert_eq!(value["status"], "pending");
        assert!(value.get("review").is_none());
        assert!(value.get("rejectionReason").is_none());
    }

    #[test]
    fn pdf_detection() {
        assert!(FileRef::new("guide.PDF", "/x").is_pdf());
        assert!(!FileRef::new("guide.docx", "/x").is_pdf());
        assert!(!FileRef::new("pdf", "/x").is_pdf());
    }

    #[test]
    fn reviewer_roles() {
        assert!(Role::Admin.can_review());
        assert!(Role::Sme.can_review());
        assert!(!Role::User.can_review());
        assert!(!Role::User.can_manage());
    }
}
