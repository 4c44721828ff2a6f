//! Domain logic for the knowledge management portal.
//!
//! The contribution lifecycle lives in [`store`], the explorer's taxonomy
//! filter and navigation in [`filter`] and [`navigation`]. Everything here
//! is synchronous and in-memory; persistence is the storage crate's job.

pub mod auth;
pub mod clock;
pub mod filter;
pub mod navigation;
pub mod review;
pub mod seed;
pub mod store;
pub mod submission;

pub use auth::{Account, AccountDirectory};
pub use clock::{Clock, SteppingClock, SystemClock};
pub use filter::{AttributeFilter, ExplorerQuery, FilterOutcome, TaxonomyFilter};
pub use navigation::{BreadcrumbTarget, ExplorerNav};
pub use review::{
    ReviewTab, authorize_resubmit, authorize_review_action, authorize_reviewer, review_queue,
};
pub use store::{ContributionStore, StatusCounts};
pub use submission::{Field, Issue, SubmissionDraft, ValidationErrors, check_update};
