//! Review queue views and role checks around the contribution store.

use std::str::FromStr;

use kmportal_shared::{
    ContributionStatus, KnowledgeContribution, PortalError, Result, Reviewer, User,
};

use crate::clock::Clock;
use crate::store::ContributionStore;

/// Review dashboard tab.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReviewTab {
    All,
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl ReviewTab {
    /// The single status this tab shows, or `None` for [`ReviewTab::All`].
    pub fn status(self) -> Option<ContributionStatus> {
        match self {
            Self::All => None,
            Self::Pending => Some(ContributionStatus::Pending),
            Self::Approved => Some(ContributionStatus::Approved),
            Self::Rejected => Some(ContributionStatus::Rejected),
        }
    }
}

impl FromStr for ReviewTab {
    type Err = PortalError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        Ok(match s.parse::<ContributionStatus>()? {
            ContributionStatus::Pending => Self::Pending,
            ContributionStatus::Approved => Self::Approved,
            ContributionStatus::Rejected => Self::Rejected,
        })
    }
}

/// Contributions shown under `tab`, in collection order.
pub fn review_queue<C: Clock>(
    store: &ContributionStore<C>,
    tab: ReviewTab,
) -> Vec<&KnowledgeContribution> {
    match tab.status() {
        Some(status) => store.list_by_status(status),
        None => store.contributions().iter().collect(),
    }
}

/// The reviewer identity for `user`, if their role may review.
pub fn authorize_reviewer(user: &User) -> Result<Reviewer> {
    if user.role.can_review() {
        Ok(user.as_reviewer())
    } else {
        Err(PortalError::unauthorized(format!(
            "role '{}' cannot review contributions",
            user.role
        )))
    }
}

/// Only pending contributions are offered for a review decision.
///
/// The store itself accepts a decision in any state; this is the check
/// the review dashboard applies before showing approve and reject.
pub fn authorize_review_action(contribution: &KnowledgeContribution) -> Result<()> {
    match contribution.status() {
        ContributionStatus::Pending => Ok(()),
        status => Err(PortalError::invalid_transition(format!(
            "{} is already {status}; only pending contributions can be reviewed",
            contribution.id
        ))),
    }
}

/// Only the contributor who submitted it may resubmit, and only once it
/// has been rejected.
pub fn authorize_resubmit(user: &User, contribution: &KnowledgeContribution) -> Result<()> {
    if contribution.contributor.id != user.id {
        return Err(PortalError::unauthorized(format!(
            "{} was submitted by someone else",
            contribution.id
        )));
    }
    match contribution.status() {
        ContributionStatus::Rejected => Ok(()),
        status => Err(PortalError::invalid_transition(format!(
            "{} is {status}; only rejected contributions can be resubmitted",
            contribution.id
        ))),
    }
}
