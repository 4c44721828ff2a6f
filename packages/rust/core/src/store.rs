//! Contribution store: the authoritative in-process collection of
//! contributions and their lifecycle transitions.
//!
//! ```text
//!         create
//!   [∅] ----------> pending
//!                    |  \
//!           approve  |   \ reject (reason required)
//!                    v    v
//!                approved  rejected
//!                    |         |
//!                    +-resubmit+--> pending (version + 1, review cleared)
//! ```
//!
//! The collection is ordered newest-first. Mutations take `&mut self`, so a
//! store has exactly one writer at a time.

use std::collections::HashSet;

use tracing::{debug, info};

use kmportal_shared::{
    ContributionId, ContributionStatus, ContributionUpdate, KnowledgeContribution,
    NewContribution, PortalError, Result, Review, ReviewState, Reviewer,
};

use crate::clock::{Clock, SystemClock};

/// Per-status totals, as shown on the review dashboard tabs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
}

impl StatusCounts {
    pub fn get(&self, status: ContributionStatus) -> usize {
        match status {
            ContributionStatus::Pending => self.pending,
            ContributionStatus::Approved => self.approved,
            ContributionStatus::Rejected => self.rejected,
        }
    }

    pub fn total(&self) -> usize {
        self.pending + self.approved + self.rejected
    }
}

/// Owns the contribution collection and enforces lifecycle invariants.
#[derive(Debug)]
pub struct ContributionStore<C: Clock = SystemClock> {
    contributions: Vec<KnowledgeContribution>,
    clock: C,
}

impl ContributionStore<SystemClock> {
    /// An empty store on wall-clock time.
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for ContributionStore<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> ContributionStore<C> {
    /// An empty store reading time from `clock`.
    pub fn with_clock(clock: C) -> Self {
        Self {
            contributions: Vec::new(),
            clock,
        }
    }

    /// Rebuild a store from an existing newest-first collection.
    ///
    /// Fails if two records share an id.
    pub fn from_contributions(contributions: Vec<KnowledgeContribution>, clock: C) -> Result<Self> {
        let mut seen = HashSet::with_capacity(contributions.len());
        for c in &contributions {
            if !seen.insert(c.id.as_str()) {
                return Err(PortalError::validation(format!(
                    "duplicate contribution id '{}'",
                    c.id
                )));
            }
        }
        debug!(count = contributions.len(), "contribution store loaded");
        Ok(Self {
            contributions,
            clock,
        })
    }

    /// The full collection, newest first.
    pub fn contributions(&self) -> &[KnowledgeContribution] {
        &self.contributions
    }

    pub fn into_contributions(self) -> Vec<KnowledgeContribution> {
        self.contributions
    }

    pub fn len(&self) -> usize {
        self.contributions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contributions.is_empty()
    }

    pub fn get(&self, id: &ContributionId) -> Option<&KnowledgeContribution> {
        self.contributions.iter().find(|c| &c.id == id)
    }

    fn position(&self, id: &ContributionId) -> Result<usize> {
        self.contributions
            .iter()
            .position(|c| &c.id == id)
            .ok_or_else(|| PortalError::not_found("contribution", id.as_str()))
    }

    fn fresh_id(&self) -> ContributionId {
        loop {
            let id = ContributionId::generate();
            if self.get(&id).is_none() {
                return id;
            }
        }
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Record a new submission: fresh id, `pending`, version 1, at the front.
    ///
    /// The store does not validate the input; see
    /// [`SubmissionDraft::validate`](crate::submission::SubmissionDraft::validate).
    pub fn create(&mut self, input: NewContribution) -> &KnowledgeContribution {
        let contribution = KnowledgeContribution {
            id: self.fresh_id(),
            title: input.title,
            file: input.file,
            tag_level1: input.tag_level1,
            tag_level2: input.tag_level2,
            tag_level3: input.tag_level3,
            contributor: input.contributor,
            submission_date: self.clock.now(),
            version: 1,
            review: ReviewState::Pending,
        };

        info!(
            id = %contribution.id,
            contributor = %contribution.contributor.id,
            "contribution submitted"
        );

        self.contributions.insert(0, contribution);
        &self.contributions[0]
    }

    /// Apply a review decision.
    ///
    /// `Rejected` needs a non-blank `rejection_reason`; the reason is
    /// ignored for `Approved`. `Pending` is not a review outcome and is
    /// refused. A later decision overwrites an earlier one.
    pub fn set_status(
        &mut self,
        id: &ContributionId,
        status: ContributionStatus,
        reviewer: &Reviewer,
        rejection_reason: Option<&str>,
    ) -> Result<&KnowledgeContribution> {
        let idx = self.position(id)?;

        let reason = match status {
            ContributionStatus::Pending => {
                return Err(PortalError::invalid_transition(format!(
                    "a review cannot return {id} to pending; resubmit it instead"
                )));
            }
            ContributionStatus::Approved => None,
            ContributionStatus::Rejected => Some(
                rejection_reason
                    .map(str::trim)
                    .filter(|r| !r.is_empty())
                    .ok_or(PortalError::MissingRejectionReason)?,
            ),
        };

        let review = Review {
            reviewer_id: reviewer.id.clone(),
            reviewer_name: reviewer.name.clone(),
            review_date: self.clock.now(),
        };
        let next = match reason {
            None => ReviewState::Approved { review },
            Some(reason) => ReviewState::Rejected {
                review,
                rejection_reason: reason.to_string(),
            },
        };

        let contribution = &mut self.contributions[idx];
        info!(
            id = %contribution.id,
            from = %contribution.status(),
            to = %status,
            reviewer = %reviewer.id,
            "contribution reviewed"
        );
        contribution.review = next;
        Ok(&self.contributions[idx])
    }

    pub fn approve(
        &mut self,
        id: &ContributionId,
        reviewer: &Reviewer,
    ) -> Result<&KnowledgeContribution> {
        self.set_status(id, ContributionStatus::Approved, reviewer, None)
    }

    pub fn reject(
        &mut self,
        id: &ContributionId,
        reviewer: &Reviewer,
        reason: &str,
    ) -> Result<&KnowledgeContribution> {
        self.set_status(id, ContributionStatus::Rejected, reviewer, Some(reason))
    }

    /// Send a contribution back to review with updated content.
    ///
    /// A new record replaces the old one: id and contributor are kept,
    /// `updates` fill the content fields, the version goes up by one and
    /// all review data is dropped. Allowed from any status.
    pub fn resubmit(
        &mut self,
        id: &ContributionId,
        updates: ContributionUpdate,
    ) -> Result<&KnowledgeContribution> {
        let idx = self.position(id)?;
        let now = self.clock.now();
        let current = &self.contributions[idx];

        if current.status() == ContributionStatus::Approved {
            debug!(id = %current.id, "resubmitting an approved contribution");
        }

        let ContributionUpdate {
            title,
            file,
            tag_level1,
            tag_level2,
            tag_level3,
        } = updates;

        let next = KnowledgeContribution {
            id: current.id.clone(),
            title: title.unwrap_or_else(|| current.title.clone()),
            file: file.unwrap_or_else(|| current.file.clone()),
            tag_level1: tag_level1.unwrap_or_else(|| current.tag_level1.clone()),
            tag_level2: tag_level2.unwrap_or_else(|| current.tag_level2.clone()),
            tag_level3: tag_level3.unwrap_or_else(|| current.tag_level3.clone()),
            contributor: current.contributor.clone(),
            submission_date: now,
            version: current.version.saturating_add(1),
            review: ReviewState::Pending,
        };

        info!(
            id = %next.id,
            from = %current.status(),
            version = next.version,
            "contribution resubmitted"
        );

        self.contributions[idx] = next;
        Ok(&self.contributions[idx])
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Contributions with exactly `status`, in collection order.
    pub fn list_by_status(&self, status: ContributionStatus) -> Vec<&KnowledgeContribution> {
        self.contributions
            .iter()
            .filter(|c| c.status() == status)
            .collect()
    }

    /// Contributions submitted by `contributor_id`, in collection order.
    pub fn list_by_contributor(&self, contributor_id: &str) -> Vec<&KnowledgeContribution> {
        self.contributions
            .iter()
            .filter(|c| c.contributor.id == contributor_id)
            .collect()
    }

    pub fn status_counts(&self) -> StatusCounts {
        self.contributions
            .iter()
            .fold(StatusCounts::default(), |mut counts, c| {
                match c.status() {
                    ContributionStatus::Pending => counts.pending += 1,
                    ContributionStatus::Approved => counts.approved += 1,
                    ContributionStatus::Rejected => counts.rejected += 1,
                }
                counts
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SteppingClock;
    use chrono::{Duration, TimeZone, Utc};
    use kmportal_shared::{Contributor, FileRef};

    fn clock() -> SteppingClock {
        let start = Utc.with_ymd_and_hms(2024, 2, 1, 9, 0, 0).single().expect("date");
        SteppingClock::new(start, Duration::minutes(1))
    }

    fn input(title: &str, contributor_id: &str) -> NewContribution {
        NewContribution {
            title: title.into(),
            file: FileRef::new("safety-guide.pdf", "/sample.pdf"),
            tag_level1: "metode".into(),
            tag_level2: vec![],
            tag_level3: vec!["Excavation Method".into()],
            contributor: Contributor {
                id: contributor_id.into(),
                name: format!("Contributor {contributor_id}"),
                email: format!("{contributor_id}@km.local"),
            },
        }
    }

    fn reviewer(name: &str) -> Reviewer {
        Reviewer::new(format!("rev-{name}"), name)
    }

    fn assert_reason_iff_rejected<C: Clock>(store: &ContributionStore<C>) {
        for c in store.contributions() {
            assert_eq!(
                c.rejection_reason().is_some(),
                c.status() == ContributionStatus::Rejected,
                "{}",
                c.id
            );
            assert_eq!(
                c.reviewer_id().is_some(),
                c.status() != ContributionStatus::Pending
            );
        }
    }

    #[test]
    fn create_yields_pending_version_one() {
        let mut store = ContributionStore::with_clock(clock());
        let c = store.create(input("Safety Guide", "7"));
        assert_eq!(c.status(), ContributionStatus::Pending);
        assert_eq!(c.version, 1);
        assert_eq!(c.tag_level1, "metode");
        assert_eq!(c.tag_level3, ["Excavation Method"]);
        assert!(c.rejection_reason().is_none());
        assert!(c.reviewer_name().is_none());
    }

    #[test]
    fn create_assigns_unique_ids_newest_first() {
        let mut store = ContributionStore::with_clock(clock());
        let first = store.create(input("First", "7")).id.clone();
        let second = store.create(input("Second", "8")).id.clone();
        let third = store.create(input("Third", "7")).id.clone();

        assert_ne!(first, second);
        assert_ne!(second, third);
        assert_ne!(first, third);

        let order: Vec<_> = store.contributions().iter().map(|c| c.id.clone()).collect();
        assert_eq!(order, [third, second, first]);
    }

    #[test]
    fn reject_then_resubmit_scenario() {
        let mut store = ContributionStore::with_clock(clock());
        let id = store.create(input("Safety Guide", "7")).id.clone();
        let submitted = store.get(&id).expect("created").submission_date;

        let rejected = store
            .reject(&id, &reviewer("Dr. James Chen"), "Missing diagrams")
            .expect("reject");
        assert_eq!(rejected.status(), ContributionStatus::Rejected);
        assert_eq!(rejected.rejection_reason(), Some("Missing diagrams"));
        assert_eq!(rejected.reviewer_name(), Some("Dr. James Chen"));
        assert!(rejected.review_date().is_some());

        let resubmitted = store
            .resubmit(&id, ContributionUpdate::default())
            .expect("resubmit");
        assert_eq!(resubmitted.id, id);
        assert_eq!(resubmitted.status(), ContributionStatus::Pending);
        assert_eq!(resubmitted.version, 2);
        assert!(resubmitted.rejection_reason().is_none());
        assert!(resubmitted.reviewer_name().is_none());
        assert!(resubmitted.review_date().is_none());
        assert!(resubmitted.submission_date > submitted);
    }

    #[test]
    fn resubmit_preserves_identity_and_merges_content() {
        let mut store = ContributionStore::with_clock(clock());
        let id = store.create(input("Draft", "7")).id.clone();
        let before = store.get(&id).cloned().expect("created");
        store.reject(&id, &reviewer("A"), "Too short").expect("reject");

        let updates = ContributionUpdate {
            title: Some("Draft v2".into()),
            tag_level2: Some(vec!["mep".into()]),
            ..ContributionUpdate::default()
        };
        let after = store.resubmit(&id, updates).expect("resubmit");

        assert_eq!(after.id, before.id);
        assert_eq!(after.contributor, before.contributor);
        assert_eq!(after.version, before.version + 1);
        assert_eq!(after.title, "Draft v2");
        assert_eq!(after.tag_level2, ["mep"]);
        assert_eq!(after.tag_level3, before.tag_level3);
        assert_eq!(after.file, before.file);
    }

    #[test]
    fn resubmit_from_approved_is_permitted() {
        let mut store = ContributionStore::with_clock(clock());
        let id = store.create(input("Guide", "7")).id.clone();
        store.approve(&id, &reviewer("A")).expect("approve");
        let c = store
            .resubmit(&id, ContributionUpdate::default())
            .expect("resubmit");
        assert_eq!(c.status(), ContributionStatus::Pending);
        assert_eq!(c.version, 2);
        assert!(c.reviewer_id().is_none());
    }

    #[test]
    fn version_increments_by_one_each_resubmit() {
        let mut store = ContributionStore::with_clock(clock());
        let id = store.create(input("Guide", "7")).id.clone();
        for expected in 2..=5 {
            store.reject(&id, &reviewer("A"), "again").expect("reject");
            let c = store
                .resubmit(&id, ContributionUpdate::default())
                .expect("resubmit");
            assert_eq!(c.version, expected);
        }
    }

    #[test]
    fn approve_twice_keeps_last_reviewer() {
        let mut store = ContributionStore::with_clock(clock());
        let id = store.create(input("Guide", "7")).id.clone();

        let first = store.approve(&id, &reviewer("First")).expect("approve");
        assert!(first.rejection_reason().is_none());
        let first_date = first.review_date();

        let second = store.approve(&id, &reviewer("Second")).expect("approve");
        assert_eq!(second.reviewer_name(), Some("Second"));
        assert!(second.rejection_reason().is_none());
        assert!(second.review_date() > first_date);
    }

    #[test]
    fn approve_after_reject_clears_reason() {
        let mut store = ContributionStore::with_clock(clock());
        let id = store.create(input("Guide", "7")).id.clone();
        store.reject(&id, &reviewer("A"), "Missing diagrams").expect("reject");
        let c = store.approve(&id, &reviewer("B")).expect("approve");
        assert_eq!(c.status(), ContributionStatus::Approved);
        assert!(c.rejection_reason().is_none());
        assert_eq!(c.reviewer_name(), Some("B"));
    }

    #[test]
    fn reject_requires_reason() {
        let mut store = ContributionStore::with_clock(clock());
        let id = store.create(input("Guide", "7")).id.clone();

        let err = store
            .set_status(&id, ContributionStatus::Rejected, &reviewer("A"), None)
            .unwrap_err();
        assert!(matches!(err, PortalError::MissingRejectionReason));

        let err = store.reject(&id, &reviewer("A"), "   ").unwrap_err();
        assert!(matches!(err, PortalError::MissingRejectionReason));

        let c = store.get(&id).expect("still there");
        assert_eq!(c.status(), ContributionStatus::Pending);
        assert!(c.reviewer_id().is_none());
    }

    #[test]
    fn reason_is_ignored_on_approve() {
        let mut store = ContributionStore::with_clock(clock());
        let id = store.create(input("Guide", "7")).id.clone();
        let c = store
            .set_status(
                &id,
                ContributionStatus::Approved,
                &reviewer("A"),
                Some("looks fine"),
            )
            .expect("approve");
        assert!(c.rejection_reason().is_none());
    }

    #[test]
    fn review_cannot_target_pending() {
        let mut store = ContributionStore::with_clock(clock());
        let id = store.create(input("Guide", "7")).id.clone();
        let err = store
            .set_status(&id, ContributionStatus::Pending, &reviewer("A"), None)
            .unwrap_err();
        assert!(matches!(err, PortalError::InvalidTransition { .. }));
    }

    #[test]
    fn unknown_id_is_not_found_and_changes_nothing() {
        let mut store = ContributionStore::with_clock(clock());
        store.create(input("Guide", "7"));
        let snapshot = store.contributions().to_vec();
        let missing = ContributionId::from("contrib-missing");

        assert!(store.approve(&missing, &reviewer("A")).unwrap_err().is_not_found());
        assert!(
            store
                .resubmit(&missing, ContributionUpdate::default())
                .unwrap_err()
                .is_not_found()
        );
        assert_eq!(store.contributions(), snapshot.as_slice());
    }

    #[test]
    fn status_lists_partition_the_collection() {
        let mut store = ContributionStore::with_clock(clock());
        let ids: Vec<_> = (0..6)
            .map(|i| store.create(input(&format!("Doc {i}"), "7")).id.clone())
            .collect();
        store.approve(&ids[0], &reviewer("A")).expect("approve");
        store.approve(&ids[3], &reviewer("A")).expect("approve");
        store.reject(&ids[4], &reviewer("A"), "nope").expect("reject");
        assert_reason_iff_rejected(&store);

        let mut seen = HashSet::new();
        let mut total = 0;
        for status in ContributionStatus::ALL {
            let listed = store.list_by_status(status);
            assert!(listed.iter().all(|c| c.status() == status));
            total += listed.len();
            for c in listed {
                assert!(seen.insert(c.id.clone()), "duplicate {}", c.id);
            }
        }
        assert_eq!(total, store.len());

        let counts = store.status_counts();
        assert_eq!(counts.approved, 2);
        assert_eq!(counts.rejected, 1);
        assert_eq!(counts.pending, 3);
        assert_eq!(counts.total(), store.len());
    }

    #[test]
    fn list_preserves_collection_order() {
        let mut store = ContributionStore::with_clock(clock());
        let a = store.create(input("A", "7")).id.clone();
        store.create(input("B", "8"));
        let c = store.create(input("C", "7")).id.clone();

        let mine: Vec<_> = store
            .list_by_contributor("7")
            .into_iter()
            .map(|x| x.id.clone())
            .collect();
        assert_eq!(mine, [c.clone(), a.clone()]);

        let pending: Vec<_> = store
            .list_by_status(ContributionStatus::Pending)
            .into_iter()
            .map(|x| x.id.clone())
            .collect();
        assert_eq!(pending.first(), Some(&c));
        assert_eq!(pending.last(), Some(&a));
        assert!(store.list_by_contributor("nobody").is_empty());
    }

    #[test]
    fn from_contributions_rejects_duplicate_ids() {
        let mut store = ContributionStore::with_clock(clock());
        store.create(input("A", "7"));
        let mut records = store.into_contributions();
        records.push(records[0].clone());
        assert!(ContributionStore::from_contributions(records, clock()).is_err());
    }
}
