//! Explorer navigation state: tree expansion, selection, and breadcrumbs.
//!
//! This is caller-owned UI state. It never touches the catalog beyond
//! resolving ids, and [`ExplorerNav::query`] hands its selection to the
//! [`TaxonomyFilter`](crate::filter::TaxonomyFilter).

use std::collections::BTreeSet;

use tracing::debug;

use kmportal_shared::{AssetStatus, Catalog, Crumb, Locale, PortalError, Result};

use crate::filter::{AttributeFilter, ExplorerQuery};

/// Where a breadcrumb click lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreadcrumbTarget {
    /// "All departments": clear department, topic, and trail.
    Root,
    /// Crumb `k` of the trail; 0 is the department.
    Index(usize),
}

impl BreadcrumbTarget {
    /// Map a UI index where `-1` means root. Other negatives are `None`.
    pub fn from_index(index: isize) -> Option<Self> {
        match index {
            -1 => Some(Self::Root),
            i => usize::try_from(i).ok().map(Self::Index),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExplorerNav {
    department: Option<String>,
    topic: Option<String>,
    breadcrumbs: Vec<Crumb>,
    expanded: BTreeSet<String>,
}

impl ExplorerNav {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn department(&self) -> Option<&str> {
        self.department.as_deref()
    }

    pub fn topic(&self) -> Option<&str> {
        self.topic.as_deref()
    }

    pub fn breadcrumbs(&self) -> &[Crumb] {
        &self.breadcrumbs
    }

    pub fn is_expanded(&self, department_id: &str) -> bool {
        self.expanded.contains(department_id)
    }

    /// Flip a department's expansion without touching the selection.
    /// Returns the new state.
    pub fn toggle_expansion(&mut self, department_id: &str) -> bool {
        if self.expanded.remove(department_id) {
            false
        } else {
            self.expanded.insert(department_id.to_string());
            true
        }
    }

    /// Select a department: topic cleared, trail reset to the department.
    pub fn select_department(
        &mut self,
        catalog: &Catalog,
        department_id: &str,
        locale: Locale,
    ) -> Result<()> {
        let dept = catalog
            .department(department_id)
            .ok_or_else(|| PortalError::not_found("department", department_id))?;

        self.department = Some(dept.id.clone());
        self.topic = None;
        self.breadcrumbs = vec![Crumb {
            id: dept.id.clone(),
            name: dept.name.get(locale).to_string(),
        }];
        debug!(department = %dept.id, "department selected");
        Ok(())
    }

    /// A click on a department row: toggles its expansion and selects it.
    pub fn open_department(
        &mut self,
        catalog: &Catalog,
        department_id: &str,
        locale: Locale,
    ) -> Result<()> {
        self.select_department(catalog, department_id, locale)?;
        self.toggle_expansion(department_id);
        Ok(())
    }

    /// Select a topic at any depth. The trail becomes the full path from
    /// its department, and that department is selected and expanded.
    pub fn select_topic(
        &mut self,
        catalog: &Catalog,
        topic_id: &str,
        locale: Locale,
    ) -> Result<()> {
        let path = catalog
            .topic_path(topic_id, locale)
            .ok_or_else(|| PortalError::not_found("topic", topic_id))?;

        let department = path[0].id.clone();
        self.expanded.insert(department.clone());
        self.department = Some(department);
        self.topic = Some(topic_id.to_string());
        debug!(topic = topic_id, depth = path.len() - 1, "topic selected");
        self.breadcrumbs = path;
        Ok(())
    }

    /// Follow a breadcrumb. Indexes past the end of the trail are ignored.
    pub fn navigate(&mut self, target: BreadcrumbTarget) {
        match target {
            BreadcrumbTarget::Root => {
                self.department = None;
                self.topic = None;
                self.breadcrumbs.clear();
            }
            BreadcrumbTarget::Index(k) if k >= self.breadcrumbs.len() => {
                debug!(index = k, len = self.breadcrumbs.len(), "breadcrumb out of range");
            }
            BreadcrumbTarget::Index(0) => {
                self.topic = None;
                self.breadcrumbs.truncate(1);
            }
            BreadcrumbTarget::Index(k) => {
                self.topic = Some(self.breadcrumbs[k].id.clone());
                self.breadcrumbs.truncate(k + 1);
            }
        }
    }

    /// Combine the current selection with search text and filters.
    pub fn query(
        &self,
        text: impl Into<String>,
        status: AttributeFilter<AssetStatus>,
        document_type: AttributeFilter<String>,
    ) -> ExplorerQuery {
        ExplorerQuery {
            department: self.department.clone(),
            topic: self.topic.clone(),
            text: text.into(),
            status,
            document_type,
        }
    }
}
