use std::collections::BTreeMap;

use crate::check::{Check, DEFAULT_CATEGORY};
use crate::error::ScanError;

/// Display name used when every check landed in the default category.
pub const FALLBACK_CATEGORY: &str = "Services";

/// The outcome of running one probe against one check.
///
/// `outcome` is `None` exactly when the scan reported no failure.
#[derive(Debug)]
pub struct Status {
    pub check: Check,
    pub outcome: Option<ScanError>,
}

impl Status {
    pub fn new(check: Check, outcome: Option<ScanError>) -> Self {
        Self { check, outcome }
    }

    /// True if the scan didn't find any error.
    pub fn succeed(&self) -> bool {
        self.outcome.is_none()
    }
}

/// The complete, frozen collection of statuses from one run.
///
/// Produced by the runner, handed to consumers by value and never mutated
/// afterwards. Iteration order is the completion order of the scans and
/// carries no meaning; [`StatusList::categories`] imposes the display
/// ordering.
#[derive(Debug, Default)]
pub struct StatusList(Vec<Status>);

impl StatusList {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Status> {
        self.0.iter()
    }

    /// Group statuses by category, sorted by category then by name.
    ///
    /// When the only category left is the default one, it is renamed to
    /// [`FALLBACK_CATEGORY`] so pages without explicit categories keep
    /// their historical "Services" heading.
    pub fn categories(&self) -> BTreeMap<String, Vec<&Status>> {
        let mut sorted: Vec<&Status> = self.0.iter().collect();
        sorted.sort_by(|a, b| {
            (a.check.category.as_str(), a.check.name.as_str())
                .cmp(&(b.check.category.as_str(), b.check.name.as_str()))
        });

        let mut categories: BTreeMap<String, Vec<&Status>> = BTreeMap::new();
        for status in sorted {
            categories.entry(status.check.category.clone()).or_default().push(status);
        }

        if categories.len() == 1 {
            if let Some(only) = categories.remove(DEFAULT_CATEGORY) {
                categories.insert(FALLBACK_CATEGORY.to_string(), only);
            }
        }

        categories
    }

    /// Number of statuses whose scan found an outage.
    pub fn number_outages(&self) -> usize {
        self.0.iter().filter(|status| !status.succeed()).count()
    }
}

impl From<Vec<Status>> for StatusList {
    fn from(statuses: Vec<Status>) -> Self {
        Self(statuses)
    }
}

impl IntoIterator for StatusList {
    type Item = Status;
    type IntoIter = std::vec::IntoIter<Status>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a StatusList {
    type Item = &'a Status;
    type IntoIter = std::slice::Iter<'a, Status>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn up(category: &str, name: &str) -> Status {
        Status::new(Check::new("tcp", name, "host 1", "0").with_category(category), None)
    }

    fn down(category: &str, name: &str) -> Status {
        Status::new(
            Check::new("tcp", name, "host 1", "0").with_category(category),
            Some(ScanError::NoReply),
        )
    }

    #[test]
    fn categories_sort_by_category_then_name() {
        let list = StatusList::from(vec![
            up("Web", "Zulu"),
            down("Infra", "Bravo"),
            up("Web", "Alpha"),
            up("Infra", "Alpha"),
        ]);

        let categories = list.categories();
        let keys: Vec<&String> = categories.keys().collect();
        assert_eq!(keys, ["Infra", "Web"]);

        let infra: Vec<&str> = categories["Infra"].iter().map(|s| s.check.name.as_str()).collect();
        assert_eq!(infra, ["Alpha", "Bravo"]);
        let web: Vec<&str> = categories["Web"].iter().map(|s| s.check.name.as_str()).collect();
        assert_eq!(web, ["Alpha", "Zulu"]);
    }

    #[test]
    fn categories_flattened_keep_every_status() {
        let list = StatusList::from(vec![
            up("Web", "A"),
            down("Web", "B"),
            up("Infra", "C"),
        ]);
        let total: usize = list.categories().values().map(Vec::len).sum();
        assert_eq!(total, list.len());
    }

    #[test]
    fn a_lone_default_category_is_renamed_to_services() {
        let list = StatusList::from(vec![up(DEFAULT_CATEGORY, "A"), up(DEFAULT_CATEGORY, "B")]);
        let categories = list.categories();
        assert!(categories.contains_key(FALLBACK_CATEGORY));
        assert!(!categories.contains_key(DEFAULT_CATEGORY));
        assert_eq!(categories[FALLBACK_CATEGORY].len(), 2);
    }

    #[test]
    fn the_rename_only_applies_when_default_is_the_only_category() {
        let list = StatusList::from(vec![up(DEFAULT_CATEGORY, "A"), up("Web", "B")]);
        let categories = list.categories();
        assert!(categories.contains_key(DEFAULT_CATEGORY));
        assert!(!categories.contains_key(FALLBACK_CATEGORY));

        let list = StatusList::from(vec![up("Web", "A")]);
        assert!(list.categories().contains_key("Web"));
    }

    #[test]
    fn categories_is_idempotent() {
        let list = StatusList::from(vec![up("Web", "A"), down("Infra", "B")]);
        let first: Vec<(String, Vec<String>)> = list
            .categories()
            .into_iter()
            .map(|(k, v)| (k, v.iter().map(|s| s.check.name.clone()).collect()))
            .collect();
        let second: Vec<(String, Vec<String>)> = list
            .categories()
            .into_iter()
            .map(|(k, v)| (k, v.iter().map(|s| s.check.name.clone()).collect()))
            .collect();
        assert_eq!(first, second);
    }

    #[test]
    fn number_outages_counts_failed_statuses() {
        let list = StatusList::from(vec![up("Web", "A"), down("Web", "B"), down("Web", "C")]);
        assert_eq!(list.number_outages(), 2);
        assert!(list.iter().filter(|s| s.succeed()).count() == 1);
    }

    #[test]
    fn an_empty_list_has_no_categories_and_no_outages() {
        let list = StatusList::default();
        assert!(list.categories().is_empty());
        assert_eq!(list.number_outages(), 0);
    }
}
