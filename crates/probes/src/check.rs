/// Category assigned to checks that don't declare one.
pub const DEFAULT_CATEGORY: &str = "Uncategorized";

/// A validated, normalized description of one thing to test.
///
/// A check is immutable once its probe's `sanitize` has accepted it; the
/// probe is also the only place allowed to rewrite `target` or reject
/// `expectation` during validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Check {
    /// Display grouping on the rendered page.
    pub category: String,

    /// Display label.
    pub name: String,

    /// Protocol discriminator, always lower-cased, always a registered
    /// probe kind.
    pub kind: String,

    /// Protocol-specific address. Format is enforced by the owning probe.
    pub target: String,

    /// Protocol-specific expected outcome, typically an integer code kept
    /// in its textual form.
    pub expectation: String,
}

impl Check {
    /// Create a check in the default category.
    pub fn new(
        kind: impl Into<String>,
        name: impl Into<String>,
        target: impl Into<String>,
        expectation: impl Into<String>,
    ) -> Self {
        Self {
            category: DEFAULT_CATEGORY.to_string(),
            name: name.into(),
            kind: kind.into(),
            target: target.into(),
            expectation: expectation.into(),
        }
    }

    /// Move the check into an explicit category.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }
}
