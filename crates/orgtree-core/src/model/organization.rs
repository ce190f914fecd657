use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::interval::Interval;

/// Internal type of an organization; drives sibling ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrganizationKind {
    /// Regular sub-organization
    #[default]
    Normal,
    /// Affiliated organization; listed before normal siblings
    Affiliated,
}

impl OrganizationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrganizationKind::Normal => "normal",
            OrganizationKind::Affiliated => "affiliated",
        }
    }
}

/// Organization - one node of the hierarchy
///
/// The `id` is derived once from `data_source_id` and `origin_id` and never
/// changes afterwards. `distinct_name` is a cache maintained by the engine
/// and is not settable through edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    /// Composite identity `{data_source_id}:{origin_id}`
    pub id: String,

    pub data_source_id: String,

    /// Identifier of this organization inside its data source
    pub origin_id: String,

    pub kind: OrganizationKind,

    /// Optional category id (protect-on-delete reference)
    pub classification_id: Option<String>,

    /// Primary name, e.g. a legally recognized name
    pub name: String,

    pub abbreviation: Option<String>,

    /// Derived label composed from ancestors (cached)
    pub distinct_name: Option<String>,

    pub founding_date: Option<NaiveDate>,

    /// Set when the organization has been dissolved; display only
    pub dissolution_date: Option<NaiveDate>,

    /// Parent organization id (None for roots)
    pub parent_id: Option<String>,

    /// Nested-interval position maintained by the tree index
    pub interval: Interval,

    /// Organization that replaces this one
    pub replaced_by: Option<String>,

    pub created_by: Option<String>,
    pub last_modified_by: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Organization {
    /// Create an unplaced Normal organization with current timestamps
    pub fn new(id: String, data_source_id: String, origin_id: String, name: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            data_source_id,
            origin_id,
            kind: OrganizationKind::Normal,
            classification_id: None,
            name,
            abbreviation: None,
            distinct_name: None,
            founding_date: None,
            dissolution_date: None,
            parent_id: None,
            interval: Interval::default(),
            replaced_by: None,
            created_by: None,
            last_modified_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    pub fn is_affiliated(&self) -> bool {
        self.kind == OrganizationKind::Affiliated
    }

    pub fn is_dissolved(&self) -> bool {
        self.dissolution_date.is_some()
    }

    /// Name used when this organization appears as an ancestor in a label
    pub fn short_name(&self) -> &str {
        match self.abbreviation.as_deref() {
            Some(abbr) if !abbr.is_empty() => abbr,
            _ => &self.name,
        }
    }

    /// Autocomplete label: the cached distinct name, else the plain name
    pub fn label(&self) -> &str {
        self.distinct_name.as_deref().unwrap_or(&self.name)
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl std::fmt::Display for Organization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_dissolved() {
            return write!(f, "{} (dissolved)", self.name);
        }
        f.write_str(self.label())
    }
}

/// Creation request for an organization
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewOrganization {
    /// Pre-assigned identity; derived from the data source and origin id when absent
    pub id: Option<String>,
    pub data_source_id: String,
    pub origin_id: String,
    pub name: String,
    pub abbreviation: Option<String>,
    pub kind: OrganizationKind,
    pub classification_id: Option<String>,
    pub parent_id: Option<String>,
    pub founding_date: Option<NaiveDate>,
    pub dissolution_date: Option<NaiveDate>,
    pub created_by: Option<String>,
}

impl NewOrganization {
    pub fn new(
        data_source_id: impl Into<String>,
        origin_id: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            data_source_id: data_source_id.into(),
            origin_id: origin_id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn with_kind(mut self, kind: OrganizationKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_abbreviation(mut self, abbreviation: impl Into<String>) -> Self {
        self.abbreviation = Some(abbreviation.into());
        self
    }

    pub fn with_classification(mut self, category_id: impl Into<String>) -> Self {
        self.classification_id = Some(category_id.into());
        self
    }
}

/// Field edits for an existing organization
///
/// `None` leaves a field untouched; for clearable fields `Some(None)` clears it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OrganizationPatch {
    pub name: Option<String>,
    pub abbreviation: Option<Option<String>>,
    pub kind: Option<OrganizationKind>,
    pub classification_id: Option<Option<String>>,
    pub parent_id: Option<Option<String>>,
    pub founding_date: Option<Option<NaiveDate>>,
    pub dissolution_date: Option<Option<NaiveDate>>,
    pub last_modified_by: Option<String>,
}

impl OrganizationPatch {
    /// True when the edit changes an input of the distinct-name label
    pub fn touches_label(&self) -> bool {
        self.name.is_some()
            || self.abbreviation.is_some()
            || self.classification_id.is_some()
            || self.parent_id.is_some()
    }
}
