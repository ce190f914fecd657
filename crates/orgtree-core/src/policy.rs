//! Dataset policy provider
//!
//! Decides, per data source, where distinct-name composition stops and how
//! many ancestor levels it may climb. The policy is injected into `apply()`
//! and the name resolver so callers choose it at startup.

use std::collections::{HashMap, HashSet};

use crate::config::HierarchySettings;
use crate::model::Organization;

/// Default number of ancestor levels composed into a distinct name
pub const DEFAULT_DISTINCT_NAME_LEVELS: usize = 1;

/// Per-data-source naming rules
pub trait DatasetPolicy: Send + Sync {
    /// Category ids whose members stop the ancestor walk
    fn stop_classifications(&self, data_source_id: &str) -> HashSet<String>;

    /// Organization identities that stop the ancestor walk
    fn stop_node_identities(&self, data_source_id: &str) -> HashSet<String>;

    /// Maximum ancestor levels composed into a distinct name
    fn distinct_name_levels(&self, _data_source_id: &str) -> usize {
        DEFAULT_DISTINCT_NAME_LEVELS
    }

    /// True if `org` matches the stop lists of `data_source_id`
    ///
    /// Ancestors are checked against the lists of the organization being
    /// named, whatever data source the ancestor itself belongs to.
    fn is_stop_for(&self, data_source_id: &str, org: &Organization) -> bool {
        if self.stop_node_identities(data_source_id).contains(&org.id) {
            return true;
        }
        match org.classification_id.as_deref() {
            Some(category_id) => self
                .stop_classifications(data_source_id)
                .contains(category_id),
            None => false,
        }
    }

    /// True if `org` matches its own data source's stop lists
    fn is_stop(&self, org: &Organization) -> bool {
        self.is_stop_for(&org.data_source_id, org)
    }
}

/// Policy without stop lists; every data source climbs one level
///
/// # Example
/// ```
/// use orgtree_core::policy::{DatasetPolicy, NoStopPolicy};
///
/// let policy = NoStopPolicy;
/// assert!(policy.stop_classifications("any").is_empty());
/// assert_eq!(policy.distinct_name_levels("any"), 1);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct NoStopPolicy;

impl DatasetPolicy for NoStopPolicy {
    fn stop_classifications(&self, _data_source_id: &str) -> HashSet<String> {
        HashSet::new()
    }

    fn stop_node_identities(&self, _data_source_id: &str) -> HashSet<String> {
        HashSet::new()
    }
}

/// Rules for one data source
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataSourcePolicy {
    pub distinct_name_levels: Option<usize>,
    pub stop_classifications: HashSet<String>,
    pub stop_organizations: HashSet<String>,
}

/// Policy built from configuration, keyed by data source id
///
/// Data source ids are matched case-insensitively.
#[derive(Debug, Clone)]
pub struct ConfiguredDatasetPolicy {
    default_levels: usize,
    data_sources: HashMap<String, DataSourcePolicy>,
}

impl Default for ConfiguredDatasetPolicy {
    fn default() -> Self {
        Self {
            default_levels: DEFAULT_DISTINCT_NAME_LEVELS,
            data_sources: HashMap::new(),
        }
    }
}

impl ConfiguredDatasetPolicy {
    pub fn new(default_levels: usize) -> Self {
        Self {
            default_levels: default_levels.max(1),
            data_sources: HashMap::new(),
        }
    }

    /// Build from loaded settings
    pub fn from_settings(settings: &HierarchySettings) -> Self {
        let mut policy = Self::new(settings.defaults.distinct_name_levels);
        for (data_source_id, ds) in &settings.data_sources {
            policy = policy.with_data_source(
                data_source_id,
                DataSourcePolicy {
                    distinct_name_levels: ds.distinct_name_levels,
                    stop_classifications: ds.stop_classifications.iter().cloned().collect(),
                    stop_organizations: ds.stop_organizations.iter().cloned().collect(),
                },
            );
        }
        policy
    }

    pub fn with_data_source(mut self, data_source_id: &str, rules: DataSourcePolicy) -> Self {
        self.data_sources
            .insert(data_source_id.to_lowercase(), rules);
        self
    }

    fn rules(&self, data_source_id: &str) -> Option<&DataSourcePolicy> {
        self.data_sources.get(&data_source_id.to_lowercase())
    }
}

impl DatasetPolicy for ConfiguredDatasetPolicy {
    fn stop_classifications(&self, data_source_id: &str) -> HashSet<String> {
        self.rules(data_source_id)
            .map(|r| r.stop_classifications.clone())
            .unwrap_or_default()
    }

    fn stop_node_identities(&self, data_source_id: &str) -> HashSet<String> {
        self.rules(data_source_id)
            .map(|r| r.stop_organizations.clone())
            .unwrap_or_default()
    }

    fn distinct_name_levels(&self, data_source_id: &str) -> usize {
        self.rules(data_source_id)
            .and_then(|r| r.distinct_name_levels)
            .unwrap_or(self.default_levels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn city_rules() -> DataSourcePolicy {
        DataSourcePolicy {
            distinct_name_levels: Some(2),
            stop_classifications: ["helsinki:city".to_string()].into_iter().collect(),
            stop_organizations: ["helsinki:chancery".to_string()].into_iter().collect(),
        }
    }

    #[test]
    fn test_no_stop_policy_never_stops() {
        let mut org = Organization::new(
            "ds:1".to_string(),
            "ds".to_string(),
            "1".to_string(),
            "Org".to_string(),
        );
        org.classification_id = Some("ds:class".to_string());
        assert!(!NoStopPolicy.is_stop(&org));
    }

    #[test]
    fn test_configured_policy_per_data_source() {
        let policy = ConfiguredDatasetPolicy::default().with_data_source("Helsinki", city_rules());

        assert_eq!(policy.distinct_name_levels("helsinki"), 2);
        assert_eq!(policy.distinct_name_levels("espoo"), 1);
        assert!(policy
            .stop_classifications("HELSINKI")
            .contains("helsinki:city"));
        assert!(policy.stop_node_identities("espoo").is_empty());
    }

    #[test]
    fn test_is_stop_matches_identity_or_classification() {
        let policy = ConfiguredDatasetPolicy::default().with_data_source("helsinki", city_rules());

        let chancery = Organization::new(
            "helsinki:chancery".to_string(),
            "helsinki".to_string(),
            "chancery".to_string(),
            "Kaupunginkanslia".to_string(),
        );
        assert!(policy.is_stop(&chancery));

        let mut council = Organization::new(
            "helsinki:council".to_string(),
            "helsinki".to_string(),
            "council".to_string(),
            "Valtuusto".to_string(),
        );
        assert!(!policy.is_stop(&council));
        council.classification_id = Some("helsinki:city".to_string());
        assert!(policy.is_stop(&council));
    }

    #[test]
    fn test_is_stop_for_uses_given_data_source() {
        let policy = ConfiguredDatasetPolicy::default().with_data_source("helsinki", city_rules());

        let mut council = Organization::new(
            "helsinki:council".to_string(),
            "helsinki".to_string(),
            "council".to_string(),
            "Valtuusto".to_string(),
        );
        council.classification_id = Some("helsinki:city".to_string());

        assert!(policy.is_stop_for("helsinki", &council));
        // Seen from a data source without stop lists it is an ordinary ancestor
        assert!(!policy.is_stop_for("espoo", &council));
    }
}
