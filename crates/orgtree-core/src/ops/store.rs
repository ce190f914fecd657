use std::collections::{BTreeMap, HashMap};

use crate::errors::{OrgTreeError, Result};
use crate::model::{Category, Organization};

/// Durable record store consumed by the engine
///
/// Implementations return owned records so they can sit in front of any
/// backend. Ordered queries are ordered by interval `left` within a tree.
/// The engine never calls `delete` for an organization before its children
/// have been re-rooted.
pub trait RecordStore {
    /// Get an organization by identity
    ///
    /// # Errors
    /// Returns `Store` if the backend fails.
    fn get(&self, id: &str) -> Result<Option<Organization>>;

    /// Get an organization by its `(data_source_id, origin_id)` pair
    ///
    /// # Errors
    /// Returns `Store` if the backend fails.
    fn get_by_identity_key(
        &self,
        data_source_id: &str,
        origin_id: &str,
    ) -> Result<Option<Organization>>;

    /// Direct children of an organization, in sibling order
    ///
    /// # Errors
    /// Returns `Store` if the backend fails.
    fn get_by_parent(&self, parent_id: &str) -> Result<Vec<Organization>>;

    /// Root organizations, ordered by tree id
    ///
    /// # Errors
    /// Returns `Store` if the backend fails.
    fn roots(&self) -> Result<Vec<Organization>>;

    /// Every member of one tree, ordered by `left`
    ///
    /// # Errors
    /// Returns `Store` if the backend fails.
    fn tree_members(&self, tree_id: u64) -> Result<Vec<Organization>>;

    /// Members of one tree whose `left` lies in `[from_left, to_left]`, ordered by `left`
    ///
    /// # Errors
    /// Returns `Store` if the backend fails.
    fn tree_range(&self, tree_id: u64, from_left: u64, to_left: u64)
        -> Result<Vec<Organization>>;

    /// A tree id not used by any stored organization
    ///
    /// # Errors
    /// Returns `Store` if the backend fails.
    fn next_tree_id(&self) -> Result<u64>;

    /// The organization whose `replaced_by` points at `successor_id`, if any
    ///
    /// # Errors
    /// Returns `Store` if the backend fails.
    fn find_replacing(&self, successor_id: &str) -> Result<Option<Organization>>;

    /// Number of stored organizations
    ///
    /// # Errors
    /// Returns `Store` if the backend fails.
    fn count(&self) -> Result<usize>;

    /// Insert a new organization
    ///
    /// # Errors
    /// Returns `DuplicateIdentity` if the id or the identity key is taken.
    fn create(&mut self, org: Organization) -> Result<()>;

    /// Replace a stored organization
    ///
    /// # Errors
    /// Returns `OrganizationNotFound` if no record has this id.
    fn update(&mut self, org: Organization) -> Result<()>;

    /// Replace several organizations as one write
    ///
    /// # Errors
    /// Returns `OrganizationNotFound` if any record is missing.
    fn update_many(&mut self, orgs: Vec<Organization>) -> Result<()> {
        for org in orgs {
            self.update(org)?;
        }
        Ok(())
    }

    /// Remove an organization record
    ///
    /// # Errors
    /// Returns `OrganizationNotFound` if no record has this id.
    fn delete(&mut self, id: &str) -> Result<Organization>;

    /// Get a category by identity
    ///
    /// # Errors
    /// Returns `Store` if the backend fails.
    fn get_category(&self, id: &str) -> Result<Option<Category>>;

    /// Insert a new category
    ///
    /// # Errors
    /// Returns `DuplicateIdentity` if the id is taken.
    fn create_category(&mut self, category: Category) -> Result<()>;

    /// Remove a category record
    ///
    /// # Errors
    /// Returns `CategoryNotFound` if no record has this id.
    fn delete_category(&mut self, id: &str) -> Result<Category>;

    /// Number of organizations classified with this category
    ///
    /// # Errors
    /// Returns `Store` if the backend fails.
    fn category_reference_count(&self, id: &str) -> Result<usize>;
}

/// In-memory record store
///
/// Keeps a composite-key index and a `(tree_id, left)` ordered index so that
/// subtree and sibling queries are range scans. Cloning produces an
/// independent working copy, which is what `apply()` relies on for
/// all-or-nothing mutations.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    organizations: HashMap<String, Organization>,
    identity_keys: HashMap<(String, String), String>,
    by_position: BTreeMap<(u64, u64), String>,
    categories: HashMap<String, Category>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All organizations, ordered by tree and `left`
    pub fn list(&self) -> Vec<&Organization> {
        self.by_position
            .values()
            .filter_map(|id| self.organizations.get(id))
            .collect()
    }

    /// All categories (unordered)
    pub fn list_categories(&self) -> Vec<&Category> {
        self.categories.values().collect()
    }

    /// Borrow an organization without cloning
    pub fn organization(&self, id: &str) -> Option<&Organization> {
        self.organizations.get(id)
    }

    fn index_position(&mut self, org: &Organization) {
        self.by_position
            .insert((org.interval.tree_id, org.interval.left), org.id.clone());
    }

    fn unindex_position(&mut self, org: &Organization) {
        let key = (org.interval.tree_id, org.interval.left);
        if self.by_position.get(&key) == Some(&org.id) {
            self.by_position.remove(&key);
        }
    }

    fn collect_range(&self, tree_id: u64, from_left: u64, to_left: u64) -> Vec<Organization> {
        if from_left > to_left {
            return Vec::new();
        }
        self.by_position
            .range((tree_id, from_left)..=(tree_id, to_left))
            .filter_map(|(_, id)| self.organizations.get(id).cloned())
            .collect()
    }
}

impl RecordStore for MemoryStore {
    fn get(&self, id: &str) -> Result<Option<Organization>> {
        Ok(self.organizations.get(id).cloned())
    }

    fn get_by_identity_key(
        &self,
        data_source_id: &str,
        origin_id: &str,
    ) -> Result<Option<Organization>> {
        let key = (data_source_id.to_string(), origin_id.to_string());
        Ok(self
            .identity_keys
            .get(&key)
            .and_then(|id| self.organizations.get(id))
            .cloned())
    }

    fn get_by_parent(&self, parent_id: &str) -> Result<Vec<Organization>> {
        let Some(parent) = self.organizations.get(parent_id) else {
            return Ok(Vec::new());
        };
        let iv = parent.interval;
        Ok(self
            .collect_range(iv.tree_id, iv.left + 1, iv.right.saturating_sub(1))
            .into_iter()
            .filter(|o| o.parent_id.as_deref() == Some(parent_id))
            .collect())
    }

    fn roots(&self) -> Result<Vec<Organization>> {
        Ok(self
            .by_position
            .iter()
            .filter_map(|(_, id)| self.organizations.get(id))
            .filter(|o| o.parent_id.is_none())
            .cloned()
            .collect())
    }

    fn tree_members(&self, tree_id: u64) -> Result<Vec<Organization>> {
        Ok(self.collect_range(tree_id, 0, u64::MAX))
    }

    fn tree_range(
        &self,
        tree_id: u64,
        from_left: u64,
        to_left: u64,
    ) -> Result<Vec<Organization>> {
        Ok(self.collect_range(tree_id, from_left, to_left))
    }

    fn next_tree_id(&self) -> Result<u64> {
        Ok(self
            .by_position
            .keys()
            .next_back()
            .map(|(tree_id, _)| tree_id + 1)
            .unwrap_or(1))
    }

    fn find_replacing(&self, successor_id: &str) -> Result<Option<Organization>> {
        Ok(self
            .organizations
            .values()
            .find(|o| o.replaced_by.as_deref() == Some(successor_id))
            .cloned())
    }

    fn count(&self) -> Result<usize> {
        Ok(self.organizations.len())
    }

    fn create(&mut self, org: Organization) -> Result<()> {
        let key = (org.data_source_id.clone(), org.origin_id.clone());
        if self.organizations.contains_key(&org.id) {
            return Err(OrgTreeError::DuplicateIdentity { id: org.id });
        }
        if let Some(existing) = self.identity_keys.get(&key) {
            return Err(OrgTreeError::DuplicateIdentity {
                id: existing.clone(),
            });
        }

        self.identity_keys.insert(key, org.id.clone());
        self.index_position(&org);
        self.organizations.insert(org.id.clone(), org);
        Ok(())
    }

    fn update(&mut self, org: Organization) -> Result<()> {
        let previous = self
            .organizations
            .get(&org.id)
            .cloned()
            .ok_or_else(|| OrgTreeError::OrganizationNotFound { id: org.id.clone() })?;

        self.unindex_position(&previous);
        self.index_position(&org);
        self.organizations.insert(org.id.clone(), org);
        Ok(())
    }

    fn update_many(&mut self, orgs: Vec<Organization>) -> Result<()> {
        // Unindex everything first so shifted bounds never collide mid-batch.
        let mut previous = Vec::with_capacity(orgs.len());
        for org in &orgs {
            let prev = self
                .organizations
                .get(&org.id)
                .cloned()
                .ok_or_else(|| OrgTreeError::OrganizationNotFound { id: org.id.clone() })?;
            previous.push(prev);
        }
        for prev in &previous {
            self.unindex_position(prev);
        }
        for org in orgs {
            self.index_position(&org);
            self.organizations.insert(org.id.clone(), org);
        }
        Ok(())
    }

    fn delete(&mut self, id: &str) -> Result<Organization> {
        let org = self
            .organizations
            .remove(id)
            .ok_or_else(|| OrgTreeError::OrganizationNotFound { id: id.to_string() })?;

        self.unindex_position(&org);
        self.identity_keys
            .remove(&(org.data_source_id.clone(), org.origin_id.clone()));
        Ok(org)
    }

    fn get_category(&self, id: &str) -> Result<Option<Category>> {
        Ok(self.categories.get(id).cloned())
    }

    fn create_category(&mut self, category: Category) -> Result<()> {
        if self.categories.contains_key(&category.id) {
            return Err(OrgTreeError::DuplicateIdentity { id: category.id });
        }
        self.categories.insert(category.id.clone(), category);
        Ok(())
    }

    fn delete_category(&mut self, id: &str) -> Result<Category> {
        self.categories
            .remove(id)
            .ok_or_else(|| OrgTreeError::CategoryNotFound { id: id.to_string() })
    }

    fn category_reference_count(&self, id: &str) -> Result<usize> {
        Ok(self
            .organizations
            .values()
            .filter(|o| o.classification_id.as_deref() == Some(id))
            .count())
    }
}
