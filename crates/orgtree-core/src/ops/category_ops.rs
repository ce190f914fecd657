use crate::errors::{OrgTreeError, Result};
use crate::identity;
use crate::model::Category;
use crate::ops::store::RecordStore;

/// Create a classification category
///
/// # Errors
/// * `InvalidName` - If the name is blank
/// * `InvalidIdentity` - If the identity cannot be derived
/// * `DuplicateIdentity` - If the id is taken
pub fn create_category<S: RecordStore + ?Sized>(
    store: &mut S,
    id: Option<&str>,
    data_source_id: &str,
    origin_id: &str,
    name: &str,
) -> Result<Category> {
    let name = name.trim();
    if name.is_empty() {
        return Err(OrgTreeError::InvalidName {
            reason: "category name cannot be empty".to_string(),
        });
    }
    let id = identity::assign(id, data_source_id, origin_id)?;
    let category = Category::new(
        id,
        data_source_id.to_string(),
        origin_id.to_string(),
        name.to_string(),
    );
    store.create_category(category.clone())?;
    Ok(category)
}

/// Delete a category nobody references
///
/// # Errors
/// * `CategoryNotFound` - If the category does not exist
/// * `CategoryProtected` - If any organization is classified with it
pub fn delete_category<S: RecordStore + ?Sized>(store: &mut S, id: &str) -> Result<Category> {
    if store.get_category(id)?.is_none() {
        return Err(OrgTreeError::CategoryNotFound { id: id.to_string() });
    }
    let reference_count = store.category_reference_count(id)?;
    if reference_count > 0 {
        return Err(OrgTreeError::CategoryProtected {
            category_id: id.to_string(),
            reference_count,
        });
    }
    store.delete_category(id)
}
