use orgtree_core::policy::NoStopPolicy;
use orgtree_core::{
    apply, Command, DatasetPolicy, MemoryStore, NewOrganization, OrganizationKind, RecordStore,
};
use uuid::Uuid;

pub const DS: &str = "test";

/// Identity of an organization created with `origin` in the test data source
#[allow(dead_code)]
pub fn id(origin: &str) -> String {
    format!("{}:{}", DS, origin)
}

/// Origin id unique across the test run
#[allow(dead_code)]
pub fn unique_origin() -> String {
    Uuid::now_v7().to_string()
}

/// Apply `cmd` with the no-stop policy, panicking on failure
#[allow(dead_code)]
pub fn run(state: MemoryStore, cmd: Command) -> MemoryStore {
    run_with(state, cmd, &NoStopPolicy)
}

#[allow(dead_code)]
pub fn run_with(state: MemoryStore, cmd: Command, policy: &dyn DatasetPolicy) -> MemoryStore {
    apply(state, cmd, policy).unwrap().0
}

/// Create an organization `origin` named `name` under `parent` (an origin id)
#[allow(dead_code)]
pub fn add(
    state: MemoryStore,
    origin: &str,
    name: &str,
    parent: Option<&str>,
    kind: OrganizationKind,
) -> MemoryStore {
    let mut new = NewOrganization::new(DS, origin, name).with_kind(kind);
    if let Some(parent) = parent {
        new = new.with_parent(id(parent));
    }
    run(state, Command::CreateOrganization(new))
}

/// Origin ids of the children of `parent`, in sibling order
#[allow(dead_code)]
pub fn child_origins(state: &MemoryStore, parent: &str) -> Vec<String> {
    state
        .get_by_parent(&id(parent))
        .unwrap()
        .into_iter()
        .map(|o| o.origin_id)
        .collect()
}

/// Setup: Root -> (Dept -> Unit), Office
///
/// Returns the store; all organizations are Normal.
#[allow(dead_code)]
pub fn setup_simple_tree() -> MemoryStore {
    let state = MemoryStore::new();
    let state = add(state, "root", "Root", None, OrganizationKind::Normal);
    let state = add(state, "dept", "Dept", Some("root"), OrganizationKind::Normal);
    let state = add(state, "unit", "Unit", Some("dept"), OrganizationKind::Normal);
    add(state, "office", "Office", Some("root"), OrganizationKind::Normal)
}
