//! Distinct-Name Tests
//!
//! ## Scenarios Covered
//!
//! 1. One-level names use the parent's abbreviation or name
//! 2. Stop lists from configuration end the walk
//! 3. Cached names follow edits, moves and level settings
//! 4. Display and label rules for dissolved organizations

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use chrono::NaiveDate;
use common::{add, id, run, run_with, DS};
use orgtree_core::naming::{resolve, resolve_default};
use orgtree_core::policy::NoStopPolicy;
use orgtree_core::{
    Command, ConfiguredDatasetPolicy, HierarchySettings, MemoryStore, NewOrganization,
    OrganizationPatch, Position, RecordStore,
};

use orgtree_core::OrganizationKind::Normal;

fn org_dept() -> MemoryStore {
    let state = add(MemoryStore::new(), "org", "Org", None, Normal);
    add(state, "dept", "Dept", Some("org"), Normal)
}

#[test]
fn test_parent_name_prefix() {
    // GIVEN Org -> Dept, Org without abbreviation
    let state = org_dept();

    // WHEN Dept is resolved with one level
    let dept = state.get(&id("dept")).unwrap().unwrap();
    let name = resolve(&state, &dept, &NoStopPolicy, 1).unwrap();

    // THEN the parent's name is prepended
    assert_eq!(name, "Org / Dept");
    assert_eq!(dept.distinct_name.as_deref(), Some("Org / Dept"));
}

#[test]
fn test_parent_abbreviation_prefix_and_cache_refresh() {
    // GIVEN Org -> Dept
    let state = org_dept();

    // WHEN Org gets the abbreviation "ORG"
    let state = run(
        state,
        Command::UpdateOrganization {
            id: id("org"),
            patch: OrganizationPatch {
                abbreviation: Some(Some("ORG".to_string())),
                ..Default::default()
            },
        },
    );

    // THEN Dept resolves and caches "ORG / Dept"
    let dept = state.get(&id("dept")).unwrap().unwrap();
    assert_eq!(resolve(&state, &dept, &NoStopPolicy, 1).unwrap(), "ORG / Dept");
    assert_eq!(dept.label(), "ORG / Dept");
    assert_eq!(dept.to_string(), "ORG / Dept");
}

#[test]
fn test_resolve_idempotent() {
    let state = org_dept();
    let dept = state.get(&id("dept")).unwrap().unwrap();

    let first = resolve_default(&state, &dept, &NoStopPolicy).unwrap();
    let second = resolve_default(&state, &dept, &NoStopPolicy).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_configured_stop_lists() {
    // GIVEN a dataset where the "city" class and the chancery stop the walk
    let settings = HierarchySettings::from_toml_str(&format!(
        r#"
        [data_sources.{ds}]
        distinct_name_levels = 3
        stop_classifications = ["{ds}:city"]
        stop_organizations = ["{ds}:chancery"]
        "#,
        ds = DS
    ))
    .unwrap();
    let policy = ConfiguredDatasetPolicy::from_settings(&settings);

    let state = run_with(
        MemoryStore::new(),
        Command::CreateCategory {
            id: None,
            data_source_id: DS.to_string(),
            origin_id: "city".to_string(),
            name: "Kaupunki".to_string(),
        },
        &policy,
    );
    let create = |state, new: NewOrganization| {
        run_with(state, Command::CreateOrganization(new), &policy)
    };
    // Helsinki(city) -> Council(city) -> Board -> Division
    //                -> Chancery -> Office
    let state = create(state, NewOrganization::new(DS, "helsinki", "Helsinki"));
    let state = create(
        state,
        NewOrganization::new(DS, "council", "Council")
            .with_parent(id("helsinki"))
            .with_classification(id("city")),
    );
    let state = create(
        state,
        NewOrganization::new(DS, "board", "Board").with_parent(id("council")),
    );
    let state = create(
        state,
        NewOrganization::new(DS, "division", "Division").with_parent(id("board")),
    );
    let state = create(
        state,
        NewOrganization::new(DS, "chancery", "Chancery")
            .with_parent(id("helsinki"))
            .with_abbreviation("KANS"),
    );
    let state = create(
        state,
        NewOrganization::new(DS, "office", "Office").with_parent(id("chancery")),
    );

    let label = |origin: &str| {
        state
            .get(&id(origin))
            .unwrap()
            .unwrap()
            .distinct_name
            .unwrap()
    };

    // THEN a stop node keeps its own name
    assert_eq!(label("council"), "Council");
    assert_eq!(label("chancery"), "Chancery");
    // AND the walk ends after prepending a stop ancestor
    assert_eq!(label("board"), "Council / Board");
    assert_eq!(label("division"), "Council / Board / Division");
    assert_eq!(label("office"), "KANS / Office");
}

#[test]
fn test_move_refreshes_names_in_window() {
    // GIVEN Org -> Dept -> Unit and a second root Other
    let state = org_dept();
    let state = add(state, "unit", "Unit", Some("dept"), Normal);
    let state = add(state, "other", "Other", None, Normal);

    // WHEN Dept moves under Other
    let state = run(
        state,
        Command::MoveOrganization {
            id: id("dept"),
            new_parent: Some(id("other")),
            position: Position::LastChild,
        },
    );

    // THEN Dept's label follows, Unit's one-level label does not change
    let label = |origin: &str| state.get(&id(origin)).unwrap().unwrap().label().to_string();
    assert_eq!(label("dept"), "Other / Dept");
    assert_eq!(label("unit"), "Dept / Unit");
}

#[test]
fn test_rename_refreshes_children() {
    let state = org_dept();
    let state = run(
        state,
        Command::UpdateOrganization {
            id: id("org"),
            patch: OrganizationPatch {
                name: Some("Organization".to_string()),
                ..Default::default()
            },
        },
    );

    let dept = state.get(&id("dept")).unwrap().unwrap();
    assert_eq!(dept.label(), "Organization / Dept");
}

#[test]
fn test_dissolved_display_uses_plain_name() {
    let state = org_dept();
    let state = run(
        state,
        Command::UpdateOrganization {
            id: id("dept"),
            patch: OrganizationPatch {
                dissolution_date: Some(NaiveDate::from_ymd_opt(2019, 12, 31)),
                ..Default::default()
            },
        },
    );

    let dept = state.get(&id("dept")).unwrap().unwrap();
    assert!(dept.is_dissolved());
    assert_eq!(dept.to_string(), "Dept (dissolved)");
    // Autocomplete keeps the distinct name
    assert_eq!(dept.label(), "Org / Dept");
}

/// Helsinki stops at its "city" class; Espoo has no stop lists and climbs two levels
fn mixed_source_policy() -> ConfiguredDatasetPolicy {
    let settings = HierarchySettings::from_toml_str(
        r#"
        [data_sources.helsinki]
        distinct_name_levels = 3
        stop_classifications = ["helsinki:city"]

        [data_sources.espoo]
        distinct_name_levels = 2
        "#,
    )
    .unwrap();
    ConfiguredDatasetPolicy::from_settings(&settings)
}

fn create_in(
    state: MemoryStore,
    policy: &ConfiguredDatasetPolicy,
    ds: &str,
    origin: &str,
    parent: Option<&str>,
    classification: Option<&str>,
) -> MemoryStore {
    let mut new = NewOrganization::new(ds, origin, origin.to_string());
    if let Some(parent) = parent {
        new = new.with_parent(parent);
    }
    if let Some(category) = classification {
        new = new.with_classification(category);
    }
    run_with(state, Command::CreateOrganization(new), policy)
}

fn with_city_category(policy: &ConfiguredDatasetPolicy) -> MemoryStore {
    run_with(
        MemoryStore::new(),
        Command::CreateCategory {
            id: None,
            data_source_id: "helsinki".to_string(),
            origin_id: "city".to_string(),
            name: "Kaupunki".to_string(),
        },
        policy,
    )
}

#[test]
fn test_ancestor_stop_lists_follow_named_organizations_source() {
    // GIVEN Grand(helsinki) -> Parent(helsinki, city class) -> Node(espoo)
    let policy = mixed_source_policy();
    let state = with_city_category(&policy);
    let state = create_in(state, &policy, "helsinki", "Grand", None, None);
    let state = create_in(
        state,
        &policy,
        "helsinki",
        "Parent",
        Some("helsinki:Grand"),
        Some("helsinki:city"),
    );
    let state = create_in(state, &policy, "espoo", "Node", Some("helsinki:Parent"), None);

    // THEN Espoo's walk ignores Helsinki's stop class and climbs two levels
    let node = state.get("espoo:Node").unwrap().unwrap();
    assert_eq!(node.distinct_name.as_deref(), Some("Grand / Parent / Node"));
    // AND Parent, a Helsinki stop, keeps its plain name
    let parent = state.get("helsinki:Parent").unwrap().unwrap();
    assert_eq!(parent.distinct_name.as_deref(), Some("Parent"));
}

#[test]
fn test_own_stop_lists_apply_to_foreign_ancestors() {
    // GIVEN Top(espoo) -> Mid(espoo, helsinki city class) -> Leaf(helsinki)
    let policy = mixed_source_policy();
    let state = with_city_category(&policy);
    let state = create_in(state, &policy, "espoo", "Top", None, None);
    let state = create_in(
        state,
        &policy,
        "espoo",
        "Mid",
        Some("espoo:Top"),
        Some("helsinki:city"),
    );
    let state = create_in(state, &policy, "helsinki", "Leaf", Some("espoo:Mid"), None);

    // THEN Helsinki's walk stops after prepending Mid
    let leaf = state.get("helsinki:Leaf").unwrap().unwrap();
    assert_eq!(leaf.distinct_name.as_deref(), Some("Mid / Leaf"));
    // AND Mid itself, named with Espoo's empty lists, climbs normally
    let mid = state.get("espoo:Mid").unwrap().unwrap();
    assert_eq!(mid.distinct_name.as_deref(), Some("Top / Mid"));
}

#[test]
fn test_rename_refreshes_each_descendant_with_its_own_levels() {
    // GIVEN City(helsinki) -> Board(helsinki) -> Dept(espoo) -> Team(espoo)
    let policy = mixed_source_policy();
    let state = MemoryStore::new();
    let state = create_in(state, &policy, "helsinki", "City", None, None);
    let state = create_in(state, &policy, "helsinki", "Board", Some("helsinki:City"), None);
    let state = create_in(state, &policy, "espoo", "Dept", Some("helsinki:Board"), None);
    let state = create_in(state, &policy, "espoo", "Team", Some("espoo:Dept"), None);

    // WHEN City is renamed
    let state = run_with(
        state,
        Command::UpdateOrganization {
            id: "helsinki:City".to_string(),
            patch: OrganizationPatch {
                name: Some("Town".to_string()),
                ..Default::default()
            },
        },
        &policy,
    );

    // THEN every label whose window reaches City follows the rename
    let label = |id: &str| state.get(id).unwrap().unwrap().distinct_name.unwrap();
    assert_eq!(label("helsinki:Board"), "Town / Board");
    assert_eq!(label("espoo:Dept"), "Town / Board / Dept");
    // AND Team's two-level window stops at Board
    assert_eq!(label("espoo:Team"), "Board / Dept / Team");
}
