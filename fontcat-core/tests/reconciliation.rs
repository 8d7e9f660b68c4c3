//! End-to-end reconciliation runs against real state directories.

use std::cell::Cell;
use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

use fontcat_core::blacklist::BlacklistFile;
use fontcat_core::enumerate::{EnumeratedFamily, FamilyEnumerator, StaticEnumerator};
use fontcat_core::family::{FaceDescriptor, Owner};
use fontcat_core::index::{FileIndex, FontFileRecord};
use fontcat_core::progress::CancelToken;
use fontcat_core::reconcile::{reconcile, Locations};
use fontcat_core::{Catalog, Result};

fn row(family: &str, style: &str, owner: Owner) -> FontFileRecord {
    FontFileRecord {
        family: family.to_string(),
        style: style.to_string(),
        filepath: PathBuf::from(format!("/fonts/{family}-{style}.ttf")),
        filetype: "TrueType".to_string(),
        filesize: 4096,
        postscript_name: Some(format!("{family}-{style}")),
        description: format!("{family} {style}"),
        owner,
        foundry: "Bits".to_string(),
    }
}

fn listed(name: &str, styles: &[&str]) -> EnumeratedFamily {
    EnumeratedFamily {
        name: name.to_string(),
        faces: styles
            .iter()
            .map(|style| FaceDescriptor {
                name: style.to_string(),
                description: format!("{name} {style}"),
            })
            .collect(),
    }
}

fn seed_index(locations: &Locations, rows: Vec<FontFileRecord>) {
    let mut index = FileIndex::open(locations.index_path()).expect("open index");
    for r in rows {
        index.insert(r);
    }
    index.save().expect("save index");
}

fn snapshot(catalog: &Catalog) -> Vec<(String, Owner, bool, Vec<String>)> {
    catalog
        .families()
        .map(|family| {
            (
                family.name.clone(),
                family.owner,
                family.enabled,
                family.styles.keys().cloned().collect(),
            )
        })
        .collect()
}

#[test]
fn reconciliation_is_idempotent() {
    let temp = tempfile::tempdir().expect("tempdir");
    let locations = Locations::new(temp.path());
    seed_index(
        &locations,
        vec![
            row("Cambria", "Regular", Owner::System),
            row("Cambria", "Bold", Owner::System),
            row("Homemade Script", "Regular", Owner::User),
        ],
    );
    let enumerator = StaticEnumerator::new(vec![
        listed("Cambria", &["Regular", "Bold"]),
        listed("Homemade Script", &["Regular"]),
    ]);

    let first = reconcile(&enumerator, &locations, &mut |_| {}, &CancelToken::new())
        .expect("first run");
    let second = reconcile(&enumerator, &locations, &mut |_| {}, &CancelToken::new())
        .expect("second run");

    assert_eq!(snapshot(&first), snapshot(&second));
}

#[test]
fn destroying_the_cache_changes_nothing_observable() {
    let temp = tempfile::tempdir().expect("tempdir");
    let locations = Locations::new(temp.path());
    seed_index(
        &locations,
        vec![
            row("Cambria", "Regular", Owner::System),
            row("Homemade Script", "Regular", Owner::User),
        ],
    );
    let enumerator = StaticEnumerator::new(vec![
        listed("Cambria", &["Regular"]),
        listed("Homemade Script", &["Regular"]),
    ]);

    let warm = reconcile(&enumerator, &locations, &mut |_| {}, &CancelToken::new())
        .expect("warm run");

    fs::write(locations.cache_path(), b"{ not json at all").expect("corrupt cache");
    let healed = reconcile(&enumerator, &locations, &mut |_| {}, &CancelToken::new())
        .expect("healed run");

    assert_eq!(snapshot(&warm), snapshot(&healed));
}

#[test]
fn rejected_families_come_back_disabled_and_stale_names_are_ignored() {
    let temp = tempfile::tempdir().expect("tempdir");
    let locations = Locations::new(temp.path());
    seed_index(
        &locations,
        vec![
            row("Cambria", "Regular", Owner::System),
            row("Impact", "Regular", Owner::User),
        ],
    );
    let rejects: BTreeSet<String> = ["Impact", "Uninstalled Gothic"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    BlacklistFile::new(locations.blacklist_path())
        .save(&rejects)
        .expect("write rejects");

    let enumerator = StaticEnumerator::new(vec![
        listed("Cambria", &["Regular"]),
        listed("Impact", &["Regular"]),
    ]);
    let mut catalog = reconcile(&enumerator, &locations, &mut |_| {}, &CancelToken::new())
        .expect("reconcile");

    assert!(catalog.family("Cambria").unwrap().enabled);
    assert!(!catalog.family("Impact").unwrap().enabled);
    assert!(catalog.family("Uninstalled Gothic").is_none());

    catalog.set_enabled(&["Impact"], true).expect("re-enable");
    let on_disk = BlacklistFile::new(locations.blacklist_path()).load();
    assert!(!on_disk.contains("Impact"));
    // The stale entry is dropped on the first write-back.
    assert!(!on_disk.contains("Uninstalled Gothic"));
}

/// Reports families only while the reject file is out of the way, the way
/// a real layout stack hides rejected families.
struct RejectSensitiveEnumerator {
    reject_path: PathBuf,
    saw_parked: Cell<bool>,
    families: Vec<EnumeratedFamily>,
}

impl FamilyEnumerator for RejectSensitiveEnumerator {
    fn list_families(&self) -> Result<Vec<EnumeratedFamily>> {
        self.saw_parked.set(!self.reject_path.exists());
        Ok(self.families.clone())
    }
}

#[test]
fn the_reject_file_is_parked_during_enumeration_and_restored_after() {
    let temp = tempfile::tempdir().expect("tempdir");
    let locations = Locations::new(temp.path());
    seed_index(&locations, vec![row("Impact", "Regular", Owner::User)]);

    let rejects: BTreeSet<String> = std::iter::once("Impact".to_string()).collect();
    BlacklistFile::new(locations.blacklist_path())
        .save(&rejects)
        .expect("write rejects");

    let enumerator = RejectSensitiveEnumerator {
        reject_path: locations.blacklist_path(),
        saw_parked: Cell::new(false),
        families: vec![listed("Impact", &["Regular"])],
    };
    let catalog = reconcile(&enumerator, &locations, &mut |_| {}, &CancelToken::new())
        .expect("reconcile");

    assert!(enumerator.saw_parked.get());
    assert!(locations.blacklist_path().exists());
    assert!(!catalog.family("Impact").unwrap().enabled);
}

#[test]
fn progress_reports_cover_every_available_family() {
    let temp = tempfile::tempdir().expect("tempdir");
    let locations = Locations::new(temp.path());
    seed_index(
        &locations,
        vec![
            row("Cambria", "Regular", Owner::System),
            row("Georgia", "Regular", Owner::System),
            row("Impact", "Regular", Owner::User),
        ],
    );
    let enumerator = StaticEnumerator::new(vec![
        listed("Cambria", &["Regular"]),
        listed("Georgia", &["Regular"]),
        listed("Impact", &["Regular"]),
    ]);

    let mut reports = Vec::new();
    reconcile(
        &enumerator,
        &locations,
        &mut |p| reports.push((p.processed, p.total)),
        &CancelToken::new(),
    )
    .expect("reconcile");

    assert_eq!(reports, vec![(1, 3), (2, 3), (3, 3)]);
}
