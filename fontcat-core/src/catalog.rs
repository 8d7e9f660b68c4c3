//! The reconciled catalog: families, built-in categories, user collections.
//!
//! All mutation goes through this type so the derived state (aggregate
//! enabled flags, the Orphans category) can never drift from the family
//! table. The disabled-family file is the one external side effect, written
//! whenever enablement changes.

use std::collections::{BTreeMap, BTreeSet};

use crate::blacklist::BlacklistFile;
use crate::collection::Collection;
use crate::error::{CatalogError, Result};
use crate::family::{Family, Owner};
use crate::store::CollectionStore;

pub const CATEGORY_ALL: &str = "All";
pub const CATEGORY_SYSTEM: &str = "System";
pub const CATEGORY_USER: &str = "User";
pub const CATEGORY_ORPHANS: &str = "Orphans";

const CATEGORY_ORDER: [&str; 4] = [
    CATEGORY_ALL,
    CATEGORY_SYSTEM,
    CATEGORY_USER,
    CATEGORY_ORPHANS,
];

/// Emitted to observers after a mutation commits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeEvent {
    CategoriesChanged,
    CollectionsChanged,
}

type Observer = Box<dyn FnMut(&ChangeEvent)>;

pub struct Catalog {
    families: BTreeMap<String, Family>,
    categories: BTreeMap<String, Collection>,
    collections: BTreeMap<String, Collection>,
    collection_order: Vec<String>,
    blacklist: Option<BlacklistFile>,
    store: Option<CollectionStore>,
    observers: Vec<Observer>,
}

impl std::fmt::Debug for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog")
            .field("families", &self.families)
            .field("categories", &self.categories)
            .field("collections", &self.collections)
            .field("collection_order", &self.collection_order)
            .field("blacklist", &self.blacklist)
            .field("store", &self.store)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Catalog {
    /// Build a catalog over `families`, deriving the built-in categories
    /// from each family's owner.
    pub fn new<I>(families: I) -> Self
    where
        I: IntoIterator<Item = Family>,
    {
        let families: BTreeMap<String, Family> = families
            .into_iter()
            .map(|family| (family.name.clone(), family))
            .collect();

        let mut categories = BTreeMap::new();
        let mut all = Collection::builtin(CATEGORY_ALL, "All installed fonts");
        let mut system = Collection::builtin(CATEGORY_SYSTEM, "Fonts available to all users");
        let mut user = Collection::builtin(CATEGORY_USER, "Fonts available only to you");
        let orphans = Collection::builtin(CATEGORY_ORPHANS, "Fonts not in any collection");

        for family in families.values() {
            all.families.insert(family.name.clone());
            match family.owner {
                Owner::System => system.families.insert(family.name.clone()),
                Owner::User => user.families.insert(family.name.clone()),
            };
        }
        categories.insert(all.name.clone(), all);
        categories.insert(system.name.clone(), system);
        categories.insert(user.name.clone(), user);
        categories.insert(orphans.name.clone(), orphans);

        let mut catalog = Self {
            families,
            categories,
            collections: BTreeMap::new(),
            collection_order: Vec::new(),
            blacklist: None,
            store: None,
            observers: Vec::new(),
        };
        catalog.refresh();
        catalog
    }

    /// Take ownership of loaded collections, preserving their order.
    pub fn adopt_collections<I>(&mut self, collections: I)
    where
        I: IntoIterator<Item = Collection>,
    {
        for collection in collections {
            if self.collections.contains_key(&collection.name) {
                continue;
            }
            self.collection_order.push(collection.name.clone());
            self.collections.insert(collection.name.clone(), collection);
        }
        self.refresh();
    }

    pub fn attach_store(&mut self, store: CollectionStore) {
        self.store = Some(store);
    }

    pub fn attach_blacklist(&mut self, blacklist: BlacklistFile) {
        self.blacklist = Some(blacklist);
    }

    pub fn add_observer(&mut self, observer: Observer) {
        self.observers.push(observer);
    }

    pub fn family(&self, name: &str) -> Option<&Family> {
        self.families.get(name)
    }

    pub fn families(&self) -> impl Iterator<Item = &Family> {
        self.families.values()
    }

    pub fn family_names(&self) -> Vec<&str> {
        self.families.keys().map(String::as_str).collect()
    }

    pub fn family_count(&self) -> usize {
        self.families.len()
    }

    pub fn collection(&self, name: &str) -> Option<&Collection> {
        self.collections.get(name)
    }

    /// Collection names in persisted order.
    pub fn collection_names(&self) -> Vec<&str> {
        self.collection_order.iter().map(String::as_str).collect()
    }

    pub fn category(&self, name: &str) -> Option<&Collection> {
        self.categories.get(name)
    }

    /// Built-in categories in their fixed display order.
    pub fn categories(&self) -> Vec<&Collection> {
        CATEGORY_ORDER
            .iter()
            .filter_map(|name| self.categories.get(*name))
            .collect()
    }

    pub fn disabled_families(&self) -> BTreeSet<String> {
        self.families
            .values()
            .filter(|family| !family.enabled)
            .map(|family| family.name.clone())
            .collect()
    }

    /// Enable or disable `names`. Every name must be a known family; on any
    /// unknown name nothing is changed. Persists the reject file when one is
    /// attached.
    pub fn set_enabled(&mut self, names: &[&str], enabled: bool) -> Result<()> {
        for name in names {
            if !self.families.contains_key(*name) {
                return Err(CatalogError::UnknownFamily(name.to_string()));
            }
        }
        let mut disabled = self.disabled_families();
        for name in names {
            if enabled {
                disabled.remove(*name);
            } else {
                disabled.insert(name.to_string());
            }
        }
        if let Some(blacklist) = &self.blacklist {
            blacklist.save(&disabled)?;
        }
        for name in names {
            if let Some(family) = self.families.get_mut(*name) {
                family.enabled = enabled;
            }
        }
        self.refresh();
        self.notify(&ChangeEvent::CategoriesChanged);
        self.notify(&ChangeEvent::CollectionsChanged);
        Ok(())
    }

    pub fn enable_collection(&mut self, name: &str) -> Result<()> {
        self.set_collection_enabled(name, true)
    }

    pub fn disable_collection(&mut self, name: &str) -> Result<()> {
        self.set_collection_enabled(name, false)
    }

    fn set_collection_enabled(&mut self, name: &str, enabled: bool) -> Result<()> {
        let members: Vec<String> = self
            .collections
            .get(name)
            .ok_or_else(|| CatalogError::UnknownCollection(name.to_string()))?
            .families
            .iter()
            .filter(|family| self.families.contains_key(*family))
            .cloned()
            .collect();
        let refs: Vec<&str> = members.iter().map(String::as_str).collect();
        self.set_enabled(&refs, enabled)
    }

    /// Create a collection, optionally seeded with families. The name must
    /// be free among both user collections and built-in categories; unknown
    /// seed families are dropped silently.
    pub fn create_collection(
        &mut self,
        name: &str,
        comment: Option<&str>,
        families: &[&str],
    ) -> Result<()> {
        if self.collections.contains_key(name) || self.categories.contains_key(name) {
            return Err(CatalogError::NameCollision(name.to_string()));
        }
        let mut collection = Collection::new(name);
        collection.comment = comment.map(str::to_string);
        collection.add(
            families
                .iter()
                .filter(|family| self.families.contains_key(**family))
                .map(|family| family.to_string()),
        );
        self.collection_order.push(name.to_string());
        self.collections.insert(name.to_string(), collection);
        self.refresh();
        self.notify(&ChangeEvent::CategoriesChanged);
        self.notify(&ChangeEvent::CollectionsChanged);
        Ok(())
    }

    /// Rename a collection in place, keeping its saved-order position.
    pub fn rename_collection(&mut self, name: &str, new_name: &str) -> Result<()> {
        if !self.collections.contains_key(name) {
            return Err(CatalogError::UnknownCollection(name.to_string()));
        }
        if new_name != name
            && (self.collections.contains_key(new_name) || self.categories.contains_key(new_name))
        {
            return Err(CatalogError::NameCollision(new_name.to_string()));
        }
        if let Some(mut collection) = self.collections.remove(name) {
            collection.name = new_name.to_string();
            self.collections.insert(new_name.to_string(), collection);
        }
        for entry in &mut self.collection_order {
            if entry == name {
                *entry = new_name.to_string();
            }
        }
        self.notify(&ChangeEvent::CollectionsChanged);
        Ok(())
    }

    pub fn remove_collection(&mut self, name: &str) -> Result<()> {
        if self.collections.remove(name).is_none() {
            return Err(CatalogError::UnknownCollection(name.to_string()));
        }
        self.collection_order.retain(|n| n != name);
        self.refresh();
        self.notify(&ChangeEvent::CategoriesChanged);
        self.notify(&ChangeEvent::CollectionsChanged);
        Ok(())
    }

    /// Add families to a collection. Names that do not resolve to a known
    /// family are dropped silently.
    pub fn add_families_to(&mut self, collection: &str, names: &[&str]) -> Result<()> {
        let known: Vec<String> = names
            .iter()
            .filter(|name| self.families.contains_key(**name))
            .map(|name| name.to_string())
            .collect();
        let target = self
            .collections
            .get_mut(collection)
            .ok_or_else(|| CatalogError::UnknownCollection(collection.to_string()))?;
        target.add(known);
        self.refresh();
        self.notify(&ChangeEvent::CategoriesChanged);
        self.notify(&ChangeEvent::CollectionsChanged);
        Ok(())
    }

    pub fn remove_families_from(&mut self, collection: &str, names: &[&str]) -> Result<()> {
        let target = self
            .collections
            .get_mut(collection)
            .ok_or_else(|| CatalogError::UnknownCollection(collection.to_string()))?;
        for name in names {
            target.remove(name);
        }
        self.refresh();
        self.notify(&ChangeEvent::CategoriesChanged);
        self.notify(&ChangeEvent::CollectionsChanged);
        Ok(())
    }

    /// Persist user collections in their current order.
    pub fn save_collections(&self) -> Result<()> {
        if let Some(store) = &self.store {
            let ordered: Vec<&Collection> = self
                .collection_order
                .iter()
                .filter_map(|name| self.collections.get(name))
                .collect();
            store.save(ordered)?;
        }
        Ok(())
    }

    /// Recompute everything derived: aggregate enabled flags and the
    /// Orphans category.
    fn refresh(&mut self) {
        let families = &self.families;
        let lookup = |name: &str| families.get(name).map_or(false, |f| f.enabled);

        for collection in self.collections.values_mut() {
            collection.refresh_enabled(lookup);
        }

        let mut claimed: BTreeSet<String> = BTreeSet::new();
        for collection in self.collections.values() {
            claimed.extend(collection.families.iter().cloned());
        }
        let orphans: BTreeSet<String> = families
            .keys()
            .filter(|name| !claimed.contains(*name))
            .cloned()
            .collect();
        if let Some(category) = self.categories.get_mut(CATEGORY_ORPHANS) {
            category.families = orphans;
        }

        for category in self.categories.values_mut() {
            category.refresh_enabled(lookup);
        }
    }

    fn notify(&mut self, event: &ChangeEvent) {
        for observer in &mut self.observers {
            observer(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn family(name: &str, owner: Owner) -> Family {
        Family::new(name, owner)
    }

    fn sample_catalog() -> Catalog {
        Catalog::new(vec![
            family("Cambria", Owner::System),
            family("Consolas", Owner::System),
            family("Georgia", Owner::User),
            family("Impact", Owner::User),
        ])
    }

    #[test]
    fn categories_partition_by_owner() {
        let catalog = sample_catalog();
        assert_eq!(catalog.category(CATEGORY_ALL).unwrap().len(), 4);
        assert!(catalog
            .category(CATEGORY_SYSTEM)
            .unwrap()
            .contains("Consolas"));
        assert!(catalog.category(CATEGORY_USER).unwrap().contains("Georgia"));
    }

    #[test]
    fn orphans_are_families_in_no_collection() {
        let mut catalog = sample_catalog();
        catalog.create_collection("Headers", None, &[]).expect("create");
        catalog.create_collection("Body", None, &[]).expect("create");
        catalog
            .add_families_to("Headers", &["Cambria", "Impact"])
            .expect("add");
        catalog
            .add_families_to("Body", &["Cambria", "Georgia"])
            .expect("add");

        let orphans = catalog.category(CATEGORY_ORPHANS).expect("orphans");
        assert_eq!(orphans.len(), 1);
        assert!(orphans.contains("Consolas"));

        catalog.remove_collection("Headers").expect("remove");
        let orphans = catalog.category(CATEGORY_ORPHANS).expect("orphans");
        assert!(orphans.contains("Impact"));
        assert!(!orphans.contains("Cambria"));
    }

    #[test]
    fn collection_enabled_is_an_or_reduction() {
        let mut catalog = sample_catalog();
        catalog.create_collection("Serifs", None, &[]).expect("create");
        catalog
            .add_families_to("Serifs", &["Cambria", "Georgia"])
            .expect("add");
        assert!(catalog.collection("Serifs").unwrap().enabled);

        catalog.set_enabled(&["Cambria"], false).expect("disable");
        assert!(catalog.collection("Serifs").unwrap().enabled);

        catalog.set_enabled(&["Georgia"], false).expect("disable");
        assert!(!catalog.collection("Serifs").unwrap().enabled);

        catalog.enable_collection("Serifs").expect("enable");
        assert!(catalog.family("Cambria").unwrap().enabled);
        assert!(catalog.family("Georgia").unwrap().enabled);
    }

    #[test]
    fn unknown_family_leaves_state_untouched() {
        let mut catalog = sample_catalog();
        let err = catalog
            .set_enabled(&["Cambria", "No Such Family"], false)
            .unwrap_err();
        assert!(matches!(err, CatalogError::UnknownFamily(name) if name == "No Such Family"));
        assert!(catalog.family("Cambria").unwrap().enabled);
    }

    #[test]
    fn collection_names_collide_with_categories() {
        let mut catalog = sample_catalog();
        let err = catalog.create_collection("Orphans", None, &[]).unwrap_err();
        assert!(matches!(err, CatalogError::NameCollision(_)));
        catalog.create_collection("Mine", None, &[]).expect("create");
        let err = catalog.create_collection("Mine", None, &[]).unwrap_err();
        assert!(matches!(err, CatalogError::NameCollision(_)));
    }

    #[test]
    fn create_seeds_known_families_only() {
        let mut catalog = sample_catalog();
        catalog
            .create_collection("Seeded", None, &["Georgia", "No Such Family"])
            .expect("create");
        let seeded = catalog.collection("Seeded").unwrap();
        assert_eq!(seeded.len(), 1);
        assert!(seeded.contains("Georgia"));
    }

    #[test]
    fn rename_keeps_members_and_order_position() {
        let mut catalog = sample_catalog();
        catalog
            .create_collection("Old", None, &["Cambria"])
            .expect("create");
        catalog.create_collection("Other", None, &[]).expect("create");

        catalog.rename_collection("Old", "New").expect("rename");
        assert!(catalog.collection("Old").is_none());
        assert!(catalog.collection("New").unwrap().contains("Cambria"));
        assert_eq!(catalog.collection_names(), vec!["New", "Other"]);

        let err = catalog.rename_collection("New", "Other").unwrap_err();
        assert!(matches!(err, CatalogError::NameCollision(_)));
        let err = catalog.rename_collection("Gone", "X").unwrap_err();
        assert!(matches!(err, CatalogError::UnknownCollection(_)));
    }

    #[test]
    fn membership_edits_drop_unknown_names() {
        let mut catalog = sample_catalog();
        catalog.create_collection("Picks", None, &[]).expect("create");
        catalog
            .add_families_to("Picks", &["Georgia", "Wingdings 9"])
            .expect("add");
        let picks = catalog.collection("Picks").unwrap();
        assert_eq!(picks.len(), 1);
        assert!(!picks.contains("Wingdings 9"));
    }

    #[test]
    fn observers_hear_about_mutations() {
        let mut catalog = sample_catalog();
        let seen: Rc<RefCell<Vec<ChangeEvent>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        catalog.add_observer(Box::new(move |event| sink.borrow_mut().push(*event)));

        catalog.create_collection("Picks", None, &[]).expect("create");
        assert_eq!(
            seen.borrow().as_slice(),
            &[
                ChangeEvent::CategoriesChanged,
                ChangeEvent::CollectionsChanged
            ]
        );

        catalog.set_enabled(&["Impact"], false).expect("disable");
        assert!(seen.borrow().contains(&ChangeEvent::CategoriesChanged));
    }

    #[test]
    fn adopting_collections_preserves_order() {
        let mut catalog = sample_catalog();
        let mut zebra = Collection::new("Zebra");
        zebra.add(["Impact".to_string()]);
        let apricot = Collection::new("Apricot");
        catalog.adopt_collections(vec![zebra, apricot]);
        assert_eq!(catalog.collection_names(), vec!["Zebra", "Apricot"]);
    }
}
