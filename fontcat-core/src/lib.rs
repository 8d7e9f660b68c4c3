//! fontcat-core: reconciling what the layout stack says with what's on disk
//!
//! Font state lives in three places that drift apart constantly: the layout
//! stack's live list of families, a relational index of font files, and a
//! cache of previously assembled family descriptors. This crate folds the
//! three into a single [`Catalog`] that callers can trust, and keeps the
//! derived bits (built-in categories, user collections, enablement) honest
//! across mutations.
//!
//! The moving parts:
//!
//! - [`index::FileIndex`]: one row per font file and style, rebuilt by a
//!   [`scan::FileScanner`] and persisted as versioned JSON.
//! - [`cache::ObjectCache`]: assembled [`Family`] values from earlier runs,
//!   invalidated wholesale when anything about it looks wrong.
//! - [`enumerate::FamilyEnumerator`]: whatever the layout stack reports
//!   right now. The shipped scanner doubles as one.
//! - [`reconcile::reconcile`]: intersects all of the above into a catalog.
//! - [`store::CollectionStore`] and [`blacklist::BlacklistFile`]: ordered,
//!   crash-safe persistence for user collections and disabled families.
//! - [`populate::BatchPopulator`]: batched traversal for interactive hosts.
//!
//! Persistence is self-healing throughout: a bad index, cache, or
//! collections file is logged, discarded, and rebuilt rather than reported.
//!
//! ```rust,no_run
//! use fontcat_core::enumerate::StaticEnumerator;
//! use fontcat_core::progress::CancelToken;
//! use fontcat_core::reconcile::{reconcile, Locations};
//!
//! let locations = Locations::new("/var/lib/fontcat");
//! let enumerator = StaticEnumerator::new(Vec::new());
//! let cancel = CancelToken::new();
//!
//! let mut catalog = reconcile(&enumerator, &locations, &mut |_| {}, &cancel)?;
//! for family in catalog.families() {
//!     println!("{} ({} styles)", family.name, family.style_count());
//! }
//! catalog.set_enabled(&["Comic Neue"], false)?;
//! # Ok::<(), fontcat_core::CatalogError>(())
//! ```

pub mod blacklist;
pub mod cache;
pub mod catalog;
pub mod collection;
pub mod enumerate;
pub mod error;
pub mod family;
pub mod index;
pub mod populate;
pub mod progress;
pub mod reconcile;
pub mod scan;
pub mod store;
pub mod xml;

pub use catalog::Catalog;
pub use collection::Collection;
pub use error::{CatalogError, Result};
pub use family::Family;
