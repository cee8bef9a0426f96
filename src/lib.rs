//! # Stockloc
//!
//! 倉庫儲位分類：區域推導、儲格名稱生成、揀貨區內名稱唯一性，以及多箱裝箱。
//!
//! ## 範例
//!
//! ```
//! use stockloc::{
//!     FieldValue, Location, LocationChange, LocationConfig, LocationKind, LocationStore,
//!     LocationTree, PlacementField,
//! };
//!
//! let mut tree = LocationTree::new();
//! let area = tree
//!     .insert(
//!         Location::new("A1")
//!             .with_kind(LocationKind::Area)
//!             .with_name_format("{area}-{corridor:0>2}.{rack:0>3}.{level:0>2}"),
//!     )
//!     .unwrap();
//! let bin = tree
//!     .insert(
//!         Location::new("new bin")
//!             .with_parent(area)
//!             .with_kind(LocationKind::Bin)
//!             .with_placement("3", "L", "11", "2"),
//!     )
//!     .unwrap();
//!
//! let mut store = LocationStore::from_tree(tree, LocationConfig::default()).unwrap();
//! store
//!     .update(
//!         bin,
//!         LocationChange::SetPlacement(PlacementField::Rack, FieldValue::from("12")),
//!     )
//!     .unwrap();
//!
//! let bin = store.tree().location(bin).unwrap();
//! assert_eq!(bin.area.as_deref(), Some("A1"));
//! assert_eq!(bin.name, "A1-03.012.02");
//! ```

pub use stockloc_cache::{ChangeSet, CommitReport, DirtyTracker, LocationChange, LocationStore};
pub use stockloc_calc::{
    AreaResolver, NameTemplate, NameTemplateResolver, ZoneScopeIndex, ZoneUniquenessChecker,
};
pub use stockloc_core::{
    FieldSnapshot, FieldValue, Location, LocationConfig, LocationError, LocationKind,
    LocationTree, PickingZone, PlacementField, Result,
};
pub use stockloc_pack::{
    put_in_pack, DestinationCheck, MoveLine, MultiPackWizard, NoDestinationCheck, PackDecision,
    PackError, Picking,
};
