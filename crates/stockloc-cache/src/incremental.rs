//! 增量重算與變更集

use serde::{Deserialize, Serialize};
use stockloc_calc::{AreaResolver, NameTemplate, NameTemplateResolver, ZoneUniquenessChecker};
use stockloc_core::{
    FieldValue, Location, LocationConfig, LocationError, LocationKind, LocationTree,
    PickingZone, PlacementField, Result,
};
use uuid::Uuid;

use crate::dirty_tracking::DirtyTracker;

/// 儲位欄位變更
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocationChange {
    /// 變更名稱
    Rename(String),
    /// 變更種類
    SetKind(Option<LocationKind>),
    /// 移動到另一個上層儲位
    Move(Option<Uuid>),
    /// 變更擺放位置欄位
    SetPlacement(PlacementField, FieldValue),
    /// 變更名稱格式
    SetNameFormat(Option<String>),
    /// 變更直接連結的揀貨區
    SetPickingZone(Option<Uuid>),
}

/// 提交結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitReport {
    /// 新建的儲位
    pub created: Vec<Uuid>,

    /// 區域有變化的儲位
    pub areas_updated: Vec<Uuid>,

    /// 名稱由名稱格式重新生成的儲位
    pub names_updated: Vec<Uuid>,

    /// 通過唯一性檢查的儲位
    pub validated: Vec<Uuid>,
}

impl CommitReport {
    fn normalize(&mut self) {
        for ids in [
            &mut self.areas_updated,
            &mut self.names_updated,
            &mut self.validated,
        ] {
            ids.sort();
            ids.dedup();
        }
    }
}

/// 儲位存放區
///
/// 持有已提交的儲位樹。所有修改都透過 [`ChangeSet`] 在私有工作副本上進行，
/// 驗證全部通過後才替換已提交的版本。
#[derive(Debug, Clone)]
pub struct LocationStore {
    tree: LocationTree,
    config: LocationConfig,
    version: u64,
}

impl LocationStore {
    /// 創建空的存放區
    pub fn new(config: LocationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            tree: LocationTree::with_config(&config),
            config,
            version: 0,
        })
    }

    /// 以既有儲位樹創建存放區，並重算所有區域
    ///
    /// 儲位樹改用配置中的最大深度。
    pub fn from_tree(mut tree: LocationTree, config: LocationConfig) -> Result<Self> {
        config.validate()?;
        tree.set_max_depth(config.max_depth);
        AreaResolver::resolve_all(&mut tree)?;
        Ok(Self {
            tree,
            config,
            version: 0,
        })
    }

    /// 已提交的儲位樹
    pub fn tree(&self) -> &LocationTree {
        &self.tree
    }

    pub fn config(&self) -> &LocationConfig {
        &self.config
    }

    /// 已提交的版本號，每次提交加一
    pub fn version(&self) -> u64 {
        self.version
    }

    /// 新增揀貨區
    pub fn add_zone(&mut self, zone: PickingZone) -> Uuid {
        self.version += 1;
        self.tree.add_zone(zone)
    }

    /// 開始一個變更集
    pub fn begin(&self) -> ChangeSet {
        ChangeSet {
            base_version: self.version,
            working: self.tree.clone(),
            tracker: DirtyTracker::new(),
            config: self.config.clone(),
            report: CommitReport::default(),
        }
    }

    /// 提交變更集
    ///
    /// 變更集必須基於目前的版本；任何一筆唯一性檢查失敗，整批變更都不會生效。
    pub fn commit(&mut self, mut changes: ChangeSet) -> Result<CommitReport> {
        if changes.base_version != self.version {
            tracing::warn!(
                "拒絕過期的變更集：基於版本 {}，目前版本 {}",
                changes.base_version,
                self.version
            );
            return Err(LocationError::ConcurrentModification);
        }

        let checks: Vec<Uuid> = changes
            .tracker
            .take_pending_checks()
            .into_iter()
            .filter(|id| changes.working.contains(*id))
            .collect();

        if let Err(err) = ZoneUniquenessChecker::check_many(
            &changes.working,
            &checks,
            self.config.parallel_validation,
        ) {
            tracing::warn!("變更集驗證失敗，整批變更已捨棄: {}", err);
            return Err(err);
        }

        let mut report = changes.report;
        report.validated = checks;
        report.normalize();

        self.tree = changes.working;
        self.version += 1;

        tracing::info!(
            "提交變更集（版本 {}）：新建 {} 筆，區域更新 {} 筆，名稱更新 {} 筆，檢查 {} 筆",
            self.version,
            report.created.len(),
            report.areas_updated.len(),
            report.names_updated.len(),
            report.validated.len()
        );
        Ok(report)
    }

    /// 新建單一儲位並立即提交
    pub fn create(&mut self, location: Location) -> Result<Uuid> {
        let mut changes = self.begin();
        let id = changes.create(location)?;
        self.commit(changes)?;
        Ok(id)
    }

    /// 修改單一儲位並立即提交
    pub fn update(&mut self, location_id: Uuid, change: LocationChange) -> Result<CommitReport> {
        let mut changes = self.begin();
        changes.apply(location_id, change)?;
        self.commit(changes)
    }

    /// 複製儲位並立即提交，未指定名稱時附加複製後綴
    pub fn duplicate(&mut self, location_id: Uuid, name: Option<String>) -> Result<Uuid> {
        let mut changes = self.begin();
        let id = changes.duplicate(location_id, name)?;
        self.commit(changes)?;
        Ok(id)
    }
}

/// 變更集
///
/// 每次修改後立即重算受影響的衍生值（區域、儲格名稱）；
/// 唯一性檢查延到 [`LocationStore::commit`] 時執行。
/// 單次修改失敗時，工作副本回到修改前的狀態。
#[derive(Debug, Clone)]
pub struct ChangeSet {
    base_version: u64,
    working: LocationTree,
    tracker: DirtyTracker,
    config: LocationConfig,
    report: CommitReport,
}

impl ChangeSet {
    /// 工作副本（包含尚未提交的修改）
    pub fn tree(&self) -> &LocationTree {
        &self.working
    }

    /// 目前累積的重算結果
    pub fn report(&self) -> &CommitReport {
        &self.report
    }

    /// 新建儲位
    ///
    /// 名稱照原樣使用，不會套用名稱格式。
    pub fn create(&mut self, location: Location) -> Result<Uuid> {
        self.guarded(|changes| {
            let id = changes.working.insert(location)?;
            changes.tracker.mark_area_dirty(id);
            changes.tracker.mark_for_validation(id);
            changes.report.created.push(id);
            Ok(id)
        })
    }

    /// 複製儲位（不含下層儲位），未指定名稱時附加複製後綴
    pub fn duplicate(&mut self, location_id: Uuid, name: Option<String>) -> Result<Uuid> {
        let source = self.working.location(location_id)?;
        let name = name.unwrap_or_else(|| self.config.copy_name(&source.name));
        let copy = Location {
            id: Uuid::new_v4(),
            name,
            ..source.clone()
        };

        tracing::debug!("複製儲位 {} → {}", source.name, copy.name);
        self.create(copy)
    }

    /// 套用欄位變更
    pub fn apply(&mut self, location_id: Uuid, change: LocationChange) -> Result<()> {
        self.guarded(|changes| changes.apply_change(location_id, change))
    }

    /// 重新生成某儲位之下所有儲格的名稱
    pub fn regenerate_names(&mut self, root_id: Uuid) -> Result<()> {
        self.guarded(|changes| {
            let bins: Vec<Uuid> = changes
                .working
                .descendants_of(&[root_id])
                .into_iter()
                .collect();
            if bins.is_empty() {
                return Err(LocationError::LocationNotFound(root_id));
            }
            for id in bins {
                changes.tracker.mark_name_dirty(id);
            }
            Ok(())
        })
    }

    fn guarded<T, F>(&mut self, operation: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        let checkpoint = (
            self.working.clone(),
            self.tracker.clone(),
            self.report.clone(),
        );

        let result = operation(self).and_then(|value| {
            self.recompute()?;
            Ok(value)
        });
        if let Err(err) = &result {
            tracing::warn!("儲位修改被拒絕: {}", err);
            (self.working, self.tracker, self.report) = checkpoint;
        }
        result
    }

    fn apply_change(&mut self, location_id: Uuid, change: LocationChange) -> Result<()> {
        match change {
            LocationChange::Rename(name) => {
                let location = self.working.location_mut(location_id)?;
                if location.name == name {
                    return Ok(());
                }
                location.name = name;
                if location.is_area() {
                    self.mark_subtree_area(location_id);
                }
                self.tracker.mark_for_validation(location_id);
            }
            LocationChange::SetKind(kind) => {
                let location = self.working.location_mut(location_id)?;
                if location.kind == kind {
                    return Ok(());
                }
                location.kind = kind;
                self.mark_subtree_area(location_id);
            }
            LocationChange::Move(parent_id) => {
                if self.working.set_parent(location_id, parent_id)? {
                    self.mark_subtree_area(location_id);
                    self.mark_subtree_for_validation(location_id);
                }
            }
            LocationChange::SetPlacement(field, value) => {
                let location = self.working.location_mut(location_id)?;
                if location.set_placement(field, value)? && location.is_bin() {
                    self.tracker.mark_name_dirty(location_id);
                }
            }
            LocationChange::SetNameFormat(name_format) => {
                let name_format = name_format.filter(|format| !format.is_empty());
                if let Some(format) = &name_format {
                    NameTemplate::parse(format)?;
                }
                self.working.location_mut(location_id)?.name_format = name_format;
            }
            LocationChange::SetPickingZone(zone_id) => {
                if let Some(zone_id) = zone_id {
                    if self.working.zone(zone_id).is_none() {
                        return Err(LocationError::ZoneNotFound(zone_id));
                    }
                }
                let location = self.working.location_mut(location_id)?;
                if location.picking_zone_id == zone_id {
                    return Ok(());
                }
                location.picking_zone_id = zone_id;
                self.mark_subtree_for_validation(location_id);
            }
        }
        Ok(())
    }

    fn mark_subtree_area(&mut self, location_id: Uuid) {
        for id in self.working.descendants_of(&[location_id]) {
            self.tracker.mark_area_dirty(id);
        }
    }

    fn mark_subtree_for_validation(&mut self, location_id: Uuid) {
        for id in self.working.descendants_of(&[location_id]) {
            self.tracker.mark_for_validation(id);
        }
    }

    /// 重算髒標記的衍生值：先由上而下重算區域，再重算儲格名稱
    fn recompute(&mut self) -> Result<()> {
        let mut dirty_areas = Vec::new();
        for id in self.tracker.take_dirty_areas() {
            if self.working.contains(id) {
                dirty_areas.push((self.working.depth(id)?, id));
            }
        }
        dirty_areas.sort();

        for (_, id) in dirty_areas {
            if AreaResolver::resolve(&mut self.working, id)? {
                self.report.areas_updated.push(id);
            }
        }

        for id in self.tracker.take_dirty_names() {
            if !self.working.contains(id) {
                continue;
            }
            if NameTemplateResolver::resolve(&mut self.working, id)? {
                self.report.names_updated.push(id);
                self.tracker.mark_for_validation(id);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAYOUT: &str = "{area}-{corridor:0>2}.{rack:0>3}.{level:0>2}";

    struct Fixture {
        store: LocationStore,
        zone: Uuid,
        anchor: Uuid,
        area: Uuid,
        bin: Uuid,
    }

    fn fixture() -> Fixture {
        let mut store = LocationStore::new(LocationConfig::default()).unwrap();
        let zone = store.add_zone(PickingZone::new("Zone 1"));

        let mut changes = store.begin();
        let anchor = changes
            .create(
                Location::new("Z1")
                    .with_kind(LocationKind::Zone)
                    .with_picking_zone(zone),
            )
            .unwrap();
        let area = changes
            .create(
                Location::new("A1")
                    .with_parent(anchor)
                    .with_kind(LocationKind::Area)
                    .with_name_format(LAYOUT),
            )
            .unwrap();
        let bin = changes
            .create(
                Location::new("Bin A")
                    .with_parent(area)
                    .with_kind(LocationKind::Bin),
            )
            .unwrap();
        store.commit(changes).unwrap();

        Fixture {
            store,
            zone,
            anchor,
            area,
            bin,
        }
    }

    #[test]
    fn test_create_computes_area() {
        let f = fixture();
        let tree = f.store.tree();

        assert_eq!(tree.location(f.anchor).unwrap().area, None);
        assert_eq!(tree.location(f.area).unwrap().area.as_deref(), Some("A1"));
        assert_eq!(tree.location(f.bin).unwrap().area.as_deref(), Some("A1"));
        assert_eq!(tree.location(f.bin).unwrap().name, "Bin A");
        assert_eq!(f.store.version(), 2);
    }

    #[test]
    fn test_rename_area_propagates_down() {
        let mut f = fixture();

        let report = f
            .store
            .update(f.area, LocationChange::Rename("B2".to_string()))
            .unwrap();

        assert_eq!(report.areas_updated, {
            let mut ids = vec![f.area, f.bin];
            ids.sort();
            ids
        });
        assert_eq!(
            f.store.tree().location(f.bin).unwrap().area.as_deref(),
            Some("B2")
        );
    }

    #[test]
    fn test_set_kind_recomputes_subtree() {
        let mut f = fixture();

        f.store
            .update(f.area, LocationChange::SetKind(None))
            .unwrap();
        assert_eq!(f.store.tree().location(f.bin).unwrap().area, None);

        f.store
            .update(f.anchor, LocationChange::SetKind(Some(LocationKind::Area)))
            .unwrap();
        assert_eq!(
            f.store.tree().location(f.bin).unwrap().area.as_deref(),
            Some("Z1")
        );
    }

    #[test]
    fn test_placement_change_renames_bin() {
        let mut f = fixture();
        let mut changes = f.store.begin();
        changes
            .apply(f.bin, LocationChange::SetPlacement(PlacementField::Corridor, "3".into()))
            .unwrap();
        changes
            .apply(f.bin, LocationChange::SetPlacement(PlacementField::Rack, "12".into()))
            .unwrap();
        changes
            .apply(f.bin, LocationChange::SetPlacement(PlacementField::Level, "2".into()))
            .unwrap();

        // 工作副本立即反映重算後的名稱
        assert_eq!(changes.tree().location(f.bin).unwrap().name, "A1-03.012.02");
        assert_eq!(f.store.tree().location(f.bin).unwrap().name, "Bin A");

        let report = f.store.commit(changes).unwrap();
        assert_eq!(report.names_updated, vec![f.bin]);
        assert!(report.validated.contains(&f.bin));
        assert_eq!(
            f.store.tree().location(f.bin).unwrap().name,
            "A1-03.012.02"
        );
    }

    #[test]
    fn test_placement_change_on_non_bin_keeps_name() {
        let mut f = fixture();

        let report = f
            .store
            .update(
                f.area,
                LocationChange::SetPlacement(PlacementField::Corridor, "9".into()),
            )
            .unwrap();
        assert!(report.names_updated.is_empty());
        assert_eq!(f.store.tree().location(f.area).unwrap().name, "A1");
    }

    #[test]
    fn test_template_error_rolls_back_single_change() {
        let mut f = fixture();
        let mut changes = f.store.begin();
        changes
            .apply(f.area, LocationChange::SetNameFormat(Some("{area}/{level}".into())))
            .unwrap();
        changes
            .apply(f.bin, LocationChange::SetPlacement(PlacementField::Level, "1".into()))
            .unwrap();

        // 名稱格式引用不存在的欄位時，修改被拒絕，工作副本維持原狀
        changes.working.location_mut(f.area).unwrap().name_format = Some("{shelf}".into());

        let err = changes
            .apply(f.bin, LocationChange::SetPlacement(PlacementField::Level, "4".into()))
            .unwrap_err();
        assert_eq!(
            err,
            LocationError::TemplateField {
                field: "shelf".to_string()
            }
        );
        let bin = changes.tree().location(f.bin).unwrap();
        assert_eq!(bin.level.as_deref(), Some("1"));
        assert_eq!(bin.name, "A1/1");
    }

    #[test]
    fn test_invalid_name_format_rejected_early() {
        let mut f = fixture();

        let err = f
            .store
            .update(f.area, LocationChange::SetNameFormat(Some("{area".into())))
            .unwrap_err();
        assert!(matches!(err, LocationError::TemplateSyntax { .. }));
        assert_eq!(
            f.store.tree().location(f.area).unwrap().name_format.as_deref(),
            Some(LAYOUT)
        );
    }

    #[test]
    fn test_duplicate_name_rejects_whole_change_set() {
        let mut f = fixture();
        let version = f.store.version();

        let mut changes = f.store.begin();
        changes
            .apply(f.area, LocationChange::Rename("A9".to_string()))
            .unwrap();
        changes
            .create(Location::new("Bin A").with_parent(f.anchor))
            .unwrap();

        let err = f.store.commit(changes).unwrap_err();
        assert!(matches!(
            err,
            LocationError::DuplicateNameInZone { zone, .. } if zone == f.zone
        ));

        assert_eq!(f.store.version(), version);
        assert_eq!(f.store.tree().len(), 3);
        assert_eq!(f.store.tree().location(f.area).unwrap().name, "A1");
    }

    #[test]
    fn test_duplicate_uses_copy_suffix() {
        let mut f = fixture();

        let copy = f.store.duplicate(f.bin, None).unwrap();
        let copied = f.store.tree().location(copy).unwrap();
        assert_eq!(copied.name, "Bin A (copy)");
        assert_eq!(copied.parent_id, Some(f.area));
        assert_eq!(copied.area.as_deref(), Some("A1"));

        // 明確指定相同名稱則違反唯一性
        assert!(matches!(
            f.store.duplicate(f.bin, Some("Bin A".to_string())),
            Err(LocationError::DuplicateNameInZone { .. })
        ));
    }

    #[test]
    fn test_move_into_zone_validates_subtree() {
        let mut f = fixture();
        let outside = f.store.create(Location::new("Loose")).unwrap();
        let child = f
            .store
            .create(Location::new("Bin A").with_parent(outside))
            .unwrap();

        let err = f
            .store
            .update(outside, LocationChange::Move(Some(f.anchor)))
            .unwrap_err();
        assert!(matches!(
            err,
            LocationError::DuplicateNameInZone { location, .. } if location == child
        ));
        assert_eq!(f.store.tree().location(outside).unwrap().parent_id, None);
    }

    #[test]
    fn test_move_recomputes_area() {
        let mut f = fixture();
        let other_area = f
            .store
            .create(
                Location::new("A2")
                    .with_parent(f.anchor)
                    .with_kind(LocationKind::Area),
            )
            .unwrap();

        f.store
            .update(f.bin, LocationChange::Move(Some(other_area)))
            .unwrap();
        assert_eq!(
            f.store.tree().location(f.bin).unwrap().area.as_deref(),
            Some("A2")
        );
    }

    #[test]
    fn test_move_rejects_cycle() {
        let mut f = fixture();

        assert_eq!(
            f.store
                .update(f.anchor, LocationChange::Move(Some(f.bin)))
                .unwrap_err(),
            LocationError::CyclicHierarchy(f.anchor)
        );
    }

    #[test]
    fn test_set_picking_zone_validates_subtree() {
        let mut f = fixture();
        let loose = f.store.create(Location::new("Loose")).unwrap();
        f.store
            .create(Location::new("Bin A").with_parent(loose))
            .unwrap();

        assert!(matches!(
            f.store
                .update(loose, LocationChange::SetPickingZone(Some(f.zone))),
            Err(LocationError::DuplicateNameInZone { .. })
        ));

        let unknown = Uuid::new_v4();
        assert_eq!(
            f.store
                .update(loose, LocationChange::SetPickingZone(Some(unknown)))
                .unwrap_err(),
            LocationError::ZoneNotFound(unknown)
        );

        let other_zone = f.store.add_zone(PickingZone::new("Zone 2"));
        assert!(f
            .store
            .update(loose, LocationChange::SetPickingZone(Some(other_zone)))
            .is_ok());
    }

    #[test]
    fn test_stale_change_set_rejected() {
        let mut f = fixture();
        let first = f.store.begin();
        let mut second = f.store.begin();
        second
            .apply(f.bin, LocationChange::Rename("Bin B".to_string()))
            .unwrap();

        f.store.commit(first).unwrap();
        assert_eq!(
            f.store.commit(second).unwrap_err(),
            LocationError::ConcurrentModification
        );
    }

    #[test]
    fn test_regenerate_names() {
        let mut f = fixture();
        let mut changes = f.store.begin();
        changes.working.location_mut(f.bin).unwrap().corridor = Some("5".to_string());
        changes.regenerate_names(f.area).unwrap();

        assert_eq!(changes.tree().location(f.bin).unwrap().name, "A1-05.000.00");
        assert!(changes.regenerate_names(Uuid::new_v4()).is_err());
    }

    #[test]
    fn test_from_tree_uses_config_depth() {
        let mut tree = LocationTree::new();
        let a = tree.insert(Location::new("a")).unwrap();
        let b = tree.insert(Location::new("b").with_parent(a)).unwrap();
        tree.insert(Location::new("c").with_parent(b)).unwrap();

        let store = LocationStore::from_tree(
            tree.clone(),
            LocationConfig::default().with_max_depth(3),
        )
        .unwrap();
        assert_eq!(store.tree().max_depth(), 3);

        assert!(matches!(
            LocationStore::from_tree(tree, LocationConfig::default().with_max_depth(2)),
            Err(LocationError::CyclicHierarchy(_))
        ));
    }
}
