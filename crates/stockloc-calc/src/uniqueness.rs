//! 揀貨區內名稱唯一性檢查

use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use stockloc_core::{Location, LocationError, LocationTree, Result};
use uuid::Uuid;

/// 揀貨區內的名稱索引
///
/// 涵蓋所有直接連結到此揀貨區的儲位（錨點）及其下層儲位。
#[derive(Debug, Clone)]
pub struct ZoneScopeIndex {
    zone_id: Uuid,
    names: HashMap<String, Vec<Uuid>>,
}

impl ZoneScopeIndex {
    /// 建立揀貨區索引
    pub fn build(tree: &LocationTree, zone_id: Uuid) -> Self {
        let mut names: HashMap<String, Vec<Uuid>> = HashMap::new();
        for id in ZoneUniquenessChecker::zone_scope(tree, zone_id) {
            if let Some(location) = tree.get(id) {
                names.entry(location.name.clone()).or_default().push(id);
            }
        }
        for ids in names.values_mut() {
            ids.sort();
        }

        Self { zone_id, names }
    }

    pub fn zone_id(&self) -> Uuid {
        self.zone_id
    }

    /// 範圍內與指定儲位同名的其他儲位
    pub fn conflict(&self, location: &Location) -> Option<Uuid> {
        self.names
            .get(&location.name)?
            .iter()
            .copied()
            .find(|id| *id != location.id)
    }

    fn check(&self, location: &Location) -> Result<()> {
        match self.conflict(location) {
            Some(conflicting) => Err(LocationError::DuplicateNameInZone {
                name: location.name.clone(),
                zone: self.zone_id,
                location: location.id,
                conflicting,
            }),
            None => Ok(()),
        }
    }
}

/// 揀貨區名稱唯一性檢查器
pub struct ZoneUniquenessChecker;

impl ZoneUniquenessChecker {
    /// 儲位所屬的揀貨區：從自身往上找第一個設置了揀貨區的儲位
    pub fn owning_zone(tree: &LocationTree, location_id: Uuid) -> Result<Option<Uuid>> {
        Ok(tree
            .find_ancestor(location_id, |location| location.picking_zone_id.is_some())?
            .and_then(|anchor| anchor.picking_zone_id))
    }

    /// 直接連結到揀貨區的錨點儲位
    pub fn anchors(tree: &LocationTree, zone_id: Uuid) -> Vec<Uuid> {
        let mut anchors: Vec<Uuid> = tree
            .locations()
            .filter(|location| location.picking_zone_id == Some(zone_id))
            .map(|location| location.id)
            .collect();
        anchors.sort();
        anchors
    }

    /// 揀貨區範圍：所有錨點及其下層儲位
    pub fn zone_scope(tree: &LocationTree, zone_id: Uuid) -> HashSet<Uuid> {
        tree.descendants_of(&Self::anchors(tree, zone_id))
    }

    /// 檢查單一儲位
    ///
    /// 沒有所屬揀貨區的儲位不受限制。
    pub fn check(tree: &LocationTree, location_id: Uuid) -> Result<()> {
        let location = tree.location(location_id)?;
        let Some(zone_id) = Self::owning_zone(tree, location_id)? else {
            return Ok(());
        };

        ZoneScopeIndex::build(tree, zone_id).check(location)
    }

    /// 檢查多筆儲位
    ///
    /// 每個揀貨區只建立一次索引；發生衝突時返回候選順序中的第一個錯誤。
    pub fn check_many(tree: &LocationTree, location_ids: &[Uuid], parallel: bool) -> Result<()> {
        let mut candidates = Vec::with_capacity(location_ids.len());
        for &location_id in location_ids {
            let location = tree.location(location_id)?;
            if let Some(zone_id) = Self::owning_zone(tree, location_id)? {
                candidates.push((location, zone_id));
            }
        }

        let zone_ids: HashSet<Uuid> = candidates.iter().map(|(_, zone_id)| *zone_id).collect();
        let indexes: HashMap<Uuid, ZoneScopeIndex> = zone_ids
            .into_iter()
            .map(|zone_id| (zone_id, ZoneScopeIndex::build(tree, zone_id)))
            .collect();

        tracing::debug!(
            "唯一性檢查：候選 {} 筆，需檢查 {} 筆，揀貨區 {} 個",
            location_ids.len(),
            candidates.len(),
            indexes.len()
        );

        let check = |(location, zone_id): &(&Location, Uuid)| -> Result<()> {
            match indexes.get(zone_id) {
                Some(index) => index.check(location),
                None => Ok(()),
            }
        };

        let results: Vec<Result<()>> = if parallel {
            candidates.par_iter().map(check).collect()
        } else {
            candidates.iter().map(check).collect()
        };
        results.into_iter().collect()
    }
}
