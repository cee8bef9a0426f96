//! 儲位樹
//!
//! 以 ID 索引的儲位與揀貨區集合。每個儲位最多只有一個上層儲位，
//! 所有向上遍歷都以迭代方式進行，並以已訪問集合與最大深度防止循環。

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use uuid::Uuid;

use crate::config::LocationConfig;
use crate::location::Location;
use crate::zone::PickingZone;
use crate::{LocationError, Result};

/// 儲位樹
#[derive(Debug, Clone)]
pub struct LocationTree {
    locations: HashMap<Uuid, Location>,
    zones: HashMap<Uuid, PickingZone>,
    max_depth: usize,
}

/// JSON 匯入 / 匯出格式
#[derive(Debug, Serialize, Deserialize)]
struct TreeData {
    #[serde(default)]
    zones: Vec<PickingZone>,
    #[serde(default)]
    locations: Vec<Location>,
}

impl Default for LocationTree {
    fn default() -> Self {
        Self::new()
    }
}

impl LocationTree {
    /// 創建空的儲位樹
    pub fn new() -> Self {
        Self::with_config(&LocationConfig::default())
    }

    /// 依配置創建空的儲位樹
    pub fn with_config(config: &LocationConfig) -> Self {
        Self {
            locations: HashMap::new(),
            zones: HashMap::new(),
            max_depth: config.max_depth,
        }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// 變更最大深度
    pub fn set_max_depth(&mut self, max_depth: usize) {
        self.max_depth = max_depth;
    }

    /// 新增揀貨區
    pub fn add_zone(&mut self, zone: PickingZone) -> Uuid {
        let id = zone.id;
        self.zones.insert(id, zone);
        id
    }

    pub fn zone(&self, id: Uuid) -> Option<&PickingZone> {
        self.zones.get(&id)
    }

    pub fn zones(&self) -> impl Iterator<Item = &PickingZone> {
        self.zones.values()
    }

    /// 新增儲位
    ///
    /// 上層儲位與揀貨區必須已存在。
    pub fn insert(&mut self, location: Location) -> Result<Uuid> {
        if self.locations.contains_key(&location.id) {
            return Err(LocationError::Config(format!(
                "儲位ID重複: {}",
                location.id
            )));
        }
        if let Some(parent_id) = location.parent_id {
            if !self.locations.contains_key(&parent_id) {
                return Err(LocationError::LocationNotFound(parent_id));
            }
        }
        if let Some(zone_id) = location.picking_zone_id {
            if !self.zones.contains_key(&zone_id) {
                return Err(LocationError::ZoneNotFound(zone_id));
            }
        }

        tracing::debug!("新增儲位 {} ({})", location.name, location.id);
        let id = location.id;
        self.locations.insert(id, location);
        Ok(id)
    }

    pub fn get(&self, id: Uuid) -> Option<&Location> {
        self.locations.get(&id)
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.locations.contains_key(&id)
    }

    /// 取得儲位，找不到時返回錯誤
    pub fn location(&self, id: Uuid) -> Result<&Location> {
        self.locations
            .get(&id)
            .ok_or(LocationError::LocationNotFound(id))
    }

    /// 取得可變儲位
    ///
    /// 修改 `parent_id` 請使用 [`LocationTree::set_parent`]，以便檢查循環。
    pub fn location_mut(&mut self, id: Uuid) -> Result<&mut Location> {
        self.locations
            .get_mut(&id)
            .ok_or(LocationError::LocationNotFound(id))
    }

    pub fn locations(&self) -> impl Iterator<Item = &Location> {
        self.locations.values()
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// 直接下層儲位（依 ID 排序）
    pub fn children(&self, id: Uuid) -> Vec<Uuid> {
        let mut children: Vec<Uuid> = self
            .locations
            .values()
            .filter(|location| location.parent_id == Some(id))
            .map(|location| location.id)
            .collect();
        children.sort();
        children
    }

    fn children_index(&self) -> HashMap<Uuid, Vec<Uuid>> {
        let mut index: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for location in self.locations.values() {
            if let Some(parent_id) = location.parent_id {
                index.entry(parent_id).or_default().push(location.id);
            }
        }
        for children in index.values_mut() {
            children.sort();
        }
        index
    }

    /// 從儲位本身往上找第一個符合條件的儲位（包含自身）
    pub fn find_ancestor<F>(&self, id: Uuid, predicate: F) -> Result<Option<&Location>>
    where
        F: Fn(&Location) -> bool,
    {
        let mut visited = HashSet::new();
        let mut current = Some(id);

        while let Some(current_id) = current {
            if !visited.insert(current_id) || visited.len() > self.max_depth {
                return Err(LocationError::CyclicHierarchy(id));
            }
            let location = self.location(current_id)?;
            if predicate(location) {
                return Ok(Some(location));
            }
            current = location.parent_id;
        }

        Ok(None)
    }

    /// 祖先路徑：從儲位本身到根節點（包含自身）
    pub fn ancestors(&self, id: Uuid) -> Result<Vec<Uuid>> {
        let mut path = Vec::new();
        let mut current = Some(id);

        while let Some(current_id) = current {
            if path.contains(&current_id) || path.len() >= self.max_depth {
                return Err(LocationError::CyclicHierarchy(id));
            }
            let location = self.location(current_id)?;
            path.push(current_id);
            current = location.parent_id;
        }

        Ok(path)
    }

    /// 層級深度（根節點為 0）
    pub fn depth(&self, id: Uuid) -> Result<usize> {
        Ok(self.ancestors(id)?.len() - 1)
    }

    /// 變更上層儲位，返回值是否有變化
    pub fn set_parent(&mut self, id: Uuid, parent_id: Option<Uuid>) -> Result<bool> {
        let current = self.location(id)?.parent_id;
        if current == parent_id {
            return Ok(false);
        }
        if let Some(parent_id) = parent_id {
            if self.ancestors(parent_id)?.contains(&id) {
                return Err(LocationError::CyclicHierarchy(id));
            }
        }

        self.location_mut(id)?.parent_id = parent_id;
        Ok(true)
    }

    /// 所有位於指定儲位之下（包含其本身）的儲位
    ///
    /// 不存在的根節點會被忽略。
    pub fn descendants_of(&self, roots: &[Uuid]) -> HashSet<Uuid> {
        let index = self.children_index();
        let mut result = HashSet::new();
        let mut queue: VecDeque<Uuid> = roots
            .iter()
            .copied()
            .filter(|id| self.locations.contains_key(id))
            .collect();

        while let Some(id) = queue.pop_front() {
            if !result.insert(id) {
                continue;
            }
            if let Some(children) = index.get(&id) {
                queue.extend(children.iter().copied());
            }
        }

        result
    }

    /// 由上而下的遍歷順序（上層一定排在下層之前）
    pub fn top_down_order(&self) -> Result<Vec<Uuid>> {
        let index = self.children_index();
        let mut roots: Vec<Uuid> = self
            .locations
            .values()
            .filter(|location| location.parent_id.is_none())
            .map(|location| location.id)
            .collect();
        roots.sort();

        let mut order = Vec::with_capacity(self.locations.len());
        let mut queue: VecDeque<Uuid> = roots.into();
        while let Some(id) = queue.pop_front() {
            order.push(id);
            if let Some(children) = index.get(&id) {
                queue.extend(children.iter().copied());
            }
        }

        if order.len() < self.locations.len() {
            let reached: HashSet<Uuid> = order.iter().copied().collect();
            let mut unreached: Vec<&Location> = self
                .locations
                .values()
                .filter(|location| !reached.contains(&location.id))
                .collect();
            unreached.sort_by_key(|location| location.id);
            for location in unreached {
                if let Some(parent_id) = location.parent_id {
                    if !self.locations.contains_key(&parent_id) {
                        return Err(LocationError::LocationNotFound(parent_id));
                    }
                }
            }
            let first = self
                .locations
                .keys()
                .filter(|id| !reached.contains(*id))
                .min()
                .copied()
                .unwrap_or_default();
            return Err(LocationError::CyclicHierarchy(first));
        }

        Ok(order)
    }

    /// 儲位的作業類型，來自直接連結的揀貨區
    pub fn picking_type_of(&self, id: Uuid) -> Result<Option<&str>> {
        let location = self.location(id)?;
        Ok(location
            .picking_zone_id
            .and_then(|zone_id| self.zones.get(&zone_id))
            .and_then(|zone| zone.picking_type.as_deref()))
    }

    /// 匯出為 JSON
    pub fn to_json(&self) -> Result<String> {
        let mut zones: Vec<PickingZone> = self.zones.values().cloned().collect();
        zones.sort_by_key(|zone| zone.id);
        let mut locations: Vec<Location> = self.locations.values().cloned().collect();
        locations.sort_by_key(|location| location.id);

        serde_json::to_string_pretty(&TreeData { zones, locations })
            .map_err(|e| LocationError::Config(e.to_string()))
    }

    /// 從 JSON 匯入，並檢查引用與循環
    pub fn from_json(json: &str, config: &LocationConfig) -> Result<Self> {
        let data: TreeData =
            serde_json::from_str(json).map_err(|e| LocationError::Config(e.to_string()))?;

        let mut tree = Self::with_config(config);
        for zone in data.zones {
            tree.add_zone(zone);
        }
        for location in data.locations {
            if tree.locations.insert(location.id, location).is_some() {
                return Err(LocationError::Config("儲位ID重複".to_string()));
            }
        }
        for location in tree.locations.values() {
            if let Some(zone_id) = location.picking_zone_id {
                if !tree.zones.contains_key(&zone_id) {
                    return Err(LocationError::ZoneNotFound(zone_id));
                }
            }
        }
        tree.top_down_order()?;

        tracing::info!(
            "匯入儲位樹：儲位 {} 筆，揀貨區 {} 筆",
            tree.locations.len(),
            tree.zones.len()
        );
        Ok(tree)
    }
}
