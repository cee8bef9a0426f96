//! 髒標記追蹤

use std::collections::HashSet;
use uuid::Uuid;

/// 髒標記追蹤器
///
/// 記錄需要重算區域、需要重算名稱、以及提交前需要檢查唯一性的儲位。
#[derive(Debug, Clone, Default)]
pub struct DirtyTracker {
    dirty_areas: HashSet<Uuid>,
    dirty_names: HashSet<Uuid>,
    pending_checks: HashSet<Uuid>,
}

impl DirtyTracker {
    /// 創建新的追蹤器
    pub fn new() -> Self {
        Self::default()
    }

    /// 標記儲位的區域需要重算
    pub fn mark_area_dirty(&mut self, location_id: Uuid) {
        self.dirty_areas.insert(location_id);
    }

    /// 標記儲格的名稱需要重算
    pub fn mark_name_dirty(&mut self, location_id: Uuid) {
        self.dirty_names.insert(location_id);
    }

    /// 標記儲位在提交前需要檢查唯一性
    pub fn mark_for_validation(&mut self, location_id: Uuid) {
        self.pending_checks.insert(location_id);
    }

    pub fn is_area_dirty(&self, location_id: Uuid) -> bool {
        self.dirty_areas.contains(&location_id)
    }

    pub fn is_name_dirty(&self, location_id: Uuid) -> bool {
        self.dirty_names.contains(&location_id)
    }

    pub fn needs_validation(&self, location_id: Uuid) -> bool {
        self.pending_checks.contains(&location_id)
    }

    /// 取出並清除所有待重算區域的儲位
    pub fn take_dirty_areas(&mut self) -> Vec<Uuid> {
        Self::drain_sorted(&mut self.dirty_areas)
    }

    /// 取出並清除所有待重算名稱的儲位
    pub fn take_dirty_names(&mut self) -> Vec<Uuid> {
        Self::drain_sorted(&mut self.dirty_names)
    }

    /// 取出並清除所有待檢查的儲位
    pub fn take_pending_checks(&mut self) -> Vec<Uuid> {
        Self::drain_sorted(&mut self.pending_checks)
    }

    /// 是否沒有任何待重算的衍生值
    pub fn is_settled(&self) -> bool {
        self.dirty_areas.is_empty() && self.dirty_names.is_empty()
    }

    /// 清除所有髒標記
    pub fn clear(&mut self) {
        self.dirty_areas.clear();
        self.dirty_names.clear();
        self.pending_checks.clear();
    }

    fn drain_sorted(set: &mut HashSet<Uuid>) -> Vec<Uuid> {
        let mut ids: Vec<Uuid> = set.drain().collect();
        ids.sort();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_and_take() {
        let mut tracker = DirtyTracker::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        tracker.mark_area_dirty(a);
        tracker.mark_area_dirty(a);
        tracker.mark_name_dirty(b);
        tracker.mark_for_validation(b);

        assert!(tracker.is_area_dirty(a));
        assert!(!tracker.is_area_dirty(b));
        assert!(tracker.is_name_dirty(b));
        assert!(!tracker.is_settled());

        assert_eq!(tracker.take_dirty_areas(), vec![a]);
        assert_eq!(tracker.take_dirty_names(), vec![b]);
        assert!(tracker.is_settled());
        assert!(tracker.needs_validation(b));

        tracker.clear();
        assert!(!tracker.needs_validation(b));
    }

    #[test]
    fn test_take_is_sorted() {
        let mut tracker = DirtyTracker::new();
        let mut ids: Vec<Uuid> = (0..5).map(|_| Uuid::new_v4()).collect();
        for id in &ids {
            tracker.mark_for_validation(*id);
        }
        ids.sort();

        assert_eq!(tracker.take_pending_checks(), ids);
        assert!(tracker.take_pending_checks().is_empty());
    }
}
