//! 區域解析

use stockloc_core::{LocationTree, Result};
use uuid::Uuid;

/// 區域解析器
///
/// `kind = area` 的儲位，其區域就是自身名稱；其餘儲位繼承上層儲位的區域，
/// 沒有上層時為空。
pub struct AreaResolver;

impl AreaResolver {
    /// 依目前的儲位樹計算區域（不修改儲位）
    pub fn compute(tree: &LocationTree, location_id: Uuid) -> Result<Option<String>> {
        Ok(tree
            .find_ancestor(location_id, |location| location.is_area())?
            .map(|area| area.name.clone()))
    }

    /// 計算並寫回區域，返回值是否有變化
    pub fn resolve(tree: &mut LocationTree, location_id: Uuid) -> Result<bool> {
        let area = Self::compute(tree, location_id)?;
        let location = tree.location_mut(location_id)?;
        if location.area == area {
            return Ok(false);
        }

        tracing::debug!(
            "儲位 {} 區域: {:?} → {:?}",
            location.name,
            location.area,
            area
        );
        location.area = area;
        Ok(true)
    }

    /// 由上而下重算所有儲位的區域，返回有變化的筆數
    pub fn resolve_all(tree: &mut LocationTree) -> Result<usize> {
        let order = tree.top_down_order()?;
        let mut changed = 0;
        for location_id in order {
            if Self::resolve(tree, location_id)? {
                changed += 1;
            }
        }

        tracing::info!("區域重算完成：{} 筆儲位，{} 筆變更", tree.len(), changed);
        Ok(changed)
    }
}
