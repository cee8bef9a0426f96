//! 儲格名稱生成

use stockloc_core::{LocationTree, PlacementField, Result};
use uuid::Uuid;

use crate::template::NameTemplate;

/// 名稱格式解析器
///
/// 只處理 `kind = bin` 的儲位：從儲格本身往上找最近的名稱格式，
/// 再以儲格自己的欄位快照渲染。
pub struct NameTemplateResolver;

impl NameTemplateResolver {
    /// 觸發名稱重算的欄位
    pub const TRIGGER_FIELDS: [PlacementField; 7] = PlacementField::ALL;

    /// 欄位變更是否需要重算名稱
    pub fn is_trigger_field(field: &str) -> bool {
        PlacementField::from_name(field).is_some()
    }

    /// 找到最近（包含自身）定義名稱格式的儲位，返回其 ID 與格式
    pub fn find_template(tree: &LocationTree, location_id: Uuid) -> Result<Option<(Uuid, String)>> {
        Ok(tree
            .find_ancestor(location_id, |location| location.name_format().is_some())?
            .and_then(|owner| {
                owner
                    .name_format()
                    .map(|format| (owner.id, format.to_string()))
            }))
    }

    /// 計算儲格名稱（不修改儲位）
    ///
    /// 非儲格或找不到名稱格式時返回 `None`。
    pub fn compute(tree: &LocationTree, location_id: Uuid) -> Result<Option<String>> {
        let location = tree.location(location_id)?;
        if !location.is_bin() {
            return Ok(None);
        }

        let Some((owner_id, format)) = Self::find_template(tree, location_id)? else {
            tracing::debug!("儲格 {} 沒有可用的名稱格式", location.name);
            return Ok(None);
        };

        let template = NameTemplate::parse(&format)?;
        // 只傳入扁平快照，模板無法經由關聯欄位讀取其他資料
        let snapshot = location.snapshot();
        let name = template.render(&snapshot)?;

        tracing::debug!(
            "儲格 {} 使用 {} 的名稱格式 \"{}\" → {}",
            location.id,
            owner_id,
            format,
            name
        );
        Ok(Some(name))
    }

    /// 計算並寫回名稱，返回值是否有變化
    pub fn resolve(tree: &mut LocationTree, location_id: Uuid) -> Result<bool> {
        let Some(name) = Self::compute(tree, location_id)? else {
            return Ok(false);
        };

        let location = tree.location_mut(location_id)?;
        if location.name == name {
            return Ok(false);
        }
        location.name = name;
        Ok(true)
    }

    /// 重算某儲位之下（包含自身）所有儲格的名稱，返回有變化的儲位
    pub fn resolve_subtree(tree: &mut LocationTree, root_id: Uuid) -> Result<Vec<Uuid>> {
        tree.location(root_id)?;
        let mut bins: Vec<Uuid> = tree
            .descendants_of(&[root_id])
            .into_iter()
            .filter(|id| tree.get(*id).map_or(false, |location| location.is_bin()))
            .collect();
        bins.sort();

        let mut changed = Vec::new();
        for bin_id in bins {
            if Self::resolve(tree, bin_id)? {
                changed.push(bin_id);
            }
        }

        tracing::info!("重新生成儲格名稱：{} 筆變更", changed.len());
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::area::AreaResolver;
    use stockloc_core::{Location, LocationError, LocationKind};

    const LAYOUT: &str = "{area}-{corridor:0>2}.{rack:0>3}.{level:0>2}";

    fn build() -> (LocationTree, Uuid, Uuid) {
        let mut tree = LocationTree::new();
        let area = tree
            .insert(
                Location::new("A1")
                    .with_kind(LocationKind::Area)
                    .with_name_format(LAYOUT),
            )
            .unwrap();
        let bin = tree
            .insert(
                Location::new("new bin")
                    .with_parent(area)
                    .with_kind(LocationKind::Bin)
                    .with_placement("3", "L", "12", "2"),
            )
            .unwrap();
        AreaResolver::resolve_all(&mut tree).unwrap();
        (tree, area, bin)
    }

    #[test]
    fn test_bin_name_from_ancestor_template() {
        let (mut tree, _area, bin) = build();

        assert!(NameTemplateResolver::resolve(&mut tree, bin).unwrap());
        assert_eq!(tree.location(bin).unwrap().name, "A1-03.012.02");
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let (mut tree, _area, bin) = build();

        NameTemplateResolver::resolve(&mut tree, bin).unwrap();
        assert!(!NameTemplateResolver::resolve(&mut tree, bin).unwrap());
        assert_eq!(tree.location(bin).unwrap().name, "A1-03.012.02");
    }

    #[test]
    fn test_non_bin_is_untouched() {
        let (mut tree, area, _bin) = build();

        assert_eq!(NameTemplateResolver::compute(&tree, area).unwrap(), None);
        assert!(!NameTemplateResolver::resolve(&mut tree, area).unwrap());
        assert_eq!(tree.location(area).unwrap().name, "A1");
    }

    #[test]
    fn test_no_template_keeps_name() {
        let mut tree = LocationTree::new();
        let bin = tree
            .insert(Location::new("manual").with_kind(LocationKind::Bin))
            .unwrap();

        assert!(!NameTemplateResolver::resolve(&mut tree, bin).unwrap());
        assert_eq!(tree.location(bin).unwrap().name, "manual");
    }

    #[test]
    fn test_nearest_template_wins() {
        let (mut tree, area, bin) = build();
        let shelf = tree
            .insert(
                Location::new("shelf")
                    .with_parent(area)
                    .with_name_format("S{rack}/{posx:02}"),
            )
            .unwrap();
        tree.set_parent(bin, Some(shelf)).unwrap();
        tree.location_mut(bin).unwrap().posx = 7;

        assert_eq!(
            NameTemplateResolver::find_template(&tree, bin).unwrap(),
            Some((shelf, "S{rack}/{posx:02}".to_string()))
        );
        NameTemplateResolver::resolve(&mut tree, bin).unwrap();
        assert_eq!(tree.location(bin).unwrap().name, "S12/07");
    }

    #[test]
    fn test_bin_own_template_used() {
        let (mut tree, _area, bin) = build();
        tree.location_mut(bin).unwrap().name_format = Some("{level}".to_string());

        NameTemplateResolver::resolve(&mut tree, bin).unwrap();
        assert_eq!(tree.location(bin).unwrap().name, "2");
    }

    #[test]
    fn test_bin_values_not_ancestor_values() {
        let (mut tree, area, bin) = build();
        tree.location_mut(area).unwrap().corridor = Some("99".to_string());

        NameTemplateResolver::resolve(&mut tree, bin).unwrap();
        assert_eq!(tree.location(bin).unwrap().name, "A1-03.012.02");
    }

    #[test]
    fn test_relational_fields_cannot_be_referenced() {
        let (mut tree, area, bin) = build();
        tree.location_mut(area).unwrap().name_format = Some("{parent_id}".to_string());

        let err = NameTemplateResolver::resolve(&mut tree, bin).unwrap_err();
        assert_eq!(
            err,
            LocationError::TemplateField {
                field: "parent_id".to_string()
            }
        );
        assert_eq!(tree.location(bin).unwrap().name, "new bin");
    }

    #[test]
    fn test_resolve_subtree() {
        let (mut tree, area, bin) = build();
        let other = tree
            .insert(
                Location::new("other")
                    .with_parent(area)
                    .with_kind(LocationKind::Bin)
                    .with_placement("4", "R", "1", "1"),
            )
            .unwrap();
        AreaResolver::resolve_all(&mut tree).unwrap();

        let changed = NameTemplateResolver::resolve_subtree(&mut tree, area).unwrap();
        assert_eq!(changed.len(), 2);
        assert_eq!(tree.location(bin).unwrap().name, "A1-03.012.02");
        assert_eq!(tree.location(other).unwrap().name, "A1-04.001.01");
    }

    #[test]
    fn test_trigger_fields() {
        for field in ["corridor", "row", "rack", "level", "posx", "posy", "posz"] {
            assert!(NameTemplateResolver::is_trigger_field(field));
        }
        assert!(!NameTemplateResolver::is_trigger_field("name"));
        assert!(!NameTemplateResolver::is_trigger_field("area"));
    }
}
