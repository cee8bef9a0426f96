//! 儲位模型

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::snapshot::{FieldSnapshot, FieldValue};
use crate::{LocationError, Result};

/// 儲位種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationKind {
    /// 揀貨區
    Zone,
    /// 區域
    Area,
    /// 儲格
    Bin,
}

impl LocationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LocationKind::Zone => "zone",
            LocationKind::Area => "area",
            LocationKind::Bin => "bin",
        }
    }
}

/// 擺放位置欄位（名稱格式的觸發欄位）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementField {
    /// 走道
    Corridor,
    /// 走道中的哪一側
    Row,
    /// 貨架號
    Rack,
    /// 貨架層
    Level,
    /// 箱位 X
    PosX,
    /// 箱位 Y
    PosY,
    /// 箱位 Z
    PosZ,
}

impl PlacementField {
    pub const ALL: [PlacementField; 7] = [
        PlacementField::Corridor,
        PlacementField::Row,
        PlacementField::Rack,
        PlacementField::Level,
        PlacementField::PosX,
        PlacementField::PosY,
        PlacementField::PosZ,
    ];

    /// 欄位名稱（同時也是名稱格式中的替換鍵）
    pub fn name(&self) -> &'static str {
        match self {
            PlacementField::Corridor => "corridor",
            PlacementField::Row => "row",
            PlacementField::Rack => "rack",
            PlacementField::Level => "level",
            PlacementField::PosX => "posx",
            PlacementField::PosY => "posy",
            PlacementField::PosZ => "posz",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.name() == name)
    }

    /// 是否為整數欄位
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            PlacementField::PosX | PlacementField::PosY | PlacementField::PosZ
        )
    }
}

/// 儲位
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// 儲位ID
    pub id: Uuid,

    /// 上層儲位（僅作為向上遍歷的弱引用）
    pub parent_id: Option<Uuid>,

    /// 種類（未分類的倉庫 / 檢視儲位可為空）
    pub kind: Option<LocationKind>,

    /// 顯示名稱
    pub name: String,

    /// 區域（衍生欄位，由區域解析器維護）
    pub area: Option<String>,

    pub corridor: Option<String>,
    pub row: Option<String>,
    pub rack: Option<String>,
    pub level: Option<String>,
    pub posx: i64,
    pub posy: i64,
    pub posz: i64,

    /// 名稱格式，例如 `{area}-{corridor:0>2}.{rack:0>3}.{level:0>2}`
    pub name_format: Option<String>,

    /// 直接連結的揀貨區
    pub picking_zone_id: Option<Uuid>,
}

impl Location {
    /// 創建新的儲位
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            parent_id: None,
            kind: None,
            name: name.into(),
            area: None,
            corridor: None,
            row: None,
            rack: None,
            level: None,
            posx: 0,
            posy: 0,
            posz: 0,
            name_format: None,
            picking_zone_id: None,
        }
    }

    /// 建構器模式：設置上層儲位
    pub fn with_parent(mut self, parent_id: Uuid) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    /// 建構器模式：設置種類
    pub fn with_kind(mut self, kind: LocationKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// 建構器模式：設置走道 / 側 / 貨架 / 層
    pub fn with_placement(
        mut self,
        corridor: impl Into<String>,
        row: impl Into<String>,
        rack: impl Into<String>,
        level: impl Into<String>,
    ) -> Self {
        self.corridor = Some(corridor.into());
        self.row = Some(row.into());
        self.rack = Some(rack.into());
        self.level = Some(level.into());
        self
    }

    /// 建構器模式：設置箱位座標
    pub fn with_position(mut self, posx: i64, posy: i64, posz: i64) -> Self {
        self.posx = posx;
        self.posy = posy;
        self.posz = posz;
        self
    }

    /// 建構器模式：設置名稱格式
    pub fn with_name_format(mut self, name_format: impl Into<String>) -> Self {
        self.name_format = Some(name_format.into());
        self
    }

    /// 建構器模式：設置揀貨區
    pub fn with_picking_zone(mut self, zone_id: Uuid) -> Self {
        self.picking_zone_id = Some(zone_id);
        self
    }

    pub fn is_bin(&self) -> bool {
        self.kind == Some(LocationKind::Bin)
    }

    pub fn is_area(&self) -> bool {
        self.kind == Some(LocationKind::Area)
    }

    /// 非空的名稱格式
    pub fn name_format(&self) -> Option<&str> {
        self.name_format.as_deref().filter(|format| !format.is_empty())
    }

    /// 讀取擺放位置欄位
    pub fn placement(&self, field: PlacementField) -> FieldValue {
        let text = |value: &Option<String>| FieldValue::Text(value.clone().unwrap_or_default());
        match field {
            PlacementField::Corridor => text(&self.corridor),
            PlacementField::Row => text(&self.row),
            PlacementField::Rack => text(&self.rack),
            PlacementField::Level => text(&self.level),
            PlacementField::PosX => FieldValue::Integer(self.posx),
            PlacementField::PosY => FieldValue::Integer(self.posy),
            PlacementField::PosZ => FieldValue::Integer(self.posz),
        }
    }

    /// 設置擺放位置欄位，返回值是否有變化
    pub fn set_placement(&mut self, field: PlacementField, value: FieldValue) -> Result<bool> {
        let changed = self.placement(field) != value;
        match (field, value) {
            (PlacementField::PosX, FieldValue::Integer(v)) => self.posx = v,
            (PlacementField::PosY, FieldValue::Integer(v)) => self.posy = v,
            (PlacementField::PosZ, FieldValue::Integer(v)) => self.posz = v,
            (field, FieldValue::Text(v)) if !field.is_integer() => {
                // 空字串視同未設置
                let v = Some(v).filter(|v| !v.is_empty());
                match field {
                    PlacementField::Corridor => self.corridor = v,
                    PlacementField::Row => self.row = v,
                    PlacementField::Rack => self.rack = v,
                    _ => self.level = v,
                }
            }
            (field, _) => {
                return Err(LocationError::InvalidFieldValue {
                    field: field.name().to_string(),
                    expected: if field.is_integer() { "整數" } else { "文字" },
                })
            }
        }
        Ok(changed)
    }

    /// 產生扁平的純量欄位快照
    ///
    /// 不包含 `id`、`parent_id`、`picking_zone_id` 等關聯欄位。
    pub fn snapshot(&self) -> FieldSnapshot {
        let mut snapshot = FieldSnapshot::new()
            .with("name", self.name.as_str())
            .with("kind", self.kind.map(|k| k.as_str()).unwrap_or_default())
            .with("area", self.area.clone().unwrap_or_default())
            .with(
                "name_format",
                self.name_format.clone().unwrap_or_default(),
            );
        for field in PlacementField::ALL {
            snapshot.insert(field.name(), self.placement(field));
        }
        snapshot
    }
}
