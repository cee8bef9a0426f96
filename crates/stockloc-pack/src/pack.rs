//! 裝箱分支

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use uuid::Uuid;

use crate::picking::{MoveLine, Picking};
use crate::rounding::float_compare;
use crate::Result;

/// 多箱裝箱精靈的動作參照
pub const MULTI_PACK_WIZARD: &str = "stockloc_pack.put_in_pack_nbr";

/// 目的地檢查（由宿主系統提供）
///
/// 返回帶有 `type` 的動作時，裝箱流程先交給該動作處理。
pub trait DestinationCheck {
    fn check_destinations(&self, picking: &Picking) -> Option<Value>;
}

/// 不做目的地檢查
pub struct NoDestinationCheck;

impl DestinationCheck for NoDestinationCheck {
    fn check_destinations(&self, _picking: &Picking) -> Option<Value> {
        None
    }
}

impl<F> DestinationCheck for F
where
    F: Fn(&Picking) -> Option<Value>,
{
    fn check_destinations(&self, picking: &Picking) -> Option<Value> {
        self(picking)
    }
}

/// 多箱裝箱精靈
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiPackWizard {
    /// 精靈動作參照
    pub action: String,

    /// 出貨單ID
    pub picking_id: Uuid,

    /// 預設包裹數量
    pub nbr_packages: u32,

    /// 待裝箱的明細
    pub move_line_ids: Vec<Uuid>,
}

/// 裝箱決策
#[derive(Debug, Clone, PartialEq)]
pub enum PackDecision {
    /// 交給預設的單箱裝箱流程
    Default,
    /// 目的地檢查返回的動作
    Destination(Value),
    /// 開啟多箱裝箱精靈
    MultiPackWizard(MultiPackWizard),
}

/// 待裝箱的明細：已完成數量大於零且尚未裝入包裹
pub fn packable_lines(picking: &Picking) -> Result<Vec<&MoveLine>> {
    let mut lines = Vec::new();
    for line in &picking.move_lines {
        if line.result_package_id.is_some() {
            continue;
        }
        if float_compare(line.qty_done, rust_decimal::Decimal::ZERO, line.uom_rounding)?
            == Ordering::Greater
        {
            lines.push(line);
        }
    }
    Ok(lines)
}

fn is_action(value: &Value) -> bool {
    match value.get("type") {
        None | Some(Value::Null) => false,
        Some(Value::Bool(flag)) => *flag,
        Some(Value::String(kind)) => !kind.is_empty(),
        Some(_) => true,
    }
}

/// 裝箱
///
/// 沒有待裝箱的明細時交給預設流程（由預設流程回報錯誤）；
/// 否則先執行目的地檢查，檢查沒有返回動作時開啟多箱裝箱精靈。
pub fn put_in_pack<C>(picking: &Picking, destination_check: &C) -> Result<PackDecision>
where
    C: DestinationCheck + ?Sized,
{
    let lines = packable_lines(picking)?;
    if lines.is_empty() {
        tracing::debug!("出貨單 {} 沒有待裝箱的明細，使用預設流程", picking.name);
        return Ok(PackDecision::Default);
    }

    if let Some(action) = destination_check.check_destinations(picking) {
        if is_action(&action) {
            tracing::debug!("出貨單 {} 需要先處理目的地", picking.name);
            return Ok(PackDecision::Destination(action));
        }
    }

    tracing::info!(
        "出貨單 {} 開啟多箱裝箱精靈：明細 {} 筆，預設 {} 箱",
        picking.name,
        lines.len(),
        picking.nbr_packages
    );
    Ok(PackDecision::MultiPackWizard(MultiPackWizard {
        action: MULTI_PACK_WIZARD.to_string(),
        picking_id: picking.id,
        nbr_packages: picking.nbr_packages,
        move_line_ids: lines.iter().map(|line| line.id).collect(),
    }))
}
