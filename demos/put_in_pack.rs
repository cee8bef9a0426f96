//! 多箱裝箱示例

use rust_decimal::Decimal;
use stockloc::{put_in_pack, MoveLine, NoDestinationCheck, PackDecision, Picking};

fn describe(decision: &PackDecision) -> String {
    match decision {
        PackDecision::Default => "使用預設裝箱流程".to_string(),
        PackDecision::Destination(action) => format!("先選擇目的地: {}", action),
        PackDecision::MultiPackWizard(wizard) => format!(
            "開啟 {}：{} 筆明細，預設 {} 箱",
            wizard.action,
            wizard.move_line_ids.len(),
            wizard.nbr_packages
        ),
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    println!("=== 多箱裝箱示例 ===\n");

    let empty =
        Picking::new("WH/OUT/00001").with_move_line(MoveLine::new("BIKE-001", Decimal::ZERO));
    let decision = put_in_pack(&empty, &NoDestinationCheck)?;
    println!("{}: {}", empty.name, describe(&decision));

    let picking = Picking::new("WH/OUT/00002")
        .with_move_line(MoveLine::new("BIKE-001", Decimal::from(4)))
        .with_move_line(MoveLine::new("WHEEL-26", Decimal::new(75, 1)))
        .with_nbr_packages(3);
    let decision = put_in_pack(&picking, &NoDestinationCheck)?;
    println!("{}: {}", picking.name, describe(&decision));

    // 目的地不一致時，由宿主系統先要求使用者選擇目的地
    let check = |_: &Picking| {
        Some(serde_json::json!({
            "type": "ir.actions.act_window",
            "res_model": "stock.package.destination",
        }))
    };
    let decision = put_in_pack(&picking, &check)?;
    println!("{}: {}", picking.name, describe(&decision));

    Ok(())
}
