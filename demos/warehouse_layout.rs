//! 倉庫儲位配置示例

use stockloc::{
    FieldValue, Location, LocationChange, LocationConfig, LocationKind, LocationStore,
    PickingZone, PlacementField,
};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    println!("=== 倉庫儲位配置示例 ===\n");

    let mut store = LocationStore::new(LocationConfig::default())?;
    let fast = store.add_zone(PickingZone::new("快速揀貨區").with_code("FAST"));
    let bulk = store.add_zone(PickingZone::new("整箱區").with_code("BULK"));

    // 建立儲位樹：倉庫 → 揀貨區 → 區域 → 儲格
    let mut changes = store.begin();
    let wh = changes.create(Location::new("WH"))?;
    let zone_fast = changes.create(
        Location::new("FAST")
            .with_parent(wh)
            .with_kind(LocationKind::Zone)
            .with_picking_zone(fast),
    )?;
    let zone_bulk = changes.create(
        Location::new("BULK")
            .with_parent(wh)
            .with_kind(LocationKind::Zone)
            .with_picking_zone(bulk),
    )?;
    let area_a = changes.create(
        Location::new("A1")
            .with_parent(zone_fast)
            .with_kind(LocationKind::Area)
            .with_name_format("{area}-{corridor:0>2}.{rack:0>3}.{level:0>2}"),
    )?;
    let area_b = changes.create(
        Location::new("B1")
            .with_parent(zone_bulk)
            .with_kind(LocationKind::Area)
            .with_name_format("{area}/{row}{posx:02d}"),
    )?;

    let mut bins = Vec::new();
    for (corridor, rack) in [("1", "1"), ("1", "2"), ("3", "12")] {
        bins.push(changes.create(
            Location::new("new bin")
                .with_parent(area_a)
                .with_kind(LocationKind::Bin)
                .with_placement(corridor, "L", rack, "2"),
        )?);
    }
    let pallet = changes.create(
        Location::new("new bin")
            .with_parent(area_b)
            .with_kind(LocationKind::Bin)
            .with_placement("1", "R", "1", "1")
            .with_position(4, 0, 0),
    )?;
    bins.push(pallet);

    changes.regenerate_names(wh)?;
    let report = store.commit(changes)?;
    println!(
        "新建 {} 筆儲位，區域更新 {} 筆，名稱生成 {} 筆\n",
        report.created.len(),
        report.areas_updated.len(),
        report.names_updated.len()
    );

    println!("儲格清單:");
    for id in &bins {
        let bin = store.tree().location(*id)?;
        println!(
            "  - {} (區域: {})",
            bin.name,
            bin.area.as_deref().unwrap_or("-")
        );
    }

    // 修改擺放位置後名稱自動更新
    store.update(
        pallet,
        LocationChange::SetPlacement(PlacementField::PosX, FieldValue::Integer(7)),
    )?;
    println!("\n移動棧板後: {}", store.tree().location(pallet)?.name);

    // 同一揀貨區內名稱必須唯一
    let taken = store.tree().location(bins[0])?.name.clone();
    match store.update(bins[1], LocationChange::Rename(taken.clone())) {
        Ok(_) => println!("\n意外：重複名稱 {} 被接受", taken),
        Err(err) => println!("\n重複名稱被拒絕: {}", err),
    }

    // 複製儲位附加複製後綴
    let copy = store.duplicate(bins[0], None)?;
    println!("複製儲位: {}", store.tree().location(copy)?.name);

    Ok(())
}
