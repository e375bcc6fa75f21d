//! 簡單 BOM 展開示例
//!
//! 套組 A（庫存 5）由 2 個 B 組成；B 是簡單產品，需要 1 個半成品 S1。
//! 需求 8 個 A 時，只有缺口 3 個往下展開。

use bomx::{explode_tables, DemandRequest, ExplosionConfig, RawTable};
use rust_decimal::Decimal;

fn main() -> anyhow::Result<()> {
    bomx::logging::init();

    println!("=== 簡單 BOM 展開示例 ===\n");

    let stock = RawTable::new("template_estoque", &["codigo", "estoque_atual"])
        .with_row(&["A", "5"])
        .with_row(&["S1", "0"])
        .with_row(&["GOLA-P", "1,5"]);

    let simples = RawTable::new(
        "bom_produto_simples",
        &["codigo_final", "semi_codigo", "semi_qtd", "gola_codigo", "gola_qtd"],
    )
    .with_row(&["B", "S1", "1", "GOLA-P", ""]);

    let kits = RawTable::new(
        "bom_kits_conjuntos",
        &["codigo_final", "componentes_codigos", "componentes_qtds"],
    )
    .with_row(&["A", "B", "2"]);

    let demands = vec![
        DemandRequest::new("A", Decimal::from(8)),
        DemandRequest::new("X9", Decimal::from(4)),
    ];

    let report = explode_tables(&stock, &simples, &kits, demands, &ExplosionConfig::new())?;

    println!("成品缺口:");
    for row in &report.shortfalls {
        println!(
            "  - {}: 需求 {}, 庫存 {}, 缺口 {} ({:?})",
            row.code, row.demand, row.on_hand, row.shortfall, row.status
        );
    }

    println!("\nInsumo 需求:");
    for row in &report.insumos {
        println!(
            "  - {} {}: 需求 {}, 缺口 {} ({:?})",
            row.category, row.code, row.required, row.shortfall, row.status
        );
    }

    println!("\n行動清單:");
    for action in &report.actions {
        println!(
            "  - {} {} {} x {} [{}]",
            action.action, action.category, action.code, action.quantity, action.note
        );
    }

    println!("\n追蹤:");
    for line in &report.trace {
        println!("  {}", line);
    }

    Ok(())
}
