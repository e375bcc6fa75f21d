//! 多套組共用組件示例
//!
//! 三個套組共用相同的簡單產品，以並行模式展開並輸出 JSON 報表。

use bomx::{
    Catalog, ComponentList, DemandRequest, ExplosionConfig, ExplosionEngine, KitComposition,
    ReportBuilder, SemiPolicy, SimpleRecipe,
};
use rust_decimal::Decimal;

fn main() -> anyhow::Result<()> {
    bomx::logging::init();

    println!("=== 多套組展開示例 ===\n");

    let mut builder = Catalog::builder()
        .with_stock("CAMISA-M", Decimal::from(10))
        .with_stock("CORPO-M", Decimal::from(4))
        .with_stock("TECIDO", Decimal::from(30))
        .with_simple(
            SimpleRecipe::new("CAMISA-M")
                .with_semi("CORPO-M", Decimal::ONE)
                .with_golas(ComponentList::new(&["GOLA-M"], vec![Decimal::ONE]))
                .with_extras(ComponentList::new(
                    &["ETIQUETA", "BOTAO"],
                    vec![Decimal::ONE, Decimal::from(6)],
                )),
        )
        .with_simple(
            SimpleRecipe::new("BERMUDA-M")
                .with_bordado("LOGO", Decimal::ONE)
                .with_extras(ComponentList::new(&["ELASTICO"], vec![Decimal::new(5, 1)])),
        )
        .with_simple(
            SimpleRecipe::new("CORPO-M")
                .with_extras(ComponentList::new(&["TECIDO"], vec![Decimal::new(12, 1)])),
        );

    for (kit, camisas) in [("KIT-VERAO", 1), ("KIT-DUPLO", 2), ("KIT-FAMILIA", 4)] {
        builder = builder.with_kit(KitComposition::new(
            kit,
            ComponentList::new(
                &["CAMISA-M", "BERMUDA-M"],
                vec![Decimal::from(camisas), Decimal::ONE],
            ),
        ));
    }

    let config = ExplosionConfig::new()
        .with_semi_policy(SemiPolicy::Explode)
        .with_parallel(true)
        .with_trace(false);

    let engine = ExplosionEngine::new(builder.build(), config.clone());
    let result = engine.run(vec![
        DemandRequest::new("KIT-VERAO", Decimal::from(12)),
        DemandRequest::new("KIT-DUPLO", Decimal::from(5)),
        DemandRequest::new("KIT-FAMILIA", Decimal::from(3)),
        DemandRequest::new("kit-verao", Decimal::from(2)),
    ]);

    let report = ReportBuilder::new(&result, &config).build();
    println!("{}", report.to_json()?);

    Ok(())
}
