//! # BOMX
//!
//! 缺口驅動的 BOM 需求展開：只有庫存不足的部分才會往下展開到組件與 insumo。
//!
//! ```no_run
//! use bomx::{explode_tables, DemandRequest, ExplosionConfig, RawTable};
//! use rust_decimal::Decimal;
//!
//! let stock = RawTable::new("template_estoque", &["codigo", "estoque_atual"]).with_row(&["A", "5"]);
//! let simples = RawTable::new("bom_produto_simples", &["codigo_final", "semi_codigo"]).with_row(&["A", "S1"]);
//! let kits = RawTable::new("bom_kits_conjuntos", &["codigo_final", "componentes_codigos", "componentes_qtds"]);
//!
//! let report = explode_tables(
//!     &stock,
//!     &simples,
//!     &kits,
//!     vec![DemandRequest::new("A", Decimal::from(8))],
//!     &ExplosionConfig::new(),
//! )?;
//! println!("{}", report.to_json()?);
//! # Ok::<(), bomx::BomError>(())
//! ```

pub mod logging;

pub use bomx_calc::{
    ExplosionAccumulator, ExplosionEngine, ExplosionReport, ExplosionResult, ExplosionWarning,
    ReportBuilder, ReportSummary, WarningKind, WarningSeverity,
};
pub use bomx_core::{
    ActionItem, ActionKind, BomError, Catalog, CatalogBuilder, Category, ComponentList,
    DemandRequest, ExplosionConfig, InsumoRequirement, InsumoStatus, KitComposition, RawTable,
    Result, SemiPolicy, ShortfallRecord, ShortfallStatus, SimpleRecipe, Structure,
};
pub use rust_decimal::Decimal;

/// 由原始表格完成一次展開並生成報表
///
/// 配置或表格欄位有誤時，在展開開始前回傳錯誤。
pub fn explode_tables(
    stock: &RawTable,
    simples: &RawTable,
    kits: &RawTable,
    demands: Vec<DemandRequest>,
    config: &ExplosionConfig,
) -> Result<ExplosionReport> {
    config.validate()?;
    let catalog = Catalog::from_tables(stock, simples, kits)?;

    let engine = ExplosionEngine::new(catalog, config.clone());
    let result = engine.run(demands);
    if result.has_errors() {
        tracing::warn!("展開完成但有 BOM 結構錯誤，請檢查 CADASTRAR_BOM 行動");
    }

    Ok(ReportBuilder::new(&result, config).build())
}
