//! BOM 需求展開引擎
//!
//! 只有「缺口」會往下傳遞：父件庫存足夠時不展開，不足時僅以不足量展開。

use bomx_core::{
    normalize_code, Catalog, Category, DemandRequest, ExplosionConfig, KitComposition,
    SemiPolicy, SimpleRecipe, Structure,
};
use rayon::prelude::*;
use rust_decimal::Decimal;

use crate::accumulator::ExplosionAccumulator;
use crate::netting::NettingCalculator;
use crate::pairing::{pair_padded, pair_strict};
use crate::pegging::TraversalPath;
use crate::{ExplosionResult, ExplosionWarning, WarningKind};

/// 未登錄結構時的備註
const NOTE_UNREGISTERED: &str = "sem estrutura cadastrada (nem kit, nem simples)";

/// 展開引擎
pub struct ExplosionEngine {
    /// 物料目錄（唯讀）
    catalog: Catalog,

    /// 展開配置
    config: ExplosionConfig,
}

impl ExplosionEngine {
    /// 創建新的展開引擎
    pub fn new(catalog: Catalog, config: ExplosionConfig) -> Self {
        Self { catalog, config }
    }

    /// 主展開入口
    ///
    /// 需求先依代碼彙總，再逐筆展開；配置 `parallel` 時改用並行展開。
    pub fn run(&self, demands: Vec<DemandRequest>) -> ExplosionResult {
        if self.config.parallel {
            self.run_parallel(demands)
        } else {
            self.run_sequential(demands)
        }
    }

    /// 循序展開
    pub fn run_sequential(&self, demands: Vec<DemandRequest>) -> ExplosionResult {
        let start_time = std::time::Instant::now();
        let demands = DemandRequest::aggregate(demands);
        tracing::info!("開始 BOM 展開：需求 {} 筆", demands.len());

        let mut acc = self.new_accumulator();
        for demand in &demands {
            self.explode_demand(&mut acc, &demand.code, demand.quantity, true);
        }

        self.finish(acc, demands, start_time)
    }

    /// 並行展開：每筆頂層需求各自累加，再依輸入順序合併
    pub fn run_parallel(&self, demands: Vec<DemandRequest>) -> ExplosionResult {
        let start_time = std::time::Instant::now();
        let demands = DemandRequest::aggregate(demands);
        tracing::info!("開始並行 BOM 展開：需求 {} 筆", demands.len());

        let partials: Vec<ExplosionAccumulator> = demands
            .par_iter()
            .map(|demand| {
                let mut acc = self.new_accumulator();
                self.explode_demand(&mut acc, &demand.code, demand.quantity, true);
                acc
            })
            .collect();

        let mut acc = self.new_accumulator();
        for partial in partials {
            acc.merge(partial);
        }

        self.finish(acc, demands, start_time)
    }

    /// 展開單一需求
    ///
    /// `is_top_level` 為 true 時記錄成品缺口。
    pub fn explode_demand(
        &self,
        acc: &mut ExplosionAccumulator,
        code: &str,
        demand: Decimal,
        is_top_level: bool,
    ) {
        let code = normalize_code(code);
        let mut path = TraversalPath::new(&code);
        self.explode_node(acc, &mut path, &code, demand, is_top_level);
    }

    /// 創建符合配置的累加器
    pub fn new_accumulator(&self) -> ExplosionAccumulator {
        ExplosionAccumulator::new(self.config.collect_trace)
    }

    /// 獲取目錄引用
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// 獲取配置引用
    pub fn config(&self) -> &ExplosionConfig {
        &self.config
    }

    fn finish(
        &self,
        acc: ExplosionAccumulator,
        demands: Vec<DemandRequest>,
        start_time: std::time::Instant,
    ) -> ExplosionResult {
        let finalized = acc.finalize(&self.catalog);

        let mut result = ExplosionResult::empty();
        result.demands = demands;
        result.shortfalls = finalized.shortfalls;
        result.insumos = finalized.insumos;
        result.registrations = finalized.registrations;
        result.warnings = finalized.warnings;
        result.trace = finalized.trace;
        result.calculation_time_ms = Some(start_time.elapsed().as_millis());

        tracing::info!(
            "BOM 展開完成，耗時 {:?}：成品 {} 筆，insumo {} 筆，待登錄 {} 筆，警告 {} 筆",
            start_time.elapsed(),
            result.shortfalls.len(),
            result.insumos.len(),
            result.registrations.len(),
            result.warnings.len()
        );

        result
    }

    fn explode_node(
        &self,
        acc: &mut ExplosionAccumulator,
        path: &mut TraversalPath,
        code: &str,
        demand: Decimal,
        is_top_level: bool,
    ) {
        let code = normalize_code(code);
        if code.is_empty() || demand <= Decimal::ZERO {
            return;
        }

        // 循環防護：代碼已在目前路徑上
        if path.contains(&code) {
            let cycle = path.describe(&code);
            acc.trace(|| format!("[CICLO] {}: {} → não explode", code, cycle));
            acc.warn(ExplosionWarning::error(
                code.clone(),
                format!("偵測到循環結構 {}，已停止展開", cycle),
                WarningKind::CycleDetected,
            ));
            return;
        }

        let net = NettingCalculator::for_code(&self.catalog, &code, demand);
        if is_top_level {
            acc.record_top_level(&code, &net);
        }

        // 庫存足夠：不展開
        if !net.has_shortfall() {
            acc.trace(|| {
                format!(
                    "[OK] {}: demanda {} <= estoque {} → não explode",
                    code, demand, net.on_hand
                )
            });
            return;
        }

        let shortfall = net.net_requirement;
        acc.trace(|| {
            format!(
                "[EXPLODE] {}: demanda {}, estoque {}, faltante {}",
                code, demand, net.on_hand, shortfall
            )
        });
        tracing::debug!("展開 {}：需求 {}，缺口 {}", code, demand, shortfall);

        path.enter(&code);
        match self.catalog.structure_of(&code) {
            Structure::Kit(kit) => self.explode_kit(acc, path, kit, shortfall),
            Structure::Simple(recipe) => self.explode_simple(acc, path, recipe, shortfall),
            Structure::Unregistered => {
                let category = if is_top_level {
                    Category::Produto
                } else {
                    Category::Componente
                };
                acc.trace(|| {
                    format!("[ALERTA] {}: não encontrado em BOM (nem kit, nem simples)", code)
                });
                acc.warn(ExplosionWarning::warning(
                    code.clone(),
                    format!("代碼 {} 未登錄結構，缺口 {}", code, shortfall),
                    WarningKind::Unregistered,
                ));
                acc.add_registration(
                    category,
                    &code,
                    shortfall,
                    NOTE_UNREGISTERED.to_string(),
                    path.root(),
                );
            }
        }
        path.leave();
    }

    /// 套組：各組件以 缺口 × 倍數 作為新需求繼續展開
    fn explode_kit(
        &self,
        acc: &mut ExplosionAccumulator,
        path: &mut TraversalPath,
        kit: &KitComposition,
        shortfall: Decimal,
    ) {
        let paired = match pair_strict(&kit.components, "componentes") {
            Ok(paired) => paired,
            Err(err) => {
                self.reject_node(
                    acc,
                    path,
                    Category::Kit,
                    &kit.code,
                    shortfall,
                    WarningKind::ListMismatch,
                    err.to_string(),
                );
                return;
            }
        };

        // 先計算所有子需求，任何溢位都使整個套組停止
        let mut children = Vec::with_capacity(paired.lines.len());
        for (component, multiplier) in paired.lines {
            match shortfall.checked_mul(multiplier) {
                Some(child_demand) => children.push((component, multiplier, child_demand)),
                None => {
                    self.reject_overflow(acc, path, Category::Kit, &kit.code, shortfall, component, multiplier);
                    return;
                }
            }
        }

        for (component, multiplier, child_demand) in children {
            acc.trace(|| {
                format!(
                    "  ↳ componente {} x {} → demanda {}",
                    component, multiplier, child_demand
                )
            });
            if child_demand <= Decimal::ZERO {
                self.warn_zero_quantity(acc, &kit.code, component);
                continue;
            }
            self.explode_node(acc, path, component, child_demand, false);
        }
    }

    /// 簡單產品：累加到 insumo，不再往下展開（半成品依策略而定）
    fn explode_simple(
        &self,
        acc: &mut ExplosionAccumulator,
        path: &mut TraversalPath,
        recipe: &SimpleRecipe,
        shortfall: Decimal,
    ) {
        // 先檢查所有清單與數量，任何衝突都使整個節點停止，避免部分累加
        let golas = pair_padded(&recipe.golas, "gola");
        let extras = pair_padded(&recipe.extras, "extras");
        let (golas, extras) = match (golas, extras) {
            (Ok(golas), Ok(extras)) => (golas, extras),
            (Err(err), _) | (_, Err(err)) => {
                self.reject_node(
                    acc,
                    path,
                    Category::Simples,
                    &recipe.code,
                    shortfall,
                    WarningKind::ListMismatch,
                    err.to_string(),
                );
                return;
            }
        };

        let slots: Vec<(Category, &str, Decimal)> = recipe
            .semi
            .iter()
            .map(|semi| (Category::Semi, semi.code.as_str(), semi.qty_per_unit))
            .chain(golas.lines.iter().map(|&(code, qty)| (Category::Gola, code, qty)))
            .chain(
                recipe
                    .bordado
                    .iter()
                    .map(|bordado| (Category::Bordado, bordado.code.as_str(), bordado.qty_per_unit)),
            )
            .chain(extras.lines.iter().map(|&(code, qty)| (Category::Extra, code, qty)))
            .collect();

        let mut scaled = Vec::with_capacity(slots.len());
        for (category, code, qty) in slots {
            match shortfall.checked_mul(qty) {
                Some(required) => scaled.push((category, code, qty, required)),
                None => {
                    self.reject_overflow(acc, path, Category::Simples, &recipe.code, shortfall, code, qty);
                    return;
                }
            }
        }

        for (label, padded) in [("gola", golas.padded), ("extras", extras.padded)] {
            if padded > 0 {
                acc.warn(ExplosionWarning::info(
                    recipe.code.clone(),
                    format!("{} 的 {} 數量清單缺少 {} 項，已補 1", recipe.code, label, padded),
                    WarningKind::RaggedListPadded,
                ));
            }
        }

        for (category, code, qty, required) in scaled {
            if category == Category::Semi {
                self.contribute_semi(acc, path, &recipe.code, code, qty, required);
            } else {
                self.contribute(acc, path, &recipe.code, category, code, qty, required);
            }
        }
    }

    fn contribute_semi(
        &self,
        acc: &mut ExplosionAccumulator,
        path: &mut TraversalPath,
        parent: &str,
        code: &str,
        qty_per_unit: Decimal,
        required: Decimal,
    ) {
        let explode = self.config.semi_policy == SemiPolicy::Explode
            && !matches!(self.catalog.structure_of(code), Structure::Unregistered);

        if !explode {
            self.contribute(acc, path, parent, Category::Semi, code, qty_per_unit, required);
            return;
        }

        acc.trace(|| {
            format!(
                "  ↳ SEMI {} x {} → demanda {} (explode)",
                code, qty_per_unit, required
            )
        });
        if required <= Decimal::ZERO {
            self.warn_zero_quantity(acc, parent, code);
            return;
        }
        self.explode_node(acc, path, code, required, false);
    }

    #[allow(clippy::too_many_arguments)]
    fn contribute(
        &self,
        acc: &mut ExplosionAccumulator,
        path: &TraversalPath,
        parent: &str,
        category: Category,
        code: &str,
        qty_per_unit: Decimal,
        required: Decimal,
    ) {
        acc.trace(|| format!("  ↳ {} {} x {} → {}", category, code, qty_per_unit, required));

        if required <= Decimal::ZERO {
            self.warn_zero_quantity(acc, parent, code);
            return;
        }
        acc.add_insumo(category, code, required, path.root());
    }

    /// 數量溢位：節點不展開，改為 CADASTRAR_BOM
    #[allow(clippy::too_many_arguments)]
    fn reject_overflow(
        &self,
        acc: &mut ExplosionAccumulator,
        path: &TraversalPath,
        category: Category,
        code: &str,
        shortfall: Decimal,
        component: &str,
        qty_per_unit: Decimal,
    ) {
        let reason = format!(
            "quantidade fora do limite: {} x {} ({})",
            shortfall, qty_per_unit, component
        );
        self.reject_node(acc, path, category, code, shortfall, WarningKind::QuantityOverflow, reason);
    }

    /// 結構無法展開（清單衝突或數量溢位）：節點不展開，改為 CADASTRAR_BOM
    #[allow(clippy::too_many_arguments)]
    fn reject_node(
        &self,
        acc: &mut ExplosionAccumulator,
        path: &TraversalPath,
        category: Category,
        code: &str,
        shortfall: Decimal,
        kind: WarningKind,
        reason: String,
    ) {
        acc.trace(|| format!("[ERRO] {} {}: {}", category, code, reason));
        acc.warn(ExplosionWarning::error(
            code.to_string(),
            format!("{} 節點未展開（{}）", code, reason),
            kind,
        ));
        acc.add_registration(category, code, shortfall, format!("corrigir BOM: {}", reason), path.root());
    }

    fn warn_zero_quantity(&self, acc: &mut ExplosionAccumulator, parent: &str, component: &str) {
        acc.warn(ExplosionWarning::info(
            parent.to_string(),
            format!("{} 的組件 {} 用量為 0，不產生需求", parent, component),
            WarningKind::ZeroQuantity,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WarningSeverity;
    use bomx_core::{ActionKind, ComponentList, InsumoStatus, ShortfallStatus};
    use proptest::prelude::*;

    fn list(codes: &[&str], quantities: &[i64]) -> ComponentList {
        ComponentList::new(codes, quantities.iter().map(|q| Decimal::from(*q)).collect())
    }

    fn engine(catalog: Catalog) -> ExplosionEngine {
        ExplosionEngine::new(catalog, ExplosionConfig::new())
    }

    #[test]
    fn test_kit_to_simple_explosion() {
        // A (庫存 5) = 2 × B；B = 1 × SEMI S1
        let catalog = Catalog::builder()
            .with_stock("A", Decimal::from(5))
            .with_kit(KitComposition::new("A", list(&["B"], &[2])))
            .with_simple(SimpleRecipe::new("B").with_semi("S1", Decimal::ONE))
            .build();

        let result = engine(catalog).run(vec![DemandRequest::new("A", Decimal::from(8))]);

        let a = result.shortfall("A").unwrap();
        assert_eq!(a.shortfall, Decimal::from(3));
        assert_eq!(a.status, ShortfallStatus::Faltante);

        // B 是子件，不記錄在頂層缺口
        assert!(result.shortfall("B").is_none());

        let s1 = result.insumo(Category::Semi, "S1").unwrap();
        assert_eq!(s1.required, Decimal::from(6));
        assert_eq!(s1.shortfall, Decimal::from(6));
        assert_eq!(s1.status, InsumoStatus::Faltando);
        assert_eq!(s1.origins, vec!["A".to_string()]);
    }

    #[test]
    fn test_sufficient_stock_does_not_explode() {
        let catalog = Catalog::builder()
            .with_stock("A", Decimal::from(10))
            .with_kit(KitComposition::new("A", list(&["B"], &[2])))
            .build();

        let result = engine(catalog).run(vec![DemandRequest::new("A", Decimal::from(7))]);

        assert_eq!(result.shortfall("A").unwrap().shortfall, Decimal::ZERO);
        assert!(result.insumos.is_empty());
        assert!(result.registrations.is_empty());
        assert_eq!(result.trace.len(), 1);
        assert!(result.trace[0].starts_with("[OK] A"));
    }

    #[test]
    fn test_unregistered_code() {
        let result = engine(Catalog::default()).run(vec![DemandRequest::new("X9", Decimal::from(4))]);

        assert_eq!(result.shortfall("X9").unwrap().shortfall, Decimal::from(4));
        assert_eq!(result.registrations.len(), 1);

        let action = &result.registrations[0];
        assert_eq!(action.action, ActionKind::CadastrarBom);
        assert_eq!(action.category, Category::Produto);
        assert_eq!(action.code, "X9");
        assert_eq!(action.quantity, Decimal::from(4));
        assert_eq!(result.warnings[0].kind, WarningKind::Unregistered);
    }

    #[test]
    fn test_child_stock_absorbs_demand() {
        // 子件 B 有庫存 4，只有 6 - 4 = 2 往下展開
        let catalog = Catalog::builder()
            .with_stock("A", Decimal::from(5))
            .with_stock("B", Decimal::from(4))
            .with_kit(KitComposition::new("A", list(&["B"], &[2])))
            .with_simple(SimpleRecipe::new("B").with_semi("S1", Decimal::ONE))
            .build();

        let result = engine(catalog).run(vec![DemandRequest::new("A", Decimal::from(8))]);

        assert_eq!(result.insumo(Category::Semi, "S1").unwrap().required, Decimal::from(2));
    }

    #[test]
    fn test_all_recipe_slots() {
        let recipe = SimpleRecipe::new("POLO")
            .with_semi("CORPO", Decimal::ONE)
            .with_golas(list(&["GOLA-A", "GOLA-B"], &[1, 2]))
            .with_bordado("BRD", Decimal::ONE)
            .with_extras(list(&["ETQ", "BOTAO"], &[1, 3]));
        let catalog = Catalog::builder()
            .with_stock("BOTAO", Decimal::from(10))
            .with_simple(recipe)
            .build();

        let result = engine(catalog).run(vec![DemandRequest::new("POLO", Decimal::from(4))]);

        assert_eq!(result.insumo(Category::Semi, "CORPO").unwrap().required, Decimal::from(4));
        assert_eq!(result.insumo(Category::Gola, "GOLA-A").unwrap().required, Decimal::from(4));
        assert_eq!(result.insumo(Category::Gola, "GOLA-B").unwrap().required, Decimal::from(8));
        assert_eq!(result.insumo(Category::Bordado, "BRD").unwrap().required, Decimal::from(4));
        assert_eq!(result.insumo(Category::Extra, "ETQ").unwrap().required, Decimal::from(4));

        let botao = result.insumo(Category::Extra, "BOTAO").unwrap();
        assert_eq!(botao.required, Decimal::from(12));
        assert_eq!(botao.shortfall, Decimal::from(2));
        assert_eq!(botao.status, InsumoStatus::Parcial);
    }

    #[test]
    fn test_short_quantity_list_padded() {
        let recipe = SimpleRecipe::new("POLO").with_golas(list(&["G1", "G2"], &[3]));
        let catalog = Catalog::builder().with_simple(recipe).build();

        let result = engine(catalog).run(vec![DemandRequest::new("POLO", Decimal::from(2))]);

        assert_eq!(result.insumo(Category::Gola, "G1").unwrap().required, Decimal::from(6));
        assert_eq!(result.insumo(Category::Gola, "G2").unwrap().required, Decimal::from(2));
        assert!(result
            .warnings
            .iter()
            .any(|w| w.kind == WarningKind::RaggedListPadded));
        assert!(result.registrations.is_empty());
    }

    #[test]
    fn test_conflicting_recipe_list_stops_node() {
        let recipe = SimpleRecipe::new("POLO")
            .with_semi("CORPO", Decimal::ONE)
            .with_extras(list(&["E1"], &[1, 2]));
        let catalog = Catalog::builder().with_simple(recipe).build();

        let result = engine(catalog).run(vec![DemandRequest::new("POLO", Decimal::from(2))]);

        assert!(result.insumos.is_empty());
        assert_eq!(result.registrations.len(), 1);
        assert_eq!(result.registrations[0].category, Category::Simples);
        assert!(result.has_errors());
    }

    #[test]
    fn test_kit_length_mismatch_is_hard_error() {
        let catalog = Catalog::builder()
            .with_kit(KitComposition::new("KIT", list(&["B", "C"], &[1])))
            .with_simple(SimpleRecipe::new("B").with_semi("S1", Decimal::ONE))
            .build();

        let result = engine(catalog).run(vec![
            DemandRequest::new("KIT", Decimal::from(3)),
            DemandRequest::new("OK-ITEM", Decimal::from(1)),
        ]);

        // 不猜測配對：B 不會被展開
        assert!(result.insumos.is_empty());

        let kit = result.registrations.iter().find(|a| a.code == "KIT").unwrap();
        assert_eq!(kit.category, Category::Kit);
        assert_eq!(kit.quantity, Decimal::from(3));
        assert!(kit.note.contains("codigos (2) != qtds (1)"));

        // 其他需求仍然有結果
        assert!(result.shortfall("OK-ITEM").is_some());
    }

    #[test]
    fn test_self_referencing_kit_terminates() {
        let catalog = Catalog::builder()
            .with_kit(KitComposition::new("A", list(&["A", "S"], &[1, 1])))
            .with_simple(SimpleRecipe::new("S").with_semi("S1", Decimal::ONE))
            .build();

        let result = engine(catalog).run(vec![DemandRequest::new("A", Decimal::from(2))]);

        assert_eq!(result.insumo(Category::Semi, "S1").unwrap().required, Decimal::from(2));
        assert!(result
            .warnings
            .iter()
            .any(|w| w.kind == WarningKind::CycleDetected));
    }

    #[test]
    fn test_transitive_cycle_terminates() {
        // A → B → C → A
        let catalog = Catalog::builder()
            .with_kit(KitComposition::new("A", list(&["B"], &[1])))
            .with_kit(KitComposition::new("B", list(&["C"], &[2])))
            .with_kit(KitComposition::new("C", list(&["A", "LEAF"], &[1, 1])))
            .build();

        let result = engine(catalog).run(vec![DemandRequest::new("A", Decimal::from(1))]);

        let leaf = result.registrations.iter().find(|a| a.code == "LEAF").unwrap();
        assert_eq!(leaf.category, Category::Componente);
        assert_eq!(leaf.quantity, Decimal::from(2));
        assert_eq!(
            result
                .warnings
                .iter()
                .filter(|w| w.kind == WarningKind::CycleDetected)
                .count(),
            1
        );
    }

    #[test]
    fn test_shared_component_from_diamond() {
        // KIT → B, C；B 與 C 都需要 SEMI S1
        let catalog = Catalog::builder()
            .with_kit(KitComposition::new("KIT", list(&["B", "C"], &[1, 2])))
            .with_simple(SimpleRecipe::new("B").with_semi("S1", Decimal::ONE))
            .with_simple(SimpleRecipe::new("C").with_semi("S1", Decimal::ONE))
            .build();

        let result = engine(catalog).run(vec![DemandRequest::new("KIT", Decimal::from(5))]);

        assert_eq!(result.insumo(Category::Semi, "S1").unwrap().required, Decimal::from(15));
        assert!(result
            .warnings
            .iter()
            .all(|w| w.kind != WarningKind::CycleDetected));
    }

    #[test]
    fn test_semi_policy() {
        let build = || {
            Catalog::builder()
                .with_stock("CORPO", Decimal::from(1))
                .with_simple(SimpleRecipe::new("POLO").with_semi("CORPO", Decimal::ONE))
                .with_simple(SimpleRecipe::new("CORPO").with_extras(list(&["TECIDO"], &[2])))
                .build()
        };
        let demands = || vec![DemandRequest::new("POLO", Decimal::from(3))];

        // 預設：半成品為葉節點
        let terminal = engine(build()).run(demands());
        let corpo = terminal.insumo(Category::Semi, "CORPO").unwrap();
        assert_eq!(corpo.required, Decimal::from(3));
        assert_eq!(corpo.shortfall, Decimal::from(2));
        assert!(terminal.insumo(Category::Extra, "TECIDO").is_none());

        // Explode：扣除半成品庫存後展開其結構
        let config = ExplosionConfig::new().with_semi_policy(SemiPolicy::Explode);
        let exploded = ExplosionEngine::new(build(), config).run(demands());
        assert!(exploded.insumo(Category::Semi, "CORPO").is_none());
        assert_eq!(
            exploded.insumo(Category::Extra, "TECIDO").unwrap().required,
            Decimal::from(4)
        );
    }

    #[test]
    fn test_zero_multiplier_skipped() {
        let catalog = Catalog::builder()
            .with_kit(KitComposition::new("KIT", list(&["B"], &[0])))
            .build();

        let result = engine(catalog).run(vec![DemandRequest::new("KIT", Decimal::from(5))]);

        assert!(result.registrations.is_empty());
        assert!(result.warnings.iter().any(|w| w.kind == WarningKind::ZeroQuantity));
    }

    #[test]
    fn test_fractional_multipliers_are_not_rounded() {
        let catalog = Catalog::builder()
            .with_kit(KitComposition::new(
                "KIT",
                ComponentList::new(&["B"], vec![Decimal::new(333, 3)]),
            ))
            .with_simple(SimpleRecipe::new("B").with_semi("S1", Decimal::ONE))
            .build();

        let result = engine(catalog).run(vec![DemandRequest::new("KIT", Decimal::from(3))]);

        assert_eq!(
            result.insumo(Category::Semi, "S1").unwrap().required,
            Decimal::new(999, 3)
        );
    }

    #[test]
    fn test_explode_demand_with_external_accumulator() {
        let catalog = Catalog::builder()
            .with_simple(SimpleRecipe::new("B").with_semi("S1", Decimal::ONE))
            .build();
        let engine = engine(catalog);

        let mut acc = engine.new_accumulator();
        engine.explode_demand(&mut acc, "b", Decimal::from(2), false);
        engine.explode_demand(&mut acc, "B", Decimal::from(3), false);

        // 非頂層呼叫不記錄成品缺口
        assert!(acc.shortfall("B").is_none());
        assert_eq!(acc.insumo_required(Category::Semi, "S1"), Decimal::from(5));
    }

    #[test]
    fn test_overflowing_kit_chain_does_not_abort_run() {
        // K1 → K2 → K3 → K4，每層 1e9 倍；K3 的子需求超出 Decimal 範圍
        const BILLION: i64 = 1_000_000_000;
        let catalog = Catalog::builder()
            .with_kit(KitComposition::new("K1", list(&["K2"], &[BILLION])))
            .with_kit(KitComposition::new("K2", list(&["K3"], &[BILLION])))
            .with_kit(KitComposition::new("K3", list(&["K4"], &[BILLION])))
            .with_simple(SimpleRecipe::new("K4").with_semi("S1", Decimal::ONE))
            .with_simple(SimpleRecipe::new("OTHER").with_semi("S2", Decimal::ONE))
            .build();
        let engine = engine(catalog);
        let demands = vec![
            DemandRequest::new("K1", Decimal::from(10_000)),
            DemandRequest::new("OTHER", Decimal::ONE),
        ];

        for result in [engine.run_sequential(demands.clone()), engine.run_parallel(demands)] {
            assert!(result.shortfall("OTHER").is_some());
            assert_eq!(result.insumo(Category::Semi, "S2").unwrap().required, Decimal::ONE);
            assert!(result.insumo(Category::Semi, "S1").is_none());

            let k3 = result.registrations.iter().find(|a| a.code == "K3").unwrap();
            assert_eq!(k3.category, Category::Kit);
            assert_eq!(k3.quantity, Decimal::from_i128_with_scale(10i128.pow(22), 0));
            assert!(result.warnings.iter().any(|w| {
                w.kind == WarningKind::QuantityOverflow && w.severity == WarningSeverity::Error
            }));
        }
    }

    #[test]
    fn test_overflowing_recipe_skips_whole_node() {
        let recipe = SimpleRecipe::new("P")
            .with_golas(list(&["G1"], &[1]))
            .with_extras(ComponentList::new(&["E1"], vec![Decimal::MAX]));
        let catalog = Catalog::builder().with_simple(recipe).build();

        let result = engine(catalog).run(vec![DemandRequest::new("P", Decimal::from(2))]);

        assert!(result.insumos.is_empty());
        assert_eq!(result.registrations.len(), 1);
        assert_eq!(result.registrations[0].category, Category::Simples);
        assert!(result.registrations[0].note.contains("E1"));
        assert!(result.has_errors());
    }

    proptest! {
        #[test]
        fn prop_leaf_contributions_are_additive(first in 1i64..500, second in 1i64..500, stock in 0i64..300) {
            // 兩個套組共用同一個簡單產品，庫存只在套組層扣除
            let catalog = Catalog::builder()
                .with_stock("K1", Decimal::from(stock))
                .with_stock("K2", Decimal::from(stock))
                .with_kit(KitComposition::new("K1", list(&["B"], &[1])))
                .with_kit(KitComposition::new("K2", list(&["B"], &[3])))
                .with_simple(SimpleRecipe::new("B").with_semi("S1", Decimal::ONE))
                .build();
            let engine = engine(catalog);

            let forward = engine.run(vec![
                DemandRequest::new("K1", Decimal::from(first)),
                DemandRequest::new("K2", Decimal::from(second)),
            ]);
            let backward = engine.run(vec![
                DemandRequest::new("K2", Decimal::from(second)),
                DemandRequest::new("K1", Decimal::from(first)),
            ]);

            let expected = (first - stock).max(0) + 3 * (second - stock).max(0);
            let required = |result: &ExplosionResult| {
                result
                    .insumo(Category::Semi, "S1")
                    .map(|r| r.required)
                    .unwrap_or(Decimal::ZERO)
            };
            prop_assert_eq!(required(&forward), Decimal::from(expected));
            prop_assert_eq!(required(&backward), Decimal::from(expected));
        }
    }
}
