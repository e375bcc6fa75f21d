//! 展開累加器
//!
//! 每次執行擁有自己的累加器，在遞迴中以 `&mut` 傳遞；
//! 並行執行時每個工作單元各自累加，最後依需求順序合併。

use bomx_core::{ActionItem, Catalog, Category, InsumoRequirement, ShortfallRecord};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};

use crate::netting::NetRequirement;
use crate::trace::TraceLog;
use crate::{ExplosionWarning, WarningKind, WarningSeverity};

/// Insumo 累計項
#[derive(Debug, Clone, Default, PartialEq)]
struct InsumoEntry {
    required: Decimal,
    origins: BTreeSet<String>,
}

/// CADASTRAR_BOM 累計項
#[derive(Debug, Clone, PartialEq)]
struct RegistrationEntry {
    category: Category,
    quantity: Decimal,
    note: String,
    origins: BTreeSet<String>,
}

/// 展開累加器
#[derive(Debug, Clone, Default)]
pub struct ExplosionAccumulator {
    /// 頂層代碼 → 缺口
    shortfalls: BTreeMap<String, ShortfallRecord>,

    /// (類別, 代碼) → 需求量
    insumos: BTreeMap<(Category, String), InsumoEntry>,

    /// 代碼 → 待登錄項目
    registrations: BTreeMap<String, RegistrationEntry>,

    /// 警告
    warnings: Vec<ExplosionWarning>,

    /// 追蹤記錄
    trace: TraceLog,
}

impl ExplosionAccumulator {
    /// 創建累加器
    pub fn new(collect_trace: bool) -> Self {
        Self {
            trace: TraceLog::new(collect_trace),
            ..Self::default()
        }
    }

    /// 記錄頂層缺口（同一代碼重複呼叫時累加）
    pub fn record_top_level(&mut self, code: &str, net: &NetRequirement) {
        self.shortfalls
            .entry(code.to_string())
            .and_modify(|record| record.merge(net.gross_requirement, net.net_requirement))
            .or_insert_with(|| {
                ShortfallRecord::new(
                    code.to_string(),
                    net.gross_requirement,
                    net.on_hand,
                    net.net_requirement,
                )
            });
    }

    /// 累加 insumo 需求；數量不為正時忽略
    pub fn add_insumo(&mut self, category: Category, code: &str, quantity: Decimal, origin: &str) {
        if code.is_empty() || quantity <= Decimal::ZERO {
            return;
        }
        let entry = self
            .insumos
            .entry((category, code.to_string()))
            .or_default();
        let fits = accumulate(&mut entry.required, quantity);
        entry.origins.insert(origin.to_string());
        if !fits {
            self.warn(overflow_warning(code));
        }
    }

    /// 累加待登錄 BOM 的代碼（同一代碼多條路徑時數量加總，保留第一次的類別與備註）
    pub fn add_registration(
        &mut self,
        category: Category,
        code: &str,
        quantity: Decimal,
        note: String,
        origin: &str,
    ) {
        let entry = self
            .registrations
            .entry(code.to_string())
            .or_insert_with(|| RegistrationEntry {
                category,
                quantity: Decimal::ZERO,
                note,
                origins: BTreeSet::new(),
            });
        let fits = accumulate(&mut entry.quantity, quantity);
        entry.origins.insert(origin.to_string());
        if !fits {
            self.warn(overflow_warning(code));
        }
    }

    /// 記錄警告（日誌級別依嚴重程度）
    pub fn warn(&mut self, warning: ExplosionWarning) {
        match warning.severity {
            WarningSeverity::Info => tracing::info!("[{}] {}", warning.code, warning.message),
            WarningSeverity::Warning => tracing::warn!("[{}] {}", warning.code, warning.message),
            WarningSeverity::Error => tracing::error!("[{}] {}", warning.code, warning.message),
        }
        self.warnings.push(warning);
    }

    /// 記錄追蹤
    pub fn trace(&mut self, line: impl FnOnce() -> String) {
        self.trace.record(line);
    }

    /// 合併另一個累加器（用於並行展開）
    pub fn merge(&mut self, other: ExplosionAccumulator) {
        for (code, record) in other.shortfalls {
            match self.shortfalls.get_mut(&code) {
                Some(existing) => existing.merge(record.demand, record.shortfall),
                None => {
                    self.shortfalls.insert(code, record);
                }
            }
        }

        let mut overflowed = Vec::new();
        for ((category, code), entry) in other.insumos {
            let target = self.insumos.entry((category, code.clone())).or_default();
            if !accumulate(&mut target.required, entry.required) {
                overflowed.push(code);
            }
            target.origins.extend(entry.origins);
        }

        for (code, entry) in other.registrations {
            match self.registrations.get_mut(&code) {
                Some(existing) => {
                    if !accumulate(&mut existing.quantity, entry.quantity) {
                        overflowed.push(code);
                    }
                    existing.origins.extend(entry.origins);
                }
                None => {
                    self.registrations.insert(code, entry);
                }
            }
        }

        self.warnings.extend(other.warnings);
        for code in overflowed {
            self.warn(overflow_warning(&code));
        }
        self.trace.append(other.trace);
    }

    /// 已累計的 insumo 需求量
    pub fn insumo_required(&self, category: Category, code: &str) -> Decimal {
        self.insumos
            .get(&(category, code.to_string()))
            .map(|e| e.required)
            .unwrap_or(Decimal::ZERO)
    }

    /// 已記錄的頂層缺口
    pub fn shortfall(&self, code: &str) -> Option<&ShortfallRecord> {
        self.shortfalls.get(code)
    }

    /// 不同 insumo 的數量
    pub fn insumo_count(&self) -> usize {
        self.insumos.len()
    }

    /// 待登錄代碼的數量
    pub fn registration_count(&self) -> usize {
        self.registrations.len()
    }

    pub fn warnings(&self) -> &[ExplosionWarning] {
        &self.warnings
    }

    pub fn trace_lines(&self) -> &[String] {
        self.trace.lines()
    }

    /// 完成計算：以目錄庫存計算 insumo 缺口
    pub fn finalize(self, catalog: &Catalog) -> FinalizedExplosion {
        let insumos = self
            .insumos
            .into_iter()
            .map(|((category, code), entry)| {
                let on_hand = catalog.stock(&code);
                InsumoRequirement::finalize(
                    category,
                    code,
                    entry.required,
                    on_hand,
                    entry.origins.into_iter().collect(),
                )
            })
            .collect();

        let registrations = self
            .registrations
            .into_iter()
            .map(|(code, entry)| {
                ActionItem::cadastrar_bom(
                    entry.category,
                    code,
                    entry.quantity,
                    entry.note,
                    entry.origins.into_iter().collect(),
                )
            })
            .collect();

        FinalizedExplosion {
            shortfalls: self.shortfalls.into_values().collect(),
            insumos,
            registrations,
            warnings: self.warnings,
            trace: self.trace.into_lines(),
        }
    }
}

/// 累加數量；超出範圍時停在 `Decimal::MAX` 並回傳 false
fn accumulate(total: &mut Decimal, quantity: Decimal) -> bool {
    match total.checked_add(quantity) {
        Some(sum) => {
            *total = sum;
            true
        }
        None => {
            *total = Decimal::MAX;
            false
        }
    }
}

fn overflow_warning(code: &str) -> ExplosionWarning {
    ExplosionWarning::error(
        code.to_string(),
        format!("{} 的累計數量超出可表示範圍，已截至上限", code),
        WarningKind::QuantityOverflow,
    )
}

/// 完成計算後的累加結果
#[derive(Debug, Clone, PartialEq)]
pub struct FinalizedExplosion {
    pub shortfalls: Vec<ShortfallRecord>,
    pub insumos: Vec<InsumoRequirement>,
    pub registrations: Vec<ActionItem>,
    pub warnings: Vec<ExplosionWarning>,
    pub trace: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netting::NettingCalculator;

    #[test]
    fn test_insumo_additivity() {
        let mut acc = ExplosionAccumulator::new(false);
        acc.add_insumo(Category::Semi, "S1", Decimal::from(6), "A");
        acc.add_insumo(Category::Semi, "S1", Decimal::from(4), "B");
        acc.add_insumo(Category::Gola, "S1", Decimal::from(1), "A");

        assert_eq!(acc.insumo_required(Category::Semi, "S1"), Decimal::from(10));
        assert_eq!(acc.insumo_required(Category::Gola, "S1"), Decimal::ONE);
        assert_eq!(acc.insumo_count(), 2);
    }

    #[test]
    fn test_non_positive_contributions_ignored() {
        let mut acc = ExplosionAccumulator::new(false);
        acc.add_insumo(Category::Extra, "E1", Decimal::ZERO, "A");
        acc.add_insumo(Category::Extra, "E1", Decimal::from(-2), "A");
        acc.add_insumo(Category::Extra, "", Decimal::from(2), "A");

        assert_eq!(acc.insumo_count(), 0);
    }

    #[test]
    fn test_top_level_merge() {
        let mut acc = ExplosionAccumulator::new(false);
        acc.record_top_level("A", &NettingCalculator::calculate(Decimal::from(3), Decimal::from(5)));
        acc.record_top_level("A", &NettingCalculator::calculate(Decimal::from(8), Decimal::from(5)));

        let record = acc.shortfall("A").unwrap();
        assert_eq!(record.demand, Decimal::from(11));
        assert_eq!(record.on_hand, Decimal::from(5));
        assert_eq!(record.shortfall, Decimal::from(3));
    }

    #[test]
    fn test_merge_accumulators() {
        let mut left = ExplosionAccumulator::new(true);
        left.add_insumo(Category::Semi, "S1", Decimal::from(6), "A");
        left.add_registration(Category::Componente, "X9", Decimal::from(2), "sem estrutura".into(), "A");
        left.trace(|| "left".to_string());

        let mut right = ExplosionAccumulator::new(true);
        right.add_insumo(Category::Semi, "S1", Decimal::from(1), "B");
        right.add_registration(Category::Produto, "X9", Decimal::from(4), "outra".into(), "X9");
        right.trace(|| "right".to_string());

        left.merge(right);

        assert_eq!(left.insumo_required(Category::Semi, "S1"), Decimal::from(7));
        assert_eq!(left.registration_count(), 1);
        assert_eq!(left.trace_lines(), ["left", "right"]);

        let catalog = Catalog::builder().with_stock("S1", Decimal::from(2)).build();
        let finalized = left.finalize(&catalog);

        let semi = &finalized.insumos[0];
        assert_eq!(semi.origins, vec!["A".to_string(), "B".to_string()]);
        assert_eq!(semi.shortfall, Decimal::from(5));

        let registration = &finalized.registrations[0];
        assert_eq!(registration.category, Category::Componente);
        assert_eq!(registration.quantity, Decimal::from(6));
        assert_eq!(registration.note, "sem estrutura");
        assert_eq!(registration.origins, vec!["A".to_string(), "X9".to_string()]);
    }

    #[test]
    fn test_accumulated_overflow_saturates() {
        let mut acc = ExplosionAccumulator::new(false);
        acc.add_insumo(Category::Extra, "E1", Decimal::MAX, "A");
        acc.add_insumo(Category::Extra, "E1", Decimal::MAX, "B");
        acc.add_registration(Category::Produto, "X9", Decimal::MAX, "sem estrutura".into(), "X9");

        let mut other = ExplosionAccumulator::new(false);
        other.add_registration(Category::Produto, "X9", Decimal::ONE, "sem estrutura".into(), "X9");
        acc.merge(other);

        assert_eq!(acc.insumo_required(Category::Extra, "E1"), Decimal::MAX);
        let overflows: Vec<&str> = acc
            .warnings()
            .iter()
            .filter(|w| w.kind == WarningKind::QuantityOverflow)
            .map(|w| w.code.as_str())
            .collect();
        assert_eq!(overflows, vec!["E1", "X9"]);

        let finalized = acc.finalize(&Catalog::default());
        assert_eq!(finalized.registrations[0].quantity, Decimal::MAX);
    }

    #[derive(Clone, Default)]
    struct CapturedLog(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CapturedLog {
        type Writer = CapturedLog;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn test_warning_log_level_follows_severity() {
        let log = CapturedLog::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(log.clone())
            .with_ansi(false)
            .without_time()
            .with_max_level(tracing::Level::TRACE)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let mut acc = ExplosionAccumulator::new(false);
            acc.warn(ExplosionWarning::info("Z1".into(), "zero".into(), WarningKind::ZeroQuantity));
            acc.warn(ExplosionWarning::warning(
                "R1".into(),
                "padded".into(),
                WarningKind::RaggedListPadded,
            ));
            acc.warn(ExplosionWarning::error("C1".into(), "cycle".into(), WarningKind::CycleDetected));
        });

        let output = String::from_utf8(log.0.lock().unwrap().clone()).unwrap();
        let level_of = |code: &str| {
            output
                .lines()
                .find(|line| line.contains(&format!("[{}]", code)))
                .map(|line| line.split_whitespace().next().unwrap_or_default().to_string())
        };
        assert_eq!(level_of("Z1").as_deref(), Some("INFO"));
        assert_eq!(level_of("R1").as_deref(), Some("WARN"));
        assert_eq!(level_of("C1").as_deref(), Some("ERROR"));
    }
}
