//! 報表生成
//!
//! 將展開結果整理成排序穩定的表格；數值只在這裡四捨五入。

use bomx_core::{
    ActionItem, DemandRequest, ExplosionConfig, InsumoRequirement, ShortfallRecord, ShortfallStatus,
};
use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use std::cmp::Ordering;

use crate::{ExplosionResult, ExplosionWarning};

/// 報表摘要
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    /// 銷售的 SKU 數
    pub skus_sold: usize,

    /// 有缺口的成品數
    pub parents_short: usize,

    /// 需要行動的 insumo 數
    pub insumos_short: usize,

    /// FABRICAR 行動數
    pub fabricar_actions: usize,

    /// CADASTRAR_BOM 行動數
    pub cadastrar_actions: usize,

    /// 警告數
    pub warnings: usize,
}

/// 完整報表
#[derive(Debug, Clone, Serialize)]
pub struct ExplosionReport {
    pub run_id: uuid::Uuid,
    pub generated_at: DateTime<Utc>,
    pub summary: ReportSummary,
    pub shortfalls: Vec<ShortfallRecord>,
    pub insumos: Vec<InsumoRequirement>,
    pub actions: Vec<ActionItem>,
    pub demands: Vec<DemandRequest>,
    pub warnings: Vec<ExplosionWarning>,
    pub trace: Vec<String>,
}

impl ExplosionReport {
    /// 序列化為 JSON
    pub fn to_json(&self) -> bomx_core::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// 報表生成器
pub struct ReportBuilder<'a> {
    result: &'a ExplosionResult,
    config: &'a ExplosionConfig,
}

impl<'a> ReportBuilder<'a> {
    pub fn new(result: &'a ExplosionResult, config: &'a ExplosionConfig) -> Self {
        Self { result, config }
    }

    /// 成品缺口表：FALTANTE 在前，缺口由大到小，代碼遞增
    pub fn build_shortfall_table(&self) -> Vec<ShortfallRecord> {
        let mut rows = self.result.shortfalls.clone();
        rows.sort_by(|a, b| {
            a.status
                .cmp(&b.status)
                .then_with(|| b.shortfall.cmp(&a.shortfall))
                .then_with(|| a.code.cmp(&b.code))
        });

        rows.into_iter()
            .map(|mut row| {
                row.demand = self.round(row.demand);
                row.on_hand = self.round(row.on_hand);
                row.shortfall = self.round(row.shortfall);
                row
            })
            .collect()
    }

    /// Insumo 需求表：需要行動的在前，缺口由大到小，再依類別與代碼
    pub fn build_insumo_table(&self) -> Vec<InsumoRequirement> {
        let mut rows = self.result.insumos.clone();
        rows.sort_by(compare_insumos);

        rows.into_iter()
            .map(|mut row| {
                row.required = self.round(row.required);
                row.on_hand = self.round(row.on_hand);
                row.shortfall = self.round(row.shortfall);
                row
            })
            .collect()
    }

    /// 行動清單：FABRICAR（insumo 缺口）與 CADASTRAR_BOM
    ///
    /// 缺口在報表精度下四捨五入為 0 的 insumo 不產生 FABRICAR。
    pub fn build_action_table(&self) -> Vec<ActionItem> {
        let mut rows: Vec<ActionItem> = self
            .fabricar_candidates()
            .map(|req| ActionItem::fabricar(req, &self.config.fabricar_note))
            .chain(self.result.registrations.iter().cloned())
            .collect();

        rows.sort_by(|a, b| {
            a.action
                .cmp(&b.action)
                .then_with(|| b.quantity.cmp(&a.quantity))
                .then_with(|| a.code.cmp(&b.code))
        });

        for row in &mut rows {
            row.quantity = self.round(row.quantity);
        }
        rows
    }

    /// 彙總後的銷售需求
    pub fn build_demand_table(&self) -> Vec<DemandRequest> {
        self.result
            .demands
            .iter()
            .map(|demand| DemandRequest {
                code: demand.code.clone(),
                quantity: self.round(demand.quantity),
            })
            .collect()
    }

    /// 報表摘要
    pub fn build_summary(&self) -> ReportSummary {
        ReportSummary {
            skus_sold: self
                .result
                .demands
                .iter()
                .filter(|d| d.is_explodable())
                .count(),
            parents_short: self
                .result
                .shortfalls
                .iter()
                .filter(|r| r.status == ShortfallStatus::Faltante)
                .count(),
            insumos_short: self
                .result
                .insumos
                .iter()
                .filter(|r| r.status.needs_action())
                .count(),
            fabricar_actions: self.fabricar_candidates().count(),
            cadastrar_actions: self.result.registrations.len(),
            warnings: self.result.warnings.len(),
        }
    }

    /// 生成完整報表
    pub fn build(&self) -> ExplosionReport {
        let report = ExplosionReport {
            run_id: self.result.run_id,
            generated_at: Utc::now(),
            summary: self.build_summary(),
            shortfalls: self.build_shortfall_table(),
            insumos: self.build_insumo_table(),
            actions: self.build_action_table(),
            demands: self.build_demand_table(),
            warnings: self.result.warnings.clone(),
            trace: self.result.trace.clone(),
        };

        tracing::info!(
            "報表生成完成：成品缺口 {} 筆，行動 {} 筆",
            report.summary.parents_short,
            report.actions.len()
        );

        report
    }

    fn fabricar_candidates(&self) -> impl Iterator<Item = &'a InsumoRequirement> + '_ {
        self.result
            .insumos
            .iter()
            .filter(|req| self.round(req.shortfall) > Decimal::ZERO)
    }

    fn round(&self, value: Decimal) -> Decimal {
        value.round_dp_with_strategy(
            self.config.report_decimals,
            RoundingStrategy::MidpointAwayFromZero,
        )
    }
}

fn compare_insumos(a: &InsumoRequirement, b: &InsumoRequirement) -> Ordering {
    b.status
        .needs_action()
        .cmp(&a.status.needs_action())
        .then_with(|| b.shortfall.cmp(&a.shortfall))
        .then_with(|| a.category.cmp(&b.category))
        .then_with(|| a.code.cmp(&b.code))
}
