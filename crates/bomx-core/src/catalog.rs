//! 物料目錄（庫存 + 產品結構，一次展開期間唯讀）

use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::normalize::{decimal_or, normalize_code};
use crate::stock::StockSnapshot;
use crate::structure::{ComponentLine, ComponentList, KitComposition, SimpleRecipe, Structure, StructureRecord};
use crate::table::RawTable;
use crate::Result;

/// 表格欄位名稱
pub mod columns {
    pub const CODIGO: &str = "codigo";
    pub const ESTOQUE_ATUAL: &str = "estoque_atual";

    pub const CODIGO_FINAL: &str = "codigo_final";
    pub const SEMI_CODIGO: &str = "semi_codigo";
    pub const SEMI_QTD: &str = "semi_qtd";
    pub const GOLA_CODIGO: &str = "gola_codigo";
    pub const GOLA_QTD: &str = "gola_qtd";
    pub const BORDADO_CODIGO: &str = "bordado_codigo";
    pub const BORDADO_QTD: &str = "bordado_qtd";
    pub const EXTRAS_CODIGOS: &str = "extras_codigos";
    pub const EXTRAS_QTDS: &str = "extras_qtds";

    pub const COMPONENTES_CODIGOS: &str = "componentes_codigos";
    pub const COMPONENTES_QTDS: &str = "componentes_qtds";
}

/// 物料目錄
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    /// 庫存快照
    stock: StockSnapshot,

    /// 正規化代碼 → 結構記錄
    structures: HashMap<String, StructureRecord>,
}

impl Catalog {
    /// 創建目錄
    pub fn new(stock: StockSnapshot, records: impl IntoIterator<Item = StructureRecord>) -> Self {
        let mut catalog = Self {
            stock,
            structures: HashMap::new(),
        };
        for record in records {
            catalog.insert_structure(record);
        }
        catalog
    }

    /// 建構器
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::default()
    }

    /// 由原始表格建立目錄
    ///
    /// 缺少必要欄位時回傳錯誤（展開開始前即失敗）；代碼為空的列會被略過。
    pub fn from_tables(stock: &RawTable, simples: &RawTable, kits: &RawTable) -> Result<Self> {
        let snapshot = load_stock(stock)?;
        let recipes = load_simples(simples)?;
        let compositions = load_kits(kits)?;

        let catalog = Self::new(
            snapshot,
            compositions
                .into_iter()
                .map(StructureRecord::Kit)
                .chain(recipes.into_iter().map(StructureRecord::Simple)),
        );

        tracing::info!(
            "物料目錄載入完成：庫存 {} 筆，結構 {} 筆",
            catalog.stock.len(),
            catalog.structures.len()
        );

        Ok(catalog)
    }

    /// 加入結構記錄
    ///
    /// 同一代碼同時為套組與簡單產品時，以套組為準；同類重複時保留第一筆。
    fn insert_structure(&mut self, record: StructureRecord) {
        let code = record.code().to_string();
        if code.is_empty() {
            return;
        }

        match (self.structures.get(&code), &record) {
            (None, _) => {
                self.structures.insert(code, record);
            }
            (Some(StructureRecord::Simple(_)), StructureRecord::Kit(_)) => {
                tracing::warn!("代碼 {} 同時登錄為簡單產品與套組，以套組為準", code);
                self.structures.insert(code, record);
            }
            (Some(_), _) => {
                tracing::warn!("代碼 {} 的結構重複登錄，保留第一筆", code);
            }
        }
    }

    /// 現有庫存（原始值）；未知代碼回傳 0
    pub fn stock(&self, code: &str) -> Decimal {
        self.stock.on_hand(code)
    }

    /// 可用庫存（負值視為 0）
    pub fn available(&self, code: &str) -> Decimal {
        self.stock.available(code)
    }

    /// 查詢產品結構
    pub fn structure_of(&self, code: &str) -> Structure<'_> {
        match self.structures.get(&normalize_code(code)) {
            Some(StructureRecord::Kit(kit)) => Structure::Kit(kit),
            Some(StructureRecord::Simple(recipe)) => Structure::Simple(recipe),
            None => Structure::Unregistered,
        }
    }

    /// 庫存快照
    pub fn stock_snapshot(&self) -> &StockSnapshot {
        &self.stock
    }

    /// 結構記錄數量
    pub fn structure_count(&self) -> usize {
        self.structures.len()
    }
}

/// 目錄建構器
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    stock: StockSnapshot,
    records: Vec<StructureRecord>,
}

impl CatalogBuilder {
    /// 建構器模式：添加庫存（重複代碼加總）
    pub fn with_stock(mut self, code: &str, quantity: Decimal) -> Self {
        self.stock.add(code, quantity);
        self
    }

    /// 建構器模式：添加簡單產品配方
    pub fn with_simple(mut self, recipe: SimpleRecipe) -> Self {
        self.records.push(StructureRecord::Simple(recipe));
        self
    }

    /// 建構器模式：添加套組
    pub fn with_kit(mut self, kit: KitComposition) -> Self {
        self.records.push(StructureRecord::Kit(kit));
        self
    }

    /// 建立目錄
    pub fn build(self) -> Catalog {
        Catalog::new(self.stock, self.records)
    }
}

fn load_stock(table: &RawTable) -> Result<StockSnapshot> {
    let code_col = table.require_column(columns::CODIGO)?;
    let qty_col = table.require_column(columns::ESTOQUE_ATUAL)?;

    let mut snapshot = StockSnapshot::new();
    for (idx, row) in table.rows.iter().enumerate() {
        let code = table.cell(row, Some(code_col));
        let raw_qty = table.cell(row, Some(qty_col));
        let qty = decimal_or(raw_qty, Decimal::ZERO);

        if !snapshot.add(code, qty) {
            tracing::warn!("{} 第 {} 列代碼為空，已略過", table.name, idx + 2);
        }
    }
    Ok(snapshot)
}

fn load_simples(table: &RawTable) -> Result<Vec<SimpleRecipe>> {
    let code_col = table.require_column(columns::CODIGO_FINAL)?;
    let semi_code = table.column(columns::SEMI_CODIGO);
    let semi_qty = table.column(columns::SEMI_QTD);
    let gola_code = table.column(columns::GOLA_CODIGO);
    let gola_qty = table.column(columns::GOLA_QTD);
    let bordado_code = table.column(columns::BORDADO_CODIGO);
    let bordado_qty = table.column(columns::BORDADO_QTD);
    let extras_code = table.column(columns::EXTRAS_CODIGOS);
    let extras_qty = table.column(columns::EXTRAS_QTDS);

    let mut recipes = Vec::with_capacity(table.len());
    for (idx, row) in table.rows.iter().enumerate() {
        let code = normalize_code(table.cell(row, Some(code_col)));
        if code.is_empty() {
            tracing::warn!("{} 第 {} 列 codigo_final 為空，已略過", table.name, idx + 2);
            continue;
        }

        recipes.push(SimpleRecipe {
            code,
            semi: ComponentLine::from_text(table.cell(row, semi_code), table.cell(row, semi_qty)),
            golas: ComponentList::from_text(table.cell(row, gola_code), table.cell(row, gola_qty)),
            bordado: ComponentLine::from_text(
                table.cell(row, bordado_code),
                table.cell(row, bordado_qty),
            ),
            extras: ComponentList::from_text(
                table.cell(row, extras_code),
                table.cell(row, extras_qty),
            ),
        });
    }
    Ok(recipes)
}

fn load_kits(table: &RawTable) -> Result<Vec<KitComposition>> {
    let code_col = table.require_column(columns::CODIGO_FINAL)?;
    let comp_codes = table.require_column(columns::COMPONENTES_CODIGOS)?;
    let comp_qtys = table.require_column(columns::COMPONENTES_QTDS)?;

    let mut kits = Vec::with_capacity(table.len());
    for (idx, row) in table.rows.iter().enumerate() {
        let code = normalize_code(table.cell(row, Some(code_col)));
        if code.is_empty() {
            tracing::warn!("{} 第 {} 列 codigo_final 為空，已略過", table.name, idx + 2);
            continue;
        }

        kits.push(KitComposition {
            code,
            components: ComponentList::from_text(
                table.cell(row, Some(comp_codes)),
                table.cell(row, Some(comp_qtys)),
            ),
        });
    }
    Ok(kits)
}
