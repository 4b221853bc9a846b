//! Count summary shown in the export panel
//!
//! A snapshot of the session's tallies: one row per symbol with its total, and
//! a per-page breakdown that lists only pages holding markers and only symbols
//! present on each page. Both export paths render from this snapshot.

use crate::store::TakeoffSession;
use crate::symbol::{Symbol, SymbolId, SymbolShape};
use chrono::NaiveDate;

/// Swatches in the summary are drawn smaller than the markers themselves
pub const SWATCH_SCALE: f32 = 0.75;

/// Symbol appearance and its count in some scope
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct SummaryRow {
    pub symbol_id: SymbolId,
    pub name: String,
    pub color: String,
    pub shape: SymbolShape,
    pub size: f32,
    pub count: usize,
}

impl SummaryRow {
    /// Side length of the swatch drawn next to the row
    pub fn swatch_size(&self) -> f32 {
        self.size * SWATCH_SCALE
    }
}

/// Counts on a single page
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct PageGroup {
    pub page: u32,
    pub rows: Vec<SummaryRow>,
}

/// Snapshot of all counts at one point in time
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Summary {
    pub generated_on: NaiveDate,
    /// One row per symbol in palette order, zero counts included
    pub totals: Vec<SummaryRow>,
    /// Pages with markers, ascending; each lists symbols with nonzero counts
    pub pages: Vec<PageGroup>,
    pub grand_total: usize,
}

impl Summary {
    pub fn from_session(session: &TakeoffSession, generated_on: NaiveDate) -> Self {
        let row = |symbol: &Symbol, count: usize| SummaryRow {
            symbol_id: symbol.id(),
            name: symbol.name().to_string(),
            color: symbol.color().to_string(),
            shape: symbol.shape(),
            size: symbol.size(),
            count,
        };

        let totals: Vec<SummaryRow> = session
            .symbols()
            .iter()
            .map(|symbol| row(symbol, session.symbol_count(symbol.id())))
            .collect();

        let pages = session
            .pages_with_symbols()
            .into_iter()
            .map(|page| PageGroup {
                page,
                rows: session
                    .symbols()
                    .iter()
                    .filter_map(|symbol| {
                        let count = session.symbol_count_by_page(symbol.id(), page);
                        (count > 0).then(|| row(symbol, count))
                    })
                    .collect(),
            })
            .filter(|group| !group.rows.is_empty())
            .collect();

        let grand_total = totals.iter().map(|r| r.count).sum();

        Self {
            generated_on,
            totals,
            pages,
            grand_total,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }
}
