//! Pure projections of an expense collection: list, summary and chart.
//!
//! Every function takes the collection as read-only input and returns the
//! same output for the same input, so the server-rendered page and any client
//! re-render agree.

use crate::models::{Category, Expense};
use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::warn;

pub const EMPTY_PLACEHOLDER: &str = "No expenses added yet.";

pub const PALETTE: [&str; 6] = [
    "#3b82f6", "#ef4444", "#22c55e", "#eab308", "#a855f7", "#ec4899",
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListItem {
    pub id: String,
    pub description: String,
    pub category: Category,
    pub amount: String,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ListView {
    Empty { placeholder: &'static str },
    Items { items: Vec<ListItem> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total: Decimal,
    pub display: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSlice {
    pub category: Category,
    pub total: Decimal,
    /// Fraction of the grand total, in `0.0..=1.0`.
    pub share: f64,
    pub color: &'static str,
}

/// The three views rendered after every mutation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    pub list: ListView,
    pub summary: Summary,
    pub chart: Vec<ChartSlice>,
}

impl Page {
    pub fn render(expenses: &[Expense]) -> Self {
        Self {
            list: list(expenses),
            summary: summary(expenses),
            chart: chart(expenses),
        }
    }
}

pub fn format_money(amount: Decimal) -> String {
    format!("${:.2}", amount.round_dp(2))
}

/// Most recent first; expenses sharing a date keep collection order.
pub fn list(expenses: &[Expense]) -> ListView {
    if expenses.is_empty() {
        return ListView::Empty {
            placeholder: EMPTY_PLACEHOLDER,
        };
    }

    let mut sorted: Vec<&Expense> = expenses.iter().collect();
    sorted.sort_by(|a, b| b.date.cmp(&a.date));

    let items = sorted
        .into_iter()
        .map(|expense| ListItem {
            id: expense.id.clone(),
            description: expense.description.clone(),
            category: expense.category,
            amount: format_money(expense.amount),
            date: expense.date,
        })
        .collect();
    ListView::Items { items }
}

/// Adds without panicking; a sum past `Decimal::MAX` is pinned there.
fn add_amount(total: Decimal, amount: Decimal) -> Decimal {
    total.checked_add(amount).unwrap_or_else(|| {
        warn!("expense total overflowed, capping at the largest decimal");
        Decimal::MAX
    })
}

pub fn summary(expenses: &[Expense]) -> Summary {
    let total = expenses
        .iter()
        .fold(Decimal::ZERO, |total, expense| add_amount(total, expense.amount));
    Summary {
        total,
        display: format_money(total),
    }
}

/// One slice per category present, in order of first appearance.
pub fn chart(expenses: &[Expense]) -> Vec<ChartSlice> {
    let mut groups: Vec<(Category, Decimal)> = Vec::new();
    for expense in expenses {
        match groups.iter_mut().find(|(category, _)| *category == expense.category) {
            Some((_, total)) => *total = add_amount(*total, expense.amount),
            None => groups.push((expense.category, expense.amount)),
        }
    }

    let grand_total = groups
        .iter()
        .fold(Decimal::ZERO, |sum, (_, total)| add_amount(sum, *total));
    groups
        .into_iter()
        .enumerate()
        .map(|(index, (category, total))| ChartSlice {
            category,
            total,
            share: if grand_total.is_zero() {
                0.0
            } else {
                (total / grand_total).to_f64().unwrap_or(0.0)
            },
            color: PALETTE[index % PALETTE.len()],
        })
        .collect()
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

pub fn list_html(view: &ListView) -> String {
    match view {
        ListView::Empty { placeholder } => {
            format!(r#"<p class="empty-state">{}</p>"#, escape_html(placeholder))
        }
        ListView::Items { items } => {
            let mut html = String::new();
            for item in items {
                html.push_str(&format!(
                    r#"<div class="expense-item">
  <div class="expense-main">
    <div class="expense-description">{description}</div>
    <div class="expense-meta"><span class="badge">{category}</span><time datetime="{date}">{date_label}</time></div>
  </div>
  <div class="expense-side">
    <span class="expense-amount">{amount}</span>
    <button class="delete-btn" type="button" data-id="{id}" aria-label="Delete expense">&times;</button>
  </div>
</div>
"#,
                    description = escape_html(&item.description),
                    category = item.category,
                    date = item.date,
                    date_label = item.date.format("%b %-d, %Y"),
                    amount = item.amount,
                    id = escape_html(&item.id),
                ));
            }
            html
        }
    }
}

const DONUT_CENTER: f64 = 110.0;
const DONUT_RADIUS: f64 = 80.0;
const DONUT_WIDTH: f64 = 36.0;

/// Donut chart with a legend, drawn as stroked circle arcs.
pub fn donut_svg(slices: &[ChartSlice]) -> String {
    if slices.is_empty() {
        return r#"<svg class="chart" viewBox="0 0 220 220" role="img" aria-label="Spending by category"><text class="chart-empty" x="110" y="114" text-anchor="middle">No data yet</text></svg>"#.to_string();
    }

    let circumference = 2.0 * std::f64::consts::PI * DONUT_RADIUS;
    let mut svg = format!(
        r#"<svg class="chart" viewBox="0 0 220 {height}" role="img" aria-label="Spending by category">"#,
        height = 230 + slices.len() * 22
    );

    let mut offset = 0.0;
    for slice in slices {
        let length = slice.share * circumference;
        svg.push_str(&format!(
            r#"<circle cx="{c}" cy="{c}" r="{r}" fill="none" stroke="{color}" stroke-width="{w}" stroke-dasharray="{len:.3} {gap:.3}" stroke-dashoffset="{off:.3}" transform="rotate(-90 {c} {c})"><title>{label}: {amount}</title></circle>"#,
            c = DONUT_CENTER,
            r = DONUT_RADIUS,
            w = DONUT_WIDTH,
            color = slice.color,
            len = length,
            gap = circumference - length,
            off = -offset,
            label = slice.category,
            amount = format_money(slice.total),
        ));
        offset += length;
    }

    for (index, slice) in slices.iter().enumerate() {
        let y = 236 + index * 22;
        svg.push_str(&format!(
            r#"<rect x="40" y="{ry}" width="12" height="12" fill="{color}"/><text class="chart-legend" x="60" y="{ty}">{label} {amount}</text>"#,
            ry = y - 10,
            ty = y,
            color = slice.color,
            label = slice.category,
            amount = format_money(slice.total),
        ));
    }

    svg.push_str("</svg>");
    svg
}
