use super::ui;
use crate::core::{FeeBreakdown, FeeSession, VehicleCategory};
use anyhow::{Context, Result};
use comfy_table::{Attribute, Cell};
use serde::Serialize;
use tracing::warn;

#[derive(Serialize)]
struct LineItemReport<'a> {
    name: &'a str,
    amount: f64,
}

#[derive(Serialize)]
struct BreakdownReport<'a> {
    category: Option<&'a VehicleCategory>,
    currency: &'a str,
    base_price: f64,
    items: Vec<LineItemReport<'a>>,
    total: f64,
}

/// Renders the breakdown as a table followed by the styled total.
pub fn render_breakdown(
    breakdown: &FeeBreakdown,
    category: Option<&VehicleCategory>,
    currency: &str,
) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Item"),
        ui::header_cell(&format!("Amount ({currency})")),
    ]);

    table.add_row(vec![
        Cell::new("Base price"),
        ui::amount_cell(breakdown.base_price),
    ]);
    for item in &breakdown.items {
        table.add_row(vec![Cell::new(item.name()), ui::amount_cell(item.amount)]);
    }
    table.add_row(vec![
        Cell::new("Total").add_attribute(Attribute::Bold),
        ui::total_cell(breakdown.total),
    ]);

    let category_label = category.map_or_else(
        || ui::style_text("none selected", ui::StyleType::Subtle),
        |c| ui::style_text(&c.label, ui::StyleType::Title),
    );

    let mut output = format!("Vehicle category: {category_label}\n\n");
    output.push_str(&table.to_string());
    output.push_str(&format!(
        "\n\nTotal ({}): {}",
        ui::style_text(currency, ui::StyleType::TotalLabel),
        ui::style_text(&ui::format_amount(breakdown.total), ui::StyleType::TotalValue)
    ));
    output
}

pub fn render_json(
    breakdown: &FeeBreakdown,
    category: Option<&VehicleCategory>,
    currency: &str,
) -> Result<String> {
    let report = BreakdownReport {
        category,
        currency,
        base_price: breakdown.base_price,
        items: breakdown
            .items
            .iter()
            .map(|item| LineItemReport {
                name: item.name(),
                amount: item.amount,
            })
            .collect(),
        total: breakdown.total,
    };
    serde_json::to_string_pretty(&report).context("Failed to serialize fee breakdown")
}

/// Selects the category matching `query` (id or label), or clears the
/// selection for `none`. Unknown categories leave the session untouched.
pub async fn select_by_query(session: &FeeSession, query: &str) -> bool {
    if query.trim().eq_ignore_ascii_case("none") {
        return session.select_category(None).await;
    }

    match session.find_category(query) {
        Some(category) => session.select_category(Some(category.id)).await,
        None => {
            warn!(category = query, "Unknown vehicle category");
            eprintln!(
                "{}",
                ui::style_text(
                    &format!("Unknown vehicle category: {query}"),
                    ui::StyleType::Error
                )
            );
            false
        }
    }
}

pub async fn run(
    session: &FeeSession,
    price: &str,
    category: Option<&str>,
    json: bool,
    currency: &str,
) -> Result<()> {
    if let Some(query) = category {
        select_by_query(session, query).await;
    }
    session.set_base_price(price);

    let breakdown = session.breakdown();
    let selected = session.selected_category();
    if json {
        println!("{}", render_json(&breakdown, selected.as_ref(), currency)?);
    } else {
        println!("{}", render_breakdown(&breakdown, selected.as_ref(), currency));
    }
    Ok(())
}
