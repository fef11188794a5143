use super::ui;
use crate::core::{FeeSession, VehicleCategory};
use anyhow::Result;
use comfy_table::{Cell, CellAlignment};

pub fn render_categories(categories: &[VehicleCategory], selected: Option<&VehicleCategory>) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Id"), ui::header_cell("Category")]);

    for category in categories {
        let label = if selected.is_some_and(|s| s.id == category.id) {
            format!("{} *", category.label)
        } else {
            category.label.clone()
        };
        table.add_row(vec![
            Cell::new(category.id).set_alignment(CellAlignment::Right),
            Cell::new(label),
        ]);
    }

    table.to_string()
}

pub fn run(session: &FeeSession) -> Result<()> {
    let categories = session.categories();
    if categories.is_empty() {
        println!(
            "{}",
            ui::style_text("No vehicle categories available.", ui::StyleType::Error)
        );
        return Ok(());
    }

    println!(
        "{}",
        render_categories(&categories, session.selected_category().as_ref())
    );
    Ok(())
}
