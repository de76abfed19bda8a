//! Plain-text rendering of a grid page.

use datagrid::DataGrid;
use datagrid::group::GridItem;
use datagrid::model::Column;
use datagrid::sort::Direction;

/// Render the current page as an aligned text table with a status line.
pub fn page(grid: &DataGrid) -> String {
    let store = grid.store();
    let view = grid.view();
    let columns = store.visible_columns();
    let mut lines = Vec::with_capacity(view.page.len() + 4);

    let header: Vec<String> = columns
        .iter()
        .map(|c| {
            let marker = match grid.sort().direction_of(&c.id) {
                Some(Direction::Asc) => " ^",
                Some(Direction::Desc) => " v",
                None => "",
            };
            cell(&format!("{}{}", c.header, marker), c)
        })
        .collect();
    lines.push(header.join(" | ").trim_end().to_string());
    let rule: Vec<String> = columns.iter().map(|c| "-".repeat(c.width.into())).collect();
    lines.push(rule.join("-+-"));

    for item in view.page.items() {
        match item {
            GridItem::GroupHeader {
                key,
                count,
                collapsed,
            } => {
                let marker = if *collapsed { "+" } else { "-" };
                let mut line = format!("{marker} {key} ({count})");
                if let Some(group) = view.groups.iter().find(|g| &g.key == key) {
                    for agg in &group.aggregates {
                        line.push_str(&format!("  {}={}", agg.label, agg.value));
                    }
                }
                lines.push(line);
            }
            GridItem::Row { id } => {
                let Some(record) = store.get(id.as_str()) else {
                    continue;
                };
                let check = if grid.selection().is_selected(id.as_str()) {
                    "*"
                } else {
                    " "
                };
                let cells: Vec<String> = columns.iter().map(|c| cell(&c.cell(record).to_string(), c)).collect();
                lines.push(format!("{check}{}", cells.join(" | ").trim_end()));
            }
        }
    }

    let summary = view.selection_summary();
    lines.push(String::new());
    lines.push(format!(
        "page {}/{} | {} of {} rows | {} selected ({:?})",
        view.page.page() + usize::from(view.page.total_pages() > 0),
        view.page.total_pages(),
        view.filtered_count(),
        store.len(),
        summary.selected_ids.len(),
        summary.tri_state
    ));
    lines.join("\n")
}

/// Pad or truncate text to the column width.
fn cell(text: &str, column: &Column) -> String {
    let width = usize::from(column.width);
    let count = text.chars().count();
    if count > width {
        let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
        cut.push('~');
        cut
    } else {
        format!("{text:<width$}")
    }
}
