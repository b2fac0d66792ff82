use analytics::Table;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table as TerminalTable};

const PRECISION: usize = 4;
const MISSING: &str = "-";

/// Renders a result table for the terminal. Multi-level column keys are joined with " / ".
pub fn render_table(table: &Table) -> TerminalTable {
    let mut rendered = TerminalTable::new();
    rendered
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    let mut header = vec![Cell::new(&table.index_name)];
    header.extend(table.columns.iter().map(|key| Cell::new(key.join(" / "))));
    rendered.set_header(header);

    for (label, cells) in table.rows() {
        let mut row = vec![Cell::new(label)];
        row.extend(cells.iter().map(|cell| {
            let text = match cell {
                Some(value) => format!("{:.*}", PRECISION, value),
                None => MISSING.to_string(),
            };
            Cell::new(text).set_alignment(CellAlignment::Right)
        }));
        rendered.add_row(row);
    }
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_cells_render_as_dash() {
        let table = Table::new(
            "Hour",
            vec!["Asset".to_string(), String::new()],
            vec!["0".to_string()],
            vec![vec!["ETHUSDT".to_string(), "Movement Strength".to_string()]],
            vec![vec![None]],
        );
        let text = render_table(&table).to_string();
        assert!(text.contains("ETHUSDT / Movement Strength"));
        assert!(text.contains(MISSING));
    }

    #[test]
    fn values_are_rounded() {
        let table = Table::new(
            "",
            vec![String::new()],
            vec!["BTCUSDT".to_string()],
            vec![vec!["BTCUSDT".to_string()]],
            vec![vec![Some(0.123456)]],
        );
        assert!(render_table(&table).to_string().contains("0.1235"));
    }
}
