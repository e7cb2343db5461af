//! Table serialization: cell grids → GFM markdown.
//!
//! A table must enter the block stream as exactly one block at its geometric
//! position; serializing the grid here is what prevents its cells from being
//! scattered through the output as independent text fragments.

use crate::backend::TableRegion;

/// Serialize one table region to a GFM markdown table.
///
/// Merged cells (None or blank) are forward-filled column-wise with the value
/// above them, matching how row-spanning cells read visually. Rows are padded
/// to the widest row so the pipes line up. Returns `None` for an empty grid.
pub fn to_markdown(table: &TableRegion) -> Option<String> {
    if table.rows.is_empty() {
        return None;
    }

    let filled = fill_merged_cells(&table.rows);

    let max_cols = filled.iter().map(|r| r.len()).max().unwrap_or(0);
    if max_cols == 0 {
        return None;
    }

    let mut normalized: Vec<Vec<String>> = Vec::with_capacity(filled.len());
    for row in filled {
        let mut cells: Vec<String> = row
            .into_iter()
            .map(|c| c.map(|s| s.trim().to_string()).unwrap_or_default())
            .collect();
        cells.resize(max_cols, String::new());
        normalized.push(cells);
    }

    let mut lines = Vec::with_capacity(normalized.len() + 1);
    lines.push(format!("| {} |", normalized[0].join(" | ")));
    lines.push(format!("| {} |", vec!["---"; max_cols].join(" | ")));
    for row in &normalized[1..] {
        lines.push(format!("| {} |", row.join(" | ")));
    }

    Some(lines.join("\n"))
}

/// Forward-fill merged cells: an empty cell takes the last value seen above
/// it in the same column.
fn fill_merged_cells(rows: &[Vec<Option<String>>]) -> Vec<Vec<Option<String>>> {
    let max_cols = rows.iter().map(|r| r.len()).max().unwrap_or(0);
    let mut filled: Vec<Vec<Option<String>>> = rows.to_vec();

    for col in 0..max_cols {
        let mut last_value: Option<String> = None;
        for row in filled.iter_mut() {
            let Some(cell) = row.get_mut(col) else { continue };
            let is_blank = match cell {
                None => true,
                Some(s) => s.trim().is_empty(),
            };
            if is_blank {
                *cell = Some(last_value.clone().unwrap_or_default());
            } else {
                last_value = cell.clone();
            }
        }
    }

    filled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BBox;

    fn region(rows: Vec<Vec<Option<String>>>) -> TableRegion {
        TableRegion {
            bbox: BBox::new(0.0, 0.0, 100.0, 100.0),
            rows,
        }
    }

    fn cells(row: &[&str]) -> Vec<Option<String>> {
        row.iter().map(|s| Some(s.to_string())).collect()
    }

    #[test]
    fn basic_grid_renders_header_and_separator() {
        let t = region(vec![
            cells(&["Name", "Qty"]),
            cells(&["Bolt", "40"]),
            cells(&["Nut", "12"]),
        ]);
        let md = to_markdown(&t).unwrap();
        assert_eq!(
            md,
            "| Name | Qty |\n| --- | --- |\n| Bolt | 40 |\n| Nut | 12 |"
        );
    }

    #[test]
    fn merged_cells_are_forward_filled() {
        let t = region(vec![
            cells(&["Region", "City"]),
            cells(&["West", "Lisbon"]),
            vec![None, Some("Porto".into())],
        ]);
        let md = to_markdown(&t).unwrap();
        assert!(md.contains("| West | Porto |"), "got:\n{md}");
    }

    #[test]
    fn ragged_rows_are_padded() {
        let t = region(vec![cells(&["A", "B", "C"]), cells(&["1"])]);
        let md = to_markdown(&t).unwrap();
        // The short row is padded out to the full column count.
        assert!(md.lines().count() == 3);
        let last = md.lines().last().unwrap();
        assert_eq!(last.matches('|').count(), 4, "got: {last}");
    }

    #[test]
    fn empty_grid_yields_nothing() {
        assert!(to_markdown(&region(vec![])).is_none());
        assert!(to_markdown(&region(vec![vec![], vec![]])).is_none());
    }

    #[test]
    fn cell_whitespace_is_trimmed() {
        let t = region(vec![cells(&["  a  ", "b"]), cells(&["c", " d "])]);
        let md = to_markdown(&t).unwrap();
        assert!(md.starts_with("| a | b |"));
    }
}
