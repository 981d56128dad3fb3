use super::model::{MeltedCell, RawRow, RawTable};

/// Melt a wide table into (country, year, raw) cells, row-major.
///
/// Cells are copied verbatim; parsing is left to the normalizer.
pub fn melt(table: &RawTable) -> Vec<MeltedCell> {
    let mut cells = Vec::with_capacity(table.rows.len() * table.years.len());
    for row in &table.rows {
        for (i, year) in table.years.iter().enumerate() {
            cells.push(MeltedCell {
                country: row.country.clone(),
                year: year.clone(),
                raw: row.cells.get(i).cloned().unwrap_or_default(),
            });
        }
    }
    cells
}

/// Rebuild a wide table from melted cells.
///
/// Countries and years keep their order of first appearance; pairs absent
/// from `cells` become blank cells.
pub fn widen(name: &str, cells: &[MeltedCell]) -> RawTable {
    let mut years: Vec<String> = Vec::new();
    for cell in cells {
        if !years.contains(&cell.year) {
            years.push(cell.year.clone());
        }
    }

    let mut rows: Vec<RawRow> = Vec::new();
    for cell in cells {
        let col = years
            .iter()
            .position(|y| *y == cell.year)
            .unwrap_or_default();
        let row = match rows.iter().position(|r| r.country == cell.country) {
            Some(idx) => &mut rows[idx],
            None => {
                rows.push(RawRow {
                    country: cell.country.clone(),
                    cells: vec![String::new(); years.len()],
                });
                let last = rows.len() - 1;
                &mut rows[last]
            }
        };
        row.cells[col] = cell.raw.clone();
    }

    RawTable {
        name: name.to_string(),
        years,
        rows,
    }
}
