use std::fmt;

/// Pipe-delimited text grid, every column as wide as its widest cell.
#[derive(Debug, PartialEq)]
pub(crate) struct Grid {
    header: Vec<String>,
    rows: Vec<Vec<String>>
}

impl Grid {
    pub(crate) fn new(header: &[String]) -> Grid {
        Grid {
            header: header.iter().map(|cell| single_line(cell)).collect(),
            rows: Vec::new()
        }
    }

    pub(crate) fn push_row<T: fmt::Display>(&mut self, cells: &[T]) {
        self.rows.push(cells.iter().map(|cell| single_line(&cell.to_string())).collect());
    }

    fn column_widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.header.iter().map(|cell| cell.chars().count()).collect();
        for row in self.rows.iter() {
            for (width, cell) in widths.iter_mut().zip(row.iter()) {
                *width = (*width).max(cell.chars().count());
            }
        }
        widths
    }
}

fn single_line(cell: &str) -> String {
    cell.replace("\r\n", " ").replace(['\r', '\n'], " ")
}

fn write_row(f: &mut fmt::Formatter, cells: &[String], widths: &[usize]) -> fmt::Result {
    for (cell, width) in cells.iter().zip(widths.iter()) {
        write!(f, "| {:<width$} ", cell, width = *width)?;
    }
    writeln!(f, "|")
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let widths = self.column_widths();
        write_row(f, &self.header, &widths)?;
        for width in widths.iter() {
            write!(f, "|{}", "-".repeat(width + 2))?;
        }
        writeln!(f, "|")?;
        for row in self.rows.iter() {
            write_row(f, row, &widths)?;
        }
        Ok(())
    }
}
