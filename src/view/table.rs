use std::fmt::Write;

/// Rows of display text under fixed headers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
    pub footer: Option<Vec<String>>,
}

impl Table {
    pub fn new(headers: &[&'static str]) -> Self {
        Self { headers: headers.to_vec(), rows: Vec::new(), footer: None }
    }

    pub fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    /// Plain-text rendering with padded columns.
    pub fn render(&self, empty: &str) -> String {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in self.rows.iter().chain(self.footer.iter()) {
            for (i, cell) in row.iter().enumerate() {
                if let Some(w) = widths.get_mut(i) {
                    *w = (*w).max(cell.chars().count());
                }
            }
        }

        let mut out = String::new();
        let line = |cells: Vec<&str>| -> String {
            cells
                .iter()
                .zip(&widths)
                .map(|(c, w)| format!("{:<width$}", c, width = *w))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        };
        let rule: String = widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("  ");
        let _ = writeln!(out, "{}", line(self.headers.to_vec()));
        let _ = writeln!(out, "{}", rule);
        if self.rows.is_empty() {
            let _ = writeln!(out, "{}", empty);
        }
        for row in &self.rows {
            let _ = writeln!(out, "{}", line(row.iter().map(String::as_str).collect()));
        }
        if let Some(footer) = &self.footer {
            let _ = writeln!(out, "{}", rule);
            let _ = writeln!(out, "{}", line(footer.iter().map(String::as_str).collect()));
        }
        out
    }
}
