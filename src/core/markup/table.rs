//! Pipe tables: header row, alignment row, one or more data rows.

use regex::Captures;

use super::{ConvertError, PatternCell, pattern};

/// Header row, alignment row of dashes/colons/pipes, then data rows. The last data row
/// may end at end of input.
const TABLE_PATTERN: &str =
    r"\|(.+)\|[\r\n]+\|([-:| ]+)\|[\r\n]+((?:\|.+\|(?:[\r\n]+|\z))+)";

static TABLE: PatternCell = PatternCell::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

impl Alignment {
    /// `:-:` is center, `-:` is right, anything else is left.
    pub fn from_token(token: &str) -> Self {
        if token.starts_with(':') && token.ends_with(':') {
            Alignment::Center
        } else if token.ends_with(':') {
            Alignment::Right
        } else {
            Alignment::Left
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
        }
    }
}

/// Trimmed, non-empty cells of a pipe-delimited row.
fn cells(row: &str) -> Vec<&str> {
    row.split('|')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .collect()
}

/// A parsed table. Rows keep their own cell count; nothing is padded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableBlock<'a> {
    pub headers: Vec<&'a str>,
    pub alignments: Vec<Alignment>,
    pub rows: Vec<Vec<&'a str>>,
}

impl<'a> TableBlock<'a> {
    /// Build from the inner text of the header row, the alignment row, and the data rows.
    pub fn parse(header: &'a str, alignment: &'a str, rows: &'a str) -> Self {
        Self {
            headers: cells(header),
            alignments: cells(alignment)
                .into_iter()
                .map(Alignment::from_token)
                .collect(),
            rows: rows.trim().split('\n').map(cells).collect(),
        }
    }

    /// Alignment for column `col`; columns past the alignment row are left-aligned.
    pub fn alignment(&self, col: usize) -> Alignment {
        self.alignments.get(col).copied().unwrap_or_default()
    }

    pub fn to_html(&self) -> String {
        let mut html = String::from("<table><thead><tr>");
        for (i, cell) in self.headers.iter().enumerate() {
            html.push_str(&format!(
                "<th style=\"text-align:{}\">{}</th>",
                self.alignment(i).as_str(),
                cell
            ));
        }
        html.push_str("</tr></thead><tbody>");
        for row in &self.rows {
            html.push_str("<tr>");
            for (i, cell) in row.iter().enumerate() {
                html.push_str(&format!(
                    "<td style=\"text-align:{}\">{}</td>",
                    self.alignment(i).as_str(),
                    cell
                ));
            }
            html.push_str("</tr>");
        }
        html.push_str("</tbody></table>");
        html
    }
}

/// Replace every table in `text` with `<table>` markup. Shapes that do not match are left as is.
pub fn convert_tables(text: &str) -> Result<String, ConvertError> {
    let re = pattern(&TABLE, TABLE_PATTERN)?;
    Ok(re
        .replace_all(text, |caps: &Captures| {
            let mut html = TableBlock::parse(
                caps.get(1).map_or("", |m| m.as_str()),
                caps.get(2).map_or("", |m| m.as_str()),
                caps.get(3).map_or("", |m| m.as_str()),
            )
            .to_html();
            // keep following text on its own line
            if caps[0].ends_with(['\n', '\r']) {
                html.push('\n');
            }
            html
        })
        .into_owned())
}
