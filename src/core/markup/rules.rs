//! The ordered markdown rule table plus inline code and list/paragraph post-processing.
//!
//! Rules run in declaration order over the whole text. Later rules see the output of
//! earlier ones: bold must run before emphasis, and list wrapping relies on list markers
//! already being `<li>` elements.

use std::sync::OnceLock;

use regex::{Captures, Regex};

use super::fence;
use super::{ConvertError, PatternCell, pattern};

/// How a rule rewrites a match.
#[derive(Debug, Clone, Copy)]
enum Transform {
    /// Regex replacement template (`${1}` etc.).
    Template(&'static str),
    /// `<h{n}>` where n is the length of the hash run.
    Heading,
}

const RULES: &[(&str, &str, Transform)] = &[
    ("heading", r"(?m)^(\s*)#{1,6}\s+(.+)$", Transform::Heading),
    ("bold", r"\*\*(.+?)\*\*", Transform::Template("<strong>${1}</strong>")),
    ("emphasis", r"\*(.+?)\*", Transform::Template("<em>${1}</em>")),
    ("unordered_item", r"(?m)^\s*[-*+]\s+(.+)$", Transform::Template("<li>${1}</li>")),
    ("ordered_item", r"(?m)^(\d+)\.\s+(.+)$", Transform::Template("<li>${2}</li>")),
    (
        "link",
        r"\[(.+?)\]\((.+?)\)",
        Transform::Template(r#"<a href="${2}">${1}</a>"#),
    ),
    ("horizontal_rule", r"(?m)^(\s*[-_*]){3,}\s*$", Transform::Template("<hr>")),
];

/// One entry of the markdown rule table.
#[derive(Debug)]
pub struct Rule {
    name: &'static str,
    pattern: Regex,
    transform: Transform,
}

impl Rule {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Rewrite every match of this rule in `text`.
    pub fn apply(&self, text: &str) -> String {
        match self.transform {
            Transform::Template(template) => {
                self.pattern.replace_all(text, template).into_owned()
            }
            Transform::Heading => self.pattern.replace_all(text, heading).into_owned(),
        }
    }
}

fn heading(caps: &Captures) -> String {
    let indent = caps.get(1).map_or("", |m| m.as_str());
    let level = caps[0][indent.len()..]
        .chars()
        .take_while(|c| *c == '#')
        .count();
    let content = caps.get(2).map_or("", |m| m.as_str()).trim();
    format!("{}<h{}>{}</h{}>", indent, level, content, level)
}

static MARKDOWN_RULES: OnceLock<Result<Vec<Rule>, regex::Error>> = OnceLock::new();

/// The markdown rules in the order they must run.
pub fn markdown_rules() -> Result<&'static [Rule], ConvertError> {
    MARKDOWN_RULES
        .get_or_init(|| {
            RULES
                .iter()
                .map(|&(name, source, transform)| {
                    Regex::new(source).map(|pattern| Rule {
                        name,
                        pattern,
                        transform,
                    })
                })
                .collect()
        })
        .as_deref()
        .map_err(|e| ConvertError::Pattern(e.clone()))
}

static INLINE_CODE: PatternCell = PatternCell::new();
static LIST_ITEM: PatternCell = PatternCell::new();
static LIST_SEAM: PatternCell = PatternCell::new();

/// Single-backtick spans without embedded backticks or newlines become `<code>`.
pub fn inline_code(text: &str) -> Result<String, ConvertError> {
    let re = pattern(&INLINE_CODE, r"`([^`\n]+)`")?;
    Ok(re.replace_all(text, "<code>${1}</code>").into_owned())
}

/// Wrap each `<li>` in `<ul>`, then merge lists separated by at most one line break.
pub fn wrap_lists(html: &str) -> Result<String, ConvertError> {
    let item = pattern(&LIST_ITEM, r"<li>(.+?)</li>")?;
    let seam = pattern(&LIST_SEAM, r"</ul>\r?\n?<ul>")?;
    let wrapped = item.replace_all(html, "<ul>${0}</ul>");
    Ok(seam.replace_all(&wrapped, "").into_owned())
}

/// Initials of block-level tags a line may already start with.
/// The file-path label is sealed with its code block, so `<div>` never reaches this stage.
const BLOCK_TAG_INITIALS: &[u8] = b"houpcta";

fn starts_with_block(line: &str) -> bool {
    if fence::starts_sealed(line) {
        return true;
    }
    let mut bytes = line.bytes();
    bytes.next() == Some(b'<') && bytes.next().is_some_and(|b| BLOCK_TAG_INITIALS.contains(&b))
}

/// Wrap every non-empty line that does not start with a block-level tag in `<p>`.
pub fn wrap_paragraphs(html: &str) -> String {
    html.split('\n')
        .map(|line| {
            let body = line.strip_suffix('\r').unwrap_or(line);
            if body.is_empty() || starts_with_block(body) {
                line.to_string()
            } else {
                format!("<p>{}</p>{}", body, &line[body.len()..])
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
