//! HTML entity escaping for the five significant characters.

/// Replace `&`, `<`, `>`, `"` and `'` with their entities.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

/// Reverse [`escape_html`], one entity at a time with `&amp;` first.
///
/// Sequential replacement means `&amp;lt;` decodes all the way to `<`.
pub fn unescape_html(s: &str) -> String {
    s.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#039;", "'")
}

/// Decode entities in a single left-to-right pass, so `&amp;lt;` becomes `&lt;`.
///
/// Handles the entities [`escape_html`] produces plus decimal `&#N;` references.
/// Anything else starting with `&` is kept as is.
pub fn decode_entities(s: &str) -> String {
    const NAMED: [(&str, char); 5] = [
        ("&amp;", '&'),
        ("&lt;", '<'),
        ("&gt;", '>'),
        ("&quot;", '"'),
        ("&#039;", '\''),
    ];

    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        rest = &rest[start..];
        let named = NAMED
            .iter()
            .find(|(entity, _)| rest.starts_with(entity))
            .map(|&(entity, c)| (entity.len(), c));
        match named.or_else(|| decimal_reference(rest)) {
            Some((len, c)) => {
                out.push(c);
                rest = &rest[len..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// `&#N;` at the start of `s`: byte length and the referenced char.
fn decimal_reference(s: &str) -> Option<(usize, char)> {
    let digits = s.strip_prefix("&#")?;
    let end = digits.find(';')?;
    let code = &digits[..end];
    if code.is_empty() || code.len() > 7 || !code.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let c = code.parse::<u32>().ok().and_then(char::from_u32)?;
    Some((2 + end + 1, c))
}
