//! ffmpeg filtergraph escaping
//!
//! User text reaches ffmpeg through two parsers. The filter option parser
//! treats `\ ' :` as special; the filtergraph parser treats `\ ' [ ] , ;`
//! as special. Text is escaped for the option level first, then the result
//! is escaped for the graph level. Arguments are passed to the process
//! directly, so no shell quoting is involved.

/// Escape a value for use inside a filter's option list
///
/// The option parser trims unescaped whitespace at both ends of a value, so
/// leading and trailing whitespace is escaped as well.
pub fn escape_option_value(value: &str) -> String {
    let lead_end = value.len() - value.trim_start().len();
    let trail_start = value.trim_end().len().max(lead_end);

    let mut out = String::with_capacity(value.len());
    for (i, c) in value.char_indices() {
        let edge_space = c.is_whitespace() && (i < lead_end || i >= trail_start);
        if edge_space || matches!(c, '\\' | '\'' | ':') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Escape a filter description for embedding in a filtergraph
pub fn escape_filtergraph(value: &str) -> String {
    escape_chars(value, &['\\', '\'', '[', ']', ',', ';'])
}

/// Escape arbitrary text for a filter option inside `-filter_complex`
///
/// Line breaks are folded into spaces, since a caption band holds one line.
pub fn escape_filter_text(text: &str) -> String {
    let single_line: String = text
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect();
    escape_filtergraph(&escape_option_value(&single_line))
}

fn escape_chars(value: &str, special: &[char]) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if special.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
