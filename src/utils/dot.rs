//! Helpers for Graphviz DOT output.

use std::fmt::Write;

/// Escapes a string for use inside a quoted DOT label or identifier.
///
/// # Examples
///
/// ```rust,ignore
/// use bindscope::utils::escape_dot;
///
/// assert_eq!(escape_dot("say \"hi\""), "say \\\"hi\\\"");
/// ```
#[must_use]
pub fn escape_dot(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "")
        .replace('<', "\\<")
        .replace('>', "\\>")
}

/// Builds a left-justified multi-line node label.
///
/// Every line, the header included, is escaped and terminated with `\l`.
#[must_use]
pub fn left_justified_label<I, S>(header: &str, lines: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut label = escape_dot(header);
    label.push_str("\\l");
    for line in lines {
        let _ = write!(label, "{}\\l", escape_dot(line.as_ref()));
    }
    label
}
