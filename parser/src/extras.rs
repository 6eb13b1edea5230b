//! Parser for the extras mini-language: the parenthesized modifier list
//! trailing a declaration's description comment.
//!
//! The list mixes colon-tagged modifiers (`calc:0.25*A`, `unit:C`) with bare
//! `key=label` enumeration entries (`0=normal`, `1=alarm state [alarm]`) in
//! one comma-separated block. Each token becomes an [`ExtraToken`] so that
//! later stages match exhaustively instead of string-testing.

use epicsgen_dsl::core::FileId;
use epicsgen_dsl::diagnostic::{Diagnostic, Label};
use epicsgen_dsl::param::ExtraToken;
use epicsgen_problems::Problem;

/// Tags understood by the generators. Anything else raises a warning and is
/// otherwise ignored, keeping the comment grammar forward compatible.
const KNOWN_TAGS: [&str; 11] = [
    "calc", "calcread", "calcwrite", "calclink", "prec", "unit", "low", "high", "archive",
    "scale", "offset",
];

/// Splits a raw comment into the leading free-text description and the
/// extras block. The description runs to the first `(`; the extras block is
/// the text inside that parenthesis and its match (or the end of the
/// comment when unbalanced).
pub(crate) fn split_comment(comment: &str) -> (&str, Option<&str>) {
    let open = match comment.find('(') {
        Some(open) => open,
        None => return (comment, None),
    };

    let description = &comment[..open];
    let rest = &comment[open + 1..];

    let mut depth = 1usize;
    for (index, ch) in rest.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return (description, Some(&rest[..index]));
                }
            }
            _ => {}
        }
    }

    (description, Some(rest))
}

/// Parses the inside of an extras block into tokens. Malformed enumeration
/// entries and unrecognized tokens are dropped with a warning.
pub(crate) fn parse_extras(
    inner: &str,
    file_id: &FileId,
    line: usize,
    warnings: &mut Vec<Diagnostic>,
) -> Vec<ExtraToken> {
    let mut tokens = vec![];

    for raw in split_top_level(inner) {
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }

        // An integer key before '=' makes the token an enumeration entry
        // even when the label also contains a colon, as in "0=rate: high".
        if let Some((key, value)) = raw.split_once('=') {
            if key.trim().parse::<i64>().is_ok() {
                match parse_enum_entry(key, value) {
                    Some(token) => tokens.push(token),
                    None => warnings.push(Diagnostic::problem(
                        Problem::MalformedOption,
                        Label::line(file_id.clone(), line, format!("in option entry '{}'", raw)),
                    )),
                }
                continue;
            }
        }

        if let Some((tag, value)) = raw.split_once(':') {
            let tag = tag.trim();
            if KNOWN_TAGS.contains(&tag) {
                tokens.push(ExtraToken::Tag {
                    name: tag.to_string(),
                    value: value.trim().to_string(),
                });
            } else {
                warnings.push(unrecognized(file_id, line, raw));
            }
            continue;
        }

        if raw.contains('=') {
            warnings.push(Diagnostic::problem(
                Problem::MalformedOption,
                Label::line(file_id.clone(), line, format!("in option entry '{}'", raw)),
            ));
            continue;
        }

        warnings.push(unrecognized(file_id, line, raw));
    }

    tokens
}

fn unrecognized(file_id: &FileId, line: usize, token: &str) -> Diagnostic {
    Diagnostic::problem(
        Problem::UnrecognizedExtra,
        Label::line(file_id.clone(), line, format!("in extras token '{}'", token)),
    )
}

/// Parses one `key=label` or `key=label [alarm]` entry.
fn parse_enum_entry(key: &str, value: &str) -> Option<ExtraToken> {
    let key: i64 = key.trim().parse().ok()?;

    // The label runs to an optional trailing marker such as "[alarm]".
    let (label, marker) = match value.find(['[', '(']) {
        Some(pos) => (&value[..pos], &value[pos..]),
        None => (value, ""),
    };

    Some(ExtraToken::Enum {
        key,
        label: label.trim().to_string(),
        alarm: marker.contains("alarm"),
    })
}

/// Splits on commas that are not nested inside parentheses, so that
/// calculation expressions like `calc:A*10^(3-B)` survive intact.
fn split_top_level(text: &str) -> Vec<&str> {
    let mut parts = vec![];
    let mut depth = 0usize;
    let mut start = 0usize;

    for (index, ch) in text.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&text[start..index]);
                start = index + 1;
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);

    parts
}
