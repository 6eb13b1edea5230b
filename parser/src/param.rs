//! Turns a scanned declaration into a [`Param`].
//!
//! The argument list splits on top-level commas, tokens zip against the
//! positional field list for the declaration's kind, and numeric fields use
//! the same base detection as the source literals (`0x` hex, decimal
//! otherwise). The trailing comment contributes the description and the
//! extras block.

use epicsgen_dsl::core::FileId;
use epicsgen_dsl::diagnostic::{Diagnostic, Label};
use epicsgen_dsl::param::{
    truncate_description, ArchiveMode, ArchivePolicy, Conversion, ExtraToken, Layout, Param,
    ParamKind,
};
use epicsgen_problems::Problem;

use crate::extras::{parse_extras, split_comment};
use crate::scanner::RawDeclaration;

/// The fixed positional field list for each kind. A declaration may carry
/// one extra trailing token only when it is a conversion constant.
fn field_names(kind: ParamKind) -> &'static [&'static str] {
    match kind {
        ParamKind::Status | ParamKind::Counter | ParamKind::Temperature | ParamKind::Upgrade => {
            &["name", "offset", "width", "bit_offset"]
        }
        ParamKind::Config => &[
            "name",
            "section",
            "section_offset",
            "width",
            "bit_offset",
            "default",
        ],
        ParamKind::ChannelConfig => &[
            "name",
            "channel",
            "section",
            "section_offset",
            "width",
            "bit_offset",
            "default",
        ],
        ParamKind::MetaConfig => &["name", "width", "default"],
        ParamKind::PreAmpConfig | ParamKind::PreAmpTrigger => {
            &["name", "offset", "width", "bit_offset", "default"]
        }
    }
}

pub(crate) fn parse_declaration(
    decl: &RawDeclaration,
    file_id: &FileId,
    warnings: &mut Vec<Diagnostic>,
) -> Result<Param, Diagnostic> {
    let tokens = split_args(&decl.args);
    let fields = field_names(decl.kind);

    let conversion = if tokens.len() == fields.len() {
        Conversion::default()
    } else if tokens.len() == fields.len() + 1 && decl.kind != ParamKind::MetaConfig {
        match parse_conversion(tokens.last().map(String::as_str).unwrap_or_default()) {
            Some(conversion) => conversion,
            None => return Err(field_count_mismatch(decl, file_id, fields.len(), tokens.len())),
        }
    } else {
        return Err(field_count_mismatch(decl, file_id, fields.len(), tokens.len()));
    };

    let name = tokens[0].clone();
    let int = |position: usize| parse_int(&tokens[position], fields[position], decl, file_id);
    let width_at = |position: usize| -> Result<u8, Diagnostic> {
        let width = int(position)?;
        if !(1..=32).contains(&width) {
            return Err(invalid_number(decl, file_id, fields[position], &tokens[position]));
        }
        Ok(width as u8)
    };
    let narrow = |position: usize| -> Result<u8, Diagnostic> {
        let value = int(position)?;
        u8::try_from(value)
            .map_err(|_| invalid_number(decl, file_id, fields[position], &tokens[position]))
    };
    let wide = |position: usize| -> Result<u32, Diagnostic> {
        let value = int(position)?;
        u32::try_from(value)
            .map_err(|_| invalid_number(decl, file_id, fields[position], &tokens[position]))
    };
    let section_at = |position: usize| -> Result<char, Diagnostic> {
        let token = &tokens[position];
        let mut chars = token.chars();
        match (chars.next(), chars.next()) {
            (Some(section), None) => Ok(section),
            _ => Err(invalid_number(decl, file_id, fields[position], token)),
        }
    };

    let (layout, default) = match decl.kind {
        ParamKind::Status | ParamKind::Counter | ParamKind::Temperature | ParamKind::Upgrade => (
            Layout::Register {
                offset: wide(1)?,
                width: width_at(2)?,
                bit_offset: narrow(3)?,
            },
            None,
        ),
        ParamKind::Config => (
            Layout::Section {
                section: section_at(1)?,
                section_offset: wide(2)?,
                width: width_at(3)?,
                bit_offset: narrow(4)?,
            },
            Some(int(5)?),
        ),
        ParamKind::ChannelConfig => (
            Layout::Channel {
                channel: narrow(1)?,
                section: section_at(2)?,
                section_offset: wide(3)?,
                width: width_at(4)?,
                bit_offset: narrow(5)?,
            },
            Some(int(6)?),
        ),
        ParamKind::MetaConfig => (Layout::Meta { width: width_at(1)? }, Some(int(2)?)),
        ParamKind::PreAmpConfig | ParamKind::PreAmpTrigger => (
            Layout::Register {
                offset: wide(1)?,
                width: width_at(2)?,
                bit_offset: narrow(3)?,
            },
            Some(int(4)?),
        ),
    };

    let mut param = Param {
        kind: decl.kind,
        name,
        layout,
        default,
        description: String::new(),
        conversion,
        options: vec![],
        scale: None,
        offset_term: None,
        precision: None,
        unit: None,
        low_limit: None,
        high_limit: None,
        calc_read: None,
        calc_write: None,
        calc_link: None,
        archive: None,
        direction: decl.kind.direction(),
        line: decl.line,
    };

    apply_comment(&mut param, decl, file_id, warnings);

    Ok(param)
}

/// Applies the description and extras from the trailing comment.
fn apply_comment(
    param: &mut Param,
    decl: &RawDeclaration,
    file_id: &FileId,
    warnings: &mut Vec<Diagnostic>,
) {
    let comment = decl.comment.as_deref().unwrap_or_default();
    let (description, extras) = split_comment(comment);

    let (description, truncated) = truncate_description(description);
    if description.is_empty() {
        warnings.push(
            Diagnostic::problem(
                Problem::MissingDescription,
                Label::line(file_id.clone(), decl.line, "declaration has no description"),
            )
            .with_context("parameter", &param.name),
        );
    }
    if truncated {
        warnings.push(
            Diagnostic::problem(
                Problem::TruncatedDescription,
                Label::line(file_id.clone(), decl.line, "description truncated to 28 chars"),
            )
            .with_context("parameter", &param.name),
        );
    }
    param.description = description;

    let tokens = match extras {
        Some(inner) => {
            let before = warnings.len();
            let tokens = parse_extras(inner, file_id, decl.line, warnings);
            // Late context: the extras parser does not know the name.
            for warning in warnings.iter_mut().skip(before) {
                *warning = warning.clone().with_context("parameter", &param.name);
            }
            tokens
        }
        None => vec![],
    };

    for token in tokens {
        match token {
            ExtraToken::Tag { name, value } => apply_tag(param, &name, value, decl, file_id, warnings),
            ExtraToken::Enum { key, label, alarm } => {
                param.options.push(epicsgen_dsl::param::EnumOption { key, label, alarm });
            }
        }
    }
}

fn apply_tag(
    param: &mut Param,
    name: &str,
    value: String,
    decl: &RawDeclaration,
    file_id: &FileId,
    warnings: &mut Vec<Diagnostic>,
) {
    let param_name = param.name.clone();
    let mut bad_value = |tag: &str, value: &str| {
        warnings.push(
            Diagnostic::problem(
                Problem::UnrecognizedExtra,
                Label::line(
                    file_id.clone(),
                    decl.line,
                    format!("in value '{}' of tag '{}'", value, tag),
                ),
            )
            .with_context("parameter", &param_name),
        );
    };

    match name {
        "calc" | "calcread" => param.calc_read = Some(value),
        "calcwrite" => param.calc_write = Some(value),
        "calclink" => param.calc_link = Some(value),
        "prec" => param.precision = Some(value),
        "unit" => param.unit = Some(value),
        "low" => param.low_limit = Some(value),
        "high" => param.high_limit = Some(value),
        "archive" => match value.as_str() {
            "monitor" => param.archive = Some(ArchivePolicy::with_mode(ArchiveMode::Monitor)),
            "scan" => param.archive = Some(ArchivePolicy::with_mode(ArchiveMode::Scan)),
            other => bad_value("archive", other),
        },
        "scale" => match value.parse::<f64>() {
            Ok(scale) => param.scale = Some(scale),
            Err(_) => bad_value("scale", &value),
        },
        "offset" => match value.parse::<f64>() {
            Ok(offset) => param.offset_term = Some(offset),
            Err(_) => bad_value("offset", &value),
        },
        // The extras parser only forwards known tags.
        _ => {}
    }
}

/// Splits the raw argument list on top-level commas. Commas inside quotes do
/// not split; quoting and surrounding whitespace are stripped from each
/// token.
fn split_args(args: &str) -> Vec<String> {
    let mut tokens = vec![];
    let mut current = String::new();
    let mut quote: Option<char> = None;

    for ch in args.chars() {
        match quote {
            Some(open) => {
                if ch == open {
                    quote = None;
                }
                current.push(ch);
            }
            None => match ch {
                '"' | '\'' => {
                    quote = Some(ch);
                    current.push(ch);
                }
                ',' => {
                    tokens.push(clean_token(&current));
                    current.clear();
                }
                _ => current.push(ch),
            },
        }
    }

    let last = clean_token(&current);
    if !(last.is_empty() && tokens.is_empty()) {
        tokens.push(last);
    }

    tokens
}

fn clean_token(token: &str) -> String {
    token
        .trim()
        .trim_matches(|ch| ch == '"' || ch == '\'')
        .to_string()
}

/// Coerces a numeric token using the source's base detection: a `0x` prefix
/// means hexadecimal, everything else is decimal. A leading `-` is allowed.
fn parse_int(
    token: &str,
    field: &str,
    decl: &RawDeclaration,
    file_id: &FileId,
) -> Result<i64, Diagnostic> {
    let (negative, digits) = match token.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, token),
    };

    let parsed = match digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        Some(hex) => i64::from_str_radix(hex, 16),
        None => digits.parse::<i64>(),
    };

    match parsed {
        Ok(value) => Ok(if negative { -value } else { value }),
        Err(_) => Err(invalid_number(decl, file_id, field, token)),
    }
}

fn parse_conversion(token: &str) -> Option<Conversion> {
    match token {
        "CONV_UNSIGN" => Some(Conversion::Unsigned),
        "CONV_SIGN_2COMP" => Some(Conversion::TwosComplement),
        "CONV_SIGN_MAGN" => Some(Conversion::SignMagnitude),
        _ => None,
    }
}

fn field_count_mismatch(
    decl: &RawDeclaration,
    file_id: &FileId,
    expected: usize,
    actual: usize,
) -> Diagnostic {
    Diagnostic::problem(
        Problem::FieldCountMismatch,
        Label::line(
            file_id.clone(),
            decl.line,
            format!("expected {} arguments, found {}", expected, actual),
        ),
    )
}

fn invalid_number(
    decl: &RawDeclaration,
    file_id: &FileId,
    field: &str,
    token: &str,
) -> Diagnostic {
    Diagnostic::problem(
        Problem::InvalidNumber,
        Label::line(
            file_id.clone(),
            decl.line,
            format!("in field '{}', found '{}'", field, token),
        ),
    )
}
