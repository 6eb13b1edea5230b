//! The parameter model: one declared device register or derived value.
//!
//! A [`Param`] is constructed once per matched declaration line during a
//! single pass over one source unit and is immutable thereafter. Regenerating
//! output means reparsing the source.

/// Capacity of the DESC string field in the generated records. Descriptions
/// are hard-truncated to this many characters.
pub const DESCRIPTION_LEN: usize = 28;

/// Maximum number of enumerated options. The multi-state record type has
/// sixteen value/label slots.
pub const MAX_OPTIONS: usize = 16;

/// The nine recognized parameter kinds. The kind determines which positional
/// field layout applies and whether the parameter is read-only.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ParamKind {
    Status,
    Counter,
    Config,
    ChannelConfig,
    MetaConfig,
    Temperature,
    Upgrade,
    PreAmpConfig,
    PreAmpTrigger,
}

impl ParamKind {
    /// Returns true for the config-like kinds that generate the
    /// bidirectional read/write record pattern.
    pub fn is_writable(&self) -> bool {
        matches!(
            self,
            ParamKind::Config
                | ParamKind::ChannelConfig
                | ParamKind::MetaConfig
                | ParamKind::PreAmpConfig
                | ParamKind::PreAmpTrigger
        )
    }

    pub fn direction(&self) -> Direction {
        if self.is_writable() {
            Direction::InOut
        } else {
            Direction::In
        }
    }

    /// The group name used in file names of the auxiliary artifacts
    /// (screens, snapshot tables).
    pub fn group(&self) -> &'static str {
        match self {
            ParamKind::Status => "status",
            ParamKind::Counter => "counter",
            ParamKind::Config
            | ParamKind::ChannelConfig
            | ParamKind::MetaConfig
            | ParamKind::PreAmpConfig
            | ParamKind::PreAmpTrigger => "config",
            ParamKind::Temperature => "temp",
            ParamKind::Upgrade => "upgrade",
        }
    }
}

/// Whether external consumers only read the parameter or also write it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Direction {
    In,
    InOut,
}

/// Where the parameter lives in the device register map.
///
/// The layout is carried through from the declaration but only the bit width
/// participates in generation; addressing in the generated records is by
/// parameter name.
#[derive(Clone, Debug, PartialEq)]
pub enum Layout {
    /// Plain register layout: status, counter, temperature, upgrade and
    /// pre-amp kinds.
    Register {
        offset: u32,
        width: u8,
        bit_offset: u8,
    },
    /// Sectioned configuration layout.
    Section {
        section: char,
        section_offset: u32,
        width: u8,
        bit_offset: u8,
    },
    /// Per-channel configuration layout.
    Channel {
        channel: u8,
        section: char,
        section_offset: u32,
        width: u8,
        bit_offset: u8,
    },
    /// Meta configuration: a width and a default, no register address.
    Meta { width: u8 },
}

impl Layout {
    pub fn width(&self) -> u8 {
        match self {
            Layout::Register { width, .. }
            | Layout::Section { width, .. }
            | Layout::Channel { width, .. }
            | Layout::Meta { width } => *width,
        }
    }
}

/// Signedness of the raw register value. Affects the numeric range used for
/// bounds generation.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Conversion {
    #[default]
    Unsigned,
    TwosComplement,
    SignMagnitude,
}

/// One entry of an enumerated (two-state or multi-state) interpretation of
/// the raw integer value.
#[derive(Clone, Debug, PartialEq)]
pub struct EnumOption {
    pub key: i64,
    pub label: String,
    /// When set, the encoded state raises a major-severity alarm.
    pub alarm: bool,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ArchiveMode {
    Monitor,
    Scan,
}

/// Historical-logging cadence attached to the front-end record.
#[derive(Clone, Debug, PartialEq)]
pub struct ArchivePolicy {
    pub mode: ArchiveMode,
    pub period: String,
    pub fields: String,
}

impl ArchivePolicy {
    /// The policy implied by a bare `archive:monitor` or `archive:scan`
    /// extras token.
    pub fn with_mode(mode: ArchiveMode) -> Self {
        Self {
            mode,
            period: String::from("00:00:01"),
            fields: String::from("VAL"),
        }
    }
}

/// One token of the extras mini-language: either a colon-tagged modifier or
/// a bare `key=label` enumeration entry.
#[derive(Clone, Debug, PartialEq)]
pub enum ExtraToken {
    Tag { name: String, value: String },
    Enum { key: i64, label: String, alarm: bool },
}

/// One declared device register or derived value, the unit of compilation.
#[derive(Clone, Debug)]
pub struct Param {
    pub kind: ParamKind,
    /// Unique within one source unit; used verbatim as a name suffix in
    /// every generated artifact.
    pub name: String,
    pub layout: Layout,
    /// Present for all writable kinds, absent for read-only kinds.
    pub default: Option<i64>,
    /// Already truncated to [`DESCRIPTION_LEN`] characters.
    pub description: String,
    pub conversion: Conversion,
    /// Ordered as declared; empty means a plain integer or scaled value.
    pub options: Vec<EnumOption>,
    pub scale: Option<f64>,
    pub offset_term: Option<f64>,
    pub precision: Option<String>,
    pub unit: Option<String>,
    pub low_limit: Option<String>,
    pub high_limit: Option<String>,
    pub calc_read: Option<String>,
    pub calc_write: Option<String>,
    pub calc_link: Option<String>,
    pub archive: Option<ArchivePolicy>,
    pub direction: Direction,
    /// Line of the declaration in the source unit (1-indexed).
    pub line: usize,
}

impl Param {
    /// Looks up the declaration-order position of the option whose key
    /// equals the given value. The position, not the key, is the selector
    /// index used by the default field of multi-state records.
    pub fn option_position(&self, key: i64) -> Option<usize> {
        self.options.iter().position(|o| o.key == key)
    }
}

/// Hard-truncates a description to [`DESCRIPTION_LEN`] characters, returning
/// the truncated text and whether anything was cut. Truncation is idempotent.
pub fn truncate_description(description: &str) -> (String, bool) {
    let trimmed = description.trim();
    if trimmed.chars().count() <= DESCRIPTION_LEN {
        (trimmed.to_string(), false)
    } else {
        // The cut can land right after a space; trim it so the result never
        // ends in whitespace and re-truncation leaves it untouched.
        let cut: String = trimmed.chars().take(DESCRIPTION_LEN).collect();
        (cut.trim_end().to_string(), true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_description_when_short_then_unchanged() {
        let (desc, truncated) = truncate_description("Acquiring data");

        assert_eq!(desc, "Acquiring data");
        assert!(!truncated);
    }

    #[test]
    fn truncate_description_when_long_then_exactly_28_chars() {
        let (desc, truncated) =
            truncate_description("A very long description that does not fit the field");

        assert_eq!(desc.chars().count(), DESCRIPTION_LEN);
        assert_eq!(desc, "A very long description that");
        assert!(truncated);
    }

    #[test]
    fn truncate_description_when_applied_twice_then_idempotent() {
        let (once, _) =
            truncate_description("A very long description that does not fit the field");
        let (twice, truncated_again) = truncate_description(&once);

        assert_eq!(once, twice);
        assert!(!truncated_again);
    }

    #[test]
    fn truncate_description_when_cut_lands_on_space_then_no_trailing_space() {
        // The 28th character of this description is a space.
        let (once, truncated) = truncate_description("abcdefghijklmnopqrstuvwxyza bcdef");

        assert_eq!(once, "abcdefghijklmnopqrstuvwxyza");
        assert!(truncated);

        let (twice, truncated_again) = truncate_description(&once);
        assert_eq!(once, twice);
        assert!(!truncated_again);
    }

    #[test]
    fn param_kind_when_config_like_then_writable() {
        assert!(ParamKind::Config.is_writable());
        assert!(ParamKind::ChannelConfig.is_writable());
        assert!(ParamKind::MetaConfig.is_writable());
        assert!(ParamKind::PreAmpConfig.is_writable());
        assert!(ParamKind::PreAmpTrigger.is_writable());
        assert!(!ParamKind::Status.is_writable());
        assert!(!ParamKind::Counter.is_writable());
        assert!(!ParamKind::Temperature.is_writable());
        assert!(!ParamKind::Upgrade.is_writable());
    }

    #[test]
    fn option_position_when_keys_out_of_order_then_position_not_key() {
        let param = Param {
            kind: ParamKind::Config,
            name: String::from("Mode"),
            layout: Layout::Section {
                section: 'F',
                section_offset: 0,
                width: 2,
                bit_offset: 0,
            },
            default: Some(2),
            description: String::from("Mode"),
            conversion: Conversion::Unsigned,
            options: vec![
                EnumOption {
                    key: 2,
                    label: String::from("fast"),
                    alarm: false,
                },
                EnumOption {
                    key: 0,
                    label: String::from("slow"),
                    alarm: false,
                },
            ],
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
            direction: Direction::InOut,
            line: 1,
        };

        assert_eq!(param.option_position(2), Some(0));
        assert_eq!(param.option_position(0), Some(1));
        assert_eq!(param.option_position(9), None);
    }
}
