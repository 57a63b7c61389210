//! The eight founder strains of the Collaborative Cross and their aliases.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Founder {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
}

impl Founder {
    pub const ALL: [Founder; 8] = [
        Founder::A,
        Founder::B,
        Founder::C,
        Founder::D,
        Founder::E,
        Founder::F,
        Founder::G,
        Founder::H,
    ];

    /// One-letter code used in haplotype files.
    pub fn code(self) -> &'static str {
        match self {
            Founder::A => "A",
            Founder::B => "B",
            Founder::C => "C",
            Founder::D => "D",
            Founder::E => "E",
            Founder::F => "F",
            Founder::G => "G",
            Founder::H => "H",
        }
    }

    /// Full strain name.
    pub fn strain(self) -> &'static str {
        match self {
            Founder::A => "A/J",
            Founder::B => "C57BL/6J",
            Founder::C => "129S1/SvImJ",
            Founder::D => "NOD/ShiLtJ",
            Founder::E => "NZO/HlLtJ",
            Founder::F => "CAST/EiJ",
            Founder::G => "PWK/PhJ",
            Founder::H => "WSB/EiJ",
        }
    }

    /// Conventional CC founder colour as RGB.
    pub fn color(self) -> (u8, u8, u8) {
        match self {
            Founder::A => (0xF0, 0xF0, 0x00),
            Founder::B => (0x80, 0x80, 0x80),
            Founder::C => (0xF0, 0x80, 0x80),
            Founder::D => (0x10, 0x10, 0xF0),
            Founder::E => (0x00, 0xA0, 0xF0),
            Founder::F => (0x00, 0xA0, 0x00),
            Founder::G => (0xF0, 0x00, 0x00),
            Founder::H => (0x90, 0x00, 0xE0),
        }
    }

    /// Resolve either a code or a strain name to its founder.
    pub fn lookup(alias: &str) -> Option<Founder> {
        alias_table().get(alias).copied()
    }
}

// Built once; both codes and strain names map to the founder.
fn alias_table() -> &'static HashMap<&'static str, Founder> {
    static TABLE: OnceLock<HashMap<&'static str, Founder>> = OnceLock::new();
    TABLE.get_or_init(|| {
        Founder::ALL
            .iter()
            .flat_map(|&f| [(f.code(), f), (f.strain(), f)])
            .collect()
    })
}

impl fmt::Display for Founder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Founder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Founder::lookup(s).ok_or_else(|| format!("unknown founder '{}'", s))
    }
}

/// Founder label carried by a segment. Labels that do not resolve to a
/// founder are kept verbatim when founder validation is switched off.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FounderLabel {
    Known(Founder),
    Unlisted(String),
}

impl FounderLabel {
    pub fn new(label: &str) -> Self {
        match Founder::lookup(label) {
            Some(founder) => FounderLabel::Known(founder),
            None => FounderLabel::Unlisted(label.to_string()),
        }
    }

    pub fn founder(&self) -> Option<Founder> {
        match self {
            FounderLabel::Known(f) => Some(*f),
            FounderLabel::Unlisted(_) => None,
        }
    }
}

impl From<Founder> for FounderLabel {
    fn from(founder: Founder) -> Self {
        FounderLabel::Known(founder)
    }
}

impl fmt::Display for FounderLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FounderLabel::Known(founder) => f.write_str(founder.code()),
            FounderLabel::Unlisted(label) => f.write_str(label),
        }
    }
}
