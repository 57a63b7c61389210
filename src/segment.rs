use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::founder::FounderLabel;
use crate::interval::{Position, Span};
use crate::reference::Chromosome;

/// Attribute keys set on derived recombination segments.
pub const ATTR_FROM: &str = "from";
pub const ATTR_TO: &str = "to";

/// Which parental copy a segment sits on. Chromosomes present in a single
/// copy may carry `Unknown`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Phase {
    Maternal,
    Paternal,
    #[default]
    Unknown,
}

impl Phase {
    /// Slot of a known phase in a diploid genotype.
    pub fn index(self) -> Option<usize> {
        match self {
            Phase::Maternal => Some(0),
            Phase::Paternal => Some(1),
            Phase::Unknown => None,
        }
    }

    /// Numeric code used in tab-delimited output.
    pub fn code(self) -> i8 {
        match self {
            Phase::Maternal => 0,
            Phase::Paternal => 1,
            Phase::Unknown => -1,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Maternal => "maternal",
            Phase::Paternal => "paternal",
            Phase::Unknown => "unknown",
        })
    }
}

impl FromStr for Phase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "maternal" | "0" => Ok(Phase::Maternal),
            "paternal" | "1" => Ok(Phase::Paternal),
            "unknown" | "-1" => Ok(Phase::Unknown),
            _ => Err(format!("unknown phase '{}'", s)),
        }
    }
}

/// A stretch of one chromosome copy inherited from a single founder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HaplotypeSegment {
    pub chrom: Chromosome,
    pub start: Position,
    pub end: Position,
    pub phase: Phase,
    pub founder: Option<FounderLabel>,
    pub attributes: BTreeMap<String, String>,
}

impl HaplotypeSegment {
    pub fn new(
        chrom: Chromosome,
        start: Position,
        end: Position,
        phase: Phase,
        founder: Option<FounderLabel>,
    ) -> Self {
        HaplotypeSegment {
            chrom,
            start,
            end,
            phase,
            founder,
            attributes: BTreeMap::new(),
        }
    }

    /// Recombination segment covering the gap between two consecutive
    /// segments of the same phase, labelled with the founders on either side.
    /// Overlapping neighbours yield the overlap instead of a negative span.
    pub fn breakpoint(previous: &HaplotypeSegment, current: &HaplotypeSegment) -> Self {
        let (start, end) = if previous.end <= current.start {
            (previous.end, current.start)
        } else {
            (current.start, previous.end)
        };
        let mut recomb = HaplotypeSegment::new(current.chrom, start, end, current.phase, None);
        recomb
            .attributes
            .insert(ATTR_FROM.to_string(), label_or_na(&previous.founder));
        recomb
            .attributes
            .insert(ATTR_TO.to_string(), label_or_na(&current.founder));
        recomb
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Founder label for display, `NA` when absent.
    pub fn founder_label(&self) -> String {
        label_or_na(&self.founder)
    }
}

fn label_or_na(label: &Option<FounderLabel>) -> String {
    label
        .as_ref()
        .map_or_else(|| "NA".to_string(), |l| l.to_string())
}

impl Span for HaplotypeSegment {
    fn start(&self) -> Position {
        self.start
    }

    fn end(&self) -> Position {
        self.end
    }
}

impl fmt::Display for HaplotypeSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "HaplotypeSegment( {}:{}-{} [{}:{}] )",
            self.chrom,
            self.start,
            self.end,
            self.phase,
            self.founder_label()
        )
    }
}
