//! Fixed reference data for the mouse genome: the chromosome set, sexes and
//! the expected number of copies of each chromosome.

use std::fmt;
use std::str::FromStr;

/// Number of autosomes in the reference organism.
pub const AUTOSOME_COUNT: u8 = 19;

/// One chromosome of the reference. The derived ordering is the display
/// order: chr1..chr19, then chrX, chrY, chrM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Chromosome {
    Autosome(u8),
    X,
    Y,
    Mito,
}

impl Chromosome {
    /// Build an autosome, rejecting numbers outside 1..=19.
    pub fn autosome(number: u8) -> Option<Self> {
        (1..=AUTOSOME_COUNT)
            .contains(&number)
            .then_some(Chromosome::Autosome(number))
    }

    /// Every chromosome in display order.
    pub fn all() -> impl Iterator<Item = Chromosome> {
        (1..=AUTOSOME_COUNT)
            .map(Chromosome::Autosome)
            .chain([Chromosome::X, Chromosome::Y, Chromosome::Mito])
    }

    pub fn is_autosome(self) -> bool {
        matches!(self, Chromosome::Autosome(_))
    }
}

impl fmt::Display for Chromosome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Chromosome::Autosome(n) => write!(f, "chr{}", n),
            Chromosome::X => f.write_str("chrX"),
            Chromosome::Y => f.write_str("chrY"),
            Chromosome::Mito => f.write_str("chrM"),
        }
    }
}

impl FromStr for Chromosome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s
            .strip_prefix("chr")
            .ok_or_else(|| format!("unknown chromosome '{}'", s))?;
        match name {
            "X" => Ok(Chromosome::X),
            "Y" => Ok(Chromosome::Y),
            "M" => Ok(Chromosome::Mito),
            // "chr01" and "chr+1" are not names in the reference set
            n if !n.starts_with('0') && n.bytes().all(|b| b.is_ascii_digit()) => n
                .parse::<u8>()
                .ok()
                .and_then(Chromosome::autosome)
                .ok_or_else(|| format!("unknown chromosome '{}'", s)),
            _ => Err(format!("unknown chromosome '{}'", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Sex {
    #[default]
    Unknown,
    Male,
    Female,
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Sex::Unknown => "unknown",
            Sex::Male => "male",
            Sex::Female => "female",
        })
    }
}

impl FromStr for Sex {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "unknown" | "u" | "0" => Ok(Sex::Unknown),
            "male" | "m" | "1" => Ok(Sex::Male),
            "female" | "f" | "2" => Ok(Sex::Female),
            _ => Err(format!("unknown sex '{}'", s)),
        }
    }
}

/// Expected copy number of `chrom` in an individual of the given sex.
/// Autosomes are always diploid. With unknown sex the sex chromosomes get the
/// most permissive count; a known sex gets one X and no Y.
pub fn ploidy(sex: Sex, chrom: Chromosome) -> usize {
    match (sex, chrom) {
        (_, Chromosome::Autosome(_)) => 2,
        (_, Chromosome::Mito) => 1,
        (Sex::Unknown, Chromosome::X) => 2,
        (Sex::Unknown, Chromosome::Y) => 1,
        (Sex::Male, Chromosome::X) => 1,
        (Sex::Male, Chromosome::Y) => 0,
        (Sex::Female, Chromosome::X) => 1,
        (Sex::Female, Chromosome::Y) => 0,
    }
}
