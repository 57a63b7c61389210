pub mod coords;
pub mod display;
pub mod error;
pub mod founder;
pub mod genome;
pub mod hapfile;
pub mod haps_table;
pub mod interval;
pub mod output;
pub mod progress;
pub mod reference;
pub mod segment;

pub use error::{Error, GenomeError, Result};
pub use founder::{Founder, FounderLabel};
pub use genome::{AddOptions, Genome, Genotype, PloidyMismatch};
pub use interval::{IntervalIndex, Position, Span};
pub use reference::{Chromosome, Sex};
pub use segment::{HaplotypeSegment, Phase};
