// Reader for the CSBio "hapfile" haplotype-block format.
//
// Informative lines look like
//
//     chr1,<display>,A,3000000,3050000,C,3040000,25000000,...
//
// i.e. a chromosome name, one field we do not use, then (founder, start, end)
// triples. Neighbouring blocks in the file overlap where the crossover could
// not be placed precisely:
//
//     |-----|
//         |------|
//
// and we turn them into abutting-or-gapped blocks by ending each block where
// the next one starts in the file, and starting each block where the previous
// one ended:
//
//     |---|  |----|
//
// A chromosome appears once per parental copy, maternal first. Lines that do
// not start with "chr" only carry display instructions and are skipped.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::{info, warn};

use crate::error::{Error, Result};
use crate::genome::{AddOptions, Genome};
use crate::interval::Position;
use crate::reference::Sex;
use crate::segment::{HaplotypeSegment, Phase};

/// File extension stripped to obtain the sample name.
pub const HAPFILE_EXTENSION: &str = ".hap";

/// One block as reconstructed from a hapfile line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HapBlock {
    pub founder: String,
    pub start: Position,
    pub end: Position,
}

/// A record that could not be added, with its 1-based line number.
#[derive(Debug)]
pub struct RecordFailure {
    pub line: usize,
    pub error: Error,
}

/// Counts from one parse. Failed records are skipped, not fatal.
#[derive(Debug, Default)]
pub struct HapfileReport {
    pub lines: usize,
    pub records: usize,
    pub segments: usize,
    pub failures: Vec<RecordFailure>,
}

impl HapfileReport {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Does the line carry haplotype blocks (as opposed to display settings)?
pub fn is_chromline(line: &str) -> bool {
    line.starts_with("chr")
}

/// Chromosome name of a chromosome line: its first field.
pub fn chromline_name(line: &str) -> &str {
    line.split(',').next().unwrap_or("").trim()
}

/// Split a chromosome line into its name and reconstructed blocks.
pub fn parse_chromline(line: &str) -> std::result::Result<(String, Vec<HapBlock>), String> {
    let mut pieces: Vec<&str> = line.trim_end().split(',').map(str::trim).collect();
    while pieces.last().is_some_and(|p| p.is_empty()) {
        pieces.pop();
    }
    if pieces.len() < 2 {
        return Err("missing fields".to_string());
    }
    let chrom = pieces[0].to_string();
    let triples = &pieces[2..];
    if triples.is_empty() {
        return Err(format!("no haplotype blocks for {}", chrom));
    }
    if triples.len() % 3 != 0 {
        return Err(format!(
            "{} block fields is not a multiple of three",
            triples.len()
        ));
    }

    let mut founders = Vec::with_capacity(triples.len() / 3);
    let mut starts = Vec::with_capacity(triples.len() / 3);
    let mut ends = Vec::with_capacity(triples.len() / 3);
    for triple in triples.chunks_exact(3) {
        founders.push(triple[0]);
        starts.push(parse_coord(triple[1])?);
        ends.push(parse_coord(triple[2])?);
    }

    let blocks = reconstruct_blocks(&founders, &starts, &ends);
    Ok((chrom, blocks))
}

fn parse_coord(field: &str) -> std::result::Result<Position, String> {
    field
        .parse::<Position>()
        .map_err(|_| format!("bad coordinate '{}'", field))
}

// Block i runs from the end of block i-1 to the start of block i+1; the
// outermost boundaries are kept as given.
fn reconstruct_blocks(founders: &[&str], starts: &[Position], ends: &[Position]) -> Vec<HapBlock> {
    let n = founders.len();
    (0..n)
        .map(|i| HapBlock {
            founder: founders[i].to_string(),
            start: if i == 0 { starts[0] } else { ends[i - 1] },
            end: if i + 1 == n { ends[n - 1] } else { starts[i + 1] },
        })
        .collect()
}

/// Sample name for a hapfile path: its basename without `.hap`.
pub fn sample_name(path: &Path) -> String {
    let base = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    base.replace(HAPFILE_EXTENSION, "")
}

/// Parsed hapfile: one genome per parental copy.
#[derive(Debug)]
pub struct HapfileParse {
    pub sample: String,
    pub maternal: Genome,
    pub paternal: Genome,
    pub report: HapfileReport,
}

impl HapfileParse {
    pub fn genome(&self, phase: Phase) -> Option<&Genome> {
        match phase {
            Phase::Maternal => Some(&self.maternal),
            Phase::Paternal => Some(&self.paternal),
            Phase::Unknown => None,
        }
    }

    /// All blocks, maternal copy first.
    pub fn hapblocks(&self) -> impl Iterator<Item = &HaplotypeSegment> + '_ {
        self.maternal.segments().chain(self.paternal.segments())
    }

    /// Recombinations of both copies, maternal first.
    pub fn recombinations(&self) -> impl Iterator<Item = HaplotypeSegment> + '_ {
        self.maternal
            .recombinations()
            .chain(self.paternal.recombinations())
    }

    /// Both copies in a single genome, for genotype queries.
    pub fn merged(&self) -> Genome {
        let mut genome = Genome::new(self.sample.clone(), self.maternal.sex());
        genome.merge_from(&self.maternal);
        genome.merge_from(&self.paternal);
        genome
    }
}

#[derive(Debug, Clone)]
pub struct HapfileParser {
    sample: String,
    sex: Sex,
    options: AddOptions,
}

impl HapfileParser {
    pub fn new(sample: impl Into<String>) -> Self {
        HapfileParser {
            sample: sample.into(),
            sex: Sex::Unknown,
            options: AddOptions::default(),
        }
    }

    pub fn with_sex(mut self, sex: Sex) -> Self {
        self.sex = sex;
        self
    }

    pub fn with_options(mut self, options: AddOptions) -> Self {
        self.options = options;
        self
    }

    /// Open and parse a hapfile; the sample name comes from the file name.
    pub fn parse_path(path: &Path) -> Result<HapfileParse> {
        let file = File::open(path)?;
        HapfileParser::new(sample_name(path)).parse(BufReader::new(file))
    }

    /// Parse every informative line. I/O errors abort the parse; a bad record
    /// is logged, counted and skipped.
    pub fn parse<R: BufRead>(&self, reader: R) -> Result<HapfileParse> {
        let mut maternal = Genome::new(self.sample.clone(), self.sex);
        let mut paternal = Genome::new(self.sample.clone(), self.sex);
        let mut report = HapfileReport::default();
        let mut chroms_seen: HashMap<String, usize> = HashMap::new();

        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            let line_no = idx + 1;
            report.lines += 1;
            if !is_chromline(&line) {
                continue;
            }
            report.records += 1;

            // The listing counts towards its chromosome's phase even if the
            // rest of the line turns out to be malformed.
            let name = chromline_name(&line);
            let seen = chroms_seen.entry(name.to_string()).or_insert(0);
            *seen += 1;
            let outcome = match *seen {
                1 => Ok((Phase::Maternal, &mut maternal)),
                2 => Ok((Phase::Paternal, &mut paternal)),
                n => Err(Error::parse(
                    line_no,
                    format!("{} listed {} times; expected at most two", name, n),
                )),
            }
            .and_then(|(phase, genome)| {
                let (chrom, blocks) =
                    parse_chromline(&line).map_err(|msg| Error::parse(line_no, msg))?;
                self.add_blocks(genome, &chrom, phase, &blocks)?;
                Ok(blocks.len())
            });

            match outcome {
                Ok(added) => report.segments += added,
                Err(error) => {
                    warn!("{}: skipping line {}: {}", self.sample, line_no, error);
                    report.failures.push(RecordFailure {
                        line: line_no,
                        error,
                    });
                }
            }
        }

        info!(
            "{}: {} records, {} segments, {} failed",
            self.sample,
            report.records,
            report.segments,
            report.failed()
        );
        Ok(HapfileParse {
            sample: self.sample.clone(),
            maternal,
            paternal,
            report,
        })
    }

    // All blocks of a record are checked before any is inserted so a bad
    // record leaves the genome untouched.
    fn add_blocks(
        &self,
        genome: &mut Genome,
        chrom: &str,
        phase: Phase,
        blocks: &[HapBlock],
    ) -> Result<()> {
        for b in blocks {
            Genome::validate(chrom, b.start, b.end, founder_field(b), self.options)?;
        }
        for b in blocks {
            genome.add_segment(chrom, b.start, b.end, phase, founder_field(b), self.options)?;
        }
        Ok(())
    }
}

fn founder_field(block: &HapBlock) -> Option<&str> {
    (!block.founder.is_empty()).then_some(block.founder.as_str())
}
