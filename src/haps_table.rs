//! Loader for population-wide haplotype tables.
//!
//! The table is a CSV with one row per haplotype block across all lines of
//! the population:
//!
//! ```text
//! line,id,name,phase,chromosome,start,end,strain,timestamp
//! CC001/Unc,17,CC001,top,chr1,3000000,36000000,A,2015-06-01
//! ```
//!
//! A line may have been genotyped more than once; only the first `id` seen
//! for a line is used and rows for later ids are ignored. Phase `top` is the
//! maternal copy, anything else paternal. Strain labels are stored without
//! validation.

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use log::{info, warn};

use crate::error::{Error, Result};
use crate::genome::{AddOptions, Genome};
use crate::hapfile::RecordFailure;
use crate::interval::Position;
use crate::reference::Sex;
use crate::segment::Phase;

const REQUIRED_COLUMNS: [&str; 7] = ["line", "id", "phase", "chromosome", "start", "end", "strain"];

/// Phase label of the maternal copy in the table.
pub const MATERNAL_LABEL: &str = "top";

/// Column positions resolved from the header row.
#[derive(Debug, Clone, Copy)]
struct Columns {
    line: usize,
    id: usize,
    phase: usize,
    chromosome: usize,
    start: usize,
    end: usize,
    strain: usize,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| Error::parse(1, format!("missing column '{}'", name)))
        };
        Ok(Columns {
            line: find(REQUIRED_COLUMNS[0])?,
            id: find(REQUIRED_COLUMNS[1])?,
            phase: find(REQUIRED_COLUMNS[2])?,
            chromosome: find(REQUIRED_COLUMNS[3])?,
            start: find(REQUIRED_COLUMNS[4])?,
            end: find(REQUIRED_COLUMNS[5])?,
            strain: find(REQUIRED_COLUMNS[6])?,
        })
    }
}

#[derive(Debug, Default)]
pub struct TableReport {
    pub rows: usize,
    pub segments: usize,
    /// Rows ignored because they belong to a later id of an already seen line.
    pub superseded: usize,
    pub failures: Vec<RecordFailure>,
}

/// Genomes keyed by line name.
#[derive(Debug, Default)]
pub struct HapsTable {
    pub genomes: BTreeMap<String, Genome>,
    pub report: TableReport,
}

impl HapsTable {
    pub fn from_path(path: &Path, sex: Sex) -> Result<Self> {
        let file = File::open(path)?;
        HapsTable::from_reader(file, sex)
    }

    pub fn from_reader<R: Read>(reader: R, sex: Sex) -> Result<Self> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);
        let columns = Columns::from_headers(rdr.headers()?)?;

        let mut table = HapsTable::default();
        let mut first_id: HashMap<String, String> = HashMap::new();

        for (idx, record) in rdr.records().enumerate() {
            // header is line 1
            let line_no = idx + 2;
            table.report.rows += 1;
            let record = match record {
                Ok(r) => r,
                Err(e) => {
                    warn!("skipping row {}: {}", line_no, e);
                    table.report.failures.push(RecordFailure {
                        line: line_no,
                        error: e.into(),
                    });
                    continue;
                }
            };

            let field = |i: usize| record.get(i).map(str::trim).unwrap_or("");
            let line = field(columns.line);
            let id = field(columns.id);
            let kept = first_id
                .entry(line.to_string())
                .or_insert_with(|| id.to_string());
            if kept.as_str() != id {
                table.report.superseded += 1;
                continue;
            }

            let genome = table
                .genomes
                .entry(line.to_string())
                .or_insert_with(|| Genome::new(line, sex));
            match add_row(genome, &record, columns, line_no) {
                Ok(()) => table.report.segments += 1,
                Err(error) => {
                    warn!("{}: skipping row {}: {}", line, line_no, error);
                    table.report.failures.push(RecordFailure {
                        line: line_no,
                        error,
                    });
                }
            }
        }

        info!(
            "Loaded {} genomes from {} rows ({} superseded, {} failed)",
            table.genomes.len(),
            table.report.rows,
            table.report.superseded,
            table.report.failures.len()
        );
        Ok(table)
    }

    pub fn get(&self, line: &str) -> Option<&Genome> {
        self.genomes.get(line)
    }

    pub fn len(&self) -> usize {
        self.genomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genomes.is_empty()
    }
}

fn add_row(genome: &mut Genome, record: &StringRecord, columns: Columns, line_no: usize) -> Result<()> {
    let field = |i: usize| record.get(i).map(str::trim).unwrap_or("");
    let coord = |i: usize| {
        field(i)
            .parse::<Position>()
            .map_err(|_| Error::parse(line_no, format!("bad coordinate '{}'", field(i))))
    };
    let phase = if field(columns.phase) == MATERNAL_LABEL {
        Phase::Maternal
    } else {
        Phase::Paternal
    };
    let strain = field(columns.strain);
    genome.add_segment(
        field(columns.chromosome),
        coord(columns.start)?,
        coord(columns.end)?,
        phase,
        (!strain.is_empty()).then_some(strain),
        AddOptions::unchecked(),
    )?;
    Ok(())
}
