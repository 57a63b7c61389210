//! Tab-delimited export of haplotype blocks and recombinations.
//!
//! Block rows: `chrom start end sample founder phase`.
//! Recombination rows: `chrom start end sample from to phase`.
//! Phase is written as its numeric code (0 maternal, 1 paternal, -1 unknown).

use std::io::Write;

use csv::{Writer, WriterBuilder};

use crate::error::Result;
use crate::segment::{HaplotypeSegment, ATTR_FROM, ATTR_TO};

pub const BLOCK_HEADER: [&str; 6] = ["chrom", "start", "end", "sample", "founder", "phase"];
pub const RECOMB_HEADER: [&str; 7] = ["chrom", "start", "end", "sample", "from", "to", "phase"];

pub struct SegmentWriter<W: Write> {
    wtr: Writer<W>,
}

impl<W: Write> SegmentWriter<W> {
    pub fn new(out: W) -> Self {
        let wtr = WriterBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .from_writer(out);
        SegmentWriter { wtr }
    }

    pub fn write_block_header(&mut self) -> Result<()> {
        self.wtr.write_record(BLOCK_HEADER)?;
        Ok(())
    }

    pub fn write_recomb_header(&mut self) -> Result<()> {
        self.wtr.write_record(RECOMB_HEADER)?;
        Ok(())
    }

    pub fn write_block(&mut self, sample: &str, block: &HaplotypeSegment) -> Result<()> {
        self.wtr.write_record(&[
            block.chrom.to_string(),
            block.start.to_string(),
            block.end.to_string(),
            sample.to_string(),
            block.founder_label(),
            block.phase.code().to_string(),
        ])?;
        Ok(())
    }

    pub fn write_recombination(&mut self, sample: &str, recomb: &HaplotypeSegment) -> Result<()> {
        self.wtr.write_record(&[
            recomb.chrom.to_string(),
            recomb.start.to_string(),
            recomb.end.to_string(),
            sample.to_string(),
            recomb.attribute(ATTR_FROM).unwrap_or("NA").to_string(),
            recomb.attribute(ATTR_TO).unwrap_or("NA").to_string(),
            recomb.phase.code().to_string(),
        ])?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.wtr.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> Result<W> {
        self.wtr
            .into_inner()
            .map_err(|e| crate::error::Error::Io(e.into_error()))
    }
}
