// src/display.rs
//
// Terminal rendering of a genome's founder mosaic. Each segment is printed
// with a swatch in its founder's conventional colour; labels outside the
// founder set get no colour.

use std::io::{self, Write};

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::coords::{format_for_user, Region};
use crate::genome::Genome;
use crate::segment::HaplotypeSegment;

fn founder_spec(segment: &HaplotypeSegment) -> ColorSpec {
    let mut spec = ColorSpec::new();
    if let Some(founder) = segment.founder.as_ref().and_then(|l| l.founder()) {
        let (r, g, b) = founder.color();
        spec.set_fg(Some(Color::Rgb(r, g, b))).set_bold(true);
    }
    spec
}

fn write_segment<W: WriteColor>(out: &mut W, segment: &HaplotypeSegment) -> io::Result<()> {
    write!(
        out,
        "  {}:{}\t{}\t",
        segment.chrom,
        format_for_user(segment.start, segment.end),
        segment.phase
    )?;
    out.set_color(&founder_spec(segment))?;
    write!(out, "██ {}", segment.founder_label())?;
    out.reset()?;
    writeln!(out)
}

/// Write the segments of `genome`, optionally restricted to `region`.
pub fn write_mosaic<W: WriteColor>(
    out: &mut W,
    genome: &Genome,
    region: Option<&Region>,
) -> io::Result<()> {
    writeln!(out, "{} ({} segments)", genome.id(), genome.len())?;
    let mut shown = 0usize;
    match region {
        Some(region) => {
            let segments = genome
                .get_segments(&region.chrom.to_string(), region.start, region.end)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
            for segment in segments {
                write_segment(out, segment)?;
                shown += 1;
            }
        }
        None => {
            for segment in genome.segments() {
                write_segment(out, segment)?;
                shown += 1;
            }
        }
    }
    if shown == 0 {
        writeln!(out, "  (no segments)")?;
    }
    Ok(())
}

/// Print to stdout with the given colour policy.
pub fn print_mosaic(genome: &Genome, region: Option<&Region>, color: ColorChoice) -> io::Result<()> {
    let stdout = StandardStream::stdout(color);
    let mut stdout = stdout.lock();
    write_mosaic(&mut stdout, genome, region)?;
    stdout.flush()
}
