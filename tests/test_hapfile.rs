// tests/test_hapfile.rs

use std::io::{self, Write};
use tempfile::NamedTempFile;

use hapmosaic::hapfile::{sample_name, HapfileParser};
use hapmosaic::output::SegmentWriter;
use hapmosaic::segment::{ATTR_FROM, ATTR_TO};
use hapmosaic::{Chromosome, Error, GenomeError, Phase};

const HAPFILE: &str = "\
track name=CC001 display=stacked
chr1,1,A,0,3100000,C,3000000,50000000,H,49000000,195000000
chr2,1,B,0,182000000
chr1,2,D,0,195000000
chr2,2,E,0,90000000,F,90000000,182000000
chrX,1,G,0,171000000
chr1,3,A,0,10
chr3,1,Q,0,10
chr4,1,A,0,zz
";

fn write_hapfile(contents: &str) -> io::Result<NamedTempFile> {
    let mut file = tempfile::Builder::new().suffix(".hap").tempfile()?;
    file.write_all(contents.as_bytes())?;
    file.flush()?;
    Ok(file)
}

fn recomb(
    chrom: &str,
    start: i64,
    end: i64,
    phase: Phase,
    from: &str,
    to: &str,
) -> (String, i64, i64, Phase, String, String) {
    (chrom.to_string(), start, end, phase, from.to_string(), to.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_assigns_phase_by_order() {
        let parse = HapfileParser::new("CC001").parse(HAPFILE.as_bytes()).unwrap();
        let maternal: Vec<(String, i64, i64, String)> = parse
            .maternal
            .segments()
            .map(|s| (s.chrom.to_string(), s.start, s.end, s.founder_label()))
            .collect();
        assert_eq!(
            maternal,
            vec![
                ("chr1".to_string(), 0, 3_000_000, "A".to_string()),
                ("chr1".to_string(), 3_100_000, 49_000_000, "C".to_string()),
                ("chr1".to_string(), 50_000_000, 195_000_000, "H".to_string()),
                ("chr2".to_string(), 0, 182_000_000, "B".to_string()),
                ("chrX".to_string(), 0, 171_000_000, "G".to_string()),
            ]
        );
        assert!(parse.maternal.segments().all(|s| s.phase == Phase::Maternal));
        assert!(parse.paternal.segments().all(|s| s.phase == Phase::Paternal));
        assert_eq!(parse.paternal.len(), 3);
    }

    #[test]
    fn test_bad_records_are_skipped_and_reported() {
        let parse = HapfileParser::new("CC001").parse(HAPFILE.as_bytes()).unwrap();
        let report = &parse.report;
        assert_eq!(report.lines, 9);
        assert_eq!(report.records, 8);
        assert_eq!(report.segments, 8);
        let failed_lines: Vec<usize> = report.failures.iter().map(|f| f.line).collect();
        assert_eq!(failed_lines, vec![7, 8, 9]);
        // third listing of chr1
        assert!(matches!(report.failures[0].error, Error::Parse { line: 7, .. }));
        assert!(matches!(
            &report.failures[1].error,
            Error::Genome(GenomeError::UnknownFounder(f)) if f == "Q"
        ));
        assert!(matches!(report.failures[2].error, Error::Parse { line: 9, .. }));
        // failed records leave nothing behind
        assert_eq!(parse.maternal.chromosome_segments(Chromosome::Autosome(3)).count(), 0);
        assert_eq!(parse.maternal.chromosome_segments(Chromosome::Autosome(4)).count(), 0);
    }

    #[test]
    fn test_invalid_block_rejects_whole_record() {
        // second block ends before it starts once fence posts are rebuilt
        let text = "chr5,1,A,0,500,B,100,400,C,200,900\n";
        let parse = HapfileParser::new("s").parse(text.as_bytes()).unwrap();
        assert_eq!(parse.report.failed(), 1);
        assert!(matches!(
            parse.report.failures[0].error,
            Error::Genome(GenomeError::InvalidInterval { .. })
        ));
        assert!(parse.maternal.is_empty());
    }

    #[test]
    fn test_recombinations_from_hapfile() {
        let parse = HapfileParser::new("CC001").parse(HAPFILE.as_bytes()).unwrap();
        let recombs: Vec<(String, i64, i64, Phase, String, String)> = parse
            .recombinations()
            .map(|r| {
                (
                    r.chrom.to_string(),
                    r.start,
                    r.end,
                    r.phase,
                    r.attribute(ATTR_FROM).unwrap().to_string(),
                    r.attribute(ATTR_TO).unwrap().to_string(),
                )
            })
            .collect();
        assert_eq!(
            recombs,
            vec![
                recomb("chr1", 3_000_000, 3_100_000, Phase::Maternal, "A", "C"),
                recomb("chr1", 49_000_000, 50_000_000, Phase::Maternal, "C", "H"),
                recomb("chr2", 90_000_000, 90_000_000, Phase::Paternal, "E", "F"),
            ]
        );
    }

    #[test]
    fn test_merged_genotypes() {
        let parse = HapfileParser::new("CC001").parse(HAPFILE.as_bytes()).unwrap();
        let genome = parse.merged();
        assert_eq!(genome.id(), "CC001");
        assert_eq!(genome.len(), 8);
        assert_eq!(genome.genotype_at("chr1", 1_000).unwrap().to_string(), "A D");
        assert_eq!(genome.genotype_at("chr1", 3_050_000).unwrap().to_string(), "NA D");
        assert_eq!(genome.genotype_at("chr2", 90_000_000).unwrap().to_string(), "B F");
        assert_eq!(genome.genotype_at("chrX", 5).unwrap().to_string(), "G NA");
    }

    #[test]
    fn test_parse_path_and_export() -> Result<(), Box<dyn std::error::Error>> {
        let file = write_hapfile("chr1,1,A,0,100,B,100,200\nchr1,2,C,0,200\n")?;
        let parse = HapfileParser::parse_path(file.path())?;
        assert_eq!(parse.sample, sample_name(file.path()));
        assert!(!parse.sample.ends_with(".hap"));

        let mut writer = SegmentWriter::new(Vec::new());
        for block in parse.hapblocks() {
            writer.write_block(&parse.sample, block)?;
        }
        for recomb in parse.recombinations() {
            writer.write_recombination(&parse.sample, &recomb)?;
        }
        let text = String::from_utf8(writer.into_inner()?)?;
        let s = &parse.sample;
        let expected = format!(
            "chr1\t0\t100\t{s}\tA\t0\n\
             chr1\t100\t200\t{s}\tB\t0\n\
             chr1\t0\t200\t{s}\tC\t1\n\
             chr1\t100\t100\t{s}\tA\tB\t0\n"
        );
        assert_eq!(text, expected);
        Ok(())
    }

    #[test]
    fn test_missing_file_is_an_io_error() {
        let err = HapfileParser::parse_path(std::path::Path::new("/nonexistent/CC999.hap"))
            .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
