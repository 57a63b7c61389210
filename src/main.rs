use clap::{Args, Parser, Subcommand};
use hapmosaic::{
    coords::parse_user_region,
    display,
    hapfile::{sample_name, HapfileParse, HapfileParser},
    haps_table::HapsTable,
    output::SegmentWriter,
    progress::count_progress_bar,
    Genome, Position, Sex,
};
use log::{info, warn};
use rayon::prelude::*;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use termcolor::ColorChoice;

/// hapmosaic: founder haplotype mosaics for multiparent mouse populations
#[derive(Parser, Debug)]
#[command(
    name = "hapmosaic",
    about = "Parse founder haplotype blocks, call founder genotypes and find recombinations",
    version,
    propagate_version = true,
    arg_required_else_help = true
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert hapfiles to tab-delimited haplotype blocks
    Convert(ConvertArgs),
    /// Founder genotype of every individual at one position
    Genotype(GenotypeArgs),
    /// Show the founder mosaic of an individual
    Show(ShowArgs),
}

#[derive(Args, Debug)]
struct ConvertArgs {
    /// Paths to hapfiles to process
    #[arg(value_name = "HAPFILE", required = true)]
    infiles: Vec<PathBuf>,
    /// Write recombinations instead of haplotype blocks
    #[arg(long, default_value_t = false)]
    recombs: bool,
    /// Write a header row first
    #[arg(long, default_value_t = false)]
    header: bool,
    /// Hide the progress bar
    #[arg(short, long, default_value_t = false)]
    quiet: bool,
}

#[derive(Args, Debug, Clone)]
struct InputArgs {
    /// Haplotype table (.csv) or a single hapfile
    #[arg(value_name = "INPUT")]
    input: PathBuf,
    /// Sex applied to every individual (unknown, male, female)
    #[arg(long, default_value = "unknown")]
    sex: Sex,
    /// Warn when a query finds a segment count different from the ploidy
    #[arg(long, default_value_t = false)]
    check_ploidy: bool,
}

#[derive(Args, Debug)]
struct GenotypeArgs {
    #[command(flatten)]
    input: InputArgs,
    /// Chromosome, e.g. chr2
    #[arg(long, value_name = "CHROM")]
    chrom: String,
    /// 0-based position on the chromosome
    #[arg(long, value_name = "POS")]
    position: Position,
}

#[derive(Args, Debug)]
struct ShowArgs {
    #[command(flatten)]
    input: InputArgs,
    /// Individual to show (default: all)
    #[arg(long, value_name = "ID")]
    individual: Option<String>,
    /// Region to show, 1-based: chr1:100-200, chr1:150 or chr1
    #[arg(long, value_name = "REGION")]
    region: Option<String>,
    /// Disable coloured output
    #[arg(long, default_value_t = false)]
    no_color: bool,
}

fn to_io(err: hapmosaic::Error) -> io::Error {
    match err {
        hapmosaic::Error::Io(e) => e,
        other => io::Error::other(other.to_string()),
    }
}

fn is_table(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false)
}

/// Load genomes from a haplotype table or a single hapfile.
fn load_genomes(args: &InputArgs) -> io::Result<Vec<Genome>> {
    let genomes: Vec<Genome> = if is_table(&args.input) {
        let table = HapsTable::from_path(&args.input, args.sex).map_err(to_io)?;
        table.genomes.into_values().collect()
    } else {
        let parsed = HapfileParser::new(sample_name(&args.input))
            .with_sex(args.sex)
            .parse(io::BufReader::new(std::fs::File::open(&args.input)?))
            .map_err(to_io)?;
        vec![parsed.merged()]
    };
    Ok(genomes
        .into_iter()
        .map(|g| g.with_ploidy_check(args.check_ploidy))
        .collect())
}

fn run_convert(args: ConvertArgs) -> io::Result<()> {
    let ConvertArgs {
        infiles,
        recombs,
        header,
        quiet,
    } = args;
    eprintln!("Parsing haplotypes for {} samples.", infiles.len());

    let pb = count_progress_bar("convert", "files", Some(infiles.len() as u64), quiet);
    let parsed: Vec<(String, hapmosaic::Result<HapfileParse>)> = infiles
        .par_iter()
        .map(|path| {
            let result = HapfileParser::parse_path(path);
            pb.inc(1);
            (sample_name(path), result)
        })
        .collect();
    pb.finish_and_clear();

    let stdout = io::stdout();
    let mut writer = SegmentWriter::new(BufWriter::new(stdout.lock()));
    if header {
        let res = if recombs {
            writer.write_recomb_header()
        } else {
            writer.write_block_header()
        };
        res.map_err(to_io)?;
    }

    let mut failed_files = 0usize;
    for (sample, result) in parsed {
        match result {
            Ok(parse) => {
                let written = if recombs {
                    parse
                        .recombinations()
                        .try_for_each(|r| writer.write_recombination(&sample, &r))
                } else {
                    parse
                        .hapblocks()
                        .try_for_each(|b| writer.write_block(&sample, b))
                };
                written.map_err(to_io)?;
                if parse.report.is_clean() {
                    eprintln!("\t-- {}", sample);
                } else {
                    eprintln!(
                        "\t-- {} ({} of {} records skipped)",
                        sample,
                        parse.report.failed(),
                        parse.report.records
                    );
                }
            }
            Err(err) => {
                failed_files += 1;
                warn!("{}: {}", sample, err);
                eprintln!("\t-- {} --> FAILED", sample);
            }
        }
    }
    writer.flush().map_err(to_io)?;
    if failed_files > 0 {
        info!("{} of {} files failed", failed_files, infiles.len());
    }
    Ok(())
}

fn run_genotype(args: GenotypeArgs) -> io::Result<()> {
    let genomes = load_genomes(&args.input)?;
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for genome in &genomes {
        let genotype = genome
            .genotype_at(&args.chrom, args.position)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        writeln!(out, "{} {}", genome.id(), genotype)?;
    }
    out.flush()
}

fn run_show(args: ShowArgs) -> io::Result<()> {
    let region = match &args.region {
        Some(r) => Some(parse_user_region(r).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Could not parse region format: {}", r),
            )
        })?),
        None => None,
    };
    let color = if args.no_color {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };

    let genomes = load_genomes(&args.input)?;
    let mut shown = 0usize;
    for genome in genomes
        .iter()
        .filter(|g| args.individual.as_deref().map_or(true, |id| g.id() == id))
    {
        display::print_mosaic(genome, region.as_ref(), color)?;
        shown += 1;
    }
    if shown == 0 {
        if let Some(id) = &args.individual {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("individual '{}' not found", id),
            ));
        }
    }
    Ok(())
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(match cli.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        })
        .init();

    match cli.command {
        Command::Convert(args) => run_convert(args),
        Command::Genotype(args) => run_genotype(args),
        Command::Show(args) => run_show(args),
    }
}
