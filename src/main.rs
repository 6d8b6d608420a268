use anyhow::Result;
use clap::Parser;
use igsynth::shared::output::{create_output, FastaWriter, ReferenceWriter};
use igsynth::vdj::load_locus;
use igsynth::{GeneratorConfiguration, Generator, RecombinationParameters};
#[cfg(feature = "progress")]
use kdam::BarExt;
use log::info;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "igsynth")]
#[command(about = "Generate synthetic V(D)J-recombined immunoglobulin sequences", long_about = None)]
struct Args {
    /// Number of sequences to generate
    #[arg(short = 'n', long, default_value_t = 1)]
    count: usize,

    /// Fraction of productive sequences
    #[arg(short = 'p', long, default_value_t = 1.0)]
    productive_fraction: f64,

    /// Seed of the random generator (random if absent)
    #[arg(short, long)]
    seed: Option<u64>,

    /// V germline database (FASTA, >accession|name|...)
    #[arg(short, long)]
    v: PathBuf,

    /// D germline database
    #[arg(short, long)]
    d: PathBuf,

    /// J germline database
    #[arg(short, long)]
    j: PathBuf,

    /// V gene usage (gene_name,weight per line)
    #[arg(long)]
    v_distribution: Option<PathBuf>,

    /// D gene usage
    #[arg(long)]
    d_distribution: Option<PathBuf>,

    /// J gene usage
    #[arg(long)]
    j_distribution: Option<PathBuf>,

    /// Usage weights are percentages instead of fractions
    #[arg(long)]
    percentage: bool,

    /// Truncate the sequences to a whole number of codons
    #[arg(long)]
    whole_codon: bool,

    /// Recombination parameters (json)
    #[arg(long)]
    params: Option<PathBuf>,

    /// Reference file (CSV with the genes and CDR3 positions)
    #[arg(short, long)]
    reference: Option<PathBuf>,

    /// Output FASTA file (stdout if absent)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let mut params = match &args.params {
        Some(path) => RecombinationParameters::load_json(path)?,
        None => RecombinationParameters::default(),
    };
    if args.whole_codon {
        params.whole_codon = true;
    }
    let config = GeneratorConfiguration {
        number_sequences: args.count,
        productive_fraction: args.productive_fraction,
        seed: args.seed,
    };

    let v = load_locus("V", &args.v, args.v_distribution.as_deref(), args.percentage)?;
    let d = load_locus("D", &args.d, args.d_distribution.as_deref(), args.percentage)?;
    let j = load_locus("J", &args.j, args.j_distribution.as_deref(), args.percentage)?;
    let mut generator = Generator::new(v, d, j, &params, &config)?;

    let out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(create_output(path)?),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    let mut fasta = FastaWriter::new(out);
    let mut reference = match &args.reference {
        Some(path) => Some(ReferenceWriter::create(path)?),
        None => None,
    };

    #[cfg(feature = "progress")]
    let mut pb = kdam::tqdm!(total = config.number_sequences);

    generator.generate_to(
        config.number_sequences,
        &mut fasta,
        reference.as_mut(),
        |_result| {
            #[cfg(feature = "progress")]
            if let Err(e) = pb.update(1) {
                log::warn!("Progress bar not updated: {}", e);
            }
        },
    )?;

    #[cfg(feature = "progress")]
    eprintln!();

    info!(
        "{} sequences generated, {} productive",
        generator.generated(),
        generator.generated_productive()
    );
    Ok(())
}
