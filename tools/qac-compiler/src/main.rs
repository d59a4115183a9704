use anyhow::Context;
use clap::Parser;
use qac_morph::Baselines;
use qac_parser::{load_corpus, read_corpus, BuckwalterLexicon, LoadOptions, Segmenter};
use qac_protocol::CompiledCorpus;
use rkyv::ser::{serializers::AllocSerializer, Serializer};
use std::fs::{self, File};
use std::io::BufReader;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Segments a morphology corpus and compiles it to an rkyv binary")]
struct Cli {
    /// Corpus file: location, word and tag string per line, tab separated
    #[arg(short, long, value_name = "FILE")]
    input: PathBuf,

    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,

    /// JSON file of expected corpus totals
    #[arg(short, long, value_name = "FILE", conflicts_with = "quran")]
    baselines: Option<PathBuf>,

    /// Check against the known totals for the complete Quran
    #[arg(long)]
    quran: bool,

    /// Write corpus totals as JSON
    #[arg(long, value_name = "FILE")]
    stats: Option<PathBuf>,

    /// Skip the tag string round trip
    #[arg(long)]
    no_verify: bool,

    /// Segment on one thread
    #[arg(long)]
    sequential: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    info!("Reading corpus from {:?}", cli.input);
    let file = File::open(&cli.input).with_context(|| format!("opening {:?}", cli.input))?;
    let entries = read_corpus(BufReader::new(file))?;

    let segmenter = Segmenter::new(BuckwalterLexicon)?;
    let options = LoadOptions {
        parallel: !cli.sequential,
    };
    info!("Segmenting {} words", entries.len());
    let index = load_corpus(&segmenter, entries, options)?;

    if cli.no_verify {
        info!("Skipping round trip verification");
    } else {
        index.verify_round_trip()?;
        info!("Round trip verified for {} words", index.len());
    }

    let stats = index.stats();
    let baselines = match &cli.baselines {
        Some(path) => {
            let text = fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?;
            Some(serde_json::from_str::<Baselines>(&text)?)
        }
        None if cli.quran => Some(Baselines::QURAN),
        None => None,
    };
    if let Some(baselines) = baselines {
        baselines.check(&stats)?;
        info!("Baselines matched");
    }
    if let Some(path) = &cli.stats {
        fs::write(path, serde_json::to_string_pretty(&stats)?)?;
    }

    let compiled = index.to_compiled()?;
    let mut serializer = AllocSerializer::<4096>::default();
    serializer
        .serialize_value(&compiled)
        .map_err(|err| anyhow::anyhow!("rkyv serialization failed: {err:?}"))?;
    let bytes = serializer.into_serializer().into_inner();

    // Read back what will be written.
    let archived = rkyv::check_archived_root::<CompiledCorpus>(&bytes)
        .map_err(|err| anyhow::anyhow!("archive failed validation: {err}"))?;
    anyhow::ensure!(
        archived.words.len() == index.len(),
        "archive holds {} words, expected {}",
        archived.words.len(),
        index.len()
    );

    fs::write(&cli.output, &bytes)?;
    info!(
        "Wrote {} words, {} segments to {:?}",
        stats.words, stats.segments, cli.output
    );
    Ok(())
}
