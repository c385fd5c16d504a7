use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use indicatif::MultiProgress;
use sentimentopolis::{
    init_tracing_once, load, read_posts, render_to_file, save, set_global_multiprogress, AggregationMode,
    AnalysisKind, AnalysisResult, ClassifierConfig, ClassifierScorer, DayPolicy, LexicalScorer, ScoringBackend,
    TrajectoryAnalyzer,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "sentimentopolis", about = "Daily sentiment trajectories over discussion threads")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Score popular comments per day and write the trajectory.
    Analyze(AnalyzeArgs),
    /// Plot a saved trajectory as SVG.
    Report {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, default_value = "trajectory.svg")]
        output: PathBuf,
    },
}

#[derive(clap::Args)]
struct AnalyzeArgs {
    /// Posts file (.json/.jsonl/.ndjson/.zst) or a directory of them.
    #[arg(long)]
    input: PathBuf,
    #[arg(long, default_value = "results.json")]
    output: PathBuf,
    /// sentiment | nsfwness | polarity
    #[arg(long, default_value = "sentiment")]
    attribute: AnalysisKind,
    #[arg(long, default_value_t = 1)]
    threshold: i64,
    #[arg(long, default_value_t = 5)]
    min_samples: usize,
    /// batch | per-item
    #[arg(long, default_value = "batch")]
    mode: AggregationMode,
    /// Calendar day boundary: UTC or a fixed offset such as -05:00.
    #[arg(long, default_value = "UTC", allow_hyphen_values = true)]
    utc_offset: DayPolicy,
    #[arg(long)]
    no_normalize: bool,
    #[arg(long, default_value_t = 1)]
    parallelism: usize,
    /// Merge into an existing output file instead of replacing it.
    #[arg(long)]
    append: bool,
    #[arg(long)]
    no_progress: bool,

    // classifier backend
    #[arg(long, default_value = "https://api-inference.huggingface.co")]
    endpoint: String,
    #[arg(long)]
    model: Option<String>,
    #[arg(long, env = "SENTIMENTOPOLIS_API_TOKEN", hide_env_values = true)]
    api_token: Option<String>,
    #[arg(long)]
    gpu: bool,
    #[arg(long, default_value_t = 32)]
    batch_size: usize,
    #[arg(long, default_value_t = 511)]
    max_tokens: usize,
}

fn main() -> Result<()> {
    init_tracing_once();
    let cli = Cli::parse();
    match cli.command {
        Command::Analyze(args) => analyze(args),
        Command::Report { input, output } => {
            let result = load(&input)?;
            render_to_file(&result, &output)?;
            println!("Plotted {} days to {}", result.dates.len(), output.display());
            Ok(())
        }
    }
}

fn analyze(args: AnalyzeArgs) -> Result<()> {
    // Bad input should fail before the classifier warm-up call.
    let posts = read_posts(&args.input)?;
    tracing::info!("Loaded {} posts from {}", posts.len(), args.input.display());

    let scorer: ScoringBackend = match args.attribute {
        AnalysisKind::Polarity => LexicalScorer::new().into(),
        kind => {
            let mut cfg = ClassifierConfig::for_kind(kind)
                .with_endpoint(&args.endpoint)
                .with_api_token(args.api_token.clone())
                .with_gpu(args.gpu)
                .with_batch_size(args.batch_size)
                .with_max_tokens(args.max_tokens);
            if let Some(model) = &args.model {
                cfg = cfg.with_model(model);
            }
            tracing::debug!("Classifier config: {:?}", cfg);
            ClassifierScorer::from_config(kind, &cfg).context("initialise classifier")?.into()
        }
    };

    if !args.no_progress {
        set_global_multiprogress(Arc::new(MultiProgress::new()));
    }
    let label = format!("Collecting {} comments", args.attribute);

    let analyzer = TrajectoryAnalyzer::new(scorer)
        .score_threshold(args.threshold)
        .min_samples(args.min_samples)
        .mode(args.mode)
        .day_policy(args.utc_offset)
        .normalize_text(!args.no_normalize)
        .parallelism(args.parallelism)
        .progress(!args.no_progress)
        .progress_label(label);

    let result = if args.append && args.output.exists() {
        let mut existing: AnalysisResult = load(&args.output)?;
        if existing.analysis_type != analyzer.kind() {
            bail!(
                "{} holds {} results; refusing to append {}",
                args.output.display(),
                existing.analysis_type,
                analyzer.kind()
            );
        }
        analyzer.analyze_into(&posts, &mut existing)?;
        existing
    } else {
        analyzer.analyze(&posts)?
    };

    save(&result, &args.output)?;
    println!("Wrote {} days of {} to {}", result.dates.len(), result.analysis_type, args.output.display());
    Ok(())
}
