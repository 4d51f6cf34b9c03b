use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;
use trailrec::RawQuery;
use trailrec_pipeline::{run_clean, run_featurize, run_model, ProjectConfig, TrailEngine};

/// Hiking trail recommender and difficulty predictor
#[derive(Parser, Debug)]
#[command(name = "trailrec")]
#[command(about = "Recommend hiking trails and predict their difficulty", long_about = None)]
struct Args {
    /// Path to the project configuration file
    #[arg(long, default_value = "config/project.toml")]
    config: PathBuf,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert lengths to miles and drop closed trails
    Clean,
    /// Build the feature table and vocabulary files
    Featurize,
    /// Train and evaluate the difficulty classifier
    Model,
    /// Predict the difficulty of a described trail
    Predict(QueryArgs),
    /// Recommend catalog trails similar to a described trail
    Recommend {
        #[command(flatten)]
        query: QueryArgs,

        /// Show the configured display columns and scores
        #[arg(long)]
        detailed: bool,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(clap::Args, Debug)]
struct QueryArgs {
    #[arg(long)]
    length: String,

    #[arg(long)]
    elevation_gain: String,

    #[arg(long)]
    route_type: String,

    /// List literal, e.g. "['lake', 'views']"
    #[arg(long, default_value = "[]")]
    features: String,

    /// List literal, e.g. "['hiking']"
    #[arg(long, default_value = "[]")]
    activities: String,
}

impl From<QueryArgs> for RawQuery {
    fn from(args: QueryArgs) -> Self {
        RawQuery {
            length: args.length,
            elevation_gain: args.elevation_gain,
            route_type: args.route_type,
            features: args.features,
            activities: args.activities,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = ProjectConfig::load(&args.config)
        .with_context(|| format!("loading configuration from {}", args.config.display()))?;

    match args.command {
        Command::Clean => {
            let catalog = run_clean(&config.clean).context("clean job failed")?;
            info!("Clean finished with {} trails", catalog.len());
        }
        Command::Featurize => {
            let featurized = run_featurize(&config.featurize).context("featurize job failed")?;
            info!(
                "Featurize finished: {} trails x {} features",
                featurized.table.len(),
                featurized.table.width()
            );
        }
        Command::Model => {
            let outcome = run_model(&config.model).context("model job failed")?;
            info!(
                "Model trained on {} rows, evaluated on {}",
                outcome.train_rows, outcome.test_rows
            );
            print!("{}", outcome.report.render());
        }
        Command::Predict(query) => {
            let raw = RawQuery::from(query);
            let label = trailrec::predict(&raw, &config.recommend.predict)
                .context("difficulty prediction failed")?;
            println!("{}", label);
        }
        Command::Recommend {
            query,
            detailed,
            json,
        } => {
            let raw = RawQuery::from(query);
            if detailed {
                let engine = TrailEngine::load(&config).context("loading trail engine")?;
                let parsed = trailrec::TrailQuery::from_raw(&raw)?;
                let summaries = engine
                    .recommend_detailed(&parsed)
                    .context("recommendation failed")?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&summaries)?);
                } else {
                    for summary in summaries {
                        let fields: Vec<String> = summary
                            .fields
                            .iter()
                            .map(|(k, v)| format!("{}={}", k, v))
                            .collect();
                        println!("{}\t{:.4}\t{}", summary.trail_id, summary.score, fields.join("\t"));
                    }
                }
            } else {
                let ids = trailrec::recommend(&raw, &config.recommend.recommend)
                    .context("recommendation failed")?;
                if json {
                    println!("{}", serde_json::to_string(&ids)?);
                } else {
                    for id in ids {
                        println!("{}", id);
                    }
                }
            }
        }
    }

    Ok(())
}
