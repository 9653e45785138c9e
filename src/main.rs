use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use setpoint_sweep::io::{read_dataset, read_model, write_model};
use setpoint_sweep::sweep::ResultStore;
use setpoint_sweep::{DecisionTreeRegressor, OptimizeConfig, Regressor, RunMode, optimize_model};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "setpoint_sweep")]
#[command(about = "Evaluate setpoint reduction policies against a trained model")]
struct Cli {
    /// Directory that relative paths in the configuration are resolved against
    #[arg(long, default_value = ".")]
    root: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fit a regression tree on a feature table and save it as JSON
    Train {
        #[arg(long)]
        table: PathBuf,
        /// Target column
        #[arg(long)]
        target: String,
        #[arg(long)]
        model_out: PathBuf,
        #[arg(long)]
        max_depth: Option<usize>,
        #[arg(long, default_value_t = 2)]
        min_samples_split: usize,
        #[arg(long, default_value_t = 1)]
        min_samples_leaf: usize,
    },
    /// Run the reduction grid with a saved model
    Optimize {
        #[arg(long)]
        config: PathBuf,
        #[arg(long)]
        model: PathBuf,
        /// Use `test_directory` instead of `final_output`
        #[arg(long)]
        evaluate: bool,
        /// Feature table to evaluate; defaults to `train_data` in the destination directory
        #[arg(long)]
        table: Option<PathBuf>,
    },
    /// Remove stored summaries and scenario tables
    Clean {
        #[arg(long)]
        config: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Train {
            table,
            target,
            model_out,
            max_depth,
            min_samples_split,
            min_samples_leaf,
        } => {
            let data = read_dataset(&cli.root.join(&table), &target)
                .with_context(|| format!("Failed to read training table: {}", table.display()))?;
            let params = DecisionTreeRegressor {
                max_depth,
                min_samples_split,
                min_samples_leaf,
            };
            let tree = params.fit(&data).context("Failed to fit regression tree")?;
            info!(
                features = tree.feature_names().len(),
                nodes = tree.node_count(),
                leaves = tree.leaf_count(),
                depth = tree.depth(),
                "regression tree fitted"
            );
            write_model(&cli.root.join(&model_out), &tree)
                .with_context(|| format!("Failed to write model: {}", model_out.display()))?;
        }
        Command::Optimize {
            config,
            model,
            evaluate,
            table,
        } => {
            let config = OptimizeConfig::load(&cli.root.join(&config))
                .with_context(|| format!("Failed to load configuration: {}", config.display()))?;
            let tree = read_model(&cli.root.join(&model))
                .with_context(|| format!("Failed to read model: {}", model.display()))?;
            let data = table
                .map(|path| read_dataset(&cli.root.join(&path), &config.output_col))
                .transpose()
                .context("Failed to read feature table")?;
            let mode = if evaluate {
                RunMode::Evaluate
            } else {
                RunMode::Train
            };

            let results = optimize_model(&cli.root, &config, mode, &tree, data.as_ref())?;
            println!("{results}");
        }
        Command::Clean { config } => {
            let config = OptimizeConfig::load(&cli.root.join(&config))
                .with_context(|| format!("Failed to load configuration: {}", config.display()))?;
            let removed = ResultStore::clean(&cli.root, &config)?;
            println!("Removed {removed} file(s)");
        }
    }

    Ok(())
}
