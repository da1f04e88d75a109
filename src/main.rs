use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use homoglyph_dict::{load_json_artifact, ArtifactValidator, BuildConfig, Glyph};

const DEFAULT_DATA_DIR: &str = "data";

#[derive(Parser, Debug)]
#[command(name = "homoglyph-dict", version, about = "Build the merged homoglyph dictionary")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse the three sources, merge them and write the artifact
    Build {
        /// TOML config file; flags below override its values
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Directory holding char_codes.txt, original_char_codes.txt and confusables.txt
        /// (default: data). With --config, the base for its relative [sources] paths
        #[arg(short, long, env = "HOMOGLYPH_DATA_DIR")]
        data_dir: Option<PathBuf>,

        /// JSON artifact path (default: <data-dir>/homoglyph.json)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also store the build in a SQLite database
        #[arg(long)]
        sqlite: Option<PathBuf>,

        /// Write the build report as JSON
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Check an existing artifact for empty, repeated or shared members
    Verify { artifact: PathBuf },
    /// Show the class of every character of TEXT
    Lookup { artifact: PathBuf, text: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            config,
            data_dir,
            output,
            sqlite,
            report,
        } => {
            let mut build_config = match &config {
                Some(path) => BuildConfig::load_with_data_dir(path, data_dir.as_deref())?,
                None => BuildConfig::with_data_dir(
                    data_dir.as_deref().unwrap_or_else(|| Path::new(DEFAULT_DATA_DIR)),
                ),
            };
            if let Some(path) = output {
                build_config.output.json = path;
            }
            if sqlite.is_some() {
                build_config.output.sqlite = sqlite;
            }
            if report.is_some() {
                build_config.output.report = report;
            }

            init_tracing(&build_config.logging.level);
            run_build(&build_config)
        }
        Commands::Verify { artifact } => {
            init_tracing("info");
            run_verify(&artifact)
        }
        Commands::Lookup { artifact, text } => {
            init_tracing("warn");
            run_lookup(&artifact, &text)
        }
    }
}

fn init_tracing(default_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("homoglyph_dict={}", default_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn run_build(config: &BuildConfig) -> Result<()> {
    info!(
        codebox = %config.sources.codebox.display(),
        original = %config.sources.original.display(),
        confusables = %config.sources.confusables.display(),
        "building homoglyph dictionary"
    );

    let output = homoglyph_dict::run(config).context("Homoglyph build failed")?;

    println!(
        "{} classes, {} glyphs -> {}",
        output.report.final_classes,
        output.report.final_glyphs,
        config.output.json.display()
    );
    if !output.report.review.is_empty() {
        println!(
            "{} multi-codepoint sequences flagged for review",
            output.report.review.len()
        );
    }

    Ok(())
}

fn run_verify(path: &Path) -> Result<()> {
    let artifact = load_json_artifact(path)?;
    let report = ArtifactValidator::new().validate(&artifact);

    for issue in &report.issues {
        println!("{:?} [{}] {}", issue.severity, issue.rule_name, issue.message);
    }
    println!("{}", report.summary());
    println!("sha256 {}", artifact.digest());

    report.into_result()?;
    Ok(())
}

fn run_lookup(path: &Path, text: &str) -> Result<()> {
    let artifact = load_json_artifact(path)?;
    let index = artifact.index();

    for c in text.chars() {
        let glyph = Glyph::from(c);
        match index.class_of(&glyph) {
            Some(record) => {
                let members: Vec<&str> = record.data.iter().map(|g| g.as_str()).collect();
                println!("{} ({}): {}", c, glyph.notation(), members.join(" "));
            }
            None => println!("{} ({}): -", c, glyph.notation()),
        }
    }

    Ok(())
}
