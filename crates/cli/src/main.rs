use anyhow::Result;
use clap::{Parser, Subcommand};
use cli::{output, server, summarizer, uploads};
use doctext_core::config;
use doctext_core::config::AppConfig;
use doctext_core::models::PredictionRequest;
use doctext_core::pipeline;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Predict {
            text,
            threshold,
            json,
            explain,
        } => run_predict(cfg, text, threshold, json, explain),
        Commands::Vectorize {
            text,
            threshold,
            json,
        } => run_vectorize(cfg, text, threshold, json),
        Commands::Catalog { json } => run_catalog(cfg, json),
        Commands::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| cfg.server.bind.clone());
            server::run(cfg, &bind).await
        }
        Commands::Summarize { files, medicines } => run_summarize(cfg, files, medicines).await,
    }
}

#[derive(Parser)]
#[command(name = "doctext")]
#[command(about = "Clinical note to diagnosis classifier", long_about = None)]
struct Cli {
    /// Path to config TOML
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Predict a diagnosis label for a clinical note
    Predict {
        /// Free-text clinical note
        text: String,
        /// Similarity threshold override
        #[arg(short, long)]
        threshold: Option<f32>,
        /// Output JSON
        #[arg(long)]
        json: bool,
        /// Also list the matched symptoms
        #[arg(long, default_value_t = false)]
        explain: bool,
    },
    /// Show the symptom indicator vector for a note
    Vectorize {
        /// Free-text clinical note
        text: String,
        /// Similarity threshold override
        #[arg(short, long)]
        threshold: Option<f32>,
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
    /// Describe the loaded symptom catalog and classifier
    Catalog {
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
    /// Run the HTTP server
    Serve {
        /// Listen address, overrides server.bind
        #[arg(long)]
        bind: Option<String>,
    },
    /// Summarize medical documents with the generative provider
    Summarize {
        /// Files to summarize; several files are merged into one summary
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Extract prescribed medicines from a prescription image instead
        #[arg(long, default_value_t = false)]
        medicines: bool,
    },
}

fn request(text: String, threshold: Option<f32>) -> PredictionRequest {
    PredictionRequest { text, threshold }
}

fn run_predict(
    cfg: AppConfig,
    text: String,
    threshold: Option<f32>,
    json: bool,
    explain: bool,
) -> Result<()> {
    let ctx = pipeline::build_context(&cfg)?;
    let req = request(text, threshold);
    if explain {
        let analysis = pipeline::analyze(&ctx, &req)?;
        if json {
            println!("{}", serde_json::to_string_pretty(&analysis)?);
        } else {
            print!("{}", output::render_analysis(&analysis, ctx.catalog().len()));
        }
        return Ok(());
    }

    let prediction = pipeline::predict(&ctx, &req)?;
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({ "prediction": prediction.label }))?
        );
    } else {
        println!("{}", prediction.label);
    }
    Ok(())
}

fn run_vectorize(cfg: AppConfig, text: String, threshold: Option<f32>, json: bool) -> Result<()> {
    let ctx = pipeline::build_context(&cfg)?;
    let threshold = threshold.unwrap_or_else(|| ctx.default_threshold());
    let scores = pipeline::similarity_scores(&ctx, &text)?;
    let vector = doctext_core::vectorizer::vectorize(&scores, threshold)?;
    let ids = ctx.catalog().identifiers();

    if json {
        let symptoms: Vec<serde_json::Value> = ids
            .iter()
            .zip(scores.as_slice())
            .zip(vector.as_slice())
            .map(|((id, score), bit)| {
                serde_json::json!({ "symptom": id, "score": score, "present": *bit == 1 })
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "threshold": threshold,
                "vector": vector,
                "symptoms": symptoms,
            }))?
        );
    } else {
        println!("{}", output::render_bits(vector.as_slice()));
        for i in vector.present_indices() {
            println!("  {:<32} {:.3}", ids[i], scores.as_slice()[i]);
        }
    }
    Ok(())
}

fn run_catalog(cfg: AppConfig, json: bool) -> Result<()> {
    let ctx = pipeline::build_context(&cfg)?;
    let catalog = ctx.catalog();
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "symptoms": catalog.identifiers(),
                "dimension": catalog.dimension(),
                "encoder": ctx.encoder().model_name(),
                "labels": ctx.classifier().labels(),
                "threshold": ctx.default_threshold(),
            }))?
        );
    } else {
        println!(
            "{} symptoms, dimension {}, encoder {}",
            catalog.len(),
            catalog.dimension(),
            ctx.encoder().model_name()
        );
        println!("labels: {}", ctx.classifier().labels().join(", "));
        for id in catalog.identifiers() {
            println!("  {id}");
        }
    }
    Ok(())
}

async fn run_summarize(cfg: AppConfig, files: Vec<PathBuf>, medicines: bool) -> Result<()> {
    let summarizer = summarizer::build_summarizer(&cfg.summarizer);
    let loaded = files
        .iter()
        .map(|p| uploads::upload_from_path(p))
        .collect::<Result<Vec<_>>>()?;

    if medicines {
        for upload in &loaded {
            let out = summarizer.extract_medicines(upload).await?;
            println!("# {}\n{}", upload.filename, out.summary);
        }
    } else if loaded.len() == 1 {
        let out = summarizer.summarize(&loaded[0]).await?;
        println!("{}", out.summary);
    } else {
        let out = summarizer.summarize_all(&loaded).await?;
        println!("{}", out.summary);
    }
    Ok(())
}
