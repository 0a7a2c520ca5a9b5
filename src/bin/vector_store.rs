// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Persistent semantic search over titled, categorised text records.
//!
//! ```bash
//! # add one record
//! vector-store add --title "AI News" --category technology \
//!     --content "Artificial Intelligence is transforming the world."
//!
//! # add a JSON batch of {title, category, content} objects
//! vector-store add --file entries.json
//!
//! # search, optionally filtered
//! vector-store query "France" --top-k 1 --category travel
//! ```

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, warn};
use vector_store::config::{EmbedderBackend, EmbedderConfig, StoreConfig};
use vector_store::core::{IngestItem, QueryHit, SearchFilter};
use vector_store::embedding;
use vector_store::engine::{sources, IngestionPipeline, QueryEngine, QueryOptions};
use vector_store::error::exit_code;
use vector_store::storage::StorePersister;
use vector_store::StoreError;

#[derive(Parser)]
#[command(name = "vector-store")]
#[command(about = "Persistent semantic vector store with metadata filtering")]
#[command(version)]
struct Cli {
    /// Directory holding the index and records files
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Embedding model identifier, passed to the service as-is
    #[arg(long, global = true)]
    model: Option<String>,

    /// Embedding backend: openai or hashing (offline)
    #[arg(long, global = true)]
    embedder: Option<EmbedderBackend>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Embed new entries and append them to the store
    Add(AddArgs),

    /// Semantic search with optional metadata filters
    Query(QueryArgs),

    /// Show what the store holds
    Stats,
}

#[derive(Args)]
struct AddArgs {
    /// Title of the document
    #[arg(long)]
    title: Option<String>,

    /// Category of the document
    #[arg(long)]
    category: Option<String>,

    /// Content text of the document
    #[arg(long)]
    content: Option<String>,

    /// JSON file with a list of {title, category, content} objects
    #[arg(long, conflicts_with_all = ["title", "category", "content", "text", "lines"])]
    file: Option<PathBuf>,

    /// Bare text to add without title or category
    #[arg(long, conflicts_with_all = ["title", "category", "content", "lines"])]
    text: Option<String>,

    /// File with one text per line
    #[arg(long, conflicts_with_all = ["title", "category", "content"])]
    lines: Option<PathBuf>,
}

#[derive(Args)]
struct QueryArgs {
    /// Search query
    text: String,

    /// Number of results
    #[arg(long)]
    top_k: Option<usize>,

    /// Keep only results in this category
    #[arg(long = "category", alias = "filter-category")]
    category: Option<String>,

    /// Keep only the result with this doc_id
    #[arg(long = "doc-id", alias = "filter-doc-id")]
    doc_id: Option<String>,

    /// Drop results farther than this squared L2 distance
    #[arg(long)]
    max_distance: Option<f32>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vector_store=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::from(exit_code::SUCCESS as u8),
        Err(e) => {
            error!("{:#}", e);
            eprintln!("[Error] {:#}", e);
            ExitCode::from(exit_code_for(&e) as u8)
        }
    }
}

/// The exit code for an error, looking through any added context.
fn exit_code_for(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<StoreError>()
        .map_or(exit_code::FAILURE, StoreError::exit_code)
}

/// A `--model` the chosen backend will not use.
fn ignored_model(backend: EmbedderBackend, model: Option<&str>) -> Option<&str> {
    model.filter(|_| backend == EmbedderBackend::Hashing)
}

async fn run(cli: Cli) -> Result<()> {
    let mut store_config = StoreConfig::from_env();
    if let Some(dir) = cli.data_dir {
        store_config.data_dir = dir;
    }

    let mut embedder_config = EmbedderConfig::from_env();
    if let Some(backend) = cli.embedder {
        embedder_config.backend = backend;
    }
    if let Some(model) = ignored_model(embedder_config.backend, cli.model.as_deref()) {
        warn!("--model {} has no effect with the hashing embedder", model);
    }
    if let Some(model) = cli.model {
        embedder_config.model = model;
    }

    let persister = StorePersister::new(store_config.location());
    let mut store = persister
        .load_or_empty()
        .await
        .map_err(StoreError::from)
        .with_context(|| format!("loading store from {}", persister.location().dir().display()))?;

    match cli.command {
        Command::Stats => {
            println!("Records:   {}", store.len());
            match store.dimension() {
                Some(d) => println!("Dimension: {}", d),
                None => println!("Dimension: (not yet established)"),
            }
            println!("Index:     {}", persister.location().index_path().display());
            println!("Records:   {}", persister.location().records_path().display());
            Ok(())
        }
        Command::Add(args) => {
            let items = collect_items(args).await.context("reading entries to add")?;
            let embedder =
                embedding::from_config(&embedder_config).map_err(|e| StoreError::embedding(None, e))?;
            let pipeline = IngestionPipeline::new(embedder, persister);
            let ids = pipeline.ingest(&mut store, items).await?;
            println!("[Added] {} entries (store now holds {})", ids.len(), store.len());
            for id in ids {
                println!("  doc_id={}", id);
            }
            Ok(())
        }
        Command::Query(args) => {
            if store.is_empty() {
                return Err(StoreError::EmptyStore.into());
            }
            let embedder =
                embedding::from_config(&embedder_config).map_err(|e| StoreError::embedding(None, e))?;
            let engine = QueryEngine::with_overfetch(embedder, store_config.overfetch_factor);

            let mut filter = SearchFilter::new();
            filter.category = args.category;
            filter.doc_id = args.doc_id;
            let options = QueryOptions {
                top_k: args.top_k.unwrap_or(store_config.default_top_k),
                filter,
                max_distance: args.max_distance,
            };

            let hits = engine.query(&store, &args.text, &options).await?;
            print_hits(&args.text, &hits);
            Ok(())
        }
    }
}

async fn collect_items(args: AddArgs) -> vector_store::Result<Vec<IngestItem>> {
    if let Some(path) = args.file {
        return sources::read_json_batch(path).await;
    }
    if let Some(text) = args.text {
        return Ok(vec![sources::text_item(text)?]);
    }
    if let Some(path) = args.lines {
        return sources::read_lines(path).await;
    }
    if args.title.is_none() && args.category.is_none() && args.content.is_none() {
        return Err(StoreError::Usage(
            "to add, provide --title --category --content, --file, --text or --lines".to_string(),
        ));
    }
    Ok(vec![sources::single_document(
        args.title,
        args.category,
        args.content,
    )?])
}

fn print_hits(query: &str, hits: &[QueryHit]) {
    println!("[Query] {}", query);
    if hits.is_empty() {
        println!("No results.");
        return;
    }
    for (rank, hit) in hits.iter().enumerate() {
        let record = &hit.record;
        println!(
            "{}. [{}] {} (doc_id={})",
            rank + 1,
            record.category,
            record.title,
            record.doc_id
        );
        println!("    Content: {}", record.content);
        println!("    Distance: {:.4}", hit.distance);
    }
}
