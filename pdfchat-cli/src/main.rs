use anyhow::{bail, Context, Result};
use clap::Parser;
use colored::Colorize;
use pdfchat_core::{
    extract_pdf_text, Answer, ApiKey, Config, GeminiClient, Pipeline, QdrantStore, API_KEY_ENV,
};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pdfchat")]
#[command(about = "Ask questions about a PDF: extract, chunk, store, and query its content", long_about = None)]
#[command(version)]
struct Cli {
    /// Vector store collection name
    #[arg(long, default_value = "pdf_chunks")]
    collection: String,

    /// Configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let mut config = if cli.config.exists() {
        Config::load(&cli.config).context("Failed to load config")?
    } else {
        Config::default()
    };
    config.storage.collection_name = cli.collection;

    // Resolved once, before any pipeline step runs.
    let api_key = ApiKey::from_env(API_KEY_ENV)?;

    println!("Please provide the PDF file to process.");
    let pdf_path = prompt_pdf_path()?;

    println!("Extracting and chunking PDF...");
    let text = extract_pdf_text(&pdf_path)?;

    let client = Arc::new(
        GeminiClient::new(&config.llm, api_key).context("Failed to build Gemini client")?,
    );
    let store = Arc::new(
        QdrantStore::new(&config.storage, config.llm.embedding_dim)
            .await
            .context("Failed to connect to vector store")?,
    );
    let pipeline = Pipeline::new(&config, client.clone(), store, client);

    println!(
        "Storing chunks in {}...",
        config.storage.collection_name.cyan()
    );
    let stored = pipeline.ingest(&text).await?;
    println!("{} Stored {} chunks.", "✓".green().bold(), stored);

    println!("\nNow you can ask a question about the PDF content.");
    let question = prompt_question()?;

    println!("Retrieving relevant chunks...");
    match pipeline.answer(&question).await? {
        Answer::NoRelevantContext => bail!("no relevant content found for the question"),
        Answer::Text(answer) => {
            println!("\n{}", "Answer:".bold().green());
            println!("{}", "-".repeat(50));
            println!("{answer}");
            println!("{}", "-".repeat(50));
        }
    }

    Ok(())
}

/// Prompts for the source PDF path. The file must carry a `.pdf` extension
/// and exist on disk.
fn prompt_pdf_path() -> Result<PathBuf> {
    let input = read_line("Enter the PDF file name (e.g., sample.pdf): ")?;
    let path = PathBuf::from(input.trim());

    let is_pdf = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
    if !is_pdf {
        bail!("file must have a .pdf extension: {}", path.display());
    }
    if !path.is_file() {
        bail!("file not found: {}", path.display());
    }

    Ok(path)
}

/// Prompts for the question text; must be non-empty after trimming.
fn prompt_question() -> Result<String> {
    let input = read_line("Enter your question about the PDF content: ")?;
    let question = input.trim().to_string();
    if question.is_empty() {
        bail!("question must not be empty");
    }

    Ok(question)
}

fn read_line(prompt: &str) -> Result<String> {
    print!("{prompt}");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin()
        .read_line(&mut line)
        .context("Failed to read input")?;
    Ok(line)
}
