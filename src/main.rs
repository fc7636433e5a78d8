use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use docent_channels::CliChannel;
use docent_core::channel::format_answer;
use docent_core::config::{CorpusConfig, ProviderKind};
use docent_core::session::run_session;
use docent_core::{ChatHistory, ChatTurn, Config, IndexStats, QuestionAnswerer, RagService};
use docent_gateway::GatewayServer;
use docent_llm::any::AnyProvider;
use docent_llm::ollama::OllamaProvider;
use docent_llm::openai::OpenAiProvider;
use tokio::sync::watch;

const LOADED_MESSAGE: &str = "All documents loaded successfully.";

#[derive(Debug, Parser)]
#[command(name = "docent", version, about = "Ask questions about a local document collection")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Interactive question loop in the terminal (default).
    Chat,
    /// Web chat with a WebSocket feed of every turn.
    Serve,
    /// Answer one question and exit.
    Ask {
        #[arg(required = true)]
        question: Vec<String>,
    },
}

type Service = RagService<AnyProvider>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_subscriber();

    let config_path = resolve_config_path(cli.config);
    let config = Config::load(&config_path)?;
    config.validate()?;
    tracing::debug!(path = %config_path.display(), "configuration loaded");

    let provider = create_provider(&config)?;
    health_check(&provider).await;
    let service = Arc::new(RagService::from_config(Arc::new(provider), &config));

    match cli.command.unwrap_or(Command::Chat) {
        Command::Chat => run_chat(&config, &service).await,
        Command::Serve => run_serve(&config, service).await,
        Command::Ask { question } => run_ask(&config, &service, &question.join(" ")).await,
    }
}

async fn initialize(corpus: &CorpusConfig, service: &Service) -> anyhow::Result<IndexStats> {
    service
        .initialize(&corpus.root, corpus.chunk_size, corpus.chunk_overlap)
        .await
        .with_context(|| format!("failed to load documents from {}", corpus.root.display()))
}

async fn run_chat(config: &Config, service: &Service) -> anyhow::Result<()> {
    let stats = initialize(&config.corpus, service).await?;
    println!(
        "Loaded {} document(s) into {} fragment(s).",
        stats.documents, stats.chunks
    );

    let mut channel = CliChannel::new();
    run_session(&mut channel, service).await?;
    Ok(())
}

async fn run_ask(config: &Config, service: &Service, question: &str) -> anyhow::Result<()> {
    initialize(&config.corpus, service).await?;
    let answer = service.ask(question).await?;
    println!("{}", format_answer(&answer));
    Ok(())
}

async fn run_serve(config: &Config, service: Arc<Service>) -> anyhow::Result<()> {
    let history = Arc::new(ChatHistory::new(config.gateway.history_capacity));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for ctrl-c: {e:#}");
            return;
        }
        tracing::info!("received shutdown signal");
        let _ = shutdown_tx.send(true);
    });

    let loader = Arc::clone(&service);
    let loader_history = Arc::clone(&history);
    let corpus = config.corpus.clone();
    tokio::spawn(async move {
        match initialize(&corpus, &loader).await {
            Ok(_) => loader_history.publish(ChatTurn::assistant(LOADED_MESSAGE)),
            Err(e) => loader_history.publish(ChatTurn::failure(format!("{e:#}"))),
        }
    });

    let answerer: Arc<dyn QuestionAnswerer> = service;
    GatewayServer::new(
        &config.gateway.bind,
        config.gateway.port,
        answerer,
        history,
        shutdown_rx,
    )
    .with_max_body_size(config.gateway.max_body_size)
    .with_corpus_root(config.corpus.root.clone())
    .serve()
    .await?;
    Ok(())
}

fn create_provider(config: &Config) -> anyhow::Result<AnyProvider> {
    match config.llm.provider {
        ProviderKind::Ollama => {
            let provider = OllamaProvider::new(
                &config.llm.base_url,
                config.llm.model.clone(),
                config.llm.embedding_model.clone(),
            )?
            .with_generation(config.llm.temperature, config.llm.max_tokens);
            Ok(AnyProvider::Ollama(provider))
        }
        ProviderKind::OpenAi => {
            let api_key = config
                .secrets
                .openai_api_key
                .as_ref()
                .context("DOCENT_OPENAI_API_KEY or OPENAI_API_KEY is required for openai")?;
            let openai = config.openai();
            let provider = OpenAiProvider::new(
                api_key.expose().to_owned(),
                openai.base_url,
                openai.model,
                config.llm.max_tokens,
                openai.embedding_model,
            )
            .with_temperature(config.llm.temperature);
            Ok(AnyProvider::OpenAi(provider))
        }
    }
}

async fn health_check(provider: &AnyProvider) {
    if let AnyProvider::Ollama(ollama) = provider {
        match ollama.health_check().await {
            Ok(()) => tracing::info!("ollama health check passed"),
            Err(e) => tracing::warn!("ollama health check failed: {e:#}"),
        }
    }
}

fn resolve_config_path(flag: Option<PathBuf>) -> PathBuf {
    if let Some(path) = flag {
        return path;
    }
    if let Ok(path) = std::env::var("DOCENT_CONFIG") {
        return PathBuf::from(path);
    }
    PathBuf::from("config/default.toml")
}

/// Logs go to stderr so they never interleave with answers on stdout.
fn init_subscriber() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
