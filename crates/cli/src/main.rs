use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use coach_chat::{
    ChatProvider, CoachConfig, DisabledSearch, GroqClient, Message, Orchestrator, ResponseMode,
    SearchProvider, TavilyClient,
};
use coach_retriever::{Retriever, DEFAULT_TOP_K};
use coach_vector_store::{Embedder, EmbedderConfig, IndexStore};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "coach")]
#[command(about = "Interview-prep assistant grounded in a local study guide", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Corpus file (overrides COACH_CORPUS)
    #[arg(long, global = true)]
    corpus: Option<PathBuf>,

    /// Index directory (overrides COACH_INDEX_DIR)
    #[arg(long, global = true)]
    index_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive coaching session over stdin
    Chat(ChatArgs),

    /// Ask a single question and print the answer
    Ask(AskArgs),

    /// Print the raw retrieved chunks for a query, with distances
    Search(SearchArgs),

    /// Build the persistent index from the corpus
    Index(IndexArgs),
}

#[derive(Args)]
struct ChatArgs {
    /// Answer style
    #[arg(long, value_enum, default_value_t = Mode::Concise)]
    mode: Mode,
}

#[derive(Args)]
struct AskArgs {
    /// The question to ask
    question: String,

    /// Answer style
    #[arg(long, value_enum, default_value_t = Mode::Concise)]
    mode: Mode,
}

#[derive(Args)]
struct SearchArgs {
    /// Query text
    query: String,

    /// Number of chunks to return
    #[arg(short = 'k', long = "top-k", default_value_t = DEFAULT_TOP_K)]
    top_k: usize,
}

#[derive(Args)]
struct IndexArgs {
    /// Rebuild even when an index already exists
    #[arg(long)]
    rebuild: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    Concise,
    Detailed,
}

impl From<Mode> for ResponseMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Concise => Self::Concise,
            Mode::Detailed => Self::Detailed,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let mut config = CoachConfig::from_env();
    if let Some(corpus) = cli.corpus {
        config.corpus_path = corpus;
    }
    if let Some(index_dir) = cli.index_dir {
        config.index_dir = index_dir;
    }

    match cli.command {
        Commands::Chat(args) => run_chat(&config, args.mode.into(), cli.quiet).await,
        Commands::Ask(args) => run_ask(&config, &args.question, args.mode.into(), cli.quiet).await,
        Commands::Search(args) => run_search(&config, &args.query, args.top_k, cli.quiet).await,
        Commands::Index(args) => run_index(&config, args.rebuild, cli.quiet).await,
    }
}

async fn run_chat(config: &CoachConfig, mode: ResponseMode, quiet: bool) -> Result<()> {
    let orchestrator = build_orchestrator(config, quiet)?;
    let mut history: Vec<Message> = Vec::new();
    let stdin = std::io::stdin();

    println!("Interview coach ready. Ask a question, or type exit/quit to leave.");
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }
        let question = line.trim();
        if question.is_empty() {
            continue;
        }
        if question.eq_ignore_ascii_case("exit") || question.eq_ignore_ascii_case("quit") {
            break;
        }

        match orchestrator.respond(question, &history, mode).await {
            Ok(answer) => {
                println!("{answer}\n");
                history.push(Message::user(question));
                history.push(Message::assistant(&answer));
            }
            Err(e) => log::error!("{e}"),
        }
    }
    Ok(())
}

async fn run_ask(
    config: &CoachConfig,
    question: &str,
    mode: ResponseMode,
    quiet: bool,
) -> Result<()> {
    let orchestrator = build_orchestrator(config, quiet)?;
    let answer = orchestrator.respond(question, &[], mode).await?;
    println!("{answer}");
    Ok(())
}

async fn run_search(config: &CoachConfig, query: &str, top_k: usize, quiet: bool) -> Result<()> {
    let embedder = load_embedder(config, quiet)?;
    let retriever = Retriever::new(IndexStore::new(embedder), config.retriever_config());

    let hits = retriever.try_retrieve(query, top_k).await?;
    if hits.is_empty() {
        println!("No matching chunks.");
        return Ok(());
    }
    for (rank, hit) in hits.iter().enumerate() {
        println!("{:>2}. [distance {:.4}]", rank + 1, hit.distance);
        println!("{}\n", hit.chunk.content);
    }
    Ok(())
}

async fn run_index(config: &CoachConfig, rebuild: bool, quiet: bool) -> Result<()> {
    let embedder = load_embedder(config, quiet)?;
    let store = IndexStore::new(embedder);

    if !rebuild && IndexStore::exists(&config.index_dir).await {
        let index = store.load(&config.index_dir).await?;
        println!(
            "Index at {} already holds {} chunks. Use --rebuild to force.",
            config.index_dir.display(),
            index.len()
        );
        return Ok(());
    }

    let corpus = tokio::fs::read_to_string(&config.corpus_path)
        .await
        .with_context(|| format!("Failed to read corpus {}", config.corpus_path.display()))?;

    let retrieval = config.retriever_config();
    let index = store
        .build(&corpus, retrieval.chunk_size, retrieval.chunk_overlap)
        .await?;
    store.save(&index, &config.index_dir).await?;

    println!(
        "Indexed {} chunks into {}",
        index.len(),
        config.index_dir.display()
    );
    Ok(())
}

fn build_orchestrator(config: &CoachConfig, quiet: bool) -> Result<Orchestrator> {
    // Check the key before paying for a model load.
    let chat: Arc<dyn ChatProvider> =
        Arc::new(GroqClient::new(config).context("Chat requires a Groq API key")?);

    let search: Arc<dyn SearchProvider> = match TavilyClient::new(config) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            log::debug!("Web search disabled: {e}");
            Arc::new(DisabledSearch)
        }
    };

    let embedder = load_embedder(config, quiet)?;
    let retriever = Arc::new(Retriever::new(
        IndexStore::new(embedder),
        config.retriever_config(),
    ));

    Ok(Orchestrator::new(chat, search, retriever))
}

fn load_embedder(config: &CoachConfig, quiet: bool) -> Result<Arc<Embedder>> {
    let mut embedder_config = EmbedderConfig::for_model(&config.embedding_model);
    embedder_config.show_download_progress = !quiet;

    let embedder = Embedder::load(&embedder_config)
        .with_context(|| format!("Failed to load embedding model '{}'", config.embedding_model))?;
    Ok(Arc::new(embedder))
}
