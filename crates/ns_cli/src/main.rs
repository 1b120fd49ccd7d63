use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use clap::Parser;
use tracing::{info, warn};
use ns_core::{AnalysisStore, LanguageModel, Result};
use ns_inference::{AggregateAnalyzer, ArticleAnalyzer, FixedIntervalPacer, GeminiModel};
use ns_pipeline::{CompanyRegistry, Orchestrator};
use ns_sources::GoogleNewsSource;
use ns_speech::{GoogleSpeechSynthesizer, GoogleTranslator, Localizer};
use ns_storage::FileStore;
use ns_web::{create_app, AppState};

#[derive(Parser, Debug)]
#[command(author, version, about = "Company news sentiment analysis", long_about = None)]
struct Cli {
    /// Directory for cached analyses and audio artifacts
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Google API key (defaults to GOOGLE_API_KEY)
    #[arg(long)]
    api_key: Option<String>,

    /// Gemini model to use for analysis
    #[arg(long, default_value = "gemini-1.5-pro")]
    model: String,

    /// Target language for the translated verdict and audio
    #[arg(long, default_value = "hi")]
    lang: String,

    /// Seconds to wait between successive model calls
    #[arg(long, default_value_t = 20)]
    pace_secs: u64,

    /// Maximum articles to analyze per company
    #[arg(long, default_value_t = 10)]
    max_articles: usize,

    /// How many companies to process concurrently in batch mode
    #[arg(long, default_value_t = 3)]
    concurrency: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run the full pipeline for one company and print the result
    Analyze { company: String },
    /// Run the pipeline for every company in the company list
    Batch,
    /// Serve the read/refresh API
    Serve {
        #[arg(long, default_value_t = 8000)]
        port: u16,
    },
    /// List the configured companies
    Companies,
}

async fn build_orchestrator(cli: &Cli) -> Result<Orchestrator> {
    let store = Arc::new(FileStore::new(&cli.data_dir).await?);
    let registry = Arc::new(CompanyRegistry::from_csv_path(
        cli.data_dir.join("company_list.csv"),
    )?);

    let api_key = cli
        .api_key
        .clone()
        .or_else(|| std::env::var("GOOGLE_API_KEY").ok());
    let model: Arc<dyn LanguageModel> =
        Arc::new(GeminiModel::new(api_key)?.with_model_name(cli.model.clone()));
    info!("🧠 Inference model initialized successfully (using {})", model.name());

    let pacer = Arc::new(FixedIntervalPacer::new(Duration::from_secs(cli.pace_secs)));
    let localizer = Localizer::new(
        Arc::new(GoogleTranslator::new()),
        Arc::new(GoogleSpeechSynthesizer::new()),
        store.audio_dir(),
        cli.lang.clone(),
    );

    Ok(Orchestrator::new(
        Arc::new(GoogleNewsSource::new()),
        ArticleAnalyzer::new(model.clone(), pacer),
        AggregateAnalyzer::new(model),
        localizer,
        store,
        registry,
    )
    .with_max_articles(cli.max_articles)
    .with_concurrency(cli.concurrency))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Analyze { company } => {
            let orchestrator = build_orchestrator(&cli).await?;
            let analysis = orchestrator.run(company).await?;
            println!("{}", serde_json::to_string_pretty(&analysis)?);
        }
        Commands::Batch => {
            let orchestrator = build_orchestrator(&cli).await?;
            let companies = orchestrator.registry().names();
            if companies.is_empty() {
                warn!("Company list is empty, nothing to do");
                return Ok(());
            }
            info!("🏭 Processing {} companies", companies.len());
            let outcomes = orchestrator.run_many(&companies).await;
            for outcome in &outcomes {
                match &outcome.result {
                    Ok(_) => println!("✅ {}", outcome.company),
                    Err(e) => println!("❌ {}: {}", outcome.company, e),
                }
            }
        }
        Commands::Serve { port } => {
            let orchestrator = Arc::new(build_orchestrator(&cli).await?);
            let app = create_app(AppState { orchestrator });
            let addr = format!("0.0.0.0:{}", port);
            info!("🚀 Serving API on {}", addr);
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            axum::serve(listener, app)
                .await
                .map_err(|e| ns_core::Error::Io(e))?;
        }
        Commands::Companies => {
            let registry = CompanyRegistry::from_csv_path(cli.data_dir.join("company_list.csv"))?;
            for entry in registry.entries() {
                match &entry.ticker {
                    Some(ticker) => println!("{} ({})", entry.name, ticker),
                    None => println!("{}", entry.name),
                }
            }
        }
    }

    Ok(())
}
