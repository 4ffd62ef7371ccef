use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use colored::Colorize;
use dotenv::dotenv;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;
use tokio::net::TcpListener;

use nutribot::api;
use nutribot::commands::CommandHandler;
use nutribot::config::BotConfig;
use nutribot::nutrition::{CacheStore, ImageLabeler, NutritionEstimator, Resolver, SpoonacularClient};
use nutribot::providers::traits::AdviceProvider;
use nutribot::providers::{ClarifaiClient, OpenAIAdvisor};

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Run the webhook API server instead of the interactive prompt
    #[arg(long)]
    server: bool,

    #[arg(long, default_value = "3000")]
    port: u16,

    /// Override the nutrition cache file location
    #[arg(long)]
    cache: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize colored output
    colored::control::set_override(true);

    // Load environment variables
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();

    let mut config = BotConfig::from_env()?;
    if let Some(cache) = &args.cache {
        config.cache_path = cache.clone();
    }

    let cache = Arc::new(CacheStore::open(&config.cache_path).await);
    let estimator: Arc<dyn NutritionEstimator> = Arc::new(SpoonacularClient::new(
        config.spoonacular_api_key.clone(),
        config.estimator_timeout,
    ));
    let labeler: Option<Arc<dyn ImageLabeler>> = config
        .clarifai_api_key
        .clone()
        .map(|key| Arc::new(ClarifaiClient::new(key)) as Arc<dyn ImageLabeler>);
    let advisor: Option<Arc<dyn AdviceProvider>> = config
        .openai_api_key
        .clone()
        .map(|key| Arc::new(OpenAIAdvisor::new(key)) as Arc<dyn AdviceProvider>);

    let resolver = Arc::new(Resolver::new(
        cache,
        estimator,
        labeler,
        config.min_label_confidence,
    ));

    if args.server {
        run_api_server(args.port, resolver, advisor).await
    } else {
        run_cli_mode(resolver, advisor).await
    }
}

async fn run_api_server(
    port: u16,
    resolver: Arc<Resolver>,
    advisor: Option<Arc<dyn AdviceProvider>>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let addr: SocketAddr = format!("0.0.0.0:{}", port).parse()?;
    println!("Starting webhook server on {}", addr);

    let app = api::create_api(resolver, advisor);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn run_cli_mode(
    resolver: Arc<Resolver>,
    advisor: Option<Arc<dyn AdviceProvider>>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let command_handler = CommandHandler::new(resolver, advisor);

    // Show initial help menu
    command_handler.handle_command("help").await.ok();

    // Initialize rustyline editor
    let mut rl = Editor::<(), DefaultHistory>::new()?;

    // Main input loop
    loop {
        match rl.readline("🍽  ") {
            Ok(line) => {
                let input = line.trim();
                let _ = rl.add_history_entry(input);

                if let Err(e) = command_handler.handle_command(input).await {
                    println!("{}", e.red());
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            }
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }
    Ok(())
}
