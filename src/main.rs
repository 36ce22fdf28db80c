//! Docent binary entry point.

use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use docent::agent_loop::{LoopRunner, MemoryThreadStore, TurnExecutor};
use docent::cli::{run_repl, Cli, Commands};
use docent::config::Config;
use docent::provider::anthropic::AnthropicProvider;
use docent::server::{self, AppState};
use docent::tools::human::HumanAssistanceTool;
use docent::tools::search::SearchTool;
use docent::tools::{Tool, ToolRegistry};
use docent::workspace::NotionWorkspace;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("docent=info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    let provider = Arc::new(AnthropicProvider::new(
        &config.model,
        config.anthropic_api_key.clone(),
        config.anthropic_base_url.clone(),
    ));

    let tools: Vec<Arc<dyn Tool>> = vec![
        Arc::new(SearchTool::new(
            config.tavily_api_key.clone(),
            config.tavily_base_url.clone(),
        )),
        Arc::new(HumanAssistanceTool::new()),
    ];
    let registry = Arc::new(ToolRegistry::from_tools(tools)?);
    let store = Arc::new(MemoryThreadStore::new());
    let runner = Arc::new(LoopRunner::new(
        TurnExecutor::new(provider),
        registry,
        store,
    ));

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => run_repl(runner).await?,
        Commands::Serve => {
            let workspace = Arc::new(NotionWorkspace::new(
                config.notion_api_key.clone(),
                config.notion_base_url.clone(),
            ));
            let app = server::router(AppState { runner, workspace });
            let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
            info!(addr = %config.bind_addr, "webhook server listening");
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
