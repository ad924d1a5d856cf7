use std::sync::Arc;

use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
use colored::*;

use kb_search::app::App;
use kb_search::config::{Config, BASE_URL_ENV};
use kb_search::handler::handle_event;
use kb_search::logging::init_logging;
use kb_search::session::SessionState;
use kb_search::tui::{self, EventHandler, Tui};
use kb_search::view::{history_view, select_panel, Panel};
use kb_search::{ui, KnowledgeBaseClient, SearchBackend};

#[derive(Parser)]
#[command(name = "kbsearch")]
#[command(about = "Search a knowledge base and read AI-summarized answers", version)]
struct Cli {
    /// Backend base URL (overrides KB_SEARCH_URL and the config file)
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask one question and print the answer
    Ask {
        /// Your question
        question: Vec<String>,
    },
    /// Print past searches, newest first
    History {
        /// Show every entry instead of the most recent ones
        #[arg(short, long)]
        all: bool,
    },
    /// Save the backend base URL to the config file
    SetUrl {
        url: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("{}: {}", "Ignoring unreadable config".yellow(), e);
        Config::new()
    });
    init_logging(&config);

    let env_url = std::env::var(BASE_URL_ENV).ok();
    let base_url = config.resolve_base_url(cli.base_url.as_deref(), env_url.as_deref());
    tracing::info!(%base_url, "starting kbsearch");
    let client = KnowledgeBaseClient::new(&base_url);

    match cli.command {
        None => run_tui(Arc::new(client)).await?,
        Some(Commands::Ask { question }) => ask(&client, &question.join(" ")).await?,
        Some(Commands::History { all }) => print_history(&client, all).await?,
        Some(Commands::SetUrl { url }) => {
            let path = Config::save_base_url(&url)?;
            println!("Saved backend URL {} to {}", url.bold(), path.display());
        }
    }

    Ok(())
}

async fn run_tui(backend: Arc<dyn SearchBackend>) -> Result<()> {
    tui::install_panic_hook();
    let mut terminal = tui::init()?;

    let mut app = App::new(backend);
    app.load_history();

    let result = run_loop(&mut terminal, &mut app).await;

    tui::restore()?;
    result
}

async fn run_loop(terminal: &mut Tui, app: &mut App) -> Result<()> {
    let mut events = EventHandler::new();

    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handle_event(app, event).await?,
            None => break,
        }
    }

    Ok(())
}

async fn ask(client: &KnowledgeBaseClient, question: &str) -> Result<()> {
    let mut session = SessionState::new();
    session.set_input(question);

    let Some(query) = session.begin_submit() else {
        return Err(anyhow!("Nothing to search for"));
    };

    println!("🔍 Searching for: {}", query.bold().cyan());
    session.finish_submit(client.create_search_query(&query).await);

    if let Some(message) = session.error() {
        return Err(anyhow!("{} ({})", message, client.base_url()));
    }

    if let Panel::Result(result) = select_panel(&session) {
        println!("\n{}", result.question.bold().green());
        println!("{}", "=".repeat(50).dimmed());
        println!("{}", result.summary);

        if !result.articles.is_empty() {
            println!("\n{}", "Related Articles:".bold().blue());
            for article in &result.articles {
                println!("• {} {}", article.title.yellow(), format!("({})", article.id).dimmed());
            }
        }
    }

    Ok(())
}

async fn print_history(client: &KnowledgeBaseClient, all: bool) -> Result<()> {
    let mut session = SessionState::new();
    session.apply_history(client.list_search_queries().await);

    if let Some(message) = session.error() {
        return Err(anyhow!("{} ({})", message, client.base_url()));
    }

    if all {
        session.toggle_history();
    }
    let history = history_view(&session);

    if history.items.is_empty() {
        println!("{}", "No searches yet".yellow());
        return Ok(());
    }

    println!("\n{}", "🕘 Recent Searches".bold().blue());
    println!("{}", "=".repeat(40).dimmed());
    for item in &history.items {
        println!(
            "{} {}  {}",
            format!("#{}", item.id).bold().yellow(),
            item.created.dimmed(),
            item.question
        );
    }

    if history.items.len() < history.total {
        println!(
            "\n{} of {} shown. Use {} to list all.",
            history.items.len(),
            history.total,
            "--all".bold()
        );
    }

    Ok(())
}
