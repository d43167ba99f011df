use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use ns_client::{Effect, Event, HttpNewsApi, NewsClient, SortOrder, DEFAULT_PAGE_SIZE};
use ns_core::{NewsProvider, QuerySpec};
use ns_sources::{create_provider, init_logging, ProviderConfig};
use ns_storage::{FileStore, Preferences, SavedArticles, Theme};
use ns_web::handlers::{self, TRENDING_LIMIT};
use ns_web::{create_app, serve, AppState};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "newssphere", author, version, about = "News aggregation proxy and reader", long_about = None)]
pub struct Cli {
    #[arg(long, env = "PORT", default_value_t = 5000)]
    port: u16,
    #[arg(long, env = "NEWSDATA_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
    #[arg(long, env = "NEWSDATA_BASE_URL")]
    base_url: Option<String>,
    #[arg(long, env = "NEWSSPHERE_PUBLIC_DIR", default_value = "public")]
    public_dir: PathBuf,
    #[arg(long, default_value = "newsdata", help = "News provider. Available providers: newsdata (default), dummy")]
    provider: String,
    #[arg(long, env = "NEWSSPHERE_LOG", default_value = "info")]
    log_level: String,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP proxy and serve the static front end (default)
    Serve,
    /// Print aggregated top headlines as JSON
    Headlines {
        #[arg(long, default_value = "us")]
        country: String,
        #[arg(long)]
        category: Option<String>,
        /// Continuation token from a previous response
        #[arg(long)]
        page: Option<String>,
        #[arg(long)]
        page_size: Option<String>,
    },
    /// Print aggregated search results as JSON
    Search {
        q: String,
        #[arg(long)]
        language: Option<String>,
        #[arg(long)]
        page: Option<String>,
        #[arg(long)]
        page_size: Option<String>,
    },
    /// Print trending articles as JSON
    Trending {
        #[arg(long)]
        page_size: Option<String>,
    },
    /// Read headlines or search results from a running proxy
    Browse {
        #[arg(long, env = "NEWSSPHERE_SERVER", default_value = "http://localhost:5000")]
        server: String,
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        category: Option<String>,
        /// Overrides and remembers the preferred country
        #[arg(long)]
        country: Option<String>,
        /// Pages to load, following continuation tokens
        #[arg(long, default_value_t = 1)]
        pages: usize,
        #[arg(long, default_value = "latest")]
        sort: SortOrder,
        /// Save the article with this URL after loading
        #[arg(long)]
        save: Option<String>,
        #[arg(long)]
        html: bool,
        #[arg(long, env = "NEWSSPHERE_STORE", default_value = "newssphere-store.json")]
        store: PathBuf,
    },
    /// Manage saved articles
    Saved {
        #[arg(long, env = "NEWSSPHERE_STORE", default_value = "newssphere-store.json")]
        store: PathBuf,
        #[command(subcommand)]
        command: SavedCommands,
    },
    /// Show or change reader preferences
    Prefs {
        #[arg(long, env = "NEWSSPHERE_STORE", default_value = "newssphere-store.json")]
        store: PathBuf,
        #[arg(long)]
        theme: Option<String>,
        #[arg(long)]
        country: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum SavedCommands {
    List,
    Remove { url: String },
    Clear,
}

fn load_env() {
    // .env next to the executable first, then the working directory
    if let Some(dir) = std::env::current_exe().ok().and_then(|p| p.parent().map(|p| p.to_path_buf())) {
        let env_path = dir.join(".env");
        if env_path.exists() {
            dotenvy::from_path(&env_path).ok();
        }
    }
    dotenvy::dotenv().ok();
}

fn build_provider(cli: &Cli) -> anyhow::Result<Arc<dyn NewsProvider>> {
    let api_key = cli.api_key.clone().filter(|k| !k.trim().is_empty());
    if api_key.is_none() && cli.provider == "newsdata" {
        warn!("⚠️ NEWSDATA_API_KEY is not set. API requests will fail with 503.");
    }
    let config = ProviderConfig {
        api_key,
        base_url: cli.base_url.clone(),
    };
    let provider = create_provider(&cli.provider, config)?;
    info!("📰 News provider initialized (using {})", provider.name());
    Ok(provider)
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run_serve(cli: &Cli) -> anyhow::Result<()> {
    let mut state = AppState::new(build_provider(cli)?);
    if cli.public_dir.is_dir() {
        info!("📁 Serving static files from {}", cli.public_dir.display());
        state = state.with_public_dir(&cli.public_dir);
    } else {
        warn!("⚠️ Public directory {} not found, serving the API only", cli.public_dir.display());
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
    serve(addr, create_app(state))
        .await
        .with_context(|| format!("server on port {} stopped", cli.port))
}

async fn run_browse(
    server: &str,
    query: QuerySpec,
    pages: usize,
    sort: SortOrder,
    save: Option<String>,
    html: bool,
    store: FileStore,
) -> anyhow::Result<()> {
    let api = HttpNewsApi::new(server)?;
    let mut client = NewsClient::new(api, store, DEFAULT_PAGE_SIZE);

    client.dispatch(Event::SortChanged(sort)).await;
    let mut effects = client.dispatch(Event::QueryChanged(query)).await;
    for _ in 1..pages {
        if !client.controller().state().has_more {
            break;
        }
        effects.extend(client.dispatch(Event::LoadMoreRequested).await);
    }

    for effect in &effects {
        match effect {
            Effect::SetResultsLabel(label) => info!("🗞️ {}", label),
            Effect::ShowNoResults(true) => println!("No articles found."),
            Effect::ShowError { message, retryable } => {
                let hint = if *retryable { " (try again)" } else { "" };
                anyhow::bail!("{}{}", message, hint);
            }
            _ => {}
        }
    }

    let articles = client.controller().store().sorted_by_date(sort);
    if let Some(url) = save {
        match articles.iter().find(|a| a.url == url) {
            Some(article) => {
                let outcome = client.toggle_save(article)?;
                println!("{}", outcome.message());
            }
            None => warn!("⚠️ {} is not among the loaded articles", url),
        }
    }

    let now = Utc::now();
    let visible: Vec<_> = articles.into_iter().filter(|a| !a.is_placeholder()).collect();
    if html {
        for card in client.render_cards(&visible, now) {
            println!("{}", card.to_html());
        }
    } else {
        let saved = client.saved().saved_urls();
        for article in &visible {
            let marker = if saved.contains(&article.url) { "★" } else { " " };
            println!(
                "{} {} [{}, {}]\n    {}",
                marker,
                article.title,
                article.source_name,
                ns_client::format::relative_date(article.published_time(), now),
                article.url
            );
        }
    }

    if let Ok(panel) = tokio::time::timeout(std::time::Duration::from_secs(10), client.refresh_trending()).await {
        for node in panel.render(now) {
            info!("🔥 {}", node.text_content());
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_env();
    let cli = Cli::parse();
    let logger = init_logging(&cli.log_level);

    match cli.command.as_ref().unwrap_or(&Commands::Serve) {
        Commands::Serve => run_serve(&cli).await?,
        Commands::Headlines { country, category, page, page_size } => {
            let state = AppState::new(build_provider(&cli)?);
            let query = QuerySpec::headlines(country, category.as_deref()).with_page(page.clone());
            let size = handlers::parse_page_size(page_size.as_deref());
            let result = handlers::aggregate(&state, &query, None, size).await?;
            print_json(&handlers::ArticlesResponse::from(result))?;
        }
        Commands::Search { q, language, page, page_size } => {
            let query = QuerySpec::search(q);
            if let QuerySpec::Search { term, .. } = &query {
                if term.is_empty() {
                    anyhow::bail!("Search query \"q\" is required");
                }
            }
            let state = AppState::new(build_provider(&cli)?);
            let size = handlers::parse_page_size(page_size.as_deref());
            let query = query.with_page(page.clone());
            let result = handlers::aggregate(&state, &query, language.as_deref(), size).await?;
            print_json(&handlers::ArticlesResponse::from(result))?;
        }
        Commands::Trending { page_size } => {
            let state = AppState::new(build_provider(&cli)?);
            let limit = page_size
                .as_deref()
                .map(|raw| handlers::parse_page_size(Some(raw)).min(TRENDING_LIMIT))
                .unwrap_or(TRENDING_LIMIT);
            print_json(&handlers::collect_trending(&state, limit).await?)?;
        }
        Commands::Browse { server, search, category, country, pages, sort, save, html, store } => {
            let store = FileStore::open(store)?;
            let prefs = Preferences::new(&store);
            let country = match country {
                Some(country) => prefs.set_country(country)?,
                None => prefs.country(),
            };
            let query = match search.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
                Some(term) => QuerySpec::search(term),
                None => QuerySpec::headlines(&country, category.as_deref()),
            };
            logger.debug(&format!("browsing {:?} via {}", query, server));
            run_browse(server, query, *pages, *sort, save.clone(), *html, store).await?;
        }
        Commands::Saved { store, command } => {
            let saved = SavedArticles::new(FileStore::open(store)?);
            match command {
                SavedCommands::List => {
                    for article in saved.list() {
                        let article: ns_core::Article = article.into();
                        println!("{}", ns_client::render::render_saved_card(&article).to_html());
                    }
                }
                SavedCommands::Remove { url } => {
                    if saved.remove(url)? {
                        println!("Article removed from saved");
                    } else {
                        warn!("⚠️ {} was not saved", url);
                    }
                }
                SavedCommands::Clear => saved.clear()?,
            }
        }
        Commands::Prefs { store, theme, country } => {
            let store = FileStore::open(store)?;
            let prefs = Preferences::new(&store);
            if let Some(theme) = theme {
                prefs.set_theme(Theme::parse(theme))?;
            }
            if let Some(country) = country {
                prefs.set_country(country)?;
            }
            println!("theme: {}\ncountry: {}", prefs.theme().as_str(), prefs.country());
        }
    }

    Ok(())
}
