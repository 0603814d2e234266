use astra::Server;
use clap::{Parser, Subcommand};
use tracing::{error, info};

use crate::config::AppConfig;
use crate::db::accounts::{get_account, set_charity};
use crate::domain::query::{listing_query, SearchFilters, Viewer};
use crate::errors::ServerError;
use crate::state::AppState;

mod auth;
mod config;
mod db;
mod domain;
mod errors;
mod request;
mod responses;
mod router;
mod state;
mod storage;
mod templates;


#[derive(Parser)]
#[command(name = "marketplace")]
#[command(about = "Community marketplace for giving away second-hand items")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the web server (default)
    Serve,

    /// Grant or revoke charity status for an account
    Charity {
        account_id: String,
        #[arg(long)]
        revoke: bool,
    },

    /// Print the listing search SQL built for a viewer role
    Query {
        /// public, auth or charity
        role: String,
        #[arg(long)]
        user_id: Option<String>,
        #[arg(short = 's', long)]
        term: Option<String>,
        #[arg(short = 'c', long)]
        category: Option<String>,
        #[arg(short = 'l', long)]
        location: Option<String>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "marketplace=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Serve);

    // Needs neither config nor database.
    if let Commands::Query {
        role,
        user_id,
        term,
        category,
        location,
    } = &command
    {
        let viewer = match Viewer::from_tag(role, user_id.as_deref()) {
            Ok(viewer) => viewer,
            Err(e) => {
                error!(error = %e, "invalid viewer");
                std::process::exit(1);
            }
        };
        let filters = SearchFilters::new(term.as_deref(), category.as_deref(), location.as_deref());
        let q = listing_query(&viewer, &filters);
        println!("{}", q.query);
        for (i, value) in q.bindings.iter().enumerate() {
            println!("?{} = {value:?}", i + 1);
        }
        return;
    }

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };

    let app = match AppState::from_config(config) {
        Ok(app) => app,
        Err(e) => {
            error!(error = %e, "startup failed");
            std::process::exit(1);
        }
    };

    match command {
        Commands::Serve => serve(app),
        Commands::Charity { account_id, revoke } => {
            let charity = !revoke;
            let updated = app.db.with_conn(|conn| {
                get_account(conn, &account_id)?.ok_or_else(|| {
                    ServerError::BadRequest("no such account; sign in once first".into())
                })?;
                set_charity(conn, &account_id, charity)
            });
            match updated {
                Ok(()) => info!(account = %account_id, charity, "charity status updated"),
                Err(e) => {
                    error!(account = %account_id, error = %e, "failed to update charity status");
                    std::process::exit(1);
                }
            }
        }
        Commands::Query { .. } => {}
    }
}

fn serve(app: AppState) {
    let addr = match app.config.socket_addr() {
        Ok(addr) => addr,
        Err(e) => {
            error!(error = %e, "invalid listen address");
            std::process::exit(1);
        }
    };

    info!(%addr, workers = app.config.max_workers, db = app.db.path(), "starting server");

    let server = Server::bind(&addr).max_workers(app.config.max_workers);
    let result = server.serve(move |req, _info| router::serve(req, &app));

    if let Err(e) = result {
        error!(error = %e, "server stopped with error");
        std::process::exit(1);
    }

    info!("server shut down cleanly");
}
