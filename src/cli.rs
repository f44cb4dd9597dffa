use std::path::PathBuf;
use std::sync::Arc;

use abyss::config::Config;
use abyss::http::{HttpMethod, ProxyClient};
use abyss::requester::{Proxy, RemoteProxy, Requester};
use abyss::store::{Action, Store, TabUpdate};
use abyss::sync::{SyncController, SyncStatus, WorkspaceRemote};
use abyss::utils::formatter::{ResponseFormat, ResponseFormatter};
use abyss::utils::printer::history_table;
use abyss::workspace::{HeaderEntry, WorkspaceStorage, parse_document};
use clap::{Args, Parser, Subcommand};

pub type Result<T> = std::result::Result<T, anyhow::Error>;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Directory holding workspace.json
    #[arg(long, global = true, env = "ABYSS_WORKSPACE_DIR")]
    pub workspace_dir: Option<PathBuf>,

    #[command(flatten)]
    pub serve: ServeArgs,
}

#[derive(Args, Clone, Default)]
pub struct ServeArgs {
    #[arg(long, env = "ABYSS_HOST")]
    pub host: Option<String>,

    #[arg(long, env = "ABYSS_PORT")]
    pub port: Option<u16>,

    /// Built client bundle to serve
    #[arg(long, env = "ABYSS_STATIC_DIR")]
    pub static_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the local server (the default)
    Dev(ServeArgs),

    /// Send one request and record it in the workspace history
    Send {
        method: String,
        url: String,

        /// `Name: value`, repeatable
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,

        #[arg(short = 'd', long = "data")]
        data: Option<String>,

        /// Interpolate `{{name}}` from this environment
        #[arg(short, long)]
        env: Option<String>,

        /// Go through a running server instead of calling the target directly
        #[arg(long)]
        via: Option<String>,

        #[arg(short, long)]
        verbose: bool,
    },

    /// Show recent requests
    History {
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },
}

impl ServeArgs {
    fn apply(self, config: &mut Config) {
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(dir) = self.static_dir {
            config.server.static_dir = Some(dir);
        }
    }
}

pub async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load()?;
    if let Some(dir) = cli.workspace_dir {
        config.workspace.dir = dir;
    }

    match cli.command {
        None => {
            cli.serve.apply(&mut config);
            abyss::server::serve(&config).await?;
        }
        Some(Commands::Dev(args)) => {
            args.apply(&mut config);
            abyss::server::serve(&config).await?;
        }
        Some(Commands::Send {
            method,
            url,
            headers,
            data,
            env,
            via,
            verbose,
        }) => {
            let request = SendRequest {
                method: HttpMethod::parse(&method)?,
                url,
                headers: headers
                    .iter()
                    .map(|h| parse_header(h))
                    .collect::<Result<Vec<_>>>()?,
                body: data.unwrap_or_default(),
                env,
            };
            let format = if verbose {
                ResponseFormat::Verbose
            } else {
                ResponseFormat::Compact
            };
            match via {
                Some(base) => send(&config, request, RemoteProxy::new(&base), format).await?,
                None => {
                    let proxy = ProxyClient::with_timeout(config.proxy.timeout())?;
                    send(&config, request, proxy, format).await?
                }
            }
        }
        Some(Commands::History { limit }) => {
            let storage = WorkspaceStorage::in_dir(&config.workspace.dir);
            let history = WorkspaceRemote::read(&storage)
                .await?
                .as_ref()
                .and_then(parse_document)
                .map(|shared| shared.history)
                .unwrap_or_default();
            if history.is_empty() {
                println!("No history yet");
            } else {
                println!("{}", history_table(&history, limit));
            }
        }
    }
    Ok(())
}

struct SendRequest {
    method: HttpMethod,
    url: String,
    headers: Vec<HeaderEntry>,
    body: String,
    env: Option<String>,
}

async fn send<P: Proxy>(
    config: &Config,
    request: SendRequest,
    proxy: P,
    format: ResponseFormat,
) -> Result<()> {
    let store = Arc::new(Store::default());
    let storage = WorkspaceStorage::in_dir(&config.workspace.dir);
    let sync = SyncController::spawn(store.clone(), storage, &config.sync);

    let mut status_rx = sync.status();
    let status = *status_rx.wait_for(|s| *s != SyncStatus::Loading).await?;
    if status == SyncStatus::Error {
        sync.shutdown().await;
        anyhow::bail!("Could not load the workspace from {}", config.workspace.dir.display());
    }

    if let Some(name) = request.env {
        let environment_id = store
            .snapshot()
            .environments
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.id.clone())
            .ok_or_else(|| anyhow::anyhow!("No environment named '{}'", name))?;
        store.dispatch(Action::SetActiveEnvironment {
            environment_id: Some(environment_id),
        });
    }

    store.dispatch(Action::UpdateTab {
        tab_id: store.active_tab().id,
        updates: TabUpdate {
            method: Some(request.method),
            url: Some(request.url),
            headers: Some(request.headers),
            body: Some(request.body),
            ..TabUpdate::default()
        },
    });

    let result = Requester::new(store, proxy).send_active_tab().await;
    // Flushes the new history entry.
    sync.shutdown().await;

    let result = result?;
    println!("{}", ResponseFormatter::new(format).format(&result));
    Ok(())
}

/// `Name: value` → header entry.
fn parse_header(raw: &str) -> Result<HeaderEntry> {
    let (key, value) = raw
        .split_once(':')
        .ok_or_else(|| anyhow::anyhow!("Invalid header '{}', expected 'Name: value'", raw))?;
    let key = key.trim();
    if key.is_empty() {
        anyhow::bail!("Invalid header '{}', name is empty", raw);
    }
    Ok(HeaderEntry::new(key, value.trim()))
}
