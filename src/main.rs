use std::{
    io::{BufRead, Write},
    path::{Path, PathBuf},
    process::exit,
    sync::{mpsc, Arc},
};

use clap::{Parser, Subcommand};
use compact_str::{format_compact, ToCompactString};
use tokio::runtime::Runtime;
use tracing::warn;
use url::Url;

use crate::{
    app_init::{initialize_app, AppComponents},
    client::{AuthorizationPresenter, GistClient},
    config::{default_config_path, load_config, load_config_file, save_config},
    domain::Gist,
    event::GistEvent,
    result::{GistrError, Result},
};

mod app_init;
mod client;
mod config;
mod dispatcher;
mod domain;
mod event;
mod id;
mod logging;
mod result;

/// Browse GitHub gists from the command line
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Alternate path to the configuration file.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Print the path to the configuration file and exit.
    #[arg(short, long)]
    print_config_path: bool,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List public gists, newest first
    Public {
        /// Number of pages to fetch
        #[arg(short = 'n', long, default_value_t = 1)]
        pages: u32,
        /// Also list each gist's files and links
        #[arg(short, long)]
        long: bool,
    },
    /// Sign in with GitHub and list your own gists
    Login,
    /// Store OAuth App credentials in the configuration file
    Configure {
        #[arg(long)]
        client_id: String,
        #[arg(long)]
        client_secret: String,
        /// REST API base URL, for GitHub Enterprise
        #[arg(long)]
        api_url: Option<String>,
        /// OAuth base URL, for GitHub Enterprise
        #[arg(long)]
        oauth_url: Option<String>,
    },
}

fn main() -> color_eyre::Result<()> {
    let args = Args::parse();
    let config_path = args.config.unwrap_or_else(default_config_path);

    if args.print_config_path {
        println!("{}", config_path.display());
        exit(0);
    }

    match args.command.unwrap_or(Command::Public { pages: 1, long: false }) {
        Command::Configure { client_id, client_secret, api_url, oauth_url } => {
            let mut config = load_config_file(&config_path)?;
            config.client_id = client_id;
            config.client_secret = client_secret;
            config.api_url = api_url.or(config.api_url);
            config.oauth_url = oauth_url.or(config.oauth_url);
            save_config(&config_path, &config)?;
            println!("Wrote {}", config_path.display());
        },
        Command::Public { pages, long } => {
            let (_rt, AppComponents { client, _log_guard }) = start(&config_path, false)?;
            list_public_gists(&client, pages, long)?;
        },
        Command::Login => {
            let (rt, AppComponents { client, _log_guard }) = start(&config_path, true)?;
            login(&rt, &client)?;
        },
    }

    Ok(())
}

/// Public browsing works without an OAuth App; signing in does not.
fn start(config_path: &Path, sign_in: bool) -> Result<(Runtime, AppComponents)> {
    let config = load_config(config_path)?;
    if sign_in {
        config.validate().map_err(|e| {
            GistrError::ConfigError(format_compact!("{e} (see {})", config_path.display()))
        })?;
    }

    let debug = std::env::var("GISTR_DEBUG").is_ok();

    let rt = Runtime::new().map_err(|e| {
        GistrError::GeneralError(format!("Failed to create runtime: {e}").into())
    })?;

    let components = rt.block_on(async { initialize_app(config, debug).await })?;
    Ok((rt, components))
}

fn list_public_gists(client: &Arc<GistClient>, pages: u32, long: bool) -> Result<()> {
    let (sender, receiver) = mpsc::channel();

    for _ in 0..pages.max(1) {
        client.spawn_fetch_next_page(sender.clone());

        match receiver.recv() {
            Ok(GistEvent::GistsFetched(gists)) => {
                gists.iter().for_each(|gist| print_gist(gist, long))
            },
            Ok(GistEvent::AppError(e)) => return Err(e),
            Err(_) => return Err(GistrError::GeneralError("event channel closed".into())),
        }

        if !client.has_more_pages() {
            break;
        }
    }

    Ok(())
}

fn print_gist(gist: &Gist, long: bool) {
    println!(
        "{}  {}  {:<20} {:>2} file(s)  {}  [{}]",
        gist.id,
        gist.updated_at.format("%Y-%m-%d"),
        gist.owner_or_anonymous(),
        gist.files.len(),
        gist.description,
        gist.filenames().join(", "),
    );

    if !long {
        return;
    }

    println!(
        "    {}  created {}  {}  {} comment(s)",
        gist.url,
        gist.created_at.format("%Y-%m-%d"),
        if gist.public { "public" } else { "secret" },
        gist.comments,
    );
    for name in gist.filenames() {
        let file = &gist.files[name];
        println!(
            "    {:<32} {:<12} {:<28} {:>8} B  {}",
            file.filename,
            file.language.as_deref().unwrap_or("-"),
            file.mime_type.as_deref().unwrap_or("-"),
            file.size,
            file.raw_url.as_deref().unwrap_or("-"),
        );
    }
}

/// Opens the authorize page in the system browser
struct BrowserPresenter;

impl AuthorizationPresenter for BrowserPresenter {
    fn present_authorization(&self, url: &Url) {
        println!("Authorize gistr in your browser:\n  {url}");
        if let Err(e) = open::that(url.as_str()) {
            warn!(error = %e, "Could not open the system browser");
        }
    }
}

fn login(rt: &Runtime, client: &GistClient) -> Result<()> {
    client.begin_login(&BrowserPresenter)?;

    let stdin = std::io::stdin();
    loop {
        print!("Paste the URL GitHub redirected you to: ");
        std::io::stdout().flush().map_err(|e| GistrError::GeneralError(e.to_compact_string()))?;

        let mut line = String::new();
        let read = stdin
            .lock()
            .read_line(&mut line)
            .map_err(|e| GistrError::GeneralError(e.to_compact_string()))?;
        if read == 0 {
            client.cancel_login();
            return Err(GistrError::NotAuthorized("login cancelled".into()));
        }

        match rt.block_on(client.handle_redirect(&line)) {
            Ok(Some(_)) => break,
            Ok(None) => println!("That URL carries no authorization code, try again."),
            Err(e) => return Err(e.into()),
        }
    }

    if client.is_authenticated() {
        println!("Signed in to GitHub.");
    }
    let body = rt.block_on(client.fetch_authenticated_gists())?;
    println!("{body}");

    Ok(())
}
