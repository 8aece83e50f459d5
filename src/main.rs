use std::{
    env,
    io::{self, Write},
};

use clap::Parser;
use gh_alerts::{Result, report};

/// List Dependabot vulnerability alerts for a GitHub organization
#[derive(Parser)]
#[command(name = "gh-alerts")]
struct Cli {
    /// Organization whose alerts to list
    #[arg(long)]
    org: String,

    /// Comma-separated repositories to query instead of the whole org
    #[arg(long, value_delimiter = ',')]
    repos: Option<Vec<String>>,

    /// Prompt for a personal access token instead of reading GITHUB_TOKEN
    #[arg(long)]
    with_token: bool,
}

fn prompt_token() -> Result<String> {
    print!("Enter your personal access token (PAT): ");
    io::stdout().flush()?;
    let mut token = String::new();
    io::stdin().read_line(&mut token)?;
    Ok(token.trim().to_string())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let token = if cli.with_token {
        Some(prompt_token()?)
    } else {
        let token = env::var("GITHUB_TOKEN").ok();
        if token.is_some() {
            log::info!("Using token from GITHUB_TOKEN");
        }
        token
    };
    log::info!("reporting alerts for org: {}", cli.org);
    report(&cli.org, cli.repos.as_deref(), token.as_deref()).await
}
