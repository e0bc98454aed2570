// ABOUTME: Entry point for the ollama-sign CLI
// ABOUTME: Shows the exact request the client would send, verifies its token, and optionally sends it

use anyhow::{bail, Context, Result};
use clap::Parser;
use ollama_auth::{Headers, Token, AUTHORIZATION_HEADER};
use ollama_client::{Client, ClientConfig};
use reqwest::Method;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "ollama-sign",
    about = "Inspect (and optionally send) a signed Ollama API request"
)]
struct Cli {
    /// Request target: a path such as /api/tags, or an absolute URL
    target: String,

    /// HTTP method
    #[arg(short = 'X', long, default_value = "GET")]
    method: String,

    /// Server address (e.g., https://ollama.com)
    #[arg(long, env = "OLLAMA_HOST")]
    host: Option<String>,

    /// Private key file (defaults to ~/.ollama/id_ed25519)
    #[arg(long, env = "OLLAMA_KEY_PATH")]
    key: Option<PathBuf>,

    /// Passphrase for an encrypted key
    #[arg(long, env = "OLLAMA_KEY_PASSPHRASE", hide_env_values = true)]
    passphrase: Option<String>,

    /// Sign regardless of destination host
    #[arg(long)]
    force: bool,

    /// Config file (defaults to ~/.config/ollama/client.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Header to add, as NAME:VALUE (repeatable)
    #[arg(short = 'H', long = "header")]
    headers: Vec<String>,

    /// Actually send the request and print the response
    #[arg(long)]
    send: bool,

    /// Log signer decisions to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    if cli.verbose {
        ollama_log::init_for(&["ollama_auth", "ollama_client"], tracing::Level::DEBUG);
    } else {
        ollama_log::init();
    }

    let mut config = match &cli.config {
        Some(path) => ClientConfig::load(path)?,
        None => ClientConfig::load_default()?,
    }
    .merge_env();
    if cli.host.is_some() {
        config.host = cli.host.clone();
    }
    if cli.key.is_some() {
        config.auth.key_path = cli.key.clone();
    }
    config.auth.force |= cli.force;

    let client = build_client(&config, cli.passphrase.as_deref())?;
    let method = Method::from_bytes(cli.method.to_uppercase().as_bytes())
        .with_context(|| format!("Invalid HTTP method {}", cli.method))?;
    let headers = parse_headers(&cli.headers)?;

    let builder = client.build_request(method.clone(), &cli.target, &headers)?;
    let request = builder
        .try_clone()
        .context("Request cannot be cloned")?
        .build()
        .context("Failed to build request")?;

    println!("{} {}", request.method(), request.url());
    match request.headers().get(AUTHORIZATION_HEADER) {
        Some(value) => {
            let token = value.to_str().context("Authorization header is not ASCII")?;
            let url = request.url();
            let challenge = match url.query() {
                Some(query) => format!("{},{}?{}", method, url.path(), query),
                None => format!("{},{}", method, url.path()),
            };
            let parsed = Token::parse(token).context("Generated token does not parse")?;
            parsed
                .verify(challenge.as_bytes())
                .context("Generated token does not verify")?;

            let key = client.signer().load_key()?;
            println!("signed:        yes");
            println!("challenge:     {challenge}");
            println!("fingerprint:   {}", key.fingerprint());
            println!("authorization: {token}");
            println!("verified:      ok");
        }
        None => println!("signed:        no"),
    }

    if cli.send {
        let response = client.execute(builder).await?;
        println!("status:        {}", response.status());
        let body = response.text().await.context("Failed to read response body")?;
        println!("{body}");
    }

    Ok(())
}

fn build_client(config: &ClientConfig, passphrase: Option<&str>) -> Result<Client> {
    let client = Client::new(config).context("Failed to create HTTP client")?;
    Ok(match passphrase {
        Some(passphrase) => client.with_passphrase(passphrase),
        None => client,
    })
}

fn parse_headers(raw: &[String]) -> Result<Headers> {
    let mut headers = Headers::new();
    for entry in raw {
        let Some((name, value)) = entry.split_once(':') else {
            bail!("Header {entry:?} must be NAME:VALUE");
        };
        headers.insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
    }
    Ok(headers)
}
