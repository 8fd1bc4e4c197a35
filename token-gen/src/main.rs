use std::env;

use clap::Parser;
use sealed_bearer::services::auth::{AuthOptions, AuthPipeline};

/// Mint sealed bearer tokens offline, for manual testing against a running API.
///
/// The secret is validated with the same rules as the server (at least 20
/// characters). Tokens are printed one per line as `Bearer <token>`, ready to
/// paste into an `Authorization` header, `?authorization=` query or cookie.
#[derive(Parser, Debug)]
#[command(name = "token-gen", version, about)]
struct Args {
    /// Secret to seal the token with. Takes precedence over --secret-env.
    #[arg(long)]
    secret: Option<String>,

    /// Environment variable holding the secret.
    #[arg(long, default_value = "AUTH_SECRET")]
    secret_env: String,

    /// JSON payload to seal (e.g. '{"id":3}').
    #[arg(long, default_value = "{}")]
    payload: String,

    /// Number of tokens to mint. Every token differs even for the same payload.
    #[arg(long, default_value_t = 1)]
    count: usize,

    /// Print only the tokens (no extra lines)
    #[arg(long, default_value_t = false)]
    quiet: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let secret = match args.secret {
        Some(secret) => secret,
        None => env::var(&args.secret_env)
            .map_err(|_| format!("secret not given and ${} is not set", args.secret_env))?,
    };

    let payload: serde_json::Value = serde_json::from_str(&args.payload)?;
    let pipeline = AuthPipeline::initialize(AuthOptions::new(secret))?;

    if !args.quiet {
        println!("payload: {}", payload);
    }

    for _ in 0..args.count {
        println!("{}", pipeline.generate_auth_token(&payload)?);
    }

    Ok(())
}
