//! Example OAuth2 token refresh.
//!
//! Run with:
//! ```bash
//! cargo run --example oauth
//! ```
//!
//! Environment variables:
//! - CHANGETIP_CLIENT_ID / CHANGETIP_CLIENT_SECRET: OAuth application credentials
//! - CHANGETIP_REFRESH_TOKEN: refresh token from a previous authorization
//! - CHANGETIP_AUTH_HOST: authorization server host (optional)

use changetip_rs::{ChangeTip, ChangeTipError, ClientConfig, TokenCredentials};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let env = |key: &str| std::env::var(key).unwrap_or_default();
    let credentials = TokenCredentials::refresh(
        env("CHANGETIP_CLIENT_ID"),
        env("CHANGETIP_CLIENT_SECRET"),
        env("CHANGETIP_REFRESH_TOKEN"),
    );

    let api = ChangeTip::new(ClientConfig::from_env()?);
    println!("Refreshing token at {}", api.token_exchange().base_url());

    let exchange = match api.token_exchange().refresh(&credentials) {
        Ok(exchange) => exchange,
        Err(ChangeTipError::MissingCredential) => {
            eprintln!("Set CHANGETIP_CLIENT_ID, CHANGETIP_CLIENT_SECRET and CHANGETIP_REFRESH_TOKEN");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    match exchange.await {
        Ok(token) => {
            let api = api.with_access_token(token);
            println!(
                "New access token installed ({} characters)",
                api.config().credential().map(str::len).unwrap_or(0)
            );
        }
        Err(ChangeTipError::AuthExchangeFailed { status, body }) => {
            eprintln!("Authorization server answered {}: {}", status, body);
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
