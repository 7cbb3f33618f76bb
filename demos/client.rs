//! Example ChangeTip client.
//!
//! Demonstrates dev mode and a live wallet balance lookup.
//!
//! Run with:
//! ```bash
//! cargo run --example client
//! ```
//!
//! Environment variables (a `.env` file is honored):
//! - CHANGETIP_API_KEY_OR_ACCESS_TOKEN: API key or access token
//! - CHANGETIP_AUTHENTICATION_TYPE: `api_key` or `access_token`
//! - CHANGETIP_API_VERSION: API version (wallet operations need a non-default one)
//! - CHANGETIP_DEV_MODE: `true` to print requests instead of sending them

use changetip_rs::{ChangeTip, ClientConfig, Reply, TipRequest};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let mut config = ClientConfig::from_env()?;
    if config.credential().is_none() {
        println!("No CHANGETIP_API_KEY_OR_ACCESS_TOKEN set, running in dev mode");
        config = config.with_credential("example-token").with_dev_mode(true);
    }

    println!("ChangeTip Example Client");
    println!("   Host:    {}", config.api_host());
    println!("   Version: v{}", config.effective_version());
    println!("   Dev:     {}", config.dev_mode);
    println!();

    let api = ChangeTip::new(config);

    let tip = TipRequest::new(
        "example-context-1",
        "https://example.com/posts/1",
        "receiver",
        "github",
        "a coffee",
    )
    .with_sender("sender");

    println!("Sending tip...");
    print_reply(api.send_tip(&tip)?.await?)?;

    println!("\nLooking up tips...");
    print_reply(api.get_tip(["tip-1", "tip-2"], Some("github"))?.await?)?;

    match api.get_wallet_balance() {
        Ok(call) => {
            println!("\nFetching wallet balance...");
            print_reply(call.await?)?;
        }
        Err(e) => println!("\nSkipping wallet balance: {}", e),
    }

    println!("\nDone!");
    Ok(())
}

fn print_reply(reply: Reply) -> anyhow::Result<()> {
    match reply {
        Reply::DevMode(described) => {
            println!("{}", serde_json::to_string_pretty(&described)?);
        }
        Reply::Body { status, body } => {
            println!("Response status: {}", status);
            if let Ok(json) = serde_json::from_str::<serde_json::Value>(&body) {
                println!("{}", serde_json::to_string_pretty(&json)?);
            } else {
                println!("{}", body);
            }
        }
    }
    Ok(())
}
