//! Follow the signed-in vendor's notifications
//!
//! Reads `MARKET_API_URL` (and friends) from the environment or `.env`.
//! Uses the persisted session, or signs in with `MARKET_TOKEN` +
//! `MARKET_USER_ID` when set. Prints the unread count and newest
//! notification whenever they change, until Ctrl-C.
//!
//! ```bash
//! MARKET_API_URL=http://localhost:5000/api cargo run --example notification_feed
//! ```

use market_client::shared::models::{User, UserRole};
use market_client::telemetry::{DEFAULT_FILTER, init_tracing};
use market_client::{ClientConfig, MarketApp};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing(DEFAULT_FILTER, false)?;

    let config = ClientConfig::from_env()?;
    let app = MarketApp::bootstrap(config)?;

    if let (Ok(token), Ok(user_id)) = (std::env::var("MARKET_TOKEN"), std::env::var("MARKET_USER_ID")) {
        let user = User {
            id: user_id,
            role: UserRole::Vendor,
            ..Default::default()
        };
        app.sign_in(token, user).await?;
    } else if app.auth().is_authenticated() {
        app.resume().await;
    } else {
        anyhow::bail!("No saved session; set MARKET_TOKEN and MARKET_USER_ID");
    }

    let mut rx = app.notifications().store().subscribe();
    loop {
        {
            let state = rx.borrow_and_update();
            let newest = state
                .notifications
                .first()
                .map(|n| format!("{} ({})", n.title, n.notification_type))
                .unwrap_or_else(|| "-".to_string());
            println!(
                "unread={} loaded={} newest={}",
                state.unread_count,
                state.notifications.len(),
                newest
            );
        }

        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    app.shutdown();
    Ok(())
}
