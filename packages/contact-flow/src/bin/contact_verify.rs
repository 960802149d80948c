//! Command-line driver for the contact verification flow.
//!
//! Feeds one identifier through the full flow against a live registry:
//! existence check, OTP challenge, then — once the OTP entry happens out of
//! band — reports the outcome and prints the redirect target.

use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use registry::RegistryOptions;
use tracing_subscriber::EnvFilter;

use contact_flow::flow::driver::FlowDriver;
use contact_flow::services::registry::RegistryBackend;
use contact_flow::{Config, ContactVerificationFlow, IdentifierKind, SubmitOutcome};

#[derive(Parser)]
#[command(
    name = "contact-verify",
    about = "Verify a phone number or email address against the portal registry"
)]
struct Args {
    /// Identifier to verify (10-digit mobile number, or email with --email)
    identifier: String,

    /// Treat the identifier as an email address
    #[arg(long)]
    email: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config = Config::from_env()?;

    let backend = Arc::new(RegistryBackend::new(RegistryOptions {
        base_url: config.registry_base_url.clone(),
    }));

    let mut flow = ContactVerificationFlow::new(backend.clone(), backend.clone(), vec![]);
    flow.initialize(backend.as_ref()).await;
    if let Some(tenant) = flow.tenant() {
        if let Some(name) = &tenant.title_name {
            println!("Verifying contact details for {}", name);
        }
    }
    flow.start();

    let handle = FlowDriver::spawn_with_debounce(flow, Duration::from_millis(config.debounce_ms));

    let kind = if args.email {
        IdentifierKind::Email
    } else {
        IdentifierKind::Phone
    };
    if !kind.matches(&args.identifier) {
        anyhow::bail!("'{}' is not a valid {}", args.identifier, kind.slug());
    }
    handle.input_changed(args.identifier, kind).await;

    // Wait for the existence check to settle one way or the other.
    let mut state_rx = handle.watch_state();
    loop {
        let state = *state_rx.borrow_and_update();
        if state.user_blocked {
            println!("This account is blocked. OTP cannot be issued for this identifier.");
            handle.shutdown().await;
            return Ok(());
        }
        if state.submit_enabled {
            break;
        }
        if state_rx.changed().await.is_err() {
            anyhow::bail!("flow driver stopped unexpectedly");
        }
    }

    match handle.submit().await? {
        SubmitOutcome::ChallengeIssued(context) => {
            println!("{}", context.instructions);
            print!("Did OTP verification succeed? [y/N] ");
            io::stdout().flush()?;
            let mut answer = String::new();
            io::stdin().lock().read_line(&mut answer)?;

            if answer.trim().eq_ignore_ascii_case("y") {
                let target = handle.otp_succeeded().await?;
                println!("Verified. Redirect to: {}", target);
            } else {
                handle.otp_failed().await?;
                println!("{}", context.retry_message);
            }
        }
        SubmitOutcome::Rejected { message } => println!("{}", message),
        SubmitOutcome::Ignored => println!("Identifier did not pass validation."),
    }

    handle.shutdown().await;
    Ok(())
}
