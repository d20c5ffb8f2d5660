//! Command dispatcher.
//!
//! Routes inbound chat updates to `/start`, `/help`, and `/check`, and owns
//! all user-facing reply wording. The `/check` path short-circuits at the
//! first failure: usage → rate-limit admission → plate validation → lookup.
//! The admission decision completes before the lookup begins; nothing here
//! holds the cooldown lock across an await.

use std::time::Instant;
use tracing::{debug, info};

use crate::app_state::AppState;
use crate::models::plate::{InvalidReason, ValidationOutcome};
use crate::models::update::{Command, InboundUpdate, OutboundReply};
use crate::services::lookup::LookupStatus;
use crate::services::validation::validate;

const USAGE: &str = "Usage: /check <vehicle_plate>";

/// Handle one inbound update. Returns the reply to deliver, or `None` for
/// updates the bot ignores (no message, no sender, non-command text).
pub async fn handle_update(state: &AppState, update: &InboundUpdate) -> Option<OutboundReply> {
    let message = update.message.as_ref()?;
    let text = message.text.as_deref()?;
    let sender = message.from.as_ref()?;

    let (command, args) = match Command::parse(text) {
        Some(parsed) => parsed,
        None => {
            debug!(update_id = update.update_id, "ignoring non-command update");
            return None;
        }
    };

    info!(
        update_id = update.update_id,
        user_id = sender.id,
        username = sender.username.as_deref().unwrap_or(""),
        input = %text,
        "handling /{} command", command
    );
    metrics::counter!("bot_commands_total", "command" => command.to_string()).increment(1);

    let reply_text = match command {
        Command::Start => start_text(),
        Command::Help => help_text(),
        Command::Check => handle_check(state, sender.id, &args).await,
    };

    let reply = OutboundReply::new(message.chat.id, reply_text);
    Some(match command {
        // Check results quote the triggering message; greetings do not.
        Command::Check => reply.in_reply_to(message.message_id),
        _ => reply,
    })
}

/// The `/check` pipeline. `identity` is the requester's opaque platform id.
pub async fn handle_check(state: &AppState, identity: i64, args: &[&str]) -> String {
    if args.is_empty() {
        return USAGE.to_string();
    }

    if !state.gate.admit(identity) {
        info!(user_id = identity, "rate limited, request rejected");
        metrics::counter!("vehicle_checks_rate_limited_total").increment(1);
        return cooldown_notice(state.gate.cooldown().as_secs());
    }

    let plate = match validate(args[0]) {
        ValidationOutcome::Valid(plate) => plate,
        ValidationOutcome::Invalid(reason) => {
            info!(user_id = identity, reason = ?reason, "plate rejected");
            metrics::counter!("plate_validation_failures_total").increment(1);
            return render_invalid(reason);
        }
    };

    let plate_text = plate.to_string();
    let started = Instant::now();
    let status = state.lookup.lookup(&plate_text).await;
    metrics::histogram!("vehicle_lookup_seconds").record(started.elapsed().as_secs_f64());
    metrics::counter!("vehicle_lookups_total", "status" => status_label(&status)).increment(1);

    info!(
        user_id = identity,
        plate = %plate_text,
        status = status_label(&status),
        "lookup complete"
    );

    render_lookup(&plate_text, &status)
}

fn status_label(status: &LookupStatus) -> &'static str {
    match status {
        LookupStatus::Found { .. } => "found",
        LookupStatus::NotFound => "not_found",
        LookupStatus::Unavailable => "unavailable",
    }
}

fn cooldown_notice(cooldown_secs: u64) -> String {
    format!(
        "Rate limited to {}s/request to prevent spam.\nPlease wait a bit before trying again.",
        cooldown_secs
    )
}

fn render_invalid(reason: InvalidReason) -> String {
    match reason {
        InvalidReason::Length => {
            "Invalid vehicle plate!\n(Input length must be between 2 and 8 characters)".to_string()
        }
        InvalidReason::Format => {
            "Invalid vehicle plate!\n(Format must be PREFIX + NUMERAL + CHECKSUM)".to_string()
        }
        InvalidReason::MissingChecksum { expected } => {
            format!("Missing checksum! Checksum expected: '{}'!", expected)
        }
        InvalidReason::WrongChecksum { expected } => {
            format!("Invalid checksum! Checksum expected: '{}'!", expected)
        }
    }
}

fn render_lookup(plate: &str, status: &LookupStatus) -> String {
    match status {
        LookupStatus::Found {
            model,
            road_tax_expiry,
            ..
        } => format!("{}\n{}\n{}", plate, model, road_tax_expiry),
        LookupStatus::NotFound => "No record found!".to_string(),
        LookupStatus::Unavailable => "Service may be down, try again later!".to_string(),
    }
}

fn start_text() -> String {
    concat!(
        "Vehicle check bot started!\n\n",
        "Usage:\n",
        " - /check <vehicle_plate>\n\n",
        "Send a plate with its check letter to look up the vehicle's ",
        "make/model and road tax expiry date."
    )
    .to_string()
}

fn help_text() -> String {
    concat!(
        "================================\n",
        "              Help\n",
        "================================\n",
        "Enter a carplate to check vehicle details!\n",
        " - /check <vehicle_plate>"
    )
    .to_string()
}
