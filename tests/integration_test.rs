//! Dispatcher integration tests.
//!
//! Drive the command dispatcher end-to-end against a stub lookup, covering
//! the full short-circuit order: usage → cooldown admission → validation →
//! lookup → rendering. No network or running server required.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use vehicle_check::app_state::AppState;
use vehicle_check::models::update::{Chat, InboundMessage, InboundUpdate, Sender};
use vehicle_check::services::commands;
use vehicle_check::services::lookup::{LookupStatus, VehicleLookup};
use vehicle_check::services::rate_limit::CooldownGate;

/// Stub record source: returns a canned status and counts invocations.
struct StubLookup {
    status: LookupStatus,
    calls: AtomicUsize,
}

impl StubLookup {
    fn new(status: LookupStatus) -> Arc<Self> {
        Arc::new(Self {
            status,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VehicleLookup for StubLookup {
    async fn lookup(&self, _plate: &str) -> LookupStatus {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.status.clone()
    }
}

fn found_status() -> LookupStatus {
    LookupStatus::Found {
        model: "HONDA CIVIC 1.6".to_string(),
        road_tax_expiry: "15 Mar 2026".to_string(),
        expiry_date: None,
    }
}

fn state_with(lookup: Arc<StubLookup>, cooldown: Duration) -> AppState {
    AppState::new(CooldownGate::new(cooldown), lookup)
}

fn update(user_id: i64, text: &str) -> InboundUpdate {
    InboundUpdate {
        update_id: 1,
        message: Some(InboundMessage {
            message_id: 42,
            chat: Chat { id: user_id },
            from: Some(Sender {
                id: user_id,
                username: Some("jay".to_string()),
            }),
            text: Some(text.to_string()),
        }),
    }
}

#[tokio::test]
async fn test_empty_args_returns_usage_without_state_change() {
    let lookup = StubLookup::new(found_status());
    let state = state_with(Arc::clone(&lookup), Duration::from_secs(15));

    let reply = commands::handle_check(&state, 1, &[]).await;

    assert_eq!(reply, "Usage: /check <vehicle_plate>");
    assert_eq!(lookup.calls(), 0);
    // No admission attempt happened, so a follow-up check is not rate limited.
    assert_eq!(state.gate.tracked_identities(), 0);
}

#[tokio::test]
async fn test_invalid_plate_never_reaches_lookup() {
    let lookup = StubLookup::new(found_status());
    let state = state_with(Arc::clone(&lookup), Duration::from_secs(0));

    let wrong = commands::handle_check(&state, 1, &["SBA1234Z"]).await;
    assert_eq!(wrong, "Invalid checksum! Checksum expected: 'M'!");

    let missing = commands::handle_check(&state, 1, &["SBA1234"]).await;
    assert_eq!(missing, "Missing checksum! Checksum expected: 'M'!");

    let short = commands::handle_check(&state, 1, &["S"]).await;
    assert!(short.contains("between 2 and 8"));

    let garbled = commands::handle_check(&state, 1, &["12SBA34"]).await;
    assert!(garbled.contains("PREFIX + NUMERAL + CHECKSUM"));

    assert_eq!(lookup.calls(), 0);
}

#[tokio::test]
async fn test_valid_plate_renders_found_record() {
    let lookup = StubLookup::new(found_status());
    let state = state_with(Arc::clone(&lookup), Duration::from_secs(15));

    let reply = commands::handle_check(&state, 1, &["sba1234m"]).await;

    assert_eq!(reply, "SBA1234M\nHONDA CIVIC 1.6\n15 Mar 2026");
    assert_eq!(lookup.calls(), 1);
}

#[tokio::test]
async fn test_not_found_and_unavailable_wording() {
    let not_found = StubLookup::new(LookupStatus::NotFound);
    let state = state_with(Arc::clone(&not_found), Duration::from_secs(0));
    assert_eq!(
        commands::handle_check(&state, 1, &["SBA1234M"]).await,
        "No record found!"
    );

    let unavailable = StubLookup::new(LookupStatus::Unavailable);
    let state = state_with(Arc::clone(&unavailable), Duration::from_secs(0));
    assert_eq!(
        commands::handle_check(&state, 1, &["SBA1234M"]).await,
        "Service may be down, try again later!"
    );
}

#[tokio::test]
async fn test_second_check_within_cooldown_is_rejected_before_validation() {
    let lookup = StubLookup::new(found_status());
    let state = state_with(Arc::clone(&lookup), Duration::from_secs(15));

    let first = commands::handle_check(&state, 1, &["SBA1234M"]).await;
    assert!(first.starts_with("SBA1234M\n"));

    // Even a garbage plate gets the cooldown notice: admission runs first.
    let second = commands::handle_check(&state, 1, &["!!!"]).await;
    assert!(second.contains("Rate limited to 15s/request"));
    assert!(second.contains("Please wait a bit"));

    // Validation and lookup were skipped on the rejected request.
    assert_eq!(lookup.calls(), 1);
}

#[tokio::test]
async fn test_cooldowns_are_per_identity() {
    let lookup = StubLookup::new(found_status());
    let state = state_with(Arc::clone(&lookup), Duration::from_secs(15));

    assert!(commands::handle_check(&state, 1, &["SBA1234M"]).await.starts_with("SBA1234M"));
    assert!(commands::handle_check(&state, 2, &["SBA1234M"]).await.starts_with("SBA1234M"));
    assert_eq!(lookup.calls(), 2);
}

#[tokio::test]
async fn test_elapsed_cooldown_admits_again() {
    let lookup = StubLookup::new(found_status());
    let state = state_with(Arc::clone(&lookup), Duration::from_millis(50));

    assert!(commands::handle_check(&state, 1, &["SBA1234M"]).await.starts_with("SBA1234M"));
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert!(commands::handle_check(&state, 1, &["SBA1234M"]).await.starts_with("SBA1234M"));
    assert_eq!(lookup.calls(), 2);
}

#[tokio::test]
async fn test_update_routing() {
    let lookup = StubLookup::new(found_status());
    let state = state_with(Arc::clone(&lookup), Duration::from_secs(15));

    // /start and /help answer without quoting the triggering message.
    let start = commands::handle_update(&state, &update(1, "/start"))
        .await
        .expect("start replies");
    assert!(start.text.contains("Usage:"));
    assert_eq!(start.reply_to_message_id, None);

    let help = commands::handle_update(&state, &update(1, "/help"))
        .await
        .expect("help replies");
    assert!(help.text.contains("/check <vehicle_plate>"));

    // /check quotes the triggering message.
    let check = commands::handle_update(&state, &update(1, "/check SBA1234M"))
        .await
        .expect("check replies");
    assert_eq!(check.chat_id, 1);
    assert_eq!(check.reply_to_message_id, Some(42));
    assert!(check.text.starts_with("SBA1234M\n"));

    // Ignored updates produce no reply.
    assert!(commands::handle_update(&state, &update(1, "just chatting")).await.is_none());
    let empty = InboundUpdate {
        update_id: 2,
        message: None,
    };
    assert!(commands::handle_update(&state, &empty).await.is_none());
}

#[tokio::test]
async fn test_redelivered_update_is_gated_not_deduplicated() {
    // The transport may deliver one user action more than once; the cooldown
    // gate is the only protection, and it must hold.
    let lookup = StubLookup::new(found_status());
    let state = state_with(Arc::clone(&lookup), Duration::from_secs(15));
    let redelivered = update(9, "/check SBA1234M");

    let first = commands::handle_update(&state, &redelivered)
        .await
        .expect("first delivery replies");
    assert!(first.text.starts_with("SBA1234M\n"));

    let second = commands::handle_update(&state, &redelivered)
        .await
        .expect("second delivery replies");
    assert!(second.text.contains("Rate limited"));
    assert_eq!(lookup.calls(), 1);
}
