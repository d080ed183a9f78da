//! Dispatcher tests
//! Run with: cargo test --test dispatcher_test

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use common::{dispatcher, memory_store, nexmo_sms, slack_message, RecordingClient};
use hearken::infrastructure::adapters::{NexmoDriver, SlackDriver};
use hearken::{BotError, Dispatcher, Driver, LiteralMode, Outcome, Request};
use serde_json::json;

fn counter() -> (Arc<AtomicUsize>, Arc<AtomicUsize>) {
    let count = Arc::new(AtomicUsize::new(0));
    (count.clone(), count)
}

#[test]
fn test_does_not_call_handlers_for_other_text() {
    let mut bot = dispatcher(RecordingClient::new());
    let (count, seen) = counter();
    bot.hears("foo", move |_, _| {
        count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    })
    .unwrap();

    let outcomes = bot.handle(&slack_message("U1", "general", "bar")).unwrap();

    assert_eq!(outcomes, vec![Outcome::Unmatched]);
    assert_eq!(seen.load(Ordering::SeqCst), 0);
}

#[test]
fn test_calls_the_matching_handler_once() {
    let mut bot = dispatcher(RecordingClient::new());
    let (count, seen) = counter();
    bot.hears("foo", move |_, _| {
        count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    })
    .unwrap();

    let outcomes = bot.handle(&slack_message("U1", "general", "FOO")).unwrap();

    assert_eq!(outcomes, vec![Outcome::Matched { pattern: "foo".to_string() }]);
    assert_eq!(seen.load(Ordering::SeqCst), 1);
}

#[test]
fn test_only_the_first_matching_handler_runs() {
    let mut bot = dispatcher(RecordingClient::new());
    let order = Arc::new(Mutex::new(Vec::new()));

    let first = order.clone();
    bot.hears("hi {name}", move |_, _| {
        first.lock().unwrap().push("placeholder");
        Ok(())
    })
    .unwrap();
    let second = order.clone();
    bot.hears("hi julia", move |_, _| {
        second.lock().unwrap().push("literal");
        Ok(())
    })
    .unwrap();

    bot.handle(&slack_message("U1", "general", "hi julia")).unwrap();
    assert_eq!(*order.lock().unwrap(), vec!["placeholder"]);
}

#[test]
fn test_passes_captures_positionally_and_by_name() {
    let mut bot = dispatcher(RecordingClient::new());
    let seen = Arc::new(Mutex::new(None));

    let sink = seen.clone();
    bot.hears("call me {name} the {attr}", move |bot, args| {
        let named = (
            bot.matches().get("name").map(str::to_string),
            bot.matches().get("attr").map(str::to_string),
        );
        *sink.lock().unwrap() = Some((args.to_vec(), named));
        Ok(())
    })
    .unwrap();

    bot.handle(&slack_message("U1", "general", "call me Julia the Great")).unwrap();

    let (args, (name, attr)) = seen.lock().unwrap().take().unwrap();
    assert_eq!(args, vec!["Julia".to_string(), "Great".to_string()]);
    assert_eq!(name.as_deref(), Some("Julia"));
    assert_eq!(attr.as_deref(), Some("Great"));
}

#[test]
fn test_handler_sees_message_identity() {
    let mut bot = dispatcher(RecordingClient::new());
    let seen = Arc::new(Mutex::new(Vec::new()));

    let sink = seen.clone();
    bot.hears("whoami", move |bot, _| {
        sink.lock().unwrap().push((
            bot.user().to_string(),
            bot.channel().to_string(),
            bot.driver_name(),
        ));
        Ok(())
    })
    .unwrap();

    bot.handle(&slack_message("U1", "general", "whoami")).unwrap();
    bot.handle(&nexmo_sms("whoami")).unwrap();

    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            ("U1".to_string(), "general".to_string(), "slack"),
            ("491762012309022505".to_string(), "4176260130298".to_string(), "nexmo"),
        ]
    );
}

#[test]
fn test_unrecognized_requests_fail_without_side_effects() {
    let http = RecordingClient::new();
    let mut bot = dispatcher(http.clone());
    let (count, seen) = counter();
    bot.hears("{anything}", move |_, _| {
        count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    })
    .unwrap();

    let err = bot.handle(&Request::from_json(json!({ "hello": "world" }))).unwrap_err();

    assert!(matches!(err, BotError::NoDriverMatched));
    assert_eq!(seen.load(Ordering::SeqCst), 0);
    assert!(http.calls().is_empty());
}

#[test]
fn test_first_registered_driver_wins() {
    // Carries both a Slack event and the Nexmo identifying fields
    let request = Request::from_json(json!({
        "token": "foo",
        "event": { "user": "U1", "channel": "general", "text": "hi" },
        "msisdn": "4917",
        "to": "4176",
        "messageId": "0C00"
    }));

    let slack_first = Dispatcher::new(memory_store())
        .with_driver(SlackDriver::new(RecordingClient::new()))
        .with_driver(NexmoDriver::new(RecordingClient::new(), "key", "secret"));
    let nexmo_first = Dispatcher::new(memory_store())
        .with_driver(NexmoDriver::new(RecordingClient::new(), "key", "secret"))
        .with_driver(SlackDriver::new(RecordingClient::new()));

    assert_eq!(slack_first.resolve_driver(&request).unwrap().name(), "slack");
    assert_eq!(nexmo_first.resolve_driver(&request).unwrap().name(), "nexmo");
    assert_eq!(slack_first.driver_names(), vec!["slack", "nexmo"]);
}

#[test]
fn test_handler_errors_propagate_unchanged() {
    let mut bot = dispatcher(RecordingClient::new());
    bot.hears("explode", |_, _| Err(BotError::handler("kaboom"))).unwrap();

    let err = bot.handle(&slack_message("U1", "general", "explode")).unwrap_err();
    assert!(matches!(err, BotError::Handler(ref reason) if reason == "kaboom"));
}

#[test]
fn test_invalid_patterns_are_rejected_at_registration() {
    let mut bot = dispatcher(RecordingClient::new());

    assert!(matches!(bot.hears("", |_, _| Ok(())), Err(BotError::Pattern(_))));
    assert!(matches!(
        bot.hears("{a} and {a}", |_, _| Ok(())),
        Err(BotError::Pattern(_))
    ));
}

#[test]
fn test_substring_literal_mode() {
    let mut bot = Dispatcher::new(memory_store())
        .with_driver(SlackDriver::new(RecordingClient::new()))
        .with_literal_mode(LiteralMode::Substring);
    let (count, seen) = counter();
    bot.hears("help", move |_, _| {
        count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    })
    .unwrap();

    bot.handle(&slack_message("U1", "general", "can you HELP me?")).unwrap();
    bot.handle(&slack_message("U1", "general", "hello")).unwrap();

    assert_eq!(seen.load(Ordering::SeqCst), 1);
}

#[test]
fn test_exact_literal_mode_is_anchored() {
    let mut bot = dispatcher(RecordingClient::new());
    let (count, seen) = counter();
    bot.hears("help", move |_, _| {
        count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    })
    .unwrap();

    let outcomes = bot.handle(&slack_message("U1", "general", "can you help me?")).unwrap();

    assert_eq!(outcomes, vec![Outcome::Unmatched]);
    assert_eq!(seen.load(Ordering::SeqCst), 0);
}

#[test]
fn test_regex_metacharacters_match_literally() {
    let mut bot = dispatcher(RecordingClient::new());
    let (count, seen) = counter();
    bot.hears("what's 1+1?", move |_, _| {
        count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    })
    .unwrap();

    bot.handle(&slack_message("U1", "general", "what's 11?")).unwrap();
    bot.handle(&slack_message("U1", "general", "What's 1+1?")).unwrap();

    assert_eq!(seen.load(Ordering::SeqCst), 1);
}
