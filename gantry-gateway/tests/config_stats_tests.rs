//! Runtime config, stats, info and ping tests

mod common;

use common::{fixture, fixture_with, RecordingRouter};
use futures::io::Cursor;
use gantry_core::engine::QueueEngine;
use gantry_core::options::GatewayOptions;
use gantry_core::snapshot::OptionsStore;
use gantry_gateway::{Body, Gateway, RequestHead, VERSION};
use serde_json::{json, Value};

#[compio::test]
async fn test_config_write_then_read() {
    let fx = fixture_with(GatewayOptions::default(), RecordingRouter::default());
    let head = RequestHead::default();
    let rx = fx.options.subscribe();

    let resp = fx
        .gateway
        .set_config(
            &head,
            "nsqlookupd_tcp_addresses",
            &mut Cursor::new(br#"["10.0.0.1:4160","10.0.0.2:4160"]"#.to_vec()),
        )
        .await
        .unwrap();
    assert_eq!(resp.body, Body::Json(json!(["10.0.0.1:4160", "10.0.0.2:4160"])));

    let resp = fx
        .gateway
        .get_config(&head, "nsqlookupd_tcp_addresses")
        .unwrap();
    assert_eq!(resp.body, Body::Json(json!(["10.0.0.1:4160", "10.0.0.2:4160"])));
    assert_eq!(rx.try_recv().unwrap().lookupd_tcp_addresses.len(), 2);
}

#[compio::test]
async fn test_gateways_sharing_options_keep_each_others_writes() {
    let fx = fixture_with(GatewayOptions::default(), RecordingRouter::default());
    let secure = Gateway::new(fx.engine.clone(), fx.router.clone(), fx.options.clone());
    let head = RequestHead::default();

    fx.gateway
        .set_config(&head, "log_level", &mut Cursor::new(b"3".to_vec()))
        .await
        .unwrap();
    secure
        .set_config(&head, "verbose", &mut Cursor::new(b"true".to_vec()))
        .await
        .unwrap();

    for gateway in [&fx.gateway, &secure] {
        assert_eq!(gateway.get_config(&head, "log_level").unwrap().body, Body::Json(json!(3)));
        assert_eq!(gateway.get_config(&head, "verbose").unwrap().body, Body::Json(json!(true)));
    }
    let current = fx.options.current();
    assert_eq!(current.log_level, 3);
    assert!(current.verbose);
}

#[compio::test]
async fn test_config_rejected_writes_leave_snapshot() {
    let fx = fixture();
    let head = RequestHead::default();
    let before = fx.options.current();

    let err = fx
        .gateway
        .set_config(&head, "max_msg_size", &mut Cursor::new(b"1".to_vec()))
        .await
        .unwrap_err();
    assert_eq!(err.status(), 400);
    assert_eq!(err.code(), "INVALID_OPTION");

    let err = fx
        .gateway
        .set_config(&head, "no_such_option", &mut Cursor::new(b"1".to_vec()))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "INVALID_OPTION");

    let err = fx
        .gateway
        .set_config(&head, "verbose", &mut Cursor::new(b"\"yes\"".to_vec()))
        .await
        .unwrap_err();
    assert_eq!(err.status(), 400);
    assert_eq!(err.code(), "INVALID_VALUE");

    // max_msg_size is 16, so 17 bytes reach the read limit
    let err = fx
        .gateway
        .set_config(&head, "log_level", &mut Cursor::new(vec![b'1'; 17]))
        .await
        .unwrap_err();
    assert_eq!(err.status(), 413);
    assert_eq!(err.code(), "INVALID_VALUE");

    assert_eq!(*fx.options.current(), *before);
}

#[test]
fn test_get_config_unknown() {
    let fx = fixture();
    let err = fx
        .gateway
        .get_config(&RequestHead::default(), "hostname")
        .unwrap_err();
    assert_eq!(err.code(), "INVALID_OPTION");

    let resp = fx
        .gateway
        .get_config(&RequestHead::default(), "max_body_size")
        .unwrap();
    assert_eq!(resp.body, Body::Json(json!(64)));
}

fn seed_stats(fx: &common::Fixture) {
    let orders = fx.engine.get_existing_topic("orders", None).unwrap();
    orders.get_channel("billing");
    orders.get_channel("audit");
    fx.engine
        .get_or_create_topic("payments", None)
        .unwrap()
        .get_channel("ledger");
}

#[test]
fn test_stats_json_filtering() {
    let fx = fixture();
    seed_stats(&fx);

    let resp = fx
        .gateway
        .stats(&RequestHead::new("format=json"))
        .unwrap();
    let all = resp.body.as_json().unwrap().clone();
    assert_eq!(all["topics"].as_array().unwrap().len(), 2);
    assert_eq!(all["version"], Value::from(format!("gantry v{VERSION}")));
    assert_eq!(all["health"], "OK");

    let resp = fx
        .gateway
        .stats(&RequestHead::new("format=json&topic=orders&channel=audit"))
        .unwrap();
    let filtered = resp.body.as_json().unwrap();
    let topics = filtered["topics"].as_array().unwrap();
    assert_eq!(topics.len(), 1);
    assert_eq!(topics[0]["topic_name"], "orders");
    let channels = topics[0]["channels"].as_array().unwrap();
    assert_eq!(channels.len(), 1);

    let unfiltered_audit = all["topics"][0]["channels"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["channel_name"] == "audit")
        .unwrap();
    assert_eq!(&channels[0], unfiltered_audit);
}

#[test]
fn test_stats_unknown_topic_returns_everything() {
    let fx = fixture();
    seed_stats(&fx);
    let report = fx.gateway.stats_report(Some("ghost"), None);
    assert_eq!(report.topics.len(), 2);
}

#[test]
fn test_stats_text() {
    let fx = fixture();
    seed_stats(&fx);

    let resp = fx
        .gateway
        .stats(&RequestHead::new("topic=payments"))
        .unwrap();
    let text = resp.body.as_text().unwrap();
    assert!(text.starts_with(&format!("gantry v{VERSION}\nstart_time ")));
    assert!(text.contains("Health: OK"));
    assert!(text.contains("[payments       ]"));
    assert!(text.contains("[ledger                   ]"));
    assert!(!text.contains("orders"));
}

#[test]
fn test_info_and_ping() {
    let fx = fixture();
    let resp = fx.gateway.info(&RequestHead::default()).unwrap();
    let info = resp.body.as_json().unwrap();
    assert_eq!(info["version"], VERSION);
    assert_eq!(info["http_port"], 4151);
    assert_eq!(info["tcp_port"], 4150);
    assert_eq!(info["start_time"], fx.gateway.start_time());

    let resp = fx.gateway.ping(&RequestHead::default()).unwrap();
    assert_eq!(resp.body, Body::Text("OK".to_string()));
}
