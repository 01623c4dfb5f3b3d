//! Topic and channel administration tests

mod common;

use common::fixture;
use futures::io::Cursor;
use gantry_core::engine::QueueEngine;
use gantry_gateway::{RequestHead, Response};

#[test]
fn test_create_topic_validates_name() {
    let fx = fixture();
    assert_eq!(
        fx.gateway
            .create_topic(&RequestHead::new("topic=payments"))
            .unwrap(),
        Response::ok()
    );
    assert!(fx.engine.topic("payments").is_some());

    let err = fx
        .gateway
        .create_topic(&RequestHead::new("topic=no%20spaces"))
        .unwrap_err();
    assert_eq!(err.code(), "INVALID_TOPIC");

    let err = fx.gateway.create_topic(&RequestHead::new("")).unwrap_err();
    assert_eq!(err.code(), "MISSING_ARG_TOPIC");
}

#[test]
fn test_delete_topic() {
    let fx = fixture();
    fx.gateway
        .delete_topic(&RequestHead::new("topic=orders"))
        .unwrap();
    assert!(fx.engine.topic("orders").is_none());

    let err = fx
        .gateway
        .delete_topic(&RequestHead::new("topic=orders"))
        .unwrap_err();
    assert_eq!(err.status(), 404);
    assert_eq!(err.code(), "TOPIC_NOT_FOUND");
}

#[compio::test]
async fn test_empty_topic() {
    let fx = fixture();
    fx.gateway
        .publish_batch(
            &RequestHead::new("topic=orders"),
            &mut Cursor::new(b"a\nb\n".to_vec()),
        )
        .await
        .unwrap();
    assert_eq!(fx.engine.topic("orders").unwrap().depth(), 2);

    fx.gateway
        .empty_topic(&RequestHead::new("topic=orders"))
        .unwrap();
    assert_eq!(fx.engine.topic("orders").unwrap().depth(), 0);

    let err = fx
        .gateway
        .empty_topic(&RequestHead::new("topic=ghost"))
        .unwrap_err();
    assert_eq!(err.code(), "TOPIC_NOT_FOUND");
}

#[test]
fn test_channel_lifecycle() {
    let fx = fixture();
    let head = RequestHead::new("topic=orders&channel=billing");

    fx.gateway.create_channel(&head).unwrap();
    let topic = fx.engine.topic("orders").unwrap();
    assert!(topic.channel("billing").is_some());

    fx.gateway.delete_channel(&head).unwrap();
    assert!(topic.channel("billing").is_none());

    let err = fx.gateway.delete_channel(&head).unwrap_err();
    assert_eq!(err.status(), 404);
    assert_eq!(err.code(), "CHANNEL_NOT_FOUND");

    let err = fx
        .gateway
        .create_channel(&RequestHead::new("topic=orders"))
        .unwrap_err();
    assert_eq!(err.code(), "MISSING_ARG_CHANNEL");

    let err = fx
        .gateway
        .create_channel(&RequestHead::new("topic=ghost&channel=c"))
        .unwrap_err();
    assert_eq!(err.code(), "TOPIC_NOT_FOUND");
}

#[test]
fn test_pause_persists_metadata() {
    let fx = fixture();
    let head = RequestHead::new("topic=orders&channel=billing");
    fx.gateway.create_channel(&head).unwrap();
    let channel = fx.engine.topic("orders").unwrap().channel("billing").unwrap();

    fx.gateway.pause_channel(&head).unwrap();
    assert!(gantry_core::engine::Channel::is_paused(channel.as_ref()));
    assert_eq!(fx.engine.metadata_persists(), 1);

    fx.gateway.unpause_channel(&head).unwrap();
    assert!(!gantry_core::engine::Channel::is_paused(channel.as_ref()));
    assert_eq!(fx.engine.metadata_persists(), 2);

    let err = fx
        .gateway
        .pause_channel(&RequestHead::new("topic=orders&channel=ghost"))
        .unwrap_err();
    assert_eq!(err.code(), "CHANNEL_NOT_FOUND");
    assert_eq!(fx.engine.metadata_persists(), 2);
}

#[test]
fn test_message_stats() {
    let fx = fixture();
    fx.engine
        .get_existing_topic("orders", None)
        .unwrap()
        .get_channel("billing");

    let resp = fx
        .gateway
        .message_stats(&RequestHead::new("topic=orders&channel=billing"))
        .unwrap();
    assert!(resp.body.as_text().unwrap().contains("channel billing"));

    let err = fx
        .gateway
        .message_stats(&RequestHead::new("channel=billing"))
        .unwrap_err();
    assert_eq!(err.code(), "TOPIC_NOT_FOUND");
}
