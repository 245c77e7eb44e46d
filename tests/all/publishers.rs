use crate::helpers::{MockBroker, Operation};
use carrot_relay::amqp::ExchangeKind;
use carrot_relay::pool;
use carrot_relay::publishers::{
    with_exchange, with_immediate, with_mandatory, with_publishing, DeliveryMode, Publisher,
    PublisherError, Publishing,
};
use serde::ser::Error as _;
use serde::{Serialize, Serializer};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn publishing_declares_a_durable_queue_then_publishes_json() {
    // Arrange
    let broker = MockBroker::new();
    let publisher = broker.publisher(2);

    // Act
    publisher
        .publish("q1", &json!({"a": "b"}), &[])
        .await
        .unwrap();

    // Assert
    let operations = broker.operations();
    let declares: Vec<_> = operations
        .iter()
        .filter(|operation| matches!(operation, Operation::QueueDeclare { .. }))
        .collect();
    assert_eq!(declares.len(), 1);
    match declares[0] {
        Operation::QueueDeclare {
            queue,
            durable,
            exclusive,
            auto_delete,
            nowait,
            ..
        } => {
            assert_eq!(queue, "q1");
            assert!(*durable);
            assert!(!*exclusive);
            assert!(!*auto_delete);
            assert!(!*nowait);
        }
        other => panic!("unexpected operation {other:?}"),
    }

    let published = broker.published();
    assert_eq!(published.len(), 1);
    let message = &published[0];
    assert_eq!(message.exchange, "");
    assert_eq!(message.routing_key, "q1");
    assert_eq!(message.body, br#"{"a":"b"}"#.to_vec());
    assert_eq!(message.content_type.as_deref(), Some("application/json"));
    assert_eq!(message.delivery_mode, Some(2));
    assert!(!message.mandatory);
    assert!(!message.immediate);

    // Declare, publish and close all happen on the leased channel, in this order
    let on_channel: Vec<_> = operations
        .iter()
        .filter(|operation| {
            matches!(
                operation,
                Operation::QueueDeclare { .. } | Operation::Publish(_) | Operation::CloseChannel { .. }
            )
        })
        .collect();
    assert!(matches!(on_channel[0], Operation::QueueDeclare { .. }));
    assert!(matches!(on_channel[1], Operation::Publish(_)));
    assert!(matches!(on_channel[2], Operation::CloseChannel { channel } if *channel == message.channel));
}

#[tokio::test]
async fn a_rejected_queue_declaration_is_never_followed_by_a_publish() {
    // Arrange
    let broker = MockBroker::new();
    let publisher = broker.publisher(2);
    broker.fail(|failures| failures.queue_declare = true);

    // Act
    let outcome = publisher.publish("q1", &json!({"a": "b"}), &[]).await;

    // Assert
    match outcome {
        Err(PublisherError::Declare { target, .. }) => assert_eq!(target, "q1"),
        other => panic!("unexpected outcome {other:?}"),
    }
    assert!(broker.published().is_empty());
    assert!(broker
        .operations()
        .iter()
        .any(|operation| matches!(operation, Operation::CloseChannel { .. })));
}

#[tokio::test]
async fn exchange_publishing_declares_the_exchange_and_uses_an_empty_routing_key() {
    // Arrange
    let broker = MockBroker::new();
    let publisher = broker.publisher(2);

    // Act
    publisher
        .exchange_publish("notifications", ExchangeKind::Fanout, &json!({"n": 1}), &[])
        .await
        .unwrap();

    // Assert
    let operations = broker.operations();
    assert!(!operations
        .iter()
        .any(|operation| matches!(operation, Operation::QueueDeclare { .. })));
    let declare = operations
        .iter()
        .find(|operation| matches!(operation, Operation::ExchangeDeclare { .. }))
        .unwrap();
    match declare {
        Operation::ExchangeDeclare {
            exchange,
            kind,
            durable,
            auto_delete,
            internal,
            ..
        } => {
            assert_eq!(exchange, "notifications");
            assert_eq!(*kind, ExchangeKind::Fanout);
            assert!(*durable);
            assert!(!*auto_delete);
            assert!(!*internal);
        }
        other => panic!("unexpected operation {other:?}"),
    }

    let published = broker.published();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].exchange, "notifications");
    assert_eq!(published[0].routing_key, "");
}

#[tokio::test]
async fn a_rejected_exchange_declaration_is_reported_with_its_name() {
    // Arrange
    let broker = MockBroker::new();
    let publisher = broker.publisher(2);
    broker.fail(|failures| failures.exchange_declare = true);

    // Act
    let outcome = publisher
        .exchange_publish("notifications", ExchangeKind::Topic, &json!({}), &[])
        .await;

    // Assert
    assert!(
        matches!(outcome, Err(PublisherError::Declare { ref target, .. }) if target == "notifications")
    );
    assert!(broker.published().is_empty());
}

#[tokio::test]
async fn payloads_that_cannot_be_encoded_never_reach_the_broker() {
    struct Unencodable;

    impl Serialize for Unencodable {
        fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(S::Error::custom("not representable as JSON"))
        }
    }

    // Arrange
    let broker = MockBroker::new();
    let publisher = broker.publisher(2);

    // Act
    let outcome = publisher.publish("q1", &Unencodable, &[]).await;

    // Assert
    assert!(matches!(outcome, Err(PublisherError::Marshal(_))));
    assert!(broker.operations().is_empty());
}

#[tokio::test]
async fn options_apply_to_a_single_publish() {
    // Arrange
    let broker = MockBroker::new();
    let publisher = broker.publisher(2);

    // Act
    publisher
        .publish(
            "q1",
            &json!({"first": true}),
            &[
                with_exchange("amq.direct"),
                with_mandatory(true),
                with_immediate(true),
                with_publishing(Publishing {
                    delivery_mode: DeliveryMode::Transient,
                    content_type: "text/plain".into(),
                }),
            ],
        )
        .await
        .unwrap();
    publisher
        .publish("q1", &json!({"first": false}), &[])
        .await
        .unwrap();

    // Assert
    let published = broker.published();
    assert_eq!(published.len(), 2);

    let customised = &published[0];
    assert_eq!(customised.exchange, "amq.direct");
    assert!(customised.mandatory);
    assert!(customised.immediate);
    assert_eq!(customised.delivery_mode, Some(1));
    assert_eq!(customised.content_type.as_deref(), Some("text/plain"));

    let plain = &published[1];
    assert_eq!(plain.exchange, "");
    assert!(!plain.mandatory);
    assert!(!plain.immediate);
    assert_eq!(plain.delivery_mode, Some(2));
    assert_eq!(plain.content_type.as_deref(), Some("application/json"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_publishes_never_see_each_others_options() {
    // Arrange
    let broker = MockBroker::new();
    let publisher = Arc::new(
        Publisher::builder(broker.pool(4))
            .options_pool_size(2)
            .build()
            .unwrap(),
    );

    // Act
    let handles: Vec<_> = (0..64)
        .map(|i| {
            let publisher = Arc::clone(&publisher);
            tokio::spawn(async move {
                let queue = format!("q{i}");
                let options = if i % 2 == 0 {
                    vec![with_exchange(format!("ex{i}"))]
                } else {
                    vec![]
                };
                publisher.publish(&queue, &json!({ "i": i }), &options).await
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    // Assert
    let published = broker.published();
    assert_eq!(published.len(), 64);
    for message in published {
        let i: usize = message.routing_key.trim_start_matches('q').parse().unwrap();
        let expected_exchange = if i % 2 == 0 {
            format!("ex{i}")
        } else {
            String::new()
        };
        assert_eq!(message.exchange, expected_exchange, "publish #{i}");
    }

    // Options are reset when they go back to the pool
    publisher.publish("after", &json!({}), &[]).await.unwrap();
    let last = broker.published().pop().unwrap();
    assert_eq!(last.routing_key, "after");
    assert_eq!(last.exchange, "");
}

#[tokio::test]
async fn every_publish_leases_a_fresh_channel() {
    // Arrange
    let broker = MockBroker::new();
    let publisher = broker.publisher(2);

    // Act
    for _ in 0..3 {
        publisher.publish("q1", &json!({}), &[]).await.unwrap();
    }

    // Assert
    let pool = publisher.channel_pool();
    assert_eq!(pool.channel_count().await, 3);
    assert_eq!(pool.connection_count().await, 2);
    let channels: Vec<_> = broker
        .published()
        .into_iter()
        .map(|message| message.channel)
        .collect();
    assert_eq!(channels, vec![0, 1, 2]);
}

#[tokio::test]
async fn broker_failures_while_publishing_are_returned() {
    // Arrange
    let broker = MockBroker::new();
    let publisher = broker.publisher(2);
    broker.fail(|failures| failures.publish = true);

    // Act
    let outcome = publisher.publish("q1", &json!({}), &[]).await;

    // Assert
    assert!(matches!(outcome, Err(PublisherError::Publish(_))));
    assert!(broker
        .operations()
        .iter()
        .any(|operation| matches!(operation, Operation::CloseChannel { .. })));
}

#[tokio::test]
async fn slow_publishes_time_out() {
    // Arrange
    let broker = MockBroker::new();
    broker.delay_publishes(Duration::from_secs(10));
    let publisher = Publisher::builder(broker.pool(2))
        .publish_timeout(Duration::from_millis(50))
        .build()
        .unwrap();

    // Act
    let outcome = publisher.publish("q1", &json!({}), &[]).await;

    // Assert
    assert!(matches!(outcome, Err(PublisherError::TimeoutError)));
    assert!(broker.published().is_empty());
}

#[tokio::test]
async fn publishing_through_a_closed_pool_fails() {
    // Arrange
    let broker = MockBroker::new();
    let publisher = broker.publisher(2);
    publisher.channel_pool().close().await.unwrap();

    // Act
    let outcome = publisher.publish("q1", &json!({}), &[]).await;

    // Assert
    assert!(matches!(
        outcome,
        Err(PublisherError::Channel(pool::Error::Closed))
    ));
}

#[tokio::test]
async fn a_slow_channel_close_does_not_fail_a_delivered_message() {
    // Arrange
    let broker = MockBroker::new();
    broker.delay_closes(Duration::from_millis(200));
    let publisher = Publisher::builder(broker.pool(2))
        .publish_timeout(Duration::from_millis(50))
        .build()
        .unwrap();

    // Act
    let outcome = publisher.publish("q1", &json!({"a": "b"}), &[]).await;

    // Assert
    assert!(outcome.is_ok(), "{outcome:?}");
    assert_eq!(broker.published().len(), 1);
    assert!(broker
        .operations()
        .iter()
        .any(|operation| matches!(operation, Operation::CloseChannel { .. })));
}

#[tokio::test]
async fn timed_out_publishes_still_close_their_channel() {
    // Arrange
    let broker = MockBroker::new();
    broker.delay_publishes(Duration::from_secs(10));
    let publisher = Publisher::builder(broker.pool(2))
        .publish_timeout(Duration::from_millis(50))
        .build()
        .unwrap();

    // Act
    let outcome = publisher.publish("q1", &json!({}), &[]).await;
    // The close runs in the background once the publish is abandoned
    tokio::time::sleep(Duration::from_millis(50)).await;

    // Assert
    assert!(matches!(outcome, Err(PublisherError::TimeoutError)));
    assert!(broker
        .operations()
        .iter()
        .any(|operation| matches!(operation, Operation::CloseChannel { channel: 0 })));
}

#[tokio::test]
async fn cancelled_publishes_still_close_their_channel() {
    // Arrange
    let broker = MockBroker::new();
    broker.delay_publishes(Duration::from_secs(10));
    let publisher = broker.publisher(2);

    // Act
    let cancelled = tokio::time::timeout(
        Duration::from_millis(50),
        publisher.publish("q1", &json!({}), &[]),
    )
    .await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    // Assert
    assert!(cancelled.is_err());
    assert!(broker
        .operations()
        .iter()
        .any(|operation| matches!(operation, Operation::CloseChannel { channel: 0 })));
}

#[tokio::test]
async fn options_of_a_failed_publish_do_not_leak_into_the_next_one() {
    // Arrange
    let broker = MockBroker::new();
    let publisher = Publisher::builder(broker.pool(2))
        .options_pool_size(1)
        .build()
        .unwrap();
    broker.fail(|failures| failures.queue_declare = true);
    let failed = publisher
        .publish(
            "q1",
            &json!({}),
            &[with_exchange("x"), with_mandatory(true)],
        )
        .await;
    broker.fail(|failures| failures.queue_declare = false);

    // Act
    publisher.publish("q1", &json!({}), &[]).await.unwrap();

    // Assert
    assert!(matches!(failed, Err(PublisherError::Declare { .. })));
    let published = broker.published();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].exchange, "");
    assert!(!published[0].mandatory);
}

#[tokio::test]
async fn the_publish_timeout_also_bounds_dialing_a_new_connection() {
    // Arrange
    let broker = MockBroker::new();
    broker.delay_dials(Duration::from_secs(10));
    let publisher = Publisher::builder(broker.pool(2))
        .publish_timeout(Duration::from_millis(50))
        .build()
        .unwrap();

    // Act
    let outcome = publisher.publish("q1", &json!({}), &[]).await;

    // Assert
    assert!(matches!(outcome, Err(PublisherError::TimeoutError)));
    assert_eq!(publisher.channel_pool().connection_count().await, 0);
    assert!(broker.operations().is_empty());
}
