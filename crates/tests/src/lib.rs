//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 合约快照测试
//! - HTTP -> Dispatcher -> Broker 端到端测试（无需真实 broker）
//! - 配置文件到分发器的装配测试

#[cfg(test)]
mod contract_tests {
    use contracts::{DispatchOutcome, Event, TopicId};

    #[test]
    fn test_event_missing_keys_default_to_empty() {
        let event: Event = serde_json::from_str(r#"{"id":"evt-1","domain":"Banking"}"#).unwrap();
        assert_eq!(event.id, "evt-1");
        assert_eq!(event.subdomain, "");
        assert_eq!(event.code, "");
        assert_eq!(event.branch_id, 0);
    }

    #[test]
    fn test_config_version_pinned() {
        let config: contracts::ServiceConfig =
            serde_json::from_str(r#"{"version":"V1"}"#).unwrap();
        assert_eq!(config.version, contracts::ConfigVersion::V1);

        assert!(serde_json::from_str::<contracts::ServiceConfig>(r#"{"version":"V2"}"#).is_err());
    }

    #[test]
    fn test_event_wire_keys() {
        let json = r#"{
            "eventtimestamp": 1700000000000000000,
            "eventtime": "2023-11-14T22:13:20.000Z",
            "id": "evt-1",
            "domain": "Banking",
            "subdomain": "Domestic",
            "code": "Created",
            "version": "1.0",
            "branchid": 1234,
            "channelid": 5,
            "customerid": 200000,
            "userid": 12345,
            "payload": "hello"
        }"#;

        let event: Event = serde_json::from_str(json).unwrap();
        assert_eq!(event.branch_id, 1234);
        assert_eq!(event.customer_id, 200000);
        assert_eq!(event.event_time, "2023-11-14T22:13:20.000Z");

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["userid"], 12345);
        assert_eq!(value["eventtimestamp"], 1700000000000000000i64);
    }

    #[test]
    fn test_outcome_wire_keys() {
        let outcome = DispatchOutcome {
            succeeded: vec!["a".into()],
            invalid: vec!["b".into()],
            failed: vec!["c".into()],
        };

        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "successEventIds": ["a"],
                "invalidEventIds": ["b"],
                "failedEventIds": ["c"],
            })
        );
    }

    #[test]
    fn test_topic_from_parts() {
        assert_eq!(
            TopicId::from_parts("Banking", "Domestic", "Created").as_str(),
            "Banking_Domestic_Created"
        );
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::collections::HashSet;
    use std::net::SocketAddr;
    use std::sync::{Arc, Mutex};

    use contracts::{DispatchOutcome, DispatchSettings, Event, EventStatus, ServerConfig};
    use dispatcher::brokers::network::{read_batch, write_ack, RelayBatch};
    use dispatcher::{EventDispatcher, InMemoryBroker, MessageBroker, NetworkBroker, NetworkBrokerConfig};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;
    use tokio::task::JoinHandle;

    struct TestServer {
        addr: SocketAddr,
        shutdown: oneshot::Sender<()>,
        handle: JoinHandle<Result<(), http_api::ApiError>>,
    }

    impl TestServer {
        async fn start<B>(dispatcher: Arc<EventDispatcher<B>>) -> Self
        where
            B: MessageBroker + Send + Sync + 'static,
        {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            let (shutdown, shutdown_rx) = oneshot::channel::<()>();
            let handle = tokio::spawn(http_api::serve(
                listener,
                http_api::router(dispatcher, ServerConfig::default().max_body_bytes),
                async move {
                    let _ = shutdown_rx.await;
                },
            ));
            Self {
                addr,
                shutdown,
                handle,
            }
        }

        fn url(&self, path: &str) -> String {
            format!("http://{}{}", self.addr, path)
        }

        async fn stop(self) {
            self.shutdown.send(()).unwrap();
            self.handle.await.unwrap().unwrap();
        }
    }

    async fn post_events(server: &TestServer, events: &[Event]) -> DispatchOutcome {
        let response = reqwest::Client::new()
            .post(server.url("/events"))
            .json(events)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        response.json().await.unwrap()
    }

    /// Relay that accepts every connection, records each batch and rejects
    /// the listed topics
    async fn spawn_relay(rejected: &'static [&'static str]) -> (String, Arc<Mutex<Vec<RelayBatch>>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&received);

        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let sink = Arc::clone(&sink);
                tokio::spawn(async move {
                    let batch = read_batch(&mut stream).await.unwrap();
                    let reject = rejected.contains(&batch.topic.as_str());
                    // Record before acking so the caller sees it once dispatch returns
                    sink.lock().unwrap().push(batch);
                    let ack = if reject {
                        Err("topic authorization failed")
                    } else {
                        Ok(())
                    };
                    write_ack(&mut stream, ack).await.unwrap();
                });
            }
        });

        (addr, received)
    }

    /// End-to-end test: HTTP -> EventDispatcher -> InMemoryBroker
    ///
    /// 验证完整的数据流：
    /// 1. 请求体解析为事件数组
    /// 2. 校验、分组、按 topic 发布
    /// 3. 响应覆盖全部事件 id
    #[tokio::test]
    async fn test_e2e_http_to_memory_broker() {
        let broker = Arc::new(InMemoryBroker::new("mem"));
        broker.reject_topic("Cards_Credit_Blocked", "not authorized");
        let dispatcher = Arc::new(EventDispatcher::with_shared_broker(
            Arc::clone(&broker),
            &DispatchSettings::default(),
        ));
        let server = TestServer::start(Arc::clone(&dispatcher)).await;

        let events = vec![
            Event::new("e1", "Banking", "Domestic", "Created"),
            Event::new("e2", "Banking", "Domestic", "Created"),
            Event::new("e3", "Cards", "Credit", "Blocked"),
            Event::new("e4", "Banking", "", "Created"),
        ];
        let outcome = post_events(&server, &events).await;

        assert_eq!(outcome.succeeded, vec!["e1", "e2"]);
        assert_eq!(outcome.failed, vec!["e3"]);
        assert_eq!(outcome.invalid, vec!["e4"]);

        assert_eq!(broker.publish_count("Banking_Domestic_Created"), 1);
        assert_eq!(broker.publish_count("Cards_Credit_Blocked"), 0);

        let metrics = dispatcher.metrics();
        assert_eq!(metrics.batch_count, 1);
        assert_eq!(metrics.succeeded_count, 2);

        server.stop().await;
    }

    #[tokio::test]
    async fn test_e2e_malformed_request_rejected_wholesale() {
        let broker = Arc::new(InMemoryBroker::new("mem"));
        let dispatcher = Arc::new(EventDispatcher::with_shared_broker(
            Arc::clone(&broker),
            &DispatchSettings::default(),
        ));
        let server = TestServer::start(Arc::clone(&dispatcher)).await;

        let response = reqwest::Client::new()
            .post(server.url("/events"))
            .header("content-type", "application/json")
            .body(r#"[{"id":"e1","domain":"A","subdomain":"B","code":"C"},"#)
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), 400);
        let body: serde_json::Value = response.json().await.unwrap();
        assert_eq!(body["error"], "Invalid JSON format");
        assert!(broker.batches().is_empty());
        assert_eq!(dispatcher.metrics().batch_count, 0);

        server.stop().await;
    }

    /// End-to-end test: HTTP -> EventDispatcher -> NetworkBroker -> TCP relay
    #[tokio::test]
    async fn test_e2e_network_relay() {
        let (relay_addr, received) = spawn_relay(&["Cards_Credit_Blocked"]).await;
        let broker = NetworkBroker::new(
            "network",
            NetworkBrokerConfig {
                endpoints: vec![relay_addr],
                connect_timeout: std::time::Duration::from_secs(1),
            },
        );
        let dispatcher = Arc::new(EventDispatcher::new(broker, &DispatchSettings::default()));
        let server = TestServer::start(dispatcher).await;

        let events = vec![
            Event::new("e1", "Banking", "Domestic", "Created").with_payload("p1"),
            Event::new("e2", "Cards", "Credit", "Blocked"),
            Event::new("e3", "Banking", "Domestic", "Created").with_payload("p3"),
        ];
        let outcome = post_events(&server, &events).await;

        assert_eq!(outcome.succeeded, vec!["e1", "e3"]);
        assert_eq!(outcome.failed, vec!["e2"]);

        let batches = received.lock().unwrap().clone();
        let accepted = batches
            .iter()
            .find(|b| b.topic == "Banking_Domestic_Created")
            .unwrap();
        let keys: Vec<_> = accepted.records.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["e1", "e3"]);

        // Record values are the JSON-encoded events, unchanged
        let decoded: Event = serde_json::from_slice(&accepted.records[1].value).unwrap();
        assert_eq!(decoded, events[2]);

        server.stop().await;
    }

    #[tokio::test]
    async fn test_e2e_unreachable_relay_fails_all_valid_events() {
        let dead = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let dead_addr = dead.local_addr().unwrap().to_string();
        drop(dead);

        let broker = NetworkBroker::new(
            "network",
            NetworkBrokerConfig {
                endpoints: vec![dead_addr],
                connect_timeout: std::time::Duration::from_millis(200),
            },
        );
        let dispatcher = EventDispatcher::new(broker, &DispatchSettings::default());

        let outcome = dispatcher
            .dispatch(vec![
                Event::new("e1", "A", "B", "C"),
                Event::new("e2", "D", "E", "F"),
                Event::new("e3", "", "E", "F"),
            ])
            .await;

        assert_eq!(outcome.failed, vec!["e1", "e2"]);
        assert_eq!(outcome.invalid, vec!["e3"]);
    }

    /// Partition invariant over a larger mixed batch
    #[tokio::test]
    async fn test_partition_invariant_mixed_batch() {
        let broker = Arc::new(InMemoryBroker::new("mem"));
        broker.reject_topic("D1_S_C", "rejected");
        let settings = DispatchSettings {
            max_message_bytes: 2048,
            ..Default::default()
        };
        let dispatcher = EventDispatcher::with_shared_broker(Arc::clone(&broker), &settings);

        let events: Vec<Event> = (0..60)
            .map(|i| {
                let domain = if i % 11 == 0 { String::new() } else { format!("D{}", i % 4) };
                let event = Event::new(format!("evt-{i}"), domain, "S", "C");
                if i % 13 == 0 {
                    event.with_payload("x".repeat(4096))
                } else {
                    event
                }
            })
            .collect();

        let outcome = dispatcher.dispatch(events.clone()).await;

        let succeeded: HashSet<_> = outcome.succeeded.iter().collect();
        let invalid: HashSet<_> = outcome.invalid.iter().collect();
        let failed: HashSet<_> = outcome.failed.iter().collect();
        assert!(succeeded.is_disjoint(&invalid));
        assert!(succeeded.is_disjoint(&failed));
        assert!(invalid.is_disjoint(&failed));
        assert_eq!(outcome.len(), events.len());

        for (i, event) in events.iter().enumerate() {
            let expected = if i % 11 == 0 {
                EventStatus::Invalid
            } else if i % 13 == 0 || i % 4 == 1 {
                EventStatus::Failed
            } else {
                EventStatus::Succeeded
            };
            assert_eq!(outcome.status_of(&event.id), Some(expected), "event {}", event.id);
        }

        // Accepted messages are exactly the succeeded events
        assert_eq!(broker.message_count(), outcome.succeeded.len());

        let mut aggregator = observability::OutcomeAggregator::new();
        aggregator.record_response(&outcome, 1.0);
        assert_eq!(aggregator.total_events(), events.len() as u64);
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let dispatcher = Arc::new(EventDispatcher::new(
            InMemoryBroker::new("mem"),
            &DispatchSettings::default(),
        ));
        let server = TestServer::start(dispatcher).await;

        let body: serde_json::Value = reqwest::get(server.url("/protected/health"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["status"], "healthy");

        server.stop().await;
    }
}

#[cfg(test)]
mod config_tests {
    use std::io::Write;

    use config_loader::ConfigLoader;
    use contracts::{BrokerKind, Event, WireFormat};
    use dispatcher::{DispatcherBuilder, DispatcherConfig, MessageBroker};

    /// Config file -> DispatcherBuilder -> dispatch
    #[tokio::test]
    async fn test_config_file_to_dispatcher() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[server]
port = 9191

[broker]
kind = "memory"

[dispatch]
publish_timeout_ms = 2000
wire_format = "bincode"
"#
        )
        .unwrap();

        let config = ConfigLoader::load_from_path(file.path()).unwrap();
        assert_eq!(config.server.port, 9191);
        assert_eq!(config.broker.kind, BrokerKind::Memory);
        assert_eq!(config.dispatch.wire_format, WireFormat::Bincode);

        let dispatcher = DispatcherBuilder::new(DispatcherConfig::from(&config))
            .build()
            .unwrap();
        assert_eq!(dispatcher.broker().name(), "memory");

        let outcome = dispatcher
            .dispatch(vec![Event::new("e1", "A", "B", "C")])
            .await;
        assert_eq!(outcome.succeeded, vec!["e1"]);
    }

    #[test]
    fn test_json_config_round_trip() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        writeln!(
            file,
            r#"{{"broker": {{"kind": "log", "endpoints": ["relay-a:9000", "relay-b:9000"]}}}}"#
        )
        .unwrap();

        let config = ConfigLoader::load_from_path(file.path()).unwrap();
        assert_eq!(config.broker.kind, BrokerKind::Log);
        assert_eq!(config.broker.endpoints.len(), 2);

        let toml = ConfigLoader::to_toml(&config).unwrap();
        let reparsed = ConfigLoader::load_from_str(&toml, config_loader::ConfigFormat::Toml).unwrap();
        assert_eq!(reparsed.broker.endpoints, config.broker.endpoints);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[broker]\nendpoints = []\n").unwrap();

        assert!(ConfigLoader::load_from_path(file.path()).is_err());
    }
}
