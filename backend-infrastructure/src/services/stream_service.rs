// Census push-stream consumer

use std::time::Duration;

use anyhow::{anyhow, Result};
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use backend_application::commands::ingest_commands::{decode_raw_event, dispatch_event};
use backend_application::AppState;
use backend_domain::RuntimeConfig;

const RECONNECT_DELAY_SECONDS: u64 = 5;

type CensusSocket =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

pub fn spawn_census_stream(state: AppState) -> Option<JoinHandle<()>> {
    if !state.config.stream_enabled {
        info!("census stream disabled");
        return None;
    }
    let url = stream_url(&state.config);
    let subscribe = subscription_message(&state.config).to_string();
    Some(tokio::spawn(async move {
        loop {
            match tokio_tungstenite::connect_async(url.as_str()).await {
                Ok((mut socket, _)) => {
                    info!("census stream connected");
                    if let Err(err) = run_stream_loop(&state, &mut socket, &subscribe).await {
                        warn!("census stream loop exited: {}", err);
                    }
                }
                Err(err) => {
                    warn!("census stream connect failed: {}", err);
                }
            }
            sleep(Duration::from_secs(RECONNECT_DELAY_SECONDS)).await;
        }
    }))
}

async fn run_stream_loop(state: &AppState, socket: &mut CensusSocket, subscribe: &str) -> Result<()> {
    socket.send(Message::Text(subscribe.to_string())).await?;
    while let Some(next) = socket.next().await {
        match next {
            Ok(Message::Text(text)) => {
                let Some(payload) = service_payload(&text) else {
                    continue;
                };
                let Some(raw) = decode_raw_event(payload) else {
                    continue;
                };
                let task_state = state.clone();
                tokio::spawn(async move {
                    let outcome = dispatch_event(&task_state, raw).await;
                    debug!(?outcome, "stream event dispatched");
                });
            }
            Ok(Message::Ping(bytes)) => {
                socket.send(Message::Pong(bytes)).await?;
            }
            Ok(Message::Close(frame)) => {
                return Err(anyhow!("closed by peer: {:?}", frame));
            }
            Ok(_) => {}
            Err(err) => {
                return Err(anyhow!("stream error: {}", err));
            }
        }
    }
    Err(anyhow!("stream ended"))
}

pub fn stream_url(config: &RuntimeConfig) -> String {
    let base = config.census_stream_url.trim();
    if base.contains("service-id=") {
        return base.to_string();
    }
    let separator = if base.contains('?') { '&' } else { '?' };
    let environment = if base.contains("environment=") {
        String::new()
    } else {
        "environment=ps2&".to_string()
    };
    format!(
        "{}{}{}service-id=s:{}",
        base, separator, environment, config.census_service_id
    )
}

pub fn subscription_message(config: &RuntimeConfig) -> Value {
    json!({
        "service": "event",
        "action": "subscribe",
        "characters": ["all"],
        "worlds": config.stream_worlds,
        "eventNames": config.stream_event_names,
        "logicalAndCharactersWithWorlds": true,
    })
}

/// The event payload of a `serviceMessage`; heartbeats and connection notices yield `None`.
pub fn service_payload(text: &str) -> Option<Value> {
    let mut message: Value = serde_json::from_str(text).ok()?;
    if message.get("type").and_then(Value::as_str) != Some("serviceMessage") {
        return None;
    }
    message.get_mut("payload").map(Value::take)
}

#[cfg(test)]
mod tests {
    use super::*;
    use backend_domain::{IngestFilter, ReconstructionConfig};

    fn config() -> RuntimeConfig {
        RuntimeConfig {
            bind_addr: "127.0.0.1:0".into(),
            api_token: None,
            report_dir: "reports".into(),
            census_service_id: "example".into(),
            census_api_base: "https://census.daybreakgames.com".into(),
            census_stream_url: "wss://push.planetside2.com/streaming".into(),
            stream_enabled: true,
            stream_worlds: vec!["1".into(), "17".into()],
            stream_event_names: vec!["Death".into(), "GainExperience".into()],
            max_body_bytes: 1024,
            request_timeout_seconds: 5,
            prefetch_url_budget: 1800,
            prefetch_batch_size: 200,
            max_report_minutes: 1440,
            max_outfit_members: 1000,
            ingest: IngestFilter::default(),
            reconstruction: ReconstructionConfig::default(),
        }
    }

    #[test]
    fn url_gets_environment_and_service_id() {
        assert_eq!(
            stream_url(&config()),
            "wss://push.planetside2.com/streaming?environment=ps2&service-id=s:example"
        );
        let mut explicit = config();
        explicit.census_stream_url = "wss://push.invalid/streaming?environment=ps2".into();
        assert_eq!(
            stream_url(&explicit),
            "wss://push.invalid/streaming?environment=ps2&service-id=s:example"
        );
    }

    #[test]
    fn subscription_lists_worlds_and_events() {
        let message = subscription_message(&config());
        assert_eq!(message["action"], "subscribe");
        assert_eq!(message["worlds"], json!(["1", "17"]));
        assert_eq!(message["eventNames"], json!(["Death", "GainExperience"]));
    }

    #[test]
    fn only_service_messages_carry_payloads() {
        let event = r#"{"payload":{"event_name":"PlayerLogin","character_id":"1"},"service":"event","type":"serviceMessage"}"#;
        assert_eq!(service_payload(event).unwrap()["event_name"], "PlayerLogin");
        let heartbeat = r#"{"online":{},"service":"event","type":"heartbeat"}"#;
        assert!(service_payload(heartbeat).is_none());
        assert!(service_payload("not json").is_none());
    }
}
