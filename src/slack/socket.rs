//! Slack Socket Mode event feed.
//!
//! A background task owns the WebSocket: it acknowledges every envelope,
//! forwards message events into a queue, and reopens the connection when
//! Slack asks it to. The poll loop drains whatever has been queued since
//! the previous tick with [`SocketModeFeed::read_events`].

use futures::{SinkExt, StreamExt};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, warn};

use crate::core::models::InboundEvent;
use crate::errors::BotError;

pub const SLACK_API_BASE: &str = "https://slack.com/api";

/// Pause before reopening a connection Slack has closed or rotated.
pub const RECONNECT_DELAY: Duration = Duration::from_secs(2);

type SocketStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Debug, Clone, Deserialize)]
pub struct SocketEnvelope {
    #[serde(default)]
    pub envelope_id: String,
    #[serde(rename = "type")]
    pub envelope_type: String,
    #[serde(default)]
    pub payload: Value,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvelopeAction {
    Event(InboundEvent),
    Disconnect,
    Ignore,
}

/// # Errors
///
/// Returns `BotError::ParseError` if the frame is not a Socket Mode envelope.
pub fn parse_envelope(text: &str) -> Result<SocketEnvelope, BotError> {
    serde_json::from_str(text)
        .map_err(|e| BotError::ParseError(format!("invalid socket envelope: {}", e)))
}

#[must_use]
pub fn classify_envelope(envelope: &SocketEnvelope) -> EnvelopeAction {
    match envelope.envelope_type.as_str() {
        "events_api" => envelope
            .payload
            .get("event")
            .cloned()
            .and_then(|event| serde_json::from_value::<InboundEvent>(event).ok())
            .map_or(EnvelopeAction::Ignore, EnvelopeAction::Event),
        "disconnect" => EnvelopeAction::Disconnect,
        _ => EnvelopeAction::Ignore,
    }
}

#[must_use]
pub fn ack_payload(envelope_id: &str) -> String {
    json!({ "envelope_id": envelope_id }).to_string()
}

#[derive(Debug, Deserialize)]
struct ConnectionsOpenResponse {
    ok: bool,
    url: Option<String>,
    error: Option<String>,
}

/// Opens Socket Mode WebSocket URLs with the app-level token.
#[derive(Debug, Clone)]
pub struct SocketModeConnector {
    http: Client,
    app_token: String,
    api_base: String,
}

impl SocketModeConnector {
    #[must_use]
    pub fn new(app_token: String) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            http,
            app_token,
            api_base: SLACK_API_BASE.to_string(),
        }
    }

    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Calls `apps.connections.open` for a fresh WebSocket URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or Slack refuses the connection.
    pub async fn open_url(&self) -> Result<String, BotError> {
        let resp: ConnectionsOpenResponse = self
            .http
            .post(format!("{}/apps.connections.open", self.api_base))
            .bearer_auth(&self.app_token)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .send()
            .await?
            .json()
            .await?;

        if !resp.ok {
            return Err(BotError::ApiError(format!(
                "apps.connections.open failed: {}",
                resp.error.unwrap_or_else(|| "unknown".to_string())
            )));
        }

        resp.url
            .ok_or_else(|| BotError::ApiError("apps.connections.open returned no url".to_string()))
    }

    async fn connect(&self) -> Result<SocketStream, BotError> {
        let url = self.open_url().await?;
        let (stream, _response) = connect_async(url.as_str()).await?;
        Ok(stream)
    }
}

pub struct SocketModeFeed {
    events: UnboundedReceiver<InboundEvent>,
    reader: JoinHandle<()>,
}

impl SocketModeFeed {
    /// Opens the first connection and starts the background reader.
    ///
    /// # Errors
    ///
    /// Returns an error if the initial connection cannot be established.
    pub async fn connect(connector: SocketModeConnector) -> Result<Self, BotError> {
        let stream = connector.connect().await?;
        let (tx, rx) = mpsc::unbounded_channel();
        let reader = tokio::spawn(run_reader(connector, stream, tx));

        Ok(Self { events: rx, reader })
    }

    /// Drains every event queued since the last call, in arrival order.
    pub fn read_events(&mut self) -> Vec<InboundEvent> {
        let mut batch = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            batch.push(event);
        }
        batch
    }
}

impl Drop for SocketModeFeed {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

async fn run_reader(
    connector: SocketModeConnector,
    first: SocketStream,
    tx: UnboundedSender<InboundEvent>,
) {
    let mut next = Some(first);

    loop {
        let stream = match next.take() {
            Some(stream) => stream,
            None => {
                tokio::time::sleep(RECONNECT_DELAY).await;
                match connector.connect().await {
                    Ok(stream) => {
                        info!("Socket Mode reconnected");
                        stream
                    }
                    Err(e) => {
                        warn!("Socket Mode reconnect failed: {}", e);
                        continue;
                    }
                }
            }
        };

        if let Err(e) = read_session(stream, &tx).await {
            warn!("Socket Mode session ended with error: {}", e);
        }

        if tx.is_closed() {
            break;
        }
    }
}

async fn read_session(
    stream: SocketStream,
    tx: &UnboundedSender<InboundEvent>,
) -> Result<(), BotError> {
    let (mut sink, mut source) = stream.split();

    while let Some(frame) = source.next().await {
        let text = match frame? {
            WsMessage::Text(text) => text,
            WsMessage::Ping(data) => {
                sink.send(WsMessage::Pong(data)).await?;
                continue;
            }
            WsMessage::Close(_) => {
                info!("Socket Mode connection closed by Slack");
                return Ok(());
            }
            _ => continue,
        };

        let envelope = match parse_envelope(text.as_str()) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!("{}", e);
                continue;
            }
        };

        if !envelope.envelope_id.is_empty() {
            sink.send(WsMessage::Text(ack_payload(&envelope.envelope_id).into()))
                .await?;
        }

        match classify_envelope(&envelope) {
            EnvelopeAction::Event(event) => {
                debug!("Queued {} event from {}", event.event_type, event.channel);
                if tx.send(event).is_err() {
                    return Ok(());
                }
            }
            EnvelopeAction::Disconnect => {
                info!(
                    "Slack requested disconnect: {}",
                    envelope.reason.as_deref().unwrap_or("unspecified")
                );
                return Ok(());
            }
            EnvelopeAction::Ignore => {}
        }
    }

    Ok(())
}
