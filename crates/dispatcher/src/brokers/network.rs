//! NetworkBroker - TCP relay transport
//!
//! Each batch travels as one length-prefixed frame (big endian):
//!
//! ```text
//! u16 topic_len | topic | u32 count | count * (u16 key_len | key | i64 ts_ms | u32 value_len | value)
//! ```
//!
//! The relay answers with one status byte. `0` accepts the batch; any other
//! value is followed by `u16 len | reason` and rejects it.

use std::time::Duration;

use bytes::{BufMut, Bytes, BytesMut};
use contracts::{BrokerConfig, BrokerMessage, ContractError, MessageBroker, TopicId};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, instrument, warn};

/// Status byte for an accepted batch
pub const STATUS_OK: u8 = 0;
/// Status byte for a rejected batch
pub const STATUS_REJECTED: u8 = 1;

/// Configuration for NetworkBroker
#[derive(Debug, Clone)]
pub struct NetworkBrokerConfig {
    /// Relay addresses, tried in order
    pub endpoints: Vec<String>,
    /// Per-endpoint connect timeout
    pub connect_timeout: Duration,
}

impl NetworkBrokerConfig {
    pub fn from_broker_config(config: &BrokerConfig) -> Self {
        Self {
            endpoints: config.endpoints.clone(),
            connect_timeout: config.connect_timeout(),
        }
    }
}

/// Broker that ships each batch to a TCP relay
///
/// Opens one connection per batch so concurrent group publishes never share
/// a stream.
pub struct NetworkBroker {
    name: String,
    config: NetworkBrokerConfig,
}

impl NetworkBroker {
    /// Create a new NetworkBroker
    pub fn new(name: impl Into<String>, config: NetworkBrokerConfig) -> Self {
        let name = name.into();
        debug!(
            broker = %name,
            endpoints = ?config.endpoints,
            "NetworkBroker configured"
        );
        Self { name, config }
    }

    pub fn config(&self) -> &NetworkBrokerConfig {
        &self.config
    }

    async fn connect(&self) -> Result<TcpStream, ContractError> {
        let mut last_error = String::from("no endpoints configured");

        for endpoint in &self.config.endpoints {
            match tokio::time::timeout(self.config.connect_timeout, TcpStream::connect(endpoint))
                .await
            {
                Ok(Ok(stream)) => {
                    debug!(broker = %self.name, endpoint = %endpoint, "Connected");
                    return Ok(stream);
                }
                Ok(Err(e)) => {
                    warn!(broker = %self.name, endpoint = %endpoint, error = %e, "Connect failed");
                    last_error = format!("{endpoint}: {e}");
                }
                Err(_) => {
                    warn!(broker = %self.name, endpoint = %endpoint, "Connect timed out");
                    last_error = format!(
                        "{endpoint}: connect timed out after {}ms",
                        self.config.connect_timeout.as_millis()
                    );
                }
            }
        }

        Err(ContractError::broker_unavailable(&self.name, last_error))
    }

    async fn exchange(
        &self,
        stream: &mut TcpStream,
        topic: &TopicId,
        frame: &[u8],
    ) -> Result<(), ContractError> {
        let io_error = |e: std::io::Error| ContractError::broker_connection(&self.name, e.to_string());

        stream.write_all(frame).await.map_err(io_error)?;
        stream.flush().await.map_err(io_error)?;

        let status = stream.read_u8().await.map_err(io_error)?;
        if status == STATUS_OK {
            return Ok(());
        }

        let len = stream.read_u16().await.map_err(io_error)? as usize;
        let mut reason = vec![0u8; len];
        stream.read_exact(&mut reason).await.map_err(io_error)?;

        Err(ContractError::broker_rejected(
            &self.name,
            topic.as_str(),
            String::from_utf8_lossy(&reason).into_owned(),
        ))
    }
}

impl MessageBroker for NetworkBroker {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "network_broker_send_batch",
        skip(self, messages),
        fields(broker = %self.name, topic = %topic, messages = messages.len())
    )]
    async fn send_batch(
        &self,
        topic: &TopicId,
        messages: Vec<BrokerMessage>,
    ) -> Result<(), ContractError> {
        let frame = encode_batch(topic, &messages)
            .map_err(|e| ContractError::broker_rejected(&self.name, topic.as_str(), e))?;

        let mut stream = self.connect().await?;
        let result = self.exchange(&mut stream, topic, &frame).await;
        let _ = stream.shutdown().await;

        if result.is_ok() {
            debug!(broker = %self.name, topic = %topic, bytes = frame.len(), "Batch sent");
        }
        result
    }

    #[instrument(name = "network_broker_close", skip(self))]
    async fn close(&self) -> Result<(), ContractError> {
        // Connections are per batch; nothing held open
        debug!(broker = %self.name, "NetworkBroker closed");
        Ok(())
    }
}

/// Encode one batch into a relay frame
pub fn encode_batch(topic: &TopicId, messages: &[BrokerMessage]) -> Result<Bytes, String> {
    let topic_len = u16::try_from(topic.as_str().len())
        .map_err(|_| format!("topic '{topic}' too long for frame"))?;
    let count = u32::try_from(messages.len()).map_err(|_| "too many messages in batch".to_string())?;

    let body: usize = messages
        .iter()
        .map(|m| 2 + m.key.len() + 8 + 4 + m.value.len())
        .sum();
    let mut buf = BytesMut::with_capacity(2 + topic.as_str().len() + 4 + body);

    buf.put_u16(topic_len);
    buf.put_slice(topic.as_str().as_bytes());
    buf.put_u32(count);

    for message in messages {
        let key_len = u16::try_from(message.key.len())
            .map_err(|_| format!("key '{}' too long for frame", message.key))?;
        let value_len = u32::try_from(message.value.len())
            .map_err(|_| format!("value for '{}' too long for frame", message.key))?;

        buf.put_u16(key_len);
        buf.put_slice(message.key.as_bytes());
        buf.put_i64(message.timestamp.timestamp_millis());
        buf.put_u32(value_len);
        buf.put_slice(&message.value);
    }

    Ok(buf.freeze())
}

/// One record as received by a relay
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayRecord {
    pub key: String,
    pub timestamp_ms: i64,
    pub value: Bytes,
}

/// One batch as received by a relay
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayBatch {
    pub topic: String,
    pub records: Vec<RelayRecord>,
}

/// Read one batch frame from a relay connection
pub async fn read_batch<R: AsyncRead + Unpin>(reader: &mut R) -> std::io::Result<RelayBatch> {
    let topic_len = reader.read_u16().await? as usize;
    let topic = read_string(reader, topic_len).await?;
    let count = reader.read_u32().await? as usize;

    let mut records = Vec::with_capacity(count.min(1024));
    for _ in 0..count {
        let key_len = reader.read_u16().await? as usize;
        let key = read_string(reader, key_len).await?;
        let timestamp_ms = reader.read_i64().await?;
        let value_len = reader.read_u32().await? as usize;
        let mut value = vec![0u8; value_len];
        reader.read_exact(&mut value).await?;
        records.push(RelayRecord {
            key,
            timestamp_ms,
            value: Bytes::from(value),
        });
    }

    Ok(RelayBatch { topic, records })
}

/// Write the relay's answer for one batch
pub async fn write_ack<W: AsyncWrite + Unpin>(
    writer: &mut W,
    result: Result<(), &str>,
) -> std::io::Result<()> {
    match result {
        Ok(()) => writer.write_u8(STATUS_OK).await?,
        Err(reason) => {
            let bytes = reason.as_bytes();
            let len = bytes.len().min(u16::MAX as usize);
            writer.write_u8(STATUS_REJECTED).await?;
            writer.write_u16(len as u16).await?;
            writer.write_all(&bytes[..len]).await?;
        }
    }
    writer.flush().await
}

async fn read_string<R: AsyncRead + Unpin>(reader: &mut R, len: usize) -> std::io::Result<String> {
    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf).await?;
    String::from_utf8(buf).map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}
