//! MQTT ingestion adapter
//!
//! One background task owns the broker connection and is the only writer
//! path into the telemetry store. The per-message pipeline is strictly
//! absorb-and-continue: decode failures are logged and dropped, never raised.
//! Connection health is published through a watch channel and reconnects run
//! through the configured backoff policy.

use crate::backoff::Backoff;
use crate::decode::{decode_reading, DecodeError};
use chrono::Utc;
use gridwatch_core::{BrokerConfig, ConnectionState, RetryConfig};
use gridwatch_store::TelemetryStore;
use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, QoS};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, warn};

/// Errors terminating the adapter task.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Broker connection failed
    #[error("mqtt connection error: {0}")]
    Connection(#[from] rumqttc::ConnectionError),

    /// Client request could not be queued
    #[error("mqtt client error: {0}")]
    Client(#[from] rumqttc::ClientError),

    /// Connect attempt exceeded the configured window
    #[error("connect attempt timed out after {0}s")]
    ConnectTimeout(u64),

    /// Finite retry budget ran out
    #[error("retry budget exhausted after {attempts} attempts: {reason}")]
    RetriesExhausted {
        /// Consecutive failed attempts
        attempts: u32,
        /// Last connection error observed
        reason: String,
    },
}

/// Bridges the telemetry topic to the store.
///
/// Constructed by the composition root with a shared store reference; `run`
/// consumes the adapter and drives the connection until shutdown or budget
/// exhaustion.
pub struct IngestionAdapter {
    broker: BrokerConfig,
    retry: RetryConfig,
    store: Arc<TelemetryStore>,
    state_tx: watch::Sender<ConnectionState>,
}

impl IngestionAdapter {
    /// Create an adapter over the given store. Initial connection state is
    /// [`ConnectionState::Disconnected`].
    pub fn new(broker: BrokerConfig, retry: RetryConfig, store: Arc<TelemetryStore>) -> Self {
        let (state_tx, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            broker,
            retry,
            store,
            state_tx,
        }
    }

    /// Subscribe to connection state changes. Receivers stay valid for the
    /// adapter's lifetime; take one before spawning `run`.
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.state_tx.subscribe()
    }

    /// Drive the broker connection until `shutdown` fires or a finite retry
    /// budget is exhausted. Dropping the shutdown sender counts as a
    /// shutdown signal.
    ///
    /// Messages are handled sequentially as the event loop yields them; this
    /// task is the store's only writer.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) -> Result<(), IngestError> {
        let client_id = format!("{}-{}", self.broker.client_id_prefix, std::process::id());
        let mut options = MqttOptions::new(client_id, &self.broker.host, self.broker.port);
        options.set_keep_alive(Duration::from_secs(self.broker.keep_alive_secs));

        let (client, mut eventloop) = AsyncClient::new(options, 64);
        let mut backoff = Backoff::new(&self.retry);

        info!(
            host = %self.broker.host,
            port = self.broker.port,
            topic = %self.broker.topic,
            "starting ingestion adapter"
        );
        self.set_state(ConnectionState::Connecting);

        loop {
            if *shutdown.borrow() {
                break;
            }

            let polled = tokio::select! {
                _ = shutdown.changed() => break,
                polled = self.poll_next(&mut eventloop) => polled,
            };

            match polled {
                Ok(event) => {
                    if matches!(event, Event::Incoming(Packet::ConnAck(_))) {
                        backoff.reset();
                    }
                    if let Err(err) = self.handle_event(&client, event).await {
                        let reason = err.to_string();
                        error!(reason = %reason, "adapter cannot continue");
                        self.set_state(ConnectionState::Failed { reason });
                        return Err(err);
                    }
                }
                Err(err) => {
                    warn!(error = %err, "broker connection lost");
                    self.set_state(ConnectionState::Disconnected);

                    match backoff.next_delay() {
                        Some(delay) => {
                            debug!(
                                delay_ms = delay.as_millis() as u64,
                                attempt = backoff.attempts(),
                                "retrying connection"
                            );
                            tokio::select! {
                                _ = shutdown.changed() => break,
                                _ = sleep(delay) => {}
                            }
                            self.set_state(ConnectionState::Connecting);
                        }
                        None => {
                            let attempts = backoff.attempts();
                            let reason = err.to_string();
                            error!(attempts, reason = %reason, "retry budget exhausted, giving up");
                            self.set_state(ConnectionState::Failed {
                                reason: reason.clone(),
                            });
                            return Err(IngestError::RetriesExhausted { attempts, reason });
                        }
                    }
                }
            }
        }

        info!("ingestion adapter shutting down");
        self.set_state(ConnectionState::Disconnected);
        Ok(())
    }

    /// Decode one raw payload and apply it to the store.
    ///
    /// This is the whole per-message pipeline; failures are absorbed here
    /// and never reach the caller. Public so tests and alternative sources
    /// can feed payloads without a broker.
    pub fn ingest_payload(&self, payload: &[u8]) {
        match decode_reading(payload, Utc::now()) {
            Ok(reading) => {
                debug!(
                    facility_id = %reading.facility_id,
                    power_mw = reading.power_mw,
                    emissions_tco2e = reading.emissions_tco2e,
                    "reading applied"
                );
                self.store.apply(reading);
            }
            // best-effort ingestion: an unidentified message is not an error
            Err(DecodeError::MissingFacilityCode) => {
                debug!("message without facility_code dropped");
            }
            Err(err) => {
                warn!(error = %err, "undecodable payload dropped");
            }
        }
    }

    async fn handle_event(&self, client: &AsyncClient, event: Event) -> Result<(), IngestError> {
        match event {
            Event::Incoming(Packet::ConnAck(_)) => {
                info!(host = %self.broker.host, port = self.broker.port, "connected to broker");
                self.set_state(ConnectionState::Connected);
                client
                    .subscribe(&self.broker.topic, QoS::AtLeastOnce)
                    .await?;
            }
            Event::Incoming(Packet::SubAck(_)) => {
                info!(topic = %self.broker.topic, "subscription acknowledged");
                self.set_state(ConnectionState::Subscribed);
            }
            Event::Incoming(Packet::Publish(publish)) => {
                self.ingest_payload(&publish.payload);
            }
            _ => {}
        }
        Ok(())
    }

    /// Poll the event loop, bounding connect attempts by the configured
    /// window while no session is established.
    async fn poll_next(&self, eventloop: &mut EventLoop) -> Result<Event, IngestError> {
        if self.state_tx.borrow().is_live() {
            Ok(eventloop.poll().await?)
        } else {
            let window = Duration::from_secs(self.broker.connect_timeout_secs);
            match timeout(window, eventloop.poll()).await {
                Ok(polled) => Ok(polled?),
                Err(_) => Err(IngestError::ConnectTimeout(
                    self.broker.connect_timeout_secs,
                )),
            }
        }
    }

    fn set_state(&self, state: ConnectionState) {
        self.state_tx.send_replace(state);
    }
}
