// MQTT subscription loop feeding the live cache
use crate::application::live_cache::{ConnectionState, LiveIngestCache};
use crate::infrastructure::config::MqttSettings;
use rumqttc::{AsyncClient, Event, MqttOptions, Packet, QoS};
use std::sync::Arc;
use std::time::Duration;

/// Owns the background subscription to the live weather topic. The run loop
/// is the sole writer to the cache; on disconnect it retries with
/// exponential backoff up to the configured attempt limit, after which the
/// cache is marked faulted and the rest of the process keeps serving.
pub struct MqttIngest {
    settings: MqttSettings,
    cache: Arc<LiveIngestCache>,
}

impl MqttIngest {
    pub fn new(settings: MqttSettings, cache: Arc<LiveIngestCache>) -> Self {
        Self { settings, cache }
    }

    pub async fn run(self) {
        let initial = Duration::from_millis(self.settings.initial_backoff_ms.max(1));
        let max = Duration::from_secs(self.settings.max_backoff_secs.max(1));
        let mut delay = initial;
        let mut attempts: u32 = 0;

        loop {
            self.cache.set_state(ConnectionState::Connecting);
            let (was_subscribed, error) = self.run_session().await;

            if was_subscribed {
                // A healthy session resets the backoff schedule.
                attempts = 0;
                delay = initial;
            }

            attempts += 1;
            if attempts > self.settings.max_retries {
                self.cache.set_state(ConnectionState::Faulted);
                tracing::error!(
                    attempts,
                    error = %error,
                    "live feed subscription failed permanently; cache is frozen"
                );
                return;
            }

            tracing::warn!(
                attempt = attempts,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "live feed connection lost, retrying"
            );
            tokio::time::sleep(delay).await;
            delay = (delay * 2).min(max);
        }
    }

    /// One connection attempt: subscribe on ConnAck, then pump publishes
    /// into the cache until the event loop errors out. Returns whether the
    /// subscription was ever acknowledged this session.
    async fn run_session(&self) -> (bool, anyhow::Error) {
        let mut options = MqttOptions::new(
            self.settings.client_id.clone(),
            self.settings.host.clone(),
            self.settings.port,
        );
        options.set_credentials(self.settings.username.clone(), self.settings.password.clone());
        options.set_keep_alive(Duration::from_secs(30));

        let (client, mut event_loop) = AsyncClient::new(options, 64);
        let mut subscribed = false;

        loop {
            match event_loop.poll().await {
                Ok(Event::Incoming(Packet::ConnAck(_))) => {
                    if let Err(err) = client
                        .subscribe(self.settings.topic.clone(), QoS::AtLeastOnce)
                        .await
                    {
                        return (subscribed, err.into());
                    }
                }
                Ok(Event::Incoming(Packet::SubAck(_))) => {
                    subscribed = true;
                    self.cache.set_state(ConnectionState::Subscribed);
                    tracing::info!(topic = %self.settings.topic, "subscribed to live feed");
                }
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    if let Err(err) = self.cache.apply_payload(&publish.payload) {
                        // Drop the message; the previous reading survives.
                        tracing::warn!(
                            topic = %publish.topic,
                            error = %err,
                            "dropping malformed live payload"
                        );
                    }
                }
                Ok(_) => {}
                Err(err) => return (subscribed, err.into()),
            }
        }
    }
}
