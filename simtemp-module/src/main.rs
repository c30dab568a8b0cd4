//! Binary entry point: MQTT wiring around the simulation engine.
//!
//! The engine itself lives in the library; this file only owns the broker
//! connection, inbound topic dispatch, and process shutdown.

use anyhow::{Context, Result};
use rumqttc::{AsyncClient, Event, Incoming, MqttOptions, QoS};
use simtemp_module::channel::{topic, MessageChannel, MqttChannel};
use simtemp_module::commands::{CommandProcessor, ResetFlag};
use simtemp_module::config::ConfigStore;
use simtemp_module::settings::Settings;
use simtemp_module::telemetry::EmissionLoop;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    info!("simulated temperature sensor module starting");

    let settings = Settings::load();
    let config = ConfigStore::new(settings.simulator.clone());
    let reset = ResetFlag::new();
    let commands = CommandProcessor::new(reset.clone());

    let mut opts = MqttOptions::new(
        &settings.mqtt.client_id,
        &settings.mqtt.host,
        settings.mqtt.port,
    );
    opts.set_keep_alive(Duration::from_secs(settings.mqtt.keep_alive_secs));
    let (client, mut eventloop) = AsyncClient::new(opts, 10);

    for t in [topic::CONTROL, topic::CONFIG, topic::RESET] {
        client
            .subscribe(t, QoS::AtLeastOnce)
            .await
            .with_context(|| format!("failed to subscribe to '{t}'"))?;
    }
    info!(
        broker = %settings.mqtt.host,
        port = settings.mqtt.port,
        "subscribed to control topics"
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let emission = tokio::spawn(
        EmissionLoop::new(
            MqttChannel::new(client.clone()),
            config.clone(),
            reset.clone(),
            shutdown_rx,
        )
        .run(),
    );

    let outbound = MqttChannel::new(client.clone());
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                info!("shutdown signal received");
                break;
            }
            event = eventloop.poll() => match event {
                Ok(Event::Incoming(Incoming::Publish(publish))) => {
                    match publish.topic.as_str() {
                        topic::CONTROL => commands.handle_control_batch(&publish.payload),
                        topic::CONFIG => {
                            config.apply_json(&publish.payload);
                        }
                        topic::RESET => {
                            let ack = commands.handle_reset_invocation();
                            match serde_json::to_vec(&ack) {
                                Ok(payload) => {
                                    if let Err(e) = outbound.publish(topic::RESET_ACK, payload).await {
                                        warn!(error = %e, "failed to publish reset ack");
                                    }
                                }
                                Err(e) => warn!(error = %e, "failed to encode reset ack"),
                            }
                        }
                        other => warn!(topic = other, "unexpected publish, ignoring"),
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    error!(error = ?e, "mqtt connection error, retrying");
                    tokio::time::sleep(Duration::from_secs(2)).await;
                }
            }
        }
    }

    // interrupt the emission loop's sleep and wait for it to exit
    let _ = shutdown_tx.send(true);
    if let Err(e) = emission.await {
        error!(error = ?e, "emission loop task failed to join");
    }
    info!("module stopped");
    Ok(())
}
