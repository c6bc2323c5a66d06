use anyhow::{bail, Context, Result};
use rumqttc::{AsyncClient, Event, EventLoop, Packet};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, ReadHalf, WriteHalf};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration};
use tokio_serial::SerialStream;
use tracing::{error, info, warn};

use crate::codec::join_topic;
use crate::config::SerlinkConfig;
use crate::dispatch::{DispatchOutcome, Dispatcher};
use crate::mqtt::{MqttLink, SensorPublisher};
use crate::serial::SerialLink;

/// Bridge lifecycle. `Closed` is terminal; construct a new bridge to restart.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BridgeState {
    Created,
    Running,
    Closed,
}

/// Owns the serial link, the MQTT session and the dispatcher, and runs the
/// two translation workers.
///
/// The serial port is read by exactly one worker and written by exactly one
/// other; the write half sits behind a mutex so this stays true if another
/// writer is ever added. The dispatcher mutex makes each worker finish one
/// dispatch before the other can touch the rosters.
pub struct Bridge {
    state: BridgeState,
    dispatcher: Arc<Mutex<Dispatcher>>,
    serial: Option<SerialLink>,
    serial_path: String,
    mqtt: Option<MqttLink>,
    client: AsyncClient,
    workers: Vec<JoinHandle<()>>,
}

impl Bridge {
    /// Open the serial port, build the MQTT session and register the
    /// command-topic subscription. No I/O workers run until [`start`].
    ///
    /// [`start`]: Bridge::start
    pub async fn new(config: &SerlinkConfig) -> Result<Self> {
        let serial = SerialLink::open(&config.serial)?;

        let mqtt = MqttLink::connect(&config.mqtt);
        let command_topic = join_topic(&config.topics.root, &config.topics.command_subtopic);
        mqtt.subscribe(&command_topic).await?;

        let dispatcher = Dispatcher::new(
            config.topics.root.clone(),
            config.topics.command_separator,
        );

        Ok(Self {
            state: BridgeState::Created,
            dispatcher: Arc::new(Mutex::new(dispatcher)),
            serial_path: serial.path().to_string(),
            serial: Some(serial),
            client: mqtt.client.clone(),
            mqtt: Some(mqtt),
            workers: Vec::new(),
        })
    }

    pub fn state(&self) -> BridgeState {
        self.state
    }

    /// Launch the serial-read and MQTT-receive workers.
    pub fn start(&mut self) -> Result<()> {
        if self.state != BridgeState::Created {
            bail!("bridge cannot start from {:?} state", self.state);
        }

        let serial = self.serial.take().context("serial link already taken")?;
        let mqtt = self.mqtt.take().context("mqtt session already taken")?;

        let (reader, writer) = serial.split();
        let writer = Arc::new(Mutex::new(writer));
        let publisher = SensorPublisher::new(mqtt.client.clone());

        self.workers.push(tokio::spawn(serial_read_loop(
            reader,
            Arc::clone(&self.dispatcher),
            publisher,
        )));
        self.workers.push(tokio::spawn(mqtt_receive_loop(
            mqtt.event_loop,
            Arc::clone(&self.dispatcher),
            writer,
        )));

        self.state = BridgeState::Running;
        info!(path = %self.serial_path, "bridge started");
        Ok(())
    }

    /// Stop the workers, release the serial port and disconnect from the
    /// broker. Closing an already-closed bridge only logs a warning.
    pub async fn close(&mut self) {
        if self.state == BridgeState::Closed {
            warn!(path = %self.serial_path, "repeat close of an already-closed bridge");
            return;
        }

        for worker in self.workers.drain(..) {
            worker.abort();
        }

        // Started workers release the halves when they abort; an unstarted
        // bridge still holds the link and session directly.
        self.serial.take();
        self.mqtt.take();

        if let Err(e) = self.client.disconnect().await {
            warn!(error = %e, "mqtt disconnect failed");
        }

        self.state = BridgeState::Closed;
        info!(path = %self.serial_path, "bridge closed");
    }
}

/// Serial-read worker: one line per iteration, dispatched and published.
async fn serial_read_loop(
    reader: ReadHalf<SerialStream>,
    dispatcher: Arc<Mutex<Dispatcher>>,
    publisher: SensorPublisher,
) {
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => sleep(Duration::from_millis(50)).await,
            Ok(_) => {
                let Ok(line) = std::str::from_utf8(&buf) else {
                    warn!(bytes = buf.len(), "discarding non-UTF-8 serial data");
                    continue;
                };

                let outcome = dispatcher.lock().await.dispatch_serial_frame(line);
                if let DispatchOutcome::Publish { topic, payload } = outcome {
                    if let Err(e) = publisher.publish(&topic, payload).await {
                        error!(topic = %topic, error = %e, "sensor publish failed");
                    }
                }
            }
            Err(e) => {
                error!(error = %e, "serial read failed");
                sleep(Duration::from_millis(200)).await;
            }
        }
    }
}

/// MQTT-receive worker: driven by the client's network loop; inbound
/// publishes on the command topic become serial writes.
async fn mqtt_receive_loop(
    mut event_loop: EventLoop,
    dispatcher: Arc<Mutex<Dispatcher>>,
    writer: Arc<Mutex<WriteHalf<SerialStream>>>,
) {
    loop {
        match event_loop.poll().await {
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                let Ok(payload) = std::str::from_utf8(&publish.payload) else {
                    warn!(topic = %publish.topic, "discarding non-UTF-8 command payload");
                    continue;
                };

                let outcome = dispatcher.lock().await.dispatch_mqtt_command(payload);
                if let DispatchOutcome::Write { frame } = outcome {
                    let mut writer = writer.lock().await;
                    match writer.write_all(frame.as_bytes()).await {
                        Ok(()) => info!(frame = %frame, "command frame written"),
                        Err(e) => error!(error = %e, "serial write failed"),
                    }
                }
            }
            Ok(Event::Incoming(Packet::ConnAck(_))) => {
                info!("connected to mqtt broker");
            }
            Ok(_) => {}
            Err(e) => {
                // The next poll re-establishes the session
                error!(error = %e, "mqtt event loop error");
                sleep(Duration::from_secs(1)).await;
            }
        }
    }
}
