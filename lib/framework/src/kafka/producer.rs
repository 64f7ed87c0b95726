use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use chrono::Utc;
use rdkafka::ClientConfig;
use rdkafka::producer::FutureProducer;
use rdkafka::producer::FutureRecord;
use rdkafka::producer::Producer as _;
use serde::Deserialize;
use tracing::debug;

use crate::exception;
use crate::exception::Exception;

/// librdkafka only keeps ordering for idempotent producers up to this many in-flight requests.
const IDEMPOTENT_MAX_IN_FLIGHT: u32 = 5;

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AckMode {
    None,
    Leader,
    #[default]
    All,
}

impl AckMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AckMode::None => "0",
            AckMode::Leader => "1",
            AckMode::All => "all",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProducerConfig {
    pub bootstrap_servers: String,
    pub client_id: String,
    pub idempotence: bool,
    pub ack_mode: AckMode,
    pub max_in_flight: u32,
    pub message_timeout: Duration,
}

impl Default for ProducerConfig {
    fn default() -> Self {
        ProducerConfig {
            bootstrap_servers: "localhost:9092".to_owned(),
            client_id: "myApp".to_owned(),
            idempotence: true,
            ack_mode: AckMode::All,
            max_in_flight: IDEMPOTENT_MAX_IN_FLIGHT,
            message_timeout: Duration::from_secs(5),
        }
    }
}

impl ProducerConfig {
    pub fn validate(&self) -> Result<(), Exception> {
        if self.max_in_flight == 0 {
            return Err(exception!(
                code = "INVALID_CONFIG",
                message = "max_in_flight must be greater than 0"
            ));
        }
        if self.idempotence && self.ack_mode != AckMode::All {
            return Err(exception!(
                code = "INVALID_CONFIG",
                message = format!("idempotence requires ack_mode=all, ack_mode={:?}", self.ack_mode)
            ));
        }
        if self.idempotence && self.max_in_flight > IDEMPOTENT_MAX_IN_FLIGHT {
            return Err(exception!(
                code = "INVALID_CONFIG",
                message = format!(
                    "idempotence requires max_in_flight <= {IDEMPOTENT_MAX_IN_FLIGHT}, max_in_flight={}",
                    self.max_in_flight
                )
            ));
        }
        Ok(())
    }

    pub fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::new();
        config
            .set("bootstrap.servers", &self.bootstrap_servers)
            .set("client.id", &self.client_id)
            .set("enable.idempotence", self.idempotence.to_string())
            .set("acks", self.ack_mode.as_str())
            .set("max.in.flight.requests.per.connection", self.max_in_flight.to_string())
            .set("message.timeout.ms", self.message_timeout.as_millis().to_string());
        config
    }
}

/// Where the broker stored a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
}

pub type PendingDelivery = Pin<Box<dyn Future<Output = Result<Delivery, Exception>> + Send>>;

/// Asynchronous send side of a message broker client.
///
/// `send` must not block: it hands the record to the client and returns a future that
/// resolves once with the delivery report. `flush` blocks until queued records are
/// delivered or `timeout` elapses.
pub trait MessageSender: Send + Sync + 'static {
    fn send(&self, topic: &str, key: Option<&str>, value: &str) -> PendingDelivery;

    fn flush(&self, timeout: Duration) -> Result<(), Exception>;
}

pub struct Producer {
    producer: FutureProducer,
}

impl Producer {
    pub fn new(config: &ProducerConfig) -> Result<Self, Exception> {
        config.validate()?;
        let producer: FutureProducer = config.client_config().create().map_err(|err| {
            exception!(
                message = format!("failed to create producer, bootstrap_servers={}", config.bootstrap_servers),
                source = err
            )
        })?;
        Ok(Self { producer })
    }
}

impl MessageSender for Producer {
    fn send(&self, topic: &str, key: Option<&str>, value: &str) -> PendingDelivery {
        let mut record = FutureRecord::<str, str>::to(topic)
            .timestamp(Utc::now().timestamp_millis())
            .payload(value);
        if let Some(key) = key {
            record = record.key(key);
        }

        debug!(topic, key, value, "send");
        match self.producer.send_result(record) {
            Ok(delivery) => {
                let topic = topic.to_owned();
                Box::pin(async move {
                    match delivery.await {
                        Ok(Ok((partition, offset))) => Ok(Delivery {
                            topic,
                            partition,
                            offset,
                        }),
                        Ok(Err((err, _))) => Err(err.into()),
                        Err(_) => Err(exception!(
                            code = "DELIVERY_CANCELED",
                            message = format!("producer dropped before delivery report, topic={topic}")
                        )),
                    }
                })
            }
            Err((err, _)) => {
                let error = Exception::from(err);
                Box::pin(async move { Err(error) })
            }
        }
    }

    fn flush(&self, timeout: Duration) -> Result<(), Exception> {
        self.producer.flush(timeout)?;
        Ok(())
    }
}
