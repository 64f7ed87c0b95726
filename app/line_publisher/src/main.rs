use std::path::Path;
use std::time::Duration;

use framework::conf::load_conf;
use framework::exception::Exception;
use framework::kafka::producer::AckMode;
use framework::kafka::producer::Producer;
use framework::kafka::producer::ProducerConfig;
use framework::log;
use framework::shutdown::Shutdown;
use line_publisher::job;
use line_publisher::publisher::LinePublisher;
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
struct AppConfig {
    bootstrap_address: String,
    topic: String,
    file_path: String,
    client_id: String,
    max_in_flight: u32,
    idempotence: bool,
    ack_mode: AckMode,
    message_timeout_ms: u64,
    close_timeout_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            bootstrap_address: "localhost:9092".to_owned(),
            topic: "myTopic".to_owned(),
            file_path: "input.txt".to_owned(),
            client_id: "myApp".to_owned(),
            max_in_flight: 5,
            idempotence: true,
            ack_mode: AckMode::All,
            message_timeout_ms: 5000,
            close_timeout_ms: 30000,
        }
    }
}

impl AppConfig {
    fn producer_config(&self) -> ProducerConfig {
        ProducerConfig {
            bootstrap_servers: self.bootstrap_address.clone(),
            client_id: self.client_id.clone(),
            idempotence: self.idempotence,
            ack_mode: self.ack_mode,
            max_in_flight: self.max_in_flight,
            message_timeout: Duration::from_millis(self.message_timeout_ms),
        }
    }

    fn close_timeout(&self) -> Duration {
        Duration::from_millis(self.close_timeout_ms)
    }
}

#[tokio::main]
async fn main() -> Result<(), Exception> {
    log::init();

    let config: AppConfig = load_conf()?;

    let shutdown = Shutdown::new();
    let mut signal = shutdown.subscribe();
    shutdown.listen();

    let producer = Producer::new(&config.producer_config())?;
    let publisher = LinePublisher::new(producer, config.topic.clone());

    let summary = job::publish_file(&publisher, Path::new(&config.file_path), &mut signal, config.close_timeout()).await;
    info!(
        path = config.file_path.as_str(),
        submitted = summary.submitted,
        delivered = summary.delivered,
        failed = summary.failed,
        "done"
    );

    Ok(())
}
