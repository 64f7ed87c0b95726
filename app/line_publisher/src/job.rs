use std::path::Path;
use std::time::Duration;

use framework::exception;
use framework::exception::Exception;
use framework::kafka::producer::MessageSender;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::TryRecvError;
use tracing::Instrument;
use tracing::error;
use tracing::info;
use tracing::info_span;
use tracing::warn;

use crate::message::is_blank;
use crate::publisher::LinePublisher;
use crate::publisher::PublishSummary;

/// Publishes every non blank line of `path`, then shuts the publisher down.
///
/// The publisher is closed exactly once whether or not the file could be read.
pub async fn publish_file<S>(
    publisher: &LinePublisher<S>,
    path: &Path,
    shutdown_signal: &mut broadcast::Receiver<()>,
    close_timeout: Duration,
) -> PublishSummary
where
    S: MessageSender,
{
    let span = info_span!("publish_file", topic = publisher.topic());
    async {
        match read_lines(path).await {
            Ok(lines) => {
                let published = publish_lines(publisher, &lines, shutdown_signal);
                info!(path = %path.display(), published, "finished publishing lines from file");
            }
            Err(err) => error!("failed to read input file, error={err}"),
        }
        publisher.shutdown(close_timeout).await
    }
    .instrument(span)
    .await
}

pub async fn read_lines(path: &Path) -> Result<Vec<String>, Exception> {
    let content = tokio::fs::read_to_string(path).await.map_err(|err| {
        exception!(
            code = "FILE_READ_ERROR",
            message = format!("failed to read file, path={}", path.display()),
            source = err
        )
    })?;
    Ok(content.lines().map(str::to_owned).collect())
}

fn publish_lines<S>(publisher: &LinePublisher<S>, lines: &[String], shutdown_signal: &mut broadcast::Receiver<()>) -> usize
where
    S: MessageSender,
{
    let mut published = 0;
    for line in lines.iter().filter(|line| !is_blank(line)) {
        if matches!(shutdown_signal.try_recv(), Ok(()) | Err(TryRecvError::Lagged(_))) {
            warn!(published, "shutdown signal received, stop publishing");
            break;
        }
        // completions log themselves, the handle is not needed here
        if let Err(err) = publisher.publish(line) {
            error!("failed to publish line, error={err}");
            break;
        }
        published += 1;
    }
    published
}
