use aggregator::{Batch, Config, Message, run, run_with_interval};
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};

/// One line of output: a batch plus when it was received from the aggregator
#[derive(Debug, Serialize)]
struct BatchRecord {
    batch: u64,
    emitted_at: String,
    items: Batch<Message>,
}

/// Entry point for the aggregator host
///
/// Reads one item per stdin line, batches them according to the config, and
/// writes each batch to stdout as a JSON line. Exits once stdin is exhausted
/// and the final partial batch has been written.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout carries only batches
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config/default.toml".to_string());
    let config = Config::load_or_default(&path)?;
    info!("Aggregator starting with config: {:?}", config);

    let (input_tx, input_rx) = mpsc::channel(config.channels.input_buffer);
    let (output_tx, mut output_rx) = mpsc::channel(config.channels.output_buffer);

    let capacity = config.aggregator.capacity;
    let handle = match config.aggregator.tick_interval() {
        Some(period) => run_with_interval(input_rx, output_tx, capacity, period)?,
        None => run(input_rx, output_tx, capacity)?,
    };

    // Producer: stdin lines become messages. EOF drops the sender and ends the stream.
    let producer = tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            if input_tx.send(Message::from(line)).await.is_err() {
                warn!("Aggregator stopped accepting input");
                break;
            }
        }
        Ok::<_, std::io::Error>(())
    });

    let mut stdout = tokio::io::stdout();
    let mut seq = 0u64;
    while let Some(items) = output_rx.recv().await {
        seq += 1;
        let record = BatchRecord {
            batch: seq,
            emitted_at: chrono::Utc::now().to_rfc3339(),
            items,
        };
        let mut line = serde_json::to_vec(&record)?;
        line.push(b'\n');
        stdout.write_all(&line).await?;
    }
    stdout.flush().await?;

    producer.await??;
    let stats = handle.join().await?;
    info!("Aggregator finished: {}", serde_json::to_string(&stats)?);

    Ok(())
}
