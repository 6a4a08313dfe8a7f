//! Reads log lines and logs each one through the hooked logger.
//!
//! A line holding a JSON object is treated as a structured entry: `level`
//! and `msg` (or `message`) are lifted out, every other key becomes a field.
//! Any other line is shipped verbatim at the default level.

use log_indexer_hook::{Fields, Level, Logger};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::AppError;

/// A parsed input line.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedLine {
    pub level: Level,
    pub message: String,
    pub fields: Fields,
}

/// Parse one input line, using `default_level` when it names none.
pub fn parse_line(line: &str, default_level: Level) -> ParsedLine {
    let Ok(Value::Object(object)) = serde_json::from_str::<Value>(line) else {
        return ParsedLine {
            level: default_level,
            message: line.to_string(),
            fields: Fields::new(),
        };
    };

    let mut level = default_level;
    let mut message = String::new();
    let mut fields = Fields::new();

    for (key, value) in object {
        if key == "level" {
            if let Some(parsed) = value.as_str().and_then(|name| name.parse::<Level>().ok()) {
                level = parsed;
                continue;
            }
        } else if (key == "msg" || key == "message") && message.is_empty() {
            if let Some(text) = value.as_str() {
                message = text.to_string();
                continue;
            }
        }
        fields.insert(key, value);
    }

    ParsedLine {
        level,
        message,
        fields,
    }
}

/// Ship every line from `reader` until end of input or until `shutdown` is cancelled.
///
/// Returns the number of lines read. Blank lines are skipped.
pub async fn ship<R>(
    reader: R,
    logger: &Logger,
    default_level: Level,
    shutdown: &CancellationToken,
) -> Result<u64, AppError>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut shipped = 0;

    loop {
        let line = tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            line = lines.next_line() => line?,
        };
        let Some(line) = line else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let parsed = parse_line(&line, default_level);
        logger
            .with_fields(parsed.fields)
            .log(parsed.level, parsed.message)
            .await;
        shipped += 1;
    }

    debug!(shipped, "Input finished");
    Ok(shipped)
}
