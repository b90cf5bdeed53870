use crate::api::types::LogLine;
use crate::error::{Result, ScoutError};
use serde::Deserialize;
use serde_json::Value;

/// Literal prefix carried by every payload line of a streamed record
pub const RECORD_PREFIX: &str = "data: ";

/// Blank-line separator between streamed records
const RECORD_SEPARATOR: &[u8] = b"\n\n";

/// One decoded event from the streamed response body
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// A log line to forward to the caller's sink immediately
    Log(LogLine),

    /// Terminal: the call finished with this result payload
    Finished(Option<Value>),

    /// Terminal: the server reported an error
    ServerError(String),
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum Envelope {
    Log { data: LogData },
    System { data: SystemData },
}

#[derive(Deserialize)]
struct LogData {
    message: LogLine,
}

#[derive(Deserialize)]
struct SystemData {
    status: String,

    #[serde(default)]
    error: Option<String>,

    #[serde(default)]
    result: Option<Value>,
}

/// Incremental decoder for the chunked streaming protocol
///
/// Feed it byte chunks as they arrive; it emits every record completed so
/// far and retains any trailing partial record for the next chunk. Chunk
/// boundaries are arbitrary (a record may be split anywhere, including
/// mid-byte-sequence) and must never change the decoded output.
#[derive(Debug, Default)]
pub struct StreamDecoder {
    buffer: Vec<u8>,
}

impl StreamDecoder {
    /// Create an empty decoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume one chunk, returning every event completed by it
    ///
    /// A record that fails to parse as JSON is a fatal parse error, not a
    /// skippable one.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<Vec<StreamEvent>> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();

        while let Some(pos) = find_separator(&self.buffer) {
            let record: Vec<u8> = self.buffer.drain(..pos + RECORD_SEPARATOR.len()).collect();
            decode_record(&record[..pos], &mut events)?;
        }

        Ok(events)
    }

    /// Bytes of a trailing partial record still held
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}

fn find_separator(buffer: &[u8]) -> Option<usize> {
    buffer
        .windows(RECORD_SEPARATOR.len())
        .position(|window| window == RECORD_SEPARATOR)
}

fn decode_record(record: &[u8], events: &mut Vec<StreamEvent>) -> Result<()> {
    let text = std::str::from_utf8(record)
        .map_err(|e| ScoutError::ResponseParse(format!("record is not valid UTF-8: {}", e)))?;

    for line in text.lines() {
        let Some(payload) = line.strip_prefix(RECORD_PREFIX) else {
            continue;
        };

        let envelope: Envelope = serde_json::from_str(payload)
            .map_err(|e| ScoutError::ResponseParse(format!("malformed record: {}", e)))?;

        match envelope {
            Envelope::Log { data } => events.push(StreamEvent::Log(data.message)),
            Envelope::System { data } => match data.status.as_str() {
                "error" => events.push(StreamEvent::ServerError(
                    data.error.unwrap_or_else(|| "unknown server error".to_string()),
                )),
                "finished" => events.push(StreamEvent::Finished(data.result)),
                other => log::debug!("ignoring system record with status {}", other),
            },
        }
    }

    Ok(())
}
