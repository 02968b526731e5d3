//! `--stream` output: one NDJSON line per phase of a run.
//!
//! Every line carries `event`, a `seq` counter starting at 0 and a `ts`
//! stamp, flattened next to the event's own fields.

use std::io::Write;

use alphastoch_core::{EnvelopeError, EnvelopeMeta, UtcDateTime};
use serde::Serialize;
use serde_json::Value;

use crate::error::CliError;

#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum StreamEvent<'a> {
    Started {
        request_id: String,
        schema_version: &'static str,
    },
    Warning {
        message: &'a str,
    },
    /// Market snapshot a run started from.
    Snapshot {
        iteration: u64,
        cache_hit: bool,
        snapshot: &'a Value,
    },
    /// Ensemble generated; carries the parameters and the plotted sample.
    Generated {
        iteration: u64,
        parameters: &'a Value,
        sample_paths: &'a Value,
    },
    Summarized {
        iteration: u64,
        summary: &'a Value,
    },
    /// Payload of a command without simulation phases.
    Data {
        data: &'a Value,
    },
    Failed {
        error: &'a EnvelopeError,
    },
    Finished {
        status: &'static str,
        latency_ms: u64,
        cache_hit: bool,
    },
}

impl StreamEvent<'_> {
    pub fn started(meta: &EnvelopeMeta) -> Self {
        StreamEvent::Started {
            request_id: meta.request_id.to_string(),
            schema_version: meta.schema_version,
        }
    }
}

#[derive(Serialize)]
struct Line<'a> {
    seq: u64,
    ts: UtcDateTime,
    #[serde(flatten)]
    event: &'a StreamEvent<'a>,
}

pub struct NdjsonStreamWriter<W: Write> {
    writer: W,
    seq: u64,
}

impl<W: Write> NdjsonStreamWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, seq: 0 }
    }

    pub fn emit(&mut self, event: &StreamEvent<'_>) -> Result<(), CliError> {
        let line = Line {
            seq: self.seq,
            ts: UtcDateTime::now(),
            event,
        };
        serde_json::to_writer(&mut self.writer, &line)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        self.seq += 1;
        Ok(())
    }

    pub fn emitted(&self) -> u64 {
        self.seq
    }
}
