pub mod stream_writer;

use std::io::Write;

use alphastoch_core::Envelope;
use serde_json::Value;

use self::stream_writer::{NdjsonStreamWriter, StreamEvent};
use crate::cli::OutputFormat;
use crate::error::CliError;

pub fn render<W: Write>(
    out: &mut W,
    envelope: &Envelope<Value>,
    format: OutputFormat,
    pretty: bool,
) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => {
            let payload = if pretty {
                serde_json::to_string_pretty(envelope)?
            } else {
                serde_json::to_string(envelope)?
            };
            writeln!(out, "{payload}")?;
        }
        OutputFormat::Ndjson => {
            let payload = serde_json::to_string(envelope)?;
            writeln!(out, "{payload}")?;
        }
        OutputFormat::Table => render_table(out, envelope)?,
    }

    Ok(())
}

/// Replay a finished command as phase events.
pub fn render_stream<W: Write>(out: W, envelope: &Envelope<Value>) -> Result<(), CliError> {
    let mut writer = NdjsonStreamWriter::new(out);
    let meta = &envelope.meta;

    writer.emit(&StreamEvent::started(meta))?;
    for message in &meta.warnings {
        writer.emit(&StreamEvent::Warning { message })?;
    }

    if let Some(data) = &envelope.data {
        match data.get("runs").and_then(Value::as_array) {
            Some(runs) => {
                for (index, run) in runs.iter().enumerate() {
                    let cache_hit = run["cache_hit"].as_bool().unwrap_or(false);
                    emit_report(&mut writer, index as u64 + 1, &run["report"], cache_hit)?;
                }
            }
            None if data.get("summary").is_some() => {
                emit_report(&mut writer, 1, data, meta.cache_hit)?;
            }
            None => writer.emit(&StreamEvent::Data { data })?,
        }
    }

    for error in &envelope.errors {
        writer.emit(&StreamEvent::Failed { error })?;
    }

    writer.emit(&StreamEvent::Finished {
        status: if envelope.is_success() { "ok" } else { "error" },
        latency_ms: meta.latency_ms,
        cache_hit: meta.cache_hit,
    })
}

fn emit_report<W: Write>(
    writer: &mut NdjsonStreamWriter<W>,
    iteration: u64,
    report: &Value,
    cache_hit: bool,
) -> Result<(), CliError> {
    if let Some(snapshot) = report.get("snapshot").filter(|snapshot| !snapshot.is_null()) {
        writer.emit(&StreamEvent::Snapshot {
            iteration,
            cache_hit,
            snapshot,
        })?;
    }
    writer.emit(&StreamEvent::Generated {
        iteration,
        parameters: &report["parameters"],
        sample_paths: &report["sample_paths"],
    })?;
    writer.emit(&StreamEvent::Summarized {
        iteration,
        summary: &report["summary"],
    })
}

fn render_table<W: Write>(out: &mut W, envelope: &Envelope<Value>) -> Result<(), CliError> {
    writeln!(out, "request_id  : {}", envelope.meta.request_id)?;
    writeln!(out, "schema      : {}", envelope.meta.schema_version)?;
    writeln!(out, "generated_at: {}", envelope.meta.generated_at)?;
    writeln!(out, "latency_ms  : {}", envelope.meta.latency_ms)?;
    writeln!(out, "cache_hit   : {}", envelope.meta.cache_hit)?;

    if !envelope.meta.warnings.is_empty() {
        writeln!(out, "warnings:")?;
        for warning in &envelope.meta.warnings {
            writeln!(out, "  - {warning}")?;
        }
    }

    if let Some(data) = &envelope.data {
        if let Some(runs) = data.get("runs").and_then(Value::as_array) {
            for run in runs {
                writeln!(
                    out,
                    "run {} (cache_hit {}):",
                    run["iteration"], run["cache_hit"]
                )?;
                render_summary(out, &run["report"])?;
            }
        } else if data.get("summary").is_some() {
            render_summary(out, data)?;
        } else {
            writeln!(out, "data:")?;
            for line in serde_json::to_string_pretty(data)?.lines() {
                writeln!(out, "  {line}")?;
            }
        }
    }

    if !envelope.errors.is_empty() {
        writeln!(out, "errors:")?;
        for error in &envelope.errors {
            writeln!(out, "  - {}: {}", error.code, error.message)?;
        }
    }

    Ok(())
}

fn render_summary<W: Write>(out: &mut W, report: &Value) -> Result<(), CliError> {
    let summary = &report["summary"];
    if let Some(snapshot) = report.get("snapshot").filter(|snapshot| !snapshot.is_null()) {
        writeln!(
            out,
            "symbol      : {} @ {} ({} change)",
            text(&snapshot["symbol"]),
            number(&snapshot["current_price"], 2),
            percent(&snapshot["recent_return_fraction"]),
        )?;
    }

    let parameters = &report["parameters"];
    writeln!(
        out,
        "model       : drift {} / volatility {} / {} days / {} paths",
        number(&parameters["drift"], 2),
        number(&parameters["volatility"], 2),
        parameters["horizon_days"],
        parameters["path_count"],
    )?;
    writeln!(out, "expected    : {}", percent(&summary["expected_return"]))?;
    writeln!(
        out,
        "var_95      : {} ({})",
        number(&summary["value_at_risk_95"], 2),
        percent(&summary["loss_at_risk_95"]),
    )?;
    writeln!(out, "cvar_95     : {}", number(&summary["conditional_value_at_risk_95"], 2))?;
    writeln!(out, "p_loss      : {}", percent(&summary["probability_of_loss"]))?;
    writeln!(out, "kelly       : {}", number(&summary["kelly_fraction"], 3))?;
    writeln!(out, "advice      : {}", recommendation_label(&summary["recommendation"]))?;
    Ok(())
}

fn text(value: &Value) -> &str {
    value.as_str().unwrap_or("-")
}

fn number(value: &Value, decimals: usize) -> String {
    value
        .as_f64()
        .map(|v| format!("{v:.decimals$}"))
        .unwrap_or_else(|| String::from("-"))
}

fn percent(value: &Value) -> String {
    value
        .as_f64()
        .map(|v| format!("{:+.2}%", v * 100.0))
        .unwrap_or_else(|| String::from("-"))
}

fn recommendation_label(value: &Value) -> &'static str {
    match value.as_str() {
        Some("STRONG_BUY") => "STRONG BUY",
        Some("BUY") => "BUY",
        Some("HOLD_NEUTRAL") => "HOLD / NEUTRAL",
        Some("SELL_HEDGE") => "SELL / HEDGE",
        _ => "-",
    }
}
