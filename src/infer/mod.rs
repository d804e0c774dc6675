//! Schema inference.
//!
//! Derives a `Schema` from a sample of an unseen checklist file. Inference
//! never refuses: when the sample is too small it returns the built-in
//! default, and when the derived schema recovers too few of the sample's
//! task ids it is still returned, flagged with confidence 0.5.
//!
//! Steps:
//! 1. classify the list style (checklist / numbered / custom)
//! 2. detect the dominant id convention and build the task line pattern
//! 3. collect `label: [value]` lines
//! 4. map labels to semantic keys
//! 5. classify raw values into states
//! 6. re-parse the sample and measure how many ids come back

mod fields;
mod format;

#[cfg(test)]
mod tests;

pub use fields::{INFERRED_STATUS_LINE, classify, semantic_key};
pub use format::{GENERIC_ID, IdConvention, detect_format, detect_id_convention};

use crate::error::Result;
use crate::parser;
use crate::schema::{CURRENT_SCHEMA_VERSION, LinePattern, Schema};
use chrono::Utc;
use serde::Serialize;

/// Only this many leading lines are ever sampled.
pub const MAX_SAMPLE_LINES: usize = 500;

/// Samples with fewer non-blank lines fall back to the default schema.
pub const MIN_SAMPLE_LINES: usize = 3;

/// Fraction of sampled lines a list style must exceed to be chosen.
pub const FORMAT_THRESHOLD: f64 = 0.30;

/// Match rate at or above which an inferred schema is fully trusted.
pub const ACCEPT_MATCH_RATE: f64 = 0.95;

/// Confidence assigned when validation falls short.
pub const LOW_CONFIDENCE: f64 = 0.5;

/// Inferred schema plus what inference saw.
#[derive(Debug, Clone, Serialize)]
pub struct Inference {
    pub schema: Schema,
    /// Ids detected in the sample by the id convention.
    pub detected_ids: Vec<String>,
    /// Detected ids the schema re-extracted as tasks.
    pub recovered_ids: Vec<String>,
    pub match_rate: f64,
    pub warnings: Vec<String>,
}

/// Infer a schema from a sample of checklist text.
pub fn infer(sample: &str) -> Schema {
    infer_with_report(sample).schema
}

/// Infer a schema and report how well it fits the sample.
pub fn infer_with_report(sample: &str) -> Inference {
    let lines = sample_lines(sample);
    let mut warnings = Vec::new();

    let non_blank = lines.iter().filter(|l| !l.trim().is_empty()).count();
    if non_blank < MIN_SAMPLE_LINES {
        let warning = format!(
            "sample has {} non-blank line(s) (minimum {}); using the built-in default schema",
            non_blank, MIN_SAMPLE_LINES
        );
        tracing::warn!("{}", warning);
        return Inference {
            schema: Schema::builtin_default(),
            detected_ids: Vec::new(),
            recovered_ids: Vec::new(),
            match_rate: 0.0,
            warnings: vec![warning],
        };
    }

    let format_type = detect_format(&lines);
    let convention = detect_id_convention(&lines);
    let id_pattern = match &convention {
        Some(convention) => convention.pattern(),
        None => {
            warnings.push("no task id convention detected; using a generic id pattern".to_string());
            GENERIC_ID.to_string()
        }
    };

    let observations = fields::collect_labels(&lines);
    let (mut field_mapping, mut status_semantics) = fields::build_fields(&observations);
    if field_mapping.is_empty() {
        warnings.push(
            "no `label: [value]` status lines found; using the default field vocabulary"
                .to_string(),
        );
        let default = Schema::builtin_default();
        field_mapping = default.field_mapping;
        status_semantics = default.status_semantics;
    }

    let schema = Schema {
        version: Some(CURRENT_SCHEMA_VERSION.to_string()),
        format_type: format_type.to_string(),
        task_line: Some(LinePattern::new(format::task_line_pattern(
            format_type,
            &id_pattern,
        ))),
        status_line: Some(LinePattern::new(INFERRED_STATUS_LINE)),
        field_mapping,
        status_semantics,
        confidence: 1.0,
        match_rate: None,
        last_validated: None,
    };

    let schema = if schema.compile().is_ok() {
        schema
    } else {
        warnings.push(
            "inferred schema failed validation; falling back to the built-in default".to_string(),
        );
        Schema::builtin_default()
    };

    let detected_ids = convention
        .as_ref()
        .map(|c| format::collect_ids(&lines, c))
        .unwrap_or_default();

    finish(schema, &lines.join("\n"), detected_ids, warnings)
}

/// Re-validate an existing schema against checklist text.
///
/// Used by the "validate existing schema" entry point: the schema must
/// compile (errors propagate here, unlike on the gating path), and its
/// confidence, match rate, and timestamp are refreshed.
pub fn revalidate(schema: &Schema, text: &str) -> Result<Inference> {
    schema.compile()?;
    let lines = sample_lines(text);
    let detected_ids = detect_id_convention(&lines)
        .map(|c| format::collect_ids(&lines, &c))
        .unwrap_or_default();
    Ok(finish(
        schema.clone(),
        &lines.join("\n"),
        detected_ids,
        Vec::new(),
    ))
}

fn sample_lines(text: &str) -> Vec<&str> {
    text.lines().take(MAX_SAMPLE_LINES).collect()
}

/// Step 6: re-parse the sample and stamp confidence and match rate.
fn finish(
    mut schema: Schema,
    sample: &str,
    detected_ids: Vec<String>,
    mut warnings: Vec<String>,
) -> Inference {
    let recovered_ids: Vec<String> = match schema.compile() {
        Ok(compiled) => {
            let parsed: Vec<String> = parser::parse(sample, &compiled)
                .into_iter()
                .map(|t| t.id)
                .collect();
            detected_ids
                .iter()
                .filter(|id| parsed.contains(id))
                .cloned()
                .collect()
        }
        Err(_) => Vec::new(),
    };

    let match_rate = if detected_ids.is_empty() {
        0.0
    } else {
        recovered_ids.len() as f64 / detected_ids.len() as f64
    };

    if detected_ids.is_empty() {
        warnings.push("no task ids detected in the sample; schema is unconfirmed".to_string());
        schema.confidence = LOW_CONFIDENCE;
    } else if match_rate >= ACCEPT_MATCH_RATE {
        schema.confidence = 1.0;
    } else {
        warnings.push(format!(
            "schema recovered {} of {} detected task ids ({:.0}%); confidence lowered to {}",
            recovered_ids.len(),
            detected_ids.len(),
            match_rate * 100.0,
            LOW_CONFIDENCE
        ));
        schema.confidence = LOW_CONFIDENCE;
    }

    for warning in &warnings {
        tracing::warn!("{}", warning);
    }

    schema.match_rate = Some(match_rate);
    schema.last_validated = Some(Utc::now());

    Inference {
        schema,
        detected_ids,
        recovered_ids,
        match_rate,
        warnings,
    }
}
