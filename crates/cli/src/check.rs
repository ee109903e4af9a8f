//! Submission checking: one JSON object per input line, one verdict per
//! output line.

use std::io::{BufRead, Write};

use serde::{Deserialize, Serialize};

use fieldcheck_core::{FieldValues, FieldViolation, ValidatorRegistry};

use crate::error::CliError;

/// One input line: the declared type name plus the instance's field values.
#[derive(Debug, Clone, Deserialize)]
pub struct Submission {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub fields: FieldValues,
}

/// Outcome for one non-blank input line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Verdict {
    pub line: usize,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none", default)]
    pub type_name: Option<String>,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub violations: Option<Vec<FieldViolation>>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

/// Totals over a whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckSummary {
    pub checked: usize,
    pub rejected: usize,
}

impl CheckSummary {
    pub fn all_valid(&self) -> bool {
        self.rejected == 0
    }
}

/// Check a single raw line against `registry`. Line numbers are 1-based.
///
/// Bytes that are not valid UTF-8 or not a submission object yield a
/// rejected verdict carrying the decode error.
pub fn check_line(
    registry: &ValidatorRegistry,
    line: usize,
    raw: &[u8],
    detailed: bool,
) -> Verdict {
    let submission: Submission = match serde_json::from_slice(raw) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!(line, error = %e, "Malformed submission");
            return Verdict {
                line,
                type_name: None,
                valid: false,
                violations: None,
                error: Some(format!("malformed submission: {e}")),
            };
        }
    };

    let (valid, violations) = if detailed {
        let result = registry.evaluate_fields(&submission.type_name, &submission.fields);
        (result.is_valid, Some(result.violations))
    } else {
        let valid = registry.validate_fields(&submission.type_name, &submission.fields);
        (valid, None)
    };

    if valid {
        tracing::debug!(line, type_name = %submission.type_name, "Submission accepted");
    } else {
        tracing::info!(line, type_name = %submission.type_name, "Submission rejected");
    }

    Verdict {
        line,
        type_name: Some(submission.type_name),
        valid,
        violations,
        error: None,
    }
}

/// Read submissions from `input`, writing one verdict line per non-blank
/// input line to `output`. Malformed lines are rejected and processing
/// continues.
pub fn run<R, W>(
    registry: &ValidatorRegistry,
    mut input: R,
    mut output: W,
    detailed: bool,
) -> Result<CheckSummary, CliError>
where
    R: BufRead,
    W: Write,
{
    let mut summary = CheckSummary::default();
    let mut buf = Vec::new();
    let mut line = 0;

    loop {
        buf.clear();
        if input.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        line += 1;

        let raw = buf.trim_ascii();
        if raw.is_empty() {
            continue;
        }

        let verdict = check_line(registry, line, raw, detailed);
        summary.checked += 1;
        if !verdict.valid {
            summary.rejected += 1;
        }

        serde_json::to_writer(&mut output, &verdict).map_err(std::io::Error::from)?;
        output.write_all(b"\n")?;
    }

    output.flush()?;
    tracing::info!(
        checked = summary.checked,
        rejected = summary.rejected,
        "Submission check finished"
    );
    Ok(summary)
}

/// Process exit status for a finished run: `0` when every submission was
/// valid, `1` when any was rejected, `2` when the run itself failed.
pub fn exit_status(result: &Result<CheckSummary, CliError>) -> u8 {
    match result {
        Ok(summary) if summary.all_valid() => 0,
        Ok(_) => 1,
        Err(_) => 2,
    }
}
