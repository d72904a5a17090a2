//! ffprobe output parsing.

use serde::Deserialize;
use streamvault_core::ToolError;

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

/// Duration in seconds from `ffprobe -print_format json -show_format` output
pub fn parse_duration(program: &str, stdout: &[u8]) -> Result<f64, ToolError> {
    let invalid = |message: String| ToolError::InvalidOutput {
        program: program.to_string(),
        message,
    };

    let probe: ProbeOutput = serde_json::from_slice(stdout)
        .map_err(|e| invalid(format!("Failed to parse ffprobe output: {}", e)))?;

    let raw = probe
        .format
        .and_then(|f| f.duration)
        .ok_or_else(|| invalid("No duration in ffprobe output".to_string()))?;

    let duration: f64 = raw
        .trim()
        .parse()
        .map_err(|_| invalid(format!("Could not parse duration: {}", raw)))?;

    if !duration.is_finite() || duration < 0.0 {
        return Err(invalid(format!("Invalid duration: {}", raw)));
    }

    Ok(duration)
}
