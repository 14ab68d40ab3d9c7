use chrono::{DateTime, Local, NaiveDateTime};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Truncate a string to at most `max_len` characters, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
  }
}

/// Value of a nullable text column, `-` when missing or blank
pub fn or_dash(value: Option<&str>) -> String {
  match value.map(str::trim) {
    Some(v) if !v.is_empty() => v.to_string(),
    _ => "-".to_string(),
  }
}

/// Server timestamp in local time, `-` when missing or unparsable.
///
/// Zone-less timestamps (`2024-05-01 10:20:30`) are taken as local already.
pub fn format_timestamp(value: Option<&str>) -> String {
  let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
    return "-".to_string();
  };

  if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
    return dt.with_timezone(&Local).format(TIMESTAMP_FORMAT).to_string();
  }

  ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"]
    .iter()
    .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
    .map(|dt| dt.format(TIMESTAMP_FORMAT).to_string())
    .unwrap_or_else(|| "-".to_string())
}
