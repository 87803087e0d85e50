use anyhow::{Context, Result};
use serde::Serializer;
use std::path::Path;
use time::macros::format_description;
use time::{Duration, PrimitiveDateTime};

pub fn ensure_dir(p: &Path) -> Result<()> {
    std::fs::create_dir_all(p).with_context(|| format!("create_dir_all {}", p.display()))
}

/// `YYYY-MM-DDTHH:MM:SS`, no offset.
pub fn format_iso(dt: PrimitiveDateTime) -> String {
    dt.format(format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second]"
    ))
    .unwrap_or_else(|_| dt.to_string())
}

pub fn serialize_opt_iso<S: Serializer>(
    v: &Option<PrimitiveDateTime>,
    s: S,
) -> std::result::Result<S::Ok, S::Error> {
    match v {
        Some(dt) => s.serialize_str(&format_iso(*dt)),
        None => s.serialize_none(),
    }
}

/// `H:MM:SS`, hours unbounded, leading `-` when negative.
pub fn format_hms(d: Duration) -> String {
    let sign = if d.is_negative() { "-" } else { "" };
    let total = d.whole_seconds().unsigned_abs();
    format!(
        "{sign}{}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}
