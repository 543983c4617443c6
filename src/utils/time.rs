use chrono::{DateTime, SecondsFormat, Utc};

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// ISO-8601 / RFC 3339 with millisecond precision and a `Z` suffix.
pub fn to_rfc3339(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_as_utc_iso8601() {
        let dt = DateTime::parse_from_rfc3339("2026-10-16T09:30:00.250+02:00")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(to_rfc3339(dt), "2026-10-16T07:30:00.250Z");
    }
}
