use chrono::{DateTime, Duration, SubsecRound, Utc};

/// Current time at the precision the store keeps (`DATETIME(6)`)
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// A timestamp strictly later than `previous`
///
/// Two mutations inside the same microsecond would otherwise share an
/// `updated_at`.
pub fn now_after(previous: DateTime<Utc>) -> DateTime<Utc> {
    let current = now();
    if current > previous {
        current
    } else {
        previous + Duration::microseconds(1)
    }
}

pub fn rfc3339_now() -> String {
    Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
