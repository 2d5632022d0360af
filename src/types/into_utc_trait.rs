use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Anything that names an instant of a forecast and can be pinned to UTC.
///
/// Provider timestamps and frame filters all work in UTC, so this is the one
/// place where other representations are brought onto that clock.
pub trait IntoUtcDateTime {
    fn into_utc(self) -> DateTime<Utc>;
}

/// Zoned datetimes (`Utc`, `Local`, `FixedOffset`, `chrono_tz::Tz`) keep
/// their instant; only the offset changes.
impl<Tz: TimeZone> IntoUtcDateTime for DateTime<Tz> {
    fn into_utc(self) -> DateTime<Utc> {
        self.with_timezone(&Utc)
    }
}

/// A naive datetime is read as UTC wall-clock fields, the way providers
/// report times once their `utc_offset` has been applied. It is never read
/// as local time.
impl IntoUtcDateTime for NaiveDateTime {
    fn into_utc(self) -> DateTime<Utc> {
        Utc.from_utc_datetime(&self)
    }
}

/// A calendar day means its first instant, midnight UTC, as the points of a
/// daily series are stamped.
impl IntoUtcDateTime for NaiveDate {
    fn into_utc(self) -> DateTime<Utc> {
        Utc.from_utc_datetime(&self.and_time(chrono::NaiveTime::MIN))
    }
}
