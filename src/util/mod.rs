use time::{OffsetDateTime, PrimitiveDateTime};

pub mod config;
pub mod db;
pub mod template;
pub mod timer;
pub mod try_file;

/// The current UTC time, without an offset, as stored in `TIMESTAMP` columns.
pub fn now_utc() -> PrimitiveDateTime {
    let now = OffsetDateTime::now_utc();
    PrimitiveDateTime::new(now.date(), now.time())
}

/// Formats a timestamp for display, e.g: `January 5, 2024 09:03`
pub fn display_timestamp(ts: &PrimitiveDateTime) -> String {
    format!("{} {}, {} {:02}:{:02}", ts.month(), ts.day(), ts.year(), ts.hour(), ts.minute())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::{Date, Month, Time};

    #[test]
    fn test_display_timestamp() {
        let date = Date::from_calendar_date(2024, Month::January, 5).unwrap();
        let time = Time::from_hms(9, 3, 59).unwrap();

        assert_eq!(display_timestamp(&PrimitiveDateTime::new(date, time)), "January 5, 2024 09:03");
    }
}
