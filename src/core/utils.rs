use chrono::{DateTime, FixedOffset};

pub fn datetime_to_string(datetime: DateTime<FixedOffset>) -> String {
    datetime.format("%Y-%m-%d %H:%M:%S%:z").to_string()
}
