use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{self, Deserialize, Deserializer};

/*-------------------------------------------------------------------------------------------------
  DateTime Format
-------------------------------------------------------------------------------------------------*/

// The `createDate` field is published as `YYYY-MM-DD-hh-mm-ss` in UTC and is optional in the
// documents this crate accepts.

const AWS_IP_RANGES_DATETIME_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";

pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(s) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    NaiveDateTime::parse_from_str(&s, AWS_IP_RANGES_DATETIME_FORMAT)
        .map(|naive_date_time| Some(naive_date_time.and_utc()))
        .map_err(serde::de::Error::custom)
}
