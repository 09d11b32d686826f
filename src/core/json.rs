use chrono::{DateTime, Utc};
use ipnetwork::Ipv4Network;
use serde::Deserialize;

/*-------------------------------------------------------------------------------------------------
  Parse JSON
-------------------------------------------------------------------------------------------------*/

pub fn parse(json: &str) -> serde_json::Result<JsonIpRanges<'_>> {
    serde_json::from_str(json)
}

/*-------------------------------------------------------------------------------------------------
  JSON Data Structures
-------------------------------------------------------------------------------------------------*/

/*--------------------------------------------------------------------------------------
  JSON IP Ranges
--------------------------------------------------------------------------------------*/

/// Top-level AWS IP ranges document. Only `prefixes` is required; unknown top-level fields such
/// as `ipv6_prefixes` are ignored.
#[derive(Debug, Deserialize, Eq, PartialEq)]
pub struct JsonIpRanges<'j> {
    #[serde(rename = "syncToken", default, borrow)]
    pub sync_token: Option<&'j str>,

    #[serde(
        rename = "createDate",
        default,
        deserialize_with = "crate::core::datetime::deserialize"
    )]
    pub create_date: Option<DateTime<Utc>>,

    #[serde(borrow)]
    pub prefixes: Vec<JsonIpPrefix<'j>>,
}

/*--------------------------------------------------------------------------------------
  JSON IP (IPv4) Prefix
--------------------------------------------------------------------------------------*/

#[derive(Debug, Deserialize, Eq, PartialEq)]
pub struct JsonIpPrefix<'j> {
    pub ip_prefix: Ipv4Network,
    pub region: &'j str,
    pub service: &'j str,
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
