use crate::core::errors::LookupError;
use crate::core::json;
use crate::core::prefix::Prefix;
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::net::Ipv4Addr;

/*-------------------------------------------------------------------------------------------------
  Dataset
-------------------------------------------------------------------------------------------------*/

/// The AWS IP ranges loaded for one invocation: the published prefixes, in document order, plus
/// the publication metadata carried by the source document.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Dataset {
    pub(crate) sync_token: Option<String>,
    pub(crate) create_date: Option<DateTime<Utc>>,
    pub(crate) prefixes: Vec<Prefix>,
}

/*--------------------------------------------------------------------------------------
  Dataset Implementation
--------------------------------------------------------------------------------------*/

impl Dataset {
    /*-------------------------------------------------------------------------
      Getters
    -------------------------------------------------------------------------*/

    /// Publication time of the dataset in Unix epoch time format, when present.
    pub fn sync_token(&self) -> Option<&str> {
        self.sync_token.as_deref()
    }

    /// Publication time of the dataset in UTC `DateTime` format, when present.
    pub fn create_date(&self) -> Option<&DateTime<Utc>> {
        self.create_date.as_ref()
    }

    /// Every prefix in the dataset, in document order.
    pub fn all_prefixes(&self) -> &[Prefix] {
        &self.prefixes
    }

    /*-------------------------------------------------------------------------
      Queries
    -------------------------------------------------------------------------*/

    /// Distinct region codes across all prefixes.
    pub fn regions(&self) -> BTreeSet<&str> {
        self.prefixes
            .iter()
            .map(|prefix| prefix.region.as_str())
            .collect()
    }

    /// Distinct service names, restricted to `region` (ignoring case) when one is given.
    pub fn services(&self, region: Option<&str>) -> BTreeSet<&str> {
        self.prefixes
            .iter()
            .filter(|prefix| region.map_or(true, |region| prefix.in_region(region)))
            .map(|prefix| prefix.service.as_str())
            .collect()
    }

    /// Prefixes matching the region and service filters, in document order.
    ///
    /// The service filter only applies together with a region; `service` is ignored when
    /// `region` is `None`.
    pub fn prefixes(&self, region: Option<&str>, service: Option<&str>) -> Vec<&Prefix> {
        let Some(region) = region else {
            return self.prefixes.iter().collect();
        };

        self.prefixes
            .iter()
            .filter(|prefix| prefix.in_region(region))
            .filter(|prefix| service.map_or(true, |service| prefix.used_by(service)))
            .collect()
    }

    /// Every prefix whose CIDR block contains the IPv4 address `ip`, in document order. An
    /// address no prefix contains yields an empty list.
    pub fn find_containing(&self, ip: &str) -> Result<Vec<&Prefix>, LookupError> {
        let address: Ipv4Addr = ip.parse().map_err(|source| LookupError::InvalidAddress {
            address: ip.to_string(),
            source,
        })?;

        Ok(self
            .prefixes
            .iter()
            .filter(|prefix| prefix.contains(address))
            .collect())
    }

    /*-------------------------------------------------------------------------
      (Internal) Dataset from JSON
    -------------------------------------------------------------------------*/

    pub(crate) fn from_json(json: &str) -> serde_json::Result<Dataset> {
        let json_ip_ranges = json::parse(json)?;

        Ok(Dataset {
            sync_token: json_ip_ranges.sync_token.map(str::to_string),
            create_date: json_ip_ranges.create_date,
            prefixes: json_ip_ranges
                .prefixes
                .into_iter()
                .map(|json_prefix| Prefix {
                    ip_prefix: json_prefix.ip_prefix,
                    region: json_prefix.region.to_string(),
                    service: json_prefix.service.to_string(),
                })
                .collect(),
        })
    }
}

/*--------------------------------------------------------------------------------------
  Create Dataset from Prefixes
--------------------------------------------------------------------------------------*/

impl From<Vec<Prefix>> for Dataset {
    fn from(prefixes: Vec<Prefix>) -> Self {
        Self {
            prefixes,
            ..Dataset::default()
        }
    }
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
