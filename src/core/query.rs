use crate::core::dataset::Dataset;
use crate::core::errors::LookupError;
use crate::core::prefix::Prefix;
use log::{info, warn};
use std::collections::BTreeSet;

/*-------------------------------------------------------------------------------------------------
  Query
-------------------------------------------------------------------------------------------------*/

/// A single query against the AWS IP ranges. Exactly one query runs per invocation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Query {
    /// List the distinct AWS regions.
    ListRegions,

    /// List the distinct AWS services, optionally restricted to a region.
    ListServices { region: Option<String> },

    /// Find the prefixes that contain an IPv4 address.
    FindIp { address: String },

    /// List the prefixes, optionally filtered by region and (with a region) service.
    ListPrefixes {
        region: Option<String>,
        service: Option<String>,
    },
}

/*--------------------------------------------------------------------------------------
  Query Results
--------------------------------------------------------------------------------------*/

/// Results of a [Query], borrowing from the [Dataset] the query ran against.
#[derive(Debug, Eq, PartialEq)]
pub enum QueryResults<'d> {
    Regions(BTreeSet<&'d str>),
    Services(BTreeSet<&'d str>),
    IpMatches {
        address: String,
        prefixes: Vec<&'d Prefix>,
    },
    Prefixes {
        region_filtered: bool,
        prefixes: Vec<&'d Prefix>,
    },
}

/*--------------------------------------------------------------------------------------
  Query Implementation
--------------------------------------------------------------------------------------*/

impl Query {
    /// Select the query from the individual command-line options. When several are present
    /// the precedence is: list regions, list services, find IP, list prefixes.
    pub fn select(
        list_regions: bool,
        list_services: bool,
        region: Option<String>,
        service: Option<String>,
        find_ip: Option<String>,
    ) -> Query {
        if list_regions {
            Query::ListRegions
        } else if list_services {
            Query::ListServices { region }
        } else if let Some(address) = find_ip {
            Query::FindIp { address }
        } else {
            Query::ListPrefixes { region, service }
        }
    }

    /// Run the query against `dataset`. Only [Query::FindIp] can fail, when the address does not
    /// parse as an IPv4 address.
    pub fn execute<'d>(&self, dataset: &'d Dataset) -> Result<QueryResults<'d>, LookupError> {
        let results = match self {
            Query::ListRegions => QueryResults::Regions(dataset.regions()),
            Query::ListServices { region } => {
                QueryResults::Services(dataset.services(region.as_deref()))
            }
            Query::FindIp { address } => {
                let prefixes = dataset.find_containing(address)?;
                info!(
                    "Found {} AWS IP prefix(es) containing {address}",
                    prefixes.len()
                );
                QueryResults::IpMatches {
                    address: address.clone(),
                    prefixes,
                }
            }
            Query::ListPrefixes { region, service } => {
                if region.is_none() && service.is_some() {
                    warn!("--service is only applied together with --region; ignoring it");
                }
                QueryResults::Prefixes {
                    region_filtered: region.is_some(),
                    prefixes: dataset.prefixes(region.as_deref(), service.as_deref()),
                }
            }
        };

        Ok(results)
    }
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
