//! # awsranges
//!
//! Look up the regions, services, and IPv4 prefixes AWS publishes in its
//! [IP address ranges](https://docs.aws.amazon.com/vpc/latest/userguide/aws-ip-ranges.html)
//! document.
//!
//! The dataset is downloaded on every call to [Client::fetch] and a copy of the last successful
//! download is kept in a cache file; when the download fails the cached copy is used instead.
//!
//! ```no_run
//! # fn main() -> awsranges::Result<()> {
//! let dataset = awsranges::get_dataset()?;
//!
//! // Regions and services
//! println!("{:?}", dataset.regions());
//! println!("{:?}", dataset.services(Some("us-east-1")));
//!
//! // Prefixes in a region used by a service
//! for prefix in dataset.prefixes(Some("us-east-1"), Some("EC2")) {
//!     println!("{}", prefix.ip_prefix);
//! }
//!
//! // Prefixes containing an IP address
//! for prefix in dataset.find_containing("3.5.140.1")? {
//!     println!("{} {} {}", prefix.region, prefix.service, prefix.ip_prefix);
//! }
//! # Ok(())
//! # }
//! ```

/*-------------------------------------------------------------------------------------------------
  Modules
-------------------------------------------------------------------------------------------------*/

mod core;

/*-------------------------------------------------------------------------------------------------
  Public Interface
-------------------------------------------------------------------------------------------------*/

pub use crate::core::client::{get_dataset, Client, ClientBuilder, Fetched, Origin};
pub use crate::core::dataset::Dataset;
pub use crate::core::errors::{Error, FetchError, LookupError, Result};
pub use crate::core::prefix::Prefix;
pub use crate::core::query::{Query, QueryResults};

/*--------------------------------------------------------------------------------------
  Re-exports
--------------------------------------------------------------------------------------*/

pub use ipnetwork;
