use awsranges::Query;
use clap::Parser;
use clap_verbosity_flag::{Verbosity, WarnLevel};

/*-------------------------------------------------------------------------------------------------
  Command Line Interface (CLI) Arguments
-------------------------------------------------------------------------------------------------*/

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Get public IP ranges with associated services for AWS. Useful for building firewall policies.",
    long_about = None
)]
pub struct Args {
    /// Show all regions with public facing IP lists
    #[arg(long = "list_regions")]
    pub list_regions: bool,

    /// Show all services that AWS use; can also optionally specify a region
    #[arg(long = "list_services")]
    pub list_services: bool,

    /// The region you wish to return the IP ranges for
    #[arg(long)]
    pub region: Option<String>,

    /// The service you wish to return the IP ranges for (requires --region)
    #[arg(long)]
    pub service: Option<String>,

    /// Find the region, service, and subnet of an IPv4 address
    #[arg(long = "findip", value_name = "IPV4")]
    pub find_ip: Option<String>,

    /// Do not wait for confirmation when falling back to a previously downloaded file
    #[arg(long)]
    pub non_interactive: bool,

    /// Logging verbosity
    #[command(flatten)]
    pub verbose: Verbosity<WarnLevel>,
}

impl Args {
    /// The query selected by the arguments.
    pub fn query(&self) -> Query {
        Query::select(
            self.list_regions,
            self.list_services,
            self.region.clone(),
            self.service.clone(),
            self.find_ip.clone(),
        )
    }
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
