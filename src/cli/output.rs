use awsranges::{LookupError, Prefix, QueryResults};
use std::collections::BTreeSet;
use std::io::{self, Write};

/*-------------------------------------------------------------------------------------------------
  Output Functions
-------------------------------------------------------------------------------------------------*/

/// Write the results of a query as line-oriented text.
pub fn write_results<W: Write>(writer: &mut W, results: &QueryResults) -> io::Result<()> {
    match results {
        QueryResults::Regions(regions) => names(writer, regions),
        QueryResults::Services(services) => names(writer, services),
        QueryResults::IpMatches { address, prefixes } => ip_matches(writer, address, prefixes),
        QueryResults::Prefixes {
            region_filtered,
            prefixes: matching,
        } => prefixes(writer, matching, !region_filtered),
    }
}

/// Write a query-level error, e.g. an IP address that does not parse.
pub fn write_lookup_error<W: Write>(writer: &mut W, error: &LookupError) -> io::Result<()> {
    writeln!(writer, "Error: {error}")
}

/*--------------------------------------------------------------------------------------
  Regions and Services
--------------------------------------------------------------------------------------*/

fn names<W: Write>(writer: &mut W, names: &BTreeSet<&str>) -> io::Result<()> {
    let line = names.iter().copied().collect::<Vec<&str>>().join(", ");
    writeln!(writer, "{line}")
}

/*--------------------------------------------------------------------------------------
  Prefixes
--------------------------------------------------------------------------------------*/

/// `ip_prefix,service,region` per prefix, or `ip_prefix,service` when the listing is already
/// restricted to one region.
fn prefixes<W: Write>(writer: &mut W, prefixes: &[&Prefix], with_region: bool) -> io::Result<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    for prefix in prefixes {
        let ip_prefix = prefix.ip_prefix.to_string();
        if with_region {
            csv_writer.write_record([&ip_prefix, &prefix.service, &prefix.region])?;
        } else {
            csv_writer.write_record([&ip_prefix, &prefix.service])?;
        }
    }

    csv_writer.flush()
}

/*--------------------------------------------------------------------------------------
  IP Address Matches
--------------------------------------------------------------------------------------*/

fn ip_matches<W: Write>(writer: &mut W, address: &str, prefixes: &[&Prefix]) -> io::Result<()> {
    if prefixes.is_empty() {
        return writeln!(writer, "IP address {address} not found in AWS IP ranges");
    }

    for prefix in prefixes {
        writeln!(
            writer,
            "Region: {},  Service: {},  Subnet: {}",
            prefix.region, prefix.service, prefix.ip_prefix
        )?;
    }

    Ok(())
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
