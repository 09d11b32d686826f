/*-------------------------------------------------------------------------------------------------
  Core Modules
-------------------------------------------------------------------------------------------------*/

pub mod client;
pub mod dataset;
pub mod datetime;
pub mod errors;
pub mod json;
pub mod prefix;
pub mod query;
