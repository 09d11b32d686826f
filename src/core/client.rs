use crate::core::dataset::Dataset;
use crate::core::errors::{FetchError, Result};
use chrono::{DateTime, Local};
use log::{info, warn};
use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::NamedTempFile;

/*-------------------------------------------------------------------------------------------------
  Simple Interface
-------------------------------------------------------------------------------------------------*/

/// _**Simple library interface**_ retrieves and parses the AWS IP ranges using the client
/// configuration sourced from the environment, falling back to the cached copy when the download
/// fails.
///
/// ```no_run
/// let dataset = awsranges::get_dataset().unwrap();
///
/// for prefix in dataset.find_containing("3.5.140.1").unwrap() {
///     println!("{} {} {}", prefix.ip_prefix, prefix.region, prefix.service);
/// }
/// ```
pub fn get_dataset() -> Result<Dataset> {
    Client::new().fetch().map(|fetched| fetched.dataset)
}

/*-------------------------------------------------------------------------------------------------
  Defaults
-------------------------------------------------------------------------------------------------*/

const DEFAULT_URL: &str = "https://ip-ranges.amazonaws.com/ip-ranges.json";
const DEFAULT_CACHE_FILE_NAME: &str = "aws_subnets.json";
const DEFAULT_TIMEOUT: u64 = 30;

/// `aws_subnets.json` next to the running executable, or in the current directory when the
/// executable's location is unknown.
fn default_cache_file() -> PathBuf {
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_default()
        .join(DEFAULT_CACHE_FILE_NAME)
}

/*-------------------------------------------------------------------------------------------------
  Client Builder
-------------------------------------------------------------------------------------------------*/

/// A builder for the [Client] struct that allows you to customize the client configuration.
///
/// ```
/// let client = awsranges::ClientBuilder::new()
///     .url("https://ip-ranges.amazonaws.com/ip-ranges.json")
///     .cache_file("/tmp/aws_subnets.json")
///     .timeout(10)
///     .build();
/// ```
///
/// The [ClientBuilder::new] method sources configuration values from environment variables when
/// set and uses default values otherwise. [ClientBuilder::default] ignores the environment.
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    url: String,
    cache_file: PathBuf,
    timeout: u64,
}

/*--------------------------------------------------------------------------------------
  Client Builder Implementation
--------------------------------------------------------------------------------------*/

impl Default for ClientBuilder {
    /// Create a new [ClientBuilder] with default configuration values.
    ///
    /// ```
    /// let client = awsranges::ClientBuilder::default().build();
    ///
    /// assert_eq!(client.url(), "https://ip-ranges.amazonaws.com/ip-ranges.json");
    /// assert!(client.cache_file().ends_with("aws_subnets.json"));
    /// assert_eq!(client.timeout(), 30);
    /// ```
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            cache_file: default_cache_file(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClientBuilder {
    /// Create a new [ClientBuilder] reading initial configuration values from environment
    /// variables when set:
    /// - `AWSRANGES_URL`
    /// - `AWSRANGES_CACHE_FILE`
    /// - `AWSRANGES_TIMEOUT`
    pub fn new() -> Self {
        let default = ClientBuilder::default();

        Self {
            url: get_env_var("AWSRANGES_URL", default.url),
            cache_file: get_env_var("AWSRANGES_CACHE_FILE", default.cache_file),
            timeout: get_env_var("AWSRANGES_TIMEOUT", default.timeout),
        }
    }

    /*-------------------------------------------------------------------------
      Setters
    -------------------------------------------------------------------------*/

    /// Set the URL the AWS IP ranges JSON is downloaded from.
    pub fn url(&mut self, url: &str) -> &mut Self {
        self.url = url.to_string();
        self
    }

    /// Set the file path used to cache the last successfully downloaded JSON.
    pub fn cache_file<P: AsRef<Path>>(&mut self, cache_file: P) -> &mut Self {
        self.cache_file = cache_file.as_ref().to_path_buf();
        self
    }

    /// Set the HTTP request timeout in seconds.
    pub fn timeout(&mut self, timeout: u64) -> &mut Self {
        self.timeout = timeout;
        self
    }

    /*-------------------------------------------------------------------------
      Build Method
    -------------------------------------------------------------------------*/

    pub fn build(&self) -> Client {
        Client {
            url: self.url.clone(),
            cache_file: self.cache_file.clone(),
            timeout: self.timeout,
        }
    }
}

/*-------------------------------------------------------------------------------------------------
  Client
-------------------------------------------------------------------------------------------------*/

/// Where the dataset returned by [Client::fetch] came from.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Origin {
    /// Freshly downloaded from the URL.
    Remote,

    /// Read from the cache file after the download failed.
    Cache { modified: DateTime<Local> },
}

/// A dataset together with its [Origin].
#[derive(Debug)]
pub struct Fetched {
    pub dataset: Dataset,
    pub origin: Origin,
}

/// A client that downloads the AWS IP ranges, keeping a copy of the last successful download in
/// a cache file and falling back to it when the download fails. A single download attempt is
/// made per [Client::fetch] call.
///
/// ```no_run
/// let client = awsranges::Client::new();
/// let fetched = client.fetch().unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct Client {
    url: String,
    cache_file: PathBuf,
    timeout: u64,
}

/*--------------------------------------------------------------------------------------
  Client Implementation
--------------------------------------------------------------------------------------*/

impl Default for Client {
    fn default() -> Self {
        ClientBuilder::default().build()
    }
}

impl Client {
    pub fn new() -> Self {
        ClientBuilder::new().build()
    }

    /*-------------------------------------------------------------------------
      Getters
    -------------------------------------------------------------------------*/

    /// Get the URL the AWS IP ranges JSON is downloaded from.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Get the file path used to cache the downloaded JSON.
    pub fn cache_file(&self) -> &Path {
        &self.cache_file
    }

    /// Get the HTTP request timeout in seconds.
    pub fn timeout(&self) -> u64 {
        self.timeout
    }

    /*-------------------------------------------------------------------------
      Fetch
    -------------------------------------------------------------------------*/

    /// Download and parse the AWS IP ranges, refreshing the cache file on success. When the
    /// download fails the cached copy is used instead, if one exists.
    pub fn fetch(&self) -> Result<Fetched> {
        info!("Cache file path: {:?}", &self.cache_file);

        let fetched = match self.get_json_from_url() {
            Ok(json) => {
                let dataset = parse_dataset(&json, &self.url)?;
                self.cache_json_to_file(&json);
                Fetched {
                    dataset,
                    origin: Origin::Remote,
                }
            }
            Err(download_error) => {
                warn!(
                    "Failed to download AWS IP ranges from {}: {download_error}",
                    self.url
                );
                self.fetch_from_cache(download_error)?
            }
        };

        if let Some(create_date) = fetched.dataset.create_date() {
            info!("AWS IP ranges published {create_date}");
        }
        info!(
            "Loaded {} AWS IP prefixes",
            fetched.dataset.all_prefixes().len()
        );

        Ok(fetched)
    }

    /*-------------------------------------------------------------------------
      Private Methods
    -------------------------------------------------------------------------*/

    /// Fall back to the cache file after a failed download.
    fn fetch_from_cache(&self, download_error: reqwest::Error) -> Result<Fetched> {
        let Ok(metadata) = fs::metadata(&self.cache_file) else {
            return Err(FetchError::Unavailable {
                url: self.url.clone(),
                cache_file: self.cache_file.clone(),
                source: download_error,
            }
            .into());
        };

        let modified: DateTime<Local> = metadata
            .modified()
            .map_err(|source| self.cache_read_error(source))?
            .into();

        warn!(
            "Could not download the latest AWS IP ranges, will use the file from a previous run. \
             File: {}, last modified date: {}",
            self.cache_file.display(),
            modified.format("%Y-%m-%d %H:%M:%S")
        );

        let json = self.get_json_from_file()?;
        let dataset = parse_dataset(&json, &self.cache_file.display().to_string())?;

        Ok(Fetched {
            dataset,
            origin: Origin::Cache { modified },
        })
    }

    /// Get the AWS IP ranges JSON from the URL.
    fn get_json_from_url(&self) -> std::result::Result<String, reqwest::Error> {
        info!("Get AWS IP Ranges from URL: GET {}", self.url);

        reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(self.timeout))
            .build()?
            .get(&self.url)
            .send()?
            .error_for_status()?
            .text()
    }

    /// Atomically replace the cache file with `json`. A failed write is logged and otherwise
    /// ignored; the downloaded data is still used.
    fn cache_json_to_file(&self, json: &str) {
        let parent = match self.cache_file.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let cached = fs::create_dir_all(&parent)
            .and_then(|_| NamedTempFile::new_in(&parent))
            .and_then(|mut temp_file| {
                temp_file.write_all(json.as_bytes())?;
                temp_file.flush()?;
                temp_file.persist(&self.cache_file)?;
                Ok(())
            });

        match cached {
            Ok(()) => info!(
                "Successfully cached AWS IP Ranges to: {:?}",
                &self.cache_file
            ),
            Err(error) => warn!(
                "Failed to cache AWS IP Ranges to `{:?}`: {}",
                &self.cache_file, error
            ),
        }
    }

    /// Get the AWS IP ranges JSON from the cache file.
    fn get_json_from_file(&self) -> Result<String> {
        fs::read_to_string(&self.cache_file)
            .inspect(|_| {
                info!(
                    "Successfully read AWS IP Ranges JSON from: {:?}",
                    &self.cache_file
                )
            })
            .map_err(|source| self.cache_read_error(source).into())
    }

    fn cache_read_error(&self, source: io::Error) -> FetchError {
        FetchError::Io {
            path: self.cache_file.clone(),
            source,
        }
    }
}

/*-------------------------------------------------------------------------------------------------
  Helper Functions
-------------------------------------------------------------------------------------------------*/

/// Get and parse an environment variable value or return a default value.
fn get_env_var<T: std::str::FromStr>(env_var: &str, default: T) -> T {
    env::var(env_var)
        .ok()
        .and_then(|value| {
            value
                .parse::<T>()
                .inspect(|_| info!("Using {}: {}", env_var, value))
                .inspect_err(|_| warn!("Invalid {}: {}", env_var, value))
                .ok()
        })
        .unwrap_or(default)
}

/// Parse a downloaded or cached document, naming its origin in the error.
fn parse_dataset(json: &str, origin: &str) -> Result<Dataset> {
    Dataset::from_json(json).map_err(|source| {
        FetchError::CorruptData {
            origin: origin.to_string(),
            source,
        }
        .into()
    })
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::{log_error, Error};
    use std::env::VarError;
    use tempfile::TempDir;
    use test_log::test;

    const TEST_JSON: &str = r#"{
      "syncToken": "1640995200",
      "createDate": "2022-01-01-00-00-00",
      "prefixes": [
        {"ip_prefix": "3.5.140.0/22", "region": "ap-northeast-2", "network_border_group": "ap-northeast-2", "service": "EC2"}
      ],
      "ipv6_prefixes": []
    }"#;

    const CACHED_JSON: &str = r#"{
      "prefixes": [
        {"ip_prefix": "10.0.0.0/8", "region": "us-east-1", "service": "AMAZON"}
      ]
    }"#;

    /// A URL nothing listens on.
    const UNREACHABLE_URL: &str = "http://127.0.0.1:1/ip-ranges.json";

    fn test_client(url: &str, cache_file: &Path) -> Client {
        ClientBuilder::default()
            .url(url)
            .cache_file(cache_file)
            .timeout(5)
            .build()
    }

    /*-------------------------------------------------------------------------
      Test Environment Variable Configuration
    -------------------------------------------------------------------------*/

    /// ENV_VAR: AWSRANGES_URL
    /// ENV_VAR: AWSRANGES_CACHE_FILE
    /// ENV_VAR: AWSRANGES_TIMEOUT
    #[test]
    fn test_environment_variable_configuration() {
        let test_env_vars = [
            ("AWSRANGES_URL", "https://my-ip-ranges.com/ip-ranges.json"),
            ("AWSRANGES_CACHE_FILE", "./scratch/aws_subnets.json"),
            ("AWSRANGES_TIMEOUT", "5"),
        ];

        let default = Client::default();

        // Store environment variable values
        let stored_env_vars: Vec<(String, std::result::Result<String, VarError>)> = test_env_vars
            .iter()
            .map(|(env_var, _)| (env_var.to_string(), env::var(env_var)))
            .collect();

        // Unset all environment variables
        for (env_var, _) in test_env_vars.iter() {
            env::remove_var(env_var);
        }

        // Test default cases
        let new = Client::new();
        assert_eq!(new.url(), default.url());
        assert_eq!(new.cache_file(), default.cache_file());
        assert_eq!(new.timeout(), default.timeout());

        // Set all environment variables
        for (env_var, value) in test_env_vars.iter() {
            env::set_var(env_var, value);
        }

        // Test environment variable configuration
        let env_config = Client::new();
        assert_eq!(env_config.url(), "https://my-ip-ranges.com/ip-ranges.json");
        assert_eq!(
            env_config.cache_file(),
            PathBuf::from("./scratch/aws_subnets.json")
        );
        assert_eq!(env_config.timeout(), 5);

        // Invalid values are ignored
        env::set_var("AWSRANGES_TIMEOUT", "soon");
        assert_eq!(Client::new().timeout(), default.timeout());

        // Reset environment variables
        for (env_var, value) in stored_env_vars {
            match value {
                Ok(value) => env::set_var(env_var, value),
                Err(VarError::NotPresent) => env::remove_var(env_var),
                Err(VarError::NotUnicode(value)) => env::set_var(env_var, value),
            }
        }
    }

    /*-------------------------------------------------------------------------
      Test Getter and Setter Methods
    -------------------------------------------------------------------------*/

    #[test]
    fn test_getter_and_setter_methods() {
        let client = ClientBuilder::default()
            .url("https://my-ip-ranges.com/ip-ranges.json")
            .cache_file("./scratch/test_getter_and_setter_methods_cache_file.json")
            .timeout(60)
            .build();

        assert_eq!(client.url(), "https://my-ip-ranges.com/ip-ranges.json");
        assert_eq!(
            client.cache_file(),
            PathBuf::from("./scratch/test_getter_and_setter_methods_cache_file.json")
        );
        assert_eq!(client.timeout(), 60);
    }

    #[test]
    fn test_default_cache_file() {
        let client = Client::default();

        assert_eq!(client.cache_file().file_name().unwrap(), "aws_subnets.json");
        assert_eq!(client.url(), "https://ip-ranges.amazonaws.com/ip-ranges.json");
    }

    /*-------------------------------------------------------------------------
      Test Fetch
    -------------------------------------------------------------------------*/

    #[test]
    fn test_fetch_downloads_and_caches() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/ip-ranges.json")
            .with_header("content-type", "application/json")
            .with_body(TEST_JSON)
            .create();

        let cache_dir = TempDir::new().unwrap();
        let cache_file = cache_dir.path().join("nested").join("aws_subnets.json");
        let client = test_client(&format!("{}/ip-ranges.json", server.url()), &cache_file);

        let fetched = client.fetch().inspect_err(log_error).unwrap();

        mock.assert();
        assert_eq!(fetched.origin, Origin::Remote);
        assert_eq!(fetched.dataset.sync_token(), Some("1640995200"));
        assert_eq!(fetched.dataset.all_prefixes().len(), 1);
        assert_eq!(fs::read_to_string(&cache_file).unwrap(), TEST_JSON);
    }

    #[test]
    fn test_fetch_overwrites_existing_cache() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/ip-ranges.json")
            .with_body(TEST_JSON)
            .create();

        let cache_dir = TempDir::new().unwrap();
        let cache_file = cache_dir.path().join("aws_subnets.json");
        fs::write(&cache_file, CACHED_JSON).unwrap();
        let client = test_client(&format!("{}/ip-ranges.json", server.url()), &cache_file);

        let fetched = client.fetch().unwrap();

        assert_eq!(fetched.origin, Origin::Remote);
        assert_eq!(
            fetched.dataset.regions().into_iter().collect::<Vec<_>>(),
            vec!["ap-northeast-2"]
        );
        assert_eq!(fs::read_to_string(&cache_file).unwrap(), TEST_JSON);
    }

    #[test]
    fn test_fetch_falls_back_to_cache_on_network_failure() {
        let cache_dir = TempDir::new().unwrap();
        let cache_file = cache_dir.path().join("aws_subnets.json");
        fs::write(&cache_file, CACHED_JSON).unwrap();
        let client = test_client(UNREACHABLE_URL, &cache_file);

        let fetched = client.fetch().inspect_err(log_error).unwrap();

        assert!(matches!(fetched.origin, Origin::Cache { .. }));
        assert_eq!(fetched.dataset.all_prefixes()[0].region, "us-east-1");
        assert_eq!(fs::read_to_string(&cache_file).unwrap(), CACHED_JSON);
    }

    #[test]
    fn test_fetch_falls_back_to_cache_on_http_error() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/ip-ranges.json")
            .with_status(503)
            .with_body("Service Unavailable")
            .create();

        let cache_dir = TempDir::new().unwrap();
        let cache_file = cache_dir.path().join("aws_subnets.json");
        fs::write(&cache_file, CACHED_JSON).unwrap();
        let client = test_client(&format!("{}/ip-ranges.json", server.url()), &cache_file);

        let fetched = client.fetch().unwrap();

        mock.assert();
        assert!(matches!(fetched.origin, Origin::Cache { .. }));
        assert_eq!(fs::read_to_string(&cache_file).unwrap(), CACHED_JSON);
    }

    #[test]
    fn test_fetch_unavailable_without_cache() {
        let cache_dir = TempDir::new().unwrap();
        let cache_file = cache_dir.path().join("aws_subnets.json");
        let client = test_client(UNREACHABLE_URL, &cache_file);

        let error = client.fetch().unwrap_err();

        let Error::Fetch(FetchError::Unavailable { url, cache_file: reported, .. }) = &error else {
            panic!("expected an unavailable error, got {error:?}");
        };
        assert_eq!(url, UNREACHABLE_URL);
        assert_eq!(reported, &cache_file);
        assert!(error.to_string().contains(UNREACHABLE_URL));
        assert!(!cache_file.exists());
    }

    #[test]
    fn test_fetch_corrupt_download_leaves_cache_untouched() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/ip-ranges.json")
            .with_body(r#"{"syncToken": "1640995200"}"#)
            .create();

        let cache_dir = TempDir::new().unwrap();
        let cache_file = cache_dir.path().join("aws_subnets.json");
        fs::write(&cache_file, CACHED_JSON).unwrap();
        let client = test_client(&format!("{}/ip-ranges.json", server.url()), &cache_file);

        let error = client.fetch().unwrap_err();

        assert!(matches!(error, Error::Fetch(FetchError::CorruptData { .. })));
        assert_eq!(fs::read_to_string(&cache_file).unwrap(), CACHED_JSON);
    }

    #[test]
    fn test_fetch_corrupt_cache() {
        let cache_dir = TempDir::new().unwrap();
        let cache_file = cache_dir.path().join("aws_subnets.json");
        fs::write(&cache_file, "not json").unwrap();
        let client = test_client(UNREACHABLE_URL, &cache_file);

        let error = client.fetch().unwrap_err();

        let Error::Fetch(FetchError::CorruptData { origin, .. }) = &error else {
            panic!("expected a corrupt data error, got {error:?}");
        };
        assert_eq!(origin, &cache_file.display().to_string());
    }

    #[test]
    fn test_fetch_survives_cache_write_failure() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/ip-ranges.json")
            .with_body(TEST_JSON)
            .create();

        // The cache file's parent is a regular file, so the directory cannot be created
        let cache_dir = TempDir::new().unwrap();
        let blocker = cache_dir.path().join("not_a_directory");
        fs::write(&blocker, "").unwrap();
        let cache_file = blocker.join("aws_subnets.json");
        let client = test_client(&format!("{}/ip-ranges.json", server.url()), &cache_file);

        let fetched = client.fetch().inspect_err(log_error).unwrap();

        assert_eq!(fetched.origin, Origin::Remote);
        assert_eq!(fetched.dataset.all_prefixes().len(), 1);
        assert!(!cache_file.exists());
    }

    #[test]
    fn test_fetch_unreadable_cache() {
        // A directory where the cache file should be exists but cannot be read as a file
        let cache_dir = TempDir::new().unwrap();
        let cache_file = cache_dir.path().join("aws_subnets.json");
        fs::create_dir(&cache_file).unwrap();
        let client = test_client(UNREACHABLE_URL, &cache_file);

        let error = client.fetch().unwrap_err();

        let Error::Fetch(FetchError::Io { path, .. }) = &error else {
            panic!("expected a cache read error, got {error:?}");
        };
        assert_eq!(path, &cache_file);
    }
}
