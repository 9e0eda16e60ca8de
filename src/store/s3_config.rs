/*
 * Copyright 2019-2020 Wren Powell
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *     http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

use std::env;

use secrecy::SecretString;
use serde::Deserialize;

/// The region used to sign requests when none is configured.
pub const DEFAULT_REGION: &str = "us-east-1";

/// The credentials to use to authenticate with an S3-compatible service.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum S3Credentials {
    /// Send unsigned requests.
    Anonymous,

    /// Sign requests with an access key and a secret key.
    Basic {
        access_key: String,
        secret_key: SecretString,
    },
}

impl S3Credentials {
    /// Pick credentials from an optional access key and secret key.
    ///
    /// Both keys are needed to sign requests; if either is missing, this returns `Anonymous`.
    pub fn from_keys(access_key: Option<String>, secret_key: Option<String>) -> Self {
        match (access_key, secret_key) {
            (Some(access_key), Some(secret_key)) => S3Credentials::Basic {
                access_key,
                secret_key: SecretString::new(secret_key),
            },
            _ => S3Credentials::Anonymous,
        }
    }
}

impl Default for S3Credentials {
    fn default() -> Self {
        S3Credentials::Anonymous
    }
}

/// The configuration for connecting to an S3-compatible object store.
///
/// With the `store-s3` cargo feature, this implements [`OpenStore`] to open an [`S3Store`].
///
/// [`OpenStore`]: crate::store::OpenStore
/// [`S3Store`]: crate::store::S3Store
#[derive(Debug, Clone, Deserialize)]
pub struct S3Config {
    /// The host of the service endpoint, optionally with a scheme like `http://localhost`.
    ///
    /// If there is no scheme, `https` is used.
    pub endpoint_host: String,

    /// The port of the service endpoint.
    #[serde(default)]
    pub endpoint_port: Option<u16>,

    /// The region used to sign requests.
    #[serde(default = "default_region")]
    pub region: String,

    /// The credentials to authenticate with.
    #[serde(default)]
    pub credentials: S3Credentials,

    /// Address buckets as a path segment rather than a subdomain.
    ///
    /// Local emulators of S3 usually need this.
    #[serde(default)]
    pub path_style: bool,

    /// Skip checking TLS certificates.
    #[serde(default)]
    pub disable_cert_checking: bool,
}

fn default_region() -> String {
    String::from(DEFAULT_REGION)
}

fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.is_empty())
}

fn env_flag(name: &str) -> crate::Result<bool> {
    match env_var(name) {
        None => Ok(false),
        Some(value) => value.parse::<bool>().map_err(|_| {
            crate::Error::Config(format!("{} must be 'true' or 'false', not {:?}.", name, value))
        }),
    }
}

impl S3Config {
    /// Read the configuration from environment variables.
    ///
    /// | Variable | Field |
    /// |---|---|
    /// | `S3_ENDPOINT_HOST` | `endpoint_host` (required) |
    /// | `S3_ENDPOINT_PORT` | `endpoint_port` |
    /// | `S3_REGION` | `region` |
    /// | `S3_ACCESS_KEY`, `S3_SECRET_KEY` | `credentials` |
    /// | `S3_PATH_STYLE` | `path_style` |
    /// | `S3_DISABLE_CERT_CHECKING` | `disable_cert_checking` |
    ///
    /// # Errors
    /// - `Error::Config`: A variable is missing or has an invalid value.
    pub fn from_env() -> crate::Result<Self> {
        let endpoint_host = env_var("S3_ENDPOINT_HOST")
            .ok_or_else(|| crate::Error::Config(String::from("S3_ENDPOINT_HOST is not set.")))?;
        let endpoint_port = env_var("S3_ENDPOINT_PORT")
            .map(|port| {
                port.parse::<u16>().map_err(|_| {
                    crate::Error::Config(format!("S3_ENDPOINT_PORT is not a valid port: {:?}.", port))
                })
            })
            .transpose()?;

        Ok(S3Config {
            endpoint_host,
            endpoint_port,
            region: env_var("S3_REGION").unwrap_or_else(default_region),
            credentials: S3Credentials::from_keys(
                env_var("S3_ACCESS_KEY"),
                env_var("S3_SECRET_KEY"),
            ),
            path_style: env_flag("S3_PATH_STYLE")?,
            disable_cert_checking: env_flag("S3_DISABLE_CERT_CHECKING")?,
        })
    }

    /// The URL of the service endpoint.
    pub fn endpoint_url(&self) -> String {
        let host = if self.endpoint_host.contains("://") {
            self.endpoint_host.clone()
        } else {
            format!("https://{}", self.endpoint_host)
        };
        match self.endpoint_port {
            Some(port) => format!("{}:{}", host.trim_end_matches('/'), port),
            None => host,
        }
    }
}
