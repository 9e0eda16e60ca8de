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

use std::fmt;
use std::result;

use thiserror::Error as DeriveError;

/// A rule for bucket names which a candidate name violated.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NamingRule {
    /// The name does not begin and end with a letter or digit.
    Boundary,

    /// The name is formatted like an IPv4 address.
    IpAddress,

    /// The name contains two adjacent periods.
    AdjacentPeriods,

    /// The name starts with the reserved prefix `xn--`.
    ReservedPrefix,

    /// The name ends with the reserved suffix `-s3alias`.
    ReservedSuffix,

    /// The name contains characters other than lowercase letters, digits, `.` and `-`.
    ///
    /// This holds the distinct offending characters in sorted order.
    Charset(Vec<char>),
}

impl fmt::Display for NamingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamingRule::Boundary => write!(f, "must begin and end with a letter or number"),
            NamingRule::IpAddress => write!(f, "must not be formatted as an IP address"),
            NamingRule::AdjacentPeriods => write!(f, "must not contain two adjacent periods"),
            NamingRule::ReservedPrefix => write!(f, "must not start with the prefix 'xn--'"),
            NamingRule::ReservedSuffix => write!(f, "must not end with the suffix '-s3alias'"),
            NamingRule::Charset(invalid) => {
                let invalid = invalid.iter().collect::<String>();
                write!(f, "contains invalid characters {:?}", invalid)
            }
        }
    }
}

/// The error type for operations with a document store.
#[derive(Debug, DeriveError)]
pub enum Error {
    /// A bucket name does not satisfy the naming rules of the object store.
    #[error("The bucket name {name:?} is invalid: it {rule}.")]
    NamingViolation { name: String, rule: NamingRule },

    /// A resource was not found.
    #[error("A resource was not found: {0}")]
    NotFound(String),

    /// An element path passes through an element which is not a collection.
    #[error("The element path could not be resolved: {0}")]
    PathNotResolvable(String),

    /// The provided element path is invalid.
    #[error("The provided element path is invalid.")]
    InvalidPath,

    /// The operation is not supported for documents in an object store.
    #[error("This operation is not supported: {0}")]
    UnsupportedOperation(String),

    /// A document could not be serialized.
    #[error("A document could not be serialized.")]
    Serialize(#[source] serde_json::Error),

    /// A document could not be deserialized.
    #[error("A document could not be deserialized.")]
    Deserialize(#[source] serde_json::Error),

    /// A configuration value is invalid.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// An error occurred with the object store.
    #[error("The object store is unavailable: {0}")]
    StoreUnavailable(#[from] anyhow::Error),
}

/// The result type for operations with a document store.
pub type Result<T> = result::Result<T, Error>;
