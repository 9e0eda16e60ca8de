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

use std::collections::BTreeSet;
use std::fmt;

use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::NamingRule;

/// The maximum length of a bucket name.
pub const MAX_BUCKET_NAME_LENGTH: usize = 63;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

static IPV4_ADDRESS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(25[0-5]|(2[0-4]|1\d|[1-9])?\d)(\.(25[0-5]|(2[0-4]|1\d|[1-9])?\d)){3}$").unwrap()
});

/// A family of documents which is stored in its own bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BucketFamily {
    /// Shell documents.
    Shells,

    /// Submodel documents.
    Submodels,
}

impl BucketFamily {
    /// The name of this family as it appears in generated bucket names.
    pub fn as_str(&self) -> &'static str {
        match self {
            BucketFamily::Shells => "shells",
            BucketFamily::Submodels => "submodels",
        }
    }
}

impl fmt::Display for BucketFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Turn `candidate` into a bucket name the object store will accept.
///
/// Runs of whitespace are replaced with a single `-`, the name is cut to
/// [`MAX_BUCKET_NAME_LENGTH`] characters and lower-cased, and the result is checked with
/// [`validate_bucket_name`].
///
/// If `candidate` is `None`, a name of the form `<yyyyMMddHHmmssSSS>-<family>-bucket` is generated
/// from the current time.
///
/// # Errors
/// - `Error::NamingViolation`: The normalized name still breaks one of the naming rules.
pub fn normalize_bucket_name(candidate: Option<&str>, family: BucketFamily) -> crate::Result<String> {
    let candidate = match candidate {
        Some(candidate) => candidate.to_owned(),
        None => {
            let timestamp = Utc::now().format("%Y%m%d%H%M%S%3f");
            let generated = format!("{}-{}-bucket", timestamp, family);
            tracing::info!(bucket = %generated, "No bucket name configured, generated one.");
            generated
        }
    };

    let collapsed = WHITESPACE.replace_all(&candidate, "-");
    let truncated = collapsed
        .chars()
        .take(MAX_BUCKET_NAME_LENGTH)
        .collect::<String>();
    let normalized = truncated.to_lowercase();

    validate_bucket_name(&normalized)?;
    Ok(normalized)
}

/// Check that `name` satisfies the bucket naming rules of the object store.
///
/// The rules are checked in a fixed order and the first one which is broken is reported.
///
/// # Errors
/// - `Error::NamingViolation`: The name breaks one of the naming rules.
pub fn validate_bucket_name(name: &str) -> crate::Result<()> {
    let violation = |rule| {
        Err(crate::Error::NamingViolation {
            name: name.to_owned(),
            rule,
        })
    };

    let alphanumeric = |c: Option<char>| c.map_or(false, |c| c.is_ascii_alphanumeric());
    if !alphanumeric(name.chars().next()) || !alphanumeric(name.chars().last()) {
        return violation(NamingRule::Boundary);
    }

    if IPV4_ADDRESS.is_match(name) {
        return violation(NamingRule::IpAddress);
    }

    if name.contains("..") {
        return violation(NamingRule::AdjacentPeriods);
    }

    if name.starts_with("xn--") {
        return violation(NamingRule::ReservedPrefix);
    }

    if name.ends_with("-s3alias") {
        return violation(NamingRule::ReservedSuffix);
    }

    let invalid = name
        .chars()
        .filter(|&c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || c == '.' || c == '-'))
        .collect::<BTreeSet<_>>();
    if !invalid.is_empty() {
        return violation(NamingRule::Charset(invalid.into_iter().collect()));
    }

    Ok(())
}
