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
use std::str::FromStr;

/// The separator between the short names in an element path.
pub const SEPARATOR: char = '/';

/// The address of an element in the element tree of a submodel.
///
/// A path is a non-empty sequence of short names leading from the top level of a submodel through
/// nested collections to the target element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementPath {
    segments: Vec<String>,
}

impl ElementPath {
    /// Parse a `/`-separated path.
    ///
    /// Leading, trailing and repeated separators are ignored, so `/a//b/` is the same as `a/b`.
    ///
    /// # Errors
    /// - `Error::InvalidPath`: The path has no segments.
    pub fn parse(path: &str) -> crate::Result<Self> {
        Self::from_segments(path.split(SEPARATOR).filter(|segment| !segment.is_empty()))
    }

    /// Create a path from its segments.
    ///
    /// # Errors
    /// - `Error::InvalidPath`: There are no segments or one of them is empty or contains a `/`.
    pub fn from_segments<I, S>(segments: I) -> crate::Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let segments = segments
            .into_iter()
            .map(|segment| segment.as_ref().to_owned())
            .collect::<Vec<_>>();
        let valid = |segment: &String| !segment.is_empty() && !segment.contains(SEPARATOR);
        if segments.is_empty() || !segments.iter().all(valid) {
            return Err(crate::Error::InvalidPath);
        }
        Ok(ElementPath { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The segments leading to the parent collection of the target.
    pub fn parent(&self) -> &[String] {
        &self.segments[..self.segments.len() - 1]
    }

    /// The short name of the target element.
    pub fn name(&self) -> &str {
        &self.segments[self.segments.len() - 1]
    }

    /// Return a new path which addresses the child `name` of this path's target.
    pub fn join(&self, name: &str) -> crate::Result<Self> {
        Self::from_segments(self.segments.iter().map(String::as_str).chain(Some(name)))
    }
}

impl FromStr for ElementPath {
    type Err = crate::Error;

    fn from_str(path: &str) -> crate::Result<Self> {
        Self::parse(path)
    }
}

impl fmt::Display for ElementPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}
