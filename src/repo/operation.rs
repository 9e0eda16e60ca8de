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

use serde_json::Value;
use static_assertions::assert_obj_safe;

/// A transport which runs operations on the endpoint they delegate to.
///
/// Stored documents cannot run operations themselves, so an operation can only be invoked if it
/// names an `invokable` endpoint and a delegate is configured to call it.
pub trait OperationDelegate: fmt::Debug + Send + Sync {
    /// Invoke the operation at the endpoint `invokable` with `arguments` and return its result.
    ///
    /// # Errors
    /// - `Error::StoreUnavailable`: The endpoint could not be reached.
    fn invoke(&self, invokable: &str, arguments: &[Value]) -> crate::Result<Value>;
}

assert_obj_safe!(OperationDelegate);
