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

use crate::store::ObjectStore;

/// A value which can be used to open an `ObjectStore`.
pub trait OpenStore {
    /// The type of `ObjectStore` which this value can be used to open.
    type Store: ObjectStore + 'static;

    /// Open a connection to an object store of type `Store`.
    ///
    /// This does not create any buckets.
    ///
    /// # Errors
    /// - `Error::Config`: The configuration is invalid.
    /// - `Error::StoreUnavailable`: A client for the object store could not be created.
    fn open(&self) -> crate::Result<Self::Store>;
}
