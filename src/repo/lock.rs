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

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use weak_table::WeakValueHashMap;

/// A table of locks which serializes writes to each document.
///
/// Every change to a document reads the whole object, changes it in memory and writes the whole
/// object back. Holding the lock for a document across those steps keeps two writers in this
/// process from overwriting each other's changes. Writers in other processes are not coordinated.
///
/// The table only holds weak references, so the lock for a document goes away once no writer is
/// using it.
#[derive(Debug)]
pub struct WriteLocks {
    locks: Mutex<WeakValueHashMap<String, Weak<Mutex<()>>>>,
}

impl WriteLocks {
    /// Create an empty `WriteLocks`.
    pub fn new() -> Self {
        WriteLocks {
            locks: Mutex::new(WeakValueHashMap::new()),
        }
    }

    /// Return the lock for the document `identifier`, creating it if nobody holds it.
    fn lock_for(&self, identifier: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        match locks.get(identifier) {
            Some(lock) => lock,
            None => {
                let lock = Arc::new(Mutex::new(()));
                locks.insert(identifier.to_owned(), Arc::clone(&lock));
                lock
            }
        }
    }

    /// Run `f` while holding the write lock for the document `identifier`.
    ///
    /// The lock is not reentrant; `f` must not take the lock for the same document again.
    pub fn with_lock<T>(&self, identifier: &str, f: impl FnOnce() -> T) -> T {
        let lock = self.lock_for(identifier);
        let _guard: MutexGuard<'_, ()> = lock.lock().unwrap_or_else(PoisonError::into_inner);
        f()
    }
}

impl Default for WriteLocks {
    fn default() -> Self {
        Self::new()
    }
}
