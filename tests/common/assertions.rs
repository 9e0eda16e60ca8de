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

use std::fmt::Debug;

use shell_store::{Error, NamingRule};
use spectral::{AssertionFailure, Spec};

/// Assertions on the error variant of a `shell_store::Result`.
pub trait ErrorVariantAssertions {
    /// Check that the result is an error of the same variant as `expected_value`.
    ///
    /// Only the variant is compared, not the message.
    fn is_err_variant(&self, expected_value: Error);

    /// Check that the result is a naming violation of `expected_rule`.
    fn is_naming_violation(&self, expected_rule: NamingRule);
}

impl<'a, T> ErrorVariantAssertions for Spec<'a, shell_store::Result<T>>
where
    T: Debug,
{
    fn is_err_variant(&self, expected_value: Error) {
        match self.subject {
            Ok(ref value) => {
                AssertionFailure::from_spec(self)
                    .with_expected(format!("Err({:?})", expected_value))
                    .with_actual(format!("Ok({:?})", value))
                    .fail();
            }

            Err(ref error) => {
                if std::mem::discriminant(error) != std::mem::discriminant(&expected_value) {
                    AssertionFailure::from_spec(self)
                        .with_expected(format!("Err({:?})", &expected_value))
                        .with_actual(format!("Err({:?})", error))
                        .fail();
                }
            }
        }
    }

    fn is_naming_violation(&self, expected_rule: NamingRule) {
        match self.subject {
            Err(Error::NamingViolation { ref rule, .. }) if *rule == expected_rule => {}
            ref actual => {
                AssertionFailure::from_spec(self)
                    .with_expected(format!("Err(NamingViolation {{ rule: {:?}, .. }})", expected_rule))
                    .with_actual(format!("{:?}", actual))
                    .fail();
            }
        }
    }
}
