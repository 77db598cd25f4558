// Copyright 2024 OctoFHIR Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Optional capabilities of host-supplied values
//!
//! Host data the engine knows nothing about opts into accessor resolution by
//! implementing [`HostObject`]. Each capability is optional: the default
//! methods report "not supported" and resolution moves on to the next capability.
//!
//! ```
//! use octofhir_expr::model::{HostObject, Value};
//! use octofhir_expr::evaluator::{Context, EvaluationResult};
//! use std::any::Any;
//!
//! #[derive(Debug)]
//! struct Greeter {
//!     hello: String,
//! }
//!
//! impl std::fmt::Display for Greeter {
//!     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
//!         write!(f, "Greeter({})", self.hello)
//!     }
//! }
//!
//! impl HostObject for Greeter {
//!     fn type_name(&self) -> &str {
//!         "Greeter"
//!     }
//!
//!     fn get_field(&self, name: &str) -> Option<Value> {
//!         (name == "Hello").then(|| Value::from(self.hello.as_str()))
//!     }
//!
//!     fn call_method(
//!         &self,
//!         _context: &Context,
//!         name: &str,
//!         _args: &[Value],
//!     ) -> Option<EvaluationResult<Value>> {
//!         (name == "World").then(|| Ok(Value::from("world!")))
//!     }
//!
//!     fn as_any(&self) -> &dyn Any {
//!         self
//!     }
//! }
//!
//! let value = octofhir_expr::evaluate(
//!     "Hello + World()",
//!     &Value::host(Greeter { hello: "hello ".into() }),
//! )
//! .unwrap();
//! assert_eq!(value.to_string(), "hello world!");
//! ```

use chrono::{DateTime, Datelike, FixedOffset, Timelike};
use std::any::Any;
use std::cmp::Ordering;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use super::value::Value;
use crate::evaluator::{Context, EvaluationError, EvaluationResult};

/// Host value that the accessor resolver can query
pub trait HostObject: Any + fmt::Debug + fmt::Display + Send + Sync {
    /// Shape name reported in resolution errors
    fn type_name(&self) -> &str;

    /// Mapping-like lookup by string key
    fn get_key(&self, _key: &str) -> Option<Value> {
        None
    }

    /// Record-like lookup of an accessible field
    fn get_field(&self, _name: &str) -> Option<Value> {
        None
    }

    /// Invoke a named operation
    ///
    /// Returns `None` when the operation does not exist. Long-running
    /// operations should observe `context` for cancellation.
    fn call_method(
        &self,
        _context: &Context,
        _name: &str,
        _args: &[Value],
    ) -> Option<EvaluationResult<Value>> {
        None
    }

    /// Structural equality with another host object
    fn host_eq(&self, _other: &dyn HostObject) -> bool {
        false
    }

    /// Ordering against another host object, if the two are comparable
    fn host_cmp(&self, _other: &dyn HostObject) -> Option<Ordering> {
        None
    }

    /// Upcast for downcasting to the concrete type
    fn as_any(&self) -> &dyn Any;
}

/// Shared handle to a host object
#[derive(Clone)]
pub struct HostValue(Arc<dyn HostObject>);

impl HostValue {
    /// Wrap a host object
    pub fn new<T: HostObject>(object: T) -> Self {
        Self(Arc::new(object))
    }

    /// Downcast to the concrete host type
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref::<T>()
    }
}

impl Deref for HostValue {
    type Target = dyn HostObject;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

impl PartialEq for HostValue {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || self.0.host_eq(other.0.as_ref())
    }
}

impl fmt::Debug for HostValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.0.as_ref(), f)
    }
}

impl fmt::Display for HostValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.0.as_ref(), f)
    }
}

impl HostObject for DateTime<FixedOffset> {
    fn type_name(&self) -> &str {
        "datetime"
    }

    fn call_method(
        &self,
        _context: &Context,
        name: &str,
        args: &[Value],
    ) -> Option<EvaluationResult<Value>> {
        let value = match name {
            "Year" => Value::from(self.year()),
            "Month" => Value::from(self.month()),
            "Day" => Value::from(self.day()),
            "Hour" => Value::from(self.hour()),
            "Minute" => Value::from(self.minute()),
            "Second" => Value::from(self.second()),
            "Unix" => Value::from(self.timestamp()),
            "Format" => {
                return Some(match args {
                    [Value::String(pattern)] => Ok(Value::from(self.format(pattern).to_string())),
                    _ => Err(EvaluationError::InvalidArgument {
                        function: "Format".to_string(),
                        message: "expects a single format string".to_string(),
                    }),
                });
            }
            _ => return None,
        };
        Some(Ok(value))
    }

    fn host_eq(&self, other: &dyn HostObject) -> bool {
        other
            .as_any()
            .downcast_ref::<DateTime<FixedOffset>>()
            .is_some_and(|other| self == other)
    }

    fn host_cmp(&self, other: &dyn HostObject) -> Option<Ordering> {
        other
            .as_any()
            .downcast_ref::<DateTime<FixedOffset>>()
            .map(|other| self.cmp(other))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
