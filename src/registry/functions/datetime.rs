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

//! Date functions
//!
//! `date(text)` produces an opaque host value; ordering and equality of
//! dates come from the comparison operators through
//! [`HostObject::host_cmp`](crate::model::HostObject::host_cmp).

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};

use super::text_argument;
use crate::evaluator::{EvaluationError, EvaluationResult};
use crate::model::Value;
use crate::registry::{Language, function};

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// `date(text)`
pub fn datetime_functions() -> Language {
    function("date", |_, args| {
        let text = text_argument("date", args)?;
        parse_date(text.trim()).map(Value::host)
    })
}

/// Parse RFC 3339 or one of the plain layouts
///
/// Layouts without an offset are read as UTC.
pub fn parse_date(text: &str) -> EvaluationResult<DateTime<FixedOffset>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Ok(parsed);
    }
    let utc = Utc.fix();
    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| utc.from_utc_datetime(&naive))
        .ok_or_else(|| {
            EvaluationError::invalid_argument("date", format!("cannot parse {text:?} as a date"))
        })
}
