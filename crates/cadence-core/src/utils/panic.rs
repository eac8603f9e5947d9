// Copyright 2025 eraflo
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

//! Helpers for reporting panics caught at thread boundaries.

use std::any::Any;

/// Extracts a readable message from a panic payload.
///
/// Payloads produced by `panic!` are either `&'static str` or `String`;
/// anything else is reported generically.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic;

    #[test]
    fn extracts_static_str_payload() {
        let payload = panic::catch_unwind(|| panic!("boom")).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "boom");
    }

    #[test]
    fn extracts_formatted_payload() {
        let id = 3;
        let payload = panic::catch_unwind(|| panic!("worker {id} failed")).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "worker 3 failed");
    }

    #[test]
    fn reports_unknown_payloads() {
        let payload = panic::catch_unwind(|| panic::panic_any(42u32)).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "non-string panic payload");
    }
}
