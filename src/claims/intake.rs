// SPDX-License-Identifier: MIT

//! Query normalization and routing

/// Queries are cut to this many characters before routing
pub const MAX_QUERY_CHARS: usize = 1000;

pub const OHIP_TRIGGER: &str = "apply for ohip";

/// Where a chat query is sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    OhipWorkflow,
    Agent,
}

/// Trim and truncate to [`MAX_QUERY_CHARS`] characters
pub fn normalize_query(raw: &str) -> String {
    raw.trim().chars().take(MAX_QUERY_CHARS).collect()
}

pub fn is_ohip_application(query: &str) -> bool {
    query.to_lowercase().contains(OHIP_TRIGGER)
}

pub fn route(query: &str) -> Route {
    if is_ohip_application(query) {
        Route::OhipWorkflow
    } else {
        Route::Agent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_is_case_insensitive() {
        assert_eq!(route("Apply for OHIP please"), Route::OhipWorkflow);
        assert_eq!(route("i want to APPLY FOR ohip"), Route::OhipWorkflow);
        assert_eq!(route("what is ohip?"), Route::Agent);
        assert_eq!(route("apply for  ohip"), Route::Agent);
    }

    #[test]
    fn test_normalize_truncates_by_chars() {
        let long = "é".repeat(MAX_QUERY_CHARS + 50);
        let q = normalize_query(&long);
        assert_eq!(q.chars().count(), MAX_QUERY_CHARS);

        assert_eq!(normalize_query("  hello \n"), "hello");
    }

    #[test]
    fn test_trigger_past_limit_is_dropped() {
        let query = format!("{}apply for ohip", "x".repeat(MAX_QUERY_CHARS));
        assert_eq!(route(&normalize_query(&query)), Route::Agent);
    }
}
