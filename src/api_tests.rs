// Copyright (c) 2025 hairpin-proxy contributors
// SPDX-License-Identifier: MIT

//! Unit tests for `api.rs`

#[cfg(test)]
mod tests {
    use crate::api::{bounded, is_conflict, is_not_found};
    use crate::constants::KUBE_LIST_PAGE_SIZE;
    use crate::errors::HairpinError;
    use std::time::Duration;

    fn api_error(code: u16, reason: &str) -> kube::Error {
        kube::Error::Api(
            kube::core::Status::failure(&format!("{reason} from test"), reason)
                .with_code(code)
                .boxed(),
        )
    }

    #[test]
    fn test_page_size_is_reasonable() {
        assert_eq!(KUBE_LIST_PAGE_SIZE, 100, "Page size should be 100");
    }

    #[test]
    fn test_404_is_not_found() {
        assert!(is_not_found(&api_error(404, "NotFound")));
        assert!(!is_not_found(&api_error(403, "Forbidden")));
        assert!(!is_not_found(&api_error(500, "InternalError")));
    }

    #[test]
    fn test_409_is_conflict() {
        assert!(is_conflict(&api_error(409, "Conflict")));
        assert!(!is_conflict(&api_error(404, "NotFound")));
    }

    #[tokio::test]
    async fn test_bounded_passes_through_result() {
        let value = bounded("quick call", Duration::from_secs(1), async {
            Ok::<_, HairpinError>(42)
        })
        .await
        .unwrap();

        assert_eq!(value, 42);
    }

    #[tokio::test]
    async fn test_bounded_times_out_stalled_call() {
        let result = bounded("stalled call", Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(10)).await;
            Ok::<_, HairpinError>(())
        })
        .await;

        match result {
            Err(HairpinError::Timeout { operation, .. }) => assert_eq!(operation, "stalled call"),
            other => panic!("expected timeout, got {other:?}"),
        }
    }
}
