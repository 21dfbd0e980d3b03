//! Classification of raw AWS SDK errors into the shared [`RemoteError`] taxonomy.

use std::fmt;

use statewait::RemoteError;

const THROTTLING_MARKERS: &[&str] = &[
    "ThrottlingException",
    "Throttling",
    "TooManyRequestsException",
    "RequestLimitExceeded",
    "SlowDown",
];

/// Map an SDK error to the taxonomy the waiter and retry helpers understand.
///
/// `not_found_markers` and `retryable_markers` carry the per-service error
/// codes (and, where a service overloads one code, message fragments) that
/// identify those conditions; the throttling family is recognized for every
/// service. Matching on the debug rendering keeps this independent of each
/// service's generated error enums, the same way the error text is ultimately
/// what reaches the operator.
pub(crate) fn classify<E: fmt::Debug>(
    err: E,
    not_found_markers: &[&str],
    retryable_markers: &[&str],
) -> RemoteError {
    let text = format!("{err:?}");
    if not_found_markers.iter().any(|m| text.contains(m)) {
        return RemoteError::NotFound;
    }
    if THROTTLING_MARKERS
        .iter()
        .chain(retryable_markers)
        .any(|m| text.contains(m))
    {
        return RemoteError::Retryable(text);
    }
    RemoteError::Api(text)
}
