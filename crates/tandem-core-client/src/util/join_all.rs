// tandem-core-client/tandem-core-client
//
// Copyright: 2024, Tandem Authors
// License: Mozilla Public License v2.0 (MPL v2.0)

use std::future::Future;

/// Runs futures concurrently in production and serially in tests, so that mock
/// expectations are consumed in a deterministic order.
pub async fn join_all<I>(iter: I) -> Vec<<I::Item as Future>::Output>
where
    I: IntoIterator,
    I::Item: Future,
{
    #[cfg(feature = "test")]
    {
        let mut results = Vec::new();
        for future in iter.into_iter() {
            results.push(future.await);
        }
        results
    }
    #[cfg(not(feature = "test"))]
    {
        futures::future::join_all(iter).await
    }
}
