// tandem-core-client/tandem-core-integration-tests
//
// Copyright: 2024, Tandem Authors
// License: Mozilla Public License v2.0 (MPL v2.0)

use std::time::Duration;

mod client;
mod composer;
mod conversation_controller;
mod timeline_renderer;

/// Lets spawned background work (mark-as-read, typing publishes) run.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(10)).await
}
