// tandem-core-client/tandem-core-client
//
// Copyright: 2024, Tandem Authors
// License: Mozilla Public License v2.0 (MPL v2.0)

pub use attachment_service::AttachmentService;

mod attachment_service;

#[cfg(feature = "test")]
pub mod mocks {
    pub use super::attachment_service::MockAttachmentService;
}
