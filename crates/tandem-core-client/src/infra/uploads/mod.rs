// tandem-core-client/tandem-core-client
//
// Copyright: 2024, Tandem Authors
// License: Mozilla Public License v2.0 (MPL v2.0)

pub use in_memory_attachment_service::InMemoryAttachmentService;

mod in_memory_attachment_service;
