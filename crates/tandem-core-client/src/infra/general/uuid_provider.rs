// tandem-core-client/tandem-core-client
//
// Copyright: 2024, Tandem Authors
// License: Mozilla Public License v2.0 (MPL v2.0)

use uuid::Uuid;

use crate::domain::general::services::IdProvider;

#[derive(Default)]
pub struct UuidProvider {}

impl IdProvider for UuidProvider {
    fn new_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}
