// tandem-core-client/tandem-core-client
//
// Copyright: 2024, Tandem Authors
// License: Mozilla Public License v2.0 (MPL v2.0)

use std::sync::Arc;

pub trait IdProvider: Send + Sync {
    fn new_id(&self) -> String;
}

impl<T: IdProvider + ?Sized> IdProvider for Arc<T> {
    fn new_id(&self) -> String {
        (**self).new_id()
    }
}
