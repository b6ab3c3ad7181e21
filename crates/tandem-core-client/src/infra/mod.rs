// tandem-core-client/tandem-core-client
//
// Copyright: 2024, Tandem Authors
// License: Mozilla Public License v2.0 (MPL v2.0)

pub mod conversations;
pub mod general;
pub mod messaging;
pub mod typing;
pub mod uploads;
