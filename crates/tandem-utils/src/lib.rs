// tandem-core-client/tandem-utils
//
// Copyright: 2024, Tandem Authors
// License: Mozilla Public License v2.0 (MPL v2.0)

mod id_string_macro;
