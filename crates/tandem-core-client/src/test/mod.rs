// tandem-core-client/tandem-core-client
//
// Copyright: 2024, Tandem Authors
// License: Mozilla Public License v2.0 (MPL v2.0)

pub use constant_time_provider::ConstantTimeProvider;
pub use in_memory_environment::InMemoryEnvironment;
pub use incrementing_id_provider::IncrementingIdProvider;
pub use message_builder::MessageBuilder;
#[cfg(feature = "test")]
pub use mock_app_dependencies::MockAppDependencies;
pub use recording_delegate::RecordingDelegate;
