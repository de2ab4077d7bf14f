// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Provider Infrastructure - Anti-Corruption Layer Implementations
//
// Each adapter translates between the `ProviderClient` domain interface and one
// family of third-party APIs, normalizing every failure into `ProviderFailure`.

pub mod chat_completion;
pub mod data_lookup;
pub mod registry;
pub mod text_inference;
pub mod transport;

pub use chat_completion::ChatCompletionClient;
pub use data_lookup::DataLookupClient;
pub use registry::ProviderRegistry;
pub use text_inference::TextInferenceClient;
