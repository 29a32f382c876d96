// [apps/credential-proxy/src/providers/mod.rs]
pub mod llm;
pub mod registry;

pub use registry::{apply_auth, base_url, find, find_for_model, missing_required_fields, AuthScheme, ProviderSpec};
