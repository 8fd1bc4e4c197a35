pub mod codec;
pub mod extra;
pub mod factory;
pub mod options;
pub mod pipeline;
pub mod sources;

pub use codec::{BEARER_PREFIX, CodecError, TokenCodec};
pub use extra::{ExtraValidation, Rejection, RequireClaims};
pub use factory::build_auth_pipeline;
pub use options::AuthOptions;
pub use pipeline::{AuthError, AuthPipeline};
pub use sources::TokenSource;
