pub mod gate;
pub mod token_codec;

pub use gate::BearerGate;
pub use token_codec::TokenCodec;
