pub mod serializer;
pub mod signer;
