//! Asynchronous decoder seam

use crate::types::{DecodedAudio, LoadGeneration};

/// Bytes to decode, tagged with the load that asked for them
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeRequest {
    pub generation: LoadGeneration,
    pub bytes: Vec<u8>,
}

/// Outcome of one decode
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeCompletion {
    /// Generation copied from the request
    pub generation: LoadGeneration,

    /// Decoded audio, or why decoding failed
    pub result: std::result::Result<DecodedAudio, String>,
}

/// Platform decoder
///
/// Decoding is the only asynchronous step: `submit` starts it and returns at
/// once, the finished result is picked up later through `poll`. Requests may
/// complete in any order; the engine drops completions for superseded loads.
pub trait Decoder: Send {
    /// Start decoding
    fn submit(&mut self, request: DecodeRequest);

    /// Next finished decode, if any
    fn poll(&mut self) -> Option<DecodeCompletion>;
}
