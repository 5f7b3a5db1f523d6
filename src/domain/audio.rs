/// Encoded audio returned by one synthesis call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioChunk(pub Vec<u8>);

impl AudioChunk {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for AudioChunk {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

/// Join per-chunk audio into one buffer, in order.
///
/// MP3 is a stream of self-contained frames, so byte concatenation yields a
/// playable file without re-encoding. This does not hold for containers
/// with a global header such as WAV.
pub fn concat_audio(chunks: Vec<AudioChunk>) -> Vec<u8> {
    let total: usize = chunks.iter().map(AudioChunk::len).sum();
    let mut merged = Vec::with_capacity(total);
    for chunk in chunks {
        merged.extend(chunk.0);
    }
    merged
}
