use crc32fast::Hasher;

/// Derive a stable numeric seed for a document from its storage key.
pub fn document_seed(key: &str) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(key.as_bytes());
    hasher.finalize()
}

/// Sequential id generator for nodes synthesized within one pipeline call.
///
/// Ids pack the document seed into the high bits and a per-call counter
/// into the low bits, so synthesized ids never collide with the small
/// integer ids builders assign themselves. Each pipeline call owns its own
/// generator; there is no process-wide counter.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    seed: u32,
    count: u32,
}

impl IdGenerator {
    pub fn new(key: &str) -> Self {
        Self {
            seed: document_seed(key),
            count: 0,
        }
    }

    pub fn from_seed(seed: u32) -> Self {
        Self { seed, count: 0 }
    }

    /// Generate the next sequential id.
    pub fn next_id(&mut self) -> u64 {
        self.count += 1;
        (u64::from(self.seed) << 32) | u64::from(self.count)
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }
}
