//! Deterministic fingerprint for model artifacts, used in logs and `ModelInfo`.

/// 64-bit FNV-1a state. Not cryptographic; it only tells artifacts apart.
#[derive(Copy, Clone, Debug)]
pub struct Fingerprint(u64);

impl Fingerprint {
    const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;

    pub fn new() -> Self {
        Self(Self::OFFSET_BASIS)
    }

    /// Fingerprint a complete buffer in one go.
    pub fn of(bytes: &[u8]) -> Self {
        let mut fp = Self::new();
        fp.update(bytes);
        fp
    }

    pub fn update(&mut self, bytes: &[u8]) {
        for b in bytes {
            self.0 = (self.0 ^ u64::from(*b)).wrapping_mul(Self::PRIME);
        }
    }

    pub fn finish(&self) -> u64 {
        self.0
    }

    /// 16-character lowercase hex string.
    pub fn finish_hex(&self) -> String {
        format!("{:016x}", self.0)
    }
}

impl Default for Fingerprint {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_reference_vectors() {
        assert_eq!(Fingerprint::of(b"").finish(), 0xcbf2_9ce4_8422_2325);
        assert_eq!(Fingerprint::of(b"a").finish(), 0xaf63_dc4c_8601_ec8c);
    }

    #[test]
    fn incremental_equals_one_shot() {
        let mut fp = Fingerprint::new();
        fp.update(b"{\"name\":");
        fp.update(b"\"linear\"}");
        assert_eq!(fp.finish_hex(), Fingerprint::of(b"{\"name\":\"linear\"}").finish_hex());
        assert_eq!(fp.finish_hex().len(), 16);
    }
}
