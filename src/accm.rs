// 256-bit membership test selecting which octets must be escape-sequenced
// on the wire. Bit `c & 7` of byte `c >> 3`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accm([u8; 32]);

impl Accm {
    pub fn none() -> Self {
        Self([0u8; 32])
    }

    pub fn default_escaping() -> Self {
        let mut map = Self::none();
        for c in 0x00u8..=0x1F {
            map.set(c);
        }
        map.set(0x7D);
        map.set(0x7E);
        map
    }

    pub fn set(&mut self, c: u8) {
        self.0[(c >> 3) as usize] |= 1 << (c & 7);
    }

    pub fn clear(&mut self, c: u8) {
        self.0[(c >> 3) as usize] &= !(1 << (c & 7));
    }

    #[inline]
    pub fn escape_p(&self, c: u8) -> bool {
        self.0[(c >> 3) as usize] & (1 << (c & 7)) != 0
    }

    // Forces 0x7D and 0x7E back on: a negotiated ACCM can never stop
    // escaping the framing bytes themselves.
    pub fn from_raw(bytes: [u8; 32]) -> Self {
        let mut map = Self(bytes);
        map.set(0x7D);
        map.set(0x7E);
        map
    }

    pub fn as_raw(&self) -> &[u8; 32] {
        &self.0
    }
}

impl Default for Accm {
    fn default() -> Self {
        Self::default_escaping()
    }
}
