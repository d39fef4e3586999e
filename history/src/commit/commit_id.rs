use rand::{rngs::StdRng, Rng, SeedableRng};

use ecs_history_serde::{ByteReader, ByteWrite, ConstByteLength, Serde, SerdeErr};

// CommitId
/// Identifies a commit in a history chain: two independent random halves,
/// unique without any coordination between replicas.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommitId {
    pub part1: u64,
    pub part2: u64,
}

impl CommitId {
    /// Base of the first commit of every chain
    pub const ROOT: CommitId = CommitId { part1: 0, part2: 0 };

    pub const fn new(part1: u64, part2: u64) -> Self {
        Self { part1, part2 }
    }

    pub fn is_root(&self) -> bool {
        *self == Self::ROOT
    }
}

impl Serde for CommitId {
    fn ser(&self, writer: &mut dyn ByteWrite) {
        self.part1.ser(writer);
        self.part2.ser(writer);
    }

    fn de(reader: &mut ByteReader) -> Result<Self, SerdeErr> {
        let part1 = u64::de(reader)?;
        let part2 = u64::de(reader)?;
        Ok(Self { part1, part2 })
    }

    fn byte_length(&self) -> u32 {
        <Self as ConstByteLength>::const_byte_length()
    }
}

impl ConstByteLength for CommitId {
    fn const_byte_length() -> u32 {
        16
    }
}

// CommitIdGenerator
pub struct CommitIdGenerator {
    rng: StdRng,
}

impl CommitIdGenerator {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible sequence, for tests and simulations
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Next id, never `CommitId::ROOT`
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> CommitId {
        loop {
            let id = CommitId::new(self.rng.gen(), self.rng.gen());
            if !id.is_root() {
                return id;
            }
        }
    }
}

impl Default for CommitIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
