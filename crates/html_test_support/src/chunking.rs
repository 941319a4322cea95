//! Deterministic and seeded chunk plans for streaming-parity tests.
//!
//! A plan splits one input into consecutive chunks. Text plans only cut at
//! `char` boundaries; byte plans may cut inside multi-byte sequences.

use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoundaryPolicy {
    /// Cuts only at `char` boundaries.
    Utf8Aligned,
    /// Cuts anywhere.
    ByteStream,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChunkPlan {
    /// Chunks of `size` bytes (the last one may be shorter).
    Fixed { size: usize },
    /// Cut before each listed byte offset.
    Boundaries { indices: Vec<usize> },
}

impl fmt::Display for ChunkPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChunkPlan::Fixed { size } => write!(f, "fixed size={size}"),
            ChunkPlan::Boundaries { indices } => {
                write!(f, "boundaries count={} at={indices:?}", indices.len())
            }
        }
    }
}

impl ChunkPlan {
    /// Byte offsets where chunks start (excluding 0), within `len`.
    fn cuts(&self, len: usize) -> Vec<usize> {
        match self {
            ChunkPlan::Fixed { size } => (1..)
                .map(|i| i * (*size).max(1))
                .take_while(|&cut| cut < len)
                .collect(),
            ChunkPlan::Boundaries { indices } => {
                let mut cuts: Vec<usize> = indices
                    .iter()
                    .copied()
                    .filter(|&cut| cut > 0 && cut < len)
                    .collect();
                cuts.sort_unstable();
                cuts.dedup();
                cuts
            }
        }
    }

    /// Split bytes at every cut.
    pub fn split_bytes<'a>(&self, input: &'a [u8]) -> Vec<&'a [u8]> {
        let mut chunks = Vec::new();
        let mut start = 0;
        for cut in self.cuts(input.len()) {
            chunks.push(&input[start..cut]);
            start = cut;
        }
        chunks.push(&input[start..]);
        chunks
    }

    /// Split text, skipping cuts that would land inside a `char`.
    pub fn split_str<'a>(&self, input: &'a str) -> Vec<&'a str> {
        let mut chunks = Vec::new();
        let mut start = 0;
        for cut in self.cuts(input.len()) {
            if !input.is_char_boundary(cut) {
                continue;
            }
            chunks.push(&input[start..cut]);
            start = cut;
        }
        chunks.push(&input[start..]);
        chunks
    }
}

#[derive(Clone, Debug)]
pub struct ChunkPlanCase {
    pub label: String,
    pub plan: ChunkPlan,
}

/// Fixed-size plans, a plan cutting around every markup delimiter, and
/// `fuzz_runs` seeded random plans.
pub fn build_chunk_plans(
    input: &str,
    fuzz_runs: usize,
    fuzz_seed: u64,
    policy: BoundaryPolicy,
) -> Vec<ChunkPlanCase> {
    let mut plans = Vec::new();
    for size in [1usize, 2, 3, 5, 8, 16, 64] {
        plans.push(ChunkPlanCase {
            label: format!("fixed size={size}"),
            plan: ChunkPlan::Fixed { size },
        });
    }

    let markup = markup_boundaries(input);
    if !markup.is_empty() {
        plans.push(ChunkPlanCase {
            label: format!("markup-boundaries count={}", markup.len()),
            plan: ChunkPlan::Boundaries {
                indices: markup.clone(),
            },
        });
    }

    let mut candidates: Vec<usize> = match policy {
        BoundaryPolicy::Utf8Aligned => input
            .char_indices()
            .map(|(index, _)| index)
            .filter(|&index| index != 0)
            .collect(),
        BoundaryPolicy::ByteStream => (1..input.len()).collect(),
    };
    candidates.extend(markup);
    candidates.sort_unstable();
    candidates.dedup();

    for run in 0..fuzz_runs {
        let seed = fuzz_seed.wrapping_add(run as u64);
        let mut rng = Lcg::new(seed);
        let mut picks = candidates.clone();
        rng.shuffle(&mut picks);
        let count = 1 + rng.gen_range(picks.len().clamp(1, 32));
        picks.truncate(count);
        picks.sort_unstable();
        plans.push(ChunkPlanCase {
            label: format!("fuzz seed=0x{seed:016x}"),
            plan: ChunkPlan::Boundaries { indices: picks },
        });
    }
    plans
}

/// Offsets just before and after `<`, `>`, `/`, `=`, quotes and newlines.
fn markup_boundaries(input: &str) -> Vec<usize> {
    let bytes = input.as_bytes();
    let mut out = Vec::new();
    for (i, &b) in bytes.iter().enumerate() {
        if matches!(b, b'<' | b'>' | b'/' | b'=' | b'"' | b'\'' | b'\n') {
            if i > 0 {
                out.push(i);
            }
            if i + 1 < bytes.len() {
                out.push(i + 1);
            }
        }
    }
    out.sort_unstable();
    out.dedup();
    out
}

/// Small deterministic generator; reproducible across platforms.
#[derive(Clone, Debug)]
pub struct Lcg {
    state: u64,
}

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        self.state
    }

    /// Uniform-ish value in `0..upper`; 0 when `upper` is 0.
    pub fn gen_range(&mut self, upper: usize) -> usize {
        if upper == 0 {
            return 0;
        }
        (self.next_u64() >> 32) as usize % upper
    }

    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.gen_range(i + 1);
            items.swap(i, j);
        }
    }
}
