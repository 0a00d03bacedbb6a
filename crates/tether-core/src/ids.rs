use std::fmt;

use crate::error::{CoreError, CoreResult};

macro_rules! opaque_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub struct $name(pub u32);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u32> for $name {
            fn from(raw: u32) -> Self {
                Self(raw)
            }
        }
    };
}

opaque_id!(
    /// Opaque handle identifying one live player session.
    PlayerId
);
opaque_id!(
    /// Opaque handle identifying one in-flight network request.
    RequestId
);
opaque_id!(
    /// Opaque handle identifying one retained byte resource.
    ResourceId
);

/// Ids wrap at this modulus; the value itself is never handed out twice
/// while live.
pub const ID_MODULUS: u32 = u32::MAX;

/// Candidates probed before allocation gives up.
const MAX_PROBES: u32 = 65_536;

/// Bounded linear-probe id allocator.
///
/// Keeps a rolling cursor and skips any candidate still present in the
/// caller's store. Running out of candidates is a fatal
/// [`TooManyLiveHandles`](CoreError::TooManyLiveHandles) — a colliding id is
/// never returned.
#[derive(Debug, Default)]
pub struct IdAllocator {
    cursor: u32,
}

impl IdAllocator {
    #[must_use]
    pub const fn new() -> Self {
        Self { cursor: 0 }
    }

    /// Next free id, where `contains` reports whether a candidate is live.
    ///
    /// # Errors
    ///
    /// [`CoreError::TooManyLiveHandles`] when every probed candidate is live.
    pub fn next(&mut self, contains: impl Fn(u32) -> bool) -> CoreResult<u32> {
        for _ in 0..MAX_PROBES {
            let candidate = self.cursor;
            self.cursor = (self.cursor + 1) % ID_MODULUS;
            if !contains(candidate) {
                return Ok(candidate);
            }
        }
        Err(CoreError::TooManyLiveHandles)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn allocates_sequentially_when_store_is_empty() {
        let mut alloc = IdAllocator::new();
        let ids: Vec<u32> = (0..4).map(|_| alloc.next(|_| false).unwrap()).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
    }

    #[test]
    fn skips_live_ids() {
        let mut alloc = IdAllocator::new();
        let live: HashSet<u32> = [0, 1, 3].into_iter().collect();
        assert_eq!(alloc.next(|id| live.contains(&id)).unwrap(), 2);
        assert_eq!(alloc.next(|id| live.contains(&id)).unwrap(), 4);
    }

    #[test]
    fn never_returns_a_live_id_under_churn() {
        let mut alloc = IdAllocator::new();
        let mut live = HashSet::new();
        for round in 0..10_000u32 {
            let id = alloc.next(|id| live.contains(&id)).unwrap();
            assert!(live.insert(id), "id {id} handed out while live");
            // Free roughly half the entries as we go.
            if round % 2 == 0 {
                let victim = *live.iter().next().unwrap();
                live.remove(&victim);
            }
        }
    }

    #[test]
    fn wraps_at_the_modulus() {
        let mut alloc = IdAllocator { cursor: ID_MODULUS - 1 };
        assert_eq!(alloc.next(|_| false).unwrap(), ID_MODULUS - 1);
        assert_eq!(alloc.next(|_| false).unwrap(), 0);
    }

    #[test]
    fn exhaustion_is_fatal_not_a_collision() {
        let mut alloc = IdAllocator::new();
        assert_eq!(
            alloc.next(|_| true),
            Err(CoreError::TooManyLiveHandles),
        );
    }
}
