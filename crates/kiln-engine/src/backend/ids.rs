use super::RawId;

/// Monotonic id source. Id 0 is never handed out.
#[derive(Debug, Default)]
pub(crate) struct IdAllocator {
    last: u32,
}

impl IdAllocator {
    pub(crate) fn next(&mut self) -> RawId {
        // u32 ids are not recycled; four billion objects per process is plenty.
        self.last = self.last.wrapping_add(1).max(1);
        RawId::new(self.last)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_start_at_one_and_increase() {
        let mut ids = IdAllocator::default();
        assert_eq!(ids.next(), RawId::new(1));
        assert_eq!(ids.next(), RawId::new(2));
    }
}
