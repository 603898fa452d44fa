//! Per-triple reference bookkeeping

/// How a triple is currently known to a collection
///
/// A record only exists while `asserted` is set or `quote_count` is
/// non-zero; the two axes are independent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TripleRefs {
    pub(crate) asserted: bool,
    pub(crate) quote_count: usize,
}

impl TripleRefs {
    pub(crate) fn asserted() -> Self {
        Self {
            asserted: true,
            quote_count: 0,
        }
    }

    pub fn is_asserted(&self) -> bool {
        self.asserted
    }

    /// Number of quotation sites currently pointing at the triple
    pub fn quote_count(&self) -> usize {
        self.quote_count
    }

    pub fn is_quoted(&self) -> bool {
        self.quote_count > 0
    }

    /// Neither asserted nor quoted: the record must be dropped
    pub(crate) fn is_unreferenced(&self) -> bool {
        !self.asserted && self.quote_count == 0
    }

    /// Lifecycle state, or `None` for a record that should not exist
    pub fn state(&self) -> Option<TripleState> {
        match (self.asserted, self.quote_count > 0) {
            (true, false) => Some(TripleState::AssertedOnly),
            (true, true) => Some(TripleState::AssertedAndQuoted),
            (false, true) => Some(TripleState::QuotedOnly),
            (false, false) => None,
        }
    }

    pub fn has_status(&self, status: TripleStatus) -> bool {
        match status {
            TripleStatus::Asserted => self.is_asserted(),
            TripleStatus::Quoted => self.is_quoted(),
        }
    }
}

/// Lifecycle of a known triple. Absence is modelled by having no record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TripleState {
    AssertedOnly,
    AssertedAndQuoted,
    QuotedOnly,
}

/// Which partition of the index a lookup addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TripleStatus {
    Asserted,
    Quoted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_transitions() {
        let mut refs = TripleRefs::asserted();
        assert_eq!(refs.state(), Some(TripleState::AssertedOnly));

        refs.quote_count += 1;
        assert_eq!(refs.state(), Some(TripleState::AssertedAndQuoted));

        refs.asserted = false;
        assert_eq!(refs.state(), Some(TripleState::QuotedOnly));
        assert!(refs.has_status(TripleStatus::Quoted));
        assert!(!refs.has_status(TripleStatus::Asserted));

        refs.quote_count -= 1;
        assert!(refs.is_unreferenced());
        assert_eq!(refs.state(), None);
    }

    #[test]
    fn test_fresh_quote_record() {
        let mut refs = TripleRefs::default();
        assert!(refs.is_unreferenced());
        refs.quote_count += 1;
        assert_eq!(refs.quote_count(), 1);
        assert_eq!(refs.state(), Some(TripleState::QuotedOnly));
    }
}
