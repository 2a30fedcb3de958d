//! Parameters for the contraction algorithm

/// Parameters for the contraction algorithm
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContractionParams {
    /// Maximum number of nodes settled by a single witness search. Hitting
    /// the limit counts as "no witness", which only costs extra shortcuts.
    pub(crate) witness_search_limit: Option<usize>,
}

impl ContractionParams {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn witness_search_limit(mut self, limit: usize) -> Self {
        self.witness_search_limit = Some(limit);
        self
    }

    pub fn unlimited_witness_search(mut self) -> Self {
        self.witness_search_limit = None;
        self
    }

    pub fn limit(&self) -> Option<usize> {
        self.witness_search_limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder() {
        assert_eq!(ContractionParams::new().limit(), None);
        assert_eq!(
            ContractionParams::new().witness_search_limit(50).limit(),
            Some(50)
        );
        assert_eq!(
            ContractionParams::new()
                .witness_search_limit(50)
                .unlimited_witness_search()
                .limit(),
            None
        );
    }
}
