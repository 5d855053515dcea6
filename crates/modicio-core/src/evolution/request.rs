//! Request compilation
//!
//! A request is a single string of statements separated by `,` or `&`.
//! A statement written `forward/backward` carries its own inverse.

/// One request segment, split into its forward and optional backward half
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementPair {
    pub forward: String,
    pub backward: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompiledRequest {
    pairs: Vec<StatementPair>,
}

impl CompiledRequest {
    pub fn pairs(&self) -> &[StatementPair] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// True when every segment carries a backward half
    pub fn is_self_inverse(&self) -> bool {
        self.pairs.iter().all(|p| p.backward.is_some())
    }

    /// Statements to execute, in execution order
    ///
    /// Forward: every forward half in request order. Backward: the backward
    /// halves in reverse request order; forward-only segments contribute
    /// nothing.
    pub fn statements(&self, backward: bool) -> Vec<&str> {
        let halves: Vec<&str> = if backward {
            self.pairs
                .iter()
                .rev()
                .filter_map(|p| p.backward.as_deref())
                .collect()
        } else {
            self.pairs.iter().map(|p| p.forward.as_str()).collect()
        };
        halves.into_iter().filter(|s| !s.is_empty()).collect()
    }
}

pub fn compile_request(request: &str) -> CompiledRequest {
    let pairs = request
        .split([',', '&'])
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(|segment| match segment.split_once('/') {
            Some((forward, backward)) => StatementPair {
                forward: forward.trim().to_string(),
                backward: Some(backward.trim().to_string()),
            },
            None => StatementPair {
                forward: segment.to_string(),
                backward: None,
            },
        })
        .collect();
    CompiledRequest { pairs }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_and_backward_order() {
        let request = compile_request("CREATE CLASS A/DELETE CLASS A, OPEN CLASS A/CLOSE CLASS A");
        assert_eq!(request.len(), 2);
        assert!(request.is_self_inverse());
        assert_eq!(request.statements(false), vec!["CREATE CLASS A", "OPEN CLASS A"]);
        assert_eq!(request.statements(true), vec!["CLOSE CLASS A", "DELETE CLASS A"]);
    }

    #[test]
    fn test_ampersand_is_a_segment_boundary() {
        let request = compile_request("CREATE CLASS A & CREATE CLASS B,,  ");
        assert_eq!(request.statements(false), vec!["CREATE CLASS A", "CREATE CLASS B"]);
    }

    #[test]
    fn test_forward_only_segments_skip_backward() {
        let request = compile_request("CREATE CLASS A, CREATE CLASS B/DELETE CLASS B");
        assert!(!request.is_self_inverse());
        assert_eq!(request.statements(true), vec!["DELETE CLASS B"]);
    }

    #[test]
    fn test_empty_backward_half_is_skipped() {
        let request = compile_request("OPEN CLASS A/");
        assert_eq!(request.statements(false), vec!["OPEN CLASS A"]);
        assert!(request.statements(true).is_empty());
    }
}
