use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::MatchResult;
use crate::models::ScoreMatrix;

/// Serializable account of one finished matching run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchReport {
    #[serde(rename = "generatedAt")]
    pub generated_at: DateTime<Utc>,
    pub population: usize,
    #[serde(rename = "proposalsMade")]
    pub proposals_made: usize,
    pub pairs: Vec<ReportedPair>,
    #[serde(rename = "unmatchedProposers")]
    pub unmatched_proposers: Vec<ReportedParticipant>,
    #[serde(rename = "unmatchedAcceptors")]
    pub unmatched_acceptors: Vec<ReportedParticipant>,
}

/// One matched pair; `score` is the proposer-side matrix entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportedPair {
    pub proposer: usize,
    pub acceptor: usize,
    #[serde(
        rename = "proposerName",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub proposer_name: Option<String>,
    #[serde(
        rename = "acceptorName",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub acceptor_name: Option<String>,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportedParticipant {
    pub index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl MatchReport {
    /// Assemble a report from a match result, resolving names when the
    /// population came from a roster.
    pub fn new(result: &MatchResult, matrix: &ScoreMatrix, names: Option<&[String]>) -> Self {
        let name_of = |index: usize| names.and_then(|all| all.get(index)).cloned();
        let describe = |index: usize| ReportedParticipant {
            index,
            name: name_of(index),
        };

        let pairs = result
            .pairs
            .iter()
            .map(|pair| ReportedPair {
                proposer: pair.proposer,
                acceptor: pair.acceptor,
                proposer_name: name_of(pair.proposer),
                acceptor_name: name_of(pair.acceptor),
                score: matrix.score(pair.proposer, pair.acceptor),
            })
            .collect();

        Self {
            generated_at: Utc::now(),
            population: matrix.size(),
            proposals_made: result.proposals_made,
            pairs,
            unmatched_proposers: result
                .unmatched_proposers
                .iter()
                .copied()
                .map(describe)
                .collect(),
            unmatched_acceptors: result
                .unmatched_acceptors
                .iter()
                .copied()
                .map(describe)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MatchPair;

    #[test]
    fn test_report_resolves_names_and_scores() {
        let matrix = ScoreMatrix::from_rows(vec![
            vec![0.0, 0.0, 0.75],
            vec![0.0, 0.0, 0.0],
            vec![0.75, 0.0, 0.0],
        ])
        .unwrap();
        let result = MatchResult {
            pairs: vec![MatchPair {
                proposer: 0,
                acceptor: 2,
            }],
            unmatched_proposers: vec![1],
            unmatched_acceptors: vec![],
            proposals_made: 2,
        };
        let names = vec!["Ada".to_string(), "Brook".to_string(), "Casey".to_string()];

        let report = MatchReport::new(&result, &matrix, Some(&names));
        assert_eq!(report.population, 3);
        assert_eq!(report.proposals_made, 2);
        assert_eq!(report.pairs[0].proposer_name.as_deref(), Some("Ada"));
        assert_eq!(report.pairs[0].acceptor_name.as_deref(), Some("Casey"));
        assert_eq!(report.pairs[0].score, 0.75);
        assert_eq!(report.unmatched_proposers[0].name.as_deref(), Some("Brook"));
    }

    #[test]
    fn test_report_serializes_camel_case() {
        let matrix = ScoreMatrix::from_rows(vec![vec![0.0, 1.0], vec![1.0, 0.0]]).unwrap();
        let result = MatchResult {
            pairs: vec![MatchPair {
                proposer: 0,
                acceptor: 1,
            }],
            unmatched_proposers: vec![],
            unmatched_acceptors: vec![],
            proposals_made: 1,
        };

        let report = MatchReport::new(&result, &matrix, None);
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"generatedAt\""));
        assert!(json.contains("\"proposalsMade\""));
        assert!(json.contains("\"unmatchedProposers\""));
        // Names are omitted entirely when the population is anonymous
        assert!(!json.contains("proposerName"));
    }
}
