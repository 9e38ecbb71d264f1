/// Derivation of a post's aggregate metrics from its vote ledger.
///
/// Pure and deterministic so it can be exercised without a datastore; the
/// storage layer calls it inside the vote transaction and the aggregate
/// calls it when a post is first built.
use crate::models::{Vote, VoteDirection};

/// Aggregate metrics derived from a vote ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteTally {
    pub score: i64,
    pub upvote_percentage: i32,
}

/// Recomputes `score` and `upvotePercentage` from the current ledger.
///
/// `score` is the signed sum of directions. `upvotePercentage` is the
/// integer share of upvotes (truncated), 0 when the ledger is empty.
pub fn recompute(votes: &[Vote]) -> VoteTally {
    if votes.is_empty() {
        return VoteTally {
            score: 0,
            upvote_percentage: 0,
        };
    }

    let score: i64 = votes.iter().map(|v| i64::from(v.direction.value())).sum();
    let upvotes = votes
        .iter()
        .filter(|v| v.direction == VoteDirection::Up)
        .count();
    let upvote_percentage = (upvotes * 100 / votes.len()) as i32;

    VoteTally {
        score,
        upvote_percentage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn ledger(directions: &[VoteDirection]) -> Vec<Vote> {
        directions
            .iter()
            .map(|&direction| Vote {
                user_id: Uuid::new_v4(),
                direction,
            })
            .collect()
    }

    #[test]
    fn empty_ledger_yields_zeroes() {
        assert_eq!(
            recompute(&[]),
            VoteTally {
                score: 0,
                upvote_percentage: 0
            }
        );
    }

    #[test]
    fn all_upvotes_is_full_percentage() {
        let votes = ledger(&[VoteDirection::Up, VoteDirection::Up, VoteDirection::Up]);
        assert_eq!(
            recompute(&votes),
            VoteTally {
                score: 3,
                upvote_percentage: 100
            }
        );
    }

    #[test]
    fn even_split_is_half() {
        let votes = ledger(&[VoteDirection::Up, VoteDirection::Down]);
        assert_eq!(
            recompute(&votes),
            VoteTally {
                score: 0,
                upvote_percentage: 50
            }
        );
    }

    #[test]
    fn percentage_truncates() {
        // 1 of 3 positive -> 33, not 33.33.
        let votes = ledger(&[VoteDirection::Up, VoteDirection::Down, VoteDirection::Down]);
        assert_eq!(
            recompute(&votes),
            VoteTally {
                score: -1,
                upvote_percentage: 33
            }
        );
    }

    #[test]
    fn score_is_the_sum_of_directions() {
        let votes = ledger(&[
            VoteDirection::Up,
            VoteDirection::Up,
            VoteDirection::Down,
            VoteDirection::Up,
        ]);
        let tally = recompute(&votes);
        let expected: i64 = votes.iter().map(|v| i64::from(v.direction.value())).sum();
        assert_eq!(tally.score, expected);
        assert_eq!(tally.score, 2);
    }
}
