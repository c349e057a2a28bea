use serde::{Deserialize, Serialize};

use crate::constants::NUM_HIGH_SCORE_ENTRIES;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct HighScoreEntry {
    pub name: String,
    pub score: i32,
}

/// One per episode; kept sorted highest score first, always exactly
/// `NUM_HIGH_SCORE_ENTRIES` entries long.
pub type HighScoreList = Vec<HighScoreEntry>;

fn insertion_spot(score: i32, list: &HighScoreList) -> Option<usize> {
    list.iter().position(|entry| entry.score <= score)
}

/// A score makes the list if it is positive and beats (or ties) any existing
/// entry.
pub fn score_qualifies(score: i32, list: &HighScoreList) -> bool {
    score > 0 && insertion_spot(score, list).is_some()
}

/// Inserts a new score at its rank, pushing lower entries down and dropping
/// the last one. Does nothing if the score does not qualify.
pub fn insert_new_score(score: i32, name: String, list: &mut HighScoreList) {
    if let Some(spot) = insertion_spot(score, list) {
        list.pop();
        list.insert(spot, HighScoreEntry { name, score });
    }
}

/// An empty list of all-zero entries, the state before anyone has played.
pub fn empty_high_score_list() -> HighScoreList {
    vec![HighScoreEntry::default(); NUM_HIGH_SCORE_ENTRIES]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_list() -> HighScoreList {
        (0..NUM_HIGH_SCORE_ENTRIES)
            .map(|rank| HighScoreEntry {
                name: format!("PLAYER {rank}"),
                score: (NUM_HIGH_SCORE_ENTRIES - rank) as i32 * 1000,
            })
            .collect()
    }

    #[test]
    fn zero_score_never_qualifies() {
        assert!(!score_qualifies(0, &empty_high_score_list()));
    }

    #[test]
    fn any_positive_score_qualifies_for_an_empty_list() {
        assert!(score_qualifies(1, &empty_high_score_list()));
    }

    #[test]
    fn score_below_the_whole_list_does_not_qualify() {
        let list = filled_list();
        assert!(!score_qualifies(500, &list));
        assert!(score_qualifies(1000, &list), "ties qualify");
        assert!(score_qualifies(50_000, &list));
    }

    #[test]
    fn insert_keeps_list_length_and_order() {
        let mut list = filled_list();
        insert_new_score(5500, "NEWCOMER".to_string(), &mut list);

        assert_eq!(list.len(), NUM_HIGH_SCORE_ENTRIES);
        assert_eq!(list[5].name, "NEWCOMER");
        assert_eq!(list[5].score, 5500);
        assert!(
            list.windows(2).all(|pair| pair[0].score >= pair[1].score),
            "list must stay sorted"
        );
    }

    #[test]
    fn top_score_goes_first_and_drops_the_last_entry() {
        let mut list = filled_list();
        let previous_last = list.last().cloned().unwrap();

        insert_new_score(1_000_000, "CHAMPION".to_string(), &mut list);

        assert_eq!(list[0].name, "CHAMPION");
        assert!(!list.contains(&previous_last));
    }

    #[test]
    fn non_qualifying_score_leaves_list_untouched() {
        let mut list = filled_list();
        let before = list.clone();
        insert_new_score(1, "TOO LOW".to_string(), &mut list);
        assert_eq!(list, before);
    }
}
