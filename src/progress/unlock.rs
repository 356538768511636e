use serde::Serialize;

use crate::progress::ProgressMap;

/// Observable state of one quiz slot for one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum QuizState {
    Locked,
    Unlocked,
    Failed,
    Passed,
}

/// Whether lesson or quiz `item_number` (1-indexed) is accessible.
///
/// Item 1 is always unlocked. Item N unlocks when quiz N-1 has a passed
/// entry — lessons are gated on the *quiz* before them, there is no separate
/// lesson-completion signal. Missing or malformed entries count as not
/// passed.
pub fn is_unlocked(item_number: i32, progress: &ProgressMap) -> bool {
    if item_number <= 1 {
        return true;
    }
    progress
        .get(&(item_number - 1))
        .is_some_and(|entry| entry.passed)
}

/// Collapses the unlock rule and the stored entry for a quiz into its state.
/// `Passed` is terminal from the product's point of view; the submit route
/// refuses further submissions once a quiz reaches it.
pub fn quiz_state(quiz_number: i32, progress: &ProgressMap) -> QuizState {
    if !is_unlocked(quiz_number, progress) {
        return QuizState::Locked;
    }
    match progress.get(&quiz_number) {
        Some(entry) if entry.passed => QuizState::Passed,
        Some(_) => QuizState::Failed,
        None => QuizState::Unlocked,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::progress::ProgressEntry;

    fn entry(passed: bool) -> ProgressEntry {
        ProgressEntry {
            passed,
            answers: vec![],
            pace: 10,
            completed_at: None,
        }
    }

    #[test]
    fn first_item_always_unlocked() {
        let empty = ProgressMap::new();
        assert!(is_unlocked(1, &empty));

        let mut failed_everything = ProgressMap::new();
        failed_everything.insert(1, entry(false));
        assert!(is_unlocked(1, &failed_everything));
    }

    #[test]
    fn item_unlocks_only_on_predecessor_pass() {
        let mut progress = ProgressMap::new();
        assert!(!is_unlocked(2, &progress));

        progress.insert(1, entry(false));
        assert!(!is_unlocked(2, &progress));

        progress.insert(1, entry(true));
        assert!(is_unlocked(2, &progress));
        // passing quiz 1 says nothing about item 3
        assert!(!is_unlocked(3, &progress));
    }

    #[test]
    fn unrelated_entries_do_not_unlock() {
        let mut progress = ProgressMap::new();
        progress.insert(5, entry(true));
        assert!(!is_unlocked(2, &progress));
        assert!(is_unlocked(6, &progress));
    }

    #[test]
    fn state_machine_per_slot() {
        let mut progress = ProgressMap::new();
        assert_eq!(quiz_state(1, &progress), QuizState::Unlocked);
        assert_eq!(quiz_state(2, &progress), QuizState::Locked);

        progress.insert(1, entry(false));
        assert_eq!(quiz_state(1, &progress), QuizState::Failed);
        assert_eq!(quiz_state(2, &progress), QuizState::Locked);

        progress.insert(1, entry(true));
        assert_eq!(quiz_state(1, &progress), QuizState::Passed);
        assert_eq!(quiz_state(2, &progress), QuizState::Unlocked);
    }
}
