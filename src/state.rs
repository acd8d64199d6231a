use std::collections::VecDeque;

use crate::store::PredictionRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Groups,
    Matchups,
    Board,
}

/// What the bottom input line is currently capturing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    None,
    /// Editing the session user id.
    User(String),
    /// Editing a score for the selected matchup, e.g. "2-1".
    Score(String),
}

const LOG_CAPACITY: usize = 50;

pub struct AppState {
    pub screen: Screen,
    pub group_names: Vec<String>,
    pub selected_group: usize,
    pub matchups: Vec<(String, String)>,
    pub selected_matchup: usize,
    pub board: Vec<PredictionRow>,
    pub board_scroll: usize,
    pub user_id: String,
    pub input: InputMode,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            screen: Screen::Groups,
            group_names: Vec::new(),
            selected_group: 0,
            matchups: Vec::new(),
            selected_matchup: 0,
            board: Vec::new(),
            board_scroll: 0,
            user_id: String::new(),
            input: InputMode::None,
            logs: VecDeque::new(),
            help_overlay: false,
        }
    }

    pub fn push_log(&mut self, message: impl Into<String>) {
        if self.logs.len() >= LOG_CAPACITY {
            self.logs.pop_front();
        }
        self.logs.push_back(message.into());
    }

    pub fn current_group(&self) -> Option<&str> {
        self.group_names.get(self.selected_group).map(String::as_str)
    }

    pub fn current_matchup(&self) -> Option<&(String, String)> {
        self.matchups.get(self.selected_matchup)
    }

    /// The active user's prediction for a matchup, if already on the board.
    pub fn board_entry(&self, home: &str, away: &str) -> Option<&PredictionRow> {
        self.board
            .iter()
            .find(|row| row.user_id == self.user_id && row.home == home && row.away == away)
    }

    pub fn select_next(&mut self) {
        match self.screen {
            Screen::Groups => bump(&mut self.selected_group, self.group_names.len(), 1),
            Screen::Matchups => bump(&mut self.selected_matchup, self.matchups.len(), 1),
            Screen::Board => bump(&mut self.board_scroll, self.board.len(), 1),
        }
    }

    pub fn select_prev(&mut self) {
        match self.screen {
            Screen::Groups => bump(&mut self.selected_group, self.group_names.len(), -1),
            Screen::Matchups => bump(&mut self.selected_matchup, self.matchups.len(), -1),
            Screen::Board => bump(&mut self.board_scroll, self.board.len(), -1),
        }
    }
}

fn bump(index: &mut usize, len: usize, delta: isize) {
    if len == 0 {
        *index = 0;
        return;
    }
    let next = if delta < 0 {
        index.saturating_sub(delta.unsigned_abs())
    } else {
        index.saturating_add(delta as usize)
    };
    *index = next.min(len - 1);
}

/// Parse a score entry such as "2-1" or "2:1" into (home, visitor) goals.
/// Any non-digit run separates the two numbers; anything other than exactly
/// two numbers is rejected.
pub fn parse_score_entry(raw: &str) -> Option<(u32, u32)> {
    let mut nums = raw
        .split(|ch: char| !ch.is_ascii_digit())
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<u32>());
    let home = nums.next()?.ok()?;
    let visitor = nums.next()?.ok()?;
    if nums.next().is_some() {
        return None;
    }
    Some((home, visitor))
}

#[cfg(test)]
mod tests {
    use super::{AppState, Screen, parse_score_entry};
    use crate::store::PredictionRow;

    #[test]
    fn parse_score_entry_accepts_common_shapes() {
        assert_eq!(parse_score_entry("2-1"), Some((2, 1)));
        assert_eq!(parse_score_entry("0:0"), Some((0, 0)));
        assert_eq!(parse_score_entry(" 10 - 3 "), Some((10, 3)));
        assert_eq!(parse_score_entry("3"), None);
        assert_eq!(parse_score_entry("1-2-3"), None);
        assert_eq!(parse_score_entry("ab"), None);
        assert_eq!(parse_score_entry(""), None);
    }

    #[test]
    fn selection_clamps_to_list_bounds() {
        let mut state = AppState::new();
        state.screen = Screen::Groups;
        state.group_names = vec!["A".to_string(), "B".to_string()];

        state.select_prev();
        assert_eq!(state.selected_group, 0);
        state.select_next();
        state.select_next();
        state.select_next();
        assert_eq!(state.selected_group, 1);
    }

    #[test]
    fn selection_is_safe_on_empty_lists() {
        let mut state = AppState::new();
        state.screen = Screen::Matchups;
        state.select_next();
        state.select_prev();
        assert_eq!(state.selected_matchup, 0);
    }

    #[test]
    fn board_entry_matches_active_user_only() {
        let mut state = AppState::new();
        state.user_id = "ana".to_string();
        state.board = vec![
            PredictionRow {
                user_id: "ana".to_string(),
                home: "Spain".to_string(),
                away: "Italy".to_string(),
                home_score: 2,
                visitor_score: 0,
            },
            PredictionRow {
                user_id: "bob".to_string(),
                home: "Spain".to_string(),
                away: "Croatia".to_string(),
                home_score: 1,
                visitor_score: 1,
            },
        ];

        assert!(state.board_entry("Spain", "Italy").is_some());
        assert!(state.board_entry("Spain", "Croatia").is_none());
    }
}
