use chrono::{Datelike, NaiveDate};
use crossterm::event::KeyCode;

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum DatePart {
    Year,
    Month,
    Day,
}

/// Keyboard date picker for an optional calendar date.
///
/// Dates before `min` are not selectable; typing one snaps to `min`. A date
/// already chosen is left alone when `min` moves.
pub struct DateInputState {
    pub date: Option<NaiveDate>,
    pub min: Option<NaiveDate>,
    pub editing: bool,
    pub date_part: DatePart,
    pub current_date_input: String,
}

impl DateInputState {
    pub fn new(date: Option<NaiveDate>) -> Self {
        Self {
            date,
            min: None,
            editing: false,
            date_part: DatePart::Year,
            current_date_input: String::new(),
        }
    }

    /// Start editing. An unset date starts from `fallback` (or `min`, if later).
    pub fn start_editing(&mut self, fallback: NaiveDate) {
        if self.date.is_none() {
            self.date = Some(self.clamp(fallback));
        }
        self.editing = true;
        self.date_part = DatePart::Year;
        self.current_date_input.clear();
    }

    pub fn stop_editing(&mut self) {
        self.editing = false;
        self.current_date_input.clear();
    }

    pub fn clear(&mut self) {
        self.date = None;
        self.stop_editing();
    }

    pub fn set_min(&mut self, min: Option<NaiveDate>) {
        self.min = min;
    }

    fn clamp(&self, date: NaiveDate) -> NaiveDate {
        match self.min {
            Some(min) if date < min => min,
            _ => date,
        }
    }

    pub fn next_date_part(&mut self) {
        self.date_part = match self.date_part {
            DatePart::Year => DatePart::Month,
            DatePart::Month => DatePart::Day,
            DatePart::Day => DatePart::Year,
        };
        self.current_date_input.clear();
    }

    pub fn previous_date_part(&mut self) {
        self.date_part = match self.date_part {
            DatePart::Year => DatePart::Day,
            DatePart::Month => DatePart::Year,
            DatePart::Day => DatePart::Month,
        };
        self.current_date_input.clear();
    }

    pub fn handle_input(&mut self, key: KeyCode) {
        if !self.editing {
            return;
        }
        let Some(date) = self.date else {
            return;
        };

        match key {
            KeyCode::Char(c) if c.is_ascii_digit() => {
                self.current_date_input.push(c);
                let width = match self.date_part {
                    DatePart::Year => 4,
                    DatePart::Month | DatePart::Day => 2,
                };
                if self.current_date_input.len() < width {
                    return;
                }

                let candidate = self.current_date_input.parse::<u32>().ok().and_then(|value| {
                    match self.date_part {
                        DatePart::Year if (1900..=2100).contains(&value) => {
                            NaiveDate::from_ymd_opt(value as i32, date.month(), date.day())
                        }
                        DatePart::Month => NaiveDate::from_ymd_opt(date.year(), value, date.day()),
                        DatePart::Day => NaiveDate::from_ymd_opt(date.year(), date.month(), value),
                        DatePart::Year => None,
                    }
                });
                if let Some(new_date) = candidate {
                    self.date = Some(self.clamp(new_date));
                }
                self.current_date_input.clear();
            }
            KeyCode::Backspace => {
                self.current_date_input.pop();
            }
            KeyCode::Right => self.next_date_part(),
            KeyCode::Left => self.previous_date_part(),
            _ => {}
        }
    }

    pub fn get_display_string(&self) -> String {
        let Some(date) = self.date else {
            return "Not set".to_string();
        };

        let (year, month, day) = (
            format!("{:04}", date.year()),
            format!("{:02}", date.month()),
            format!("{:02}", date.day()),
        );
        if !self.editing {
            return format!("{}-{}-{}", year, month, day);
        }

        let current_input = if !self.current_date_input.is_empty() {
            format!("[{}]", self.current_date_input)
        } else {
            match self.date_part {
                DatePart::Year => "[YYYY]".to_string(),
                DatePart::Month => "[MM]".to_string(),
                DatePart::Day => "[DD]".to_string(),
            }
        };

        match self.date_part {
            DatePart::Year => format!("{}{}-{}-{}", year, current_input, month, day),
            DatePart::Month => format!("{}-{}{}-{}", year, month, current_input, day),
            DatePart::Day => format!("{}-{}-{}{}", year, month, day, current_input),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn type_digits(state: &mut DateInputState, digits: &str) {
        for c in digits.chars() {
            state.handle_input(KeyCode::Char(c));
        }
    }

    #[test]
    fn typing_parts_sets_the_date() {
        let mut state = DateInputState::new(None);
        state.start_editing(ymd(2024, 1, 15));
        type_digits(&mut state, "2025");
        state.handle_input(KeyCode::Right);
        type_digits(&mut state, "06");
        state.handle_input(KeyCode::Right);
        type_digits(&mut state, "30");

        assert_eq!(state.date, Some(ymd(2025, 6, 30)));
    }

    #[test]
    fn impossible_day_is_ignored() {
        let mut state = DateInputState::new(Some(ymd(2023, 2, 10)));
        state.start_editing(ymd(2000, 1, 1));
        state.date_part = DatePart::Day;
        type_digits(&mut state, "29");

        assert_eq!(state.date, Some(ymd(2023, 2, 10)));
    }

    #[test]
    fn dates_before_min_snap_to_min() {
        let mut state = DateInputState::new(None);
        state.set_min(Some(ymd(2024, 5, 1)));
        state.start_editing(ymd(2024, 1, 1));
        assert_eq!(state.date, Some(ymd(2024, 5, 1)));

        state.date_part = DatePart::Month;
        type_digits(&mut state, "03");
        assert_eq!(state.date, Some(ymd(2024, 5, 1)));
    }

    #[test]
    fn raising_min_keeps_chosen_date() {
        let mut state = DateInputState::new(Some(ymd(2024, 2, 1)));
        state.set_min(Some(ymd(2024, 3, 1)));
        assert_eq!(state.date, Some(ymd(2024, 2, 1)));
    }

    #[test]
    fn display_marks_part_being_edited() {
        let mut state = DateInputState::new(Some(ymd(2024, 3, 7)));
        assert_eq!(state.get_display_string(), "2024-03-07");
        state.start_editing(ymd(2000, 1, 1));
        state.next_date_part();
        assert_eq!(state.get_display_string(), "2024-03[MM]-07");

        state.clear();
        assert_eq!(state.get_display_string(), "Not set");
    }
}
