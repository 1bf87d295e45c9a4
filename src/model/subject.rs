use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const MAX_SUBJECT_NAME: usize = 128;

/// A subject and its attended/total class counts.
///
/// `attended <= total` holds after every [`SubjectAction`]; the server and the
/// client board both mutate subjects only through [`Subject::apply`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::FromRow)]
pub struct Subject {
    #[schema(example = "5b2f0c2e-1d57-4bb1-9d8e-2d8b2c9a7f11")]
    pub id: String,
    #[schema(example = "Mathematics")]
    pub name: String,
    #[schema(example = 3)]
    pub attended: u32,
    #[schema(example = 4)]
    pub total: u32,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SubjectAction {
    MarkPresent,
    MarkAbsent,
    AddClass,
}

impl Subject {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            attended: 0,
            total: 0,
        }
    }

    /// Applies the action clamped to `0..=total`. Returns false when the
    /// clamp left the counts untouched.
    pub fn apply(&mut self, action: SubjectAction) -> bool {
        let before = (self.attended, self.total);
        match action {
            SubjectAction::MarkPresent => self.attended = self.attended.saturating_add(1).min(self.total),
            SubjectAction::MarkAbsent => self.attended = self.attended.saturating_sub(1),
            SubjectAction::AddClass => self.total = self.total.saturating_add(1),
        }
        before != (self.attended, self.total)
    }

    /// Attendance rounded to a whole percent, 0 when no class has been held.
    pub fn percentage(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        ((f64::from(self.attended) / f64::from(self.total)) * 100.0).round() as u32
    }
}

/// Trims and checks a subject name before it is stored.
pub fn normalize_name(raw: &str) -> Option<String> {
    let name = raw.trim();
    if name.is_empty() || name.chars().count() > MAX_SUBJECT_NAME {
        None
    } else {
        Some(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subject(attended: u32, total: u32) -> Subject {
        Subject {
            id: "1".into(),
            name: "Mathematics".into(),
            attended,
            total,
        }
    }

    #[test]
    fn present_increments_until_total() {
        for total in 0..6 {
            for attended in 0..=total {
                let mut s = subject(attended, total);
                s.apply(SubjectAction::MarkPresent);
                if attended < total {
                    assert_eq!(s.attended, attended + 1);
                } else {
                    assert_eq!(s.attended, total, "clamped at total");
                }
                assert_eq!(s.total, total);
            }
        }
    }

    #[test]
    fn absent_never_goes_below_zero() {
        let mut s = subject(0, 2);
        s.apply(SubjectAction::MarkAbsent);
        assert_eq!(s.attended, 0);

        let mut s = subject(2, 2);
        s.apply(SubjectAction::MarkAbsent);
        assert_eq!(s.attended, 1);
    }

    #[test]
    fn add_class_grows_total_only() {
        for attended in 0..4 {
            let mut s = subject(attended, 4);
            s.apply(SubjectAction::AddClass);
            assert_eq!(s.total, 5);
            assert_eq!(s.attended, attended);
        }
    }

    #[test]
    fn apply_reports_whether_counts_moved() {
        assert!(subject(0, 1).apply(SubjectAction::MarkPresent));
        assert!(!subject(1, 1).apply(SubjectAction::MarkPresent));
        assert!(!subject(0, 1).apply(SubjectAction::MarkAbsent));
        assert!(subject(1, 1).apply(SubjectAction::AddClass));
    }

    #[test]
    fn percentage_rounds_and_handles_empty() {
        assert_eq!(subject(0, 0).percentage(), 0);
        assert_eq!(subject(1, 3).percentage(), 33);
        assert_eq!(subject(2, 3).percentage(), 67);
        assert_eq!(subject(4, 4).percentage(), 100);
    }

    #[test]
    fn names_are_trimmed_and_bounded() {
        assert_eq!(normalize_name("  Physics "), Some("Physics".to_string()));
        assert_eq!(normalize_name("   "), None);
        assert_eq!(normalize_name(&"x".repeat(MAX_SUBJECT_NAME + 1)), None);
    }
}
