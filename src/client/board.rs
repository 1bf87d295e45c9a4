use crate::model::subject::{Subject, SubjectAction, normalize_name};

/// A subject as shown on a card, with the card's "mark present" toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectCard {
    pub subject: Subject,
    pub checked: bool,
    /// Whether checking this card actually added an attended class.
    counted: bool,
}

/// Local, possibly stale, reflection of the user's subjects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubjectBoard {
    cards: Vec<SubjectCard>,
}

impl SubjectBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_subjects(subjects: Vec<Subject>) -> Self {
        let mut board = Self::new();
        board.reconcile(subjects);
        board
    }

    pub fn cards(&self) -> &[SubjectCard] {
        &self.cards
    }

    pub fn get(&self, id: &str) -> Option<&SubjectCard> {
        self.cards.iter().find(|c| c.subject.id == id)
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut SubjectCard> {
        self.cards.iter_mut().find(|c| c.subject.id == id)
    }

    /// Flips the card's toggle.
    ///
    /// Checking marks the class attended unless attendance is already full.
    /// Unchecking only takes back a mark that checking actually added. Returns
    /// the action that changed the counts, or `None` when they stayed put
    /// (same toggle state, clamped check, or unknown id).
    pub fn set_checked(&mut self, id: &str, checked: bool) -> Option<SubjectAction> {
        let card = self.get_mut(id)?;
        if card.checked == checked {
            return None;
        }
        card.checked = checked;

        if checked {
            card.counted = card.subject.apply(SubjectAction::MarkPresent);
            card.counted.then_some(SubjectAction::MarkPresent)
        } else if std::mem::take(&mut card.counted) {
            card.subject.apply(SubjectAction::MarkAbsent);
            Some(SubjectAction::MarkAbsent)
        } else {
            None
        }
    }

    /// Counts one more held class and resets the toggle.
    pub fn add_class(&mut self, id: &str) -> bool {
        match self.get_mut(id) {
            Some(card) => {
                card.subject.apply(SubjectAction::AddClass);
                card.checked = false;
                card.counted = false;
                true
            }
            None => false,
        }
    }

    /// Adds a subject that only exists locally, for offline use.
    pub fn add_local_subject(&mut self, id: impl Into<String>, name: &str) -> Option<&SubjectCard> {
        let name = normalize_name(name)?;
        let id = id.into();
        if self.get(&id).is_some() {
            return None;
        }
        self.cards.push(SubjectCard {
            subject: Subject::new(id, name),
            checked: false,
            counted: false,
        });
        self.cards.last()
    }

    /// Replaces every subject with the authoritative list.
    ///
    /// Toggle state is local only, so it carries over for ids that survive.
    pub fn reconcile(&mut self, subjects: Vec<Subject>) {
        let cards = subjects
            .into_iter()
            .map(|subject| {
                let (checked, counted) = self
                    .get(&subject.id)
                    .map(|c| (c.checked, c.counted))
                    .unwrap_or_default();
                SubjectCard {
                    subject,
                    checked,
                    counted,
                }
            })
            .collect();
        self.cards = cards;
    }

    /// Restores a single card captured before an optimistic change.
    pub(crate) fn restore(&mut self, previous: SubjectCard) {
        if let Some(card) = self.get_mut(&previous.subject.id) {
            *card = previous;
        }
    }
}
