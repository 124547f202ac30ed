use crate::config::RosterError;

/// The list of the enumerators (interviewers) proposed as the first question of every form.
pub const ROSTER_LIST: &str = "enumerators_list";

/// One enumerator, as listed by the roster.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RosterEntry {
    pub code: String,
    pub label: String,
}

impl RosterEntry {
    pub fn new(code: impl Into<String>, label: impl Into<String>) -> RosterEntry {
        RosterEntry {
            code: code.into(),
            label: label.into(),
        }
    }
}

/// A source of enumerators.
///
/// The roster is fetched once, before any line is compiled. A failure aborts the
/// compilation.
pub trait RosterProvider {
    /// Returns the enumerators, in display order. The list should not be empty.
    fn fetch_enumerators(&self) -> Result<Vec<RosterEntry>, RosterError>;
}

/// A roster known in advance.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct StaticRoster {
    entries: Vec<RosterEntry>,
}

impl StaticRoster {
    pub fn new(entries: Vec<RosterEntry>) -> StaticRoster {
        StaticRoster { entries }
    }
}

impl RosterProvider for StaticRoster {
    fn fetch_enumerators(&self) -> Result<Vec<RosterEntry>, RosterError> {
        if self.entries.is_empty() {
            return Err("the roster does not list any enumerator".into());
        }
        Ok(self.entries.clone())
    }
}
