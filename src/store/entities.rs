use std::fmt::Display;

use chrono::NaiveDate;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

/// A member of the team. Contributors log daily entries, managers read the
/// rollups.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
pub struct RepEntity {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub role: RepRole,
}

impl RepEntity {
    pub fn new(name: impl Into<String>, role: RepRole) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            role,
        }
    }
}

#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum RepRole {
    #[default]
    Contributor,
    Manager,
}

impl Display for RepRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RepRole::Contributor => write!(f, "contributor"),
            RepRole::Manager => write!(f, "manager"),
        }
    }
}

/// One rep's goals and actuals for one calendar date. The (rep, date) pair is
/// the natural key; the store keeps at most one entity per pair. Dates
/// serialize as ISO `YYYY-MM-DD` strings.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
pub struct DailyEntryEntity {
    pub rep_id: Uuid,
    pub date: NaiveDate,
    #[serde(default)]
    pub goal_dials: Option<u32>,
    #[serde(default)]
    pub goal_prospects: Option<u32>,
    #[serde(default)]
    pub goal_sets_new_biz: Option<u32>,
    #[serde(default)]
    pub goal_sets_expansion: Option<u32>,
    /// Combined sets goal carried over from older sheets. Reducers derive the
    /// total from the two split fields and never read this one.
    #[serde(default)]
    pub goal_sets_total: Option<u32>,
    #[serde(default)]
    pub goal_sqos: Option<u32>,
    #[serde(default)]
    pub actual_dials: Option<u32>,
    #[serde(default)]
    pub actual_prospects: Option<u32>,
    #[serde(default)]
    pub actual_sets_new_biz: Option<u32>,
    #[serde(default)]
    pub actual_sets_expansion: Option<u32>,
    #[serde(default)]
    pub actual_sqos: Option<u32>,
    #[serde(default)]
    pub focus_text: Option<String>,
    #[serde(default)]
    pub wins: Option<String>,
    #[serde(default)]
    pub blockers: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl DailyEntryEntity {
    pub fn new(rep_id: Uuid, date: NaiveDate) -> Self {
        Self {
            rep_id,
            date,
            goal_dials: None,
            goal_prospects: None,
            goal_sets_new_biz: None,
            goal_sets_expansion: None,
            goal_sets_total: None,
            goal_sqos: None,
            actual_dials: None,
            actual_prospects: None,
            actual_sets_new_biz: None,
            actual_sets_expansion: None,
            actual_sqos: None,
            focus_text: None,
            wins: None,
            blockers: None,
            notes: None,
        }
    }

    /// Replaces the whole goal section. Saving goals writes every goal field,
    /// clearing the ones the update leaves blank.
    pub fn apply_goals(&mut self, update: GoalUpdate) {
        self.goal_dials = update.dials;
        self.goal_prospects = update.prospects;
        self.goal_sets_new_biz = update.sets_new_biz;
        self.goal_sets_expansion = update.sets_expansion;
        self.goal_sets_total = update.sets_total;
        self.goal_sqos = update.sqos;
        self.focus_text = update.focus_text;
    }

    /// Replaces the whole actual section, same semantics as [Self::apply_goals].
    pub fn apply_actuals(&mut self, update: ActualUpdate) {
        self.actual_dials = update.dials;
        self.actual_prospects = update.prospects;
        self.actual_sets_new_biz = update.sets_new_biz;
        self.actual_sets_expansion = update.sets_expansion;
        self.actual_sqos = update.sqos;
        self.wins = update.wins;
        self.blockers = update.blockers;
        self.notes = update.notes;
    }
}

/// The morning half of a standup entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoalUpdate {
    pub dials: Option<u32>,
    pub prospects: Option<u32>,
    pub sets_new_biz: Option<u32>,
    pub sets_expansion: Option<u32>,
    pub sets_total: Option<u32>,
    pub sqos: Option<u32>,
    pub focus_text: Option<String>,
}

/// The end-of-day half of a standup entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActualUpdate {
    pub dials: Option<u32>,
    pub prospects: Option<u32>,
    pub sets_new_biz: Option<u32>,
    pub sets_expansion: Option<u32>,
    pub sqos: Option<u32>,
    pub wins: Option<String>,
    pub blockers: Option<String>,
    pub notes: Option<String>,
}
