//! Salesperson identity and progression state.

use chrono::NaiveDate;
use serde::Serialize;

/// A member of the sales team.
///
/// `level` and `xp_total` are mutated only through the record-action
/// transaction; `xp_total` never decreases. Rows are soft-deactivated,
/// never deleted.
#[derive(Debug, Clone, Serialize)]
pub struct Salesperson {
    pub id: i64,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub level: u32,
    pub xp_total: i64,
    pub avatar: String,
    pub joined_on: NaiveDate,
    pub active: bool,
}

/// Onboarding data for a new salesperson.
#[derive(Debug, Clone)]
pub struct NewSalesperson {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub avatar: String,
    /// Starting level, normally 1; seeds may backfill progressed rosters.
    pub level: u32,
    pub xp_total: i64,
}

impl NewSalesperson {
    pub fn new(name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
            email: None,
            avatar: "🎯".to_string(),
            level: 1,
            xp_total: 0,
        }
    }
}
