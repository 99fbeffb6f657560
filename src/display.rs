use crate::clock::{TimeFormatError, day_name, format_time, format_time_12h, next_hour, parse_time};
use crate::models::{Alarm, AlarmDraft, DAYS_PER_WEEK};
use std::collections::BTreeSet;
use std::fmt::Write;
use thiserror::Error;

pub const EMPTY_LIST: &str = "No alarms found! Add your first alarm.";
pub const DELETE_CONFIRMATION: &str =
    "Are you absolutely sure? This action will permanently delete your alarm and cannot be undone.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error(transparent)]
    Time(#[from] TimeFormatError),
    #[error("day {0} is out of range, expected 0 (Sunday) to 6 (Saturday)")]
    Day(u8),
}

pub fn format_days(days: &BTreeSet<u8>) -> String {
    if days.is_empty() {
        return "Once".to_string();
    }
    days.iter()
        .filter_map(|&day| day_name(day))
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlarmRow {
    pub id: i64,
    pub time: String,
    pub days: String,
    pub enabled: &'static str,
}

impl From<&Alarm> for AlarmRow {
    fn from(alarm: &Alarm) -> Self {
        Self {
            id: alarm.id,
            time: format_time_12h(alarm.hours, alarm.minutes),
            days: format_days(&alarm.days),
            enabled: if alarm.is_enabled { "on" } else { "off" },
        }
    }
}

pub fn render_table(alarms: &[Alarm]) -> String {
    if alarms.is_empty() {
        return format!("{EMPTY_LIST}\n");
    }

    let rows: Vec<AlarmRow> = alarms.iter().map(AlarmRow::from).collect();
    let id_width = rows
        .iter()
        .map(|row| id_label(row.id).len())
        .chain(["ID".len()])
        .max()
        .unwrap_or(2);
    let time_width = rows.iter().map(|row| row.time.len()).chain(["Time".len()]).max().unwrap_or(4);
    let days_width = rows.iter().map(|row| row.days.len()).chain(["Day(s)".len()]).max().unwrap_or(6);

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<id_width$}  {:<time_width$}  {:<days_width$}  Enabled",
        "ID", "Time", "Day(s)"
    );
    for row in &rows {
        let _ = writeln!(
            out,
            "{:<id_width$}  {:<time_width$}  {:<days_width$}  {}",
            id_label(row.id),
            row.time,
            row.days,
            row.enabled
        );
    }
    out
}

// Optimistic rows have no server id yet.
fn id_label(id: i64) -> String {
    if id < 0 { "-".to_string() } else { id.to_string() }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlarmForm {
    pub time: String,
    pub days: BTreeSet<u8>,
}

impl AlarmForm {
    pub fn for_new(current_hour: u8) -> Self {
        Self {
            time: format_time(next_hour(current_hour), 0),
            days: BTreeSet::new(),
        }
    }

    pub fn for_alarm(alarm: &Alarm) -> Self {
        Self {
            time: format_time(alarm.hours, alarm.minutes),
            days: alarm.days.clone(),
        }
    }

    pub fn set_time(&mut self, time: impl Into<String>) {
        self.time = time.into();
    }

    pub fn set_days(&mut self, days: impl IntoIterator<Item = u8>) {
        self.days = days.into_iter().collect();
    }

    pub fn toggle_day(&mut self, day: u8) {
        if !self.days.remove(&day) {
            self.days.insert(day);
        }
    }

    pub fn to_draft(&self, is_enabled: bool) -> Result<AlarmDraft, FormError> {
        let time = parse_time(&self.time)?;
        if let Some(&day) = self.days.iter().find(|&&day| day >= DAYS_PER_WEEK) {
            return Err(FormError::Day(day));
        }
        Ok(AlarmDraft {
            hours: time.hours,
            minutes: time.minutes,
            days: self.days.clone(),
            is_enabled,
        })
    }

    /// Full replacement for `alarm`, keeping its id and enabled flag.
    pub fn apply_to(&self, alarm: &Alarm) -> Result<Alarm, FormError> {
        Ok(self.to_draft(alarm.is_enabled)?.with_id(alarm.id))
    }
}
