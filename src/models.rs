use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// Weekday numbers run from 0 (Sunday) to 6 (Saturday).
pub const DAYS_PER_WEEK: u8 = 7;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("hours must be less than 24")]
    Hours,
    #[error("minutes must be less than 60")]
    Minutes,
    #[error("days must be between 0 and 6")]
    Day,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlarmDraft {
    pub hours: u8,
    pub minutes: u8,
    #[serde(default)]
    pub days: BTreeSet<u8>,
    pub is_enabled: bool,
}

impl AlarmDraft {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.hours >= 24 {
            return Err(ValidationError::Hours);
        }
        if self.minutes >= 60 {
            return Err(ValidationError::Minutes);
        }
        if self.days.iter().any(|&day| day >= DAYS_PER_WEEK) {
            return Err(ValidationError::Day);
        }
        Ok(())
    }

    pub fn is_one_shot(&self) -> bool {
        self.days.is_empty()
    }

    pub fn with_id(self, id: i64) -> Alarm {
        Alarm {
            id,
            hours: self.hours,
            minutes: self.minutes,
            days: self.days,
            is_enabled: self.is_enabled,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alarm {
    pub id: i64,
    pub hours: u8,
    pub minutes: u8,
    #[serde(default)]
    pub days: BTreeSet<u8>,
    pub is_enabled: bool,
}

impl Alarm {
    pub fn draft(&self) -> AlarmDraft {
        AlarmDraft {
            hours: self.hours,
            minutes: self.minutes,
            days: self.days.clone(),
            is_enabled: self.is_enabled,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.draft().validate()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmIdBody {
    pub id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppData {
    pub next_id: i64,
    pub alarms: BTreeMap<i64, AlarmDraft>,
}

impl Default for AppData {
    fn default() -> Self {
        Self {
            next_id: 1,
            alarms: BTreeMap::new(),
        }
    }
}

impl AppData {
    pub fn insert(&mut self, draft: AlarmDraft) -> i64 {
        let id = self.next_id.max(1);
        self.next_id = id + 1;
        self.alarms.insert(id, draft);
        id
    }

    pub fn list(&self) -> Vec<Alarm> {
        self.alarms
            .iter()
            .map(|(&id, draft)| draft.clone().with_id(id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(hours: u8, minutes: u8, days: &[u8]) -> AlarmDraft {
        AlarmDraft {
            hours,
            minutes,
            days: days.iter().copied().collect(),
            is_enabled: true,
        }
    }

    #[test]
    fn validate_rejects_out_of_range_fields() {
        assert_eq!(draft(24, 0, &[]).validate(), Err(ValidationError::Hours));
        assert_eq!(draft(7, 60, &[]).validate(), Err(ValidationError::Minutes));
        assert_eq!(draft(7, 5, &[0, 7]).validate(), Err(ValidationError::Day));
        assert_eq!(draft(23, 59, &[0, 6]).validate(), Ok(()));
    }

    #[test]
    fn alarm_uses_camel_case_on_the_wire() {
        let alarm = draft(7, 5, &[2, 1]).with_id(4);
        let json = serde_json::to_value(&alarm).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": 4,
                "hours": 7,
                "minutes": 5,
                "days": [1, 2],
                "isEnabled": true
            })
        );
    }

    #[test]
    fn duplicate_days_collapse_when_parsed() {
        let alarm: Alarm = serde_json::from_str(
            r#"{"id":1,"hours":6,"minutes":30,"days":[3,3,1],"isEnabled":false}"#,
        )
        .unwrap();
        assert_eq!(alarm.days.into_iter().collect::<Vec<_>>(), vec![1, 3]);
    }

    #[test]
    fn app_data_assigns_increasing_ids() {
        let mut data = AppData::default();
        let first = data.insert(draft(6, 0, &[]));
        let second = data.insert(draft(7, 0, &[1]));
        assert_eq!((first, second), (1, 2));

        data.alarms.remove(&first);
        let third = data.insert(draft(8, 0, &[]));
        assert_eq!(third, 3);
        let ids: Vec<i64> = data.list().iter().map(|alarm| alarm.id).collect();
        assert_eq!(ids, vec![2, 3]);
    }
}
