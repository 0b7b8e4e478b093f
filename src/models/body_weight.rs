use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single body-weight measurement.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyWeightEntry {
    pub id: Uuid,
    pub weight: f64,
    pub date: DateTime<Utc>,
}

impl BodyWeightEntry {
    pub fn new(weight: f64, date: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            weight,
            date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_weight_json_roundtrip() {
        let entry = BodyWeightEntry::new(93.8, Utc::now());
        let json = serde_json::to_string(&entry).unwrap();
        let parsed: BodyWeightEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.id, entry.id);
        assert_eq!(parsed.weight, entry.weight);
        assert_eq!(parsed.date, entry.date);
    }
}
