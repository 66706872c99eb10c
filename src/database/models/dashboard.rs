use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use thiserror::Error;
use uuid::Uuid;

use crate::types::{TeamId, UserId};

/// Prefix of every system-generated dashboard id
pub const DASHBOARD_ID_PREFIX: &str = "d-";

const SHORT_UID_LEN: usize = 10;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// A dashboard document as exchanged with clients
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Dashboard {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub owned_by: TeamId,
    #[serde(deserialize_with = "null_as_default")]
    pub created_by: UserId,
    #[serde(deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    /// Panel and layout configuration, opaque to this service
    pub data: Value,
    pub created: Option<DateTime<Utc>>,
    pub updated: Option<DateTime<Utc>>,
    /// Derived on fetch, never stored
    #[serde(skip_deserializing, skip_serializing_if = "std::ops::Not::not")]
    pub editable: bool,
}

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("dashboard data must be a JSON object")]
    DataNotObject,

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Dashboard {
    pub fn is_new(&self) -> bool {
        self.id.is_empty()
    }

    /// Storage form of `data`. A missing document is stored as an empty object.
    pub fn encode_data(&self) -> Result<String, EncodeError> {
        match &self.data {
            Value::Null => Ok("{}".to_string()),
            Value::Object(_) => Ok(serde_json::to_string(&self.data)?),
            _ => Err(EncodeError::DataNotObject),
        }
    }

    pub fn encode_tags(&self) -> Result<String, EncodeError> {
        Ok(serde_json::to_string(&self.tags)?)
    }

    /// Build the row written to the `dashboard` table
    pub fn to_row(
        &self,
        created: DateTime<Utc>,
        updated: DateTime<Utc>,
    ) -> Result<DashboardRow, EncodeError> {
        Ok(DashboardRow {
            id: self.id.clone(),
            title: self.title.clone(),
            owned_by: self.owned_by,
            created_by: self.created_by,
            tags: self.encode_tags()?,
            data: self.encode_data()?,
            created,
            updated,
        })
    }
}

/// One row of the `dashboard` table; `tags` and `data` hold encoded JSON
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct DashboardRow {
    pub id: String,
    pub title: String,
    pub owned_by: TeamId,
    pub created_by: UserId,
    pub tags: String,
    pub data: String,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl DashboardRow {
    pub fn decode(self) -> Result<Dashboard, serde_json::Error> {
        Ok(Dashboard {
            tags: decode_tags(&self.tags)?,
            data: serde_json::from_str(&self.data)?,
            id: self.id,
            title: self.title,
            owned_by: self.owned_by,
            created_by: self.created_by,
            created: Some(self.created),
            updated: Some(self.updated),
            editable: false,
        })
    }
}

/// Projection returned by the per-team listing
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct DashboardSummary {
    pub id: String,
    pub title: String,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

/// Projection returned by the simplified listing of every dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSimple {
    pub id: String,
    pub title: String,
    pub owned_by: TeamId,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct DashboardSimpleRow {
    pub id: String,
    pub title: String,
    pub owned_by: TeamId,
    pub tags: String,
}

impl TryFrom<DashboardSimpleRow> for DashboardSimple {
    type Error = serde_json::Error;

    fn try_from(row: DashboardSimpleRow) -> Result<Self, Self::Error> {
        Ok(DashboardSimple {
            tags: decode_tags(&row.tags)?,
            id: row.id,
            title: row.title,
            owned_by: row.owned_by,
        })
    }
}

/// Body of `POST /dashboard/ownedBy`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateOwnedBy {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub owned_by: TeamId,
}

/// Explicit `null` reads as the zero value, same as an absent field
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn decode_tags(raw: &str) -> Result<Vec<String>, serde_json::Error> {
    // Rows written before tags existed hold an empty string
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(raw)
}

/// New dashboard id of the form `d-<shortUID>`
pub fn generate_dashboard_id() -> String {
    format!("{}{}", DASHBOARD_ID_PREFIX, short_uid())
}

fn short_uid() -> String {
    let mut n = Uuid::new_v4().as_u128();
    let mut out = String::with_capacity(SHORT_UID_LEN);
    for _ in 0..SHORT_UID_LEN {
        out.push(BASE36[(n % 36) as usize] as char);
        n /= 36;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Dashboard {
        Dashboard {
            id: "d-sample".into(),
            title: "Overview".into(),
            owned_by: 1,
            created_by: 7,
            tags: vec!["prod".into(), "api".into()],
            data: json!({ "panels": [{ "id": 1, "type": "graph" }] }),
            ..Default::default()
        }
    }

    #[test]
    fn generated_ids_have_prefix_and_short_uid() {
        let id = generate_dashboard_id();
        let uid = id.strip_prefix(DASHBOARD_ID_PREFIX).expect("prefix");
        assert_eq!(uid.len(), SHORT_UID_LEN);
        assert!(uid.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
        assert_ne!(id, generate_dashboard_id());
    }

    #[test]
    fn row_round_trip_preserves_document() {
        let now = Utc::now();
        let dash = sample();
        let decoded = dash.to_row(now, now).unwrap().decode().unwrap();

        assert_eq!(decoded.tags, dash.tags);
        assert_eq!(decoded.data, dash.data);
        assert_eq!(decoded.created, Some(now));
        assert!(!decoded.editable);
    }

    #[test]
    fn non_object_data_is_rejected() {
        let mut dash = sample();
        dash.data = json!(["not", "an", "object"]);
        assert!(matches!(dash.encode_data(), Err(EncodeError::DataNotObject)));

        dash.data = Value::Null;
        assert_eq!(dash.encode_data().unwrap(), "{}");
    }

    #[test]
    fn deserializes_camel_case_with_defaults() {
        let dash: Dashboard = serde_json::from_value(json!({
            "title": "New",
            "ownedBy": 3,
            "editable": true
        }))
        .unwrap();

        assert!(dash.is_new());
        assert_eq!(dash.owned_by, 3);
        assert!(dash.tags.is_empty());
        assert!(!dash.editable, "editable is never accepted from clients");
    }

    #[test]
    fn null_fields_read_as_zero_values() {
        let dash: Dashboard = serde_json::from_value(json!({
            "id": null,
            "title": null,
            "ownedBy": null,
            "createdBy": null,
            "tags": null,
            "data": null
        }))
        .unwrap();

        assert!(dash.is_new());
        assert!(dash.title.is_empty());
        assert_eq!((dash.owned_by, dash.created_by), (0, 0));
        assert!(dash.tags.is_empty());
        assert_eq!(dash.data, Value::Null);

        let req: UpdateOwnedBy = serde_json::from_value(json!({ "id": null, "ownedBy": null })).unwrap();
        assert!(req.id.is_empty());
        assert_eq!(req.owned_by, 0);
    }

    #[test]
    fn editable_is_only_serialized_when_set() {
        let mut dash = sample();
        assert!(serde_json::to_value(&dash).unwrap().get("editable").is_none());
        dash.editable = true;
        assert_eq!(serde_json::to_value(&dash).unwrap()["editable"], json!(true));
    }

    #[test]
    fn blank_stored_tags_decode_as_empty() {
        let row = DashboardSimpleRow {
            id: "d-1".into(),
            title: "t".into(),
            owned_by: 1,
            tags: String::new(),
        };
        assert!(DashboardSimple::try_from(row).unwrap().tags.is_empty());
    }
}
