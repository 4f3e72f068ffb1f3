use chrono::Utc;
use rusqlite::OptionalExtension;
use uuid::Uuid;

use crate::db::Database;
use crate::error::StoreError;
use crate::models::{Template, TemplateId, TemplateRecord, Visibility};
use crate::store::TemplateSubmitter;

const SELECT_COLUMNS: &str = "SELECT id, name, description, visibility, shared_users, shared_roles, \
     variables, steps, created_at, updated_at FROM templates";

#[derive(Clone)]
pub struct TemplateStore {
    db: Database,
}

impl TemplateStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Persist a new template and return its record.
    pub async fn create(&self, template: Template) -> Result<TemplateRecord, StoreError> {
        let now = Utc::now();
        let record = TemplateRecord {
            id: Uuid::new_v4().to_string(),
            template,
            created_at: now,
            updated_at: now,
        };
        let columns = JsonColumns::encode(&record.template)?;
        let r = record.clone();
        self.db
            .with_conn_async(move |conn| {
                conn.execute(
                    "INSERT INTO templates (id, name, description, visibility, shared_users, shared_roles, \
                     variables, steps, created_at, updated_at) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                    rusqlite::params![
                        r.id,
                        r.template.name,
                        r.template.description,
                        r.template.visibility.as_str(),
                        columns.shared_users,
                        columns.shared_roles,
                        columns.variables,
                        columns.steps,
                        r.created_at.timestamp_millis(),
                        r.updated_at.timestamp_millis(),
                    ],
                )?;
                Ok(())
            })
            .await?;
        Ok(record)
    }

    pub async fn get(&self, id: &str) -> Result<TemplateRecord, StoreError> {
        let key = id.to_string();
        let row = self
            .db
            .with_conn_async(move |conn| {
                conn.query_row(
                    &format!("{} WHERE id = ?1", SELECT_COLUMNS),
                    rusqlite::params![key],
                    RawRow::from_row,
                )
                .optional()
            })
            .await?;
        row.ok_or_else(|| StoreError::NotFound(format!("template {}", id)))?
            .decode()
    }

    pub async fn list(&self) -> Result<Vec<TemplateRecord>, StoreError> {
        let rows = self
            .db
            .with_conn_async(|conn| {
                let mut stmt = conn.prepare(&format!(
                    "{} ORDER BY created_at DESC, rowid DESC",
                    SELECT_COLUMNS
                ))?;
                let rows = stmt
                    .query_map([], RawRow::from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await?;
        rows.into_iter().map(RawRow::decode).collect()
    }

    pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let key = id.to_string();
        let deleted = self
            .db
            .with_conn_async(move |conn| {
                conn.execute("DELETE FROM templates WHERE id = ?1", rusqlite::params![key])
            })
            .await?;
        if deleted == 0 {
            return Err(StoreError::NotFound(format!("template {}", id)));
        }
        tracing::info!("Deleted template {}", id);
        Ok(())
    }
}

impl TemplateSubmitter for TemplateStore {
    async fn submit(&self, template: &Template) -> Result<TemplateId, StoreError> {
        let record = self.create(template.clone()).await?;
        tracing::info!("Stored template '{}' ({})", record.template.name, record.id);
        Ok(record.id)
    }
}

/// List-valued template fields, stored as JSON text columns.
struct JsonColumns {
    shared_users: String,
    shared_roles: String,
    variables: String,
    steps: String,
}

impl JsonColumns {
    fn encode(t: &Template) -> Result<Self, StoreError> {
        let enc = |r: serde_json::Result<String>| {
            r.map_err(|e| StoreError::Internal(format!("Failed to encode template: {}", e)))
        };
        Ok(Self {
            shared_users: enc(serde_json::to_string(&t.shared_users))?,
            shared_roles: enc(serde_json::to_string(&t.shared_roles))?,
            variables: enc(serde_json::to_string(&t.variables))?,
            steps: enc(serde_json::to_string(&t.steps))?,
        })
    }
}

/// A template row before its JSON columns are decoded.
struct RawRow {
    id: String,
    name: String,
    description: Option<String>,
    visibility: String,
    columns: JsonColumns,
    created_at: i64,
    updated_at: i64,
}

impl RawRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            visibility: row.get(3)?,
            columns: JsonColumns {
                shared_users: row.get(4)?,
                shared_roles: row.get(5)?,
                variables: row.get(6)?,
                steps: row.get(7)?,
            },
            created_at: row.get(8)?,
            updated_at: row.get(9)?,
        })
    }

    fn decode(self) -> Result<TemplateRecord, StoreError> {
        use chrono::TimeZone;
        let to_dt = |ms: i64| Utc.timestamp_millis_opt(ms).single().unwrap_or_else(Utc::now);
        let corrupt = |field: &str, e: serde_json::Error| {
            StoreError::Internal(format!("Corrupt {} for template {}: {}", field, self.id, e))
        };

        let template = Template {
            name: self.name,
            description: self.description,
            visibility: self.visibility.parse::<Visibility>().map_err(StoreError::Internal)?,
            shared_users: serde_json::from_str(&self.columns.shared_users)
                .map_err(|e| corrupt("shared_users", e))?,
            shared_roles: serde_json::from_str(&self.columns.shared_roles)
                .map_err(|e| corrupt("shared_roles", e))?,
            variables: serde_json::from_str(&self.columns.variables)
                .map_err(|e| corrupt("variables", e))?,
            steps: serde_json::from_str(&self.columns.steps).map_err(|e| corrupt("steps", e))?,
        };
        Ok(TemplateRecord {
            id: self.id,
            template,
            created_at: to_dt(self.created_at),
            updated_at: to_dt(self.updated_at),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccessRights, ShareGrant, TranscriptTurn};
    use crate::workflow::TemplateBuilder;

    fn sample() -> Template {
        let mut b = TemplateBuilder::from_transcript(vec![
            TranscriptTurn::User { content: "Triage ticket {ticket_id}".to_string() },
            TranscriptTurn::Tool { tool_name: "jira.get".to_string(), content: None },
            TranscriptTurn::Assistant { content: "Priority: high".to_string() },
        ]);
        b.set_name("Triage");
        b.set_visibility(Visibility::Users);
        b.share_with_user("u-42", AccessRights::Write);
        b.build()
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let store = TemplateStore::new(Database::open_in_memory().unwrap());
        let created = store.create(sample()).await.unwrap();

        let fetched = store.get(&created.id).await.unwrap();
        assert_eq!(fetched.template, sample());
        assert_eq!(fetched.template.shared_users, vec![ShareGrant::new("u-42", AccessRights::Write)]);
        assert_eq!(fetched.created_at.timestamp_millis(), created.created_at.timestamp_millis());
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let store = TemplateStore::new(Database::open_in_memory().unwrap());
        let err = store.get("missing").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
        assert_eq!(err.to_string(), "Not found: template missing");
    }

    #[tokio::test]
    async fn test_list_and_delete() {
        let store = TemplateStore::new(Database::open_in_memory().unwrap());
        let a = store.create(sample()).await.unwrap();
        let b = store.submit(&sample()).await.unwrap();

        let ids: Vec<String> = store.list().await.unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&a.id) && ids.contains(&b));

        store.delete(&a.id).await.unwrap();
        assert!(matches!(store.delete(&a.id).await, Err(StoreError::NotFound(_))));
        assert!(matches!(store.get(&a.id).await, Err(StoreError::NotFound(_))));
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let store = TemplateStore::new(Database::open_in_memory().unwrap());
        let mut first = sample();
        first.name = "First".to_string();
        let mut second = sample();
        second.name = "Second".to_string();
        let mut third = sample();
        third.name = "Third".to_string();

        // The first two usually share a millisecond; insertion order breaks the tie.
        let a = store.create(first).await.unwrap();
        let b = store.create(second).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let c = store.create(third).await.unwrap();

        let ids: Vec<String> = store.list().await.unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![c.id, b.id, a.id]);
    }

    #[tokio::test]
    async fn test_open_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("stencil.db");
        let path = path.to_string_lossy().to_string();

        let id = {
            let store = TemplateStore::new(Database::open(&path).unwrap());
            store.submit(&sample()).await.unwrap()
        };
        let reopened = TemplateStore::new(Database::open(&path).unwrap());
        assert_eq!(reopened.get(&id).await.unwrap().template, sample());
    }
}
