use crate::db::Database;
use crate::error::StoreError;
use crate::models::{RoleEntry, UserEntry};
use crate::store::DirectoryLookup;

/// Users and roles a template can be shared with.
#[derive(Clone)]
pub struct DirectoryStore {
    db: Database,
}

impl DirectoryStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn upsert_user(&self, user: &UserEntry) -> Result<(), StoreError> {
        let u = user.clone();
        self.db
            .with_conn_async(move |conn| {
                conn.execute(
                    "INSERT INTO users (id, email) VALUES (?1, ?2)
                     ON CONFLICT(id) DO UPDATE SET email = excluded.email",
                    rusqlite::params![u.id, u.email],
                )?;
                Ok(())
            })
            .await
    }

    pub async fn upsert_role(&self, role: &RoleEntry) -> Result<(), StoreError> {
        let r = role.clone();
        self.db
            .with_conn_async(move |conn| {
                conn.execute(
                    "INSERT INTO roles (id, name) VALUES (?1, ?2)
                     ON CONFLICT(id) DO UPDATE SET name = excluded.name",
                    rusqlite::params![r.id, r.name],
                )?;
                Ok(())
            })
            .await
    }
}

impl DirectoryLookup for DirectoryStore {
    /// Case-insensitive substring match on email. Folding happens in Rust
    /// because SQLite's `lower()` only folds ASCII.
    async fn search_users(&self, query: &str) -> Result<Vec<UserEntry>, StoreError> {
        let needle = query.trim().to_lowercase();
        let users = self
            .db
            .with_conn_async(|conn| {
                let mut stmt = conn.prepare("SELECT id, email FROM users")?;
                let rows = stmt
                    .query_map([], |row| {
                        Ok(UserEntry {
                            id: row.get(0)?,
                            email: row.get(1)?,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await?;

        let mut matches: Vec<(String, UserEntry)> = users
            .into_iter()
            .map(|u| (u.email.to_lowercase(), u))
            .filter(|(folded, _)| folded.contains(&needle))
            .collect();
        matches.sort_by(|(a, ua), (b, ub)| a.cmp(b).then_with(|| ua.id.cmp(&ub.id)));
        Ok(matches.into_iter().map(|(_, u)| u).collect())
    }

    async fn list_roles(&self) -> Result<Vec<RoleEntry>, StoreError> {
        self.db
            .with_conn_async(|conn| {
                let mut stmt = conn.prepare("SELECT id, name FROM roles ORDER BY name ASC")?;
                let rows = stmt
                    .query_map([], |row| {
                        Ok(RoleEntry {
                            id: row.get(0)?,
                            name: row.get(1)?,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded() -> DirectoryStore {
        let store = DirectoryStore::new(Database::open_in_memory().unwrap());
        for (id, email) in [("u1", "ada@example.com"), ("u2", "Grace@Example.com"), ("u3", "linus_t@kernel.org")] {
            store
                .upsert_user(&UserEntry { id: id.to_string(), email: email.to_string() })
                .await
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_search_users_case_insensitive() {
        let store = seeded().await;
        let found = store.search_users("EXAMPLE").await.unwrap();
        let ids: Vec<&str> = found.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec!["u1", "u2"]);
    }

    #[tokio::test]
    async fn test_search_users_empty_query_lists_all() {
        let store = seeded().await;
        assert_eq!(store.search_users("").await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_search_users_treats_wildcards_literally() {
        let store = seeded().await;
        let found = store.search_users("_t@").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "u3");
        assert!(store.search_users("%").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_users_folds_non_ascii() {
        let store = seeded().await;
        store
            .upsert_user(&UserEntry { id: "u4".to_string(), email: "ÉMILE@example.com".to_string() })
            .await
            .unwrap();

        let found = store.search_users("émile").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].email, "ÉMILE@example.com");
        assert_eq!(store.search_users("Émile@EXAMPLE").await.unwrap().len(), 1);

        let ids: Vec<String> = store.search_users("example").await.unwrap().into_iter().map(|u| u.id).collect();
        assert_eq!(ids, vec!["u1", "u2", "u4"]);
    }

    #[tokio::test]
    async fn test_upsert_and_list_roles() {
        let store = DirectoryStore::new(Database::open_in_memory().unwrap());
        store.upsert_role(&RoleEntry { id: "r2".into(), name: "Viewers".into() }).await.unwrap();
        store.upsert_role(&RoleEntry { id: "r1".into(), name: "Editors".into() }).await.unwrap();
        store.upsert_role(&RoleEntry { id: "r2".into(), name: "Auditors".into() }).await.unwrap();

        let roles = store.list_roles().await.unwrap();
        let names: Vec<&str> = roles.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Auditors", "Editors"]);
    }
}
