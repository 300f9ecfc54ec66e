use async_trait::async_trait;
use models::{School, SchoolDraft};
use tracing::debug;

use crate::errors::ServiceError;
use crate::http;

/// Remote table of school listings.
#[async_trait]
pub trait SchoolRepository: Send + Sync {
    /// Every row, newest `created_at` first.
    async fn list_newest_first(&self) -> Result<Vec<School>, ServiceError>;
    /// Insert one row and return it as stored, with `id` and `created_at` filled in.
    async fn insert(&self, draft: &SchoolDraft) -> Result<School, ServiceError>;
}

/// Repository backed by the hosted database's PostgREST endpoint.
pub struct PostgrestSchoolRepository {
    client: reqwest::Client,
    table_url: String,
    key: String,
}

impl PostgrestSchoolRepository {
    pub fn new(client: reqwest::Client, endpoint: &str, key: &str, table: &str) -> Self {
        Self {
            client,
            table_url: format!("{}/rest/v1/{}", endpoint.trim_end_matches('/'), table),
            key: key.to_string(),
        }
    }
}

#[async_trait]
impl SchoolRepository for PostgrestSchoolRepository {
    async fn list_newest_first(&self) -> Result<Vec<School>, ServiceError> {
        let req = self
            .client
            .get(&self.table_url)
            .query(&[("select", "*"), ("order", "created_at.desc")]);
        let resp = http::send(http::authorize(req, &self.key)).await?;
        let rows = resp.json::<Vec<School>>().await.map_err(|e| ServiceError::Decode(e.to_string()))?;
        debug!(count = rows.len(), "schools_listed");
        Ok(rows)
    }

    async fn insert(&self, draft: &SchoolDraft) -> Result<School, ServiceError> {
        let req = self
            .client
            .post(&self.table_url)
            .header("Prefer", "return=representation")
            .json(&[draft]);
        let resp = http::send(http::authorize(req, &self.key)).await?;
        let rows = resp.json::<Vec<School>>().await.map_err(|e| ServiceError::Decode(e.to_string()))?;
        rows.into_iter()
            .next()
            .ok_or_else(|| ServiceError::Decode("insert returned no row".into()))
    }
}

/// In-memory repository for tests and doc examples.
pub mod mock {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use std::sync::Mutex;
    use tokio::sync::Notify;

    #[derive(Default)]
    pub struct MockSchoolRepository {
        rows: Mutex<Vec<School>>,
        next_id: Mutex<i64>,
        failure: Mutex<Option<String>>,
    }

    impl MockSchoolRepository {
        /// Seed with rows; ids continue after the largest seeded id.
        pub fn with_rows(rows: Vec<School>) -> Self {
            let next = rows.iter().map(|r| r.id).max().unwrap_or(0) + 1;
            Self { rows: Mutex::new(rows), next_id: Mutex::new(next), failure: Mutex::new(None) }
        }

        /// Make every subsequent call fail with a remote error carrying `message`.
        pub fn fail_with(&self, message: &str) {
            *self.failure.lock().unwrap() = Some(message.to_string());
        }

        pub fn recover(&self) {
            *self.failure.lock().unwrap() = None;
        }

        pub fn set_next_id(&self, id: i64) {
            *self.next_id.lock().unwrap() = id;
        }

        pub fn len(&self) -> usize {
            self.rows.lock().unwrap().len()
        }

        pub fn is_empty(&self) -> bool {
            self.len() == 0
        }

        fn check(&self) -> Result<(), ServiceError> {
            match self.failure.lock().unwrap().as_ref() {
                Some(m) => Err(ServiceError::Remote { status: 500, message: m.clone() }),
                None => Ok(()),
            }
        }
    }

    /// A row with a deterministic `created_at` of 2024-01-01 plus `day_offset` days.
    pub fn school_row(id: i64, name: &str, day_offset: i64) -> School {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).single().expect("valid date");
        School {
            id,
            name: name.to_string(),
            address: format!("{id} Main Road"),
            city: "Springfield".into(),
            state: "IL".into(),
            contact: "5550000000".into(),
            email_id: format!("school{id}@example.com"),
            image: None,
            created_at: Some(base + Duration::days(day_offset)),
        }
    }

    #[async_trait]
    impl SchoolRepository for MockSchoolRepository {
        async fn list_newest_first(&self) -> Result<Vec<School>, ServiceError> {
            self.check()?;
            let mut rows = self.rows.lock().unwrap().clone();
            rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(rows)
        }

        async fn insert(&self, draft: &SchoolDraft) -> Result<School, ServiceError> {
            self.check()?;
            let mut next = self.next_id.lock().unwrap();
            let row = School {
                id: *next,
                name: draft.name.clone(),
                address: draft.address.clone(),
                city: draft.city.clone(),
                state: draft.state.clone(),
                contact: draft.contact.clone(),
                email_id: draft.email_id.clone(),
                image: draft.image.clone(),
                created_at: Some(Utc::now()),
            };
            *next += 1;
            self.rows.lock().unwrap().push(row.clone());
            Ok(row)
        }
    }

    /// Wraps a [`MockSchoolRepository`] and holds every call until released,
    /// so tests can look at the store while a remote call is pending.
    pub struct GatedSchoolRepository {
        inner: MockSchoolRepository,
        entered: Notify,
        release: Notify,
    }

    impl GatedSchoolRepository {
        pub fn new(inner: MockSchoolRepository) -> Self {
            Self { inner, entered: Notify::new(), release: Notify::new() }
        }

        /// Resolves once a call has reached the gate.
        pub async fn wait_entered(&self) {
            self.entered.notified().await;
        }

        /// Let one held call through.
        pub fn release(&self) {
            self.release.notify_one();
        }

        async fn hold(&self) {
            self.entered.notify_one();
            self.release.notified().await;
        }
    }

    #[async_trait]
    impl SchoolRepository for GatedSchoolRepository {
        async fn list_newest_first(&self) -> Result<Vec<School>, ServiceError> {
            self.hold().await;
            self.inner.list_newest_first().await
        }

        async fn insert(&self, draft: &SchoolDraft) -> Result<School, ServiceError> {
            self.hold().await;
            self.inner.insert(draft).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::{school_row, MockSchoolRepository};
    use super::*;

    #[tokio::test]
    async fn mock_lists_newest_first_and_assigns_ids() -> Result<(), ServiceError> {
        let repo = MockSchoolRepository::with_rows(vec![school_row(1, "Old", 0), school_row(2, "New", 5)]);
        let ids: Vec<i64> = repo.list_newest_first().await?.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![2, 1]);

        let draft = SchoolDraft { name: "Third".into(), ..Default::default() };
        let created = repo.insert(&draft).await?;
        assert_eq!(created.id, 3);
        assert!(created.created_at.is_some());
        assert_eq!(repo.len(), 3);
        Ok(())
    }

    #[test]
    fn table_url_is_built_from_endpoint() {
        let repo = PostgrestSchoolRepository::new(reqwest::Client::new(), "https://x.example.co/", "k", "schools");
        assert_eq!(repo.table_url, "https://x.example.co/rest/v1/schools");
    }
}
