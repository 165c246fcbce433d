// Case persistence

use sqlx::Row;

use super::schema::{Case, NewCase};
use super::{now, RecordStore};
use crate::error::{Error, Result};

impl RecordStore {
    /// Validate and insert a case, returning its new id
    pub async fn save_case(&self, case: &NewCase) -> Result<i64> {
        case.validate()?;

        let result = sqlx::query(
            r#"INSERT INTO cases (case_number, agency, agent, analyst, target_number, created_at)
               VALUES (?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&case.case_number)
        .bind(&case.agency)
        .bind(&case.agent)
        .bind(&case.analyst)
        .bind(&case.target_number)
        .bind(now())
        .execute(self.pool())
        .await?;

        let id = result.last_insert_rowid();
        log::info!("Created case {} ({}) as #{}", case.case_number, case.agency, id);
        Ok(id)
    }

    pub async fn get_case_details(&self, case_id: i64) -> Result<Case> {
        let row = sqlx::query(
            "SELECT id, case_number, agency, agent, analyst, target_number FROM cases WHERE id = ?",
        )
        .bind(case_id)
        .fetch_optional(self.pool())
        .await?
        .ok_or_else(|| Error::not_found("case", case_id))?;

        Ok(Case {
            id: row.get("id"),
            case_number: row.get("case_number"),
            agency: row.get("agency"),
            agent: row.get("agent"),
            analyst: row.get("analyst"),
            target_number: row.get("target_number"),
        })
    }

    pub async fn get_case_number(&self, case_id: i64) -> Result<String> {
        sqlx::query_scalar::<_, String>("SELECT case_number FROM cases WHERE id = ?")
            .bind(case_id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| Error::not_found("case", case_id))
    }

    pub async fn case_exists(&self, case_id: i64) -> Result<bool> {
        let exists: i64 = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM cases WHERE id = ?)")
            .bind(case_id)
            .fetch_one(self.pool())
            .await?;
        Ok(exists != 0)
    }

    pub(crate) async fn require_case(&self, case_id: i64) -> Result<()> {
        if self.case_exists(case_id).await? {
            Ok(())
        } else {
            Err(Error::not_found("case", case_id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;

    fn sample_case() -> NewCase {
        NewCase {
            case_number: "ABC-123".to_string(),
            agency: "Metro PD".to_string(),
            agent: "Det. Alvarez".to_string(),
            analyst: "S. Chen".to_string(),
            target_number: "5550009999".to_string(),
        }
    }

    #[tokio::test]
    async fn test_save_then_get_details() {
        let store = RecordStore::open(&StoreConfig::in_memory()).await.unwrap();
        let case = sample_case();

        let id = store.save_case(&case).await.unwrap();
        let stored = store.get_case_details(id).await.unwrap();

        assert_eq!(stored.id, id);
        assert_eq!(stored.case_number, case.case_number);
        assert_eq!(stored.agency, case.agency);
        assert_eq!(stored.agent, case.agent);
        assert_eq!(stored.analyst, case.analyst);
        assert_eq!(stored.target_number, case.target_number);
        assert_eq!(store.get_case_number(id).await.unwrap(), "ABC-123");
    }

    #[tokio::test]
    async fn test_ids_are_unique() {
        let store = RecordStore::open(&StoreConfig::in_memory()).await.unwrap();
        let first = store.save_case(&sample_case()).await.unwrap();
        let second = store.save_case(&sample_case()).await.unwrap();
        assert!(second > first);
    }

    #[tokio::test]
    async fn test_unknown_case_is_not_found() {
        let store = RecordStore::open(&StoreConfig::in_memory()).await.unwrap();

        assert!(store.get_case_details(99).await.unwrap_err().is_not_found());
        assert!(store.get_case_number(99).await.unwrap_err().is_not_found());
        assert!(!store.case_exists(99).await.unwrap());
    }

    #[tokio::test]
    async fn test_empty_attribute_rejected() {
        let store = RecordStore::open(&StoreConfig::in_memory()).await.unwrap();
        let mut case = sample_case();
        case.analyst = " ".to_string();

        let err = store.save_case(&case).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(store.stats().await.unwrap().case_count, 0);
    }
}
