// Tower persistence and sector location lookup

use sqlx::Row;

use super::schema::{NewTower, TowerLocation};
use super::{now, RecordStore};
use crate::error::{Error, Result};

impl RecordStore {
    /// Append a tower sector, returning its new id
    pub async fn save_tower(&self, tower: &NewTower) -> Result<i64> {
        self.require_case(tower.case_id).await?;

        let result = sqlx::query(
            r#"INSERT INTO towers (case_id, cell_site_id, sector, latitude, longitude, azimuth, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(tower.case_id)
        .bind(&tower.cell_site_id)
        .bind(&tower.sector)
        .bind(&tower.latitude)
        .bind(&tower.longitude)
        .bind(tower.azimuth)
        .bind(now())
        .execute(self.pool())
        .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn tower_exists(&self, case_id: i64, cell_site_id: &str, sector: &str) -> Result<bool> {
        let exists: i64 = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM towers WHERE case_id = ? AND cell_site_id = ? AND sector = ?)",
        )
        .bind(case_id)
        .bind(cell_site_id)
        .bind(sector)
        .fetch_one(self.pool())
        .await?;
        Ok(exists != 0)
    }

    /// Exact-match lookup of a sector within one case.
    ///
    /// Duplicate sector rows do not fail the lookup; the earliest stored row wins.
    pub async fn resolve_tower_location(
        &self,
        case_id: i64,
        cell_site_id: &str,
        sector: &str,
    ) -> Result<TowerLocation> {
        let row = sqlx::query(
            r#"SELECT latitude, longitude, azimuth FROM towers
               WHERE case_id = ? AND cell_site_id = ? AND sector = ?
               ORDER BY id
               LIMIT 1"#,
        )
        .bind(case_id)
        .bind(cell_site_id)
        .bind(sector)
        .fetch_optional(self.pool())
        .await?
        .ok_or_else(|| {
            Error::not_found(
                "tower",
                format!("case {} cell site {} sector {}", case_id, cell_site_id, sector),
            )
        })?;

        Ok(TowerLocation {
            latitude: row.get("latitude"),
            longitude: row.get("longitude"),
            azimuth: row.get("azimuth"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;
    use crate::db::NewCase;

    async fn store_with_case() -> (RecordStore, i64) {
        let store = RecordStore::open(&StoreConfig::in_memory()).await.unwrap();
        let case_id = store
            .save_case(&NewCase {
                case_number: "T-1".to_string(),
                agency: "Agency".to_string(),
                agent: "Agent".to_string(),
                analyst: "Analyst".to_string(),
                target_number: "5550100".to_string(),
            })
            .await
            .unwrap();
        (store, case_id)
    }

    fn tower(case_id: i64, site: &str, sector: &str, lat: &str, lon: &str, azimuth: f64) -> NewTower {
        NewTower {
            case_id,
            cell_site_id: site.to_string(),
            sector: sector.to_string(),
            latitude: lat.to_string(),
            longitude: lon.to_string(),
            azimuth,
        }
    }

    #[tokio::test]
    async fn test_resolve_exact_sector() {
        let (store, case_id) = store_with_case().await;
        store.save_tower(&tower(case_id, "T1", "A", "40.0", "-73.0", 90.0)).await.unwrap();
        store.save_tower(&tower(case_id, "T1", "B", "40.0", "-73.0", 210.0)).await.unwrap();

        let location = store.resolve_tower_location(case_id, "T1", "B").await.unwrap();
        assert_eq!(location.latitude, "40.0");
        assert_eq!(location.longitude, "-73.0");
        assert_eq!(location.azimuth, 210.0);
    }

    #[tokio::test]
    async fn test_coordinates_keep_source_formatting() {
        let (store, case_id) = store_with_case().await;
        store
            .save_tower(&tower(case_id, "0042", "1", "40.712800", "-074.006000", 0.0))
            .await
            .unwrap();

        let location = store.resolve_tower_location(case_id, "0042", "1").await.unwrap();
        assert_eq!(location.latitude, "40.712800");
        assert_eq!(location.longitude, "-074.006000");
    }

    #[tokio::test]
    async fn test_missing_sector_is_not_found() {
        let (store, case_id) = store_with_case().await;
        store.save_tower(&tower(case_id, "T1", "A", "1", "2", 0.0)).await.unwrap();

        let err = store.resolve_tower_location(case_id, "T1", "C").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_lookup_is_scoped_to_case() {
        let (store, case_id) = store_with_case().await;
        let other_case = store
            .save_case(&NewCase {
                case_number: "T-2".to_string(),
                agency: "Agency".to_string(),
                agent: "Agent".to_string(),
                analyst: "Analyst".to_string(),
                target_number: "5550200".to_string(),
            })
            .await
            .unwrap();
        store.save_tower(&tower(other_case, "T1", "A", "1", "2", 0.0)).await.unwrap();

        assert!(store.resolve_tower_location(case_id, "T1", "A").await.unwrap_err().is_not_found());
        assert!(!store.tower_exists(case_id, "T1", "A").await.unwrap());
        assert!(store.tower_exists(other_case, "T1", "A").await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_sector_returns_first_row() {
        let (store, case_id) = store_with_case().await;
        store.save_tower(&tower(case_id, "T1", "A", "10.0", "20.0", 45.0)).await.unwrap();
        store.save_tower(&tower(case_id, "T1", "A", "11.0", "21.0", 90.0)).await.unwrap();

        let location = store.resolve_tower_location(case_id, "T1", "A").await.unwrap();
        assert_eq!(location.latitude, "10.0");
        assert_eq!(location.azimuth, 45.0);
    }

    #[tokio::test]
    async fn test_tower_requires_existing_case() {
        let (store, _) = store_with_case().await;
        let err = store.save_tower(&tower(404, "T1", "A", "1", "2", 0.0)).await.unwrap_err();
        assert!(err.is_not_found());
    }
}
