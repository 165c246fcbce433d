// Call detail record persistence

use sqlx::Row;

use super::schema::{CallEvent, ExtraFields, NewCallEvent};
use super::{now, RecordStore};
use crate::error::{Error, Result};

impl RecordStore {
    /// Append a call event, returning its new id
    pub async fn save_call_event(&self, event: &NewCallEvent) -> Result<i64> {
        self.require_case(event.case_id).await?;

        let result = sqlx::query(
            r#"INSERT INTO cdrs (
                case_id, called_number, cell_site_id, sector,
                calling_number, dialed_digits, direction, start_date, end_date, duration,
                extra_fields, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(event.case_id)
        .bind(&event.called_number)
        .bind(&event.cell_site_id)
        .bind(&event.sector)
        .bind(&event.calling_number)
        .bind(&event.dialed_digits)
        .bind(&event.direction)
        .bind(&event.start_date)
        .bind(&event.end_date)
        .bind(&event.duration)
        .bind(event.extra.to_blob()?)
        .bind(now())
        .execute(self.pool())
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Ids of the case's events that carry a cell site, in insertion order
    pub async fn list_locatable_call_event_ids(&self, case_id: i64) -> Result<Vec<i64>> {
        let ids = sqlx::query_scalar::<_, i64>(
            r#"SELECT id FROM cdrs
               WHERE case_id = ?
                 AND cell_site_id IS NOT NULL
                 AND cell_site_id != ''
               ORDER BY id"#,
        )
        .bind(case_id)
        .fetch_all(self.pool())
        .await?;
        Ok(ids)
    }

    pub async fn get_call_event_details(&self, id: i64, case_id: i64) -> Result<CallEvent> {
        let row = sqlx::query("SELECT * FROM cdrs WHERE id = ? AND case_id = ?")
            .bind(id)
            .bind(case_id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| Error::not_found("call event", format!("{} in case {}", id, case_id)))?;

        let extra = ExtraFields::from_blob(&row.get::<String, _>("extra_fields"))?;

        Ok(CallEvent {
            id: row.get("id"),
            case_id: row.get("case_id"),
            called_number: row.get("called_number"),
            cell_site_id: row.get("cell_site_id"),
            sector: row.get("sector"),
            calling_number: row.get("calling_number"),
            dialed_digits: row.get("dialed_digits"),
            direction: row.get("direction"),
            start_date: row.get("start_date"),
            end_date: row.get("end_date"),
            duration: row.get("duration"),
            extra,
        })
    }
}
