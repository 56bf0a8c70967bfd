use rusqlite::{Connection, OptionalExtension, Row, params};

use super::{date_column, format_date, format_timestamp, now, query_error, relations, timestamp_column};
use crate::domain::error::TradebookError;
use crate::domain::program::{CreateProgramInput, Program, UpdateProgramInput};

fn from_row(row: &Row<'_>) -> rusqlite::Result<Program> {
    Ok(Program {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        status: row.get(3)?,
        start_date: date_column(row, 4)?,
        end_date: date_column(row, 5)?,
        created_at: timestamp_column(row, 6)?,
    })
}

pub(super) fn create(
    conn: &Connection,
    input: &CreateProgramInput,
) -> Result<Program, TradebookError> {
    input.validate()?;

    let created_at = now();
    conn.execute(
        "INSERT INTO programs (name, description, status, start_date, end_date, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            input.name,
            input.description,
            input.status,
            format_date(input.start_date),
            format_date(input.end_date),
            format_timestamp(created_at),
        ],
    )
    .map_err(query_error)?;

    let program = Program {
        id: conn.last_insert_rowid(),
        name: input.name.clone(),
        description: input.description.clone(),
        status: input.status.clone(),
        start_date: input.start_date,
        end_date: input.end_date,
        created_at,
    };
    log::info!("created program {} ({})", program.id, program.name);
    Ok(program)
}

pub(super) fn find(conn: &Connection, id: i64) -> Result<Option<Program>, TradebookError> {
    conn.query_row(
        "SELECT id, name, description, status, start_date, end_date, created_at
         FROM programs WHERE id = ?1",
        [id],
        from_row,
    )
    .optional()
    .map_err(query_error)
}

pub(super) fn list(conn: &Connection) -> Result<Vec<Program>, TradebookError> {
    let mut stmt = conn
        .prepare(
            "SELECT id, name, description, status, start_date, end_date, created_at
             FROM programs ORDER BY id",
        )
        .map_err(query_error)?;

    let rows = stmt.query_map([], from_row).map_err(query_error)?;
    rows.collect::<rusqlite::Result<Vec<_>>>()
        .map_err(query_error)
}

pub(super) fn update(
    conn: &Connection,
    input: &UpdateProgramInput,
) -> Result<Option<Program>, TradebookError> {
    if !input.has_changes() {
        return Ok(None);
    }
    input.validate()?;

    let Some(existing) = find(conn, input.id)? else {
        return Ok(None);
    };
    let program = input.apply(existing)?;

    conn.execute(
        "UPDATE programs
         SET name = ?1, description = ?2, status = ?3, start_date = ?4, end_date = ?5
         WHERE id = ?6",
        params![
            program.name,
            program.description,
            program.status,
            format_date(program.start_date),
            format_date(program.end_date),
            program.id,
        ],
    )
    .map_err(query_error)?;

    log::info!("updated program {}", program.id);
    Ok(Some(program))
}

pub(super) fn delete(conn: &Connection, id: i64) -> Result<bool, TradebookError> {
    let trades = relations::cascade_delete_program_trades(conn, id)?;
    let deleted = conn
        .execute("DELETE FROM programs WHERE id = ?1", [id])
        .map_err(query_error)?
        > 0;

    if deleted {
        log::info!("deleted program {id} with {trades} trade(s)");
    }
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use crate::adapters::sqlite::tests::{date, store};
    use crate::domain::error::TradebookError;
    use crate::domain::program::{CreateProgramInput, UpdateProgramInput};
    use crate::ports::store_port::StorePort;

    fn input() -> CreateProgramInput {
        CreateProgramInput {
            name: "Expansion".into(),
            description: "Regional expansion".into(),
            status: "planned".into(),
            start_date: date(2024, 1, 1),
            end_date: date(2024, 12, 31),
        }
    }

    #[test]
    fn create_then_get_returns_same_program() {
        let store = store();
        let created = store.create_program(&input()).unwrap();
        assert_eq!(store.get_program(created.id).unwrap(), Some(created));
    }

    #[test]
    fn create_rejects_equal_dates_without_writing() {
        let store = store();
        let mut bad = input();
        bad.end_date = bad.start_date;
        assert!(matches!(
            store.create_program(&bad),
            Err(TradebookError::InvalidRange { .. })
        ));
        assert!(store.list_programs().unwrap().is_empty());
    }

    #[test]
    fn list_returns_programs_in_id_order() {
        let store = store();
        let a = store.create_program(&input()).unwrap();
        let b = store.create_program(&input()).unwrap();
        let ids: Vec<i64> = store.list_programs().unwrap().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![a.id, b.id]);
    }

    #[test]
    fn update_merges_with_stored_dates() {
        let store = store();
        let created = store.create_program(&input()).unwrap();

        let err = store
            .update_program(&UpdateProgramInput {
                id: created.id,
                end_date: Some(date(2023, 12, 31)),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, TradebookError::InvalidRange { .. }));

        let updated = store
            .update_program(&UpdateProgramInput {
                id: created.id,
                end_date: Some(date(2025, 6, 30)),
                ..Default::default()
            })
            .unwrap()
            .unwrap();
        assert_eq!(updated.end_date, date(2025, 6, 30));
        assert_eq!(updated.name, created.name);
        assert_eq!(store.get_program(created.id).unwrap(), Some(updated));
    }

    #[test]
    fn update_with_no_fields_reports_not_found() {
        let store = store();
        let created = store.create_program(&input()).unwrap();
        let result = store
            .update_program(&UpdateProgramInput {
                id: created.id,
                ..Default::default()
            })
            .unwrap();
        assert_eq!(result, None);
    }

    #[test]
    fn update_missing_program_returns_none() {
        let store = store();
        let result = store
            .update_program(&UpdateProgramInput {
                id: 404,
                name: Some("Ghost".into()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(result, None);
    }

    #[test]
    fn delete_missing_program_is_not_an_error() {
        let store = store();
        assert!(!store.delete_program(404).unwrap().success);
    }
}
