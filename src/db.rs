// 🗄️ SQLite storage for built artifacts
// One row per build, one per class, one per member. UNIQUE(build_id, glyph)
// makes the database itself refuse a glyph in two classes of one build.

use crate::artifact::{Artifact, HomoglyphRecord};
use crate::glyph::Glyph;
use crate::report::BuildReport;
use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS builds (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            build_id TEXT UNIQUE NOT NULL,
            generated_at TEXT NOT NULL,
            generator_version TEXT NOT NULL,
            artifact_sha256 TEXT NOT NULL,
            report TEXT NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS classes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            build_id TEXT NOT NULL REFERENCES builds(build_id),
            position INTEGER NOT NULL,
            UNIQUE(build_id, position)
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS class_members (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            class_id INTEGER NOT NULL REFERENCES classes(id),
            build_id TEXT NOT NULL,
            position INTEGER NOT NULL,
            glyph TEXT NOT NULL,
            codepoints TEXT NOT NULL,
            UNIQUE(build_id, glyph)
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_members_class ON class_members(class_id)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_members_glyph ON class_members(glyph)",
        [],
    )?;

    Ok(())
}

/// Store one build atomically. Returns the number of member rows written.
pub fn insert_artifact(
    conn: &mut Connection,
    artifact: &Artifact,
    report: &BuildReport,
) -> Result<usize> {
    let report_json = serde_json::to_string(report)?;
    let tx = conn.transaction()?;

    tx.execute(
        "INSERT INTO builds (build_id, generated_at, generator_version, artifact_sha256, report)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            report.build_id,
            report.generated_at.to_rfc3339(),
            report.generator_version,
            report.artifact_sha256,
            report_json,
        ],
    )
    .with_context(|| format!("Failed to insert build {}", report.build_id))?;

    let mut inserted = 0;

    for (position, record) in artifact.records().iter().enumerate() {
        tx.execute(
            "INSERT INTO classes (build_id, position) VALUES (?1, ?2)",
            params![report.build_id, position as i64],
        )?;
        let class_id = tx.last_insert_rowid();

        for (member_position, glyph) in record.data.iter().enumerate() {
            tx.execute(
                "INSERT INTO class_members (class_id, build_id, position, glyph, codepoints)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    class_id,
                    report.build_id,
                    member_position as i64,
                    glyph.as_str(),
                    glyph.notation(),
                ],
            )
            .with_context(|| {
                format!("Failed to insert {} of class {}", glyph.notation(), position)
            })?;
            inserted += 1;
        }
    }

    tx.commit()?;
    Ok(inserted)
}

/// Most recently stored build id
pub fn latest_build_id(conn: &Connection) -> Result<Option<String>> {
    let build_id = conn
        .query_row(
            "SELECT build_id FROM builds ORDER BY id DESC LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()?;
    Ok(build_id)
}

/// Rebuild the artifact of one build, records and members in stored order
pub fn load_artifact(conn: &Connection, build_id: &str) -> Result<Artifact> {
    let mut stmt = conn.prepare(
        "SELECT c.position, m.glyph
         FROM classes c
         JOIN class_members m ON m.class_id = c.id
         WHERE c.build_id = ?1
         ORDER BY c.position, m.position",
    )?;

    let rows = stmt
        .query_map(params![build_id], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut records: Vec<HomoglyphRecord> = Vec::new();
    let mut current: Option<i64> = None;

    for (position, text) in rows {
        let glyph = Glyph::from_chars(text.chars())
            .with_context(|| format!("Empty glyph stored in build {}", build_id))?;

        if current != Some(position) {
            records.push(HomoglyphRecord { data: Vec::new() });
            current = Some(position);
        }
        if let Some(record) = records.last_mut() {
            record.data.push(glyph);
        }
    }

    Ok(Artifact::from_records(records))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::ArtifactBuilder;
    use crate::glyph::EquivalenceClass;

    fn artifact() -> Artifact {
        ArtifactBuilder::new().build(vec![
            EquivalenceClass::from_chars(['A', 'a', '\u{0430}']),
            EquivalenceClass::from_chars(['0', 'O']),
        ])
    }

    fn open() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();
        conn
    }

    #[test]
    fn test_setup_is_idempotent() {
        let conn = open();
        setup_database(&conn).unwrap();
        assert_eq!(latest_build_id(&conn).unwrap(), None);
    }

    #[test]
    fn test_round_trip() {
        let mut conn = open();
        let artifact = artifact();
        let report = BuildReport::new(vec![], vec![2], 0, &artifact);

        let inserted = insert_artifact(&mut conn, &artifact, &report).unwrap();
        assert_eq!(inserted, 5);

        let build_id = latest_build_id(&conn).unwrap().unwrap();
        assert_eq!(build_id, report.build_id);
        assert_eq!(load_artifact(&conn, &build_id).unwrap(), artifact);
    }

    #[test]
    fn test_glyph_in_two_classes_is_rejected() {
        let mut conn = open();
        let broken = ArtifactBuilder::new().build(vec![
            EquivalenceClass::from_chars(['a', 'b']),
            EquivalenceClass::from_chars(['b', 'c']),
        ]);
        let report = BuildReport::new(vec![], vec![2], 0, &broken);

        assert!(insert_artifact(&mut conn, &broken, &report).is_err());
        // Transaction rolled back: nothing from the failed build remains
        assert_eq!(latest_build_id(&conn).unwrap(), None);
    }

    #[test]
    fn test_builds_are_kept_apart() {
        let mut conn = open();
        let first = artifact();
        let first_report = BuildReport::new(vec![], vec![2], 0, &first);
        insert_artifact(&mut conn, &first, &first_report).unwrap();

        let second = ArtifactBuilder::new().build(vec![EquivalenceClass::from_chars(['1', 'l'])]);
        let second_report = BuildReport::new(vec![], vec![1], 0, &second);
        insert_artifact(&mut conn, &second, &second_report).unwrap();

        assert_eq!(load_artifact(&conn, &first_report.build_id).unwrap(), first);
        assert_eq!(latest_build_id(&conn).unwrap(), Some(second_report.build_id));
    }
}
