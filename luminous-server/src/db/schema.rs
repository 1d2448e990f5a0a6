//! Postgres schema for the reference tables

use crate::db::pool::LazyPool;
use crate::store::StoreError;

const STATEMENTS: &[(&str, &str)] = &[
    (
        "quran_surahs",
        r#"
        CREATE TABLE IF NOT EXISTS quran_surahs (
            number INTEGER PRIMARY KEY CHECK (number BETWEEN 1 AND 114),
            arabic_name TEXT NOT NULL,
            transliteration TEXT NOT NULL,
            english_name TEXT NOT NULL,
            ayah_count INTEGER NOT NULL CHECK (ayah_count > 0),
            revelation_type TEXT NOT NULL,
            chronological_order INTEGER NOT NULL,
            rukus INTEGER NOT NULL
        )
        "#,
    ),
    (
        "quran_verses",
        r#"
        CREATE TABLE IF NOT EXISTS quran_verses (
            id BIGINT PRIMARY KEY,
            surah_id INTEGER NOT NULL REFERENCES quran_surahs(number),
            verse_number INTEGER NOT NULL CHECK (verse_number >= 1),
            text TEXT NOT NULL,
            UNIQUE (surah_id, verse_number)
        )
        "#,
    ),
    (
        "quran_translations",
        r#"
        CREATE TABLE IF NOT EXISTS quran_translations (
            id BIGINT PRIMARY KEY,
            translator TEXT NOT NULL,
            surah_id INTEGER NOT NULL REFERENCES quran_surahs(number),
            verse_number INTEGER NOT NULL CHECK (verse_number >= 1),
            text TEXT NOT NULL,
            UNIQUE (translator, surah_id, verse_number)
        )
        "#,
    ),
    (
        "quran_sajdas",
        r#"
        CREATE TABLE IF NOT EXISTS quran_sajdas (
            surah_number INTEGER NOT NULL,
            ayah_number INTEGER NOT NULL,
            sajda_type TEXT NOT NULL,
            PRIMARY KEY (surah_number, ayah_number),
            FOREIGN KEY (surah_number, ayah_number)
                REFERENCES quran_verses(surah_id, verse_number)
        )
        "#,
    ),
    (
        "surah_descriptions",
        r#"
        CREATE TABLE IF NOT EXISTS surah_descriptions (
            surah_id INTEGER PRIMARY KEY REFERENCES quran_surahs(number),
            description TEXT NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    ),
];

/// Create any missing tables. Safe to run repeatedly.
pub async fn run(pool: &LazyPool) -> Result<(), StoreError> {
    tracing::info!("Running schema migrations...");
    let mut lease = pool.lease().await?;

    for (table, sql) in STATEMENTS {
        sqlx::query(sql).execute(&mut **lease).await?;
        tracing::debug!(table, "table ready");
    }

    tracing::info!("Schema migrations complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_are_created_before_their_references() {
        let order: Vec<&str> = STATEMENTS.iter().map(|(t, _)| *t).collect();
        let pos = |t: &str| order.iter().position(|x| *x == t).unwrap();
        assert!(pos("quran_surahs") < pos("quran_verses"));
        assert!(pos("quran_verses") < pos("quran_sajdas"));
        assert!(pos("quran_surahs") < pos("surah_descriptions"));
    }

    #[test]
    fn statements_are_idempotent() {
        for (table, sql) in STATEMENTS {
            assert!(sql.contains("IF NOT EXISTS"), "{table}");
        }
    }
}
