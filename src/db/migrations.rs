/// SQL migration for the initial case schema
///
/// Design principles:
/// - Three append-only relations keyed by integer surrogate ids
/// - Source formatting of tower coordinates kept as text
/// - Open-ended CDR columns chosen per import kept in a JSON blob
pub const MIGRATION_001: &str = r#"
-- =============================================================================
-- Cases - one row per investigation
-- =============================================================================
CREATE TABLE IF NOT EXISTS cases (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    case_number     TEXT NOT NULL,
    agency          TEXT NOT NULL,
    agent           TEXT NOT NULL,
    analyst         TEXT NOT NULL,
    target_number   TEXT NOT NULL,
    created_at      TEXT NOT NULL
);

-- =============================================================================
-- Towers - one row per antenna sector
-- =============================================================================
CREATE TABLE IF NOT EXISTS towers (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    case_id         INTEGER NOT NULL REFERENCES cases(id),
    cell_site_id    TEXT NOT NULL,
    sector          TEXT NOT NULL,
    latitude        TEXT NOT NULL,          -- as written in the source file
    longitude       TEXT NOT NULL,          -- as written in the source file
    azimuth         REAL NOT NULL,          -- compass bearing in degrees
    created_at      TEXT NOT NULL
);

-- Location lookups always filter on all three columns
CREATE INDEX IF NOT EXISTS idx_towers_sector ON towers(case_id, cell_site_id, sector);

-- =============================================================================
-- CDRs - one row per call event
-- =============================================================================
CREATE TABLE IF NOT EXISTS cdrs (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    case_id         INTEGER NOT NULL REFERENCES cases(id),

    -- REQUIRED
    called_number   TEXT NOT NULL,
    cell_site_id    TEXT NOT NULL,          -- '' when the event has no location
    sector          TEXT NOT NULL,

    -- OPTIONAL KNOWN FIELDS ('' when no column was selected)
    calling_number  TEXT NOT NULL DEFAULT '',
    dialed_digits   TEXT NOT NULL DEFAULT '',
    direction       TEXT NOT NULL DEFAULT '',
    start_date      TEXT NOT NULL DEFAULT '',
    end_date        TEXT NOT NULL DEFAULT '',
    duration        TEXT NOT NULL DEFAULT '',

    -- USER-SELECTED EXTRA COLUMNS (JSON object, header -> value)
    extra_fields    TEXT NOT NULL DEFAULT '{}',

    created_at      TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_cdrs_case ON cdrs(case_id, id);
"#;
