//! Database migrations
//!
//! This module manages SQLite schema migrations for tagtrail.
//! Migrations are versioned and applied automatically on database connection.

use sqlx::SqlitePool;

/// Current schema version
pub const CURRENT_VERSION: i32 = 2;

/// SQL for creating the migrations tracking table
const CREATE_MIGRATIONS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS _migrations (
        version INTEGER PRIMARY KEY NOT NULL,
        applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    );
"#;

/// Migration 1: Initial schema
const MIGRATION_V1: &str = r#"
    -- Users table
    CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY NOT NULL,
        display_name TEXT NOT NULL DEFAULT '',
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    );

    -- Linked judge accounts (one per user)
    CREATE TABLE IF NOT EXISTS linked_accounts (
        user_id TEXT PRIMARY KEY NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        handle TEXT NOT NULL,
        tier INTEGER NOT NULL DEFAULT 0,
        synced_at TIMESTAMP,
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    );

    -- Problem tags (topics/techniques), synced from the judge
    CREATE TABLE IF NOT EXISTS tags (
        id INTEGER PRIMARY KEY NOT NULL,
        key TEXT NOT NULL UNIQUE,
        display_name TEXT NOT NULL,
        level INTEGER NOT NULL DEFAULT 0,
        status TEXT NOT NULL DEFAULT 'active' CHECK (status IN ('active', 'retired'))
    );

    CREATE INDEX IF NOT EXISTS idx_tags_status ON tags(status);

    -- One-hop prerequisite edges between tags
    CREATE TABLE IF NOT EXISTS tag_parents (
        tag_id INTEGER NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
        parent_id INTEGER NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
        PRIMARY KEY (tag_id, parent_id)
    );

    -- User goals (e.g. "pass the regionals"), at most one active per user
    CREATE TABLE IF NOT EXISTS targets (
        id TEXT PRIMARY KEY NOT NULL,
        user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        name TEXT NOT NULL,
        active INTEGER NOT NULL DEFAULT 0,
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    );

    CREATE INDEX IF NOT EXISTS idx_targets_user_active ON targets(user_id, active);

    -- Tags a target requires
    CREATE TABLE IF NOT EXISTS target_tags (
        target_id TEXT NOT NULL REFERENCES targets(id) ON DELETE CASCADE,
        tag_id INTEGER NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
        PRIMARY KEY (target_id, tag_id)
    );

    -- Per-tag skill thresholds (IM/AD/MAS)
    CREATE TABLE IF NOT EXISTS skill_requirements (
        tag_id INTEGER NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
        skill_code TEXT NOT NULL CHECK (skill_code IN ('IM', 'AD', 'MAS')),
        min_solved_problem INTEGER NOT NULL DEFAULT 0,
        min_user_tier INTEGER NOT NULL DEFAULT 0,
        min_solved_problem_tier INTEGER NOT NULL DEFAULT 0,
        recommendation_period_days INTEGER NOT NULL DEFAULT 7,
        PRIMARY KEY (tag_id, skill_code)
    );

    -- Difficulty intents mapped to tier/skill-rate windows
    CREATE TABLE IF NOT EXISTS level_filters (
        filter_code TEXT NOT NULL CHECK (filter_code IN ('EASY', 'NORMAL', 'HARD', 'EXTREME')),
        skill_code TEXT NOT NULL CHECK (skill_code IN ('IM', 'AD', 'MAS')),
        min_tier_diff INTEGER,
        max_tier_diff INTEGER,
        min_skill_rate REAL,
        max_skill_rate REAL,
        PRIMARY KEY (filter_code, skill_code)
    );

    -- Problems, synced from the judge
    CREATE TABLE IF NOT EXISTS problems (
        id INTEGER PRIMARY KEY NOT NULL,
        title TEXT NOT NULL,
        tier INTEGER NOT NULL DEFAULT 0,
        solver_count INTEGER NOT NULL DEFAULT 0,
        skill_rate REAL NOT NULL DEFAULT 0.0
    );

    CREATE INDEX IF NOT EXISTS idx_problems_tier ON problems(tier);
    CREATE INDEX IF NOT EXISTS idx_problems_solver_count ON problems(solver_count);

    -- Problem <-> tag links; position 0 is the primary tag
    CREATE TABLE IF NOT EXISTS problem_tags (
        problem_id INTEGER NOT NULL REFERENCES problems(id) ON DELETE CASCADE,
        tag_id INTEGER NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
        position INTEGER NOT NULL DEFAULT 0,
        PRIMARY KEY (problem_id, tag_id)
    );

    CREATE INDEX IF NOT EXISTS idx_problem_tags_tag_id ON problem_tags(tag_id);

    -- Per-user, per-tag solve statistics (the sync snapshot)
    CREATE TABLE IF NOT EXISTS tag_account_stats (
        user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        tag_id INTEGER NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
        solved_problem_count INTEGER NOT NULL DEFAULT 0,
        highest_tier_achieved INTEGER,
        last_solved_date TEXT,
        updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        PRIMARY KEY (user_id, tag_id)
    );

    -- Tags the user never wants recommended
    CREATE TABLE IF NOT EXISTS excluded_tags (
        user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        tag_id INTEGER NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
        PRIMARY KEY (user_id, tag_id)
    );

    -- Problems the user has already solved
    CREATE TABLE IF NOT EXISTS solved_problems (
        user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        problem_id INTEGER NOT NULL REFERENCES problems(id) ON DELETE CASCADE,
        solved_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        PRIMARY KEY (user_id, problem_id)
    );

    -- Problems the user has banned from recommendations
    CREATE TABLE IF NOT EXISTS banned_problems (
        user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        problem_id INTEGER NOT NULL REFERENCES problems(id) ON DELETE CASCADE,
        PRIMARY KEY (user_id, problem_id)
    );

    -- Audit trail of recommendation runs
    CREATE TABLE IF NOT EXISTS recommendation_logs (
        id TEXT PRIMARY KEY NOT NULL,
        user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        requested_count INTEGER NOT NULL,
        accepted_count INTEGER NOT NULL,
        failed_attempts INTEGER NOT NULL,
        exclusion_mode TEXT NOT NULL,
        problem_ids TEXT NOT NULL DEFAULT '[]',
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    );

    CREATE INDEX IF NOT EXISTS idx_recommendation_logs_user ON recommendation_logs(user_id);
"#;

/// Migration 2: Default level filters
///
/// Seeds one row per (filter, skill) pair so a fresh database can serve
/// NORMAL recommendations without any manual configuration. Tier diffs are
/// relative to the account tier; NULL bounds are unbounded.
const MIGRATION_V2: &str = r#"
    INSERT OR IGNORE INTO level_filters
        (filter_code, skill_code, min_tier_diff, max_tier_diff, min_skill_rate, max_skill_rate)
    VALUES
        ('EASY',    'IM',  -5, -2, 0.5,  NULL),
        ('EASY',    'AD',  -4, -1, 0.5,  NULL),
        ('EASY',    'MAS', -4, -1, 0.4,  NULL),
        ('NORMAL',  'IM',  -1,  1, 0.25, NULL),
        ('NORMAL',  'AD',  -1,  1, 0.2,  NULL),
        ('NORMAL',  'MAS',  0,  2, 0.2,  NULL),
        ('HARD',    'IM',   2,  4, NULL, 0.5),
        ('HARD',    'AD',   2,  4, NULL, 0.45),
        ('HARD',    'MAS',  2,  5, NULL, 0.4),
        ('EXTREME', 'IM',   3, NULL, NULL, 0.35),
        ('EXTREME', 'AD',   3, NULL, NULL, 0.3),
        ('EXTREME', 'MAS',  4, NULL, NULL, 0.25);
"#;

/// Get the current schema version from the database
async fn get_current_version(pool: &SqlitePool) -> anyhow::Result<i32> {
    // Ensure migrations table exists
    sqlx::raw_sql(CREATE_MIGRATIONS_TABLE).execute(pool).await?;

    // Get the latest version
    let row: Option<(i32,)> = sqlx::query_as("SELECT MAX(version) FROM _migrations")
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|(v,)| v).unwrap_or(0))
}

/// Record that a migration has been applied
async fn record_migration(pool: &SqlitePool, version: i32) -> anyhow::Result<()> {
    sqlx::query("INSERT INTO _migrations (version) VALUES (?)")
        .bind(version)
        .execute(pool)
        .await?;
    Ok(())
}

/// Run all pending migrations
pub async fn run_migrations(pool: &SqlitePool) -> anyhow::Result<()> {
    let current_version = get_current_version(pool).await?;

    tracing::info!(
        current_version = current_version,
        target_version = CURRENT_VERSION,
        "Checking database migrations"
    );

    if current_version >= CURRENT_VERSION {
        tracing::debug!("Database is up to date");
        return Ok(());
    }

    // Apply migrations in order
    if current_version < 1 {
        tracing::info!("Applying migration v1: Initial schema");
        sqlx::raw_sql(MIGRATION_V1).execute(pool).await?;
        record_migration(pool, 1).await?;
    }

    if current_version < 2 {
        tracing::info!("Applying migration v2: Default level filters");
        sqlx::raw_sql(MIGRATION_V2).execute(pool).await?;
        record_migration(pool, 2).await?;
    }

    tracing::info!("Database migrations completed");
    Ok(())
}

/// Check if the database needs migrations
pub async fn needs_migration(pool: &SqlitePool) -> anyhow::Result<bool> {
    let current_version = get_current_version(pool).await?;
    Ok(current_version < CURRENT_VERSION)
}

/// Get migration status information
pub async fn migration_status(pool: &SqlitePool) -> anyhow::Result<MigrationStatus> {
    let current_version = get_current_version(pool).await?;
    Ok(MigrationStatus {
        current_version,
        target_version: CURRENT_VERSION,
        needs_migration: current_version < CURRENT_VERSION,
    })
}

/// Migration status information
#[derive(Debug, Clone)]
pub struct MigrationStatus {
    /// Current schema version in the database
    pub current_version: i32,
    /// Target schema version (latest)
    pub target_version: i32,
    /// Whether migrations need to be run
    pub needs_migration: bool,
}
