//! Database schema definitions using sea-query.
//!
//! These define the table and column identifiers for type-safe query
//! building.

use sea_query::Iden;

/// Salespeople table schema.
#[derive(Iden)]
pub enum Salespeople {
    Table,
    #[iden = "id"]
    Id,
    #[iden = "name"]
    Name,
    #[iden = "phone"]
    Phone,
    #[iden = "email"]
    Email,
    #[iden = "level"]
    Level,
    #[iden = "xp_total"]
    XpTotal,
    #[iden = "avatar"]
    Avatar,
    #[iden = "joined_on"]
    JoinedOn,
    #[iden = "active"]
    Active,
}

/// Point ledger table schema.
#[derive(Iden)]
pub enum PointEvents {
    Table,
    #[iden = "id"]
    Id,
    #[iden = "salesperson_id"]
    SalespersonId,
    #[iden = "day"]
    Day,
    #[iden = "points"]
    Points,
    #[iden = "action_kind"]
    ActionKind,
    #[iden = "detail"]
    Detail,
    #[iden = "created_at"]
    CreatedAt,
}

/// Daily tally table schema.
#[derive(Iden)]
pub enum DailyTallies {
    Table,
    #[iden = "id"]
    Id,
    #[iden = "salesperson_id"]
    SalespersonId,
    #[iden = "day"]
    Day,
    #[iden = "leads"]
    Leads,
    #[iden = "interviews_scheduled"]
    InterviewsScheduled,
    #[iden = "interviews_completed"]
    InterviewsCompleted,
    #[iden = "conversions"]
    Conversions,
    #[iden = "sales"]
    Sales,
    #[iden = "avg_ticket"]
    AvgTicket,
    #[iden = "revenue"]
    Revenue,
    #[iden = "points"]
    Points,
    #[iden = "created_at"]
    CreatedAt,
}

/// Missions table schema.
#[derive(Iden)]
pub enum Missions {
    Table,
    #[iden = "id"]
    Id,
    #[iden = "salesperson_id"]
    SalespersonId,
    #[iden = "title"]
    Title,
    #[iden = "description"]
    Description,
    #[iden = "kind"]
    Kind,
    #[iden = "category"]
    Category,
    #[iden = "target"]
    Target,
    #[iden = "progress"]
    Progress,
    #[iden = "reward_xp"]
    RewardXp,
    #[iden = "status"]
    Status,
    #[iden = "starts_on"]
    StartsOn,
    #[iden = "ends_on"]
    EndsOn,
    #[iden = "created_at"]
    CreatedAt,
}

/// Badges table schema.
#[derive(Iden)]
pub enum Badges {
    Table,
    #[iden = "id"]
    Id,
    #[iden = "salesperson_id"]
    SalespersonId,
    #[iden = "name"]
    Name,
    #[iden = "icon"]
    Icon,
    #[iden = "description"]
    Description,
    #[iden = "rarity"]
    Rarity,
    #[iden = "awarded_at"]
    AwardedAt,
}

/// Coach message log table schema.
#[derive(Iden)]
pub enum CoachMessages {
    Table,
    #[iden = "id"]
    Id,
    #[iden = "salesperson_id"]
    SalespersonId,
    #[iden = "body"]
    Body,
    #[iden = "kind"]
    Kind,
    #[iden = "sent"]
    Sent,
    #[iden = "sent_at"]
    SentAt,
    #[iden = "created_at"]
    CreatedAt,
}

/// Conversations table schema.
#[derive(Iden)]
pub enum Conversations {
    Table,
    #[iden = "id"]
    Id,
    #[iden = "salesperson_id"]
    SalespersonId,
    #[iden = "customer_name"]
    CustomerName,
    #[iden = "customer_phone"]
    CustomerPhone,
    #[iden = "channel"]
    Channel,
    #[iden = "transcript"]
    Transcript,
    #[iden = "duration_secs"]
    DurationSecs,
    #[iden = "happened_at"]
    HappenedAt,
    #[iden = "stage_score"]
    StageScore,
    #[iden = "quality_score"]
    QualityScore,
    #[iden = "objection_score"]
    ObjectionScore,
    #[iden = "outcome_score"]
    OutcomeScore,
    #[iden = "overall_score"]
    OverallScore,
    #[iden = "stages_met"]
    StagesMet,
    #[iden = "improvements"]
    Improvements,
    #[iden = "outcome"]
    Outcome,
    #[iden = "analyzed"]
    Analyzed,
    #[iden = "analyzed_at"]
    AnalyzedAt,
    #[iden = "created_at"]
    CreatedAt,
}

/// SQL for creating the salespeople table.
pub const CREATE_SALESPEOPLE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS salespeople (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    phone TEXT NOT NULL UNIQUE,
    email TEXT,
    level INTEGER NOT NULL DEFAULT 1,
    xp_total INTEGER NOT NULL DEFAULT 0,
    avatar TEXT NOT NULL DEFAULT '🎯',
    joined_on TEXT NOT NULL,
    active INTEGER NOT NULL DEFAULT 1
);
"#;

/// SQL for creating the point ledger table.
pub const CREATE_POINT_EVENTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS point_events (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    salesperson_id INTEGER NOT NULL REFERENCES salespeople(id),
    day TEXT NOT NULL,
    points INTEGER NOT NULL,
    action_kind TEXT NOT NULL,
    detail TEXT,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_point_events_day ON point_events(day);
CREATE INDEX IF NOT EXISTS idx_point_events_salesperson_day ON point_events(salesperson_id, day);
"#;

/// SQL for creating the daily tally table.
pub const CREATE_DAILY_TALLIES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS daily_tallies (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    salesperson_id INTEGER NOT NULL REFERENCES salespeople(id),
    day TEXT NOT NULL,
    leads INTEGER NOT NULL DEFAULT 0,
    interviews_scheduled INTEGER NOT NULL DEFAULT 0,
    interviews_completed INTEGER NOT NULL DEFAULT 0,
    conversions INTEGER NOT NULL DEFAULT 0,
    sales INTEGER NOT NULL DEFAULT 0,
    avg_ticket REAL NOT NULL DEFAULT 0,
    revenue REAL NOT NULL DEFAULT 0,
    points INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    UNIQUE (salesperson_id, day)
);
"#;

/// SQL for creating the missions table.
pub const CREATE_MISSIONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS missions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    salesperson_id INTEGER NOT NULL REFERENCES salespeople(id),
    title TEXT NOT NULL,
    description TEXT,
    kind TEXT NOT NULL,
    category TEXT,
    target INTEGER NOT NULL,
    progress INTEGER NOT NULL DEFAULT 0,
    reward_xp INTEGER NOT NULL DEFAULT 0,
    status TEXT NOT NULL DEFAULT 'active',
    starts_on TEXT NOT NULL,
    ends_on TEXT,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_missions_salesperson_status ON missions(salesperson_id, status);
"#;

/// SQL for creating the badges table.
pub const CREATE_BADGES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS badges (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    salesperson_id INTEGER NOT NULL REFERENCES salespeople(id),
    name TEXT NOT NULL,
    icon TEXT NOT NULL DEFAULT '🏆',
    description TEXT,
    rarity TEXT NOT NULL DEFAULT 'common',
    awarded_at TEXT NOT NULL,
    UNIQUE (salesperson_id, name)
);
"#;

/// SQL for creating the coach message log table.
pub const CREATE_COACH_MESSAGES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS coach_messages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    salesperson_id INTEGER NOT NULL REFERENCES salespeople(id),
    body TEXT NOT NULL,
    kind TEXT NOT NULL,
    sent INTEGER NOT NULL DEFAULT 0,
    sent_at TEXT,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_coach_messages_sent ON coach_messages(sent);
"#;

/// SQL for creating the conversations table.
pub const CREATE_CONVERSATIONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS conversations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    salesperson_id INTEGER NOT NULL REFERENCES salespeople(id),
    customer_name TEXT,
    customer_phone TEXT,
    channel TEXT NOT NULL,
    transcript TEXT NOT NULL,
    duration_secs INTEGER,
    happened_at TEXT NOT NULL,
    stage_score REAL NOT NULL DEFAULT 0,
    quality_score REAL NOT NULL DEFAULT 0,
    objection_score REAL NOT NULL DEFAULT 0,
    outcome_score REAL NOT NULL DEFAULT 0,
    overall_score REAL NOT NULL DEFAULT 0,
    stages_met TEXT NOT NULL DEFAULT '[]',
    improvements TEXT NOT NULL DEFAULT '[]',
    outcome TEXT NOT NULL DEFAULT 'unscored',
    analyzed INTEGER NOT NULL DEFAULT 0,
    analyzed_at TEXT,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_conversations_salesperson ON conversations(salesperson_id);
"#;

/// All table creation statements, in dependency order.
pub const CREATE_TABLES: &[&str] = &[
    CREATE_SALESPEOPLE_TABLE,
    CREATE_POINT_EVENTS_TABLE,
    CREATE_DAILY_TALLIES_TABLE,
    CREATE_MISSIONS_TABLE,
    CREATE_BADGES_TABLE,
    CREATE_COACH_MESSAGES_TABLE,
    CREATE_CONVERSATIONS_TABLE,
];
