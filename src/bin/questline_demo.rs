//! questline-demo: seed a small demo roster.
//!
//! Creates five salespeople with a month of daily history, themed badge
//! sets, and active missions, so the dashboard has something to show on a
//! fresh database. Run once against an empty database.

use std::sync::Arc;

use chrono::{Duration, Local, NaiveDate};
use rand::Rng;
use tracing::info;

use questline::config::Config;
use questline::domain::{
    ActionKind, MissionCategory, MissionKind, NewBadge, NewMission, NewPointEvent, NewSalesperson,
    Rarity, TallyDelta,
};
use questline::engine::leveling;
use questline::interfaces::GameStore;
use questline::storage::init_storage;
use questline::utils::bootstrap;

struct DemoRep {
    name: &'static str,
    phone: &'static str,
    email: &'static str,
    avatar: &'static str,
    xp_total: i64,
    /// (leads, interviews, conversions, sales) daily ranges.
    leads: (i64, i64),
    interviews: (i64, i64),
    conversions: (i64, i64),
    sales: (i64, i64),
    badges: &'static [&'static str],
}

const ROSTER: &[DemoRep] = &[
    DemoRep {
        name: "Diego Santos",
        phone: "5511987654321",
        email: "diego.santos@questline.app",
        avatar: "🔥",
        xp_total: 2847,
        leads: (40, 60),
        interviews: (3, 5),
        conversions: (1, 3),
        sales: (1, 2),
        badges: &["Hat Trick", "Speed Demon", "Closer King", "First Blood"],
    },
    DemoRep {
        name: "Mariana Costa",
        phone: "5511987654322",
        email: "mariana.costa@questline.app",
        avatar: "⭐",
        xp_total: 1923,
        leads: (35, 50),
        interviews: (2, 4),
        conversions: (1, 2),
        sales: (0, 2),
        badges: &["Marathon Runner", "Steady Eddie", "First Blood"],
    },
    DemoRep {
        name: "Carlos Almeida",
        phone: "5511987654323",
        email: "carlos.almeida@questline.app",
        avatar: "🎯",
        xp_total: 876,
        leads: (25, 40),
        interviews: (1, 3),
        conversions: (0, 2),
        sales: (0, 1),
        badges: &["First Blood", "Rising Star"],
    },
    DemoRep {
        name: "Ana Paula",
        phone: "5511987654324",
        email: "ana.paula@questline.app",
        avatar: "💎",
        xp_total: 456,
        leads: (20, 35),
        interviews: (1, 2),
        conversions: (0, 1),
        sales: (0, 1),
        badges: &["Rookie", "First Blood"],
    },
    DemoRep {
        name: "Rafael Souza",
        phone: "5511987654325",
        email: "rafael.souza@questline.app",
        avatar: "👑",
        xp_total: 4102,
        leads: (45, 65),
        interviews: (4, 6),
        conversions: (2, 3),
        sales: (1, 3),
        badges: &["Legend", "Unstoppable", "Team Leader", "Hat Trick", "Closer King"],
    },
];

/// Badge catalog: name -> (icon, description, rarity).
const BADGES: &[(&str, &str, &str, Rarity)] = &[
    ("First Blood", "🩸", "Primeira venda realizada", Rarity::Common),
    ("Hat Trick", "🎩", "3 vendas em um único dia", Rarity::Rare),
    ("Speed Demon", "⚡", "Conversão em menos de 24h", Rarity::Rare),
    ("Closer King", "👑", "10 vendas em uma semana", Rarity::Epic),
    ("Marathon Runner", "🏃", "30 dias consecutivos ativos", Rarity::Epic),
    ("Steady Eddie", "🎯", "Bater meta 7 dias seguidos", Rarity::Rare),
    ("Rising Star", "🌟", "Subir 3 níveis em 1 mês", Rarity::Rare),
    ("Rookie", "🐣", "Primeira semana completa", Rarity::Common),
    ("Legend", "🏆", "Alcançar nível 20+", Rarity::Legendary),
    ("Unstoppable", "🔥", "50 vendas totais", Rarity::Epic),
    ("Team Leader", "👨‍💼", "#1 no ranking mensal", Rarity::Epic),
];

fn badge_info(name: &str) -> Option<&'static (&'static str, &'static str, &'static str, Rarity)> {
    BADGES.iter().find(|(n, _, _, _)| *n == name)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    bootstrap::init_tracing();

    let config_path = bootstrap::parse_config_path();
    let config = Config::load(config_path.as_deref())?;
    let rules = Arc::new(config.rules.clone());
    let store = init_storage(&config.storage, Arc::clone(&rules)).await?;

    info!("Seeding demo roster");

    let today = Local::now().date_naive();
    let mut rng = rand::rng();

    for rep in ROSTER {
        // Level always derives from XP, even in seeded rosters.
        let level = leveling::level_for_xp(&rules.levels, rep.xp_total).level;
        let sp = store
            .insert_salesperson(&NewSalesperson {
                name: rep.name.to_string(),
                phone: rep.phone.to_string(),
                email: Some(rep.email.to_string()),
                avatar: rep.avatar.to_string(),
                level,
                xp_total: rep.xp_total,
            })
            .await?;
        info!(name = rep.name, level = level, xp = rep.xp_total, "salesperson created");

        seed_daily_history(&*store, &rules, sp.id, rep, today, &mut rng).await?;
        seed_badges(&*store, sp.id, rep).await?;
        seed_missions(&*store, sp.id, today, &mut rng).await?;
    }

    info!(salespeople = ROSTER.len(), "demo data ready");
    Ok(())
}

async fn seed_daily_history(
    store: &dyn GameStore,
    rules: &questline::config::GameRules,
    salesperson_id: i64,
    rep: &DemoRep,
    today: NaiveDate,
    rng: &mut impl Rng,
) -> Result<(), Box<dyn std::error::Error>> {
    const DAYS: i64 = 30;

    for offset in 0..DAYS {
        let day = today - Duration::days(DAYS - offset - 1);

        let leads = rng.random_range(rep.leads.0..=rep.leads.1);
        let interviews_scheduled = rng.random_range(rep.interviews.0..=rep.interviews.1);
        let interviews_completed = rng.random_range(0..=interviews_scheduled);
        let conversions = rng.random_range(rep.conversions.0..=rep.conversions.1);
        let sales = rng.random_range(rep.sales.0..=rep.sales.1);
        let avg_ticket = if sales > 0 {
            rng.random_range(3000..=15000) as f64
        } else {
            0.0
        };
        let revenue = avg_ticket * sales as f64;

        let points = leads * rules.points.lead_reached
            + interviews_scheduled * rules.points.interview_scheduled
            + interviews_completed * rules.points.interview_completed
            + conversions * rules.points.conversion
            + sales * rules.points.sale;

        store
            .upsert_tally(
                salesperson_id,
                day,
                &TallyDelta {
                    leads,
                    interviews_scheduled,
                    interviews_completed,
                    conversions,
                    sales,
                    revenue,
                    points,
                },
            )
            .await?;

        if leads > 0 {
            store
                .insert_point_event(&NewPointEvent {
                    salesperson_id,
                    day,
                    points: leads * rules.points.lead_reached,
                    action_kind: ActionKind::LeadReached,
                    detail: Some(format!("{leads} leads alcançados")),
                })
                .await?;
        }
        if sales > 0 {
            store
                .insert_point_event(&NewPointEvent {
                    salesperson_id,
                    day,
                    points: sales * rules.points.sale,
                    action_kind: ActionKind::Sale,
                    detail: Some(format!("{sales} vendas (R$ {revenue:.2})")),
                })
                .await?;
        }
    }

    Ok(())
}

async fn seed_badges(
    store: &dyn GameStore,
    salesperson_id: i64,
    rep: &DemoRep,
) -> Result<(), Box<dyn std::error::Error>> {
    for name in rep.badges {
        if let Some((badge_name, icon, description, rarity)) = badge_info(name) {
            store
                .grant_badge(&NewBadge {
                    salesperson_id,
                    name: badge_name.to_string(),
                    icon: icon.to_string(),
                    description: Some(description.to_string()),
                    rarity: *rarity,
                })
                .await?;
        }
    }
    Ok(())
}

async fn seed_missions(
    store: &dyn GameStore,
    salesperson_id: i64,
    today: NaiveDate,
    rng: &mut impl Rng,
) -> Result<(), Box<dyn std::error::Error>> {
    let templates = [
        (
            "Alcance 40 leads hoje",
            "Meta diária de prospecção",
            MissionKind::Daily,
            Some(MissionCategory::Leads),
            40,
            rng.random_range(0..=35),
            50,
            1,
        ),
        (
            "Realize 3 entrevistas",
            "Converta leads em entrevistas",
            MissionKind::Daily,
            Some(MissionCategory::Interviews),
            3,
            rng.random_range(0..=2),
            75,
            1,
        ),
        (
            "Feche 5 vendas esta semana",
            "Objetivo semanal de vendas",
            MissionKind::Weekly,
            Some(MissionCategory::Sales),
            5,
            rng.random_range(0..=4),
            200,
            7,
        ),
        (
            "Converta 3 entrevistas seguidas",
            "Side quest de performance",
            MissionKind::SideQuest,
            Some(MissionCategory::Interviews),
            3,
            rng.random_range(0..=2),
            150,
            7,
        ),
    ];

    for (title, description, kind, category, target, progress, reward_xp, days) in templates {
        store
            .insert_mission(&NewMission {
                salesperson_id,
                title: title.to_string(),
                description: Some(description.to_string()),
                kind,
                category,
                target,
                progress,
                reward_xp,
                starts_on: today,
                ends_on: Some(today + Duration::days(days)),
            })
            .await?;
    }
    Ok(())
}
