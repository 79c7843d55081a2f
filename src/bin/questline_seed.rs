//! questline-seed: rebuild the database with a realistic 15-person roster.
//!
//! Wipes every table, then creates salespeople across four performer
//! profiles, 60 days of weekday-weighted activity history, and sample
//! analyzed conversations for the first ten people.

use std::sync::Arc;

use chrono::{Datelike, Duration, Local, Utc, Weekday};
use rand::Rng;
use tracing::info;

use questline::config::{Config, GameRules};
use questline::domain::{
    ActionKind, Channel, ConversationAnalysis, NewConversation, NewPointEvent, NewSalesperson,
    TallyDelta,
};
use questline::engine::leveling;
use questline::interfaces::GameStore;
use questline::storage::init_storage;
use questline::utils::bootstrap;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Profile {
    Top,
    High,
    Mid,
    Low,
}

struct SeedRep {
    name: &'static str,
    avatar: &'static str,
    profile: Profile,
    multiplier: f64,
}

const ROSTER: &[SeedRep] = &[
    // Top performers (120-150% of goal).
    SeedRep { name: "Rafael Souza", avatar: "👑", profile: Profile::Top, multiplier: 1.45 },
    SeedRep { name: "Mariana Costa", avatar: "🔥", profile: Profile::Top, multiplier: 1.35 },
    SeedRep { name: "Diego Santos", avatar: "⭐", profile: Profile::Top, multiplier: 1.25 },
    // High performers (90-119%).
    SeedRep { name: "Ana Paula Silva", avatar: "💎", profile: Profile::High, multiplier: 1.15 },
    SeedRep { name: "Lucas Oliveira", avatar: "🚀", profile: Profile::High, multiplier: 1.10 },
    SeedRep { name: "Juliana Mendes", avatar: "🎯", profile: Profile::High, multiplier: 1.05 },
    SeedRep { name: "Pedro Almeida", avatar: "⚡", profile: Profile::High, multiplier: 0.95 },
    // Mid performers (60-89%).
    SeedRep { name: "Camila Rodrigues", avatar: "🌟", profile: Profile::Mid, multiplier: 0.85 },
    SeedRep { name: "Fernando Lima", avatar: "📊", profile: Profile::Mid, multiplier: 0.78 },
    SeedRep { name: "Beatriz Fernandes", avatar: "💪", profile: Profile::Mid, multiplier: 0.72 },
    SeedRep { name: "Gustavo Pereira", avatar: "🎲", profile: Profile::Mid, multiplier: 0.68 },
    SeedRep { name: "Renata Santos", avatar: "🏃", profile: Profile::Mid, multiplier: 0.62 },
    // Low performers (30-59%).
    SeedRep { name: "Carlos Eduardo", avatar: "🌱", profile: Profile::Low, multiplier: 0.55 },
    SeedRep { name: "Patricia Souza", avatar: "📚", profile: Profile::Low, multiplier: 0.45 },
    SeedRep { name: "Roberto Silva", avatar: "🔰", profile: Profile::Low, multiplier: 0.35 },
];

const MONTHLY_CONVERSION_GOAL: f64 = 15.0;
const MONTHLY_SALES_GOAL: f64 = 8.0;

/// (transcript, outcome, expected overall score)
const CONVERSATION_SAMPLES: &[(&str, &str, f64)] = &[
    (
        "Vendedor: Bom dia! Meu nome é {rep}, sou consultor comercial. Vi que você \
         se cadastrou no nosso site procurando uma solução de gamificação.\n\
         Cliente: Sim, nossa equipe está desmotivada e as metas não estão sendo batidas.\n\
         Vendedor: Entendo. Qual é o principal desafio com a motivação da equipe hoje?\n\
         Cliente: Falta de visibilidade. Eles não sabem como estão comparados aos outros.\n\
         Vendedor: É exatamente isso que resolvemos: ranking em tempo real, pontos, \
         níveis e um coach de IA. Posso agendar uma demonstração para amanhã às 14h?\n\
         Cliente: Perfeito, vamos agendar.",
        "scheduled",
        9.0,
    ),
    (
        "Vendedor: Oi! Como posso ajudar?\n\
         Cliente: Queria saber mais sobre o produto.\n\
         Vendedor: A gente tem uma plataforma muito boa de gamificação.\n\
         Cliente: Quanto custa?\n\
         Vendedor: R$ 99 por usuário.\n\
         Cliente: Muito caro. Obrigado.\n\
         Vendedor: Ok, tchau.",
        "lost",
        3.5,
    ),
    (
        "Vendedor: Boa tarde! Aqui é {rep}. Você baixou nosso e-book sobre gamificação \
         de vendas, achou útil?\n\
         Cliente: Sim, muito interessante. Hoje controlamos tudo no Excel.\n\
         Vendedor: E os vendedores conseguem ver como estão performando?\n\
         Cliente: Não muito bem, eu compilo tudo manualmente toda semana.\n\
         Vendedor: Nossa solução automatiza isso e os próprios vendedores veem o \
         ranking ao vivo. A implementação leva um dia. Te mando uma proposta?\n\
         Cliente: Manda sim, vou analisar com a diretoria.",
        "interested",
        8.2,
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    bootstrap::init_tracing();

    let config_path = bootstrap::parse_config_path();
    let config = Config::load(config_path.as_deref())?;
    let rules = Arc::new(config.rules.clone());
    let store = init_storage(&config.storage, Arc::clone(&rules)).await?;

    info!("Wiping existing data");
    store.wipe().await?;

    let mut rng = rand::rng();
    let today = Local::now().date_naive();
    let mut ids = Vec::with_capacity(ROSTER.len());

    info!(count = ROSTER.len(), "Creating roster");
    for (idx, rep) in ROSTER.iter().enumerate() {
        let phone = format!("5511{:04}{:04}", 9000 + idx + 1, rng.random_range(1000..10000));
        let email = format!(
            "{}@questline.app",
            rep.name.to_lowercase().replace(' ', ".")
        );
        let xp_total = rng.random_range(100..=5000);
        let level = leveling::level_for_xp(&rules.levels, xp_total).level;

        let sp = store
            .insert_salesperson(&NewSalesperson {
                name: rep.name.to_string(),
                phone,
                email: Some(email),
                avatar: rep.avatar.to_string(),
                level,
                xp_total,
            })
            .await?;
        ids.push(sp.id);
    }

    info!("Generating 60 days of history");
    for (rep, &id) in ROSTER.iter().zip(&ids) {
        seed_history(&*store, &rules, id, rep, today, &mut rng).await?;
    }

    info!("Creating sample conversations");
    for (rep, &id) in ROSTER.iter().zip(&ids).take(10) {
        seed_conversations(&*store, id, rep, &mut rng).await?;
    }

    info!(
        salespeople = ROSTER.len(),
        days = 60,
        "seed complete"
    );
    Ok(())
}

async fn seed_history(
    store: &dyn GameStore,
    rules: &GameRules,
    salesperson_id: i64,
    rep: &SeedRep,
    today: chrono::NaiveDate,
    rng: &mut impl Rng,
) -> Result<(), Box<dyn std::error::Error>> {
    const DAYS: i64 = 60;
    let start = today - Duration::days(DAYS);

    for offset in 0..DAYS {
        let day = start + Duration::days(offset);

        // Mondays run hot, Saturdays cold, Sundays off.
        let day_factor = match day.weekday() {
            Weekday::Mon => 1.3,
            Weekday::Sat => 0.4,
            Weekday::Sun => continue,
            _ => 1.0,
        };

        let spread = rng.random_range(0.8..1.2);
        let leads = (rules.daily_targets.leads as f64 * rep.multiplier * day_factor * spread)
            as i64;
        let interviews = (rules.daily_targets.interviews as f64
            * rep.multiplier
            * day_factor
            * rng.random_range(0.7..1.3)) as i64;
        let conversions = i64::from(
            rng.random_bool((MONTHLY_CONVERSION_GOAL / 30.0 * rep.multiplier).clamp(0.0, 1.0)),
        );
        let sales = i64::from(
            rng.random_bool((MONTHLY_SALES_GOAL / 30.0 * rep.multiplier).clamp(0.0, 1.0)),
        );

        let ticket = if sales > 0 {
            rng.random_range(3000.0..8000.0)
        } else {
            0.0
        };
        let revenue = ticket * sales as f64;

        let points = leads * rules.points.lead_reached
            + interviews * rules.points.interview_scheduled
            + interviews * rules.points.interview_completed
            + conversions * rules.points.conversion
            + sales * rules.points.sale;

        store
            .upsert_tally(
                salesperson_id,
                day,
                &TallyDelta {
                    leads,
                    interviews_scheduled: interviews,
                    interviews_completed: interviews,
                    conversions,
                    sales,
                    revenue,
                    points,
                },
            )
            .await?;

        for (kind, count, value) in [
            (ActionKind::LeadReached, leads, leads * rules.points.lead_reached),
            (
                ActionKind::InterviewCompleted,
                interviews,
                interviews * rules.points.interview_completed,
            ),
            (
                ActionKind::Conversion,
                conversions,
                conversions * rules.points.conversion,
            ),
            (ActionKind::Sale, sales, sales * rules.points.sale),
        ] {
            if count > 0 {
                store
                    .insert_point_event(&NewPointEvent {
                        salesperson_id,
                        day,
                        points: value,
                        action_kind: kind,
                        detail: Some(format!("{count}x {}", kind.as_str())),
                    })
                    .await?;
            }
        }
    }

    Ok(())
}

async fn seed_conversations(
    store: &dyn GameStore,
    salesperson_id: i64,
    rep: &SeedRep,
    rng: &mut impl Rng,
) -> Result<(), Box<dyn std::error::Error>> {
    let first_name = rep.name.split(' ').next().unwrap_or(rep.name);
    let count = rng.random_range(3..=8);

    for _ in 0..count {
        let (template, outcome, expected) =
            CONVERSATION_SAMPLES[rng.random_range(0..CONVERSATION_SAMPLES.len())];
        let transcript = template.replace("{rep}", first_name);

        // Better profiles trend above the sample's expected score.
        let shift = match rep.profile {
            Profile::Top => rng.random_range(0.0..1.0),
            Profile::High => rng.random_range(-0.5..0.5),
            Profile::Mid => rng.random_range(-1.0..0.0),
            Profile::Low => rng.random_range(-1.5..-0.5),
        };
        let base = (expected + shift).clamp(0.0, 10.0);

        let analysis = ConversationAnalysis {
            stage_score: jitter(base, 0.5, rng),
            quality_score: jitter(base, 0.5, rng),
            objection_score: jitter(base, 1.0, rng),
            outcome_score: jitter(base, 0.7, rng),
            overall_score: (base * 10.0).round() / 10.0,
            stages_met: vec![
                "saudacao".to_string(),
                "identificacao".to_string(),
                "descoberta".to_string(),
                "solucao".to_string(),
            ],
            improvements: vec![
                "Melhorar tratamento de objeções".to_string(),
                "Ser mais assertivo no fechamento".to_string(),
            ],
            outcome: outcome.to_string(),
            summary: None,
        };

        let is_call = rng.random_bool(0.5);
        store
            .insert_conversation(
                &NewConversation {
                    salesperson_id,
                    customer_name: Some(format!("Cliente {}", rng.random_range(1000..10000))),
                    customer_phone: Some(format!("5511{}", rng.random_range(90000000..100000000))),
                    channel: if is_call { Channel::Call } else { Channel::Whatsapp },
                    transcript,
                    duration_secs: is_call.then(|| rng.random_range(120..600)),
                    happened_at: Utc::now() - Duration::days(rng.random_range(1..=30)),
                },
                &analysis,
            )
            .await?;
    }

    Ok(())
}

fn jitter(base: f64, spread: f64, rng: &mut impl Rng) -> f64 {
    let value = (base + rng.random_range(-spread..spread)).clamp(0.0, 10.0);
    (value * 10.0).round() / 10.0
}
