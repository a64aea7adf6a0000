use chrono::{Duration, Utc};
use clap::Parser;
use lectern::{
    config::Settings,
    domain::{AnnouncementDraft, AnnouncementPriority, DisplayType, MarkFaqRequest},
    service::ServiceContext,
};
use sqlx::sqlite::SqlitePoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Populate a database with demo users, questions, FAQ entries and announcements.
#[derive(Parser, Debug)]
#[command(name = "seed")]
struct Args {
    /// Database URL, overrides the configured one
    #[arg(long)]
    database_url: Option<String>,

    /// Also mark the demo announcements as read by the demo student
    #[arg(long)]
    with_reads: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let settings = Settings::new().unwrap_or_else(|e| {
        eprintln!("Failed to load config: {}. Using defaults.", e);
        Settings::default()
    });

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| settings.logging.filter.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("🌱 Starting database seeding...");

    let database_url = args.database_url.unwrap_or_else(|| settings.database.url.clone());
    let db_pool = SqlitePoolOptions::new()
        .max_connections(settings.database.max_connections)
        .connect(&database_url)
        .await?;

    // Run migrations first
    println!("📋 Running migrations...");
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await?;

    // Forum users, questions and answers belong to the rest of the
    // application; insert them directly.
    println!("👥 Creating users and questions...");
    let staff_id = insert_user(&db_pool, "Dr. Rivera", "STAFF").await?;
    let admin_id = insert_user(&db_pool, "Site Admin", "ADMIN").await?;
    let student_id = insert_user(&db_pool, "Sam Student", "STUDENT").await?;

    let resolved = insert_question(&db_pool, "How do I submit homework late?", true).await?;
    let open = insert_question(&db_pool, "Is the midterm curved?", false).await?;
    println!("  ✅ Created 3 users and 2 questions");

    let context = ServiceContext::new(db_pool.clone(), &settings.moderation);

    println!("📚 Curating FAQ entries...");
    context.faq_service.mark_as_faq(MarkFaqRequest {
        question_id: resolved,
        category: "Coursework".to_string(),
        display_title: "Late homework submissions".to_string(),
        staff_notes: Some("Policy confirmed with the registrar".to_string()),
    }, Some(staff_id)).await?;

    // Refused: no accepted solution yet.
    if let Err(e) = context.faq_service.mark_as_faq(MarkFaqRequest {
        question_id: open,
        category: "Exams".to_string(),
        display_title: "Midterm grading".to_string(),
        staff_notes: None,
    }, Some(staff_id)).await {
        println!("  ⚠️  Skipped unresolved question: {}", e);
    }
    println!("  ✅ Created 1 FAQ entry");

    println!("📢 Creating announcements...");
    let now = Utc::now();
    let maintenance = context.announcement_service.create(AnnouncementDraft {
        title: "Scheduled downtime".to_string(),
        content: "The forum will be offline Saturday 02:00-04:00 UTC.".to_string(),
        priority: AnnouncementPriority::Urgent,
        start_date: now - Duration::days(1),
        end_date: Some(now + Duration::days(6)),
        display_type: DisplayType::ShowAlways,
    }, Some(admin_id)).await?;

    let welcome = context.announcement_service.create(AnnouncementDraft {
        title: "Welcome to the course forum".to_string(),
        content: "Search the FAQ before posting a new question.".to_string(),
        priority: AnnouncementPriority::Normal,
        start_date: now - Duration::days(30),
        end_date: None,
        display_type: DisplayType::ShowOnce,
    }, Some(staff_id)).await?;

    context.announcement_service.create(AnnouncementDraft {
        title: "Final exam room change".to_string(),
        content: "The final moves to Hall B.".to_string(),
        priority: AnnouncementPriority::Important,
        start_date: now + Duration::days(14),
        end_date: Some(now + Duration::days(21)),
        display_type: DisplayType::ShowOnce,
    }, Some(staff_id)).await?;
    println!("  ✅ Created 3 announcements");

    if args.with_reads {
        context.announcement_service.mark_read(welcome.id, student_id).await?;
        context.announcement_service.mark_read(maintenance.id, student_id).await?;
        println!("  ✅ Marked announcements read for the demo student");
    }

    let visible = context.announcement_service.list_active_for_user(student_id).await?;
    println!("\n✨ Database seeding complete!");
    println!("  Student {} currently sees {} announcement(s)", student_id, visible.len());

    Ok(())
}

async fn insert_user(pool: &sqlx::SqlitePool, name: &str, role: &str) -> anyhow::Result<i64> {
    let result = sqlx::query("INSERT INTO users (display_name, role) VALUES (?, ?)")
        .bind(name)
        .bind(role)
        .execute(pool)
        .await?;
    Ok(result.last_insert_rowid())
}

async fn insert_question(pool: &sqlx::SqlitePool, title: &str, solved: bool) -> anyhow::Result<i64> {
    let question_id = sqlx::query("INSERT INTO questions (title) VALUES (?)")
        .bind(title)
        .execute(pool)
        .await?
        .last_insert_rowid();

    sqlx::query("INSERT INTO answers (question_id, is_solution) VALUES (?, ?)")
        .bind(question_id)
        .bind(solved)
        .execute(pool)
        .await?;

    Ok(question_id)
}
