//! # autoecole — Platform Server CLI
//!
//! Serves the autoecole API. `serve --seed-demo` loads a demo school with a
//! manager and one approved teacher so a fresh instance can be exercised
//! end-to-end immediately.

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use autoecole_api::state::{AppConfig, AppState, SchoolRecord, TeacherRecord, UserRecord};
use autoecole_core::{Gender, Role, SchoolId, TeacherId, UserId};
use autoecole_enrollment::TeacherProfile;

#[derive(Parser)]
#[command(name = "autoecole", about = "Driving-school platform server", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the API server.
    Serve {
        /// Listen port.
        #[arg(long, env = "AUTOECOLE_PORT", default_value_t = AppConfig::DEFAULT_PORT)]
        port: u16,

        /// Emit logs as JSON lines instead of human-readable text.
        #[arg(long, env = "AUTOECOLE_LOG_JSON")]
        log_json: bool,

        /// Seed a demo school, manager, and approved teacher at startup.
        #[arg(long)]
        seed_demo: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            port,
            log_json,
            seed_demo,
        } => serve(port, log_json, seed_demo).await,
    }
}

fn init_tracing(log_json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if log_json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn serve(port: u16, log_json: bool, seed_demo: bool) -> anyhow::Result<()> {
    init_tracing(log_json);

    let mut config = AppConfig::from_env();
    config.port = port;
    let state = AppState::with_config(config);

    if seed_demo {
        seed_demo_data(&state);
    }

    let app = autoecole_api::app(state);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "autoecole API listening");

    axum::serve(listener, app)
        .await
        .context("server terminated unexpectedly")?;
    Ok(())
}

/// Seed a demo school with a manager account and one approved teacher.
///
/// Replaces the ad-hoc seeding scripts that used to poke the HTTP API from
/// outside; fixtures land directly in the stores before the first request.
fn seed_demo_data(state: &AppState) {
    use autoecole_api::auth::{generate_salt, hash_password};

    let manager_salt = generate_salt();
    let manager = UserRecord {
        id: UserId::new(),
        email: "manager@demo.autoecole.dz".to_string(),
        password_digest: hash_password(&manager_salt, "manager123"),
        password_salt: manager_salt,
        first_name: "Demo".to_string(),
        last_name: "Manager".to_string(),
        phone: "0550000001".to_string(),
        address: "1 Rue Didouche Mourad".to_string(),
        date_of_birth: "1980-01-01".to_string(),
        gender: Gender::Male,
        state: "Alger".to_string(),
        role: Role::Manager,
        created_at: Utc::now(),
    };
    state.users.insert(manager.id, manager.clone());

    let school = SchoolRecord {
        id: SchoolId::new(),
        name: "Auto-École El Djazair".to_string(),
        address: "12 Boulevard Zighout Youcef".to_string(),
        state: "Alger".to_string(),
        phone: "0550000002".to_string(),
        email: "contact@eldjazair.dz".to_string(),
        description: "Demo driving school".to_string(),
        price: 25000.0,
        manager_id: manager.id,
        created_at: Utc::now(),
    };
    state.schools.insert(school.id, school.clone());

    let teacher_salt = generate_salt();
    let teacher_user = UserRecord {
        id: UserId::new(),
        email: "teacher@demo.autoecole.dz".to_string(),
        password_digest: hash_password(&teacher_salt, "teacher123"),
        password_salt: teacher_salt,
        first_name: "Demo".to_string(),
        last_name: "Teacher".to_string(),
        phone: "0550000003".to_string(),
        address: "3 Rue Larbi Ben M'hidi".to_string(),
        date_of_birth: "1985-01-01".to_string(),
        gender: Gender::Female,
        state: "Alger".to_string(),
        role: Role::Teacher,
        created_at: Utc::now(),
    };
    state.users.insert(teacher_user.id, teacher_user.clone());

    let teacher = TeacherRecord {
        profile: TeacherProfile {
            id: TeacherId::new(),
            user_id: teacher_user.id,
            school_id: school.id,
            gender: Gender::Female,
            can_teach_male: true,
            can_teach_female: true,
            approved: true,
        },
        first_name: "Demo".to_string(),
        last_name: "Teacher".to_string(),
        email: teacher_user.email.clone(),
        created_at: Utc::now(),
    };
    state.teachers.insert(teacher.profile.id, teacher);

    tracing::info!(
        school = %school.name,
        manager = %manager.email,
        "demo fixtures seeded (password: manager123 / teacher123)"
    );
}
