/// Clinic - command-line driver for the clinic client core
///
/// Resolves the session from the stored token and reports where the
/// principal would land.
///
/// Usage:
///   clinic [status] [path]
///   clinic login <email> <password>
///   clinic logout

use clinic_core::{
    navigation_for, resolve_route, validation, AppContext, ClientConfig, ClinicResult, Outcome,
    SessionStatus,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ClinicResult<()> {
    // Load configuration
    let config = ClientConfig::from_env()?;

    // Initialize logging
    let json = config.logging.json;
    let level = config.logging.level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("clinic_core={0},clinic={0}", level).into()),
        )
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(tracing_subscriber::fmt::layer))
        .init();

    // Print banner
    print_banner();

    // Create application context
    let ctx = AppContext::new(config).await?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("login") => {
            let (Some(email), Some(password)) = (args.get(1), args.get(2)) else {
                eprintln!("usage: clinic login <email> <password>");
                std::process::exit(2);
            };
            login(&ctx, email, password).await;
        }
        Some("logout") => {
            ctx.session.logout();
            println!("Signed out");
        }
        Some("status") => status(&ctx, args.get(1).map_or("/", String::as_str)).await,
        Some(path) => status(&ctx, path).await,
        None => status(&ctx, "/").await,
    }

    Ok(())
}

async fn login(ctx: &AppContext, email: &str, password: &str) {
    if let Err(errors) = validation::validate_sign_in(email, password) {
        for error in errors {
            eprintln!("{}: {}", error.field, error.message);
        }
        std::process::exit(2);
    }

    match Outcome::from(ctx.session.login(email, password).await) {
        Outcome::Success {
            value: principal, ..
        } => {
            println!(
                "Signed in as {} ({})",
                principal.display_name,
                principal.role.display_name()
            );
            if principal.must_change_password {
                println!("A password change is required");
            }
            println!("Home: {}", principal.role.home_route());
        }
        Outcome::Failure(report) => {
            eprintln!("{}", report.message);
            std::process::exit(1);
        }
    }
}

async fn status(ctx: &AppContext, path: &str) {
    let status = ctx.start().await;
    let session = ctx.session.session();

    match (status, session.principal()) {
        (SessionStatus::Authenticated, Some(principal)) => {
            println!(
                "Signed in as {} <{}> ({})",
                principal.display_name,
                principal.email,
                principal.role.display_name()
            );
            for item in navigation_for(principal.role).iter().filter(|i| i.accessible) {
                println!("  {} {}", item.path, item.label);
            }

            let index = ctx.index();
            println!(
                "Users: {}  Patients: {}  Appointments: {}  Records: {}",
                ctx.users.len(),
                ctx.patients.len(),
                ctx.appointments.len(),
                ctx.records.len()
            );
            let today = chrono::Local::now().date_naive();
            let doctor = (principal.role == clinic_core::models::Role::Doctor)
                .then_some(principal.id.as_str());
            println!(
                "This week: {} appointment(s)",
                index.this_week_appointments(today, doctor).len()
            );
        }
        _ => println!("Not signed in"),
    }

    println!("{} -> {}", path, resolve_route(&session, path).path());
}

fn print_banner() {
    println!(
        r#"
   _____ _ _       _
  / ____| (_)     (_)
 | |    | |_ _ __  _  ___
 | |    | | | '_ \| |/ __|
 | |____| | | | | | | (__
  \_____|_|_|_| |_|_|\___|

        Clinic client core v{}
        "#,
        env!("CARGO_PKG_VERSION")
    );
}
