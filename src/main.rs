use std::sync::Arc;

use clap::Parser;
use colored::Colorize;
use study_buddy::{
    answers::AnswerResolver,
    cli::{Cli, Command, Settings},
    error::{ServiceError, ServiceResult},
    metadata::{PKG_NAME, PKG_VERSION},
    quiz::QuizGenerator,
    server::{self, AppState},
    storage::{ANSWER_CACHE_FILE, JsonStore},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ServiceResult<()> {
    // A missing .env is normal; the environment may already be set.
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    cli.settings.validate().map_err(ServiceError::FromString)?;

    match cli.command {
        Command::Serve => serve(&cli.settings).await,
        Command::Status => {
            print_status(&cli.settings);
            Ok(())
        }
        Command::Version => {
            println!("{PKG_NAME} {PKG_VERSION}");
            Ok(())
        }
        Command::Ask { subject, question } => {
            let settings = cli.settings.clone();
            let answer = tokio::task::spawn_blocking(move || -> ServiceResult<String> {
                let cache = JsonStore::load(settings.data_dir.join(ANSWER_CACHE_FILE))?;
                let mut resolver = AnswerResolver::new(cache, settings.generator());
                Ok(resolver.resolve(&subject, &question))
            })
            .await
            .map_err(|e| ServiceError::Other(format!("spawn_blocking failed: {e}")))??;
            println!("{answer}");
            Ok(())
        }
        Command::Quiz {
            subject,
            count,
            difficulty,
        } => {
            let quizzes = QuizGenerator::new(cli.settings.generator());
            let mcqs = tokio::task::spawn_blocking(move || {
                quizzes.generate(&subject, count, &difficulty)
            })
            .await
            .map_err(|e| ServiceError::Other(format!("spawn_blocking failed: {e}")))?;
            println!("{}", serde_json::to_string_pretty(&mcqs)?);
            Ok(())
        }
    }
}

async fn serve(settings: &Settings) -> ServiceResult<()> {
    tracing::info!("Starting {PKG_NAME} v{PKG_VERSION}");

    let generator = settings.generator();
    if generator.is_none() {
        tracing::warn!(
            "GEMINI_API_KEY not set; AI answers, quizzes and study plans fall back to defaults"
        );
    }

    let state = AppState::open(&settings.data_dir, generator)?;
    let addr = settings.socket_addr().map_err(ServiceError::FromString)?;
    server::serve(addr, Arc::new(state)).await
}

fn print_status(settings: &Settings) {
    let ai = if settings.has_credential() {
        "configured".green()
    } else {
        "disabled (no GEMINI_API_KEY)".yellow()
    };
    println!("{} {}", PKG_NAME.bold(), PKG_VERSION);
    println!("  {:<12} {}", "data dir:", settings.data_dir.display());
    println!("  {:<12} {}", "http addr:", settings.http_addr);
    println!("  {:<12} {}", "ai:", ai);
    println!("  {:<12} {}", "model:", settings.model);
    println!("  {:<12} {}", "api base:", settings.api_base);
    println!("  {:<12} {}s", "ai timeout:", settings.ai_timeout_secs);
}
