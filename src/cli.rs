// src/cli.rs
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::app::App;
use crate::app_log;
use crate::notification::{CsvMessageSource, MessageFilter, Notification};
use crate::onboarding::{OnboardingFlow, Questionnaire, ScriptedResponder, Stage};
use crate::ports::ApplicationSubmitter;
use crate::routes::{Navigation, RouteGuard};
use crate::types::{JobApplication, ResumeUpload};
use crate::utils::{normalize_language, parse_key_value};

#[derive(Parser)]
#[command(name = "jobmatch")]
#[command(about = "Session, messages, language and onboarding for the job matching demo")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Override the storage file from config.yaml
    #[arg(long, global = true)]
    pub storage: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Log in; any email and password are accepted
    Login {
        email: String,
        #[arg(long, default_value = "")]
        password: String,
    },
    /// Log out and clear the stored user
    Logout,
    /// Show the current session
    Whoami,
    /// Display language
    Lang {
        #[command(subcommand)]
        action: LangAction,
    },
    /// Message center
    Messages {
        #[command(subcommand)]
        action: MessageAction,

        /// Read messages from a CSV export instead of the demo feed
        #[arg(long, global = true)]
        source: Option<PathBuf>,
    },
    /// Check where navigating to a path would land
    Route { path: String },
    /// Run the onboarding wizard with prepared answers
    Onboard {
        /// Resume file (pdf, doc, docx)
        #[arg(long)]
        resume: PathBuf,
        /// question_id=value; multi-select values are comma separated
        #[arg(long = "answer")]
        answers: Vec<String>,
    },
    /// Submit a job application as the logged-in user
    Apply {
        job_id: String,
        #[arg(long)]
        cover_letter: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum LangAction {
    /// Show the active language
    Show,
    /// Switch language (zh or en)
    Set { code: String },
    /// List supported languages
    List,
    /// Translate keys with the active catalog
    Translate { keys: Vec<String> },
}

#[derive(Subcommand)]
pub enum MessageAction {
    /// List messages
    List {
        /// all, unread, or a message type
        #[arg(long, default_value = "all")]
        filter: MessageFilter,
        #[arg(long, default_value = "")]
        search: String,
    },
    /// Open a message (marks it read)
    Open { id: String },
    /// Mark one message read
    Read { id: String },
    /// Mark every message read
    ReadAll,
    /// Delete a message
    Delete { id: String },
}

pub async fn handle_command(cli: Cli, app: &mut App) -> Result<()> {
    match cli.command {
        Command::Login { email, password } => {
            if app.session.login(&email, &password) {
                let name = app.session.user().map(|u| u.name.as_str()).unwrap_or_default();
                println!("✅ Logged in as {} <{}>", name, email);
            }
        }

        Command::Logout => {
            app.session.logout();
            println!("Logged out");
        }

        Command::Whoami => {
            let session = app.session.session();
            if session.is_authenticated {
                println!("{}", serde_json::to_string_pretty(session)?);
            } else {
                println!("Not logged in");
            }
        }

        Command::Lang { action } => handle_lang(action, app),

        Command::Messages { action, source } => {
            let count = match source {
                Some(path) => {
                    let csv = CsvMessageSource::new(path);
                    app.load_messages(&csv).await
                }
                None => {
                    let demo = app.demo_source();
                    app.load_messages(&demo).await
                }
            };
            app_log!(info, "Loaded {} messages", count);
            handle_messages(action, app);
        }

        Command::Route { path } => {
            println!("{}", describe_navigation(&RouteGuard::resolve(&path, &app.session)));
        }

        Command::Onboard { resume, answers } => handle_onboard(resume, answers, app).await?,

        Command::Apply {
            job_id,
            cover_letter,
        } => {
            let email = match app.session.user() {
                Some(user) if app.session.is_authenticated() => user.email.clone(),
                _ => anyhow::bail!("Log in before applying"),
            };
            let application = JobApplication {
                job_id,
                applicant_email: email,
                cover_letter,
            };
            let receipt = app.submitter().submit(&application).await?;
            println!("{}", serde_json::to_string_pretty(&receipt)?);
        }
    }

    Ok(())
}

fn describe_navigation(navigation: &Navigation) -> String {
    match navigation {
        Navigation::Render(route) => format!("render {}", route.path()),
        Navigation::Redirect(target) => format!("redirect {}", target),
    }
}

fn handle_lang(action: LangAction, app: &mut App) {
    match action {
        LangAction::Show => {
            let language = app.locale.language();
            println!("{} {} ({})", language.flag(), language.display_name(), language);
        }
        LangAction::Set { code } => {
            let code = normalize_language(&code).unwrap_or(code.as_str()).to_string();
            if app.locale.change_language(&code) {
                println!("Language set to {}", app.locale.language());
            } else {
                println!("❌ Unsupported language: {}", code);
            }
        }
        LangAction::List => {
            for &language in app.locale.supported_languages() {
                let marker = if language == app.locale.language() { "*" } else { " " };
                println!("{} {} {} {}", marker, language, language.flag(), language.display_name());
            }
        }
        LangAction::Translate { keys } => {
            for key in &keys {
                println!("{} = {}", key, app.locale.translate(key));
            }
        }
    }
}

fn print_message(message: &Notification) {
    let marker = if message.is_read { " " } else { "●" };
    println!(
        "{} [{}] {:<12} {} ({})",
        marker,
        message.id,
        message.kind.as_str(),
        message.title,
        message.timestamp.format("%Y-%m-%d %H:%M")
    );
}

fn handle_messages(action: MessageAction, app: &mut App) {
    let store = &mut app.notifications;

    match action {
        MessageAction::List { filter, search } => {
            for message in store.filtered(filter, &search) {
                print_message(message);
            }
        }
        MessageAction::Open { id } => match store.open(&id) {
            Some(message) => {
                print_message(message);
                println!("\n{}", message.content);
                if let Some(url) = &message.action_url {
                    println!("\n→ {}", url);
                }
            }
            None => println!("❌ No message with id {}", id),
        },
        MessageAction::Read { id } => store.mark_as_read(&id),
        MessageAction::ReadAll => store.mark_all_as_read(),
        MessageAction::Delete { id } => store.delete_message(&id),
    }

    println!("{} unread of {}", store.unread_count(), store.messages().len());
}

async fn handle_onboard(resume: PathBuf, answers: Vec<String>, app: &mut App) -> Result<()> {
    if !app.session.is_authenticated() {
        anyhow::bail!("Log in before onboarding");
    }

    let size_bytes = tokio::fs::metadata(&resume)
        .await
        .with_context(|| format!("Failed to read resume file: {}", resume.display()))?
        .len();
    let file_name = resume
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let upload = ResumeUpload::new(file_name, size_bytes);

    let mut responder = ScriptedResponder::new();
    for arg in &answers {
        let (question_id, value) = parse_key_value(arg)?;
        let values = value
            .split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .collect();
        responder.insert(question_id, values);
    }

    let parser = app.resume_parser();
    let flow = OnboardingFlow::new(&parser, app.config.simulation.retry_policy());
    let result = flow
        .run(&upload, Questionnaire::default(), &mut responder, &|percent: u8| {
            println!("upload {:>3}%", percent)
        })
        .await?;

    for stage in Stage::ALL {
        println!("✓ {}", app.locale.translate(stage.label_key()));
    }
    if let Some(profile) = &result.resume {
        println!(
            "  {} ({}, {})",
            profile.basic_info.name,
            profile.work_experience.current_position.as_deref().unwrap_or(""),
            profile.work_experience.current_company.as_deref().unwrap_or("")
        );
    }
    for (question_id, answer) in &result.answers {
        println!("  {}: {}", question_id, answer.values().join(", "));
    }
    println!("✅ {}", app.locale.translate("onboarding_done_title"));
    println!("{}", app.locale.translate("onboarding_done_body"));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ConfigManager, MemoryStorage};
    use crate::locale::Language;
    use crate::routes::ONBOARDING_PATH;
    use std::path::Path;

    fn quiet_app() -> App {
        let mut config = ConfigManager::with_defaults("local", Path::new("/tmp"));
        config.simulation.upload_step_delay_ms = 0;
        config.simulation.submit_delay_ms = 0;
        config.simulation.fetch_delay_ms = 0;
        App::with_storage(config, MemoryStorage::shared())
    }

    async fn run(app: &mut App, args: &[&str]) -> Result<()> {
        let cli = Cli::try_parse_from(std::iter::once("jobmatch").chain(args.iter().copied()))?;
        handle_command(cli, app).await
    }

    fn resume_file(dir: &tempfile::TempDir) -> String {
        let path = dir.path().join("resume.pdf");
        std::fs::write(&path, b"%PDF-1.4 resume").unwrap();
        path.to_string_lossy().into_owned()
    }

    #[tokio::test]
    async fn test_login_whoami_logout() {
        let mut app = quiet_app();

        run(&mut app, &["login", "alice@example.com", "--password", "pw"]).await.unwrap();
        assert!(app.session.is_authenticated());
        assert_eq!(app.session.user().map(|u| u.name.as_str()), Some("alice"));
        run(&mut app, &["whoami"]).await.unwrap();

        run(&mut app, &["logout"]).await.unwrap();
        assert!(!app.session.is_authenticated());
        assert!(app.session.user().is_none());
        run(&mut app, &["whoami"]).await.unwrap();
    }

    #[tokio::test]
    async fn test_onboard_requires_login() {
        let dir = tempfile::tempdir().unwrap();
        let resume = resume_file(&dir);
        let mut app = quiet_app();

        let err = run(&mut app, &["onboard", "--resume", &resume]).await.unwrap_err();
        assert!(err.to_string().contains("Log in before onboarding"));
    }

    #[tokio::test]
    async fn test_onboard_with_repeated_company() {
        let dir = tempfile::tempdir().unwrap();
        let resume = resume_file(&dir);
        let mut app = quiet_app();
        run(&mut app, &["login", "dan@example.com"]).await.unwrap();

        run(
            &mut app,
            &[
                "onboard",
                "--resume",
                &resume,
                "--answer",
                "desired_position=Product Manager",
                "--answer",
                "desired_city=Wuhan",
                "--answer",
                "salary_range=25k-35k",
                "--answer",
                "work_type=Full-time",
                "--answer",
                "interested_companies=Tencent, Tencent",
            ],
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_apply_requires_login() {
        let mut app = quiet_app();

        let err = run(&mut app, &["apply", "job-42"]).await.unwrap_err();
        assert!(err.to_string().contains("Log in before applying"));

        run(&mut app, &["login", "erin@example.com"]).await.unwrap();
        run(&mut app, &["apply", "job-42", "--cover-letter", "Hello"]).await.unwrap();
    }

    #[tokio::test]
    async fn test_route_auth_when_logged_in() {
        let mut app = quiet_app();
        run(&mut app, &["login", "frank@example.com"]).await.unwrap();

        run(&mut app, &["route", "/auth"]).await.unwrap();
        let navigation = RouteGuard::resolve("/auth", &app.session);
        assert_eq!(navigation, Navigation::Redirect(ONBOARDING_PATH));
        assert_eq!(describe_navigation(&navigation), "redirect /onboarding");
    }

    #[tokio::test]
    async fn test_message_actions_update_store() {
        let mut app = quiet_app();

        run(&mut app, &["messages", "delete", "1"]).await.unwrap();
        assert_eq!(app.notifications.messages().len(), 4);
        assert_eq!(app.notifications.unread_count(), 2);

        run(&mut app, &["messages", "read-all"]).await.unwrap();
        assert_eq!(app.notifications.messages().len(), 5);
        assert_eq!(app.notifications.unread_count(), 0);
    }

    #[tokio::test]
    async fn test_lang_set_accepts_aliases() {
        let mut app = quiet_app();

        run(&mut app, &["lang", "set", "English"]).await.unwrap();
        assert_eq!(app.locale.language(), Language::En);
        run(&mut app, &["lang", "list"]).await.unwrap();
        run(&mut app, &["lang", "set", "fr"]).await.unwrap();
        assert_eq!(app.locale.language(), Language::En);
    }

    #[test]
    fn test_parses_message_filters() {
        let cli = Cli::try_parse_from(["jobmatch", "messages", "list", "--filter", "interview"]).unwrap();
        match cli.command {
            Command::Messages {
                action: MessageAction::List { filter, search },
                source,
            } => {
                assert_eq!(filter, "interview".parse::<MessageFilter>().unwrap());
                assert!(search.is_empty());
                assert!(source.is_none());
            }
            _ => panic!("expected messages list"),
        }
    }

    #[test]
    fn test_parses_repeated_answers() {
        let cli = Cli::try_parse_from([
            "jobmatch",
            "onboard",
            "--resume",
            "cv.pdf",
            "--answer",
            "desired_city=Hangzhou",
            "--answer",
            "interested_companies=Tencent,Baidu",
        ])
        .unwrap();
        let Command::Onboard { answers, .. } = cli.command else {
            panic!("expected onboard");
        };
        assert_eq!(answers.len(), 2);
    }

    #[test]
    fn test_rejects_unknown_filter() {
        assert!(Cli::try_parse_from(["jobmatch", "messages", "list", "--filter", "spam"]).is_err());
    }
}
