use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use client_core::{
    config::{load_settings, normalize_base_url},
    EmployeeForm, EmployeeService, HttpEmployeeService, Screen, Session, SkillField,
    SubmitError,
};
use shared::domain::{ContactPreference, EmployeeId};
use tracing_subscriber::EnvFilter;

mod render;

#[derive(Parser, Debug)]
#[command(name = "employee-desk", about = "List, create and edit employee records")]
struct Cli {
    /// Employee service base URL, e.g. http://localhost:3000
    #[arg(long, global = true)]
    api_url: Option<String>,
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Print records as JSON instead of a table.
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show every employee.
    List,
    /// Show one employee.
    Show { id: i64 },
    /// Create an employee.
    Create(EmployeeArgs),
    /// Edit an existing employee.
    Edit {
        id: i64,
        #[command(flatten)]
        fields: EmployeeArgs,
        /// Drop the stored skills before applying --skill entries.
        #[arg(long)]
        replace_skills: bool,
        /// Remove the skill at this position (repeatable, applied first).
        #[arg(long = "remove-skill")]
        remove_skill: Vec<usize>,
    },
    /// Resolve a route such as /list or /edit/3 and render its screen.
    Open { path: String },
}

#[derive(Args, Debug, Default)]
struct EmployeeArgs {
    #[arg(long)]
    full_name: Option<String>,
    /// `email` or `phone`.
    #[arg(long)]
    contact_preference: Option<String>,
    #[arg(long)]
    email: Option<String>,
    /// Repeat of --email; the form rejects a missing or different value.
    #[arg(long)]
    confirm_email: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    /// NAME:YEARS:LEVEL, repeatable.
    #[arg(long = "skill")]
    skills: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = load_settings(cli.config.as_deref())?;
    if let Some(api_url) = &cli.api_url {
        settings.api_base_url = normalize_base_url(api_url)?;
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&settings.log_filter))
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(api = %settings.api_base_url, "using employee service");

    let service = HttpEmployeeService::from_settings(&settings)
        .context("failed to build employee service client")?;
    let mut session = Session::new(settings.required_email_domain.clone());

    match cli.command {
        Command::List => {
            let screen = session.open("/list", &service).await;
            render::screen(screen, cli.json)?;
        }
        Command::Show { id } => {
            let employee = service
                .get_employee(EmployeeId(id))
                .await
                .map_err(|err| anyhow::anyhow!(err.user_message()))?;
            render::employee(&employee, cli.json)?;
        }
        Command::Create(fields) => {
            session.open("/create", &service).await;
            if let Screen::Create(create) = session.screen_mut() {
                let form = create.form_mut();
                if form.skill_count() > 0 && !fields.skills.is_empty() {
                    form.remove_skill(0);
                }
                apply_fields(form, &fields)?;
            }
            submit(&mut session, &service, cli.json).await?;
        }
        Command::Edit {
            id,
            fields,
            replace_skills,
            remove_skill,
        } => {
            session.open(&format!("/edit/{id}"), &service).await;
            let Screen::Edit(edit) = session.screen_mut() else {
                bail!("unexpected screen for employee {id}");
            };
            if let Some(notice) = edit.notice() {
                bail!("{}", notice.message);
            }
            let form = edit.form_mut();
            if replace_skills {
                while form.skill_count() > 0 {
                    form.remove_skill(form.skill_count() - 1);
                }
            } else {
                let mut positions = remove_skill;
                positions.sort_unstable_by(|a, b| b.cmp(a));
                positions.dedup();
                for index in positions {
                    if !form.remove_skill(index) {
                        bail!("employee {id} has no skill at position {index}");
                    }
                }
            }
            apply_fields(form, &fields)?;
            submit(&mut session, &service, cli.json).await?;
        }
        Command::Open { path } => {
            let screen = session.open(&path, &service).await;
            render::screen(screen, cli.json)?;
        }
    }

    Ok(())
}

/// Replays the flags as individual form edits, in the order a user would
/// fill the screen.
fn apply_fields(form: &mut EmployeeForm, fields: &EmployeeArgs) -> Result<()> {
    if let Some(v) = &fields.full_name {
        form.set_full_name(v.clone());
    }
    if let Some(v) = &fields.contact_preference {
        form.set_contact_preference(ContactPreference::from_selection(v));
    }
    if let Some(v) = &fields.email {
        form.set_email(v.clone());
    }
    if let Some(v) = &fields.confirm_email {
        form.set_confirm_email(v.clone());
    }
    if let Some(v) = &fields.phone {
        form.set_phone(v.clone());
    }
    for raw in &fields.skills {
        let (name, years, level) = parse_skill(raw)?;
        let index = form.add_skill();
        form.set_skill_field(index, SkillField::Name, name);
        form.set_skill_field(index, SkillField::Experience, years);
        form.set_skill_field(index, SkillField::Proficiency, level);
    }
    Ok(())
}

fn parse_skill(raw: &str) -> Result<(&str, &str, &str)> {
    let mut parts = raw.splitn(3, ':');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(name), Some(years), Some(level)) => Ok((name.trim(), years.trim(), level.trim())),
        _ => bail!("skill '{raw}' must look like NAME:YEARS:LEVEL"),
    }
}

async fn submit<S>(session: &mut Session, service: &S, json: bool) -> Result<()>
where
    S: EmployeeService + ?Sized,
{
    match session.submit(service).await {
        Ok(route) => {
            println!("Saved. Now at {route}.");
            render::screen(session.screen(), json)
        }
        Err(SubmitError::Invalid(errors)) => {
            eprintln!("The form has errors:");
            for (field, message) in errors.iter() {
                eprintln!("  {field}: {message}");
            }
            bail!("employee was not saved")
        }
        Err(SubmitError::Service(err)) => {
            let notice = match session.screen() {
                Screen::Create(screen) => screen.notice().map(|n| n.message.clone()),
                Screen::Edit(screen) => screen.notice().map(|n| n.message.clone()),
                _ => None,
            };
            bail!(notice.unwrap_or_else(|| err.user_message()))
        }
        Err(err) => Err(err.into()),
    }
}
