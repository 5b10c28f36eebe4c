//! crm-schedule
//!
//! Command-line front end for task and calendar-event scheduling: relations,
//! derived schedule status, assignments and reconciliation sweeps.

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use crm_schedule::cli::directory::DirectoryCommand;
use crm_schedule::cli::event::EventCommand;
use crm_schedule::cli::relation::{AssignArgs, LinkArgs, RelationsArgs, UnlinkArgs};
use crm_schedule::cli::task::TaskCommand;
use crm_schedule::cli::{Cli, Command};
use crm_schedule::config::{Config, ConfigLoader};
use crm_schedule::db::Database;
use crm_schedule::error::{CrmError, ErrorResponse};
use crm_schedule::format::{self, OutputFormat, render};
use crm_schedule::logging::{self, LogTarget};
use crm_schedule::service::ScheduleService;
use crm_schedule::types::{Assignee, Contact, ScheduleStatus, Session, Team, User};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info};

type Service = ScheduleService<Database>;

fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(LogTarget::parse(&cli.log), cli.verbose)?;

    let loader = match &cli.config {
        Some(path) => ConfigLoader::load_file(Path::new(path))?,
        None => ConfigLoader::load()?,
    };
    if let Some(path) = loader.config_path() {
        debug!(path = %path.display(), "Using config");
    }
    let mut config = loader.into_config();
    if let Some(db_path) = &cli.database {
        config.server.db_path = db_path.into();
    }

    let service = open_service(&config)?;
    let session = cli.session();
    let output = cli.format;

    let result = match cli.command {
        Command::Task(cmd) => run_task(&service, &session, output, cmd),
        Command::Event(cmd) => run_event(&service, &session, output, cmd),
        Command::Link(args) => run_link(&service, output, args),
        Command::Unlink(args) => run_unlink(&service, output, args),
        Command::Relations(args) => run_relations(&service, output, args),
        Command::RelationTypes => Ok(render(
            output,
            service.relations_config(),
            format::format_relation_types,
        )?),
        Command::Assign(args) => run_assign(&service, output, args),
        Command::Reconcile => run_reconcile(&service, output),
        Command::Directory(cmd) => run_directory(&service, &session, output, cmd),
    };

    match result {
        Ok(text) => {
            print!("{}", text);
            Ok(())
        }
        Err(e) => match e.downcast_ref::<CrmError>() {
            Some(err) => {
                report_error(output, err);
                std::process::exit(1);
            }
            None => Err(e),
        },
    }
}

fn open_service(config: &Config) -> Result<Service> {
    config.ensure_db_dir()?;
    let db = Database::open(&config.server.db_path)?;
    info!(db = %config.server.db_path.display(), "Database ready");
    Ok(ScheduleService::with_config(db, config))
}

fn report_error(output: OutputFormat, err: &CrmError) {
    let body = ErrorResponse::from(err);
    match output {
        OutputFormat::Json => match serde_json::to_string_pretty(&body) {
            Ok(json) => eprintln!("{}", json),
            Err(_) => eprintln!("Error: {}", err),
        },
        OutputFormat::Text => eprintln!("Error: {}", err),
    }
}

/// Acknowledgement for commands whose result is a single fact.
#[derive(Serialize)]
struct Ack {
    message: String,
}

fn ack(output: OutputFormat, message: String) -> Result<String> {
    let body = Ack { message };
    Ok(render(output, &body, |a| format!("{}\n", a.message))?)
}

fn run_task(
    service: &Service,
    session: &Session,
    output: OutputFormat,
    cmd: TaskCommand,
) -> Result<String> {
    match cmd {
        TaskCommand::Create(args) => {
            let task = service.create_task(session, args.into())?;
            Ok(render(output, &task, format::format_task)?)
        }
        TaskCommand::Update(args) => {
            let (id, update) = args.into_update();
            let task = service.update_task(&id, update)?;
            Ok(render(output, &task, format::format_task)?)
        }
        TaskCommand::Show { id, events } => {
            if events {
                let view = service.get_task_with_events(&id)?;
                Ok(render(output, &view, format::format_task_with_events)?)
            } else {
                let task = service.get_task(&id)?;
                Ok(render(output, &task, format::format_task)?)
            }
        }
        TaskCommand::List(args) => {
            let tasks = service.list_tasks(session, &args.into())?;
            Ok(render(output, &tasks, format::format_tasks)?)
        }
        TaskCommand::ScheduleStatus { id, partial } => {
            let task = if partial {
                service.update_task_schedule_status(&id, ScheduleStatus::PartiallyScheduled)?
            } else {
                service.refresh_schedule_status(&id)?;
                service.get_task(&id)?
            };
            Ok(render(output, &task, format::format_task)?)
        }
        TaskCommand::Delete { id } => {
            service.delete_task(&id)?;
            ack(output, format!("Deleted task {}", id))
        }
    }
}

fn run_event(
    service: &Service,
    session: &Session,
    output: OutputFormat,
    cmd: EventCommand,
) -> Result<String> {
    match cmd {
        EventCommand::Create(args) => {
            let event = service.create_event(session, args.into())?;
            Ok(render(output, &event, format::format_event)?)
        }
        EventCommand::CreateForTask {
            task_id,
            relation_type,
            event,
        } => {
            let event = service.create_event_for_task(
                session,
                &task_id,
                event.into(),
                relation_type.as_deref(),
            )?;
            Ok(render(output, &event, format::format_event)?)
        }
        EventCommand::Update { id, update } => {
            let event = service.update_event(&id, update.into())?;
            Ok(render(output, &event, format::format_event)?)
        }
        EventCommand::UpdateForTask {
            task_id,
            event_id,
            update,
        } => {
            let event = service.update_event_for_task(&task_id, &event_id, update.into())?;
            Ok(render(output, &event, format::format_event)?)
        }
        EventCommand::Show { id } => {
            let detail = service.get_event_with_task_and_assignment(&id)?;
            Ok(render(output, &detail, format::format_event_detail)?)
        }
        EventCommand::List(args) => {
            let events = service.list_events(session, &args.into())?;
            Ok(render(output, &events, format::format_events)?)
        }
        EventCommand::Occurrences { id, from, to } => {
            let occurrences = service.occurrences(&id, from, to)?;
            Ok(render(output, &occurrences, format::format_occurrences)?)
        }
        EventCommand::Delete { id } => {
            service.delete_event(&id)?;
            ack(output, format!("Deleted event {}", id))
        }
    }
}

fn run_link(service: &Service, output: OutputFormat, args: LinkArgs) -> Result<String> {
    let relation =
        service.create_relation(&args.task_id, &args.event_id, args.relation_type.as_deref())?;
    Ok(render(output, &vec![relation], format::format_relations)?)
}

fn run_unlink(service: &Service, output: OutputFormat, args: UnlinkArgs) -> Result<String> {
    let removed = service.unlink_event_from_task(&args.task_id, &args.event_id)?;
    ack(
        output,
        format!(
            "Removed {} relation(s) between task {} and event {}",
            removed, args.task_id, args.event_id
        ),
    )
}

fn run_relations(service: &Service, output: OutputFormat, args: RelationsArgs) -> Result<String> {
    let relations = match (args.task, args.event) {
        (Some(task_id), _) => service.list_relations_for_task(&task_id)?,
        (None, Some(event_id)) => service.list_relations_for_event(&event_id)?,
        (None, None) => Vec::new(),
    };
    Ok(render(output, &relations, format::format_relations)?)
}

fn run_assign(service: &Service, output: OutputFormat, args: AssignArgs) -> Result<String> {
    if args.clear {
        let removed = service.unassign(&args.id, args.kind)?;
        let message = if removed {
            format!("Cleared assignment of {} {}", args.kind.as_str(), args.id)
        } else {
            format!("{} {} had no assignment", args.kind.as_str(), args.id)
        };
        return ack(output, message);
    }

    let (Some(kind), Some(target_id)) = (args.target_type, args.target_id) else {
        return Err(CrmError::missing_field("target").into());
    };
    service.assign(&args.id, args.kind, Assignee::from_parts(kind, target_id))?;
    let resolved = service.resolve_assignment(&args.id, args.kind)?;
    Ok(render(output, &resolved, |r| match r {
        Some(r) => format!(
            "Assigned {} {} to {} {}\n",
            r.assignable_type.as_str(),
            r.assignable_id,
            r.target.kind().as_str(),
            r.display
                .as_ref()
                .map(|d| d.name.clone())
                .unwrap_or_else(|| r.target.id().to_string())
        ),
        None => "No assignment\n".to_string(),
    })?)
}

fn run_reconcile(service: &Service, output: OutputFormat) -> Result<String> {
    let pruned = service.prune_orphaned_relations()?;
    let report = service.reconcile_schedule_statuses()?;
    let text = render(output, &report, format::format_report)?;
    match output {
        OutputFormat::Json => Ok(text),
        OutputFormat::Text => Ok(format!("Pruned {} orphaned relation(s).\n{}", pruned, text)),
    }
}

fn run_directory(
    service: &Service,
    session: &Session,
    output: OutputFormat,
    cmd: DirectoryCommand,
) -> Result<String> {
    let db = service.store();
    let now = Utc::now();
    match cmd {
        DirectoryCommand::AddUser { id, name, email } => {
            db.insert_user(&User {
                id: id.clone(),
                name,
                email,
                department: session.department.clone(),
                created_at: now,
            })?;
            ack(output, format!("Added user {}", id))
        }
        DirectoryCommand::AddTeam { id, name } => {
            db.insert_team(&Team {
                id: id.clone(),
                name,
                department: session.department.clone(),
                created_at: now,
            })?;
            ack(output, format!("Added team {}", id))
        }
        DirectoryCommand::AddContact {
            id,
            name,
            email,
            company,
        } => {
            db.insert_contact(&Contact {
                id: id.clone(),
                name,
                email,
                company,
                created_at: now,
            })?;
            ack(output, format!("Added contact {}", id))
        }
        DirectoryCommand::Lookup { kind, id } => {
            let target = Assignee::from_parts(kind, id.clone());
            let entity = db
                .get_display_entity(&target)?
                .ok_or_else(|| CrmError::NotFound {
                    entity: "Directory entry",
                    id,
                })?;
            Ok(render(output, &entity, |e| match e.email {
                Some(ref email) => format!("{} <{}> ({})\n", e.name, email, e.kind.as_str()),
                None => format!("{} ({})\n", e.name, e.kind.as_str()),
            })?)
        }
    }
}
