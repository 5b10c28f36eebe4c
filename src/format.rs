//! Output formatting for CLI results: JSON or plain text.

use crate::config::RelationsConfig;
use crate::types::{
    CalendarEvent, EventDetail, Occurrence, ReconcileReport, Relation, ResolvedAssignment, Task,
    TaskWithEvents,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Output format for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    Json,
    #[default]
    Text,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(OutputFormat::Json),
            "text" | "txt" => Some(OutputFormat::Text),
            _ => None,
        }
    }
}

/// Render `value` as pretty JSON or with the given text formatter.
pub fn render<T: Serialize>(
    format: OutputFormat,
    value: &T,
    text: impl FnOnce(&T) -> String,
) -> serde_json::Result<String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(value),
        OutputFormat::Text => Ok(text(value)),
    }
}

fn ts(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M").to_string()
}

pub fn format_task(task: &Task) -> String {
    let mut out = String::new();
    out.push_str(&format!("Task: {}\n", task.title));
    out.push_str(&format!("  id:        {}\n", task.id));
    out.push_str(&format!("  status:    {}\n", task.status.as_str()));
    out.push_str(&format!("  priority:  {}\n", task.priority.as_str()));
    out.push_str(&format!("  schedule:  {}\n", task.schedule_status.as_str()));
    if let Some(due) = task.due_date {
        out.push_str(&format!("  due:       {}\n", ts(due)));
    }
    if let Some(ref who) = task.assigned_to {
        out.push_str(&format!("  assigned:  {} {}\n", who.kind().as_str(), who.id()));
    }
    if let Some(ref dept) = task.department {
        out.push_str(&format!("  dept:      {}\n", dept));
    }
    if let Some(ref desc) = task.description {
        out.push_str(&format!("\n{}\n", desc));
    }
    out
}

/// One line per task.
pub fn format_tasks(tasks: &Vec<Task>) -> String {
    if tasks.is_empty() {
        return "No tasks.\n".to_string();
    }
    let mut out = format!("Tasks ({})\n", tasks.len());
    for t in tasks {
        let due = t.due_date.map(ts).unwrap_or_else(|| "-".to_string());
        out.push_str(&format!(
            "  {}  [{}] {} ({}, {}, due {})\n",
            t.id,
            t.status.as_str(),
            t.title,
            t.priority.as_str(),
            t.schedule_status.as_str(),
            due
        ));
    }
    out
}

fn event_line(e: &CalendarEvent) -> String {
    let repeat = if e.recurrence.is_some() { " (recurring)" } else { "" };
    format!(
        "  {}  {} - {}  {} [{}]{}\n",
        e.id,
        ts(e.start),
        ts(e.end),
        e.title,
        e.category,
        repeat
    )
}

pub fn format_event(event: &CalendarEvent) -> String {
    let mut out = format!("Event: {}\n", event.title);
    out.push_str(&format!("  id:        {}\n", event.id));
    out.push_str(&format!("  when:      {} - {}\n", ts(event.start), ts(event.end)));
    out.push_str(&format!("  category:  {}\n", event.category));
    out.push_str(&format!("  owner:     {}\n", event.user_id));
    if let Some(ref rule) = event.recurrence {
        out.push_str(&format!(
            "  repeats:   every {} {:?}\n",
            rule.interval, rule.frequency
        ));
    }
    if let Some(ref who) = event.assigned_to {
        out.push_str(&format!("  assigned:  {} {}\n", who.kind().as_str(), who.id()));
    }
    out
}

pub fn format_events(events: &Vec<CalendarEvent>) -> String {
    if events.is_empty() {
        return "No events.\n".to_string();
    }
    let mut out = format!("Events ({})\n", events.len());
    for e in events {
        out.push_str(&event_line(e));
    }
    out
}

pub fn format_task_with_events(view: &TaskWithEvents) -> String {
    let mut out = format_task(&view.task);
    out.push('\n');
    out.push_str(&format_events(&view.events));
    out
}

fn format_assignment(assignment: &ResolvedAssignment) -> String {
    match assignment.display {
        Some(ref entity) => match entity.email {
            Some(ref email) => format!("{} <{}>", entity.name, email),
            None => entity.name.clone(),
        },
        None => format!(
            "{} {} (missing)",
            assignment.target.kind().as_str(),
            assignment.target.id()
        ),
    }
}

pub fn format_event_detail(detail: &EventDetail) -> String {
    let mut out = format_event(&detail.event);
    match detail.task {
        Some(ref task) => out.push_str(&format!("  task:      {} ({})\n", task.title, task.id)),
        None => out.push_str("  task:      -\n"),
    }
    if let Some(ref assignment) = detail.assignment {
        out.push_str(&format!("  assignee:  {}\n", format_assignment(assignment)));
    }
    out
}

pub fn format_relations(relations: &Vec<Relation>) -> String {
    if relations.is_empty() {
        return "No relations.\n".to_string();
    }
    let mut out = String::new();
    for r in relations {
        out.push_str(&format!(
            "  {}  task {} -> event {} ({})\n",
            r.id, r.task_id, r.event_id, r.relation_type
        ));
    }
    out
}

/// Configured relation types, with the default marked `*`.
pub fn format_relation_types(config: &RelationsConfig) -> String {
    let mut out = String::new();
    for def in &config.types {
        let marker = if def.name == config.default_type { "*" } else { " " };
        match def.description {
            Some(ref desc) => out.push_str(&format!("{} {}  {}\n", marker, def.name, desc)),
            None => out.push_str(&format!("{} {}\n", marker, def.name)),
        }
    }
    out
}

pub fn format_occurrences(occurrences: &Vec<Occurrence>) -> String {
    if occurrences.is_empty() {
        return "No occurrences in window.\n".to_string();
    }
    occurrences
        .iter()
        .map(|o| format!("  {} - {}\n", ts(o.start), ts(o.end)))
        .collect()
}

pub fn format_report(report: &ReconcileReport) -> String {
    format!(
        "Examined {} tasks, updated {}, skipped {} set manually.\n",
        report.examined, report.updated, report.skipped_manual
    )
}
