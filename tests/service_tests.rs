//! Integration tests for the scheduling service over the SQLite store.
//!
//! Each test starts from a fresh in-memory database.

use chrono::{DateTime, Duration, TimeZone, Utc};
use crm_schedule::config::{Config, RelationTypeDefinition};
use crm_schedule::db::Database;
use crm_schedule::error::ErrorCode;
use crm_schedule::filters::{EventFilter, TaskFilter};
use crm_schedule::service::ScheduleService;
use crm_schedule::store::RelationFilter;
use crm_schedule::types::{
    AssignableKind, Assignee, AssigneeKind, Contact, EventUpdate, NewEvent, NewTask,
    ScheduleStatus, Session, Team, User,
};

/// Helper to create a service over a fresh in-memory database.
fn setup() -> ScheduleService<Database> {
    let db = Database::open_in_memory().expect("Failed to create in-memory database");
    ScheduleService::new(db)
}

fn session() -> Session {
    Session::new("u-owner")
}

fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, day, hour, 0, 0).unwrap()
}

fn new_task(title: &str) -> NewTask {
    NewTask {
        title: title.to_string(),
        ..Default::default()
    }
}

fn new_event(title: &str, day: u32) -> NewEvent {
    NewEvent::new(title, at(day, 9), at(day, 10))
}

fn relation_count(service: &ScheduleService<Database>) -> usize {
    service
        .store()
        .find_relations(&RelationFilter::default())
        .unwrap()
        .len()
}

mod scheduling_tests {
    use super::*;

    #[test]
    fn new_task_starts_unscheduled() {
        let service = setup();
        let task = service.create_task(&session(), new_task("Call ACME")).unwrap();

        assert_eq!(task.schedule_status, ScheduleStatus::Unscheduled);
        assert_eq!(task.created_by.as_deref(), Some("u-owner"));
        assert!(service.list_relations_for_task(&task.id).unwrap().is_empty());
    }

    #[test]
    fn create_event_for_task_schedules_then_unlink_unschedules() {
        let service = setup();
        let task = service.create_task(&session(), new_task("Call ACME")).unwrap();

        let event = service
            .create_event_for_task(&session(), &task.id, new_event("Call", 10), None)
            .unwrap();

        let relations = service.list_relations_for_task(&task.id).unwrap();
        assert_eq!(relations.len(), 1);
        assert_eq!(relations[0].event_id, event.id);
        assert_eq!(
            relations[0].relation_type,
            service.relations_config().default_type
        );
        assert_eq!(
            service.get_task(&task.id).unwrap().schedule_status,
            ScheduleStatus::Scheduled
        );

        let removed = service.unlink_event_from_task(&task.id, &event.id).unwrap();
        assert_eq!(removed, 1);
        assert_eq!(
            service.get_task(&task.id).unwrap().schedule_status,
            ScheduleStatus::Unscheduled
        );
        // The event itself survives the unlink.
        assert!(service.get_event(&event.id).is_ok());
    }

    #[test]
    fn event_owned_by_session_user() {
        let service = setup();
        let task = service.create_task(&session(), new_task("Demo")).unwrap();
        let event = service
            .create_event_for_task(
                &Session::new("u-other").with_department("sales"),
                &task.id,
                new_event("Demo", 11),
                Some("meeting"),
            )
            .unwrap();

        assert_eq!(event.user_id, "u-other");
        assert_eq!(event.department.as_deref(), Some("sales"));
        assert_eq!(event.category, "general");
    }

    #[test]
    fn unlink_is_idempotent() {
        let service = setup();
        let task = service.create_task(&session(), new_task("Follow up")).unwrap();
        let event = service
            .create_event_for_task(&session(), &task.id, new_event("Follow up", 12), None)
            .unwrap();

        assert_eq!(service.unlink_event_from_task(&task.id, &event.id).unwrap(), 1);
        assert_eq!(service.unlink_event_from_task(&task.id, &event.id).unwrap(), 0);
        assert_eq!(service.unlink_task_from_event(&event.id, &task.id).unwrap(), 0);
        assert_eq!(
            service.get_task(&task.id).unwrap().schedule_status,
            ScheduleStatus::Unscheduled
        );
    }

    #[test]
    fn unlink_removes_every_relation_type_of_the_pair() {
        let service = setup();
        let task = service.create_task(&session(), new_task("Renewal")).unwrap();
        let event = service.create_event(&session(), new_event("Renewal", 15)).unwrap();
        service.create_relation(&task.id, &event.id, Some("meeting")).unwrap();
        service.create_relation(&task.id, &event.id, Some("deadline")).unwrap();

        assert_eq!(service.unlink_event_from_task(&task.id, &event.id).unwrap(), 2);
        assert_eq!(relation_count(&service), 0);
    }

    #[test]
    fn delete_relation_by_id_removes_only_that_row() {
        let service = setup();
        let task = service.create_task(&session(), new_task("Renewal")).unwrap();
        let event = service.create_event(&session(), new_event("Renewal", 15)).unwrap();
        let meeting = service.create_relation(&task.id, &event.id, Some("meeting")).unwrap();
        service.create_relation(&task.id, &event.id, Some("deadline")).unwrap();

        assert!(service.delete_relation_by_id(&meeting.id).unwrap());
        assert!(!service.delete_relation_by_id(&meeting.id).unwrap());

        let left = service.list_relations_for_event(&event.id).unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].relation_type, "deadline");
        assert_eq!(
            service.get_task(&task.id).unwrap().schedule_status,
            ScheduleStatus::Scheduled
        );
    }

    #[test]
    fn duplicate_relation_conflicts_and_leaves_one_row() {
        let service = setup();
        let task = service.create_task(&session(), new_task("Quote")).unwrap();
        let event = service.create_event(&session(), new_event("Quote", 16)).unwrap();

        service.create_relation(&task.id, &event.id, None).unwrap();
        let err = service.create_relation(&task.id, &event.id, None).unwrap_err();

        assert_eq!(err.code(), ErrorCode::Conflict);
        assert_eq!(service.list_relations_for_task(&task.id).unwrap().len(), 1);
    }

    #[test]
    fn configured_relation_types_are_accepted() {
        let mut config = Config::default();
        config.relations.types.push(RelationTypeDefinition {
            name: "site_visit".to_string(),
            description: None,
        });
        let service =
            ScheduleService::with_config(Database::open_in_memory().unwrap(), &config);
        assert!(service.relations_config().is_known_type("site_visit"));

        let task = service.create_task(&session(), new_task("Visit")).unwrap();
        let event = service.create_event(&session(), new_event("Visit", 19)).unwrap();
        let relation = service
            .create_relation(&task.id, &event.id, Some("site_visit"))
            .unwrap();
        assert_eq!(relation.relation_type, "site_visit");
    }

    #[test]
    fn unknown_relation_type_rejected_before_write() {
        let service = setup();
        let task = service.create_task(&session(), new_task("Quote")).unwrap();

        let err = service
            .create_event_for_task(&session(), &task.id, new_event("Quote", 16), Some("lunch"))
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::ValidationError);
        assert_eq!(err.field(), Some("relation_type"));
        assert!(service.store().list_events(None).unwrap().is_empty());
    }

    #[test]
    fn create_event_for_missing_task_writes_nothing() {
        let service = setup();

        let err = service
            .create_event_for_task(&session(), "no-such-task", new_event("Orphan", 17), None)
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::NotFound);
        assert!(service.store().list_events(None).unwrap().is_empty());
        assert_eq!(relation_count(&service), 0);
    }

    #[test]
    fn inverted_window_rejected_before_write() {
        let service = setup();
        let task = service.create_task(&session(), new_task("Review")).unwrap();

        let err = service
            .create_event_for_task(
                &session(),
                &task.id,
                NewEvent::new("Review", at(18, 10), at(18, 9)),
                None,
            )
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::ValidationError);
        assert_eq!(err.field(), Some("end"));
        assert!(service.store().list_events(None).unwrap().is_empty());
    }

    #[test]
    fn assigned_to_without_type_rejected_before_write() {
        let service = setup();
        let task = service.create_task(&session(), new_task("Review")).unwrap();
        let mut input = new_event("Review", 18);
        input.assigned_to = Some("u-1".to_string());

        let err = service
            .create_event_for_task(&session(), &task.id, input, None)
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::ValidationError);
        assert_eq!(err.field(), Some("assigned_to_type"));
        assert!(service.store().list_events(None).unwrap().is_empty());
        assert_eq!(relation_count(&service), 0);
    }

    #[test]
    fn task_with_events_ordered_by_start() {
        let service = setup();
        let task = service.create_task(&session(), new_task("Onboarding")).unwrap();
        let late = service
            .create_event_for_task(&session(), &task.id, new_event("Second", 22), None)
            .unwrap();
        let early = service
            .create_event_for_task(&session(), &task.id, new_event("First", 20), None)
            .unwrap();

        let view = service.get_task_with_events(&task.id).unwrap();
        let ids: Vec<_> = view.events.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec![early.id.as_str(), late.id.as_str()]);
        assert_eq!(view.task.schedule_status, ScheduleStatus::Scheduled);
    }

    #[test]
    fn event_linked_twice_appears_once() {
        let service = setup();
        let task = service.create_task(&session(), new_task("Kickoff")).unwrap();
        let event = service
            .create_event_for_task(&session(), &task.id, new_event("Kickoff", 8), None)
            .unwrap();
        service.create_relation(&task.id, &event.id, Some("meeting")).unwrap();

        let view = service.get_task_with_events(&task.id).unwrap();
        assert_eq!(view.events.len(), 1);
    }

    #[test]
    fn event_resolves_to_oldest_linked_task() {
        let service = setup();
        let first = service.create_task(&session(), new_task("First")).unwrap();
        let second = service.create_task(&session(), new_task("Second")).unwrap();
        let event = service
            .create_event_for_task(&session(), &first.id, new_event("Shared", 9), None)
            .unwrap();
        service.create_relation(&second.id, &event.id, None).unwrap();

        let view = service.get_event_with_task(&event.id).unwrap();
        assert_eq!(view.task.map(|t| t.id), Some(first.id.clone()));

        service.delete_task(&first.id).unwrap();
        let view = service.get_event_with_task(&event.id).unwrap();
        assert_eq!(view.task.map(|t| t.id), Some(second.id));
    }

    #[test]
    fn standalone_event_has_no_task() {
        let service = setup();
        let event = service.create_event(&session(), new_event("Lunch", 3)).unwrap();

        let view = service.get_event_with_task(&event.id).unwrap();
        assert!(view.task.is_none());
    }

    #[test]
    fn missing_ids_are_not_found() {
        let service = setup();
        assert_eq!(
            service.get_task_with_events("nope").unwrap_err().code(),
            ErrorCode::NotFound
        );
        assert_eq!(
            service.get_event_with_task("nope").unwrap_err().code(),
            ErrorCode::NotFound
        );
    }
}

mod update_tests {
    use super::*;

    #[test]
    fn update_event_for_task_changes_only_the_event() {
        let service = setup();
        let task = service.create_task(&session(), new_task("Pitch")).unwrap();
        let event = service
            .create_event_for_task(&session(), &task.id, new_event("Pitch", 5), None)
            .unwrap();
        let relations_before = service.list_relations_for_task(&task.id).unwrap();

        let updated = service
            .update_event_for_task(
                &task.id,
                &event.id,
                EventUpdate {
                    title: Some("Pitch v2".to_string()),
                    end: Some(at(5, 11)),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.title, "Pitch v2");
        assert_eq!(updated.end, at(5, 11));
        assert_eq!(service.get_event(&event.id).unwrap().title, "Pitch v2");
        assert_eq!(
            service.list_relations_for_task(&task.id).unwrap(),
            relations_before
        );
    }

    #[test]
    fn update_event_for_unlinked_task_is_not_linked() {
        let service = setup();
        let task = service.create_task(&session(), new_task("Pitch")).unwrap();
        let other = service.create_task(&session(), new_task("Other")).unwrap();
        let event = service
            .create_event_for_task(&session(), &task.id, new_event("Pitch", 5), None)
            .unwrap();

        let err = service
            .update_event_for_task(
                &other.id,
                &event.id,
                EventUpdate {
                    title: Some("Hijacked".to_string()),
                    ..Default::default()
                },
            )
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::NotLinked);
        assert_eq!(service.get_event(&event.id).unwrap().title, "Pitch");
    }

    #[test]
    fn update_event_for_missing_event_is_not_found() {
        let service = setup();
        let task = service.create_task(&session(), new_task("Pitch")).unwrap();

        let err = service
            .update_event_for_task(&task.id, "missing", EventUpdate::default())
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[test]
    fn update_rejects_window_that_becomes_inverted() {
        let service = setup();
        let event = service.create_event(&session(), new_event("Sync", 6)).unwrap();

        let err = service
            .update_event(
                &event.id,
                EventUpdate {
                    start: Some(at(6, 12)),
                    ..Default::default()
                },
            )
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::ValidationError);
        assert_eq!(service.get_event(&event.id).unwrap().start, at(6, 9));
    }
}

mod status_tests {
    use super::*;

    #[test]
    fn partially_scheduled_is_manual_and_survives_reconcile() {
        let service = setup();
        let task = service.create_task(&session(), new_task("Rollout")).unwrap();
        service
            .create_event_for_task(&session(), &task.id, new_event("Phase 1", 4), None)
            .unwrap();

        let marked = service
            .update_task_schedule_status(&task.id, ScheduleStatus::PartiallyScheduled)
            .unwrap();
        assert_eq!(marked.schedule_status, ScheduleStatus::PartiallyScheduled);

        let report = service.reconcile_schedule_statuses().unwrap();
        assert_eq!(report.examined, 1);
        assert_eq!(report.skipped_manual, 1);
        assert_eq!(report.updated, 0);
        assert_eq!(
            service.get_task(&task.id).unwrap().schedule_status,
            ScheduleStatus::PartiallyScheduled
        );
    }

    #[test]
    fn derived_statuses_cannot_be_set_manually() {
        let service = setup();
        let task = service.create_task(&session(), new_task("Idle")).unwrap();

        let err = service
            .update_task_schedule_status(&task.id, ScheduleStatus::Scheduled)
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationError);
        assert_eq!(err.field(), Some("schedule_status"));
        assert_eq!(
            service.get_task(&task.id).unwrap().schedule_status,
            ScheduleStatus::Unscheduled
        );

        service
            .create_event_for_task(&session(), &task.id, new_event("Slot", 4), None)
            .unwrap();
        let err = service
            .update_task_schedule_status(&task.id, ScheduleStatus::Unscheduled)
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationError);
        assert_eq!(
            service.get_task(&task.id).unwrap().schedule_status,
            ScheduleStatus::Scheduled
        );
    }

    #[test]
    fn relation_change_clears_manual_status() {
        let service = setup();
        let task = service.create_task(&session(), new_task("Rollout")).unwrap();
        service
            .update_task_schedule_status(&task.id, ScheduleStatus::PartiallyScheduled)
            .unwrap();

        service
            .create_event_for_task(&session(), &task.id, new_event("Phase 1", 4), None)
            .unwrap();

        assert_eq!(
            service.get_task(&task.id).unwrap().schedule_status,
            ScheduleStatus::Scheduled
        );
    }

    #[test]
    fn reconcile_fixes_stale_cached_status() {
        let service = setup();
        let task = service.create_task(&session(), new_task("Stale")).unwrap();
        service
            .store()
            .set_schedule_status(&task.id, ScheduleStatus::Scheduled, Utc::now())
            .unwrap();

        let report = service.reconcile_schedule_statuses().unwrap();
        assert_eq!(report.updated, 1);
        assert_eq!(
            service.get_task(&task.id).unwrap().schedule_status,
            ScheduleStatus::Unscheduled
        );

        let again = service.reconcile_schedule_statuses().unwrap();
        assert_eq!(again.updated, 0);
    }

    #[test]
    fn delete_event_unschedules_linked_tasks() {
        let service = setup();
        let task = service.create_task(&session(), new_task("Visit")).unwrap();
        let event = service
            .create_event_for_task(&session(), &task.id, new_event("Visit", 7), None)
            .unwrap();

        service.delete_event(&event.id).unwrap();

        assert_eq!(relation_count(&service), 0);
        assert_eq!(
            service.get_task(&task.id).unwrap().schedule_status,
            ScheduleStatus::Unscheduled
        );
        assert_eq!(service.get_event(&event.id).unwrap_err().code(), ErrorCode::NotFound);
    }

    #[test]
    fn delete_task_keeps_its_events() {
        let service = setup();
        let task = service.create_task(&session(), new_task("Visit")).unwrap();
        let event = service
            .create_event_for_task(&session(), &task.id, new_event("Visit", 7), None)
            .unwrap();

        service.delete_task(&task.id).unwrap();

        assert!(service.get_event(&event.id).is_ok());
        assert!(service.list_relations_for_event(&event.id).unwrap().is_empty());
    }
}

mod orphan_tests {
    use super::*;

    #[test]
    fn resolver_skips_relation_to_deleted_event() {
        let service = setup();
        let task = service.create_task(&session(), new_task("Audit")).unwrap();
        let kept = service
            .create_event_for_task(&session(), &task.id, new_event("Kept", 2), None)
            .unwrap();
        let gone = service
            .create_event_for_task(&session(), &task.id, new_event("Gone", 3), None)
            .unwrap();

        // Bypass the service so the relation is left dangling.
        assert!(service.store().delete_event(&gone.id).unwrap());

        let view = service.get_task_with_events(&task.id).unwrap();
        assert_eq!(view.events.len(), 1);
        assert_eq!(view.events[0].id, kept.id);
        assert_eq!(service.list_relations_for_task(&task.id).unwrap().len(), 2);
    }

    #[test]
    fn only_orphaned_relations_mean_unscheduled() {
        let service = setup();
        let task = service.create_task(&session(), new_task("Audit")).unwrap();
        let event = service
            .create_event_for_task(&session(), &task.id, new_event("Gone", 3), None)
            .unwrap();
        service.store().delete_event(&event.id).unwrap();

        assert_eq!(
            service.refresh_schedule_status(&task.id).unwrap(),
            ScheduleStatus::Unscheduled
        );
    }

    #[test]
    fn prune_removes_dangling_relations_and_refreshes() {
        let service = setup();
        let task = service.create_task(&session(), new_task("Audit")).unwrap();
        let live = service
            .create_event_for_task(&session(), &task.id, new_event("Live", 2), None)
            .unwrap();
        let gone = service
            .create_event_for_task(&session(), &task.id, new_event("Gone", 3), None)
            .unwrap();
        let dropped = service.create_task(&session(), new_task("Dropped")).unwrap();
        service.create_relation(&dropped.id, &live.id, None).unwrap();

        service.store().delete_event(&gone.id).unwrap();
        service.store().delete_task(&dropped.id).unwrap();

        assert_eq!(service.prune_orphaned_relations().unwrap(), 2);
        let remaining = service.store().find_relations(&RelationFilter::default()).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].event_id, live.id);
        assert_eq!(service.prune_orphaned_relations().unwrap(), 0);
    }
}

mod assignment_tests {
    use super::*;

    fn seed_directory(db: &Database) {
        let now = Utc::now();
        db.insert_user(&User {
            id: "u-1".to_string(),
            name: "Ada Lovelace".to_string(),
            email: Some("ada@example.com".to_string()),
            department: Some("sales".to_string()),
            created_at: now,
        })
        .unwrap();
        db.insert_team(&Team {
            id: "t-1".to_string(),
            name: "Field Sales".to_string(),
            department: Some("sales".to_string()),
            created_at: now,
        })
        .unwrap();
        db.insert_contact(&Contact {
            id: "c-1".to_string(),
            name: "Grace Hopper".to_string(),
            email: None,
            company: Some("Navy".to_string()),
            created_at: now,
        })
        .unwrap();
    }

    #[test]
    fn event_assignment_is_mirrored_and_resolved() {
        let service = setup();
        seed_directory(service.store());
        let task = service.create_task(&session(), new_task("Demo")).unwrap();
        let mut input = new_event("Demo", 14);
        input.assigned_to = Some("u-1".to_string());
        input.assigned_to_type = Some(AssigneeKind::User);

        let event = service
            .create_event_for_task(&session(), &task.id, input, None)
            .unwrap();

        let detail = service.get_event_with_task_and_assignment(&event.id).unwrap();
        assert_eq!(detail.task.map(|t| t.id), Some(task.id));
        let resolved = detail.assignment.expect("assignment");
        assert_eq!(resolved.target, Assignee::User("u-1".to_string()));
        assert_eq!(resolved.display.map(|d| d.name), Some("Ada Lovelace".to_string()));
    }

    #[test]
    fn assignment_to_missing_user_resolves_without_display() {
        let service = setup();
        let event = service.create_event(&session(), new_event("Demo", 14)).unwrap();

        service
            .assign(&event.id, AssignableKind::CalendarEvent, Assignee::User("ghost".into()))
            .unwrap();

        let resolved = service
            .resolve_assignment(&event.id, AssignableKind::CalendarEvent)
            .unwrap()
            .expect("assignment");
        assert!(resolved.display.is_none());
        assert_eq!(
            service.get_event(&event.id).unwrap().assigned_to,
            Some(Assignee::User("ghost".to_string()))
        );
    }

    #[test]
    fn contact_cannot_own_an_event() {
        let service = setup();
        seed_directory(service.store());
        let event = service.create_event(&session(), new_event("Demo", 14)).unwrap();

        let err = service
            .assign(&event.id, AssignableKind::CalendarEvent, Assignee::Contact("c-1".into()))
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::ValidationError);
        assert!(service
            .resolve_assignment(&event.id, AssignableKind::CalendarEvent)
            .unwrap()
            .is_none());
    }

    #[test]
    fn activity_assignment_accepts_contact() {
        let service = setup();
        seed_directory(service.store());

        service
            .assign("act-1", AssignableKind::Activity, Assignee::Contact("c-1".into()))
            .unwrap();

        let resolved = service
            .resolve_assignment("act-1", AssignableKind::Activity)
            .unwrap()
            .expect("assignment");
        assert_eq!(resolved.display.map(|d| d.kind), Some(AssigneeKind::Contact));
    }

    #[test]
    fn reassign_replaces_previous_row() {
        let service = setup();
        seed_directory(service.store());
        let task = service.create_task(&session(), new_task("Renewal")).unwrap();

        service
            .assign(&task.id, AssignableKind::Task, Assignee::User("u-1".into()))
            .unwrap();
        service
            .assign(&task.id, AssignableKind::Task, Assignee::Team("t-1".into()))
            .unwrap();

        let resolved = service
            .resolve_assignment(&task.id, AssignableKind::Task)
            .unwrap()
            .expect("assignment");
        assert_eq!(resolved.target, Assignee::Team("t-1".to_string()));
        assert_eq!(
            service.get_task(&task.id).unwrap().assigned_to,
            Some(Assignee::Team("t-1".to_string()))
        );

        assert!(service.unassign(&task.id, AssignableKind::Task).unwrap());
        assert!(service.get_task(&task.id).unwrap().assigned_to.is_none());
        assert!(!service.unassign(&task.id, AssignableKind::Task).unwrap());
    }
}

mod list_tests {
    use super::*;

    #[test]
    fn department_scoping_restricts_list_views() {
        let mut config = Config::default();
        config.schedule.department_scoped = true;
        let db = Database::open_in_memory().unwrap();
        let service = ScheduleService::with_config(db, &config);

        let sales = Session::new("u-1").with_department("sales");
        let support = Session::new("u-2").with_department("support");
        service.create_task(&sales, new_task("Sales task")).unwrap();
        service.create_task(&support, new_task("Support task")).unwrap();
        service.create_event(&sales, new_event("Sales call", 2)).unwrap();

        let tasks = service.list_tasks(&sales, &TaskFilter::default()).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "Sales task");
        assert!(service
            .list_events(&support, &EventFilter::default())
            .unwrap()
            .is_empty());

        // A session without a department sees everything.
        let all = service.list_tasks(&session(), &TaskFilter::default()).unwrap();
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn unscoped_service_ignores_session_department() {
        let service = setup();
        let sales = Session::new("u-1").with_department("sales");
        service.create_task(&sales, new_task("Sales task")).unwrap();
        service
            .create_task(&Session::new("u-2").with_department("support"), new_task("Other"))
            .unwrap();

        assert_eq!(service.list_tasks(&sales, &TaskFilter::default()).unwrap().len(), 2);
    }

    #[test]
    fn schedule_status_filter_tracks_relations() {
        let service = setup();
        let linked = service.create_task(&session(), new_task("Linked")).unwrap();
        service.create_task(&session(), new_task("Loose")).unwrap();
        service
            .create_event_for_task(&session(), &linked.id, new_event("Slot", 9), None)
            .unwrap();

        let filter = TaskFilter {
            schedule_status: Some(ScheduleStatus::Unscheduled),
            ..Default::default()
        };
        let tasks = service.list_tasks(&session(), &filter).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "Loose");
    }

    #[test]
    fn occurrences_expand_weekly_event() {
        use crm_schedule::types::{Frequency, Recurrence};

        let service = setup();
        let mut input = new_event("Standup", 1);
        input.recurrence = Some(Recurrence {
            frequency: Frequency::Weekly,
            interval: 1,
            until: None,
            exceptions: vec![],
        });
        let event = service.create_event(&session(), input).unwrap();

        let occurrences = service
            .occurrences(&event.id, at(1, 0), at(1, 0) + Duration::days(21))
            .unwrap();
        let starts: Vec<_> = occurrences.iter().map(|o| o.start).collect();
        assert_eq!(starts, vec![at(1, 9), at(8, 9), at(15, 9)]);
    }
}

mod persistence_tests {
    use super::*;

    #[test]
    fn state_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crm.db");

        let task_id = {
            let service = ScheduleService::new(Database::open(&path).unwrap());
            let task = service.create_task(&session(), new_task("Persist")).unwrap();
            service
                .create_event_for_task(&session(), &task.id, new_event("Persist", 9), None)
                .unwrap();
            task.id
        };

        let service = ScheduleService::new(Database::open(&path).unwrap());
        let view = service.get_task_with_events(&task_id).unwrap();
        assert_eq!(view.task.schedule_status, ScheduleStatus::Scheduled);
        assert_eq!(view.events.len(), 1);
    }
}
