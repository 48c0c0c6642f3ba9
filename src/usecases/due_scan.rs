use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    error::AppError,
    repositories::boards as board_repo,
    repositories::tasks as task_repo,
    repositories::tasks::DueTaskRow,
    repositories::users::RecipientRow,
    services::email::EmailService,
    usecases::notifications::NotificationService,
};

/// Day offsets relative to today, checked in this order on every pass.
/// -1 means the due date passed yesterday.
pub const DAY_OFFSETS: [i64; 5] = [7, 3, 2, 1, -1];

const REMINDER_TITLE: &str = "Task due date reminder";

#[derive(Debug)]
pub struct ScanFailure {
    pub task_id: Option<Uuid>,
    pub message: String,
}

/// Outcome of one due-date pass. Notification counts are grouped by
/// offset; repeats across runs are intentionally not deduplicated, so
/// two back-to-back passes produce two record sets.
#[derive(Debug)]
pub struct ScanReport {
    pub date: NaiveDate,
    pub notifications_by_offset: BTreeMap<i64, u64>,
    pub failures: Vec<ScanFailure>,
}

impl ScanReport {
    fn new(date: NaiveDate) -> Self {
        Self {
            date,
            notifications_by_offset: BTreeMap::new(),
            failures: Vec::new(),
        }
    }

    fn record(&mut self, offset: i64) {
        *self.notifications_by_offset.entry(offset).or_insert(0) += 1;
    }

    pub fn notifications_created(&self) -> u64 {
        self.notifications_by_offset.values().sum()
    }
}

/// Runs one due-date pass against the current date.
pub async fn run_scan(
    pool: &PgPool,
    email_service: Option<&EmailService>,
    link_base: &str,
) -> ScanReport {
    scan_from(pool, email_service, link_base, Utc::now().date_naive()).await
}

/// For each offset: tasks due exactly on `today + offset`, minus
/// terminal statuses. Each matching task fans out to its responsible
/// users plus the board creator. Failures stay contained: a task that
/// cannot be resolved is recorded and the pass moves on.
pub(crate) async fn scan_from(
    pool: &PgPool,
    email_service: Option<&EmailService>,
    link_base: &str,
    today: NaiveDate,
) -> ScanReport {
    let mut report = ScanReport::new(today);
    for offset in DAY_OFFSETS {
        let date = today + Duration::days(offset);
        let tasks = match task_repo::tasks_due_on(pool, date).await {
            Ok(tasks) => tasks,
            Err(error) => {
                tracing::error!(%date, offset, error = %error, "Due-date lookup failed");
                report.failures.push(ScanFailure {
                    task_id: None,
                    message: error.to_string(),
                });
                continue;
            }
        };

        for task in tasks {
            if let Err(error) =
                notify_task(pool, email_service, link_base, &task, offset, &mut report).await
            {
                tracing::warn!(
                    task_id = %task.task_id,
                    offset,
                    error = %error,
                    "Due-date scan skipped task"
                );
                report.failures.push(ScanFailure {
                    task_id: Some(task.task_id),
                    message: error.to_string(),
                });
            }
        }
    }

    report
}

async fn notify_task(
    pool: &PgPool,
    email_service: Option<&EmailService>,
    link_base: &str,
    task: &DueTaskRow,
    offset: i64,
    report: &mut ScanReport,
) -> Result<(), AppError> {
    let responsibles = task_repo::responsible_recipients(pool, task.task_id).await?;
    let creator = board_repo::find_board_creator(pool, task.board_id).await?;
    let text = compose_due_message(task, offset, link_base);

    // Each recipient's create-then-send pair is independent of the rest.
    for recipient in fan_out(&responsibles, creator.as_ref()) {
        match NotificationService::emit(
            pool,
            email_service,
            recipient.user_id,
            REMINDER_TITLE,
            &text,
        )
        .await
        {
            Ok(_) => report.record(offset),
            Err(error) => {
                tracing::warn!(
                    task_id = %task.task_id,
                    user_id = %recipient.user_id,
                    error = %error,
                    "Due-date notification not persisted"
                );
                report.failures.push(ScanFailure {
                    task_id: Some(task.task_id),
                    message: error.to_string(),
                });
            }
        }
    }

    Ok(())
}

/// One entry per responsible user; the board creator gets a supplement
/// per entry unless the creator is that responsible. No responsibles,
/// no entries.
pub(crate) fn fan_out(
    responsibles: &[RecipientRow],
    creator: Option<&RecipientRow>,
) -> Vec<RecipientRow> {
    let mut recipients = Vec::new();
    for responsible in responsibles {
        recipients.push(responsible.clone());
        if let Some(creator) = creator {
            if creator.user_id != responsible.user_id {
                recipients.push(creator.clone());
            }
        }
    }

    recipients
}

pub(crate) fn compose_due_message(task: &DueTaskRow, offset: i64, link_base: &str) -> String {
    let lead = match offset {
        -1 => format!("Task \"{}\" is overdue!", task.task_title),
        1 => format!("Task \"{}\" is due tomorrow", task.task_title),
        days => format!("Task \"{}\" is due in {} days", task.task_title, days),
    };

    format!(
        "{} in column \"{}\" on board \"{}\".\n\nLink: {}",
        lead,
        task.column_title,
        task.board_title,
        board_link(link_base, task.board_id),
    )
}

pub(crate) fn board_link(base: &str, board_id: Uuid) -> String {
    format!("{}/boards/{}", base.trim_end_matches('/'), board_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipient(user_id: Uuid) -> RecipientRow {
        RecipientRow {
            user_id,
            username: "user".to_string(),
            email: "user@example.com".to_string(),
        }
    }

    fn due_task() -> DueTaskRow {
        DueTaskRow {
            task_id: Uuid::new_v4(),
            task_title: "Ship release".to_string(),
            column_title: "In progress".to_string(),
            board_id: Uuid::new_v4(),
            board_title: "Sprint".to_string(),
        }
    }

    #[test]
    fn overdue_wording_for_negative_offset() {
        let task = due_task();
        let text = compose_due_message(&task, -1, "http://localhost:3000");
        assert!(text.starts_with("Task \"Ship release\" is overdue!"));
        assert!(text.contains("in column \"In progress\""));
        assert!(text.contains("on board \"Sprint\""));
    }

    #[test]
    fn tomorrow_wording_for_offset_one() {
        let text = compose_due_message(&due_task(), 1, "http://localhost:3000");
        assert!(text.starts_with("Task \"Ship release\" is due tomorrow"));
    }

    #[test]
    fn day_count_wording_for_larger_offsets() {
        let text = compose_due_message(&due_task(), 7, "http://localhost:3000");
        assert!(text.starts_with("Task \"Ship release\" is due in 7 days"));
    }

    #[test]
    fn message_embeds_board_deep_link() {
        let task = due_task();
        let text = compose_due_message(&task, 2, "http://localhost:3000/");
        assert!(text.ends_with(&format!("Link: http://localhost:3000/boards/{}", task.board_id)));
    }

    #[test]
    fn board_link_trims_trailing_slash() {
        let board_id = Uuid::new_v4();
        assert_eq!(
            board_link("https://kanban.example.com/", board_id),
            format!("https://kanban.example.com/boards/{}", board_id)
        );
    }

    #[test]
    fn fan_out_adds_creator_per_responsible() {
        let responsible = recipient(Uuid::new_v4());
        let creator = recipient(Uuid::new_v4());
        let recipients = fan_out(std::slice::from_ref(&responsible), Some(&creator));
        assert_eq!(recipients.len(), 2);
        assert_eq!(recipients[0].user_id, responsible.user_id);
        assert_eq!(recipients[1].user_id, creator.user_id);
    }

    #[test]
    fn fan_out_skips_creator_who_is_responsible() {
        let user = recipient(Uuid::new_v4());
        let recipients = fan_out(std::slice::from_ref(&user), Some(&user));
        assert_eq!(recipients.len(), 1);
        assert_eq!(recipients[0].user_id, user.user_id);
    }

    #[test]
    fn fan_out_without_creator_notifies_responsibles_only() {
        let responsible = recipient(Uuid::new_v4());
        let recipients = fan_out(std::slice::from_ref(&responsible), None);
        assert_eq!(recipients.len(), 1);
    }

    #[test]
    fn fan_out_without_responsibles_is_empty() {
        let creator = recipient(Uuid::new_v4());
        assert!(fan_out(&[], Some(&creator)).is_empty());
    }

    #[test]
    fn report_groups_counts_by_offset() {
        let mut report = ScanReport::new(NaiveDate::from_ymd_opt(2026, 8, 7).unwrap());
        report.record(7);
        report.record(1);
        report.record(1);
        report.record(-1);
        assert_eq!(report.notifications_by_offset.get(&7), Some(&1));
        assert_eq!(report.notifications_by_offset.get(&1), Some(&2));
        assert_eq!(report.notifications_by_offset.get(&-1), Some(&1));
        assert_eq!(report.notifications_created(), 4);
    }
}
