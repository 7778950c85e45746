//! Slack reminder delivery.
//!
//! One message per qualifying deadline, posted through an incoming
//! webhook. The qualification rules are enforced again here as a guard:
//! formatting refuses anything that is not a deadline resolved to an
//! actual delivery, and the orchestrator treats that refusal as "nothing
//! to post for this one" rather than a failure.

use chrono::{DateTime, Datelike, FixedOffset};
use kondate_core::{Menu, ScheduleEvent, ScheduleKind};
use serde::Serialize;
use thiserror::Error;

use crate::client::BASE_URL;
use crate::run::Notifier;

const USERNAME: &str = "kondate";
const ICON_URL: &str =
    "https://1.bp.blogspot.com/-VdRARu0Xvm0/Xlyf8ZzqClI/AAAAAAABXrI/fjsmV2v7UB0UHJzmXAfB-7zjXFvxJx9QgCNcBGAsYHQ/s1600/pulp_mold_obentou.png";

#[derive(Error, Debug)]
pub enum NotifyError {
    /// Guard violations: the event should never have reached the notifier.
    #[error("refusing to remind about a {0} event")]
    NotDeadline(ScheduleKind),
    #[error("deadline event carries no delivery date")]
    MissingDeliveryDate,

    /// The distinguished "nothing to post" signal: the order is not
    /// heading to a delivery, so a reminder would be noise.
    #[error("order resolves to {outcome}, nothing to post")]
    NoDeliveryPlanned { outcome: String },

    /// Actual delivery failures; always fatal to the run.
    #[error("slack webhook request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("slack webhook rejected the message: {0}")]
    Rejected(reqwest::StatusCode),
}

impl NotifyError {
    /// Whether the orchestrator should swallow this error and move on.
    pub fn is_nothing_to_post(&self) -> bool {
        matches!(self, NotifyError::NoDeliveryPlanned { .. })
    }
}

/// Build the reminder text for one deadline and its menus.
///
/// Refuses non-deadline events and deadlines not resolved to a delivery;
/// the latter is the non-fatal "nothing to post" condition.
pub fn format_reminder(menus: &[Menu], deadline: &ScheduleEvent) -> Result<String, NotifyError> {
    if deadline.kind != ScheduleKind::Deadline {
        return Err(NotifyError::NotDeadline(deadline.kind));
    }
    if deadline.outcome != Some(ScheduleKind::Delivery) {
        let outcome = match deadline.outcome {
            Some(kind) => kind.to_string(),
            None => "nothing yet".to_string(),
        };
        return Err(NotifyError::NoDeliveryPlanned { outcome });
    }
    let delivery_date = deadline
        .delivery_date
        .ok_or(NotifyError::MissingDeliveryDate)?;

    let mut text = format!(
        "メニュー変更締切が迫っています (締切: {} 受取: {})\n{}\n",
        pretty_date(deadline.date),
        pretty_date(delivery_date),
        deadline.link,
    );
    for menu in menus {
        text.push_str(&format!("\n- {}", menu.pretty(BASE_URL)));
    }

    Ok(text)
}

fn pretty_date(date: DateTime<FixedOffset>) -> String {
    format!("{}/{}/{}", date.year(), date.month(), date.day())
}

#[derive(Serialize)]
struct WebhookMessage<'a> {
    channel: &'a str,
    username: &'a str,
    icon_url: &'a str,
    text: &'a str,
}

/// Slack incoming-webhook notifier.
pub struct Slack {
    http: reqwest::Client,
    webhook_url: String,
    channel: String,
}

impl Slack {
    pub fn new(webhook_url: impl Into<String>, channel: impl Into<String>) -> Self {
        Slack {
            http: reqwest::Client::new(),
            webhook_url: webhook_url.into(),
            channel: channel.into(),
        }
    }

    async fn post(&self, text: &str) -> Result<(), NotifyError> {
        let message = WebhookMessage {
            channel: &self.channel,
            username: USERNAME,
            icon_url: ICON_URL,
            text,
        };

        let response = self
            .http
            .post(&self.webhook_url)
            .json(&message)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::Rejected(status));
        }
        Ok(())
    }
}

impl Notifier for Slack {
    async fn remind(&self, menus: &[Menu], deadline: &ScheduleEvent) -> Result<(), NotifyError> {
        let text = format_reminder(menus, deadline)?;
        self.post(&text).await
    }
}

/// Prints reminders to stdout instead of posting them (`--dry-run`).
pub struct Stdout;

impl Notifier for Stdout {
    async fn remind(&self, menus: &[Menu], deadline: &ScheduleEvent) -> Result<(), NotifyError> {
        let text = format_reminder(menus, deadline)?;
        println!("{text}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use kondate_core::{Nutrition, jst};

    fn deadline(outcome: Option<ScheduleKind>) -> ScheduleEvent {
        ScheduleEvent {
            schedule_id: 22222,
            kind: ScheduleKind::Deadline,
            date: jst().with_ymd_and_hms(2026, 4, 10, 0, 0, 0).unwrap(),
            link: "https://nosh.jp/mypage/11111/22222".into(),
            delivery_date: Some(jst().with_ymd_and_hms(2026, 4, 13, 0, 0, 0).unwrap()),
            outcome,
        }
    }

    fn menu(name: &str, count: u32) -> Menu {
        Menu {
            id: 181,
            name: name.into(),
            nutrition: Nutrition::default(),
            image_url: None,
            count,
        }
    }

    #[test]
    fn message_embeds_dates_link_and_menus() {
        let menus = vec![menu("チリハンバーグステーキ", 2), menu("白身魚の甘酢あんかけ", 1)];
        let text =
            format_reminder(&menus, &deadline(Some(ScheduleKind::Delivery))).unwrap();

        assert!(text.starts_with(
            "メニュー変更締切が迫っています (締切: 2026/4/10 受取: 2026/4/13)\n"
        ));
        assert!(text.contains("https://nosh.jp/mypage/11111/22222"));
        assert!(text.contains("\n- チリハンバーグステーキ 2食 https://nosh.jp/menu/detail/181"));
        assert!(text.contains("\n- 白身魚の甘酢あんかけ 1食 https://nosh.jp/menu/detail/181"));
    }

    #[test]
    fn skip_outcome_is_nothing_to_post() {
        let err = format_reminder(&[], &deadline(Some(ScheduleKind::Skip))).unwrap_err();
        assert!(err.is_nothing_to_post());
    }

    #[test]
    fn unresolved_outcome_is_nothing_to_post() {
        let err = format_reminder(&[], &deadline(None)).unwrap_err();
        assert!(err.is_nothing_to_post());
    }

    #[test]
    fn non_deadline_event_is_a_guard_violation() {
        let mut event = deadline(Some(ScheduleKind::Delivery));
        event.kind = ScheduleKind::Delivery;

        let err = format_reminder(&[], &event).unwrap_err();
        assert!(matches!(err, NotifyError::NotDeadline(ScheduleKind::Delivery)));
        assert!(!err.is_nothing_to_post());
    }
}
