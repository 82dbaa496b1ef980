//! # Vacation notifications
//!
//! Lifecycle transitions hand notifications to a `NotificationDispatcher`,
//! which queues them on an unbounded channel. A background task drains the
//! queue into a `NotificationSink` and records each delivery attempt in a
//! bounded log. Neither a closed queue nor a failed delivery ever affects the
//! transition that produced the notification; the caller only learns
//! whether the notification was queued.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use log::{debug, info, warn};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, oneshot};

use crate::domain::models::vacation_request::RequestStatus;

/// A new request awaiting review, sent to the administrators
#[derive(Debug, Clone, PartialEq)]
pub struct RequestNotice {
    pub employee_name: String,
    pub employee_email: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days: u32,
    pub reason: String,
}

/// The outcome of a review, sent to the employee
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionNotice {
    pub employee_email: String,
    pub employee_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: RequestStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    VacationRequested(RequestNotice),
    VacationDecided(DecisionNotice),
}

impl Notification {
    pub fn kind(&self) -> &'static str {
        match self {
            Notification::VacationRequested(_) => "vacation_requested",
            Notification::VacationDecided(_) => "vacation_decided",
        }
    }
}

/// What the caller learns at dispatch time
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationOutcome {
    Queued,
    Disabled,
    Skipped { reason: String },
    Failed { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryResult {
    pub success: bool,
    pub message: String,
}

/// One attempt recorded by the background worker
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    pub kind: &'static str,
    pub recipient: String,
    pub success: bool,
    pub message: String,
    pub delivered_at: DateTime<Utc>,
}

#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify_admins_of_request(&self, admin_email: &str, notice: &RequestNotice) -> DeliveryResult;

    async fn notify_employee_of_decision(&self, notice: &DecisionNotice) -> DeliveryResult;
}

/// An email as it would be sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl EmailMessage {
    pub fn for_request(admin_email: &str, notice: &RequestNotice) -> Self {
        let subject = format!("New vacation request - {}", notice.employee_name);
        let body = format!(
            "Hello,\n\n{} ({}) has requested vacation.\n\nRequest details:\n- From: {}\n- To: {}\n- Working days: {}\n- Reason: {}\n\nPlease review it in the administration panel.\n\nTimekeeper",
            notice.employee_name,
            notice.employee_email,
            notice.start_date.format("%d/%m/%Y"),
            notice.end_date.format("%d/%m/%Y"),
            notice.days,
            notice.reason,
        );
        Self {
            to: admin_email.to_string(),
            subject,
            body,
        }
    }

    pub fn for_decision(notice: &DecisionNotice) -> Self {
        let verdict = notice.status.to_string().to_uppercase();
        let subject = format!("Vacation {}", verdict);
        let body = format!(
            "Hello {},\n\nYour vacation request from {} to {} has been {}.\n\nTimekeeper",
            notice.employee_name,
            notice.start_date.format("%d/%m/%Y"),
            notice.end_date.format("%d/%m/%Y"),
            verdict,
        );
        Self {
            to: notice.employee_email.clone(),
            subject,
            body,
        }
    }
}

/// Sink that writes each email to the log instead of sending it
#[derive(Debug, Clone, Default)]
pub struct LoggingNotificationSink;

impl LoggingNotificationSink {
    fn deliver(&self, email: EmailMessage) -> DeliveryResult {
        info!("📧 To: {} | Subject: {}", email.to, email.subject);
        debug!("📧 Body:\n{}", email.body);
        DeliveryResult {
            success: true,
            message: format!("Notification logged for {} (demo mode)", email.to),
        }
    }
}

#[async_trait]
impl NotificationSink for LoggingNotificationSink {
    async fn notify_admins_of_request(&self, admin_email: &str, notice: &RequestNotice) -> DeliveryResult {
        self.deliver(EmailMessage::for_request(admin_email, notice))
    }

    async fn notify_employee_of_decision(&self, notice: &DecisionNotice) -> DeliveryResult {
        self.deliver(EmailMessage::for_decision(notice))
    }
}

/// Most recent deliveries, oldest dropped first
#[derive(Debug, Clone)]
struct DeliveryLog {
    entries: Arc<Mutex<VecDeque<Delivery>>>,
    capacity: usize,
}

impl DeliveryLog {
    fn new(capacity: usize) -> Self {
        Self {
            entries: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    fn record(&self, delivery: Delivery) {
        let Ok(mut entries) = self.entries.lock() else {
            warn!("Delivery log lock poisoned; dropping record");
            return;
        };
        if self.capacity == 0 {
            return;
        }
        while entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(delivery);
    }

    /// Newest first
    fn snapshot(&self) -> Vec<Delivery> {
        match self.entries.lock() {
            Ok(entries) => entries.iter().rev().cloned().collect(),
            Err(_) => Vec::new(),
        }
    }
}

enum Command {
    Deliver(Notification),
    Flush(oneshot::Sender<()>),
}

#[derive(Clone)]
pub struct NotificationDispatcher {
    sender: Option<mpsc::UnboundedSender<Command>>,
    admin_email: String,
    log: DeliveryLog,
}

impl NotificationDispatcher {
    /// Start the background worker. Must be called inside a tokio runtime.
    pub fn start(sink: Arc<dyn NotificationSink>, admin_email: String, log_capacity: usize) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let log = DeliveryLog::new(log_capacity);

        tokio::spawn(run_worker(receiver, sink, admin_email.clone(), log.clone()));
        info!("Notification worker started (admin recipient: {})", admin_email);

        Self {
            sender: Some(sender),
            admin_email,
            log,
        }
    }

    /// A dispatcher that accepts nothing and reports `Disabled`
    pub fn disabled() -> Self {
        Self {
            sender: None,
            admin_email: String::new(),
            log: DeliveryLog::new(0),
        }
    }

    pub fn dispatch(&self, notification: Notification) -> NotificationOutcome {
        let Some(sender) = &self.sender else {
            return NotificationOutcome::Disabled;
        };

        let recipient = match &notification {
            Notification::VacationRequested(_) => self.admin_email.clone(),
            Notification::VacationDecided(notice) => notice.employee_email.clone(),
        };
        if recipient.trim().is_empty() {
            warn!("No recipient for {} notification; skipping", notification.kind());
            return NotificationOutcome::Skipped {
                reason: "no recipient address".to_string(),
            };
        }

        let kind = notification.kind();
        match sender.send(Command::Deliver(notification)) {
            Ok(()) => {
                debug!("Queued {} notification for {}", kind, recipient);
                NotificationOutcome::Queued
            }
            Err(_) => {
                warn!("Notification queue closed; {} notification dropped", kind);
                NotificationOutcome::Failed {
                    message: "notification queue is closed".to_string(),
                }
            }
        }
    }

    /// Wait until every notification queued so far has been handled
    pub async fn flush(&self) {
        let Some(sender) = &self.sender else {
            return;
        };
        let (done, wait) = oneshot::channel();
        if sender.send(Command::Flush(done)).is_ok() {
            let _ = wait.await;
        }
    }

    pub fn deliveries(&self) -> Vec<Delivery> {
        self.log.snapshot()
    }
}

async fn run_worker(
    mut receiver: mpsc::UnboundedReceiver<Command>,
    sink: Arc<dyn NotificationSink>,
    admin_email: String,
    log: DeliveryLog,
) {
    while let Some(command) = receiver.recv().await {
        let notification = match command {
            Command::Deliver(notification) => notification,
            Command::Flush(done) => {
                let _ = done.send(());
                continue;
            }
        };

        let (recipient, result) = match &notification {
            Notification::VacationRequested(notice) => (
                admin_email.clone(),
                sink.notify_admins_of_request(&admin_email, notice).await,
            ),
            Notification::VacationDecided(notice) => (
                notice.employee_email.clone(),
                sink.notify_employee_of_decision(notice).await,
            ),
        };

        if result.success {
            info!("Delivered {} notification to {}", notification.kind(), recipient);
        } else {
            warn!(
                "Failed to deliver {} notification to {}: {}",
                notification.kind(),
                recipient,
                result.message
            );
        }

        log.record(Delivery {
            kind: notification.kind(),
            recipient,
            success: result.success,
            message: result.message,
            delivered_at: Utc::now(),
        });
    }
    debug!("Notification worker stopped");
}
