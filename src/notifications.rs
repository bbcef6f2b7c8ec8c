//! User-facing notifications about offer submissions.

/// Kinds of notification the sell flow emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationId {
    CreateOfferLoading,
    CreateOfferSuccess,
    CreateOfferError,
    CreateOfferInvalid,
}

/// Data shared by the notifications of one transaction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NotificationPayload {
    /// Stable key so a later update replaces the loading notification.
    pub key: String,
    pub href: String,
    pub hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub key: Option<String>,
    pub id: NotificationId,
    pub title: &'static str,
    pub message: String,
    pub href: Option<String>,
    pub loading: bool,
}

impl NotificationId {
    pub fn build(self, payload: Option<&NotificationPayload>) -> Notification {
        let (title, loading) = match self {
            NotificationId::CreateOfferLoading => ("Offer creation pending", true),
            NotificationId::CreateOfferSuccess => ("Offer created", false),
            NotificationId::CreateOfferError => ("Offer creation failed", false),
            NotificationId::CreateOfferInvalid => ("Invalid offer", false),
        };
        let message = match (self, payload) {
            (NotificationId::CreateOfferInvalid, _) | (_, None) => {
                "The offer could not be created. Check the form values and try again.".to_string()
            }
            (NotificationId::CreateOfferLoading, Some(p)) => {
                format!("Transaction {} sent, waiting for confirmation", p.hash)
            }
            (NotificationId::CreateOfferSuccess, Some(p)) => {
                format!("Transaction {} confirmed", p.hash)
            }
            (NotificationId::CreateOfferError, Some(p)) => {
                format!("Transaction {} failed", p.hash)
            }
        };

        Notification {
            key: payload.map(|p| p.key.clone()),
            id: self,
            title,
            message,
            href: payload.map(|p| p.href.clone()),
            loading,
        }
    }
}

/// Sink for notifications.
pub trait Notifier: Send + Sync {
    fn show(&self, notification: Notification);

    /// Replace the notification with the same key.
    fn update(&self, notification: Notification);
}

/// Notifier that writes to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn show(&self, n: Notification) {
        match n.id {
            NotificationId::CreateOfferError | NotificationId::CreateOfferInvalid => {
                tracing::error!(id = ?n.id, href = n.href.as_deref(), "{}: {}", n.title, n.message)
            }
            _ => tracing::info!(id = ?n.id, href = n.href.as_deref(), "{}: {}", n.title, n.message),
        }
    }

    fn update(&self, n: Notification) {
        self.show(n)
    }
}
