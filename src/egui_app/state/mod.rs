use std::collections::HashMap;
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::sync::Arc;

use chrono::{Duration, Utc};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::warn;

use crate::api::ApiClient;
use crate::egui_app::types::{AppTab, TabData};
use crate::session::{SessionSnapshot, SessionStore};
use crate::shared::error::{ApiError, AuthError};
use crate::shared::models::{AdminUser, BookingFilter, SlotFilter};

/// Shown in a tab whose list could not be fetched.
pub const LOAD_FAILED: &str = "Could not load data. Try refreshing.";

/// Days of schedule shown from today.
const SCHEDULE_DAYS: i64 = 14;

/// Loading state of one tab
pub enum TabState {
    Loading(Receiver<Result<TabData, ApiError>>),
    Ready(TabData),
    Failed(String),
}

/// Central application state shared across egui views.
pub struct AppState {
    runtime: Handle,
    pub session: Arc<SessionStore>,
    snapshots: watch::Receiver<SessionSnapshot>,
    pub snapshot: SessionSnapshot,
    pub identifier_input: String,
    pub password_input: String,
    pub login_pending: Option<Receiver<Result<AdminUser, AuthError>>>,
    pub current_tab: AppTab,
    tabs: HashMap<AppTab, TabState>,
}

impl AppState {
    pub fn new(runtime: Handle, session: Arc<SessionStore>) -> Self {
        let mut snapshots = session.subscribe();
        let snapshot = snapshots.borrow_and_update().clone();

        Self {
            runtime,
            session,
            snapshots,
            snapshot,
            identifier_input: String::new(),
            password_input: String::new(),
            login_pending: None,
            current_tab: AppTab::default(),
            tabs: HashMap::new(),
        }
    }

    /// Pick up session changes and finished background work. Call every frame.
    pub fn poll(&mut self) {
        if self.snapshots.has_changed().unwrap_or(false) {
            self.snapshot = self.snapshots.borrow_and_update().clone();
            if !self.snapshot.is_authenticated() {
                self.tabs.clear();
                self.current_tab = AppTab::default();
            }
        }

        if let Some(rx) = &self.login_pending {
            match rx.try_recv() {
                Ok(result) => {
                    self.login_pending = None;
                    if result.is_ok() {
                        self.password_input.clear();
                    }
                }
                Err(TryRecvError::Disconnected) => self.login_pending = None,
                Err(TryRecvError::Empty) => {}
            }
        }

        for state in self.tabs.values_mut() {
            let TabState::Loading(rx) = state else {
                continue;
            };
            match rx.try_recv() {
                Ok(Ok(data)) => *state = TabState::Ready(data),
                Ok(Err(e)) => {
                    // 401 already ended the session; anything else stays local.
                    if !e.is_unauthorized() {
                        warn!(error = %e, "tab load failed");
                    }
                    *state = TabState::Failed(LOAD_FAILED.to_string());
                }
                Err(TryRecvError::Disconnected) => {
                    *state = TabState::Failed(LOAD_FAILED.to_string());
                }
                Err(TryRecvError::Empty) => {}
            }
        }
    }

    pub fn is_login_pending(&self) -> bool {
        self.login_pending.is_some()
    }

    pub fn can_submit_login(&self) -> bool {
        !self.is_login_pending()
            && !self.identifier_input.trim().is_empty()
            && !self.password_input.is_empty()
    }

    pub fn handle_login(&mut self) {
        if self.is_login_pending() {
            return;
        }

        let session = Arc::clone(&self.session);
        let identifier = self.identifier_input.clone();
        let password = self.password_input.clone();

        let (tx, rx) = channel();
        self.runtime.spawn(async move {
            let result = session.login(&identifier, &password).await;
            let _ = tx.send(result);
        });

        self.login_pending = Some(rx);
    }

    pub fn logout(&mut self) {
        self.session.logout();
        self.password_input.clear();
    }

    /// Called whenever a login field is edited.
    pub fn on_login_input_changed(&self) {
        if self.snapshot.error.is_some() {
            self.session.clear_error();
        }
    }

    pub fn tab(&self, tab: AppTab) -> Option<&TabState> {
        self.tabs.get(&tab)
    }

    /// Start loading the tab unless it is loaded or loading.
    pub fn ensure_loaded(&mut self, tab: AppTab) {
        if !self.tabs.contains_key(&tab) {
            self.refresh(tab);
        }
    }

    pub fn refresh(&mut self, tab: AppTab) {
        let client = self.session.client().clone();
        let (tx, rx) = channel();
        self.runtime.spawn(async move {
            let _ = tx.send(fetch_tab(&client, tab).await);
        });
        self.tabs.insert(tab, TabState::Loading(rx));
    }
}

/// Fetch the list behind a tab and flatten it into a table.
pub async fn fetch_tab(client: &ApiClient, tab: AppTab) -> Result<TabData, ApiError> {
    match tab {
        AppTab::Dashboard => {
            let now = Utc::now();
            let week = SlotFilter {
                from: Some(now),
                to: Some(now + Duration::days(7)),
                direction_id: None,
            };
            let slots = client.slots();
            let bookings = client.bookings();
            let (stats, upcoming) =
                futures_util::future::try_join(bookings.stats(), slots.list(&week)).await?;
            Ok(TabData::from_pairs([
                ("Bookings", stats.total.to_string()),
                ("Confirmed", stats.confirmed.to_string()),
                ("Booked today", stats.bookings_today.to_string()),
                ("Attendance", format!("{:.0}%", stats.attendance_rate)),
                ("Revenue, 7 days", format!("{:.2}", stats.weekly_revenue)),
                ("Classes in the next 7 days", upcoming.len().to_string()),
            ]))
        }
        AppTab::Directions => table(&client.directions().list(true).await?),
        AppTab::Schedule => {
            let today = Utc::now();
            let filter = SlotFilter {
                from: Some(today),
                to: Some(today + Duration::days(SCHEDULE_DAYS)),
                direction_id: None,
            };
            table(&client.slots().list(&filter).await?)
        }
        AppTab::Products => table(&client.products().list().await?),
        AppTab::Bookings => table(&client.bookings().list(&BookingFilter::default()).await?),
        AppTab::Payments => table(&client.payments().list().await?),
        AppTab::Users => table(&client.users().list().await?),
        AppTab::Settings => {
            let settings = client.settings().addresses().await?;
            let media = settings.media.iter().map(|item| {
                (
                    format!("{} #{}", item.media_type, item.id),
                    item.filename.clone().unwrap_or_else(|| item.url.clone()),
                )
            });
            Ok(TabData::from_pairs(
                std::iter::once(("Addresses".to_string(), settings.addresses.clone()))
                    .chain(media),
            ))
        }
    }
}

fn table<T: serde::Serialize>(records: &[T]) -> Result<TabData, ApiError> {
    TabData::from_records(records)
        .map_err(|e| ApiError::invalid_response(format!("cannot tabulate records: {}", e)))
}
