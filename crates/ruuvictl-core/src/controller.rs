// ── Reconciliation controller ──
//
// Lifecycle of one gateway panel: initial load, snapshot polling, edit
// sessions, and the restart-and-reload cycle. Every load builds a fresh
// `Session`; a restart drops it and loads again from scratch.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use strum::Display;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use ruuvictl_api::{GatewayClient, MatterStatus};

use crate::config::PanelConfig;
use crate::edit::{CommitOutcome, EditSession, SinkDraft, TagDraft};
use crate::error::CoreError;
use crate::model::{DeviceSnapshot, MacAddress, SinkConfig, SinkId};
use crate::session::Session;

// ── PanelState ───────────────────────────────────────────────────

/// Panel state observable by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum PanelState {
    /// No usable session: the first load has not finished, or it failed.
    Loading,
    Ready,
    /// A draft is open; nothing is sent until it is committed.
    Editing,
    /// The operator asked to restart and has not confirmed yet.
    RestartPending,
    /// Restart sent; waiting out the grace period before reloading.
    Restarting,
}

// ── Controller ───────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<ControllerInner>`.
#[derive(Clone)]
pub struct Controller {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    config: PanelConfig,
    client: GatewayClient,
    state: watch::Sender<PanelState>,
    session: Mutex<Option<Arc<Session>>>,
    edit: Mutex<Option<OpenEdit>>,
    /// Serializes gateway writes so read-copy-push sequences never interleave.
    mutation: Mutex<()>,
    cancel: CancellationToken,
    poll: Mutex<Option<PollTask>>,
}

#[derive(Clone)]
struct OpenEdit {
    draft: EditSession,
    /// State to return to when the edit is cancelled.
    return_to: PanelState,
}

struct PollTask {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl Controller {
    /// Create a controller for the configured gateway. Does NOT load --
    /// call [`load()`](Self::load) to fetch the initial state.
    pub fn new(config: PanelConfig) -> Result<Self, CoreError> {
        let client = GatewayClient::new(config.url.as_str(), &config.transport())?;
        let (state, _) = watch::channel(PanelState::Loading);

        Ok(Self {
            inner: Arc::new(ControllerInner {
                config,
                client,
                state,
                session: Mutex::new(None),
                edit: Mutex::new(None),
                mutation: Mutex::new(()),
                cancel: CancellationToken::new(),
                poll: Mutex::new(None),
            }),
        })
    }

    pub fn config(&self) -> &PanelConfig {
        &self.inner.config
    }

    pub fn state(&self) -> PanelState {
        *self.inner.state.borrow()
    }

    /// Subscribe to state transitions.
    pub fn subscribe_state(&self) -> watch::Receiver<PanelState> {
        self.inner.state.subscribe()
    }

    /// The current session. Fails while loading or restarting.
    pub async fn session(&self) -> Result<Arc<Session>, CoreError> {
        self.inner
            .session
            .lock()
            .await
            .clone()
            .ok_or(CoreError::NotReady {
                state: self.state(),
            })
    }

    pub async fn restart_required(&self) -> bool {
        self.inner
            .session
            .lock()
            .await
            .as_ref()
            .is_some_and(|s| s.restart_flag().is_raised())
    }

    // ── Loading ──────────────────────────────────────────────────

    /// Fetch configuration and tag readings concurrently and build a new session.
    ///
    /// Both must succeed. On failure the panel stays in `Loading` with no
    /// session. A running poll is moved over to the new session.
    pub async fn load(&self) -> Result<(), CoreError> {
        let resume_polling = self.stop_polling().await;
        *self.inner.session.lock().await = None;
        *self.inner.edit.lock().await = None;
        self.set_state(PanelState::Loading);

        let client = &self.inner.client;
        let (config, tags) = tokio::join!(client.get_config(), client.list_tags());
        let (config, tags) = (config?, tags?);

        let count = tags.len();
        let session = Session::new(
            config,
            tags.into_iter().map(DeviceSnapshot::from).collect(),
            self.inner.config.retention,
        );
        *self.inner.session.lock().await = Some(Arc::new(session));
        self.set_state(PanelState::Ready);
        info!(tags = count, "panel loaded");

        if resume_polling {
            self.start_polling().await?;
        }
        Ok(())
    }

    // ── Polling ──────────────────────────────────────────────────

    /// Start refreshing tag readings every `poll_interval`. No-op if running.
    pub async fn start_polling(&self) -> Result<(), CoreError> {
        let period = self.inner.config.poll_interval;
        if period.is_zero() {
            return Err(CoreError::Config {
                message: "poll interval must be greater than zero".into(),
            });
        }

        let session = self.session().await?;
        let mut slot = self.inner.poll.lock().await;
        if slot.is_some() {
            return Ok(());
        }

        let cancel = self.inner.cancel.child_token();
        let handle = tokio::spawn(poll_task(
            self.inner.client.clone(),
            session,
            period,
            cancel.clone(),
        ));
        *slot = Some(PollTask { cancel, handle });
        debug!(?period, "snapshot polling started");
        Ok(())
    }

    /// Stop polling and wait for the task to exit. Returns whether it was running.
    ///
    /// A refresh already in flight finishes into the session it started with.
    pub async fn stop_polling(&self) -> bool {
        let Some(task) = self.inner.poll.lock().await.take() else {
            return false;
        };
        task.cancel.cancel();
        if let Err(e) = task.handle.await {
            warn!(error = %e, "poll task ended abnormally");
        }
        debug!("snapshot polling stopped");
        true
    }

    pub async fn is_polling(&self) -> bool {
        self.inner.poll.lock().await.is_some()
    }

    // ── Edit sessions ────────────────────────────────────────────

    /// Open a draft of one sink section.
    ///
    /// A sink the document lacks starts from its defaults, switched on.
    pub async fn begin_sink_edit(&self, id: SinkId) -> Result<SinkDraft, CoreError> {
        let session = self.session().await?;
        let draft = SinkDraft {
            id,
            config: session
                .config()
                .sink(id)
                .unwrap_or_else(|| SinkConfig::default_for(id)),
        };
        self.open_edit(EditSession::Sink(draft.clone())).await?;
        Ok(draft)
    }

    /// Replace the open sink draft.
    pub async fn update_sink_draft(&self, config: SinkConfig) -> Result<SinkDraft, CoreError> {
        let mut slot = self.inner.edit.lock().await;
        let Some(OpenEdit {
            draft: EditSession::Sink(draft),
            ..
        }) = slot.as_mut()
        else {
            return Err(CoreError::NoEditSession);
        };
        if config.id() != draft.id {
            return Err(CoreError::Validation {
                message: format!("the open draft is for {}, not {}", draft.id, config.id()),
            });
        }
        draft.config = config;
        Ok(draft.clone())
    }

    /// Open a draft of one tag's name and membership.
    pub async fn begin_tag_edit(&self, mac: &MacAddress) -> Result<TagDraft, CoreError> {
        let session = self.session().await?;
        let ledger = session.ledger();
        let custom = ledger.custom_name(mac);
        let enabled = ledger.is_enabled(mac);

        if session.snapshots().get(mac).is_none() && custom.is_none() && !enabled {
            return Err(CoreError::UnknownDevice {
                mac: mac.to_string(),
            });
        }

        let draft = TagDraft::new(mac.clone(), custom.unwrap_or_default(), enabled);
        self.open_edit(EditSession::Tag(draft.clone())).await?;
        Ok(draft)
    }

    /// Change the open tag draft. `None` leaves a field as it is.
    pub async fn update_tag_draft(
        &self,
        name: Option<String>,
        enabled: Option<bool>,
    ) -> Result<TagDraft, CoreError> {
        let mut slot = self.inner.edit.lock().await;
        let Some(OpenEdit {
            draft: EditSession::Tag(draft),
            ..
        }) = slot.as_mut()
        else {
            return Err(CoreError::NoEditSession);
        };
        if let Some(name) = name {
            draft.name = name;
        }
        if let Some(enabled) = enabled {
            draft.enabled = enabled;
        }
        Ok(draft.clone())
    }

    /// The open draft, if any.
    pub async fn edit_session(&self) -> Option<EditSession> {
        self.inner.edit.lock().await.as_ref().map(|e| e.draft.clone())
    }

    /// Send the open draft to the gateway.
    ///
    /// On success, or on a partial tag save, the draft is closed and the
    /// panel returns to `Ready`. On any other failure nothing changed and
    /// the draft stays open for another attempt or a cancel.
    pub async fn commit_edit(&self) -> Result<CommitOutcome, CoreError> {
        let session = self.session().await?;
        let mut slot = self.inner.edit.lock().await;
        let open = slot.clone().ok_or(CoreError::NoEditSession)?;

        let result = {
            let _writing = self.inner.mutation.lock().await;
            match open.draft {
                EditSession::Sink(draft) => {
                    let current = session.config().sink(draft.id);
                    let unchanged = current.as_ref() == Some(&draft.config)
                        || current == Some(draft.config.clone().with_defaults());
                    if unchanged {
                        Ok(CommitOutcome::Unchanged)
                    } else {
                        session
                            .config()
                            .replace_sink(&self.inner.client, draft.id.as_ref(), draft.config)
                            .await
                            .map(|()| CommitOutcome::Saved)
                    }
                }
                EditSession::Tag(draft) => {
                    let changes = draft.changes();
                    if changes.is_empty() {
                        Ok(CommitOutcome::Unchanged)
                    } else {
                        session
                            .ledger()
                            .apply_edit(&self.inner.client, &draft.mac, changes)
                            .await
                            .map(|()| CommitOutcome::Saved)
                    }
                }
            }
        };

        match result {
            Ok(outcome) => {
                *slot = None;
                self.set_state(match outcome {
                    CommitOutcome::Saved => PanelState::Ready,
                    CommitOutcome::Unchanged => open.return_to,
                });
                Ok(outcome)
            }
            Err(e @ CoreError::PartialMutation { .. }) => {
                *slot = None;
                self.set_state(PanelState::Ready);
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    /// Discard the open draft without contacting the gateway.
    pub async fn cancel_edit(&self) -> Result<(), CoreError> {
        let open = self
            .inner
            .edit
            .lock()
            .await
            .take()
            .ok_or(CoreError::NoEditSession)?;
        self.set_state(open.return_to);
        Ok(())
    }

    // ── Direct mutations ─────────────────────────────────────────

    pub async fn set_tag_enabled(&self, mac: &MacAddress, enabled: bool) -> Result<(), CoreError> {
        let session = self.idle_session().await?;
        validate_mac(mac)?;
        let _writing = self.inner.mutation.lock().await;
        session
            .ledger()
            .set_enabled(&self.inner.client, mac, enabled)
            .await
    }

    pub async fn set_tag_name(&self, mac: &MacAddress, name: &str) -> Result<(), CoreError> {
        let session = self.idle_session().await?;
        validate_mac(mac)?;
        let _writing = self.inner.mutation.lock().await;
        session
            .ledger()
            .set_name(&self.inner.client, mac, name)
            .await
    }

    pub async fn replace_sink(&self, id: &str, config: SinkConfig) -> Result<(), CoreError> {
        let session = self.idle_session().await?;
        let _writing = self.inner.mutation.lock().await;
        session
            .config()
            .replace_sink(&self.inner.client, id, config)
            .await
    }

    // ── Restart ──────────────────────────────────────────────────

    /// Ask for confirmation of a restart.
    pub async fn request_restart(&self) -> Result<(), CoreError> {
        self.idle_session().await?;
        self.set_state(PanelState::RestartPending);
        Ok(())
    }

    /// Forget that a restart is needed.
    pub async fn dismiss_restart(&self) -> Result<(), CoreError> {
        let session = self.idle_session().await?;
        session.restart_flag().clear();
        self.set_state(PanelState::Ready);
        Ok(())
    }

    /// Restart the gateway, wait out the grace period, and reload from scratch.
    ///
    /// The gateway is assumed to be back once the grace period is over; the
    /// reload is the first contact after it. If the restart call fails the
    /// panel returns to `RestartPending` with the flag still raised.
    pub async fn confirm_restart(&self) -> Result<(), CoreError> {
        let state = self.state();
        if state != PanelState::RestartPending {
            return Err(CoreError::NotReady { state });
        }
        self.set_state(PanelState::Restarting);

        let accepted = match self.inner.client.restart().await {
            Ok(resp) if resp.restarting => Ok(()),
            Ok(_) => Err(CoreError::Rejected {
                message: "gateway declined to restart".into(),
            }),
            Err(e) => Err(CoreError::from(e)),
        };
        if let Err(e) = accepted {
            warn!(error = %e, "restart failed");
            self.set_state(PanelState::RestartPending);
            return Err(e);
        }

        let resume_polling = self.stop_polling().await;
        *self.inner.session.lock().await = None;
        *self.inner.edit.lock().await = None;

        let grace = self.inner.config.restart_grace;
        info!(?grace, "gateway restarting; reloading after grace period");
        tokio::select! {
            biased;
            () = self.inner.cancel.cancelled() => return Ok(()),
            () = tokio::time::sleep(grace) => {}
        }

        self.load().await?;
        if resume_polling {
            self.start_polling().await?;
        }
        Ok(())
    }

    // ── Matter bridge ────────────────────────────────────────────

    /// Pairing information, when the Matter bridge is enabled.
    pub async fn bridge_status(&self) -> Result<Option<MatterStatus>, CoreError> {
        let session = self.session().await?;
        let enabled = session
            .config()
            .sink(SinkId::Matter)
            .is_some_and(|m| m.is_enabled());
        if !enabled {
            return Ok(None);
        }
        Ok(Some(self.inner.client.matter_status().await?))
    }

    // ── Teardown ─────────────────────────────────────────────────

    /// Cancel background work and wait for it to finish.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();
        self.stop_polling().await;
        debug!("controller shut down");
    }

    /// One-shot: load, run closure, shut down.
    ///
    /// For single CLI invocations that need one consistent view and
    /// no background polling.
    pub async fn oneshot<F, Fut, T>(config: PanelConfig, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(Controller) -> Fut,
        Fut: std::future::Future<Output = Result<T, CoreError>>,
    {
        let controller = Controller::new(config)?;
        controller.load().await?;
        let result = f(controller.clone()).await;
        controller.shutdown().await;
        result
    }

    // ── Private helpers ──────────────────────────────────────────

    fn set_state(&self, next: PanelState) {
        let prev = self.inner.state.send_replace(next);
        if prev != next {
            debug!(from = %prev, to = %next, "panel state changed");
        }
    }

    /// The session, provided no draft is open and no restart is under way.
    async fn idle_session(&self) -> Result<Arc<Session>, CoreError> {
        match self.state() {
            PanelState::Ready | PanelState::RestartPending => self.session().await,
            PanelState::Editing => Err(CoreError::EditInProgress),
            state => Err(CoreError::NotReady { state }),
        }
    }

    async fn open_edit(&self, draft: EditSession) -> Result<(), CoreError> {
        let mut slot = self.inner.edit.lock().await;
        let return_to = self.state();
        if slot.is_some() || return_to == PanelState::Editing {
            return Err(CoreError::EditInProgress);
        }
        if !matches!(return_to, PanelState::Ready | PanelState::RestartPending) {
            return Err(CoreError::NotReady { state: return_to });
        }
        *slot = Some(OpenEdit { draft, return_to });
        self.set_state(PanelState::Editing);
        Ok(())
    }
}

fn validate_mac(mac: &MacAddress) -> Result<(), CoreError> {
    if mac.is_valid() {
        Ok(())
    } else {
        Err(CoreError::Validation {
            message: format!("'{mac}' is not a MAC address"),
        })
    }
}

// ── Background tasks ─────────────────────────────────────────────

/// Refresh the snapshot cache of `session` every `period`.
///
/// Each refresh is awaited inside the loop, so polls never overlap.
async fn poll_task(
    client: GatewayClient,
    session: Arc<Session>,
    period: Duration,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                if let Err(e) = session.snapshots().refresh(&client).await {
                    warn!(error = %e, "snapshot poll failed; keeping last readings");
                }
            }
        }
    }
}
