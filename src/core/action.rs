//! # Actions
//!
//! Everything that can happen in the session becomes an `Action`.
//! User presses Enter? That's `Action::SubmitPrompt`.
//! The backend answers? That's `Action::ExchangeResolved`.
//!
//! `update()` takes the current state and an action, mutates the state,
//! and returns the `Effect` the adapter must carry out (spawn a request,
//! refresh the list, nothing). I/O happens in the adapter, never here.
//!
//! ```text
//! State + Action  →  update()  →  State' + Effect
//! ```
//!
//! Exchange and reveal lifecycles are keyed on monotonic ids: a resolution
//! or tick that doesn't match the live id is stale (cancelled, superseded
//! by a thread switch, or outrun by a newer reply) and is dropped. Every
//! exchange therefore settles exactly once, and a reply for a thread the
//! user has left can never leak into the transcript they are looking at.

use log::{debug, warn};

use crate::backend::{AccountRole, ThreadSummary, Turn};
use crate::core::exchange::{ExchangeOutcome, PendingExchange};
use crate::core::reveal::RevealState;
use crate::core::state::App;
use crate::core::threads;

#[derive(Debug)]
pub enum Action {
    /// User submitted the input buffer.
    SubmitPrompt(String),
    /// User hit the stop control while generating.
    CancelExchange,
    /// The exchange task settled. Applied at most once per exchange id.
    ExchangeResolved { id: u64, outcome: ExchangeOutcome },
    /// Reveal ticker fired. Ignored unless the generation is live.
    RevealTick { generation: u64 },
    NewChat,
    SwitchThread(String),
    ThreadLoaded {
        thread_id: String,
        turns: Vec<Turn>,
    },
    ThreadLoadFailed {
        thread_id: String,
        error: String,
    },
    /// A "threads changed" broadcast arrived; re-fetch the list.
    RefreshThreads,
    ThreadsLoaded(Vec<ThreadSummary>),
    ThreadsLoadFailed(String),
    /// User asked to delete a thread; removal happens on the ack.
    DeleteThread(String),
    ThreadDeleted(String),
    ThreadDeleteFailed {
        thread_id: String,
        error: String,
    },
    RoleLoaded(AccountRole),
    CycleVersion,
    Quit,
}

/// What the adapter must do after a state transition.
#[derive(Debug)]
pub enum Effect {
    None,
    Quit,
    /// Spawn the network task for a freshly submitted exchange.
    SpawnExchange {
        id: u64,
        thread_id: String,
        prompt: String,
        cancel: tokio_util::sync::CancellationToken,
    },
    /// An exchange landed: clear the input, run the reveal ticker for
    /// `steps` frames, and publish "threads changed".
    ExchangeSucceeded { generation: u64, steps: usize },
    /// Publish "threads changed" without touching the transcript view.
    NotifyThreadsChanged,
    /// Active thread changed to an existing thread: fetch its transcript
    /// and refresh the list.
    ThreadSwitched { thread_id: String },
    /// Active thread changed to a fresh local one: clear the input and
    /// refresh the list.
    NewChatStarted,
    RefreshThreads,
    DeleteThread { thread_id: String },
}

pub fn update(app: &mut App, action: Action) -> Effect {
    match action {
        Action::SubmitPrompt(text) => submit_prompt(app, text),
        Action::CancelExchange => cancel_exchange(app),
        Action::ExchangeResolved { id, outcome } => resolve_exchange(app, id, outcome),
        Action::RevealTick { generation } => reveal_tick(app, generation),
        Action::NewChat => start_new_chat(app),
        Action::SwitchThread(thread_id) => switch_thread(app, thread_id),
        Action::ThreadLoaded { thread_id, turns } => {
            if thread_id == app.active_thread {
                app.transcript = turns;
                app.status_message.clear();
            } else {
                debug!("Dropping stale transcript load for thread {thread_id}");
            }
            Effect::None
        }
        Action::ThreadLoadFailed { thread_id, error } => {
            warn!("Failed to load thread {thread_id}: {error}");
            app.status_message = String::from("Failed to load conversation");
            Effect::None
        }
        Action::RefreshThreads => Effect::RefreshThreads,
        Action::ThreadsLoaded(snapshot) => {
            // Wholesale replacement; the list is a server-truth projection.
            app.threads = snapshot;
            Effect::None
        }
        Action::ThreadsLoadFailed(error) => {
            // Fail-soft: the prior snapshot stays in place.
            warn!("Failed to refresh thread list: {error}");
            app.status_message = String::from("Failed to load threads");
            Effect::None
        }
        Action::DeleteThread(thread_id) => Effect::DeleteThread { thread_id },
        Action::ThreadDeleted(thread_id) => {
            app.threads.retain(|t| t.thread_id != thread_id);
            app.status_message = String::from("Conversation deleted");
            if thread_id == app.active_thread {
                start_new_chat(app)
            } else {
                Effect::None
            }
        }
        Action::ThreadDeleteFailed { thread_id, error } => {
            warn!("Failed to delete thread {thread_id}: {error}");
            app.status_message = String::from("Failed to delete conversation");
            Effect::None
        }
        Action::RoleLoaded(role) => {
            app.role = role;
            Effect::None
        }
        Action::CycleVersion => {
            app.version = app.version.next();
            app.status_message = format!("Assistant: {}", app.version.label());
            Effect::None
        }
        Action::Quit => Effect::Quit,
    }
}

fn submit_prompt(app: &mut App, text: String) -> Effect {
    if text.trim().is_empty() {
        // Validation failure; never reaches the network.
        return Effect::None;
    }
    if app.pending_exchange.is_some() {
        // The submit control is a stop control while generating; a second
        // submit can only be a race and is ignored.
        debug!("Ignoring submit while an exchange is pending");
        return Effect::None;
    }

    app.exchange_seq += 1;
    let exchange = PendingExchange::new(app.exchange_seq, app.active_thread.clone(), text.clone());
    let effect = Effect::SpawnExchange {
        id: exchange.id,
        thread_id: exchange.thread_id.clone(),
        prompt: exchange.prompt.clone(),
        cancel: exchange.cancel.clone(),
    };

    app.draft = text;
    app.new_chat = false;
    app.generating = true;
    app.status_message = String::from("Assistant is thinking...");
    app.pending_exchange = Some(exchange);
    effect
}

fn cancel_exchange(app: &mut App) -> Effect {
    // Idempotent: with nothing pending there is nothing to do, and the
    // token itself tolerates repeated cancellation.
    if let Some(exchange) = app.pending_exchange.take() {
        exchange.cancel.cancel();
        app.generating = false;
        app.status_message = String::from("Generation stopped");
        debug!("Cancelled exchange {}", exchange.id);
    }
    Effect::None
}

fn resolve_exchange(app: &mut App, id: u64, outcome: ExchangeOutcome) -> Effect {
    let matches_live = app
        .pending_exchange
        .as_ref()
        .is_some_and(|exchange| exchange.id == id);
    if !matches_live {
        debug!("Dropping stale resolution for exchange {id}");
        return Effect::None;
    }
    let exchange = app.pending_exchange.take().expect("checked above");
    app.generating = false;

    match outcome {
        ExchangeOutcome::Succeeded(reply) => {
            if exchange.thread_id != app.active_thread {
                // Should be unreachable, since switching cancels, but a reply
                // for a thread the user left must never reach this
                // transcript. The server did persist it, so the list
                // still needs a refresh.
                warn!(
                    "Exchange {} resolved for inactive thread {}; not appending",
                    exchange.id, exchange.thread_id
                );
                return Effect::NotifyThreadsChanged;
            }

            app.transcript.push(Turn::user(exchange.prompt));
            app.transcript.push(Turn::assistant(reply.clone()));
            app.draft.clear();
            app.status_message.clear();

            app.reveal_seq += 1;
            let reveal = RevealState::new(reply, app.reveal_seq);
            let steps = reveal.token_count();
            // An empty reply is terminal before the first frame; the
            // static transcript is already authoritative for it.
            app.reveal = if reveal.is_done() { None } else { Some(reveal) };
            Effect::ExchangeSucceeded {
                generation: app.reveal_seq,
                steps,
            }
        }
        ExchangeOutcome::Cancelled => {
            // Normally cancellation settles through cancel_exchange and
            // this arm sees only stale ids; reachable if the task lost the
            // select race for another reason. Silent either way.
            app.status_message = String::from("Generation stopped");
            Effect::None
        }
        ExchangeOutcome::Failed(error) => {
            warn!("Exchange {} failed: {error}", exchange.id);
            app.status_message = format!("Request failed: {error}");
            Effect::None
        }
    }
}

fn reveal_tick(app: &mut App, generation: u64) -> Effect {
    if let Some(reveal) = &mut app.reveal
        && reveal.generation == generation
    {
        if reveal.advance() {
            // Terminal frame shown; the static transcript takes over.
            app.reveal = None;
        }
    } else {
        debug!("Dropping reveal tick for superseded generation {generation}");
    }
    Effect::None
}

/// Reset to a fresh local thread: clears the transcript, the draft, any
/// reveal, and cancels any pending exchange tied to the previous thread.
fn start_new_chat(app: &mut App) -> Effect {
    abandon_in_flight_work(app);
    app.transcript.clear();
    app.draft.clear();
    app.new_chat = true;
    app.active_thread = threads::new_thread_id();
    app.status_message.clear();
    Effect::NewChatStarted
}

fn switch_thread(app: &mut App, thread_id: String) -> Effect {
    abandon_in_flight_work(app);
    app.transcript.clear();
    app.new_chat = false;
    app.active_thread = thread_id.clone();
    app.status_message = String::from("Loading conversation...");
    Effect::ThreadSwitched { thread_id }
}

/// Leaving the current thread auto-cancels its pending exchange and kills
/// its reveal. Stale replies must not be appended to the newly active
/// thread, and a half-revealed answer must not keep animating over it.
fn abandon_in_flight_work(app: &mut App) {
    if let Some(exchange) = app.pending_exchange.take() {
        debug!(
            "Auto-cancelling exchange {} on thread change",
            exchange.id
        );
        exchange.cancel.cancel();
    }
    app.generating = false;
    app.reveal = None;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BackendError, Role};
    use crate::test_support::test_app;

    fn summary(id: &str, title: &str) -> ThreadSummary {
        ThreadSummary {
            thread_id: id.to_string(),
            title: title.to_string(),
            updated_at: None,
        }
    }

    /// Submit a prompt and return the exchange id from the spawn effect.
    fn submit(app: &mut App, prompt: &str) -> u64 {
        match update(app, Action::SubmitPrompt(prompt.to_string())) {
            Effect::SpawnExchange { id, .. } => id,
            other => panic!("Expected SpawnExchange, got {:?}", other),
        }
    }

    #[test]
    fn test_successful_exchange_appends_exactly_two_turns() {
        let mut app = test_app();
        let id = submit(&mut app, "What is Rust?");
        assert!(app.generating);

        let effect = update(
            &mut app,
            Action::ExchangeResolved {
                id,
                outcome: ExchangeOutcome::Succeeded("A systems language.".to_string()),
            },
        );

        assert_eq!(app.transcript.len(), 2);
        assert_eq!(app.transcript[0].role, Role::User);
        assert_eq!(app.transcript[0].content, "What is Rust?");
        assert_eq!(app.transcript[1].role, Role::Assistant);
        assert_eq!(app.transcript[1].content, "A systems language.");
        assert!(!app.generating);
        assert!(app.draft.is_empty());
        assert!(matches!(effect, Effect::ExchangeSucceeded { steps: 3, .. }));
    }

    #[test]
    fn test_empty_prompt_is_rejected_before_submission() {
        let mut app = test_app();
        let effect = update(&mut app, Action::SubmitPrompt("   \n ".to_string()));
        assert!(matches!(effect, Effect::None));
        assert!(app.pending_exchange.is_none());
        assert!(!app.generating);
    }

    #[test]
    fn test_second_submit_while_pending_is_ignored() {
        let mut app = test_app();
        let id = submit(&mut app, "first");
        let effect = update(&mut app, Action::SubmitPrompt("second".to_string()));
        assert!(matches!(effect, Effect::None));
        assert_eq!(app.pending_exchange.as_ref().unwrap().id, id);
        assert_eq!(app.draft, "first");
    }

    #[test]
    fn test_cancel_appends_nothing_and_preserves_draft() {
        let mut app = test_app();
        let id = submit(&mut app, "tell me everything");

        update(&mut app, Action::CancelExchange);
        assert!(!app.generating);
        assert!(app.transcript.is_empty());
        assert_eq!(app.draft, "tell me everything");

        // Cancelling again is a no-op.
        update(&mut app, Action::CancelExchange);
        assert!(app.transcript.is_empty());

        // The task's eventual settle is stale and must not append.
        update(
            &mut app,
            Action::ExchangeResolved {
                id,
                outcome: ExchangeOutcome::Succeeded("too late".to_string()),
            },
        );
        assert!(app.transcript.is_empty());
        assert_eq!(app.draft, "tell me everything");
    }

    #[test]
    fn test_cancel_signals_the_token() {
        let mut app = test_app();
        submit(&mut app, "hello");
        let token = app.pending_exchange.as_ref().unwrap().cancel.clone();
        update(&mut app, Action::CancelExchange);
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_failed_exchange_returns_to_idle_without_turns() {
        let mut app = test_app();
        let id = submit(&mut app, "hello");
        update(
            &mut app,
            Action::ExchangeResolved {
                id,
                outcome: ExchangeOutcome::Failed(BackendError::Network("refused".to_string())),
            },
        );
        assert!(!app.generating);
        assert!(app.transcript.is_empty());
        assert!(app.status_message.starts_with("Request failed"));
        // Session is idle again; a retry submits normally.
        submit(&mut app, "hello again");
        assert!(app.generating);
    }

    #[test]
    fn test_switching_threads_cancels_the_pending_exchange() {
        let mut app = test_app();
        let id = submit(&mut app, "question for thread A");
        let token = app.pending_exchange.as_ref().unwrap().cancel.clone();

        let effect = update(&mut app, Action::SwitchThread("thread-b".to_string()));
        assert!(matches!(effect, Effect::ThreadSwitched { .. }));
        assert!(token.is_cancelled());
        assert!(app.pending_exchange.is_none());
        assert!(!app.generating);

        // Even if the old exchange settles successfully, nothing may leak
        // into thread B's transcript.
        update(
            &mut app,
            Action::ExchangeResolved {
                id,
                outcome: ExchangeOutcome::Succeeded("answer for A".to_string()),
            },
        );
        assert!(app.transcript.is_empty());
    }

    #[test]
    fn test_resolution_for_inactive_thread_never_appends() {
        let mut app = test_app();
        let id = submit(&mut app, "question");
        // Simulate a path that moved the view without cancelling.
        app.active_thread = "somewhere-else".to_string();

        let effect = update(
            &mut app,
            Action::ExchangeResolved {
                id,
                outcome: ExchangeOutcome::Succeeded("orphaned reply".to_string()),
            },
        );
        assert!(app.transcript.is_empty());
        // Server state still changed; the list gets told.
        assert!(matches!(effect, Effect::NotifyThreadsChanged));
    }

    #[test]
    fn test_exchange_resolves_exactly_once() {
        let mut app = test_app();
        let id = submit(&mut app, "hi");
        update(
            &mut app,
            Action::ExchangeResolved {
                id,
                outcome: ExchangeOutcome::Succeeded("hello".to_string()),
            },
        );
        // A duplicate settle (shouldn't happen, but) is stale by id.
        update(
            &mut app,
            Action::ExchangeResolved {
                id,
                outcome: ExchangeOutcome::Succeeded("hello".to_string()),
            },
        );
        assert_eq!(app.transcript.len(), 2);
    }

    #[test]
    fn test_reveal_advances_per_tick_and_finishes() {
        let mut app = test_app();
        let id = submit(&mut app, "hi");
        let generation = match update(
            &mut app,
            Action::ExchangeResolved {
                id,
                outcome: ExchangeOutcome::Succeeded("one two".to_string()),
            },
        ) {
            Effect::ExchangeSucceeded { generation, .. } => generation,
            other => panic!("Expected ExchangeSucceeded, got {:?}", other),
        };

        // Animating: the visible value starts empty, not the full reply.
        assert_eq!(app.visible_last_assistant_content(), Some(""));

        update(&mut app, Action::RevealTick { generation });
        assert_eq!(app.visible_last_assistant_content(), Some("one"));

        update(&mut app, Action::RevealTick { generation });
        // Terminal: reveal is gone, the static turn is authoritative.
        assert!(app.reveal.is_none());
        assert_eq!(app.visible_last_assistant_content(), Some("one two"));
    }

    #[test]
    fn test_stale_reveal_ticks_are_ignored() {
        let mut app = test_app();
        let id = submit(&mut app, "hi");
        update(
            &mut app,
            Action::ExchangeResolved {
                id,
                outcome: ExchangeOutcome::Succeeded("fresh reply".to_string()),
            },
        );
        let live = app.reveal.as_ref().unwrap().generation;

        // Ticks from a superseded animation do not advance the live one.
        update(&mut app, Action::RevealTick { generation: live - 1 });
        assert_eq!(app.visible_last_assistant_content(), Some(""));

        update(&mut app, Action::RevealTick { generation: live });
        assert_eq!(app.visible_last_assistant_content(), Some("fresh"));
    }

    #[test]
    fn test_new_reply_supersedes_running_reveal() {
        let mut app = test_app();
        let id = submit(&mut app, "first");
        update(
            &mut app,
            Action::ExchangeResolved {
                id,
                outcome: ExchangeOutcome::Succeeded("alpha beta gamma".to_string()),
            },
        );
        let old_generation = app.reveal.as_ref().unwrap().generation;
        update(&mut app, Action::RevealTick { generation: old_generation });

        let id = submit(&mut app, "second");
        update(
            &mut app,
            Action::ExchangeResolved {
                id,
                outcome: ExchangeOutcome::Succeeded("delta epsilon".to_string()),
            },
        );

        // The new animation restarts from empty; old ticks are dead.
        assert_eq!(app.visible_last_assistant_content(), Some(""));
        update(&mut app, Action::RevealTick { generation: old_generation });
        assert_eq!(app.visible_last_assistant_content(), Some(""));

        let live = app.reveal.as_ref().unwrap().generation;
        update(&mut app, Action::RevealTick { generation: live });
        assert_eq!(app.visible_last_assistant_content(), Some("delta"));
    }

    #[test]
    fn test_empty_reply_is_terminal_without_animation() {
        let mut app = test_app();
        let id = submit(&mut app, "hi");
        let effect = update(
            &mut app,
            Action::ExchangeResolved {
                id,
                outcome: ExchangeOutcome::Succeeded(String::new()),
            },
        );
        assert!(app.reveal.is_none());
        assert!(matches!(effect, Effect::ExchangeSucceeded { steps: 0, .. }));
    }

    #[test]
    fn test_new_chat_resets_session_and_cancels_work() {
        let mut app = test_app();
        let id = submit(&mut app, "hello");
        update(
            &mut app,
            Action::ExchangeResolved {
                id,
                outcome: ExchangeOutcome::Succeeded("hi there".to_string()),
            },
        );
        submit(&mut app, "follow-up");
        let token = app.pending_exchange.as_ref().unwrap().cancel.clone();
        let old_thread = app.active_thread.clone();

        let effect = update(&mut app, Action::NewChat);
        assert!(matches!(effect, Effect::NewChatStarted));
        assert!(token.is_cancelled());
        assert!(app.transcript.is_empty());
        assert!(app.draft.is_empty());
        assert!(app.reveal.is_none());
        assert!(app.new_chat);
        assert_ne!(app.active_thread, old_thread);
    }

    #[test]
    fn test_fresh_thread_is_absent_from_snapshot_until_refresh() {
        let mut app = test_app();
        app.threads = vec![summary("t1", "Trip Plan")];
        update(&mut app, Action::NewChat);
        // The list is a server-truth projection; the local thread is not
        // speculatively added.
        let active = app.active_thread.clone();
        assert!(!app.threads.iter().any(|t| t.thread_id == active));
        assert_eq!(app.threads.len(), 1);
    }

    #[test]
    fn test_threads_loaded_replaces_snapshot_wholesale() {
        let mut app = test_app();
        app.threads = vec![summary("old", "Old")];
        update(
            &mut app,
            Action::ThreadsLoaded(vec![summary("a", "A"), summary("b", "B")]),
        );
        assert_eq!(app.threads.len(), 2);
        assert_eq!(app.threads[0].thread_id, "a");
    }

    #[test]
    fn test_failed_refresh_keeps_prior_snapshot() {
        let mut app = test_app();
        app.threads = vec![summary("t1", "Trip Plan")];
        update(
            &mut app,
            Action::ThreadsLoadFailed("connection refused".to_string()),
        );
        assert_eq!(app.threads.len(), 1);
        assert_eq!(app.status_message, "Failed to load threads");
    }

    #[test]
    fn test_deleting_active_thread_starts_fresh_chat() {
        let mut app = test_app();
        app.threads = vec![summary("t1", "Trip Plan"), summary("t2", "Recipes")];
        update(&mut app, Action::SwitchThread("t1".to_string()));
        update(
            &mut app,
            Action::ThreadLoaded {
                thread_id: "t1".to_string(),
                turns: vec![
                    Turn::user("a"),
                    Turn::assistant("b"),
                    Turn::user("c"),
                ],
            },
        );
        assert_eq!(app.transcript.len(), 3);

        let effect = update(&mut app, Action::ThreadDeleted("t1".to_string()));
        assert!(matches!(effect, Effect::NewChatStarted));
        assert_ne!(app.active_thread, "t1");
        assert!(app.transcript.is_empty());
        assert!(app.new_chat);
        assert!(!app.threads.iter().any(|t| t.thread_id == "t1"));
    }

    #[test]
    fn test_deleting_inactive_thread_keeps_session() {
        let mut app = test_app();
        app.threads = vec![summary("t1", "Trip Plan"), summary("t2", "Recipes")];
        update(&mut app, Action::SwitchThread("t1".to_string()));

        let effect = update(&mut app, Action::ThreadDeleted("t2".to_string()));
        assert!(matches!(effect, Effect::None));
        assert_eq!(app.active_thread, "t1");
        assert_eq!(app.threads.len(), 1);
    }

    #[test]
    fn test_stale_transcript_load_is_dropped() {
        let mut app = test_app();
        update(&mut app, Action::SwitchThread("t1".to_string()));
        update(&mut app, Action::SwitchThread("t2".to_string()));

        // t1's fetch finishes after the user has already moved to t2.
        update(
            &mut app,
            Action::ThreadLoaded {
                thread_id: "t1".to_string(),
                turns: vec![Turn::user("stale")],
            },
        );
        assert!(app.transcript.is_empty());
    }

    #[test]
    fn test_role_and_version_updates() {
        let mut app = test_app();
        update(&mut app, Action::RoleLoaded(AccountRole::Admin));
        assert_eq!(app.role, AccountRole::Admin);

        update(&mut app, Action::CycleVersion);
        assert_eq!(app.status_message, "Assistant: Mavix 4");
    }

    #[test]
    fn test_quit_effect() {
        let mut app = test_app();
        assert!(matches!(update(&mut app, Action::Quit), Effect::Quit));
    }
}
