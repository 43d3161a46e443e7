//! Fetch-and-populate flow for the entry edit form.
//!
//! A [`FormController`] is built with the lookup service, the form it edits,
//! and somewhere to send notices. Each trigger reads the title field, runs
//! one lookup, and either fills the six metadata fields or reports a single
//! notice. Overlapping triggers are not coordinated: whichever lookup
//! resolves last leaves its values in the form.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use importer_api::{AnimeRecord, LookupError, MetadataLookup};

use crate::models::EditForm;
use crate::sanitize::sanitize_text_field;

/// Kind of user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

/// A single message for the person editing the entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }
}

/// Where the controller reports prompts and failures.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Outcome of one fetch trigger.
#[derive(Debug)]
pub enum FetchOutcome {
    /// The form was filled from this record.
    Populated(AnimeRecord),
    /// The title field was blank; no lookup was made.
    MissingTitle,
    /// The lookup failed; the form is untouched.
    Failed(LookupError),
}

pub struct FormController<L, N> {
    lookup: Arc<L>,
    form: Arc<RwLock<EditForm>>,
    notifier: Arc<N>,
}

impl<L, N> Clone for FormController<L, N> {
    fn clone(&self) -> Self {
        Self {
            lookup: Arc::clone(&self.lookup),
            form: Arc::clone(&self.form),
            notifier: Arc::clone(&self.notifier),
        }
    }
}

impl<L: MetadataLookup, N: Notifier> FormController<L, N> {
    pub fn new(lookup: Arc<L>, form: Arc<RwLock<EditForm>>, notifier: Arc<N>) -> Self {
        Self {
            lookup,
            form,
            notifier,
        }
    }

    /// The form this controller edits.
    pub fn form(&self) -> Arc<RwLock<EditForm>> {
        Arc::clone(&self.form)
    }

    /// Handle one press of the fetch button.
    ///
    /// The title goes through the same text-field sanitization as the
    /// inbound fetch endpoint, so a markup-only title counts as blank.
    pub async fn trigger_fetch(&self) -> FetchOutcome {
        let title = sanitize_text_field(&self.form.read().await.title);
        if title.is_empty() {
            debug!("Fetch triggered with blank title");
            self.notifier.notify(Notice::info("Enter a title"));
            return FetchOutcome::MissingTitle;
        }

        match self.lookup.lookup(&title).await {
            Ok(record) => {
                self.form.write().await.populate(&record);
                info!(title = %title, matched = %record.title, "Populated form from lookup");
                FetchOutcome::Populated(record)
            }
            Err(e) => {
                warn!(title = %title, error = %e, "Lookup failed");
                self.notifier
                    .notify(Notice::error(format!("Error: {}", e.user_message())));
                FetchOutcome::Failed(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use importer_api::anilist::ClientOptions;
    use importer_api::AniListClient;

    /// Answers from a fixed table after a per-title delay.
    #[derive(Default)]
    struct ScriptedLookup {
        answers: HashMap<String, (Duration, AnimeRecord)>,
        calls: AtomicUsize,
        seen: Mutex<Vec<String>>,
    }

    impl ScriptedLookup {
        fn answer(mut self, title: &str, delay: Duration, record: AnimeRecord) -> Self {
            self.answers.insert(title.to_string(), (delay, record));
            self
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn seen(&self) -> Vec<String> {
            self.seen.lock().unwrap().clone()
        }
    }

    impl MetadataLookup for ScriptedLookup {
        async fn lookup(&self, title: &str) -> Result<AnimeRecord, LookupError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push(title.to_string());
            match self.answers.get(title) {
                Some((delay, record)) => {
                    tokio::time::sleep(*delay).await;
                    Ok(record.clone())
                }
                None => Err(LookupError::NotFound {
                    title: title.to_string(),
                }),
            }
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        notices: Mutex<Vec<Notice>>,
    }

    impl RecordingNotifier {
        fn notices(&self) -> Vec<Notice> {
            self.notices.lock().unwrap().clone()
        }
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, notice: Notice) {
            self.notices.lock().unwrap().push(notice);
        }
    }

    fn frieren() -> AnimeRecord {
        AnimeRecord {
            title: "Sousou no Frieren".into(),
            episodes: 28,
            poster: "https://img.anili.st/cover/154587.jpg".into(),
            background: "https://img.anili.st/banner/154587.jpg".into(),
            studio: "Madhouse".into(),
            season: "FALL".into(),
            year: 2023,
        }
    }

    fn filled_form(title: &str) -> EditForm {
        EditForm {
            title: title.into(),
            episodes: "1".into(),
            poster: "https://old/poster.jpg".into(),
            background: "https://old/banner.jpg".into(),
            studio: "Old Studio".into(),
            year: "1999".into(),
            season: "SPRING".into(),
        }
    }

    fn controller<L: MetadataLookup>(
        lookup: L,
        form: EditForm,
    ) -> (FormController<L, RecordingNotifier>, Arc<L>, Arc<RecordingNotifier>) {
        let lookup = Arc::new(lookup);
        let notifier = Arc::new(RecordingNotifier::default());
        let ctrl = FormController::new(
            Arc::clone(&lookup),
            Arc::new(RwLock::new(form)),
            Arc::clone(&notifier),
        );
        (ctrl, lookup, notifier)
    }

    #[tokio::test]
    async fn test_populates_six_fields_and_keeps_title() {
        let lookup = ScriptedLookup::default().answer("Frieren", Duration::ZERO, frieren());
        let (ctrl, lookup, notifier) = controller(lookup, filled_form("Frieren"));

        let outcome = ctrl.trigger_fetch().await;
        assert!(matches!(outcome, FetchOutcome::Populated(_)));
        assert_eq!(lookup.calls(), 1);
        assert!(notifier.notices().is_empty());

        let form = ctrl.form().read().await.clone();
        assert_eq!(form.title, "Frieren");
        assert_eq!(form.episodes, "28");
        assert_eq!(form.poster, "https://img.anili.st/cover/154587.jpg");
        assert_eq!(form.background, "https://img.anili.st/banner/154587.jpg");
        assert_eq!(form.studio, "Madhouse");
        assert_eq!(form.season, "FALL");
        assert_eq!(form.year, "2023");
    }

    #[tokio::test]
    async fn test_blank_title_prompts_without_lookup() {
        let (ctrl, lookup, notifier) = controller(ScriptedLookup::default(), filled_form("   "));

        let outcome = ctrl.trigger_fetch().await;
        assert!(matches!(outcome, FetchOutcome::MissingTitle));
        assert_eq!(lookup.calls(), 0);
        assert_eq!(notifier.notices(), vec![Notice::info("Enter a title")]);
        assert_eq!(*ctrl.form().read().await, filled_form("   "));
    }

    #[tokio::test]
    async fn test_markup_only_title_prompts_without_lookup() {
        let (ctrl, lookup, notifier) = controller(ScriptedLookup::default(), filled_form(" <br> "));

        let outcome = ctrl.trigger_fetch().await;
        assert!(matches!(outcome, FetchOutcome::MissingTitle));
        assert_eq!(lookup.calls(), 0);
        assert_eq!(notifier.notices(), vec![Notice::info("Enter a title")]);
        assert_eq!(*ctrl.form().read().await, filled_form(" <br> "));
    }

    #[tokio::test]
    async fn test_title_markup_is_stripped_before_lookup() {
        let lookup = ScriptedLookup::default().answer("Frieren", Duration::ZERO, frieren());
        let (ctrl, lookup, notifier) = controller(lookup, filled_form("<b>Frieren</b>"));

        let outcome = ctrl.trigger_fetch().await;
        assert!(matches!(outcome, FetchOutcome::Populated(_)));
        assert_eq!(lookup.seen(), vec!["Frieren".to_string()]);
        assert!(notifier.notices().is_empty());

        let form = ctrl.form().read().await.clone();
        assert_eq!(form.title, "<b>Frieren</b>");
        assert_eq!(form.studio, "Madhouse");
    }

    #[tokio::test]
    async fn test_not_found_leaves_form_untouched() {
        let (ctrl, lookup, notifier) =
            controller(ScriptedLookup::default(), filled_form("No Such Show"));

        let outcome = ctrl.trigger_fetch().await;
        assert!(matches!(outcome, FetchOutcome::Failed(LookupError::NotFound { .. })));
        assert_eq!(lookup.calls(), 1);
        assert_eq!(notifier.notices(), vec![Notice::error("Error: Anime not found")]);
        assert_eq!(*ctrl.form().read().await, filled_form("No Such Show"));
    }

    #[tokio::test]
    async fn test_timeout_leaves_form_untouched_with_one_notice() {
        // A server that accepts and never answers.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
            drop(socket);
        });

        let client = AniListClient::with_options(ClientOptions {
            endpoint: format!("http://{addr}/"),
            timeout: Duration::from_millis(200),
            connect_timeout: Duration::from_millis(200),
            ..Default::default()
        })
        .unwrap();
        let (ctrl, _, notifier) = controller(client, filled_form("Frieren"));

        let outcome = ctrl.trigger_fetch().await;
        assert!(matches!(outcome, FetchOutcome::Failed(LookupError::Transport(_))));
        assert_eq!(
            notifier.notices(),
            vec![Notice::error("Error: Metadata service unavailable")]
        );
        assert_eq!(*ctrl.form().read().await, filled_form("Frieren"));
        server.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_triggers_last_resolved_wins() {
        let slow = AnimeRecord {
            studio: "Slow Studio".into(),
            episodes: 1,
            ..Default::default()
        };
        let fast = AnimeRecord {
            studio: "Fast Studio".into(),
            episodes: 2,
            ..Default::default()
        };
        let lookup = ScriptedLookup::default()
            .answer("Slow", Duration::from_millis(300), slow)
            .answer("Fast", Duration::from_millis(100), fast);
        let (ctrl, lookup, _) = controller(lookup, EditForm::with_title("Slow"));

        // First trigger with "Slow", then the user edits the title and triggers again.
        let first = tokio::spawn({
            let ctrl = ctrl.clone();
            async move { ctrl.trigger_fetch().await }
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
        ctrl.form().write().await.title = "Fast".into();
        let second = ctrl.trigger_fetch().await;

        assert!(matches!(second, FetchOutcome::Populated(_)));
        assert_eq!(ctrl.form().read().await.studio, "Fast Studio");

        assert!(matches!(first.await.unwrap(), FetchOutcome::Populated(_)));
        assert_eq!(lookup.calls(), 2);
        let form = ctrl.form().read().await.clone();
        assert_eq!(form.studio, "Slow Studio");
        assert_eq!(form.episodes, "1");
        assert_eq!(form.title, "Fast");
    }
}
