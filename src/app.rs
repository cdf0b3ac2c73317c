use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::Config;
use crate::content::cache::LessonCache;
use crate::content::{ContentError, ContentSource, LessonLoader};
use crate::engine::{scoring, streak};
use crate::error::DrillError;
use crate::lesson::curriculum::{self, CurriculumEntry, LessonStatus};
use crate::session::compiler;
use crate::session::controller::SessionController;
use crate::session::result::LessonSummary;
use crate::speech::VoiceChain;
use crate::store::json_store::JsonStore;
use crate::store::schema::ProgressRecord;

#[derive(Debug, Error)]
pub enum OpenLessonError {
    #[error("no lesson with id {0}")]
    UnknownLesson(String),
    #[error("lesson {0} is locked")]
    Locked(String),
    #[error(transparent)]
    Content(#[from] ContentError),
    #[error(transparent)]
    Compile(#[from] DrillError),
}

pub struct App {
    pub config: Config,
    pub store: Option<JsonStore>,
    pub loader: LessonLoader,
    pub voices: VoiceChain,
    pub progress: ProgressRecord,
    pub history: Vec<LessonSummary>,
}

impl App {
    pub fn new(config: Config) -> Self {
        let store = match JsonStore::new() {
            Ok(store) => Some(store),
            Err(e) => {
                warn!(error = %e, "progress will not be saved");
                None
            }
        };
        let loader = LessonLoader::new(remote_source(&config), lesson_cache(&config));
        Self::with_parts(config, store, loader)
    }

    pub fn with_parts(config: Config, store: Option<JsonStore>, loader: LessonLoader) -> Self {
        let (progress, history) = match &store {
            // load_progress returns None if the file exists but can't parse
            Some(s) => match s.load_progress() {
                Some(record) if !record.needs_reset() => (record, s.load_history().lessons),
                _ => {
                    warn!("progress record unreadable or outdated, starting over");
                    (ProgressRecord::default(), Vec::new())
                }
            },
            None => (ProgressRecord::default(), Vec::new()),
        };
        let voices = VoiceChain::from_commands(&config.voices);

        Self {
            config,
            store,
            loader,
            voices,
            progress,
            history,
        }
    }

    pub fn lesson_statuses(&self) -> Vec<(&'static CurriculumEntry, LessonStatus)> {
        curriculum::statuses(&self.progress.completed_lessons)
    }

    pub fn gems(&self) -> u32 {
        scoring::gems(&self.progress)
    }

    /// Load and compile a curriculum lesson. Locked lessons are refused.
    /// A seed makes option and token order reproducible.
    pub fn open_lesson(
        &self,
        id: &str,
        seed: Option<u64>,
        refresh: bool,
    ) -> Result<SessionController, OpenLessonError> {
        let entry =
            curriculum::find(id).ok_or_else(|| OpenLessonError::UnknownLesson(id.to_string()))?;
        if curriculum::status_of(id, &self.progress.completed_lessons)
            == Some(LessonStatus::Locked)
        {
            return Err(OpenLessonError::Locked(id.to_string()));
        }

        let lesson = self.loader.load(entry, refresh)?;
        let mut rng = match seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        let queue = compiler::compile(&lesson, &mut rng)?;
        info!(lesson = id, drills = queue.len(), "lesson opened");
        Ok(SessionController::new(queue))
    }

    pub fn complete(&mut self, summary: LessonSummary) {
        self.complete_at(summary, Utc::now());
    }

    pub fn complete_at(&mut self, summary: LessonSummary, now: DateTime<Utc>) {
        streak::record_completion(&mut self.progress, &summary, now);
        if let Some(store) = &self.store {
            if let Err(e) = store.save_progress(&self.progress) {
                warn!(error = %e, "could not save progress");
            }
            if let Err(e) = store.append_history(&summary) {
                warn!(error = %e, "could not save lesson history");
            }
        }
        self.history.push(summary);
    }

    pub fn reset(&mut self) -> anyhow::Result<()> {
        if let Some(store) = &self.store {
            store.reset()?;
        }
        self.progress = ProgressRecord::default();
        self.history.clear();
        Ok(())
    }
}

#[cfg(feature = "network")]
fn remote_source(config: &Config) -> Option<Box<dyn ContentSource>> {
    if !config.network_enabled {
        return None;
    }
    match crate::content::gemini::GeminiSource::from_env(&config.api_key_env, &config.gemini_model)
    {
        Ok(source) => Some(Box::new(source)),
        Err(e) => {
            warn!(error = %e, "lesson generation disabled");
            None
        }
    }
}

#[cfg(not(feature = "network"))]
fn remote_source(_config: &Config) -> Option<Box<dyn ContentSource>> {
    None
}

fn lesson_cache(config: &Config) -> Option<LessonCache> {
    if config.cache_generated_lessons {
        LessonCache::new()
    } else {
        None
    }
}
