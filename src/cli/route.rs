//! CLI route: single route table and run context. Dispatches to the query
//! services and presentation.

use crate::cli::parse::{Collection, Commands, OutputFormat, QueryCommands};
use crate::cli::presentation::{
    format_aggregation_text, format_json, format_list_text, format_load_summary,
    format_submission_text,
};
use crate::clock::SystemClock;
use crate::config::{ConfigLoader, PlaylogConfig};
use crate::error::{ApiError, StorageError};
use crate::record::{Context, Event, Record};
use crate::service::{ListRequest, QueryService};
use crate::store::{RecordStore, SledRecordStore};
use crate::types::RecordId;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Runtime context for CLI execution: config, store handles and services.
pub struct RunContext {
    config: PlaylogConfig,
    token: Option<String>,
    context_store: Arc<SledRecordStore<Context>>,
    event_store: Arc<SledRecordStore<Event>>,
    contexts: QueryService<Context>,
    events: QueryService<Event>,
}

impl RunContext {
    /// Load layered config for `workspace_root` and open the store it names.
    pub fn new(
        workspace_root: PathBuf,
        config_path: Option<PathBuf>,
        token: Option<String>,
    ) -> Result<Self, ApiError> {
        let config = ConfigLoader::load_with_override(&workspace_root, config_path.as_deref())?;
        Self::with_config(config, token)
    }

    /// Build from an already loaded configuration.
    pub fn with_config(config: PlaylogConfig, token: Option<String>) -> Result<Self, ApiError> {
        let config = config.validated()?;
        let store_path = &config.storage.store_path;
        std::fs::create_dir_all(store_path).map_err(StorageError::IoError)?;
        let db = sled::open(store_path).map_err(StorageError::Sled)?;
        debug!(path = %store_path.display(), "Opened record store");

        let context_store = Arc::new(SledRecordStore::<Context>::new(&db)?);
        let event_store = Arc::new(SledRecordStore::<Event>::new(&db)?);
        let authenticator = Arc::new(config.auth.authenticator());
        let clock = Arc::new(SystemClock);
        let game = config.service.game.clone();

        let contexts = QueryService::new(
            context_store.clone(),
            authenticator.clone(),
            clock.clone(),
            game.clone(),
        );
        let events = QueryService::new(event_store.clone(), authenticator, clock, game);

        Ok(Self {
            config,
            token,
            context_store,
            event_store,
            contexts,
            events,
        })
    }

    pub fn config(&self) -> &PlaylogConfig {
        &self.config
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        let token = self.token.as_deref();
        match command {
            Commands::List {
                collection,
                query,
                sort,
                skip,
                limit,
                url,
                format,
            } => {
                let request = ListRequest {
                    query: query.clone(),
                    sort: sort.clone(),
                    skip: *skip,
                    limit: *limit,
                    url: url
                        .clone()
                        .unwrap_or_else(|| default_list_url(*collection, *limit)),
                };
                let response = match collection {
                    Collection::Contexts => self.contexts.list(token, &request)?,
                    Collection::Events => self.events.list(token, &request)?,
                };
                Ok(match format {
                    OutputFormat::Text => format_list_text(*collection, &response),
                    OutputFormat::Json => format_json(&response),
                })
            }
            Commands::Get { collection, id } => {
                let id = RecordId::new(id.as_str());
                let document = match collection {
                    Collection::Contexts => self.contexts.get(token, &id)?,
                    Collection::Events => self.events.get(token, &id)?,
                };
                Ok(format_json(&document))
            }
            Commands::Query { command } => self.execute_query(command),
            Commands::Load { collection, file } => {
                let loaded = match collection {
                    Collection::Contexts => load_jsonl(self.context_store.as_ref(), file)?,
                    Collection::Events => load_jsonl(self.event_store.as_ref(), file)?,
                };
                Ok(format_load_summary(*collection, loaded))
            }
        }
    }

    fn execute_query(&self, command: &QueryCommands) -> Result<String, ApiError> {
        let token = self.token.as_deref();
        match command {
            QueryCommands::Submit {
                collection,
                request,
                format,
            } => {
                let submission = match collection {
                    Collection::Contexts => self.contexts.submit_query(token, request)?,
                    Collection::Events => self.events.submit_query(token, request)?,
                };
                Ok(match format {
                    OutputFormat::Text => format_submission_text(&submission),
                    OutputFormat::Json => format_json(&submission),
                })
            }
            QueryCommands::Result {
                collection,
                query_id,
                format,
            } => {
                let result = match collection {
                    Collection::Contexts => self.contexts.resolve_query(token, query_id)?,
                    Collection::Events => self.events.resolve_query(token, query_id)?,
                };
                Ok(match format {
                    OutputFormat::Text => format_aggregation_text(&result),
                    OutputFormat::Json => format_json(&result),
                })
            }
        }
    }
}

fn default_list_url(collection: Collection, limit: usize) -> String {
    if limit > 0 {
        format!("/{}?limit={}", collection.name(), limit)
    } else {
        format!("/{}", collection.name())
    }
}

/// Write every line of a JSON Lines file into `store`. Blank lines are
/// skipped. The whole file is parsed before anything is written, so an
/// unparsable line leaves the store untouched.
fn load_jsonl<R: Record>(store: &SledRecordStore<R>, path: &Path) -> Result<usize, ApiError> {
    let file = std::fs::File::open(path).map_err(StorageError::IoError)?;
    let mut records: Vec<R> = Vec::new();
    for (index, line) in std::io::BufReader::new(file).lines().enumerate() {
        let line = line.map_err(StorageError::IoError)?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(&line).map_err(|e| {
            ApiError::DataIntegrity(format!("{}:{}: {}", path.display(), index + 1, e))
        })?;
        records.push(record);
    }
    for record in &records {
        store.put(record)?;
    }
    store.flush()?;
    info!(collection = R::COLLECTION, loaded = records.len(), "Loaded records");
    Ok(records.len())
}
