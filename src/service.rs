//! Query service: list, detail, and deferred aggregation over one collection.
//!
//! Every operation authenticates, samples the clock once, reads the store,
//! and applies group scoping before anything else sees the records.

use crate::access::{self, Authenticator, Identity};
use crate::clock::Clock;
use crate::error::ApiError;
use crate::query::{
    self, AggregationRequest, AggregationResult, FilterDocument, PageLinks, Paginator, SortSpec,
};
use crate::record::Record;
use crate::store::RecordStore;
use crate::types::RecordId;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Parameters of a list request.
#[derive(Debug, Clone, Default)]
pub struct ListRequest {
    /// Filter document as JSON text; `None` matches everything.
    pub query: Option<String>,
    /// Sort parameter; `None` sorts by `time` ascending.
    pub sort: Option<String>,
    pub skip: usize,
    /// 0 means no limit.
    pub limit: usize,
    /// URL of the request, used as the base for page links.
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListMeta {
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListLinks {
    pub pages: PageLinks,
}

/// A page of record documents.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListResponse {
    pub records: Vec<Value>,
    pub meta: ListMeta,
    pub links: ListLinks,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuerySubmission {
    pub query_id: String,
}

/// Query operations over the collection of `R`.
pub struct QueryService<R: Record> {
    store: Arc<dyn RecordStore<R>>,
    authenticator: Arc<dyn Authenticator>,
    clock: Arc<dyn Clock>,
    game: String,
}

impl<R: Record> QueryService<R> {
    pub fn new(
        store: Arc<dyn RecordStore<R>>,
        authenticator: Arc<dyn Authenticator>,
        clock: Arc<dyn Clock>,
        game: impl Into<String>,
    ) -> Self {
        Self {
            store,
            authenticator,
            clock,
            game: game.into(),
        }
    }

    pub fn game(&self) -> &str {
        &self.game
    }

    pub fn store(&self) -> &dyn RecordStore<R> {
        self.store.as_ref()
    }

    fn authorize(&self, credentials: Option<&str>) -> Result<Identity, ApiError> {
        let identity = self.authenticator.authenticate(credentials)?;
        access::require_read(&identity, &self.game)?;
        Ok(identity)
    }

    /// Filter, scope, sort and page the collection.
    ///
    /// `meta.total` counts the records visible to the caller, so page links
    /// agree with what the caller can actually page through.
    #[instrument(skip(self, credentials, request), fields(collection = R::COLLECTION))]
    pub fn list(
        &self,
        credentials: Option<&str>,
        request: &ListRequest,
    ) -> Result<ListResponse, ApiError> {
        let identity = self.authorize(credentials)?;
        let filter = match request.query.as_deref() {
            Some(query) => FilterDocument::parse_str(query)?,
            None => FilterDocument::match_all(),
        };
        let sort = match request.sort.as_deref() {
            Some(sort) => SortSpec::parse(sort)?,
            None => SortSpec::default(),
        };
        let now = self.clock.now();

        let visible = self
            .store
            .find_visible(&filter, now, &identity, &self.game)?;
        let mut documents: Vec<Value> = visible
            .iter()
            .map(|record| record.listing_document(now))
            .collect();
        sort.sort_by_document(&mut documents, |doc| doc);

        let total = documents.len();
        let paginator = Paginator::new(request.skip, request.limit);
        let records = paginator.window(documents);
        debug!(
            user = %identity.user_id,
            total,
            returned = records.len(),
            "Listed records"
        );

        Ok(ListResponse {
            records,
            meta: ListMeta { total },
            links: ListLinks {
                pages: paginator.links(total, &request.url),
            },
        })
    }

    /// Single record by id. Records hidden from the caller are reported as
    /// not found.
    #[instrument(skip(self, credentials), fields(collection = R::COLLECTION))]
    pub fn get(&self, credentials: Option<&str>, id: &RecordId) -> Result<Value, ApiError> {
        let identity = self.authorize(credentials)?;
        let not_found = || ApiError::NotFound(format!("{} {}", R::COLLECTION, id));
        let record = self.store.get(id)?.ok_or_else(not_found)?;
        if !access::is_visible(&record, &identity, &self.game) {
            debug!(user = %identity.user_id, %id, "Record hidden by group scoping");
            return Err(not_found());
        }
        record.document(self.clock.now())
    }

    /// Validate an aggregation request and issue its query id.
    #[instrument(skip(self, credentials, request), fields(collection = R::COLLECTION))]
    pub fn submit_query(
        &self,
        credentials: Option<&str>,
        request: &str,
    ) -> Result<QuerySubmission, ApiError> {
        self.authorize(credentials)?;
        let request = AggregationRequest::parse_str(request)?;
        FilterDocument::from_value(&request.query)?;
        let query_id = query::encode(&request)?;
        info!(kind = ?request.kind, "Issued query id");
        Ok(QuerySubmission { query_id })
    }

    /// Resolve a query id. The aggregation runs here, synchronously.
    #[instrument(skip(self, credentials, query_id), fields(collection = R::COLLECTION))]
    pub fn resolve_query(
        &self,
        credentials: Option<&str>,
        query_id: &str,
    ) -> Result<AggregationResult, ApiError> {
        let identity = self.authorize(credentials)?;
        let request = query::decode(query_id)?;
        let now = self.clock.now();
        query::aggregate(&request, self.store.as_ref(), &identity, &self.game, now)
    }
}
