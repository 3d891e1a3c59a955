//! gRPC service implementation for the person registry.
//!
//! This module defines [`PersonService`], the concrete implementation of the
//! [`PersonRegistry`] gRPC service. It owns a handle to the shared
//! [`RecordStore`] and maps each RPC onto its call shape:
//!
//! - `GetPerson`, `SavePerson`: answered inline ([`unary`]).
//! - `SavePersons`: consumes the request stream inline ([`bulk`]); tonic sends
//!   the returned summary as the only response.
//! - `ListPersons`, `AskAndGetPersons`: spawn a task that feeds a bounded
//!   response channel ([`list`], [`interactive`]).
//!
//! Every call registers with the service [`Lifecycle`] first, so calls that
//! arrive during shutdown fail with `UNAVAILABLE`. Streaming calls receive and
//! send through [`Cancellable`], so a call still waiting on its client when
//! the drain timeout expires ends with `UNAVAILABLE` as well.

use super::{
    lifecycle::{CallGuard, Lifecycle},
    unary,
};
use crate::server::{
    config::ServerConfig,
    store::{RecordStore, demo_records},
    streaming::{Pacing, ResponseStream, bulk, interactive, list, spawn_response_stream},
    telemetry::{increment_call_errors, increment_requests},
    transport::Cancellable,
};
use rolodex_tonic_core::proto::{
    GetPersonRequest, ListPersonsRequest, PersonResponse, SavePersonRequest, SavePersonsResponse,
    person_registry_server::PersonRegistry,
};
use std::sync::Arc;
use tonic::{Request, Response, Status, Streaming};

/// The `PersonRegistry` gRPC service.
///
/// Cloning is cheap; clones share the store and the lifecycle.
#[derive(Clone)]
pub struct PersonService {
    config: ServerConfig,
    store: RecordStore,
    lifecycle: Arc<Lifecycle>,
}

impl PersonService {
    /// Creates the service with a store seeded according to `config`.
    pub fn new(config: ServerConfig) -> Self {
        let store = if config.seed {
            RecordStore::with_records(demo_records())
        } else {
            RecordStore::new()
        };
        Self::with_store(config, store)
    }

    pub fn with_store(config: ServerConfig, store: RecordStore) -> Self {
        Self {
            config,
            store,
            lifecycle: Arc::new(Lifecycle::new()),
        }
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Refuses new calls and drains in-flight ones. See [`Lifecycle`].
    pub async fn shutdown(&self) {
        self.lifecycle.shutdown(self.config.shutdown_timeout).await;
    }

    fn begin(&self, method: &'static str) -> Result<CallGuard, Status> {
        let guard = self.lifecycle.begin().inspect_err(|_| {
            increment_call_errors(method);
            tracing::debug!("Refused {method} during shutdown");
        })?;
        increment_requests(method);
        Ok(guard)
    }

    fn pacing(&self) -> Pacing {
        Pacing::new(self.config.pacing_delay, self.lifecycle.token())
    }

    fn cancellable<S>(&self, inner: S) -> Cancellable<S> {
        Cancellable::new(inner, self.lifecycle.token())
    }
}

#[tonic::async_trait]
impl PersonRegistry for PersonService {
    type ListPersonsStream = ResponseStream<PersonResponse>;
    type AskAndGetPersonsStream = ResponseStream<PersonResponse>;

    #[tracing::instrument(name = "get_person", skip_all, fields(email = %req.get_ref().email))]
    async fn get_person(
        &self,
        req: Request<GetPersonRequest>,
    ) -> Result<Response<PersonResponse>, Status> {
        let _guard = self.begin("GetPerson")?;
        tracing::info!("Lookup arrived");

        let resp = unary::get_person(&self.store, &req.get_ref().email).inspect_err(|e| {
            increment_call_errors("GetPerson");
            tracing::info!("{e}");
        })?;

        Ok(Response::new(resp))
    }

    #[tracing::instrument(
        name = "save_person",
        skip_all,
        fields(name = %req.get_ref().name, age = req.get_ref().age, email = %req.get_ref().email)
    )]
    async fn save_person(
        &self,
        req: Request<SavePersonRequest>,
    ) -> Result<Response<PersonResponse>, Status> {
        let _guard = self.begin("SavePerson")?;
        tracing::info!("Save arrived");

        Ok(Response::new(unary::save_person(
            &self.store,
            req.into_inner(),
        )))
    }

    #[tracing::instrument(name = "list_persons", skip_all, fields(email = %req.get_ref().email))]
    async fn list_persons(
        &self,
        req: Request<ListPersonsRequest>,
    ) -> Result<Response<Self::ListPersonsStream>, Status> {
        let guard = self.begin("ListPersons")?;
        let email = req.into_inner().email;
        let store = self.store.clone();
        let pacing = self.pacing();
        let shutdown = self.lifecycle.token();

        let stream = spawn_response_stream(
            "ListPersons",
            self.config.stream_buffer_size,
            guard,
            move |resp_tx| async move {
                let mut outbound = Cancellable::new(resp_tx, shutdown);
                list::list_persons(&store, &email, &pacing, &mut outbound).await
            },
        );

        Ok(Response::new(stream))
    }

    #[tracing::instrument(name = "save_persons", skip_all)]
    async fn save_persons(
        &self,
        req: Request<Streaming<SavePersonRequest>>,
    ) -> Result<Response<SavePersonsResponse>, Status> {
        let _guard = self.begin("SavePersons")?;
        let mut inbound = self.cancellable(req.into_inner());

        let summary = bulk::save_persons(&self.store, &mut inbound)
            .await
            .inspect_err(|e| {
                increment_call_errors("SavePersons");
                tracing::warn!("Bulk save aborted: {e}");
            })?;

        Ok(Response::new(summary))
    }

    #[tracing::instrument(name = "ask_and_get_persons", skip_all)]
    async fn ask_and_get_persons(
        &self,
        req: Request<Streaming<SavePersonRequest>>,
    ) -> Result<Response<Self::AskAndGetPersonsStream>, Status> {
        let guard = self.begin("AskAndGetPersons")?;
        let mut inbound = self.cancellable(req.into_inner());
        let store = self.store.clone();
        let pacing = self.pacing();
        let shutdown = self.lifecycle.token();

        let stream = spawn_response_stream(
            "AskAndGetPersons",
            self.config.stream_buffer_size,
            guard,
            move |resp_tx| async move {
                let mut outbound = Cancellable::new(resp_tx, shutdown);
                interactive::ask_and_get_persons(&store, &pacing, &mut inbound, &mut outbound).await
            },
        );

        Ok(Response::new(stream))
    }
}
