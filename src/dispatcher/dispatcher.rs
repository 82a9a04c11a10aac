use std::sync::{Arc, Mutex, PoisonError, RwLock};

use serde::de::DeserializeOwned;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use crate::{
    decoder::{date::DateDecodingStrategy, json_decoder::JsonDecoder},
    dispatcher::{error::DispatchError, status_error::StatusError},
    endpoint::endpoint::Endpoint,
    request_builder::{request_builder::RequestBuilder, url_request_builder::UrlRequestBuilder},
    transport::{
        error::TransportError, reqwest_transport::ReqwestTransport, response::Response,
        transport::Transport,
    },
};

const NO_DATA: &str = "No error, no data.";

/// The request most recently submitted through [`Dispatcher::make_request`].
struct InFlightRequest {
    id: Uuid,
    cancellation: CancellationToken,
    task: JoinHandle<()>,
}

/// Builds, submits and decodes requests, delivering each outcome exactly once.
///
/// A dispatcher tracks at most one in-flight request. Submitting a new one
/// replaces the tracked handle without cancelling the previous request, so
/// [`Dispatcher::cancel`] only ever reaches the latest submission.
pub struct Dispatcher {
    transport: Arc<dyn Transport>,
    request_builder: Arc<dyn RequestBuilder>,
    in_flight: Mutex<Option<InFlightRequest>>,
    date_decoding_strategy: RwLock<Option<DateDecodingStrategy>>,
}

impl Dispatcher {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self::with_builder(transport, Arc::new(UrlRequestBuilder))
    }

    pub fn with_builder(
        transport: Arc<dyn Transport>,
        request_builder: Arc<dyn RequestBuilder>,
    ) -> Self {
        Self {
            transport,
            request_builder,
            in_flight: Mutex::new(None),
            date_decoding_strategy: RwLock::new(None),
        }
    }

    /// Replaces the date strategy used by requests submitted from now on.
    pub fn set_decoding_strategy(&self, strategy: DateDecodingStrategy) {
        let mut guard = self
            .date_decoding_strategy
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *guard = Some(strategy);
    }

    pub fn decoding_strategy(&self) -> Option<DateDecodingStrategy> {
        self.date_decoding_strategy
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Submits `endpoint` and hands the decoded outcome to `completion`.
    ///
    /// If the endpoint cannot be built into a request, `completion` runs
    /// before this method returns and the transport is never called.
    /// Otherwise the request runs on a spawned task and `completion` runs
    /// there once the transport finishes or the request is cancelled.
    ///
    /// The decoding strategy is captured here; later calls to
    /// [`Dispatcher::set_decoding_strategy`] do not affect this request.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a tokio runtime.
    pub fn make_request<T, F>(&self, endpoint: &dyn Endpoint, completion: F)
    where
        T: DeserializeOwned + Send + 'static,
        F: FnOnce(Result<T, DispatchError>) + Send + 'static,
    {
        let request = match self.request_builder.build(endpoint) {
            Ok(request) => request,
            Err(error) => {
                warn!("Could not build request for {}: {}", endpoint.host(), error);
                completion(Err(error.into()));
                return;
            }
        };

        let id = Uuid::new_v4();
        let span = info_span!(
            "dispatch",
            request_id = %id,
            method = %request.method,
            url = %request.url,
        );

        let decoder = self.decoder();
        let transport = Arc::clone(&self.transport);
        let cancellation = CancellationToken::new();
        let cancelled = cancellation.clone();

        let task = tokio::spawn(
            async move {
                info!("Submitting request");

                let outcome = tokio::select! {
                    biased;
                    _ = cancelled.cancelled() => Err(TransportError::Cancelled),
                    outcome = transport.execute(request) => outcome,
                };

                completion(handle_response(outcome, &decoder));
            }
            .instrument(span),
        );

        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = in_flight.replace(InFlightRequest {
            id,
            cancellation,
            task,
        }) {
            if !previous.task.is_finished() {
                debug!("No longer tracking request {}", previous.id);
            }
        }
    }

    /// Resolves `endpoint` and awaits its decoded outcome directly.
    ///
    /// Requests sent this way are not tracked and cannot be reached by
    /// [`Dispatcher::cancel`].
    pub async fn send<T: DeserializeOwned>(
        &self,
        endpoint: &dyn Endpoint,
    ) -> Result<T, DispatchError> {
        let request = self.request_builder.build(endpoint)?;
        let decoder = self.decoder();

        debug!("Sending {} {}", request.method, request.url);

        handle_response(self.transport.execute(request).await, &decoder)
    }

    /// Cancels the tracked request, if any.
    ///
    /// The cancellation is reported through that request's completion as
    /// [`TransportError::Cancelled`]; a completion that already ran is left
    /// untouched.
    pub fn cancel(&self) {
        let in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(request) = in_flight.as_ref() {
            info!("Cancelling request {}", request.id);
            request.cancellation.cancel();
        }
    }

    /// Whether the tracked request is still waiting on its completion.
    pub fn is_in_flight(&self) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|request| !request.task.is_finished())
    }

    fn decoder(&self) -> JsonDecoder {
        JsonDecoder::new(self.decoding_strategy().unwrap_or_default())
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(Arc::new(ReqwestTransport::default()))
    }
}

/// Classifies a transport outcome: transport errors first, then error
/// statuses, then the body. Nothing is decoded once an error is found.
fn handle_response<T: DeserializeOwned>(
    outcome: Result<Response, TransportError>,
    decoder: &JsonDecoder,
) -> Result<T, DispatchError> {
    let response = outcome.inspect_err(|error| warn!("Transport failed: {}", error))?;

    if let Some(error) = response.status().and_then(StatusError::from_status_code) {
        warn!("Request failed with status {}", error.status_code());
        return Err(error.into());
    }

    match response.body {
        Some(body) => decoder.decode(&body).map_err(|error| {
            warn!("Could not decode response body: {}", error);
            DispatchError::from(error)
        }),
        None => Err(DispatchError::Unknown(NO_DATA.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use std::{
        future,
        sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
        },
        time::Duration,
    };

    use async_trait::async_trait;
    use bytes::Bytes;
    use chrono::{TimeZone, Utc};
    use serde::{Deserialize, Serialize};
    use tokio::sync::oneshot;

    use crate::{
        decoder::date::{Date, DateDecodingStrategy},
        dispatcher::{dispatcher::Dispatcher, error::DispatchError, status_error::StatusError},
        endpoint::http_endpoint::HttpEndpoint,
        transport::{
            error::TransportError,
            request::Request,
            response::{Response, ResponseMetadata},
            transport::{MockTransport, Transport},
        },
    };

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct User {
        id: i64,
        name: String,
    }

    #[derive(Debug, Deserialize)]
    struct Event {
        at: Date,
    }

    /// Never completes on its own; only cancellation ends the request.
    struct PendingTransport {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Transport for PendingTransport {
        async fn execute(&self, _request: Request) -> Result<Response, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            future::pending().await
        }
    }

    fn endpoint() -> HttpEndpoint {
        HttpEndpoint::new("api.example.com", "/users/1")
    }

    fn dispatcher_returning(
        outcome: Result<Response, TransportError>,
    ) -> Dispatcher {
        let mut mock = MockTransport::new();
        mock.expect_execute()
            .times(1)
            .return_once(move |_| outcome);
        Dispatcher::new(Arc::new(mock))
    }

    async fn dispatch<T>(dispatcher: &Dispatcher) -> Result<T, DispatchError>
    where
        T: serde::de::DeserializeOwned + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        dispatcher.make_request::<T, _>(&endpoint(), move |result| {
            let _ = tx.send(result);
        });
        rx.await.unwrap()
    }

    #[tokio::test]
    async fn decodes_a_successful_response() {
        let dispatcher = dispatcher_returning(Ok(Response::new(200, r#"{"id":1,"name":"a"}"#)));

        let user: User = dispatch(&dispatcher).await.unwrap();

        assert_eq!(
            user,
            User {
                id: 1,
                name: "a".to_string()
            }
        );
    }

    #[tokio::test]
    async fn round_trips_a_serialized_value() {
        let original = User {
            id: 42,
            name: "grace".to_string(),
        };
        let body = serde_json::to_vec(&original).unwrap();
        let dispatcher = dispatcher_returning(Ok(Response::new(201, body)));

        let user: User = dispatch(&dispatcher).await.unwrap();

        assert_eq!(user, original);
    }

    #[tokio::test]
    async fn builder_failures_complete_synchronously_without_touching_the_transport() {
        let mut mock = MockTransport::new();
        mock.expect_execute().never();
        let dispatcher = Dispatcher::new(Arc::new(mock));

        let (tx, mut rx) = oneshot::channel();
        dispatcher.make_request::<User, _>(&HttpEndpoint::new("bad host", "/"), move |result| {
            let _ = tx.send(result);
        });

        let result = rx.try_recv().expect("completion should already have run");
        assert!(matches!(result, Err(DispatchError::Construction(_))));
        assert!(!dispatcher.is_in_flight());
    }

    #[tokio::test]
    async fn transport_errors_are_delivered_unmodified() {
        let dispatcher =
            dispatcher_returning(Err(TransportError::Network("offline".to_string())));

        let result = dispatch::<User>(&dispatcher).await;

        match result {
            Err(DispatchError::Transport(TransportError::Network(message))) => {
                assert_eq!(message, "offline")
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn error_statuses_are_not_decoded() {
        for status in [400, 404, 500] {
            let dispatcher =
                dispatcher_returning(Ok(Response::new(status, r#"{"id":1,"name":"a"}"#)));

            let error = dispatch::<User>(&dispatcher).await.unwrap_err();

            assert!(matches!(error, DispatchError::Status(_)), "{status}");
            assert_eq!(error.status_code(), Some(status));
        }
    }

    #[tokio::test]
    async fn not_found_carries_its_status() {
        let dispatcher = dispatcher_returning(Ok(Response::new(404, "")));

        let error = dispatch::<User>(&dispatcher).await.unwrap_err();

        assert!(matches!(error, DispatchError::Status(StatusError::NotFound)));
    }

    #[tokio::test]
    async fn mismatched_bodies_fail_to_decode() {
        let dispatcher = dispatcher_returning(Ok(Response::new(200, r#"{"id":"one"}"#)));

        let error = dispatch::<User>(&dispatcher).await.unwrap_err();

        assert!(matches!(error, DispatchError::Decode(_)));
    }

    #[tokio::test]
    async fn missing_bodies_are_reported_as_unknown() {
        let dispatcher = dispatcher_returning(Ok(Response {
            metadata: Some(ResponseMetadata {
                status: 200,
                headers: Default::default(),
            }),
            body: None,
        }));

        let error = dispatch::<User>(&dispatcher).await.unwrap_err();

        assert!(matches!(error, DispatchError::Unknown(_)));
    }

    #[tokio::test]
    async fn bodies_without_metadata_are_still_decoded() {
        let dispatcher = dispatcher_returning(Ok(Response {
            metadata: None,
            body: Some(Bytes::from_static(br#"{"id":3,"name":"c"}"#)),
        }));

        let user: User = dispatch(&dispatcher).await.unwrap();

        assert_eq!(user.id, 3);
    }

    #[tokio::test]
    async fn cancellation_surfaces_as_a_transport_error() {
        let transport = Arc::new(PendingTransport {
            calls: AtomicUsize::new(0),
        });
        let dispatcher = Dispatcher::new(transport.clone());

        let (tx, rx) = oneshot::channel();
        dispatcher.make_request::<User, _>(&endpoint(), move |result| {
            let _ = tx.send(result);
        });
        assert!(dispatcher.is_in_flight());

        dispatcher.cancel();

        let result = tokio::time::timeout(Duration::from_secs(1), rx)
            .await
            .expect("cancelled request should complete")
            .unwrap();
        let error = result.unwrap_err();
        assert!(error.is_cancelled());
        assert_eq!(error.transport_code(), Some(TransportError::CANCELLED_CODE));
        assert!(transport.calls.load(Ordering::SeqCst) <= 1);
    }

    #[tokio::test]
    async fn cancelling_without_a_request_is_a_no_op() {
        let mut mock = MockTransport::new();
        mock.expect_execute().never();
        let dispatcher = Dispatcher::new(Arc::new(mock));

        dispatcher.cancel();

        assert!(!dispatcher.is_in_flight());
    }

    #[tokio::test]
    async fn new_requests_replace_the_tracked_handle_without_cancelling() {
        let transport = Arc::new(PendingTransport {
            calls: AtomicUsize::new(0),
        });
        let dispatcher = Dispatcher::new(transport.clone());

        let (first_tx, mut first_rx) = oneshot::channel();
        dispatcher.make_request::<User, _>(&endpoint(), move |result| {
            let _ = first_tx.send(result);
        });
        let (second_tx, second_rx) = oneshot::channel();
        dispatcher.make_request::<User, _>(&endpoint(), move |result| {
            let _ = second_tx.send(result);
        });

        dispatcher.cancel();

        let second = tokio::time::timeout(Duration::from_secs(1), second_rx)
            .await
            .unwrap()
            .unwrap();
        assert!(second.unwrap_err().is_cancelled());

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(first_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn applies_the_decoding_strategy_captured_at_submission() {
        let dispatcher = dispatcher_returning(Ok(Response::new(
            200,
            r#"{"at":"2020-05-01T12:00:00Z"}"#,
        )));
        dispatcher.set_decoding_strategy(DateDecodingStrategy::Iso8601);

        let (tx, rx) = oneshot::channel();
        dispatcher.make_request::<Event, _>(&endpoint(), move |result| {
            let _ = tx.send(result);
        });
        dispatcher.set_decoding_strategy(DateDecodingStrategy::SecondsSince1970);

        let event = rx.await.unwrap().unwrap();
        assert_eq!(*event.at, Utc.with_ymd_and_hms(2020, 5, 1, 12, 0, 0).unwrap());
        assert_eq!(
            dispatcher.decoding_strategy(),
            Some(DateDecodingStrategy::SecondsSince1970)
        );
    }

    #[tokio::test]
    async fn send_returns_the_decoded_value() {
        let dispatcher = dispatcher_returning(Ok(Response::new(200, r#"{"id":1,"name":"a"}"#)));

        let user: User = dispatcher.send(&endpoint()).await.unwrap();

        assert_eq!(user.name, "a");
    }

    #[tokio::test]
    async fn send_reports_construction_errors() {
        let mut mock = MockTransport::new();
        mock.expect_execute().never();
        let dispatcher = Dispatcher::new(Arc::new(mock));

        let result = dispatcher
            .send::<User>(&HttpEndpoint::new("example.com", "relative"))
            .await;

        assert!(matches!(result, Err(DispatchError::Construction(_))));
    }
}
