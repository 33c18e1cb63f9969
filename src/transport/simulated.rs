// MIT License - Copyright (c) 2026 Peter Wright
// In-memory controller for tests and host-side glue development

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use secrecy::ExposeSecret;
use tokio::sync::watch;
use tracing::debug;

use crate::config::{Credentials, Endpoint};
use crate::constants::{CommandCode, ObjectType};
use crate::error::{ConnectError, OperationError};
use crate::event::{NotificationSender, StatusEvent, TransportEvent};
use crate::protocol::{ObjectRecord, Request, Response, SystemInfo};
use crate::transport::Transport;

#[derive(Debug)]
struct SimState {
    system: SystemInfo,
    objects: BTreeMap<u8, BTreeMap<u16, ObjectRecord>>,
    statuses: BTreeMap<u8, BTreeMap<u16, StatusEvent>>,
    property_failures: HashMap<u8, OperationError>,
    ignore_filters: bool,
    expected_key: Option<String>,
    reachable: bool,
    open: bool,
    command_response: Response,
    log: Vec<Request>,
    sink: Option<NotificationSender>,
}

/// A controller that lives in memory.
///
/// Holds object tables and current statuses, answers requests the way a
/// real controller would, and records every request it receives. Requests
/// can be held with [`pause`](Self::pause) to observe queueing, and the
/// number of requests executing at once is tracked.
#[derive(Debug)]
pub struct SimulatedController {
    state: Mutex<SimState>,
    paused: watch::Sender<bool>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl Default for SimulatedController {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedController {
    /// An Omni controller (model 30) with no objects.
    pub fn new() -> Self {
        let (paused, _) = watch::channel(false);
        Self {
            state: Mutex::new(SimState {
                system: SystemInfo {
                    model: 30,
                    major: 3,
                    minor: 16,
                    revision: 2,
                    phone: String::new(),
                },
                objects: BTreeMap::new(),
                statuses: BTreeMap::new(),
                property_failures: HashMap::new(),
                ignore_filters: false,
                expected_key: None,
                reachable: true,
                open: false,
                command_response: Response::Ack,
                log: Vec::new(),
                sink: None,
            }),
            paused,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Report the given controller model in system information.
    pub fn set_model(&self, model: u8) {
        self.lock().system.model = model;
    }

    /// Add or replace an object in the property tables.
    pub fn add_object(&self, record: ObjectRecord) {
        let mut state = self.lock();
        state
            .objects
            .entry(record.object_type().code())
            .or_default()
            .insert(record.number, record);
    }

    /// Set the status returned for an object.
    pub fn set_status(&self, event: StatusEvent) {
        let mut state = self.lock();
        state
            .statuses
            .entry(event.object_type().code())
            .or_default()
            .insert(event.number(), event);
    }

    /// Fail every property query for `object_type` with `error`.
    pub fn fail_properties(&self, object_type: ObjectType, error: OperationError) {
        self.lock()
            .property_failures
            .insert(object_type.code(), error);
    }

    /// Ignore query filters and return every object, like older firmware.
    pub fn ignore_filters(&self, ignore: bool) {
        self.lock().ignore_filters = ignore;
    }

    /// Reject sessions whose key is not `key1:key2`.
    pub fn expect_keys(&self, key1: &str, key2: &str) {
        self.lock().expected_key = Some(format!("{}:{}", key1, key2));
    }

    pub fn set_reachable(&self, reachable: bool) {
        self.lock().reachable = reachable;
    }

    /// Response returned to every command.
    pub fn set_command_response(&self, response: Response) {
        self.lock().command_response = response;
    }

    pub fn is_open(&self) -> bool {
        self.lock().open
    }

    pub fn notifications_enabled(&self) -> bool {
        self.lock().sink.is_some()
    }

    /// Hold every request until [`resume`](Self::resume) is called.
    pub fn pause(&self) {
        self.paused.send_replace(true);
    }

    pub fn resume(&self) {
        self.paused.send_replace(false);
    }

    /// Number of requests currently blocked inside the controller.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Highest number of requests ever executing at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Every request received so far, in arrival order.
    pub fn requests(&self) -> Vec<Request> {
        self.lock().log.clone()
    }

    pub fn clear_requests(&self) {
        self.lock().log.clear();
    }

    /// Property requests received for `object_type`.
    pub fn property_requests(&self, object_type: ObjectType) -> usize {
        self.lock()
            .log
            .iter()
            .filter(|r| matches!(r, Request::ObjectProperties { object_type: t, .. } if *t == object_type))
            .count()
    }

    /// Commands received so far as `(code, p1, p2)`.
    pub fn commands(&self) -> Vec<(CommandCode, u8, u16)> {
        self.lock()
            .log
            .iter()
            .filter_map(|r| match r {
                Request::Command { code, p1, p2 } => Some((*code, *p1, *p2)),
                _ => None,
            })
            .collect()
    }

    /// Push a batch of status notifications. Returns false when
    /// notifications are not enabled.
    pub async fn push(&self, events: Vec<StatusEvent>) -> bool {
        self.send_event(TransportEvent::Status(events)).await
    }

    /// Push a batch of non-status event codes.
    pub async fn push_other(&self, codes: Vec<u16>) -> bool {
        self.send_event(TransportEvent::Other(codes)).await
    }

    /// Drop the link as if the network went away.
    pub async fn drop_link(&self, reason: &str) {
        let sink = {
            let mut state = self.lock();
            state.open = false;
            state.sink.take()
        };
        if let Some(sink) = sink {
            let _ = sink
                .send(TransportEvent::Closed {
                    reason: reason.to_string(),
                })
                .await;
        }
    }

    async fn send_event(&self, event: TransportEvent) -> bool {
        let sink = self.lock().sink.clone();
        match sink {
            Some(sink) => sink.send(event).await.is_ok(),
            None => false,
        }
    }

    fn answer(&self, request: &Request) -> Result<Response, OperationError> {
        let state = self.lock();
        if !state.open {
            return Err(OperationError::NotConnected);
        }
        match request {
            Request::ObjectProperties {
                object_type,
                after,
                filter,
            } => {
                if let Some(error) = state.property_failures.get(&object_type.code()) {
                    return Err(error.clone());
                }
                let next = state.objects.get(&object_type.code()).and_then(|table| {
                    table
                        .range(after.saturating_add(1)..)
                        .map(|(_, record)| record)
                        .find(|record| state.ignore_filters || filter.matches(record))
                });
                Ok(match next {
                    Some(record) if record.number > *after => Response::Properties(record.clone()),
                    // u16::MAX has no successor
                    _ => Response::EndOfData,
                })
            }
            Request::ObjectStatus {
                object_type,
                start,
                end,
            } => {
                let found: Vec<StatusEvent> = match state.statuses.get(&object_type.code()) {
                    Some(table) if start <= end => {
                        table.range(*start..=*end).map(|(_, e)| e.clone()).collect()
                    }
                    _ => Vec::new(),
                };
                if found.is_empty() {
                    Ok(Response::Nak)
                } else {
                    Ok(Response::Statuses(found))
                }
            }
            Request::SystemInformation => Ok(Response::SystemInformation(state.system.clone())),
            Request::Command { .. } => Ok(state.command_response.clone()),
        }
    }
}

#[async_trait]
impl Transport for SimulatedController {
    async fn open(&self, endpoint: &Endpoint, credentials: &Credentials) -> Result<(), ConnectError> {
        let mut state = self.lock();
        if !state.reachable {
            return Err(ConnectError::Unreachable {
                endpoint: endpoint.to_string(),
                reason: "no route to host".to_string(),
            });
        }
        if let Some(expected) = &state.expected_key {
            if credentials.combined().expose_secret() != expected {
                return Err(ConnectError::AuthRejected);
            }
        }
        state.open = true;
        debug!("Simulated controller opened at {}", endpoint);
        Ok(())
    }

    async fn request(&self, request: Request) -> Result<Response, OperationError> {
        self.lock().log.push(request.clone());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let mut gate = self.paused.subscribe();
        let _ = gate.wait_for(|paused| !*paused).await;
        tokio::task::yield_now().await;

        let result = self.answer(&request);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    async fn enable_notifications(&self, sink: NotificationSender) -> Result<(), OperationError> {
        let mut state = self.lock();
        if !state.open {
            return Err(OperationError::NotConnected);
        }
        state.sink = Some(sink);
        Ok(())
    }

    async fn disable_notifications(&self) {
        self.lock().sink = None;
    }

    async fn close(&self) {
        let mut state = self.lock();
        state.open = false;
        state.sink = None;
    }
}
