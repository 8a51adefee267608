use bevy::prelude::*;
use bevy::tasks::{AsyncComputeTaskPool, Task};
use bevy_tasks::futures_lite::future;
use crossbeam_channel::{Receiver, Sender, unbounded};
use std::sync::{Arc, Mutex};

use crate::types::{CountryAggregate, StateAggregate};

use super::AggregateClient;

/// Base URL of the aggregate collaborator.
#[derive(Resource, Clone)]
pub struct AggregateApiSettings {
    pub base_url: String,
}

impl Default for AggregateApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AggregateRequest {
    ByRegion { region: String },
    ByCountry { code: String, name: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum AggregatePayload {
    Countries(Vec<CountryAggregate>),
    States(Vec<StateAggregate>),
}

/// A fetch result stamped with the drill generation it was issued under.
/// Results whose generation no longer matches are dropped, never applied.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateResult {
    pub generation: u64,
    pub payload: AggregatePayload,
}

struct QueuedRequest {
    request: AggregateRequest,
    generation: u64,
}

/// Queues aggregate fetches onto the async compute pool so the render loop
/// never waits on the network.
#[derive(Resource)]
pub struct AggregateWorker {
    client: AggregateClient,
    pending: Arc<Mutex<Vec<QueuedRequest>>>,
    active_tasks: Arc<Mutex<usize>>,
    max_concurrent: usize,
    tx: Sender<AggregateResult>,
}

#[derive(Resource, Deref)]
pub struct AggregateReceiver(pub Receiver<AggregateResult>);

impl AggregateWorker {
    pub fn new(client: AggregateClient, max_workers: usize, tx: Sender<AggregateResult>) -> Self {
        Self {
            client,
            pending: Arc::new(Mutex::new(Vec::new())),
            active_tasks: Arc::new(Mutex::new(0)),
            max_concurrent: max_workers,
            tx,
        }
    }

    pub fn queue_request(&self, request: AggregateRequest, generation: u64) {
        let mut pending = self.pending.lock().unwrap();
        pending.push(QueuedRequest {
            request,
            generation,
        });
    }
}

/// Rebuilds the client when the base URL changes, so edits to the settings
/// resource apply to the next queued request.
pub fn refresh_aggregate_client(
    settings: Res<AggregateApiSettings>,
    mut worker: ResMut<AggregateWorker>,
) {
    if settings.is_changed() && worker.client.base_url() != settings.base_url.trim_end_matches('/')
    {
        worker.client = AggregateClient::new(&settings.base_url);
    }
}

pub fn process_aggregate_requests(mut commands: Commands, worker: Res<AggregateWorker>) {
    let can_process = {
        let active = *worker.active_tasks.lock().unwrap();
        active < worker.max_concurrent
    };
    if !can_process {
        return;
    }

    let maybe_request = {
        let mut pending = worker.pending.lock().unwrap();
        if pending.is_empty() {
            None
        } else {
            Some(pending.remove(0))
        }
    };

    let Some(queued) = maybe_request else {
        return;
    };

    {
        let mut active = worker.active_tasks.lock().unwrap();
        *active += 1;
    }

    let client = worker.client.clone();
    let tx = worker.tx.clone();
    let active_tasks = worker.active_tasks.clone();
    let task = AsyncComputeTaskPool::get().spawn(async move {
        let payload = match &queued.request {
            AggregateRequest::ByRegion { region } => match client.fetch_by_region(region) {
                Ok(response) => AggregatePayload::Countries(response.countries),
                Err(err) => {
                    warn!("by-region aggregate fetch for {region} failed: {err}");
                    AggregatePayload::Countries(Vec::new())
                }
            },
            AggregateRequest::ByCountry { code, name } => {
                match client.fetch_by_country(code, name) {
                    Ok(response) => AggregatePayload::States(response.states),
                    Err(err) => {
                        warn!("by-country aggregate fetch for {code} failed: {err}");
                        AggregatePayload::States(Vec::new())
                    }
                }
            }
        };

        let _ = tx.send(AggregateResult {
            generation: queued.generation,
            payload,
        });

        let mut active = active_tasks.lock().unwrap();
        *active -= 1;
    });

    commands.spawn(AggregateTask(task));
}

#[derive(Component)]
struct AggregateTask(Task<()>);

fn cleanup_aggregate_tasks(mut commands: Commands, mut tasks: Query<(Entity, &mut AggregateTask)>) {
    for (entity, mut task) in tasks.iter_mut() {
        if future::block_on(future::poll_once(&mut task.0)).is_some() {
            commands.entity(entity).despawn();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_edits_apply_to_later_requests() {
        let (tx, _rx) = unbounded();
        let mut app = App::new();
        app.insert_resource(AggregateApiSettings::default())
            .insert_resource(AggregateWorker::new(
                AggregateClient::new("http://localhost:8080"),
                2,
                tx,
            ))
            .add_systems(Update, refresh_aggregate_client);
        app.update();

        app.world_mut()
            .resource_mut::<AggregateApiSettings>()
            .base_url = "http://aggregates.internal:9090".to_string();
        app.update();

        let worker = app.world().resource::<AggregateWorker>();
        assert_eq!(worker.client.base_url(), "http://aggregates.internal:9090");
    }
}

pub struct AggregateWorkerPlugin;

impl Plugin for AggregateWorkerPlugin {
    fn build(&self, app: &mut App) {
        let settings = AggregateApiSettings::default();
        let (tx, rx) = unbounded();
        app.insert_resource(AggregateWorker::new(
            AggregateClient::new(&settings.base_url),
            2,
            tx,
        ))
        .insert_resource(AggregateReceiver(rx))
        .insert_resource(settings)
        .add_systems(
            Update,
            (
                refresh_aggregate_client,
                process_aggregate_requests,
                cleanup_aggregate_tasks,
            ),
        );
    }
}
