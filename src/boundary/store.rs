use std::path::PathBuf;
use std::sync::Arc;

use bevy::prelude::*;
use bevy::tasks::{AsyncComputeTaskPool, Task};
use bevy_tasks::futures_lite::future;
use crossbeam_channel::{Receiver, bounded};

use super::{BoundaryCollection, load_boundaries};

/// Where the world boundary dataset lives. One file, fetched once.
#[derive(Resource, Clone)]
pub struct BoundarySettings {
    pub dataset_path: PathBuf,
}

impl Default for BoundarySettings {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from("assets/data/world_admin.geojson"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    NotRequested,
    Loading,
    Ready,
    /// Load or parse failed; the globe runs without classification and the
    /// host UI shows a degraded banner. No automatic retry.
    Failed,
}

/// Explicit service object around the one-per-process boundary dataset.
#[derive(Resource, Default)]
pub struct BoundaryStore {
    state: LoadState,
    collection: Option<Arc<BoundaryCollection>>,
}

impl BoundaryStore {
    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn collection(&self) -> Option<Arc<BoundaryCollection>> {
        self.collection.clone()
    }

    pub fn is_degraded(&self) -> bool {
        self.state == LoadState::Failed
    }

    fn install(&mut self, collection: BoundaryCollection) {
        self.collection = Some(Arc::new(collection));
        self.state = LoadState::Ready;
    }

    fn fail(&mut self) {
        self.collection = None;
        self.state = LoadState::Failed;
    }
}

#[derive(Resource, Deref)]
struct BoundaryReceiver(Receiver<Result<BoundaryCollection, String>>);

#[derive(Component)]
struct BoundaryLoadTask(Task<()>);

pub struct BoundaryStorePlugin;

impl Plugin for BoundaryStorePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<BoundarySettings>()
            .init_resource::<BoundaryStore>()
            .add_systems(Startup, begin_boundary_load)
            .add_systems(Update, (read_boundary_receiver, cleanup_load_task));
    }
}

/// Issues the load exactly once. Re-running the schedule is a no-op, which is
/// what keeps initialization idempotent.
fn begin_boundary_load(
    mut commands: Commands,
    settings: Res<BoundarySettings>,
    mut store: ResMut<BoundaryStore>,
) {
    if store.state != LoadState::NotRequested {
        return;
    }
    store.state = LoadState::Loading;

    let (tx, rx) = bounded(1);
    let path = settings.dataset_path.clone();
    let task = AsyncComputeTaskPool::get().spawn(async move {
        let result = load_boundaries(&path).map_err(|e| e.to_string());
        let _ = tx.send(result);
    });

    commands.insert_resource(BoundaryReceiver(rx));
    commands.spawn(BoundaryLoadTask(task));
}

fn read_boundary_receiver(
    receiver: Option<Res<BoundaryReceiver>>,
    mut store: ResMut<BoundaryStore>,
) {
    let Some(receiver) = receiver else {
        return;
    };
    if let Ok(result) = receiver.try_recv() {
        match result {
            Ok(collection) => {
                info!("boundary dataset ready, {} features", collection.features.len());
                store.install(collection);
            }
            Err(err) => {
                error!("boundary dataset failed to load: {err}");
                store.fail();
            }
        }
    }
}

fn cleanup_load_task(mut commands: Commands, mut tasks: Query<(Entity, &mut BoundaryLoadTask)>) {
    for (entity, mut task) in tasks.iter_mut() {
        if future::block_on(future::poll_once(&mut task.0)).is_some() {
            commands.entity(entity).despawn();
        }
    }
}
