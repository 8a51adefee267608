mod overlay;
mod pointer;
mod raycast;
mod rotation;
mod scene;

pub use overlay::*;
pub use pointer::*;
pub use raycast::*;
pub use rotation::*;
pub use scene::*;

use bevy::prelude::*;

pub struct GlobePlugin;

impl Plugin for GlobePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GlobeScene>()
            .init_resource::<GlobeRotation>()
            .init_resource::<GlobePointer>()
            .init_resource::<HoverState>()
            .add_systems(
                Update,
                (
                    sync_globe_mount,
                    build_region_overlay,
                    handle_globe_pointer,
                    update_hover_highlight,
                    apply_globe_rotation,
                    scale_globe_during_fade,
                ),
            );
    }
}
