use bevy::prelude::*;

use super::DrillController;

/// Full-screen curtain driven by the controller's fade alpha. Both renderers
/// stay mounted during a transition; the curtain covers the swap at the fade
/// midpoint so the destination renderer can finish initializing underneath.
#[derive(Component)]
pub struct FadeCurtain;

const CURTAIN_COLOR: Color = Color::srgb(0.02, 0.02, 0.04);

pub fn spawn_fade_curtain(mut commands: Commands) {
    commands.spawn((
        Node {
            position_type: PositionType::Absolute,
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            ..default()
        },
        BackgroundColor(CURTAIN_COLOR.with_alpha(0.0)),
        GlobalZIndex(100),
        FadeCurtain,
    ));
}

pub fn update_fade_curtain(
    controller: Res<DrillController>,
    mut curtains: Query<&mut BackgroundColor, With<FadeCurtain>>,
) {
    let alpha = controller.fade_alpha();
    for mut background in &mut curtains {
        background.0 = CURTAIN_COLOR.with_alpha(alpha);
    }
}
