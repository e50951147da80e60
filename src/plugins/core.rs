use bevy::prelude::*;

use crate::resources::CliArgs;
use crate::systems::world_tick_system;

#[derive(States, Default, Clone, Eq, PartialEq, Debug, Hash)]
pub enum GameState {
    #[default]
    Loading,
    Playing,
}

pub struct CorePlugin;

impl Plugin for CorePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(CliArgs::parse())
            .init_state::<GameState>()
            .add_systems(Startup, spawn_camera)
            .add_systems(FixedUpdate, world_tick_system)
            .add_systems(Update, log_state_transitions);
    }
}

fn spawn_camera(mut commands: Commands) {
    commands.spawn((
        Camera2d,
        Camera { ..default() },
        OrthographicProjection {
            near: -1000.0,
            far: 1000.0,
            scale: 1.0,
            ..OrthographicProjection::default_2d()
        },
        Transform::from_xyz(0.0, 0.0, 100.0),
        GlobalTransform::default(),
    ));
}

fn log_state_transitions(mut transitions: EventReader<StateTransitionEvent<GameState>>) {
    for transition in transitions.read() {
        info!(
            "State transition: {:?} -> {:?}",
            transition.exited, transition.entered
        );
    }
}
