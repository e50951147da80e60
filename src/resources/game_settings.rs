use bevy::prelude::*;

use crate::resources::fow_surface::FogPolicy;

/// Resource holding the match settings the fog pipeline depends on.
///
/// Passed into systems via `Res`/`ResMut` - components take the values
/// they need instead of reaching into process-wide state.
#[derive(Resource, Debug, Clone, Reflect)]
#[reflect(Resource)]
pub struct GameSettings {
    /// Master fog-of-war switch.
    pub fog_of_war: bool,
    /// Reveal-resources mode: explored terrain stays shaded at the
    /// explored alpha instead of going fully dark.
    pub reveal_resources: bool,
    /// Number of teams; fixed at world initialization.
    pub team_count: usize,
    /// Team whose visibility drives the fog overlay and minimap.
    pub this_team: usize,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            fog_of_war: true,
            reveal_resources: false,
            team_count: 2,
            this_team: 0,
        }
    }
}

impl GameSettings {
    /// The three fog-policy branches, derived from the two independent
    /// flags. Exactly one applies per rotation.
    pub fn fog_policy(&self) -> FogPolicy {
        if !self.fog_of_war {
            FogPolicy::Disabled
        } else if self.reveal_resources {
            FogPolicy::RevealResources
        } else {
            FogPolicy::Enabled
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fog_policy_branches() {
        let mut settings = GameSettings::default();
        assert_eq!(settings.fog_policy(), FogPolicy::Enabled);

        settings.reveal_resources = true;
        assert_eq!(settings.fog_policy(), FogPolicy::RevealResources);

        // Fog off wins over reveal mode.
        settings.fog_of_war = false;
        assert_eq!(settings.fog_policy(), FogPolicy::Disabled);
    }
}
