use bevy::prelude::*;

/// Resource tracking simulation time in ticks.
///
/// The clock advances once per FixedUpdate; a tick is the granularity at
/// which visibility is accumulated and the fog surfaces rotate. The render
/// loop interpolates between surface states within a tick.
#[derive(Resource, Debug, Clone, Default, Reflect)]
#[reflect(Resource)]
pub struct WorldClock {
    tick: u64,
}

impl WorldClock {
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Advances the clock by one tick.
    pub fn advance(&mut self) {
        self.tick += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_advances() {
        let mut clock = WorldClock::default();
        assert_eq!(clock.tick(), 0);
        clock.advance();
        clock.advance();
        assert_eq!(clock.tick(), 2);
    }
}
