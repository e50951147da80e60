use bevy::prelude::*;

/// Command-line arguments parsed at startup.
/// Used for test automation and save-based feature verification.
#[derive(Resource, Debug)]
pub struct CliArgs {
    /// Save file to load on startup.
    /// Usage: `cargo run -- --load <save_name>`
    pub load_save: Option<String>,

    /// Override the F5 quicksave name. Useful for creating test saves.
    /// Usage: `cargo run -- --save-as test_feature`
    pub save_as: Option<String>,

    /// Map generation seed; random when absent.
    /// Usage: `cargo run -- --seed 42`
    pub seed: Option<u32>,

    /// Map side length in surface cells.
    /// Usage: `cargo run -- --map-size 128`
    pub map_size: u32,

    /// Start with fog of war disabled.
    /// Usage: `cargo run -- --no-fog`
    pub no_fog: bool,

    /// Start in reveal-resources mode: the map interior begins revealed
    /// at the explored shade.
    /// Usage: `cargo run -- --reveal-resources`
    pub reveal_resources: bool,
}

/// Accepted `--map-size` range; values outside are rejected at parse
/// time so the cell count cannot overflow during map allocation.
const MIN_MAP_SIZE: u32 = 16;
const MAX_MAP_SIZE: u32 = 1024;

impl Default for CliArgs {
    fn default() -> Self {
        Self {
            load_save: None,
            save_as: None,
            seed: None,
            map_size: 128,
            no_fog: false,
            reveal_resources: false,
        }
    }
}

impl CliArgs {
    /// Parse command-line arguments.
    pub fn parse() -> Self {
        Self::parse_from(std::env::args().collect())
    }

    fn parse_from(args: Vec<String>) -> Self {
        let mut cli = CliArgs::default();

        let mut i = 1; // Skip program name
        while i < args.len() {
            match args[i].as_str() {
                "--load" => {
                    if i + 1 < args.len() {
                        cli.load_save = Some(args[i + 1].clone());
                        info!("CLI: Will load save '{}' on startup", args[i + 1]);
                        i += 2;
                    } else {
                        warn!("CLI: --load requires a save name argument");
                        i += 1;
                    }
                }
                "--save-as" => {
                    if i + 1 < args.len() {
                        cli.save_as = Some(args[i + 1].clone());
                        info!("CLI: F5 will save to '{}' instead of 'quicksave'", args[i + 1]);
                        i += 2;
                    } else {
                        warn!("CLI: --save-as requires a save name argument");
                        i += 1;
                    }
                }
                "--seed" => {
                    if i + 1 < args.len() {
                        match args[i + 1].parse() {
                            Ok(seed) => cli.seed = Some(seed),
                            Err(_) => warn!("CLI: --seed expects an integer, got '{}'", args[i + 1]),
                        }
                        i += 2;
                    } else {
                        warn!("CLI: --seed requires a value");
                        i += 1;
                    }
                }
                "--map-size" => {
                    if i + 1 < args.len() {
                        match args[i + 1].parse() {
                            Ok(size) if (MIN_MAP_SIZE..=MAX_MAP_SIZE).contains(&size) => {
                                cli.map_size = size
                            }
                            Ok(size) => warn!(
                                "CLI: --map-size {} outside {}..={}, keeping {}",
                                size, MIN_MAP_SIZE, MAX_MAP_SIZE, cli.map_size
                            ),
                            Err(_) => {
                                warn!("CLI: --map-size expects an integer, got '{}'", args[i + 1])
                            }
                        }
                        i += 2;
                    } else {
                        warn!("CLI: --map-size requires a value");
                        i += 1;
                    }
                }
                "--no-fog" => {
                    cli.no_fog = true;
                    i += 1;
                }
                "--reveal-resources" => {
                    cli.reveal_resources = true;
                    i += 1;
                }
                arg => {
                    if arg.starts_with('-') {
                        warn!("CLI: Unknown argument '{}'", arg);
                    }
                    i += 1;
                }
            }
        }

        cli
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("warfront")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_defaults() {
        let cli = CliArgs::parse_from(args(&[]));
        assert!(cli.load_save.is_none());
        assert_eq!(cli.map_size, 128);
        assert!(!cli.no_fog);
    }

    #[test]
    fn test_parse_flags() {
        let cli = CliArgs::parse_from(args(&[
            "--load", "alpha", "--seed", "7", "--map-size", "64", "--no-fog",
        ]));
        assert_eq!(cli.load_save.as_deref(), Some("alpha"));
        assert_eq!(cli.seed, Some(7));
        assert_eq!(cli.map_size, 64);
        assert!(cli.no_fog);
    }

    #[test]
    fn test_bad_seed_keeps_default() {
        let cli = CliArgs::parse_from(args(&["--seed", "banana"]));
        assert_eq!(cli.seed, None);
    }

    #[test]
    fn test_reveal_resources_flag() {
        let cli = CliArgs::parse_from(args(&["--reveal-resources"]));
        assert!(cli.reveal_resources);
        assert!(!CliArgs::parse_from(args(&[])).reveal_resources);
    }

    #[test]
    fn test_map_size_out_of_range_keeps_default() {
        // Huge sizes would overflow the u32 cell count during allocation.
        let cli = CliArgs::parse_from(args(&["--map-size", "999999"]));
        assert_eq!(cli.map_size, 128);
        let cli = CliArgs::parse_from(args(&["--map-size", "4"]));
        assert_eq!(cli.map_size, 128);
        let cli = CliArgs::parse_from(args(&["--map-size", "1024"]));
        assert_eq!(cli.map_size, 1024);
    }
}
