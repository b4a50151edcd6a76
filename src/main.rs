use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use melmage_heatmap::{DEFAULT_CELL_SIZE, HeatmapConfig, HeatmapController, Normalisation, PpmFilePresenter};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CliNormalisation {
    #[value(name = "none")]
    None,
    #[value(name = "max-abs")]
    MaxAbs,
}

impl From<CliNormalisation> for Normalisation {
    fn from(value: CliNormalisation) -> Self {
        match value {
            CliNormalisation::None => Normalisation::None,
            CliNormalisation::MaxAbs => Normalisation::MaxAbs,
        }
    }
}

/// Render neural network feature maps as diverging blue/red heatmaps
#[derive(Parser, Debug)]
#[command(name = "melmage-heatmap", version, about)]
struct Cli {
    /// JSON feature map: a 2-D array, or a 3-D array of channels
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output PPM file; stacks write one numbered file per channel
    #[arg(short, long, value_name = "FILE", default_value = "output/feature_map.ppm")]
    output: PathBuf,

    /// Pixels per feature-map cell edge
    #[arg(long, default_value_t = DEFAULT_CELL_SIZE, value_parser = clap::value_parser!(u32).range(1..))]
    cell_size: u32,

    /// Rescale each channel before colour mapping
    #[arg(long, value_enum, default_value_t = CliNormalisation::None)]
    normalise: CliNormalisation,

    /// Render on the calling thread instead of the rayon pool
    #[arg(long)]
    serial: bool,
}

impl From<&Cli> for HeatmapConfig {
    fn from(cli: &Cli) -> Self {
        Self {
            cell_size: cli.cell_size,
            normalisation: cli.normalise.into(),
            parallel: !cli.serial,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut controller = HeatmapController::new(PpmFilePresenter::new(), HeatmapConfig::from(&cli));

    controller.load(&cli.input)?;
    controller.write(&cli.output)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults_build_default_config() {
        let cli = Cli::try_parse_from(["melmage-heatmap", "maps.json"]).unwrap();

        assert_eq!(HeatmapConfig::from(&cli), HeatmapConfig::default());
        assert_eq!(cli.output, PathBuf::from("output/feature_map.ppm"));
    }

    #[test]
    fn test_flags_map_onto_config() {
        let cli = Cli::try_parse_from([
            "melmage-heatmap",
            "maps.json",
            "--cell-size",
            "2",
            "--normalise",
            "max-abs",
            "--serial",
        ])
        .unwrap();

        assert_eq!(
            HeatmapConfig::from(&cli),
            HeatmapConfig {
                cell_size: 2,
                normalisation: Normalisation::MaxAbs,
                parallel: false,
            }
        );
    }

    #[test]
    fn test_zero_cell_size_is_rejected() {
        let result = Cli::try_parse_from(["melmage-heatmap", "maps.json", "--cell-size", "0"]);

        assert!(result.is_err());
    }
}
