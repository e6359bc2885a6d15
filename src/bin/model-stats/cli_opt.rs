//! CLI options.

use clap::Parser;
use model_stats::StatsConfig;

/// Statistics of glTF/GLB assets: triangles, meshes, materials, textures,
/// dimensions, animations and file size.
#[derive(Debug, Parser)]
#[command(name = "model-stats", version)]
pub struct CliOpt {
    /// Asset paths or http(s) URLs
    #[arg(required = true)]
    pub sources: Vec<String>,

    /// Decimal places of the file size
    #[arg(long, default_value_t = 2)]
    pub decimals: usize,

    /// Digit group separator of counters
    #[arg(long, default_value_t = ',')]
    pub separator: char,

    /// Skip the file size lookup
    #[arg(long)]
    pub no_file_size: bool,
}

impl CliOpt {
    pub fn to_config(&self) -> StatsConfig {
        StatsConfig {
            decimals: self.decimals,
            thousands_separator: self.separator,
            fetch_file_size: !self.no_file_size,
            ..StatsConfig::default()
        }
    }
}
