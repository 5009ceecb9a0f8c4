use anyhow::Result;
use clap::{Parser, ValueEnum};
use schemars::schema_for;
use tracing::debug;

#[derive(Debug, Parser)]
#[clap(name = env!("CARGO_BIN_NAME"))]
struct Args {
    #[clap(subcommand)]
    subcommand: Subcommand,
}

#[derive(Debug, clap::Subcommand)]
enum Subcommand {
    /// Generate JSON schema for the specified config file.
    Schema {
        /// Kind of config file.
        #[clap(value_enum, ignore_case = true, default_value = "pitch-config")]
        kind: ConfigKind,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ConfigKind {
    PitchConfig,
}

fn main() -> Result<()> {
    avatar_apps::utils::init_tracing();
    let args = Args::parse();
    debug!(?args);

    match args.subcommand {
        Subcommand::Schema { kind } => {
            let schema = match kind {
                ConfigKind::PitchConfig => schema_for!(avatar_apps::PitchConfig),
            };
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_args() {
        let bin = env!("CARGO_BIN_NAME");
        assert!(Args::try_parse_from([bin]).is_err());
        assert!(Args::try_parse_from([bin, "schema"]).is_ok());
        assert!(Args::try_parse_from([bin, "schema", "Pitch-Config"]).is_ok());
        assert!(Args::try_parse_from([bin, "schema", "pitch-config"]).is_ok());
        assert!(Args::try_parse_from([bin, "schema", "robot-config"]).is_err());
    }

    #[test]
    fn schema_is_json() {
        let schema = schema_for!(avatar_apps::PitchConfig);
        let json = serde_json::to_value(&schema).unwrap();
        assert!(json["properties"]["speech"].is_object(), "{json}");
        assert!(json["properties"]["avatar"].is_object(), "{json}");
    }
}
