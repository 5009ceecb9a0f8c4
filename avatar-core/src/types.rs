use std::{fmt, path::Path, str::FromStr};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[default]
    Male,
    Female,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = Error;

    /// Case-insensitive. An empty string is the default (male).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "male" | "m" | "man" => Ok(Gender::Male),
            "female" | "f" | "woman" => Ok(Gender::Female),
            _ => Err(Error::UnknownGender(s.to_owned())),
        }
    }
}

/// A concrete voice identifier understood by a speech synthesizer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct Voice(String);

impl Voice {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Voice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Voice {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// How the avatar model crops and resizes the source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Preprocess {
    #[default]
    Crop,
    ExtCrop,
    Resize,
    Full,
    ExtFull,
}

impl Preprocess {
    pub fn as_str(self) -> &'static str {
        match self {
            Preprocess::Crop => "crop",
            Preprocess::ExtCrop => "extcrop",
            Preprocess::Resize => "resize",
            Preprocess::Full => "full",
            Preprocess::ExtFull => "extfull",
        }
    }
}

impl fmt::Display for Preprocess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Preprocess {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "crop" => Ok(Preprocess::Crop),
            "extcrop" => Ok(Preprocess::ExtCrop),
            "resize" => Ok(Preprocess::Resize),
            "full" => Ok(Preprocess::Full),
            "extfull" => Ok(Preprocess::ExtFull),
            _ => Err(Error::UnknownPreprocess(s.to_owned())),
        }
    }
}

/// Generation parameters passed to the avatar model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct RenderOptions {
    #[serde(default)]
    pub preprocess: Preprocess,
    #[serde(default)]
    pub still_mode: bool,
    /// Face enhancer (e.g. `gfpgan`). No enhancer when unset.
    #[serde(default)]
    pub enhancer: Option<String>,
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,
    #[serde(default = "default_size")]
    pub size: u32,
    #[serde(default)]
    pub pose_style: u32,
    #[serde(default = "default_expression_scale")]
    pub expression_scale: f64,
    #[serde(default)]
    pub cpu: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            preprocess: Preprocess::default(),
            still_mode: false,
            enhancer: None,
            batch_size: default_batch_size(),
            size: default_size(),
            pose_style: 0,
            expression_scale: default_expression_scale(),
            cpu: false,
        }
    }
}

fn default_batch_size() -> u32 {
    1
}

fn default_size() -> u32 {
    256
}

fn default_expression_scale() -> f64 {
    1.0
}

/// One invocation of an [`AvatarRenderer`](crate::AvatarRenderer).
#[derive(Debug, Clone, Copy)]
pub struct RenderJob<'a> {
    pub source_image: &'a Path,
    pub driven_audio: &'a Path,
    pub result_dir: &'a Path,
    pub options: &'a RenderOptions,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gender_from_str() {
        assert_eq!("male".parse::<Gender>().unwrap(), Gender::Male);
        assert_eq!("Female".parse::<Gender>().unwrap(), Gender::Female);
        assert_eq!(" F ".parse::<Gender>().unwrap(), Gender::Female);
        assert_eq!("".parse::<Gender>().unwrap(), Gender::Male);
        assert!(matches!(
            "robot".parse::<Gender>(),
            Err(Error::UnknownGender(s)) if s == "robot"
        ));
    }

    #[test]
    fn test_preprocess_round_trip_names() {
        for p in [
            Preprocess::Crop,
            Preprocess::ExtCrop,
            Preprocess::Resize,
            Preprocess::Full,
            Preprocess::ExtFull,
        ] {
            assert_eq!(p.as_str().parse::<Preprocess>().unwrap(), p);
        }
        assert!("zoom".parse::<Preprocess>().is_err());
    }

    #[test]
    fn test_default_render_options() {
        let options = RenderOptions::default();
        assert_eq!(options.preprocess, Preprocess::Crop);
        assert!(!options.still_mode);
        assert_eq!(options.enhancer, None);
        assert_eq!(options.batch_size, 1);
        assert_eq!(options.size, 256);
        assert_eq!(options.pose_style, 0);
    }

    #[test]
    fn test_render_options_from_partial_toml() {
        let options: RenderOptions = toml::from_str(
            r#"
            preprocess = "full"
            enhancer = "gfpgan"
            "#,
        )
        .unwrap();
        assert_eq!(options.preprocess, Preprocess::Full);
        assert_eq!(options.enhancer.as_deref(), Some("gfpgan"));
        assert_eq!(options.size, 256);
        assert_eq!(options.batch_size, 1);
    }
}
