use std::collections::HashMap;

use anyhow::anyhow;
use avatar_core::{Error, Gender, Voice, VoiceSelector};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// The male and female voice used for one nationality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct VoicePair {
    /// Voice short name used for `male`.
    pub male: String,
    /// Voice short name used for `female`.
    pub female: String,
}

impl VoicePair {
    /// Creates a new `VoicePair`.
    pub fn new(male: impl Into<String>, female: impl Into<String>) -> Self {
        Self {
            male: male.into(),
            female: female.into(),
        }
    }

    /// Returns the voice for `gender`.
    pub fn get(&self, gender: Gender) -> Voice {
        match gender {
            Gender::Male => Voice::new(self.male.as_str()),
            Gender::Female => Voice::new(self.female.as_str()),
        }
    }
}

/// The nationality used when none is given.
pub const DEFAULT_NATIONALITY: &str = "american";

// (locale, nationality keys, male, female)
const BUILTIN_VOICES: &[(&str, &[&str], &str, &str)] = &[
    (
        "en-US",
        &["american", "us", "usa", "america", "united states"],
        "en-US-GuyNeural",
        "en-US-JennyNeural",
    ),
    (
        "en-GB",
        &["british", "uk", "english", "england", "united kingdom"],
        "en-GB-RyanNeural",
        "en-GB-SoniaNeural",
    ),
    (
        "en-AU",
        &["australian", "australia"],
        "en-AU-WilliamNeural",
        "en-AU-NatashaNeural",
    ),
    (
        "en-IN",
        &["indian", "india"],
        "en-IN-PrabhatNeural",
        "en-IN-NeerjaNeural",
    ),
    (
        "en-CA",
        &["canadian", "canada"],
        "en-CA-LiamNeural",
        "en-CA-ClaraNeural",
    ),
    (
        "en-IE",
        &["irish", "ireland"],
        "en-IE-ConnorNeural",
        "en-IE-EmilyNeural",
    ),
    (
        "en-ZA",
        &["south african", "south africa"],
        "en-ZA-LukeNeural",
        "en-ZA-LeahNeural",
    ),
    (
        "en-NZ",
        &["new zealand", "new zealander", "kiwi"],
        "en-NZ-MitchellNeural",
        "en-NZ-MollyNeural",
    ),
    (
        "en-NG",
        &["nigerian", "nigeria"],
        "en-NG-AbeoNeural",
        "en-NG-EzinneNeural",
    ),
    (
        "en-SG",
        &["singaporean", "singapore"],
        "en-SG-WayneNeural",
        "en-SG-LunaNeural",
    ),
    (
        "en-KE",
        &["kenyan", "kenya"],
        "en-KE-ChilembaNeural",
        "en-KE-AsiliaNeural",
    ),
    (
        "en-PH",
        &["filipino", "philippine", "philippines"],
        "en-PH-JamesNeural",
        "en-PH-RosaNeural",
    ),
];

/// A [`VoiceSelector`] over edge-tts voices, keyed by nationality.
///
/// Keys match case-insensitively, with `_` and `-` read as spaces, so
/// `"South_African"` and `"en-gb"` are valid. An empty or unknown
/// nationality uses the fallback entry; without a fallback it is an
/// [`Error::NoVoice`].
#[derive(Debug, Clone, Default)]
pub struct VoiceCatalog {
    voices: HashMap<String, VoicePair>,
    fallback: Option<VoicePair>,
}

impl VoiceCatalog {
    /// Creates a catalog without entries or fallback.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates the built-in English catalog, falling back to
    /// [`DEFAULT_NATIONALITY`].
    pub fn builtin() -> Self {
        let mut catalog = Self::empty();
        for (locale, keys, male, female) in BUILTIN_VOICES {
            let pair = VoicePair::new(*male, *female);
            catalog.insert(locale, pair.clone());
            for key in *keys {
                catalog.insert(key, pair.clone());
            }
        }
        catalog.fallback = catalog.lookup(DEFAULT_NATIONALITY).cloned();
        catalog
    }

    /// Adds or replaces the voices for `nationality`.
    pub fn insert(&mut self, nationality: &str, voices: VoicePair) {
        self.voices.insert(normalize(nationality), voices);
    }

    /// Uses the entry of `nationality` for empty or unknown nationalities.
    pub fn set_fallback(&mut self, nationality: &str) -> Result<(), Error> {
        let pair = self
            .lookup(nationality)
            .cloned()
            .ok_or_else(|| anyhow!("default nationality {nationality:?} is not in the voice catalog"))?;
        self.fallback = Some(pair);
        Ok(())
    }

    /// Removes the fallback entry.
    pub fn without_fallback(mut self) -> Self {
        self.fallback = None;
        self
    }

    /// Looks up `nationality` without applying the fallback.
    pub fn lookup(&self, nationality: &str) -> Option<&VoicePair> {
        self.voices.get(&normalize(nationality))
    }
}

impl VoiceSelector for VoiceCatalog {
    fn select_voice(&self, nationality: &str, gender: Gender) -> Result<Voice, Error> {
        let pair = match self.lookup(nationality) {
            Some(pair) => Some(pair),
            None => {
                if !nationality.trim().is_empty() {
                    warn!(
                        nationality,
                        "Unknown nationality; using the default voice"
                    );
                }
                self.fallback.as_ref()
            }
        };
        let voice = pair
            .map(|pair| pair.get(gender))
            .ok_or_else(|| Error::NoVoice {
                nationality: nationality.to_owned(),
                gender,
            })?;
        debug!(nationality, %gender, %voice, "Selected edge-tts voice");
        Ok(voice)
    }
}

fn normalize(nationality: &str) -> String {
    nationality
        .to_lowercase()
        .replace(['_', '-'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
