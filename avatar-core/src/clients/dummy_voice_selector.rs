use std::sync::Mutex;

use crate::{error::Error, traits::VoiceSelector, Gender, Voice};

/// Dummy VoiceSelector for debug or tests.
///
/// Returns `"{nationality}-{gender}"`, with `default` for an empty
/// nationality. Nationalities listed in `unknown` fail with
/// [`Error::NoVoice`].
#[derive(Debug, Default)]
pub struct DummyVoiceSelector {
    pub requests: Mutex<Vec<(String, Gender)>>,
    pub unknown: Vec<String>,
}

impl DummyVoiceSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_unknown(unknown: Vec<String>) -> Self {
        Self {
            unknown,
            ..Self::default()
        }
    }

    pub fn requests(&self) -> Vec<(String, Gender)> {
        self.requests.lock().unwrap().clone()
    }
}

impl VoiceSelector for DummyVoiceSelector {
    fn select_voice(&self, nationality: &str, gender: Gender) -> Result<Voice, Error> {
        self.requests
            .lock()
            .unwrap()
            .push((nationality.to_owned(), gender));
        if self.unknown.iter().any(|u| u == nationality) {
            return Err(Error::NoVoice {
                nationality: nationality.to_owned(),
                gender,
            });
        }
        let nationality = if nationality.is_empty() {
            "default"
        } else {
            nationality
        };
        Ok(Voice::new(format!("{nationality}-{gender}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select() {
        let selector = DummyVoiceSelector::new();
        assert_eq!(
            selector.select_voice("british", Gender::Female).unwrap(),
            Voice::new("british-female")
        );
        assert_eq!(
            selector.select_voice("", Gender::Male).unwrap(),
            Voice::new("default-male")
        );
        assert_eq!(
            selector.requests(),
            vec![
                ("british".to_owned(), Gender::Female),
                (String::new(), Gender::Male)
            ]
        );
    }

    #[test]
    fn test_unknown() {
        let selector = DummyVoiceSelector::with_unknown(vec!["martian".into()]);
        assert!(matches!(
            selector.select_voice("martian", Gender::Male),
            Err(Error::NoVoice { .. })
        ));
    }
}
