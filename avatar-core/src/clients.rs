mod dummy_avatar_renderer;
mod dummy_speech_synthesizer;
mod dummy_voice_selector;

pub use dummy_avatar_renderer::*;
pub use dummy_speech_synthesizer::*;
pub use dummy_voice_selector::*;
