use std::process::{Command, Stdio};
use std::thread;

use thiserror::Error;
use tracing::{debug, warn};

use crate::config::VoiceCommand;

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("nothing to say")]
    EmptyText,
    #[error("could not start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Reads Portuguese text aloud.
pub trait Pronouncer {
    fn pronounce(&self, text: &str) -> Result<(), SpeechError>;
}

/// An external text-to-speech program. The text is passed as the last
/// argument. The child is reaped on a background thread so speaking never
/// blocks a drill.
pub struct CommandVoice {
    command: VoiceCommand,
}

impl CommandVoice {
    pub fn new(command: VoiceCommand) -> Self {
        Self { command }
    }
}

impl Pronouncer for CommandVoice {
    fn pronounce(&self, text: &str) -> Result<(), SpeechError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SpeechError::EmptyText);
        }
        let mut child = Command::new(&self.command.program)
            .args(&self.command.args)
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| SpeechError::Spawn {
                program: self.command.program.clone(),
                source,
            })?;
        debug!(program = %self.command.program, pid = child.id(), "speaking");

        let program = self.command.program.clone();
        thread::spawn(move || match child.wait() {
            Ok(status) if !status.success() => {
                debug!(program = %program, %status, "voice exited with failure")
            }
            Ok(_) => {}
            Err(e) => warn!(program = %program, error = %e, "could not reap voice process"),
        });
        Ok(())
    }
}

/// Voices in preference order. The first one that starts wins.
#[derive(Default)]
pub struct VoiceChain {
    voices: Vec<Box<dyn Pronouncer>>,
}

impl VoiceChain {
    pub fn new(voices: Vec<Box<dyn Pronouncer>>) -> Self {
        Self { voices }
    }

    pub fn from_commands(commands: &[VoiceCommand]) -> Self {
        Self::new(
            commands
                .iter()
                .cloned()
                .map(|c| Box::new(CommandVoice::new(c)) as Box<dyn Pronouncer>)
                .collect(),
        )
    }

    /// Speak `text` with the first voice that works. Returns whether any did.
    /// Speech is best-effort and never interrupts a drill.
    pub fn speak(&self, text: &str) -> bool {
        for voice in &self.voices {
            match voice.pronounce(text) {
                Ok(()) => return true,
                Err(SpeechError::EmptyText) => return false,
                Err(e) => warn!(error = %e, "voice failed, trying next"),
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    struct Recorder {
        name: &'static str,
        fail: bool,
        log: Rc<RefCell<Vec<String>>>,
    }

    impl Pronouncer for Recorder {
        fn pronounce(&self, text: &str) -> Result<(), SpeechError> {
            self.log.borrow_mut().push(format!("{}:{text}", self.name));
            if self.fail {
                Err(SpeechError::Spawn {
                    program: self.name.to_string(),
                    source: std::io::Error::from(std::io::ErrorKind::NotFound),
                })
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn falls_back_to_next_voice() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let chain = VoiceChain::new(vec![
            Box::new(Recorder {
                name: "remote",
                fail: true,
                log: log.clone(),
            }),
            Box::new(Recorder {
                name: "local",
                fail: false,
                log: log.clone(),
            }),
            Box::new(Recorder {
                name: "unused",
                fail: false,
                log: log.clone(),
            }),
        ]);
        assert!(chain.speak("Olá"));
        assert_eq!(*log.borrow(), vec!["remote:Olá", "local:Olá"]);
    }

    #[test]
    fn all_failing_voices_is_not_an_error() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let chain = VoiceChain::new(vec![Box::new(Recorder {
            name: "remote",
            fail: true,
            log,
        })]);
        assert!(!chain.speak("Olá"));
        assert!(!VoiceChain::default().speak("Olá"));
    }

    #[test]
    fn missing_program_reports_spawn_error() {
        let voice = CommandVoice::new(VoiceCommand {
            program: "lusodrill-no-such-voice-binary".to_string(),
            args: Vec::new(),
        });
        assert!(matches!(
            voice.pronounce("Olá"),
            Err(SpeechError::Spawn { .. })
        ));
        assert!(matches!(voice.pronounce("  "), Err(SpeechError::EmptyText)));
    }

    #[cfg(unix)]
    #[test]
    fn installed_program_speaks() {
        let voice = CommandVoice::new(VoiceCommand {
            program: "true".to_string(),
            args: Vec::new(),
        });
        assert!(voice.pronounce("Olá").is_ok());
        let chain = VoiceChain::from_commands(&[
            VoiceCommand {
                program: "lusodrill-no-such-voice-binary".to_string(),
                args: Vec::new(),
            },
            VoiceCommand {
                program: "true".to_string(),
                args: vec!["-v".to_string(), "pt-PT".to_string()],
            },
        ]);
        assert!(chain.speak("Bom dia"));
    }
}
