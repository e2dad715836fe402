// Sound output capability
//
// The playback scheduler and rollover preview only ever see `SoundOutput`.
// Binding it to a synthesizer or MIDI port is the host application's job.

use crate::messaging::channels::CommandProducer;
use crate::messaging::command::Command;
use crate::midi::event::MidiEvent;
use ringbuf::traits::Producer;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SoundError {
    #[error("Sound device unavailable: {0}")]
    Unavailable(String),

    #[error("Sound command queue is full")]
    QueueFull,
}

/// Note sink driven by playback and preview
///
/// Calls are fire-and-forget from the caller's point of view: errors are
/// reported but never stop playback.
pub trait SoundOutput: Send + Sync {
    fn note_on(&self, pitch: u8, velocity: u8) -> Result<(), SoundError>;

    fn note_off(&self, pitch: u8) -> Result<(), SoundError>;
}

/// Forwards notes to a sound thread through the lock-free command channel
pub struct ChannelOutput {
    sender: Mutex<CommandProducer>,
}

impl ChannelOutput {
    pub fn new(sender: CommandProducer) -> Self {
        Self {
            sender: Mutex::new(sender),
        }
    }

    fn send(&self, command: Command) -> Result<(), SoundError> {
        let mut sender = self
            .sender
            .lock()
            .map_err(|_| SoundError::Unavailable("command sender poisoned".into()))?;
        sender.try_push(command).map_err(|_| SoundError::QueueFull)
    }

    /// Ask the sound thread to silence every voice
    pub fn all_notes_off(&self) -> Result<(), SoundError> {
        self.send(Command::AllNotesOff)
    }

    /// Ask the sound thread to exit its command loop
    pub fn quit(&self) -> Result<(), SoundError> {
        self.send(Command::Quit)
    }
}

impl SoundOutput for ChannelOutput {
    fn note_on(&self, pitch: u8, velocity: u8) -> Result<(), SoundError> {
        self.send(Command::Midi(MidiEvent::NoteOn {
            note: pitch,
            velocity,
        }))
    }

    fn note_off(&self, pitch: u8) -> Result<(), SoundError> {
        self.send(Command::Midi(MidiEvent::NoteOff { note: pitch }))
    }
}

/// Silent output, for running without a sound device
#[derive(Debug, Default, Clone, Copy)]
pub struct NullOutput;

impl SoundOutput for NullOutput {
    fn note_on(&self, _pitch: u8, _velocity: u8) -> Result<(), SoundError> {
        Ok(())
    }

    fn note_off(&self, _pitch: u8) -> Result<(), SoundError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::channels::create_command_channel;
    use ringbuf::traits::Consumer;

    #[test]
    fn test_channel_output_forwards_notes() {
        let (tx, mut rx) = create_command_channel(8);
        let output = ChannelOutput::new(tx);

        output.note_on(60, 96).unwrap();
        output.note_off(60).unwrap();

        assert_eq!(
            rx.try_pop(),
            Some(Command::Midi(MidiEvent::NoteOn {
                note: 60,
                velocity: 96
            }))
        );
        assert_eq!(
            rx.try_pop(),
            Some(Command::Midi(MidiEvent::NoteOff { note: 60 }))
        );
    }

    #[test]
    fn test_shutdown_commands_follow_notes() {
        let (tx, mut rx) = create_command_channel(8);
        let output = ChannelOutput::new(tx);

        output.note_on(64, 96).unwrap();
        output.all_notes_off().unwrap();
        output.quit().unwrap();

        let commands: Vec<Command> = rx.pop_iter().collect();
        assert_eq!(commands.len(), 3);
        assert_eq!(&commands[1..], &[Command::AllNotesOff, Command::Quit]);
    }

    #[test]
    fn test_channel_output_reports_full_queue() {
        let (tx, _rx) = create_command_channel(1);
        let output = ChannelOutput::new(tx);

        assert!(output.note_on(60, 96).is_ok());
        assert_eq!(output.note_on(61, 96), Err(SoundError::QueueFull));
    }
}
