use gridroll::messaging::{Command, Notification};
use gridroll::ui::Modifiers;
use gridroll::{
    ChannelOutput, EditorConfig, EditorSession, Intent, MidiEvent, PointerEvent,
    create_command_channel,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use ringbuf::traits::Consumer;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

// Sized for a full 88-row column switching off and on within one tick
const SOUND_RINGBUFFER_CAPACITY: usize = 512;
const CONFIG_PATH: &str = "gridroll.ron";

fn report(notifications: Vec<Notification>) {
    for notification in notifications {
        println!("  [{:?}] {}", notification.level, notification.message);
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("=== gridroll ===");
    println!("Version {} - headless walkthrough\n", env!("CARGO_PKG_VERSION"));

    let config = match EditorConfig::load_or_default(CONFIG_PATH) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            return;
        }
    };

    // Stand-in for the synthesizer thread: drain note commands and count them
    let (command_tx, mut command_rx) = create_command_channel(SOUND_RINGBUFFER_CAPACITY);
    let sound_thread = thread::spawn(move || {
        let mut notes_on = 0usize;
        loop {
            while let Some(command) = command_rx.try_pop() {
                match command {
                    Command::Midi(MidiEvent::NoteOn { note, velocity }) => {
                        notes_on += 1;
                        log::debug!("synth: note on {} ({})", note, velocity);
                    }
                    Command::Midi(event) => log::trace!("synth: {:?}", event),
                    Command::AllNotesOff => log::debug!("synth: all notes off"),
                    Command::Quit => return notes_on,
                }
            }
            thread::sleep(Duration::from_millis(2));
        }
    });

    let output = Arc::new(ChannelOutput::new(command_tx));
    let mut session = EditorSession::new(config, output.clone());
    let transform = session.transform().clone();

    println!("Drawing a rising line over the first eight beats...");
    for step in 0..8 {
        let world_x = step as f32 + 0.5;
        let world_y = 39.0 + step as f32 + 0.5;
        let pixel = transform.world_to_pixel(world_x, world_y);
        let event = if step == 0 {
            PointerEvent::press(pixel.x, pixel.y)
        } else {
            PointerEvent::drag(pixel.x, pixel.y)
        };
        if let Err(e) = session.handle_pointer(&event) {
            eprintln!("ERROR: {}", e);
        }
    }
    if let Err(e) = session.handle_pointer(&PointerEvent::release(0.0, 0.0)) {
        eprintln!("ERROR: {}", e);
    }
    println!("  {} notes on the grid", session.snapshot().note_count);

    println!("Adding a random accompaniment...");
    let added = session.generate_random_song(&mut StdRng::seed_from_u64(2024), 24);
    println!("  {} random notes", added);

    println!("Summoning the command menu and choosing PLAY...");
    let center = transform.viewport_center();
    let summon = PointerEvent::press(center.x, center.y).with_modifiers(Modifiers::CONTROL);
    let play_sector = PointerEvent::release(center.x - 60.0, center.y + 40.0);
    for event in [summon, play_sector] {
        if let Err(e) = session.handle_pointer(&event) {
            eprintln!("ERROR: {}", e);
            return;
        }
    }

    thread::sleep(Duration::from_millis(600));
    println!("Speeding up to half the tick interval...");
    if let Err(e) = session.apply(Intent::SetTempo { multiplier: 0.5 }) {
        eprintln!("ERROR: {}", e);
    }
    thread::sleep(Duration::from_millis(600));

    let snapshot = session.snapshot();
    println!(
        "  cursor at beat {:?}, tick interval {} ms, {} ticks so far",
        snapshot.play_cursor,
        snapshot.tempo_label,
        session.scheduler().tick_count()
    );

    session.stop();
    println!("Playback stopped.");

    let events = session.export_events();
    println!("Exported {} note events", events.len());

    report(session.drain_notifications());

    // A sound thread that never sees Quit is left behind rather than joined
    if let Err(e) = output.all_notes_off().and_then(|_| output.quit()) {
        eprintln!("ERROR: {}", e);
        return;
    }
    match sound_thread.join() {
        Ok(notes_on) => println!("\nSynth received {} note-on messages", notes_on),
        Err(_) => eprintln!("ERROR: sound thread panicked"),
    }
}
