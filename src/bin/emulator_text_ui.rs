use clap::Parser;
use crossbeam_channel::{bounded, Receiver, Sender};
use cursive::{
    view::Nameable,
    views::{Dialog, LinearLayout, TextView},
    CbSink, Cursive,
};
use log::{info, LevelFilter};
use std::path::{Path, PathBuf};
use std::time::Duration;

use chip_8_interpreter::chip::{
    chip8::{
        cursive_display::{Display, DISPLAY_VIEW_NAME},
        Chip8,
    },
    Chip, Chip8Error, ChipWithCursiveDisplay,
};

/// Name under which the status line is registered in the cursive tree.
const STATUS_VIEW_NAME: &str = "status";

/// Runs a CHIP-8 program in the terminal.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Path to the program to load.
    rom: PathBuf,

    /// Pause between two interpreter steps, in microseconds.
    #[arg(long, default_value_t = 2500)]
    cycle_delay_us: u64,

    /// Maximum level of log messages shown in the debug console (toggle with `~`).
    #[arg(long, default_value_t = LevelFilter::Info)]
    log_level: LevelFilter,
}

/// Error type for errors that occur while loading the program given on the
/// command line.
enum Error {
    CouldNotReadFile(PathBuf, std::io::Error),
    InvalidProgram(Chip8Error),
}

/// Represents an event to be processed by the event loop. It is generic
/// over the type representing the pressed key.
enum Event<T> {
    /// Occurs when the key passed in the enum value was pressed.
    Key(T),

    /// Indicates that all keys are released. The terminal only reports key
    /// presses, so one key is assigned to releasing all keys.
    KeyRelease,

    /// Decreases the sleep time after each cycle.
    SpeedUp,

    /// Increases the sleep time after each cycle.
    SlowDown,

    /// Shut down.
    Quit,
}

/// Represents the channels available to the event loop. It is generic
/// over the type representing the pressed keys.
#[derive(Clone)]
struct EventLoopChannels<T> {
    /// The channel to send the UI refresh messages to.
    gfx_sender: CbSink,

    /// The channel on which the Events are received.
    key_receiver: Receiver<Event<T>>,

    /// A channel to report that the thread has completed
    /// shutdown.
    shutdown_sender: Sender<()>,
}

/// The event loop. Constantly loops over (1) process event if there
/// is any. (2) Step the chip. (3) Update the UI. (4) Sleep
/// for the cycle delay. (5) Start over. Once a step fails the chip is no
/// longer stepped and the loop only waits for the quit event.
fn event_loop<T, P>(mut chip: T, io_channels: EventLoopChannels<P>, mut cycle_delay: u64)
where
    T: Chip<PinAddress = P> + ChipWithCursiveDisplay,
    T::Error: std::fmt::Display,
{
    let mut running = true;
    let mut beeping = false;
    loop {
        let event = if running {
            io_channels.key_receiver.try_recv().ok()
        } else {
            io_channels.key_receiver.recv().ok()
        };

        match event {
            Some(Event::Key(key)) => {
                chip.set_key(key, true);
            }
            Some(Event::KeyRelease) => {
                chip.reset_keys();
            }
            Some(Event::Quit) => {
                let _ = io_channels.shutdown_sender.send(());
                return;
            }
            Some(Event::SpeedUp) => {
                cycle_delay = cycle_delay.saturating_sub(500);
            }
            Some(Event::SlowDown) => {
                cycle_delay += 500;
            }
            // All senders are gone, nobody is left to ask for a shutdown.
            None if !running => return,
            None => { /* do nothing */ }
        };

        if !running {
            continue;
        }

        if let Err(e) = chip.step() {
            running = false;
            let message = e.to_string();
            let _ = io_channels.gfx_sender.send(Box::new(move |s: &mut Cursive| {
                s.add_layer(Dialog::info(format!("The machine halted: {}", message)));
            }));
            continue;
        }
        chip.update_ui(&io_channels.gfx_sender);

        if beeping != (chip.sound_timer() > 0) {
            beeping = !beeping;
            let status = if beeping { "♪ BEEP" } else { "" };
            let _ = io_channels.gfx_sender.send(Box::new(move |s: &mut Cursive| {
                s.call_on_name(STATUS_VIEW_NAME, |view: &mut TextView| view.set_content(status));
            }));
        }

        std::thread::sleep(Duration::from_micros(cycle_delay));
    }
}

/// Reads the program at `path` and loads it into `chip8`.
fn load_program_from_file(chip8: &mut Chip8, path: &Path) -> Result<usize, Error> {
    let program =
        std::fs::read(path).map_err(|e| Error::CouldNotReadFile(path.to_path_buf(), e))?;
    chip8.load_program(&program).map_err(Error::InvalidProgram)
}

/// Constructs the UI and spawns the event loop and the UI thread.
fn main() {
    let args = Args::parse();

    cursive::logger::init();
    log::set_max_level(args.log_level);

    let mut chip8 = Chip8::new();
    match load_program_from_file(&mut chip8, &args.rom) {
        Ok(size) => info!("loaded {} ({} bytes)", args.rom.display(), size),
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }

    let mut siv = cursive::default();

    let cb_sink = siv.cb_sink().clone();
    let (key_sender, key_receiver) = bounded::<Event<u8>>(10);
    let (shutdown_sender, shutdown_receiver) = bounded::<()>(1);

    let cycle_delay = args.cycle_delay_us;
    std::thread::spawn(move || {
        event_loop(
            chip8,
            EventLoopChannels {
                gfx_sender: cb_sink,
                key_receiver,
                shutdown_sender,
            },
            cycle_delay,
        );
    });

    let sender = key_sender.clone();
    siv.add_global_callback(cursive::event::Key::Esc, move |s| {
        if sender.send(Event::Quit).is_ok() {
            let _ = shutdown_receiver.recv();
        }
        s.quit();
    });

    for (i, j) in &[
        ('1', 0x1),
        ('2', 0x2),
        ('3', 0x3),
        ('4', 0xC),
        ('q', 0x4),
        ('w', 0x5),
        ('e', 0x6),
        ('r', 0xD),
        ('a', 0x7),
        ('s', 0x8),
        ('d', 0x9),
        ('f', 0xE),
        ('z', 0xA),
        ('x', 0x0),
        ('c', 0xB),
        ('v', 0xF),
    ] {
        let sender = key_sender.clone();
        let key = *j as u8;
        siv.add_global_callback(*i, move |_s| {
            let _ = sender.send(Event::Key(key));
        });
    }

    let sender = key_sender.clone();
    siv.add_global_callback(' ', move |_s| {
        let _ = sender.send(Event::KeyRelease);
    });

    let sender = key_sender.clone();
    siv.add_global_callback(cursive::event::Key::Up, move |_s| {
        let _ = sender.send(Event::SpeedUp);
    });

    let sender = key_sender;
    siv.add_global_callback(cursive::event::Key::Down, move |_s| {
        let _ = sender.send(Event::SlowDown);
    });

    siv.add_global_callback('~', Cursive::toggle_debug_console);

    siv.add_layer(
        LinearLayout::vertical()
            .child(Display::default().with_name(DISPLAY_VIEW_NAME))
            .child(TextView::new("").with_name(STATUS_VIEW_NAME)),
    );

    siv.run();
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::CouldNotReadFile(path, e) => {
                write!(f, "Could not read {}: {}", path.display(), e)
            }
            Error::InvalidProgram(error) => write!(f, "{}", error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["emulator_text_ui", "pong.ch8"]).unwrap();
        assert_eq!(args.rom, PathBuf::from("pong.ch8"));
        assert_eq!(args.cycle_delay_us, 2500);
        assert_eq!(args.log_level, LevelFilter::Info);
    }

    #[test]
    fn test_args_log_level() {
        let args = Args::try_parse_from([
            "emulator_text_ui",
            "pong.ch8",
            "--log-level",
            "debug",
            "--cycle-delay-us",
            "1000",
        ])
        .unwrap();
        assert_eq!(args.log_level, LevelFilter::Debug);
        assert_eq!(args.cycle_delay_us, 1000);
        let invalid = ["emulator_text_ui", "pong.ch8", "--log-level", "loud"];
        assert!(Args::try_parse_from(invalid).is_err());
    }
}
