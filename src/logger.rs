use log::{
    Level,
    LevelFilter,
    Log,
    Metadata,
    Record,
};

/// Writes log records to stderr, colorized when stderr is a terminal.
struct Logger {
    pretty: bool,
}

impl Logger {
    /// Name and ANSI color of a level.
    fn label(level: Level) -> (&'static str, u8) {
        match level {
            Level::Error => ("error", 31),
            Level::Warn => ("warn", 35),
            Level::Info => ("info", 33),
            Level::Debug => ("debug", 36),
            Level::Trace => ("trace", 34),
        }
    }
}

impl Log for Logger {
    fn enabled(&self, _: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        let (name, color) = Logger::label(record.level());

        // Engine internals are noisy; say where they came from.
        let target = if record.level() >= Level::Debug {
            format!(" [{}]", record.target())
        } else {
            String::new()
        };

        if self.pretty {
            eprintln!("\x1b[1m\x1b[{}m{}\x1b[0m{}: {}", color, name, target, record.args());
        } else {
            eprintln!("{}{}: {}", name, target, record.args());
        }
    }

    fn flush(&self) {}
}

pub fn init() {
    let pretty = atty::is(atty::Stream::Stderr);

    if log::set_boxed_logger(Box::new(Logger { pretty })).is_err() {
        return;
    }

    log::set_max_level(LevelFilter::Warn);

    if pretty {
        log::debug!("tty detected, pretty logging is enabled");
    } else {
        log::debug!("stderr is not a tty, pretty logging is disabled");
    }
}

pub fn verbose(verbosity: u8) {
    log::set_max_level(match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    });
}

pub fn quiet() {
    log::set_max_level(LevelFilter::Off);
}
