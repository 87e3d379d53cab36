//! Rendering of command results as indented, right-aligned log lines.

/// Where rendered lines end up.
#[derive(Debug, Clone)]
pub enum LogOutput {
    Log(log::Level),
    LogTarget(log::Level, String),
    StdOut,
    StdErr,
    #[cfg(feature = "log-to-file")]
    File(std::sync::Arc<parking_lot::Mutex<std::fs::File>>),
}

impl From<log::Level> for LogOutput {
    fn from(value: log::Level) -> Self {
        Self::Log(value)
    }
}

impl LogOutput {
    fn print(&self, msg: &str) {
        match self {
            LogOutput::Log(level) => log::log!(*level, "{}", msg),
            LogOutput::LogTarget(level, target) => {
                log::log!(target: target, *level, "{}", msg)
            }
            LogOutput::StdOut => println!("{}", msg),
            LogOutput::StdErr => eprintln!("{}", msg),
            #[cfg(feature = "log-to-file")]
            LogOutput::File(file) => {
                use std::io::Write;

                let mut file = file.lock();
                file.write_all(msg.as_bytes()).ok();
                file.write_all(b"\n").ok();
            }
        }
    }
}

/// One line of a rendered result: a title, an optional value, and the
/// indentation level.
#[derive(Debug, Clone, PartialEq)]
pub struct LogItem {
    level: usize,
    title: String,
    value: Option<String>,
}

impl LogItem {
    pub fn new<T: Into<String>, V: Into<String>>(level: usize, title: T, value: Option<V>) -> Self {
        Self {
            level,
            title: title.into(),
            value: value.map(Into::into),
        }
    }
}

impl<T: ToString, V: ToString> From<(usize, T, V)> for LogItem {
    fn from((level, title, value): (usize, T, V)) -> Self {
        Self::new(level, title.to_string(), Some(value.to_string()))
    }
}

impl<T: ToString> From<(usize, T)> for LogItem {
    fn from((level, value): (usize, T)) -> Self {
        Self::new::<_, String>(level, value.to_string(), None)
    }
}

pub struct Logger;

impl Logger {
    pub fn log<T>(output: &LogOutput, loggable: &T)
    where
        T: Loggable + ?Sized,
    {
        Self::render(&loggable.as_log())
            .iter()
            .for_each(|line| output.print(line));
    }

    /// Render `items` into lines. The first item is the heading, values of
    /// all other items are aligned on the longest title.
    pub fn render(items: &[LogItem]) -> Vec<String> {
        let mut lines = Vec::with_capacity(items.len());

        if let Some(v) = items.first() {
            lines.push(v.title.clone());
        }

        let right_align = items
            .iter()
            .skip(1)
            .map(|v| v.title.len())
            .max()
            .unwrap_or(0);

        for LogItem {
            level,
            title,
            value,
        } in items.iter().skip(1)
        {
            let front_padding = " ".repeat(level * 2);

            let line = match value {
                Some(value) if !value.is_empty() => {
                    let value_padding = " ".repeat(right_align - title.len());
                    format!("{front_padding}{title}: {value_padding}{value}")
                }
                _ => format!("{front_padding}{title}"),
            };

            lines.push(line);
        }

        lines
    }
}

pub trait Loggable {
    fn as_log(&self) -> Vec<LogItem>;
}

#[macro_export]
macro_rules ! log_vec {
    [$($msg:tt)*] => {
        $crate::to_log!(vec: $($msg)*)
    }
}

#[macro_export]
macro_rules! to_log {
    ([$($array:tt)*],) => {
        vec![$($array)*]
    };

    ([$($array:tt)*], ($level:literal, $title:expr, $value:expr)) => {
        $crate::to_log!([$($array)* ($level, $title, $value).into(),],)
    };

    ([$($array:tt)*], ($level:literal, $title:expr)) => {
        $crate::to_log!([$($array)* ($level, $title, "").into(),],)
    };

    ([$($array:tt)*], ($level:literal, $title:expr, $value:expr), $($msg:tt)*) => {
        $crate::to_log!([$($array)* ($level, $title, $value).into(),], $($msg)*)
    };

    ([$($array:tt)*], ($level:literal, $title:expr), $($msg:tt)*) => {
        $crate::to_log!([$($array)* ($level, $title, "").into(),], $($msg)*)
    };

    (vec: $($msg:tt)*) => {
        $crate::to_log!([], $($msg)*)
    };
}

#[test]
fn render_aligns_values() {
    let items: Vec<LogItem> = log_vec![
        (0, "Heading"),
        (1, "Short", 1),
        (1, "Much longer", "x"),
    ];

    assert_eq!(
        Logger::render(&items),
        vec![
            "Heading".to_string(),
            "  Short:       1".to_string(),
            "  Much longer: x".to_string(),
        ]
    );
}

#[cfg(feature = "log-to-file")]
#[test]
fn file_output_writes_lines() {
    struct Reading;

    impl Loggable for Reading {
        fn as_log(&self) -> Vec<LogItem> {
            log_vec![(0, "Reading"), (1, "Value", 42)]
        }
    }

    let path = std::env::temp_dir().join(format!("ipmi-dispatch-log-{}", std::process::id()));
    let file = std::fs::File::create(&path).unwrap();
    let output = LogOutput::File(std::sync::Arc::new(parking_lot::Mutex::new(file)));

    Logger::log(&output, &Reading);
    drop(output);

    let written = std::fs::read_to_string(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(written, "Reading\n  Value: 42\n");
}
