mod app;
mod command;
mod config;
mod consts;
mod game;
use crate::app::App;
use crate::config::Config;
use crate::game::Simulation;
use anyhow::Context;
use lexopt::{Arg, Parser};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;
use tracing::{error, info};
use tracing_subscriber::{filter::LevelFilter, EnvFilter};

const USAGE: &str = concat!(
    "Usage: gridsnake [-c|--config <file>] [--log-file <file>]\n",
    "\n",
    "Play snake on a grid in the terminal\n",
    "\n",
    "Options:\n",
    "  -c, --config <file>   Read configuration from the given file\n",
    "      --log-file <file> Write logs to the given file\n",
    "  -h, --help            Show this help and exit\n",
    "  -V, --version         Show the program version and exit\n",
);

#[derive(Clone, Debug, Eq, PartialEq)]
enum Mode {
    Run(Arguments),
    Help,
    Version,
}

impl Mode {
    fn from_parser(mut parser: Parser) -> Result<Mode, lexopt::Error> {
        let mut args = Arguments::default();
        while let Some(arg) = parser.next()? {
            match arg {
                Arg::Short('c') | Arg::Long("config") => {
                    args.config = Some(PathBuf::from(parser.value()?));
                }
                Arg::Long("log-file") => {
                    args.log_file = Some(PathBuf::from(parser.value()?));
                }
                Arg::Short('h') | Arg::Long("help") => return Ok(Mode::Help),
                Arg::Short('V') | Arg::Long("version") => return Ok(Mode::Version),
                _ => return Err(arg.unexpected()),
            }
        }
        Ok(Mode::Run(args))
    }
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
struct Arguments {
    config: Option<PathBuf>,
    log_file: Option<PathBuf>,
}

impl Arguments {
    fn run(self) -> anyhow::Result<()> {
        if let Some(path) = self.log_file {
            init_tracing(&path)?;
        }
        let config = match self.config {
            Some(path) => Config::load(&path, false)
                .with_context(|| format!("failed to load {}", path.display()))?,
            None => Config::load(&Config::default_path()?, true)?,
        };
        let sim = Simulation::new(config.scene).context("invalid scene configuration")?;
        info!("Starting game");
        let terminal = ratatui::init();
        let r = App::new(sim).run(terminal);
        ratatui::restore();
        match r {
            Err(e) if e.kind() == ErrorKind::BrokenPipe => Ok(()),
            r => r.context("terminal I/O failed"),
        }
    }
}

/// Send log events to `path`.  Without a log file, nothing is logged, as
/// output to the terminal would corrupt the display.
fn init_tracing(path: &Path) -> anyhow::Result<()> {
    let file = fs_err::File::create(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
        .context("failed to set up logging")
}

fn main() -> ExitCode {
    match Mode::from_parser(Parser::from_env()) {
        Ok(Mode::Run(args)) => match args.run() {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                error!("{e:?}");
                eprintln!("gridsnake: {e:?}");
                ExitCode::from(2)
            }
        },
        Ok(Mode::Help) => {
            print!("{USAGE}");
            ExitCode::SUCCESS
        }
        Ok(Mode::Version) => {
            println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("gridsnake: {e}\n\n{USAGE}");
            ExitCode::from(2)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn parse(args: &[&str]) -> Result<Mode, lexopt::Error> {
        Mode::from_parser(Parser::from_iter(
            std::iter::once("gridsnake").chain(args.iter().copied()),
        ))
    }

    #[test]
    fn no_args() {
        assert_eq!(parse(&[]).unwrap(), Mode::Run(Arguments::default()));
    }

    #[rstest]
    #[case(&["-c", "snake.toml"])]
    #[case(&["--config", "snake.toml"])]
    #[case(&["--config=snake.toml"])]
    fn config_path(#[case] args: &[&str]) {
        assert_eq!(
            parse(args).unwrap(),
            Mode::Run(Arguments {
                config: Some(PathBuf::from("snake.toml")),
                log_file: None,
            })
        );
    }

    #[test]
    fn log_file() {
        assert_eq!(
            parse(&["--log-file", "out.log", "-c", "cfg.toml"]).unwrap(),
            Mode::Run(Arguments {
                config: Some(PathBuf::from("cfg.toml")),
                log_file: Some(PathBuf::from("out.log")),
            })
        );
    }

    #[rstest]
    #[case(&["-h"], Mode::Help)]
    #[case(&["--help"], Mode::Help)]
    #[case(&["-V"], Mode::Version)]
    #[case(&["--version"], Mode::Version)]
    #[case(&["-c", "x.toml", "--help"], Mode::Help)]
    fn info_flags(#[case] args: &[&str], #[case] mode: Mode) {
        assert_eq!(parse(args).unwrap(), mode);
    }

    #[rstest]
    #[case(&["--bogus"])]
    #[case(&["stray"])]
    #[case(&["--config"])]
    fn bad_args(#[case] args: &[&str]) {
        assert!(parse(args).is_err());
    }
}
