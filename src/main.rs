//! boxtag command line: inspect and repair annotation files next to images.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use boxtag::config::{ConfigError, EditorConfig, LogLevel};
use boxtag::format::FormatError;
use boxtag::session::SessionSettings;
use boxtag::storage;
use clap::{ArgAction, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "boxtag",
    version,
    about = "Check, repair and list YOLO-style box annotations"
)]
struct Cli {
    /// Config file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More log output, repeat for more
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Report malformed lines in the annotation files of the given images
    Check {
        #[arg(required = true)]
        images: Vec<PathBuf>,
    },
    /// Rewrite annotation files, dropping malformed lines and clamping boxes
    Fix {
        #[arg(required = true)]
        images: Vec<PathBuf>,
    },
    /// List images in a folder with their box counts
    List { dir: PathBuf },
    /// Manage the configuration file
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default configuration
    Init {
        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the configuration in effect
    Show,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Usage(String),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref(), &cli.command) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };
    init_logging(&cli, config.preferences.log_level);

    match run(&cli, &config) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(cli: &Cli, configured: LogLevel) {
    let level = if cli.quiet {
        LogLevel::Error
    } else {
        configured.shifted(i32::from(cli.verbose))
    };
    env_logger::Builder::new()
        .filter_level(level.to_level_filter())
        .format_timestamp(None)
        .init();
}

/// Explicit path must exist; the default path falls back to defaults.
///
/// `config init` writes the file instead of reading it, so it always starts
/// from defaults.
fn load_config(path: Option<&Path>, command: &Commands) -> Result<EditorConfig, ConfigError> {
    if matches!(command, Commands::Config(ConfigCommand::Init { .. })) {
        return Ok(EditorConfig::default());
    }
    match path {
        Some(path) => EditorConfig::load(path),
        None => Ok(EditorConfig::load_from_default_path().unwrap_or_default()),
    }
}

/// Returns `Ok(false)` when the command ran but found problems.
fn run(cli: &Cli, config: &EditorConfig) -> Result<bool, CliError> {
    let settings = SessionSettings::from(config);
    match &cli.command {
        Commands::Check { images } => check(images, &settings),
        Commands::Fix { images } => fix(images, &settings),
        Commands::List { dir } => list(dir, &settings),
        Commands::Config(ConfigCommand::Init { force }) => {
            config_init(cli.config.as_deref(), *force)
        }
        Commands::Config(ConfigCommand::Show) => {
            println!("{}", config.to_json().map_err(ConfigError::from)?);
            Ok(true)
        }
    }
}

fn check(images: &[PathBuf], settings: &SessionSettings) -> Result<bool, CliError> {
    let mut clean = true;
    for image in images {
        let (session, warnings) = storage::open_session(image, settings.clone())?;
        println!(
            "{}: {} boxes, {} malformed lines",
            image.display(),
            session.document().len(),
            warnings.len()
        );
        for warning in &warnings {
            println!("  {}", warning);
        }
        clean &= warnings.is_empty();
    }
    Ok(clean)
}

fn fix(images: &[PathBuf], settings: &SessionSettings) -> Result<bool, CliError> {
    for image in images {
        let (mut session, warnings) = storage::open_session(image, settings.clone())?;
        if session.document().is_empty() && !storage::annotation_path_for(image).exists() {
            println!("{}: no annotation file, skipped", image.display());
            continue;
        }
        storage::save_session(&mut session, image)?;
        println!(
            "{}: kept {} boxes, dropped {} lines",
            image.display(),
            session.document().len(),
            warnings.len()
        );
    }
    Ok(true)
}

fn list(dir: &Path, settings: &SessionSettings) -> Result<bool, CliError> {
    let folder = storage::ImageFolder::open(dir)?;
    for image in folder.images() {
        let (session, warnings) = storage::open_session(image, settings.clone())?;
        let marker = if warnings.is_empty() { "" } else { " (!)" };
        println!(
            "{}\t{}{}",
            session.document().len(),
            image.display(),
            marker
        );
    }
    println!("{} images", folder.len());
    Ok(true)
}

fn config_init(path: Option<&Path>, force: bool) -> Result<bool, CliError> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => EditorConfig::default_path()
            .ok_or_else(|| CliError::Usage("could not determine config directory".into()))?,
    };
    if path.exists() && !force {
        return Err(CliError::Usage(format!(
            "{} already exists, use --force to overwrite",
            path.display()
        )));
    }
    EditorConfig::default().save(&path)?;
    println!("Wrote {}", path.display());
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Scratch directory removed on drop.
    struct TempDir(PathBuf);

    impl TempDir {
        fn new(name: &str) -> Self {
            let path =
                std::env::temp_dir().join(format!("boxtag-cli-{}-{}", name, std::process::id()));
            let _ = std::fs::remove_dir_all(&path);
            std::fs::create_dir_all(&path).unwrap();
            Self(path)
        }
    }

    impl Drop for TempDir {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.0);
        }
    }

    #[test]
    fn test_config_init_with_explicit_path() {
        let dir = TempDir::new("init");
        let path = dir.0.join("new-config.json");
        let cli = Cli::try_parse_from([
            "boxtag",
            "--config",
            path.to_str().unwrap(),
            "config",
            "init",
        ])
        .unwrap();

        let config = load_config(cli.config.as_deref(), &cli.command).unwrap();
        assert_eq!(config, EditorConfig::default());
        assert!(run(&cli, &config).unwrap());
        assert_eq!(EditorConfig::load(&path).unwrap(), EditorConfig::default());

        // A second init needs --force
        assert!(matches!(run(&cli, &config), Err(CliError::Usage(_))));
    }

    #[test]
    fn test_missing_explicit_config_fails_for_other_commands() {
        let dir = TempDir::new("show");
        let path = dir.0.join("absent.json");
        let cli = Cli::try_parse_from([
            "boxtag",
            "--config",
            path.to_str().unwrap(),
            "config",
            "show",
        ])
        .unwrap();

        assert!(matches!(
            load_config(cli.config.as_deref(), &cli.command),
            Err(ConfigError::IoError(_))
        ));
    }

    #[test]
    fn test_fix_skips_images_without_annotations() {
        let dir = TempDir::new("fix");
        let bare = dir.0.join("bare.png");
        let labelled = dir.0.join("labelled.png");
        for path in [&bare, &labelled] {
            image::RgbImage::new(100, 100).save(path).unwrap();
        }
        std::fs::write(dir.0.join("labelled.txt"), "car 0.5 0.5 0.2 0.2\nbroken").unwrap();

        assert!(fix(&[bare, labelled], &SessionSettings::default()).unwrap());
        assert!(!dir.0.join("bare.txt").exists());
        assert_eq!(
            std::fs::read_to_string(dir.0.join("labelled.txt")).unwrap(),
            "car 0.500000 0.500000 0.200000 0.200000"
        );
    }
}
