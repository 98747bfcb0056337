use std::{error::Error, path::PathBuf};

use clap::{Parser, Subcommand};
use fisheye_rotation::{Controls, Filter, FisheyeRotation, RenderConfig};

mod viewer;

/// Rotate the fisheye view of 360° images.
#[derive(Debug, Parser)]
#[command(author, version, about = "Fisheye rotation of 360° images")]
struct Args {
    /// Image to open in the viewer.
    #[arg(long)]
    input: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Render one frame to a file without opening a window.
    Render(RenderArgs),
}

#[derive(Debug, clap::Args)]
struct RenderArgs {
    #[arg(long)]
    input: PathBuf,

    #[arg(long)]
    output: PathBuf,

    /// Roll control in [0, 1].
    #[arg(long, default_value_t = 0.5)]
    roll: f32,

    /// Pitch control in [0, 1].
    #[arg(long, default_value_t = 0.5)]
    pitch: f32,

    /// Yaw control in [0, 1].
    #[arg(long, default_value_t = 0.5)]
    yaw: f32,

    /// Optional path to a JSON RenderConfig. Defaults are used if omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Overrides the filter from the config.
    #[arg(long, value_enum)]
    filter: Option<Filter>,
}

fn render_file(args: &RenderArgs) -> fisheye_rotation::Result<()> {
    let mut config = match &args.config {
        Some(path) => RenderConfig::load(path)?,
        None => RenderConfig::default(),
    };
    if let Some(filter) = args.filter {
        config.filter = filter;
    }

    let effect = FisheyeRotation::new();
    effect.set_controls(Controls {
        roll: args.roll,
        pitch: args.pitch,
        yaw: args.yaw,
    })?;

    let input = image::open(&args.input)?.to_rgba8();
    log::info!(
        "loaded {} ({}x{})",
        args.input.display(),
        input.width(),
        input.height()
    );
    let out = effect.process(Some(&input), &config)?;
    out.save(&args.output)?;
    log::info!("wrote {}", args.output.display());
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(err) = try_main() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn try_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    match args.command {
        Some(Command::Render(render)) => render_file(&render)?,
        None => {
            let initial = match &args.input {
                Some(path) => Some(image::open(path)?.to_rgba8()),
                None => None,
            };
            viewer::run(FisheyeRotation::new(), initial)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use image::{Rgba, RgbaImage};

    use super::*;

    const MAGENTA: Rgba<u8> = Rgba([255, 0, 255, 255]);

    fn render_args(dir: &tempfile::TempDir) -> RenderArgs {
        let input = dir.path().join("in.png");
        RgbaImage::from_pixel(64, 64, MAGENTA).save(&input).unwrap();
        RenderArgs {
            input,
            output: dir.path().join("out.png"),
            roll: 0.5,
            pitch: 0.5,
            yaw: 0.5,
            config: None,
            filter: None,
        }
    }

    #[test]
    fn parses_render_command() {
        let args = Args::try_parse_from([
            "fisheye_rotation",
            "render",
            "--input",
            "in.png",
            "--output",
            "out.png",
            "--roll",
            "0.625",
            "--filter",
            "nearest",
        ])
        .unwrap();
        let Some(Command::Render(render)) = args.command else {
            panic!("expected render command");
        };
        assert_eq!(render.roll, 0.625);
        assert_eq!(render.pitch, 0.5);
        assert_eq!(render.filter, Some(Filter::Nearest));
    }

    #[test]
    fn no_command_opens_the_viewer() {
        let args = Args::try_parse_from(["fisheye_rotation"]).unwrap();
        assert!(args.command.is_none());
        assert!(args.input.is_none());
    }

    #[test]
    fn renders_magenta_disk_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let args = render_args(&dir);
        render_file(&args).unwrap();

        let out = image::open(&args.output).unwrap().to_rgba8();
        assert_eq!(out.dimensions(), (64, 64));
        assert_eq!(*out.get_pixel(32, 32), MAGENTA);
        assert_eq!(*out.get_pixel(0, 0), Rgba([0, 0, 0, 0]));
        assert_eq!(*out.get_pixel(63, 63), Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn config_file_sets_output_size() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("config.json");
        std::fs::write(&config, r#"{ "output_size": [20, 10] }"#).unwrap();
        let args = RenderArgs {
            config: Some(config),
            filter: Some(Filter::Nearest),
            ..render_args(&dir)
        };
        render_file(&args).unwrap();

        let out = image::open(&args.output).unwrap().to_rgba8();
        assert_eq!(out.dimensions(), (20, 10));
    }

    #[test]
    fn rejects_out_of_range_control() {
        let dir = tempfile::tempdir().unwrap();
        let args = RenderArgs {
            yaw: 1.5,
            ..render_args(&dir)
        };
        let err = render_file(&args).unwrap_err();
        assert!(matches!(
            err,
            fisheye_rotation::Error::ParameterOutOfRange { name: "Yaw", .. }
        ));
        assert!(!args.output.exists());
    }

    #[test]
    fn missing_input_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let args = RenderArgs {
            input: dir.path().join("absent.png"),
            ..render_args(&dir)
        };
        assert!(render_file(&args).is_err());
    }
}
