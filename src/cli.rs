//! Command-line options for the windowed viewer.

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "wavesphere", about = "Animated wave sphere and particle field")]
pub struct Options {
    /// Seed for scene generation; the same seed reproduces the same scene
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Initial window width in pixels
    #[arg(long, default_value_t = 1280)]
    pub width: u32,

    /// Initial window height in pixels
    #[arg(long, default_value_t = 720)]
    pub height: u32,

    /// Disable the FPS instrument
    #[arg(long)]
    pub no_fps: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = Options::parse_from(["wavesphere"]);
        assert_eq!(options.seed, 42);
        assert_eq!(options.width, 1280);
        assert_eq!(options.height, 720);
        assert!(!options.no_fps);
    }

    #[test]
    fn test_overrides() {
        let options =
            Options::parse_from(["wavesphere", "--seed", "7", "--width", "640", "--no-fps"]);
        assert_eq!(options.seed, 7);
        assert_eq!(options.width, 640);
        assert!(options.no_fps);
    }
}
