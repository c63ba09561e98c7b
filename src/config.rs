// Command-line options. Only device and cadence knobs live here; the look of
// the effect is fixed in code.

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "dot-parting", about = "Sketched dots that part around you, over a live camera feed")]
pub struct Args {
    /// Camera device index (0 = default webcam)
    #[arg(long, default_value_t = 0)]
    pub camera: u32,

    /// Requested capture width; the device may pick the closest it supports
    #[arg(long, default_value_t = 1280)]
    pub width: u32,

    /// Requested capture height
    #[arg(long, default_value_t = 720)]
    pub height: u32,

    /// Window refresh target in frames per second
    #[arg(long, default_value_t = 60)]
    pub fps: usize,

    /// Seed for the special-dot pick and the pen wobble (random if omitted)
    #[arg(long)]
    pub seed: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_a_720p_webcam() {
        let args = Args::try_parse_from(["dot-parting"]).unwrap();
        assert_eq!((args.camera, args.width, args.height, args.fps), (0, 1280, 720, 60));
        assert_eq!(args.seed, None);
    }

    #[test]
    fn flags_override_defaults() {
        let args = Args::try_parse_from(["dot-parting", "--camera", "2", "--width", "640", "--height", "480", "--seed", "9"])
            .unwrap();
        assert_eq!((args.camera, args.width, args.height), (2, 640, 480));
        assert_eq!(args.seed, Some(9));
    }

    #[test]
    fn clap_definition_is_consistent() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
