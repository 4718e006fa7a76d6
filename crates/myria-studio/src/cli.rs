use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "myria-studio")]
#[command(about = "Draws the Myria demo quad through the interface pipeline", long_about = None)]
pub struct Cli {
    /// Window title
    #[arg(long, default_value = "Nomads of Myria")]
    pub title: String,

    /// Initial window width in logical pixels
    #[arg(long, default_value_t = 1280)]
    pub width: u32,

    /// Initial window height in logical pixels
    #[arg(long, default_value_t = 720)]
    pub height: u32,

    /// Log filter in env_logger syntax; overrides RUST_LOG
    #[arg(long = "log")]
    pub log_filter: Option<String>,

    /// Sample the texture with linear filtering instead of nearest
    #[arg(long, default_value = "false")]
    pub linear: bool,

    /// Draw both windings
    #[arg(long = "no-cull", default_value = "false")]
    pub no_cull: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::parse_from(["myria-studio"]);
        assert_eq!(cli.title, "Nomads of Myria");
        assert_eq!((cli.width, cli.height), (1280, 720));
        assert!(cli.log_filter.is_none());
        assert!(!cli.linear);
        assert!(!cli.no_cull);
    }

    #[test]
    fn flags() {
        let cli = Cli::parse_from([
            "myria-studio",
            "--width",
            "640",
            "--log",
            "debug",
            "--linear",
            "--no-cull",
        ]);
        assert_eq!(cli.width, 640);
        assert_eq!(cli.log_filter.as_deref(), Some("debug"));
        assert!(cli.linear);
        assert!(cli.no_cull);
    }
}
