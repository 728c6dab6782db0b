// src/cli.rs
//! Command-line front end. Every flag has an environment fallback so the
//! tool can run unattended from a scheduled job.

use std::path::PathBuf;

use clap::{ArgAction, Parser};

use crate::{
    config::{
        consts::*,
        options::{AppOptions, Credentials, MapOptions, ResolveOptions, ScrapeOptions, StoreOptions},
    },
    error::{ConfigError, Result},
    log,
    progress::Progress,
    runner,
};

#[derive(Debug, Parser)]
#[command(name = "cli", version, about = "Scrape Tamriel Rebuilt interior claims, locate them and draw the progress map")]
pub struct Args {
    /// When to scrape: always, never (cache only) or if-missing
    #[arg(long, env = "PTR_SCRAPE", default_value = "if-missing")]
    pub scrape: String,

    /// Claims browser listing to start from
    #[arg(long, env = "PTR_URL", default_value = DEFAULT_CLAIMS_URL)]
    pub url: String,

    /// Scrape cache (JSON)
    #[arg(long, env = "PTR_SCRAPEFILE", default_value = DEFAULT_CACHE_FILE)]
    pub cache: PathBuf,

    /// Resolution methods in precedence order: i(mage) t(itle) u(rl) e(rrata)
    #[arg(long, env = "PTR_METHODS", default_value = DEFAULT_METHODS)]
    pub methods: String,

    /// override or fill-only
    #[arg(long, env = "PTR_CORRECTION_POLICY", default_value = "override")]
    pub correction_policy: String,

    /// Directory with url_hints.json, name_hints.json and corrections.json
    #[arg(long, env = "PTR_DATA_DIR", default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,

    /// Background image for the map
    #[arg(long, env = "PTR_MAPFILE", default_value = DEFAULT_MAP_FILE)]
    pub map: PathBuf,

    /// Grid corners of the background: "x_left x_right y_bottom y_top"
    #[arg(long, env = "PTR_MAPCORNERS", default_value = DEFAULT_MAP_CORNERS, allow_hyphen_values = true)]
    pub corners: String,

    /// Map width in pixels
    #[arg(long, env = "PTR_WIDTH", default_value_t = DEFAULT_MAP_WIDTH)]
    pub width: u32,

    /// Colour scale: plasma or viridis
    #[arg(long, env = "PTR_CMAP", default_value = "plasma")]
    pub cmap: String,

    /// Write the map PNG here
    #[arg(short, long, env = "PTR_OUT")]
    pub out: Option<PathBuf>,

    #[arg(long, env = "PTR_LOGIN")]
    pub login: Option<String>,

    #[arg(long, env = "PTR_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Keep coordinates found by earlier runs instead of resolving again.
    /// Kept claims retain their recorded source, so the report may count
    /// methods that are not in --methods.
    #[arg(long)]
    pub keep_resolved: bool,

    /// Print every claim left without a cell
    #[arg(long)]
    pub list_unresolved: bool,

    /// More log output (-v debug, -vv trace); also echoes the log to stderr
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Validate everything up front; nothing is fetched or read yet.
    pub fn into_options(self) -> std::result::Result<AppOptions, ConfigError> {
        let credentials = match (self.login, self.password) {
            (Some(name), Some(password)) => Some(Credentials { name, password }),
            (None, None) => None,
            (Some(_), None) => {
                return Err(ConfigError::Invalid { field: "password", message: s!("--login needs --password") });
            }
            (None, Some(_)) => {
                return Err(ConfigError::Invalid { field: "login", message: s!("--password needs --login") });
            }
        };
        if self.width == 0 {
            return Err(ConfigError::Invalid { field: "width", message: s!("must be at least 1") });
        }

        Ok(AppOptions {
            scrape: ScrapeOptions { mode: self.scrape.parse()?, url: self.url, credentials },
            store: StoreOptions { cache: self.cache, dir: PathBuf::from(STORE_DIR) },
            resolve: ResolveOptions {
                methods: self.methods.parse()?,
                policy: self.correction_policy.parse()?,
                data_dir: self.data_dir,
                keep_resolved: self.keep_resolved,
                ..ResolveOptions::default()
            },
            map: MapOptions {
                background: self.map,
                corners: self.corners.parse()?,
                width: self.width,
                palette: self.cmap.parse()?,
                out: self.out,
            },
        })
    }
}

fn log_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "ptr_claim=info",
        1 => "ptr_claim=debug",
        _ => "ptr_claim=trace",
    }
}

/// Prints phase progress to stderr in 10% steps.
#[derive(Default)]
struct CliProgress {
    phase: String,
    total: usize,
    shown: usize,
    failed: usize,
}

impl Progress for CliProgress {
    fn begin(&mut self, phase: &str, total: usize) {
        self.phase = s!(phase);
        self.total = total;
        self.shown = 0;
        eprintln!("{phase}: {total} item(s)");
    }

    fn log(&mut self, msg: &str) {
        eprintln!("{msg}");
    }

    fn item_done(&mut self, done: usize) {
        if self.total == 0 {
            return;
        }
        let tenth = done * 10 / self.total;
        if tenth > self.shown {
            self.shown = tenth;
            eprintln!("{}: {done}/{}", self.phase, self.total);
        }
    }

    fn item_failed(&mut self, what: &str) {
        self.failed += 1;
        eprintln!("{}: skipped {what}", self.phase);
    }

    fn finish(&mut self) {
        if self.failed > 0 {
            eprintln!("Done ({} item(s) skipped, see {}/{})", self.failed, STORE_DIR, LOG_FILE);
        }
    }
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    let verbose = args.verbose;
    let list_unresolved = args.list_unresolved;
    let opts = args.into_options()?;

    log::init(&opts.store.dir, log_filter(verbose), verbose > 0);

    let mut progress = CliProgress::default();
    let summary = runner::run(&opts, Some(&mut progress))?;

    println!("{}", summary.report);
    if let Some(path) = &summary.map_written {
        println!("Map written to {}", path.display());
    }

    let unresolved = summary.report.unresolved.len();
    if list_unresolved {
        for c in summary.unresolved() {
            println!("{}\t{}\t{}", c.status, c.title, c.id);
        }
    } else if unresolved > 0 {
        println!("{unresolved} claim(s) without a cell (--list-unresolved to show them)");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::methods::MethodTag;
    use crate::render::Palette;
    use crate::resolve::CorrectionPolicy;

    fn parse(extra: &[&str]) -> std::result::Result<AppOptions, ConfigError> {
        let argv = std::iter::once("cli").chain(extra.iter().copied());
        Args::try_parse_from(argv).unwrap().into_options()
    }

    #[test]
    fn flags_map_onto_options() {
        let opts = parse(&[
            "--scrape", "never",
            "--methods", "te",
            "--correction-policy", "fill-only",
            "--corners", "-10 10 -5 5",
            "--cmap", "viridis",
            "-o", "out/map.png",
        ])
        .unwrap();
        assert_eq!(opts.resolve.methods.tags(), &[MethodTag::Title, MethodTag::Correction]);
        assert_eq!(opts.resolve.policy, CorrectionPolicy::FillOnly);
        assert_eq!(opts.map.corners.x_left(), -10);
        assert_eq!(opts.map.palette, Palette::Viridis);
        assert_eq!(opts.map.out, Some(PathBuf::from("out/map.png")));
        assert!(opts.scrape.credentials.is_none());
    }

    #[test]
    fn bad_values_are_config_errors() {
        assert!(matches!(parse(&["--methods", "iz"]), Err(ConfigError::UnknownMethod { found: 'z', .. })));
        assert!(matches!(parse(&["--corners", "5 5 0 1"]), Err(ConfigError::Calibration(_))));
        assert!(matches!(parse(&["--login", "vivec"]), Err(ConfigError::Invalid { field: "password", .. })));
    }

    #[test]
    fn verbosity_selects_filter() {
        assert_eq!(log_filter(0), "ptr_claim=info");
        assert_eq!(log_filter(3), "ptr_claim=trace");
    }
}
