fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = native::run() {
        eprintln!("project_cli error: {err}");
        std::process::exit(1);
    }
}

mod native {
    use curve_projection::geom::{Point3, ProjectionDiagnostics};
    use curve_projection::{PointProjector, Projection, ProjectionConfig, ThreadingMode};
    use log::{debug, info};
    use serde::Serialize;

    const USAGE: &str = r#"project_cli (curve-projection)

USAGE:
  project_cli <points-file> <x> <y> <z> [options]

The points file holds whitespace-separated x y z triples; the count must be
3n + 1 for n cubic segments.

OPTIONS:
  --config <path>      JSON configuration (tolerance, threading, max_workers)
  --tolerance <eps>    Override the tolerance, in (0, 1)
  --single-thread      Search on the calling thread only
  --workers <n>        Cap the number of worker shards
  --diagnostics        Print solver diagnostics to stderr
  --samples <n>        Also emit n + 1 samples per segment
  --json               Print the result as JSON
  -h, --help           Show this help
"#;

    #[derive(Serialize)]
    struct Report<'a> {
        projection: &'a Projection,
        #[serde(skip_serializing_if = "Option::is_none")]
        diagnostics: Option<&'a ProjectionDiagnostics>,
        #[serde(skip_serializing_if = "Option::is_none")]
        samples: Option<Vec<Point3>>,
    }

    pub fn run() -> Result<(), String> {
        let args: Vec<String> = std::env::args().skip(1).collect();
        let mut args = Args::new(args);

        let mut positional = Vec::new();
        let mut config_path: Option<String> = None;
        let mut tolerance: Option<f64> = None;
        let mut single_thread = false;
        let mut workers: Option<usize> = None;
        let mut show_diagnostics = false;
        let mut samples: Option<usize> = None;
        let mut json = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => config_path = Some(args.value("--config")?),
                "--tolerance" => tolerance = Some(args.parsed("--tolerance")?),
                "--single-thread" => single_thread = true,
                "--workers" => workers = Some(args.parsed("--workers")?),
                "--diagnostics" => show_diagnostics = true,
                "--samples" => samples = Some(args.parsed("--samples")?),
                "--json" => json = true,
                "-h" | "--help" => {
                    println!("{USAGE}");
                    return Ok(());
                }
                other if other.starts_with("--") => {
                    return Err(format!("unknown option `{other}`\n\n{USAGE}"));
                }
                _ => positional.push(arg),
            }
        }

        let [file, x, y, z] = positional.as_slice() else {
            return Err(format!("expected <points-file> <x> <y> <z>\n\n{USAGE}"));
        };
        let query = Point3::new(parse_coord(x)?, parse_coord(y)?, parse_coord(z)?);

        let mut config = match config_path {
            Some(path) => ProjectionConfig::from_json_file(&path).map_err(|e| e.to_string())?,
            None => ProjectionConfig::default(),
        };
        if let Some(eps) = tolerance {
            config.tolerance = eps;
        }
        if single_thread {
            config.threading = ThreadingMode::Single;
        }
        if workers.is_some() {
            config.max_workers = workers;
        }

        let mut projector = PointProjector::native(config).map_err(|e| e.to_string())?;
        projector.route_file(file).map_err(|e| e.to_string())?;
        info!(
            "routed {} segments over {} workers",
            projector.segment_count(),
            projector.worker_count()
        );

        let (projection, diagnostics) = projector
            .localize_with_diagnostics(query)
            .map_err(|e| e.to_string())?;

        if !diagnostics.is_clean() {
            debug!("newton fell back to bisection: {}", diagnostics.summary());
        }
        let samples = samples.map(|steps| projector.sample(steps));

        if json {
            let report = Report {
                projection: &projection,
                diagnostics: show_diagnostics.then_some(&diagnostics),
                samples,
            };
            let text = serde_json::to_string_pretty(&report).map_err(|e| e.to_string())?;
            println!("{text}");
            return Ok(());
        }

        let p = projection.closest;
        println!("closest:   ({}, {}, {})", p.x, p.y, p.z);
        println!("segment:   {}", projection.index);
        println!("parameter: {}", projection.parameter);
        println!("distance:  {}", projection.distance);
        if let Some(samples) = samples {
            for s in samples {
                println!("sample {} {} {}", s.x, s.y, s.z);
            }
        }
        if show_diagnostics {
            eprint!("{diagnostics}");
        }
        Ok(())
    }

    fn parse_coord(text: &str) -> Result<f64, String> {
        text.parse::<f64>()
            .map_err(|e| format!("invalid coordinate `{text}`: {e}"))
    }

    struct Args {
        args: Vec<String>,
        pos: usize,
    }

    impl Args {
        fn new(args: Vec<String>) -> Self {
            Self { args, pos: 0 }
        }

        fn next(&mut self) -> Option<String> {
            let arg = self.args.get(self.pos)?.clone();
            self.pos += 1;
            Some(arg)
        }

        fn value(&mut self, flag: &str) -> Result<String, String> {
            self.next()
                .ok_or_else(|| format!("missing value for {flag}"))
        }

        fn parsed<T>(&mut self, flag: &str) -> Result<T, String>
        where
            T: std::str::FromStr,
            T::Err: std::fmt::Display,
        {
            let raw = self.value(flag)?;
            raw.parse::<T>()
                .map_err(|e| format!("invalid value `{raw}` for {flag}: {e}"))
        }
    }
}
