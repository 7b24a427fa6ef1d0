pub mod domain;
pub mod engine;
pub mod plan;
pub mod time;

pub mod config {
    use crate::engine::distribute::GrowthVariant;
    use crate::engine::potential::PotentialMethod;
    use crate::plan::PlanningDefaults;
    use anyhow::Context;

    const DEFAULT_PORT: u16 = 3000;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub sentry_dsn: Option<String>,
        pub port: u16,
        pub planning: PlanningDefaults,
        pub worker_concurrency: usize,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Self::from_lookup(|key| std::env::var(key).ok())
        }

        pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
            let defaults = PlanningDefaults::default();

            let method = parse_or_default(&lookup, "BAKEPLAN_DEFAULT_METHOD", defaults.method, |s| {
                PotentialMethod::from_name(s)
            });
            let variant = parse_or_default(&lookup, "BAKEPLAN_DEFAULT_VARIANT", defaults.variant, |s| {
                GrowthVariant::from_name(s)
            });
            let morning_share =
                parse_or_default(&lookup, "BAKEPLAN_MORNING_SHARE", defaults.morning_share, |s| {
                    s.parse::<f64>().ok().filter(|v| (0.0..=1.0).contains(v))
                });

            let cpus = std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1);
            let worker_concurrency =
                parse_or_default(&lookup, "BAKEPLAN_WORKER_CONCURRENCY", cpus, |s| {
                    s.parse::<usize>().ok().filter(|n| *n >= 1)
                });

            let port = match lookup("PORT") {
                Some(s) => s
                    .parse::<u16>()
                    .with_context(|| format!("PORT must be a valid port number (got {s})"))?,
                None => DEFAULT_PORT,
            };

            Ok(Self {
                sentry_dsn: lookup("SENTRY_DSN").filter(|s| !s.trim().is_empty()),
                port,
                planning: PlanningDefaults {
                    method,
                    variant,
                    morning_share,
                },
                worker_concurrency,
            })
        }
    }

    fn parse_or_default<T: std::fmt::Debug>(
        lookup: &impl Fn(&str) -> Option<String>,
        key: &str,
        default: T,
        parse: impl Fn(&str) -> Option<T>,
    ) -> T {
        let Some(raw) = lookup(key) else {
            return default;
        };
        match parse(&raw) {
            Some(v) => v,
            None => {
                tracing::warn!(key, value = %raw, ?default, "invalid setting; using default");
                default
            }
        }
    }

}
