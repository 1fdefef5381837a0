use crate::routing::Routing;
use engine::{Engine, EtlResult, EtlService};
use error::AdapterError;
use serde::Serialize;
use tracing::{error, info, warn};
use util::MappingConfig;

pub const TASK_NOT_FOUND: &str = "Task not found";

/// Outcome of importing a single config.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EtlOutcome {
    pub key: String,
    pub result: EtlResult,
}

/// Per config outcomes of one import request, in config order.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct EtlReport {
    pub outcomes: Vec<EtlOutcome>,
}

impl EtlReport {
    pub fn succeeded(&self) -> bool {
        !self.outcomes.is_empty() && self.outcomes.iter().all(|o| o.result.succeeded)
    }

    pub fn failed(&self) -> impl Iterator<Item = &EtlOutcome> {
        self.outcomes.iter().filter(|o| !o.result.succeeded)
    }

    /// Flattens the report into the single result operators see. Every message is terminated
    /// by a newline and lands in the error message as soon as one import failed.
    pub fn into_result(self) -> EtlResult {
        if self.outcomes.is_empty() {
            return EtlResult::failure(TASK_NOT_FOUND);
        }
        let message = self
            .outcomes
            .iter()
            .map(|o| format!("{}\n", o.result.message()))
            .collect::<String>();

        if self.succeeded() {
            EtlResult::success(message)
        } else {
            EtlResult::failure(message)
        }
    }
}

/// How a task name resolved.
#[derive(Debug)]
pub enum EtlRun {
    /// the task named a config
    Single(EtlOutcome),
    /// the task named a destination, possibly without any config
    Group(EtlReport),
}

impl EtlRun {
    pub fn into_result(self) -> EtlResult {
        match self {
            EtlRun::Single(outcome) => outcome.result,
            EtlRun::Group(report) => report.into_result(),
        }
    }
}

/// Resolves `task` as a config key first and as a destination second and imports what it
/// resolved to. Failed imports are part of the result, only importer errors are returned as
/// `Err`. An importer error stops a destination run, configs after it are not imported and the
/// configs imported before it are logged.
pub async fn resolve_and_run(
    routing: &Routing,
    engine: &Engine,
    importer: &dyn EtlService,
    task: &str,
    params: &[String],
) -> Result<EtlRun, AdapterError> {
    if let Some(config) = routing.config(task) {
        let outcome = import(engine, importer, config, params).await?;
        return Ok(EtlRun::Single(outcome));
    }

    let mut report = EtlReport::default();
    for config in routing.by_destination(task) {
        match import(engine, importer, config, params).await {
            Ok(outcome) => report.outcomes.push(outcome),
            Err(err) => {
                let done = report.outcomes.iter().map(|o| o.key.as_str()).collect::<Vec<_>>();
                error!(
                    "Import of destination {} aborted at {}, already imported: [{}]",
                    task,
                    config.key,
                    done.join(", ")
                );
                return Err(err);
            }
        }
    }

    if report.outcomes.is_empty() {
        warn!("No config or destination named {}", task);
    } else {
        info!(
            "Imported destination {}: {} of {} configs failed",
            task,
            report.failed().count(),
            report.outcomes.len()
        );
    }
    Ok(EtlRun::Group(report))
}

async fn import(
    engine: &Engine,
    importer: &dyn EtlService,
    config: &MappingConfig,
    params: &[String],
) -> Result<EtlOutcome, AdapterError> {
    info!("Importing {} into {}", config.key, config.mapping.index);
    let result = importer.import(engine, config, params).await?;
    if !result.succeeded {
        warn!("Import of {} failed: {}", config.key, result.message());
    }
    Ok(EtlOutcome {
        key: config.key.clone(),
        result,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::schema::JdbcSchemaResolver;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use tracing_test::traced_test;
    use util::{DataSource, DataSourceRegistry};

    /// Returns canned results per config key and remembers the import order.
    #[derive(Default)]
    pub(crate) struct ScriptedEtl {
        pub(crate) results: HashMap<String, EtlResult>,
        pub(crate) broken: Option<String>,
        pub(crate) imported: Mutex<Vec<(String, Vec<String>)>>,
    }

    impl ScriptedEtl {
        pub(crate) fn with(mut self, key: &str, result: EtlResult) -> Self {
            self.results.insert(key.to_string(), result);
            self
        }
    }

    #[async_trait]
    impl EtlService for ScriptedEtl {
        async fn import(
            &self,
            _: &Engine,
            config: &MappingConfig,
            params: &[String],
        ) -> anyhow::Result<EtlResult> {
            if self.broken.as_deref() == Some(config.key.as_str()) {
                anyhow::bail!("source database unreachable")
            }
            self.imported.lock().push((config.key.clone(), params.to_vec()));
            Ok(self
                .results
                .get(&config.key)
                .cloned()
                .unwrap_or_else(|| EtlResult::success(format!("imported {}", config.key))))
        }
    }

    pub(crate) fn routing() -> Routing {
        let registry = DataSourceRegistry::new()
            .with("ds", DataSource::url("jdbc:mysql://127.0.0.1:3306/s?useSSL=false"));
        let configs = vec![
            MappingConfig::new("A", "ds", "grp", "a", "select id from t1").unwrap(),
            MappingConfig::new("B", "ds", "grp", "b", "select a.id from t1 a join t2 b on b.id = a.id")
                .unwrap(),
            MappingConfig::new("C", "ds", "solo", "c", "select id from t3").unwrap(),
            // a config whose key collides with a destination name
            MappingConfig::new("grp2", "ds", "grp", "d", "select id from t4").unwrap(),
            MappingConfig::new("E", "ds", "grp2", "e", "select id from t5").unwrap(),
        ];
        Routing::build(configs, None, &registry, &JdbcSchemaResolver).unwrap()
    }

    async fn run(importer: &ScriptedEtl, task: &str) -> EtlResult {
        resolve_and_run(&routing(), &Engine::memory(), importer, task, &[])
            .await
            .unwrap()
            .into_result()
    }

    #[tokio::test]
    async fn exact_key_returns_its_own_result() {
        let importer = ScriptedEtl::default()
            .with("A", EtlResult::success("A: 10 rows"))
            .with("B", EtlResult::failure("B: broken"));

        let res = run(&importer, "A").await;

        assert_eq!(res, EtlResult::success("A: 10 rows"));
        assert_eq!(importer.imported.lock().len(), 1);
    }

    #[tokio::test]
    async fn key_wins_over_destination() {
        let importer = ScriptedEtl::default();
        let res = run(&importer, "grp2").await;

        assert_eq!(res, EtlResult::success("imported grp2"));
        let imported = importer.imported.lock();
        assert_eq!(imported.len(), 1);
        assert_eq!(imported[0].0, "grp2");
    }

    #[tokio::test]
    async fn destination_runs_every_member_in_order() {
        let importer = ScriptedEtl::default();
        let params = vec!["2024-01-01".to_string()];

        let run = resolve_and_run(&routing(), &Engine::memory(), &importer, "grp", &params)
            .await
            .unwrap();

        let EtlRun::Group(report) = run else {
            panic!("destination should run as group")
        };
        let keys = report.outcomes.iter().map(|o| o.key.as_str()).collect::<Vec<_>>();
        assert_eq!(keys, vec!["A", "B", "grp2"]);
        assert!(report.succeeded());
        assert!(importer.imported.lock().iter().all(|(_, p)| p == &params));

        let res = report.into_result();
        assert!(res.succeeded);
        assert_eq!(
            res.result_message.as_deref(),
            Some("imported A\nimported B\nimported grp2\n")
        );
        assert_eq!(res.error_message, None);
    }

    #[tokio::test]
    async fn partial_failure_fails_with_all_messages() {
        let importer = ScriptedEtl::default()
            .with("A", EtlResult::success("A: 10 rows"))
            .with("B", EtlResult::failure("B: connection reset"));

        let run = resolve_and_run(&routing(), &Engine::memory(), &importer, "grp", &[])
            .await
            .unwrap();
        let EtlRun::Group(report) = run else {
            panic!("destination should run as group")
        };
        let failed = report.failed().map(|o| o.key.as_str()).collect::<Vec<_>>();
        assert_eq!(failed, vec!["B"]);

        let res = report.into_result();
        assert!(!res.succeeded);
        assert_eq!(res.result_message, None);
        let message = res.error_message.unwrap();
        assert!(message.contains("A: 10 rows"));
        assert!(message.contains("B: connection reset"));
    }

    #[tokio::test]
    async fn unknown_task() {
        let importer = ScriptedEtl::default();
        let res = run(&importer, "no-such-task").await;

        assert_eq!(res, EtlResult::failure(TASK_NOT_FOUND));
        assert!(importer.imported.lock().is_empty());
    }

    #[tokio::test]
    async fn importer_errors_propagate() {
        let importer = ScriptedEtl {
            broken: Some("B".to_string()),
            ..Default::default()
        };

        let err = resolve_and_run(&routing(), &Engine::memory(), &importer, "grp", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, AdapterError::Downstream(_)));
    }

    #[tokio::test]
    #[traced_test]
    async fn importer_error_stops_destination_run() {
        let importer = ScriptedEtl {
            broken: Some("B".to_string()),
            ..Default::default()
        };

        let res = resolve_and_run(&routing(), &Engine::memory(), &importer, "grp", &[]).await;

        assert!(res.is_err());
        let imported = importer.imported.lock();
        assert_eq!(imported.iter().map(|(k, _)| k.as_str()).collect::<Vec<_>>(), vec!["A"]);
        assert!(logs_contain("aborted at B, already imported: [A]"));
    }

    #[test]
    fn empty_report_is_not_a_success() {
        let report = EtlReport::default();
        assert!(!report.succeeded());
        assert_eq!(report.into_result(), EtlResult::failure(TASK_NOT_FOUND));
    }
}
