use crate::report::{QueryReport, Report, Versions};
use crate::Analyzer;
use query_analyzer_schema::SchemaModel;
use query_analyzer_syntax::QuerySource;
use std::num::NonZeroUsize;
use std::sync::Arc;
use threadpool::ThreadPool;

/// Analyzes many queries in parallel against one pair of schemas.
///
/// Schemas are shared read-only between workers. Results come back in input
/// order regardless of which worker finished first.
#[derive(Debug, Clone)]
pub struct BatchAnalyzer {
    current: Arc<SchemaModel>,
    target: Arc<SchemaModel>,
    versions: Arc<Versions>,
    workers: usize,
}

impl BatchAnalyzer {
    #[must_use]
    pub fn new(current: Arc<SchemaModel>, target: Arc<SchemaModel>, versions: Versions) -> Self {
        let workers = std::thread::available_parallelism().map_or(1, NonZeroUsize::get);
        Self {
            current,
            target,
            versions: Arc::new(versions),
            workers,
        }
    }

    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    #[must_use]
    pub fn run(&self, sources: Vec<QuerySource>) -> Report {
        self.run_with_progress(sources, |_, _| {})
    }

    /// Like [`run`](Self::run), calling `on_progress(done, total)` as each
    /// query completes.
    #[tracing::instrument(skip_all, fields(queries = sources.len(), workers = self.workers))]
    pub fn run_with_progress(
        &self,
        sources: Vec<QuerySource>,
        mut on_progress: impl FnMut(usize, usize),
    ) -> Report {
        let total = sources.len();
        let pool = ThreadPool::new(self.workers.min(total.max(1)));
        let (sender, receiver) = crossbeam_channel::unbounded::<(usize, QueryReport)>();

        for (index, source) in sources.into_iter().enumerate() {
            let sender = sender.clone();
            let current = Arc::clone(&self.current);
            let target = Arc::clone(&self.target);
            let versions = Arc::clone(&self.versions);
            pool.execute(move || {
                let report = Analyzer::new(&current, &target, &versions).analyze(&source);
                let _ = sender.send((index, report));
            });
        }
        drop(sender);

        let mut results = Vec::with_capacity(total);
        for result in &receiver {
            results.push(result);
            on_progress(results.len(), total);
        }

        if results.len() < total {
            tracing::warn!(
                expected = total,
                received = results.len(),
                panicked = pool.panic_count(),
                "Some queries were not analyzed"
            );
        }

        results.sort_by_key(|(index, _)| *index);
        let queries = results.into_iter().map(|(_, report)| report).collect();
        Report::new((*self.versions).clone(), queries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use query_analyzer_test_utils::sdl_to_introspection;

    fn schema(sdl: &str) -> Arc<SchemaModel> {
        Arc::new(query_analyzer_schema::build_schema(&sdl_to_introspection(sdl)).unwrap())
    }

    #[test]
    fn test_results_in_input_order() {
        let current = schema("type Query { a: Int b: Int @deprecated }");
        let target = schema("type Query { a: Int }");
        let sources: Vec<_> = (0..40)
            .map(|i| {
                let text = if i % 2 == 0 { "{ a }" } else { "{ b }" };
                QuerySource::new(text, format!("q{i:02}.graphql"))
            })
            .collect();

        let mut progress = Vec::new();
        let report = BatchAnalyzer::new(current, target, Versions::new("old", "new"))
            .with_workers(4)
            .run_with_progress(sources, |done, total| progress.push((done, total)));

        assert_eq!(report.queries.len(), 40);
        for (i, query) in report.queries.iter().enumerate() {
            assert_eq!(&*query.origin.file, format!("q{i:02}.graphql"));
        }
        assert_eq!(report.summary.valid, 20);
        assert_eq!(report.summary.breaking, 20);
        assert_eq!(progress.last(), Some(&(40, 40)));
    }

    #[test]
    fn test_empty_batch() {
        let s = schema("type Query { a: Int }");
        let report = BatchAnalyzer::new(Arc::clone(&s), s, Versions::default()).run(Vec::new());
        assert_eq!(report.summary.total_queries, 0);
        assert_eq!(report.exit_code(), 0);
    }
}
