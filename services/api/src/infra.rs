use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use teaching_eval::config::ScoringConfig;
use teaching_eval::workflows::evaluation::{
    EvaluationService, InMemoryEvaluationRepository, InMemoryNotificationPublisher, ScoringPolicy,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type InMemoryEvaluationService =
    EvaluationService<InMemoryEvaluationRepository, InMemoryNotificationPublisher>;

/// Process-local service; state lives for the lifetime of the binary.
pub(crate) fn in_memory_service(
    scoring: &ScoringConfig,
) -> (
    Arc<InMemoryEvaluationService>,
    Arc<InMemoryEvaluationRepository>,
    Arc<InMemoryNotificationPublisher>,
) {
    let repository = Arc::new(InMemoryEvaluationRepository::default());
    let notices = Arc::new(InMemoryNotificationPublisher::default());
    let service = EvaluationService::new(
        repository.clone(),
        notices.clone(),
        ScoringPolicy::from(scoring),
    );
    (Arc::new(service), repository, notices)
}
