use metrics_exporter_prometheus::PrometheusBuilder;

#[test]
fn error_events_counter_increments_on_error_event() {
    let recorder = PrometheusBuilder::new().build_recorder();
    let handle = recorder.handle();

    metrics::with_local_recorder(&recorder, || {
        let (dispatch, _otel_guard) = common::observability::build_dispatch("test-service", "info");

        tracing::dispatcher::with_default(&dispatch, || {
            tracing::warn!("not counted");
            tracing::error!(wallet = "0xabc", "enrichment blew up");
        });
    });

    let rendered = handle.render();
    assert!(
        rendered.contains(common::observability::ERROR_EVENTS_METRIC),
        "expected {} in rendered metrics, got:\n{rendered}",
        common::observability::ERROR_EVENTS_METRIC
    );
}
