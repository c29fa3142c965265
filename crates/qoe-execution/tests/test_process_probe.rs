#![cfg(unix)]

use qoe_core::config::ProbeConfig;
use qoe_core::result::TaskProgress;
use qoe_core::task::VideoQoeDesc;
use qoe_core::worker::ExternalWorker;
use qoe_execution::{ProbeContext, VideoQoeTask};
use qoe_infrastructure::{InMemoryNotificationBus, ProcessProbeWorker, StaticDeviceInfo};
use serde_json::{Map, json};
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_end_to_end_with_child_process_probe() {
    let script = r#"
sleep 0.2
printf '{"action":"qoe.video_measurement.update","extras":{"isSucceed":true,"numFrameDropped":2,"initialLoadingTime":0.8,"rebufferTime":[0.3],"bitrateTimestamp":["1","2"],"bitrateValue":[350000,700000]}}\n'
"#;
    let bus = Arc::new(InMemoryNotificationBus::new());
    let worker = Arc::new(ProcessProbeWorker::new(
        ProbeConfig {
            program: "sh".to_string(),
            args: vec!["-c".to_string(), script.to_string(), "probe".to_string()],
        },
        Arc::clone(&bus),
    ));
    let params = HashMap::from([(
        "manifestURL".to_string(),
        "http://example/manifest.mpd".to_string(),
    )]);
    let desc = VideoQoeDesc::new("e2e", chrono::Utc::now(), None, 60.0, 1, 1, 1, params).unwrap();
    let task = VideoQoeTask::new(
        desc,
        ProbeContext::new(
            worker.clone(),
            bus.clone(),
            Arc::new(StaticDeviceInfo::new("device-e2e", Map::new())),
        ),
    );

    let results = task.run(CancellationToken::new()).await.unwrap();
    worker.stop().await.unwrap();

    assert_eq!(results.len(), 1);
    let result = &results[0];
    assert_eq!(result.task_progress, TaskProgress::Completed);
    assert_eq!(result.value("numFrameDropped"), Some(&json!(2)));
    assert_eq!(result.value("rebufferTime"), Some(&json!([0.3])));
    assert_eq!(result.value("bitrateValue"), Some(&json!([350000, 700000])));
    assert_eq!(bus.subscriber_count(), 0);
}
