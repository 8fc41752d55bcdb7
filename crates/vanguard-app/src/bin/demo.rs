//! vanguard-demo: run one decision tick against a mock battlefield and
//! print the resulting package.

use std::process;
use std::time::{SystemTime, UNIX_EPOCH};

use vanguard_agent::{AgentPipeline, FireControlEngine, ManeuverEngine, PipelineConfig};
use vanguard_app::{build_mock_snapshot, init_tracing, ranker_config_from_env};
use vanguard_dis::DisAdapter;
use vanguard_model::build_ranker;

fn main() {
    init_tracing();

    let now_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0);

    let mut adapter = DisAdapter::new();
    adapter.feed_mock_frame(&build_mock_snapshot(now_ms));

    let Some(snapshot) = adapter.poll() else {
        eprintln!("没有可用的战场快照");
        process::exit(1);
    };

    let mut pipeline = AgentPipeline::new(
        PipelineConfig::default(),
        FireControlEngine::default(),
        ManeuverEngine::default(),
        build_ranker(ranker_config_from_env()),
    );

    let decision = pipeline.tick(&snapshot, adapter.drain_events());

    println!("Fire: {}", decision.fire.summary);
    println!("Maneuver: {}", decision.maneuver.summary);
    println!("Explain: {}", decision.explanation);

    for assignment in &decision.fire.assignments {
        println!(
            "  shooter={} target={} weapon={} score={:.2} offset={:.2}s",
            assignment.shooter_id,
            assignment.target_id,
            assignment.weapon_name,
            assignment.score,
            assignment.scheduled_offset_s
        );
    }

    for action in &decision.maneuver.actions {
        println!(
            "  unit={} action={} next=({:.1},{:.1})",
            action.unit_id,
            action.action.as_str(),
            action.next_pose.x,
            action.next_pose.y
        );
    }
}
