//! vanguard-replay: run a recorded scenario through the full pipeline and
//! report latency, cache, and engagement metrics.
//!
//! Usage:
//!   vanguard-replay <replay-file>
//!
//! Files ending in .bin/.dis/.disbin are parsed as binary PDU streams;
//! anything else goes through the text scenario loader. Set
//! `VANGUARD_MODEL_BACKEND=openai` to rank with a local chat endpoint.

use std::path::PathBuf;
use std::process;
use std::time::Instant;

use vanguard_agent::{
    AgentPipeline, FireControlEngine, ManeuverEngine, PipelineConfig, ReplayMetricsEvaluator,
};
use vanguard_app::{init_tracing, is_binary_replay, ranker_config_from_env, ReplayStats};
use vanguard_dis::{parser, replay, DisAdapter};
use vanguard_model::{build_ranker, RankerBackend};

fn main() {
    init_tracing();

    let Some(replay_file) = std::env::args().nth(1).map(PathBuf::from) else {
        eprintln!("用法: vanguard-replay <回放文件路径>");
        process::exit(1);
    };

    let batches = if is_binary_replay(&replay_file) {
        parser::parse_file(&replay_file)
    } else {
        replay::load_batches(&replay_file)
    };
    let batches = match batches {
        Ok(batches) => batches,
        Err(err) => {
            eprintln!("回放加载失败: {err}");
            process::exit(1);
        }
    };
    if batches.is_empty() {
        eprintln!("回放文件中没有有效帧");
        process::exit(1);
    }

    let ranker_config = ranker_config_from_env();
    let backend = ranker_config.backend;

    let mut adapter = DisAdapter::new();
    let mut pipeline = AgentPipeline::new(
        PipelineConfig::default(),
        FireControlEngine::default(),
        ManeuverEngine::default(),
        build_ranker(ranker_config),
    );
    let mut evaluator = ReplayMetricsEvaluator::default();

    let mut stats = ReplayStats {
        frames: batches.len(),
        ..ReplayStats::default()
    };
    let mut latencies_ms = Vec::new();

    for batch in &batches {
        adapter.ingest(batch);
        let Some(snapshot) = adapter.poll() else {
            continue;
        };

        evaluator.observe_snapshot(&snapshot);

        let t0 = Instant::now();
        let decision = pipeline.tick(&snapshot, adapter.drain_events());
        latencies_ms.push(t0.elapsed().as_secs_f64() * 1000.0);

        evaluator.observe_decision(snapshot.timestamp_ms, &decision);
        stats.ticks += 1;
        stats.decisions += 1;
        if decision.from_cache {
            stats.cache_hits += 1;
        }
    }

    if stats.decisions == 0 {
        eprintln!("回放未产生有效决策");
        process::exit(1);
    }
    let stats = stats.with_latencies(latencies_ms);
    let metrics = evaluator.finalize();

    println!("回放文件: {}", replay_file.display());
    println!(
        "模型后端: {}",
        match backend {
            RankerBackend::OpenAiCompatible => "OpenAI兼容接口",
            RankerBackend::Mock => "模拟后端",
        }
    );
    println!("帧数: {}", stats.frames);
    println!("决策循环次数: {}", stats.ticks);
    println!("决策总数: {}", stats.decisions);
    println!(
        "缓存命中率: {:.1}%",
        100.0 * stats.cache_hits as f64 / stats.decisions as f64
    );
    println!("平均时延(毫秒): {:.3}", stats.avg_latency_ms);
    println!("95分位时延(毫秒): {:.3}", stats.p95_latency_ms);
    println!("初始我方兵力: {}", metrics.initial_friendly_count);
    println!("最终存活我方兵力: {}", metrics.final_friendly_alive);
    println!("生存率: {:.1}%", metrics.survival_rate);
    println!("敌方损失数: {}", metrics.total_hostile_losses);
    println!("命中贡献率: {:.1}%", metrics.hit_contribution_rate);

    let mut credits: Vec<(&String, &f64)> = metrics.shooter_kill_contribution.iter().collect();
    credits.sort_by(|a, b| a.0.cmp(b.0));
    for (shooter, credit) in credits {
        println!("射手毁伤贡献: {shooter}={credit:.2}");
    }
}
