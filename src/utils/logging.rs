/// 日志工具模块
///
/// 提供日志初始化、格式化和输出的辅助函数
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::models::course::Plan;
use crate::orchestrator::RunStats;

/// 初始化日志
///
/// `RUST_LOG` 优先；未设置时默认 `info`，详细模式下为 `debug`。
/// 重复调用不会报错（测试中会多次初始化）。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
///
/// # 参数
/// - `config`: 配置
/// - `model_name`: 使用的模型名称
pub fn log_startup(config: &Config, model_name: &str) {
    info!("{}", "=".repeat(60));
    info!(
        "🚀 程序启动 - 课程生成 ({})",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("🤖 模型: {}", model_name);
    info!("📊 子主题最大并发数: {}", config.max_concurrent_subtopics);
    info!(
        "🔁 每阶段最多尝试 {} 次，间隔 {} ms，节流 {} ms",
        config.max_retry_attempts, config.retry_delay_ms, config.pacing_delay_ms
    );
    info!("{}", "=".repeat(60));
}

/// 记录课程计划信息
pub fn log_plan_ready(plan: &Plan) {
    info!("\n{}", "=".repeat(60));
    info!("🗺️ 课程计划: 共 {} 个模块", plan.modules.len());
    for (idx, module) in plan.modules.iter().enumerate() {
        info!(
            "  {}. {} ({} 个子主题)",
            idx + 1,
            truncate_text(&module.module_title, 40),
            module.subtopics.len()
        );
    }
    info!("{}", "=".repeat(60));
}

/// 记录模块开始信息
///
/// # 参数
/// - `module_index`: 模块序号
/// - `total_modules`: 模块总数
/// - `title`: 模块标题
/// - `subtopic_count`: 子主题数量
pub fn log_module_start(
    module_index: usize,
    total_modules: usize,
    title: &str,
    subtopic_count: usize,
) {
    info!("\n{}", "=".repeat(60));
    info!(
        "📦 开始处理第 {}/{} 个模块: {}",
        module_index,
        total_modules,
        truncate_text(title, 40)
    );
    info!("📄 本模块子主题: {} 个", subtopic_count);
    info!("{}", "=".repeat(60));
}

/// 记录模块完成信息
pub fn log_module_complete(module_index: usize, title: &str) {
    info!("{}", "─".repeat(60));
    info!("✓ 第 {} 个模块完成: {}", module_index, truncate_text(title, 40));
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息
///
/// # 参数
/// - `stats`: 运行统计
/// - `output_file`: 输出文件路径
pub fn print_final_stats(stats: &RunStats, output_file: &str) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("📚 模块: {}", stats.modules);
    info!("📝 子主题: {}", stats.subtopics);
    info!("❓ 测验题: {}", stats.quiz_questions);
    info!("⚠️ 降级子主题: {}", stats.degraded_subtopics);
    info!("⏱️ 耗时: {:.1} 秒", stats.elapsed.as_secs_f64());
    info!("{}", "=".repeat(60));
    info!("\n课程已保存至: {}", output_file);
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
