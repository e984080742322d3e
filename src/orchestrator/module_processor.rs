//! 单个模块处理器 - 编排层
//!
//! ## 职责
//!
//! 处理单个模块的全部子主题：
//!
//! 1. **并发启动**：所有子主题同时提交到任务池，由池控制同时运行的数量
//! 2. **保持顺序**：结果按计划中的顺序收集，与完成时间无关
//! 3. **整体完成**：等待本模块所有子主题结束（成功或最终失败）后才返回

use futures::future::join_all;
use tracing::{error, info};

use crate::error::AppResult;
use crate::models::course::{EnrichedModule, PlanModule};
use crate::services::SubtopicPool;
use crate::utils::logging::{log_module_complete, log_module_start};
use crate::workflow::{SubtopicCtx, SubtopicFlow};

/// 单个模块的处理结果
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleResult {
    pub module: EnrichedModule,
    /// 降级输出的子主题数量
    pub degraded: usize,
}

/// 处理单个模块
///
/// # 参数
/// - `flow`: 子主题处理流程
/// - `pool`: 本次运行的任务池
/// - `module`: 计划中的模块（只读）
/// - `module_index`: 模块序号（从1开始，用于日志）
/// - `total_modules`: 模块总数（用于日志）
///
/// # 返回
/// 返回组装好的模块；任一子主题失败时，等本批全部结束后返回按计划顺序的第一个错误
pub async fn process_module(
    flow: &SubtopicFlow,
    pool: &SubtopicPool,
    module: &PlanModule,
    module_index: usize,
    total_modules: usize,
) -> AppResult<ModuleResult> {
    log_module_start(
        module_index,
        total_modules,
        &module.module_title,
        module.subtopics.len(),
    );

    let tasks = module.subtopics.iter().enumerate().map(|(idx, subtopic)| {
        let ctx = SubtopicCtx::new(module.module_title.clone(), module_index, idx + 1);
        async move {
            match pool.run(flow.run(&ctx, subtopic)).await {
                Ok(outcome) => outcome,
                Err(closed) => Err(closed.into()),
            }
        }
    });

    // join_all 按输入顺序返回结果
    let outcomes = join_all(tasks).await;

    let mut subtopics = Vec::with_capacity(outcomes.len());
    let mut degraded = 0;
    for outcome in outcomes {
        match outcome {
            Ok(outcome) => {
                if outcome.is_degraded() {
                    degraded += 1;
                }
                subtopics.push(outcome.into_subtopic());
            }
            Err(e) => {
                error!("[模块 {}] ❌ 模块处理失败: {}", module_index, e);
                return Err(e);
            }
        }
    }

    info!(
        "[模块 {}] 共 {} 个子主题，降级 {} 个",
        module_index,
        subtopics.len(),
        degraded
    );
    log_module_complete(module_index, &module.module_title);

    Ok(ModuleResult {
        module: EnrichedModule::from_plan(module, subtopics),
        degraded,
    })
}
