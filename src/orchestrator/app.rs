//! 应用入口 - 编排层
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：输出启动信息、创建模型网关和流水线
//! 2. **读取输入**：加载文本文件并截断
//! 3. **生成课程**：委托 `CoursePipeline`
//! 4. **校验输出**：校验课程结构并包装为最终输出
//! 5. **写出结果**：以 JSON 格式写入输出文件
//! 6. **全局统计**：汇总本次运行的结果

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};

use crate::config::Config;
use crate::error::{AppResult, FileError};
use crate::models::course::CourseResponse;
use crate::models::load_text_file;
use crate::orchestrator::course_pipeline::CoursePipeline;
use crate::services::{validate_course, LlmService, ModelGateway};
use crate::utils::logging::{log_startup, print_final_stats};

/// 应用主结构
pub struct App {
    config: Config,
    pipeline: CoursePipeline,
}

impl App {
    /// 初始化应用（使用 OpenAI 兼容的远端模型）
    pub async fn initialize(config: Config) -> Result<Self> {
        let gateway: Arc<dyn ModelGateway> = Arc::new(LlmService::new(&config));
        Ok(Self::with_gateway(config, gateway))
    }

    /// 使用指定的模型网关初始化
    pub fn with_gateway(config: Config, gateway: Arc<dyn ModelGateway>) -> Self {
        log_startup(&config, gateway.model_name());

        let pipeline = CoursePipeline::new(gateway, &config);
        Self { config, pipeline }
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<CourseResponse> {
        match self.generate().await {
            Ok(response) => Ok(response),
            Err(e) => {
                error!("❌ 课程生成失败: {}", e);
                Err(e.into())
            }
        }
    }

    async fn generate(&self) -> AppResult<CourseResponse> {
        // 加载输入文本
        info!("📁 正在读取输入文件: {}", self.config.input_file);
        let text =
            load_text_file(Path::new(&self.config.input_file), self.config.max_input_chars).await?;

        // 生成课程
        let run = self.pipeline.generate(&text).await?;

        // 校验并包装
        let response = validate_course(run.course)?;

        // 写出结果
        write_output(&self.config.output_file, &response).await?;

        print_final_stats(&run.stats, &self.config.output_file);
        Ok(response)
    }
}

/// 以 JSON 格式写出课程
async fn write_output(path: &str, response: &CourseResponse) -> AppResult<()> {
    let json = serde_json::to_string_pretty(response)?;

    tokio::fs::write(path, json)
        .await
        .map_err(|source| FileError::WriteFailed {
            path: path.to_string(),
            source,
        })?;

    info!("💾 课程已写入: {}", path);
    Ok(())
}
