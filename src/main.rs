use anyhow::{Context, Result};
use course_generator::utils::logging;
use course_generator::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let mut config = Config::load().context("加载配置失败")?;

    // 初始化日志
    logging::init(config.verbose_logging);

    // 第一个命令行参数作为输入文件
    if let Some(input) = std::env::args().nth(1) {
        config.input_file = input;
    }

    // 初始化并运行应用
    let app = App::initialize(config).await.context("应用初始化失败")?;
    app.run().await?;

    Ok(())
}
