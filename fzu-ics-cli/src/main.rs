mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "fzu-ics")]
#[command(about = "福州大学讲座日历生成工具")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 获取讲座日历并写出ICS文件
    Fetch {
        /// 学号
        #[arg(short, long)]
        uid: String,
        /// 教务系统口令
        #[arg(short, long)]
        password: String,
        /// 输出文件路径，缺省写到标准输出
        #[arg(short, long)]
        output: Option<String>,
    },
    /// 仅验证凭据
    Validate {
        /// 学号
        #[arg(short, long)]
        uid: String,
        /// 教务系统口令
        #[arg(short, long)]
        password: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fzu_ics_cli=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Fetch {
            uid,
            password,
            output,
        } => commands::fetch_command(uid, password, output).await,
        Commands::Validate { uid, password } => commands::validate_command(uid, password).await,
    }
}
